use crate::object::Object;
use crate::types::JType;
use crate::RuntimeClass;

/// Reflexive: every class is a subclass of itself. Interfaces count.
pub fn is_subclass_of(sub: &RuntimeClass, sup: &RuntimeClass) -> bool {
    if std::ptr::eq(sub, sup) {
        return true;
    }
    if let Some(parent) = sub.parent() {
        if is_subclass_of(parent, sup) {
            return true;
        }
    }
    sub.interfaces().iter().any(|interface| is_subclass_of(interface, sup))
}

/// Reference assignability. Primitives are only assignable to themselves.
pub fn is_assignable(from: &JType, to: &JType) -> bool {
    if from == to {
        return true;
    }
    match (from, to) {
        (JType::Class(from), JType::Class(to)) => is_subclass_of(from, to),
        (JType::Array(_), JType::Class(_)) => to.is_object_class(),
        (JType::Array(from_component), JType::Array(to_component)) => {
            from_component.is_reference() && to_component.is_reference() && is_assignable(from_component, to_component)
        }
        _ => false
    }
}

pub fn is_instance_of(obj: &Object, ty: &JType) -> bool {
    is_assignable(&obj.runtime_type(), ty)
}
