use invoke_common::primitive::PrimitiveType;
use runtime_classes::instance_of::is_assignable;
use runtime_classes::types::JType;
use runtime_classes::value::Value;

use crate::error::InvokeError;

/// One step of an `as_type` adaptation, applied to a single argument or return value.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum ValueConversion {
    NoOp,
    CheckCast(JType),
    Box(PrimitiveType),
    //unbox then widen to the given primitive
    Unbox(PrimitiveType),
    Widen(PrimitiveType),
    ZeroForVoid(JType),
    Discard,
}

/// Plans the conversion of a value of static type `from` to `to`, or `None` when not even a
/// cast could make it work.
pub fn plan_conversion(from: &JType, to: &JType) -> Option<ValueConversion> {
    if from == to {
        return Some(ValueConversion::NoOp);
    }
    match (from, to) {
        (_, JType::Void) => Some(ValueConversion::Discard),
        (JType::Void, to) => Some(ValueConversion::ZeroForVoid(to.clone())),
        (JType::Primitive(from), JType::Primitive(to)) => from.is_convertible_to(*to).then(|| ValueConversion::Widen(*to)),
        (JType::Primitive(from), to) => is_assignable(&JType::wrapper_type(*from), to).then(|| ValueConversion::Box(*from)),
        (from, JType::Primitive(to)) => match from.unwrapped_primitive() {
            Some(wrapped) => wrapped.is_convertible_to(*to).then(|| ValueConversion::Unbox(*to)),
            None => Some(ValueConversion::Unbox(*to)),
        },
        (from, to) => if is_assignable(from, to) {
            Some(ValueConversion::NoOp)
        } else {
            Some(ValueConversion::CheckCast(to.clone()))
        },
    }
}

impl ValueConversion {
    pub fn is_no_op(&self) -> bool {
        matches!(self, ValueConversion::NoOp)
    }

    pub fn apply(&self, value: Value) -> Result<Value, InvokeError> {
        match self {
            ValueConversion::NoOp => Ok(value),
            ValueConversion::CheckCast(to) => check_cast(value, to),
            ValueConversion::Box(_) => Ok(value.boxed()),
            ValueConversion::Unbox(to) => unbox(value, *to),
            ValueConversion::Widen(to) => widen(value, *to),
            ValueConversion::ZeroForVoid(to) => Ok(Value::default_value(to)),
            ValueConversion::Discard => Ok(Value::Void),
        }
    }
}

fn check_cast(value: Value, to: &JType) -> Result<Value, InvokeError> {
    match &value {
        Value::Null => Ok(value),
        Value::Object(obj) if obj.is_instance_of(to) => Ok(value),
        other => Err(InvokeError::TypeMismatch(format!("cannot cast {:?} to {}", other, to)))
    }
}

fn widen(value: Value, to: PrimitiveType) -> Result<Value, InvokeError> {
    match value.widen_to(to) {
        Some(widened) => Ok(widened),
        None => Err(InvokeError::TypeMismatch(format!("cannot convert {:?} to {}", value, to.java_source_representation())))
    }
}

fn unbox(value: Value, to: PrimitiveType) -> Result<Value, InvokeError> {
    if value.is_null() {
        return Err(InvokeError::NullPointer(format!("cannot unbox null to {}", to.java_source_representation())));
    }
    match value.unboxed() {
        Some(inner) => widen(inner, to),
        None => Err(InvokeError::TypeMismatch(format!("cannot unbox {:?} to {}", value, to.java_source_representation())))
    }
}

/// Converts a loosely typed value (boxed, or a narrower primitive) to `ty`, as done for bound
/// arguments and spread array elements.
pub fn coerce_value(value: Value, ty: &JType) -> Result<Value, InvokeError> {
    match ty {
        JType::Void => Err(InvokeError::TypeMismatch("cannot pass a value as void".to_string())),
        JType::Primitive(prim) => match value.primitive_type() {
            Some(_) => widen(value, *prim),
            None => unbox(value, *prim),
        },
        JType::Class(_) | JType::Array(_) => check_cast(value.boxed(), ty),
    }
}

/// Whether `value` may be passed where `ty` is expected without any conversion.
pub fn matches_exactly(value: &Value, ty: &JType) -> bool {
    match ty {
        JType::Primitive(prim) => value.primitive_type() == Some(*prim),
        JType::Void => false,
        JType::Class(_) | JType::Array(_) => match value {
            Value::Null => true,
            Value::Object(obj) => obj.is_instance_of(ty),
            _ => false
        },
    }
}
