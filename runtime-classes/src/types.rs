use std::fmt::{Debug, Display, Formatter};
use std::sync::Arc;

use by_address::ByAddress;
use itertools::Itertools;

use invoke_common::basic_type::BasicType;
use invoke_common::class_names;
use invoke_common::primitive::PrimitiveType;

use crate::bootstrap::bootstrap;
use crate::RuntimeClass;

pub type ClassRef = ByAddress<Arc<RuntimeClass>>;

/// A resolved type. Class types carry the class itself so that two classes with the same name in
/// different loaders never compare equal.
#[derive(Clone, Eq, PartialEq, Hash)]
pub enum JType {
    Primitive(PrimitiveType),
    Void,
    Class(ClassRef),
    Array(Box<JType>),
}

impl JType {
    pub const BOOLEAN: JType = JType::Primitive(PrimitiveType::Boolean);
    pub const BYTE: JType = JType::Primitive(PrimitiveType::Byte);
    pub const SHORT: JType = JType::Primitive(PrimitiveType::Short);
    pub const CHAR: JType = JType::Primitive(PrimitiveType::Char);
    pub const INT: JType = JType::Primitive(PrimitiveType::Int);
    pub const LONG: JType = JType::Primitive(PrimitiveType::Long);
    pub const FLOAT: JType = JType::Primitive(PrimitiveType::Float);
    pub const DOUBLE: JType = JType::Primitive(PrimitiveType::Double);
    pub const VOID: JType = JType::Void;

    pub fn class(class: &Arc<RuntimeClass>) -> Self {
        JType::Class(ByAddress(class.clone()))
    }

    pub fn object() -> Self {
        JType::class(&bootstrap().object)
    }

    pub fn string() -> Self {
        JType::class(&bootstrap().string)
    }

    pub fn array_of(component: JType) -> Self {
        JType::Array(Box::new(component))
    }

    pub fn object_array() -> Self {
        JType::array_of(JType::object())
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, JType::Primitive(_))
    }

    pub fn is_void(&self) -> bool {
        matches!(self, JType::Void)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, JType::Class(_) | JType::Array(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, JType::Array(_))
    }

    pub fn is_object_class(&self) -> bool {
        match self {
            JType::Class(class) => Arc::ptr_eq(&class.0, &bootstrap().object),
            _ => false
        }
    }

    pub fn try_primitive(&self) -> Option<PrimitiveType> {
        match self {
            JType::Primitive(prim) => Some(*prim),
            _ => None
        }
    }

    pub fn try_class(&self) -> Option<&Arc<RuntimeClass>> {
        match self {
            JType::Class(class) => Some(&class.0),
            _ => None
        }
    }

    pub fn unwrap_class(&self) -> &Arc<RuntimeClass> {
        match self.try_class() {
            Some(class) => class,
            None => panic!("expected a class type, got {}", self)
        }
    }

    pub fn array_component(&self) -> Option<&JType> {
        match self {
            JType::Array(component) => Some(component.as_ref()),
            _ => None
        }
    }

    /// The class whose accessibility governs this type: the class itself, or the innermost
    /// element class of an array.
    pub fn element_class(&self) -> Option<&Arc<RuntimeClass>> {
        match self {
            JType::Class(class) => Some(&class.0),
            JType::Array(component) => component.element_class(),
            _ => None
        }
    }

    /// The primitive this type is the wrapper class of, if any.
    pub fn unwrapped_primitive(&self) -> Option<PrimitiveType> {
        self.try_class().and_then(|class| bootstrap().unwrapped_primitive(class))
    }

    pub fn wrapper_type(prim: PrimitiveType) -> JType {
        JType::class(bootstrap().wrapper(prim))
    }

    pub fn basic_type(&self) -> BasicType {
        match self {
            JType::Primitive(prim) => prim.basic_type(),
            JType::Void => BasicType::V,
            JType::Class(_) | JType::Array(_) => BasicType::L,
        }
    }

    pub fn slot_count(&self) -> usize {
        match self {
            JType::Primitive(prim) => prim.slot_count(),
            JType::Void => 0,
            JType::Class(_) | JType::Array(_) => 1
        }
    }

    pub fn jvm_representation(&self) -> String {
        match self {
            JType::Primitive(prim) => prim.jvm_representation().to_string(),
            JType::Void => "V".to_string(),
            JType::Class(class) => format!("L{};", class.name()),
            JType::Array(component) => format!("[{}", component.jvm_representation()),
        }
    }

    pub fn java_source_representation(&self) -> String {
        match self {
            JType::Primitive(prim) => prim.java_source_representation().to_string(),
            JType::Void => "void".to_string(),
            JType::Class(class) => class_names::short_representation(class.name()).to_string(),
            JType::Array(component) => format!("{}[]", component.java_source_representation()),
        }
    }
}

impl Debug for JType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.jvm_representation())
    }
}

impl Display for JType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.java_source_representation())
    }
}

impl From<PrimitiveType> for JType {
    fn from(prim: PrimitiveType) -> Self {
        JType::Primitive(prim)
    }
}

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct MethodDescriptor {
    pub arg_types: Vec<JType>,
    pub return_type: JType,
}

impl MethodDescriptor {
    pub fn new(arg_types: Vec<JType>, return_type: JType) -> Self {
        Self { arg_types, return_type }
    }

    pub fn void_return(arg_types: Vec<JType>) -> Self {
        Self { arg_types, return_type: JType::Void }
    }

    pub fn empty_args(return_type: JType) -> Self {
        Self { arg_types: vec![], return_type }
    }

    pub fn slot_count(&self) -> usize {
        self.arg_types.iter().map(|arg| arg.slot_count()).sum()
    }

    pub fn jvm_representation(&self) -> String {
        format!("({}){}", self.arg_types.iter().map(|arg| arg.jvm_representation()).join(""), self.return_type.jvm_representation())
    }
}

impl Debug for MethodDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.jvm_representation())
    }
}
