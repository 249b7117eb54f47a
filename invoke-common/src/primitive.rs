use strum_macros::EnumIter;

use crate::basic_type::BasicType;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, EnumIter)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn slot_count(&self) -> usize {
        match self {
            PrimitiveType::Long | PrimitiveType::Double => 2,
            _ => 1,
        }
    }

    pub fn jvm_representation(&self) -> char {
        match self {
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Byte => 'B',
            PrimitiveType::Short => 'S',
            PrimitiveType::Char => 'C',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Float => 'F',
            PrimitiveType::Double => 'D',
        }
    }

    pub fn java_source_representation(&self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    pub fn wrapper_class_name(&self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java/lang/Boolean",
            PrimitiveType::Byte => "java/lang/Byte",
            PrimitiveType::Short => "java/lang/Short",
            PrimitiveType::Char => "java/lang/Character",
            PrimitiveType::Int => "java/lang/Integer",
            PrimitiveType::Long => "java/lang/Long",
            PrimitiveType::Float => "java/lang/Float",
            PrimitiveType::Double => "java/lang/Double",
        }
    }

    /// Sub-int types travel as ints once erased.
    pub fn basic_type(&self) -> BasicType {
        match self {
            PrimitiveType::Boolean |
            PrimitiveType::Byte |
            PrimitiveType::Short |
            PrimitiveType::Char |
            PrimitiveType::Int => BasicType::I,
            PrimitiveType::Long => BasicType::J,
            PrimitiveType::Float => BasicType::F,
            PrimitiveType::Double => BasicType::D,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, PrimitiveType::Boolean)
    }

    /// Identity or widening primitive conversion (JLS 5.1.2).
    pub fn is_convertible_to(&self, to: PrimitiveType) -> bool {
        use PrimitiveType::*;
        if *self == to {
            return true;
        }
        match self {
            Boolean => false,
            Byte => matches!(to, Short | Int | Long | Float | Double),
            Short | Char => matches!(to, Int | Long | Float | Double),
            Int => matches!(to, Long | Float | Double),
            Long => matches!(to, Float | Double),
            Float => matches!(to, Double),
            Double => false,
        }
    }
}
