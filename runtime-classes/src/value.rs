use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use invoke_common::primitive::PrimitiveType;

use crate::object::{Object, ObjectBody, ObjectRef};
use crate::types::JType;

#[derive(Clone)]
pub enum Value {
    Boolean(bool),
    Byte(i8),
    Short(i16),
    Char(u16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Object(ObjectRef),
    Null,
    //returned by void methods
    Void,
}

impl Value {
    pub fn default_value(ty: &JType) -> Value {
        match ty {
            JType::Primitive(prim) => match prim {
                PrimitiveType::Boolean => Value::Boolean(false),
                PrimitiveType::Byte => Value::Byte(0),
                PrimitiveType::Short => Value::Short(0),
                PrimitiveType::Char => Value::Char(0),
                PrimitiveType::Int => Value::Int(0),
                PrimitiveType::Long => Value::Long(0),
                PrimitiveType::Float => Value::Float(0.0),
                PrimitiveType::Double => Value::Double(0.0),
            },
            JType::Void => Value::Void,
            JType::Class(_) | JType::Array(_) => Value::Null,
        }
    }

    pub fn string(s: impl Into<String>) -> Value {
        Value::Object(Object::new_string(s))
    }

    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        Some(match self {
            Value::Boolean(_) => PrimitiveType::Boolean,
            Value::Byte(_) => PrimitiveType::Byte,
            Value::Short(_) => PrimitiveType::Short,
            Value::Char(_) => PrimitiveType::Char,
            Value::Int(_) => PrimitiveType::Int,
            Value::Long(_) => PrimitiveType::Long,
            Value::Float(_) => PrimitiveType::Float,
            Value::Double(_) => PrimitiveType::Double,
            Value::Object(_) | Value::Null | Value::Void => return None,
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Value::Object(_) | Value::Null)
    }

    pub fn try_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None
        }
    }

    pub fn unwrap_object(&self) -> &ObjectRef {
        match self {
            Value::Object(obj) => obj,
            other => panic!("expected an object, got {:?}", other)
        }
    }

    pub fn unwrap_int(&self) -> i32 {
        match self {
            Value::Int(int) => *int,
            other => panic!("expected an int, got {:?}", other)
        }
    }

    pub fn unwrap_long(&self) -> i64 {
        match self {
            Value::Long(long) => *long,
            other => panic!("expected a long, got {:?}", other)
        }
    }

    pub fn unwrap_string(&self) -> String {
        match self.try_object().and_then(|obj| obj.string_value()) {
            Some(s) => s.to_string(),
            None => panic!("expected a string, got {:?}", self)
        }
    }

    /// Primitive widening per JLS 5.1.2. Identity conversion included.
    pub fn widen_to(&self, to: PrimitiveType) -> Option<Value> {
        let from = self.primitive_type()?;
        if !from.is_convertible_to(to) {
            return None;
        }
        Some(match (self, to) {
            (_, _) if from == to => self.clone(),
            (Value::Byte(b), PrimitiveType::Short) => Value::Short(*b as i16),
            (Value::Char(c), PrimitiveType::Int) => Value::Int(*c as i32),
            (Value::Char(c), PrimitiveType::Long) => Value::Long(*c as i64),
            (Value::Char(c), PrimitiveType::Float) => Value::Float(*c as f32),
            (Value::Char(c), PrimitiveType::Double) => Value::Double(*c as f64),
            (_, PrimitiveType::Int) => Value::Int(self.as_i64()? as i32),
            (_, PrimitiveType::Long) => Value::Long(self.as_i64()?),
            (Value::Float(f), PrimitiveType::Double) => Value::Double(*f as f64),
            (_, PrimitiveType::Float) => Value::Float(self.as_i64()? as f32),
            (_, PrimitiveType::Double) => Value::Double(self.as_i64()? as f64),
            _ => return None,
        })
    }

    fn as_i64(&self) -> Option<i64> {
        Some(match self {
            Value::Byte(b) => *b as i64,
            Value::Short(s) => *s as i64,
            Value::Char(c) => *c as i64,
            Value::Int(i) => *i as i64,
            Value::Long(l) => *l,
            _ => return None
        })
    }

    /// Wraps a primitive in its wrapper object. References are returned as is.
    pub fn boxed(&self) -> Value {
        match self.primitive_type() {
            Some(prim) => Value::Object(Object::new_boxed(prim, self.clone())),
            None => self.clone()
        }
    }

    /// The primitive inside a wrapper object.
    pub fn unboxed(&self) -> Option<Value> {
        match self.try_object()?.body() {
            ObjectBody::Boxed(value) => Some(value.clone()),
            _ => None
        }
    }

    /// Value equality: primitives compare by value (floats bitwise), wrapper objects by their
    /// contents, strings by contents, other objects by identity.
    pub fn value_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Byte(a), Value::Byte(b)) => a == b,
            (Value::Short(a), Value::Short(b)) => a == b,
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Long(a), Value::Long(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Double(a), Value::Double(b)) => a.to_bits() == b.to_bits(),
            (Value::Null, Value::Null) => true,
            (Value::Void, Value::Void) => true,
            (Value::Object(a), Value::Object(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                match (a.body(), b.body()) {
                    (ObjectBody::Boxed(a_inner), ObjectBody::Boxed(b_inner)) => a_inner.value_equals(b_inner),
                    (ObjectBody::Str(a_str), ObjectBody::Str(b_str)) => a_str == b_str,
                    _ => false
                }
            }
            _ => false
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Byte(b) => write!(f, "{}b", b),
            Value::Short(s) => write!(f, "{}s", s),
            Value::Char(c) => write!(f, "'\\u{:04x}'", c),
            Value::Int(i) => write!(f, "{}", i),
            Value::Long(l) => write!(f, "{}L", l),
            Value::Float(fl) => write!(f, "{}f", fl),
            Value::Double(d) => write!(f, "{}d", d),
            Value::Object(obj) => write!(f, "{:?}", obj),
            Value::Null => write!(f, "null"),
            Value::Void => write!(f, "void"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<i64> for Value {
    fn from(l: i64) -> Self {
        Value::Long(l)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<ObjectRef> for Value {
    fn from(obj: ObjectRef) -> Self {
        Value::Object(obj)
    }
}
