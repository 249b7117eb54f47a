use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use invoke_common::primitive::PrimitiveType;

use crate::bootstrap::bootstrap;
use crate::instance_of::is_instance_of;
use crate::types::JType;
use crate::value::Value;
use crate::RuntimeClass;

pub type ObjectRef = Arc<Object>;

pub struct FieldSlot {
    value: RwLock<Value>,
}

impl FieldSlot {
    pub fn new(value: Value) -> Self {
        Self { value: RwLock::new(value) }
    }

    pub fn load(&self) -> Value {
        self.value.read().clone()
    }

    pub fn store(&self, value: Value) {
        *self.value.write() = value;
    }
}

pub enum ObjectBody {
    Fields(Box<[FieldSlot]>),
    Array {
        component: JType,
        elems: Mutex<Vec<Value>>,
    },
    Boxed(Value),
    Str(String),
    Throwable {
        message: Option<String>,
    },
}

pub struct Object {
    class: Arc<RuntimeClass>,
    body: ObjectBody,
}

impl Object {
    pub fn new_instance(class: &Arc<RuntimeClass>) -> ObjectRef {
        let slots = class.instance_layout().iter().map(|ty| FieldSlot::new(Value::default_value(ty))).collect();
        Arc::new(Object { class: class.clone(), body: ObjectBody::Fields(slots) })
    }

    pub fn new_array(component: JType, elems: Vec<Value>) -> ObjectRef {
        Arc::new(Object {
            class: bootstrap().object.clone(),
            body: ObjectBody::Array { component, elems: Mutex::new(elems) },
        })
    }

    pub fn new_boxed(prim: PrimitiveType, value: Value) -> ObjectRef {
        Arc::new(Object { class: bootstrap().wrapper(prim).clone(), body: ObjectBody::Boxed(value) })
    }

    pub fn new_string(s: impl Into<String>) -> ObjectRef {
        Arc::new(Object { class: bootstrap().string.clone(), body: ObjectBody::Str(s.into()) })
    }

    pub fn new_throwable(class: &Arc<RuntimeClass>, message: Option<String>) -> ObjectRef {
        Arc::new(Object { class: class.clone(), body: ObjectBody::Throwable { message } })
    }

    pub fn class(&self) -> &Arc<RuntimeClass> {
        &self.class
    }

    pub fn body(&self) -> &ObjectBody {
        &self.body
    }

    pub fn runtime_type(&self) -> JType {
        match &self.body {
            ObjectBody::Array { component, .. } => JType::array_of(component.clone()),
            _ => JType::class(&self.class)
        }
    }

    pub fn is_instance_of(&self, ty: &JType) -> bool {
        is_instance_of(self, ty)
    }

    pub fn field_slot(&self, offset: usize) -> Option<&FieldSlot> {
        match &self.body {
            ObjectBody::Fields(slots) => slots.get(offset),
            _ => None
        }
    }

    pub fn array_component(&self) -> Option<&JType> {
        match &self.body {
            ObjectBody::Array { component, .. } => Some(component),
            _ => None
        }
    }

    pub fn array_elements(&self) -> Option<Vec<Value>> {
        match &self.body {
            ObjectBody::Array { elems, .. } => Some(elems.lock().clone()),
            _ => None
        }
    }

    pub fn string_value(&self) -> Option<&str> {
        match &self.body {
            ObjectBody::Str(s) => Some(s.as_str()),
            _ => None
        }
    }

    pub fn throwable_message(&self) -> Option<&str> {
        match &self.body {
            ObjectBody::Throwable { message } => message.as_deref(),
            _ => None
        }
    }
}

impl Debug for Object {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.body {
            ObjectBody::Str(s) => write!(f, "{:?}", s),
            ObjectBody::Boxed(value) => write!(f, "{}({:?})", self.class.name(), value),
            ObjectBody::Array { component, elems } => write!(f, "{}[{:?}]", component, elems.lock()),
            ObjectBody::Throwable { message } => write!(f, "{}: {}", self.class.name(), message.as_deref().unwrap_or("")),
            ObjectBody::Fields(_) => write!(f, "{}@{:p}", self.class.name(), self as *const Object),
        }
    }
}

/// An application-level exception in flight.
#[derive(Clone)]
pub struct WasException {
    pub exception_obj: ObjectRef,
}

impl WasException {
    pub fn new(class: &Arc<RuntimeClass>, message: impl Into<String>) -> Self {
        Self { exception_obj: Object::new_throwable(class, Some(message.into())) }
    }

    pub fn class(&self) -> &Arc<RuntimeClass> {
        self.exception_obj.class()
    }

    pub fn message(&self) -> Option<&str> {
        self.exception_obj.throwable_message()
    }
}

impl Debug for WasException {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "exception {:?}", self.exception_obj)
    }
}
