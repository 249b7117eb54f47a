use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use invoke_common::access_flags::HasAccessFlags;
use invoke_common::class_names::{outermost_class_name, package_name};
use invoke_common::loading::LoaderName;

use crate::object::FieldSlot;
use crate::types::{JType, MethodDescriptor};
use crate::value::Value;
use crate::object::WasException;

pub mod types;
pub mod value;
pub mod object;
pub mod builder;
pub mod bootstrap;
pub mod instance_of;
pub mod class_table;
pub mod resolution;
pub mod visibility;
pub mod field_access;
#[cfg(test)]
pub mod test;

pub type MethodBody = Arc<dyn Fn(&[Value]) -> Result<Value, WasException> + Send + Sync>;

pub struct MethodInfo {
    pub name: String,
    pub desc: MethodDescriptor,
    pub access_flags: u16,
    //none for abstract methods
    pub body: Option<MethodBody>,
}

impl HasAccessFlags for MethodInfo {
    fn access_flags(&self) -> u16 {
        self.access_flags
    }
}

impl MethodInfo {
    pub fn is_constructor(&self) -> bool {
        self.name == "<init>"
    }
}

pub struct FieldInfo {
    pub name: String,
    pub field_type: JType,
    pub access_flags: u16,
    //index into instance slots, or into the static slots of the declaring class
    pub offset: usize,
}

impl HasAccessFlags for FieldInfo {
    fn access_flags(&self) -> u16 {
        self.access_flags
    }
}

pub struct RuntimeClass {
    pub(crate) name: String,
    pub(crate) access_flags: u16,
    pub(crate) loader: LoaderName,
    pub(crate) parent: Option<Arc<RuntimeClass>>,
    pub(crate) interfaces: Vec<Arc<RuntimeClass>>,
    pub(crate) methods: Vec<MethodInfo>,
    pub(crate) fields: Vec<FieldInfo>,
    //includes inherited instance fields, parent fields first
    pub(crate) instance_layout: Vec<JType>,
    pub(crate) static_slots: Box<[FieldSlot]>,
}

impl RuntimeClass {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn loader(&self) -> LoaderName {
        self.loader
    }

    pub fn parent(&self) -> Option<&Arc<RuntimeClass>> {
        self.parent.as_ref()
    }

    pub fn interfaces(&self) -> &[Arc<RuntimeClass>] {
        self.interfaces.as_slice()
    }

    pub fn methods(&self) -> &[MethodInfo] {
        self.methods.as_slice()
    }

    pub fn method(&self, method_i: u16) -> &MethodInfo {
        &self.methods[method_i as usize]
    }

    pub fn fields(&self) -> &[FieldInfo] {
        self.fields.as_slice()
    }

    pub fn field(&self, field_i: u16) -> &FieldInfo {
        &self.fields[field_i as usize]
    }

    pub fn instance_layout(&self) -> &[JType] {
        self.instance_layout.as_slice()
    }

    pub fn static_slot(&self, offset: usize) -> Option<&FieldSlot> {
        self.static_slots.get(offset)
    }

    pub fn package_name(&self) -> &str {
        package_name(&self.name)
    }

    pub fn outermost_class_name(&self) -> &str {
        outermost_class_name(&self.name)
    }

    pub fn lookup_method_here(&self, name: &str, desc: &MethodDescriptor) -> Option<u16> {
        self.methods.iter().position(|method| method.name == name && &method.desc == desc).map(|i| i as u16)
    }

    pub fn lookup_field_here(&self, name: &str, field_type: &JType) -> Option<u16> {
        self.fields.iter().position(|field| field.name == name && &field.field_type == field_type).map(|i| i as u16)
    }
}

impl HasAccessFlags for RuntimeClass {
    fn access_flags(&self) -> u16 {
        self.access_flags
    }
}

impl Debug for RuntimeClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.name, self.loader)
    }
}
