use std::sync::Arc;

use thiserror::Error;

use invoke_common::access_flags::HasAccessFlags;

use crate::class_table::ClassTable;
use crate::types::{JType, MethodDescriptor};
use crate::{FieldInfo, MethodInfo, RuntimeClass};

#[derive(Debug, Clone, Error)]
pub enum ResolutionError {
    #[error("no such method: {0}")]
    NoSuchMethod(String),
    #[error("no such field: {0}")]
    NoSuchField(String),
    #[error("no such class: {0}")]
    NoSuchClass(String),
    #[error("incompatible class change: {0}")]
    IncompatibleClassChange(String),
    #[error("cannot instantiate: {0}")]
    Instantiation(String),
    #[error("abstract method: {0}")]
    AbstractMethod(String),
    #[error("duplicate class definition: {0}")]
    DuplicateClass(String),
}

#[derive(Clone)]
pub struct ResolvedMethod {
    pub class: Arc<RuntimeClass>,
    pub method_i: u16,
}

impl ResolvedMethod {
    pub fn method(&self) -> &MethodInfo {
        self.class.method(self.method_i)
    }

    pub fn name(&self) -> &str {
        self.method().name.as_str()
    }

    pub fn desc(&self) -> &MethodDescriptor {
        &self.method().desc
    }

    pub fn is_same_method(&self, other: &ResolvedMethod) -> bool {
        Arc::ptr_eq(&self.class, &other.class) && self.method_i == other.method_i
    }
}

impl HasAccessFlags for ResolvedMethod {
    fn access_flags(&self) -> u16 {
        self.method().access_flags
    }
}

impl std::fmt::Debug for ResolvedMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}{:?}", self.class.name(), self.name(), self.desc())
    }
}

#[derive(Clone)]
pub struct ResolvedField {
    pub class: Arc<RuntimeClass>,
    pub field_i: u16,
}

impl ResolvedField {
    pub fn field(&self) -> &FieldInfo {
        self.class.field(self.field_i)
    }

    pub fn name(&self) -> &str {
        self.field().name.as_str()
    }

    pub fn field_type(&self) -> &JType {
        &self.field().field_type
    }

    pub fn offset(&self) -> usize {
        self.field().offset
    }

    pub fn is_same_field(&self, other: &ResolvedField) -> bool {
        Arc::ptr_eq(&self.class, &other.class) && self.field_i == other.field_i
    }
}

impl HasAccessFlags for ResolvedField {
    fn access_flags(&self) -> u16 {
        self.field().access_flags
    }
}

impl std::fmt::Debug for ResolvedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}:{:?}", self.class.name(), self.name(), self.field_type())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MethodSearch {
    Static,
    Virtual,
    Interface,
    Special,
}

pub trait SymbolResolver: Send + Sync {
    fn resolve_method(&self, class: &Arc<RuntimeClass>, name: &str, desc: &MethodDescriptor, search: MethodSearch) -> Result<ResolvedMethod, ResolutionError>;
    fn resolve_field(&self, class: &Arc<RuntimeClass>, name: &str, field_type: &JType, is_static: bool) -> Result<ResolvedField, ResolutionError>;
    fn resolve_constructor(&self, class: &Arc<RuntimeClass>, desc: &MethodDescriptor) -> Result<ResolvedMethod, ResolutionError>;
}

fn find_in_superinterfaces(class: &Arc<RuntimeClass>, name: &str, desc: &MethodDescriptor, want_body: bool) -> Option<ResolvedMethod> {
    for interface in class.interfaces() {
        if let Some(method_i) = interface.lookup_method_here(name, desc) {
            let method = interface.method(method_i);
            if !method.is_static() && !method.is_private() && (!want_body || method.body.is_some()) {
                return Some(ResolvedMethod { class: interface.clone(), method_i });
            }
        }
        if let Some(found) = find_in_superinterfaces(interface, name, desc, want_body) {
            return Some(found);
        }
    }
    class.parent().and_then(|parent| find_in_superinterfaces(parent, name, desc, want_body))
}

/// Method lookup: the class and its superclasses, then superinterfaces, preferring default
/// methods over abstract declarations.
pub fn find_method(class: &Arc<RuntimeClass>, name: &str, desc: &MethodDescriptor) -> Option<ResolvedMethod> {
    let mut current = Some(class);
    while let Some(class) = current {
        if let Some(method_i) = class.lookup_method_here(name, desc) {
            return Some(ResolvedMethod { class: class.clone(), method_i });
        }
        current = class.parent();
    }
    find_in_superinterfaces(class, name, desc, true).or_else(|| find_in_superinterfaces(class, name, desc, false))
}

/// Selects the implementation a virtual or interface call dispatches to for a receiver of class
/// `receiver_class`.
pub fn select_method(receiver_class: &Arc<RuntimeClass>, resolved: &ResolvedMethod) -> Option<ResolvedMethod> {
    if resolved.is_private() {
        return Some(resolved.clone());
    }
    let name = resolved.name();
    let desc = resolved.desc();
    let mut current = Some(receiver_class);
    while let Some(class) = current {
        if let Some(method_i) = class.lookup_method_here(name, desc) {
            let method = class.method(method_i);
            if !method.is_static() && !method.is_private() {
                return Some(ResolvedMethod { class: class.clone(), method_i });
            }
        }
        current = class.parent();
    }
    find_in_superinterfaces(receiver_class, name, desc, true)
}

pub fn find_field(class: &Arc<RuntimeClass>, name: &str, field_type: &JType) -> Option<ResolvedField> {
    if let Some(field_i) = class.lookup_field_here(name, field_type) {
        return Some(ResolvedField { class: class.clone(), field_i });
    }
    for interface in class.interfaces() {
        if let Some(found) = find_field(interface, name, field_type) {
            return Some(found);
        }
    }
    class.parent().and_then(|parent| find_field(parent, name, field_type))
}

fn describe(class: &RuntimeClass, name: &str, desc: &MethodDescriptor) -> String {
    format!("{}.{}{:?}", class.name(), name, desc)
}

impl SymbolResolver for ClassTable {
    fn resolve_method(&self, class: &Arc<RuntimeClass>, name: &str, desc: &MethodDescriptor, search: MethodSearch) -> Result<ResolvedMethod, ResolutionError> {
        match search {
            MethodSearch::Virtual if class.is_interface() => {
                return Err(ResolutionError::IncompatibleClassChange(format!("{} is an interface", class.name())));
            }
            MethodSearch::Interface if !class.is_interface() => {
                return Err(ResolutionError::IncompatibleClassChange(format!("{} is not an interface", class.name())));
            }
            _ => {}
        }
        if name == "<init>" || name == "<clinit>" {
            return Err(ResolutionError::NoSuchMethod(describe(class, name, desc)));
        }
        let resolved = find_method(class, name, desc).ok_or_else(|| ResolutionError::NoSuchMethod(describe(class, name, desc)))?;
        let is_static = resolved.is_static();
        match search {
            MethodSearch::Static if !is_static => Err(ResolutionError::IncompatibleClassChange(format!("expected static method {:?}", resolved))),
            MethodSearch::Virtual | MethodSearch::Interface | MethodSearch::Special if is_static => {
                Err(ResolutionError::IncompatibleClassChange(format!("expected instance method {:?}", resolved)))
            }
            _ => Ok(resolved)
        }
    }

    fn resolve_field(&self, class: &Arc<RuntimeClass>, name: &str, field_type: &JType, is_static: bool) -> Result<ResolvedField, ResolutionError> {
        let resolved = find_field(class, name, field_type)
            .ok_or_else(|| ResolutionError::NoSuchField(format!("{}.{}:{:?}", class.name(), name, field_type)))?;
        if resolved.is_static() != is_static {
            return Err(ResolutionError::IncompatibleClassChange(format!("static mismatch for {:?}", resolved)));
        }
        Ok(resolved)
    }

    fn resolve_constructor(&self, class: &Arc<RuntimeClass>, desc: &MethodDescriptor) -> Result<ResolvedMethod, ResolutionError> {
        if class.is_interface() || class.is_abstract() {
            return Err(ResolutionError::Instantiation(class.name().to_string()));
        }
        match class.lookup_method_here("<init>", desc) {
            Some(method_i) => Ok(ResolvedMethod { class: class.clone(), method_i }),
            None => Err(ResolutionError::NoSuchMethod(describe(class, "<init>", desc)))
        }
    }
}
