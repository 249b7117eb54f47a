use std::sync::Arc;

use invoke_common::access_flags::{ACC_ABSTRACT, ACC_PUBLIC, ACC_STATIC};
use invoke_common::loading::LoaderName;

use crate::bootstrap::bootstrap;
use crate::object::{FieldSlot, WasException};
use crate::types::{JType, MethodDescriptor};
use crate::value::Value;
use crate::{FieldInfo, MethodBody, MethodInfo, RuntimeClass};

/// Assembles a [`RuntimeClass`]. Classes without an explicit superclass extend `java/lang/Object`.
pub struct ClassBuilder {
    name: String,
    access_flags: u16,
    loader: LoaderName,
    parent: Option<Arc<RuntimeClass>>,
    root: bool,
    interfaces: Vec<Arc<RuntimeClass>>,
    methods: Vec<MethodInfo>,
    fields: Vec<(String, JType, u16)>,
}

impl ClassBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            access_flags: ACC_PUBLIC,
            loader: LoaderName::BootstrapLoader,
            parent: None,
            root: false,
            interfaces: vec![],
            methods: vec![],
            fields: vec![],
        }
    }

    pub(crate) fn root(mut self) -> Self {
        self.root = true;
        self
    }

    pub fn access_flags(mut self, access_flags: u16) -> Self {
        self.access_flags = access_flags;
        self
    }

    pub fn loader(mut self, loader: LoaderName) -> Self {
        self.loader = loader;
        self
    }

    pub fn extends(mut self, parent: &Arc<RuntimeClass>) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn implements(mut self, interface: &Arc<RuntimeClass>) -> Self {
        self.interfaces.push(interface.clone());
        self
    }

    pub fn method(mut self, name: impl Into<String>, desc: MethodDescriptor, access_flags: u16, body: impl Fn(&[Value]) -> Result<Value, WasException> + Send + Sync + 'static) -> Self {
        let body: MethodBody = Arc::new(body);
        self.methods.push(MethodInfo { name: name.into(), desc, access_flags, body: Some(body) });
        self
    }

    pub fn abstract_method(mut self, name: impl Into<String>, desc: MethodDescriptor, access_flags: u16) -> Self {
        self.methods.push(MethodInfo { name: name.into(), desc, access_flags: access_flags | ACC_ABSTRACT, body: None });
        self
    }

    /// Constructors receive the fresh instance as their first argument.
    pub fn constructor(self, arg_types: Vec<JType>, access_flags: u16, body: impl Fn(&[Value]) -> Result<Value, WasException> + Send + Sync + 'static) -> Self {
        self.method("<init>", MethodDescriptor::void_return(arg_types), access_flags, body)
    }

    pub fn field(mut self, name: impl Into<String>, field_type: JType, access_flags: u16) -> Self {
        self.fields.push((name.into(), field_type, access_flags));
        self
    }

    pub fn build(self) -> Arc<RuntimeClass> {
        let ClassBuilder { name, access_flags, loader, parent, root, interfaces, methods, fields } = self;
        let parent = match parent {
            Some(parent) => Some(parent),
            None if root => None,
            None => Some(bootstrap().object.clone()),
        };
        let mut instance_layout = parent.as_ref().map(|parent| parent.instance_layout.clone()).unwrap_or_default();
        let mut static_defaults = vec![];
        let fields = fields.into_iter().map(|(name, field_type, access_flags)| {
            let offset = if access_flags & ACC_STATIC != 0 {
                static_defaults.push(FieldSlot::new(Value::default_value(&field_type)));
                static_defaults.len() - 1
            } else {
                instance_layout.push(field_type.clone());
                instance_layout.len() - 1
            };
            FieldInfo { name, field_type, access_flags, offset }
        }).collect();
        Arc::new(RuntimeClass {
            name,
            access_flags,
            loader,
            parent,
            interfaces,
            methods,
            fields,
            instance_layout,
            static_slots: static_defaults.into_boxed_slice(),
        })
    }
}
