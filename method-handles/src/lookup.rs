use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use log::trace;

use invoke_common::access_flags::{HasAccessFlags, ACC_FINAL, ACC_PRIVATE, ACC_PROTECTED, ACC_PUBLIC, ACC_STATIC};
use invoke_common::ref_kinds::ReferenceKind;
use runtime_classes::bootstrap::bootstrap;
use runtime_classes::instance_of::is_subclass_of;
use runtime_classes::object::ObjectRef;
use runtime_classes::resolution::{MethodSearch, ResolutionError, ResolvedField, ResolvedMethod};
use runtime_classes::types::JType;
use runtime_classes::value::Value;
use runtime_classes::RuntimeClass;

use crate::access::{is_class_accessible, is_member_accessible, is_same_package_member, is_signature_visible, ALL_MODES, PACKAGE, PRIVATE, PROTECTED, PUBLIC};
use crate::env::InvokeEnv;
use crate::error::InvokeError;
use crate::handle::{DirectMode, HandleKind, MethodHandle};
use crate::member_cache::MemberKey;
use crate::method_type::MethodType;
use crate::tracing::tracing;

/// A capability to create handles with the access rights of `lookup_class`.
#[derive(Clone)]
pub struct Lookup {
    env: Arc<InvokeEnv>,
    lookup_class: Arc<RuntimeClass>,
    allowed_modes: u8,
    trusted: bool,
}

impl Lookup {
    pub fn lookup(env: &Arc<InvokeEnv>, caller: &Arc<RuntimeClass>) -> Self {
        Self { env: env.clone(), lookup_class: caller.clone(), allowed_modes: ALL_MODES, trusted: false }
    }

    pub fn public_lookup(env: &Arc<InvokeEnv>) -> Self {
        Self { env: env.clone(), lookup_class: bootstrap().object.clone(), allowed_modes: PUBLIC, trusted: false }
    }

    /// Bypasses every access check.
    pub fn trusted(env: &Arc<InvokeEnv>) -> Self {
        Self { env: env.clone(), lookup_class: bootstrap().object.clone(), allowed_modes: ALL_MODES, trusted: true }
    }

    pub fn env(&self) -> &Arc<InvokeEnv> {
        &self.env
    }

    pub fn lookup_class(&self) -> &Arc<RuntimeClass> {
        &self.lookup_class
    }

    pub fn lookup_modes(&self) -> u8 {
        self.allowed_modes
    }

    pub fn is_trusted(&self) -> bool {
        self.trusted
    }

    pub fn has_private_access(&self) -> bool {
        self.trusted || self.allowed_modes & PRIVATE != 0
    }

    /// A lookup on `requested` with no more rights than this one.
    pub fn in_class(&self, requested: &Arc<RuntimeClass>) -> Lookup {
        if self.trusted {
            return Lookup::lookup(&self.env, requested);
        }
        if Arc::ptr_eq(requested, &self.lookup_class) {
            return self.clone();
        }
        let visibility = self.env.visibility.as_ref();
        let mut new_modes = self.allowed_modes & (ALL_MODES & !PROTECTED);
        if new_modes & PACKAGE != 0 && !visibility.is_same_package(&self.lookup_class, requested) {
            new_modes &= !(PACKAGE | PRIVATE);
        }
        if new_modes & PRIVATE != 0 && !is_same_package_member(visibility, &self.lookup_class, requested) {
            new_modes &= !PRIVATE;
        }
        if new_modes & PUBLIC != 0 && !is_class_accessible(visibility, requested, &self.lookup_class, self.allowed_modes) {
            new_modes = 0;
        }
        Lookup { env: self.env.clone(), lookup_class: requested.clone(), allowed_modes: new_modes, trusted: false }
    }

    fn deny(&self, message: String) -> InvokeError {
        InvokeError::AccessDenied(format!("{}, from {:?}", message, self))
    }

    fn check_symbolic_class(&self, ref_class: &Arc<RuntimeClass>) -> Result<(), InvokeError> {
        if self.trusted {
            return Ok(());
        }
        let allowed = is_class_accessible(self.env.visibility.as_ref(), ref_class, &self.lookup_class, self.allowed_modes);
        tracing().trace_access_check(self, ref_class, allowed);
        if !allowed {
            return Err(self.deny(format!("class is not accessible: {}", ref_class.name())));
        }
        Ok(())
    }

    fn check_access(&self, kind: ReferenceKind, ref_class: &Arc<RuntimeClass>, def_class: &Arc<RuntimeClass>, mut mods: u16, member: &dyn Debug) -> Result<(), InvokeError> {
        if self.trusted {
            return Ok(());
        }
        if kind.is_setter() && mods & ACC_FINAL != 0 {
            return Err(self.deny(format!("cannot set final field {:?}", member)));
        }
        //protected constructors can only be reached with package access
        if kind == ReferenceKind::NewInvokeSpecial && mods & ACC_PROTECTED != 0 {
            mods ^= ACC_PROTECTED;
        }
        let allowed = is_member_accessible(self.env.visibility.as_ref(), ref_class, def_class, mods, &self.lookup_class, self.allowed_modes);
        tracing().trace_access_check(self, member, allowed);
        if !allowed {
            let describe = if mods & ACC_PUBLIC != 0 { "public" } else if mods & ACC_PROTECTED != 0 { "protected" } else if mods & ACC_PRIVATE != 0 { "private" } else { "package-private" };
            return Err(self.deny(format!("{} member {:?} is not accessible", describe, member)));
        }
        Ok(())
    }

    fn check_signature(&self, method_type: &MethodType, ref_class: &Arc<RuntimeClass>) -> Result<(), InvokeError> {
        if self.trusted || is_signature_visible(self.env.visibility.as_ref(), method_type, ref_class) {
            return Ok(());
        }
        Err(self.deny(format!("{} names classes not visible from {:?}", method_type, ref_class)))
    }

    fn restricts_protected_receiver(&self, def_class: &Arc<RuntimeClass>, mods: u16) -> bool {
        mods & ACC_PROTECTED != 0 &&
            !mods_static(mods) &&
            !self.trusted &&
            !Arc::ptr_eq(def_class, &self.lookup_class) &&
            !self.env.visibility.is_same_package(def_class, &self.lookup_class) &&
            !is_same_package_member(self.env.visibility.as_ref(), def_class, &self.lookup_class)
    }

    fn cached(&self, key: MemberKey, make: impl FnOnce() -> Result<MethodHandle, InvokeError>) -> Result<MethodHandle, InvokeError> {
        let kind = key.kind;
        let described = format!("{}.{}{}", key.class.name(), key.name, key.method_type);
        let (mh, cache_hit) = self.env.member_cache.get_or_insert(key, make)?;
        tracing().trace_lookup(&kind.to_string(), &described, cache_hit);
        Ok(mh)
    }

    fn method_handle(&self, kind: ReferenceKind, ref_class: &Arc<RuntimeClass>, resolved: ResolvedMethod, special_caller: Option<&Arc<RuntimeClass>>, restrict: bool) -> Result<MethodHandle, InvokeError> {
        let def_class = resolved.class.clone();
        let mods = resolved.access_flags();
        self.check_access(kind, ref_class, &def_class, mods, &resolved)?;
        let declared = MethodType::from_descriptor(resolved.desc())?;
        self.check_signature(&declared, ref_class)?;
        let method_type = match kind {
            ReferenceKind::InvokeStatic => declared,
            ReferenceKind::NewInvokeSpecial => declared.change_return_type(JType::class(ref_class))?,
            ReferenceKind::InvokeSpecial => declared.insert_parameter_types(0, &[JType::class(special_caller.unwrap_or(ref_class))])?,
            _ => declared.insert_parameter_types(0, &[JType::class(ref_class)])?,
        };
        let key = MemberKey::new(ref_class, resolved.name(), &method_type, kind);
        let mh = self.cached(key, || {
            let handle_kind = match kind {
                ReferenceKind::InvokeStatic => HandleKind::Direct { method: resolved.clone(), mode: DirectMode::Static },
                ReferenceKind::NewInvokeSpecial => HandleKind::Direct { method: resolved.clone(), mode: DirectMode::Constructor },
                ReferenceKind::InvokeSpecial => HandleKind::Direct { method: resolved.clone(), mode: DirectMode::Special },
                _ if resolved.is_private() => HandleKind::Direct { method: resolved.clone(), mode: DirectMode::Special },
                _ => HandleKind::Virtual {
                    method: resolved.clone(),
                    dispatch_class: ref_class.clone(),
                    interface: kind == ReferenceKind::InvokeInterface,
                },
            };
            let mh = MethodHandle::new(method_type.clone(), handle_kind);
            match (resolved.is_varargs(), method_type.last_parameter_type()) {
                (true, Some(last)) if last.is_array() => mh.as_varargs_collector(last.clone()),
                _ => Ok(mh)
            }
        })?;
        let narrows = restrict && kind.has_receiver() && kind != ReferenceKind::InvokeSpecial && self.restricts_protected_receiver(&def_class, mods);
        if narrows {
            let narrowed = mh.type_().change_parameter_type(0, JType::class(&self.lookup_class))?;
            return mh.clone_with_new_type(&narrowed);
        }
        Ok(mh)
    }

    fn field_handle(&self, kind: ReferenceKind, ref_class: &Arc<RuntimeClass>, resolved: ResolvedField, restrict: bool) -> Result<MethodHandle, InvokeError> {
        let def_class = resolved.class.clone();
        let mods = resolved.access_flags();
        self.check_access(kind, ref_class, &def_class, mods, &resolved)?;
        let field_type = resolved.field_type().clone();
        let receiver = JType::class(ref_class);
        let method_type = match kind {
            ReferenceKind::GetStatic => MethodType::of(field_type, vec![])?,
            ReferenceKind::PutStatic => MethodType::of(JType::Void, vec![field_type])?,
            ReferenceKind::GetField => MethodType::of(field_type, vec![receiver])?,
            _ => MethodType::of(JType::Void, vec![receiver, field_type])?,
        };
        self.check_signature(&method_type, ref_class)?;
        let key = MemberKey::new(ref_class, resolved.name(), &method_type, kind);
        let access = self.env.field_access.clone();
        let is_static = kind.is_static();
        let mh = self.cached(key, || {
            let handle_kind = if kind.is_getter() {
                HandleKind::FieldGetter { field: resolved.clone(), is_static, access }
            } else {
                HandleKind::FieldSetter { field: resolved.clone(), is_static, access }
            };
            Ok(MethodHandle::new(method_type.clone(), handle_kind))
        })?;
        if restrict && !is_static && self.restricts_protected_receiver(&def_class, mods) {
            let narrowed = mh.type_().change_parameter_type(0, JType::class(&self.lookup_class))?;
            return mh.clone_with_new_type(&narrowed);
        }
        Ok(mh)
    }

    /// Resolves `name` through the lookup class's loader.
    pub fn find_class(&self, name: &str) -> Result<Arc<RuntimeClass>, InvokeError> {
        let class = self.env.classes.lookup_class(self.lookup_class.loader(), name)
            .ok_or_else(|| ResolutionError::NoSuchClass(name.to_string()))?;
        self.check_symbolic_class(&class)?;
        Ok(class)
    }

    pub fn find_static(&self, ref_class: &Arc<RuntimeClass>, name: &str, method_type: &MethodType) -> Result<MethodHandle, InvokeError> {
        self.check_symbolic_class(ref_class)?;
        let resolved = self.env.resolver.resolve_method(ref_class, name, &method_type.to_method_descriptor(), MethodSearch::Static)?;
        self.method_handle(ReferenceKind::InvokeStatic, ref_class, resolved, None, true)
    }

    fn find_virtual_impl(&self, ref_class: &Arc<RuntimeClass>, name: &str, method_type: &MethodType, restrict: bool) -> Result<MethodHandle, InvokeError> {
        self.check_symbolic_class(ref_class)?;
        let (search, kind) = if ref_class.is_interface() {
            (MethodSearch::Interface, ReferenceKind::InvokeInterface)
        } else {
            (MethodSearch::Virtual, ReferenceKind::InvokeVirtual)
        };
        let resolved = self.env.resolver.resolve_method(ref_class, name, &method_type.to_method_descriptor(), search)?;
        self.method_handle(kind, ref_class, resolved, None, restrict)
    }

    /// The receiver becomes the leading parameter. Private methods are called directly.
    pub fn find_virtual(&self, ref_class: &Arc<RuntimeClass>, name: &str, method_type: &MethodType) -> Result<MethodHandle, InvokeError> {
        self.find_virtual_impl(ref_class, name, method_type, true)
    }

    /// Calls the method in `ref_class` without virtual dispatch, with `special_caller` as the
    /// receiver type. Only the lookup class itself may do this.
    pub fn find_special(&self, ref_class: &Arc<RuntimeClass>, name: &str, method_type: &MethodType, special_caller: &Arc<RuntimeClass>) -> Result<MethodHandle, InvokeError> {
        self.check_special_caller(ref_class, special_caller)?;
        self.check_symbolic_class(ref_class)?;
        let resolved = self.env.resolver.resolve_method(ref_class, name, &method_type.to_method_descriptor(), MethodSearch::Special)?;
        self.method_handle(ReferenceKind::InvokeSpecial, ref_class, resolved, Some(special_caller), true)
    }

    fn check_special_caller(&self, ref_class: &Arc<RuntimeClass>, special_caller: &Arc<RuntimeClass>) -> Result<(), InvokeError> {
        if self.trusted {
            return Ok(());
        }
        if !self.has_private_access() || !Arc::ptr_eq(special_caller, &self.lookup_class) {
            return Err(self.deny(format!("no private access for invokespecial as {}", special_caller.name())));
        }
        if !is_subclass_of(special_caller, ref_class) {
            return Err(self.deny(format!("{} is not a subclass of {}", special_caller.name(), ref_class.name())));
        }
        Ok(())
    }

    /// `method_type` has a void return; the handle returns the new instance.
    pub fn find_constructor(&self, ref_class: &Arc<RuntimeClass>, method_type: &MethodType) -> Result<MethodHandle, InvokeError> {
        self.check_symbolic_class(ref_class)?;
        if !method_type.rtype().is_void() {
            return Err(InvokeError::InvalidSignature(format!("constructor type {} must return void", method_type)));
        }
        let resolved = self.env.resolver.resolve_constructor(ref_class, &method_type.to_method_descriptor())?;
        self.method_handle(ReferenceKind::NewInvokeSpecial, ref_class, resolved, None, true)
    }

    pub fn find_getter(&self, ref_class: &Arc<RuntimeClass>, name: &str, field_type: &JType) -> Result<MethodHandle, InvokeError> {
        self.find_field(ReferenceKind::GetField, ref_class, name, field_type)
    }

    pub fn find_setter(&self, ref_class: &Arc<RuntimeClass>, name: &str, field_type: &JType) -> Result<MethodHandle, InvokeError> {
        self.find_field(ReferenceKind::PutField, ref_class, name, field_type)
    }

    pub fn find_static_getter(&self, ref_class: &Arc<RuntimeClass>, name: &str, field_type: &JType) -> Result<MethodHandle, InvokeError> {
        self.find_field(ReferenceKind::GetStatic, ref_class, name, field_type)
    }

    pub fn find_static_setter(&self, ref_class: &Arc<RuntimeClass>, name: &str, field_type: &JType) -> Result<MethodHandle, InvokeError> {
        self.find_field(ReferenceKind::PutStatic, ref_class, name, field_type)
    }

    fn find_field(&self, kind: ReferenceKind, ref_class: &Arc<RuntimeClass>, name: &str, field_type: &JType) -> Result<MethodHandle, InvokeError> {
        self.check_symbolic_class(ref_class)?;
        let resolved = self.env.resolver.resolve_field(ref_class, name, field_type, kind.is_static())?;
        self.field_handle(kind, ref_class, resolved, true)
    }

    /// A virtual handle on the receiver's class with the receiver already bound.
    pub fn bind(&self, receiver: &ObjectRef, name: &str, method_type: &MethodType) -> Result<MethodHandle, InvokeError> {
        let mh = self.find_virtual_impl(receiver.class(), name, method_type, false)?;
        let fixed = mh.as_fixed_arity();
        let bound = fixed.bind_to(Value::Object(receiver.clone()))?;
        match (mh.is_varargs_collector(), bound.type_().last_parameter_type()) {
            (true, Some(last)) => bound.as_varargs_collector(last.clone()),
            _ => Ok(bound)
        }
    }

    pub fn unreflect(&self, method: &ResolvedMethod) -> Result<MethodHandle, InvokeError> {
        let ref_class = method.class.clone();
        self.check_symbolic_class(&ref_class)?;
        let kind = if method.is_static() {
            ReferenceKind::InvokeStatic
        } else if ref_class.is_interface() {
            ReferenceKind::InvokeInterface
        } else {
            ReferenceKind::InvokeVirtual
        };
        self.method_handle(kind, &ref_class, method.clone(), None, true)
    }

    pub fn unreflect_special(&self, method: &ResolvedMethod, special_caller: &Arc<RuntimeClass>) -> Result<MethodHandle, InvokeError> {
        let ref_class = method.class.clone();
        self.check_special_caller(&ref_class, special_caller)?;
        self.check_symbolic_class(&ref_class)?;
        if method.is_static() {
            return Err(ResolutionError::IncompatibleClassChange(format!("{:?} is static", method)).into());
        }
        self.method_handle(ReferenceKind::InvokeSpecial, &ref_class, method.clone(), Some(special_caller), true)
    }

    pub fn unreflect_constructor(&self, constructor: &ResolvedMethod) -> Result<MethodHandle, InvokeError> {
        let ref_class = constructor.class.clone();
        self.check_symbolic_class(&ref_class)?;
        if ref_class.is_abstract() || ref_class.is_interface() {
            return Err(ResolutionError::Instantiation(ref_class.name().to_string()).into());
        }
        if !constructor.method().is_constructor() {
            return Err(ResolutionError::NoSuchMethod(format!("{:?} is not a constructor", constructor)).into());
        }
        self.method_handle(ReferenceKind::NewInvokeSpecial, &ref_class, constructor.clone(), None, true)
    }

    pub fn unreflect_getter(&self, field: &ResolvedField) -> Result<MethodHandle, InvokeError> {
        let kind = if field.is_static() { ReferenceKind::GetStatic } else { ReferenceKind::GetField };
        self.unreflect_field(kind, field)
    }

    pub fn unreflect_setter(&self, field: &ResolvedField) -> Result<MethodHandle, InvokeError> {
        let kind = if field.is_static() { ReferenceKind::PutStatic } else { ReferenceKind::PutField };
        self.unreflect_field(kind, field)
    }

    fn unreflect_field(&self, kind: ReferenceKind, field: &ResolvedField) -> Result<MethodHandle, InvokeError> {
        let ref_class = field.class.clone();
        self.check_symbolic_class(&ref_class)?;
        trace!("unreflecting {:?} as {}", field, kind);
        self.field_handle(kind, &ref_class, field.clone(), true)
    }
}

fn mods_static(mods: u16) -> bool {
    mods & ACC_STATIC != 0
}

impl Debug for Lookup {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.trusted {
            return write!(f, "{}/trusted", self.lookup_class.name());
        }
        match self.allowed_modes {
            ALL_MODES => write!(f, "{}", self.lookup_class.name()),
            0 => write!(f, "{}/noaccess", self.lookup_class.name()),
            PUBLIC => write!(f, "{}/public", self.lookup_class.name()),
            modes => write!(f, "{}/{:#x}", self.lookup_class.name(), modes),
        }
    }
}
