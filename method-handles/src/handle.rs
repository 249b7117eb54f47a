use std::fmt::{Debug, Formatter};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use runtime_classes::field_access::RawFieldAccess;
use runtime_classes::instance_of::is_assignable;
use runtime_classes::resolution::{ResolvedField, ResolvedMethod};
use runtime_classes::types::JType;
use runtime_classes::value::Value;
use runtime_classes::RuntimeClass;

use crate::call_site::CallSite;
use crate::conversions::{plan_conversion, ValueConversion};
use crate::error::InvokeError;
use crate::method_handles::insert_arguments;
use crate::method_type::MethodType;
use crate::thunks::{CompiledThunk, VariantTag};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DirectMode {
    Static,
    Special,
    Constructor,
}

#[derive(Clone)]
pub enum HandleKind {
    Direct {
        method: ResolvedMethod,
        mode: DirectMode,
    },
    Virtual {
        method: ResolvedMethod,
        dispatch_class: Arc<RuntimeClass>,
        interface: bool,
    },
    FieldGetter {
        field: ResolvedField,
        is_static: bool,
        access: Arc<dyn RawFieldAccess>,
    },
    FieldSetter {
        field: ResolvedField,
        is_static: bool,
        access: Arc<dyn RawFieldAccess>,
    },
    Insert {
        target: MethodHandle,
        pos: usize,
        values: Vec<Value>,
    },
    Permute {
        target: MethodHandle,
        //target argument i is incoming argument reorder[i]
        reorder: Vec<usize>,
    },
    Collect {
        target: MethodHandle,
        pos: usize,
        count: usize,
        array_type: JType,
    },
    Spread {
        target: MethodHandle,
        pos: usize,
        count: usize,
        array_type: JType,
    },
    FilterArguments {
        target: MethodHandle,
        pos: usize,
        filters: Vec<Option<MethodHandle>>,
    },
    FilterReturn {
        target: MethodHandle,
        filter: MethodHandle,
    },
    Fold {
        target: MethodHandle,
        pos: usize,
        combiner: MethodHandle,
    },
    GuardWithTest {
        test: MethodHandle,
        target: MethodHandle,
        fallback: MethodHandle,
    },
    Catch {
        target: MethodHandle,
        exception_class: Arc<RuntimeClass>,
        handler: MethodHandle,
    },
    Convert {
        target: MethodHandle,
        args: Vec<ValueConversion>,
        ret: ValueConversion,
    },
    Constant {
        value: Value,
    },
    Identity,
    VarargsCollector {
        target: MethodHandle,
        array_type: JType,
        last_collector: Arc<Mutex<Option<(usize, MethodHandle)>>>,
    },
    DynamicInvoker {
        site: CallSite,
    },
    Unlinked {
        message: String,
    },
    Throw,
}

impl HandleKind {
    pub fn tag(&self) -> VariantTag {
        match self {
            HandleKind::Direct { .. } => VariantTag::Direct,
            HandleKind::Virtual { .. } => VariantTag::Virtual,
            HandleKind::FieldGetter { .. } => VariantTag::FieldGetter,
            HandleKind::FieldSetter { .. } => VariantTag::FieldSetter,
            HandleKind::Insert { .. } => VariantTag::Insert,
            HandleKind::Permute { .. } => VariantTag::Permute,
            HandleKind::Collect { .. } => VariantTag::Collect,
            HandleKind::Spread { .. } => VariantTag::Spread,
            HandleKind::FilterArguments { .. } => VariantTag::FilterArguments,
            HandleKind::FilterReturn { .. } => VariantTag::FilterReturn,
            HandleKind::Fold { .. } => VariantTag::Fold,
            HandleKind::GuardWithTest { .. } => VariantTag::GuardWithTest,
            HandleKind::Catch { .. } => VariantTag::Catch,
            HandleKind::Convert { .. } => VariantTag::Convert,
            HandleKind::Constant { .. } => VariantTag::Constant,
            HandleKind::Identity => VariantTag::Identity,
            HandleKind::VarargsCollector { .. } => VariantTag::VarargsCollector,
            HandleKind::DynamicInvoker { .. } => VariantTag::DynamicInvoker,
            HandleKind::Unlinked { .. } => VariantTag::Unlinked,
            HandleKind::Throw => VariantTag::Throw,
        }
    }
}

pub struct MethodHandleInner {
    method_type: MethodType,
    kind: HandleKind,
    thunk: OnceLock<Arc<CompiledThunk>>,
}

/// An immutable, typed callable. Combinators share children, so a handle graph is a DAG.
#[derive(Clone)]
pub struct MethodHandle(Arc<MethodHandleInner>);

impl MethodHandle {
    pub(crate) fn new(method_type: MethodType, kind: HandleKind) -> Self {
        Self(Arc::new(MethodHandleInner { method_type, kind, thunk: OnceLock::new() }))
    }

    pub fn type_(&self) -> &MethodType {
        &self.0.method_type
    }

    pub fn kind(&self) -> &HandleKind {
        &self.0.kind
    }

    pub fn is_same_handle(&self, other: &MethodHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn thunk_cell(&self) -> &OnceLock<Arc<CompiledThunk>> {
        &self.0.thunk
    }

    /// Same behaviour, new signature. Only legal when the erased calling convention is unchanged.
    pub(crate) fn clone_with_new_type(&self, new_type: &MethodType) -> Result<MethodHandle, InvokeError> {
        if new_type.erased_shape() != self.type_().erased_shape() {
            return Err(InvokeError::IncompatibleSignature(format!("{} does not erase like {}", new_type, self.type_())));
        }
        Ok(MethodHandle::new(new_type.clone(), self.kind().clone()))
    }

    pub fn as_type(&self, new_type: &MethodType) -> Result<MethodHandle, InvokeError> {
        if new_type == self.type_() {
            return Ok(self.clone());
        }
        if let HandleKind::VarargsCollector { target, array_type, last_collector } = self.kind() {
            return varargs_as_type(self, target, array_type, last_collector, new_type);
        }
        self.as_type_uncached(new_type)
    }

    fn as_type_uncached(&self, new_type: &MethodType) -> Result<MethodHandle, InvokeError> {
        let old_type = self.type_();
        let incompatible = || InvokeError::IncompatibleSignature(format!("cannot adapt {} to {}", old_type, new_type));
        if new_type.parameter_count() != old_type.parameter_count() {
            return Err(incompatible());
        }
        let args = new_type.ptypes().iter().zip(old_type.ptypes().iter())
            .map(|(from, to)| plan_conversion(from, to))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(incompatible)?;
        let ret = plan_conversion(old_type.rtype(), new_type.rtype()).ok_or_else(incompatible)?;
        if args.iter().all(|conversion| conversion.is_no_op()) && ret.is_no_op() {
            return self.clone_with_new_type(new_type);
        }
        Ok(MethodHandle::new(new_type.clone(), HandleKind::Convert { target: self.clone(), args, ret }))
    }

    pub fn bind_to(&self, value: Value) -> Result<MethodHandle, InvokeError> {
        if self.type_().parameter_count() == 0 {
            return Err(InvokeError::TypeMismatch(format!("{} has no leading parameter to bind", self.type_())));
        }
        insert_arguments(self, 0, vec![value])
    }

    pub fn as_collector(&self, array_type: JType, count: usize) -> Result<MethodHandle, InvokeError> {
        match self.type_().parameter_count() {
            0 => Err(InvokeError::IncompatibleSignature(format!("{} has no trailing array parameter", self.type_()))),
            n => self.as_collector_at(n - 1, array_type, count)
        }
    }

    /// Collects `count` arguments starting at `pos` into a fresh array passed as parameter `pos`.
    pub fn as_collector_at(&self, pos: usize, array_type: JType, count: usize) -> Result<MethodHandle, InvokeError> {
        let old_type = self.type_();
        if pos >= old_type.parameter_count() {
            return Err(InvokeError::InvalidSignature(format!("collector position {} out of range for {}", pos, old_type)));
        }
        let component = match array_type.array_component() {
            Some(component) => component.clone(),
            None => return Err(InvokeError::IncompatibleSignature(format!("{} is not an array type", array_type)))
        };
        if !is_assignable(&array_type, old_type.ptype(pos)) {
            return Err(InvokeError::IncompatibleSignature(format!("{} cannot be passed as {}", array_type, old_type.ptype(pos))));
        }
        let new_type = old_type.drop_parameter_types(pos, pos + 1)?.insert_parameter_types(pos, &vec![component; count])?;
        Ok(MethodHandle::new(new_type, HandleKind::Collect { target: self.clone(), pos, count, array_type }))
    }

    pub fn as_spreader(&self, array_type: JType, count: usize) -> Result<MethodHandle, InvokeError> {
        match self.type_().parameter_count().checked_sub(count) {
            Some(pos) => self.as_spreader_at(pos, array_type, count),
            None => Err(InvokeError::IncompatibleSignature(format!("{} has fewer than {} parameters", self.type_(), count)))
        }
    }

    /// Replaces parameters `pos..pos + count` by a single array whose elements are spread into them.
    pub fn as_spreader_at(&self, pos: usize, array_type: JType, count: usize) -> Result<MethodHandle, InvokeError> {
        let old_type = self.type_();
        if pos + count > old_type.parameter_count() {
            return Err(InvokeError::InvalidSignature(format!("cannot spread {} arguments at {} into {}", count, pos, old_type)));
        }
        let component = match array_type.array_component() {
            Some(component) => component.clone(),
            None => return Err(InvokeError::IncompatibleSignature(format!("{} is not an array type", array_type)))
        };
        for ptype in &old_type.ptypes()[pos..pos + count] {
            if plan_conversion(&component, ptype).is_none() {
                return Err(InvokeError::IncompatibleSignature(format!("{} elements cannot be passed as {}", array_type, ptype)));
            }
        }
        let new_type = old_type.drop_parameter_types(pos, pos + count)?.insert_parameter_types(pos, &[array_type.clone()])?;
        Ok(MethodHandle::new(new_type, HandleKind::Spread { target: self.clone(), pos, count, array_type }))
    }

    pub fn as_varargs_collector(&self, array_type: JType) -> Result<MethodHandle, InvokeError> {
        if let HandleKind::VarargsCollector { array_type: existing, .. } = self.kind() {
            if existing == &array_type {
                return Ok(self.clone());
            }
        }
        let last = match self.type_().last_parameter_type() {
            Some(last) => last,
            None => return Err(InvokeError::IncompatibleSignature(format!("{} has no trailing array parameter", self.type_())))
        };
        if !array_type.is_array() || !is_assignable(&array_type, last) {
            return Err(InvokeError::IncompatibleSignature(format!("{} cannot collect into {}", array_type, last)));
        }
        let target = self.as_fixed_arity();
        Ok(MethodHandle::new(self.type_().clone(), HandleKind::VarargsCollector {
            target,
            array_type,
            last_collector: Arc::new(Mutex::new(None)),
        }))
    }

    pub fn as_fixed_arity(&self) -> MethodHandle {
        match self.kind() {
            HandleKind::VarargsCollector { target, .. } => target.clone(),
            _ => self.clone()
        }
    }

    pub fn is_varargs_collector(&self) -> bool {
        matches!(self.kind(), HandleKind::VarargsCollector { .. })
    }
}

fn varargs_as_type(this: &MethodHandle, target: &MethodHandle, array_type: &JType, last_collector: &Mutex<Option<(usize, MethodHandle)>>, new_type: &MethodType) -> Result<MethodHandle, InvokeError> {
    let arity = this.type_().parameter_count();
    let requested = new_type.parameter_count();
    if requested == arity {
        if let (Some(last), Some(target_last)) = (new_type.last_parameter_type(), target.type_().last_parameter_type()) {
            if is_assignable(last, target_last) {
                return target.as_type(new_type);
            }
        }
    }
    if requested + 1 < arity {
        return Err(InvokeError::IncompatibleSignature(format!("{} needs at least {} arguments, {} requested", this.type_(), arity - 1, requested)));
    }
    let count = requested + 1 - arity;
    let collector = {
        let mut cache = last_collector.lock();
        match cache.as_ref() {
            Some((cached_count, collector)) if *cached_count == count => collector.clone(),
            _ => {
                let collector = target.as_collector(array_type.clone(), count)?;
                *cache = Some((count, collector.clone()));
                collector
            }
        }
    };
    collector.as_type(new_type)
}

impl Debug for MethodHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "MethodHandle{}<{}>", self.type_(), self.kind().tag())
    }
}
