use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use lazy_static::lazy_static;
use strum_macros::{Display, EnumIter};

use invoke_common::basic_type::{BasicType, ErasedShape};
use thunk_cache::{CompileError, ThunkCache, ThunkCompiler};

use crate::error::InvokeError;
use crate::handle::{DirectMode, HandleKind, MethodHandle};
use crate::invoke;
use crate::tracing::tracing;
use runtime_classes::value::Value;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Display, EnumIter)]
pub enum VariantTag {
    Direct,
    Virtual,
    FieldGetter,
    FieldSetter,
    Insert,
    Permute,
    Collect,
    Spread,
    FilterArguments,
    FilterReturn,
    Fold,
    GuardWithTest,
    Catch,
    Convert,
    Constant,
    Identity,
    VarargsCollector,
    DynamicInvoker,
    Unlinked,
    Throw,
}

/// Canonical shape of a handle: erased signature, variant and the structural scalars the entry
/// routine depends on. Handles with equal keys share one compiled thunk.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct ThunkKey {
    pub shape: ErasedShape,
    pub tag: VariantTag,
    pub layout: Vec<usize>,
}

impl ThunkKey {
    pub fn for_handle(mh: &MethodHandle) -> Self {
        let layout = match mh.kind() {
            HandleKind::Direct { mode, .. } => vec![match mode {
                DirectMode::Static => 0,
                DirectMode::Special => 1,
                DirectMode::Constructor => 2,
            }],
            HandleKind::Virtual { interface, .. } => vec![*interface as usize],
            HandleKind::FieldGetter { is_static, .. } | HandleKind::FieldSetter { is_static, .. } => vec![*is_static as usize],
            HandleKind::Insert { pos, values, .. } => vec![*pos, values.len()],
            HandleKind::Permute { reorder, .. } => reorder.clone(),
            HandleKind::Collect { pos, count, .. } | HandleKind::Spread { pos, count, .. } => vec![*pos, *count],
            HandleKind::FilterArguments { pos, filters, .. } => {
                let mut layout = vec![*pos];
                layout.extend(filters.iter().map(|filter| filter.is_some() as usize));
                layout
            }
            HandleKind::Fold { pos, combiner, .. } => vec![*pos, combiner.type_().parameter_count()],
            HandleKind::GuardWithTest { test, .. } => vec![test.type_().parameter_count()],
            HandleKind::Catch { handler, .. } => vec![handler.type_().parameter_count()],
            HandleKind::Convert { args, .. } => vec![args.len()],
            HandleKind::FilterReturn { .. } |
            HandleKind::Constant { .. } |
            HandleKind::Identity |
            HandleKind::VarargsCollector { .. } |
            HandleKind::DynamicInvoker { .. } |
            HandleKind::Unlinked { .. } |
            HandleKind::Throw => vec![],
        };
        Self { shape: mh.type_().erased_shape().clone(), tag: mh.kind().tag(), layout }
    }
}

pub type ThunkEntry = fn(&MethodHandle, Vec<Value>) -> Result<Value, InvokeError>;

/// Dispatch code for one canonical shape.
pub struct CompiledThunk {
    pub key: ThunkKey,
    pub entry: ThunkEntry,
    pub arg_slots: usize,
    pub ret: BasicType,
    pub id: usize,
}

impl CompiledThunk {
    pub fn call(&self, mh: &MethodHandle, args: Vec<Value>) -> Result<Value, InvokeError> {
        (self.entry)(mh, args)
    }
}

/// Selects the interpreter routine for a variant. Stands in for a code generator.
pub struct InterpretingCompiler {
    next_id: AtomicUsize,
}

impl InterpretingCompiler {
    pub fn new() -> Self {
        Self { next_id: AtomicUsize::new(0) }
    }
}

impl Default for InterpretingCompiler {
    fn default() -> Self {
        Self::new()
    }
}

pub fn entry_for(tag: VariantTag) -> ThunkEntry {
    match tag {
        VariantTag::Direct => invoke::invoke_direct,
        VariantTag::Virtual => invoke::invoke_virtual,
        VariantTag::FieldGetter => invoke::invoke_field_getter,
        VariantTag::FieldSetter => invoke::invoke_field_setter,
        VariantTag::Insert => invoke::invoke_insert,
        VariantTag::Permute => invoke::invoke_permute,
        VariantTag::Collect => invoke::invoke_collect,
        VariantTag::Spread => invoke::invoke_spread,
        VariantTag::FilterArguments => invoke::invoke_filter_arguments,
        VariantTag::FilterReturn => invoke::invoke_filter_return,
        VariantTag::Fold => invoke::invoke_fold,
        VariantTag::GuardWithTest => invoke::invoke_guard_with_test,
        VariantTag::Catch => invoke::invoke_catch,
        VariantTag::Convert => invoke::invoke_convert,
        VariantTag::Constant => invoke::invoke_constant,
        VariantTag::Identity => invoke::invoke_identity,
        VariantTag::VarargsCollector => invoke::invoke_varargs_collector,
        VariantTag::DynamicInvoker => invoke::invoke_dynamic_invoker,
        VariantTag::Unlinked => invoke::invoke_unlinked,
        VariantTag::Throw => invoke::invoke_throw,
    }
}

impl ThunkCompiler<ThunkKey, CompiledThunk> for InterpretingCompiler {
    fn compile(&self, key: &ThunkKey) -> Result<CompiledThunk, CompileError> {
        if key.shape.slot_count() > invoke_common::MAX_JVM_ARITY {
            return Err(CompileError::UnsupportedShape(key.shape.to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        tracing().trace_thunk_compile(key, id);
        Ok(CompiledThunk {
            key: key.clone(),
            entry: entry_for(key.tag),
            arg_slots: key.shape.slot_count(),
            ret: key.shape.ret,
            id,
        })
    }
}

lazy_static! {
    static ref THUNK_CACHE: ThunkCache<ThunkKey, CompiledThunk> = ThunkCache::new();
    static ref COMPILER: InterpretingCompiler = InterpretingCompiler::new();
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ThunkCacheStats {
    pub compilations: usize,
    pub cached: usize,
}

pub fn thunk_cache_stats() -> ThunkCacheStats {
    ThunkCacheStats { compilations: THUNK_CACHE.compilations(), cached: THUNK_CACHE.len() }
}

/// The compiled thunk for `mh`, fetched from the process-wide cache once per handle.
pub fn thunk_for(mh: &MethodHandle) -> Result<Arc<CompiledThunk>, InvokeError> {
    if let Some(thunk) = mh.thunk_cell().get() {
        return Ok(thunk.clone());
    }
    let compiled = THUNK_CACHE.get(&ThunkKey::for_handle(mh), &*COMPILER)?;
    Ok(mh.thunk_cell().get_or_init(|| compiled).clone())
}
