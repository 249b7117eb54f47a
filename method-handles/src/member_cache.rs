use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use by_address::ByAddress;
use parking_lot::RwLock;

use invoke_common::ref_kinds::ReferenceKind;
use runtime_classes::RuntimeClass;

use crate::error::InvokeError;
use crate::handle::MethodHandle;
use crate::method_type::MethodType;

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct MemberKey {
    pub class: ByAddress<Arc<RuntimeClass>>,
    pub name: String,
    //the handle's own signature, so receiver narrowing and special callers get their own entries
    pub method_type: MethodType,
    pub kind: ReferenceKind,
}

impl MemberKey {
    pub fn new(class: &Arc<RuntimeClass>, name: &str, method_type: &MethodType, kind: ReferenceKind) -> Self {
        Self { class: ByAddress(class.clone()), name: name.to_string(), method_type: method_type.clone(), kind }
    }
}

/// Direct member handles per class, insert-if-absent. Access checks are the caller's job and run
/// on every lookup whether or not the entry exists.
pub struct MemberHandleCache {
    enabled: bool,
    handles: RwLock<HashMap<MemberKey, MethodHandle>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl MemberHandleCache {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, handles: RwLock::new(HashMap::new()), hits: AtomicUsize::new(0), misses: AtomicUsize::new(0) }
    }

    pub fn get_or_insert(&self, key: MemberKey, make: impl FnOnce() -> Result<MethodHandle, InvokeError>) -> Result<(MethodHandle, bool), InvokeError> {
        if !self.enabled {
            return Ok((make()?, false));
        }
        if let Some(existing) = self.handles.read().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok((existing.clone(), true));
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let made = make()?;
        let mut guard = self.handles.write();
        let res = guard.entry(key).or_insert(made).clone();
        Ok((res, false))
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.handles.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
