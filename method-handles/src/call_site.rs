use std::fmt::{Debug, Formatter};
use std::sync::atomic::{fence, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::comparator::structurally_equivalent;
use crate::error::InvokeError;
use crate::handle::{HandleKind, MethodHandle};
use crate::method_handles::unlinked;
use crate::method_type::MethodType;
use crate::tracing::tracing;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CallSiteKind {
    Constant,
    Mutable,
    Volatile,
}

enum TargetCell {
    Constant(OnceLock<MethodHandle>),
    Mutable(RwLock<MethodHandle>),
    Volatile(RwLock<MethodHandle>),
}

struct CallSiteInner {
    method_type: MethodType,
    target: TargetCell,
    //bumped whenever a retarget cannot be done in place
    epoch: AtomicU64,
    fast_swaps: AtomicUsize,
    invalidations: AtomicUsize,
}

#[derive(Clone)]
pub struct CallSite(Arc<CallSiteInner>);

impl CallSite {
    fn new(method_type: MethodType, target: TargetCell) -> Self {
        Self(Arc::new(CallSiteInner {
            method_type,
            target,
            epoch: AtomicU64::new(0),
            fast_swaps: AtomicUsize::new(0),
            invalidations: AtomicUsize::new(0),
        }))
    }

    pub fn constant(target: MethodHandle) -> Self {
        let method_type = target.type_().clone();
        Self::new(method_type, TargetCell::Constant(OnceLock::from(target)))
    }

    /// Binds a constant site to whatever `hook` computes. The site is visible to the hook but
    /// reading its target from inside the hook fails with `NotYetBound`.
    pub fn constant_with_hook(method_type: MethodType, hook: impl FnOnce(&CallSite) -> Result<MethodHandle, InvokeError>) -> Result<Self, InvokeError> {
        let site = Self::new(method_type, TargetCell::Constant(OnceLock::new()));
        let target = hook(&site)?;
        check_target_type(&site, &target)?;
        if let TargetCell::Constant(cell) = &site.0.target {
            if cell.set(target).is_err() {
                return Err(InvokeError::IllegalState("constant call site bound twice".to_string()));
            }
        }
        Ok(site)
    }

    pub fn mutable(target: MethodHandle) -> Self {
        let method_type = target.type_().clone();
        Self::new(method_type, TargetCell::Mutable(RwLock::new(target)))
    }

    pub fn mutable_unlinked(method_type: MethodType) -> Self {
        let target = unlinked(&method_type, "call site not linked");
        Self::new(method_type, TargetCell::Mutable(RwLock::new(target)))
    }

    pub fn volatile(target: MethodHandle) -> Self {
        let method_type = target.type_().clone();
        Self::new(method_type, TargetCell::Volatile(RwLock::new(target)))
    }

    pub fn volatile_unlinked(method_type: MethodType) -> Self {
        let target = unlinked(&method_type, "call site not linked");
        Self::new(method_type, TargetCell::Volatile(RwLock::new(target)))
    }

    pub fn kind(&self) -> CallSiteKind {
        match &self.0.target {
            TargetCell::Constant(_) => CallSiteKind::Constant,
            TargetCell::Mutable(_) => CallSiteKind::Mutable,
            TargetCell::Volatile(_) => CallSiteKind::Volatile,
        }
    }

    pub fn type_(&self) -> &MethodType {
        &self.0.method_type
    }

    pub fn is_same_site(&self, other: &CallSite) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn get_target(&self) -> Result<MethodHandle, InvokeError> {
        match &self.0.target {
            TargetCell::Constant(cell) => cell.get().cloned().ok_or(InvokeError::NotYetBound),
            TargetCell::Mutable(target) => Ok(target.read().clone()),
            TargetCell::Volatile(target) => {
                let res = target.read().clone();
                fence(Ordering::SeqCst);
                Ok(res)
            }
        }
    }

    pub fn set_target(&self, new_target: MethodHandle) -> Result<(), InvokeError> {
        let target = match &self.0.target {
            TargetCell::Constant(_) => return Err(InvokeError::UnsupportedOperation("constant call site cannot be retargeted".to_string())),
            TargetCell::Mutable(target) | TargetCell::Volatile(target) => target,
        };
        check_target_type(self, &new_target)?;
        let volatile = self.kind() == CallSiteKind::Volatile;
        if volatile {
            fence(Ordering::SeqCst);
        }
        let mut guard = target.write();
        let fast_swap = structurally_equivalent(&guard, &new_target);
        if fast_swap {
            self.0.fast_swaps.fetch_add(1, Ordering::Relaxed);
        } else {
            self.0.epoch.fetch_add(1, Ordering::SeqCst);
            self.0.invalidations.fetch_add(1, Ordering::Relaxed);
        }
        *guard = new_target;
        drop(guard);
        if volatile {
            fence(Ordering::SeqCst);
        }
        tracing().trace_relink(self, fast_swap, self.epoch());
        Ok(())
    }

    /// A handle that always calls the current target. Constant sites hand out the target itself.
    pub fn dynamic_invoker(&self) -> Result<MethodHandle, InvokeError> {
        match &self.0.target {
            TargetCell::Constant(_) => self.get_target(),
            TargetCell::Mutable(_) | TargetCell::Volatile(_) => {
                Ok(MethodHandle::new(self.type_().clone(), HandleKind::DynamicInvoker { site: self.clone() }))
            }
        }
    }

    pub fn epoch(&self) -> u64 {
        self.0.epoch.load(Ordering::SeqCst)
    }

    pub fn fast_swaps(&self) -> usize {
        self.0.fast_swaps.load(Ordering::Relaxed)
    }

    pub fn invalidations(&self) -> usize {
        self.0.invalidations.load(Ordering::Relaxed)
    }

    /// Blocks until every `set_target` that completed on these sites is visible to all threads.
    pub fn sync_all(sites: &[CallSite]) {
        for site in sites {
            match &site.0.target {
                TargetCell::Constant(_) => {}
                TargetCell::Mutable(target) | TargetCell::Volatile(target) => {
                    drop(target.write());
                }
            }
        }
        fence(Ordering::SeqCst);
    }
}

fn check_target_type(site: &CallSite, target: &MethodHandle) -> Result<(), InvokeError> {
    if target.type_() != site.type_() {
        return Err(InvokeError::IncompatibleSignature(format!("target {} does not match call site {}", target.type_(), site.type_())));
    }
    Ok(())
}

impl Debug for CallSite {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}CallSite{}", self.kind(), self.type_())
    }
}
