use std::sync::atomic::{AtomicBool, Ordering};

use lazy_static::lazy_static;
use log::{debug, trace};

use crate::options::InvokeOptions;

pub struct TracingSettings {
    trace_thunk_compiles: AtomicBool,
    trace_access_checks: AtomicBool,
    trace_lookups: AtomicBool,
    trace_relink: AtomicBool,
}

lazy_static! {
    static ref TRACING: TracingSettings = TracingSettings::disabled();
}

/// Process-wide settings. Handles and call sites are not tied to an environment, so the flags
/// live here and environments install theirs on creation.
pub fn tracing() -> &'static TracingSettings {
    &TRACING
}

impl TracingSettings {
    pub fn new() -> Self {
        Self {
            trace_thunk_compiles: AtomicBool::new(false),
            trace_access_checks: AtomicBool::new(false),
            trace_lookups: AtomicBool::new(false),
            trace_relink: AtomicBool::new(true),
        }
    }

    pub fn disabled() -> Self {
        Self {
            trace_thunk_compiles: AtomicBool::new(false),
            trace_access_checks: AtomicBool::new(false),
            trace_lookups: AtomicBool::new(false),
            trace_relink: AtomicBool::new(false),
        }
    }

    pub fn install(&self, options: &InvokeOptions) {
        self.trace_thunk_compiles.store(options.trace_thunk_compiles, Ordering::Relaxed);
        self.trace_access_checks.store(options.trace_access_checks, Ordering::Relaxed);
        self.trace_lookups.store(options.trace_lookups, Ordering::Relaxed);
        self.trace_relink.store(options.trace_relink, Ordering::Relaxed);
    }

    pub fn trace_thunk_compile(&self, key: &dyn std::fmt::Debug, id: usize) {
        if self.trace_thunk_compiles.load(Ordering::Relaxed) {
            debug!("compiled thunk #{} for {:?}", id, key);
        }
    }

    pub fn trace_access_check(&self, lookup: &dyn std::fmt::Debug, member: &dyn std::fmt::Debug, allowed: bool) {
        if self.trace_access_checks.load(Ordering::Relaxed) {
            trace!("access check {:?} -> {:?}: {}", lookup, member, if allowed { "allowed" } else { "denied" });
        }
    }

    pub fn trace_lookup(&self, kind: &str, member: &dyn std::fmt::Debug, cache_hit: bool) {
        if self.trace_lookups.load(Ordering::Relaxed) {
            trace!("{} {:?}{}", kind, member, if cache_hit { " (cached)" } else { "" });
        }
    }

    pub fn trace_relink(&self, site: &dyn std::fmt::Debug, fast_swap: bool, epoch: u64) {
        if self.trace_relink.load(Ordering::Relaxed) {
            if fast_swap {
                debug!("relinked {:?} in place", site);
            } else {
                debug!("invalidated {:?}, epoch now {}", site, epoch);
            }
        }
    }
}

impl Default for TracingSettings {
    fn default() -> Self {
        Self::new()
    }
}
