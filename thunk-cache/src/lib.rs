use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::trace;
use parking_lot::{Condvar, Mutex};
use thiserror::Error;

#[cfg(test)]
pub mod test;

#[derive(Debug, Clone, Error)]
pub enum CompileError {
    #[error("unsupported shape: {0}")]
    UnsupportedShape(String),
    #[error("compiler failed: {0}")]
    Failed(String),
}

/// Turns a structural key into dispatch code. Called with no cache lock held.
pub trait ThunkCompiler<K, D>: Send + Sync {
    fn compile(&self, key: &K) -> Result<D, CompileError>;
}

impl<K, D, F: Fn(&K) -> Result<D, CompileError> + Send + Sync> ThunkCompiler<K, D> for F {
    fn compile(&self, key: &K) -> Result<D, CompileError> {
        self(key)
    }
}

struct InFlight {
    done: Mutex<bool>,
    condvar: Condvar,
}

enum Slot<D> {
    InFlight(Arc<InFlight>),
    Ready(Arc<D>),
}

/// Compile-once table. Entries live as long as the cache.
pub struct ThunkCache<K, D> {
    entries: Mutex<HashMap<K, Slot<D>>>,
    compilations: AtomicUsize,
}

impl<K: Clone + Eq + Hash + Debug, D> ThunkCache<K, D> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            compilations: AtomicUsize::new(0),
        }
    }

    /// Returns the compiled artifact for `key`, compiling it at most once across all threads. A
    /// failed compilation is reported to the thread that ran it; waiters retry.
    pub fn get(&self, key: &K, compiler: &dyn ThunkCompiler<K, D>) -> Result<Arc<D>, CompileError> {
        loop {
            let in_flight = {
                let mut guard = self.entries.lock();
                match guard.get(key) {
                    Some(Slot::Ready(compiled)) => return Ok(compiled.clone()),
                    Some(Slot::InFlight(in_flight)) => Err(in_flight.clone()),
                    None => {
                        let in_flight = Arc::new(InFlight { done: Mutex::new(false), condvar: Condvar::new() });
                        guard.insert(key.clone(), Slot::InFlight(in_flight.clone()));
                        Ok(in_flight)
                    }
                }
            };
            match in_flight {
                Ok(ours) => return self.compile_and_publish(key, compiler, ours),
                Err(theirs) => {
                    let mut done = theirs.done.lock();
                    while !*done {
                        theirs.condvar.wait(&mut done);
                    }
                }
            }
        }
    }

    fn compile_and_publish(&self, key: &K, compiler: &dyn ThunkCompiler<K, D>, in_flight: Arc<InFlight>) -> Result<Arc<D>, CompileError> {
        trace!("compiling thunk for {:?}", key);
        let res = compiler.compile(key).map(Arc::new);
        {
            let mut guard = self.entries.lock();
            match &res {
                Ok(compiled) => {
                    self.compilations.fetch_add(1, Ordering::SeqCst);
                    guard.insert(key.clone(), Slot::Ready(compiled.clone()));
                }
                Err(err) => {
                    trace!("thunk compilation for {:?} failed: {}", key, err);
                    guard.remove(key);
                }
            }
        }
        *in_flight.done.lock() = true;
        in_flight.condvar.notify_all();
        res
    }

    pub fn get_if_present(&self, key: &K) -> Option<Arc<D>> {
        match self.entries.lock().get(key) {
            Some(Slot::Ready(compiled)) => Some(compiled.clone()),
            _ => None
        }
    }

    /// Successful compilations so far.
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().values().filter(|slot| matches!(slot, Slot::Ready(_))).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K: Clone + Eq + Hash + Debug, D> Default for ThunkCache<K, D> {
    fn default() -> Self {
        Self::new()
    }
}
