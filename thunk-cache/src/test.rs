use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use crate::{CompileError, ThunkCache};

#[test]
pub fn compiles_each_key_once_under_contention() {
    let cache: Arc<ThunkCache<String, usize>> = Arc::new(ThunkCache::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let barrier = Arc::new(Barrier::new(8));
    let handles = (0..8).map(|_| {
        let cache = cache.clone();
        let calls = calls.clone();
        let barrier = barrier.clone();
        thread::spawn(move || {
            barrier.wait();
            let compiler = |key: &String| -> Result<usize, CompileError> {
                calls.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(20));
                Ok(key.len())
            };
            *cache.get(&"LII_I".to_string(), &compiler).unwrap()
        })
    }).collect::<Vec<_>>();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 5);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.compilations(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
pub fn failed_compilation_is_not_cached() {
    let cache: ThunkCache<u32, u32> = ThunkCache::new();
    let failing = |_: &u32| -> Result<u32, CompileError> { Err(CompileError::Failed("no backend".to_string())) };
    assert!(cache.get(&1, &failing).is_err());
    assert!(cache.get_if_present(&1).is_none());
    assert!(cache.is_empty());
    let working = |key: &u32| -> Result<u32, CompileError> { Ok(key * 2) };
    assert_eq!(*cache.get(&1, &working).unwrap(), 2);
    assert_eq!(cache.compilations(), 1);
}

#[test]
pub fn distinct_keys_compile_separately() {
    let cache: ThunkCache<&'static str, String> = ThunkCache::new();
    let compiler = |key: &&'static str| -> Result<String, CompileError> { Ok(key.to_uppercase()) };
    let a = cache.get(&"a", &compiler).unwrap();
    let a_again = cache.get(&"a", &compiler).unwrap();
    let b = cache.get(&"b", &compiler).unwrap();
    assert!(Arc::ptr_eq(&a, &a_again));
    assert_eq!(b.as_str(), "B");
    assert_eq!(cache.len(), 2);
}
