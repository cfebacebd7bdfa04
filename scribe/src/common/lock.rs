use parking_lot::{Mutex, MutexGuard};
use std::collections::HashMap;
use std::sync::Arc;

/// A handle to one collection's lock that can be stored and reused
#[derive(Clone)]
pub struct LockHandle {
    lock: Arc<Mutex<()>>,
}

impl LockHandle {
    /// Acquires the lock, blocking until it is free.
    pub fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock()
    }

    #[cfg(test)]
    fn try_lock(&self) -> Option<MutexGuard<'_, ()>> {
        self.lock.try_lock()
    }

    #[cfg(test)]
    fn same_lock(&self, other: &LockHandle) -> bool {
        Arc::ptr_eq(&self.lock, &other.lock)
    }
}

/// Registry of named mutual-exclusion locks, one per collection.
///
/// Locks are created lazily on first request and never removed, so every
/// caller asking for the same name gets the same lock for the lifetime of
/// the registry. The registry map is guarded by its own mutex, held only
/// while looking up or inserting an entry and never while the returned lock
/// is in use.
///
/// The registry belongs to a single store instance; two stores in one
/// process never share locks.
///
/// # Examples
///
/// ```
/// use scribe::common::LockRegistry;
/// let lock_registry = LockRegistry::new();
/// let handle = lock_registry.get_lock("users");
/// {
///     let _guard = handle.lock();
/// } // Lock is held while _guard is in scope
/// assert_eq!(lock_registry.lock_count(), 1);
/// ```
#[derive(Clone)]
pub struct LockRegistry {
    locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl LockRegistry {
    /// Creates a new empty lock registry.
    pub fn new() -> Self {
        LockRegistry {
            locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Gets the lock for the given name, creating it if it doesn't exist.
    pub fn get_lock(&self, name: &str) -> LockHandle {
        let lock = {
            let mut locks = self.locks.lock();
            locks
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        LockHandle { lock }
    }

    /// Returns the number of locks currently registered.
    pub fn lock_count(&self) -> usize {
        let locks = self.locks.lock();
        locks.len()
    }
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
