use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// A collection lock handle. Clones share the same underlying mutex.
pub type CollectionLock = Arc<Mutex<()>>;

/// Issues one exclusive lock per collection name.
///
/// Entries are created on first request and live as long as the registry.
/// The registry mutex is held only for the lookup-or-insert, never while a
/// collection lock is in use, so unrelated collections do not contend.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<String, CollectionLock>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock of `collection`, creating it if needed.
    pub fn lock_for(&self, collection: &str) -> CollectionLock {
        let mut locks = self.locks.lock();
        if let Some(lock) = locks.get(collection) {
            return Arc::clone(lock);
        }
        let lock = CollectionLock::default();
        locks.insert(collection.to_string(), Arc::clone(&lock));
        lock
    }

    /// Number of collections a lock has been issued for.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_same_name_same_lock() {
        let registry = LockRegistry::new();
        let first = registry.lock_for("users");
        let second = registry.lock_for("users");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_different_names_different_locks() {
        let registry = LockRegistry::new();
        let users = registry.lock_for("users");
        let orders = registry.lock_for("orders");
        assert!(!Arc::ptr_eq(&users, &orders));
        assert_eq!(registry.len(), 2);

        // holding one does not block the other
        let _users_guard = users.lock();
        assert!(orders.try_lock().is_some());
    }

    #[test]
    fn test_entries_are_never_evicted() {
        let registry = LockRegistry::new();
        assert!(registry.is_empty());
        {
            let _lock = registry.lock_for("users");
        }
        assert_eq!(registry.len(), 1);
        let _again = registry.lock_for("users");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_lookup_while_collection_locked() {
        let registry = Arc::new(LockRegistry::new());
        let users = registry.lock_for("users");
        let _guard = users.lock();

        let (tx, rx) = mpsc::channel();
        let worker = {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let same = registry.lock_for("users");
                let other = registry.lock_for("orders");
                let _other_guard = other.lock();
                tx.send(same.is_locked()).unwrap();
            })
        };

        let locked = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert!(locked);
        worker.join().unwrap();
    }

    #[test]
    fn test_concurrent_creation_yields_one_lock() {
        let registry = Arc::new(LockRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.lock_for("shared"))
            })
            .collect();

        let locks: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(locks.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
        assert_eq!(registry.len(), 1);
    }
}
