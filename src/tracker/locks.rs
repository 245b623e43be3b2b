//! Per-key async mutexes.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::types::SeriesKey;

type LockMap = HashMap<SeriesKey, Arc<AsyncMutex<()>>>;

/// A set of async mutexes, one per series key, created on demand.
///
/// Entries are dropped again once nobody holds or waits on them, so the map
/// only grows with the number of keys in flight.
#[derive(Debug, Default)]
pub(crate) struct KeyLocks {
    locks: Mutex<LockMap>,
}

impl KeyLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `key`.
    pub(crate) async fn acquire(&self, key: &SeriesKey) -> KeyGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        let guard = lock.lock_owned().await;
        KeyGuard {
            locks: self,
            key: key.clone(),
            guard: Some(guard),
        }
    }

    fn release(&self, key: &SeriesKey) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks.get(key).is_some_and(|lock| Arc::strong_count(lock) == 1) {
            locks.remove(key);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Holds one key's mutex until dropped.
pub(crate) struct KeyGuard<'a> {
    locks: &'a KeyLocks,
    key: SeriesKey,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        // release the mutex before checking whether the entry is still shared
        self.guard.take();
        self.locks.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Exchange;
    use std::time::Duration;

    #[tokio::test]
    async fn test_entries_are_removed_after_release() {
        let locks = KeyLocks::new();
        let key = SeriesKey::tick("a", Exchange::Sse);
        {
            let _guard = locks.acquire(&key).await;
            assert_eq!(locks.len(), 1);
        }
        assert_eq!(locks.len(), 0);
    }

    #[tokio::test]
    async fn test_distinct_keys_do_not_block() {
        let locks = KeyLocks::new();
        let a = SeriesKey::tick("a", Exchange::Sse);
        let b = SeriesKey::tick("b", Exchange::Sse);

        let _guard_a = locks.acquire(&a).await;
        let acquired = tokio::time::timeout(Duration::from_millis(100), locks.acquire(&b)).await;
        assert!(acquired.is_ok());
    }

    #[tokio::test]
    async fn test_same_key_blocks() {
        let locks = KeyLocks::new();
        let a = SeriesKey::tick("a", Exchange::Sse);

        let _guard = locks.acquire(&a).await;
        let acquired = tokio::time::timeout(Duration::from_millis(50), locks.acquire(&a)).await;
        assert!(acquired.is_err());
        assert_eq!(locks.len(), 1);
    }
}
