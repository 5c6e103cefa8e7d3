//! # Keyed Lock Map
//!
//! Identity-scoped mutual exclusion for operations that must serialize per
//! key (per user for default-address changes) without a global lock.
//!
//! ## How It Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        KeyedMutex                                   │
//! │                                                                     │
//! │  set_default(addr of user A) ──► lock("A") ─┐                      │
//! │  set_default(addr of user A) ──► lock("A") ─┤ serialized           │
//! │                                              │                      │
//! │  set_default(addr of user B) ──► lock("B") ───► runs in parallel   │
//! │                                                                     │
//! │  Map entry = Arc<tokio::sync::Mutex<()>>; the async mutex may be   │
//! │  held across await points (transaction round-trips). The map       │
//! │  itself is guarded by a short-lived parking_lot mutex.             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Idle entries are evicted when the map grows past a threshold: an entry
//! whose only reference is the map itself has no holder and no waiter, so
//! dropping it cannot lose a lock.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;

/// Map size at which idle entries are swept before inserting.
const SWEEP_THRESHOLD: usize = 64;

/// A map of per-key async mutexes.
#[derive(Debug, Default)]
pub struct KeyedMutex {
    entries: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl KeyedMutex {
    /// Creates an empty lock map.
    pub fn new() -> Self {
        KeyedMutex {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the mutex for `key`, creating it on first use.
    ///
    /// The caller locks the returned mutex; holding the returned `Arc` alone
    /// does not exclude anyone.
    pub fn get(&self, key: &str) -> Arc<AsyncMutex<()>> {
        let mut entries = self.entries.lock();

        if entries.len() >= SWEEP_THRESHOLD && !entries.contains_key(key) {
            entries.retain(|_, m| Arc::strong_count(m) > 1);
        }

        entries
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    /// Number of tracked keys (diagnostics).
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the map currently tracks no keys.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_key_serializes() {
        let locks = Arc::new(KeyedMutex::new());
        let counter = Arc::new(Mutex::new(0u32));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let m = locks.get("user-1");
                let _guard = m.lock().await;
                let before = *counter.lock();
                tokio::task::yield_now().await;
                *counter.lock() = before + 1;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        // Lost updates would show up as a count below 8.
        assert_eq!(*counter.lock(), 8);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_share_a_mutex() {
        let locks = KeyedMutex::new();
        let a = locks.get("user-a");
        let _held = a.lock().await;

        // A second key must be lockable while the first is held.
        let b = locks.get("user-b");
        assert!(b.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_idle_entries_are_swept() {
        let locks = KeyedMutex::new();
        for i in 0..SWEEP_THRESHOLD {
            // Guard dropped immediately: entry goes idle.
            let m = locks.get(&format!("user-{i}"));
            drop(m);
        }
        assert_eq!(locks.len(), SWEEP_THRESHOLD);

        // The next distinct key triggers a sweep of all idle entries.
        let _m = locks.get("one-more");
        assert_eq!(locks.len(), 1);
    }
}
