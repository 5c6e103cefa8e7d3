//! # Sliding-Window Rate Limiter
//!
//! Per-identity request caps over a moving time window.
//!
//! ## Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │            allow(key, window = 60s, max = 100)                      │
//! │                                                                     │
//! │  per key: [t1, t2, t3, ...]   timestamps of admitted requests      │
//! │                                                                     │
//! │  on each call at `now`:                                             │
//! │    1. drop timestamps with now - t >= window   (window slides)     │
//! │    2. fewer than max remain?  → record `now`, admit                 │
//! │       otherwise               → reject, record nothing              │
//! │                                                                     │
//! │  The boundary moves with "now" on every call - this is a sliding   │
//! │  window log, not a fixed bucket that resets on the minute.         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rejected requests are not recorded, so a flood of rejects cannot extend
//! its own punishment.
//!
//! ## Ownership and Sharding
//! The log is an explicitly owned structure, handed to whoever needs it -
//! never ambient module state. Keys are striped across a fixed set of
//! mutex-guarded shards so unrelated identities do not contend, and each
//! shard periodically sweeps identities whose entire log has aged out, which
//! bounds memory growth.

use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, VecDeque};
use std::hash::{Hash, Hasher};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::debug;

/// Number of independent shards. Power of two, sized for low contention at
/// the request rates this layer sees.
const SHARD_COUNT: usize = 16;

/// A shard sweeps its stale identities every this many operations.
const SWEEP_EVERY: u64 = 64;

#[derive(Debug, Default)]
struct Shard {
    entries: HashMap<String, VecDeque<Instant>>,
    ops: u64,
}

/// Sliding-window request limiter, striped by identity key.
#[derive(Debug)]
pub struct RateLimiter {
    shards: Vec<Mutex<Shard>>,
}

impl RateLimiter {
    /// Creates a limiter with the default shard count.
    pub fn new() -> Self {
        Self::with_shards(SHARD_COUNT)
    }

    /// Creates a limiter with an explicit shard count (minimum 1).
    pub fn with_shards(count: usize) -> Self {
        let count = count.max(1);
        let shards = (0..count).map(|_| Mutex::new(Shard::default())).collect();
        RateLimiter { shards }
    }

    /// Admits or rejects a request for `key` under the given window and cap.
    ///
    /// ## Returns
    /// * `true` - request admitted and recorded
    /// * `false` - cap reached inside the window; nothing recorded
    pub fn allow(&self, key: &str, window_seconds: u64, max_requests: usize) -> bool {
        self.allow_at(key, Instant::now(), window_seconds, max_requests)
    }

    /// Number of identities currently tracked (diagnostics).
    pub fn tracked_keys(&self) -> usize {
        self.shards.iter().map(|s| s.lock().entries.len()).sum()
    }

    fn allow_at(&self, key: &str, now: Instant, window_seconds: u64, max_requests: usize) -> bool {
        let window = Duration::from_secs(window_seconds);
        let mut shard = self.shards[self.shard_index(key)].lock();

        shard.ops = shard.ops.wrapping_add(1);
        if shard.ops % SWEEP_EVERY == 0 {
            Self::sweep(&mut shard, now, window);
        }

        let log = shard.entries.entry(key.to_string()).or_default();

        // Slide the window: anything at least `window` old no longer counts.
        while let Some(&oldest) = log.front() {
            if now.duration_since(oldest) >= window {
                log.pop_front();
            } else {
                break;
            }
        }

        if log.len() >= max_requests {
            debug!(key = %key, in_window = log.len(), "Rate limit exceeded");
            return false;
        }

        log.push_back(now);
        true
    }

    /// Drops identities whose newest admitted request has aged out of the
    /// window entirely.
    fn sweep(shard: &mut Shard, now: Instant, window: Duration) {
        shard.entries.retain(|_, log| {
            log.back()
                .is_some_and(|&newest| now.duration_since(newest) < window)
        });
    }

    fn shard_index(&self, key: &str) -> usize {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        (hasher.finish() as usize) % self.shards.len()
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        RateLimiter::new()
    }
}

/// Composes the limiter identity for a request: resolved IP plus endpoint
/// path. Two endpoints never share a budget, and neither do two IPs.
pub fn identity_key(ip: &str, endpoint: &str) -> String {
    format!("{ip}:{endpoint}")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admits_up_to_cap_then_rejects() {
        let limiter = RateLimiter::new();
        let base = Instant::now();

        for _ in 0..100 {
            assert!(limiter.allow_at("k", base, 60, 100));
        }
        assert!(!limiter.allow_at("k", base, 60, 100));
    }

    #[test]
    fn test_window_slides_and_frees_slots() {
        let limiter = RateLimiter::new();
        let base = Instant::now();

        for _ in 0..100 {
            assert!(limiter.allow_at("k", base, 60, 100));
        }
        assert!(!limiter.allow_at("k", base, 60, 100));

        // 61 seconds after the first admitted call, its slot has aged out
        // and exactly one new request fits.
        let later = base + Duration::from_secs(61);
        assert!(limiter.allow_at("k", later, 60, 100));
        assert!(!limiter.allow_at("k", later, 60, 100));
    }

    #[test]
    fn test_rejections_are_not_recorded() {
        let limiter = RateLimiter::new();
        let base = Instant::now();

        assert!(limiter.allow_at("k", base, 60, 1));
        // Hammering the limiter while capped must not push the window out.
        for i in 1..=30 {
            assert!(!limiter.allow_at("k", base + Duration::from_secs(i), 60, 1));
        }

        // The single admitted call expires on schedule regardless.
        assert!(limiter.allow_at("k", base + Duration::from_secs(60), 60, 1));
    }

    #[test]
    fn test_keys_are_independent() {
        let limiter = RateLimiter::new();
        let base = Instant::now();

        assert!(limiter.allow_at("a:/login", base, 60, 1));
        assert!(!limiter.allow_at("a:/login", base, 60, 1));

        // Different endpoint, different budget; different IP likewise.
        assert!(limiter.allow_at("a:/profile", base, 60, 1));
        assert!(limiter.allow_at("b:/login", base, 60, 1));
    }

    #[test]
    fn test_stale_identities_are_swept() {
        // Single shard so every call contributes to the same sweep counter.
        let limiter = RateLimiter::with_shards(1);
        let base = Instant::now();

        for i in 0..SWEEP_EVERY {
            limiter.allow_at(&format!("key-{i}"), base, 60, 100);
        }
        assert_eq!(limiter.tracked_keys(), SWEEP_EVERY as usize);

        // Keep one identity warm far past everyone else's window; sweeps
        // triggered by its traffic evict the rest.
        let later = base + Duration::from_secs(3600);
        for _ in 0..SWEEP_EVERY {
            limiter.allow_at("warm", later, 60, 1_000_000);
        }

        assert_eq!(limiter.tracked_keys(), 1);
    }

    #[test]
    fn test_identity_key_composition() {
        assert_eq!(identity_key("203.0.113.7", "/api/v1/roles"), "203.0.113.7:/api/v1/roles");
    }
}
