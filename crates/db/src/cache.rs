//! In-memory result cache with TTL expiry.
//!
//! Memoizes finalized queries (keyed by the composer's cache key) for a
//! bounded time, absorbing repeated identical requests. The clock is
//! injected so tests drive expiry without waiting on wall time.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

/// Time source for cache expiry.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time. The default outside tests.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock tests advance by hand.
#[derive(Debug)]
pub struct ManualClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().expect("clock offset poisoned");
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        ManualClock::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().expect("clock offset poisoned")
    }
}

struct CacheEntry<T> {
    rows: Vec<T>,
    fetched_at: Instant,
}

/// Memoized query results, keyed by cache key.
///
/// Unbounded by entry count, bounded by TTL: an expired entry is replaced in
/// place on the next request for its key. [`ResultCache::clear`] drops
/// everything and is safe concurrently with in-flight lookups.
pub struct ResultCache<T> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: RwLock<HashMap<String, CacheEntry<T>>>,
}

impl<T: Clone> ResultCache<T> {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        ResultCache {
            ttl,
            clock,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Return the cached rows for `key` if unexpired; otherwise run
    /// `compute`, store its rows, and return them.
    ///
    /// No lock is held across `compute`, so concurrent misses on the same
    /// key may each compute and overwrite last-write-wins. The underlying
    /// warehouse reads are idempotent, which makes the duplicate work
    /// harmless; a failed compute caches nothing.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, compute: F) -> Result<Vec<T>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<T>, E>>,
    {
        let now = self.clock.now();
        {
            let entries = self.entries.read().await;
            if let Some(entry) = entries.get(key) {
                if now.duration_since(entry.fetched_at) < self.ttl {
                    tracing::debug!(key, rows = entry.rows.len(), "result cache hit");
                    return Ok(entry.rows.clone());
                }
            }
        }

        tracing::debug!(key, "result cache miss");
        let rows = compute().await?;

        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                rows: rows.clone(),
                fetched_at: self.clock.now(),
            },
        );
        Ok(rows)
    }

    /// Drop every entry.
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
