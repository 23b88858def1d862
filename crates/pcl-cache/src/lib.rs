//! pcl-cache
//!
//! Short-TTL memoization of pool reads, keyed by `(ContractVariant, PoolId)`,
//! plus a minimum-inter-call pacing gate for outbound RPC reads. Generic over
//! the cached value so this crate has no dependency on `pcl-chain`'s read
//! types — grounded on `mqk-reconcile::watermark::SnapshotWatermark`, which
//! is likewise a small pure state tracker consulted before trusting a
//! fetched value, just applied to wall-clock freshness here instead of
//! fetch-order monotonicity.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use pcl_schemas::{ContractVariant, PoolId};

/// Default cache TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60);
/// Default minimum delay between successive RPC reads.
pub const DEFAULT_MIN_READ_DELAY: Duration = Duration::from_millis(200);

/// Composite cache key: which contract variant, which pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub variant: ContractVariant,
    pub pool_id: PoolId,
}

impl PoolKey {
    pub fn new(variant: ContractVariant, pool_id: PoolId) -> Self {
        PoolKey { variant, pool_id }
    }
}

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// A TTL-bounded map from `PoolKey` to a cached read value.
///
/// `get_or_fetch` is the primary entry point: it returns the cached value if
/// it is younger than `ttl`, otherwise calls `fetch` and stores the result.
/// `invalidate` removes one key (called after a successful write);
/// `clear` empties the whole cache (called once per heartbeat, so stale
/// data from the previous cycle is never observed in the next one).
pub struct ReadCache<V: Clone> {
    ttl: Duration,
    entries: Mutex<HashMap<PoolKey, Entry<V>>>,
}

impl<V: Clone> ReadCache<V> {
    pub fn new(ttl: Duration) -> Self {
        ReadCache {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_default_ttl() -> Self {
        Self::new(DEFAULT_TTL)
    }

    /// Return the cached value for `key` if it is fresh, without fetching.
    pub fn peek(&self, key: PoolKey) -> Option<V> {
        let entries = self.entries.lock().expect("read cache mutex poisoned");
        entries.get(&key).and_then(|e| {
            if e.stored_at.elapsed() <= self.ttl {
                Some(e.value.clone())
            } else {
                None
            }
        })
    }

    /// Fetch-through: return the fresh cached value, or call `fetch` and
    /// store + return its result. `fetch` may be fallible; a fetch error is
    /// propagated without populating the cache.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: PoolKey, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        if let Some(v) = self.peek(key) {
            return Ok(v);
        }
        let value = fetch().await?;
        let mut entries = self.entries.lock().expect("read cache mutex poisoned");
        entries.insert(
            key,
            Entry {
                value: value.clone(),
                stored_at: Instant::now(),
            },
        );
        Ok(value)
    }

    /// Explicitly evict one key — called after a successful on-chain write
    /// that is known to have changed this pool's state.
    pub fn invalidate(&self, key: PoolKey) {
        self.entries
            .lock()
            .expect("read cache mutex poisoned")
            .remove(&key);
    }

    /// Discard every cached entry. Called once at the start of every
    /// heartbeat so a cycle never observes data read during a prior cycle.
    pub fn clear(&self) {
        self.entries.lock().expect("read cache mutex poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("read cache mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Paces outbound RPC reads to at least `min_delay` apart, to avoid
/// rate-limiting on public RPC endpoints.
pub struct RateLimiter {
    min_delay: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(min_delay: Duration) -> Self {
        RateLimiter {
            min_delay,
            last_call: Mutex::new(None),
        }
    }

    pub fn with_default_delay() -> Self {
        Self::new(DEFAULT_MIN_READ_DELAY)
    }

    /// Await until at least `min_delay` has elapsed since the previous call
    /// to `wait`, then record this call's time.
    pub async fn wait(&self) {
        let sleep_for = {
            let mut last = self.last_call.lock().expect("rate limiter mutex poisoned");
            let now = Instant::now();
            let sleep_for = match *last {
                Some(prev) => self.min_delay.saturating_sub(now.duration_since(prev)),
                None => Duration::ZERO,
            };
            *last = Some(now + sleep_for);
            sleep_for
        };
        if !sleep_for.is_zero() {
            tokio::time::sleep(sleep_for).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn fetch_through_populates_and_hits_cache() {
        let cache: ReadCache<u32> = ReadCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));
        let key = PoolKey::new(ContractVariant::Current, 1);

        let calls2 = calls.clone();
        let v1: Result<u32, ()> = cache
            .get_or_fetch(key, || async move {
                calls2.fetch_add(1, Ordering::SeqCst);
                Ok(42)
            })
            .await;
        assert_eq!(v1.unwrap(), 42);

        let calls3 = calls.clone();
        let v2: Result<u32, ()> = cache
            .get_or_fetch(key, || async move {
                calls3.fetch_add(1, Ordering::SeqCst);
                Ok(99)
            })
            .await;
        assert_eq!(v2.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let cache: ReadCache<u32> = ReadCache::new(Duration::from_secs(60));
        let key = PoolKey::new(ContractVariant::Legacy, 7);
        let _: Result<u32, ()> = cache.get_or_fetch(key, || async { Ok(1) }).await;
        cache.invalidate(key);
        let v: Result<u32, ()> = cache.get_or_fetch(key, || async { Ok(2) }).await;
        assert_eq!(v.unwrap(), 2);
    }

    #[tokio::test]
    async fn clear_empties_every_entry() {
        let cache: ReadCache<u32> = ReadCache::new(Duration::from_secs(60));
        let _: Result<u32, ()> = cache
            .get_or_fetch(PoolKey::new(ContractVariant::Current, 1), || async { Ok(1) })
            .await;
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn expired_entry_refetches() {
        let cache: ReadCache<u32> = ReadCache::new(Duration::from_millis(10));
        let key = PoolKey::new(ContractVariant::Current, 1);
        let _: Result<u32, ()> = cache.get_or_fetch(key, || async { Ok(1) }).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        let v: Result<u32, ()> = cache.get_or_fetch(key, || async { Ok(2) }).await;
        assert_eq!(v.unwrap(), 2);
    }
}
