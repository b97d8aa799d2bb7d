//! Time-bounded cache for the last successful wildfire fetch.
//!
//! The entry lives in the session store under a fixed key and is replaced
//! wholesale on every write. An expired entry is reported as a miss but left
//! in place; only `clear` (called by the invalidation timer) removes it.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::FireRecord;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::store::{SessionStore, FIRE_CACHE_KEY};

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(start_ms),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms
            .fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }
}

/// The serialized cache value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub payload: Vec<FireRecord>,
    pub fetched_at_epoch_ms: i64,
}

/// Wildfire fetch cache over a session store.
#[derive(Clone)]
pub struct FireCache {
    store: SessionStore,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl FireCache {
    pub fn new(store: SessionStore, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self { store, clock, ttl }
    }

    /// Cache on the wall clock.
    pub fn with_system_clock(store: SessionStore, ttl: Duration) -> Self {
        Self::new(store, Arc::new(SystemClock), ttl)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// The stored entry if it is younger than the TTL.
    pub fn fresh_entry(&self) -> Option<CacheEntry> {
        let entry: CacheEntry = self.store.get_json(FIRE_CACHE_KEY)?;
        let age_ms = self.clock.now_ms() - entry.fetched_at_epoch_ms;
        if age_ms >= self.ttl.as_millis() as i64 {
            debug!("Fire cache expired ({}s old)", age_ms / 1000);
            return None;
        }
        Some(entry)
    }

    pub fn get_cached(&self) -> Option<Vec<FireRecord>> {
        self.fresh_entry().map(|e| e.payload)
    }

    /// Replace the cached entry, stamping it with the current time.
    pub fn set_cached(&self, records: Vec<FireRecord>) {
        let entry = CacheEntry {
            payload: records,
            fetched_at_epoch_ms: self.clock.now_ms(),
        };
        if let Err(e) = self.store.set_json(FIRE_CACHE_KEY, &entry) {
            warn!("Failed to write fire cache: {}", e);
        }
    }

    /// Remove the entry regardless of age.
    pub fn clear(&self) -> bool {
        self.store.remove(FIRE_CACHE_KEY)
    }
}

impl std::fmt::Debug for FireCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FireCache")
            .field("ttl", &self.ttl)
            .field("has_entry", &self.store.contains(FIRE_CACHE_KEY))
            .finish()
    }
}

/// Clear `cache` every `period`, independent of any search.
pub fn spawn_invalidation(cache: FireCache, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            if cache.clear() {
                info!("Fire cache invalidated by timer");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Coordinate, FireStatus};

    const TTL: Duration = Duration::from_secs(600);

    fn fire(id: &str) -> FireRecord {
        FireRecord {
            id: id.into(),
            name: None,
            status: FireStatus::OutOfControl,
            location: Coordinate::new(48.0, -55.0),
            area_hectares: None,
            start_timestamp: None,
            provincial_fire_number: None,
            region: None,
            cause: None,
            is_hotspot: false,
            hotspot_confidence: None,
        }
    }

    fn manual_cache() -> (FireCache, Arc<ManualClock>, SessionStore) {
        let clock = Arc::new(ManualClock::new(1_700_000_000_000));
        let store = SessionStore::new();
        let cache = FireCache::new(store.clone(), clock.clone(), TTL);
        (cache, clock, store)
    }

    #[test]
    fn test_empty_cache_misses() {
        let (cache, _, _) = manual_cache();
        assert!(cache.get_cached().is_none());
    }

    #[test]
    fn test_hit_after_one_minute() {
        let (cache, clock, _) = manual_cache();
        cache.set_cached(vec![fire("a"), fire("b")]);
        clock.advance(Duration::from_secs(60));
        let cached = cache.get_cached().expect("entry should still be fresh");
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[0].id, "a");
    }

    #[test]
    fn test_miss_after_eleven_minutes_keeps_entry() {
        let (cache, clock, store) = manual_cache();
        cache.set_cached(vec![fire("a")]);
        clock.advance(Duration::from_secs(11 * 60));
        assert!(cache.get_cached().is_none());
        assert!(store.contains(FIRE_CACHE_KEY), "expired entry is not deleted on read");
    }

    #[test]
    fn test_exactly_ttl_is_a_miss() {
        let (cache, clock, _) = manual_cache();
        cache.set_cached(vec![fire("a")]);
        clock.advance(TTL - Duration::from_millis(1));
        assert!(cache.get_cached().is_some());
        clock.advance(Duration::from_millis(1));
        assert!(cache.get_cached().is_none());
    }

    #[test]
    fn test_set_replaces_wholesale() {
        let (cache, clock, _) = manual_cache();
        cache.set_cached(vec![fire("a"), fire("b")]);
        clock.advance(Duration::from_secs(300));
        cache.set_cached(vec![fire("c")]);
        let entry = cache.fresh_entry().unwrap();
        assert_eq!(entry.payload, vec![fire("c")]);
        assert_eq!(entry.fetched_at_epoch_ms, clock.now_ms());
    }

    #[test]
    fn test_clear_removes_entry() {
        let (cache, _, _) = manual_cache();
        cache.set_cached(vec![fire("a")]);
        assert!(cache.clear());
        assert!(cache.get_cached().is_none());
        assert!(!cache.clear());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_clears_fresh_entry() {
        let (cache, _, store) = manual_cache();
        let handle = spawn_invalidation(cache.clone(), TTL);
        cache.set_cached(vec![fire("a")]);

        tokio::time::sleep(Duration::from_secs(599)).await;
        assert!(store.contains(FIRE_CACHE_KEY), "timer must not fire early");

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!store.contains(FIRE_CACHE_KEY), "timer should have cleared the cache");

        // A write after a clear survives until the next tick.
        cache.set_cached(vec![fire("b")]);
        assert_eq!(cache.get_cached().map(|v| v.len()), Some(1));

        handle.abort();
    }
}
