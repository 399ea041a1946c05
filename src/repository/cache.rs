//! Time-bounded cache of the fleet summary.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::time::Instant;

use fleetwatch_types::FleetSummary;

/// Source of monotonic time for cache freshness checks.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

/// Clock backed by the tokio timer, so paused test time applies.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// One cached fleet summary with the instant it was stored.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Arc<FleetSummary>,
    pub timestamp: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    pub fn new(data: Arc<FleetSummary>, timestamp: Instant, ttl: Duration) -> Self {
        Self {
            data,
            timestamp,
            ttl,
        }
    }

    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.timestamp)
    }

    /// Fresh while younger than its TTL.
    pub fn is_fresh(&self, now: Instant) -> bool {
        self.age(now) < self.ttl
    }
}

/// Storage for the cached fleet summary.
///
/// The cache holds at most one entry. Stale entries are kept so they can
/// be served when a refresh fails.
pub trait FleetCache: Send + Sync + fmt::Debug {
    fn get(&self) -> Option<CacheEntry>;
    fn set(&self, entry: CacheEntry);
    fn invalidate(&self);
}

/// In-process cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entry: RwLock<Option<CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FleetCache for MemoryCache {
    fn get(&self) -> Option<CacheEntry> {
        self.entry.read().clone()
    }

    fn set(&self, entry: CacheEntry) {
        *self.entry.write() = Some(entry);
    }

    fn invalidate(&self) {
        *self.entry.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{fleet, ManualClock};

    #[test]
    fn test_entry_freshness() {
        let clock = ManualClock::new();
        let entry = CacheEntry::new(Arc::new(fleet()), clock.now(), Duration::from_secs(30));
        assert!(entry.is_fresh(clock.now()));

        clock.advance(Duration::from_secs(29));
        assert!(entry.is_fresh(clock.now()));

        clock.advance(Duration::from_secs(1));
        assert!(!entry.is_fresh(clock.now()));
        assert_eq!(entry.age(clock.now()), Duration::from_secs(30));
    }

    #[test]
    fn test_memory_cache() {
        let cache = MemoryCache::new();
        assert!(cache.get().is_none());

        let data = Arc::new(fleet());
        cache.set(CacheEntry::new(
            Arc::clone(&data),
            Instant::now(),
            Duration::from_secs(30),
        ));
        let entry = cache.get().unwrap();
        assert!(Arc::ptr_eq(&entry.data, &data));

        cache.invalidate();
        assert!(cache.get().is_none());
    }
}
