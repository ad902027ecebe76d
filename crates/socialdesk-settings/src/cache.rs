//! Single-slot settings cache

use crate::record::SettingsSnapshot;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

struct CachedSnapshot {
    snapshot: Arc<SettingsSnapshot>,
    stored_at: Instant,
}

/// Holds one snapshot for all integrations, valid for `ttl` after it was set.
///
/// Time is passed in by the caller so expiry follows the tokio clock.
pub struct SettingsCache {
    ttl: Duration,
    slot: RwLock<Option<CachedSnapshot>>,
}

impl SettingsCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Cached snapshot, if one was stored less than `ttl` before `now`
    pub fn get(&self, now: Instant) -> Option<Arc<SettingsSnapshot>> {
        let slot = self.slot.read();
        slot.as_ref()
            .filter(|cached| now.saturating_duration_since(cached.stored_at) < self.ttl)
            .map(|cached| Arc::clone(&cached.snapshot))
    }

    /// Replace the cached snapshot
    pub fn set(&self, snapshot: Arc<SettingsSnapshot>, now: Instant) {
        *self.slot.write() = Some(CachedSnapshot {
            snapshot,
            stored_at: now,
        });
    }

    pub fn invalidate(&self) {
        *self.slot.write() = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn snapshot() -> Arc<SettingsSnapshot> {
        Arc::new(SettingsSnapshot::from_env(&HashMap::new()))
    }

    #[test]
    fn test_empty_cache_misses() {
        let cache = SettingsCache::new(Duration::from_secs(300));
        assert!(cache.get(Instant::now()).is_none());
    }

    #[test]
    fn test_hit_within_ttl_and_miss_after() {
        let cache = SettingsCache::new(Duration::from_secs(300));
        let start = Instant::now();
        let stored = snapshot();

        cache.set(Arc::clone(&stored), start);

        let hit = cache.get(start + Duration::from_secs(299)).unwrap();
        assert!(Arc::ptr_eq(&hit, &stored));
        assert!(cache.get(start + Duration::from_secs(300)).is_none());
    }

    #[test]
    fn test_set_supersedes_previous_snapshot() {
        let cache = SettingsCache::new(Duration::from_secs(300));
        let start = Instant::now();
        let first = snapshot();
        let second = snapshot();

        cache.set(Arc::clone(&first), start);
        cache.set(Arc::clone(&second), start + Duration::from_secs(10));

        let hit = cache.get(start + Duration::from_secs(305)).unwrap();
        assert!(Arc::ptr_eq(&hit, &second));
    }

    #[test]
    fn test_invalidate_clears_slot() {
        let cache = SettingsCache::new(Duration::from_secs(300));
        let now = Instant::now();

        cache.set(snapshot(), now);
        cache.invalidate();

        assert!(cache.get(now).is_none());
    }
}
