//! Time-bounded snapshot of the loaded data.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info};

struct Snapshot<T> {
    value: Arc<T>,
    loaded_at: Instant,
}

/// Holds one immutable value for a fixed window.
///
/// Readers within the window share the same `Arc`. The first access after
/// the window closes runs the loader again; a failed load leaves the cache
/// empty so the next access retries.
pub struct SnapshotCache<T> {
    ttl: Duration,
    slot: Mutex<Option<Snapshot<T>>>,
}

impl<T> SnapshotCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn get_or_try_load<E>(&self, loader: impl FnOnce() -> Result<T, E>) -> Result<Arc<T>, E> {
        self.get_or_try_load_at(Instant::now(), loader)
    }

    /// Same as [`get_or_try_load`](Self::get_or_try_load) with an explicit clock.
    pub fn get_or_try_load_at<E>(
        &self,
        now: Instant,
        loader: impl FnOnce() -> Result<T, E>,
    ) -> Result<Arc<T>, E> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(snapshot) = slot.as_ref() {
            if now.saturating_duration_since(snapshot.loaded_at) < self.ttl {
                debug!("snapshot cache hit");
                return Ok(Arc::clone(&snapshot.value));
            }
            info!(ttl_secs = self.ttl.as_secs(), "snapshot expired, reloading");
        }

        // drop the stale snapshot before loading so a failure leaves nothing behind
        *slot = None;
        let value = Arc::new(loader()?);
        *slot = Some(Snapshot {
            value: Arc::clone(&value),
            loaded_at: now,
        });
        Ok(value)
    }

    /// Whether a snapshot is loaded and still inside its window at `now`.
    pub fn is_fresh_at(&self, now: Instant) -> bool {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .is_some_and(|snapshot| now.saturating_duration_since(snapshot.loaded_at) < self.ttl)
    }

    /// Forgets the current snapshot.
    pub fn invalidate(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    const TTL: Duration = Duration::from_secs(3600);

    #[test]
    fn test_shares_snapshot_within_window() {
        let cache = SnapshotCache::new(TTL);
        let start = Instant::now();
        let loads = Cell::new(0);
        let load = || -> Result<Vec<u8>, String> {
            loads.set(loads.get() + 1);
            Ok(vec![1, 2, 3])
        };

        let first = cache.get_or_try_load_at(start, load).unwrap();
        let second = cache
            .get_or_try_load_at(start + Duration::from_secs(3599), load)
            .unwrap();

        assert_eq!(loads.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_reloads_after_expiry() {
        let cache = SnapshotCache::new(TTL);
        let start = Instant::now();

        let first = cache
            .get_or_try_load_at(start, || Ok::<_, String>(1))
            .unwrap();
        let later = start + TTL;
        assert!(!cache.is_fresh_at(later));
        let second = cache.get_or_try_load_at(later, || Ok::<_, String>(2)).unwrap();

        assert_eq!((*first, *second), (1, 2));
        assert!(cache.is_fresh_at(later));
    }

    #[test]
    fn test_failed_reload_installs_nothing() {
        let cache = SnapshotCache::new(TTL);
        let start = Instant::now();
        cache
            .get_or_try_load_at(start, || Ok::<_, String>(1))
            .unwrap();

        let later = start + TTL * 2;
        let failed = cache.get_or_try_load_at(later, || Err::<i32, _>("offline".to_string()));
        assert_eq!(failed.unwrap_err(), "offline");
        assert!(!cache.is_fresh_at(later));

        let retried = cache
            .get_or_try_load_at(later, || Ok::<_, String>(3))
            .unwrap();
        assert_eq!(*retried, 3);
    }

    #[test]
    fn test_invalidate() {
        let cache = SnapshotCache::new(TTL);
        let now = Instant::now();
        cache.get_or_try_load_at(now, || Ok::<_, String>(1)).unwrap();
        cache.invalidate();
        assert!(!cache.is_fresh_at(now));
    }
}
