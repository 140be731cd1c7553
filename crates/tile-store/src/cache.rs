//! In-memory LRU cache in front of a tile store.
//!
//! Only found tiles are cached; misses in the underlying store are looked up
//! again on every request so newly written tiles become visible.

use crate::TileStore;
use coverage_common::{StoreResult, TileAddress};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, warn};

/// Hit/miss counters for a `CachedTileStore`.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    pub evictions: AtomicU64,
}

impl CacheStats {
    /// Hit rate as a percentage (0-100).
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }
}

/// LRU cache of raw tile bytes, bounded by entry count.
pub struct CachedTileStore<S> {
    inner: S,
    cache: Mutex<LruCache<String, Vec<u8>>>,
    stats: Arc<CacheStats>,
}

impl<S: TileStore> CachedTileStore<S> {
    /// Wrap `inner`, keeping at most `capacity` tiles (minimum 1).
    pub fn new(inner: S, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
            stats: Arc::new(CacheStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<CacheStats> {
        self.stats.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<String, Vec<u8>>> {
        // A panic while holding the lock leaves the LRU structurally intact.
        self.cache.lock().unwrap_or_else(|poisoned| {
            warn!("Tile cache lock was poisoned; continuing");
            poisoned.into_inner()
        })
    }
}

impl<S: TileStore> TileStore for CachedTileStore<S> {
    fn get(&self, address: &TileAddress) -> StoreResult<Option<Vec<u8>>> {
        let key = address.to_string();

        if let Some(bytes) = self.lock().get(&key) {
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(Some(bytes.clone()));
        }
        self.stats.misses.fetch_add(1, Ordering::Relaxed);

        let Some(bytes) = self.inner.get(address)? else {
            return Ok(None);
        };

        if let Some((evicted, _)) = self.lock().push(key.clone(), bytes.clone()) {
            if evicted != key {
                self.stats.evictions.fetch_add(1, Ordering::Relaxed);
                debug!(evicted = %evicted, "Evicted tile from cache");
            }
        }
        Ok(Some(bytes))
    }
}
