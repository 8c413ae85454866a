//! Process-wide per-node-identity cache of encoded buffers.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use dashmap::DashMap;
use tracing::debug;

/// Caches the encoded buffer per node identity so the expensive conversion
/// runs at most once per distinct node per cache generation.
///
/// Shared across workers: the map is sharded, so callers on unrelated keys
/// never contend on one lock. The compute closure runs outside any map lock;
/// on a race for the same uncached key the first writer wins and the loser's
/// buffer is dropped. Duplicate computation is possible under contention;
/// torn state is not.
#[derive(Debug, Default)]
pub struct NodeCache {
    entries: DashMap<String, Bytes>,
    hits: AtomicU64,
    misses: AtomicU64,
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl NodeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached buffer for `node_id`, or run `compute` and cache its
    /// result. Hits hand back a shared handle; the bytes are never copied.
    ///
    /// A failing `compute` stores nothing, so a later call retries.
    pub fn get_or_compute<F, E>(&self, node_id: &str, compute: F) -> Result<Bytes, E>
    where
        F: FnOnce() -> Result<Vec<u8>, E>,
    {
        if let Some(cached) = self.entries.get(node_id) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(cached.clone());
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let encoded = Bytes::from(compute()?);
        let entry = self
            .entries
            .entry(node_id.to_string())
            .or_insert(encoded);
        debug!(node_id, size = entry.len(), "cached encoded node metadata");
        Ok(entry.clone())
    }

    /// Drop every entry. The only unit of invalidation: node identity rarely
    /// changes within a process lifetime, so this runs on config reload, not
    /// per entry.
    pub fn clear(&self) {
        self.entries.clear();
        debug!("node metadata cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.entries.len(),
        }
    }
}
