//! In-memory thumbnail cache with per-key single-flight generation.
//!
//! Each key owns a [`OnceCell`]. The first caller for a key runs the
//! generation future; everyone arriving while it runs awaits the same cell
//! and receives the same bytes. Unrelated keys never wait on each other.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use dashmap::DashMap;
use tokio::sync::OnceCell;

/// Cache key: a thumbnail is identified by its root and requested path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThumbnailKey {
    pub root_index: usize,
    pub relative: String,
}

impl ThumbnailKey {
    pub fn new(root_index: usize, relative: impl Into<String>) -> Self {
        Self {
            root_index,
            relative: relative.into(),
        }
    }
}

/// Entry in the thumbnail cache.
struct CacheEntry {
    cell: Arc<OnceCell<Bytes>>,
    last_accessed: Instant,
}

/// Thread-safe thumbnail cache.
///
/// Stored bytes are never invalidated when the source file changes.
/// With a capacity set, inserting a new key past it evicts the least
/// recently accessed completed entry; in-flight entries are never evicted.
pub struct ThumbnailCache {
    entries: DashMap<ThumbnailKey, CacheEntry>,
    capacity: Option<usize>,
}

impl ThumbnailCache {
    /// Create a cache, unbounded when `capacity` is `None`.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            entries: DashMap::new(),
            capacity,
        }
    }

    /// Get completed thumbnail bytes if present.
    pub fn get(&self, key: &ThumbnailKey) -> Option<Bytes> {
        let mut entry = self.entries.get_mut(key)?;
        let bytes = entry.cell.get().cloned()?;
        entry.last_accessed = Instant::now();
        Some(bytes)
    }

    /// Get the bytes for `key`, running `generate` if nothing is cached.
    ///
    /// At most one `generate` runs per key at a time. If the caller that is
    /// generating is cancelled, a waiting caller takes over.
    pub async fn get_or_generate<F, Fut>(&self, key: ThumbnailKey, generate: F) -> Bytes
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Bytes>,
    {
        let cell = self.cell_for(key);
        cell.get_or_init(generate).await.clone()
    }

    /// Remove an entry from the cache.
    pub fn remove(&self, key: &ThumbnailKey) {
        self.entries.remove(key);
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Get the number of cached entries (including in-flight ones).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cell_for(&self, key: ThumbnailKey) -> Arc<OnceCell<Bytes>> {
        if let Some(mut entry) = self.entries.get_mut(&key) {
            entry.last_accessed = Instant::now();
            return Arc::clone(&entry.cell);
        }

        if let Some(capacity) = self.capacity {
            if self.entries.len() >= capacity {
                self.evict_oldest();
            }
        }

        // The shard guard is dropped on return, before any await on the cell.
        let entry = self.entries.entry(key).or_insert_with(|| CacheEntry {
            cell: Arc::new(OnceCell::new()),
            last_accessed: Instant::now(),
        });
        Arc::clone(&entry.cell)
    }

    fn evict_oldest(&self) {
        let oldest = self
            .entries
            .iter()
            .filter(|entry| entry.cell.initialized())
            .min_by_key(|entry| entry.last_accessed)
            .map(|entry| entry.key().clone());

        if let Some(key) = oldest {
            tracing::debug!(root_index = key.root_index, relative = %key.relative, "Evicting thumbnail");
            self.entries.remove(&key);
        }
    }
}

impl Default for ThumbnailCache {
    fn default() -> Self {
        Self::new(None)
    }
}
