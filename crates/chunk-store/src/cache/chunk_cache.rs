//! LRU cache for parsed grid chunks.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;

use crate::types::{CacheStats, Chunk};

/// Cache key for chunks: (row, col).
pub type ChunkKey = (u32, u32);

/// Assumed size of one chunk when sizing the entry table (100x100 cells).
const CHUNK_SIZE_ESTIMATE: usize = 100 * 100 * std::mem::size_of::<crate::types::Cell>();

/// LRU cache for parsed chunks with memory-bounded eviction.
pub struct ChunkCache {
    cache: LruCache<ChunkKey, Arc<Chunk>>,
    memory_limit: usize,
    current_memory: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl ChunkCache {
    /// Create a new chunk cache with the given memory limit in bytes.
    pub fn new(memory_limit: usize) -> Self {
        let max_entries = (memory_limit / CHUNK_SIZE_ESTIMATE).max(16);

        Self {
            cache: LruCache::new(NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN)),
            memory_limit,
            current_memory: 0,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Try to get a chunk from the cache.
    pub fn get(&mut self, key: &ChunkKey) -> Option<Arc<Chunk>> {
        if let Some(chunk) = self.cache.get(key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(chunk.clone())
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Check if a key exists in the cache without updating LRU order.
    pub fn contains(&self, key: &ChunkKey) -> bool {
        self.cache.contains(key)
    }

    /// Insert a chunk, evicting least recently used entries to make room.
    /// Chunks larger than the whole budget are not cached.
    pub fn insert(&mut self, key: ChunkKey, chunk: Arc<Chunk>) {
        let size = chunk.estimated_size_bytes();

        if let Some(previous) = self.cache.pop(&key) {
            self.current_memory = self
                .current_memory
                .saturating_sub(previous.estimated_size_bytes());
        }

        while self.current_memory + size > self.memory_limit && !self.cache.is_empty() {
            if let Some((_, evicted)) = self.cache.pop_lru() {
                self.current_memory = self
                    .current_memory
                    .saturating_sub(evicted.estimated_size_bytes());
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
        }

        if size <= self.memory_limit {
            // The entry table can be full before the memory budget is.
            if let Some((_, evicted)) = self.cache.push(key, chunk) {
                self.current_memory = self
                    .current_memory
                    .saturating_sub(evicted.estimated_size_bytes());
                self.evictions.fetch_add(1, Ordering::Relaxed);
            }
            self.current_memory += size;
        }
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.cache.len(),
            memory_bytes: self.current_memory as u64,
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    /// Clear all entries from the cache.
    pub fn clear(&mut self) {
        self.cache.clear();
        self.current_memory = 0;
    }

    /// Get the current memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        self.current_memory
    }

    /// Get the memory limit in bytes.
    pub fn memory_limit(&self) -> usize {
        self.memory_limit
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    fn chunk(cells: usize) -> Arc<Chunk> {
        Arc::new(Chunk {
            lon: 0.0,
            lat: 0.0,
            width: cells as u32,
            height: 1,
            cells: vec![Cell::default(); cells],
        })
    }

    #[test]
    fn test_cache_insert_and_get() {
        let mut cache = ChunkCache::new(1024 * 1024);
        let data = chunk(4);

        assert!(cache.get(&(0, 0)).is_none());
        cache.insert((0, 0), data.clone());
        assert_eq!(cache.get(&(0, 0)), Some(data));
        assert!(cache.contains(&(0, 0)));
    }

    #[test]
    fn test_cache_lru_eviction() {
        let one = chunk(4).estimated_size_bytes();
        let mut cache = ChunkCache::new(one * 3);

        for col in 0..10 {
            cache.insert((0, col), chunk(4));
        }

        assert!(cache.get(&(0, 0)).is_none());
        assert!(cache.get(&(0, 9)).is_some());
        assert!(cache.memory_usage() <= cache.memory_limit());
        assert!(cache.stats().evictions > 0);
    }

    #[test]
    fn test_oversized_chunk_not_cached() {
        let mut cache = ChunkCache::new(16);
        cache.insert((0, 0), chunk(100));
        assert!(cache.is_empty());
        assert_eq!(cache.memory_usage(), 0);
    }

    #[test]
    fn test_reinsert_does_not_double_count() {
        let mut cache = ChunkCache::new(1024 * 1024);
        cache.insert((1, 1), chunk(4));
        let once = cache.memory_usage();
        cache.insert((1, 1), chunk(4));
        assert_eq!(cache.memory_usage(), once);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_stats() {
        let mut cache = ChunkCache::new(1024 * 1024);
        cache.insert((0, 0), chunk(4));

        cache.get(&(0, 0));
        cache.get(&(0, 1));

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }

    #[test]
    fn test_cache_clear() {
        let mut cache = ChunkCache::new(1024 * 1024);
        cache.insert((0, 0), chunk(4));

        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.memory_usage(), 0);
    }
}
