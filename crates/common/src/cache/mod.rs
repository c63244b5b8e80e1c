//! In-memory cache for fetched paper content
//!
//! Avoids re-fetching the same paper's bytes within a process lifetime.
//! Content must be explicitly loaded (via paper selection) before it can be
//! queried, so a miss is always answerable with "reselect the paper".
//!
//! The cache is bounded: once `max_entries` is reached the least recently
//! used entry is evicted. An unbounded map would grow without limit in a
//! long-running server.

use crate::content::PaperContent;
use crate::metrics;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

/// Bounded LRU cache keyed by paper id, shared process-wide behind `Arc`.
pub struct ContentCache {
    inner: Mutex<CacheInner>,
    max_entries: usize,
}

struct CacheInner {
    map: HashMap<Uuid, PaperContent>,
    /// Recency order, least recent first
    order: Vec<Uuid>,
}

impl ContentCache {
    /// Create a cache holding at most `max_entries` payloads.
    pub fn new(max_entries: usize) -> Self {
        assert!(max_entries > 0, "cache capacity must be non-zero");
        Self {
            inner: Mutex::new(CacheInner {
                map: HashMap::new(),
                order: Vec::new(),
            }),
            max_entries,
        }
    }

    /// Look up cached content, refreshing its recency on hit.
    pub fn get(&self, paper_id: Uuid) -> Option<PaperContent> {
        let mut inner = self.inner.lock().expect("content cache poisoned");
        let hit = inner.map.contains_key(&paper_id);
        if hit {
            inner.touch(paper_id);
        }
        metrics::record_cache(hit, "paper_content");
        inner.map.get(&paper_id).cloned()
    }

    /// Check for presence without counting a hit or refreshing recency.
    pub fn contains(&self, paper_id: Uuid) -> bool {
        let inner = self.inner.lock().expect("content cache poisoned");
        inner.map.contains_key(&paper_id)
    }

    /// Store content for a paper, evicting the least recently used entry
    /// if the cache is full.
    pub fn put(&self, paper_id: Uuid, content: PaperContent) {
        let mut inner = self.inner.lock().expect("content cache poisoned");

        if inner.map.insert(paper_id, content).is_none() && inner.map.len() > self.max_entries {
            if let Some(oldest) = inner.order.first().copied() {
                inner.map.remove(&oldest);
                inner.order.remove(0);
                tracing::debug!(paper_id = %oldest, "Evicted paper content from cache");
            }
        }
        inner.touch(paper_id);
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.inner.lock().expect("content cache poisoned").map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheInner {
    fn touch(&mut self, paper_id: Uuid) {
        self.order.retain(|id| *id != paper_id);
        self.order.push(paper_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::PaperContent;

    fn text(body: &str) -> PaperContent {
        PaperContent::from_bytes("paper.txt", body.as_bytes())
    }

    #[test]
    fn test_get_returns_last_write() {
        let cache = ContentCache::new(8);
        let id = Uuid::new_v4();

        assert!(cache.get(id).is_none());

        cache.put(id, text("first"));
        assert_eq!(cache.get(id).unwrap().data, "first");

        cache.put(id, text("second"));
        assert_eq!(cache.get(id).unwrap().data, "second");
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_miss_for_unknown_id() {
        let cache = ContentCache::new(8);
        cache.put(Uuid::new_v4(), text("something"));
        assert!(cache.get(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_lru_eviction_at_capacity() {
        let cache = ContentCache::new(2);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        cache.put(a, text("a"));
        cache.put(b, text("b"));

        // Touch `a` so `b` becomes least recently used
        cache.get(a);

        cache.put(c, text("c"));
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(a));
        assert!(!cache.contains(b));
        assert!(cache.contains(c));
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = ContentCache::new(2);
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        cache.put(a, text("a"));
        cache.put(b, text("b"));
        cache.put(a, text("a2"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(a).unwrap().data, "a2");
        assert_eq!(cache.get(b).unwrap().data, "b");
    }
}
