//! In-memory store for remote read results.

use std::collections::HashMap;
use std::sync::RwLock;

use lru::LruCache;
use metrics::counter;

use crate::domain::posts::{BlogPost, PostsEnvelope};

use super::config::CacheConfig;
use super::keys::ReadKey;
use super::lock::{read_or_recover, write_or_recover};

pub(crate) const METRIC_READ_CACHE_HIT: &str = "folio_read_cache_hit_total";
pub(crate) const METRIC_READ_CACHE_MISS: &str = "folio_read_cache_miss_total";
pub(crate) const METRIC_READ_CACHE_INVALIDATE: &str = "folio_read_cache_invalidate_total";

/// Monotonic per-tag counter; bumped on every invalidation of the tag.
pub type Epoch = u64;

/// A cached read result.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedRead {
    List(PostsEnvelope),
    /// `None` records a confirmed "not found" answer.
    Post(Option<BlogPost>),
}

/// Tagged LRU cache of read results.
///
/// A fill carries the tag epoch observed before the remote fetch started, so
/// a result fetched before an invalidation is never stored after it.
pub struct ReadCache {
    entries: RwLock<LruCache<ReadKey, CachedRead>>,
    epochs: RwLock<HashMap<String, Epoch>>,
}

impl ReadCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(config.entry_limit_non_zero())),
            epochs: RwLock::new(HashMap::new()),
        }
    }

    pub fn epoch(&self, tag: &str) -> Epoch {
        read_or_recover(&self.epochs, "epoch")
            .get(tag)
            .copied()
            .unwrap_or(0)
    }

    pub fn get(&self, key: &ReadKey) -> Option<CachedRead> {
        let hit = write_or_recover(&self.entries, "get").get(key).cloned();
        let metric = if hit.is_some() {
            METRIC_READ_CACHE_HIT
        } else {
            METRIC_READ_CACHE_MISS
        };
        counter!(metric, "tag" => key.tag.clone()).increment(1);
        hit
    }

    /// Store a result fetched while the tag was at `observed`.
    ///
    /// Returns `false` when the tag was invalidated in the meantime.
    pub fn put(&self, key: ReadKey, value: CachedRead, observed: Epoch) -> bool {
        let epochs = read_or_recover(&self.epochs, "put.epoch");
        if epochs.get(&key.tag).copied().unwrap_or(0) != observed {
            return false;
        }
        write_or_recover(&self.entries, "put").put(key, value);
        true
    }

    /// Drop every entry under `tag` and advance its epoch.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        let mut epochs = write_or_recover(&self.epochs, "invalidate.epoch");
        *epochs.entry(tag.to_string()).or_insert(0) += 1;

        let mut entries = write_or_recover(&self.entries, "invalidate.entries");
        let stale: Vec<ReadKey> = entries
            .iter()
            .filter(|(key, _)| key.has_tag(tag))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            entries.pop(key);
        }

        counter!(METRIC_READ_CACHE_INVALIDATE, "tag" => tag.to_string()).increment(1);
        stale.len()
    }

    pub fn len(&self) -> usize {
        read_or_recover(&self.entries, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use std::panic::{AssertUnwindSafe, catch_unwind};

    use crate::domain::posts::PostFilter;

    use super::*;

    fn store(limit: usize) -> ReadCache {
        ReadCache::new(&CacheConfig {
            entry_limit: limit,
            ..Default::default()
        })
    }

    fn listing() -> CachedRead {
        CachedRead::List(PostsEnvelope::default())
    }

    #[test]
    fn stores_and_returns_entries() {
        let cache = store(8);
        let key = ReadKey::list("blogPosts", &PostFilter::default());
        assert!(cache.get(&key).is_none());

        assert!(cache.put(key.clone(), listing(), cache.epoch("blogPosts")));
        assert_eq!(cache.get(&key), Some(listing()));
    }

    #[test]
    fn invalidation_only_drops_the_named_tag() {
        let cache = store(8);
        let posts = ReadKey::post("blogPosts", "p1");
        let other = ReadKey::post("comments", "p1");
        cache.put(posts.clone(), CachedRead::Post(None), 0);
        cache.put(other.clone(), CachedRead::Post(None), 0);

        assert_eq!(cache.invalidate_tag("blogPosts"), 1);
        assert!(cache.get(&posts).is_none());
        assert!(cache.get(&other).is_some());
        assert_eq!(cache.epoch("blogPosts"), 1);
        assert_eq!(cache.epoch("comments"), 0);
    }

    #[test]
    fn fills_started_before_invalidation_are_discarded() {
        let cache = store(8);
        let key = ReadKey::post("blogPosts", "p1");
        let observed = cache.epoch("blogPosts");

        cache.invalidate_tag("blogPosts");

        assert!(!cache.put(key.clone(), CachedRead::Post(None), observed));
        assert!(cache.get(&key).is_none());
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = store(2);
        let first = ReadKey::post("blogPosts", "1");
        let second = ReadKey::post("blogPosts", "2");
        let third = ReadKey::post("blogPosts", "3");

        cache.put(first.clone(), CachedRead::Post(None), 0);
        cache.put(second.clone(), CachedRead::Post(None), 0);
        cache.put(third.clone(), CachedRead::Post(None), 0);

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&first).is_none());
        assert!(cache.get(&third).is_some());
    }

    #[test]
    fn recovers_from_poisoned_lock() {
        let cache = store(4);
        let _ = catch_unwind(AssertUnwindSafe(|| {
            let _guard = cache.entries.write().expect("entries lock should be acquired");
            panic!("poison entries lock");
        }));

        let key = ReadKey::post("blogPosts", "p1");
        assert!(cache.put(key.clone(), CachedRead::Post(None), 0));
        assert!(cache.get(&key).is_some());
    }
}
