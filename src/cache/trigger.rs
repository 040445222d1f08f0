//! Invalidation entry point for write paths.

use std::sync::Arc;

use tracing::{debug, info};

use super::store::ReadCache;

/// Invalidates read-cache tags after successful writes.
///
/// Invalidation never fails the write that triggered it; with caching
/// disabled it is a no-op.
#[derive(Clone, Default)]
pub struct CacheTrigger {
    cache: Option<Arc<ReadCache>>,
}

impl CacheTrigger {
    pub fn new(cache: Option<Arc<ReadCache>>) -> Self {
        Self { cache }
    }

    pub fn disabled() -> Self {
        Self { cache: None }
    }

    pub fn invalidate_tag(&self, tag: &str) {
        let Some(cache) = &self.cache else {
            debug!(target: "folio::cache", tag, "cache invalidation skipped: cache disabled");
            return;
        };

        let removed = cache.invalidate_tag(tag);
        info!(
            target: "folio::cache",
            tag,
            removed,
            epoch = cache.epoch(tag),
            "cache tag invalidated"
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::cache::{CacheConfig, CachedRead, ReadKey};

    use super::*;

    #[test]
    fn invalidates_shared_cache() {
        let cache = Arc::new(ReadCache::new(&CacheConfig::default()));
        let key = ReadKey::post("blogPosts", "p1");
        cache.put(key.clone(), CachedRead::Post(None), 0);

        CacheTrigger::new(Some(cache.clone())).invalidate_tag("blogPosts");

        assert!(cache.is_empty());
        assert_eq!(cache.epoch("blogPosts"), 1);
    }

    #[test]
    fn disabled_trigger_is_a_no_op() {
        CacheTrigger::disabled().invalidate_tag("blogPosts");
    }
}
