//! Read-cache configuration.

use std::num::NonZeroUsize;

use crate::config::{
    CacheSettings, DEFAULT_CACHE_ENTRY_LIMIT, DEFAULT_CACHE_WARM_CONCURRENCY,
    MAX_CACHE_WARM_CONCURRENCY,
};

/// Tunables for the tagged read cache and its startup warmup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Serve `Default`-directive reads from memory when possible.
    pub enabled: bool,
    /// Maximum cached read results across all tags.
    pub entry_limit: usize,
    /// Pre-fetch every post at startup.
    pub warm_on_startup: bool,
    /// Concurrent detail fetches during warmup.
    pub warm_concurrency: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            entry_limit: DEFAULT_CACHE_ENTRY_LIMIT,
            warm_on_startup: true,
            warm_concurrency: DEFAULT_CACHE_WARM_CONCURRENCY,
        }
    }
}

impl From<&CacheSettings> for CacheConfig {
    fn from(settings: &CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            entry_limit: settings.entry_limit.get(),
            warm_on_startup: settings.warm_on_startup,
            warm_concurrency: settings.warm_concurrency.get(),
        }
    }
}

impl CacheConfig {
    /// Entry limit as `NonZeroUsize`, clamping zero to one.
    pub fn entry_limit_non_zero(&self) -> NonZeroUsize {
        NonZeroUsize::new(self.entry_limit).unwrap_or(NonZeroUsize::MIN)
    }

    pub fn warm_concurrency(&self) -> usize {
        self.warm_concurrency.clamp(1, MAX_CACHE_WARM_CONCURRENCY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert!(config.warm_on_startup);
        assert_eq!(config.entry_limit, DEFAULT_CACHE_ENTRY_LIMIT);
        assert_eq!(config.warm_concurrency, DEFAULT_CACHE_WARM_CONCURRENCY);
    }

    #[test]
    fn zero_limits_are_clamped() {
        let config = CacheConfig {
            entry_limit: 0,
            warm_concurrency: 0,
            ..Default::default()
        };
        assert_eq!(config.entry_limit_non_zero().get(), 1);
        assert_eq!(config.warm_concurrency(), 1);

        let config = CacheConfig {
            warm_concurrency: MAX_CACHE_WARM_CONCURRENCY + 8,
            ..Default::default()
        };
        assert_eq!(config.warm_concurrency(), MAX_CACHE_WARM_CONCURRENCY);
    }
}
