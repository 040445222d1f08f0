//! Folio read cache.
//!
//! Remote read results are cached in memory under an invalidation tag. Write
//! paths invalidate the tag through [`CacheTrigger`]; readers that asked for
//! `CacheDirective::NoStore` bypass the cache entirely.
//!
//! ```toml
//! [cache]
//! enabled = true
//! entry_limit = 256
//! warm_on_startup = true
//! warm_concurrency = 4
//! ```

mod config;
mod keys;
mod lock;
mod store;
mod trigger;

pub use config::CacheConfig;
pub use keys::{ReadKey, ReadResource};
pub use store::{CachedRead, Epoch, ReadCache};
pub use trigger::CacheTrigger;

pub(crate) use store::{METRIC_READ_CACHE_HIT, METRIC_READ_CACHE_INVALIDATE, METRIC_READ_CACHE_MISS};
