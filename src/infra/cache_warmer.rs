use std::time::Instant;

use futures::{StreamExt, stream};
use metrics::histogram;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::posts::{BlogReadService, ReadError};

pub(crate) const METRIC_CACHE_WARM_MS: &str = "folio_cache_warm_ms";

#[derive(Debug, Error)]
pub enum CacheWarmError {
    #[error("failed to list posts: {0}")]
    Listing(#[source] ReadError),
}

/// Summary of one warm pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmReport {
    pub posts: usize,
    pub warmed: usize,
    pub missing: usize,
    pub failed: usize,
}

/// Pre-fills the read cache with the post listing and every post detail.
///
/// The home page reads its listing uncached, so only the history listing is warmed.
pub struct CacheWarmer {
    reads: BlogReadService,
    concurrency: usize,
}

impl CacheWarmer {
    pub fn new(reads: BlogReadService, concurrency: usize) -> Self {
        Self {
            reads,
            concurrency: concurrency.max(1),
        }
    }

    pub async fn warm_initial(&self) -> Result<WarmReport, CacheWarmError> {
        info!(target: "folio::cache_warmer", "warming read cache");
        let started_at = Instant::now();

        let ids = self
            .reads
            .post_ids()
            .await
            .map_err(CacheWarmError::Listing)?;

        let mut report = WarmReport {
            posts: ids.len(),
            ..WarmReport::default()
        };

        let mut results = stream::iter(ids)
            .map(|id| async move {
                let result = self.reads.get_post_by_id(&id).await;
                (id, result)
            })
            .buffer_unordered(self.concurrency);

        while let Some((id, result)) = results.next().await {
            match result {
                Ok(Some(_)) => report.warmed += 1,
                Ok(None) => report.missing += 1,
                Err(err) => {
                    report.failed += 1;
                    warn!(
                        target: "folio::cache_warmer",
                        post_id = %id,
                        error = %err,
                        "failed to warm post detail"
                    );
                }
            }
        }

        histogram!(METRIC_CACHE_WARM_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);
        info!(
            target: "folio::cache_warmer",
            posts = report.posts,
            warmed = report.warmed,
            missing = report.missing,
            failed = report.failed,
            "read cache warmed"
        );
        Ok(report)
    }
}
