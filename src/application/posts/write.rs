use std::sync::Arc;

use async_trait::async_trait;
use metrics::counter;
use thiserror::Error;
use tracing::{info, warn};

use crate::application::remote::{ApiError, PostsApi, SessionCredential};
use crate::cache::CacheTrigger;
use crate::domain::posts::{BLOG_POSTS_TAG, NewPost};

pub(crate) const METRIC_POST_SUBMIT: &str = "folio_post_submit_total";

/// Shown to the user whenever the remote API could not be reached.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("blog API rejected the post with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("blog API unreachable: {detail}")]
    Transport { detail: String },
}

impl SubmitError {
    /// Text the form surfaces to the author.
    pub fn user_message(&self) -> &str {
        match self {
            SubmitError::Rejected { message, .. } => message,
            SubmitError::Transport { .. } => GENERIC_FAILURE_MESSAGE,
        }
    }

    /// Label value for `folio_post_submit_total{outcome}`.
    pub(crate) fn outcome(&self) -> &'static str {
        match self {
            SubmitError::Rejected { .. } => "rejected",
            SubmitError::Transport { .. } => "transport",
        }
    }
}

impl From<ApiError> for SubmitError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Status { status, message } => SubmitError::Rejected { status, message },
            ApiError::Transport(detail) | ApiError::Decode(detail) | ApiError::Request(detail) => {
                SubmitError::Transport { detail }
            }
        }
    }
}

/// Anything that can carry a validated post to the blog API.
#[async_trait]
pub trait PostSubmitter: Send + Sync {
    async fn submit_post(
        &self,
        post: &NewPost,
        credential: &SessionCredential,
    ) -> Result<(), SubmitError>;
}

#[derive(Clone)]
pub struct BlogWriteAction {
    api: Arc<dyn PostsApi>,
    trigger: CacheTrigger,
}

impl BlogWriteAction {
    pub fn new(api: Arc<dyn PostsApi>, trigger: CacheTrigger) -> Self {
        Self { api, trigger }
    }
}

#[async_trait]
impl PostSubmitter for BlogWriteAction {
    async fn submit_post(
        &self,
        post: &NewPost,
        credential: &SessionCredential,
    ) -> Result<(), SubmitError> {
        let post = post.normalized();
        let result = self
            .api
            .create_post(&post, credential)
            .await
            .map_err(SubmitError::from);

        match &result {
            Ok(()) => {
                counter!(METRIC_POST_SUBMIT, "outcome" => "created").increment(1);
                info!(
                    target: "folio::write",
                    tags = post.tags.len(),
                    "post published"
                );
                self.trigger.invalidate_tag(BLOG_POSTS_TAG);
            }
            Err(err) => {
                counter!(METRIC_POST_SUBMIT, "outcome" => err.outcome()).increment(1);
                warn!(target: "folio::write", error = %err, "post submission failed");
            }
        }

        result
    }
}
