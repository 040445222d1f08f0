//! Form-post variant of the create-post flow.
//!
//! Fields go straight to the blog API after tag normalization. Only the
//! `required` markers of the HTML form are enforced; length rules are left to
//! the remote API.

use std::sync::Arc;

use metrics::counter;
use serde::Deserialize;
use tracing::{info, warn};

use crate::application::posts::SubmitError;
use crate::application::posts::write::METRIC_POST_SUBMIT;
use crate::application::remote::{PostsApi, SessionCredential};
use crate::cache::CacheTrigger;
use crate::domain::posts::{BLOG_POSTS_TAG, NewPost, PostField};
use crate::domain::tags::normalize_tags;

/// Raw `application/x-www-form-urlencoded` body of the server form.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPostFields {
    pub title: String,
    pub content: String,
    pub tags: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerSubmitOutcome {
    Published,
    /// A required field arrived blank; nothing was sent.
    Incomplete(PostField),
    Failed(SubmitError),
}

#[derive(Clone)]
pub struct ServerPostForm {
    api: Arc<dyn PostsApi>,
    trigger: CacheTrigger,
}

impl ServerPostForm {
    pub fn new(api: Arc<dyn PostsApi>, trigger: CacheTrigger) -> Self {
        Self { api, trigger }
    }

    pub async fn publish(
        &self,
        fields: RawPostFields,
        credential: &SessionCredential,
    ) -> ServerSubmitOutcome {
        if fields.title.trim().is_empty() {
            return ServerSubmitOutcome::Incomplete(PostField::Title);
        }
        if fields.content.trim().is_empty() {
            return ServerSubmitOutcome::Incomplete(PostField::Content);
        }

        let post = NewPost {
            tags: normalize_tags(&fields.tags),
            title: fields.title,
            content: fields.content,
        };

        match self.api.create_post(&post, credential).await {
            Ok(()) => {
                counter!(METRIC_POST_SUBMIT, "outcome" => "created").increment(1);
                info!(target: "folio::server_form", "post published from server form");
                self.trigger.invalidate_tag(BLOG_POSTS_TAG);
                ServerSubmitOutcome::Published
            }
            Err(err) => {
                let err = SubmitError::from(err);
                counter!(METRIC_POST_SUBMIT, "outcome" => err.outcome()).increment(1);
                warn!(target: "folio::server_form", error = %err, "server form submission failed");
                ServerSubmitOutcome::Failed(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::application::remote::ApiError;
    use crate::cache::{CacheConfig, CachedRead, ReadCache, ReadKey};
    use crate::domain::posts::{BlogPost, PostFilter, PostsEnvelope};

    use super::*;

    #[derive(Default)]
    struct CapturingApi {
        fail_with: Option<ApiError>,
        sent: Mutex<Vec<NewPost>>,
    }

    #[async_trait]
    impl PostsApi for CapturingApi {
        async fn list_posts(&self, _filter: &PostFilter) -> Result<PostsEnvelope, ApiError> {
            Ok(PostsEnvelope::default())
        }

        async fn find_post(&self, _id: &str) -> Result<Option<BlogPost>, ApiError> {
            Ok(None)
        }

        async fn create_post(
            &self,
            post: &NewPost,
            _credential: &SessionCredential,
        ) -> Result<(), ApiError> {
            self.sent.lock().expect("sent lock").push(post.clone());
            match &self.fail_with {
                Some(err) => Err(err.clone()),
                None => Ok(()),
            }
        }
    }

    fn fields(title: &str, content: &str, tags: &str) -> RawPostFields {
        RawPostFields {
            title: title.to_string(),
            content: content.to_string(),
            tags: tags.to_string(),
        }
    }

    #[tokio::test]
    async fn publishes_with_normalized_tags_and_invalidates() {
        let api = Arc::new(CapturingApi::default());
        let cache = Arc::new(ReadCache::new(&CacheConfig::default()));
        let key = ReadKey::post(BLOG_POSTS_TAG, "p1");
        cache.put(key.clone(), CachedRead::Post(None), 0);
        let form = ServerPostForm::new(api.clone(), CacheTrigger::new(Some(cache.clone())));

        let outcome = form
            .publish(
                fields("Hi", "short", "a, ,b"),
                &SessionCredential::anonymous(),
            )
            .await;

        assert_eq!(outcome, ServerSubmitOutcome::Published);
        assert_eq!(api.sent.lock().expect("sent lock")[0].tags, vec!["a", "b"]);
        assert!(cache.get(&key).is_none());
    }

    #[tokio::test]
    async fn blank_required_fields_are_not_sent() {
        let api = Arc::new(CapturingApi::default());
        let form = ServerPostForm::new(api.clone(), CacheTrigger::disabled());

        let outcome = form
            .publish(fields("  ", "body", ""), &SessionCredential::anonymous())
            .await;

        assert_eq!(outcome, ServerSubmitOutcome::Incomplete(PostField::Title));
        assert!(api.sent.lock().expect("sent lock").is_empty());
    }

    #[tokio::test]
    async fn remote_failures_are_surfaced() {
        let api = Arc::new(CapturingApi {
            fail_with: Some(ApiError::Status {
                status: 403,
                message: "Forbidden".to_string(),
            }),
            ..Default::default()
        });
        let form = ServerPostForm::new(api, CacheTrigger::disabled());

        let outcome = form
            .publish(fields("Title", "Content", ""), &SessionCredential::anonymous())
            .await;

        assert_eq!(
            outcome,
            ServerSubmitOutcome::Failed(SubmitError::Rejected {
                status: 403,
                message: "Forbidden".to_string()
            })
        );
    }
}
