use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::application::remote::{ApiError, PostsApi};
use crate::cache::{CachedRead, ReadCache, ReadKey};
use crate::domain::posts::{BLOG_POSTS_TAG, BlogPost, PostFilter, PostsEnvelope};

/// How a read interacts with the tagged cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CacheDirective {
    /// Serve from the cache when present, populate it on a miss.
    #[default]
    Default,
    /// Always go to the remote API and leave the cache untouched.
    NoStore,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("blog API unreachable: {0}")]
    Transport(String),
    #[error("blog API responded with {status}: {message}")]
    Remote { status: u16, message: String },
    #[error("blog API response could not be decoded: {0}")]
    Decode(String),
}

impl From<ApiError> for ReadError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Transport(detail) | ApiError::Request(detail) => Self::Transport(detail),
            ApiError::Status { status, message } => Self::Remote { status, message },
            ApiError::Decode(detail) => Self::Decode(detail),
        }
    }
}

#[derive(Clone)]
pub struct BlogReadService {
    api: Arc<dyn PostsApi>,
    cache: Option<Arc<ReadCache>>,
}

impl BlogReadService {
    pub fn new(api: Arc<dyn PostsApi>, cache: Option<Arc<ReadCache>>) -> Self {
        Self { api, cache }
    }

    pub async fn get_posts(
        &self,
        filter: &PostFilter,
        directive: CacheDirective,
    ) -> Result<PostsEnvelope, ReadError> {
        let Some(cache) = self.cache_for(directive) else {
            return Ok(self.api.list_posts(filter).await?);
        };

        let key = ReadKey::list(BLOG_POSTS_TAG, filter);
        if let Some(CachedRead::List(envelope)) = cache.get(&key) {
            return Ok(envelope);
        }

        let observed = cache.epoch(BLOG_POSTS_TAG);
        let envelope = self.api.list_posts(filter).await?;
        if !cache.put(key, CachedRead::List(envelope.clone()), observed) {
            debug!(
                target: "folio::read",
                query = %filter.cache_key(),
                "discarded listing fetched before invalidation"
            );
        }
        Ok(envelope)
    }

    /// `Ok(None)` when the remote API has no post with this id.
    pub async fn get_post_by_id(&self, id: &str) -> Result<Option<BlogPost>, ReadError> {
        self.fetch_post(id, CacheDirective::Default).await
    }

    pub async fn fetch_post(
        &self,
        id: &str,
        directive: CacheDirective,
    ) -> Result<Option<BlogPost>, ReadError> {
        let Some(cache) = self.cache_for(directive) else {
            return Ok(self.api.find_post(id).await?);
        };

        let key = ReadKey::post(BLOG_POSTS_TAG, id);
        if let Some(CachedRead::Post(post)) = cache.get(&key) {
            return Ok(post);
        }

        let observed = cache.epoch(BLOG_POSTS_TAG);
        let post = self.api.find_post(id).await?;
        if !cache.put(key, CachedRead::Post(post.clone()), observed) {
            debug!(
                target: "folio::read",
                post_id = id,
                "discarded post fetched before invalidation"
            );
        }
        Ok(post)
    }

    /// Ids of every post the remote API lists.
    pub async fn post_ids(&self) -> Result<Vec<String>, ReadError> {
        let envelope = self
            .get_posts(&PostFilter::default(), CacheDirective::Default)
            .await?;
        Ok(envelope.data.into_iter().map(|post| post.id).collect())
    }

    fn cache_for(&self, directive: CacheDirective) -> Option<&ReadCache> {
        match directive {
            CacheDirective::Default => self.cache.as_deref(),
            CacheDirective::NoStore => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use time::macros::datetime;

    use crate::application::remote::SessionCredential;
    use crate::cache::CacheConfig;
    use crate::domain::posts::NewPost;

    use super::*;

    #[derive(Default)]
    struct StubApi {
        posts: Mutex<Vec<BlogPost>>,
        list_calls: AtomicUsize,
        find_calls: AtomicUsize,
    }

    fn sample(id: &str) -> BlogPost {
        BlogPost {
            id: id.to_string(),
            title: format!("Post {id}"),
            content: "Body of the post".to_string(),
            tags: None,
            author_id: "author".to_string(),
            created_at: datetime!(2025-01-01 00:00 UTC),
            views: 0,
            thumbnail: None,
            count: None,
            is_featured: false,
        }
    }

    #[async_trait]
    impl PostsApi for StubApi {
        async fn list_posts(&self, _filter: &PostFilter) -> Result<PostsEnvelope, ApiError> {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            Ok(PostsEnvelope {
                data: self.posts.lock().expect("posts lock").clone(),
                ..Default::default()
            })
        }

        async fn find_post(&self, id: &str) -> Result<Option<BlogPost>, ApiError> {
            self.find_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .posts
                .lock()
                .expect("posts lock")
                .iter()
                .find(|post| post.id == id)
                .cloned())
        }

        async fn create_post(
            &self,
            _post: &NewPost,
            _credential: &SessionCredential,
        ) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn service(api: Arc<StubApi>) -> (BlogReadService, Arc<ReadCache>) {
        let cache = Arc::new(ReadCache::new(&CacheConfig::default()));
        (BlogReadService::new(api, Some(cache.clone())), cache)
    }

    #[tokio::test]
    async fn default_reads_are_served_from_cache() {
        let api = Arc::new(StubApi::default());
        api.posts.lock().expect("posts lock").push(sample("p1"));
        let (reads, _) = service(api.clone());

        let filter = PostFilter::default();
        reads.get_posts(&filter, CacheDirective::Default).await.expect("first read");
        reads.get_posts(&filter, CacheDirective::Default).await.expect("second read");

        assert_eq!(api.list_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_store_reads_bypass_and_skip_population() {
        let api = Arc::new(StubApi::default());
        let (reads, cache) = service(api.clone());

        let filter = PostFilter::featured(false);
        reads.get_posts(&filter, CacheDirective::NoStore).await.expect("read");
        reads.get_posts(&filter, CacheDirective::NoStore).await.expect("read");

        assert_eq!(api.list_calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn invalidation_forces_a_fresh_listing() {
        let api = Arc::new(StubApi::default());
        let (reads, cache) = service(api.clone());
        let filter = PostFilter::default();

        let before = reads.get_posts(&filter, CacheDirective::Default).await.expect("read");
        assert!(before.data.is_empty());

        api.posts.lock().expect("posts lock").push(sample("p2"));
        cache.invalidate_tag(BLOG_POSTS_TAG);

        let after = reads.get_posts(&filter, CacheDirective::Default).await.expect("read");
        assert_eq!(after.data.len(), 1);
    }

    #[tokio::test]
    async fn unknown_ids_are_none_and_cached_as_such() {
        let api = Arc::new(StubApi::default());
        let (reads, _) = service(api.clone());

        assert_eq!(reads.get_post_by_id("missing").await.expect("read"), None);
        assert_eq!(reads.get_post_by_id("missing").await.expect("read"), None);
        assert_eq!(api.find_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn post_ids_lists_every_post() {
        let api = Arc::new(StubApi::default());
        api.posts
            .lock()
            .expect("posts lock")
            .extend([sample("a"), sample("b")]);
        let reads = BlogReadService::new(api, None);

        assert_eq!(reads.post_ids().await.expect("ids"), vec!["a", "b"]);
    }

    #[test]
    fn api_errors_map_onto_read_errors() {
        assert_eq!(
            ReadError::from(ApiError::Status {
                status: 503,
                message: "down".to_string()
            }),
            ReadError::Remote {
                status: 503,
                message: "down".to_string()
            }
        );
        assert!(matches!(
            ReadError::from(ApiError::Request("bad url".to_string())),
            ReadError::Transport(_)
        ));
    }
}
