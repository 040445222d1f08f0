//! Port to the remote blog API.

use async_trait::async_trait;
use axum::http::HeaderValue;
use thiserror::Error;

use crate::domain::posts::{BlogPost, NewPost, PostFilter, PostsEnvelope};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("remote API unreachable: {0}")]
    Transport(String),
    #[error("remote API responded with status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode remote response: {0}")]
    Decode(String),
    #[error("invalid outbound request: {0}")]
    Request(String),
}

impl ApiError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Session credential of the current visitor, forwarded verbatim on writes.
///
/// Holds the raw `Cookie` header of the inbound request. It is opaque to Folio.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SessionCredential(Option<HeaderValue>);

impl SessionCredential {
    /// Blank values read as anonymous; bytes that cannot form a header value
    /// (control characters) are dropped the same way.
    pub fn from_cookie_header(value: impl AsRef<[u8]>) -> Self {
        let bytes = value.as_ref();
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Self(None);
        }
        Self(HeaderValue::from_bytes(bytes).ok())
    }

    /// Join several `Cookie` header values with `"; "`, keeping their raw bytes.
    pub fn from_header_values<'a>(values: impl IntoIterator<Item = &'a HeaderValue>) -> Self {
        let mut joined = Vec::new();
        for value in values {
            if !joined.is_empty() {
                joined.extend_from_slice(b"; ");
            }
            joined.extend_from_slice(value.as_bytes());
        }
        Self::from_cookie_header(joined)
    }

    pub fn anonymous() -> Self {
        Self(None)
    }

    pub fn cookie_header(&self) -> Option<&HeaderValue> {
        self.0.as_ref()
    }

    pub fn is_anonymous(&self) -> bool {
        self.0.is_none()
    }
}

impl std::fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(_) => f.write_str("SessionCredential(<redacted>)"),
            None => f.write_str("SessionCredential(anonymous)"),
        }
    }
}

#[async_trait]
pub trait PostsApi: Send + Sync {
    async fn list_posts(&self, filter: &PostFilter) -> Result<PostsEnvelope, ApiError>;

    /// `Ok(None)` when the remote API does not know the id.
    async fn find_post(&self, id: &str) -> Result<Option<BlogPost>, ApiError>;

    async fn create_post(
        &self,
        post: &NewPost,
        credential: &SessionCredential,
    ) -> Result<(), ApiError>;
}
