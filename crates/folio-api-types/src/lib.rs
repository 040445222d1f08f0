//! Request and response shapes of the remote blog API.
//!
//! Field names follow the remote API's camelCase JSON. These types carry no
//! behavior beyond (de)serialization; Folio's domain layer wraps them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use time::OffsetDateTime;

/// A published blog post as returned by `GET /posts` and `GET /posts/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogPost {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<TagList>,
    pub author_id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default)]
    pub views: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(rename = "_count", default, skip_serializing_if = "Option::is_none")]
    pub count: Option<PostCounts>,
    #[serde(default)]
    pub is_featured: bool,
}

/// Tag payload of a post.
///
/// The API documents an array, but older records may carry a bare string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TagList {
    Many(Vec<String>),
    One(String),
}

/// Aggregates computed by the remote API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCounts {
    #[serde(default)]
    pub comments: u64,
}

/// Pagination metadata attached to list responses.
///
/// Only the commonly used keys are typed; anything else is preserved verbatim.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_pages: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Envelope of `GET /posts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostsEnvelope {
    #[serde(default)]
    pub data: Vec<BlogPost>,
    #[serde(default)]
    pub meta: PaginationMeta,
}

/// Envelope of `GET /posts/{id}`; `data` is `null` for unknown ids.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostEnvelope {
    #[serde(default)]
    pub data: Option<BlogPost>,
}

/// Body of `POST /posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Error body returned by the remote API on non-success statuses.
///
/// Observed shapes: `{"message": ".."}`, `{"error": ".."}` and
/// `{"error": {"message": ".."}}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<ApiErrorDetail>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiErrorDetail {
    Text(String),
    Object {
        #[serde(default)]
        message: Option<String>,
    },
}

impl ApiErrorBody {
    /// The most specific human-readable message present in the body.
    pub fn into_message(self) -> Option<String> {
        let nested = match self.error {
            Some(ApiErrorDetail::Text(text)) => Some(text),
            Some(ApiErrorDetail::Object { message }) => message,
            None => None,
        };
        self.message
            .or(nested)
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}
