//! Post shapes shared by the read and write pipelines.

use serde::{Deserialize, Serialize};

pub use folio_api_types::{BlogPost, PaginationMeta, PostCounts, PostsEnvelope, TagList};

use super::tags::{normalize_tags, renormalize};

/// Cache tag every post read is keyed against.
pub const BLOG_POSTS_TAG: &str = "blogPosts";

/// Form fields of a post draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostField {
    Title,
    Content,
    Tags,
}

impl PostField {
    pub const ALL: [PostField; 3] = [PostField::Title, PostField::Content, PostField::Tags];

    pub fn as_str(self) -> &'static str {
        match self {
            PostField::Title => "title",
            PostField::Content => "content",
            PostField::Tags => "tags",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "title" => Some(PostField::Title),
            "content" => Some(PostField::Content),
            "tags" => Some(PostField::Tags),
            _ => None,
        }
    }
}

/// Unsaved post input exactly as typed into a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogDraft {
    pub title: String,
    pub content: String,
    #[serde(rename = "tags")]
    pub tags_raw: String,
}

impl BlogDraft {
    pub fn get(&self, field: PostField) -> &str {
        match field {
            PostField::Title => &self.title,
            PostField::Content => &self.content,
            PostField::Tags => &self.tags_raw,
        }
    }

    pub fn set(&mut self, field: PostField, value: String) {
        match field {
            PostField::Title => self.title = value,
            PostField::Content => self.content = value,
            PostField::Tags => self.tags_raw = value,
        }
    }

    pub fn into_new_post(self) -> NewPost {
        NewPost {
            tags: normalize_tags(&self.tags_raw),
            title: self.title,
            content: self.content,
        }
    }
}

/// Normalized post payload ready for `POST /posts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl NewPost {
    /// Re-apply tag normalization so the outgoing list never holds blank entries.
    pub fn normalized(&self) -> Self {
        Self {
            title: self.title.clone(),
            content: self.content.clone(),
            tags: renormalize(&self.tags),
        }
    }
}

impl From<NewPost> for folio_api_types::CreatePostRequest {
    fn from(post: NewPost) -> Self {
        Self {
            title: post.title,
            content: post.content,
            tags: post.tags,
        }
    }
}

/// Read-side filter for post listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PostFilter {
    pub is_featured: Option<bool>,
}

impl PostFilter {
    pub fn featured(is_featured: bool) -> Self {
        Self {
            is_featured: Some(is_featured),
        }
    }

    /// Query pairs understood by the remote `GET /posts` endpoint.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(featured) = self.is_featured {
            pairs.push(("isFeatured", featured.to_string()));
        }
        pairs
    }

    /// Stable key used to address cached listings.
    pub fn cache_key(&self) -> String {
        let pairs = self.query_pairs();
        if pairs.is_empty() {
            return "posts".to_string();
        }
        let query = pairs
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        format!("posts?{query}")
    }
}

/// Tags of a post as a flat list, whatever shape the API sent.
pub fn post_tags(post: &BlogPost) -> Vec<String> {
    match &post.tags {
        Some(TagList::Many(tags)) => tags.clone(),
        Some(TagList::One(tag)) if !tag.trim().is_empty() => vec![tag.clone()],
        _ => Vec::new(),
    }
}

pub fn comment_count(post: &BlogPost) -> u64 {
    post.count.map(|count| count.comments).unwrap_or(0)
}

/// Two-letter author badge derived from the author id.
pub fn author_initials(author_id: &str) -> String {
    author_id.chars().take(2).collect::<String>().to_uppercase()
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn post(tags: Option<TagList>) -> BlogPost {
        BlogPost {
            id: "p1".to_string(),
            title: "Title".to_string(),
            content: "Some content".to_string(),
            tags,
            author_id: "clx9author".to_string(),
            created_at: datetime!(2025-03-01 10:00 UTC),
            views: 3,
            thumbnail: None,
            count: None,
            is_featured: false,
        }
    }

    #[test]
    fn draft_normalizes_tags_into_new_post() {
        let draft = BlogDraft {
            title: "Hello".to_string(),
            content: "Hello world!".to_string(),
            tags_raw: " rust, ,axum ".to_string(),
        };

        let new_post = draft.into_new_post();
        assert_eq!(new_post.tags, vec!["rust", "axum"]);
        assert_eq!(new_post.title, "Hello");
    }

    #[test]
    fn filter_query_omits_unset_options() {
        assert!(PostFilter::default().query_pairs().is_empty());
        assert_eq!(PostFilter::default().cache_key(), "posts");
        assert_eq!(
            PostFilter::featured(false).query_pairs(),
            vec![("isFeatured", "false".to_string())]
        );
        assert_eq!(PostFilter::featured(true).cache_key(), "posts?isFeatured=true");
    }

    #[test]
    fn tags_flatten_from_either_shape() {
        assert!(post_tags(&post(None)).is_empty());
        assert_eq!(
            post_tags(&post(Some(TagList::One("legacy".to_string())))),
            vec!["legacy"]
        );
        assert_eq!(
            post_tags(&post(Some(TagList::Many(vec!["a".into(), "b".into()])))),
            vec!["a", "b"]
        );
    }

    #[test]
    fn missing_counts_read_as_zero() {
        let mut record = post(None);
        assert_eq!(comment_count(&record), 0);
        record.count = Some(PostCounts { comments: 7 });
        assert_eq!(comment_count(&record), 7);
    }

    #[test]
    fn initials_take_first_two_characters() {
        assert_eq!(author_initials("clx9author"), "CL");
        assert_eq!(author_initials("a"), "A");
        assert_eq!(author_initials(""), "");
    }

    #[test]
    fn field_names_round_trip() {
        for field in PostField::ALL {
            assert_eq!(PostField::parse(field.as_str()), Some(field));
        }
        assert_eq!(PostField::parse("body"), None);
    }
}
