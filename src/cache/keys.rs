//! Read-cache keys.

use crate::domain::posts::PostFilter;

/// Addresses one cached read result.
///
/// Every key belongs to an invalidation tag; invalidating the tag drops all
/// of its keys at once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReadKey {
    pub tag: String,
    pub resource: ReadResource,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReadResource {
    /// A post listing, identified by its filter's query form.
    List(String),
    /// A single post by id.
    Post(String),
}

impl ReadKey {
    pub fn list(tag: &str, filter: &PostFilter) -> Self {
        Self {
            tag: tag.to_string(),
            resource: ReadResource::List(filter.cache_key()),
        }
    }

    pub fn post(tag: &str, id: &str) -> Self {
        Self {
            tag: tag.to_string(),
            resource: ReadResource::Post(id.to_string()),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tag == tag
    }
}
