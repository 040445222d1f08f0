//! Field rules for post drafts.
//!
//! Lengths are counted in characters, not bytes.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use serde::{Serialize, Serializer, ser::SerializeMap};

use super::posts::{BlogDraft, PostField};

pub const TITLE_LENGTH: RangeInclusive<usize> = 3..=200;
pub const CONTENT_LENGTH: RangeInclusive<usize> = 10..=5000;

/// Per-field violation messages, ordered by field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<PostField, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: PostField, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    /// Replace the messages of one field; an empty list clears it.
    pub fn replace(&mut self, field: PostField, messages: Vec<String>) {
        if messages.is_empty() {
            self.errors.remove(&field);
        } else {
            self.errors.insert(field, messages);
        }
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn has(&self, field: PostField) -> bool {
        self.errors.contains_key(&field)
    }

    pub fn messages(&self, field: PostField) -> &[String] {
        self.errors.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (PostField, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (*field, messages.as_slice()))
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.errors.len()))?;
        for (field, messages) in &self.errors {
            map.serialize_entry(field.as_str(), messages)?;
        }
        map.end()
    }
}

/// A draft that passed [`PostSchema::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidDraft(BlogDraft);

impl ValidDraft {
    pub fn into_draft(self) -> BlogDraft {
        self.0
    }
}

/// Validation rules for the create-post form.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostSchema;

impl PostSchema {
    pub fn validate(draft: &BlogDraft) -> Result<ValidDraft, FieldErrors> {
        let mut errors = FieldErrors::new();
        for field in PostField::ALL {
            errors.replace(field, Self::validate_field(field, draft.get(field)));
        }

        if errors.is_empty() {
            Ok(ValidDraft(draft.clone()))
        } else {
            Err(errors)
        }
    }

    /// Messages for a single field; empty when the value is acceptable.
    pub fn validate_field(field: PostField, value: &str) -> Vec<String> {
        match field {
            PostField::Title => check_length(
                value,
                &TITLE_LENGTH,
                "Title must be at least 3 characters",
                "Title must be less than 200 characters",
            ),
            PostField::Content => check_length(
                value,
                &CONTENT_LENGTH,
                "Content must be at least 10 characters",
                "Content must be less than 5000 characters",
            ),
            PostField::Tags => Vec::new(),
        }
    }
}

fn check_length(
    value: &str,
    bounds: &RangeInclusive<usize>,
    too_short: &str,
    too_long: &str,
) -> Vec<String> {
    let length = value.chars().count();
    if length < *bounds.start() {
        vec![too_short.to_string()]
    } else if length > *bounds.end() {
        vec![too_long.to_string()]
    } else {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title_len: usize, content_len: usize) -> BlogDraft {
        BlogDraft {
            title: "t".repeat(title_len),
            content: "c".repeat(content_len),
            tags_raw: String::new(),
        }
    }

    #[test]
    fn title_bounds() {
        let short = PostSchema::validate(&draft(2, 20)).expect_err("2 chars is too short");
        assert_eq!(
            short.messages(PostField::Title),
            ["Title must be at least 3 characters"]
        );
        assert!(PostSchema::validate(&draft(3, 20)).is_ok());
        assert!(PostSchema::validate(&draft(200, 20)).is_ok());
        let long = PostSchema::validate(&draft(201, 20)).expect_err("201 chars is too long");
        assert_eq!(
            long.messages(PostField::Title),
            ["Title must be less than 200 characters"]
        );
    }

    #[test]
    fn content_bounds() {
        let short = PostSchema::validate(&draft(5, 9)).expect_err("9 chars is too short");
        assert!(short.has(PostField::Content));
        assert!(!short.has(PostField::Title));
        assert!(PostSchema::validate(&draft(5, 10)).is_ok());
        assert!(PostSchema::validate(&draft(5, 5000)).is_ok());
        assert!(PostSchema::validate(&draft(5, 5001)).is_err());
    }

    #[test]
    fn reports_every_invalid_field_at_once() {
        let errors = PostSchema::validate(&draft(0, 0)).expect_err("empty draft is invalid");
        let fields: Vec<_> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec![PostField::Title, PostField::Content]);
    }

    #[test]
    fn tags_are_never_rejected() {
        assert!(PostSchema::validate_field(PostField::Tags, ",,, ,").is_empty());
    }

    #[test]
    fn length_counts_characters_not_bytes() {
        let mut candidate = draft(0, 20);
        candidate.title = "日本語".to_string();
        assert!(PostSchema::validate(&candidate).is_ok());
    }

    #[test]
    fn errors_serialize_by_field_name() {
        let errors = PostSchema::validate(&draft(1, 20)).expect_err("invalid title");
        let json = serde_json::to_value(&errors).expect("errors serialize");
        assert_eq!(
            json,
            serde_json::json!({"title": ["Title must be at least 3 characters"]})
        );
    }
}
