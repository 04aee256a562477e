//! Category model
//!
//! Categories are administrator-managed groupings of posts. A category can be
//! hidden, which also hides every post filed under it.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum length of a category title
pub const MAX_TITLE_LENGTH: usize = 256;

/// Slugs may contain latin letters, digits, hyphen and underscore.
static SLUG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid regex"));

/// Category entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Unique identifier
    pub id: i64,
    /// Category title
    pub title: String,
    /// Category description
    pub description: String,
    /// URL slug (unique)
    pub slug: String,
    /// Hidden categories hide their posts
    pub is_published: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Category {
    /// Create a new Category.
    ///
    /// The ID will be set to 0 and should be assigned by the database.
    pub fn new(title: String, description: String, slug: String, is_published: bool) -> Self {
        Self {
            id: 0, // Will be set by the database
            title,
            description,
            slug,
            is_published,
            created_at: Utc::now(),
        }
    }
}

/// Check whether `slug` is usable in a category URL
pub fn is_valid_slug(slug: &str) -> bool {
    SLUG_RE.is_match(slug)
}

/// Input for creating a new category
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategoryInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub slug: String,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

impl CreateCategoryInput {
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            slug: slug.into(),
            is_published: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn unpublished(mut self) -> Self {
        self.is_published = false;
        self
    }
}

/// Input for updating a category
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategoryInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub is_published: Option<bool>,
}

impl UpdateCategoryInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_published(mut self, is_published: bool) -> Self {
        self.is_published = Some(is_published);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Check if any field is set for update
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.slug.is_some()
            || self.is_published.is_some()
    }
}

pub(crate) fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("travel"));
        assert!(is_valid_slug("road_trips-2024"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("with space"));
        assert!(!is_valid_slug("путешествия"));
        assert!(!is_valid_slug("a/b"));
    }

    #[test]
    fn test_create_input_defaults_to_published() {
        let input: CreateCategoryInput =
            serde_json::from_str(r#"{"title": "Travel", "slug": "travel"}"#).unwrap();
        assert!(input.is_published);
        assert!(input.description.is_empty());

        let hidden = CreateCategoryInput::new("Drafts", "drafts").unpublished();
        assert!(!hidden.is_published);
    }

    #[test]
    fn test_update_has_changes() {
        assert!(!UpdateCategoryInput::new().has_changes());
        assert!(UpdateCategoryInput::new().with_published(false).has_changes());
    }
}
