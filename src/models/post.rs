//! Post model
//!
//! A post is owned by exactly one author and may be filed under one category
//! and one location. `pub_date` may lie in the future to schedule publication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::default_true;
use super::{Category, Location};

/// Maximum length of a post title
pub const MAX_TITLE_LENGTH: usize = 256;

/// Post entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    /// Unique identifier
    pub id: i64,
    /// Post title
    pub title: String,
    /// Body text
    pub text: String,
    /// Publication time; future values schedule the post
    pub pub_date: DateTime<Utc>,
    /// Image reference
    pub image: Option<String>,
    /// Unpublished posts are only visible to their author
    pub is_published: bool,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Owning user
    pub author_id: i64,
    /// Category, cleared when the category is deleted
    pub category_id: Option<i64>,
    /// Location, cleared when the location is deleted
    pub location_id: Option<i64>,
}

impl Post {
    /// Build an unsaved post for `author_id` from creation input
    pub fn new(author_id: i64, input: CreatePostInput) -> Self {
        Self {
            id: 0, // Will be set by the database
            title: input.title,
            text: input.text,
            pub_date: input.pub_date,
            image: input.image,
            is_published: input.is_published,
            created_at: Utc::now(),
            author_id,
            category_id: input.category_id,
            location_id: input.location_id,
        }
    }
}

/// Post joined with the data listings and detail views show
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithMeta {
    #[serde(flatten)]
    pub post: Post,
    pub author_username: String,
    pub category: Option<Category>,
    pub location: Option<Location>,
    pub comment_count: i64,
}

/// Input for creating a post
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePostInput {
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_true")]
    pub is_published: bool,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub location_id: Option<i64>,
}

impl CreatePostInput {
    pub fn new(title: impl Into<String>, text: impl Into<String>, pub_date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
            pub_date,
            image: None,
            is_published: true,
            category_id: None,
            location_id: None,
        }
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_location(mut self, location_id: i64) -> Self {
        self.location_id = Some(location_id);
        self
    }

    pub fn unpublished(mut self) -> Self {
        self.is_published = false;
        self
    }
}

/// Input for updating a post.
///
/// `None` leaves a field unchanged; for the nullable fields `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub text: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    pub image: Option<Option<String>>,
    pub is_published: Option<bool>,
    pub category_id: Option<Option<i64>>,
    pub location_id: Option<Option<i64>>,
}

impl UpdatePostInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_category(mut self, category_id: Option<i64>) -> Self {
        self.category_id = Some(category_id);
        self
    }

    /// Check if any field is set for update
    pub fn has_changes(&self) -> bool {
        self.title.is_some()
            || self.text.is_some()
            || self.pub_date.is_some()
            || self.image.is_some()
            || self.is_published.is_some()
            || self.category_id.is_some()
            || self.location_id.is_some()
    }

    /// Apply the set fields onto `post`
    pub fn apply_to(self, post: &mut Post) {
        if let Some(title) = self.title {
            post.title = title;
        }
        if let Some(text) = self.text {
            post.text = text;
        }
        if let Some(pub_date) = self.pub_date {
            post.pub_date = pub_date;
        }
        if let Some(image) = self.image {
            post.image = image;
        }
        if let Some(is_published) = self.is_published {
            post.is_published = is_published;
        }
        if let Some(category_id) = self.category_id {
            post.category_id = category_id;
        }
        if let Some(location_id) = self.location_id {
            post.location_id = location_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_new_post_from_input() {
        let when = Utc::now() + Duration::days(1);
        let mut input = CreatePostInput::new("Title", "Body", when).with_category(3);
        input.image = Some("posts_images/a.png".to_string());
        let post = Post::new(42, input);

        assert_eq!(post.id, 0);
        assert_eq!(post.author_id, 42);
        assert_eq!(post.pub_date, when);
        assert_eq!(post.category_id, Some(3));
        assert_eq!(post.location_id, None);
        assert!(post.is_published);
    }

    #[test]
    fn test_create_input_deserialize_defaults() {
        let input: CreatePostInput = serde_json::from_str(
            r#"{"title": "T", "text": "B", "pub_date": "2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert!(input.is_published);
        assert!(input.category_id.is_none());
        assert!(input.image.is_none());
    }

    #[test]
    fn test_update_apply_clears_nullable_fields() {
        let mut post = Post::new(
            1,
            CreatePostInput::new("T", "B", Utc::now()).with_category(5).with_location(6),
        );

        let update = UpdatePostInput {
            is_published: Some(false),
            ..UpdatePostInput::new().with_title("New").with_category(None)
        };
        assert!(update.has_changes());
        update.apply_to(&mut post);

        assert_eq!(post.title, "New");
        assert_eq!(post.category_id, None);
        assert_eq!(post.location_id, Some(6));
        assert!(!post.is_published);
    }

    #[test]
    fn test_meta_serializes_flat() {
        let post = Post::new(1, CreatePostInput::new("T", "B", Utc::now()));
        let meta = PostWithMeta {
            post,
            author_username: "alice".to_string(),
            category: None,
            location: None,
            comment_count: 2,
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["title"], "T");
        assert_eq!(json["author_username"], "alice");
        assert_eq!(json["comment_count"], 2);
    }
}
