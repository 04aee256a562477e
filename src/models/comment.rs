//! Comment model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Comment entity.
///
/// Comments have no visibility flag of their own; they follow their post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub text: String,
    pub post_id: i64,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(post_id: i64, author_id: i64, text: String) -> Self {
        Self {
            id: 0, // Will be set by the database
            text,
            post_id,
            author_id,
            created_at: Utc::now(),
        }
    }

    /// Check whether this comment hangs off `post_id`
    pub fn belongs_to(&self, post_id: i64) -> bool {
        self.post_id == post_id
    }
}

/// Comment with author info for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentWithAuthor {
    #[serde(flatten)]
    pub comment: Comment,
    pub author_username: String,
}

/// Input for creating or editing a comment
#[derive(Debug, Clone, Deserialize)]
pub struct CommentInput {
    pub text: String,
}

impl CommentInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_belongs_to() {
        let comment = Comment::new(7, 1, "Nice".to_string());
        assert!(comment.belongs_to(7));
        assert!(!comment.belongs_to(8));
    }
}
