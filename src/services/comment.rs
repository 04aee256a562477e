//! Comment service
//!
//! Comments are addressed through their post: a comment id that does not
//! belong to the given post is treated as missing.

use crate::db::repositories::{CommentRepository, PostRepository};
use crate::models::{
    is_author, is_visible_to, Comment, CommentInput, UncategorizedPolicy,
};
use anyhow::Context;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Error types for comment service operations
#[derive(Debug, thiserror::Error)]
pub enum CommentServiceError {
    /// Post or comment missing, or the post is not visible to the requester
    #[error("Not found: {0}")]
    NotFound(String),

    /// The requester did not write the comment
    #[error("Only the author may modify this comment on post {post_id}")]
    NotAuthor { post_id: i64 },

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Comment service
pub struct CommentService {
    comment_repo: Arc<dyn CommentRepository>,
    post_repo: Arc<dyn PostRepository>,
    policy: UncategorizedPolicy,
}

impl CommentService {
    pub fn new(
        comment_repo: Arc<dyn CommentRepository>,
        post_repo: Arc<dyn PostRepository>,
        policy: UncategorizedPolicy,
    ) -> Self {
        Self {
            comment_repo,
            post_repo,
            policy,
        }
    }

    /// Comment on a post the requester can see
    pub async fn add(
        &self,
        post_id: i64,
        author_id: i64,
        input: CommentInput,
    ) -> Result<Comment, CommentServiceError> {
        let post = self
            .post_repo
            .get_with_meta(post_id)
            .await
            .context("Failed to get post")?
            .filter(|p| {
                is_visible_to(&p.post, p.category.as_ref(), Some(author_id), Utc::now(), self.policy)
            })
            .ok_or_else(|| CommentServiceError::NotFound(format!("post {}", post_id)))?;

        let text = validate_text(input.text)?;
        let comment = Comment::new(post.post.id, author_id, text);
        let created = self
            .comment_repo
            .create(&comment)
            .await
            .context("Failed to create comment")?;

        info!(comment_id = created.id, post_id, author_id, "Comment added");
        Ok(created)
    }

    /// Load a comment for its author (edit and delete confirmation forms)
    pub async fn get_for_author(
        &self,
        post_id: i64,
        comment_id: i64,
        requester: i64,
    ) -> Result<Comment, CommentServiceError> {
        let comment = self.find_on_post(post_id, comment_id).await?;
        if !is_author(requester, &comment) {
            return Err(CommentServiceError::NotAuthor { post_id });
        }
        Ok(comment)
    }

    /// Replace a comment's text. Nothing is written unless `requester` is the author.
    pub async fn edit(
        &self,
        post_id: i64,
        comment_id: i64,
        requester: i64,
        input: CommentInput,
    ) -> Result<Comment, CommentServiceError> {
        self.get_for_author(post_id, comment_id, requester).await?;
        let text = validate_text(input.text)?;

        let updated = self
            .comment_repo
            .update_text(comment_id, &text)
            .await
            .context("Failed to update comment")?;

        info!(comment_id, post_id, "Comment edited");
        Ok(updated)
    }

    /// Delete a comment. Nothing is removed unless `requester` is the author.
    pub async fn delete(
        &self,
        post_id: i64,
        comment_id: i64,
        requester: i64,
    ) -> Result<(), CommentServiceError> {
        self.get_for_author(post_id, comment_id, requester).await?;

        self.comment_repo
            .delete(comment_id)
            .await
            .context("Failed to delete comment")?;

        info!(comment_id, post_id, "Comment deleted");
        Ok(())
    }

    async fn find_on_post(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Comment, CommentServiceError> {
        self.comment_repo
            .get_by_id(comment_id)
            .await
            .context("Failed to get comment")?
            .filter(|c| c.belongs_to(post_id))
            .ok_or_else(|| {
                CommentServiceError::NotFound(format!("comment {} on post {}", comment_id, post_id))
            })
    }
}

fn validate_text(text: String) -> Result<String, CommentServiceError> {
    if text.trim().is_empty() {
        return Err(CommentServiceError::ValidationError(
            "Comment cannot be empty".to_string(),
        ));
    }
    Ok(text)
}
