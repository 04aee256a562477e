//! Post service
//!
//! Listings (index, category, profile), the detail view, and author-only
//! writes. Every listing builds its own [`PostQuery`]; pages are resolved by
//! counting first and clamping the requested page into range.

use crate::db::repositories::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use crate::models::{
    is_author, is_visible_to, limits, Category, CommentWithAuthor, CreatePostInput, ListParams,
    PagedResult, Post, PostQuery, PostWithMeta, UncategorizedPolicy, UpdatePostInput, User,
    DEFAULT_PER_PAGE,
};
use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Error types for post service operations
#[derive(Debug, thiserror::Error)]
pub enum PostServiceError {
    /// Missing, or not visible to the requester
    #[error("Not found: {0}")]
    NotFound(String),

    /// The requester is not the post's author
    #[error("Only the author may modify post {post_id}")]
    NotAuthor { post_id: i64 },

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// A post with its comments, oldest comment first
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub post: PostWithMeta,
    pub comments: Vec<CommentWithAuthor>,
}

/// Repositories the post service reads and writes
pub struct PostRepositories {
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub users: Arc<dyn UserRepository>,
}

/// Post service
pub struct PostService {
    repos: PostRepositories,
    per_page: i64,
    policy: UncategorizedPolicy,
}

impl PostService {
    /// Create a post service with default page size and uncategorized policy
    pub fn new(repos: PostRepositories) -> Self {
        Self::with_options(repos, DEFAULT_PER_PAGE, UncategorizedPolicy::default())
    }

    /// Create a post service with explicit listing options
    pub fn with_options(repos: PostRepositories, per_page: i64, policy: UncategorizedPolicy) -> Self {
        Self {
            repos,
            per_page: per_page.max(1),
            policy,
        }
    }

    pub fn policy(&self) -> UncategorizedPolicy {
        self.policy
    }

    // ========================================================================
    // Listings
    // ========================================================================

    /// Index page: every publicly visible post
    pub async fn list_public(&self, page: i64) -> Result<PagedResult<PostWithMeta>, PostServiceError> {
        self.page(&PostQuery::public(Utc::now(), self.policy), page).await
    }

    /// Category page. The category itself must exist and be published.
    pub async fn list_category(
        &self,
        slug: &str,
        page: i64,
    ) -> Result<(Category, PagedResult<PostWithMeta>), PostServiceError> {
        let category = self
            .repos
            .categories
            .get_by_slug(slug)
            .await
            .context("Failed to get category by slug")?
            .filter(|c| c.is_published)
            .ok_or_else(|| PostServiceError::NotFound(format!("category '{}'", slug)))?;

        let query = PostQuery::public(Utc::now(), self.policy).in_category(slug);
        let posts = self.page(&query, page).await?;
        Ok((category, posts))
    }

    /// Profile page: the author sees all their posts, everyone else the public ones
    pub async fn list_profile(
        &self,
        username: &str,
        viewer: Option<i64>,
        page: i64,
    ) -> Result<(User, PagedResult<PostWithMeta>), PostServiceError> {
        let user = self
            .repos
            .users
            .get_by_username(username)
            .await
            .context("Failed to get user by username")?
            .ok_or_else(|| PostServiceError::NotFound(format!("user '{}'", username)))?;

        let query = PostQuery::for_profile(user.id, viewer, Utc::now(), self.policy);
        let posts = self.page(&query, page).await?;
        Ok((user, posts))
    }

    async fn page(
        &self,
        query: &PostQuery,
        requested: i64,
    ) -> Result<PagedResult<PostWithMeta>, PostServiceError> {
        let total = self
            .repos
            .posts
            .count(query)
            .await
            .context("Failed to count posts")?;
        let params = ListParams::clamped(requested, self.per_page, total);
        let items = self
            .repos
            .posts
            .list(query, &params)
            .await
            .context("Failed to list posts")?;

        Ok(PagedResult::new(items, total, &params))
    }

    // ========================================================================
    // Single post
    // ========================================================================

    /// Load a post if `viewer` may see it
    pub async fn get_visible(
        &self,
        post_id: i64,
        viewer: Option<i64>,
    ) -> Result<PostWithMeta, PostServiceError> {
        let post = self
            .repos
            .posts
            .get_with_meta(post_id)
            .await
            .context("Failed to get post")?
            .filter(|p| is_visible_to(&p.post, p.category.as_ref(), viewer, Utc::now(), self.policy))
            .ok_or_else(|| PostServiceError::NotFound(format!("post {}", post_id)))?;

        Ok(post)
    }

    /// Detail view: the post and its comments
    pub async fn detail(
        &self,
        post_id: i64,
        viewer: Option<i64>,
    ) -> Result<PostDetail, PostServiceError> {
        let post = self.get_visible(post_id, viewer).await?;
        let comments = self
            .repos
            .comments
            .list_for_post(post_id)
            .await
            .context("Failed to list comments")?;

        Ok(PostDetail { post, comments })
    }

    /// Load a post for its author (edit and delete confirmation forms)
    pub async fn get_for_author(
        &self,
        post_id: i64,
        requester: i64,
    ) -> Result<PostWithMeta, PostServiceError> {
        let post = self
            .repos
            .posts
            .get_with_meta(post_id)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| PostServiceError::NotFound(format!("post {}", post_id)))?;

        if !is_author(requester, &post.post) {
            return Err(PostServiceError::NotAuthor { post_id });
        }
        Ok(post)
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Create a post owned by `author_id`
    pub async fn create(
        &self,
        author_id: i64,
        input: CreatePostInput,
    ) -> Result<Post, PostServiceError> {
        validate_title(&input.title)?;
        validate_text(&input.text)?;
        self.ensure_references(input.category_id, input.location_id).await?;

        let post = Post::new(author_id, input);
        let created = self
            .repos
            .posts
            .create(&post)
            .await
            .context("Failed to create post")?;

        info!(post_id = created.id, author_id, "Post created");
        Ok(created)
    }

    /// Update a post. Nothing is written unless `requester` is the author.
    pub async fn update(
        &self,
        post_id: i64,
        requester: i64,
        input: UpdatePostInput,
    ) -> Result<Post, PostServiceError> {
        let mut post = self.owned_post(post_id, requester).await?;

        if !input.has_changes() {
            return Ok(post);
        }
        if let Some(title) = &input.title {
            validate_title(title)?;
        }
        if let Some(text) = &input.text {
            validate_text(text)?;
        }
        self.ensure_references(input.category_id.flatten(), input.location_id.flatten())
            .await?;

        input.apply_to(&mut post);
        let updated = self
            .repos
            .posts
            .update(&post)
            .await
            .context("Failed to update post")?;

        info!(post_id, "Post updated");
        Ok(updated)
    }

    /// Delete a post and its comments. Nothing is removed unless `requester` is the author.
    pub async fn delete(&self, post_id: i64, requester: i64) -> Result<(), PostServiceError> {
        self.owned_post(post_id, requester).await?;

        self.repos
            .posts
            .delete(post_id)
            .await
            .context("Failed to delete post")?;

        info!(post_id, "Post deleted");
        Ok(())
    }

    async fn owned_post(&self, post_id: i64, requester: i64) -> Result<Post, PostServiceError> {
        let post = self
            .repos
            .posts
            .get_by_id(post_id)
            .await
            .context("Failed to get post")?
            .ok_or_else(|| PostServiceError::NotFound(format!("post {}", post_id)))?;

        if !is_author(requester, &post) {
            return Err(PostServiceError::NotAuthor { post_id });
        }
        Ok(post)
    }

    async fn ensure_references(
        &self,
        category_id: Option<i64>,
        location_id: Option<i64>,
    ) -> Result<(), PostServiceError> {
        if let Some(id) = category_id {
            let found = self
                .repos
                .categories
                .get_by_id(id)
                .await
                .context("Failed to get category")?;
            if found.is_none() {
                return Err(PostServiceError::ValidationError(format!(
                    "Category {} does not exist",
                    id
                )));
            }
        }
        if let Some(id) = location_id {
            let found = self
                .repos
                .locations
                .get_by_id(id)
                .await
                .context("Failed to get location")?;
            if found.is_none() {
                return Err(PostServiceError::ValidationError(format!(
                    "Location {} does not exist",
                    id
                )));
            }
        }
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), PostServiceError> {
    if title.trim().is_empty() {
        return Err(PostServiceError::ValidationError(
            "Title cannot be empty".to_string(),
        ));
    }
    if title.chars().count() > limits::POST_TITLE_MAX {
        return Err(PostServiceError::ValidationError(format!(
            "Title cannot exceed {} characters",
            limits::POST_TITLE_MAX
        )));
    }
    Ok(())
}

fn validate_text(text: &str) -> Result<(), PostServiceError> {
    if text.trim().is_empty() {
        return Err(PostServiceError::ValidationError(
            "Text cannot be empty".to_string(),
        ));
    }
    Ok(())
}
