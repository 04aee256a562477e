//! Category service
//!
//! Administrator-managed categories:
//! - Create, read, update, delete
//! - Slug format and uniqueness validation
//!
//! Deleting a category keeps its posts; they become uncategorized.

use crate::db::repositories::CategoryRepository;
use crate::models::{
    is_valid_slug, limits, Category, CreateCategoryInput, UpdateCategoryInput,
};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

/// Error types for category service operations
#[derive(Debug, thiserror::Error)]
pub enum CategoryServiceError {
    /// Category slug already exists
    #[error("Category slug already exists: {0}")]
    DuplicateSlug(String),

    /// Category not found
    #[error("Category not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Internal error
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Category service for managing blog categories
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    /// Create a new category service
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    /// Create a new category
    ///
    /// # Errors
    /// - `ValidationError` for an empty or over-long title, or a malformed slug
    /// - `DuplicateSlug` if the slug is taken
    pub async fn create(&self, input: CreateCategoryInput) -> Result<Category, CategoryServiceError> {
        validate_title(&input.title)?;
        validate_slug(&input.slug)?;

        if self
            .repo
            .exists_by_slug(&input.slug)
            .await
            .context("Failed to check slug uniqueness")?
        {
            return Err(CategoryServiceError::DuplicateSlug(input.slug));
        }

        let category = Category::new(input.title, input.description, input.slug, input.is_published);
        let created = self
            .repo
            .create(&category)
            .await
            .context("Failed to create category")?;

        info!(category_id = created.id, slug = %created.slug, "Category created");
        Ok(created)
    }

    /// Get a category by ID
    pub async fn get_by_id(&self, id: i64) -> Result<Category, CategoryServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get category")?
            .ok_or_else(|| CategoryServiceError::NotFound(id.to_string()))
    }

    /// List categories by title; `published_only` is what post forms offer
    pub async fn list(&self, published_only: bool) -> Result<Vec<Category>, CategoryServiceError> {
        let categories = self
            .repo
            .list(published_only)
            .await
            .context("Failed to list categories")?;

        Ok(categories)
    }

    /// Update a category. Hiding it hides its posts from the public.
    pub async fn update(
        &self,
        id: i64,
        input: UpdateCategoryInput,
    ) -> Result<Category, CategoryServiceError> {
        let mut category = self.get_by_id(id).await?;

        if !input.has_changes() {
            return Ok(category);
        }

        if let Some(title) = input.title {
            validate_title(&title)?;
            category.title = title;
        }
        if let Some(description) = input.description {
            category.description = description;
        }
        if let Some(slug) = input.slug {
            validate_slug(&slug)?;
            if slug != category.slug
                && self
                    .repo
                    .exists_by_slug(&slug)
                    .await
                    .context("Failed to check slug uniqueness")?
            {
                return Err(CategoryServiceError::DuplicateSlug(slug));
            }
            category.slug = slug;
        }
        if let Some(is_published) = input.is_published {
            category.is_published = is_published;
        }

        let updated = self
            .repo
            .update(&category)
            .await
            .context("Failed to update category")?;

        info!(category_id = id, "Category updated");
        Ok(updated)
    }

    /// Delete a category; its posts stay, without a category
    pub async fn delete(&self, id: i64) -> Result<(), CategoryServiceError> {
        self.get_by_id(id).await?;

        self.repo
            .delete(id)
            .await
            .context("Failed to delete category")?;

        info!(category_id = id, "Category deleted");
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), CategoryServiceError> {
    if title.trim().is_empty() {
        return Err(CategoryServiceError::ValidationError(
            "Category title cannot be empty".to_string(),
        ));
    }
    if title.chars().count() > limits::CATEGORY_TITLE_MAX {
        return Err(CategoryServiceError::ValidationError(format!(
            "Category title cannot exceed {} characters",
            limits::CATEGORY_TITLE_MAX
        )));
    }
    Ok(())
}

fn validate_slug(slug: &str) -> Result<(), CategoryServiceError> {
    if !is_valid_slug(slug) {
        return Err(CategoryServiceError::ValidationError(format!(
            "Invalid slug '{}': use latin letters, digits, hyphen and underscore",
            slug
        )));
    }
    Ok(())
}
