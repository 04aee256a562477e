//! Category repository
//!
//! Database operations for categories.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Category;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Category repository trait
#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// Create a new category
    async fn create(&self, category: &Category) -> Result<Category>;

    /// Get category by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Category>>;

    /// Get category by slug
    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>>;

    /// List categories ordered by title; `published_only` hides unpublished ones
    async fn list(&self, published_only: bool) -> Result<Vec<Category>>;

    /// Update a category
    async fn update(&self, category: &Category) -> Result<Category>;

    /// Delete a category; its posts lose the reference
    async fn delete(&self, id: i64) -> Result<()>;

    /// Check if a slug is taken
    async fn exists_by_slug(&self, slug: &str) -> Result<bool>;
}

/// SQLx-based category repository implementation
pub struct SqlxCategoryRepository {
    pool: DynDatabasePool,
}

impl SqlxCategoryRepository {
    /// Create a new SQLx category repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CategoryRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CategoryRepository for SqlxCategoryRepository {
    async fn create(&self, category: &Category) -> Result<Category> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_category_sqlite(self.pool.sqlite()?, category).await,
            DatabaseDriver::Mysql => create_category_mysql(self.pool.mysql()?, category).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_category_by_id_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_category_by_id_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_category_by_slug_sqlite(self.pool.sqlite()?, slug).await,
            DatabaseDriver::Mysql => get_category_by_slug_mysql(self.pool.mysql()?, slug).await,
        }
    }

    async fn list(&self, published_only: bool) -> Result<Vec<Category>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_categories_sqlite(self.pool.sqlite()?, published_only).await,
            DatabaseDriver::Mysql => list_categories_mysql(self.pool.mysql()?, published_only).await,
        }
    }

    async fn update(&self, category: &Category) -> Result<Category> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_category_sqlite(self.pool.sqlite()?, category).await,
            DatabaseDriver::Mysql => update_category_mysql(self.pool.mysql()?, category).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_category_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_category_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn exists_by_slug(&self, slug: &str) -> Result<bool> {
        Ok(self.get_by_slug(slug).await?.is_some())
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_category_sqlite(pool: &SqlitePool, category: &Category) -> Result<Category> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO categories (title, description, slug, is_published, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&category.title)
    .bind(&category.description)
    .bind(&category.slug)
    .bind(category.is_published)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create category")?;

    Ok(Category {
        id: result.last_insert_rowid(),
        created_at: now,
        ..category.clone()
    })
}

async fn get_category_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by ID")?;

    Ok(row.map(|row| row_to_category_sqlite(&row)))
}

async fn get_category_by_slug_sqlite(pool: &SqlitePool, slug: &str) -> Result<Option<Category>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE slug = ?
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by slug")?;

    Ok(row.map(|row| row_to_category_sqlite(&row)))
}

async fn list_categories_sqlite(pool: &SqlitePool, published_only: bool) -> Result<Vec<Category>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE (? = 0 OR is_published = 1)
        ORDER BY title ASC, id ASC
        "#,
    )
    .bind(published_only)
    .fetch_all(pool)
    .await
    .context("Failed to list categories")?;

    Ok(rows.iter().map(row_to_category_sqlite).collect())
}

async fn update_category_sqlite(pool: &SqlitePool, category: &Category) -> Result<Category> {
    sqlx::query(
        r#"
        UPDATE categories
        SET title = ?, description = ?, slug = ?, is_published = ?
        WHERE id = ?
        "#,
    )
    .bind(&category.title)
    .bind(&category.description)
    .bind(&category.slug)
    .bind(category.is_published)
    .bind(category.id)
    .execute(pool)
    .await
    .context("Failed to update category")?;

    get_category_by_id_sqlite(pool, category.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Category not found after update"))
}

async fn delete_category_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete category")?;

    Ok(())
}

pub(crate) fn row_to_category_sqlite(row: &sqlx::sqlite::SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        slug: row.get("slug"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_category_mysql(pool: &MySqlPool, category: &Category) -> Result<Category> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO categories (title, description, slug, is_published, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&category.title)
    .bind(&category.description)
    .bind(&category.slug)
    .bind(category.is_published)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create category")?;

    Ok(Category {
        id: result.last_insert_id() as i64,
        created_at: now,
        ..category.clone()
    })
}

async fn get_category_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Category>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by ID")?;

    Ok(row.map(|row| row_to_category_mysql(&row)))
}

async fn get_category_by_slug_mysql(pool: &MySqlPool, slug: &str) -> Result<Option<Category>> {
    let row = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE slug = ?
        "#,
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
    .context("Failed to get category by slug")?;

    Ok(row.map(|row| row_to_category_mysql(&row)))
}

async fn list_categories_mysql(pool: &MySqlPool, published_only: bool) -> Result<Vec<Category>> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, description, slug, is_published, created_at
        FROM categories
        WHERE (? = FALSE OR is_published = TRUE)
        ORDER BY title ASC, id ASC
        "#,
    )
    .bind(published_only)
    .fetch_all(pool)
    .await
    .context("Failed to list categories")?;

    Ok(rows.iter().map(row_to_category_mysql).collect())
}

async fn update_category_mysql(pool: &MySqlPool, category: &Category) -> Result<Category> {
    sqlx::query(
        r#"
        UPDATE categories
        SET title = ?, description = ?, slug = ?, is_published = ?
        WHERE id = ?
        "#,
    )
    .bind(&category.title)
    .bind(&category.description)
    .bind(&category.slug)
    .bind(category.is_published)
    .bind(category.id)
    .execute(pool)
    .await
    .context("Failed to update category")?;

    get_category_by_id_mysql(pool, category.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Category not found after update"))
}

async fn delete_category_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete category")?;

    Ok(())
}

pub(crate) fn row_to_category_mysql(row: &sqlx::mysql::MySqlRow) -> Category {
    Category {
        id: row.get("id"),
        title: row.get("title"),
        description: row.get("description"),
        slug: row.get("slug"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    }
}
