//! Comment repository

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Comment, CommentWithAuthor};

/// Comment repository trait
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Create a new comment
    async fn create(&self, comment: &Comment) -> Result<Comment>;

    /// Get a comment by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>>;

    /// Comments on a post, oldest first
    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>>;

    /// Replace a comment's text
    async fn update_text(&self, id: i64, text: &str) -> Result<Comment>;

    /// Delete a comment
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based comment repository implementation
pub struct SqlxCommentRepository {
    pool: DynDatabasePool,
}

impl SqlxCommentRepository {
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn CommentRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl CommentRepository for SqlxCommentRepository {
    async fn create(&self, comment: &Comment) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_sqlite(self.pool.sqlite()?, comment).await,
            DatabaseDriver::Mysql => create_mysql(self.pool.mysql()?, comment).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_by_id_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_by_id_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn list_for_post(&self, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_for_post_sqlite(self.pool.sqlite()?, post_id).await,
            DatabaseDriver::Mysql => list_for_post_mysql(self.pool.mysql()?, post_id).await,
        }
    }

    async fn update_text(&self, id: i64, text: &str) -> Result<Comment> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_text_sqlite(self.pool.sqlite()?, id, text).await,
            DatabaseDriver::Mysql => update_text_mysql(self.pool.mysql()?, id, text).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_mysql(self.pool.mysql()?, id).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_sqlite(pool: &SqlitePool, comment: &Comment) -> Result<Comment> {
    let now = Utc::now();

    let result = sqlx::query(
        "INSERT INTO comments (text, post_id, author_id, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&comment.text)
    .bind(comment.post_id)
    .bind(comment.author_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_rowid(),
        created_at: now,
        ..comment.clone()
    })
}

async fn get_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(
        "SELECT id, text, post_id, author_id, created_at FROM comments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get comment by ID")?;

    Ok(row.map(|row| row_to_comment_sqlite(&row)))
}

async fn list_for_post_sqlite(pool: &SqlitePool, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(
        r#"
        SELECT cm.id, cm.text, cm.post_id, cm.author_id, cm.created_at, u.username AS author_username
        FROM comments cm
        JOIN users u ON u.id = cm.author_id
        WHERE cm.post_id = ?
        ORDER BY cm.created_at ASC, cm.id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|row| CommentWithAuthor {
            comment: row_to_comment_sqlite(row),
            author_username: row.get("author_username"),
        })
        .collect())
}

async fn update_text_sqlite(pool: &SqlitePool, id: i64, text: &str) -> Result<Comment> {
    sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
        .bind(text)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment")?;

    get_by_id_sqlite(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Comment not found after update"))
}

async fn delete_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(())
}

fn row_to_comment_sqlite(row: &sqlx::sqlite::SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        text: row.get("text"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_mysql(pool: &MySqlPool, comment: &Comment) -> Result<Comment> {
    let now = Utc::now();

    let result = sqlx::query(
        "INSERT INTO comments (text, post_id, author_id, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(&comment.text)
    .bind(comment.post_id)
    .bind(comment.author_id)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create comment")?;

    Ok(Comment {
        id: result.last_insert_id() as i64,
        created_at: now,
        ..comment.clone()
    })
}

async fn get_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Comment>> {
    let row = sqlx::query(
        "SELECT id, text, post_id, author_id, created_at FROM comments WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .context("Failed to get comment by ID")?;

    Ok(row.map(|row| row_to_comment_mysql(&row)))
}

async fn list_for_post_mysql(pool: &MySqlPool, post_id: i64) -> Result<Vec<CommentWithAuthor>> {
    let rows = sqlx::query(
        r#"
        SELECT cm.id, cm.text, cm.post_id, cm.author_id, cm.created_at, u.username AS author_username
        FROM comments cm
        JOIN users u ON u.id = cm.author_id
        WHERE cm.post_id = ?
        ORDER BY cm.created_at ASC, cm.id ASC
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await
    .context("Failed to list comments")?;

    Ok(rows
        .iter()
        .map(|row| CommentWithAuthor {
            comment: row_to_comment_mysql(row),
            author_username: row.get("author_username"),
        })
        .collect())
}

async fn update_text_mysql(pool: &MySqlPool, id: i64, text: &str) -> Result<Comment> {
    sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
        .bind(text)
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to update comment")?;

    get_by_id_mysql(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Comment not found after update"))
}

async fn delete_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete comment")?;

    Ok(())
}

fn row_to_comment_mysql(row: &sqlx::mysql::MySqlRow) -> Comment {
    Comment {
        id: row.get("id"),
        text: row.get("text"),
        post_id: row.get("post_id"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
    }
}
