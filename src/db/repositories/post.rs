//! Post repository
//!
//! Database operations for posts.
//!
//! Listings take a [`PostQuery`] built by the caller for the current request;
//! [`compile_filter`] turns it into a WHERE clause plus bind values shared by
//! both drivers. Listing rows come back joined with author, category,
//! location and comment count.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{Category, ListParams, Location, Post, PostQuery, PostWithMeta, UncategorizedPolicy};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Post repository trait
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Create a new post
    async fn create(&self, post: &Post) -> Result<Post>;

    /// Get a bare post by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>>;

    /// Get a post with author, category, location and comment count
    async fn get_with_meta(&self, id: i64) -> Result<Option<PostWithMeta>>;

    /// One page of posts matching `query`, newest first then by title
    async fn list(&self, query: &PostQuery, params: &ListParams) -> Result<Vec<PostWithMeta>>;

    /// Number of posts matching `query`
    async fn count(&self, query: &PostQuery) -> Result<i64>;

    /// Update a post
    async fn update(&self, post: &Post) -> Result<Post>;

    /// Delete a post; its comments go with it
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based post repository implementation
pub struct SqlxPostRepository {
    pool: DynDatabasePool,
}

impl SqlxPostRepository {
    /// Create a new SQLx post repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn PostRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl PostRepository for SqlxPostRepository {
    async fn create(&self, post: &Post) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_post_sqlite(self.pool.sqlite()?, post).await,
            DatabaseDriver::Mysql => create_post_mysql(self.pool.mysql()?, post).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_post_by_id_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_post_by_id_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn get_with_meta(&self, id: i64) -> Result<Option<PostWithMeta>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_post_with_meta_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_post_with_meta_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn list(&self, query: &PostQuery, params: &ListParams) -> Result<Vec<PostWithMeta>> {
        let filter = compile_filter(query);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_posts_sqlite(self.pool.sqlite()?, &filter, params).await,
            DatabaseDriver::Mysql => list_posts_mysql(self.pool.mysql()?, &filter, params).await,
        }
    }

    async fn count(&self, query: &PostQuery) -> Result<i64> {
        let filter = compile_filter(query);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_posts_sqlite(self.pool.sqlite()?, &filter).await,
            DatabaseDriver::Mysql => count_posts_mysql(self.pool.mysql()?, &filter).await,
        }
    }

    async fn update(&self, post: &Post) -> Result<Post> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_post_sqlite(self.pool.sqlite()?, post).await,
            DatabaseDriver::Mysql => update_post_mysql(self.pool.mysql()?, post).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_post_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_post_mysql(self.pool.mysql()?, id).await,
        }
    }
}

// ============================================================================
// Query compilation
// ============================================================================

const POST_COLUMNS: &str = "id, title, text, pub_date, image, is_published, created_at, author_id, category_id, location_id";

const META_SELECT: &str = r#"
    SELECT p.id, p.title, p.text, p.pub_date, p.image, p.is_published, p.created_at,
           p.author_id, p.category_id, p.location_id,
           u.username AS author_username,
           c.title AS category_title, c.description AS category_description,
           c.slug AS category_slug, c.is_published AS category_is_published,
           c.created_at AS category_created_at,
           l.name AS location_name, l.is_published AS location_is_published,
           l.created_at AS location_created_at,
           (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
    LEFT JOIN locations l ON l.id = p.location_id
"#;

const META_FROM: &str = r#"
    FROM posts p
    LEFT JOIN categories c ON c.id = p.category_id
"#;

const LISTING_ORDER: &str = "ORDER BY p.pub_date DESC, p.title ASC, p.id ASC";

/// A value bound into a compiled filter
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum FilterValue {
    Int(i64),
    Text(String),
    Time(DateTime<Utc>),
}

/// WHERE clause and its bind values, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompiledFilter {
    pub where_sql: String,
    pub binds: Vec<FilterValue>,
}

/// Translate a [`PostQuery`] into SQL understood by both SQLite and MySQL
pub(crate) fn compile_filter(query: &PostQuery) -> CompiledFilter {
    let mut clauses: Vec<&str> = Vec::new();
    let mut binds = Vec::new();

    if let Some(public) = &query.public {
        clauses.push("p.is_published = 1");
        clauses.push("p.pub_date <= ?");
        binds.push(FilterValue::Time(public.now));
        clauses.push(match public.policy {
            UncategorizedPolicy::Visible => "(p.category_id IS NULL OR c.is_published = 1)",
            UncategorizedPolicy::Hidden => "c.is_published = 1",
        });
    }
    if let Some(slug) = &query.category_slug {
        clauses.push("c.slug = ?");
        binds.push(FilterValue::Text(slug.clone()));
    }
    if let Some(author_id) = query.author_id {
        clauses.push("p.author_id = ?");
        binds.push(FilterValue::Int(author_id));
    }

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    CompiledFilter { where_sql, binds }
}

type SqliteQuery<'q> = sqlx::query::Query<'q, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'q>>;
type MySqlQuery<'q> = sqlx::query::Query<'q, sqlx::MySql, sqlx::mysql::MySqlArguments>;

fn bind_filter_sqlite<'q>(mut query: SqliteQuery<'q>, filter: &'q CompiledFilter) -> SqliteQuery<'q> {
    for value in &filter.binds {
        query = match value {
            FilterValue::Int(v) => query.bind(*v),
            FilterValue::Text(v) => query.bind(v.as_str()),
            FilterValue::Time(v) => query.bind(*v),
        };
    }
    query
}

fn bind_filter_mysql<'q>(mut query: MySqlQuery<'q>, filter: &'q CompiledFilter) -> MySqlQuery<'q> {
    for value in &filter.binds {
        query = match value {
            FilterValue::Int(v) => query.bind(*v),
            FilterValue::Text(v) => query.bind(v.as_str()),
            FilterValue::Time(v) => query.bind(*v),
        };
    }
    query
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_post_sqlite(pool: &SqlitePool, post: &Post) -> Result<Post> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO posts (title, text, pub_date, image, is_published, created_at, author_id, category_id, location_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&post.title)
    .bind(&post.text)
    .bind(post.pub_date)
    .bind(&post.image)
    .bind(post.is_published)
    .bind(now)
    .bind(post.author_id)
    .bind(post.category_id)
    .bind(post.location_id)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    Ok(Post {
        id: result.last_insert_rowid(),
        created_at: now,
        ..post.clone()
    })
}

async fn get_post_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Post>> {
    let sql = format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    Ok(row.map(|row| row_to_post_sqlite(&row)))
}

async fn get_post_with_meta_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<PostWithMeta>> {
    let sql = format!("{} WHERE p.id = ?", META_SELECT);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post with meta")?;

    row.map(|row| row_to_meta_sqlite(&row)).transpose()
}

async fn list_posts_sqlite(
    pool: &SqlitePool,
    filter: &CompiledFilter,
    params: &ListParams,
) -> Result<Vec<PostWithMeta>> {
    let sql = format!("{} {} {} LIMIT ? OFFSET ?", META_SELECT, filter.where_sql, LISTING_ORDER);
    let rows = bind_filter_sqlite(sqlx::query(&sql), filter)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    rows.iter().map(row_to_meta_sqlite).collect()
}

async fn count_posts_sqlite(pool: &SqlitePool, filter: &CompiledFilter) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) AS count {} {}", META_FROM, filter.where_sql);
    let row = bind_filter_sqlite(sqlx::query(&sql), filter)
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;

    Ok(row.get("count"))
}

async fn update_post_sqlite(pool: &SqlitePool, post: &Post) -> Result<Post> {
    sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, text = ?, pub_date = ?, image = ?, is_published = ?,
            category_id = ?, location_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&post.title)
    .bind(&post.text)
    .bind(post.pub_date)
    .bind(&post.image)
    .bind(post.is_published)
    .bind(post.category_id)
    .bind(post.location_id)
    .bind(post.id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    get_post_by_id_sqlite(pool, post.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after update"))
}

async fn delete_post_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(())
}

fn row_to_post_sqlite(row: &sqlx::sqlite::SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        pub_date: row.get("pub_date"),
        image: row.get("image"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
        author_id: row.get("author_id"),
        category_id: row.get("category_id"),
        location_id: row.get("location_id"),
    }
}

fn row_to_meta_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<PostWithMeta> {
    let post = row_to_post_sqlite(row);

    let category = match post.category_id {
        Some(id) => Some(Category {
            id,
            title: row.try_get("category_title")?,
            description: row.try_get("category_description")?,
            slug: row.try_get("category_slug")?,
            is_published: row.try_get("category_is_published")?,
            created_at: row.try_get("category_created_at")?,
        }),
        None => None,
    };
    let location = match post.location_id {
        Some(id) => Some(Location {
            id,
            name: row.try_get("location_name")?,
            is_published: row.try_get("location_is_published")?,
            created_at: row.try_get("location_created_at")?,
        }),
        None => None,
    };

    Ok(PostWithMeta {
        author_username: row.try_get("author_username")?,
        comment_count: row.try_get("comment_count")?,
        category,
        location,
        post,
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_post_mysql(pool: &MySqlPool, post: &Post) -> Result<Post> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO posts (title, text, pub_date, image, is_published, created_at, author_id, category_id, location_id)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&post.title)
    .bind(&post.text)
    .bind(post.pub_date)
    .bind(&post.image)
    .bind(post.is_published)
    .bind(now)
    .bind(post.author_id)
    .bind(post.category_id)
    .bind(post.location_id)
    .execute(pool)
    .await
    .context("Failed to create post")?;

    Ok(Post {
        id: result.last_insert_id() as i64,
        created_at: now,
        ..post.clone()
    })
}

async fn get_post_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Post>> {
    let sql = format!("SELECT {} FROM posts WHERE id = ?", POST_COLUMNS);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post by ID")?;

    Ok(row.map(|row| row_to_post_mysql(&row)))
}

async fn get_post_with_meta_mysql(pool: &MySqlPool, id: i64) -> Result<Option<PostWithMeta>> {
    let sql = format!("{} WHERE p.id = ?", META_SELECT);
    let row = sqlx::query(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get post with meta")?;

    row.map(|row| row_to_meta_mysql(&row)).transpose()
}

async fn list_posts_mysql(
    pool: &MySqlPool,
    filter: &CompiledFilter,
    params: &ListParams,
) -> Result<Vec<PostWithMeta>> {
    let sql = format!("{} {} {} LIMIT ? OFFSET ?", META_SELECT, filter.where_sql, LISTING_ORDER);
    let rows = bind_filter_mysql(sqlx::query(&sql), filter)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list posts")?;

    rows.iter().map(row_to_meta_mysql).collect()
}

async fn count_posts_mysql(pool: &MySqlPool, filter: &CompiledFilter) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) AS count {} {}", META_FROM, filter.where_sql);
    let row = bind_filter_mysql(sqlx::query(&sql), filter)
        .fetch_one(pool)
        .await
        .context("Failed to count posts")?;

    Ok(row.get("count"))
}

async fn update_post_mysql(pool: &MySqlPool, post: &Post) -> Result<Post> {
    sqlx::query(
        r#"
        UPDATE posts
        SET title = ?, text = ?, pub_date = ?, image = ?, is_published = ?,
            category_id = ?, location_id = ?
        WHERE id = ?
        "#,
    )
    .bind(&post.title)
    .bind(&post.text)
    .bind(post.pub_date)
    .bind(&post.image)
    .bind(post.is_published)
    .bind(post.category_id)
    .bind(post.location_id)
    .bind(post.id)
    .execute(pool)
    .await
    .context("Failed to update post")?;

    get_post_by_id_mysql(pool, post.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Post not found after update"))
}

async fn delete_post_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM posts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete post")?;

    Ok(())
}

fn row_to_post_mysql(row: &sqlx::mysql::MySqlRow) -> Post {
    Post {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        pub_date: row.get("pub_date"),
        image: row.get("image"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
        author_id: row.get("author_id"),
        category_id: row.get("category_id"),
        location_id: row.get("location_id"),
    }
}

fn row_to_meta_mysql(row: &sqlx::mysql::MySqlRow) -> Result<PostWithMeta> {
    let post = row_to_post_mysql(row);

    let category = match post.category_id {
        Some(id) => Some(Category {
            id,
            title: row.try_get("category_title")?,
            description: row.try_get("category_description")?,
            slug: row.try_get("category_slug")?,
            is_published: row.try_get("category_is_published")?,
            created_at: row.try_get("category_created_at")?,
        }),
        None => None,
    };
    let location = match post.location_id {
        Some(id) => Some(Location {
            id,
            name: row.try_get("location_name")?,
            is_published: row.try_get("location_is_published")?,
            created_at: row.try_get("location_created_at")?,
        }),
        None => None,
    };

    Ok(PostWithMeta {
        author_username: row.try_get("author_username")?,
        comment_count: row.try_get("comment_count")?,
        category,
        location,
        post,
    })
}
