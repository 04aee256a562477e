//! User repository
//!
//! Database operations for users.
//!
//! This module provides:
//! - `UserRepository` trait defining the interface for user data access
//! - `SqlxUserRepository` implementing the trait for SQLite and MySQL

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::{ListParams, User, UserRole};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;

/// User repository trait
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create(&self, user: &User) -> Result<User>;

    /// Get user by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<User>>;

    /// Get user by username
    async fn get_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Get user by email
    async fn get_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Update a user's account and profile fields
    async fn update(&self, user: &User) -> Result<User>;

    /// Delete a user; posts, comments and sessions go with them
    async fn delete(&self, id: i64) -> Result<()>;

    /// Count total users
    async fn count(&self) -> Result<i64>;

    /// List users, newest first
    async fn list(&self, params: &ListParams) -> Result<Vec<User>>;
}

/// SQLx-based user repository implementation
pub struct SqlxUserRepository {
    pool: DynDatabasePool,
}

impl SqlxUserRepository {
    /// Create a new SQLx user repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn UserRepository> {
        Arc::new(Self::new(pool))
    }
}

const USER_COLUMNS: &str = "id, username, email, password_hash, first_name, last_name, avatar, bio, role, created_at, updated_at";

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create(&self, user: &User) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_user_sqlite(self.pool.sqlite()?, user).await,
            DatabaseDriver::Mysql => create_user_mysql(self.pool.mysql()?, user).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_user_by_sqlite(self.pool.sqlite()?, "id", UserKey::Id(id)).await,
            DatabaseDriver::Mysql => get_user_by_mysql(self.pool.mysql()?, "id", UserKey::Id(id)).await,
        }
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let key = UserKey::Text(username);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_user_by_sqlite(self.pool.sqlite()?, "username", key).await,
            DatabaseDriver::Mysql => get_user_by_mysql(self.pool.mysql()?, "username", key).await,
        }
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let key = UserKey::Text(email);
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_user_by_sqlite(self.pool.sqlite()?, "email", key).await,
            DatabaseDriver::Mysql => get_user_by_mysql(self.pool.mysql()?, "email", key).await,
        }
    }

    async fn update(&self, user: &User) -> Result<User> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_user_sqlite(self.pool.sqlite()?, user).await,
            DatabaseDriver::Mysql => update_user_mysql(self.pool.mysql()?, user).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_user_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_user_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn count(&self) -> Result<i64> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => count_users_sqlite(self.pool.sqlite()?).await,
            DatabaseDriver::Mysql => count_users_mysql(self.pool.mysql()?).await,
        }
    }

    async fn list(&self, params: &ListParams) -> Result<Vec<User>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_users_sqlite(self.pool.sqlite()?, params).await,
            DatabaseDriver::Mysql => list_users_mysql(self.pool.mysql()?, params).await,
        }
    }
}

/// Lookup key for single-user queries
#[derive(Clone, Copy)]
enum UserKey<'a> {
    Id(i64),
    Text(&'a str),
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, first_name, last_name, avatar, bio, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.avatar)
    .bind(&user.bio)
    .bind(user.role.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(User {
        id: result.last_insert_rowid(),
        created_at: now,
        updated_at: now,
        ..user.clone()
    })
}

async fn get_user_by_sqlite(pool: &SqlitePool, column: &str, key: UserKey<'_>) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE {} = ?", USER_COLUMNS, column);
    let query = sqlx::query(&sql);
    let query = match key {
        UserKey::Id(id) => query.bind(id),
        UserKey::Text(value) => query.bind(value),
    };

    let row = query
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to get user by {}", column))?;

    row.map(|row| row_to_user_sqlite(&row)).transpose()
}

async fn update_user_sqlite(pool: &SqlitePool, user: &User) -> Result<User> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE users
        SET username = ?, email = ?, password_hash = ?, first_name = ?, last_name = ?,
            avatar = ?, bio = ?, role = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.avatar)
    .bind(&user.bio)
    .bind(user.role.to_string())
    .bind(now)
    .bind(user.id)
    .execute(pool)
    .await
    .context("Failed to update user")?;

    get_user_by_sqlite(pool, "id", UserKey::Id(user.id))
        .await?
        .ok_or_else(|| anyhow::anyhow!("User not found after update"))
}

async fn delete_user_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete user")?;

    Ok(())
}

async fn count_users_sqlite(pool: &SqlitePool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;

    Ok(row.get("count"))
}

async fn list_users_sqlite(pool: &SqlitePool, params: &ListParams) -> Result<Vec<User>> {
    let sql = format!(
        "SELECT {} FROM users ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        USER_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list users")?;

    rows.iter().map(row_to_user_sqlite).collect()
}

fn row_to_user_sqlite(row: &sqlx::sqlite::SqliteRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role = UserRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        avatar: row.get("avatar"),
        bio: row.get("bio"),
        role,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_user_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, email, password_hash, first_name, last_name, avatar, bio, role, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.avatar)
    .bind(&user.bio)
    .bind(user.role.to_string())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await
    .context("Failed to create user")?;

    Ok(User {
        id: result.last_insert_id() as i64,
        created_at: now,
        updated_at: now,
        ..user.clone()
    })
}

async fn get_user_by_mysql(pool: &MySqlPool, column: &str, key: UserKey<'_>) -> Result<Option<User>> {
    let sql = format!("SELECT {} FROM users WHERE {} = ?", USER_COLUMNS, column);
    let query = sqlx::query(&sql);
    let query = match key {
        UserKey::Id(id) => query.bind(id),
        UserKey::Text(value) => query.bind(value),
    };

    let row = query
        .fetch_optional(pool)
        .await
        .with_context(|| format!("Failed to get user by {}", column))?;

    row.map(|row| row_to_user_mysql(&row)).transpose()
}

async fn update_user_mysql(pool: &MySqlPool, user: &User) -> Result<User> {
    let now = Utc::now();

    sqlx::query(
        r#"
        UPDATE users
        SET username = ?, email = ?, password_hash = ?, first_name = ?, last_name = ?,
            avatar = ?, bio = ?, role = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(&user.avatar)
    .bind(&user.bio)
    .bind(user.role.to_string())
    .bind(now)
    .bind(user.id)
    .execute(pool)
    .await
    .context("Failed to update user")?;

    get_user_by_mysql(pool, "id", UserKey::Id(user.id))
        .await?
        .ok_or_else(|| anyhow::anyhow!("User not found after update"))
}

async fn delete_user_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete user")?;

    Ok(())
}

async fn count_users_mysql(pool: &MySqlPool) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) as count FROM users")
        .fetch_one(pool)
        .await
        .context("Failed to count users")?;

    Ok(row.get("count"))
}

async fn list_users_mysql(pool: &MySqlPool, params: &ListParams) -> Result<Vec<User>> {
    let sql = format!(
        "SELECT {} FROM users ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        USER_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(params.limit())
        .bind(params.offset())
        .fetch_all(pool)
        .await
        .context("Failed to list users")?;

    rows.iter().map(row_to_user_mysql).collect()
}

fn row_to_user_mysql(row: &sqlx::mysql::MySqlRow) -> Result<User> {
    let role_str: String = row.get("role");
    let role = UserRole::from_str(&role_str)
        .with_context(|| format!("Invalid role in database: {}", role_str))?;

    Ok(User {
        id: row.get("id"),
        username: row.get("username"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        first_name: row.get("first_name"),
        last_name: row.get("last_name"),
        avatar: row.get("avatar"),
        bio: row.get("bio"),
        role,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use crate::services::password::hash_password;

    async fn setup_test_repo() -> (DynDatabasePool, SqlxUserRepository) {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        let repo = SqlxUserRepository::new(pool.clone());
        (pool, repo)
    }

    fn create_test_user(username: &str, email: &str) -> User {
        User::new(
            username.to_string(),
            email.to_string(),
            hash_password("test_password").expect("Failed to hash password"),
            UserRole::Author,
        )
    }

    #[tokio::test]
    async fn test_create_user() {
        let (_pool, repo) = setup_test_repo().await;
        let user = create_test_user("testuser", "test@example.com");

        let created = repo.create(&user).await.expect("Failed to create user");

        assert!(created.id > 0);
        assert_eq!(created.username, "testuser");
        assert_eq!(created.email, "test@example.com");
        assert_eq!(created.role, UserRole::Author);
        assert!(created.avatar.is_none());
    }

    #[tokio::test]
    async fn test_lookups() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo
            .create(&create_test_user("alice", "alice@example.com"))
            .await
            .unwrap();

        let by_id = repo.get_by_id(created.id).await.unwrap().expect("by id");
        assert_eq!(by_id.username, "alice");

        let by_name = repo.get_by_username("alice").await.unwrap().expect("by username");
        assert_eq!(by_name.id, created.id);

        let by_email = repo.get_by_email("alice@example.com").await.unwrap().expect("by email");
        assert_eq!(by_email.id, created.id);

        assert!(repo.get_by_id(999).await.unwrap().is_none());
        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
        assert!(repo.get_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_profile_fields() {
        let (_pool, repo) = setup_test_repo().await;
        let mut user = repo
            .create(&create_test_user("alice", "alice@example.com"))
            .await
            .unwrap();

        user.first_name = "Alice".to_string();
        user.last_name = "Liddell".to_string();
        user.bio = Some("Down the rabbit hole".to_string());
        user.avatar = Some("avatars/alice.png".to_string());

        let updated = repo.update(&user).await.expect("Failed to update user");

        assert_eq!(updated.first_name, "Alice");
        assert_eq!(updated.last_name, "Liddell");
        assert_eq!(updated.bio.as_deref(), Some("Down the rabbit hole"));
        assert_eq!(updated.avatar.as_deref(), Some("avatars/alice.png"));
    }

    #[tokio::test]
    async fn test_delete_user() {
        let (_pool, repo) = setup_test_repo().await;
        let created = repo
            .create(&create_test_user("alice", "alice@example.com"))
            .await
            .unwrap();

        repo.delete(created.id).await.expect("Failed to delete user");

        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_count_and_list_users() {
        let (_pool, repo) = setup_test_repo().await;
        assert_eq!(repo.count().await.unwrap(), 0);

        for i in 0..3 {
            repo.create(&create_test_user(&format!("user{}", i), &format!("user{}@example.com", i)))
                .await
                .unwrap();
        }

        assert_eq!(repo.count().await.unwrap(), 3);
        let page = repo.list(&ListParams::clamped(1, 2, 3)).await.unwrap();
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn test_unique_constraints() {
        let (_pool, repo) = setup_test_repo().await;
        repo.create(&create_test_user("alice", "alice@example.com"))
            .await
            .unwrap();

        let same_name = repo.create(&create_test_user("alice", "other@example.com")).await;
        assert!(same_name.is_err());

        let same_email = repo.create(&create_test_user("bob", "alice@example.com")).await;
        assert!(same_email.is_err());
    }

    #[tokio::test]
    async fn test_admin_role_round_trips() {
        let (_pool, repo) = setup_test_repo().await;
        let mut user = create_test_user("admin", "admin@example.com");
        user.role = UserRole::Admin;

        let created = repo.create(&user).await.unwrap();
        let found = repo.get_by_id(created.id).await.unwrap().unwrap();

        assert!(found.is_admin());
    }
}
