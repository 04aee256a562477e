//! Location repository
//!
//! Database operations for locations.

use crate::config::DatabaseDriver;
use crate::db::DynDatabasePool;
use crate::models::Location;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{MySqlPool, Row, SqlitePool};
use std::sync::Arc;

/// Location repository trait
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Create a new location
    async fn create(&self, location: &Location) -> Result<Location>;

    /// Get location by ID
    async fn get_by_id(&self, id: i64) -> Result<Option<Location>>;

    /// List locations ordered by name; `published_only` hides unpublished ones
    async fn list(&self, published_only: bool) -> Result<Vec<Location>>;

    /// Update a location
    async fn update(&self, location: &Location) -> Result<Location>;

    /// Delete a location; its posts lose the reference
    async fn delete(&self, id: i64) -> Result<()>;
}

/// SQLx-based location repository implementation
pub struct SqlxLocationRepository {
    pool: DynDatabasePool,
}

impl SqlxLocationRepository {
    /// Create a new SQLx location repository
    pub fn new(pool: DynDatabasePool) -> Self {
        Self { pool }
    }

    /// Create a boxed repository for use with dependency injection
    pub fn boxed(pool: DynDatabasePool) -> Arc<dyn LocationRepository> {
        Arc::new(Self::new(pool))
    }
}

#[async_trait]
impl LocationRepository for SqlxLocationRepository {
    async fn create(&self, location: &Location) -> Result<Location> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => create_location_sqlite(self.pool.sqlite()?, location).await,
            DatabaseDriver::Mysql => create_location_mysql(self.pool.mysql()?, location).await,
        }
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Location>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => get_location_by_id_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => get_location_by_id_mysql(self.pool.mysql()?, id).await,
        }
    }

    async fn list(&self, published_only: bool) -> Result<Vec<Location>> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => list_locations_sqlite(self.pool.sqlite()?, published_only).await,
            DatabaseDriver::Mysql => list_locations_mysql(self.pool.mysql()?, published_only).await,
        }
    }

    async fn update(&self, location: &Location) -> Result<Location> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => update_location_sqlite(self.pool.sqlite()?, location).await,
            DatabaseDriver::Mysql => update_location_mysql(self.pool.mysql()?, location).await,
        }
    }

    async fn delete(&self, id: i64) -> Result<()> {
        match self.pool.driver() {
            DatabaseDriver::Sqlite => delete_location_sqlite(self.pool.sqlite()?, id).await,
            DatabaseDriver::Mysql => delete_location_mysql(self.pool.mysql()?, id).await,
        }
    }
}

// ============================================================================
// SQLite implementations
// ============================================================================

async fn create_location_sqlite(pool: &SqlitePool, location: &Location) -> Result<Location> {
    let now = Utc::now();

    let result = sqlx::query("INSERT INTO locations (name, is_published, created_at) VALUES (?, ?, ?)")
        .bind(&location.name)
        .bind(location.is_published)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create location")?;

    Ok(Location {
        id: result.last_insert_rowid(),
        created_at: now,
        ..location.clone()
    })
}

async fn get_location_by_id_sqlite(pool: &SqlitePool, id: i64) -> Result<Option<Location>> {
    let row = sqlx::query("SELECT id, name, is_published, created_at FROM locations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get location by ID")?;

    Ok(row.map(|row| row_to_location_sqlite(&row)))
}

async fn list_locations_sqlite(pool: &SqlitePool, published_only: bool) -> Result<Vec<Location>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, is_published, created_at
        FROM locations
        WHERE (? = 0 OR is_published = 1)
        ORDER BY name ASC, id ASC
        "#,
    )
    .bind(published_only)
    .fetch_all(pool)
    .await
    .context("Failed to list locations")?;

    Ok(rows.iter().map(row_to_location_sqlite).collect())
}

async fn update_location_sqlite(pool: &SqlitePool, location: &Location) -> Result<Location> {
    sqlx::query("UPDATE locations SET name = ?, is_published = ? WHERE id = ?")
        .bind(&location.name)
        .bind(location.is_published)
        .bind(location.id)
        .execute(pool)
        .await
        .context("Failed to update location")?;

    get_location_by_id_sqlite(pool, location.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Location not found after update"))
}

async fn delete_location_sqlite(pool: &SqlitePool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM locations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete location")?;

    Ok(())
}

fn row_to_location_sqlite(row: &sqlx::sqlite::SqliteRow) -> Location {
    Location {
        id: row.get("id"),
        name: row.get("name"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    }
}

// ============================================================================
// MySQL implementations
// ============================================================================

async fn create_location_mysql(pool: &MySqlPool, location: &Location) -> Result<Location> {
    let now = Utc::now();

    let result = sqlx::query("INSERT INTO locations (name, is_published, created_at) VALUES (?, ?, ?)")
        .bind(&location.name)
        .bind(location.is_published)
        .bind(now)
        .execute(pool)
        .await
        .context("Failed to create location")?;

    Ok(Location {
        id: result.last_insert_id() as i64,
        created_at: now,
        ..location.clone()
    })
}

async fn get_location_by_id_mysql(pool: &MySqlPool, id: i64) -> Result<Option<Location>> {
    let row = sqlx::query("SELECT id, name, is_published, created_at FROM locations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
        .context("Failed to get location by ID")?;

    Ok(row.map(|row| row_to_location_mysql(&row)))
}

async fn list_locations_mysql(pool: &MySqlPool, published_only: bool) -> Result<Vec<Location>> {
    let rows = sqlx::query(
        r#"
        SELECT id, name, is_published, created_at
        FROM locations
        WHERE (? = FALSE OR is_published = TRUE)
        ORDER BY name ASC, id ASC
        "#,
    )
    .bind(published_only)
    .fetch_all(pool)
    .await
    .context("Failed to list locations")?;

    Ok(rows.iter().map(row_to_location_mysql).collect())
}

async fn update_location_mysql(pool: &MySqlPool, location: &Location) -> Result<Location> {
    sqlx::query("UPDATE locations SET name = ?, is_published = ? WHERE id = ?")
        .bind(&location.name)
        .bind(location.is_published)
        .bind(location.id)
        .execute(pool)
        .await
        .context("Failed to update location")?;

    get_location_by_id_mysql(pool, location.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Location not found after update"))
}

async fn delete_location_mysql(pool: &MySqlPool, id: i64) -> Result<()> {
    sqlx::query("DELETE FROM locations WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await
        .context("Failed to delete location")?;

    Ok(())
}

fn row_to_location_mysql(row: &sqlx::mysql::MySqlRow) -> Location {
    Location {
        id: row.get("id"),
        name: row.get("name"),
        is_published: row.get("is_published"),
        created_at: row.get("created_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_repo() -> SqlxLocationRepository {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        SqlxLocationRepository::new(pool)
    }

    #[tokio::test]
    async fn test_location_crud() {
        let repo = setup_test_repo().await;

        let created = repo
            .create(&Location::new("Moscow".to_string(), true))
            .await
            .expect("Failed to create location");
        assert!(created.id > 0);

        let mut found = repo.get_by_id(created.id).await.unwrap().expect("exists");
        assert_eq!(found.name, "Moscow");

        found.name = "Saint Petersburg".to_string();
        found.is_published = false;
        let updated = repo.update(&found).await.unwrap();
        assert_eq!(updated.name, "Saint Petersburg");
        assert!(!updated.is_published);

        repo.delete(created.id).await.unwrap();
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_published_only() {
        let repo = setup_test_repo().await;
        repo.create(&Location::new("Paris".to_string(), true)).await.unwrap();
        repo.create(&Location::new("Atlantis".to_string(), false)).await.unwrap();

        assert_eq!(repo.list(false).await.unwrap().len(), 2);
        let published = repo.list(true).await.unwrap();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].name, "Paris");
    }
}
