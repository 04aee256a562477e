//! Location service

use crate::db::repositories::LocationRepository;
use crate::models::{limits, CreateLocationInput, Location, UpdateLocationInput};
use anyhow::Context;
use std::sync::Arc;
use tracing::info;

/// Error types for location service operations
#[derive(Debug, thiserror::Error)]
pub enum LocationServiceError {
    #[error("Location not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

/// Location service for administrator-managed places
pub struct LocationService {
    repo: Arc<dyn LocationRepository>,
}

impl LocationService {
    pub fn new(repo: Arc<dyn LocationRepository>) -> Self {
        Self { repo }
    }

    pub async fn create(&self, input: CreateLocationInput) -> Result<Location, LocationServiceError> {
        validate_name(&input.name)?;

        let created = self
            .repo
            .create(&Location::new(input.name, input.is_published))
            .await
            .context("Failed to create location")?;

        info!(location_id = created.id, "Location created");
        Ok(created)
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Location, LocationServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get location")?
            .ok_or_else(|| LocationServiceError::NotFound(id.to_string()))
    }

    pub async fn list(&self, published_only: bool) -> Result<Vec<Location>, LocationServiceError> {
        let locations = self
            .repo
            .list(published_only)
            .await
            .context("Failed to list locations")?;

        Ok(locations)
    }

    pub async fn update(
        &self,
        id: i64,
        input: UpdateLocationInput,
    ) -> Result<Location, LocationServiceError> {
        let mut location = self.get_by_id(id).await?;

        if !input.has_changes() {
            return Ok(location);
        }
        if let Some(name) = input.name {
            validate_name(&name)?;
            location.name = name;
        }
        if let Some(is_published) = input.is_published {
            location.is_published = is_published;
        }

        let updated = self
            .repo
            .update(&location)
            .await
            .context("Failed to update location")?;

        info!(location_id = id, "Location updated");
        Ok(updated)
    }

    /// Delete a location; posts that used it keep existing
    pub async fn delete(&self, id: i64) -> Result<(), LocationServiceError> {
        self.get_by_id(id).await?;

        self.repo
            .delete(id)
            .await
            .context("Failed to delete location")?;

        info!(location_id = id, "Location deleted");
        Ok(())
    }
}

fn validate_name(name: &str) -> Result<(), LocationServiceError> {
    if name.trim().is_empty() {
        return Err(LocationServiceError::ValidationError(
            "Location name cannot be empty".to_string(),
        ));
    }
    if name.chars().count() > limits::LOCATION_NAME_MAX {
        return Err(LocationServiceError::ValidationError(format!(
            "Location name cannot exceed {} characters",
            limits::LOCATION_NAME_MAX
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxLocationRepository;
    use crate::db::{create_test_pool, migrations};

    async fn setup_test_service() -> LocationService {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");
        LocationService::new(SqlxLocationRepository::boxed(pool))
    }

    #[tokio::test]
    async fn test_location_lifecycle() {
        let service = setup_test_service().await;

        let created = service.create(CreateLocationInput::new("Moscow")).await.unwrap();
        assert!(created.is_published);

        let updated = service
            .update(
                created.id,
                UpdateLocationInput {
                    name: Some("Tver".to_string()),
                    is_published: Some(false),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Tver");
        assert!(service.list(true).await.unwrap().is_empty());

        service.delete(created.id).await.unwrap();
        assert!(matches!(
            service.get_by_id(created.id).await,
            Err(LocationServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_location_name_validation() {
        let service = setup_test_service().await;

        let empty = service.create(CreateLocationInput::new("")).await;
        assert!(matches!(empty, Err(LocationServiceError::ValidationError(_))));

        let long = service.create(CreateLocationInput::new("n".repeat(300))).await;
        assert!(matches!(long, Err(LocationServiceError::ValidationError(_))));
    }
}
