//! Location API endpoints
//!
//! - GET /api/v1/locations - Published locations (for post forms)
//! - GET|POST /api/v1/admin/locations
//! - GET|PUT|DELETE /api/v1/admin/locations/{id}

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::api::common::JsonBody;
use crate::api::middleware::{ApiError, AppState};
use crate::models::{CreateLocationInput, Location, UpdateLocationInput};

pub fn public_router() -> Router<AppState> {
    Router::new().route("/locations", get(list_published))
}

/// Location management routes (requires admin middleware)
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create_location))
        .route(
            "/{id}",
            get(get_location).put(update_location).delete(delete_location),
        )
}

async fn list_published(State(state): State<AppState>) -> Result<Json<Vec<Location>>, ApiError> {
    Ok(Json(state.location_service.list(true).await?))
}

async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<Location>>, ApiError> {
    Ok(Json(state.location_service.list(false).await?))
}

async fn create_location(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateLocationInput>,
) -> Result<(StatusCode, Json<Location>), ApiError> {
    let location = state.location_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Location>, ApiError> {
    Ok(Json(state.location_service.get_by_id(id).await?))
}

async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<UpdateLocationInput>,
) -> Result<Json<Location>, ApiError> {
    Ok(Json(state.location_service.update(id, input).await?))
}

async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.location_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
