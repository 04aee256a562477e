//! Admin API endpoints
//!
//! Management surface for administrators:
//! - /api/v1/admin/categories - see [`crate::api::categories`]
//! - /api/v1/admin/locations - see [`crate::api::locations`]
//! - GET /api/v1/admin/users - Accounts, newest first
//! - DELETE /api/v1/admin/users/{id} - Remove an account with its posts and comments

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};

use crate::api::categories;
use crate::api::common::PageQuery;
use crate::api::locations;
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{PageResponse, UserResponse};

/// Build the admin router (requires admin middleware)
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/categories", categories::admin_router())
        .nest("/locations", locations::admin_router())
        .route("/users", get(list_users))
        .route("/users/{id}", delete(delete_user))
}

/// GET /api/v1/admin/users
async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<UserResponse>>, ApiError> {
    let page = state
        .user_service
        .list_users(query.number(), state.per_page)
        .await?;
    Ok(Json(page.map(UserResponse::from).into()))
}

/// DELETE /api/v1/admin/users/{id}
async fn delete_user(
    State(state): State<AppState>,
    admin: AuthenticatedUser,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    if admin.0.id == id {
        return Err(ApiError::validation_error("Administrators cannot delete their own account"));
    }

    state.user_service.delete_user(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
