//! Category API endpoints
//!
//! Public:
//! - GET /api/v1/categories - Published categories (for post forms)
//! - GET /api/v1/category/{slug} - Public posts in a published category
//!
//! Admin:
//! - GET|POST /api/v1/admin/categories
//! - GET|PUT|DELETE /api/v1/admin/categories/{id}

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::api::common::{JsonBody, PageQuery};
use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::CategoryPostsResponse;
use crate::models::{Category, CreateCategoryInput, UpdateCategoryInput};

/// Public category routes
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_published))
        .route("/category/{slug}", get(category_posts))
}

/// Category management routes (requires admin middleware)
pub fn admin_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_all).post(create_category))
        .route(
            "/{id}",
            get(get_category).put(update_category).delete(delete_category),
        )
}

/// GET /api/v1/categories
async fn list_published(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.category_service.list(true).await?))
}

/// GET /api/v1/category/{slug}
async fn category_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<CategoryPostsResponse>, ApiError> {
    let (category, posts) = state
        .post_service
        .list_category(&slug, query.number())
        .await?;

    Ok(Json(CategoryPostsResponse {
        category,
        posts: posts.into(),
    }))
}

/// GET /api/v1/admin/categories
async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.category_service.list(false).await?))
}

/// POST /api/v1/admin/categories
async fn create_category(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<CreateCategoryInput>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state.category_service.create(input).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// GET /api/v1/admin/categories/{id}
async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.category_service.get_by_id(id).await?))
}

/// PUT /api/v1/admin/categories/{id}
async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    JsonBody(input): JsonBody<UpdateCategoryInput>,
) -> Result<Json<Category>, ApiError> {
    Ok(Json(state.category_service.update(id, input).await?))
}

/// DELETE /api/v1/admin/categories/{id}
async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    state.category_service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
