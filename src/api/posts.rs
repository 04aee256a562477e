//! Post API endpoints
//!
//! Public (login optional):
//! - GET /api/v1/posts - Index listing of public posts
//! - GET /api/v1/posts/{post_id} - Post detail with comments
//!
//! Authenticated:
//! - POST /api/v1/posts/create - Create a post
//! - GET|POST /api/v1/posts/{post_id}/edit - Edit form / update
//! - GET|POST /api/v1/posts/{post_id}/delete - Delete confirmation / delete
//!
//! Edit and delete are author-only; anyone else is redirected to the detail view.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::api::common::{double_option, ActionError, JsonBody, PageQuery};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, Viewer};
use crate::api::responses::PageResponse;
use crate::models::{CreatePostInput, Post, PostWithMeta, UpdatePostInput};
use crate::services::PostDetail;

/// Request body for updating a post. Absent fields stay unchanged; `null`
/// clears the nullable ones.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub text: Option<String>,
    pub pub_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "double_option")]
    pub image: Option<Option<String>>,
    pub is_published: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub category_id: Option<Option<i64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub location_id: Option<Option<i64>>,
}

impl From<UpdatePostRequest> for UpdatePostInput {
    fn from(body: UpdatePostRequest) -> Self {
        UpdatePostInput {
            title: body.title,
            text: body.text,
            pub_date: body.pub_date,
            image: body.image,
            is_published: body.is_published,
            category_id: body.category_id,
            location_id: body.location_id,
        }
    }
}

/// Routes where logging in is optional
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/{post_id}", get(get_post))
}

/// Routes that need a logged-in user
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/posts/create", post(create_post))
        .route("/posts/{post_id}/edit", get(author_view).post(update_post))
        .route("/posts/{post_id}/delete", get(author_view).post(delete_post))
}

/// GET /api/v1/posts
async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PageResponse<PostWithMeta>>, ApiError> {
    let page = state.post_service.list_public(query.number()).await?;
    Ok(Json(page.into()))
}

/// GET /api/v1/posts/{post_id}
async fn get_post(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(post_id): Path<i64>,
) -> Result<Json<PostDetail>, ApiError> {
    let detail = state.post_service.detail(post_id, viewer.id()).await?;
    Ok(Json(detail))
}

/// POST /api/v1/posts/create
async fn create_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(input): JsonBody<CreatePostInput>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post = state.post_service.create(user.0.id, input).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// GET /api/v1/posts/{post_id}/edit and /delete: the post as its author sees it
async fn author_view(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<i64>,
) -> Result<Json<PostWithMeta>, ActionError> {
    let post = state.post_service.get_for_author(post_id, user.0.id).await?;
    Ok(Json(post))
}

/// POST /api/v1/posts/{post_id}/edit
async fn update_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<i64>,
    body: Result<JsonBody<UpdatePostRequest>, ApiError>,
) -> Result<Json<Post>, ActionError> {
    // Non-authors are redirected whatever they sent
    state.post_service.get_for_author(post_id, user.0.id).await?;
    let JsonBody(body) = body?;

    let post = state
        .post_service
        .update(post_id, user.0.id, body.into())
        .await?;
    Ok(Json(post))
}

/// POST /api/v1/posts/{post_id}/delete
async fn delete_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<i64>,
) -> Result<StatusCode, ActionError> {
    state.post_service.delete(post_id, user.0.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
