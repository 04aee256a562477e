//! Profile API endpoints
//!
//! - GET /api/v1/profile/{username} - Profile and posts (login optional)
//! - GET /api/v1/profile/edit - Own account
//! - POST /api/v1/profile/edit - Update own account

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::{double_option, JsonBody, PageQuery};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser, Viewer};
use crate::api::responses::{ProfilePostsResponse, UserResponse};
use crate::models::UpdateProfileInput;

/// Request body for the profile edit form
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub avatar: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub bio: Option<Option<String>>,
}

impl From<UpdateProfileRequest> for UpdateProfileInput {
    fn from(body: UpdateProfileRequest) -> Self {
        UpdateProfileInput {
            first_name: body.first_name.map(|s| s.trim().to_string()),
            last_name: body.last_name.map(|s| s.trim().to_string()),
            username: body.username.map(|s| s.trim().to_string()),
            email: body.email.map(|s| s.trim().to_string()),
            avatar: body.avatar.map(blank_to_none),
            bio: body.bio.map(blank_to_none),
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Routes where logging in is optional
pub fn public_router() -> Router<AppState> {
    Router::new().route("/profile/{username}", get(get_profile))
}

/// Routes that need a logged-in user
pub fn protected_router() -> Router<AppState> {
    Router::new().route("/profile/edit", get(edit_form).post(update_profile))
}

/// GET /api/v1/profile/{username}
async fn get_profile(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ProfilePostsResponse>, ApiError> {
    let (user, posts) = state
        .post_service
        .list_profile(&username, viewer.id(), query.number())
        .await?;

    Ok(Json(ProfilePostsResponse {
        profile: user.into(),
        posts: posts.into(),
    }))
}

/// GET /api/v1/profile/edit
async fn edit_form(user: AuthenticatedUser) -> Json<UserResponse> {
    Json(user.0.into())
}

/// POST /api/v1/profile/edit
async fn update_profile(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    JsonBody(body): JsonBody<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state
        .user_service
        .update_profile(user.0.id, body.into())
        .await?;
    Ok(Json(updated.into()))
}
