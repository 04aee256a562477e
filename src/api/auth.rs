//! Authentication API endpoints
//!
//! - POST /api/v1/auth/registration - Create an account and log in
//! - POST /api/v1/auth/login - User login
//! - POST /api/v1/auth/logout - User logout
//! - GET /api/v1/auth/me - Get current user

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::api::common::{clear_session_cookie, session_cookie, JsonBody};
use crate::api::middleware::{extract_session_token, ApiError, AppState, AuthenticatedUser};
use crate::api::responses::{AuthResponse, UserResponse};
use crate::services::user::{LoginInput, RegisterInput};

/// Request body for user registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username", alias = "email")]
    pub username_or_email: String,
    pub password: String,
}

/// Build protected auth routes (requires auth middleware)
pub fn protected_router() -> Router<AppState> {
    Router::new()
        .route("/logout", post(logout))
        .route("/me", get(get_current_user))
}

/// Build public auth routes (no auth required)
pub fn public_router() -> Router<AppState> {
    Router::new()
        .route("/registration", post(register))
        .route("/login", post(login))
}

/// POST /api/v1/auth/registration
async fn register(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = RegisterInput::new(body.username, body.email, body.password)
        .with_name(body.first_name, body.last_name);

    let user = state.user_service.register(input).await?;
    let session = state.user_service.start_session(user.id).await?;
    let headers = session_cookie(&session)?;

    Ok((
        StatusCode::CREATED,
        headers,
        Json(AuthResponse {
            user: user.into(),
            token: session.id,
        }),
    ))
}

/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session = state
        .user_service
        .login(LoginInput::new(body.username_or_email, body.password))
        .await?;

    let user = state
        .user_service
        .get_by_id(session.user_id)
        .await?
        .ok_or_else(|| ApiError::internal_error("User disappeared during login"))?;
    let headers = session_cookie(&session)?;

    Ok((
        headers,
        Json(AuthResponse {
            user: user.into(),
            token: session.id,
        }),
    ))
}

/// POST /api/v1/auth/logout
async fn logout(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = extract_session_token(&headers)
        .ok_or_else(|| ApiError::unauthorized("Missing authentication token"))?;

    state.user_service.logout(&token).await?;

    Ok((StatusCode::NO_CONTENT, clear_session_cookie()))
}

/// GET /api/v1/auth/me
async fn get_current_user(user: AuthenticatedUser) -> Json<UserResponse> {
    Json(user.0.into())
}
