//! Common API utilities and shared types
//!
//! Query extractors, service error mapping, session cookies and the redirect
//! used when someone other than the author tries to change a post or comment.

use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::{header, HeaderMap, HeaderValue},
    response::{IntoResponse, Redirect, Response},
};
use serde::{Deserialize, Deserializer};
use serde_json::json;

use crate::api::middleware::ApiError;
use crate::models::{parse_page_number, Session};
use crate::services::{
    CategoryServiceError, CommentServiceError, LocationServiceError, PostServiceError,
    UserServiceError,
};

// ============================================================================
// Request Bodies
// ============================================================================

/// `Json` extractor whose rejections use the API error shape
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::with_details(
            "VALIDATION_ERROR",
            "Invalid request body",
            json!({ "reason": rejection.body_text() }),
        )
    }
}

// ============================================================================
// Pagination Query Types
// ============================================================================

/// `?page=` on listing routes.
///
/// Kept as raw text so that garbage falls back to the first page instead of
/// being rejected.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn number(&self) -> i64 {
        parse_page_number(self.page.as_deref())
    }
}

/// Deserialize a field that distinguishes "absent" from "null".
///
/// Use with `#[serde(default, deserialize_with = "double_option")]`:
/// a missing field stays `None`, `null` becomes `Some(None)`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

// ============================================================================
// Author-only actions
// ============================================================================

/// Where a post's detail view lives
pub fn post_detail_path(post_id: i64) -> String {
    format!("/api/v1/posts/{}", post_id)
}

/// Failure of an author-only action.
///
/// A non-author is sent back to the post (303 See Other) instead of getting
/// an error body; everything else is a regular [`ApiError`].
#[derive(Debug)]
pub enum ActionError {
    NotAuthor { post_id: i64 },
    Api(ApiError),
}

impl IntoResponse for ActionError {
    fn into_response(self) -> Response {
        match self {
            ActionError::NotAuthor { post_id } => {
                Redirect::to(&post_detail_path(post_id)).into_response()
            }
            ActionError::Api(error) => error.into_response(),
        }
    }
}

impl From<ApiError> for ActionError {
    fn from(error: ApiError) -> Self {
        ActionError::Api(error)
    }
}

impl From<PostServiceError> for ActionError {
    fn from(error: PostServiceError) -> Self {
        match error {
            PostServiceError::NotAuthor { post_id } => ActionError::NotAuthor { post_id },
            other => ActionError::Api(other.into()),
        }
    }
}

impl From<CommentServiceError> for ActionError {
    fn from(error: CommentServiceError) -> Self {
        match error {
            CommentServiceError::NotAuthor { post_id } => ActionError::NotAuthor { post_id },
            other => ActionError::Api(other.into()),
        }
    }
}

// ============================================================================
// Service error mapping
// ============================================================================

impl From<PostServiceError> for ApiError {
    fn from(error: PostServiceError) -> Self {
        match error {
            PostServiceError::NotFound(msg) => ApiError::not_found(msg),
            PostServiceError::NotAuthor { post_id } => {
                ApiError::forbidden(format!("Only the author may modify post {}", post_id))
            }
            PostServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            PostServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<CommentServiceError> for ApiError {
    fn from(error: CommentServiceError) -> Self {
        match error {
            CommentServiceError::NotFound(msg) => ApiError::not_found(msg),
            CommentServiceError::NotAuthor { .. } => {
                ApiError::forbidden("Only the author may modify this comment")
            }
            CommentServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            CommentServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<UserServiceError> for ApiError {
    fn from(error: UserServiceError) -> Self {
        match error {
            UserServiceError::AuthenticationError(msg) => ApiError::unauthorized(msg),
            UserServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            UserServiceError::UserExists(msg) => ApiError::conflict(msg),
            UserServiceError::NotFound(msg) => ApiError::not_found(format!("User not found: {}", msg)),
            UserServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<CategoryServiceError> for ApiError {
    fn from(error: CategoryServiceError) -> Self {
        match error {
            CategoryServiceError::DuplicateSlug(slug) => {
                ApiError::conflict(format!("Category slug already exists: {}", slug))
            }
            CategoryServiceError::NotFound(msg) => {
                ApiError::not_found(format!("Category not found: {}", msg))
            }
            CategoryServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            CategoryServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

impl From<LocationServiceError> for ApiError {
    fn from(error: LocationServiceError) -> Self {
        match error {
            LocationServiceError::NotFound(msg) => {
                ApiError::not_found(format!("Location not found: {}", msg))
            }
            LocationServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            LocationServiceError::InternalError(e) => ApiError::internal_error(e.to_string()),
        }
    }
}

// ============================================================================
// Session cookie
// ============================================================================

/// `Set-Cookie` headers carrying a fresh session
pub fn session_cookie(session: &Session) -> Result<HeaderMap, ApiError> {
    let cookie = format!(
        "session={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session.id,
        session.max_age_seconds()
    );

    let value = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::internal_error(format!("Invalid session cookie: {}", e)))?;
    let mut headers = HeaderMap::new();
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

/// `Set-Cookie` headers that clear the session
pub fn clear_session_cookie() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_static("session=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0"),
    );
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::Duration;

    #[test]
    fn test_page_query_number() {
        let page = |raw: Option<&str>| PageQuery { page: raw.map(String::from) }.number();

        assert_eq!(page(None), 1);
        assert_eq!(page(Some("3")), 3);
        assert_eq!(page(Some("abc")), 1);
        assert_eq!(page(Some("")), 1);
        assert_eq!(page(Some("-2")), -2);
    }

    #[test]
    fn test_double_option() {
        #[derive(Deserialize)]
        struct Patch {
            #[serde(default, deserialize_with = "double_option")]
            image: Option<Option<String>>,
        }

        let absent: Patch = serde_json::from_str("{}").unwrap();
        let cleared: Patch = serde_json::from_str(r#"{"image": null}"#).unwrap();
        let set: Patch = serde_json::from_str(r#"{"image": "a.png"}"#).unwrap();

        assert_eq!(absent.image, None);
        assert_eq!(cleared.image, Some(None));
        assert_eq!(set.image, Some(Some("a.png".to_string())));
    }

    #[test]
    fn test_not_author_redirects_to_post() {
        let response = ActionError::from(PostServiceError::NotAuthor { post_id: 7 }).into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/api/v1/posts/7"
        );
    }

    #[test]
    fn test_other_action_errors_keep_status() {
        let response =
            ActionError::from(CommentServiceError::NotFound("comment".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_session_cookie() {
        let session = Session::issue(1, Duration::days(7));
        let headers = session_cookie(&session).unwrap();
        let cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();

        assert!(cookie.starts_with(&format!("session={};", session.id)));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age="));
    }
}
