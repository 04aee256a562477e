//! Comment API endpoints
//!
//! - POST /api/v1/posts/{post_id}/comment - Comment on a visible post
//! - GET|POST /api/v1/posts/{post_id}/edit_comment/{comment_id}
//! - GET|POST /api/v1/posts/{post_id}/delete_comment/{comment_id}
//!
//! All routes need a logged-in user. A comment id that does not belong to the
//! post is a 404; a non-author is redirected to the post.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::common::{ActionError, JsonBody};
use crate::api::middleware::{ApiError, AppState, AuthenticatedUser};
use crate::models::{Comment, CommentInput};

/// Build the comment router (requires auth middleware)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/posts/{post_id}/comment", post(add_comment))
        .route(
            "/posts/{post_id}/edit_comment/{comment_id}",
            get(author_view).post(edit_comment),
        )
        .route(
            "/posts/{post_id}/delete_comment/{comment_id}",
            get(author_view).post(delete_comment),
        )
}

/// POST /api/v1/posts/{post_id}/comment
async fn add_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(post_id): Path<i64>,
    JsonBody(input): JsonBody<CommentInput>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    let comment = state.comment_service.add(post_id, user.0.id, input).await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// GET edit_comment / delete_comment: the comment as its author sees it
async fn author_view(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<Json<Comment>, ActionError> {
    let comment = state
        .comment_service
        .get_for_author(post_id, comment_id, user.0.id)
        .await?;
    Ok(Json(comment))
}

/// POST /api/v1/posts/{post_id}/edit_comment/{comment_id}
async fn edit_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
    body: Result<JsonBody<CommentInput>, ApiError>,
) -> Result<Json<Comment>, ActionError> {
    // Non-authors are redirected whatever they sent
    state
        .comment_service
        .get_for_author(post_id, comment_id, user.0.id)
        .await?;
    let JsonBody(input) = body?;

    let comment = state
        .comment_service
        .edit(post_id, comment_id, user.0.id, input)
        .await?;
    Ok(Json(comment))
}

/// POST /api/v1/posts/{post_id}/delete_comment/{comment_id}
async fn delete_comment(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path((post_id, comment_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ActionError> {
    state
        .comment_service
        .delete(post_id, comment_id, user.0.id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
