//! API layer - HTTP handlers
//!
//! All endpoints live under `/api/v1`:
//! - Public listings and detail views (login optional)
//! - Author actions on posts, comments and the own profile (login required)
//! - Category, location and account management (administrators)

pub mod admin;
pub mod auth;
pub mod categories;
pub mod comments;
pub mod common;
pub mod locations;
pub mod middleware;
pub mod posts;
pub mod profile;
pub mod responses;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::db::repositories::{
    SqlxCategoryRepository, SqlxCommentRepository, SqlxLocationRepository, SqlxPostRepository,
    SqlxSessionRepository, SqlxUserRepository,
};
use crate::db::DynDatabasePool;
use crate::services::{
    CategoryService, CommentService, LocationService, PostRepositories, PostService, UserService,
};

pub use middleware::{ApiError, AppState, AuthenticatedUser, Viewer};

/// Wire repositories and services over one pool
pub fn build_state(pool: DynDatabasePool, config: &Config) -> AppState {
    let policy = config.posts.uncategorized_policy();
    let per_page = config.pagination.per_page;

    let user_repo = SqlxUserRepository::boxed(pool.clone());
    let post_repo = SqlxPostRepository::boxed(pool.clone());
    let comment_repo = SqlxCommentRepository::boxed(pool.clone());
    let category_repo = SqlxCategoryRepository::boxed(pool.clone());
    let location_repo = SqlxLocationRepository::boxed(pool.clone());

    let user_service = UserService::with_session_expiration(
        user_repo.clone(),
        SqlxSessionRepository::boxed(pool),
        config.auth.session_days,
    );
    let post_service = PostService::with_options(
        PostRepositories {
            posts: post_repo.clone(),
            comments: comment_repo.clone(),
            categories: category_repo.clone(),
            locations: location_repo.clone(),
            users: user_repo,
        },
        per_page,
        policy,
    );

    AppState {
        user_service: Arc::new(user_service),
        post_service: Arc::new(post_service),
        comment_service: Arc::new(CommentService::new(comment_repo, post_repo, policy)),
        category_service: Arc::new(CategoryService::new(category_repo)),
        location_service: Arc::new(LocationService::new(location_repo)),
        per_page,
    }
}

pub fn build_api_router(state: AppState) -> Router<AppState> {
    let admin_routes = Router::new()
        .nest("/admin", admin::router())
        .route_layer(axum_middleware::from_fn(middleware::require_admin))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let protected_routes = Router::new()
        .nest("/auth", auth::protected_router())
        .merge(posts::protected_router())
        .merge(comments::router())
        .merge(profile::protected_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ));

    let viewer_routes = Router::new()
        .merge(posts::public_router())
        .merge(profile::public_router())
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::optional_auth,
        ));

    Router::new()
        .nest("/auth", auth::public_router())
        .merge(categories::public_router())
        .merge(locations::public_router())
        .merge(viewer_routes)
        .merge(admin_routes)
        .merge(protected_routes)
}

pub fn build_router(state: AppState, cors_origin: &str) -> anyhow::Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE])
        .allow_credentials(true);

    Ok(Router::new()
        .nest("/api/v1", build_api_router(state.clone()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_test_pool, migrations};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use chrono::{Duration, Utc};
    use serde_json::{json, Value};

    async fn setup_test_server() -> TestServer {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let state = build_state(pool, &Config::default());
        let app = build_router(state, "http://localhost:3000").expect("router");
        TestServer::new(app).expect("test server")
    }

    /// Register an account and return its bearer token
    async fn register(server: &TestServer, username: &str) -> String {
        let response = server
            .post("/api/v1/auth/registration")
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "secret-pw",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()["token"]
            .as_str()
            .expect("token")
            .to_string()
    }

    async fn create_category(server: &TestServer, admin: &str, slug: &str, published: bool) -> i64 {
        let response = server
            .post("/api/v1/admin/categories")
            .authorization_bearer(admin)
            .json(&json!({ "title": slug, "slug": slug, "is_published": published }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()["id"].as_i64().expect("id")
    }

    async fn create_post(server: &TestServer, token: &str, body: Value) -> i64 {
        let response = server
            .post("/api/v1/posts/create")
            .authorization_bearer(token)
            .json(&body)
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        response.json::<Value>()["id"].as_i64().expect("id")
    }

    fn post_body(title: &str, category_id: i64) -> Value {
        json!({
            "title": title,
            "text": "Body",
            "pub_date": Utc::now() - Duration::hours(1),
            "category_id": category_id,
        })
    }

    #[tokio::test]
    async fn test_registration_logs_in() {
        let server = setup_test_server().await;

        let response = server
            .post("/api/v1/auth/registration")
            .json(&json!({
                "username": "alice",
                "email": "alice@example.com",
                "password": "secret-pw",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let cookie = response.header("set-cookie");
        assert!(cookie.to_str().unwrap().starts_with("session="));

        let body = response.json::<Value>();
        assert_eq!(body["user"]["role"], "admin");
        let token = body["token"].as_str().unwrap();

        let me = server.get("/api/v1/auth/me").authorization_bearer(token).await;
        assert_eq!(me.status_code(), StatusCode::OK);
        assert_eq!(me.json::<Value>()["username"], "alice");
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let server = setup_test_server().await;
        register(&server, "alice").await;

        let response = server
            .post("/api/v1/auth/registration")
            .json(&json!({
                "username": "alice",
                "email": "other@example.com",
                "password": "pw",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let server = setup_test_server().await;
        register(&server, "alice").await;

        let bad = server
            .post("/api/v1/auth/login")
            .json(&json!({ "username": "alice", "password": "wrong" }))
            .await;
        assert_eq!(bad.status_code(), StatusCode::UNAUTHORIZED);

        let login = server
            .post("/api/v1/auth/login")
            .json(&json!({ "username_or_email": "alice@example.com", "password": "secret-pw" }))
            .await;
        assert_eq!(login.status_code(), StatusCode::OK);
        let token = login.json::<Value>()["token"].as_str().unwrap().to_string();

        let logout = server.post("/api/v1/auth/logout").authorization_bearer(&token).await;
        assert_eq!(logout.status_code(), StatusCode::NO_CONTENT);

        let me = server.get("/api/v1/auth/me").authorization_bearer(&token).await;
        assert_eq!(me.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_routes_need_login() {
        let server = setup_test_server().await;

        let response = server
            .post("/api/v1/posts/create")
            .json(&post_body("Anon", 1))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_index_pagination() {
        let server = setup_test_server().await;
        let admin = register(&server, "admin").await;
        let category = create_category(&server, &admin, "travel", true).await;
        for i in 0..25 {
            create_post(&server, &admin, post_body(&format!("Post {:02}", i), category)).await;
        }

        let first = server.get("/api/v1/posts").await.json::<Value>();
        assert_eq!(first["items"].as_array().unwrap().len(), 10);
        assert_eq!(first["total_pages"], 3);
        assert_eq!(first["has_next"], true);
        assert_eq!(first["has_prev"], false);
        assert_eq!(first["items"][0]["comment_count"], 0);

        let last = server
            .get("/api/v1/posts")
            .add_query_param("page", "3")
            .await
            .json::<Value>();
        assert_eq!(last["items"].as_array().unwrap().len(), 5);

        let clamped = server
            .get("/api/v1/posts")
            .add_query_param("page", "99")
            .await
            .json::<Value>();
        assert_eq!(clamped["page"], 3);

        let garbage = server
            .get("/api/v1/posts")
            .add_query_param("page", "abc")
            .await
            .json::<Value>();
        assert_eq!(garbage["page"], 1);
    }

    #[tokio::test]
    async fn test_category_page() {
        let server = setup_test_server().await;
        let admin = register(&server, "admin").await;
        let travel = create_category(&server, &admin, "travel", true).await;
        create_category(&server, &admin, "hidden", false).await;
        create_post(&server, &admin, post_body("Trip", travel)).await;

        let response = server.get("/api/v1/category/travel").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        let body = response.json::<Value>();
        assert_eq!(body["category"]["slug"], "travel");
        assert_eq!(body["posts"]["total"], 1);

        let hidden = server.get("/api/v1/category/hidden").await;
        assert_eq!(hidden.status_code(), StatusCode::NOT_FOUND);
        let missing = server.get("/api/v1/category/nope").await;
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);

        let listed = server.get("/api/v1/categories").await.json::<Value>();
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_draft_detail_only_for_author() {
        let server = setup_test_server().await;
        let admin = register(&server, "admin").await;
        let reader = register(&server, "reader").await;
        let category = create_category(&server, &admin, "travel", true).await;

        let mut body = post_body("Draft", category);
        body["is_published"] = json!(false);
        let post_id = create_post(&server, &admin, body).await;
        let path = format!("/api/v1/posts/{}", post_id);

        assert_eq!(server.get(&path).await.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            server.get(&path).authorization_bearer(&reader).await.status_code(),
            StatusCode::NOT_FOUND
        );
        let own = server.get(&path).authorization_bearer(&admin).await;
        assert_eq!(own.status_code(), StatusCode::OK);
        assert_eq!(own.json::<Value>()["post"]["title"], "Draft");
    }

    #[tokio::test]
    async fn test_non_author_post_actions_redirect() {
        let server = setup_test_server().await;
        let admin = register(&server, "admin").await;
        let reader = register(&server, "reader").await;
        let category = create_category(&server, &admin, "travel", true).await;
        let post_id = create_post(&server, &admin, post_body("Original", category)).await;
        let detail = format!("/api/v1/posts/{}", post_id);

        for response in [
            server
                .post(&format!("{}/edit", detail))
                .authorization_bearer(&reader)
                .json(&json!({ "title": "Hijacked" }))
                .await,
            server.get(&format!("{}/edit", detail)).authorization_bearer(&reader).await,
            server.get(&format!("{}/delete", detail)).authorization_bearer(&reader).await,
            server.post(&format!("{}/delete", detail)).authorization_bearer(&reader).await,
        ] {
            assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
            assert_eq!(response.header("location"), detail.as_str());
        }

        let stored = server.get(&detail).await.json::<Value>();
        assert_eq!(stored["post"]["title"], "Original");
    }

    #[tokio::test]
    async fn test_non_author_edit_redirects_whatever_the_body() {
        let server = setup_test_server().await;
        let admin = register(&server, "admin").await;
        let reader = register(&server, "reader").await;
        let category = create_category(&server, &admin, "travel", true).await;
        let post_id = create_post(&server, &admin, post_body("Original", category)).await;
        let detail = format!("/api/v1/posts/{}", post_id);

        let comment = server
            .post(&format!("{}/comment", detail))
            .authorization_bearer(&admin)
            .json(&json!({ "text": "by the author" }))
            .await;
        let comment_id = comment.json::<Value>()["id"].as_i64().unwrap();
        let edit_comment = format!("{}/edit_comment/{}", detail, comment_id);

        for response in [
            server.post(&format!("{}/edit", detail)).authorization_bearer(&reader).await,
            server
                .post(&format!("{}/edit", detail))
                .authorization_bearer(&reader)
                .json(&json!({ "title": 5 }))
                .await,
            server.post(&edit_comment).authorization_bearer(&reader).await,
            server
                .post(&edit_comment)
                .authorization_bearer(&reader)
                .json(&json!({ "text": ["not", "text"] }))
                .await,
        ] {
            assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
            assert_eq!(response.header("location"), detail.as_str());
        }

        // the author gets the usual error shape for a bad body
        let bad = server
            .post(&format!("{}/edit", detail))
            .authorization_bearer(&admin)
            .json(&json!({ "title": 5 }))
            .await;
        assert_eq!(bad.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(bad.json::<Value>()["error"]["code"], "VALIDATION_ERROR");

        let missing = server.post(&edit_comment).authorization_bearer(&admin).await;
        assert_eq!(missing.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(missing.json::<Value>()["error"]["code"], "VALIDATION_ERROR");

        let stored = server.get(&detail).await.json::<Value>();
        assert_eq!(stored["post"]["title"], "Original");
        assert_eq!(stored["comments"][0]["text"], "by the author");
    }

    #[tokio::test]
    async fn test_malformed_bodies_use_error_shape() {
        let server = setup_test_server().await;

        let wrong_type = server
            .post("/api/v1/auth/registration")
            .json(&json!({ "username": 5, "email": "a@example.com", "password": "pw" }))
            .await;
        assert_eq!(wrong_type.status_code(), StatusCode::BAD_REQUEST);
        let body = wrong_type.json::<Value>();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["details"]["reason"].is_string());

        let not_json = server.post("/api/v1/auth/login").text("username=alice").await;
        assert_eq!(not_json.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(not_json.json::<Value>()["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_username_edit_is_reserved() {
        let server = setup_test_server().await;

        let response = server
            .post("/api/v1/auth/registration")
            .json(&json!({
                "username": "edit",
                "email": "edit@example.com",
                "password": "secret-pw",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let token = register(&server, "alice").await;
        let rename = server
            .post("/api/v1/profile/edit")
            .authorization_bearer(&token)
            .json(&json!({ "username": "edit" }))
            .await;
        assert_eq!(rename.status_code(), StatusCode::BAD_REQUEST);

        let profile = server.get("/api/v1/profile/alice").await;
        assert_eq!(profile.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_author_edits_and_deletes_post() {
        let server = setup_test_server().await;
        let admin = register(&server, "admin").await;
        let category = create_category(&server, &admin, "travel", true).await;
        let post_id = create_post(&server, &admin, post_body("Original", category)).await;
        let detail = format!("/api/v1/posts/{}", post_id);

        let edited = server
            .post(&format!("{}/edit", detail))
            .authorization_bearer(&admin)
            .json(&json!({ "title": "Edited", "image": "cover.png" }))
            .await;
        assert_eq!(edited.status_code(), StatusCode::OK);
        assert_eq!(edited.json::<Value>()["title"], "Edited");

        let deleted = server
            .post(&format!("{}/delete", detail))
            .authorization_bearer(&admin)
            .await;
        assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);
        assert_eq!(
            server.get(&detail).authorization_bearer(&admin).await.status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_comment_flow() {
        let server = setup_test_server().await;
        let admin = register(&server, "admin").await;
        let reader = register(&server, "reader").await;
        let category = create_category(&server, &admin, "travel", true).await;
        let post_id = create_post(&server, &admin, post_body("Open", category)).await;
        let other_post = create_post(&server, &admin, post_body("Other", category)).await;

        let mut comment_ids = Vec::new();
        for text in ["first", "second"] {
            let response = server
                .post(&format!("/api/v1/posts/{}/comment", post_id))
                .authorization_bearer(&reader)
                .json(&json!({ "text": text }))
                .await;
            assert_eq!(response.status_code(), StatusCode::CREATED);
            comment_ids.push(response.json::<Value>()["id"].as_i64().unwrap());
        }

        let detail = server.get(&format!("/api/v1/posts/{}", post_id)).await.json::<Value>();
        assert_eq!(detail["comments"][0]["text"], "first");
        assert_eq!(detail["comments"][1]["text"], "second");
        assert_eq!(detail["comments"][0]["author_username"], "reader");

        // the post author did not write the comment
        let hijack = server
            .post(&format!("/api/v1/posts/{}/edit_comment/{}", post_id, comment_ids[0]))
            .authorization_bearer(&admin)
            .json(&json!({ "text": "edited by someone else" }))
            .await;
        assert_eq!(hijack.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(hijack.header("location"), format!("/api/v1/posts/{}", post_id).as_str());

        let wrong_post = server
            .get(&format!("/api/v1/posts/{}/delete_comment/{}", other_post, comment_ids[0]))
            .authorization_bearer(&reader)
            .await;
        assert_eq!(wrong_post.status_code(), StatusCode::NOT_FOUND);

        let edit = server
            .post(&format!("/api/v1/posts/{}/edit_comment/{}", post_id, comment_ids[0]))
            .authorization_bearer(&reader)
            .json(&json!({ "text": "first (edited)" }))
            .await;
        assert_eq!(edit.status_code(), StatusCode::OK);

        let delete = server
            .post(&format!("/api/v1/posts/{}/delete_comment/{}", post_id, comment_ids[1]))
            .authorization_bearer(&reader)
            .await;
        assert_eq!(delete.status_code(), StatusCode::NO_CONTENT);

        let detail = server.get(&format!("/api/v1/posts/{}", post_id)).await.json::<Value>();
        assert_eq!(detail["comments"].as_array().unwrap().len(), 1);
        assert_eq!(detail["comments"][0]["text"], "first (edited)");
        assert_eq!(detail["post"]["comment_count"], 1);
    }

    #[tokio::test]
    async fn test_cannot_comment_on_hidden_post() {
        let server = setup_test_server().await;
        let admin = register(&server, "admin").await;
        let reader = register(&server, "reader").await;
        let category = create_category(&server, &admin, "travel", true).await;

        let mut body = post_body("Scheduled", category);
        body["pub_date"] = json!(Utc::now() + Duration::days(2));
        let post_id = create_post(&server, &admin, body).await;

        let response = server
            .post(&format!("/api/v1/posts/{}/comment", post_id))
            .authorization_bearer(&reader)
            .json(&json!({ "text": "too early" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_views() {
        let server = setup_test_server().await;
        let admin = register(&server, "admin").await;
        let reader = register(&server, "reader").await;
        let category = create_category(&server, &admin, "travel", true).await;
        create_post(&server, &admin, post_body("Live", category)).await;
        let mut draft = post_body("Draft", category);
        draft["is_published"] = json!(false);
        create_post(&server, &admin, draft).await;

        let own = server
            .get("/api/v1/profile/admin")
            .authorization_bearer(&admin)
            .await
            .json::<Value>();
        assert_eq!(own["posts"]["total"], 2);
        assert_eq!(own["profile"]["username"], "admin");

        let other = server
            .get("/api/v1/profile/admin")
            .authorization_bearer(&reader)
            .await
            .json::<Value>();
        assert_eq!(other["posts"]["total"], 1);

        let missing = server.get("/api/v1/profile/nobody").await;
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_edit() {
        let server = setup_test_server().await;
        let token = register(&server, "alice").await;
        register(&server, "bob").await;

        let form = server.get("/api/v1/profile/edit").authorization_bearer(&token).await;
        assert_eq!(form.status_code(), StatusCode::OK);
        assert_eq!(form.json::<Value>()["email"], "alice@example.com");

        let updated = server
            .post("/api/v1/profile/edit")
            .authorization_bearer(&token)
            .json(&json!({ "first_name": "Alice", "bio": "Hello" }))
            .await;
        assert_eq!(updated.status_code(), StatusCode::OK);
        assert_eq!(updated.json::<Value>()["bio"], "Hello");

        let taken = server
            .post("/api/v1/profile/edit")
            .authorization_bearer(&token)
            .json(&json!({ "username": "bob" }))
            .await;
        assert_eq!(taken.status_code(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_admin_routes_need_admin() {
        let server = setup_test_server().await;
        register(&server, "admin").await;
        let reader = register(&server, "reader").await;

        let response = server
            .post("/api/v1/admin/categories")
            .authorization_bearer(&reader)
            .json(&json!({ "title": "Travel", "slug": "travel" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

        let anonymous = server.get("/api/v1/admin/users").await;
        assert_eq!(anonymous.status_code(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_category_and_location_management() {
        let server = setup_test_server().await;
        let admin = register(&server, "admin").await;
        let id = create_category(&server, &admin, "travel", true).await;

        let bad_slug = server
            .post("/api/v1/admin/categories")
            .authorization_bearer(&admin)
            .json(&json!({ "title": "Bad", "slug": "no spaces" }))
            .await;
        assert_eq!(bad_slug.status_code(), StatusCode::BAD_REQUEST);

        let duplicate = server
            .post("/api/v1/admin/categories")
            .authorization_bearer(&admin)
            .json(&json!({ "title": "Again", "slug": "travel" }))
            .await;
        assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);

        let hidden = server
            .put(&format!("/api/v1/admin/categories/{}", id))
            .authorization_bearer(&admin)
            .json(&json!({ "is_published": false }))
            .await;
        assert_eq!(hidden.json::<Value>()["is_published"], false);
        assert_eq!(
            server.get("/api/v1/category/travel").await.status_code(),
            StatusCode::NOT_FOUND
        );

        let location = server
            .post("/api/v1/admin/locations")
            .authorization_bearer(&admin)
            .json(&json!({ "name": "Kazan" }))
            .await;
        assert_eq!(location.status_code(), StatusCode::CREATED);
        let public = server.get("/api/v1/locations").await.json::<Value>();
        assert_eq!(public[0]["name"], "Kazan");

        let deleted = server
            .delete(&format!("/api/v1/admin/categories/{}", id))
            .authorization_bearer(&admin)
            .await;
        assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_admin_deletes_user_with_content() {
        let server = setup_test_server().await;
        let admin = register(&server, "admin").await;
        let author = register(&server, "author").await;
        let category = create_category(&server, &admin, "travel", true).await;
        let post_id = create_post(&server, &author, post_body("Mine", category)).await;

        let me = server.get("/api/v1/auth/me").authorization_bearer(&author).await;
        let author_id = me.json::<Value>()["id"].as_i64().unwrap();

        let response = server
            .delete(&format!("/api/v1/admin/users/{}", author_id))
            .authorization_bearer(&admin)
            .await;
        assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

        assert_eq!(
            server.get(&format!("/api/v1/posts/{}", post_id)).await.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            server.get("/api/v1/auth/me").authorization_bearer(&author).await.status_code(),
            StatusCode::UNAUTHORIZED
        );

        let users = server
            .get("/api/v1/admin/users")
            .authorization_bearer(&admin)
            .await
            .json::<Value>();
        assert_eq!(users["total"], 1);
    }
}
