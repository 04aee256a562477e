//! Shared API response types

use serde::Serialize;

use crate::models::{Category, PagedResult, PostWithMeta, User};

// ============================================================================
// Pagination Response Types
// ============================================================================

/// One page of a listing plus navigation metadata
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> From<PagedResult<T>> for PageResponse<T> {
    fn from(result: PagedResult<T>) -> Self {
        Self {
            total_pages: result.total_pages(),
            has_next: result.has_next(),
            has_prev: result.has_prev(),
            total: result.total,
            page: result.page,
            per_page: result.per_page,
            items: result.items,
        }
    }
}

// ============================================================================
// User Response Types
// ============================================================================

/// The caller's own account
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub role: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            avatar: user.avatar,
            bio: user.bio,
            role: user.role.to_string(),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Someone's public profile card
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub first_name: String,
    pub last_name: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub joined_at: String,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            display_name: user.display_name(),
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            avatar: user.avatar,
            bio: user.bio,
            joined_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Response for successful authentication
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub token: String,
}

// ============================================================================
// Listing Response Types
// ============================================================================

/// A category page: the category and a page of its posts
#[derive(Debug, Serialize)]
pub struct CategoryPostsResponse {
    pub category: Category,
    pub posts: PageResponse<PostWithMeta>,
}

/// A profile page: the user and a page of their posts
#[derive(Debug, Serialize)]
pub struct ProfilePostsResponse {
    pub profile: ProfileResponse,
    pub posts: PageResponse<PostWithMeta>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ListParams, PagedResult, UserRole};

    #[test]
    fn test_page_response_metadata() {
        let params = ListParams::clamped(2, 10, 25);
        let items: Vec<i32> = (10..20).collect();
        let response: PageResponse<i32> = PagedResult::new(items, 25, &params).into();

        assert_eq!(response.items.len(), 10);
        assert_eq!(response.total_pages, 3);
        assert!(response.has_next);
        assert!(response.has_prev);
    }

    #[test]
    fn test_user_response_has_no_password() {
        let user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "$argon2id$secret".to_string(),
            UserRole::Author,
        );
        let json = serde_json::to_value(UserResponse::from(user)).unwrap();

        assert_eq!(json["role"], "author");
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_profile_response_hides_email() {
        let user = User::new(
            "alice".to_string(),
            "alice@example.com".to_string(),
            "hash".to_string(),
            UserRole::Author,
        );
        let json = serde_json::to_value(ProfileResponse::from(user)).unwrap();

        assert_eq!(json["display_name"], "alice");
        assert!(json.get("email").is_none());
    }
}
