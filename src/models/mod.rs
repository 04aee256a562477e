//! Data models
//!
//! This module contains all data structures used throughout Blogicum.
//! Models represent:
//! - Database entities (User, Session, Category, Location, Post, Comment)
//! - API request inputs
//! - Pure domain rules (post visibility, author ownership, pagination)

mod category;
mod comment;
mod location;
mod ownership;
mod pagination;
mod post;
mod session;
mod user;
mod visibility;

pub use category::{is_valid_slug, Category, CreateCategoryInput, UpdateCategoryInput};
pub use comment::{Comment, CommentInput, CommentWithAuthor};
pub use location::{CreateLocationInput, Location, UpdateLocationInput};
pub use ownership::{is_author, Authored};
pub use pagination::{parse_page_number, total_pages_for, ListParams, PagedResult, DEFAULT_PER_PAGE};
pub use post::{CreatePostInput, Post, PostWithMeta, UpdatePostInput};
pub use session::Session;
pub use user::{UpdateProfileInput, User, UserRole};
pub use visibility::{
    is_publicly_visible, is_visible_to, PostQuery, PublicFilter,
    UncategorizedPolicy,
};

/// Length limits shared by validation code
pub mod limits {
    pub use super::category::MAX_TITLE_LENGTH as CATEGORY_TITLE_MAX;
    pub use super::location::MAX_NAME_LENGTH as LOCATION_NAME_MAX;
    pub use super::post::MAX_TITLE_LENGTH as POST_TITLE_MAX;
}
