//! Services layer - Business logic
//!
//! Services enforce the blog's rules on top of the repositories:
//! - Visibility of posts to the requester
//! - Author-only edits and deletes
//! - Validation and uniqueness checks

pub mod category;
pub mod comment;
pub mod location;
pub mod password;
pub mod post;
pub mod user;

pub use category::{CategoryService, CategoryServiceError};
pub use comment::{CommentService, CommentServiceError};
pub use location::{LocationService, LocationServiceError};
pub use password::{hash_password, verify_password};
pub use post::{PostDetail, PostRepositories, PostService, PostServiceError};
pub use user::{LoginInput, RegisterInput, UserService, UserServiceError};
