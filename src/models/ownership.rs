//! Author-only action checks

use super::{Comment, Post};

/// Entities owned by a single author
pub trait Authored {
    fn author_id(&self) -> i64;
}

impl Authored for Post {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

impl Authored for Comment {
    fn author_id(&self) -> i64 {
        self.author_id
    }
}

/// Check whether `requester` may edit or delete `target`
pub fn is_author<T: Authored + ?Sized>(requester: i64, target: &T) -> bool {
    target.author_id() == requester
}
