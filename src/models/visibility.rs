//! Post visibility rules
//!
//! A post is public when it is published, its `pub_date` has passed and its
//! category (if any) is published. Its author always sees it.
//!
//! Whether a post *without* a category is public is a deployment decision,
//! carried by [`UncategorizedPolicy`].
//!
//! Listings never reuse a shared query object: every request builds its own
//! [`PostQuery`], which the repository compiles to SQL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Category, Post};

/// How posts without a category are treated for public visibility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UncategorizedPolicy {
    /// The category condition holds vacuously
    Visible,
    /// A post must sit in a published category to be public
    #[default]
    Hidden,
}

/// Check the public visibility rule for a single post.
///
/// `category` is the post's loaded category, `None` when it has none.
pub fn is_publicly_visible(
    post: &Post,
    category: Option<&Category>,
    now: DateTime<Utc>,
    policy: UncategorizedPolicy,
) -> bool {
    if !post.is_published || post.pub_date > now {
        return false;
    }
    match category {
        Some(category) => category.is_published,
        None => policy == UncategorizedPolicy::Visible,
    }
}

/// Check whether `viewer` may see the post; the author bypasses the rule
pub fn is_visible_to(
    post: &Post,
    category: Option<&Category>,
    viewer: Option<i64>,
    now: DateTime<Utc>,
    policy: UncategorizedPolicy,
) -> bool {
    if viewer == Some(post.author_id) {
        return true;
    }
    is_publicly_visible(post, category, now, policy)
}

/// Public-visibility predicate carried by a [`PostQuery`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicFilter {
    pub now: DateTime<Utc>,
    pub policy: UncategorizedPolicy,
}

/// A post listing query, built fresh for each request.
///
/// Results are ordered newest `pub_date` first, then by title and id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostQuery {
    /// `None` lists every post regardless of flags (author self-view)
    pub public: Option<PublicFilter>,
    /// Restrict to a category slug
    pub category_slug: Option<String>,
    /// Restrict to one author
    pub author_id: Option<i64>,
}

impl PostQuery {
    /// Posts the general public may see at `now`
    pub fn public(now: DateTime<Utc>, policy: UncategorizedPolicy) -> Self {
        Self {
            public: Some(PublicFilter { now, policy }),
            category_slug: None,
            author_id: None,
        }
    }

    /// Every post, with no visibility filter
    pub fn unfiltered() -> Self {
        Self {
            public: None,
            category_slug: None,
            author_id: None,
        }
    }

    /// What `viewer` sees on `author_id`'s profile
    pub fn for_profile(
        author_id: i64,
        viewer: Option<i64>,
        now: DateTime<Utc>,
        policy: UncategorizedPolicy,
    ) -> Self {
        let base = if viewer == Some(author_id) {
            Self::unfiltered()
        } else {
            Self::public(now, policy)
        };
        base.authored_by(author_id)
    }

    pub fn in_category(mut self, slug: impl Into<String>) -> Self {
        self.category_slug = Some(slug.into());
        self
    }

    pub fn authored_by(mut self, author_id: i64) -> Self {
        self.author_id = Some(author_id);
        self
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use crate::models::CreatePostInput;
    use chrono::Duration;
    use proptest::prelude::*;

    fn policy_strategy() -> impl Strategy<Value = UncategorizedPolicy> {
        prop_oneof![Just(UncategorizedPolicy::Visible), Just(UncategorizedPolicy::Hidden)]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Public visibility is exactly the conjunction of the three conditions
        #[test]
        fn public_visibility_matches_invariant(
            is_published in any::<bool>(),
            offset_minutes in -10_000i64..10_000,
            category_state in prop::option::of(any::<bool>()),
            policy in policy_strategy(),
        ) {
            let now = Utc::now();
            let mut post = Post::new(1, CreatePostInput::new("T", "B", now + Duration::minutes(offset_minutes)));
            post.is_published = is_published;
            let category = category_state.map(|published| {
                Category::new("C".to_string(), String::new(), "c".to_string(), published)
            });

            let category_ok = match category_state {
                Some(published) => published,
                None => policy == UncategorizedPolicy::Visible,
            };
            let expected = is_published && offset_minutes <= 0 && category_ok;

            prop_assert_eq!(is_publicly_visible(&post, category.as_ref(), now, policy), expected);
        }

        /// The author sees their post whatever its flags
        #[test]
        fn author_bypasses_filter(
            author_id in 1i64..1000,
            is_published in any::<bool>(),
            offset_minutes in -10_000i64..10_000,
            category_published in any::<bool>(),
            policy in policy_strategy(),
        ) {
            let now = Utc::now();
            let mut post = Post::new(author_id, CreatePostInput::new("T", "B", now + Duration::minutes(offset_minutes)));
            post.is_published = is_published;
            let category = Category::new("C".to_string(), String::new(), "c".to_string(), category_published);

            prop_assert!(is_visible_to(&post, Some(&category), Some(author_id), now, policy));
        }
    }
}
