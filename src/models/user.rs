//! User model
//!
//! This module defines the User entity and related types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User entity representing a registered account.
///
/// Profile fields (names, avatar, bio) are owned by the user and only
/// changed through the profile edit flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier
    pub id: i64,
    /// Username (unique)
    pub username: String,
    /// Email address (unique)
    pub email: String,
    /// Password hash (argon2)
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Avatar image reference
    pub avatar: Option<String>,
    /// Free-text "about me"
    pub bio: Option<String>,
    /// User role
    pub role: UserRole,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new User with the given parameters.
    ///
    /// Note: The password should already be hashed before calling this function.
    /// Use `services::password::hash_password()` to hash the password.
    pub fn new(username: String, email: String, password_hash: String, role: UserRole) -> Self {
        let now = Utc::now();
        Self {
            id: 0, // Will be set by the database
            username,
            email,
            password_hash,
            first_name: String::new(),
            last_name: String::new(),
            avatar: None,
            bio: None,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the user is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// "First Last", falling back to the username when both are blank
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// User role for authorization.
///
/// Roles only gate the management surface (categories, locations, accounts).
/// Editing posts and comments is restricted to their author for every role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Administrator - manages categories, locations and accounts
    Admin,
    /// Regular author
    #[default]
    Author,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Author => write!(f, "author"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(UserRole::Admin),
            "author" => Ok(UserRole::Author),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

/// Input for the profile edit flow.
///
/// `None` leaves a field unchanged. For `avatar` and `bio`, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct UpdateProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub avatar: Option<Option<String>>,
    pub bio: Option<Option<String>>,
}

impl UpdateProfileInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_bio(mut self, bio: Option<String>) -> Self {
        self.bio = Some(bio);
        self
    }

    /// Check if any field is set for update
    pub fn has_changes(&self) -> bool {
        self.first_name.is_some()
            || self.last_name.is_some()
            || self.username.is_some()
            || self.email.is_some()
            || self.avatar.is_some()
            || self.bio.is_some()
    }

    /// Apply the set fields onto `user`
    pub fn apply_to(self, user: &mut User) {
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(avatar) = self.avatar {
            user.avatar = avatar;
        }
        if let Some(bio) = self.bio {
            user.bio = bio;
        }
    }
}
