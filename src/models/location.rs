//! Location model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::default_true;

/// Maximum length of a location name
pub const MAX_NAME_LENGTH: usize = 256;

/// A place a post can be tagged with
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub id: i64,
    pub name: String,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
}

impl Location {
    pub fn new(name: String, is_published: bool) -> Self {
        Self {
            id: 0, // Will be set by the database
            name,
            is_published,
            created_at: Utc::now(),
        }
    }
}

/// Input for creating a location
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLocationInput {
    pub name: String,
    #[serde(default = "default_true")]
    pub is_published: bool,
}

impl CreateLocationInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_published: true,
        }
    }
}

/// Input for updating a location
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateLocationInput {
    pub name: Option<String>,
    pub is_published: Option<bool>,
}

impl UpdateLocationInput {
    /// Check if any field is set for update
    pub fn has_changes(&self) -> bool {
        self.name.is_some() || self.is_published.is_some()
    }
}
