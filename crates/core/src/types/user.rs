//! User records and the inputs that create or change them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Email, UserId};

/// A user as held by the store and sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned id, never reused.
    pub id: UserId,
    /// Display name, trimmed.
    pub name: String,
    /// Email address, unique across users ignoring case.
    pub email: Email,
    /// Optional age in years (0-120).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u8>,
    /// When the user was created.
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    #[serde(with = "super::timestamp")]
    pub updated_at: DateTime<Utc>,
}

/// A validated candidate for user creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: Email,
    pub age: Option<u8>,
}

/// A validated partial update. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub age: Option<u8>,
}

impl UserPatch {
    /// Whether applying this patch would change nothing but `updatedAt`.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.age.is_none()
    }
}
