//! # User Entity
//!
//! The single resource type managed by usersvc. A [`User`] is a plain value:
//! the store owns the canonical copy and hands out clones.
//!
//! ## Wire Format
//!
//! Serializes as `{"id": 1, "name": "...", "email": "..."}`. Every field
//! defaults on input, so a body missing `name` decodes to an empty name and
//! is rejected by [`User::validate`] rather than by the decoder. A supplied
//! `id` is accepted by the decoder and ignored by the store.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::ValidationError;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Identity of a stored user.
///
/// Assigned by the store from a monotonic counter starting at 1. Identities
/// are never reused within a process lifetime. [`UserId::UNASSIGNED`] (zero)
/// marks a user that has not been stored yet.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    /// The identity carried by a user that has not been stored.
    pub const UNASSIGNED: UserId = UserId(0);

    /// Wrap a raw identity value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Access the raw identity value.
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Whether this identity was assigned by a store.
    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl From<u64> for UserId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    /// Store-assigned identity. Ignored on input.
    #[serde(default)]
    #[schema(value_type = u64, example = 1)]
    pub id: UserId,
    /// Display name. Must be non-empty.
    #[serde(default)]
    #[schema(example = "Alice")]
    pub name: String,
    /// Contact address. Must be a `local@domain.tld` email.
    #[serde(default)]
    #[schema(example = "alice@example.com")]
    pub email: String,
}

impl User {
    /// Build an unstored user from its two data fields.
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: UserId::UNASSIGNED,
            name: name.into(),
            email: email.into(),
        }
    }

    /// Return a copy of this user carrying `id`.
    pub fn with_id(mut self, id: UserId) -> Self {
        self.id = id;
        self
    }

    /// Check the shape and format rules.
    ///
    /// Name emptiness is checked first, then email emptiness, then the email
    /// pattern. The identity field is not inspected.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::NameRequired);
        }
        if self.email.is_empty() {
            return Err(ValidationError::EmailRequired);
        }
        if !EMAIL_RE.is_match(&self.email) {
            return Err(ValidationError::InvalidEmail);
        }
        Ok(())
    }
}
