//! # Error Types
//!
//! Structured errors raised by the entity model and the store, built with
//! `thiserror`. Neither kind is transient; both are client errors.

use thiserror::Error;

use crate::user::UserId;

/// A user failed the shape or format rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The display name is empty.
    #[error("name is required")]
    NameRequired,

    /// The contact address is empty.
    #[error("email is required")]
    EmailRequired,

    /// The contact address does not match `local@domain.tld`.
    #[error("invalid email format")]
    InvalidEmail,
}

/// No user with the referenced identity exists.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("user {id} not found")]
pub struct NotFoundError {
    /// The identity that was looked up.
    pub id: UserId,
}

impl NotFoundError {
    /// Build the error for a missing identity.
    pub fn new(id: UserId) -> Self {
        Self { id }
    }
}
