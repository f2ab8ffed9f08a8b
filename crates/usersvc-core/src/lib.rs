#![deny(missing_docs)]

//! # usersvc-core — Foundational Types for usersvc
//!
//! The user entity, its identity newtype, and the validation rules every
//! create and update must pass before the store is touched. No internal
//! crate dependencies.
//!
//! ## Design Principles
//!
//! 1. **Newtype identity.** [`UserId`] wraps a `u64`; zero is reserved for
//!    "not yet assigned" and never appears in the store.
//!
//! 2. **Validation is pure.** [`User::validate`] is a total function of the
//!    entity's field values with no side effects.
//!
//! 3. **Typed failures.** [`ValidationError`] and [`NotFoundError`] carry a
//!    diagnostic reason; translating them to client-visible responses belongs
//!    to the API layer.

pub mod error;
pub mod user;

pub use error::{NotFoundError, ValidationError};
pub use user::{User, UserId};
