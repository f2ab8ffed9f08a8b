//! # usersvc-state — The User Store
//!
//! Sole authority over the user collection and its identity counter.
//! See [`UserStore`].

pub mod store;

pub use store::UserStore;
