//! Domain model for the user data-access layer.
//!
//! # Responsibility
//! - Define the value types exchanged between callers and repositories.
//!
//! # Invariants
//! - Model values are plain data; they never hold a store handle.

pub mod user;
