//! Repository layer for the `users` table.
//!
//! # Responsibility
//! - Define the caller-facing user data-access contract.
//! - Isolate SQL text and row/parameter mapping from callers.
//!
//! # Invariants
//! - Repository APIs return `PreconditionViolation` for lifecycle misuse and
//!   `StoreOperationFailure` for everything the store rejects.

pub mod mapper;
pub mod user_repo;
