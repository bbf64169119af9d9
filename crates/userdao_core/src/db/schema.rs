//! `users` table bootstrap.
//!
//! # Responsibility
//! - Create the `users` table when it does not exist yet.
//!
//! # Invariants
//! - Bootstrap is idempotent; an existing table is left untouched.
//! - Uniqueness of `username` and `email` is enforced by the store.

use super::DbResult;
use rusqlite::Connection;

const USERS_SCHEMA_SQL: &str = include_str!("schema.sql");

/// Creates the `users` table if missing.
pub fn ensure_schema(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(USERS_SCHEMA_SQL)?;
    Ok(())
}
