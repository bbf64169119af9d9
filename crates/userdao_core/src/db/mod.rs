//! SQLite connection provisioning and statement execution.
//!
//! # Responsibility
//! - Supply configured SQLite connections through [`ConnectionProvider`].
//! - Bootstrap the `users` schema before the first connection is handed out.
//! - Run parameterized statements with scoped resource release.
//!
//! # Invariants
//! - Connections handed out have `foreign_keys=ON` and a busy timeout set.
//! - Every statement/connection opened by [`statement`] is released before
//!   the call returns, on success and failure alike.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod provider;
pub mod schema;
pub mod statement;

pub use provider::{
    ConnectionProvider, ProviderConfig, SqliteConnectionProvider, StoreTarget,
    DEFAULT_BUSY_TIMEOUT,
};
pub use statement::{ConnectionSource, MutationOutcome};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    InvalidConfig(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::InvalidConfig(message) => write!(f, "invalid store configuration: {message}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
