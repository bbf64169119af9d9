//! Data-access layer for user records stored in SQLite.
//! Every store round-trip goes through `db::statement`, which owns resource
//! release and fault translation.

pub mod db;
pub mod error;
pub mod hasher;
pub mod logging;
pub mod model;
pub mod repo;

pub use db::{
    ConnectionProvider, ConnectionSource, DbError, DbResult, MutationOutcome, ProviderConfig,
    SqliteConnectionProvider, StoreTarget,
};
pub use error::{DaoError, DaoResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::user::{User, UserId};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
