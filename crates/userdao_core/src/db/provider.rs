//! Connection provisioning for SQLite stores.
//!
//! # Responsibility
//! - Open one fresh, configured connection per acquisition.
//! - Bootstrap the schema once when the provider is built.
//! - Keep shared in-memory databases alive for the provider's lifetime.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and the configured busy timeout.
//! - The provider holds no per-call state; acquisitions are independent.
//!
//! # See also
//! - `db::statement` for how acquired connections are released.

use super::schema::ensure_schema;
use super::statement::release_connection;
use super::{DbError, DbResult};
use log::{debug, error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Busy timeout applied to every connection unless overridden.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of store connections.
///
/// Implementations decide how connections are opened or pooled. Callers treat
/// each acquisition as fallible and own the returned connection until they
/// close it.
pub trait ConnectionProvider: Send + Sync {
    fn acquire_connection(&self) -> DbResult<Connection>;
}

impl<P: ConnectionProvider + ?Sized> ConnectionProvider for Arc<P> {
    fn acquire_connection(&self) -> DbResult<Connection> {
        (**self).acquire_connection()
    }
}

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    /// Database file on disk.
    File(PathBuf),
    /// Named in-memory database shared by every connection of one provider.
    SharedMemory(String),
}

impl StoreTarget {
    fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::SharedMemory(_) => "memory",
        }
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        match self {
            Self::File(path) => Connection::open(path),
            // memdb databases named with a leading `/` are shared process-wide
            // and, unlike shared-cache mode, honour the busy timeout.
            // Default open flags include SQLITE_OPEN_URI.
            Self::SharedMemory(name) => Connection::open(format!("file:/{name}?vfs=memdb")),
        }
    }
}

/// Provider settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub target: StoreTarget,
    pub busy_timeout: Duration,
}

impl ProviderConfig {
    /// File-backed store with the default busy timeout.
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            target: StoreTarget::File(path.as_ref().to_path_buf()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    /// Named shared in-memory store with the default busy timeout.
    pub fn shared_memory(name: impl Into<String>) -> Self {
        Self {
            target: StoreTarget::SharedMemory(name.into()),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    fn validate(&self) -> DbResult<()> {
        match &self.target {
            StoreTarget::File(path) if path.as_os_str().is_empty() => Err(
                DbError::InvalidConfig("database path cannot be empty".to_string()),
            ),
            StoreTarget::SharedMemory(name) if name.trim().is_empty() => Err(
                DbError::InvalidConfig("in-memory database name cannot be empty".to_string()),
            ),
            StoreTarget::SharedMemory(name)
                if name.contains(|c: char| matches!(c, '?' | '&' | '#' | '/')) =>
            {
                Err(DbError::InvalidConfig(format!(
                    "in-memory database name `{name}` contains reserved URI characters"
                )))
            }
            _ => Ok(()),
        }
    }
}

/// Opens a new SQLite connection for every acquisition.
pub struct SqliteConnectionProvider {
    config: ProviderConfig,
    // memdb databases vanish with their last connection.
    _anchor: Option<Mutex<Connection>>,
}

impl SqliteConnectionProvider {
    /// Validates `config`, bootstraps the schema and returns a ready provider.
    ///
    /// # Side effects
    /// - Creates the `users` table when missing.
    /// - Emits `db_provider_init` logging events with duration and status.
    pub fn new(config: ProviderConfig) -> DbResult<Self> {
        let started_at = Instant::now();
        let mode = config.target.mode();
        info!("event=db_provider_init module=db status=start mode={mode}");

        let result = config.validate().and_then(|()| {
            let conn = open_configured(&config)?;
            ensure_schema(&conn)?;
            Ok(conn)
        });

        let bootstrap_conn = match result {
            Ok(conn) => conn,
            Err(err) => {
                error!(
                    "event=db_provider_init module=db status=error mode={} duration_ms={} error={}",
                    mode,
                    started_at.elapsed().as_millis(),
                    err
                );
                return Err(err);
            }
        };

        let anchor = match config.target {
            StoreTarget::SharedMemory(_) => Some(Mutex::new(bootstrap_conn)),
            StoreTarget::File(_) => {
                release_connection(bootstrap_conn);
                None
            }
        };

        info!(
            "event=db_provider_init module=db status=ok mode={} duration_ms={}",
            mode,
            started_at.elapsed().as_millis()
        );

        Ok(Self {
            config,
            _anchor: anchor,
        })
    }
}

impl ConnectionProvider for SqliteConnectionProvider {
    fn acquire_connection(&self) -> DbResult<Connection> {
        let started_at = Instant::now();
        match open_configured(&self.config) {
            Ok(conn) => {
                debug!(
                    "event=db_acquire module=db status=ok mode={} duration_ms={}",
                    self.config.target.mode(),
                    started_at.elapsed().as_millis()
                );
                Ok(conn)
            }
            Err(err) => {
                error!(
                    "event=db_acquire module=db status=error mode={} duration_ms={} error={}",
                    self.config.target.mode(),
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn open_configured(config: &ProviderConfig) -> DbResult<Connection> {
    let conn = config.target.open()?;
    conn.busy_timeout(config.busy_timeout)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::{ConnectionProvider, ProviderConfig, SqliteConnectionProvider, StoreTarget};
    use crate::db::{DbError, DbResult};
    use rusqlite::Connection;
    use std::time::Duration;

    fn users_table_exists(conn: &Connection) -> DbResult<bool> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = 'users'
            );",
            [],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    #[test]
    fn shared_memory_provider_keeps_schema_across_acquisitions() {
        let provider =
            SqliteConnectionProvider::new(ProviderConfig::shared_memory("provider-keeps-schema"))
                .unwrap();

        let first = provider.acquire_connection().unwrap();
        assert!(users_table_exists(&first).unwrap());
        drop(first);

        let second = provider.acquire_connection().unwrap();
        assert!(users_table_exists(&second).unwrap());
    }

    #[test]
    fn acquired_connections_enable_foreign_keys() {
        let provider =
            SqliteConnectionProvider::new(ProviderConfig::shared_memory("provider-pragmas"))
                .unwrap();
        let conn = provider.acquire_connection().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let empty_path = SqliteConnectionProvider::new(ProviderConfig::file(""));
        assert!(matches!(empty_path, Err(DbError::InvalidConfig(_))));

        let bad_name = SqliteConnectionProvider::new(ProviderConfig::shared_memory("a?b"));
        assert!(matches!(bad_name, Err(DbError::InvalidConfig(_))));
    }

    #[test]
    fn config_builders_set_target_and_timeout() {
        let config = ProviderConfig::file("/tmp/users.db").with_busy_timeout(Duration::from_millis(250));
        assert_eq!(config.target, StoreTarget::File("/tmp/users.db".into()));
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
    }
}
