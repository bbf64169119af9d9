//! Parameterized statement execution with scoped resource release.
//!
//! # Responsibility
//! - Acquire a connection (or use a caller-owned one), prepare, bind
//!   positionally and execute one statement.
//! - Release cursor, statement and owned connection on every exit path.
//! - Translate store faults into `DaoError::StoreOperationFailure`.
//!
//! # Invariants
//! - Parameter `i` (0-based) binds to placeholder `?{i + 1}`.
//! - Release runs innermost-first: cursor, statement, connection.
//! - Release failures are logged and never replace the primary outcome.
//! - A `ConnectionSource::Borrowed` connection is never closed here.
//!
//! Every function is stateless; concurrent calls with provider sources share
//! nothing but the provider.

use super::provider::ConnectionProvider;
use crate::error::{DaoError, DaoResult};
use log::{error, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row, Statement};

/// Where a statement gets its connection from.
#[derive(Clone, Copy)]
pub enum ConnectionSource<'a> {
    /// Acquire a fresh connection and close it before returning.
    Provider(&'a dyn ConnectionProvider),
    /// Run on a caller-owned connection; the caller keeps ownership.
    Borrowed(&'a Connection),
}

/// Result of a mutating statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationOutcome {
    pub affected_rows: usize,
    /// Store-assigned key of the inserted row, when requested and reported.
    pub generated_key: Option<i64>,
}

/// Runs a query and maps every returned row.
pub fn query_rows<T, F>(
    source: ConnectionSource<'_>,
    sql: &str,
    params: &[Value],
    mut map_row: F,
) -> DaoResult<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    with_connection(source, |conn| {
        with_statement(conn, sql, |stmt| {
            let mut rows = stmt.query(params_from_iter(params.iter()))?;
            let mut mapped = Vec::new();
            while let Some(row) = rows.next()? {
                mapped.push(map_row(row)?);
            }
            Ok(mapped)
        })
    })
}

/// Runs a query and maps only the first returned row.
pub fn query_first<T, F>(
    source: ConnectionSource<'_>,
    sql: &str,
    params: &[Value],
    map_row: F,
) -> DaoResult<Option<T>>
where
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
    with_connection(source, |conn| {
        with_statement(conn, sql, |stmt| {
            let mut rows = stmt.query(params_from_iter(params.iter()))?;
            match rows.next()? {
                Some(row) => Ok(Some(map_row(row)?)),
                None => Ok(None),
            }
        })
    })
}

/// Returns whether the query yields at least one row.
pub fn query_exists(source: ConnectionSource<'_>, sql: &str, params: &[Value]) -> DaoResult<bool> {
    with_connection(source, |conn| {
        with_statement(conn, sql, |stmt| {
            let mut rows = stmt.query(params_from_iter(params.iter()))?;
            Ok(rows.next()?.is_some())
        })
    })
}

/// Runs an `INSERT`/`UPDATE`/`DELETE` and reports the affected row count.
///
/// With `return_generated_key`, the connection's last insert rowid is
/// reported for statements that affected at least one row. Only request it
/// for inserts; other statements leave the rowid of an earlier insert.
pub fn execute_mutation(
    source: ConnectionSource<'_>,
    sql: &str,
    return_generated_key: bool,
    params: &[Value],
) -> DaoResult<MutationOutcome> {
    with_connection(source, |conn| {
        with_statement(conn, sql, |stmt| {
            let affected_rows = stmt.execute(params_from_iter(params.iter()))?;
            let generated_key = if return_generated_key && affected_rows > 0 {
                Some(conn.last_insert_rowid()).filter(|key| *key != 0)
            } else {
                None
            };
            Ok(MutationOutcome {
                affected_rows,
                generated_key,
            })
        })
    })
}

fn with_connection<T>(
    source: ConnectionSource<'_>,
    work: impl FnOnce(&Connection) -> DaoResult<T>,
) -> DaoResult<T> {
    match source {
        ConnectionSource::Borrowed(conn) => work(conn),
        ConnectionSource::Provider(provider) => {
            let conn = provider.acquire_connection().map_err(|err| {
                error!("event=statement_execute module=db status=error stage=acquire error={err}");
                DaoError::store("acquiring connection failed", err)
            })?;
            // An unwinding panic drops `conn`, which closes it as well.
            let outcome = work(&conn);
            release_connection(conn);
            outcome
        }
    }
}

fn with_statement<T>(
    conn: &Connection,
    sql: &str,
    work: impl FnOnce(&mut Statement<'_>) -> rusqlite::Result<T>,
) -> DaoResult<T> {
    let mut stmt = conn.prepare(sql).map_err(|err| {
        error!("event=statement_execute module=db status=error stage=prepare error={err}");
        DaoError::store("preparing statement failed", err)
    })?;
    // The cursor lives inside `work` and is dropped before the statement.
    let outcome = work(&mut stmt);
    release_statement(stmt);
    outcome.map_err(|err| {
        error!("event=statement_execute module=db status=error stage=execute error={err}");
        DaoError::store("executing statement failed", err)
    })
}

fn release_statement(stmt: Statement<'_>) {
    if let Err(err) = stmt.finalize() {
        warn!("event=resource_release module=db status=error resource=statement error={err}");
    }
}

pub(crate) fn release_connection(conn: Connection) {
    if let Err((conn, err)) = conn.close() {
        warn!("event=resource_release module=db status=error resource=connection error={err}");
        // Dropping retries the close and panics when that fails too.
        std::mem::forget(conn);
    }
}
