//! Caller-facing error channel for data-access operations.
//!
//! # Responsibility
//! - Collapse every store-level fault into one `StoreOperationFailure` kind.
//! - Keep caller misuse (`PreconditionViolation`) distinguishable from store
//!   faults.
//!
//! # Invariants
//! - The original store fault is kept as `cause` and exposed via `source()`.
//! - "Not found" is never an error; lookups return `Ok(None)`.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type DaoResult<T> = Result<T, DaoError>;

#[derive(Debug)]
pub enum DaoError {
    /// Store fault, zero affected rows, or missing generated key.
    StoreOperationFailure {
        message: String,
        cause: Option<DbError>,
    },
    /// Caller passed a value in the wrong lifecycle state.
    PreconditionViolation(String),
}

impl DaoError {
    pub(crate) fn store(message: impl Into<String>, cause: impl Into<DbError>) -> Self {
        Self::StoreOperationFailure {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    pub(crate) fn store_contract(message: impl Into<String>) -> Self {
        Self::StoreOperationFailure {
            message: message.into(),
            cause: None,
        }
    }

    /// Returns whether this error reports a store-side failure.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::StoreOperationFailure { .. })
    }

    /// Returns whether this error reports caller misuse.
    pub fn is_precondition_violation(&self) -> bool {
        matches!(self, Self::PreconditionViolation(_))
    }
}

impl Display for DaoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StoreOperationFailure {
                message,
                cause: Some(cause),
            } => write!(f, "{message}: {cause}"),
            Self::StoreOperationFailure {
                message,
                cause: None,
            } => write!(f, "{message}"),
            Self::PreconditionViolation(message) => write!(f, "precondition violated: {message}"),
        }
    }
}

impl Error for DaoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::StoreOperationFailure {
                cause: Some(cause), ..
            } => Some(cause),
            Self::StoreOperationFailure { cause: None, .. } => None,
            Self::PreconditionViolation(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DaoError;
    use crate::db::DbError;
    use std::error::Error;

    #[test]
    fn store_failure_keeps_cause_as_source() {
        let err = DaoError::store(
            "listing users failed",
            DbError::InvalidConfig("empty path".to_string()),
        );
        assert!(err.is_store_failure());
        assert!(err.to_string().starts_with("listing users failed: "));
        assert!(err.source().is_some());
    }

    #[test]
    fn contract_failure_and_precondition_have_no_source() {
        let contract = DaoError::store_contract("deleting user failed, no rows affected");
        assert!(contract.is_store_failure());
        assert!(contract.source().is_none());

        let misuse = DaoError::PreconditionViolation("user id is null".to_string());
        assert!(misuse.is_precondition_violation());
        assert!(!misuse.is_store_failure());
        assert!(misuse.source().is_none());
    }
}
