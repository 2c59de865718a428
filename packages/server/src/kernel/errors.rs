//! Infrastructure error types shared by the storage and extraction adapters.

use thiserror::Error;

/// Result type for storage port operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Storage failures, classified so callers can tell retryable write conflicts
/// apart from everything else.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (usually a concurrent writer),
    /// or the database aborted the transaction to resolve a conflict.
    #[error("conflicting write rejected by constraint {constraint}")]
    Conflict { constraint: String },

    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),

    #[error("storage error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

// SQLSTATE codes that mean "another writer got there first".
const UNIQUE_VIOLATION: &str = "23505";
const SERIALIZATION_FAILURE: &str = "40001";
const DEADLOCK_DETECTED: &str = "40P01";

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return StoreError::Conflict {
                        constraint: db_err.constraint().unwrap_or("unique").to_string(),
                    }
                }
                Some(SERIALIZATION_FAILURE) | Some(DEADLOCK_DETECTED) => {
                    return StoreError::Conflict {
                        constraint: "serialization".to_string(),
                    }
                }
                _ => {}
            }
        }

        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other),
        }
    }
}

/// Extraction gateway failures.
#[derive(Debug, Clone, Error)]
pub enum ExtractionError {
    /// Upstream unreachable, timed out, or answered with an error status.
    #[error("extraction service unavailable: {0}")]
    Unavailable(String),

    /// Upstream answered, but the payload is not a candidate record.
    /// `raw` keeps whatever the model produced for operators.
    #[error("extraction service returned an invalid payload: {reason}")]
    InvalidOutput { reason: String, raw: Option<String> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::NotFound));
    }

    #[test]
    fn test_pool_errors_are_not_conflicts() {
        let err: StoreError = sqlx::Error::PoolTimedOut.into();
        assert!(!err.is_conflict());
        assert!(matches!(err, StoreError::Database(_)));
    }
}
