//! Error types for the book store.

use thiserror::Error;

/// A boxed error produced by an underlying database driver.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while opening or using a book store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached, authenticated against, or probed.
    #[error("could not connect to the database: {0}")]
    Connection(#[source] DriverError),

    /// A schema creation statement failed during bootstrap.
    #[error("schema statement '{statement}' failed: {source}")]
    Schema {
        /// Name of the statement that failed.
        statement: String,
        /// The underlying driver error.
        source: DriverError,
    },

    /// A required statement could not be prepared.
    #[error("could not prepare {statement} statement: {source}")]
    Prepare {
        /// Which of the store statements failed.
        statement: &'static str,
        /// The underlying driver error.
        source: DriverError,
    },

    /// No book has the requested identifier.
    #[error("could not find book with id {0}")]
    NotFound(u64),

    /// A mutating operation was called with an unassigned identifier.
    #[error("book with unassigned id passed into {0}")]
    InvalidArgument(&'static str),

    /// A statement that must touch exactly one row touched some other number.
    #[error("{operation}: expected 1 row affected, got {affected}")]
    RowCountMismatch {
        /// The store operation that ran the statement.
        operation: &'static str,
        /// Number of rows the engine reported.
        affected: u64,
    },

    /// A result row could not be decoded into a book.
    #[error("could not read row: {0}")]
    Scan(#[source] DriverError),

    /// A statement failed to execute.
    #[error("could not execute {operation}: {source}")]
    Query {
        /// The store operation that ran the statement.
        operation: &'static str,
        /// The underlying driver error.
        source: DriverError,
    },
}

impl StoreError {
    pub(crate) fn query(operation: &'static str, source: impl Into<DriverError>) -> Self {
        Self::Query {
            operation,
            source: source.into(),
        }
    }

    pub(crate) fn prepare(statement: &'static str, source: impl Into<DriverError>) -> Self {
        Self::Prepare {
            statement,
            source: source.into(),
        }
    }

    pub(crate) fn connection(source: impl Into<DriverError>) -> Self {
        Self::Connection(source.into())
    }

    pub(crate) fn scan(source: impl Into<DriverError>) -> Self {
        Self::Scan(source.into())
    }
}

/// Rejects identifiers that have not been assigned by the store.
pub(crate) fn require_assigned(id: u64, operation: &'static str) -> Result<(), StoreError> {
    if id == 0 {
        return Err(StoreError::InvalidArgument(operation));
    }
    Ok(())
}

/// Checks that a mutating statement affected exactly one row.
pub(crate) fn expect_one_row(operation: &'static str, affected: u64) -> Result<(), StoreError> {
    if affected != 1 {
        tracing::warn!(operation, affected, "unexpected affected row count");
        return Err(StoreError::RowCountMismatch {
            operation,
            affected,
        });
    }
    Ok(())
}
