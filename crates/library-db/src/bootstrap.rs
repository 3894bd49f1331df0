//! One-time schema bootstrap.
//!
//! Before a store becomes usable it checks, through two catalog queries,
//! whether its namespace and the `books` table exist. Only when one of them
//! is missing are the creation statements run, in order. No engine error
//! codes are inspected: existence is always asked for explicitly.

use crate::error::{DriverError, StoreError};

/// Name of the table every store reads and writes.
pub const BOOKS_TABLE: &str = "books";

/// A single named statement run during bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaStatement {
    /// Short name used in logs and errors.
    pub name: &'static str,
    /// The SQL text.
    pub sql: String,
}

impl SchemaStatement {
    pub fn new(name: &'static str, sql: impl Into<String>) -> Self {
        Self {
            name,
            sql: sql.into(),
        }
    }
}

/// Catalog access needed by [`ensure_schema`].
///
/// Both checks must be idempotent reads; `execute` runs one creation
/// statement.
pub trait SchemaProbe {
    /// Whether the containing namespace (schema/database) exists.
    fn namespace_exists(&mut self) -> Result<bool, DriverError>;

    /// Whether the `books` table exists inside the namespace.
    fn table_exists(&mut self) -> Result<bool, DriverError>;

    /// Runs a single statement, discarding any result.
    fn execute(&mut self, sql: &str) -> Result<(), DriverError>;
}

/// Creates the namespace and table when either is missing.
///
/// Returns `true` if the creation statements ran and `false` if the schema
/// was already in place.
///
/// # Errors
///
/// Returns `StoreError::Connection` if a catalog check fails and
/// `StoreError::Schema` naming the statement if a creation statement fails.
pub fn ensure_schema<P>(probe: &mut P, statements: &[SchemaStatement]) -> Result<bool, StoreError>
where
    P: SchemaProbe + ?Sized,
{
    let namespace_exists = probe.namespace_exists().map_err(StoreError::Connection)?;
    let table_exists = namespace_exists && probe.table_exists().map_err(StoreError::Connection)?;

    if table_exists {
        tracing::debug!(table = BOOKS_TABLE, "schema already present, skipping bootstrap");
        return Ok(false);
    }

    tracing::info!(
        namespace_exists,
        table = BOOKS_TABLE,
        "creating book store schema"
    );

    for statement in statements {
        tracing::debug!(statement = statement.name, "running schema statement");
        probe
            .execute(&statement.sql)
            .map_err(|source| StoreError::Schema {
                statement: statement.name.to_string(),
                source,
            })?;
    }

    Ok(true)
}
