//! Data-access layer for the library book store.
//!
//! Every store implements [`BookDatabase`]: list (all or by creator), get,
//! add, update, delete and close over a single `books` table. Three
//! implementations ship with the crate:
//!
//! - [`MysqlBookDatabase`]: the production store, one MySQL connection with
//!   six prepared statements.
//! - [`SqliteBookDatabase`]: the same statements over an SQLite file, for
//!   running without a server.
//! - [`MemoryBookDatabase`]: a map-backed double for tests.
//!
//! # Design decisions
//!
//! - **Bootstrap by asking, not by failing**: stores check whether their
//!   namespace and table exist through catalog queries and only then run the
//!   creation statements (see [`ensure_schema`]).
//! - **All-or-nothing construction**: a store value exists only after the
//!   schema is in place, the connection answered a liveness check, and every
//!   statement compiled.
//! - **Exactly one row**: insert, update and delete report
//!   [`StoreError::RowCountMismatch`] unless the engine says one row was
//!   touched.
//! - **No NULLs in books**: nullable text columns read back as `""`.

mod bootstrap;
mod config;
mod error;
mod memory;
mod mysql_store;
mod queries;
mod sqlite_store;
mod store;

pub use bootstrap::{ensure_schema, SchemaProbe, SchemaStatement, BOOKS_TABLE};
pub use config::{open_store, Endpoint, MysqlConfig, SqliteConfig, StoreConfig};
pub use error::{DriverError, StoreError};
pub use library_types::Book;
pub use memory::MemoryBookDatabase;
pub use mysql_store::MysqlBookDatabase;
pub use sqlite_store::SqliteBookDatabase;
pub use store::BookDatabase;
