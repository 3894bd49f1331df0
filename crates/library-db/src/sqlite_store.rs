//! Book store backed by an SQLite database file.
//!
//! The whole file is the namespace, so bootstrap only ever has to create
//! the `books` table. Statements are compiled once into the connection's
//! statement cache at construction and fetched from it on every call.

use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use library_types::Book;
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::bootstrap::{ensure_schema, SchemaProbe, SchemaStatement, BOOKS_TABLE};
use crate::config::SqliteConfig;
use crate::error::{expect_one_row, require_assigned, DriverError, StoreError};
use crate::queries::{self, book_from_columns};
use crate::store::BookDatabase;

const CREATE_BOOKS: &str = "CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title VARCHAR(255) NULL,
    author VARCHAR(255) NULL,
    publishedDate VARCHAR(255) NULL,
    imageUrl VARCHAR(255) NULL,
    description TEXT NULL,
    createdBy VARCHAR(255) NULL,
    createdById VARCHAR(255) NULL
)";

/// Bootstrap statements for an SQLite database.
pub(crate) fn schema_statements() -> Vec<SchemaStatement> {
    vec![SchemaStatement::new("create_books", CREATE_BOOKS)]
}

struct SqliteProbe<'a> {
    conn: &'a Connection,
}

impl SchemaProbe for SqliteProbe<'_> {
    fn namespace_exists(&mut self) -> Result<bool, DriverError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pragma_database_list WHERE name = 'main'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn table_exists(&mut self) -> Result<bool, DriverError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [BOOKS_TABLE],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn execute(&mut self, sql: &str) -> Result<(), DriverError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }
}

/// A [`BookDatabase`] over a single SQLite connection.
#[derive(Debug)]
pub struct SqliteBookDatabase {
    conn: Mutex<Connection>,
}

impl SqliteBookDatabase {
    /// Opens the database at `config.path`, creating the table if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the file cannot be opened,
    /// `StoreError::Schema` if the table cannot be created, and
    /// `StoreError::Prepare` if any store statement fails to compile.
    pub fn open(config: &SqliteConfig) -> Result<Self, StoreError> {
        let conn = Connection::open(&config.path).map_err(StoreError::connection)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))
            .map_err(StoreError::connection)?;
        tracing::info!(path = %config.path, "opened sqlite book store");
        Self::from_connection(conn)
    }

    /// Wraps an already open connection, bootstrapping the schema and
    /// compiling every store statement.
    ///
    /// # Errors
    ///
    /// See [`open`](Self::open).
    pub fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        ensure_schema(&mut SqliteProbe { conn: &conn }, &schema_statements())?;

        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(StoreError::connection)?;

        for (name, sql) in queries::ALL {
            conn.prepare_cached(sql)
                .map_err(|e| StoreError::prepare(name, e))?;
        }

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn query_books(
        &self,
        operation: &'static str,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<Book>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare_cached(sql)
            .map_err(|e| StoreError::query(operation, e))?;
        let rows = stmt
            .query_map(params, scan_book)
            .map_err(|e| StoreError::query(operation, e))?;

        let mut books = Vec::new();
        for row in rows {
            books.push(row.map_err(|e| row_error(operation, e))?);
        }
        Ok(books)
    }

    fn execute(
        &self,
        operation: &'static str,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<u64, StoreError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare_cached(sql)
            .map_err(|e| StoreError::query(operation, e))?;
        let affected = stmt
            .execute(params)
            .map_err(|e| StoreError::query(operation, e))?;
        Ok(affected as u64)
    }
}

fn scan_book(row: &Row<'_>) -> rusqlite::Result<Book> {
    let id: i64 = row.get(0)?;
    let id = u64::try_from(id).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, id))?;
    Ok(book_from_columns((
        id,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    )))
}

/// Splits failures raised while stepping through rows: values that do not
/// decode into a book are `Scan` errors, everything else is the statement
/// failing to run.
fn row_error(operation: &'static str, err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::FromSqlConversionFailure(..)
        | rusqlite::Error::InvalidColumnType(..)
        | rusqlite::Error::IntegralValueOutOfRange(..)
        | rusqlite::Error::InvalidColumnIndex(_)
        | rusqlite::Error::InvalidColumnName(_) => StoreError::scan(err),
        other => StoreError::query(operation, other),
    }
}

/// SQLite rowids are signed; an id outside that range cannot exist.
fn rowid(id: u64) -> Option<i64> {
    i64::try_from(id).ok()
}

impl BookDatabase for SqliteBookDatabase {
    fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        self.query_books("list_books", queries::LIST, [])
    }

    fn list_books_created_by(&self, owner_id: &str) -> Result<Vec<Book>, StoreError> {
        if owner_id.is_empty() {
            return self.list_books();
        }
        self.query_books("list_books_created_by", queries::LIST_BY, [owner_id])
    }

    fn get_book(&self, id: u64) -> Result<Book, StoreError> {
        let rowid = rowid(id).ok_or(StoreError::NotFound(id))?;
        let conn = self.conn();
        let mut stmt = conn
            .prepare_cached(queries::GET)
            .map_err(|e| StoreError::query("get_book", e))?;
        stmt.query_row([rowid], scan_book)
            .optional()
            .map_err(|e| row_error("get_book", e))?
            .ok_or(StoreError::NotFound(id))
    }

    fn add_book(&self, book: &Book) -> Result<u64, StoreError> {
        let conn = self.conn();
        let mut stmt = conn
            .prepare_cached(queries::INSERT)
            .map_err(|e| StoreError::query("add_book", e))?;
        let affected = stmt
            .execute(params![
                book.title,
                book.author,
                book.published_date,
                book.image_url,
                book.description,
                book.created_by,
                book.created_by_id,
            ])
            .map_err(|e| StoreError::query("add_book", e))?;
        expect_one_row("add_book", affected as u64)?;

        let id = conn.last_insert_rowid();
        let id = u64::try_from(id)
            .map_err(|e| StoreError::query("add_book", format!("invalid rowid {id}: {e}")))?;
        tracing::debug!(id, "book added");
        Ok(id)
    }

    fn update_book(&self, book: &Book) -> Result<(), StoreError> {
        require_assigned(book.id, "update_book")?;
        let Some(rowid) = rowid(book.id) else {
            return expect_one_row("update_book", 0);
        };
        let affected = self.execute(
            "update_book",
            queries::UPDATE,
            params![
                book.title,
                book.author,
                book.published_date,
                book.image_url,
                book.description,
                book.created_by,
                book.created_by_id,
                rowid,
            ],
        )?;
        expect_one_row("update_book", affected)?;
        tracing::debug!(id = book.id, "book updated");
        Ok(())
    }

    fn delete_book(&self, id: u64) -> Result<(), StoreError> {
        require_assigned(id, "delete_book")?;
        let Some(rowid) = rowid(id) else {
            return expect_one_row("delete_book", 0);
        };
        let affected = self.execute("delete_book", queries::DELETE, [rowid])?;
        expect_one_row("delete_book", affected)?;
        tracing::debug!(id, "book deleted");
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), StoreError> {
        let Self { conn } = *self;
        let conn = conn.into_inner().unwrap_or_else(PoisonError::into_inner);
        conn.close().map_err(|(_, e)| StoreError::connection(e))?;
        tracing::info!("closed sqlite book store");
        Ok(())
    }
}
