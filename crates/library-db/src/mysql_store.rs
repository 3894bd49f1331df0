//! Book store backed by a MySQL server.
//!
//! Construction walks Bootstrapping -> Ready: a connection without a
//! default schema creates the schema and table when they are missing, then
//! a second connection bound to the schema is checked for liveness and the
//! six store statements are prepared on it. A store value only exists once
//! all of that has succeeded.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use library_types::Book;
use mysql::consts::CapabilityFlags;
use mysql::prelude::Queryable;
use mysql::{Conn, Opts, OptsBuilder, Params, Row, Statement};

use crate::bootstrap::{ensure_schema, SchemaProbe, SchemaStatement, BOOKS_TABLE};
use crate::config::{Endpoint, MysqlConfig};
use crate::error::{expect_one_row, require_assigned, DriverError, StoreError};
use crate::queries::{self, book_from_columns, BookColumns};
use crate::store::BookDatabase;

/// Bootstrap statements for `schema`, in execution order.
pub(crate) fn schema_statements(schema: &str) -> Vec<SchemaStatement> {
    let schema = quote_identifier(schema);
    vec![
        SchemaStatement::new(
            "create_schema",
            format!(
                "CREATE DATABASE IF NOT EXISTS {schema} \
                 DEFAULT CHARACTER SET = 'utf8' DEFAULT COLLATE 'utf8_general_ci'"
            ),
        ),
        SchemaStatement::new("use_schema", format!("USE {schema}")),
        SchemaStatement::new(
            "create_books",
            "CREATE TABLE IF NOT EXISTS books (
                id INT UNSIGNED NOT NULL AUTO_INCREMENT,
                title VARCHAR(255) NULL,
                author VARCHAR(255) NULL,
                publishedDate VARCHAR(255) NULL,
                imageUrl VARCHAR(255) NULL,
                description TEXT NULL,
                createdBy VARCHAR(255) NULL,
                createdById VARCHAR(255) NULL,
                PRIMARY KEY (id)
            )",
        ),
    ]
}

fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Connection options for `config`, optionally bound to `schema`.
///
/// `CLIENT_FOUND_ROWS` makes an UPDATE report matched rather than changed
/// rows, so rewriting a book with identical values still counts as one row.
pub(crate) fn connection_opts(config: &MysqlConfig, schema: Option<&str>) -> Opts {
    let builder = OptsBuilder::new()
        .user(Some(config.username.as_str()).filter(|user| !user.is_empty()))
        .pass(config.password.as_deref())
        .db_name(schema)
        .additional_capabilities(CapabilityFlags::CLIENT_FOUND_ROWS);

    let builder = match config.endpoint() {
        Endpoint::Unix { path } => builder.socket(Some(path)),
        Endpoint::Tcp { host, port } => builder.ip_or_hostname(Some(host)).tcp_port(port),
    };

    Opts::from(builder)
}

struct MysqlProbe<'a> {
    conn: &'a mut Conn,
    schema: &'a str,
}

impl SchemaProbe for MysqlProbe<'_> {
    fn namespace_exists(&mut self) -> Result<bool, DriverError> {
        let found: Option<String> = self.conn.exec_first(
            "SELECT SCHEMA_NAME FROM INFORMATION_SCHEMA.SCHEMATA WHERE SCHEMA_NAME = ?",
            (self.schema.to_string(),),
        )?;
        Ok(found.is_some())
    }

    fn table_exists(&mut self) -> Result<bool, DriverError> {
        let found: Option<String> = self.conn.exec_first(
            "SELECT TABLE_NAME FROM INFORMATION_SCHEMA.TABLES \
             WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?",
            (self.schema.to_string(), BOOKS_TABLE.to_string()),
        )?;
        Ok(found.is_some())
    }

    fn execute(&mut self, sql: &str) -> Result<(), DriverError> {
        self.conn.query_drop(sql)?;
        Ok(())
    }
}

struct Statements {
    list: Statement,
    list_by: Statement,
    get: Statement,
    insert: Statement,
    update: Statement,
    delete: Statement,
}

impl Statements {
    fn prepare(conn: &mut Conn) -> Result<Self, StoreError> {
        let mut prep = |name: &'static str, sql: &str| {
            conn.prep(sql).map_err(|e| StoreError::prepare(name, e))
        };

        Ok(Self {
            list: prep("list", queries::LIST)?,
            list_by: prep("list_by", queries::LIST_BY)?,
            get: prep("get", queries::GET)?,
            insert: prep("insert", queries::INSERT)?,
            update: prep("update", queries::UPDATE)?,
            delete: prep("delete", queries::DELETE)?,
        })
    }
}

/// A [`BookDatabase`] over one MySQL connection and its prepared statements.
pub struct MysqlBookDatabase {
    conn: Mutex<Conn>,
    statements: Statements,
    address: String,
}

impl fmt::Debug for MysqlBookDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlBookDatabase")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}

impl MysqlBookDatabase {
    /// Connects to the server, bootstraps the schema, and prepares every
    /// store statement.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the server cannot be reached or
    /// fails the liveness check, `StoreError::Schema` if schema creation
    /// fails, and `StoreError::Prepare` for the first statement that does
    /// not compile.
    pub fn connect(config: &MysqlConfig) -> Result<Self, StoreError> {
        let address = config.redacted_data_source_name(&config.schema);
        tracing::debug!(%address, "connecting to mysql book store");

        {
            let mut conn =
                Conn::new(connection_opts(config, None)).map_err(StoreError::connection)?;
            let created = ensure_schema(
                &mut MysqlProbe {
                    conn: &mut conn,
                    schema: &config.schema,
                },
                &schema_statements(&config.schema),
            )?;
            if created {
                tracing::info!(schema = %config.schema, "created mysql schema");
            }
        }

        let mut conn = Conn::new(connection_opts(config, Some(&config.schema)))
            .map_err(StoreError::connection)?;
        conn.query_drop("SELECT 1")
            .map_err(StoreError::connection)?;

        let statements = Statements::prepare(&mut conn)?;

        tracing::info!(%address, "connected to mysql book store");

        Ok(Self {
            conn: Mutex::new(conn),
            statements,
            address,
        })
    }

    fn conn(&self) -> MutexGuard<'_, Conn> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn query_books(
        &self,
        operation: &'static str,
        stmt: &Statement,
        params: impl Into<Params>,
    ) -> Result<Vec<Book>, StoreError> {
        let rows: Vec<Row> = self
            .conn()
            .exec(stmt, params)
            .map_err(|e| StoreError::query(operation, e))?;
        rows.into_iter().map(scan_book).collect()
    }

    /// Runs a statement that must touch exactly one row, returning the
    /// last insert id reported for it.
    fn execute_one(
        &self,
        operation: &'static str,
        stmt: &Statement,
        params: impl Into<Params>,
    ) -> Result<u64, StoreError> {
        let mut conn = self.conn();
        conn.exec_drop(stmt, params)
            .map_err(|e| StoreError::query(operation, e))?;
        expect_one_row(operation, conn.affected_rows())?;
        Ok(conn.last_insert_id())
    }
}

fn scan_book(row: Row) -> Result<Book, StoreError> {
    let columns: BookColumns =
        mysql::from_row_opt(row).map_err(|e| StoreError::scan(e.to_string()))?;
    Ok(book_from_columns(columns))
}

impl BookDatabase for MysqlBookDatabase {
    fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        self.query_books("list_books", &self.statements.list, ())
    }

    fn list_books_created_by(&self, owner_id: &str) -> Result<Vec<Book>, StoreError> {
        if owner_id.is_empty() {
            return self.list_books();
        }
        self.query_books(
            "list_books_created_by",
            &self.statements.list_by,
            (owner_id.to_string(),),
        )
    }

    fn get_book(&self, id: u64) -> Result<Book, StoreError> {
        let row: Option<Row> = self
            .conn()
            .exec_first(&self.statements.get, (id,))
            .map_err(|e| StoreError::query("get_book", e))?;
        match row {
            Some(row) => scan_book(row),
            None => Err(StoreError::NotFound(id)),
        }
    }

    fn add_book(&self, book: &Book) -> Result<u64, StoreError> {
        let id = self.execute_one(
            "add_book",
            &self.statements.insert,
            (
                book.title.clone(),
                book.author.clone(),
                book.published_date.clone(),
                book.image_url.clone(),
                book.description.clone(),
                book.created_by.clone(),
                book.created_by_id.clone(),
            ),
        )?;
        tracing::debug!(id, "book added");
        Ok(id)
    }

    fn update_book(&self, book: &Book) -> Result<(), StoreError> {
        require_assigned(book.id, "update_book")?;
        self.execute_one(
            "update_book",
            &self.statements.update,
            (
                book.title.clone(),
                book.author.clone(),
                book.published_date.clone(),
                book.image_url.clone(),
                book.description.clone(),
                book.created_by.clone(),
                book.created_by_id.clone(),
                book.id,
            ),
        )?;
        tracing::debug!(id = book.id, "book updated");
        Ok(())
    }

    fn delete_book(&self, id: u64) -> Result<(), StoreError> {
        require_assigned(id, "delete_book")?;
        self.execute_one("delete_book", &self.statements.delete, (id,))?;
        tracing::debug!(id, "book deleted");
        Ok(())
    }

    fn close(self: Box<Self>) -> Result<(), StoreError> {
        let Self {
            conn,
            statements,
            address,
        } = *self;
        drop(statements);
        drop(conn.into_inner().unwrap_or_else(PoisonError::into_inner));
        tracing::info!(%address, "closed mysql book store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_statements_create_then_select_then_table() {
        let statements = schema_statements("library");
        let names: Vec<&str> = statements.iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["create_schema", "use_schema", "create_books"]);

        assert!(statements[0]
            .sql
            .starts_with("CREATE DATABASE IF NOT EXISTS `library`"));
        assert!(statements[0].sql.contains("'utf8_general_ci'"));
        assert_eq!(statements[1].sql, "USE `library`");
        assert!(statements[2].sql.contains("id INT UNSIGNED NOT NULL AUTO_INCREMENT"));
        assert!(statements[2].sql.contains("description TEXT NULL"));
    }

    #[test]
    fn schema_names_are_quoted() {
        let statements = schema_statements("odd`name");
        assert_eq!(statements[1].sql, "USE `odd``name`");
    }

    #[test]
    fn tcp_opts_carry_credentials_and_schema() {
        let config = MysqlConfig {
            username: "reader".to_string(),
            password: Some("s3cret".to_string()),
            port: 3307,
            ..MysqlConfig::default()
        };

        let opts = connection_opts(&config, Some("library"));
        assert_eq!(opts.get_user(), Some("reader"));
        assert_eq!(opts.get_pass(), Some("s3cret"));
        assert_eq!(opts.get_db_name(), Some("library"));
        assert_eq!(opts.get_tcp_port(), 3307);
        assert_eq!(opts.get_socket(), None);

        let bootstrap = connection_opts(&config, None);
        assert_eq!(bootstrap.get_db_name(), None);
    }

    #[test]
    fn socket_opts_skip_tcp() {
        let config = MysqlConfig {
            username: String::new(),
            unix_socket: Some("/tmp/mysql.sock".to_string()),
            ..MysqlConfig::default()
        };

        let opts = connection_opts(&config, Some("library"));
        assert_eq!(opts.get_socket(), Some("/tmp/mysql.sock"));
        assert_eq!(opts.get_user(), None);
    }
}
