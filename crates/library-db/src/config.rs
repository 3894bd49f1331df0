//! Store configuration and the factory that opens a configured store.

use serde::Deserialize;
use std::fmt;

use crate::error::StoreError;
use crate::memory::MemoryBookDatabase;
use crate::mysql_store::MysqlBookDatabase;
use crate::sqlite_store::SqliteBookDatabase;
use crate::store::BookDatabase;

/// Which store to open, tagged by `kind` in configuration files.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StoreConfig {
    /// A MySQL server.
    Mysql(MysqlConfig),
    /// An SQLite database file.
    Sqlite(SqliteConfig),
    /// A process-local store with no persistence.
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::Mysql(MysqlConfig::default())
    }
}

/// Opens the store described by `config`, bootstrapping its schema.
///
/// # Errors
///
/// Returns the construction error of the selected store. No store is
/// returned unless it is fully ready.
pub fn open_store(config: &StoreConfig) -> Result<Box<dyn BookDatabase>, StoreError> {
    let store: Box<dyn BookDatabase> = match config {
        StoreConfig::Mysql(mysql) => Box::new(MysqlBookDatabase::connect(mysql)?),
        StoreConfig::Sqlite(sqlite) => Box::new(SqliteBookDatabase::open(sqlite)?),
        StoreConfig::Memory => Box::new(MemoryBookDatabase::new()),
    };
    Ok(store)
}

/// Where a MySQL server is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint<'a> {
    /// TCP connection to `host:port`.
    Tcp { host: &'a str, port: u16 },
    /// Local unix socket.
    Unix { path: &'a str },
}

/// MySQL connection settings.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct MysqlConfig {
    /// User to authenticate as. Empty means no credentials.
    #[serde(default = "default_username")]
    pub username: String,

    /// Password for `username`, if any.
    #[serde(default)]
    pub password: Option<String>,

    /// Server host name or IP address.
    #[serde(default = "default_host")]
    pub host: String,

    /// Server TCP port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Unix socket path. Takes precedence over `host`/`port` when set.
    #[serde(default)]
    pub unix_socket: Option<String>,

    /// Schema holding the `books` table.
    #[serde(default = "default_schema")]
    pub schema: String,
}

fn default_username() -> String {
    "root".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3306
}

fn default_schema() -> String {
    "library".to_string()
}

impl Default for MysqlConfig {
    fn default() -> Self {
        Self {
            username: default_username(),
            password: None,
            host: default_host(),
            port: default_port(),
            unix_socket: None,
            schema: default_schema(),
        }
    }
}

impl fmt::Debug for MysqlConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MysqlConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("unix_socket", &self.unix_socket)
            .field("schema", &self.schema)
            .finish()
    }
}

impl MysqlConfig {
    /// Returns the endpoint to dial. A non-empty socket path wins.
    pub fn endpoint(&self) -> Endpoint<'_> {
        match self.unix_socket.as_deref() {
            Some(path) if !path.is_empty() => Endpoint::Unix { path },
            _ => Endpoint::Tcp {
                host: &self.host,
                port: self.port,
            },
        }
    }

    #[cfg(test)]
    fn data_source_name(&self, schema: &str) -> String {
        self.render_dsn(schema, self.password.as_deref())
    }

    /// Renders the connection address for `schema` with the password
    /// masked, for logs.
    ///
    /// The form is `user:****@tcp(host:port)/schema` or
    /// `user:****@unix(path)/schema`; the credential part shrinks to
    /// `user@` without a password and disappears without a user. Pass an
    /// empty `schema` for a connection with no default schema.
    pub fn redacted_data_source_name(&self, schema: &str) -> String {
        let masked = self
            .password
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|_| "****");
        self.render_dsn(schema, masked)
    }

    fn render_dsn(&self, schema: &str, password: Option<&str>) -> String {
        let mut credentials = String::new();
        if !self.username.is_empty() {
            credentials.push_str(&self.username);
            if let Some(password) = password.filter(|p| !p.is_empty()) {
                credentials.push(':');
                credentials.push_str(password);
            }
            credentials.push('@');
        }

        match self.endpoint() {
            Endpoint::Unix { path } => format!("{credentials}unix({path})/{schema}"),
            Endpoint::Tcp { host, port } if host.contains(':') => {
                format!("{credentials}tcp([{host}]:{port})/{schema}")
            }
            Endpoint::Tcp { host, port } => format!("{credentials}tcp({host}:{port})/{schema}"),
        }
    }
}

/// SQLite connection settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SqliteConfig {
    /// Path to the database file. `:memory:` opens a private in-memory
    /// database.
    #[serde(default = "default_sqlite_path")]
    pub path: String,

    /// Busy timeout for the connection, in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

fn default_sqlite_path() -> String {
    "library.db".to_string()
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

impl Default for SqliteConfig {
    fn default() -> Self {
        Self {
            path: default_sqlite_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

impl SqliteConfig {
    /// Settings for a private in-memory database.
    pub fn in_memory() -> Self {
        Self {
            path: ":memory:".to_string(),
            ..Self::default()
        }
    }
}
