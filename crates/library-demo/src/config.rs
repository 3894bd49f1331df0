//! Demo configuration loading from file and environment variables.

use library_db::StoreConfig;
use serde::Deserialize;
use thiserror::Error;

/// Top-level demo configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Which book store to open and how to reach it.
    #[serde(default)]
    pub database: StoreConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "library_db=debug,info").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Whether to output logs in JSON format.
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse the configuration file.
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Loads configuration from a TOML file, falling back to defaults.
///
/// Environment variable overrides (the `LIBRARY_DB_*` ones only apply to a
/// MySQL store):
/// - `LIBRARY_DB_HOST` overrides `database.host`
/// - `LIBRARY_DB_PORT` overrides `database.port`
/// - `LIBRARY_DB_USER` overrides `database.username`
/// - `LIBRARY_DB_PASSWORD` overrides `database.password`
/// - `LIBRARY_DB_SOCKET` overrides `database.unix_socket`
/// - `LIBRARY_DB_NAME` overrides `database.schema`
/// - `LIBRARY_LOG_LEVEL` overrides `logging.level`
/// - `LIBRARY_LOG_JSON` overrides `logging.json` (set to "true" to enable)
///
/// # Errors
///
/// Returns `ConfigError` if the file exists but cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let config = match path {
        Some(p) => match std::fs::read_to_string(p) {
            Ok(contents) => toml::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = p, "config file not found, using defaults");
                Config::default()
            }
            Err(e) => return Err(ConfigError::FileRead(e)),
        },
        None => Config::default(),
    };

    Ok(apply_env_overrides(config, |key| std::env::var(key).ok()))
}

fn apply_env_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    if let StoreConfig::Mysql(mysql) = &mut config.database {
        if let Some(host) = var("LIBRARY_DB_HOST") {
            mysql.host = host;
        }
        if let Some(port) = var("LIBRARY_DB_PORT") {
            if let Ok(parsed) = port.parse() {
                mysql.port = parsed;
            }
        }
        if let Some(user) = var("LIBRARY_DB_USER") {
            mysql.username = user;
        }
        if let Some(password) = var("LIBRARY_DB_PASSWORD") {
            mysql.password = Some(password);
        }
        if let Some(socket) = var("LIBRARY_DB_SOCKET") {
            mysql.unix_socket = Some(socket);
        }
        if let Some(schema) = var("LIBRARY_DB_NAME") {
            mysql.schema = schema;
        }
    }

    if let Some(level) = var("LIBRARY_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(json) = var("LIBRARY_LOG_JSON") {
        config.logging.json = json == "true" || json == "1";
    }

    config
}
