//! Library demo binary.
//!
//! Opens the configured book store, adds a sample book, reads it back,
//! lists the shelf and closes the store.

mod config;

use std::process::ExitCode;

use library_db::{open_store, BookDatabase, StoreError};
use library_types::Book;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Owner id attached to the sample book.
const DEMO_OWNER: &str = "demo-user";

#[derive(Debug, Error)]
enum DemoError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to render books: {0}")]
    Render(#[from] serde_json::Error),
}

fn resolve_config_path() -> (Option<String>, &'static str) {
    if let Some(path) = std::env::args()
        .nth(1)
        .filter(|value| !value.trim().is_empty())
    {
        return (Some(path), "cli-arg");
    }

    if let Ok(path) = std::env::var("LIBRARY_CONFIG_PATH") {
        if !path.trim().is_empty() {
            return (Some(path), "env-var");
        }
    }

    (None, "default")
}

fn init_tracing(logging: &config::LoggingConfig) {
    let filter = EnvFilter::try_new(&logging.level).unwrap_or_else(|_| EnvFilter::new("info"));

    if logging.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

fn sample_book() -> Book {
    Book {
        title: "The Rust Programming Language".to_string(),
        author: "Steve Klabnik and Carol Nichols".to_string(),
        published_date: "2018-06-28".to_string(),
        image_url: String::new(),
        description: "An introduction to Rust.".to_string(),
        created_by: "Demo User".to_string(),
        created_by_id: DEMO_OWNER.to_string(),
        ..Book::default()
    }
}

/// Exercises every read and write path once and returns what was printed.
fn run(store: &dyn BookDatabase) -> Result<String, DemoError> {
    let id = store.add_book(&sample_book())?;
    tracing::info!(id, "added sample book");

    let book = store.get_book(id).inspect_err(|e| {
        if let StoreError::NotFound(missing) = e {
            tracing::error!(id = missing, "sample book vanished after insert");
        }
    })?;

    let shelf = store.list_books()?;
    let mine = store.list_books_created_by(DEMO_OWNER)?;
    tracing::info!(
        total = shelf.len(),
        owned = mine.len(),
        "listed books"
    );

    let mut out = serde_json::to_string_pretty(&book)?;
    out.push('\n');
    out.push_str(&serde_json::to_string_pretty(&shelf)?);
    Ok(out)
}

fn main() -> ExitCode {
    let (resolved_config_path, config_source) = resolve_config_path();
    let selected_config_path = resolved_config_path.as_deref().or(Some("config.toml"));

    let config = match config::load_config(selected_config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(&config.logging);

    tracing::info!(
        source = config_source,
        path = selected_config_path.unwrap_or("<none>"),
        "resolved startup configuration path"
    );

    let store = match open_store(&config.database) {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "failed to open book store");
            return ExitCode::FAILURE;
        }
    };

    let outcome = run(store.as_ref());
    let closed = store.close();

    match (outcome, closed) {
        (Ok(output), Ok(())) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        (Err(e), _) => {
            tracing::error!(error = %e, "demo failed");
            ExitCode::FAILURE
        }
        (Ok(_), Err(e)) => {
            tracing::error!(error = %DemoError::from(e), "failed to close book store");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use library_db::{MemoryBookDatabase, SqliteBookDatabase, SqliteConfig};

    #[test]
    fn run_against_memory_store() {
        let store = MemoryBookDatabase::new();
        let output = run(&store).expect("demo should succeed");

        assert!(output.contains("\"title\": \"The Rust Programming Language\""));
        assert!(output.contains("\"createdById\": \"demo-user\""));

        let books = store.list_books_created_by(DEMO_OWNER).expect("list should succeed");
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, 1);
    }

    #[test]
    fn run_twice_against_sqlite_file() {
        let dir = tempfile::TempDir::new().expect("should create temp dir");
        let config = SqliteConfig {
            path: dir.path().join("demo.db").to_string_lossy().into_owned(),
            ..SqliteConfig::default()
        };

        for expected in 1..=2 {
            let store = SqliteBookDatabase::open(&config).expect("sqlite store should open");
            run(&store).expect("demo should succeed");
            assert_eq!(store.list_books().expect("list should succeed").len(), expected);
            Box::new(store).close().expect("close should succeed");
        }
    }
}
