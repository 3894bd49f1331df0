//! Shared types for the library book store.
//!
//! This crate holds the entity model that every store implementation reads
//! and writes. It has no database dependencies so callers can build and
//! render books without pulling in a driver.

use serde::{Deserialize, Serialize};

/// A single book record.
///
/// All text fields are plain strings. A column that is `NULL` in the
/// database is read back as an empty string, never as a missing value.
///
/// `id` is `0` until the book has been persisted; the store assigns it on
/// insert and it never changes afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Store-assigned identifier (`0` = not yet persisted).
    #[serde(default)]
    pub id: u64,
    /// Title of the book.
    #[serde(default)]
    pub title: String,
    /// Author of the book.
    #[serde(default)]
    pub author: String,
    /// Publication date as free-form text. Not validated.
    #[serde(default)]
    pub published_date: String,
    /// Cover image URL.
    #[serde(default)]
    pub image_url: String,
    /// Long-form description.
    #[serde(default)]
    pub description: String,
    /// Display name of the user who created the record.
    #[serde(default)]
    pub created_by: String,
    /// Identifier of the user who created the record.
    #[serde(default)]
    pub created_by_id: String,
}

impl Book {
    /// Returns `true` once the store has assigned an identifier.
    pub fn is_persisted(&self) -> bool {
        self.id != 0
    }

    /// Returns a copy of this book carrying the given identifier.
    pub fn with_id(&self, id: u64) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}
