//! In-memory book store for tests and local runs.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use library_types::Book;

use crate::error::{expect_one_row, require_assigned, StoreError};
use crate::store::BookDatabase;

#[derive(Debug, Default)]
struct State {
    books: BTreeMap<u64, Book>,
    last_id: u64,
}

/// A [`BookDatabase`] that keeps books in a map.
///
/// Identifiers start at `1` and are never reused, matching an
/// auto-increment column. Titles are ordered by plain string comparison.
#[derive(Debug, Default)]
pub struct MemoryBookDatabase {
    state: Mutex<State>,
}

impl MemoryBookDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn sorted<'a>(books: impl Iterator<Item = &'a Book>) -> Vec<Book> {
        let mut books: Vec<Book> = books.cloned().collect();
        // Stable: equal titles keep id order.
        books.sort_by(|a, b| a.title.cmp(&b.title));
        books
    }
}

impl BookDatabase for MemoryBookDatabase {
    fn list_books(&self) -> Result<Vec<Book>, StoreError> {
        Ok(Self::sorted(self.state().books.values()))
    }

    fn list_books_created_by(&self, owner_id: &str) -> Result<Vec<Book>, StoreError> {
        if owner_id.is_empty() {
            return self.list_books();
        }
        let state = self.state();
        Ok(Self::sorted(
            state
                .books
                .values()
                .filter(|book| book.created_by_id == owner_id),
        ))
    }

    fn get_book(&self, id: u64) -> Result<Book, StoreError> {
        self.state()
            .books
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn add_book(&self, book: &Book) -> Result<u64, StoreError> {
        let mut state = self.state();
        state.last_id += 1;
        let id = state.last_id;
        state.books.insert(id, book.with_id(id));
        tracing::debug!(id, "book added");
        Ok(id)
    }

    fn update_book(&self, book: &Book) -> Result<(), StoreError> {
        require_assigned(book.id, "update_book")?;
        let mut state = self.state();
        let affected = match state.books.get_mut(&book.id) {
            Some(stored) => {
                *stored = book.clone();
                1
            }
            None => 0,
        };
        expect_one_row("update_book", affected)
    }

    fn delete_book(&self, id: u64) -> Result<(), StoreError> {
        require_assigned(id, "delete_book")?;
        let affected = u64::from(self.state().books.remove(&id).is_some());
        expect_one_row("delete_book", affected)
    }

    fn close(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }
}
