//! The store interface shared by every book store implementation.

use library_types::Book;

use crate::error::StoreError;

/// Persistence operations for [`Book`] records.
///
/// Implementations own their connection and are shared by reference; every
/// method is a blocking call that either completes or returns an error.
pub trait BookDatabase: Send + Sync {
    /// Returns every book, ordered by title ascending.
    ///
    /// An empty store yields an empty vector.
    fn list_books(&self) -> Result<Vec<Book>, StoreError>;

    /// Returns the books whose `created_by_id` equals `owner_id`, ordered by
    /// title ascending.
    ///
    /// An empty `owner_id` applies no filter and behaves exactly like
    /// [`list_books`](Self::list_books).
    fn list_books_created_by(&self, owner_id: &str) -> Result<Vec<Book>, StoreError>;

    /// Returns the book with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when no row matches.
    fn get_book(&self, id: u64) -> Result<Book, StoreError>;

    /// Inserts a book and returns the identifier assigned by the store.
    ///
    /// The incoming `book.id` is ignored.
    fn add_book(&self, book: &Book) -> Result<u64, StoreError>;

    /// Replaces every field of the stored book with the same identifier.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidArgument` if `book.id` is unset and
    /// `StoreError::RowCountMismatch` if no row was updated.
    fn update_book(&self, book: &Book) -> Result<(), StoreError>;

    /// Removes the book with the given identifier.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidArgument` if `id` is `0` and
    /// `StoreError::RowCountMismatch` if no row was deleted.
    fn delete_book(&self, id: u64) -> Result<(), StoreError>;

    /// Releases the underlying connection.
    fn close(self: Box<Self>) -> Result<(), StoreError>;
}
