//! Statements and row mapping shared by the SQL stores.
//!
//! Both engines accept `?` placeholders, so the same six statements are
//! prepared by every SQL store. Selects name their columns in the order
//! [`book_from_columns`] decodes them.

use library_types::Book;

macro_rules! select_books {
    ($tail:literal) => {
        concat!(
            "SELECT id, title, author, publishedDate, imageUrl, description, createdBy, createdById ",
            "FROM books",
            $tail
        )
    };
}

pub(crate) const LIST: &str = select_books!(" ORDER BY title");

pub(crate) const LIST_BY: &str = select_books!(" WHERE createdById = ? ORDER BY title");

pub(crate) const GET: &str = select_books!(" WHERE id = ?");

pub(crate) const INSERT: &str = "INSERT INTO books \
    (title, author, publishedDate, imageUrl, description, createdBy, createdById) \
    VALUES (?, ?, ?, ?, ?, ?, ?)";

pub(crate) const UPDATE: &str = "UPDATE books SET title = ?, author = ?, publishedDate = ?, \
    imageUrl = ?, description = ?, createdBy = ?, createdById = ? WHERE id = ?";

pub(crate) const DELETE: &str = "DELETE FROM books WHERE id = ?";

/// Every statement a store prepares at construction, by name.
pub(crate) const ALL: [(&str, &str); 6] = [
    ("list", LIST),
    ("list_by", LIST_BY),
    ("get", GET),
    ("insert", INSERT),
    ("update", UPDATE),
    ("delete", DELETE),
];

/// A `books` row as the driver hands it back, decoded positionally.
pub(crate) type BookColumns = (
    u64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<String>,
);

/// Converts a decoded row into a [`Book`], mapping `NULL` text to `""`.
pub(crate) fn book_from_columns(columns: BookColumns) -> Book {
    let (id, title, author, published_date, image_url, description, created_by, created_by_id) =
        columns;

    Book {
        id,
        title: title.unwrap_or_default(),
        author: author.unwrap_or_default(),
        published_date: published_date.unwrap_or_default(),
        image_url: image_url.unwrap_or_default(),
        description: description.unwrap_or_default(),
        created_by: created_by.unwrap_or_default(),
        created_by_id: created_by_id.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selects_share_one_column_order() {
        for sql in [LIST, LIST_BY, GET] {
            assert!(sql.starts_with(
                "SELECT id, title, author, publishedDate, imageUrl, description, createdBy, createdById FROM books"
            ));
        }
        assert!(LIST.ends_with("ORDER BY title"));
        assert_eq!(UPDATE.matches('?').count(), 8);
        assert_eq!(INSERT.matches('?').count(), 7);
    }

    #[test]
    fn null_columns_become_empty_strings() {
        let book = book_from_columns((
            4,
            Some("Emma".to_string()),
            None,
            None,
            None,
            None,
            Some("jane".to_string()),
            None,
        ));

        assert_eq!(book.id, 4);
        assert_eq!(book.title, "Emma");
        assert_eq!(book.author, "");
        assert_eq!(book.description, "");
        assert_eq!(book.created_by, "jane");
        assert_eq!(book.created_by_id, "");
    }
}
