//! Behaviour every `BookDatabase` must share, written once and run against
//! each store.

#![allow(dead_code)]

use library_db::{Book, BookDatabase, StoreError};

pub fn book(title: &str, author: &str, owner: &str) -> Book {
    Book {
        title: title.to_string(),
        author: author.to_string(),
        published_date: "2018-06-28".to_string(),
        image_url: format!("http://example.com/{}.png", title.to_lowercase()),
        description: format!("{title} by {author}"),
        created_by: format!("user {owner}"),
        created_by_id: owner.to_string(),
        ..Book::default()
    }
}

fn titles(books: &[Book]) -> Vec<&str> {
    books.iter().map(|b| b.title.as_str()).collect()
}

pub fn add_then_get_round_trips(store: &dyn BookDatabase) {
    let original = Book {
        id: 110,
        ..book("A", "X", "u-1")
    };

    let id = store.add_book(&original).expect("insert should succeed");
    assert_ne!(id, 0, "store must assign an id");

    let fetched = store.get_book(id).expect("inserted book should exist");
    assert_eq!(fetched.id, id);
    assert_eq!(fetched, original.with_id(id));
}

pub fn add_get_delete_scenario(store: &dyn BookDatabase) {
    let id = store
        .add_book(&book("A", "X", "u-1"))
        .expect("insert should succeed");
    assert_eq!(id, 1, "first insert into an empty store gets id 1");

    let fetched = store.get_book(1).expect("book 1 should exist");
    assert_eq!(fetched.title, "A");
    assert_eq!(fetched.author, "X");

    store.delete_book(1).expect("delete should succeed");
    assert!(matches!(store.get_book(1), Err(StoreError::NotFound(1))));
}

pub fn list_is_sorted_by_title(store: &dyn BookDatabase) {
    assert!(store.list_books().expect("list should succeed").is_empty());

    store.add_book(&book("Zeta", "Z", "u-1")).expect("insert");
    store.add_book(&book("Alpha", "A", "u-2")).expect("insert");
    store.add_book(&book("Mu", "M", "u-1")).expect("insert");

    let books = store.list_books().expect("list should succeed");
    assert_eq!(titles(&books), vec!["Alpha", "Mu", "Zeta"]);
    assert!(books.windows(2).all(|w| w[0].title <= w[1].title));
}

pub fn list_by_owner_filters_and_empty_owner_lists_all(store: &dyn BookDatabase) {
    store.add_book(&book("Zeta", "Z", "u-1")).expect("insert");
    store.add_book(&book("Alpha", "A", "u-2")).expect("insert");
    store.add_book(&book("Mu", "M", "u-1")).expect("insert");

    let all = store.list_books().expect("list should succeed");

    let mine = store
        .list_books_created_by("u-1")
        .expect("filtered list should succeed");
    assert_eq!(titles(&mine), vec!["Mu", "Zeta"]);
    let expected: Vec<Book> = all
        .iter()
        .filter(|b| b.created_by_id == "u-1")
        .cloned()
        .collect();
    assert_eq!(mine, expected);

    assert!(store
        .list_books_created_by("nobody")
        .expect("filtered list should succeed")
        .is_empty());

    let unfiltered = store
        .list_books_created_by("")
        .expect("empty owner should list everything");
    assert_eq!(unfiltered, all);
}

pub fn update_replaces_every_field(store: &dyn BookDatabase) {
    let id = store
        .add_book(&book("Draft", "Someone", "u-1"))
        .expect("insert should succeed");

    let revised = Book {
        id,
        title: "Final".to_string(),
        author: "Someone Else".to_string(),
        published_date: String::new(),
        image_url: String::new(),
        description: "rewritten".to_string(),
        created_by: "editor".to_string(),
        created_by_id: "u-9".to_string(),
    };
    store.update_book(&revised).expect("update should succeed");
    assert_eq!(store.get_book(id).expect("book should exist"), revised);

    // Rewriting identical values still matches the row.
    store
        .update_book(&revised)
        .expect("identical update should succeed");
}

pub fn update_of_missing_book_changes_nothing(store: &dyn BookDatabase) {
    let id = store
        .add_book(&book("Kept", "K", "u-1"))
        .expect("insert should succeed");
    let before = store.list_books().expect("list should succeed");

    let err = store
        .update_book(&book("Ghost", "G", "u-1").with_id(id + 100))
        .expect_err("update of a missing row should fail");
    assert!(matches!(
        err,
        StoreError::RowCountMismatch { affected: 0, .. }
    ));

    assert_eq!(store.list_books().expect("list should succeed"), before);
}

pub fn delete_of_missing_book_fails(store: &dyn BookDatabase) {
    let err = store
        .delete_book(4242)
        .expect_err("delete of a missing row should fail");
    assert!(matches!(
        err,
        StoreError::RowCountMismatch { affected: 0, .. }
    ));
}

pub fn unassigned_ids_are_rejected_before_touching_the_store(store: &dyn BookDatabase) {
    store.add_book(&book("Only", "O", "u-1")).expect("insert");
    let before = store.list_books().expect("list should succeed");

    assert!(matches!(
        store.delete_book(0),
        Err(StoreError::InvalidArgument("delete_book"))
    ));
    assert!(matches!(
        store.update_book(&book("Only", "changed", "u-1")),
        Err(StoreError::InvalidArgument("update_book"))
    ));

    assert_eq!(store.list_books().expect("list should succeed"), before);
}

pub fn get_of_missing_book_is_not_found(store: &dyn BookDatabase) {
    assert!(matches!(store.get_book(77), Err(StoreError::NotFound(77))));
}

/// Runs every contract check, each against a fresh store from `open`.
pub fn run_all(open: impl Fn() -> Box<dyn BookDatabase>) {
    let checks: [(&str, fn(&dyn BookDatabase)); 9] = [
        ("add_then_get_round_trips", add_then_get_round_trips),
        ("add_get_delete_scenario", add_get_delete_scenario),
        ("list_is_sorted_by_title", list_is_sorted_by_title),
        (
            "list_by_owner_filters_and_empty_owner_lists_all",
            list_by_owner_filters_and_empty_owner_lists_all,
        ),
        ("update_replaces_every_field", update_replaces_every_field),
        (
            "update_of_missing_book_changes_nothing",
            update_of_missing_book_changes_nothing,
        ),
        ("delete_of_missing_book_fails", delete_of_missing_book_fails),
        (
            "unassigned_ids_are_rejected_before_touching_the_store",
            unassigned_ids_are_rejected_before_touching_the_store,
        ),
        (
            "get_of_missing_book_is_not_found",
            get_of_missing_book_is_not_found,
        ),
    ];

    for (name, check) in checks {
        let store = open();
        eprintln!("contract check: {name}");
        check(store.as_ref());
        store.close().expect("close should succeed");
    }
}
