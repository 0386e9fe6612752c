//! Saving and reloading the catalogue through the JSON files.

use std::fs;

use chrono::NaiveDate;
use mini_library::storage::Resource;
use mini_library::{borrow_book, load_all, load_store, save_all, EntityStore, LibraryError};
use tempfile::tempdir;

fn sample_store() -> EntityStore {
    let mut store = EntityStore::new();
    store.add_book(1, "Dune", "Herbert").unwrap();
    store.add_book(2, "Emma", "Austen").unwrap();
    store.add_member(1, "Alice").unwrap();
    store.add_member(2, "Bob").unwrap();
    borrow_book(
        &mut store,
        2,
        1,
        NaiveDate::from_ymd_opt(2025, 1, 31).unwrap(),
    )
    .unwrap();
    store
}

#[test]
fn save_then_load_reproduces_the_catalogue() {
    let dir = tempdir().unwrap();
    let store = sample_store();
    save_all(dir.path(), &store).unwrap();

    let (books, members, loans) = load_all(dir.path());
    assert_eq!(books, store.books());
    assert_eq!(members, store.members());
    assert_eq!(loans, store.loans());

    let reloaded = load_store(dir.path());
    assert!(!reloaded.find_book(1).unwrap().is_available);
    assert!(reloaded.find_book(2).unwrap().is_available);
}

#[test]
fn files_are_readable_json_with_field_names() {
    let dir = tempdir().unwrap();
    save_all(dir.path(), &sample_store()).unwrap();

    let loans = fs::read_to_string(Resource::Loans.path_in(dir.path())).unwrap();
    let value: serde_json::Value = serde_json::from_str(&loans).unwrap();
    assert_eq!(
        value,
        serde_json::json!([
            {"loan_id": 1, "member_id": 2, "book_id": 1, "date": "2025-01-31"}
        ])
    );
    assert!(loans.contains("\n  {\n    \"loan_id\": 1,"));
}

#[test]
fn saving_overwrites_previous_content() {
    let dir = tempdir().unwrap();
    save_all(dir.path(), &sample_store()).unwrap();
    save_all(dir.path(), &EntityStore::new()).unwrap();

    let (books, members, loans) = load_all(dir.path());
    assert!(books.is_empty());
    assert!(members.is_empty());
    assert!(loans.is_empty());
}

#[test]
fn hand_edited_files_are_repaired_on_load() {
    let dir = tempdir().unwrap();
    fs::write(
        Resource::Books.path_in(dir.path()),
        r#"[
            {"book_id": 1, "title": "Dune", "author": "Herbert", "is_available": true},
            {"book_id": 2, "title": "Emma"},
            {"book_id": 3, "title": "Ulysses", "author": "Joyce", "is_available": false}
        ]"#,
    )
    .unwrap();
    fs::write(
        Resource::Members.path_in(dir.path()),
        r#"[{"member_id": 1, "name": "Alice"}]"#,
    )
    .unwrap();
    fs::write(
        Resource::Loans.path_in(dir.path()),
        r#"[
            {"loan_id": 4, "member_id": 1, "book_id": 1, "date": "2025-03-01"},
            {"loan_id": 5, "member_id": 1, "book_id": 3, "date": "not a date"}
        ]"#,
    )
    .unwrap();

    let store = load_store(dir.path());
    assert_eq!(store.books().len(), 2);
    assert_eq!(store.loans().len(), 1);
    assert!(!store.find_book(1).unwrap().is_available);
    assert!(store.find_book(3).unwrap().is_available);
}

#[test]
fn unwritable_location_surfaces_a_write_failure() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("occupied");
    fs::write(&file, "").unwrap();

    let err = save_all(&file, &sample_store()).unwrap_err();
    assert!(matches!(err, LibraryError::PersistenceWrite { .. }));
}
