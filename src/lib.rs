//! Core library surface for the mini library catalogue.
//!
//! The store owns books, members and loans; the loan engine moves books
//! between available and borrowed; storage reads and writes the JSON files;
//! the UI drives all of it from a terminal menu.
pub mod config;
pub mod error;
pub mod loans;
pub mod models;
pub mod storage;
pub mod store;
pub mod ui;

/// Persistence entry points used by `main.rs` at startup and by Save & Exit.
pub use storage::{load_all, load_store, save_all};

/// Domain records and the collection that owns them.
pub use models::{Book, BookStatus, Loan, Member};
pub use store::EntityStore;

/// Borrow/return transitions.
pub use loans::{borrow_book, return_book};

pub use config::{Args, Config};
pub use error::{EntityKind, LibraryError};

/// The interactive application entry point and state container.
pub use ui::{run_app, App, Outcome};
