//! Domain records for the catalogue. These stay plain data holders: the
//! invariants tying them together live in the store and the loan engine, and
//! the serde derives double as the on-disk format, so field names here are the
//! JSON field names.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A catalogued book. `is_available` is flipped by the loan engine only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: i64,
    pub title: String,
    pub author: String,
    /// Older data files may omit the flag; a missing value means the book is on
    /// the shelf.
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

impl Book {
    /// Build a fresh, available book.
    pub fn new(book_id: i64, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            book_id,
            title: title.into(),
            author: author.into(),
            is_available: true,
        }
    }

    pub fn status(&self) -> BookStatus {
        if self.is_available {
            BookStatus::Available
        } else {
            BookStatus::Borrowed
        }
    }

    /// Case-insensitive substring match against title or author. `needle` is
    /// expected to be lowercase already so callers can fold it once per search.
    pub(crate) fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.author.to_lowercase().contains(needle)
    }
}

impl fmt::Display for Book {
    /// One-line listing used by both the list and search views.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ID: {} | Title: {} | Author: {} | Status: {}",
            self.book_id,
            self.title,
            self.author,
            self.status()
        )
    }
}

/// The two states a book moves between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookStatus {
    Available,
    Borrowed,
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookStatus::Available => f.write_str("Available"),
            BookStatus::Borrowed => f.write_str("Borrowed"),
        }
    }
}

/// A registered library member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: i64,
    pub name: String,
}

impl Member {
    pub fn new(member_id: i64, name: impl Into<String>) -> Self {
        Self {
            member_id,
            name: name.into(),
        }
    }
}

impl fmt::Display for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID: {} | Name: {}", self.member_id, self.name)
    }
}

/// An active loan. Returning the book removes the record entirely, so there is
/// no "returned" state to model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: i64,
    pub member_id: i64,
    pub book_id: i64,
    /// Borrowing day, stored as `YYYY-MM-DD`.
    pub date: NaiveDate,
}
