//! In-memory owner of the three collections. Lookups are straight linear
//! scans; the catalogue is small enough that an index would only add another
//! structure to keep consistent.

use std::collections::HashSet;

use log::{debug, warn};

use crate::error::{EntityKind, LibraryError, Result};
use crate::models::{Book, Loan, Member};

/// Books, members and active loans, each kept in insertion order.
#[derive(Debug, Default, Clone)]
pub struct EntityStore {
    pub(crate) books: Vec<Book>,
    pub(crate) members: Vec<Member>,
    pub(crate) loans: Vec<Loan>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a store from loaded records, dropping anything that would break
    /// an invariant. First occurrence wins for repeated ids, loans must point at
    /// known members and books, and each book's availability is recomputed from
    /// the surviving loans.
    pub fn from_records(books: Vec<Book>, members: Vec<Member>, loans: Vec<Loan>) -> Self {
        let mut store = Self::new();

        for mut book in books {
            book.title = book.title.trim().to_string();
            book.author = book.author.trim().to_string();
            if book.title.is_empty() || book.author.is_empty() {
                warn!("skipping book {} with an empty title or author", book.book_id);
            } else if store.find_book(book.book_id).is_some() {
                warn!("skipping duplicate book id {}", book.book_id);
            } else {
                store.books.push(book);
            }
        }

        for mut member in members {
            member.name = member.name.trim().to_string();
            if member.name.is_empty() {
                warn!("skipping member {} with an empty name", member.member_id);
            } else if store.find_member(member.member_id).is_some() {
                warn!("skipping duplicate member id {}", member.member_id);
            } else {
                store.members.push(member);
            }
        }

        let mut loan_ids = HashSet::new();
        for loan in loans {
            if store.find_member(loan.member_id).is_none() {
                warn!(
                    "dropping loan {}: member {} does not exist",
                    loan.loan_id, loan.member_id
                );
            } else if store.find_book(loan.book_id).is_none() {
                warn!(
                    "dropping loan {}: book {} does not exist",
                    loan.loan_id, loan.book_id
                );
            } else if !loan_ids.insert(loan.loan_id) {
                warn!("dropping loan {}: duplicate loan id", loan.loan_id);
            } else if store.find_active_loan_by_book(loan.book_id).is_some() {
                warn!(
                    "dropping loan {}: book {} is already on loan",
                    loan.loan_id, loan.book_id
                );
            } else {
                store.loans.push(loan);
            }
        }

        let on_loan: HashSet<i64> = store.loans.iter().map(|loan| loan.book_id).collect();
        for book in &mut store.books {
            let available = !on_loan.contains(&book.book_id);
            if book.is_available != available {
                warn!(
                    "book {} availability disagreed with loans; setting it to {}",
                    book.book_id, available
                );
                book.is_available = available;
            }
        }

        store
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn loans(&self) -> &[Loan] {
        &self.loans
    }

    pub fn find_book(&self, book_id: i64) -> Option<&Book> {
        self.books.iter().find(|book| book.book_id == book_id)
    }

    pub(crate) fn find_book_mut(&mut self, book_id: i64) -> Option<&mut Book> {
        self.books.iter_mut().find(|book| book.book_id == book_id)
    }

    pub fn find_member(&self, member_id: i64) -> Option<&Member> {
        self.members
            .iter()
            .find(|member| member.member_id == member_id)
    }

    /// At most one loan can match, so the first hit is the only one.
    pub fn find_active_loan_by_book(&self, book_id: i64) -> Option<&Loan> {
        self.loans.iter().find(|loan| loan.book_id == book_id)
    }

    /// Insert a new, available book. Title and author are stored trimmed.
    pub fn add_book(&mut self, book_id: i64, title: &str, author: &str) -> Result<&Book> {
        let title = title.trim();
        let author = author.trim();
        if title.is_empty() || author.is_empty() {
            return Err(LibraryError::invalid("Title and author cannot be empty."));
        }
        if self.find_book(book_id).is_some() {
            return Err(LibraryError::DuplicateId {
                entity: EntityKind::Book,
                id: book_id,
            });
        }

        debug!("adding book {book_id}");
        self.books.push(Book::new(book_id, title, author));
        Ok(&self.books[self.books.len() - 1])
    }

    pub fn add_member(&mut self, member_id: i64, name: &str) -> Result<&Member> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LibraryError::invalid("Name cannot be empty."));
        }
        if self.find_member(member_id).is_some() {
            return Err(LibraryError::DuplicateId {
                entity: EntityKind::Member,
                id: member_id,
            });
        }

        debug!("registering member {member_id}");
        self.members.push(Member::new(member_id, name));
        Ok(&self.members[self.members.len() - 1])
    }

    /// Books whose title or author contains `keyword`, ignoring case, in
    /// insertion order.
    pub fn search_books(&self, keyword: &str) -> Result<Vec<&Book>> {
        let needle = keyword.trim().to_lowercase();
        if needle.is_empty() {
            return Err(LibraryError::invalid("Keyword cannot be empty."));
        }
        Ok(self
            .books
            .iter()
            .filter(|book| book.matches(&needle))
            .collect())
    }
}
