//! Borrow and return transitions. Each operation validates everything it needs
//! up front and only then touches the store, so a failed call never leaves a
//! loan without its book flag flipped (or the reverse).

use chrono::NaiveDate;
use log::debug;

use crate::error::{LibraryError, Result};
use crate::models::Loan;
use crate::store::EntityStore;

/// Lend `book_id` to `member_id`, dated `on`. Returns the created loan.
pub fn borrow_book(
    store: &mut EntityStore,
    member_id: i64,
    book_id: i64,
    on: NaiveDate,
) -> Result<Loan> {
    if store.find_member(member_id).is_none() {
        return Err(LibraryError::MemberNotFound(member_id));
    }
    match store.find_book(book_id) {
        None => return Err(LibraryError::BookNotFound(book_id)),
        Some(book) if !book.is_available => return Err(LibraryError::BookUnavailable(book_id)),
        Some(_) => {}
    }
    let loan_id = next_loan_id(store)?;

    if let Some(book) = store.find_book_mut(book_id) {
        book.is_available = false;
    }
    let loan = Loan {
        loan_id,
        member_id,
        book_id,
        date: on,
    };
    store.loans.push(loan.clone());

    debug!(
        "loan {} created: member {} borrowed book {}",
        loan.loan_id, member_id, book_id
    );
    Ok(loan)
}

/// Close the active loan on `book_id` and put the book back on the shelf.
/// Returns the removed loan.
pub fn return_book(store: &mut EntityStore, book_id: i64) -> Result<Loan> {
    if store.find_book(book_id).is_none() {
        return Err(LibraryError::BookNotFound(book_id));
    }
    let position = store
        .loans
        .iter()
        .position(|loan| loan.book_id == book_id)
        .ok_or(LibraryError::NoActiveLoan(book_id))?;

    let loan = store.loans.remove(position);
    if let Some(book) = store.find_book_mut(book_id) {
        book.is_available = true;
    }

    debug!("loan {} closed: book {} returned", loan.loan_id, book_id);
    Ok(loan)
}

/// One more than the highest id in use, or 1 for an empty ledger. Ids freed by
/// returns are only reused once nothing above them remains.
fn next_loan_id(store: &EntityStore) -> Result<i64> {
    let highest = store.loans.iter().map(|loan| loan.loan_id).max().unwrap_or(0);
    highest
        .checked_add(1)
        .ok_or(LibraryError::LoanIdsExhausted(highest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Book, BookStatus, Member};

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn stocked() -> EntityStore {
        let mut store = EntityStore::new();
        store.add_book(1, "Dune", "Herbert").unwrap();
        store.add_book(2, "Emma", "Austen").unwrap();
        store.add_member(1, "Alice").unwrap();
        store.add_member(2, "Bob").unwrap();
        store
    }

    #[test]
    fn borrow_flips_the_book_and_records_one_loan() {
        let mut store = stocked();
        let loan = borrow_book(&mut store, 1, 1, day()).unwrap();

        assert_eq!(
            loan,
            Loan {
                loan_id: 1,
                member_id: 1,
                book_id: 1,
                date: day()
            }
        );
        assert_eq!(store.find_book(1).unwrap().status(), BookStatus::Borrowed);
        assert_eq!(store.loans().len(), 1);
        assert_eq!(store.find_active_loan_by_book(1), Some(&loan));
    }

    #[test]
    fn second_borrow_is_refused_without_a_second_loan() {
        let mut store = stocked();
        borrow_book(&mut store, 1, 1, day()).unwrap();

        let err = borrow_book(&mut store, 2, 1, day()).unwrap_err();
        assert!(matches!(err, LibraryError::BookUnavailable(1)));
        assert_eq!(store.loans().len(), 1);
        assert_eq!(store.loans()[0].member_id, 1);
    }

    #[test]
    fn unknown_member_is_checked_before_the_book() {
        let mut store = stocked();
        assert!(matches!(
            borrow_book(&mut store, 9, 99, day()),
            Err(LibraryError::MemberNotFound(9))
        ));
        assert!(matches!(
            borrow_book(&mut store, 1, 99, day()),
            Err(LibraryError::BookNotFound(99))
        ));
        assert!(store.loans().is_empty());
        assert!(store.books().iter().all(|book| book.is_available));
    }

    #[test]
    fn return_restores_availability_and_removes_the_loan() {
        let mut store = stocked();
        borrow_book(&mut store, 1, 1, day()).unwrap();

        let returned = return_book(&mut store, 1).unwrap();
        assert_eq!(returned.loan_id, 1);
        assert!(store.find_book(1).unwrap().is_available);
        assert!(store.loans().is_empty());

        assert!(matches!(
            return_book(&mut store, 1),
            Err(LibraryError::NoActiveLoan(1))
        ));
        assert!(matches!(
            return_book(&mut store, 50),
            Err(LibraryError::BookNotFound(50))
        ));
    }

    #[test]
    fn loan_ids_follow_the_current_maximum() {
        let mut store = stocked();
        let first = borrow_book(&mut store, 1, 1, day()).unwrap();
        let second = borrow_book(&mut store, 2, 2, day()).unwrap();
        assert_eq!((first.loan_id, second.loan_id), (1, 2));

        return_book(&mut store, 1).unwrap();
        let third = borrow_book(&mut store, 1, 1, day()).unwrap();
        assert_eq!(third.loan_id, 3);

        return_book(&mut store, 1).unwrap();
        return_book(&mut store, 2).unwrap();
        let fresh = borrow_book(&mut store, 1, 2, day()).unwrap();
        assert_eq!(fresh.loan_id, 1);
    }

    #[test]
    fn exhausted_loan_ids_refuse_the_borrow_untouched() {
        let mut store = EntityStore::from_records(
            vec![Book::new(1, "Dune", "Herbert"), Book::new(2, "Emma", "Austen")],
            vec![Member::new(1, "Alice")],
            vec![Loan {
                loan_id: i64::MAX,
                member_id: 1,
                book_id: 1,
                date: day(),
            }],
        );

        let err = borrow_book(&mut store, 1, 2, day()).unwrap_err();
        assert!(matches!(err, LibraryError::LoanIdsExhausted(i64::MAX)));
        assert!(store.find_book(2).unwrap().is_available);
        assert_eq!(store.loans().len(), 1);

        return_book(&mut store, 1).unwrap();
        assert_eq!(borrow_book(&mut store, 1, 2, day()).unwrap().loan_id, 1);
    }

    #[test]
    fn availability_tracks_active_loans_after_every_step() {
        let mut store = stocked();
        let consistent = |store: &EntityStore| {
            store.books().iter().all(|book| {
                book.is_available == store.find_active_loan_by_book(book.book_id).is_none()
            })
        };

        assert!(consistent(&store));
        borrow_book(&mut store, 1, 2, day()).unwrap();
        assert!(consistent(&store));
        let _ = borrow_book(&mut store, 2, 2, day());
        assert!(consistent(&store));
        return_book(&mut store, 2).unwrap();
        assert!(consistent(&store));
        let _ = return_book(&mut store, 2);
        assert!(consistent(&store));
    }
}
