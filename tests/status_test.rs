// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Patron status report integration tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use library_circulation_rs::{
    Book, BookId, BorrowRecord, InMemoryStore, Isbn, Library, LibraryError, LibraryStore,
    LoanEntry, ManualClock, NewBook, PatronId, StatusView, StoreError,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;

// === Helper Functions ===

const PATRON: &str = "123456";

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
}

fn setup() -> (Library, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(start()));
    let library = Library::new(Arc::new(InMemoryStore::new())).with_clock(clock.clone());
    (library, clock)
}

fn add(library: &Library, title: &str, isbn: &str) -> BookId {
    library.add_book(title, "Author", isbn, 2).unwrap().book.id
}

/// Delegates to an [`InMemoryStore`] but lists history oldest first.
#[derive(Default)]
struct OldestFirstStore {
    inner: InMemoryStore,
}

impl LibraryStore for OldestFirstStore {
    fn book_by_id(&self, id: BookId) -> Result<Option<Book>, StoreError> {
        self.inner.book_by_id(id)
    }

    fn book_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>, StoreError> {
        self.inner.book_by_isbn(isbn)
    }

    fn insert_book(&self, book: NewBook) -> Result<Book, StoreError> {
        self.inner.insert_book(book)
    }

    fn update_book_availability(&self, id: BookId, delta: i32) -> Result<(), StoreError> {
        self.inner.update_book_availability(id, delta)
    }

    fn active_borrow_record(
        &self,
        patron_id: &PatronId,
        book_id: BookId,
    ) -> Result<Option<BorrowRecord>, StoreError> {
        self.inner.active_borrow_record(patron_id, book_id)
    }

    fn insert_borrow_record(
        &self,
        patron_id: &PatronId,
        book_id: BookId,
        borrow_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> Result<BorrowRecord, StoreError> {
        self.inner
            .insert_borrow_record(patron_id, book_id, borrow_date, due_date)
    }

    fn update_borrow_record_return_date(
        &self,
        patron_id: &PatronId,
        book_id: BookId,
        return_date: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.inner
            .update_borrow_record_return_date(patron_id, book_id, return_date)
    }

    fn all_books(&self) -> Result<Vec<Book>, StoreError> {
        self.inner.all_books()
    }

    fn patron_borrow_count(&self, patron_id: &PatronId) -> Result<usize, StoreError> {
        self.inner.patron_borrow_count(patron_id)
    }

    fn active_borrows_by_patron(&self, patron_id: &PatronId) -> Result<Vec<LoanEntry>, StoreError> {
        self.inner.active_borrows_by_patron(patron_id)
    }

    fn borrow_history_by_patron(
        &self,
        patron_id: &PatronId,
    ) -> Result<Vec<LoanEntry>, StoreError> {
        let mut history = self.inner.borrow_history_by_patron(patron_id)?;
        history.reverse();
        Ok(history)
    }
}

// === Tests ===

#[test]
fn unknown_patron_has_empty_report() {
    let (library, _) = setup();
    let status = library.patron_status(PATRON).unwrap();

    assert_eq!(status.patron_id.as_str(), PATRON);
    assert_eq!(status.generated_at, start());
    assert!(status.current_loans.is_empty());
    assert_eq!(status.current_count, 0);
    assert_eq!(status.total_late_fees, Decimal::ZERO);
    assert!(status.history.is_empty());
}

#[test]
fn invalid_patron_is_rejected() {
    let (library, _) = setup();
    assert_eq!(
        library.patron_status("12345a"),
        Err(LibraryError::InvalidPatron)
    );
}

#[test]
fn current_loans_are_quoted_at_report_time() {
    let (library, clock) = setup();
    let dune = add(&library, "Dune", "9780441172719");
    let emma = add(&library, "Emma", "9780141439587");

    library.borrow_book(PATRON, dune).unwrap();
    clock.advance(Duration::days(5));
    library.borrow_book(PATRON, emma).unwrap();

    // Dune is 10 days overdue, Emma 5.
    clock.set(start() + Duration::days(24));
    let status = library.patron_status(PATRON).unwrap();

    assert_eq!(status.current_count, 2);
    let dune_loan = status.current_loans.iter().find(|l| l.book_id == dune).unwrap();
    assert!(dune_loan.is_overdue);
    assert_eq!(dune_loan.days_overdue, 10);
    assert_eq!(dune_loan.current_fee, dec!(6.50));
    assert_eq!(dune_loan.due_date, start() + Duration::days(14));

    let emma_loan = status.current_loans.iter().find(|l| l.book_id == emma).unwrap();
    assert_eq!(emma_loan.days_overdue, 5);
    assert_eq!(emma_loan.current_fee, dec!(2.50));

    assert_eq!(status.total_late_fees, dec!(9.00));
}

#[test]
fn loans_not_yet_due_owe_nothing() {
    let (library, clock) = setup();
    let dune = add(&library, "Dune", "9780441172719");
    library.borrow_book(PATRON, dune).unwrap();
    clock.advance(Duration::days(14));

    let status = library.patron_status(PATRON).unwrap();
    let loan = &status.current_loans[0];
    assert!(!loan.is_overdue);
    assert_eq!(loan.days_overdue, 0);
    assert_eq!(loan.current_fee, Decimal::ZERO);
    assert_eq!(status.total_late_fees, Decimal::ZERO);
}

#[test]
fn history_includes_returned_loans_newest_first() {
    let (library, clock) = setup();
    let dune = add(&library, "Dune", "9780441172719");
    let emma = add(&library, "Emma", "9780141439587");

    library.borrow_book(PATRON, dune).unwrap();
    clock.advance(Duration::days(1));
    library.borrow_book(PATRON, emma).unwrap();

    // Dune returned 3 days late.
    clock.set(start() + Duration::days(17));
    library.return_book(PATRON, dune).unwrap();

    // Much later: the returned loan's fee stays frozen at its return date.
    clock.set(start() + Duration::days(60));
    let status = library.patron_status(PATRON).unwrap();

    assert_eq!(status.current_count, 1);
    assert_eq!(status.current_loans[0].book_id, emma);
    assert_eq!(status.current_loans[0].current_fee, dec!(15.00));
    assert_eq!(status.total_late_fees, dec!(15.00));

    assert_eq!(status.history.len(), 2);
    let newest = &status.history[0];
    assert_eq!(newest.book_id, emma);
    assert_eq!(newest.return_date, None);
    assert_eq!(newest.isbn.as_str(), "9780141439587");

    let oldest = &status.history[1];
    assert_eq!(oldest.book_id, dune);
    assert_eq!(oldest.title, "Dune");
    assert_eq!(oldest.return_date, Some(start() + Duration::days(17)));
    assert_eq!(oldest.days_overdue_at_end, 3);
    assert_eq!(oldest.late_fee_at_end, dec!(1.50));
}

#[test]
fn reports_are_per_patron() {
    let (library, _) = setup();
    let dune = add(&library, "Dune", "9780441172719");
    library.borrow_book(PATRON, dune).unwrap();
    library.borrow_book("654321", dune).unwrap();

    let other = library.patron_status("654321").unwrap();
    assert_eq!(other.current_count, 1);
    assert_eq!(other.history.len(), 1);
    assert_eq!(library.patron_status("111111").unwrap().current_count, 0);
}

#[test]
fn status_view_json_shape() {
    let (library, clock) = setup();
    let dune = add(&library, "Dune", "9780441172719");
    library.borrow_book(PATRON, dune).unwrap();
    clock.advance(Duration::days(24));

    let status = library.patron_status(PATRON).unwrap();
    let json = serde_json::to_value(StatusView::from(&status)).unwrap();

    assert_eq!(json["patron_id"], PATRON);
    assert_eq!(json["current_borrow_count"], 1);
    assert_eq!(json["total_late_fees_owed"], "6.50");
    let loan = &json["currently_borrowed"][0];
    assert_eq!(loan["title"], "Dune");
    assert_eq!(loan["is_overdue"], true);
    assert_eq!(loan["days_overdue"], 10);
    assert_eq!(json["history"].as_array().unwrap().len(), 1);
}

#[test]
fn history_order_does_not_depend_on_store() {
    let clock = Arc::new(ManualClock::new(start()));
    let library =
        Library::new(Arc::new(OldestFirstStore::default())).with_clock(clock.clone());
    let dune = add(&library, "Dune", "9780441172719");
    let emma = add(&library, "Emma", "9780141439587");
    let odyssey = add(&library, "Odyssey", "9780140268867");

    library.borrow_book(PATRON, dune).unwrap();
    clock.advance(Duration::days(1));
    library.borrow_book(PATRON, emma).unwrap();
    clock.advance(Duration::days(1));
    library.borrow_book(PATRON, odyssey).unwrap();

    let status = library.patron_status(PATRON).unwrap();
    let order: Vec<BookId> = status.history.iter().map(|h| h.book_id).collect();
    assert_eq!(order, [odyssey, emma, dune]);
}
