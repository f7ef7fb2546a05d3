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

//! Data access for books and borrow records.
//!
//! [`LibraryStore`] is the seam between the circulation core and whatever
//! persists its data. Every method is a single atomic operation; the core
//! takes no locks of its own and composes these calls.
//!
//! [`InMemoryStore`] is the bundled implementation. Books live in a
//! [`DashMap`] so availability updates on different books never contend;
//! the ISBN index uses the entry API for an atomic uniqueness check.

use crate::base::{BookId, Isbn, PatronId};
use crate::book::{Book, NewBook};
use crate::loan::{BorrowRecord, LoanEntry, RecordId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Failure reported by the data access layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Row targeted by an update does not exist
    #[error("no matching row: {0}")]
    NotFound(String),

    /// Update would break a uniqueness or range constraint
    #[error("constraint violated: {0}")]
    Conflict(String),

    /// Backend could not complete the operation
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

pub trait LibraryStore: Send + Sync {
    fn book_by_id(&self, id: BookId) -> Result<Option<Book>, StoreError>;

    fn book_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>, StoreError>;

    /// Inserts a book with every copy available and returns it with its new id.
    fn insert_book(&self, book: NewBook) -> Result<Book, StoreError>;

    /// Adds `delta` to the available copy count.
    ///
    /// Implementations must apply the change atomically and refuse any change
    /// that would leave the count below zero or above `total_copies`.
    fn update_book_availability(&self, id: BookId, delta: i32) -> Result<(), StoreError>;

    fn active_borrow_record(
        &self,
        patron_id: &PatronId,
        book_id: BookId,
    ) -> Result<Option<BorrowRecord>, StoreError>;

    fn insert_borrow_record(
        &self,
        patron_id: &PatronId,
        book_id: BookId,
        borrow_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> Result<BorrowRecord, StoreError>;

    /// Closes the active record for `(patron_id, book_id)`.
    fn update_borrow_record_return_date(
        &self,
        patron_id: &PatronId,
        book_id: BookId,
        return_date: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    fn all_books(&self) -> Result<Vec<Book>, StoreError>;

    /// Number of active loans held by the patron.
    fn patron_borrow_count(&self, patron_id: &PatronId) -> Result<usize, StoreError>;

    fn active_borrows_by_patron(&self, patron_id: &PatronId) -> Result<Vec<LoanEntry>, StoreError>;

    /// Every record of the patron, active and closed, newest borrow first.
    fn borrow_history_by_patron(&self, patron_id: &PatronId)
    -> Result<Vec<LoanEntry>, StoreError>;
}

/// Process-local [`LibraryStore`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    books: DashMap<BookId, Book>,
    /// ISBN uniqueness index.
    isbns: DashMap<Isbn, BookId>,
    /// Borrow records in insertion order.
    records: RwLock<Vec<BorrowRecord>>,
    next_book_id: AtomicU64,
    next_record_id: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn join(&self, record: &BorrowRecord) -> Option<LoanEntry> {
        let book = self.books.get(&record.book_id)?;
        Some(LoanEntry {
            record: record.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            isbn: book.isbn.clone(),
        })
    }
}

impl LibraryStore for InMemoryStore {
    fn book_by_id(&self, id: BookId) -> Result<Option<Book>, StoreError> {
        Ok(self.books.get(&id).map(|book| book.clone()))
    }

    fn book_by_isbn(&self, isbn: &Isbn) -> Result<Option<Book>, StoreError> {
        let Some(id) = self.isbns.get(isbn).map(|id| *id) else {
            return Ok(None);
        };
        self.book_by_id(id)
    }

    fn insert_book(&self, book: NewBook) -> Result<Book, StoreError> {
        match self.isbns.entry(book.isbn.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!("isbn {}", book.isbn))),
            Entry::Vacant(entry) => {
                let id = BookId(self.next_book_id.fetch_add(1, Ordering::Relaxed) + 1);
                let book = book.into_book(id);
                self.books.insert(id, book.clone());
                entry.insert(id);
                Ok(book)
            }
        }
    }

    fn update_book_availability(&self, id: BookId, delta: i32) -> Result<(), StoreError> {
        let mut book = self
            .books
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("book {id}")))?;

        let updated = i64::from(book.available_copies) + i64::from(delta);
        if updated < 0 || updated > i64::from(book.total_copies) {
            return Err(StoreError::Conflict(format!(
                "available copies of book {id} would become {updated}"
            )));
        }
        // In range 0..=total_copies, so the cast is lossless.
        book.available_copies = updated as u32;
        Ok(())
    }

    fn active_borrow_record(
        &self,
        patron_id: &PatronId,
        book_id: BookId,
    ) -> Result<Option<BorrowRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .iter()
            .find(|r| r.is_active() && r.book_id == book_id && &r.patron_id == patron_id)
            .cloned())
    }

    fn insert_borrow_record(
        &self,
        patron_id: &PatronId,
        book_id: BookId,
        borrow_date: DateTime<Utc>,
        due_date: DateTime<Utc>,
    ) -> Result<BorrowRecord, StoreError> {
        let mut records = self.records.write();
        if records
            .iter()
            .any(|r| r.is_active() && r.book_id == book_id && &r.patron_id == patron_id)
        {
            return Err(StoreError::Conflict(format!(
                "patron {patron_id} already has an active loan of book {book_id}"
            )));
        }

        let record = BorrowRecord {
            id: RecordId(self.next_record_id.fetch_add(1, Ordering::Relaxed) + 1),
            patron_id: patron_id.clone(),
            book_id,
            borrow_date,
            due_date,
            return_date: None,
        };
        records.push(record.clone());
        Ok(record)
    }

    fn update_borrow_record_return_date(
        &self,
        patron_id: &PatronId,
        book_id: BookId,
        return_date: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut records = self.records.write();
        let record = records
            .iter_mut()
            .find(|r| r.is_active() && r.book_id == book_id && &r.patron_id == patron_id)
            .ok_or_else(|| {
                StoreError::NotFound(format!("active loan of book {book_id} by {patron_id}"))
            })?;
        record.return_date = Some(return_date);
        Ok(())
    }

    fn all_books(&self) -> Result<Vec<Book>, StoreError> {
        let mut books: Vec<Book> = self.books.iter().map(|book| book.clone()).collect();
        books.sort_by_key(|book| book.id);
        Ok(books)
    }

    fn patron_borrow_count(&self, patron_id: &PatronId) -> Result<usize, StoreError> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|r| r.is_active() && &r.patron_id == patron_id)
            .count())
    }

    fn active_borrows_by_patron(&self, patron_id: &PatronId) -> Result<Vec<LoanEntry>, StoreError> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|r| r.is_active() && &r.patron_id == patron_id)
            .filter_map(|r| self.join(r))
            .collect())
    }

    fn borrow_history_by_patron(
        &self,
        patron_id: &PatronId,
    ) -> Result<Vec<LoanEntry>, StoreError> {
        let mut history: Vec<LoanEntry> = self
            .records
            .read()
            .iter()
            .filter(|r| &r.patron_id == patron_id)
            .filter_map(|r| self.join(r))
            .collect();
        // Stable sort: equal borrow dates keep insertion order.
        history.sort_by(|a, b| b.record.borrow_date.cmp(&a.record.borrow_date));
        Ok(history)
    }
}
