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

//! Borrow and return.
//!
//! A borrow is two store mutations: insert the record, then take a copy off
//! the shelf. If the second step fails the first is compensated by closing
//! the new record at once, so no active loan exists without a matching
//! availability decrement.
//!
//! A return closes the record first and only then puts the copy back. If
//! closing fails the availability step is skipped, so a copy is never
//! credited twice.

use crate::Library;
use crate::base::{BookId, PatronId};
use crate::error::{LibraryError, StoreResultExt};
use crate::fee::FeeQuote;
use crate::library::log_rejection;
use crate::loan::BorrowRecord;
use crate::presentation::Receipt;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::fmt;
use tracing::{error, info};

/// Successful borrow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorrowReceipt {
    pub record: BorrowRecord,
    pub title: String,
}

impl fmt::Display for BorrowReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Successfully borrowed \"{}\". Due date: {}.",
            self.title,
            self.record.due_date.format("%Y-%m-%d")
        )
    }
}

impl Receipt for BorrowReceipt {}

/// Successful return, with the late fee quoted at the moment of return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnReceipt {
    pub book_id: BookId,
    pub title: String,
    pub returned_at: DateTime<Utc>,
    pub fee: FeeQuote,
}

impl fmt::Display for ReturnReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fee.fee_amount > Decimal::ZERO {
            write!(
                f,
                "Book returned: \"{}\". Late fee: ${:.2} ({} days overdue).",
                self.title, self.fee.fee_amount, self.fee.days_overdue
            )
        } else {
            write!(f, "Book returned: \"{}\". No late fee.", self.title)
        }
    }
}

impl Receipt for ReturnReceipt {}

impl Library {
    /// Lends one copy of a book to a patron.
    ///
    /// Checks run in this order and the first failure is reported with no
    /// side effects:
    ///
    /// | Check | Error |
    /// |-------|-------|
    /// | Patron id is six digits | [`LibraryError::InvalidPatron`] |
    /// | Book exists | [`LibraryError::BookNotFound`] |
    /// | A copy is available | [`LibraryError::BookUnavailable`] |
    /// | Patron is under the borrow limit | [`LibraryError::BorrowLimitExceeded`] |
    /// | Patron does not already hold this book | [`LibraryError::DuplicateActiveLoan`] |
    /// | Due date is representable | [`LibraryError::DueDateOutOfRange`] |
    ///
    /// The due date is the current instant plus the configured loan period.
    ///
    /// # Errors
    ///
    /// Any of the above, or [`LibraryError::StorageFailure`] when the store
    /// fails. A failed availability update is compensated before returning.
    pub fn borrow_book(&self, patron_id: &str, book_id: BookId) -> Result<BorrowReceipt, LibraryError> {
        self.try_borrow(patron_id, book_id)
            .inspect_err(|e| log_rejection("borrow", e))
    }

    fn try_borrow(&self, patron_id: &str, book_id: BookId) -> Result<BorrowReceipt, LibraryError> {
        let patron_id = PatronId::parse(patron_id)?;

        let book = self
            .store
            .book_by_id(book_id)
            .during("looking up book")?
            .ok_or(LibraryError::BookNotFound)?;
        if !book.is_available() {
            return Err(LibraryError::BookUnavailable);
        }

        let limit = self.config.max_active_loans;
        let active = self
            .store
            .patron_borrow_count(&patron_id)
            .during("counting active loans")?;
        if active >= limit {
            return Err(LibraryError::BorrowLimitExceeded { limit });
        }

        if self
            .store
            .active_borrow_record(&patron_id, book_id)
            .during("checking active loans")?
            .is_some()
        {
            return Err(LibraryError::DuplicateActiveLoan);
        }

        let now = self.clock.now();
        let days = self.config.loan_period_days;
        let due_date = Duration::try_days(days)
            .and_then(|period| now.checked_add_signed(period))
            .ok_or(LibraryError::DueDateOutOfRange { days })?;

        // Step 1: open the loan.
        let record = self
            .store
            .insert_borrow_record(&patron_id, book_id, now, due_date)
            .during("creating borrow record")?;

        // Step 2: take the copy off the shelf, compensating step 1 on failure.
        if let Err(source) = self.store.update_book_availability(book_id, -1) {
            self.close_orphaned_loan(&patron_id, book_id);
            return Err(LibraryError::StorageFailure {
                operation: "updating book availability",
                source,
            });
        }

        info!(patron = %patron_id, book = %book_id, due = %due_date, "book borrowed");
        Ok(BorrowReceipt {
            record,
            title: book.title,
        })
    }

    /// Compensating action for a borrow whose availability update failed.
    fn close_orphaned_loan(&self, patron_id: &PatronId, book_id: BookId) {
        let now = self.clock.now();
        match self
            .store
            .update_borrow_record_return_date(patron_id, book_id, now)
        {
            Ok(()) => {
                info!(patron = %patron_id, book = %book_id, "orphaned loan closed");
            }
            Err(e) => {
                error!(
                    patron = %patron_id,
                    book = %book_id,
                    error = %e,
                    "failed to close orphaned loan; record stays active without a copy taken"
                );
            }
        }
    }

    /// Takes back a copy from a patron and quotes the late fee.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::InvalidPatron`] - Patron id is not six digits.
    /// - [`LibraryError::InvalidBookId`] - Book id is zero.
    /// - [`LibraryError::BookNotFound`] / [`LibraryError::BookIdLooksLikeIsbn`] - No such book.
    /// - [`LibraryError::NoActiveLoan`] - Patron does not hold this book.
    /// - [`LibraryError::StorageFailure`] - Closing the record or restoring
    ///   availability failed. If closing failed, availability is untouched.
    pub fn return_book(&self, patron_id: &str, book_id: BookId) -> Result<ReturnReceipt, LibraryError> {
        self.try_return(patron_id, book_id)
            .inspect_err(|e| log_rejection("return", e))
    }

    fn try_return(&self, patron_id: &str, book_id: BookId) -> Result<ReturnReceipt, LibraryError> {
        let patron_id = PatronId::parse(patron_id)?;
        if book_id.0 == 0 {
            return Err(LibraryError::InvalidBookId);
        }

        let Some(book) = self.store.book_by_id(book_id).during("looking up book")? else {
            return Err(if book_id.looks_like_isbn() {
                LibraryError::BookIdLooksLikeIsbn
            } else {
                LibraryError::BookNotFound
            });
        };

        let record = self
            .store
            .active_borrow_record(&patron_id, book_id)
            .during("looking up borrow record")?
            .ok_or(LibraryError::NoActiveLoan)?;

        let now = self.clock.now();
        let fee = self.fees.quote(Some(record.due_date), now);

        self.store
            .update_borrow_record_return_date(&patron_id, book_id, now)
            .during("marking return")?;
        self.store
            .update_book_availability(book_id, 1)
            .during("updating book availability")?;

        info!(
            patron = %patron_id,
            book = %book_id,
            days_overdue = fee.days_overdue,
            fee = %fee.fee_amount,
            "book returned"
        );
        Ok(ReturnReceipt {
            book_id,
            title: book.title,
            returned_at: now,
            fee,
        })
    }
}
