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

//! Patron status reports.

use crate::Library;
use crate::base::{BookId, Isbn, PatronId};
use crate::error::{LibraryError, StoreResultExt};
use crate::library::log_rejection;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

/// An outstanding loan with its fee as of the report instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentLoan {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub is_overdue: bool,
    pub days_overdue: i64,
    pub current_fee: Decimal,
}

/// One loan in a patron's history. Fees are evaluated at the return date for
/// closed loans and at the report instant for active ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: Isbn,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
    pub days_overdue_at_end: i64,
    pub late_fee_at_end: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatronStatus {
    pub patron_id: PatronId,
    pub generated_at: DateTime<Utc>,
    pub current_loans: Vec<CurrentLoan>,
    pub current_count: usize,
    /// Sum of `current_fee` over active loans, rounded to cents.
    pub total_late_fees: Decimal,
    /// Newest borrow first.
    pub history: Vec<HistoryEntry>,
}

impl Library {
    /// Builds the status report for a patron as of now.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::InvalidPatron`] - Patron id is not six digits.
    /// - [`LibraryError::StorageFailure`] - Store failed.
    pub fn patron_status(&self, patron_id: &str) -> Result<PatronStatus, LibraryError> {
        self.try_patron_status(patron_id)
            .inspect_err(|e| log_rejection("patron_status", e))
    }

    fn try_patron_status(&self, patron_id: &str) -> Result<PatronStatus, LibraryError> {
        let patron_id = PatronId::parse(patron_id)?;
        let now = self.clock.now();

        let current_loans: Vec<CurrentLoan> = self
            .store
            .active_borrows_by_patron(&patron_id)
            .during("loading active loans")?
            .into_iter()
            .map(|entry| {
                let fee = self.fees.quote(Some(entry.record.due_date), now);
                CurrentLoan {
                    book_id: entry.record.book_id,
                    title: entry.title,
                    author: entry.author,
                    borrow_date: entry.record.borrow_date,
                    due_date: entry.record.due_date,
                    is_overdue: fee.is_overdue(),
                    days_overdue: fee.days_overdue,
                    current_fee: fee.fee_amount,
                }
            })
            .collect();

        let total_late_fees = current_loans
            .iter()
            .map(|loan| loan.current_fee)
            .sum::<Decimal>()
            .round_dp(2);

        let mut history: Vec<HistoryEntry> = self
            .store
            .borrow_history_by_patron(&patron_id)
            .during("loading borrow history")?
            .into_iter()
            .map(|entry| {
                let record = entry.record;
                let fee = self.fees.quote(Some(record.due_date), record.settled_at(now));
                HistoryEntry {
                    book_id: record.book_id,
                    title: entry.title,
                    author: entry.author,
                    isbn: entry.isbn,
                    borrow_date: record.borrow_date,
                    due_date: record.due_date,
                    return_date: record.return_date,
                    days_overdue_at_end: fee.days_overdue,
                    late_fee_at_end: fee.fee_amount,
                }
            })
            .collect();
        // Newest borrow first, whatever order the store returned.
        history.sort_by(|a, b| b.borrow_date.cmp(&a.borrow_date));

        tracing::debug!(patron = %patron_id, loans = current_loans.len(), "status report built");
        Ok(PatronStatus {
            patron_id,
            generated_at: now,
            current_count: current_loans.len(),
            current_loans,
            total_late_fees,
            history,
        })
    }
}
