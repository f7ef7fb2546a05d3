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

//! Borrow records.
//!
//! A record is created on borrow and closed on return; it is never deleted.
//!
//! ```text
//! Active (return_date = None) ──return──► Closed (return_date = Some(t))
//! ```

use crate::base::{BookId, Isbn, PatronId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier of a borrow record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRecord {
    pub id: RecordId,
    pub patron_id: PatronId,
    pub book_id: BookId,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub return_date: Option<DateTime<Utc>>,
}

impl BorrowRecord {
    pub fn is_active(&self) -> bool {
        self.return_date.is_none()
    }

    /// Instant at which fees stop accruing: the return date for closed
    /// records, otherwise `now`.
    pub fn settled_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.return_date.unwrap_or(now)
    }
}

/// A borrow record joined with the descriptive fields of its book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanEntry {
    pub record: BorrowRecord,
    pub title: String,
    pub author: String,
    pub isbn: Isbn,
}
