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

//! Adapters for the presentation layer.
//!
//! The core returns typed results. Front ends that expect the flat
//! `(success, message, transaction_id)` shape use [`Outcome`]; templates that
//! expect the status report under their own field names use [`StatusView`].

use crate::base::PatronId;
use crate::error::LibraryError;
use crate::status::{CurrentLoan, HistoryEntry, PatronStatus};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt::Display;

/// A successful operation result that can be shown to a patron.
pub trait Receipt: Display {
    /// Gateway transaction created by the operation, if any.
    fn transaction_id(&self) -> Option<&str> {
        None
    }
}

/// Flattened operation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub success: bool,
    pub message: String,
    pub transaction_id: Option<String>,
}

impl<T: Receipt> From<Result<T, LibraryError>> for Outcome {
    fn from(result: Result<T, LibraryError>) -> Self {
        match result {
            Ok(receipt) => Self {
                success: true,
                message: receipt.to_string(),
                transaction_id: receipt.transaction_id().map(str::to_owned),
            },
            Err(error) => Self {
                success: false,
                message: error.to_string(),
                transaction_id: None,
            },
        }
    }
}

/// [`PatronStatus`] under the field names used by the patron status page.
#[derive(Debug, Serialize)]
pub struct StatusView<'a> {
    pub patron_id: &'a PatronId,
    pub currently_borrowed: &'a [CurrentLoan],
    pub current_borrow_count: usize,
    pub total_late_fees_owed: Decimal,
    pub history: &'a [HistoryEntry],
}

impl<'a> From<&'a PatronStatus> for StatusView<'a> {
    fn from(status: &'a PatronStatus) -> Self {
        Self {
            patron_id: &status.patron_id,
            currently_borrowed: &status.current_loans,
            current_borrow_count: status.current_count,
            total_late_fees_owed: status.total_late_fees,
            history: &status.history,
        }
    }
}
