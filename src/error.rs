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

//! Error types for circulation, catalog, and fee operations.

use crate::store::StoreError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Broad failure categories used by the presentation layer to pick a
/// response (bad request, not found, conflict, server error, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed input, rejected before any mutation.
    Validation,
    /// A referenced book or active loan does not exist.
    NotFound,
    /// Well-formed request that library policy forbids.
    BusinessRule,
    /// The data access layer reported a failure.
    Storage,
    /// The payment gateway answered and refused the request.
    GatewayDeclined,
    /// The payment gateway could not be reached or failed internally.
    GatewayFault,
}

/// Library operation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LibraryError {
    /// Patron id is not exactly six digits
    #[error("invalid patron ID (must be exactly 6 digits)")]
    InvalidPatron,

    /// Book id is not a positive integer
    #[error("invalid book ID")]
    InvalidBookId,

    /// Title is empty or whitespace
    #[error("title is required")]
    MissingTitle,

    /// Title longer than 200 characters
    #[error("title must be less than 200 characters")]
    TitleTooLong,

    /// Author is empty or whitespace
    #[error("author is required")]
    MissingAuthor,

    /// Author longer than 100 characters
    #[error("author must be less than 100 characters")]
    AuthorTooLong,

    /// ISBN is not exactly thirteen digits
    #[error("ISBN must be exactly 13 digits")]
    InvalidIsbn,

    /// Copy count is zero or negative
    #[error("total copies must be a positive integer")]
    InvalidCopies,

    /// Another book already carries this ISBN
    #[error("a book with this ISBN already exists")]
    DuplicateIsbn,

    /// Referenced book does not exist
    #[error("book not found")]
    BookNotFound,

    /// Referenced book does not exist and the id has the shape of an ISBN
    #[error("book not found by ID (the value looks like an ISBN)")]
    BookIdLooksLikeIsbn,

    /// No copies left to lend
    #[error("this book is currently not available")]
    BookUnavailable,

    /// Patron already holds the maximum number of active loans
    #[error("maximum borrowing limit of {limit} books reached")]
    BorrowLimitExceeded { limit: usize },

    /// Patron already has this book checked out
    #[error("patron already has this book checked out")]
    DuplicateActiveLoan,

    /// Configured loan period puts the due date outside the calendar
    #[error("loan period of {days} days gives no valid due date")]
    DueDateOutOfRange { days: i64 },

    /// Return or payment refers to a loan that is not outstanding
    #[error("no active borrow record found for this patron and book")]
    NoActiveLoan,

    /// The loan backing a fee quote could not be loaded
    #[error("unable to calculate late fees")]
    FeeUnavailable,

    /// Fee quote is zero
    #[error("no late fees to pay for this book")]
    NoFeeDue,

    /// Transaction id is empty or lacks the `txn_` prefix
    #[error("invalid transaction ID")]
    InvalidTransactionId,

    /// Refund amount is zero or negative
    #[error("refund amount must be greater than 0")]
    InvalidAmount,

    /// Refund amount is above the largest fee a loan can accrue
    #[error("refund amount exceeds maximum late fee of {max}")]
    AmountExceedsMax { max: Decimal },

    /// Gateway processed the charge and refused it
    #[error("payment failed: {0}")]
    PaymentDeclined(String),

    /// Gateway failed while charging
    #[error("payment processing error: {0}")]
    PaymentError(String),

    /// Gateway processed the refund and refused it
    #[error("refund failed: {0}")]
    RefundDeclined(String),

    /// Gateway failed while refunding
    #[error("refund processing error: {0}")]
    RefundError(String),

    /// The data access layer reported a failure
    #[error("database error occurred while {operation}")]
    StorageFailure {
        operation: &'static str,
        #[source]
        source: StoreError,
    },
}

impl LibraryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidPatron
            | Self::InvalidBookId
            | Self::MissingTitle
            | Self::TitleTooLong
            | Self::MissingAuthor
            | Self::AuthorTooLong
            | Self::InvalidIsbn
            | Self::InvalidCopies
            | Self::InvalidTransactionId
            | Self::InvalidAmount => ErrorKind::Validation,
            Self::BookNotFound | Self::BookIdLooksLikeIsbn | Self::NoActiveLoan => {
                ErrorKind::NotFound
            }
            Self::DuplicateIsbn
            | Self::BookUnavailable
            | Self::BorrowLimitExceeded { .. }
            | Self::DuplicateActiveLoan
            | Self::DueDateOutOfRange { .. }
            | Self::NoFeeDue
            | Self::AmountExceedsMax { .. } => ErrorKind::BusinessRule,
            Self::FeeUnavailable | Self::StorageFailure { .. } => ErrorKind::Storage,
            Self::PaymentDeclined(_) | Self::RefundDeclined(_) => ErrorKind::GatewayDeclined,
            Self::PaymentError(_) | Self::RefundError(_) => ErrorKind::GatewayFault,
        }
    }
}

/// Attaches the name of the failing step to a storage error.
pub(crate) trait StoreResultExt<T> {
    fn during(self, operation: &'static str) -> Result<T, LibraryError>;
}

impl<T> StoreResultExt<T> for Result<T, StoreError> {
    fn during(self, operation: &'static str) -> Result<T, LibraryError> {
        self.map_err(|source| LibraryError::StorageFailure { operation, source })
    }
}
