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

//! Late fee payment and refund through a [`PaymentGateway`].
//!
//! The gateway is only contacted after every local check passes, so a
//! request with nothing to charge or a malformed refund never reaches the
//! processor.

use crate::Library;
use crate::base::{BookId, PatronId, TransactionRef};
use crate::error::{LibraryError, StoreResultExt};
use crate::gateway::PaymentGateway;
use crate::library::log_rejection;
use crate::presentation::Receipt;
use rust_decimal::Decimal;
use std::fmt;
use tracing::{error, info};

/// Successful late fee charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub transaction_id: Option<String>,
    pub amount: Decimal,
    /// Message reported by the gateway.
    pub message: String,
}

impl fmt::Display for PaymentReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Payment successful! {}", self.message)
    }
}

impl Receipt for PaymentReceipt {
    fn transaction_id(&self) -> Option<&str> {
        self.transaction_id.as_deref()
    }
}

/// Successful refund. Displays the gateway's message unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundReceipt {
    pub transaction_id: TransactionRef,
    pub amount: Decimal,
    pub message: String,
}

impl fmt::Display for RefundReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Receipt for RefundReceipt {}

impl Library {
    /// Charges the current late fee of an active loan.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::InvalidPatron`] - Patron id is not six digits.
    /// - [`LibraryError::FeeUnavailable`] - The loan could not be loaded.
    /// - [`LibraryError::NoFeeDue`] - Nothing to charge; the gateway is not called.
    /// - [`LibraryError::BookNotFound`] - Book vanished from the catalog.
    /// - [`LibraryError::PaymentDeclined`] - Gateway refused the charge.
    /// - [`LibraryError::PaymentError`] - Gateway faulted.
    pub fn pay_late_fees(
        &self,
        patron_id: &str,
        book_id: BookId,
        gateway: &dyn PaymentGateway,
    ) -> Result<PaymentReceipt, LibraryError> {
        self.try_pay(patron_id, book_id, gateway)
            .inspect_err(|e| log_rejection("pay_late_fees", e))
    }

    fn try_pay(
        &self,
        patron_id: &str,
        book_id: BookId,
        gateway: &dyn PaymentGateway,
    ) -> Result<PaymentReceipt, LibraryError> {
        let patron_id = PatronId::parse(patron_id)?;

        // Without an active loan there is no due date, and the quote is zero.
        let record = self
            .store
            .active_borrow_record(&patron_id, book_id)
            .map_err(|e| {
                error!(patron = %patron_id, book = %book_id, error = %e, "cannot load loan for fee quote");
                LibraryError::FeeUnavailable
            })?;
        let fee = self
            .fees
            .quote(record.map(|r| r.due_date), self.clock.now());
        if fee.fee_amount <= Decimal::ZERO {
            return Err(LibraryError::NoFeeDue);
        }

        let book = self
            .store
            .book_by_id(book_id)
            .during("looking up book")?
            .ok_or(LibraryError::BookNotFound)?;
        let description = format!("Late fees for '{}'", book.title);

        let response = gateway
            .process_payment(&patron_id, fee.fee_amount, &description)
            .map_err(|fault| LibraryError::PaymentError(fault.0))?;
        if !response.success {
            return Err(LibraryError::PaymentDeclined(response.message));
        }

        info!(
            patron = %patron_id,
            book = %book_id,
            amount = %fee.fee_amount,
            txn = response.transaction_id.as_deref().unwrap_or("-"),
            "late fee paid"
        );
        Ok(PaymentReceipt {
            transaction_id: response.transaction_id,
            amount: fee.fee_amount,
            message: response.message,
        })
    }

    /// Refunds part or all of a late fee charge.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::InvalidTransactionId`] - Empty or not prefixed `txn_`.
    /// - [`LibraryError::InvalidAmount`] - Amount is zero or negative.
    /// - [`LibraryError::AmountExceedsMax`] - Amount above the largest possible fee.
    /// - [`LibraryError::RefundDeclined`] - Gateway refused the refund.
    /// - [`LibraryError::RefundError`] - Gateway faulted.
    pub fn refund_late_fee_payment(
        &self,
        transaction_id: &str,
        amount: Decimal,
        gateway: &dyn PaymentGateway,
    ) -> Result<RefundReceipt, LibraryError> {
        self.try_refund(transaction_id, amount, gateway)
            .inspect_err(|e| log_rejection("refund_late_fee_payment", e))
    }

    fn try_refund(
        &self,
        transaction_id: &str,
        amount: Decimal,
        gateway: &dyn PaymentGateway,
    ) -> Result<RefundReceipt, LibraryError> {
        let transaction_id = TransactionRef::parse(transaction_id)?;
        if amount <= Decimal::ZERO {
            return Err(LibraryError::InvalidAmount);
        }
        let max = self.fees.max_fee();
        if amount > max {
            return Err(LibraryError::AmountExceedsMax { max });
        }

        let response = gateway
            .refund_payment(&transaction_id, amount)
            .map_err(|fault| LibraryError::RefundError(fault.0))?;
        if !response.success {
            return Err(LibraryError::RefundDeclined(response.message));
        }

        info!(txn = %transaction_id, %amount, "late fee refunded");
        Ok(RefundReceipt {
            transaction_id,
            amount,
            message: response.message,
        })
    }
}
