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

//! Payment gateway interface.
//!
//! The gateway distinguishes two kinds of failure:
//!
//! - a *reported* failure: the processor answered and refused (`success: false`);
//! - a *fault*: the processor could not be reached or broke mid-request,
//!   surfaced as `Err(GatewayFault)`.
//!
//! [`crate::Library`] maps each kind to its own error variant.

use crate::base::{PatronId, TransactionRef};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Transport or runtime failure inside the gateway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct GatewayFault(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentResponse {
    pub success: bool,
    /// Set only when `success` is true.
    pub transaction_id: Option<String>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefundResponse {
    pub success: bool,
    pub message: String,
}

pub trait PaymentGateway: Send + Sync {
    /// Charges `amount` to the patron.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayFault`] when the charge could not be attempted.
    fn process_payment(
        &self,
        patron_id: &PatronId,
        amount: Decimal,
        description: &str,
    ) -> Result<PaymentResponse, GatewayFault>;

    /// Returns `amount` of a previous charge.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayFault`] when the refund could not be attempted.
    fn refund_payment(
        &self,
        transaction_id: &TransactionRef,
        amount: Decimal,
    ) -> Result<RefundResponse, GatewayFault>;
}

/// Charge recorded by [`SimulatedGateway`].
#[derive(Debug, Clone, PartialEq, Eq)]
struct Charge {
    patron_id: PatronId,
    amount: Decimal,
    refunded: Decimal,
}

/// In-process gateway for development and the CLI.
///
/// Charges always succeed and are remembered; refunds succeed only against a
/// known charge and never beyond the amount charged.
#[derive(Debug, Default)]
pub struct SimulatedGateway {
    charges: DashMap<String, Charge>,
    next_id: AtomicU64,
}

impl SimulatedGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PaymentGateway for SimulatedGateway {
    fn process_payment(
        &self,
        patron_id: &PatronId,
        amount: Decimal,
        description: &str,
    ) -> Result<PaymentResponse, GatewayFault> {
        if amount <= Decimal::ZERO {
            return Ok(PaymentResponse {
                success: false,
                transaction_id: None,
                message: "Invalid amount".to_owned(),
            });
        }

        let seq = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let transaction_id = format!("{}{patron_id}_{seq:06}", TransactionRef::PREFIX);
        self.charges.insert(
            transaction_id.clone(),
            Charge {
                patron_id: patron_id.clone(),
                amount,
                refunded: Decimal::ZERO,
            },
        );
        tracing::debug!(%patron_id, %amount, description, txn = %transaction_id, "charge accepted");

        Ok(PaymentResponse {
            success: true,
            transaction_id: Some(transaction_id),
            message: format!("Charged ${:.2}.", amount),
        })
    }

    fn refund_payment(
        &self,
        transaction_id: &TransactionRef,
        amount: Decimal,
    ) -> Result<RefundResponse, GatewayFault> {
        let Some(mut charge) = self.charges.get_mut(transaction_id.as_str()) else {
            return Ok(RefundResponse {
                success: false,
                message: "Unknown transaction".to_owned(),
            });
        };

        if charge.refunded + amount > charge.amount {
            return Ok(RefundResponse {
                success: false,
                message: "Refund exceeds original charge".to_owned(),
            });
        }
        charge.refunded += amount;
        tracing::debug!(patron_id = %charge.patron_id, %amount, txn = %transaction_id, "refund accepted");

        Ok(RefundResponse {
            success: true,
            message: format!("Refund of ${:.2} processed successfully.", amount),
        })
    }
}
