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

//! Circulation service.
//!
//! [`Library`] is the entry point for every operation the presentation layer
//! calls: catalog maintenance, borrow and return, patron status reports, and
//! late fee payment. Its collaborators are supplied at construction:
//!
//! - a [`LibraryStore`] for books and borrow records,
//! - a [`FeeCalculator`] for late fees,
//! - a [`Clock`] for "now",
//! - a [`LibraryConfig`] with the loan period and borrow limit.
//!
//! The payment gateway is passed per call because different front ends
//! charge through different processors.
//!
//! The operations themselves live next to their receipt types in
//! [`crate::catalog`], [`crate::circulation`], [`crate::status`], and
//! [`crate::payments`].

use crate::clock::{Clock, SystemClock};
use crate::config::LibraryConfig;
use crate::error::{ErrorKind, LibraryError};
use crate::fee::{FeeCalculator, TieredFeeSchedule};
use crate::store::{InMemoryStore, LibraryStore};
use std::sync::Arc;

/// Circulation service over a store, fee schedule, and clock.
///
/// # Invariants
///
/// - A book's available copies stay within `0..=total_copies`.
/// - A patron holds at most one active loan per book.
/// - A patron holding `max_active_loans` active loans cannot borrow again.
/// - Failed operations leave no partial mutation behind; a borrow whose
///   availability update fails closes the record it just created.
pub struct Library {
    pub(crate) store: Arc<dyn LibraryStore>,
    pub(crate) fees: Arc<dyn FeeCalculator>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: LibraryConfig,
}

impl Library {
    /// Creates a service over `store` with the standard fee schedule, the
    /// system clock, and the default policy.
    pub fn new(store: Arc<dyn LibraryStore>) -> Self {
        Self {
            store,
            fees: Arc::new(TieredFeeSchedule::new()),
            clock: Arc::new(SystemClock),
            config: LibraryConfig::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_fee_calculator(mut self, fees: Arc<dyn FeeCalculator>) -> Self {
        self.fees = fees;
        self
    }

    pub fn with_config(mut self, config: LibraryConfig) -> Self {
        self.config = config;
        self
    }
}

impl Default for Library {
    fn default() -> Self {
        Self::new(Arc::new(InMemoryStore::new()))
    }
}

/// Logs a failed operation at a level matching its cause.
pub(crate) fn log_rejection(operation: &'static str, error: &LibraryError) {
    match error.kind() {
        ErrorKind::Storage | ErrorKind::GatewayFault => {
            tracing::error!(operation, error = %error, "operation failed");
        }
        _ => tracing::warn!(operation, error = %error, "operation rejected"),
    }
}
