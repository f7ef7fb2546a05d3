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

//! # Library Circulation
//!
//! This library provides the circulation core of a library-management
//! backend: lending books to patrons, taking them back, computing tiered late
//! fees, reporting patron status, and charging or refunding late fees
//! through an external payment gateway.
//!
//! ## Core Components
//!
//! - [`Library`]: Circulation service; every operation is a method on it
//! - [`LibraryStore`]: Data access seam, with [`InMemoryStore`] bundled
//! - [`PaymentGateway`]: Payment processor seam, with [`SimulatedGateway`] bundled
//! - [`calculate_late_fee`]: Pure late fee computation
//! - [`LibraryError`]: Error type for every operation
//! - [`Outcome`] / [`StatusView`]: Adapters for the presentation layer
//!
//! ## Example
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use library_circulation_rs::{InMemoryStore, Library, ManualClock};
//! use rust_decimal_macros::dec;
//! use std::sync::Arc;
//!
//! let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()));
//! let library = Library::new(Arc::new(InMemoryStore::new())).with_clock(clock.clone());
//!
//! let book = library.add_book("Dune", "Frank Herbert", "9780441172719", 2).unwrap().book;
//! library.borrow_book("123456", book.id).unwrap();
//!
//! // Returned ten days after the due date.
//! clock.advance(Duration::days(24));
//! let receipt = library.return_book("123456", book.id).unwrap();
//! assert_eq!(receipt.fee.fee_amount, dec!(6.50));
//! ```
//!
//! ## Concurrency
//!
//! Operations are synchronous and take no locks of their own. Consistency
//! under concurrent use relies on the store applying each call atomically;
//! the gap between checking availability and taking a copy is not guarded.

mod base;
mod book;
pub mod catalog;
pub mod circulation;
mod clock;
pub mod config;
pub mod error;
mod fee;
pub mod gateway;
mod library;
mod loan;
pub mod payments;
pub mod presentation;
pub mod status;
pub mod store;

pub use base::{BookId, Isbn, PatronId, TransactionRef};
pub use book::{Book, NewBook};
pub use catalog::{AddBookReceipt, SearchType, UnknownSearchType};
pub use circulation::{BorrowReceipt, ReturnReceipt};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, LibraryConfig, MAX_LOAN_PERIOD_DAYS};
pub use error::{ErrorKind, LibraryError};
pub use fee::{FeeCalculator, FeeQuote, FeeStatus, TieredFeeSchedule, calculate_late_fee};
pub use gateway::{GatewayFault, PaymentGateway, PaymentResponse, RefundResponse, SimulatedGateway};
pub use library::Library;
pub use loan::{BorrowRecord, LoanEntry, RecordId};
pub use payments::{PaymentReceipt, RefundReceipt};
pub use presentation::{Outcome, Receipt, StatusView};
pub use status::{CurrentLoan, HistoryEntry, PatronStatus};
pub use store::{InMemoryStore, LibraryStore, StoreError};
