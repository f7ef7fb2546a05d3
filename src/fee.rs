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

//! Late fee computation.
//!
//! Fees accrue per whole day past the due date:
//!
//! | Overdue days | Rate      |
//! |--------------|-----------|
//! | 1 – 7        | 0.50/day  |
//! | 8 and later  | 1.00/day  |
//!
//! The total is capped at 15.00 per loan. Quotes are pure functions of the
//! due date and the evaluation instant; callers pass "now" in.
//!
//! # Example
//!
//! ```
//! use chrono::{Duration, TimeZone, Utc};
//! use library_circulation_rs::calculate_late_fee;
//! use rust_decimal_macros::dec;
//!
//! let due = Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap();
//! let quote = calculate_late_fee(Some(due), due + Duration::days(10));
//! assert_eq!(quote.days_overdue, 10);
//! assert_eq!(quote.fee_amount, dec!(6.50));
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeStatus {
    Ok,
}

/// Fee owed for one loan at one instant. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeeQuote {
    pub fee_amount: Decimal,
    pub days_overdue: i64,
    pub status: FeeStatus,
}

impl FeeQuote {
    pub const ZERO: FeeQuote = FeeQuote {
        fee_amount: Decimal::ZERO,
        days_overdue: 0,
        status: FeeStatus::Ok,
    };

    pub fn is_overdue(&self) -> bool {
        self.days_overdue > 0
    }
}

/// Computes late fees. Injected into [`crate::Library`] so tests and
/// alternative policies can replace the default schedule.
pub trait FeeCalculator: Send + Sync {
    /// Quotes the fee for a loan due at `due`, evaluated at `at`.
    ///
    /// A missing due date yields a zero quote.
    fn quote(&self, due: Option<DateTime<Utc>>, at: DateTime<Utc>) -> FeeQuote;

    /// Largest fee a single loan can accrue. Refunds above it are rejected.
    fn max_fee(&self) -> Decimal;
}

/// Two-tier daily rate with a cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TieredFeeSchedule {
    /// Days billed at `first_tier_rate` before `second_tier_rate` applies.
    pub first_tier_days: i64,
    pub first_tier_rate: Decimal,
    pub second_tier_rate: Decimal,
    pub cap: Decimal,
}

impl TieredFeeSchedule {
    const DECIMAL_PRECISION: u32 = 2;

    pub const fn new() -> Self {
        Self {
            first_tier_days: 7,
            first_tier_rate: dec!(0.50),
            second_tier_rate: dec!(1.00),
            cap: dec!(15.00),
        }
    }

    /// Whole days between `due` and `at`, truncated toward zero and floored at 0.
    fn days_overdue(due: DateTime<Utc>, at: DateTime<Utc>) -> i64 {
        (at - due).num_days().max(0)
    }

    fn fee_for(&self, days_overdue: i64) -> Decimal {
        let first = days_overdue.min(self.first_tier_days);
        let rest = (days_overdue - self.first_tier_days).max(0);
        let fee = Decimal::from(first) * self.first_tier_rate
            + Decimal::from(rest) * self.second_tier_rate;
        fee.min(self.cap).round_dp(Self::DECIMAL_PRECISION)
    }
}

impl Default for TieredFeeSchedule {
    fn default() -> Self {
        Self::new()
    }
}

impl FeeCalculator for TieredFeeSchedule {
    fn quote(&self, due: Option<DateTime<Utc>>, at: DateTime<Utc>) -> FeeQuote {
        let Some(due) = due else {
            return FeeQuote::ZERO;
        };
        let days_overdue = Self::days_overdue(due, at);
        FeeQuote {
            fee_amount: self.fee_for(days_overdue),
            days_overdue,
            status: FeeStatus::Ok,
        }
    }

    fn max_fee(&self) -> Decimal {
        self.cap
    }
}

/// Quotes a late fee with the default [`TieredFeeSchedule`].
pub fn calculate_late_fee(due: Option<DateTime<Utc>>, at: DateTime<Utc>) -> FeeQuote {
    TieredFeeSchedule::new().quote(due, at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 15, 9, 0, 0).unwrap()
    }

    #[test]
    fn no_due_date_is_free() {
        assert_eq!(calculate_late_fee(None, due()), FeeQuote::ZERO);
    }

    #[test]
    fn before_or_at_due_date_is_free() {
        let quote = calculate_late_fee(Some(due()), due() - Duration::days(3));
        assert_eq!(quote.fee_amount, Decimal::ZERO);
        assert_eq!(quote.days_overdue, 0);

        let quote = calculate_late_fee(Some(due()), due());
        assert_eq!(quote, FeeQuote::ZERO);
    }

    #[test]
    fn partial_days_are_truncated() {
        let quote = calculate_late_fee(Some(due()), due() + Duration::hours(23));
        assert_eq!(quote.days_overdue, 0);
        assert_eq!(quote.fee_amount, Decimal::ZERO);

        let quote = calculate_late_fee(Some(due()), due() + Duration::hours(47));
        assert_eq!(quote.days_overdue, 1);
        assert_eq!(quote.fee_amount, dec!(0.50));
    }

    #[test]
    fn first_tier_boundary() {
        let quote = calculate_late_fee(Some(due()), due() + Duration::days(7));
        assert_eq!(quote.fee_amount, dec!(3.50));

        let quote = calculate_late_fee(Some(due()), due() + Duration::days(8));
        assert_eq!(quote.fee_amount, dec!(4.50));
    }

    #[test]
    fn ten_days_overdue() {
        let quote = calculate_late_fee(Some(due()), due() + Duration::days(10));
        assert_eq!(quote.days_overdue, 10);
        assert_eq!(quote.fee_amount, dec!(6.50));
        assert!(quote.is_overdue());
    }

    #[test]
    fn fee_is_capped() {
        // 3.50 + 11.00 = 14.50 just under the cap.
        let quote = calculate_late_fee(Some(due()), due() + Duration::days(18));
        assert_eq!(quote.fee_amount, dec!(14.50));

        let quote = calculate_late_fee(Some(due()), due() + Duration::days(19));
        assert_eq!(quote.fee_amount, dec!(15.00));

        let quote = calculate_late_fee(Some(due()), due() + Duration::days(40));
        assert_eq!(quote.days_overdue, 40);
        assert_eq!(quote.fee_amount, dec!(15.00));
    }

    #[test]
    fn custom_schedule() {
        let schedule = TieredFeeSchedule {
            first_tier_days: 2,
            first_tier_rate: dec!(0.25),
            second_tier_rate: dec!(2.00),
            cap: dec!(5.00),
        };
        let quote = schedule.quote(Some(due()), due() + Duration::days(3));
        assert_eq!(quote.fee_amount, dec!(2.50));
        assert_eq!(schedule.max_fee(), dec!(5.00));
    }
}
