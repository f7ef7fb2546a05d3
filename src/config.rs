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

//! Circulation policy settings.
//!
//! Loaded from environment variables with the library's standard policy as
//! defaults:
//!
//! | Variable                    | Default |
//! |-----------------------------|---------|
//! | `LIBRARY_LOAN_PERIOD_DAYS`  | 14      |
//! | `LIBRARY_MAX_ACTIVE_LOANS`  | 5       |
//!
//! The loan period is capped at [`MAX_LOAN_PERIOD_DAYS`].

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Variable is set but does not parse as a positive integer
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidValue { name: &'static str, value: String },
    /// Value parses but exceeds the allowed maximum
    #[error("{name} must be at most {max}, got {value}")]
    OutOfRange {
        name: &'static str,
        value: String,
        max: u64,
    },
}

/// Longest loan period accepted, ten years.
pub const MAX_LOAN_PERIOD_DAYS: i64 = 3650;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Days between borrow date and due date.
    pub loan_period_days: i64,
    /// Active loans a patron may hold. A borrow is refused once the patron
    /// already holds this many.
    pub max_active_loans: usize,
}

impl LibraryConfig {
    pub const LOAN_PERIOD_VAR: &'static str = "LIBRARY_LOAN_PERIOD_DAYS";
    pub const MAX_ACTIVE_LOANS_VAR: &'static str = "LIBRARY_MAX_ACTIVE_LOANS";

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a variable is set to
    /// something other than a positive integer, and
    /// [`ConfigError::OutOfRange`] when the loan period exceeds
    /// [`MAX_LOAN_PERIOD_DAYS`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            loan_period_days: parse_positive(
                Self::LOAN_PERIOD_VAR,
                lookup(Self::LOAN_PERIOD_VAR),
                defaults.loan_period_days,
            )?,
            max_active_loans: parse_positive(
                Self::MAX_ACTIVE_LOANS_VAR,
                lookup(Self::MAX_ACTIVE_LOANS_VAR),
                defaults.max_active_loans,
            )?,
        };
        if config.loan_period_days > MAX_LOAN_PERIOD_DAYS {
            return Err(ConfigError::OutOfRange {
                name: Self::LOAN_PERIOD_VAR,
                value: config.loan_period_days.to_string(),
                max: MAX_LOAN_PERIOD_DAYS as u64,
            });
        }
        Ok(config)
    }

    /// Checks a configuration assembled outside [`from_env`](Self::from_env),
    /// such as one carrying command-line overrides.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] for a non-positive value,
    /// [`ConfigError::OutOfRange`] for a loan period above
    /// [`MAX_LOAN_PERIOD_DAYS`].
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.loan_period_days <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "loan_period_days",
                value: self.loan_period_days.to_string(),
            });
        }
        if self.loan_period_days > MAX_LOAN_PERIOD_DAYS {
            return Err(ConfigError::OutOfRange {
                name: "loan_period_days",
                value: self.loan_period_days.to_string(),
                max: MAX_LOAN_PERIOD_DAYS as u64,
            });
        }
        if self.max_active_loans == 0 {
            return Err(ConfigError::InvalidValue {
                name: "max_active_loans",
                value: "0".to_owned(),
            });
        }
        Ok(self)
    }
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            loan_period_days: 14,
            max_active_loans: 5,
        }
    }
}

fn parse_positive<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::InvalidValue { name, value: raw }),
    }
}
