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

//! Core identifier types for patrons, books, and payment transactions.
//!
//! Every identifier that arrives from outside the crate is parsed into one of
//! these newtypes before any storage access happens.

use crate::LibraryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Library card number of a patron.
///
/// Always exactly six ASCII digits. Leading zeros are significant, so the
/// value is kept as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatronId(String);

impl PatronId {
    pub const LEN: usize = 6;

    /// Parses a raw card number.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::InvalidPatron`] unless the input is exactly six digits.
    pub fn parse(raw: &str) -> Result<Self, LibraryError> {
        if raw.len() == Self::LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_owned()))
        } else {
            Err(LibraryError::InvalidPatron)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for PatronId {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PatronId {
    type Error = LibraryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PatronId> for String {
    fn from(value: PatronId) -> Self {
        value.0
    }
}

impl fmt::Display for PatronId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Catalog identifier of a book.
///
/// Wraps a `u64`. Zero is never assigned by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BookId(pub u64);

impl BookId {
    /// Parses a book id supplied as text (form fields, CSV cells).
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::InvalidBookId`] for anything that is not a
    /// positive integer.
    pub fn parse(raw: &str) -> Result<Self, LibraryError> {
        match raw.trim().parse::<u64>() {
            Ok(0) | Err(_) => Err(LibraryError::InvalidBookId),
            Ok(id) => Ok(Self(id)),
        }
    }

    /// A 13 digit book id is almost certainly an ISBN typed into the wrong field.
    pub(crate) fn looks_like_isbn(&self) -> bool {
        self.0.to_string().len() == Isbn::LEN
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ISBN-13 of a book. Exactly thirteen ASCII digits; no checksum validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct Isbn(String);

impl Isbn {
    pub const LEN: usize = 13;

    /// # Errors
    ///
    /// Returns [`LibraryError::InvalidIsbn`] unless the input is exactly 13 digits.
    pub fn parse(raw: &str) -> Result<Self, LibraryError> {
        if raw.len() == Self::LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw.to_owned()))
        } else {
            Err(LibraryError::InvalidIsbn)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Isbn {
    type Error = LibraryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Isbn> for String {
    fn from(value: Isbn) -> Self {
        value.0
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a charge held by the payment gateway.
///
/// The core never inspects the charge itself; it only checks the `txn_`
/// prefix and forwards the id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransactionRef(String);

impl TransactionRef {
    pub const PREFIX: &'static str = "txn_";

    /// # Errors
    ///
    /// Returns [`LibraryError::InvalidTransactionId`] when the id is empty or
    /// lacks the `txn_` prefix.
    pub fn parse(raw: &str) -> Result<Self, LibraryError> {
        if raw.starts_with(Self::PREFIX) {
            Ok(Self(raw.to_owned()))
        } else {
            Err(LibraryError::InvalidTransactionId)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TransactionRef {
    type Error = LibraryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TransactionRef> for String {
    fn from(value: TransactionRef) -> Self {
        value.0
    }
}

impl fmt::Display for TransactionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
