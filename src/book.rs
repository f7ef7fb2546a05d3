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

//! Catalog entries.

use crate::LibraryError;
use crate::base::{BookId, Isbn};
use serde::{Deserialize, Serialize};

/// A title in the catalog together with its copy counts.
///
/// `available_copies` moves down on borrow and up on return and always stays
/// within `0..=total_copies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    pub isbn: Isbn,
    pub total_copies: u32,
    pub available_copies: u32,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}

/// Validated input for a catalog insert. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub isbn: Isbn,
    pub total_copies: u32,
}

impl NewBook {
    pub const MAX_TITLE_CHARS: usize = 200;
    pub const MAX_AUTHOR_CHARS: usize = 100;

    /// Validates raw catalog input. Title and author are trimmed.
    ///
    /// Checks run in a fixed order and the first failure is reported:
    /// title, author, ISBN, copy count.
    ///
    /// # Errors
    ///
    /// - [`LibraryError::MissingTitle`] / [`LibraryError::TitleTooLong`]
    /// - [`LibraryError::MissingAuthor`] / [`LibraryError::AuthorTooLong`]
    /// - [`LibraryError::InvalidIsbn`]
    /// - [`LibraryError::InvalidCopies`]
    pub fn validate(
        title: &str,
        author: &str,
        isbn: &str,
        total_copies: i64,
    ) -> Result<Self, LibraryError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(LibraryError::MissingTitle);
        }
        if title.chars().count() > Self::MAX_TITLE_CHARS {
            return Err(LibraryError::TitleTooLong);
        }

        let author = author.trim();
        if author.is_empty() {
            return Err(LibraryError::MissingAuthor);
        }
        if author.chars().count() > Self::MAX_AUTHOR_CHARS {
            return Err(LibraryError::AuthorTooLong);
        }

        let isbn = Isbn::parse(isbn)?;

        let total_copies = u32::try_from(total_copies)
            .ok()
            .filter(|copies| *copies > 0)
            .ok_or(LibraryError::InvalidCopies)?;

        Ok(Self {
            title: title.to_owned(),
            author: author.to_owned(),
            isbn,
            total_copies,
        })
    }

    /// Materializes the entry with every copy on the shelf.
    pub fn into_book(self, id: BookId) -> Book {
        Book {
            id,
            title: self.title,
            author: self.author,
            isbn: self.isbn,
            total_copies: self.total_copies,
            available_copies: self.total_copies,
        }
    }
}
