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

//! Catalog maintenance and search.

use crate::Library;
use crate::book::{Book, NewBook};
use crate::error::{LibraryError, StoreResultExt};
use crate::library::log_rejection;
use crate::presentation::Receipt;
use crate::store::StoreError;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Successful catalog insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddBookReceipt {
    pub book: Book,
}

impl fmt::Display for AddBookReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Book \"{}\" has been successfully added to the catalog.",
            self.book.title
        )
    }
}

impl Receipt for AddBookReceipt {}

/// Field a catalog search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    /// Partial, case-insensitive.
    Title,
    /// Partial, case-insensitive.
    Author,
    /// Exact.
    Isbn,
}

/// Search type other than `title`, `author`, or `isbn`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown search type {0:?}")]
pub struct UnknownSearchType(pub String);

impl FromStr for SearchType {
    type Err = UnknownSearchType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "isbn" => Ok(Self::Isbn),
            _ => Err(UnknownSearchType(s.to_owned())),
        }
    }
}

impl Library {
    /// Adds a title to the catalog with every copy available.
    ///
    /// All field checks run before the store is touched (see
    /// [`NewBook::validate`]).
    ///
    /// # Errors
    ///
    /// - Field validation errors from [`NewBook::validate`].
    /// - [`LibraryError::DuplicateIsbn`] - ISBN already catalogued.
    /// - [`LibraryError::StorageFailure`] - Store failed.
    pub fn add_book(
        &self,
        title: &str,
        author: &str,
        isbn: &str,
        total_copies: i64,
    ) -> Result<AddBookReceipt, LibraryError> {
        self.try_add_book(title, author, isbn, total_copies)
            .inspect_err(|e| log_rejection("add_book", e))
    }

    fn try_add_book(
        &self,
        title: &str,
        author: &str,
        isbn: &str,
        total_copies: i64,
    ) -> Result<AddBookReceipt, LibraryError> {
        let new_book = NewBook::validate(title, author, isbn, total_copies)?;

        if self
            .store
            .book_by_isbn(&new_book.isbn)
            .during("checking for duplicate ISBN")?
            .is_some()
        {
            return Err(LibraryError::DuplicateIsbn);
        }

        let book = match self.store.insert_book(new_book) {
            Ok(book) => book,
            // Lost a race with a concurrent insert of the same ISBN.
            Err(StoreError::Conflict(_)) => return Err(LibraryError::DuplicateIsbn),
            Err(source) => {
                return Err(LibraryError::StorageFailure {
                    operation: "adding the book",
                    source,
                });
            }
        };

        info!(book = %book.id, isbn = %book.isbn, copies = book.total_copies, "book added");
        Ok(AddBookReceipt { book })
    }

    /// All books, ordered by title.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::StorageFailure`] if the store fails.
    pub fn catalog(&self) -> Result<Vec<Book>, LibraryError> {
        let mut books = self.store.all_books().during("listing books")?;
        books.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(books)
    }

    /// Searches the catalog.
    ///
    /// `search_type` is `title`, `author`, or `isbn` (case-insensitive). Title
    /// and author match any substring ignoring case, and an empty term
    /// returns every book. ISBN matches only the exact value. An unknown
    /// search type matches nothing.
    ///
    /// # Errors
    ///
    /// Returns [`LibraryError::StorageFailure`] if the store fails.
    pub fn search_catalog(&self, term: &str, search_type: &str) -> Result<Vec<Book>, LibraryError> {
        let search_type = match search_type.parse::<SearchType>() {
            Ok(search_type) => search_type,
            Err(e) => {
                tracing::debug!(error = %e, "search matches nothing");
                return Ok(Vec::new());
            }
        };
        let term = term.trim();
        let books = self.store.all_books().during("searching books")?;

        let mut found: Vec<Book> = match search_type {
            SearchType::Isbn => books
                .into_iter()
                .filter(|b| b.isbn.as_str() == term)
                .collect(),
            SearchType::Title | SearchType::Author => {
                let needle = term.to_lowercase();
                books
                    .into_iter()
                    .filter(|b| {
                        let haystack = match search_type {
                            SearchType::Title => &b.title,
                            _ => &b.author,
                        };
                        haystack.to_lowercase().contains(&needle)
                    })
                    .collect()
            }
        };

        match search_type {
            SearchType::Title => found.sort_by(|a, b| a.title.cmp(&b.title)),
            SearchType::Author => {
                found.sort_by(|a, b| a.author.cmp(&b.author).then_with(|| a.title.cmp(&b.title)));
            }
            SearchType::Isbn => {}
        }
        Ok(found)
    }
}
