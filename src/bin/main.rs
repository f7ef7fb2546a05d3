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

use chrono::{DateTime, Utc};
use clap::Parser;
use csv::{ReaderBuilder, Trim, Writer};
use library_circulation_rs::{
    BookId, ConfigError, InMemoryStore, Library, LibraryConfig, ManualClock, Outcome,
    PaymentGateway, SimulatedGateway, StatusView,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Library Circulation - Replay circulation CSV files
///
/// Seeds the catalog, replays borrow/return/pay/refund operations at the
/// instants recorded in the input, and writes one outcome row per operation
/// to stdout.
#[derive(Parser, Debug)]
#[command(name = "library-circulation-rs")]
#[command(about = "Replays library circulation operations from CSV", long_about = None)]
struct Args {
    /// Path to CSV file with operations
    ///
    /// Expected format: op,patron,book,at,amount,txn
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// CSV file with books to catalog first (title,author,isbn,copies)
    #[arg(long, value_name = "FILE")]
    catalog: Option<PathBuf>,

    /// Print the status report of this patron as JSON after the replay
    #[arg(long, value_name = "PATRON")]
    status: Option<String>,

    /// Loan period in days (overrides LIBRARY_LOAN_PERIOD_DAYS)
    #[arg(long)]
    loan_period_days: Option<i64>,

    /// Active loan limit per patron (overrides LIBRARY_MAX_ACTIVE_LOANS)
    #[arg(long)]
    max_active_loans: Option<usize>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "library_circulation_rs=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let config = match LibraryConfig::from_env().and_then(|env| apply_overrides(env, &args)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            process::exit(1);
        }
    };

    let clock = Arc::new(ManualClock::new(Utc::now()));
    let library = Library::new(Arc::new(InMemoryStore::new()))
        .with_clock(clock.clone())
        .with_config(config);
    let gateway = SimulatedGateway::new();

    if let Some(path) = &args.catalog {
        let file = open(path);
        if let Err(e) = seed_catalog(&library, BufReader::new(file)) {
            eprintln!("Error reading catalog: {}", e);
            process::exit(1);
        }
    }

    let file = open(&args.input);
    if let Err(e) = replay(
        &library,
        &clock,
        &gateway,
        BufReader::new(file),
        std::io::stdout(),
    ) {
        eprintln!("Error processing operations: {}", e);
        process::exit(1);
    }

    if let Some(patron) = &args.status {
        match library.patron_status(patron) {
            Ok(status) => match serde_json::to_string_pretty(&StatusView::from(&status)) {
                Ok(json) => println!("{json}"),
                Err(e) => {
                    eprintln!("Error writing status: {}", e);
                    process::exit(1);
                }
            },
            Err(e) => {
                eprintln!("Error building status for {}: {}", patron, e);
                process::exit(1);
            }
        }
    }
}

fn open(path: &Path) -> File {
    match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error opening file '{}': {}", path.display(), e);
            process::exit(1);
        }
    }
}

/// Catalog CSV record: `title, author, isbn, copies`.
#[derive(Debug, Deserialize)]
struct BookRecord {
    title: String,
    author: String,
    isbn: String,
    copies: i64,
}

/// Adds every valid catalog row. Rejected rows are logged and skipped.
fn seed_catalog<R: Read>(library: &Library, reader: R) -> Result<usize, csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .has_headers(true)
        .from_reader(reader);

    let mut added = 0;
    for result in rdr.deserialize::<BookRecord>() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed catalog row");
                continue;
            }
        };
        if library
            .add_book(&record.title, &record.author, &record.isbn, record.copies)
            .is_ok()
        {
            added += 1;
        }
    }
    Ok(added)
}

/// Layers command-line overrides on the environment configuration and
/// checks the result.
fn apply_overrides(mut config: LibraryConfig, args: &Args) -> Result<LibraryConfig, ConfigError> {
    if let Some(days) = args.loan_period_days {
        config.loan_period_days = days;
    }
    if let Some(limit) = args.max_active_loans {
        config.max_active_loans = limit;
    }
    config.validate()
}

/// Operation CSV record matching the input format.
///
/// Fields: `op, patron, book, at, amount, txn`
#[derive(Debug, Deserialize)]
struct OperationRecord {
    op: String,
    #[serde(default)]
    patron: String,
    #[serde(default)]
    book: String,
    /// Empty means "at the previous instant"; anything unparseable rejects the row.
    #[serde(default)]
    at: Option<DateTime<Utc>>,
    #[serde(default)]
    amount: Option<Decimal>,
    #[serde(default)]
    txn: String,
}

/// One output row per operation.
#[derive(Debug, Serialize)]
struct OutcomeRow<'a> {
    line: usize,
    op: &'a str,
    success: bool,
    message: String,
    transaction: Option<String>,
}

fn execute(library: &Library, gateway: &dyn PaymentGateway, record: &OperationRecord) -> Outcome {
    let book_id = || BookId::parse(&record.book);
    match record.op.to_lowercase().as_str() {
        "borrow" => book_id()
            .and_then(|book| library.borrow_book(&record.patron, book))
            .into(),
        "return" => book_id()
            .and_then(|book| library.return_book(&record.patron, book))
            .into(),
        "pay" => book_id()
            .and_then(|book| library.pay_late_fees(&record.patron, book, gateway))
            .into(),
        "refund" => library
            .refund_late_fee_payment(
                &record.txn,
                record.amount.unwrap_or(Decimal::ZERO),
                gateway,
            )
            .into(),
        other => Outcome {
            success: false,
            message: format!("unknown operation {other:?}"),
            transaction_id: None,
        },
    }
}

/// Replays operations from a CSV reader and writes outcomes as CSV.
///
/// Rows are processed in order. A row's `at` column, when present, moves the
/// clock before the operation runs; rows without one run at the previous
/// instant. Malformed rows, including a timestamp or amount that does not
/// parse, are logged and skipped without moving the clock.
///
/// # CSV Format
///
/// ```csv
/// op,patron,book,at,amount,txn
/// borrow,123456,1,2025-01-01T09:00:00Z,,
/// return,123456,1,2025-01-25T09:00:00Z,,
/// refund,,,,2.00,txn_123456_000001
/// ```
///
/// # Errors
///
/// Returns a CSV error if reading the input structure or writing fails.
fn replay<R: Read, W: Write>(
    library: &Library,
    clock: &ManualClock,
    gateway: &dyn PaymentGateway,
    reader: R,
    writer: W,
) -> Result<(), csv::Error> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .has_headers(true)
        .from_reader(reader);
    let mut wtr = Writer::from_writer(writer);

    for (index, result) in rdr.deserialize::<OperationRecord>().enumerate() {
        // Header is line 1.
        let line = index + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(line, error = %e, "skipping malformed row");
                continue;
            }
        };

        if let Some(at) = record.at {
            clock.set(at);
        }
        let outcome = execute(library, gateway, &record);
        wtr.serialize(OutcomeRow {
            line,
            op: &record.op,
            success: outcome.success,
            message: outcome.message,
            transaction: outcome.transaction_id,
        })?;
    }

    wtr.flush()?;
    Ok(())
}
