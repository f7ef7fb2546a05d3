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

//! Benchmarks for the circulation core.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Late fee calculation
//! - Single-threaded borrow and return cycles
//! - Patron status reports over growing histories
//! - Multi-threaded borrowing across many patrons

use chrono::{DateTime, Duration, TimeZone, Utc};
use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use library_circulation_rs::{BookId, InMemoryStore, Library, LibraryConfig, ManualClock, calculate_late_fee};
use rayon::prelude::*;
use std::sync::Arc;

// =============================================================================
// Helper Functions
// =============================================================================

fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap()
}

fn patron(n: usize) -> String {
    format!("{:06}", 100_000 + n % 900_000)
}

/// A library with `books` titles of `copies` copies each.
fn stocked(books: usize, copies: i64) -> (Library, Arc<ManualClock>, Vec<BookId>) {
    let clock = Arc::new(ManualClock::new(start()));
    let library = Library::new(Arc::new(InMemoryStore::new()))
        .with_clock(clock.clone())
        .with_config(LibraryConfig {
            max_active_loans: usize::MAX,
            ..LibraryConfig::default()
        });
    let ids = (0..books)
        .map(|n| {
            library
                .add_book("Benchmark Title", "Benchmark Author", &format!("{:013}", n + 1), copies)
                .unwrap()
                .book
                .id
        })
        .collect();
    (library, clock, ids)
}

// =============================================================================
// Fee Benchmarks
// =============================================================================

fn bench_late_fee(c: &mut Criterion) {
    let mut group = c.benchmark_group("late_fee");
    let due = start();

    for days in [0i64, 5, 12, 40].iter() {
        let at = due + Duration::days(*days);
        group.bench_with_input(BenchmarkId::from_parameter(days), &at, |b, at| {
            b.iter(|| calculate_late_fee(black_box(Some(due)), black_box(*at)))
        });
    }
    group.finish();
}

// =============================================================================
// Single-Threaded Benchmarks
// =============================================================================

fn bench_borrow_return_cycle(c: &mut Criterion) {
    c.bench_function("borrow_return_cycle", |b| {
        let (library, clock, ids) = stocked(1, 1);
        let book = ids[0];
        b.iter(|| {
            library.borrow_book(black_box("123456"), book).unwrap();
            clock.advance(Duration::days(20));
            library.return_book(black_box("123456"), book).unwrap();
        })
    });
}

fn bench_borrow_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("borrow_throughput");

    for count in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter_batched(
                || stocked(count, 1),
                |(library, _, ids)| {
                    for (n, book) in ids.iter().enumerate() {
                        library.borrow_book(&patron(n), *book).unwrap();
                    }
                    black_box(&library);
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_patron_status(c: &mut Criterion) {
    let mut group = c.benchmark_group("patron_status");

    for history in [10, 100, 1_000].iter() {
        let (library, clock, ids) = stocked(*history, 1);
        for book in &ids {
            library.borrow_book("123456", *book).unwrap();
            clock.advance(Duration::days(1));
        }
        // Return half so the report has both current loans and history.
        for book in ids.iter().step_by(2) {
            library.return_book("123456", *book).unwrap();
        }

        group.throughput(Throughput::Elements(*history as u64));
        group.bench_with_input(BenchmarkId::from_parameter(history), history, |b, _| {
            b.iter(|| black_box(library.patron_status("123456").unwrap()))
        });
    }
    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let (library, _, _) = stocked(10_000, 1);
    let mut group = c.benchmark_group("search_catalog");
    group.bench_function("title", |b| {
        b.iter(|| library.search_catalog(black_box("benchmark"), "title").unwrap())
    });
    group.bench_function("isbn", |b| {
        b.iter(|| library.search_catalog(black_box("0000000005000"), "isbn").unwrap())
    });
    group.finish();
}

// =============================================================================
// Multi-Threaded Benchmarks
// =============================================================================

fn bench_parallel_borrows_different_books(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_borrows_different_books");

    for count in [1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter_batched(
                || stocked(count, 1),
                |(library, _, ids)| {
                    ids.par_iter().enumerate().for_each(|(n, book)| {
                        library.borrow_book(&patron(n), *book).unwrap();
                    });
                    black_box(&library);
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_parallel_borrows_same_book(c: &mut Criterion) {
    let mut group = c.benchmark_group("parallel_borrows_same_book");

    for count in [1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter_batched(
                || stocked(1, 100),
                |(library, _, ids)| {
                    // Most of these lose the race for a copy.
                    (0..count).into_par_iter().for_each(|n| {
                        let _ = library.borrow_book(&patron(n), ids[0]);
                    });
                    black_box(&library);
                },
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_thread_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("thread_scaling");
    let loans = 10_000usize;

    for num_threads in [1, 2, 4, 8].iter() {
        group.throughput(Throughput::Elements(loans as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(num_threads),
            num_threads,
            |b, &num_threads| {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()
                    .unwrap();

                b.iter_batched(
                    || stocked(loans, 1),
                    |(library, _, ids)| {
                        pool.install(|| {
                            ids.par_iter().enumerate().for_each(|(n, book)| {
                                library.borrow_book(&patron(n), *book).unwrap();
                            });
                        });
                        black_box(&library);
                    },
                    criterion::BatchSize::SmallInput,
                )
            },
        );
    }
    group.finish();
}

criterion_group!(
    fee_benches,
    bench_late_fee,
);

criterion_group!(
    single_threaded,
    bench_borrow_return_cycle,
    bench_borrow_throughput,
    bench_patron_status,
    bench_search,
);

criterion_group!(
    multi_threaded,
    bench_parallel_borrows_different_books,
    bench_parallel_borrows_same_book,
    bench_thread_scaling,
);

criterion_main!(fee_benches, single_threaded, multi_threaded);
