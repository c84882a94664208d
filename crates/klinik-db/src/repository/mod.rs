//! # Repository Module
//!
//! Database repository implementations for Klinik.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  db.orders().create(request)                                   │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── validate + price (klinik-core, no I/O)                            │
//! │  ├── BEGIN                                                              │
//! │  ├── INSERT orders / INSERT order_items × N                            │
//! │  └── COMMIT                                                             │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`patient::PatientRepository`] - Patient registration CRUD
//! - [`sales::SalesTransactionRepository`] - Single-item sales CRUD
//! - [`order::OrderRepository`] - POS orders with line items
//! - [`dashboard::DashboardRepository`] - Today / this-month summary

pub mod dashboard;
pub mod order;
pub mod patient;
pub mod sales;

use klinik_core::period::DayRange;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::error::DbResult;

/// New primary key.
pub(crate) fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Starts a transaction that holds the write lock from `BEGIN`.
///
/// A deferred transaction that has read cannot upgrade to a writer once
/// another connection commits; SQLite fails it with `SQLITE_BUSY` instead of
/// waiting on the busy timeout. Read-then-write operations use this.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}

/// Lowercased form stored in `*_search` columns and matched by searches.
pub(crate) fn search_key(text: &str) -> String {
    text.to_lowercase()
}

/// Builds a `LIKE` pattern matching `term` anywhere, with `%` and `_` taken
/// literally. Use together with `ESCAPE '\'`.
pub(crate) fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Appends `AND column >= start AND column < end` for the bounds present.
pub(crate) fn push_day_range(qb: &mut QueryBuilder<'_, Sqlite>, column: &str, range: &DayRange) {
    if let Some(start) = range.start {
        qb.push(format!(" AND {} >= ", column)).push_bind(start);
    }
    if let Some(end) = range.end {
        qb.push(format!(" AND {} < ", column)).push_bind(end);
    }
}
