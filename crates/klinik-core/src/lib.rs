//! # klinik-core: Pure Business Logic for Klinik
//!
//! This crate is the **heart** of Klinik. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Klinik Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Web Client (React)                           │   │
//! │  │   Registration ──► Sales Input ──► POS Cart ──► Dashboard       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP / JSON                            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    klinik-api (axum)                            │   │
//! │  │    /patients, /sales-transactions, /orders, /dashboard          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ klinik-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  pricing  │  │ validation│  │   │
//! │  │   │  Patient  │  │   Money   │  │ OrderLine │  │   rules   │  │   │
//! │  │   │  Order    │  │  parsing  │  │  totals   │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    klinik-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Patient, SalesTransaction, Order, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`pricing`] - Order Total Calculator (the only place totals are computed)
//! - [`period`] - Local calendar boundaries (today, this month, day ranges)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Server-Side Totals**: Clients never supply a subtotal or total
//!
//! ## Example Usage
//!
//! ```rust
//! use klinik_core::money::Money;
//! use klinik_core::pricing::{price_order, OrderLine};
//!
//! let lines = vec![
//!     OrderLine::new("Konsultasi", Money::from_major_minor(5000, 0), 2),
//!     OrderLine::new("Obat", Money::from_major_minor(50000, 0), 1),
//! ];
//!
//! let priced = price_order(&lines).unwrap();
//! assert_eq!(priced.total, Money::from_major_minor(60000, 0));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod period;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use pricing::{price_line, price_order, OrderLine, PricedLine, PricedOrder};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single POS order.
///
/// ## Business Reason
/// Prevents runaway carts and keeps one checkout to a reasonable size.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Largest unit price accepted, in cents.
///
/// Matches the ceiling of a `numeric(10,2)` column: 99,999,999.99
pub const MAX_UNIT_PRICE_CENTS: i64 = 9_999_999_999;

/// Maximum length of names (patients, items, services).
pub const MAX_NAME_LENGTH: usize = 200;

/// How many rows the dashboard's recent-activity lists hold.
pub const RECENT_ACTIVITY_LIMIT: i64 = 5;
