//! # klinik-db: Database Layer for Klinik
//!
//! This crate provides database access for the Klinik backend.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Klinik Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (POST /orders)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     klinik-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │    │ PatientRepo    │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SalesTxRepo    │   │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ OrderRepo      │   │              │  │   │
//! │  │   │ Management    │    │ DashboardRepo  │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database (klinik.db)                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (patient, sales, order, dashboard)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use klinik_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("klinik.db")).await?;
//!
//! let order = db.orders().create(request).await?;
//! let stats = db.dashboard().stats().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::dashboard::DashboardRepository;
pub use repository::order::OrderRepository;
pub use repository::patient::PatientRepository;
pub use repository::sales::SalesTransactionRepository;
