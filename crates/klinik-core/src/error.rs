//! # Error Types
//!
//! Domain-specific error types for klinik-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  klinik-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  klinik-db errors (separate crate)                                     │
//! │  └── DbError          - NotFound, Validation, store failures           │
//! │                                                                         │
//! │  klinik-api errors (in app)                                            │
//! │  └── ApiError         - What the web client sees (serialized)          │
//! │                                                                         │
//! │  Flow: ValidationError → DbError → ApiError → Web Client               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, item index, etc.)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A monetary amount could not be parsed.
    ///
    /// ## When This Occurs
    /// - More than two fraction digits (`"10.999"`)
    /// - Non-numeric input (`"ten"`)
    /// - Value does not fit in i64 cents
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Raised before anything touches the database.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed amount or date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// A collection that must hold at least one element is empty.
    #[error("{field} must contain at least one entry")]
    EmptyCollection { field: String },
}

impl ValidationError {
    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::EmptyCollection { field } => field,
        }
    }

    /// Prefixes the field name, e.g. `quantity` → `items[2].quantity`.
    pub fn within(self, prefix: &str) -> Self {
        let scope = |field: String| format!("{}.{}", prefix, field);
        match self {
            ValidationError::Required { field } => ValidationError::Required { field: scope(field) },
            ValidationError::TooLong { field, max } => ValidationError::TooLong {
                field: scope(field),
                max,
            },
            ValidationError::OutOfRange { field, min, max } => ValidationError::OutOfRange {
                field: scope(field),
                min,
                max,
            },
            ValidationError::MustBePositive { field } => {
                ValidationError::MustBePositive { field: scope(field) }
            }
            ValidationError::InvalidFormat { field, reason } => ValidationError::InvalidFormat {
                field: scope(field),
                reason,
            },
            ValidationError::NotAllowed { field, allowed } => ValidationError::NotAllowed {
                field: scope(field),
                allowed,
            },
            ValidationError::EmptyCollection { field } => {
                ValidationError::EmptyCollection { field: scope(field) }
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
