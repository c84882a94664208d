//! # Validation Module
//!
//! Input validation utilities for Klinik.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Web client forms                                             │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: klinik-api / klinik-db (Rust)                                │
//! │  ├── Type validation (deserialization, Money parsing)                  │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Text validators return the trimmed value, which is what gets stored.
//!
//! ## Usage
//! ```rust
//! use klinik_core::validation::{validate_name, validate_quantity};
//!
//! assert_eq!(validate_name("name", "  Budi ").unwrap(), "Budi");
//! assert!(validate_quantity(5).is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::Money;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_NAME_LENGTH, MAX_UNIT_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum length of a phone number as typed.
pub const MAX_PHONE_LENGTH: usize = 30;

/// Maximum length of a complaint description.
pub const MAX_COMPLAINT_LENGTH: usize = 2000;

/// Maximum length of a search term.
pub const MAX_SEARCH_LENGTH: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

/// Trims `value` and checks it is non-empty and at most `max` characters.
pub fn validate_required_text(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates a person, item or service name.
///
/// ## Example
/// ```rust
/// use klinik_core::validation::validate_name;
///
/// assert!(validate_name("item_service_name", "Cabut Gigi").is_ok());
/// assert!(validate_name("name", "").is_err());
/// ```
pub fn validate_name(field: &str, value: &str) -> ValidationResult<String> {
    validate_required_text(field, value, MAX_NAME_LENGTH)
}

/// Validates a phone number. Any format is accepted as long as it is present.
pub fn validate_phone_number(value: &str) -> ValidationResult<String> {
    validate_required_text("phone_number", value, MAX_PHONE_LENGTH)
}

/// Validates a visit complaint.
pub fn validate_complaint(value: &str) -> ValidationResult<String> {
    validate_required_text("complaint", value, MAX_COMPLAINT_LENGTH)
}

/// Normalizes a search term.
///
/// ## Returns
/// - `Ok(None)` for a missing or blank term (filter is ignored)
/// - `Ok(Some(trimmed))` otherwise
pub fn validate_search_query(query: Option<&str>) -> ValidationResult<Option<String>> {
    let query = match query.map(str::trim) {
        Some(q) if !q.is_empty() => q,
        _ => return Ok(None),
    };

    if query.chars().count() > MAX_SEARCH_LENGTH {
        return Err(ValidationError::TooLong {
            field: "search".to_string(),
            max: MAX_SEARCH_LENGTH,
        });
    }

    Ok(Some(query.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  POS Cart / Sales Form                                                  │
/// │                                                                         │
/// │  User enters quantity: 5                                               │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       │                                                                 │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       │                                                                 │
/// │       └── OK → price it                                                │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price.
///
/// ## Rules
/// - Must be positive (free items are not recorded)
/// - Must fit a `numeric(10,2)` column
///
/// ## Example
/// ```rust
/// use klinik_core::money::Money;
/// use klinik_core::validation::validate_unit_price;
///
/// assert!(validate_unit_price("price", Money::from_cents(1099)).is_ok());
/// assert!(validate_unit_price("price", Money::zero()).is_err());
/// assert!(validate_unit_price("price", Money::from_cents(-100)).is_err());
/// ```
pub fn validate_unit_price(field: &str, price: Money) -> ValidationResult<()> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: field.to_string(),
        });
    }

    if price.cents() > MAX_UNIT_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates cart size.
///
/// ## Rules
/// - At least one entry
/// - At most MAX_CART_ITEMS (100)
pub fn validate_cart_size(items: usize) -> ValidationResult<()> {
    if items == 0 {
        return Err(ValidationError::EmptyCollection {
            field: "items".to_string(),
        });
    }

    if items > MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
