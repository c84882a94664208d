//! # Order Total Calculator
//!
//! The single place where line subtotals and order totals are computed.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POS cart (client)                                                      │
//! │    [{ "Konsultasi", 5000.00, ×2 }, { "Obat", 50000.00, ×1 }]            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  price_order() ← THIS MODULE                                           │
//! │    ├── validate every line (index reported on failure)                 │
//! │    ├── subtotal = unit_price × quantity       → [10000.00, 50000.00]   │
//! │    └── total    = Σ subtotal                  → 60000.00               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  OrderRepository::create (one transaction)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Client-supplied subtotals or totals do not exist in the request types,
//! so there is nothing to trust or reconcile.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{
    validate_cart_size, validate_name, validate_quantity, validate_unit_price, ValidationResult,
};

// =============================================================================
// Input
// =============================================================================

/// One cart entry as submitted by the POS screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderLine {
    pub item_name: String,
    #[ts(as = "String")]
    pub unit_price: Money,
    pub quantity: i64,
}

impl OrderLine {
    /// Convenience constructor.
    pub fn new(item_name: impl Into<String>, unit_price: Money, quantity: i64) -> Self {
        OrderLine {
            item_name: item_name.into(),
            unit_price,
            quantity,
        }
    }
}

// =============================================================================
// Output
// =============================================================================

/// A validated cart entry with its computed subtotal. The name is trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedLine {
    pub item_name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub subtotal: Money,
}

/// A validated cart: one priced line per input entry, same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricedOrder {
    pub lines: Vec<PricedLine>,
    pub total: Money,
}

// =============================================================================
// Calculator
// =============================================================================

/// Prices a single `price × quantity` pair.
///
/// Used for sales transactions, where the fields are called `price` and
/// `quantity`.
///
/// ## Example
/// ```rust
/// use klinik_core::money::Money;
/// use klinik_core::pricing::price_line;
///
/// let total = price_line(Money::from_cents(2500), 2).unwrap();
/// assert_eq!(total, Money::from_cents(5000));
///
/// assert!(price_line(Money::zero(), 2).is_err());
/// assert!(price_line(Money::from_cents(2500), 0).is_err());
/// ```
pub fn price_line(price: Money, quantity: i64) -> ValidationResult<Money> {
    multiply("price", price, quantity)
}

/// Validates a cart and computes every subtotal and the total.
///
/// ## Errors
/// - `items must contain at least one entry` for an empty cart
/// - `items[i].<field> ...` for the first failing entry
///
/// ## Example
/// ```rust
/// use klinik_core::money::Money;
/// use klinik_core::pricing::{price_order, OrderLine};
///
/// let priced = price_order(&[
///     OrderLine::new("Konsultasi", Money::from_cents(500_000), 2),
///     OrderLine::new("Obat", Money::from_cents(5_000_000), 1),
/// ])
/// .unwrap();
///
/// assert_eq!(priced.lines[0].subtotal, Money::from_cents(1_000_000));
/// assert_eq!(priced.lines[1].subtotal, Money::from_cents(5_000_000));
/// assert_eq!(priced.total, Money::from_cents(6_000_000));
/// ```
pub fn price_order(lines: &[OrderLine]) -> ValidationResult<PricedOrder> {
    validate_cart_size(lines.len())?;

    let mut priced = Vec::with_capacity(lines.len());
    let mut total = Money::zero();

    for (index, line) in lines.iter().enumerate() {
        let scope = format!("items[{}]", index);

        let item_name =
            validate_name("item_name", &line.item_name).map_err(|e| e.within(&scope))?;
        let subtotal = multiply("unit_price", line.unit_price, line.quantity)
            .map_err(|e| e.within(&scope))?;

        total = total.checked_add(subtotal).ok_or_else(overflow("total"))?;

        priced.push(PricedLine {
            item_name,
            unit_price: line.unit_price,
            quantity: line.quantity,
            subtotal,
        });
    }

    Ok(PricedOrder {
        lines: priced,
        total,
    })
}

fn multiply(price_field: &str, price: Money, quantity: i64) -> ValidationResult<Money> {
    validate_unit_price(price_field, price)?;
    validate_quantity(quantity)?;

    price
        .checked_mul_quantity(quantity)
        .ok_or_else(overflow(price_field))
}

fn overflow(field: &str) -> impl FnOnce() -> ValidationError + '_ {
    move || ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: i64::MAX,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

    fn idr(major: i64) -> Money {
        Money::from_major_minor(major, 0)
    }

    #[test]
    fn test_order_totals_are_exact() {
        let priced = price_order(&[
            OrderLine::new("Konsultasi", idr(5000), 2),
            OrderLine::new("Obat", idr(50000), 1),
        ])
        .unwrap();

        let subtotals: Vec<String> = priced.lines.iter().map(|l| l.subtotal.to_string()).collect();
        assert_eq!(subtotals, vec!["10000.00", "50000.00"]);
        assert_eq!(priced.total.to_string(), "60000.00");
    }

    #[test]
    fn test_fractional_prices_do_not_drift() {
        // 0.10 × 3 is exactly 0.30, unlike binary floats
        let priced = price_order(&[
            OrderLine::new("Kapas", Money::from_cents(10), 3),
            OrderLine::new("Plester", Money::from_cents(20), 1),
        ])
        .unwrap();

        assert_eq!(priced.total, Money::from_cents(50));
    }

    #[test]
    fn test_same_input_same_output() {
        let cart = vec![
            OrderLine::new("Vitamin C", Money::from_cents(1_250_075), 7),
            OrderLine::new("Masker", Money::from_cents(99), 999),
        ];

        let first = price_order(&cart).unwrap();
        let second = price_order(&cart).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_cart_rejected() {
        let err = price_order(&[]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::EmptyCollection {
                field: "items".to_string()
            }
        );
    }

    #[test]
    fn test_failing_entry_reports_index() {
        let err = price_order(&[
            OrderLine::new("Konsultasi", idr(5000), 1),
            OrderLine::new("Obat", idr(100), 1),
            OrderLine::new("Salep", idr(100), 0),
        ])
        .unwrap_err();

        assert_eq!(err.to_string(), "items[2].quantity must be positive");
    }

    #[test]
    fn test_non_positive_price_rejected() {
        let err = price_order(&[OrderLine::new("Obat", Money::zero(), 1)]).unwrap_err();
        assert_eq!(err.field(), "items[0].unit_price");

        let err = price_order(&[OrderLine::new("Obat", idr(-1), 1)]).unwrap_err();
        assert_eq!(err.field(), "items[0].unit_price");
    }

    #[test]
    fn test_blank_name_rejected() {
        let err = price_order(&[OrderLine::new("   ", idr(1), 1)]).unwrap_err();
        assert_eq!(err.to_string(), "items[0].item_name is required");
    }

    #[test]
    fn test_names_are_trimmed() {
        let priced = price_order(&[OrderLine::new("  Obat  ", idr(1), 1)]).unwrap();
        assert_eq!(priced.lines[0].item_name, "Obat");
    }

    #[test]
    fn test_business_limits() {
        let too_many: Vec<OrderLine> = (0..=MAX_CART_ITEMS)
            .map(|i| OrderLine::new(format!("Item {}", i), idr(1), 1))
            .collect();
        assert!(price_order(&too_many).is_err());

        let too_much = [OrderLine::new("Obat", idr(1), MAX_ITEM_QUANTITY + 1)];
        assert!(price_order(&too_much).is_err());
    }

    #[test]
    fn test_price_line() {
        assert_eq!(price_line(idr(25), 2).unwrap(), idr(50));
        assert_eq!(price_line(idr(30), 2).unwrap(), idr(60));

        let err = price_line(idr(25), -1).unwrap_err();
        assert_eq!(err.field(), "quantity");

        let err = price_line(Money::zero(), 1).unwrap_err();
        assert_eq!(err.field(), "price");
    }
}
