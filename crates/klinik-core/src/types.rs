//! # Domain Types
//!
//! Core domain types used throughout Klinik.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌───────────────────┐  ┌─────────────────┐      │
//! │  │    Patient       │  │ SalesTransaction  │  │     Order       │      │
//! │  │  ──────────────  │  │  ───────────────  │  │  ─────────────  │      │
//! │  │  id (UUID)       │  │  id (UUID)        │  │  id (UUID)      │      │
//! │  │  name            │  │  item_service_name│  │  total          │      │
//! │  │  phone_number    │  │  price            │  │  payment_method │      │
//! │  │  complaint       │  │  quantity         │  │  ordered_at     │      │
//! │  │  examination_date│  │  total            │  └────────┬────────┘      │
//! │  └──────────────────┘  └───────────────────┘           │ 1..N          │
//! │                                                ┌───────▼─────────┐     │
//! │  ┌─────────────────┐                           │   OrderItem     │     │
//! │  │ PaymentMethod   │                           │  ─────────────  │     │
//! │  │  ─────────────  │                           │  order_id (FK)  │     │
//! │  │  Cash  Debit    │                           │  item_name      │     │
//! │  │  Credit Transfer│                           │  unit_price     │     │
//! │  └─────────────────┘                           │  quantity       │     │
//! │                                                │  subtotal       │     │
//! │                                                └─────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Server-Computed Fields
//! `total` and `subtotal` never appear in request types. They are produced
//! by [`crate::pricing`] and written by the repositories.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::pricing::OrderLine;

// =============================================================================
// Payment Method
// =============================================================================

/// How an order was paid.
///
/// Stored as its lowercase name (`"cash"`, `"debit"`, ...).
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Debit card on an external terminal.
    Debit,
    /// Credit card on an external terminal.
    Credit,
    /// Bank transfer.
    Transfer,
}

impl PaymentMethod {
    /// Every accepted method, in display order.
    pub const ALL: [PaymentMethod; 4] = [
        PaymentMethod::Cash,
        PaymentMethod::Debit,
        PaymentMethod::Credit,
        PaymentMethod::Transfer,
    ];

    /// The stored/wire name.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Debit => "debit",
            PaymentMethod::Credit => "credit",
            PaymentMethod::Transfer => "transfer",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive, whitespace-tolerant parsing.
///
/// ```rust
/// use klinik_core::PaymentMethod;
///
/// assert_eq!(" Cash ".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
/// assert!("".parse::<PaymentMethod>().is_err());
/// assert!("bitcoin".parse::<PaymentMethod>().is_err());
/// ```
impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::Required {
                field: "payment_method".to_string(),
            });
        }

        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: PaymentMethod::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Patient
// =============================================================================

/// A registered patient visit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Patient {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Full name as registered at the front desk.
    pub name: String,

    /// Contact number, kept as entered.
    pub phone_number: String,

    /// Free-text reason for the visit.
    pub complaint: String,

    /// Calendar day of the examination.
    #[ts(as = "String")]
    pub examination_date: NaiveDate,

    /// When the record was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Registration form input.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreatePatientRequest {
    pub name: String,
    pub phone_number: String,
    pub complaint: String,
    #[ts(as = "String")]
    pub examination_date: NaiveDate,
}

/// Partial patient update. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub complaint: Option<String>,
    #[ts(as = "Option<String>")]
    pub examination_date: Option<NaiveDate>,
}

impl UpdatePatientRequest {
    /// True when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.phone_number.is_none()
            && self.complaint.is_none()
            && self.examination_date.is_none()
    }
}

/// Patient list filter. Dates are inclusive and apply to `examination_date`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct PatientFilter {
    #[ts(as = "Option<String>")]
    pub date_from: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub date_to: Option<NaiveDate>,
    /// Substring of name or phone number.
    pub search: Option<String>,
}

// =============================================================================
// Sales Transaction
// =============================================================================

/// A standalone single-item sale (service or product).
///
/// `total` always equals `price × quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesTransaction {
    pub id: String,

    /// What was sold.
    pub item_service_name: String,

    /// Unit price.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    #[ts(as = "String")]
    pub price: Money,

    pub quantity: i64,

    /// `price × quantity`, computed on the server.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "total_cents"))]
    #[ts(as = "String")]
    pub total: Money,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Sales input form. There is deliberately no `total` field.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateSalesTransactionRequest {
    pub item_service_name: String,
    #[ts(as = "String")]
    pub price: Money,
    pub quantity: i64,
}

/// Partial sales update. The total is recomputed from the merged values.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct UpdateSalesTransactionRequest {
    pub item_service_name: Option<String>,
    #[ts(as = "Option<String>")]
    pub price: Option<Money>,
    pub quantity: Option<i64>,
}

impl UpdateSalesTransactionRequest {
    /// True when no field was supplied.
    pub fn is_empty(&self) -> bool {
        self.item_service_name.is_none() && self.price.is_none() && self.quantity.is_none()
    }
}

/// Sales list filter. Dates are inclusive local calendar days over `created_at`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct SalesTransactionFilter {
    #[ts(as = "Option<String>")]
    pub date_from: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub date_to: Option<NaiveDate>,
    /// Substring of the item/service name.
    pub search: Option<String>,
}

// =============================================================================
// POS Order
// =============================================================================

/// One checkout event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,

    /// Sum of the item subtotals.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "total_cents"))]
    #[ts(as = "String")]
    pub total: Money,

    pub payment_method: PaymentMethod,

    #[ts(as = "String")]
    pub ordered_at: DateTime<Utc>,
}

/// A line item in an order. Immutable once the order is committed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub item_name: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "unit_price_cents"))]
    #[ts(as = "String")]
    pub unit_price: Money,
    pub quantity: i64,
    /// `unit_price × quantity`.
    #[cfg_attr(feature = "sqlx", sqlx(rename = "subtotal_cents"))]
    #[ts(as = "String")]
    pub subtotal: Money,
}

/// An order together with its items, in cart order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderWithItems {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
}

/// POS checkout input.
///
/// `payment_method` stays a string here so an empty or unknown value is
/// reported as a validation error rather than a deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CreateOrderRequest {
    pub payment_method: String,
    pub items: Vec<OrderLine>,
}

/// Order list filter. Dates are inclusive local calendar days over `ordered_at`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct OrderFilter {
    #[ts(as = "Option<String>")]
    pub date_from: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub date_to: Option<NaiveDate>,
    /// Exact method match; blank is ignored.
    pub payment_method: Option<String>,
}

// =============================================================================
// Dashboard
// =============================================================================

/// Compact patient row for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RecentPatient {
    pub id: String,
    pub name: String,
    #[ts(as = "String")]
    pub examination_date: NaiveDate,
}

/// Compact sales row for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RecentSale {
    pub id: String,
    pub item_service_name: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "total_cents"))]
    #[ts(as = "String")]
    pub total: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Today / this-month summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DashboardStats {
    pub total_patients_today: i64,
    pub total_patients_this_month: i64,
    #[ts(as = "String")]
    pub total_sales_today: Money,
    #[ts(as = "String")]
    pub total_sales_this_month: Money,
    pub recent_patients: Vec<RecentPatient>,
    pub recent_sales: Vec<RecentSale>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_method_parse_is_case_insensitive() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!("DEBIT".parse::<PaymentMethod>().unwrap(), PaymentMethod::Debit);
        assert_eq!(
            "  Transfer ".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::Transfer
        );
    }

    #[test]
    fn test_payment_method_empty_is_required() {
        let err = "   ".parse::<PaymentMethod>().unwrap_err();
        assert_eq!(err.to_string(), "payment_method is required");
    }

    #[test]
    fn test_payment_method_unknown_lists_allowed() {
        let err = "bitcoin".parse::<PaymentMethod>().unwrap_err();
        match err {
            ValidationError::NotAllowed { field, allowed } => {
                assert_eq!(field, "payment_method");
                assert_eq!(allowed, vec!["cash", "debit", "credit", "transfer"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_payment_method_json_is_lowercase() {
        let json = serde_json::to_string(&PaymentMethod::Credit).unwrap();
        assert_eq!(json, "\"credit\"");
    }

    #[test]
    fn test_update_requests_detect_empty() {
        assert!(UpdatePatientRequest::default().is_empty());
        assert!(UpdateSalesTransactionRequest::default().is_empty());

        let update: UpdateSalesTransactionRequest =
            serde_json::from_str(r#"{"price":"30"}"#).unwrap();
        assert!(!update.is_empty());
        assert_eq!(update.price, Some(Money::from_cents(3000)));
    }

    #[test]
    fn test_order_with_items_serializes_flat() {
        let order = OrderWithItems {
            order: Order {
                id: "o-1".to_string(),
                total: Money::from_cents(6_000_000),
                payment_method: PaymentMethod::Cash,
                ordered_at: DateTime::parse_from_rfc3339("2024-03-01T08:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            },
            items: vec![],
        };

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["id"], "o-1");
        assert_eq!(value["total"], "60000.00");
        assert_eq!(value["payment_method"], "cash");
        assert!(value["items"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_dashboard_stats_default_is_zero_state() {
        let stats = DashboardStats::default();
        assert_eq!(stats.total_patients_today, 0);
        assert!(stats.total_sales_this_month.is_zero());
        assert!(stats.recent_patients.is_empty());
    }
}
