//! # HTTP Routes
//!
//! | Method | Path                          | Handler                     |
//! |--------|-------------------------------|-----------------------------|
//! | GET    | `/health`                     | [`health::health`]          |
//! | GET    | `/patients`                   | [`patients::list`]          |
//! | POST   | `/patients`                   | [`patients::create`]        |
//! | GET    | `/patients/{id}`              | [`patients::get`]           |
//! | PATCH  | `/patients/{id}`              | [`patients::update`]        |
//! | DELETE | `/patients/{id}`              | [`patients::delete`]        |
//! | GET    | `/sales-transactions`         | [`sales::list`]             |
//! | POST   | `/sales-transactions`         | [`sales::create`]           |
//! | GET    | `/sales-transactions/{id}`    | [`sales::get`]              |
//! | PATCH  | `/sales-transactions/{id}`    | [`sales::update`]           |
//! | DELETE | `/sales-transactions/{id}`    | [`sales::delete`]           |
//! | GET    | `/orders`                     | [`orders::list`]            |
//! | POST   | `/orders`                     | [`orders::create`]          |
//! | GET    | `/orders/{id}`                | [`orders::get`]             |
//! | DELETE | `/orders/{id}`                | [`orders::delete`]          |
//! | GET    | `/dashboard`                  | [`dashboard::stats`]        |
//!
//! Handlers only parse, delegate to `klinik_db`, and map errors.

pub mod dashboard;
pub mod health;
pub mod orders;
pub mod patients;
pub mod sales;

use chrono::NaiveDate;
use serde::Serialize;

use klinik_core::ValidationError;

/// Body returned by DELETE endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
}

impl DeleteResponse {
    pub const OK: DeleteResponse = DeleteResponse { success: true };
}

/// Parses an optional `YYYY-MM-DD` query parameter. Blank counts as absent.
pub(crate) fn parse_date_param(
    field: &str,
    value: Option<&str>,
) -> Result<Option<NaiveDate>, ValidationError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: format!("expected YYYY-MM-DD, got '{}'", raw),
            }),
    }
}
