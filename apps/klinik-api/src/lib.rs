//! # Klinik API Library
//!
//! HTTP/JSON adapter over `klinik-db`.
//!
//! ## Module Organization
//! ```text
//! klinik_api/
//! ├── lib.rs          ◄─── You are here (AppState & Router)
//! ├── config.rs       ◄─── ApiConfig: defaults → TOML → env
//! ├── error.rs        ◄─── ApiError {code, message} + status mapping
//! └── routes/
//!     ├── mod.rs      ◄─── Route table, shared query parsing
//!     ├── health.rs
//!     ├── patients.rs
//!     ├── sales.rs
//!     ├── orders.rs
//!     └── dashboard.rs
//! ```
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  TraceLayer ─► CorsLayer ─► Router ─► handler                           │
//! │                                          │                              │
//! │                           Json / Query extractor (4xx on bad input)     │
//! │                                          │                              │
//! │                          state.db.<repository>().<operation>()          │
//! │                                          │                              │
//! │                         Ok(T) ─► 200/201 JSON   Err ─► ApiError         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod routes;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use klinik_db::Database;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCode};

/// Shared handler state. `Database` is a cloneable pool handle.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
}

impl AppState {
    pub fn new(db: Database) -> Self {
        AppState { db }
    }
}

/// Builds the full application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(routes::health::health))
        .route(
            "/patients",
            get(routes::patients::list).post(routes::patients::create),
        )
        .route(
            "/patients/{id}",
            get(routes::patients::get)
                .patch(routes::patients::update)
                .delete(routes::patients::delete),
        )
        .route(
            "/sales-transactions",
            get(routes::sales::list).post(routes::sales::create),
        )
        .route(
            "/sales-transactions/{id}",
            get(routes::sales::get)
                .patch(routes::sales::update)
                .delete(routes::sales::delete),
        )
        .route(
            "/orders",
            get(routes::orders::list).post(routes::orders::create),
        )
        .route(
            "/orders/{id}",
            get(routes::orders::get).delete(routes::orders::delete),
        )
        .route("/dashboard", get(routes::dashboard::stats))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use klinik_db::DbConfig;
    use serde_json::Value;
    use tower::ServiceExt;

    /// Router over a fresh in-memory database.
    pub async fn test_app() -> Router {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        router(AppState::new(db))
    }

    /// Sends one request and returns the status and JSON body (`Null` when empty).
    pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, value)
    }
}
