//! POS order endpoints.
//!
//! Orders are immutable once created; there is no update route.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use klinik_core::{CreateOrderRequest, OrderFilter, OrderWithItems, ValidationError};

use super::{parse_date_param, DeleteResponse};
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OrderQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub payment_method: Option<String>,
}

impl OrderQuery {
    fn into_filter(self) -> Result<OrderFilter, ValidationError> {
        Ok(OrderFilter {
            date_from: parse_date_param("date_from", self.date_from.as_deref())?,
            date_to: parse_date_param("date_to", self.date_to.as_deref())?,
            payment_method: self.payment_method,
        })
    }
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<OrderQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<OrderWithItems>>> {
    let Query(query) = query?;
    let filter = query.into_filter()?;

    Ok(Json(state.db.orders().list(&filter).await?))
}

/// `POST /orders`: client totals are never read; the server prices the cart.
pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<OrderWithItems>)> {
    let Json(request) = payload?;
    let order = state.db.orders().create(request).await?;
    info!(order_id = %order.order.id, total = %order.order.total, "Order created via API");

    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /orders/{id}`: `null` when the order does not exist.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Option<OrderWithItems>>> {
    Ok(Json(state.db.orders().get_by_id(&id).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    state.db.orders().delete(&id).await?;

    Ok(Json(DeleteResponse::OK))
}
