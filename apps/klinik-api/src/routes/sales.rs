//! Single-item sales transaction endpoints.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use klinik_core::{
    CreateSalesTransactionRequest, SalesTransaction, SalesTransactionFilter,
    UpdateSalesTransactionRequest, ValidationError,
};

use super::{parse_date_param, DeleteResponse};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SalesQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub search: Option<String>,
}

impl SalesQuery {
    fn into_filter(self) -> Result<SalesTransactionFilter, ValidationError> {
        Ok(SalesTransactionFilter {
            date_from: parse_date_param("date_from", self.date_from.as_deref())?,
            date_to: parse_date_param("date_to", self.date_to.as_deref())?,
            search: self.search,
        })
    }
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<SalesQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<SalesTransaction>>> {
    let Query(query) = query?;
    let filter = query.into_filter()?;

    Ok(Json(state.db.sales_transactions().list(&filter).await?))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreateSalesTransactionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<SalesTransaction>)> {
    let Json(request) = payload?;
    let sale = state.db.sales_transactions().create(request).await?;

    Ok((StatusCode::CREATED, Json(sale)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SalesTransaction>> {
    state
        .db
        .sales_transactions()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("SalesTransaction", &id))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSalesTransactionRequest>, JsonRejection>,
) -> ApiResult<Json<SalesTransaction>> {
    let Json(request) = payload?;

    Ok(Json(state.db.sales_transactions().update(&id, request).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    state.db.sales_transactions().delete(&id).await?;

    Ok(Json(DeleteResponse::OK))
}
