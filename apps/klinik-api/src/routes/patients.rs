//! Patient registration endpoints.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use klinik_core::{CreatePatientRequest, Patient, PatientFilter, UpdatePatientRequest, ValidationError};

use super::{parse_date_param, DeleteResponse};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Raw `GET /patients` query; dates stay strings so blanks can be ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PatientQuery {
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub search: Option<String>,
}

impl PatientQuery {
    fn into_filter(self) -> Result<PatientFilter, ValidationError> {
        Ok(PatientFilter {
            date_from: parse_date_param("date_from", self.date_from.as_deref())?,
            date_to: parse_date_param("date_to", self.date_to.as_deref())?,
            search: self.search,
        })
    }
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<PatientQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Patient>>> {
    let Query(query) = query?;
    let filter = query.into_filter()?;
    debug!(?filter, "GET /patients");

    Ok(Json(state.db.patients().list(&filter).await?))
}

pub async fn create(
    State(state): State<AppState>,
    payload: Result<Json<CreatePatientRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Patient>)> {
    let Json(request) = payload?;
    let patient = state.db.patients().create(request).await?;

    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<Patient>> {
    state
        .db
        .patients()
        .get_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Patient", &id))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdatePatientRequest>, JsonRejection>,
) -> ApiResult<Json<Patient>> {
    let Json(request) = payload?;

    Ok(Json(state.db.patients().update(&id, request).await?))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    state.db.patients().delete(&id).await?;

    Ok(Json(DeleteResponse::OK))
}
