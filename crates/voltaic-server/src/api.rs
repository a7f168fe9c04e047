// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Voltaic.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! HTTP surface for the four engine contracts

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};
use voltaic_core::{EngineError, VoltaicService};
use voltaic_types::{Alert, FieldError};

#[derive(Debug, Clone)]
pub struct ApiState {
    pub service: Arc<VoltaicService>,
}

/// Error body: `{ "error": ..., "details": [{ "field", "message" }] }`
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    details: Vec<FieldError>,
}

#[derive(Debug)]
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, details) = match &self.0 {
            EngineError::Validation(errors) => (StatusCode::BAD_REQUEST, errors.as_slice().to_vec()),
            EngineError::NotFound { .. } => (StatusCode::NOT_FOUND, Vec::new()),
            EngineError::InsufficientData { .. } => (StatusCode::UNPROCESSABLE_ENTITY, Vec::new()),
            EngineError::Store(err) => {
                error!(error = %err, "Store failure");
                (StatusCode::INTERNAL_SERVER_ERROR, Vec::new())
            }
        };
        let error = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "Internal storage error".to_owned()
        } else {
            self.0.to_string()
        };
        if status != StatusCode::INTERNAL_SERVER_ERROR {
            warn!(status = status.as_u16(), %error, "Request rejected");
        }
        (status, Json(ErrorBody { error, details })).into_response()
    }
}

/// Unwrap the JSON extractor; syntax and content-type failures become a structured 400
fn json_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError(EngineError::invalid("body", rejection.body_text())))
}

/// Decode a body so that shape errors come back as a structured 400
fn decode<T: DeserializeOwned>(body: Value) -> Result<T, ApiError> {
    serde_json::from_value(body)
        .map_err(|err| ApiError(EngineError::invalid("body", err.to_string())))
}

#[expect(clippy::unused_async, reason = "axum handler must be async")]
async fn compatibility_handler(
    State(state): State<ApiState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = decode(json_body(payload)?)?;
    Ok(Json(state.service.check_compatibility(&request)?))
}

#[expect(clippy::unused_async, reason = "axum handler must be async")]
async fn telemetry_handler(
    State(state): State<ApiState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.ingest_telemetry(json_body(payload)?)?))
}

#[expect(clippy::unused_async, reason = "axum handler must be async")]
async fn analytics_handler(
    State(state): State<ApiState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = decode(json_body(payload)?)?;
    Ok(Json(state.service.query_analytics(&query)?))
}

#[expect(clippy::unused_async, reason = "axum handler must be async")]
async fn alerts_handler(
    State(state): State<ApiState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = decode(json_body(payload)?)?;
    Ok(Json(state.service.manage_alerts(request)?))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListAlertsParams {
    #[serde(default)]
    include_resolved: bool,
}

#[expect(clippy::unused_async, reason = "axum handler must be async")]
async fn list_alerts_handler(
    State(state): State<ApiState>,
    Path(equipment_id): Path<String>,
    Query(params): Query<ListAlertsParams>,
) -> Result<Json<Vec<Alert>>, ApiError> {
    Ok(Json(
        state
            .service
            .alerts()
            .list_alerts(&equipment_id, params.include_resolved)?,
    ))
}

#[expect(clippy::unused_async, reason = "axum handler must be async")]
async fn health_handler() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/compatibility", post(compatibility_handler))
        .route("/api/telemetry", post(telemetry_handler))
        .route("/api/analytics", post(analytics_handler))
        .route("/api/alerts", post(alerts_handler))
        .route("/api/alerts/{equipment_id}", get(list_alerts_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
