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


use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use tower::ServiceExt;
use voltaic_core::{EngineConfig, VoltaicService};
use voltaic_server::api::{ApiState, router};
use voltaic_store::SqliteStore;

fn create_test_app() -> Router {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let service = VoltaicService::new(
        EngineConfig::default(),
        store.clone(),
        store.clone(),
        store,
    );
    router(ApiState {
        service: Arc::new(service),
    })
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn send_raw(app: &Router, uri: &str, content_type: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", content_type)
        .body(Body::from(body.to_owned()))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn sample(equipment_id: &str, timestamp: DateTime<Utc>, efficiency: f64) -> Value {
    json!({
        "equipmentId": equipment_id,
        "equipmentType": "inverter",
        "timestamp": timestamp,
        "realtime": {
            "power": 4000.0, "voltage": 400.0, "current": 10.0,
            "temperature": 40.0, "efficiency": efficiency, "status": "normal"
        },
        "environmental": {
            "irradiance": 800.0, "ambientTemperature": 20.0, "windSpeed": 2.0,
            "humidity": 50.0, "precipitation": false
        },
        "calculated": {
            "energyProduced": 1.0, "performanceRatio": 84.0, "capacityUtilization": 66.0,
            "degradationRate": 0.4, "availability": 99.5
        },
        "quality": {
            "dataCompleteness": 99.0, "measurementAccuracy": 98.0, "signalQuality": 97.0
        }
    })
}

fn system(panels: Value, panels_per_string: u32) -> Value {
    json!({
        "system": {
            "panels": panels,
            "inverter": {
                "id": "inv-spec", "manufacturer": "Gridline", "model": "G6",
                "kind": "string", "acCapacityW": 6000.0,
                "minInputVoltageV": 200.0, "maxInputVoltageV": 600.0,
                "mpptCount": 2, "certifications": ["UL 1741", "IEEE 1547"]
            },
            "layout": {
                "panelsPerString": panels_per_string,
                "stringsPerInverter": 1,
                "totalPanels": panels_per_string
            },
            "installation": {
                "roofType": "asphalt_shingle", "roofPitchDeg": 20.0,
                "azimuthDeg": 180.0, "tiltDeg": 25.0,
                "location": { "latitude": 40.0, "longitude": -105.0 }
            }
        }
    })
}

fn panel() -> Value {
    json!({
        "id": "pv-40", "manufacturer": "Sunward", "model": "SW-40",
        "ratedPowerW": 400.0, "stcVoltageV": 40.0, "vocTempCoefficientPct": -0.3,
        "lengthMm": 1700.0, "widthMm": 1000.0,
        "certifications": ["UL1703", "IEC 61215", "IEC 61730"]
    })
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_compatibility_passes_for_valid_string() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/compatibility",
        Some(system(json!([panel()]), 12)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["compatibility"]["passed"], true);
    let string_v = body["systemSummary"]["stringVoltageV"].as_f64().unwrap();
    assert!((string_v - 480.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_compatibility_rejects_empty_panel_list() {
    let app = create_test_app();
    let (status, body) =
        send(&app, "POST", "/api/compatibility", Some(system(json!([]), 12))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let details = body["details"].as_array().unwrap();
    assert!(details.iter().any(|d| d["field"] == "panels"));
}

#[tokio::test]
async fn test_malformed_body_is_structured_400() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/analytics",
        Some(json!({ "analysisType": "horoscope" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "body");
}

#[tokio::test]
async fn test_telemetry_then_alert_lifecycle() {
    let app = create_test_app();
    let ts = Utc::now() - Duration::minutes(5);

    let (status, body) = send(
        &app,
        "POST",
        "/api/telemetry",
        Some(sample("inv-7", ts, 60.0)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "recorded");
    let alert_id = body["alerts"][0]["id"].as_str().unwrap().to_owned();

    let (status, body) = send(
        &app,
        "POST",
        "/api/telemetry",
        Some(sample("inv-7", ts, 60.0)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "duplicate");

    let (status, body) = send(&app, "GET", "/api/alerts/inv-7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "POST",
        "/api/alerts",
        Some(json!({ "alertId": alert_id, "action": "resolve" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "resolved");

    let (_, body) = send(&app, "GET", "/api/alerts/inv-7", None).await;
    assert!(body.as_array().unwrap().is_empty());
    let (_, body) = send(&app, "GET", "/api/alerts/inv-7?includeResolved=true", None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_alert_is_404() {
    let app = create_test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/alerts",
        Some(json!({ "alertId": "missing", "action": "acknowledge" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("missing"));
}

#[tokio::test]
async fn test_sparse_history_is_422() {
    let app = create_test_app();
    let ts = Utc::now() - Duration::hours(1);
    send(&app, "POST", "/api/telemetry", Some(sample("inv-8", ts, 95.0))).await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/analytics",
        Some(json!({ "equipmentId": "inv-8", "timeframe": "7d", "analysisType": "performance" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_performance_analysis_over_http() {
    let app = create_test_app();
    let now = Utc::now();
    let batch: Vec<Value> = (1..=8)
        .map(|h| sample("inv-9", now - Duration::hours(h), 96.0))
        .collect();
    let (status, body) = send(&app, "POST", "/api/telemetry", Some(Value::Array(batch))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recorded"], 8);

    let (status, body) = send(
        &app,
        "POST",
        "/api/analytics",
        Some(json!({
            "equipmentId": "inv-9",
            "timeframe": "7d",
            "analysisType": "performance",
            "includeRecommendations": true
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["analysisType"], "performance");
    assert!(body["recommendations"].is_array());
}

#[tokio::test]
async fn test_prediction_uses_stored_history() {
    let app = create_test_app();
    let now = Utc::now();
    let batch: Vec<Value> = (1..=10)
        .map(|d| sample("inv-10", now - Duration::days(d), 95.0))
        .collect();
    send(&app, "POST", "/api/telemetry", Some(Value::Array(batch))).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/analytics",
        Some(json!({ "equipmentId": "inv-10", "analysisType": "prediction" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["analysisType"], "prediction");
    assert!(body["result"]["data"].is_object());
}

#[tokio::test]
async fn test_truncated_json_is_structured_400() {
    let app = create_test_app();
    let (status, body) =
        send_raw(&app, "/api/compatibility", "application/json", r#"{"system": "#).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "body");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_wrong_content_type_is_structured_400() {
    let app = create_test_app();
    let (status, body) = send_raw(&app, "/api/telemetry", "text/plain", "{}").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "body");
}
