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

//! Request/response contracts through which the engine is invoked.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alert::{Alert, AlertThresholds};
use crate::analytics::{
    BenchmarkComparison, FleetComparison, MaintenanceForecast, PerformanceAnalysis,
    ReliabilityReport, Timeframe,
};
use crate::compatibility::{
    AlternativeConfiguration, CompatibilityResult, ComplianceCheck, ElectricalValidation,
    PhysicalValidation,
};
use crate::configuration::SystemConfiguration;
use crate::telemetry::RecordStatus;

/// A single invalid input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field path (e.g., "realtime.efficiency")
    pub field: String,
    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// ============= Compatibility =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityOptions {
    #[serde(default = "default_true")]
    pub include_recommendations: bool,
    #[serde(default)]
    pub include_alternatives: bool,
    #[serde(default = "default_true")]
    pub detailed_analysis: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CompatibilityOptions {
    fn default() -> Self {
        Self {
            include_recommendations: true,
            include_alternatives: false,
            detailed_analysis: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityRequest {
    pub system: SystemConfiguration,
    #[serde(default)]
    pub options: CompatibilityOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSummary {
    pub panel_count: u32,
    pub dc_capacity_kw: f64,
    pub inverter_ac_capacity_kw: f64,
    pub dc_ac_ratio: f64,
    pub string_voltage_v: f64,
    pub battery_capacity_kwh: f64,
    pub estimated_annual_production_kwh: f64,
    /// kWh per kWp per year
    pub specific_yield: f64,
}

/// Estimated production and the factors that shaped it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionEstimate {
    pub annual_production_kwh: f64,
    pub peak_sun_hours: f64,
    pub azimuth_factor: f64,
    pub tilt_factor: f64,
    pub shading_factor: f64,
    /// Fraction of DC energy lost to inverter clipping (0-1)
    pub clipping_loss: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityAnalysis {
    pub electrical_validation: ElectricalValidation,
    pub physical_validation: PhysicalValidation,
    pub performance_analysis: ProductionEstimate,
    pub compliance_check: ComplianceCheck,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityReport {
    pub compatibility: CompatibilityResult,
    pub system_summary: SystemSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<CompatibilityAnalysis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternatives: Option<Vec<AlternativeConfiguration>>,
}

// ============= Telemetry Ingest =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResult {
    pub equipment_id: String,
    pub timestamp: DateTime<Utc>,
    pub status: RecordStatus,
    /// Alerts opened or updated by this sample
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItemResult {
    pub index: usize,
    pub equipment_id: Option<String>,
    pub status: RecordStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<Alert>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestResponse {
    pub results: Vec<BatchItemResult>,
    pub recorded: usize,
    pub duplicates: usize,
    pub rejected: usize,
    /// Accepted (recorded + duplicate) share of the batch (0-100)
    pub success_rate: f64,
}

/// Response to a single-sample or batch telemetry delivery
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TelemetryResponse {
    Batch(IngestResponse),
    Single(RecordResult),
}

// ============= Analytics Query =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisType {
    Performance,
    Reliability,
    Comparison,
    Prediction,
    Benchmarking,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    #[serde(default)]
    pub equipment_id: Option<String>,
    #[serde(default)]
    pub equipment_ids: Option<Vec<String>>,
    #[serde(default)]
    pub timeframe: Timeframe,
    pub analysis_type: AnalysisType,
    #[serde(default)]
    pub include_alerts: bool,
    #[serde(default)]
    pub include_recommendations: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "analysisType", content = "data", rename_all = "lowercase")]
pub enum AnalyticsResult {
    Performance(PerformanceAnalysis),
    Reliability(ReliabilityReport),
    Comparison(FleetComparison),
    Prediction(MaintenanceForecast),
    Benchmarking(BenchmarkComparison),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub result: AnalyticsResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerts: Option<Vec<Alert>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<Vec<String>>,
}

// ============= Alert Management =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertAction {
    Acknowledge,
    Resolve,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlertManagementRequest {
    #[serde(rename_all = "camelCase")]
    Transition { alert_id: String, action: AlertAction },
    #[serde(rename_all = "camelCase")]
    Thresholds {
        equipment_id: String,
        thresholds: AlertThresholds,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlertManagementResponse {
    Alert(Alert),
    #[serde(rename_all = "camelCase")]
    Thresholds {
        equipment_id: String,
        thresholds: AlertThresholds,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alert_request_variants() {
        let transition: AlertManagementRequest =
            serde_json::from_str(r#"{"alertId":"a-1","action":"acknowledge"}"#).unwrap();
        assert_eq!(
            transition,
            AlertManagementRequest::Transition {
                alert_id: "a-1".to_owned(),
                action: AlertAction::Acknowledge,
            }
        );

        let thresholds: AlertManagementRequest = serde_json::from_str(
            r#"{"equipmentId":"inv-1","thresholds":{"minEfficiency":85,"minPerformanceRatio":80,"maxTemperature":70,"minAvailability":97}}"#,
        )
        .unwrap();
        assert!(matches!(
            thresholds,
            AlertManagementRequest::Thresholds { ref equipment_id, .. } if equipment_id == "inv-1"
        ));
    }

    #[test]
    fn test_compatibility_options_defaults() {
        let options: CompatibilityOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, CompatibilityOptions::default());
        assert!(options.include_recommendations);
        assert!(!options.include_alternatives);
    }

    #[test]
    fn test_analytics_query_defaults() {
        let query: AnalyticsQuery =
            serde_json::from_str(r#"{"equipmentId":"inv-1","analysisType":"performance"}"#)
                .unwrap();
        assert_eq!(query.timeframe, Timeframe::default());
        assert!(!query.include_alerts);
    }
}
