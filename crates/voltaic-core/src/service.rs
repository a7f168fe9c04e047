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

//! The four request/response contracts, wired over explicitly injected stores.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;
use voltaic_types::{
    Alert, AlertAction, AlertManagementRequest, AlertManagementResponse, AnalysisType,
    AnalyticsQuery, AnalyticsResponse, AnalyticsResult, CompatibilityReport, CompatibilityRequest,
    TelemetryResponse,
};

use crate::alerts::AlertEngine;
use crate::analytics::{
    Benchmarker, FleetComparator, PerformanceAnalyzer, ReliabilityPredictor, recommendations_for,
};
use crate::compatibility::CompatibilityEngine;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::memory::{MemoryAlertStore, MemorySampleStore};
use crate::store::{AlertStore, EquipmentCatalog, SampleStore};
use crate::telemetry::PerformanceRecorder;

pub struct VoltaicService {
    compatibility: CompatibilityEngine,
    recorder: PerformanceRecorder,
    alerts: Arc<AlertEngine>,
    analyzer: PerformanceAnalyzer,
    reliability: ReliabilityPredictor,
    fleet: FleetComparator,
    benchmarks: Benchmarker,
}

impl fmt::Debug for VoltaicService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoltaicService")
            .field("alerts", &self.alerts)
            .field("analyzer", &self.analyzer)
            .finish_non_exhaustive()
    }
}

impl VoltaicService {
    pub fn new(
        config: EngineConfig,
        samples: Arc<dyn SampleStore>,
        alert_store: Arc<dyn AlertStore>,
        catalog: Arc<dyn EquipmentCatalog>,
    ) -> Self {
        let alerts = Arc::new(AlertEngine::new(alert_store, config.alerts));
        let analyzer = PerformanceAnalyzer::new(Arc::clone(&samples), config.analytics);
        Self {
            compatibility: CompatibilityEngine::new(Arc::clone(&catalog)),
            recorder: PerformanceRecorder::new(samples, Arc::clone(&alerts), config.ingest),
            reliability: ReliabilityPredictor::new(analyzer.clone(), config.reliability),
            fleet: FleetComparator::new(analyzer.clone(), config.fleet),
            benchmarks: Benchmarker::new(catalog, analyzer.clone()),
            alerts,
            analyzer,
        }
    }

    /// Service over in-memory sample and alert stores
    pub fn in_memory(config: EngineConfig, catalog: Arc<dyn EquipmentCatalog>) -> Self {
        Self::new(
            config,
            Arc::new(MemorySampleStore::new()),
            Arc::new(MemoryAlertStore::new()),
            catalog,
        )
    }

    pub fn alerts(&self) -> &AlertEngine {
        &self.alerts
    }

    pub fn check_compatibility(&self, request: &CompatibilityRequest) -> Result<CompatibilityReport> {
        self.compatibility.report(request)
    }

    /// Record a single sample object or a batch array
    pub fn ingest_telemetry(&self, payload: Value) -> Result<TelemetryResponse> {
        self.recorder.ingest_json(payload)
    }

    pub fn query_analytics(&self, query: &AnalyticsQuery) -> Result<AnalyticsResponse> {
        let result = match query.analysis_type {
            AnalysisType::Performance => AnalyticsResult::Performance(
                self.analyzer
                    .analyze_performance(required_id(query)?, &query.timeframe)?,
            ),
            AnalysisType::Reliability => AnalyticsResult::Reliability(
                self.reliability
                    .reliability_report(required_id(query)?, &query.timeframe)?,
            ),
            AnalysisType::Prediction => AnalyticsResult::Prediction(
                self.reliability
                    .predict_maintenance_needs(required_id(query)?)?,
            ),
            AnalysisType::Benchmarking => AnalyticsResult::Benchmarking(
                self.benchmarks
                    .benchmark_equipment(required_id(query)?, &query.timeframe)?,
            ),
            AnalysisType::Comparison => AnalyticsResult::Comparison(
                self.fleet.compare_fleet_performance(
                    query.equipment_ids.as_deref().unwrap_or_default(),
                    &query.timeframe,
                )?,
            ),
        };

        let alerts = if query.include_alerts {
            Some(self.active_alerts_for(query)?)
        } else {
            None
        };
        let recommendations = query
            .include_recommendations
            .then(|| recommendations_for(&result));
        debug!(analysis_type = ?query.analysis_type, "Analytics query served");

        Ok(AnalyticsResponse {
            result,
            alerts,
            recommendations,
        })
    }

    fn active_alerts_for(&self, query: &AnalyticsQuery) -> Result<Vec<Alert>> {
        let mut alerts = Vec::new();
        for id in query.equipment_id.iter().chain(query.equipment_ids.iter().flatten()) {
            for alert in self.alerts.active_alerts(id)? {
                if !alerts.iter().any(|a: &Alert| a.id == alert.id) {
                    alerts.push(alert);
                }
            }
        }
        Ok(alerts)
    }

    pub fn manage_alerts(&self, request: AlertManagementRequest) -> Result<AlertManagementResponse> {
        match request {
            AlertManagementRequest::Transition { alert_id, action } => {
                let alert = match action {
                    AlertAction::Acknowledge => self.alerts.acknowledge_alert(&alert_id)?,
                    AlertAction::Resolve => self.alerts.resolve_alert(&alert_id)?,
                };
                Ok(AlertManagementResponse::Alert(alert))
            }
            AlertManagementRequest::Thresholds {
                equipment_id,
                thresholds,
            } => {
                let thresholds = self.alerts.set_alert_thresholds(&equipment_id, thresholds)?;
                Ok(AlertManagementResponse::Thresholds {
                    equipment_id,
                    thresholds,
                })
            }
        }
    }
}

fn required_id(query: &AnalyticsQuery) -> Result<&str> {
    query
        .equipment_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| EngineError::invalid("equipmentId", "required for this analysis type"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryCatalog;
    use crate::test_support::{sample_at, sample_config};
    use chrono::{Duration, Utc};
    use voltaic_types::{AlertState, AlertThresholds, CompatibilityOptions, Timeframe};

    fn service() -> VoltaicService {
        VoltaicService::in_memory(EngineConfig::default(), Arc::new(MemoryCatalog::new()))
    }

    fn query(analysis_type: AnalysisType) -> AnalyticsQuery {
        AnalyticsQuery {
            equipment_id: Some("inv-1".to_owned()),
            equipment_ids: None,
            timeframe: Timeframe::default(),
            analysis_type,
            include_alerts: false,
            include_recommendations: false,
        }
    }

    #[test]
    fn test_compatibility_contract() {
        let report = service()
            .check_compatibility(&CompatibilityRequest {
                system: sample_config(),
                options: CompatibilityOptions::default(),
            })
            .unwrap();
        assert!(report.compatibility.passed);
        assert!(report.analysis.is_some());
        assert!(report.alternatives.is_none());
    }

    #[test]
    fn test_ingest_then_query_with_alerts() {
        let service = service();
        let now = Utc::now();
        let samples: Vec<_> = (1..=8)
            .map(|h| {
                let mut s = sample_at("inv-1", now - Duration::hours(h));
                s.realtime.efficiency = 60.0;
                s
            })
            .collect();
        let TelemetryResponse::Batch(ingest) = service
            .ingest_telemetry(serde_json::to_value(&samples).unwrap())
            .unwrap()
        else {
            panic!("expected batch response");
        };
        assert_eq!(ingest.recorded, 8);

        let mut q = query(AnalysisType::Performance);
        q.include_alerts = true;
        q.include_recommendations = true;
        let response = service.query_analytics(&q).unwrap();
        assert!(matches!(response.result, AnalyticsResult::Performance(_)));
        assert_eq!(response.alerts.unwrap().len(), 1);
        assert!(!response.recommendations.unwrap().is_empty());
    }

    #[test]
    fn test_missing_equipment_id() {
        let mut q = query(AnalysisType::Reliability);
        q.equipment_id = None;
        let err = service().query_analytics(&q).unwrap_err();
        let EngineError::Validation(errors) = err else {
            panic!("expected validation error");
        };
        assert!(errors.contains_field("equipmentId"));

        let err = service()
            .query_analytics(&query(AnalysisType::Comparison))
            .unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
    }

    #[test]
    fn test_manage_alerts() {
        let service = service();
        let mut sample = sample_at("inv-1", Utc::now());
        sample.realtime.efficiency = 50.0;
        service
            .ingest_telemetry(serde_json::to_value(&sample).unwrap())
            .unwrap();
        let alert_id = service.alerts().active_alerts("inv-1").unwrap()[0].id.clone();

        let AlertManagementResponse::Alert(alert) = service
            .manage_alerts(AlertManagementRequest::Transition {
                alert_id: alert_id.clone(),
                action: AlertAction::Resolve,
            })
            .unwrap()
        else {
            panic!("expected alert");
        };
        assert_eq!(alert.state, AlertState::Resolved);

        let err = service
            .manage_alerts(AlertManagementRequest::Transition {
                alert_id,
                action: AlertAction::Acknowledge,
            })
            .unwrap_err();
        assert!(matches!(err, EngineError::NotFound { .. }));

        let response = service
            .manage_alerts(AlertManagementRequest::Thresholds {
                equipment_id: "inv-1".to_owned(),
                thresholds: AlertThresholds {
                    min_efficiency: 40.0,
                    ..AlertThresholds::default()
                },
            })
            .unwrap();
        assert!(matches!(response, AlertManagementResponse::Thresholds { .. }));
        assert!((service.alerts().thresholds_for("inv-1").unwrap().min_efficiency - 40.0).abs() < 1e-9);
    }
}
