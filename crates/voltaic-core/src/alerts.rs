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

//! Threshold evaluation and the alert lifecycle.
//!
//! All reads and writes of one unit's thresholds and alerts happen under that
//! unit's lock, so concurrent samples for the same unit can never open two
//! alerts for one dimension. Different units never contend.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tracing::{debug, info};
use uuid::Uuid;
use voltaic_types::{
    Alert, AlertDimension, AlertState, AlertThresholds, OperatingStatus, PerformanceMetricSample,
    ResolutionSource, Severity,
};

use crate::config::AlertSettings;
use crate::error::{EngineError, Result};
use crate::store::AlertStore;
use crate::validation::validate_thresholds;

/// Margin (points or °C) past the threshold at which severity escalates
const CRITICAL_MARGIN: f64 = 20.0;
const HIGH_MARGIN: f64 = 10.0;

/// Map size past which idle entries are dropped
const LOCK_PRUNE_THRESHOLD: usize = 1024;

/// One mutex per key, created on first use.
///
/// Once the map grows past [`LOCK_PRUNE_THRESHOLD`] entries, locks nobody
/// holds a handle to are removed before a new one is added.
#[derive(Debug, Default)]
pub struct KeyedLocks {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        let mut map = self.locks.lock();
        if map.len() >= LOCK_PRUNE_THRESHOLD && !map.contains_key(key) {
            map.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        Arc::clone(map.entry(key.to_owned()).or_default())
    }

    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}

/// A threshold crossed by one sample
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub dimension: AlertDimension,
    pub severity: Severity,
    pub observed: f64,
    pub threshold: Option<f64>,
    pub message: String,
}

fn severity_for_margin(margin: f64) -> Severity {
    if margin >= CRITICAL_MARGIN {
        Severity::Critical
    } else if margin >= HIGH_MARGIN {
        Severity::High
    } else {
        Severity::Medium
    }
}

fn below(
    dimension: AlertDimension,
    label: &str,
    observed: f64,
    minimum: f64,
) -> Option<Violation> {
    (observed < minimum).then(|| Violation {
        dimension,
        severity: severity_for_margin(minimum - observed),
        observed,
        threshold: Some(minimum),
        message: format!("{label} {observed:.1} is below the minimum of {minimum:.1}"),
    })
}

fn status_code(status: OperatingStatus) -> f64 {
    match status {
        OperatingStatus::Normal => 0.0,
        OperatingStatus::Warning => 1.0,
        OperatingStatus::Fault => 2.0,
        OperatingStatus::Offline => 3.0,
    }
}

/// Threshold violations in one sample, in dimension order
pub fn violations(sample: &PerformanceMetricSample, thresholds: &AlertThresholds) -> Vec<Violation> {
    let mut out = Vec::new();

    out.extend(below(
        AlertDimension::Efficiency,
        "Efficiency",
        sample.realtime.efficiency,
        thresholds.min_efficiency,
    ));
    out.extend(below(
        AlertDimension::PerformanceRatio,
        "Performance ratio",
        sample.calculated.performance_ratio,
        thresholds.min_performance_ratio,
    ));

    let temperature = sample.realtime.temperature;
    if temperature > thresholds.max_temperature {
        out.push(Violation {
            dimension: AlertDimension::Temperature,
            severity: severity_for_margin(temperature - thresholds.max_temperature),
            observed: temperature,
            threshold: Some(thresholds.max_temperature),
            message: format!(
                "Temperature {temperature:.1} °C exceeds the maximum of {:.1} °C",
                thresholds.max_temperature
            ),
        });
    }

    out.extend(below(
        AlertDimension::Availability,
        "Availability",
        sample.calculated.availability,
        thresholds.min_availability,
    ));

    let status = sample.realtime.status;
    let status_severity = match status {
        OperatingStatus::Fault => Some(Severity::Critical),
        OperatingStatus::Offline => Some(Severity::High),
        OperatingStatus::Normal | OperatingStatus::Warning => None,
    };
    if let Some(severity) = status_severity {
        out.push(Violation {
            dimension: AlertDimension::Status,
            severity,
            observed: status_code(status),
            threshold: None,
            message: format!("Unit reported {status} status"),
        });
    }

    out
}

/// Thresholds plus open-alert state for one unit
pub struct AlertEngine {
    store: Arc<dyn AlertStore>,
    settings: AlertSettings,
    locks: KeyedLocks,
}

impl fmt::Debug for AlertEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertEngine")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl AlertEngine {
    pub fn new(store: Arc<dyn AlertStore>, settings: AlertSettings) -> Self {
        Self {
            store,
            settings,
            locks: KeyedLocks::new(),
        }
    }

    /// Stored thresholds, or the configured defaults
    pub fn thresholds_for(&self, equipment_id: &str) -> Result<AlertThresholds> {
        Ok(self
            .store
            .thresholds(equipment_id)?
            .unwrap_or(self.settings.default_thresholds))
    }

    /// Replace the full threshold set of a unit
    pub fn set_alert_thresholds(
        &self,
        equipment_id: &str,
        thresholds: AlertThresholds,
    ) -> Result<AlertThresholds> {
        if equipment_id.trim().is_empty() {
            return Err(EngineError::invalid("equipmentId", "cannot be empty"));
        }
        validate_thresholds(&thresholds)?;

        let lock = self.locks.lock_for(equipment_id);
        let _guard = lock.lock();
        self.store.set_thresholds(equipment_id, &thresholds)?;
        info!(equipment_id, ?thresholds, "Alert thresholds replaced");
        Ok(thresholds)
    }

    /// Evaluate a sample against the unit's own thresholds
    pub fn evaluate_sample(&self, sample: &PerformanceMetricSample) -> Result<Vec<Alert>> {
        let lock = self.locks.lock_for(&sample.equipment_id);
        let _guard = lock.lock();
        let thresholds = self.thresholds_for(&sample.equipment_id)?;
        self.evaluate_locked(sample, &thresholds)
    }

    /// Evaluate a sample against explicit thresholds.
    ///
    /// Returns alerts opened by this sample and, with auto-resolve enabled,
    /// alerts it closed. A dimension that already has an open alert is skipped.
    pub fn evaluate(
        &self,
        sample: &PerformanceMetricSample,
        thresholds: &AlertThresholds,
    ) -> Result<Vec<Alert>> {
        let lock = self.locks.lock_for(&sample.equipment_id);
        let _guard = lock.lock();
        self.evaluate_locked(sample, thresholds)
    }

    fn evaluate_locked(
        &self,
        sample: &PerformanceMetricSample,
        thresholds: &AlertThresholds,
    ) -> Result<Vec<Alert>> {
        let equipment_id = sample.equipment_id.as_str();
        let found = violations(sample, thresholds);
        let mut changed = Vec::new();

        for violation in &found {
            if let Some(open) = self.store.open_alert(equipment_id, violation.dimension)? {
                debug!(
                    equipment_id,
                    alert_id = %open.id,
                    dimension = %violation.dimension,
                    "Violation already covered by an open alert"
                );
                continue;
            }

            let alert = Alert {
                id: Uuid::new_v4().to_string(),
                equipment_id: equipment_id.to_owned(),
                triggered_by: violation.dimension,
                severity: violation.severity,
                message: violation.message.clone(),
                observed_value: violation.observed,
                threshold_value: violation.threshold,
                sample_timestamp: sample.timestamp,
                created_at: Utc::now(),
                state: AlertState::Active,
                acknowledged_at: None,
                resolved_at: None,
                resolved_by: None,
            };
            self.store.insert_alert(&alert)?;
            info!(
                equipment_id,
                alert_id = %alert.id,
                dimension = %alert.triggered_by,
                severity = %alert.severity,
                "Alert opened"
            );
            changed.push(alert);
        }

        if self.settings.auto_resolve {
            for dimension in AlertDimension::all() {
                if found.iter().any(|v| v.dimension == *dimension) {
                    continue;
                }
                if let Some(mut open) = self.store.open_alert(equipment_id, *dimension)?
                    && open.resolve(Utc::now(), ResolutionSource::Automatic).is_ok()
                {
                    self.store.update_alert(&open)?;
                    info!(equipment_id, alert_id = %open.id, dimension = %dimension, "Alert auto-resolved");
                    changed.push(open);
                }
            }
        }

        Ok(changed)
    }

    /// Apply an operator transition to an alert. Unknown and already
    /// resolved alerts are both reported as not found.
    fn transition(
        &self,
        alert_id: &str,
        apply: impl FnOnce(&mut Alert) -> std::result::Result<(), voltaic_types::TransitionError>,
    ) -> Result<Alert> {
        let equipment_id = self
            .store
            .alert(alert_id)?
            .ok_or_else(|| EngineError::not_found("alert", alert_id))?
            .equipment_id;

        let lock = self.locks.lock_for(&equipment_id);
        let _guard = lock.lock();
        let mut alert = self
            .store
            .alert(alert_id)?
            .ok_or_else(|| EngineError::not_found("alert", alert_id))?;

        if let Err(err) = apply(&mut alert) {
            debug!(alert_id, %err, "Rejected alert transition");
            return Err(EngineError::not_found("open alert", alert_id));
        }
        self.store.update_alert(&alert)?;
        info!(alert_id, equipment_id = %alert.equipment_id, state = %alert.state, "Alert transitioned");
        Ok(alert)
    }

    /// Active → Acknowledged
    pub fn acknowledge_alert(&self, alert_id: &str) -> Result<Alert> {
        self.transition(alert_id, |alert| alert.acknowledge(Utc::now()))
    }

    /// Active | Acknowledged → Resolved
    pub fn resolve_alert(&self, alert_id: &str) -> Result<Alert> {
        self.transition(alert_id, |alert| {
            alert.resolve(Utc::now(), ResolutionSource::Operator)
        })
    }

    pub fn list_alerts(&self, equipment_id: &str, include_resolved: bool) -> Result<Vec<Alert>> {
        Ok(self.store.alerts_for(equipment_id, include_resolved)?)
    }

    pub fn active_alerts(&self, equipment_id: &str) -> Result<Vec<Alert>> {
        self.list_alerts(equipment_id, false)
    }
}
