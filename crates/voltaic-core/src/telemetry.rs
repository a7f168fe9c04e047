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

//! Telemetry ingest: validate, store once per `(equipmentId, timestamp)`,
//! then hand first deliveries to the alert engine.

use std::fmt;
use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::Value;
use tracing::{debug, info, warn};
use voltaic_types::{
    BatchItemResult, FieldError, IngestResponse, PerformanceMetricSample, RecordResult,
    RecordStatus, TelemetryResponse,
};

use crate::alerts::AlertEngine;
use crate::analytics::stats::count_f64;
use crate::config::IngestSettings;
use crate::error::{EngineError, Result};
use crate::store::SampleStore;
use crate::validation::validate_sample;

pub struct PerformanceRecorder {
    samples: Arc<dyn SampleStore>,
    alerts: Arc<AlertEngine>,
    settings: IngestSettings,
}

impl fmt::Debug for PerformanceRecorder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerformanceRecorder")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PerformanceRecorder {
    pub fn new(
        samples: Arc<dyn SampleStore>,
        alerts: Arc<AlertEngine>,
        settings: IngestSettings,
    ) -> Self {
        Self {
            samples,
            alerts,
            settings,
        }
    }

    /// Validate and store one sample.
    ///
    /// A repeated delivery is reported as `Duplicate` and skips alert
    /// evaluation, which already ran for the first delivery. When evaluation
    /// fails the sample is removed again, so the retry is not a duplicate.
    pub fn record(&self, sample: &PerformanceMetricSample) -> Result<RecordResult> {
        validate_sample(
            sample,
            Utc::now(),
            Duration::seconds(self.settings.max_future_skew_secs),
        )?;

        if !self.samples.upsert_sample(sample)? {
            debug!(
                equipment_id = %sample.equipment_id,
                timestamp = %sample.timestamp,
                "Duplicate sample ignored"
            );
            return Ok(RecordResult {
                equipment_id: sample.equipment_id.clone(),
                timestamp: sample.timestamp,
                status: RecordStatus::Duplicate,
                alerts: Vec::new(),
            });
        }

        let alerts = match self.alerts.evaluate_sample(sample) {
            Ok(alerts) => alerts,
            Err(err) => {
                // roll back so a retried delivery is evaluated again
                if let Err(remove_err) = self
                    .samples
                    .remove_sample(&sample.equipment_id, sample.timestamp)
                {
                    warn!(
                        equipment_id = %sample.equipment_id,
                        error = %remove_err,
                        "Failed to roll back sample after alert evaluation error"
                    );
                }
                return Err(err);
            }
        };
        debug!(
            equipment_id = %sample.equipment_id,
            timestamp = %sample.timestamp,
            alerts = alerts.len(),
            "Sample recorded"
        );
        Ok(RecordResult {
            equipment_id: sample.equipment_id.clone(),
            timestamp: sample.timestamp,
            status: RecordStatus::Recorded,
            alerts,
        })
    }

    fn record_item(&self, index: usize, sample: &PerformanceMetricSample) -> BatchItemResult {
        match self.record(sample) {
            Ok(result) => BatchItemResult {
                index,
                equipment_id: Some(result.equipment_id),
                status: result.status,
                errors: Vec::new(),
                alerts: result.alerts,
            },
            Err(err) => rejected(index, Some(sample.equipment_id.clone()), item_errors(err)),
        }
    }

    /// Record every sample independently; one bad item never blocks the rest
    pub fn record_batch(&self, samples: &[PerformanceMetricSample]) -> IngestResponse {
        let results = samples
            .iter()
            .enumerate()
            .map(|(i, s)| self.record_item(i, s))
            .collect();
        summarize(results)
    }

    /// Ingest a raw JSON body: one sample object or an array of them.
    ///
    /// Array elements are decoded one by one so a malformed element is
    /// rejected on its own.
    pub fn ingest_json(&self, payload: Value) -> Result<TelemetryResponse> {
        match payload {
            Value::Array(items) => {
                if items.is_empty() {
                    return Err(EngineError::invalid("body", "batch cannot be empty"));
                }
                let results = items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        let equipment_id = item
                            .get("equipmentId")
                            .and_then(Value::as_str)
                            .map(str::to_owned);
                        match serde_json::from_value::<PerformanceMetricSample>(item) {
                            Ok(sample) => self.record_item(i, &sample),
                            Err(err) => rejected(
                                i,
                                equipment_id,
                                vec![FieldError::new(format!("[{i}]"), err.to_string())],
                            ),
                        }
                    })
                    .collect();
                Ok(TelemetryResponse::Batch(summarize(results)))
            }
            Value::Object(_) => {
                let sample: PerformanceMetricSample = serde_json::from_value(payload)
                    .map_err(|err| EngineError::invalid("body", err.to_string()))?;
                Ok(TelemetryResponse::Single(self.record(&sample)?))
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Err(
                EngineError::invalid("body", "expected a sample object or an array of samples"),
            ),
        }
    }
}

fn item_errors(err: EngineError) -> Vec<FieldError> {
    match err {
        EngineError::Validation(errors) => errors.into_vec(),
        other => {
            warn!(error = %other, "Batch item failed");
            vec![FieldError::new("sample", other.to_string())]
        }
    }
}

fn rejected(index: usize, equipment_id: Option<String>, errors: Vec<FieldError>) -> BatchItemResult {
    BatchItemResult {
        index,
        equipment_id,
        status: RecordStatus::Rejected,
        errors,
        alerts: Vec::new(),
    }
}

fn summarize(results: Vec<BatchItemResult>) -> IngestResponse {
    let count = |status| results.iter().filter(|r| r.status == status).count();
    let recorded = count(RecordStatus::Recorded);
    let duplicates = count(RecordStatus::Duplicate);
    let rejected = count(RecordStatus::Rejected);
    let success_rate = if results.is_empty() {
        100.0
    } else {
        count_f64(recorded + duplicates) / count_f64(results.len()) * 100.0
    };
    info!(
        total = results.len(),
        recorded, duplicates, rejected, "Telemetry batch ingested"
    );
    IngestResponse {
        results,
        recorded,
        duplicates,
        rejected,
        success_rate,
    }
}
