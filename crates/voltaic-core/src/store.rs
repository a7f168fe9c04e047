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

//! Narrow interfaces to the external stores the engine depends on.
//!
//! Implementations must be safe to share across threads; the engine holds
//! them behind `Arc<dyn ...>`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use voltaic_types::{
    Alert, AlertDimension, AlertThresholds, EquipmentRecord, InverterSpec,
    PerformanceMetricSample, RackingSpec, TimeWindow,
};

/// Time-series store for telemetry samples
pub trait SampleStore: Send + Sync {
    /// Store the sample unless one with the same `(equipment_id, timestamp)`
    /// exists. Returns `true` when the sample was inserted.
    fn upsert_sample(&self, sample: &PerformanceMetricSample) -> Result<bool>;

    /// Drop a stored sample so a later delivery is recorded again
    fn remove_sample(&self, equipment_id: &str, timestamp: DateTime<Utc>) -> Result<()>;

    /// All samples of a unit within the window, oldest first
    fn samples_in(
        &self,
        equipment_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<PerformanceMetricSample>>;

    /// Most recent sample of a unit
    fn latest_sample(&self, equipment_id: &str) -> Result<Option<PerformanceMetricSample>>;
}

/// Key-value store for thresholds and alert state
pub trait AlertStore: Send + Sync {
    fn thresholds(&self, equipment_id: &str) -> Result<Option<AlertThresholds>>;

    /// Replace the whole threshold set of a unit
    fn set_thresholds(&self, equipment_id: &str, thresholds: &AlertThresholds) -> Result<()>;

    fn insert_alert(&self, alert: &Alert) -> Result<()>;

    /// Overwrite a stored alert (matched by id)
    fn update_alert(&self, alert: &Alert) -> Result<()>;

    fn alert(&self, id: &str) -> Result<Option<Alert>>;

    /// The Active or Acknowledged alert for a unit and dimension, if any
    fn open_alert(&self, equipment_id: &str, dimension: AlertDimension) -> Result<Option<Alert>>;

    /// Alerts of a unit, newest first
    fn alerts_for(&self, equipment_id: &str, include_resolved: bool) -> Result<Vec<Alert>>;
}

/// Read-only equipment catalog
pub trait EquipmentCatalog: Send + Sync {
    fn equipment(&self, id: &str) -> Result<Option<EquipmentRecord>>;

    /// Inverters offered as substitutes by the alternative generator
    fn inverters(&self) -> Result<Vec<InverterSpec>>;

    /// Racking systems offered as substitutes by the alternative generator
    fn racking_systems(&self) -> Result<Vec<RackingSpec>>;
}
