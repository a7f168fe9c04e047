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

//! In-memory stores for tests and single-process deployments

use std::collections::{BTreeMap, HashMap};

use anyhow::{Result, bail};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use voltaic_types::{
    Alert, AlertDimension, AlertThresholds, EquipmentRecord, InverterSpec,
    PerformanceMetricSample, RackingSpec, TimeWindow,
};

use crate::store::{AlertStore, EquipmentCatalog, SampleStore};

/// Samples keyed by equipment id, then timestamp
#[derive(Debug, Default)]
pub struct MemorySampleStore {
    inner: RwLock<HashMap<String, BTreeMap<DateTime<Utc>, PerformanceMetricSample>>>,
}

impl MemorySampleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored samples for a unit
    pub fn count(&self, equipment_id: &str) -> usize {
        self.inner.read().get(equipment_id).map_or(0, BTreeMap::len)
    }
}

impl SampleStore for MemorySampleStore {
    fn upsert_sample(&self, sample: &PerformanceMetricSample) -> Result<bool> {
        let mut guard = self.inner.write();
        let series = guard.entry(sample.equipment_id.clone()).or_default();
        if series.contains_key(&sample.timestamp) {
            return Ok(false);
        }
        series.insert(sample.timestamp, sample.clone());
        Ok(true)
    }

    fn remove_sample(&self, equipment_id: &str, timestamp: DateTime<Utc>) -> Result<()> {
        if let Some(series) = self.inner.write().get_mut(equipment_id) {
            series.remove(&timestamp);
        }
        Ok(())
    }

    fn samples_in(
        &self,
        equipment_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<PerformanceMetricSample>> {
        if window.start > window.end {
            return Ok(Vec::new());
        }
        let guard = self.inner.read();
        Ok(guard
            .get(equipment_id)
            .map(|series| {
                series
                    .range(window.start..=window.end)
                    .map(|(_, s)| s.clone())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn latest_sample(&self, equipment_id: &str) -> Result<Option<PerformanceMetricSample>> {
        let guard = self.inner.read();
        Ok(guard
            .get(equipment_id)
            .and_then(|series| series.values().next_back().cloned()))
    }
}

#[derive(Debug, Default)]
struct AlertTables {
    thresholds: HashMap<String, AlertThresholds>,
    alerts: HashMap<String, Alert>,
}

#[derive(Debug, Default)]
pub struct MemoryAlertStore {
    inner: RwLock<AlertTables>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertStore for MemoryAlertStore {
    fn thresholds(&self, equipment_id: &str) -> Result<Option<AlertThresholds>> {
        Ok(self.inner.read().thresholds.get(equipment_id).copied())
    }

    fn set_thresholds(&self, equipment_id: &str, thresholds: &AlertThresholds) -> Result<()> {
        self.inner
            .write()
            .thresholds
            .insert(equipment_id.to_owned(), *thresholds);
        Ok(())
    }

    fn insert_alert(&self, alert: &Alert) -> Result<()> {
        let mut guard = self.inner.write();
        if guard.alerts.contains_key(&alert.id) {
            bail!("alert {} already exists", alert.id);
        }
        guard.alerts.insert(alert.id.clone(), alert.clone());
        Ok(())
    }

    fn update_alert(&self, alert: &Alert) -> Result<()> {
        let mut guard = self.inner.write();
        match guard.alerts.get_mut(&alert.id) {
            Some(existing) => {
                *existing = alert.clone();
                Ok(())
            }
            None => bail!("alert {} does not exist", alert.id),
        }
    }

    fn alert(&self, id: &str) -> Result<Option<Alert>> {
        Ok(self.inner.read().alerts.get(id).cloned())
    }

    fn open_alert(&self, equipment_id: &str, dimension: AlertDimension) -> Result<Option<Alert>> {
        let guard = self.inner.read();
        Ok(guard
            .alerts
            .values()
            .filter(|a| a.equipment_id == equipment_id && a.triggered_by == dimension && a.is_open())
            .max_by_key(|a| a.created_at)
            .cloned())
    }

    fn alerts_for(&self, equipment_id: &str, include_resolved: bool) -> Result<Vec<Alert>> {
        let guard = self.inner.read();
        let mut alerts: Vec<Alert> = guard
            .alerts
            .values()
            .filter(|a| a.equipment_id == equipment_id && (include_resolved || a.is_open()))
            .cloned()
            .collect();
        alerts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.triggered_by.cmp(&b.triggered_by))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(alerts)
    }
}

#[derive(Debug, Default)]
struct CatalogTables {
    equipment: HashMap<String, EquipmentRecord>,
    inverters: Vec<InverterSpec>,
    racking: Vec<RackingSpec>,
}

/// Catalog seeded programmatically or from a JSON document
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    inner: RwLock<CatalogTables>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_equipment(&self, record: EquipmentRecord) {
        self.inner
            .write()
            .equipment
            .insert(record.id.clone(), record);
    }

    pub fn add_inverter(&self, inverter: InverterSpec) {
        self.inner.write().inverters.push(inverter);
    }

    pub fn add_racking(&self, racking: RackingSpec) {
        self.inner.write().racking.push(racking);
    }
}

impl EquipmentCatalog for MemoryCatalog {
    fn equipment(&self, id: &str) -> Result<Option<EquipmentRecord>> {
        Ok(self.inner.read().equipment.get(id).cloned())
    }

    fn inverters(&self) -> Result<Vec<InverterSpec>> {
        Ok(self.inner.read().inverters.clone())
    }

    fn racking_systems(&self) -> Result<Vec<RackingSpec>> {
        Ok(self.inner.read().racking.clone())
    }
}
