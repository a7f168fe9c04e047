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

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::Mutex;
use rusqlite::{OptionalExtension, params};
use serde::Deserialize;
use tracing::{debug, info};
use voltaic_core::{AlertStore, EquipmentCatalog, SampleStore};
use voltaic_types::{
    Alert, AlertDimension, AlertThresholds, EquipmentRecord, InverterSpec,
    PerformanceMetricSample, RackingSpec, TimeWindow,
};

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS samples (
        equipment_id       TEXT NOT NULL,
        timestamp          TEXT NOT NULL,
        equipment_type     TEXT NOT NULL,
        status             TEXT NOT NULL,
        efficiency         REAL NOT NULL,
        performance_ratio  REAL NOT NULL,
        availability       REAL NOT NULL,
        sample_json        TEXT NOT NULL,
        PRIMARY KEY (equipment_id, timestamp)
    );

    CREATE TABLE IF NOT EXISTS thresholds (
        equipment_id       TEXT PRIMARY KEY,
        thresholds_json    TEXT NOT NULL,
        updated_at         TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS alerts (
        id                 TEXT PRIMARY KEY,
        equipment_id       TEXT NOT NULL,
        dimension          TEXT NOT NULL,
        state              TEXT NOT NULL,
        severity           TEXT NOT NULL,
        created_at         TEXT NOT NULL,
        alert_json         TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_alerts_equipment_dimension
        ON alerts(equipment_id, dimension, state);

    CREATE TABLE IF NOT EXISTS equipment (
        id                 TEXT PRIMARY KEY,
        equipment_type     TEXT NOT NULL,
        record_json        TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS inverter_catalog (
        id                 TEXT PRIMARY KEY,
        spec_json          TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS racking_catalog (
        id                 TEXT PRIMARY KEY,
        spec_json          TEXT NOT NULL
    );";

/// Fixed-width UTC text so that string order matches time order
fn ts_key(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn decode<T: for<'de> Deserialize<'de>>(json: &str, what: &str) -> Result<T> {
    serde_json::from_str(json).with_context(|| format!("Corrupt {what} row"))
}

/// Catalog contents imported in one go, e.g. from a seed file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogSeed {
    #[serde(default)]
    pub equipment: Vec<EquipmentRecord>,
    #[serde(default)]
    pub inverters: Vec<InverterSpec>,
    #[serde(default)]
    pub racking: Vec<RackingSpec>,
}

/// One SQLite database backing samples, alerts and the equipment catalog
#[derive(Debug)]
pub struct SqliteStore {
    conn: Mutex<rusqlite::Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> Result<Self> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let conn = rusqlite::Connection::open(path)
            .with_context(|| format!("Failed to open database: {path}"))?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = rusqlite::Connection::open_in_memory()
            .context("Failed to open in-memory database")?;
        Self::init(conn)
    }

    fn init(conn: rusqlite::Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)
            .context("Failed to initialize database schema")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Delete samples older than `retention_days`. Alerts are kept.
    pub fn cleanup_old_samples(&self, retention_days: u32) -> Result<u64> {
        let conn = self.conn.lock();
        let cutoff = Utc::now() - chrono::Duration::days(i64::from(retention_days));
        let deleted = conn.execute(
            "DELETE FROM samples WHERE timestamp < ?1",
            params![ts_key(cutoff)],
        )?;
        Ok(deleted as u64)
    }

    pub fn sample_count(&self, equipment_id: &str) -> Result<u64> {
        let conn = self.conn.lock();
        let count: u64 = conn.query_row(
            "SELECT COUNT(*) FROM samples WHERE equipment_id = ?1",
            params![equipment_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn put_equipment(&self, record: &EquipmentRecord) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO equipment (id, equipment_type, record_json) VALUES (?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET equipment_type = ?2, record_json = ?3",
            params![
                record.id,
                record.equipment_type.as_str(),
                serde_json::to_string(record)?
            ],
        )?;
        Ok(())
    }

    pub fn put_inverter(&self, inverter: &InverterSpec) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO inverter_catalog (id, spec_json) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET spec_json = ?2",
            params![inverter.id, serde_json::to_string(inverter)?],
        )?;
        Ok(())
    }

    pub fn put_racking(&self, racking: &RackingSpec) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO racking_catalog (id, spec_json) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET spec_json = ?2",
            params![racking.id, serde_json::to_string(racking)?],
        )?;
        Ok(())
    }

    /// Upsert every entry of a seed
    pub fn import_catalog(&self, seed: &CatalogSeed) -> Result<()> {
        for record in &seed.equipment {
            self.put_equipment(record)?;
        }
        for inverter in &seed.inverters {
            self.put_inverter(inverter)?;
        }
        for racking in &seed.racking {
            self.put_racking(racking)?;
        }
        info!(
            equipment = seed.equipment.len(),
            inverters = seed.inverters.len(),
            racking = seed.racking.len(),
            "Catalog imported"
        );
        Ok(())
    }

    fn json_column<T: for<'de> Deserialize<'de>>(&self, sql: &str, what: &str) -> Result<Vec<T>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        rows.iter().map(|json| decode(json, what)).collect()
    }
}

impl SampleStore for SqliteStore {
    fn upsert_sample(&self, sample: &PerformanceMetricSample) -> Result<bool> {
        let conn = self.conn.lock();
        let inserted = conn
            .execute(
                "INSERT OR IGNORE INTO samples
                    (equipment_id, timestamp, equipment_type, status, efficiency,
                     performance_ratio, availability, sample_json)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    sample.equipment_id,
                    ts_key(sample.timestamp),
                    sample.equipment_type.as_str(),
                    sample.realtime.status.to_string(),
                    sample.realtime.efficiency,
                    sample.calculated.performance_ratio,
                    sample.calculated.availability,
                    serde_json::to_string(sample)?,
                ],
            )
            .context("Failed to insert sample")?;
        Ok(inserted > 0)
    }

    fn remove_sample(&self, equipment_id: &str, timestamp: DateTime<Utc>) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "DELETE FROM samples WHERE equipment_id = ?1 AND timestamp = ?2",
            params![equipment_id, ts_key(timestamp)],
        )
        .context("Failed to remove sample")?;
        Ok(())
    }

    fn samples_in(
        &self,
        equipment_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<PerformanceMetricSample>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT sample_json FROM samples
             WHERE equipment_id = ?1 AND timestamp >= ?2 AND timestamp <= ?3
             ORDER BY timestamp ASC",
        )?;
        let rows = stmt
            .query_map(
                params![equipment_id, ts_key(window.start), ts_key(window.end)],
                |row| row.get::<_, String>(0),
            )?
            .collect::<Result<Vec<_>, _>>()?;
        debug!(equipment_id, rows = rows.len(), "Samples loaded");
        rows.iter().map(|json| decode(json, "sample")).collect()
    }

    fn latest_sample(&self, equipment_id: &str) -> Result<Option<PerformanceMetricSample>> {
        let conn = self.conn.lock();
        let json: Option<String> = conn
            .query_row(
                "SELECT sample_json FROM samples WHERE equipment_id = ?1
                 ORDER BY timestamp DESC LIMIT 1",
                params![equipment_id],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|j| decode(&j, "sample")).transpose()
    }
}

impl AlertStore for SqliteStore {
    fn thresholds(&self, equipment_id: &str) -> Result<Option<AlertThresholds>> {
        let conn = self.conn.lock();
        let json: Option<String> = conn
            .query_row(
                "SELECT thresholds_json FROM thresholds WHERE equipment_id = ?1",
                params![equipment_id],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|j| decode(&j, "thresholds")).transpose()
    }

    fn set_thresholds(&self, equipment_id: &str, thresholds: &AlertThresholds) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO thresholds (equipment_id, thresholds_json, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(equipment_id) DO UPDATE SET thresholds_json = ?2, updated_at = ?3",
            params![
                equipment_id,
                serde_json::to_string(thresholds)?,
                ts_key(Utc::now())
            ],
        )?;
        Ok(())
    }

    fn insert_alert(&self, alert: &Alert) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO alerts (id, equipment_id, dimension, state, severity, created_at, alert_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                alert.id,
                alert.equipment_id,
                alert.triggered_by.as_str(),
                alert.state.as_str(),
                alert.severity.to_string(),
                ts_key(alert.created_at),
                serde_json::to_string(alert)?,
            ],
        )
        .with_context(|| format!("Failed to insert alert {}", alert.id))?;
        Ok(())
    }

    fn update_alert(&self, alert: &Alert) -> Result<()> {
        let conn = self.conn.lock();
        let updated = conn.execute(
            "UPDATE alerts SET state = ?2, severity = ?3, alert_json = ?4 WHERE id = ?1",
            params![
                alert.id,
                alert.state.as_str(),
                alert.severity.to_string(),
                serde_json::to_string(alert)?,
            ],
        )?;
        anyhow::ensure!(updated == 1, "Alert {} does not exist", alert.id);
        Ok(())
    }

    fn alert(&self, id: &str) -> Result<Option<Alert>> {
        let conn = self.conn.lock();
        let json: Option<String> = conn
            .query_row(
                "SELECT alert_json FROM alerts WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|j| decode(&j, "alert")).transpose()
    }

    fn open_alert(&self, equipment_id: &str, dimension: AlertDimension) -> Result<Option<Alert>> {
        let conn = self.conn.lock();
        let json: Option<String> = conn
            .query_row(
                "SELECT alert_json FROM alerts
                 WHERE equipment_id = ?1 AND dimension = ?2 AND state != 'resolved'
                 ORDER BY created_at DESC LIMIT 1",
                params![equipment_id, dimension.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|j| decode(&j, "alert")).transpose()
    }

    fn alerts_for(&self, equipment_id: &str, include_resolved: bool) -> Result<Vec<Alert>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT alert_json FROM alerts
             WHERE equipment_id = ?1 AND (?2 OR state != 'resolved')",
        )?;
        let rows = stmt
            .query_map(params![equipment_id, include_resolved], |row| {
                row.get::<_, String>(0)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        let mut alerts = rows
            .iter()
            .map(|json| decode::<Alert>(json, "alert"))
            .collect::<Result<Vec<_>>>()?;
        alerts.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.triggered_by.cmp(&b.triggered_by))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(alerts)
    }
}

impl EquipmentCatalog for SqliteStore {
    fn equipment(&self, id: &str) -> Result<Option<EquipmentRecord>> {
        let conn = self.conn.lock();
        let json: Option<String> = conn
            .query_row(
                "SELECT record_json FROM equipment WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        json.map(|j| decode(&j, "equipment")).transpose()
    }

    fn inverters(&self) -> Result<Vec<InverterSpec>> {
        self.json_column("SELECT spec_json FROM inverter_catalog ORDER BY id", "inverter")
    }

    fn racking_systems(&self) -> Result<Vec<RackingSpec>> {
        self.json_column("SELECT spec_json FROM racking_catalog ORDER BY id", "racking")
    }
}
