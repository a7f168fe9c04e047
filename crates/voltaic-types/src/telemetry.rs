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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::equipment::EquipmentType;

/// Operating status reported by the unit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatingStatus {
    #[default]
    Normal,
    Warning,
    Fault,
    Offline,
}

impl fmt::Display for OperatingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Normal => write!(f, "normal"),
            Self::Warning => write!(f, "warning"),
            Self::Fault => write!(f, "fault"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// One telemetry snapshot for one equipment unit.
///
/// `(equipment_id, timestamp)` identifies the sample; stored samples are immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetricSample {
    pub equipment_id: String,
    pub equipment_type: EquipmentType,
    pub timestamp: DateTime<Utc>,
    pub realtime: RealtimeMetrics,
    pub environmental: EnvironmentalConditions,
    pub calculated: CalculatedMetrics,
    pub quality: DataQuality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RealtimeMetrics {
    /// Instantaneous output (W)
    pub power: f64,
    pub voltage: f64,
    pub current: f64,
    /// Device temperature (°C)
    pub temperature: f64,
    /// Conversion efficiency (0-100%)
    pub efficiency: f64,
    pub status: OperatingStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentalConditions {
    /// Plane-of-array irradiance (W/m²)
    pub irradiance: f64,
    pub ambient_temperature: f64,
    /// Wind speed (m/s)
    pub wind_speed: f64,
    /// Relative humidity (0-100%)
    pub humidity: f64,
    pub precipitation: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatedMetrics {
    /// Energy produced since the previous sample (kWh)
    pub energy_produced: f64,
    /// 0-100
    pub performance_ratio: f64,
    /// 0-100
    pub capacity_utilization: f64,
    /// %/year as reported by the unit
    pub degradation_rate: f64,
    /// 0-100
    pub availability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    /// 0-100
    pub data_completeness: f64,
    /// 0-100
    pub measurement_accuracy: f64,
    /// 0-100
    pub signal_quality: f64,
    #[serde(default)]
    pub last_calibration: Option<DateTime<Utc>>,
}

impl DataQuality {
    /// Mean of the three quality percentages
    pub fn score(&self) -> f64 {
        (self.data_completeness + self.measurement_accuracy + self.signal_quality) / 3.0
    }
}

// ============= Ingest Results =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    /// First delivery, stored
    Recorded,
    /// Same (equipmentId, timestamp) already stored, accepted as a no-op
    Duplicate,
    /// Failed validation, nothing stored
    Rejected,
}
