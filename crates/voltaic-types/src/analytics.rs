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

//! Read-models derived on demand from stored samples.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::equipment::EquipmentType;

// ============= Timeframes =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeframePreset {
    #[serde(rename = "24h")]
    Day,
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
}

impl TimeframePreset {
    pub fn duration(self) -> Duration {
        match self {
            Self::Day => Duration::days(1),
            Self::Week => Duration::days(7),
            Self::Month => Duration::days(30),
            Self::Quarter => Duration::days(90),
            Self::Year => Duration::days(365),
        }
    }
}

/// Analysis window: a preset ending now, or an explicit range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timeframe {
    Preset(TimeframePreset),
    Range {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

impl Timeframe {
    pub fn last_days(days: i64, now: DateTime<Utc>) -> Self {
        Self::Range {
            start: now - Duration::days(days),
            end: now,
        }
    }

    /// Resolve to a concrete, inclusive window
    pub fn resolve(&self, now: DateTime<Utc>) -> TimeWindow {
        match *self {
            Self::Preset(preset) => TimeWindow {
                start: now - preset.duration(),
                end: now,
            },
            Self::Range { start, end } => TimeWindow { start, end },
        }
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::Preset(TimeframePreset::Month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts <= self.end
    }
}

// ============= Performance =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceTrend {
    Improving,
    Stable,
    Declining,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBreakdown {
    pub normal: u32,
    pub warning: u32,
    pub fault: u32,
    pub offline: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceAnalysis {
    pub equipment_id: String,
    pub window: TimeWindow,
    pub sample_count: usize,
    pub first_sample_at: DateTime<Utc>,
    pub last_sample_at: DateTime<Utc>,
    /// Sum of energy produced (kWh)
    pub total_energy_kwh: f64,
    pub mean_performance_ratio: f64,
    pub mean_efficiency: f64,
    pub mean_availability: f64,
    pub mean_capacity_utilization: f64,
    pub mean_temperature: f64,
    pub peak_power_w: f64,
    pub mean_data_completeness: f64,
    /// Mean of the three sample quality scores
    pub mean_quality_score: f64,
    /// Mean PR of the leading third of the window
    pub leading_performance_ratio: f64,
    /// Mean PR of the trailing third of the window
    pub trailing_performance_ratio: f64,
    /// PR points lost per year (positive means degrading)
    pub degradation_rate_per_year: f64,
    pub trend: PerformanceTrend,
    pub status_breakdown: StatusBreakdown,
}

// ============= Reliability =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

/// Days-until-threshold estimate with its uncertainty band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaysEstimate {
    pub days: f64,
    pub lower_days: f64,
    pub upper_days: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceUrgency {
    Immediate,
    Soon,
    Scheduled,
    Routine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenanceForecast {
    pub equipment_id: String,
    pub generated_at: DateTime<Utc>,
    pub window: TimeWindow,
    pub sample_count: usize,
    pub current_performance_ratio: f64,
    pub current_availability: f64,
    pub degradation_rate_per_year: f64,
    /// Least-squares availability slope (points per day)
    pub availability_trend_per_day: f64,
    pub failure_performance_ratio: f64,
    pub failure_availability: f64,
    /// `None` when the trend never reaches the threshold
    pub performance_threshold_eta: Option<DaysEstimate>,
    pub availability_threshold_eta: Option<DaysEstimate>,
    /// Earliest predicted threshold crossing
    pub predicted_maintenance_at: Option<DateTime<Utc>>,
    pub urgency: MaintenanceUrgency,
    pub confidence: ConfidenceLevel,
    /// Set when the estimate is based on sparse or low-quality data
    pub low_confidence: bool,
    pub recommended_actions: Vec<String>,
}

/// Fault/outage history over a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReliabilityReport {
    pub equipment_id: String,
    pub window: TimeWindow,
    pub sample_count: usize,
    pub mean_availability: f64,
    /// Share of samples reporting normal or warning status (0-100)
    pub uptime_pct: f64,
    /// Transitions into `fault`
    pub fault_events: u32,
    /// Transitions into `offline`
    pub offline_events: u32,
    pub mean_time_between_faults_hours: Option<f64>,
    pub degradation_rate_per_year: f64,
}

// ============= Fleet =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetEntry {
    pub rank: u32,
    pub equipment_id: String,
    pub performance_ratio: f64,
    pub efficiency: f64,
    pub availability: f64,
    pub total_energy_kwh: f64,
    /// Standard deviations from the fleet mean PR
    pub z_score: f64,
    pub outlier: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExcludedUnit {
    pub equipment_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FleetComparison {
    pub window: TimeWindow,
    pub ranking: Vec<FleetEntry>,
    pub fleet_mean_performance_ratio: f64,
    pub fleet_std_dev: f64,
    pub outliers: Vec<String>,
    pub excluded: Vec<ExcludedUnit>,
}

// ============= Benchmarks =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Benchmark {
    pub manufacturer: String,
    pub model: String,
    pub equipment_type: EquipmentType,
    pub mean_performance_ratio: f64,
    pub performance_ratio_std_dev: f64,
    pub mean_efficiency: f64,
    pub efficiency_std_dev: f64,
    /// Typical degradation (PR points per year)
    pub typical_degradation_rate: f64,
    pub source: String,
    /// Generic per-type curve used because the model is unknown
    pub is_stub: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkComparison {
    pub equipment_id: String,
    pub benchmark: Benchmark,
    pub analysis: PerformanceAnalysis,
    /// 0-100
    pub performance_ratio_percentile: f64,
    /// 0-100
    pub efficiency_percentile: f64,
}
