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

//! Engine tuning knobs. Every section has serde defaults so a partial
//! `[engine]` table in the server config is enough.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use voltaic_types::AlertThresholds;

/// Upper bound for `reliability.lookback_days` (ten years)
pub const MAX_LOOKBACK_DAYS: i64 = 3650;
pub const MAX_FUTURE_SKEW_SECS: i64 = 86_400;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub analytics: AnalyticsSettings,
    #[serde(default)]
    pub alerts: AlertSettings,
    #[serde(default)]
    pub reliability: ReliabilitySettings,
    #[serde(default)]
    pub fleet: FleetSettings,
    #[serde(default)]
    pub ingest: IngestSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSettings {
    /// Fewer samples than this in a window is `InsufficientData`
    #[serde(default = "default_min_samples")]
    pub min_samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSettings {
    /// Resolve an open alert when a later sample satisfies its dimension
    #[serde(default)]
    pub auto_resolve: bool,
    /// Used for equipment that has no thresholds of its own
    #[serde(default)]
    pub default_thresholds: AlertThresholds,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilitySettings {
    /// Performance ratio at which maintenance is due
    #[serde(default = "default_failure_performance_ratio")]
    pub failure_performance_ratio: f64,
    /// Availability at which maintenance is due
    #[serde(default = "default_failure_availability")]
    pub failure_availability: f64,
    /// History considered by `predict_maintenance_needs`
    #[serde(default = "default_lookback_days")]
    pub lookback_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetSettings {
    /// Units this many standard deviations below the fleet mean are outliers
    #[serde(default = "default_outlier_sigma")]
    pub outlier_sigma: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestSettings {
    /// Samples stamped further than this in the future are rejected
    #[serde(default = "default_max_future_skew_secs")]
    pub max_future_skew_secs: i64,
}

fn default_min_samples() -> usize {
    6
}

fn default_failure_performance_ratio() -> f64 {
    70.0
}

fn default_failure_availability() -> f64 {
    90.0
}

fn default_lookback_days() -> i64 {
    90
}

fn default_outlier_sigma() -> f64 {
    1.0
}

fn default_max_future_skew_secs() -> i64 {
    300
}

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            min_samples: default_min_samples(),
        }
    }
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            auto_resolve: false,
            default_thresholds: AlertThresholds::default(),
        }
    }
}

impl Default for ReliabilitySettings {
    fn default() -> Self {
        Self {
            failure_performance_ratio: default_failure_performance_ratio(),
            failure_availability: default_failure_availability(),
            lookback_days: default_lookback_days(),
        }
    }
}

impl Default for FleetSettings {
    fn default() -> Self {
        Self {
            outlier_sigma: default_outlier_sigma(),
        }
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            max_future_skew_secs: default_max_future_skew_secs(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.analytics.min_samples < 3 {
            bail!("engine.analytics.min_samples must be at least 3 (degradation needs three thirds)");
        }
        if !(0.0..=100.0).contains(&self.reliability.failure_performance_ratio) {
            bail!("engine.reliability.failure_performance_ratio must be between 0 and 100");
        }
        if !(0.0..=100.0).contains(&self.reliability.failure_availability) {
            bail!("engine.reliability.failure_availability must be between 0 and 100");
        }
        if !(1..=MAX_LOOKBACK_DAYS).contains(&self.reliability.lookback_days) {
            bail!("engine.reliability.lookback_days must be between 1 and {MAX_LOOKBACK_DAYS}");
        }
        if self.fleet.outlier_sigma <= 0.0 {
            bail!("engine.fleet.outlier_sigma must be positive");
        }
        if !(0..=MAX_FUTURE_SKEW_SECS).contains(&self.ingest.max_future_skew_secs) {
            bail!("engine.ingest.max_future_skew_secs must be between 0 and {MAX_FUTURE_SKEW_SECS}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.analytics.min_samples, 6);
        assert!(!config.alerts.auto_resolve);
    }

    #[test]
    fn test_partial_section_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"alerts":{"auto_resolve":true}}"#).unwrap();
        assert!(config.alerts.auto_resolve);
        assert_eq!(config.alerts.default_thresholds, AlertThresholds::default());
        assert!((config.reliability.failure_performance_ratio - 70.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_unbounded_windows() {
        let mut config = EngineConfig::default();
        config.reliability.lookback_days = i64::MAX;
        assert!(config.validate().is_err());
        config.reliability.lookback_days = MAX_LOOKBACK_DAYS;
        assert!(config.validate().is_ok());

        config.ingest.max_future_skew_secs = i64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_tiny_min_samples() {
        let mut config = EngineConfig::default();
        config.analytics.min_samples = 2;
        assert!(config.validate().is_err());
    }
}
