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

//! Alert thresholds and the alert lifecycle.
//!
//! ```text
//! Active --acknowledge--> Acknowledged --resolve--> Resolved
//! Active --resolve------------------------------> Resolved
//! ```
//!
//! Nothing leaves `Resolved`; a new violation opens a new alert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::compatibility::Severity;

/// Per-equipment alert thresholds, replaced as a whole
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertThresholds {
    /// Minimum realtime efficiency (0-100%)
    pub min_efficiency: f64,
    /// Minimum calculated performance ratio (0-100)
    pub min_performance_ratio: f64,
    /// Maximum device temperature (°C)
    pub max_temperature: f64,
    /// Minimum calculated availability (0-100%)
    pub min_availability: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            min_efficiency: 80.0,
            min_performance_ratio: 75.0,
            max_temperature: 75.0,
            min_availability: 95.0,
        }
    }
}

/// Metric that triggered an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertDimension {
    Efficiency,
    PerformanceRatio,
    Temperature,
    Availability,
    /// Unit reported `fault` or `offline`
    Status,
}

impl AlertDimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Efficiency => "efficiency",
            Self::PerformanceRatio => "performance_ratio",
            Self::Temperature => "temperature",
            Self::Availability => "availability",
            Self::Status => "status",
        }
    }

    pub fn all() -> &'static [AlertDimension] {
        &[
            Self::Efficiency,
            Self::PerformanceRatio,
            Self::Temperature,
            Self::Availability,
            Self::Status,
        ]
    }
}

impl fmt::Display for AlertDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AlertDimension {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown alert dimension: '{s}'"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertState {
    Active,
    Acknowledged,
    Resolved,
}

impl AlertState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Acknowledged => "acknowledged",
            Self::Resolved => "resolved",
        }
    }

    /// Active and Acknowledged alerts are open
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Resolved)
    }
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AlertState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s {
            "active" => Ok(Self::Active),
            "acknowledged" => Ok(Self::Acknowledged),
            "resolved" => Ok(Self::Resolved),
            _ => Err(anyhow::anyhow!("Unknown alert state: '{s}'")),
        }
    }
}

/// Who closed the alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionSource {
    Operator,
    Automatic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot {action} alert in state {from}")]
pub struct TransitionError {
    pub from: AlertState,
    pub action: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub equipment_id: String,
    pub triggered_by: AlertDimension,
    pub severity: Severity,
    pub message: String,
    /// Metric value in the triggering sample
    pub observed_value: f64,
    /// Threshold that was crossed; `None` for status alerts
    pub threshold_value: Option<f64>,
    /// Timestamp of the triggering sample
    pub sample_timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub state: AlertState,
    #[serde(default)]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_by: Option<ResolutionSource>,
}

impl Alert {
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Active → Acknowledged
    pub fn acknowledge(&mut self, at: DateTime<Utc>) -> Result<(), TransitionError> {
        match self.state {
            AlertState::Active => {
                self.state = AlertState::Acknowledged;
                self.acknowledged_at = Some(at);
                Ok(())
            }
            AlertState::Acknowledged | AlertState::Resolved => Err(TransitionError {
                from: self.state,
                action: "acknowledge",
            }),
        }
    }

    /// Active | Acknowledged → Resolved
    pub fn resolve(
        &mut self,
        at: DateTime<Utc>,
        source: ResolutionSource,
    ) -> Result<(), TransitionError> {
        match self.state {
            AlertState::Active | AlertState::Acknowledged => {
                self.state = AlertState::Resolved;
                self.resolved_at = Some(at);
                self.resolved_by = Some(source);
                Ok(())
            }
            AlertState::Resolved => Err(TransitionError {
                from: self.state,
                action: "resolve",
            }),
        }
    }
}
