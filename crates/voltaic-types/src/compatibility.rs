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

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::configuration::SystemConfiguration;

/// Issue severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityDomain {
    Electrical,
    Physical,
    Regulatory,
}

/// Machine-readable issue type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    VoltageTooLow,
    VoltageTooHigh,
    ColdVoltageExceedsMax,
    CurrentTooHigh,
    HighOversizing,
    LowOversizing,
    MixedPanelModels,
    BatteryRequiresHybridInverter,
    BatteryVoltageMismatch,
    PanelDimensionsIncompatible,
    RoofTypeUnsupported,
    WindLoadExceeded,
    SnowLoadExceeded,
    MissingCertification,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub domain: CompatibilityDomain,
    pub severity: Severity,
    /// Id of the offending component, when one can be named
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    pub message: String,
}

impl CompatibilityIssue {
    pub fn new(
        kind: IssueKind,
        domain: CompatibilityDomain,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            domain,
            severity,
            component: None,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

/// Per-domain summary scores (0-100)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainScores {
    pub electrical: u8,
    pub physical: u8,
    pub regulatory: u8,
    pub overall: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElectricalValidation {
    pub passed: bool,
    /// Panel STC voltage × panels per string (V)
    pub string_voltage_v: f64,
    /// String voltage at the site's design minimum temperature (V)
    pub cold_string_voltage_v: Option<f64>,
    /// Worst-case DC input current per MPPT (A)
    pub input_current_a: Option<f64>,
    pub dc_ac_ratio: f64,
    pub issues: Vec<CompatibilityIssue>,
    pub warnings: Vec<CompatibilityIssue>,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalValidation {
    pub passed: bool,
    /// False when no racking spec was supplied and checks were skipped
    pub racking_checked: bool,
    pub issues: Vec<CompatibilityIssue>,
    pub warnings: Vec<CompatibilityIssue>,
    pub score: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceCheck {
    pub compliant: bool,
    pub missing_panel_certifications: Vec<String>,
    pub missing_inverter_certifications: Vec<String>,
    pub issues: Vec<CompatibilityIssue>,
    pub score: u8,
}

/// Aggregate compatibility verdict. Derived, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompatibilityResult {
    pub passed: bool,
    pub issues: Vec<CompatibilityIssue>,
    pub warnings: Vec<CompatibilityIssue>,
    pub scores: DomainScores,
}

impl CompatibilityResult {
    pub fn has_issue(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }

    pub fn has_warning(&self, kind: IssueKind) -> bool {
        self.warnings.iter().any(|w| w.kind == kind)
    }

    pub fn critical_issues(&self) -> impl Iterator<Item = &CompatibilityIssue> {
        self.issues.iter().filter(|i| i.is_critical())
    }
}

// ============= Alternatives =============

/// A single change applied to a configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigurationDelta {
    PanelsPerString { from: u32, to: u32 },
    StringsPerInverter { from: u32, to: u32 },
    TotalPanels { from: u32, to: u32 },
    SwapInverter { from: String, to: String },
    SwapRacking { from: Option<String>, to: String },
}

impl fmt::Display for ConfigurationDelta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PanelsPerString { from, to } if to < from => {
                write!(f, "reduce panels-per-string from {from} to {to}")
            }
            Self::PanelsPerString { from, to } => {
                write!(f, "increase panels-per-string from {from} to {to}")
            }
            Self::StringsPerInverter { from, to } => {
                write!(f, "change strings per inverter from {from} to {to}")
            }
            Self::TotalPanels { from, to } => write!(f, "change panel count from {from} to {to}"),
            Self::SwapInverter { from, to } => write!(f, "swap inverter {from} for {to}"),
            Self::SwapRacking { from: Some(from), to } => write!(f, "swap racking {from} for {to}"),
            Self::SwapRacking { from: None, to } => write!(f, "add racking {to}"),
        }
    }
}

/// Relative impact versus the submitted configuration (baseline = 100)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactScores {
    pub compatibility: f64,
    pub performance: f64,
    pub cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeConfiguration {
    pub rank: u32,
    pub description: String,
    pub deltas: Vec<ConfigurationDelta>,
    /// Issue kinds this alternative clears
    pub resolves: Vec<IssueKind>,
    pub impact: ImpactScores,
    pub configuration: SystemConfiguration,
}
