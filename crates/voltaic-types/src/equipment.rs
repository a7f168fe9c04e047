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

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============= Equipment Type Enum =============

/// Class of a monitored or specified equipment unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentType {
    Panel,
    Inverter,
    Battery,
    Racking,
    Monitoring,
}

impl EquipmentType {
    /// Get config string value (snake_case)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Panel => "panel",
            Self::Inverter => "inverter",
            Self::Battery => "battery",
            Self::Racking => "racking",
            Self::Monitoring => "monitoring",
        }
    }

    /// List all equipment types
    pub fn all() -> &'static [EquipmentType] {
        &[
            Self::Panel,
            Self::Inverter,
            Self::Battery,
            Self::Racking,
            Self::Monitoring,
        ]
    }
}

impl fmt::Display for EquipmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EquipmentType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == s.to_lowercase())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "Unknown equipment type: '{}'. Supported types: {}",
                    s,
                    Self::all()
                        .iter()
                        .map(EquipmentType::as_str)
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

// ============= Inverter Kind =============

/// Inverter topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InverterKind {
    #[default]
    String,
    Micro,
    /// Battery-capable inverter with a DC battery port
    Hybrid,
    Central,
}

// ============= Roof Types =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoofType {
    AsphaltShingle,
    Tile,
    MetalStandingSeam,
    MetalCorrugated,
    Flat,
    Slate,
    GroundMount,
}

impl fmt::Display for RoofType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AsphaltShingle => "asphalt shingle",
            Self::Tile => "tile",
            Self::MetalStandingSeam => "standing-seam metal",
            Self::MetalCorrugated => "corrugated metal",
            Self::Flat => "flat",
            Self::Slate => "slate",
            Self::GroundMount => "ground mount",
        };
        write!(f, "{name}")
    }
}

// ============= Component Specs =============

/// Photovoltaic module datasheet values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSpec {
    pub id: String,
    pub manufacturer: String,
    pub model: String,
    /// Nameplate power at STC (W)
    pub rated_power_w: f64,
    /// Open-circuit voltage at STC (V)
    pub stc_voltage_v: f64,
    /// Voltage at maximum power point (V)
    #[serde(default)]
    pub vmp_v: Option<f64>,
    /// Current at maximum power point (A)
    #[serde(default)]
    pub imp_a: Option<f64>,
    /// Short-circuit current (A)
    #[serde(default)]
    pub isc_a: Option<f64>,
    /// Voc temperature coefficient in %/°C (negative for silicon)
    #[serde(default = "default_voc_temp_coefficient")]
    pub voc_temp_coefficient_pct: f64,
    pub length_mm: f64,
    pub width_mm: f64,
    /// Module efficiency (0-100%)
    #[serde(default)]
    pub efficiency_pct: Option<f64>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub unit_price: Option<f64>,
}

fn default_voc_temp_coefficient() -> f64 {
    -0.29
}

/// Inverter datasheet values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InverterSpec {
    pub id: String,
    pub manufacturer: String,
    pub model: String,
    #[serde(default)]
    pub kind: InverterKind,
    /// Rated AC output (W)
    pub ac_capacity_w: f64,
    /// Lower bound of the DC input (MPPT) window (V)
    pub min_input_voltage_v: f64,
    /// Absolute maximum DC input voltage (V)
    pub max_input_voltage_v: f64,
    /// Maximum DC input current per MPPT (A)
    #[serde(default)]
    pub max_input_current_a: Option<f64>,
    #[serde(default = "default_mppt_count")]
    pub mppt_count: u32,
    /// Battery port voltage window, hybrids only (V)
    #[serde(default)]
    pub battery_voltage_min_v: Option<f64>,
    #[serde(default)]
    pub battery_voltage_max_v: Option<f64>,
    #[serde(default)]
    pub efficiency_pct: Option<f64>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub unit_price: Option<f64>,
}

fn default_mppt_count() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatterySpec {
    pub id: String,
    pub manufacturer: String,
    pub model: String,
    pub capacity_kwh: f64,
    pub nominal_voltage_v: f64,
    #[serde(default)]
    pub max_charge_power_w: Option<f64>,
    #[serde(default)]
    pub chemistry: Option<String>,
    #[serde(default)]
    pub certifications: Vec<String>,
    #[serde(default)]
    pub unit_price: Option<f64>,
}

/// Racking system envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RackingSpec {
    pub id: String,
    pub manufacturer: String,
    pub model: String,
    pub min_panel_length_mm: f64,
    pub max_panel_length_mm: f64,
    pub min_panel_width_mm: f64,
    pub max_panel_width_mm: f64,
    pub supported_roof_types: Vec<RoofType>,
    /// Rated wind speed (mph)
    #[serde(default)]
    pub max_wind_speed_mph: Option<f64>,
    /// Rated snow load (psf)
    #[serde(default)]
    pub max_snow_load_psf: Option<f64>,
    /// Price per mounted panel
    #[serde(default)]
    pub unit_price: Option<f64>,
}

/// Mounting, electrical (BOS) or monitoring component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentSpec {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub manufacturer: Option<String>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: Option<f64>,
}

// ============= Catalog Record =============

/// Installed equipment unit as known to the catalog (read-only lookup)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentRecord {
    pub id: String,
    pub equipment_type: EquipmentType,
    pub manufacturer: String,
    pub model: String,
    /// Nameplate power (W), if applicable
    #[serde(default)]
    pub rated_power_w: Option<f64>,
    #[serde(default)]
    pub installed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equipment_type_from_str() {
        assert_eq!(
            "Inverter".parse::<EquipmentType>().unwrap(),
            EquipmentType::Inverter
        );
        let err = "turbine".parse::<EquipmentType>().unwrap_err();
        assert!(err.to_string().contains("panel, inverter"));
    }

    #[test]
    fn test_panel_spec_defaults() {
        let json = r#"{
            "id": "p1", "manufacturer": "Acme", "model": "A-400",
            "ratedPowerW": 400.0, "stcVoltageV": 40.0,
            "lengthMm": 1722.0, "widthMm": 1134.0
        }"#;
        let panel: PanelSpec = serde_json::from_str(json).unwrap();
        assert!((panel.voc_temp_coefficient_pct - (-0.29)).abs() < 1e-9);
        assert!(panel.certifications.is_empty());
        assert!(panel.isc_a.is_none());
    }

    #[test]
    fn test_roof_type_serialization() {
        let json = serde_json::to_string(&RoofType::MetalStandingSeam).unwrap();
        assert_eq!(json, "\"metal_standing_seam\"");
    }
}
