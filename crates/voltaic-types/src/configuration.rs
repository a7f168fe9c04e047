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

//! Proposed system build submitted for compatibility analysis.

use serde::{Deserialize, Serialize};

use crate::equipment::{BatterySpec, ComponentSpec, InverterSpec, PanelSpec, RackingSpec, RoofType};

/// A proposed solar build. Analysis treats it as an immutable value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfiguration {
    pub panels: Vec<PanelSpec>,
    pub inverter: InverterSpec,
    #[serde(default)]
    pub batteries: Vec<BatterySpec>,
    #[serde(default)]
    pub racking: Option<RackingSpec>,
    #[serde(default)]
    pub mounting: Vec<ComponentSpec>,
    #[serde(default)]
    pub electrical: Vec<ComponentSpec>,
    #[serde(default)]
    pub monitoring: Vec<ComponentSpec>,
    pub layout: Layout,
    pub installation: Installation,
}

impl SystemConfiguration {
    /// Primary panel model (the first listed)
    pub fn primary_panel(&self) -> Option<&PanelSpec> {
        self.panels.first()
    }

    /// Total DC nameplate power of the array (W)
    pub fn total_dc_power_w(&self) -> f64 {
        self.primary_panel()
            .map_or(0.0, |p| p.rated_power_w * f64::from(self.layout.total_panels))
    }

    /// Total battery storage (kWh)
    pub fn battery_capacity_kwh(&self) -> f64 {
        self.batteries.iter().map(|b| b.capacity_kwh).sum()
    }
}

/// Electrical layout of the array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub panels_per_string: u32,
    pub strings_per_inverter: u32,
    pub total_panels: u32,
    /// Nominal system voltage (V)
    #[serde(default)]
    pub system_voltage_v: Option<f64>,
    /// Declared array capacity (kW)
    #[serde(default)]
    pub total_capacity_kw: Option<f64>,
}

/// Site conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Installation {
    pub roof_type: RoofType,
    /// Roof pitch (degrees)
    #[serde(default)]
    pub roof_pitch_deg: f64,
    /// Array azimuth, 0 = north, 180 = south (degrees)
    pub azimuth_deg: f64,
    /// Array tilt from horizontal (degrees)
    pub tilt_deg: f64,
    #[serde(default)]
    pub shading: ShadingLevel,
    pub location: Location,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ShadingLevel {
    #[default]
    None,
    Light,
    Moderate,
    Heavy,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub climate_zone: Option<String>,
    #[serde(default)]
    pub wind_zone: Option<String>,
    /// Design wind speed (mph)
    #[serde(default)]
    pub design_wind_speed_mph: Option<f64>,
    /// Ground snow load (psf)
    #[serde(default)]
    pub snow_load_psf: Option<f64>,
    /// Record low ambient temperature used for cold-weather Voc (°C)
    #[serde(default)]
    pub min_design_temperature_c: Option<f64>,
}
