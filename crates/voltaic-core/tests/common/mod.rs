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

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Utc};
use voltaic_core::{EngineConfig, MemoryCatalog, VoltaicService};
use voltaic_types::{
    AlertThresholds, CalculatedMetrics, DataQuality, EnvironmentalConditions, EquipmentType,
    Installation, InverterKind, InverterSpec, Layout, Location, OperatingStatus, PanelSpec,
    PerformanceMetricSample, RealtimeMetrics, RoofType, ShadingLevel, SystemConfiguration,
};

/// 40 V STC panel with the standard certifications
pub fn panel(rated_power_w: f64) -> PanelSpec {
    PanelSpec {
        id: "pv-40v".to_owned(),
        manufacturer: "Sunward".to_owned(),
        model: "SW-40".to_owned(),
        rated_power_w,
        stc_voltage_v: 40.0,
        vmp_v: None,
        imp_a: None,
        isc_a: Some(9.8),
        voc_temp_coefficient_pct: -0.3,
        length_mm: 1700.0,
        width_mm: 1000.0,
        efficiency_pct: None,
        certifications: vec![
            "UL1703".to_owned(),
            "IEC 61215".to_owned(),
            "IEC 61730".to_owned(),
        ],
        unit_price: None,
    }
}

/// 6 kW string inverter accepting 200-600 V
pub fn inverter() -> InverterSpec {
    InverterSpec {
        id: "inv-200-600".to_owned(),
        manufacturer: "Gridline".to_owned(),
        model: "G6".to_owned(),
        kind: InverterKind::String,
        ac_capacity_w: 6000.0,
        min_input_voltage_v: 200.0,
        max_input_voltage_v: 600.0,
        max_input_current_a: None,
        mppt_count: 2,
        battery_voltage_min_v: None,
        battery_voltage_max_v: None,
        efficiency_pct: None,
        certifications: vec!["UL 1741".to_owned(), "IEEE 1547".to_owned()],
        unit_price: None,
    }
}

/// One string of `panels_per_string` panels, no racking, no site extremes
pub fn system(panels_per_string: u32, rated_power_w: f64) -> SystemConfiguration {
    SystemConfiguration {
        panels: vec![panel(rated_power_w)],
        inverter: inverter(),
        batteries: Vec::new(),
        racking: None,
        mounting: Vec::new(),
        electrical: Vec::new(),
        monitoring: Vec::new(),
        layout: Layout {
            panels_per_string,
            strings_per_inverter: 1,
            total_panels: panels_per_string,
            system_voltage_v: None,
            total_capacity_kw: None,
        },
        installation: Installation {
            roof_type: RoofType::AsphaltShingle,
            roof_pitch_deg: 20.0,
            azimuth_deg: 180.0,
            tilt_deg: 25.0,
            shading: ShadingLevel::None,
            location: Location {
                latitude: 40.0,
                longitude: -105.0,
                climate_zone: None,
                wind_zone: None,
                design_wind_speed_mph: None,
                snow_load_psf: None,
                min_design_temperature_c: None,
            },
        },
    }
}

pub fn sample(equipment_id: &str, timestamp: DateTime<Utc>, efficiency: f64) -> PerformanceMetricSample {
    PerformanceMetricSample {
        equipment_id: equipment_id.to_owned(),
        equipment_type: EquipmentType::Inverter,
        timestamp,
        realtime: RealtimeMetrics {
            power: 3900.0,
            voltage: 400.0,
            current: 9.75,
            temperature: 40.0,
            efficiency,
            status: OperatingStatus::Normal,
        },
        environmental: EnvironmentalConditions {
            irradiance: 800.0,
            ambient_temperature: 20.0,
            wind_speed: 2.0,
            humidity: 50.0,
            precipitation: false,
        },
        calculated: CalculatedMetrics {
            energy_produced: 0.98,
            performance_ratio: 84.0,
            capacity_utilization: 65.0,
            degradation_rate: 0.4,
            availability: 99.5,
        },
        quality: DataQuality {
            data_completeness: 99.0,
            measurement_accuracy: 98.0,
            signal_quality: 97.0,
            last_calibration: None,
        },
    }
}

/// Defaults, except that efficiency below 85 opens an alert
pub fn service() -> VoltaicService {
    let mut config = EngineConfig::default();
    config.alerts.default_thresholds = AlertThresholds {
        min_efficiency: 85.0,
        ..AlertThresholds::default()
    };
    VoltaicService::in_memory(config, Arc::new(MemoryCatalog::new()))
}
