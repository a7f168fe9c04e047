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

//! Shared fixtures for unit tests

use chrono::{DateTime, Utc};
use voltaic_types::{
    CalculatedMetrics, DataQuality, EnvironmentalConditions, EquipmentType, Installation,
    InverterKind, InverterSpec, Layout, Location, OperatingStatus, PanelSpec,
    PerformanceMetricSample, RackingSpec, RealtimeMetrics, RoofType, ShadingLevel,
    SystemConfiguration,
};

pub fn panel() -> PanelSpec {
    PanelSpec {
        id: "panel-450".to_owned(),
        manufacturer: "Helios".to_owned(),
        model: "HX-450".to_owned(),
        rated_power_w: 450.0,
        stc_voltage_v: 40.0,
        vmp_v: Some(34.0),
        imp_a: Some(13.2),
        isc_a: Some(10.5),
        voc_temp_coefficient_pct: -0.29,
        length_mm: 1722.0,
        width_mm: 1134.0,
        efficiency_pct: Some(21.5),
        certifications: vec![
            "UL 1703".to_owned(),
            "IEC 61215".to_owned(),
            "IEC-61730".to_owned(),
        ],
        unit_price: Some(180.0),
    }
}

pub fn inverter() -> InverterSpec {
    InverterSpec {
        id: "inv-6k".to_owned(),
        manufacturer: "Voltra".to_owned(),
        model: "VS-6000".to_owned(),
        kind: InverterKind::String,
        ac_capacity_w: 6000.0,
        min_input_voltage_v: 200.0,
        max_input_voltage_v: 600.0,
        max_input_current_a: Some(15.0),
        mppt_count: 2,
        battery_voltage_min_v: None,
        battery_voltage_max_v: None,
        efficiency_pct: Some(97.5),
        certifications: vec!["UL 1741 SA".to_owned(), "IEEE 1547-2018".to_owned()],
        unit_price: Some(1400.0),
    }
}

pub fn racking() -> RackingSpec {
    RackingSpec {
        id: "rack-std".to_owned(),
        manufacturer: "IronRidge".to_owned(),
        model: "XR100".to_owned(),
        min_panel_length_mm: 1500.0,
        max_panel_length_mm: 2100.0,
        min_panel_width_mm: 900.0,
        max_panel_width_mm: 1200.0,
        supported_roof_types: vec![
            RoofType::AsphaltShingle,
            RoofType::Tile,
            RoofType::MetalStandingSeam,
        ],
        max_wind_speed_mph: Some(150.0),
        max_snow_load_psf: Some(50.0),
        unit_price: Some(45.0),
    }
}

/// 12 × 450 W panels in one string on a 6 kW inverter: 480 V, ratio 0.9
pub fn sample_config() -> SystemConfiguration {
    SystemConfiguration {
        panels: vec![panel()],
        inverter: inverter(),
        batteries: Vec::new(),
        racking: Some(racking()),
        mounting: Vec::new(),
        electrical: Vec::new(),
        monitoring: Vec::new(),
        layout: Layout {
            panels_per_string: 12,
            strings_per_inverter: 1,
            total_panels: 12,
            system_voltage_v: None,
            total_capacity_kw: Some(5.4),
        },
        installation: Installation {
            roof_type: RoofType::AsphaltShingle,
            roof_pitch_deg: 25.0,
            azimuth_deg: 180.0,
            tilt_deg: 30.0,
            shading: ShadingLevel::None,
            location: Location {
                latitude: 37.77,
                longitude: -122.42,
                climate_zone: Some("3C".to_owned()),
                wind_zone: None,
                design_wind_speed_mph: Some(110.0),
                snow_load_psf: Some(10.0),
                min_design_temperature_c: Some(-10.0),
            },
        },
    }
}

/// Healthy inverter sample at `timestamp`
pub fn sample_at(equipment_id: &str, timestamp: DateTime<Utc>) -> PerformanceMetricSample {
    PerformanceMetricSample {
        equipment_id: equipment_id.to_owned(),
        equipment_type: EquipmentType::Inverter,
        timestamp,
        realtime: RealtimeMetrics {
            power: 4200.0,
            voltage: 410.0,
            current: 10.2,
            temperature: 45.0,
            efficiency: 96.0,
            status: OperatingStatus::Normal,
        },
        environmental: EnvironmentalConditions {
            irradiance: 850.0,
            ambient_temperature: 24.0,
            wind_speed: 3.0,
            humidity: 40.0,
            precipitation: false,
        },
        calculated: CalculatedMetrics {
            energy_produced: 1.05,
            performance_ratio: 85.0,
            capacity_utilization: 70.0,
            degradation_rate: 0.5,
            availability: 99.0,
        },
        quality: DataQuality {
            data_completeness: 98.0,
            measurement_accuracy: 97.0,
            signal_quality: 95.0,
            last_calibration: None,
        },
    }
}

/// Sample with the given performance ratio and availability
pub fn sample_with(
    equipment_id: &str,
    timestamp: DateTime<Utc>,
    performance_ratio: f64,
    availability: f64,
) -> PerformanceMetricSample {
    let mut sample = sample_at(equipment_id, timestamp);
    sample.calculated.performance_ratio = performance_ratio;
    sample.calculated.availability = availability;
    sample
}
