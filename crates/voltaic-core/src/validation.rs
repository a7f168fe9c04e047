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

//! Input validation. Every validator walks the whole input and reports
//! every violated field; field paths use the camelCase wire names.

use chrono::{DateTime, Duration, Utc};
use voltaic_types::{
    AlertThresholds, BatterySpec, InverterSpec, PanelSpec, PerformanceMetricSample, RackingSpec,
    SystemConfiguration,
};

use crate::error::{Result, ValidationErrors};

fn check_finite(errors: &mut ValidationErrors, field: &str, value: f64) -> bool {
    if value.is_finite() {
        true
    } else {
        errors.push(field, "must be a finite number");
        false
    }
}

fn check_range(errors: &mut ValidationErrors, field: &str, value: f64, min: f64, max: f64) {
    if check_finite(errors, field, value) && !(min..=max).contains(&value) {
        errors.push(field, format!("must be between {min} and {max}"));
    }
}

fn check_positive(errors: &mut ValidationErrors, field: &str, value: f64) {
    if check_finite(errors, field, value) && value <= 0.0 {
        errors.push(field, "must be greater than 0");
    }
}

fn check_non_negative(errors: &mut ValidationErrors, field: &str, value: f64) {
    if check_finite(errors, field, value) && value < 0.0 {
        errors.push(field, "cannot be negative");
    }
}

fn check_optional_non_negative(errors: &mut ValidationErrors, field: &str, value: Option<f64>) {
    if let Some(v) = value {
        check_non_negative(errors, field, v);
    }
}

fn check_id(errors: &mut ValidationErrors, field: &str, id: &str) {
    if id.trim().is_empty() {
        errors.push(field, "cannot be empty");
    }
}

// ============= System Configuration =============

fn validate_panel(panel: &PanelSpec) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    check_id(&mut errors, "id", &panel.id);
    check_positive(&mut errors, "ratedPowerW", panel.rated_power_w);
    check_positive(&mut errors, "stcVoltageV", panel.stc_voltage_v);
    check_optional_non_negative(&mut errors, "vmpV", panel.vmp_v);
    check_optional_non_negative(&mut errors, "impA", panel.imp_a);
    check_optional_non_negative(&mut errors, "iscA", panel.isc_a);
    check_range(
        &mut errors,
        "vocTempCoefficientPct",
        panel.voc_temp_coefficient_pct,
        -1.0,
        1.0,
    );
    check_positive(&mut errors, "lengthMm", panel.length_mm);
    check_positive(&mut errors, "widthMm", panel.width_mm);
    if let Some(eff) = panel.efficiency_pct {
        check_range(&mut errors, "efficiencyPct", eff, 0.0, 100.0);
    }
    check_optional_non_negative(&mut errors, "unitPrice", panel.unit_price);
    errors
}

fn validate_inverter(inverter: &InverterSpec) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    check_id(&mut errors, "id", &inverter.id);
    check_positive(&mut errors, "acCapacityW", inverter.ac_capacity_w);
    check_non_negative(&mut errors, "minInputVoltageV", inverter.min_input_voltage_v);
    check_positive(&mut errors, "maxInputVoltageV", inverter.max_input_voltage_v);
    if inverter.min_input_voltage_v > inverter.max_input_voltage_v {
        errors.push(
            "minInputVoltageV",
            "cannot be greater than maxInputVoltageV",
        );
    }
    if let Some(current) = inverter.max_input_current_a {
        check_positive(&mut errors, "maxInputCurrentA", current);
    }
    if inverter.mppt_count == 0 {
        errors.push("mpptCount", "must be at least 1");
    }
    if let (Some(min), Some(max)) = (
        inverter.battery_voltage_min_v,
        inverter.battery_voltage_max_v,
    ) && min > max
    {
        errors.push(
            "batteryVoltageMinV",
            "cannot be greater than batteryVoltageMaxV",
        );
    }
    if let Some(eff) = inverter.efficiency_pct {
        check_range(&mut errors, "efficiencyPct", eff, 0.0, 100.0);
    }
    check_optional_non_negative(&mut errors, "unitPrice", inverter.unit_price);
    errors
}

fn validate_battery(battery: &BatterySpec) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    check_id(&mut errors, "id", &battery.id);
    check_positive(&mut errors, "capacityKwh", battery.capacity_kwh);
    check_positive(&mut errors, "nominalVoltageV", battery.nominal_voltage_v);
    check_optional_non_negative(&mut errors, "maxChargePowerW", battery.max_charge_power_w);
    check_optional_non_negative(&mut errors, "unitPrice", battery.unit_price);
    errors
}

fn validate_racking(racking: &RackingSpec) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    check_id(&mut errors, "id", &racking.id);
    check_non_negative(&mut errors, "minPanelLengthMm", racking.min_panel_length_mm);
    check_positive(&mut errors, "maxPanelLengthMm", racking.max_panel_length_mm);
    check_non_negative(&mut errors, "minPanelWidthMm", racking.min_panel_width_mm);
    check_positive(&mut errors, "maxPanelWidthMm", racking.max_panel_width_mm);
    if racking.min_panel_length_mm > racking.max_panel_length_mm {
        errors.push("minPanelLengthMm", "cannot be greater than maxPanelLengthMm");
    }
    if racking.min_panel_width_mm > racking.max_panel_width_mm {
        errors.push("minPanelWidthMm", "cannot be greater than maxPanelWidthMm");
    }
    if racking.supported_roof_types.is_empty() {
        errors.push("supportedRoofTypes", "must list at least one roof type");
    }
    check_optional_non_negative(&mut errors, "maxWindSpeedMph", racking.max_wind_speed_mph);
    check_optional_non_negative(&mut errors, "maxSnowLoadPsf", racking.max_snow_load_psf);
    errors
}

/// Validate a configuration before analysis
pub fn validate_configuration(config: &SystemConfiguration) -> Result<()> {
    let mut errors = ValidationErrors::new();

    // ============= Equipment =============
    if config.panels.is_empty() {
        errors.push("panels", "at least one panel spec is required");
    }
    for (i, panel) in config.panels.iter().enumerate() {
        errors.extend_prefixed(&format!("panels[{i}]"), validate_panel(panel));
    }
    errors.extend_prefixed("inverter", validate_inverter(&config.inverter));
    for (i, battery) in config.batteries.iter().enumerate() {
        errors.extend_prefixed(&format!("batteries[{i}]"), validate_battery(battery));
    }
    if let Some(racking) = &config.racking {
        errors.extend_prefixed("racking", validate_racking(racking));
    }

    // ============= Layout =============
    let layout = &config.layout;
    if layout.panels_per_string == 0 {
        errors.push("layout.panelsPerString", "must be at least 1");
    }
    if layout.strings_per_inverter == 0 {
        errors.push("layout.stringsPerInverter", "must be at least 1");
    }
    if layout.total_panels == 0 {
        errors.push("layout.totalPanels", "must be at least 1");
    }
    if let Some(v) = layout.system_voltage_v {
        check_positive(&mut errors, "layout.systemVoltageV", v);
    }
    if let Some(kw) = layout.total_capacity_kw {
        check_positive(&mut errors, "layout.totalCapacityKw", kw);
    }

    // ============= Installation =============
    let site = &config.installation;
    check_range(&mut errors, "installation.roofPitchDeg", site.roof_pitch_deg, 0.0, 90.0);
    check_range(&mut errors, "installation.azimuthDeg", site.azimuth_deg, 0.0, 360.0);
    check_range(&mut errors, "installation.tiltDeg", site.tilt_deg, 0.0, 90.0);
    check_range(
        &mut errors,
        "installation.location.latitude",
        site.location.latitude,
        -90.0,
        90.0,
    );
    check_range(
        &mut errors,
        "installation.location.longitude",
        site.location.longitude,
        -180.0,
        180.0,
    );
    check_optional_non_negative(
        &mut errors,
        "installation.location.designWindSpeedMph",
        site.location.design_wind_speed_mph,
    );
    check_optional_non_negative(
        &mut errors,
        "installation.location.snowLoadPsf",
        site.location.snow_load_psf,
    );
    if let Some(t) = site.location.min_design_temperature_c {
        check_range(
            &mut errors,
            "installation.location.minDesignTemperatureC",
            t,
            -70.0,
            60.0,
        );
    }

    errors.into_result()
}

// ============= Telemetry =============

/// Validate a telemetry sample, rejecting timestamps more than
/// `max_future_skew` ahead of `now`
pub fn validate_sample(
    sample: &PerformanceMetricSample,
    now: DateTime<Utc>,
    max_future_skew: Duration,
) -> Result<()> {
    sample_errors(sample, now, max_future_skew).into_result()
}

/// Same checks as [`validate_sample`], returning the collected errors
pub fn sample_errors(
    sample: &PerformanceMetricSample,
    now: DateTime<Utc>,
    max_future_skew: Duration,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    check_id(&mut errors, "equipmentId", &sample.equipment_id);
    if sample.timestamp > now + max_future_skew {
        errors.push(
            "timestamp",
            format!(
                "is more than {}s in the future",
                max_future_skew.num_seconds()
            ),
        );
    }

    let rt = &sample.realtime;
    check_non_negative(&mut errors, "realtime.power", rt.power);
    check_finite(&mut errors, "realtime.voltage", rt.voltage);
    check_finite(&mut errors, "realtime.current", rt.current);
    check_finite(&mut errors, "realtime.temperature", rt.temperature);
    check_range(&mut errors, "realtime.efficiency", rt.efficiency, 0.0, 100.0);

    let env = &sample.environmental;
    check_non_negative(&mut errors, "environmental.irradiance", env.irradiance);
    check_finite(
        &mut errors,
        "environmental.ambientTemperature",
        env.ambient_temperature,
    );
    check_non_negative(&mut errors, "environmental.windSpeed", env.wind_speed);
    check_range(&mut errors, "environmental.humidity", env.humidity, 0.0, 100.0);

    let calc = &sample.calculated;
    check_non_negative(&mut errors, "calculated.energyProduced", calc.energy_produced);
    check_range(
        &mut errors,
        "calculated.performanceRatio",
        calc.performance_ratio,
        0.0,
        100.0,
    );
    check_range(
        &mut errors,
        "calculated.capacityUtilization",
        calc.capacity_utilization,
        0.0,
        100.0,
    );
    check_finite(&mut errors, "calculated.degradationRate", calc.degradation_rate);
    check_range(
        &mut errors,
        "calculated.availability",
        calc.availability,
        0.0,
        100.0,
    );

    let quality = &sample.quality;
    check_range(
        &mut errors,
        "quality.dataCompleteness",
        quality.data_completeness,
        0.0,
        100.0,
    );
    check_range(
        &mut errors,
        "quality.measurementAccuracy",
        quality.measurement_accuracy,
        0.0,
        100.0,
    );
    check_range(
        &mut errors,
        "quality.signalQuality",
        quality.signal_quality,
        0.0,
        100.0,
    );

    errors
}

// ============= Thresholds =============

pub fn validate_thresholds(thresholds: &AlertThresholds) -> Result<()> {
    let mut errors = ValidationErrors::new();
    check_range(
        &mut errors,
        "thresholds.minEfficiency",
        thresholds.min_efficiency,
        0.0,
        100.0,
    );
    check_range(
        &mut errors,
        "thresholds.minPerformanceRatio",
        thresholds.min_performance_ratio,
        0.0,
        100.0,
    );
    check_range(
        &mut errors,
        "thresholds.maxTemperature",
        thresholds.max_temperature,
        -40.0,
        150.0,
    );
    check_range(
        &mut errors,
        "thresholds.minAvailability",
        thresholds.min_availability,
        0.0,
        100.0,
    );
    errors.into_result()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::test_support::{sample_at, sample_config};

    fn field_errors(result: Result<()>) -> ValidationErrors {
        match result {
            Err(EngineError::Validation(errors)) => errors,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_configuration_passes() {
        assert!(validate_configuration(&sample_config()).is_ok());
    }

    #[test]
    fn test_configuration_reports_every_field() {
        let mut config = sample_config();
        config.panels[0].rated_power_w = -5.0;
        config.inverter.min_input_voltage_v = 700.0;
        config.layout.panels_per_string = 0;
        config.installation.tilt_deg = 120.0;

        let errors = field_errors(validate_configuration(&config));
        assert!(errors.contains_field("panels[0].ratedPowerW"));
        assert!(errors.contains_field("inverter.minInputVoltageV"));
        assert!(errors.contains_field("layout.panelsPerString"));
        assert!(errors.contains_field("installation.tiltDeg"));
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_empty_panel_list_rejected() {
        let mut config = sample_config();
        config.panels.clear();
        let errors = field_errors(validate_configuration(&config));
        assert!(errors.contains_field("panels"));
    }

    #[test]
    fn test_valid_sample_passes() {
        let now = Utc::now();
        let sample = sample_at("inv-1", now);
        assert!(validate_sample(&sample, now, Duration::seconds(300)).is_ok());
    }

    #[test]
    fn test_sample_reports_every_field() {
        let now = Utc::now();
        let mut sample = sample_at("inv-1", now);
        sample.realtime.efficiency = 140.0;
        sample.environmental.humidity = -1.0;
        sample.calculated.performance_ratio = f64::NAN;
        sample.quality.signal_quality = 101.0;

        let errors = field_errors(validate_sample(&sample, now, Duration::seconds(300)));
        assert_eq!(errors.len(), 4);
        assert!(errors.contains_field("realtime.efficiency"));
        assert!(errors.contains_field("environmental.humidity"));
        assert!(errors.contains_field("calculated.performanceRatio"));
        assert!(errors.contains_field("quality.signalQuality"));
    }

    #[test]
    fn test_future_timestamp_rejected() {
        let now = Utc::now();
        let sample = sample_at("inv-1", now + Duration::hours(1));
        let errors = field_errors(validate_sample(&sample, now, Duration::seconds(300)));
        assert!(errors.contains_field("timestamp"));

        let slightly_ahead = sample_at("inv-1", now + Duration::seconds(60));
        assert!(validate_sample(&slightly_ahead, now, Duration::seconds(300)).is_ok());
    }

    #[test]
    fn test_blank_equipment_id_rejected() {
        let now = Utc::now();
        let sample = sample_at("  ", now);
        let errors = sample_errors(&sample, now, Duration::seconds(300));
        assert!(errors.contains_field("equipmentId"));
    }

    #[test]
    fn test_thresholds_validation() {
        assert!(validate_thresholds(&AlertThresholds::default()).is_ok());
        let bad = AlertThresholds {
            min_efficiency: 120.0,
            min_availability: -3.0,
            ..AlertThresholds::default()
        };
        let errors = field_errors(validate_thresholds(&bad));
        assert_eq!(errors.len(), 2);
    }
}
