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

//! String voltage, input current, DC/AC sizing and battery pairing checks.

use voltaic_types::{
    CompatibilityDomain, CompatibilityIssue, ElectricalValidation, InverterKind, IssueKind,
    Severity, SystemConfiguration,
};

use crate::physics::{dc_ac_ratio, temperature_corrected_voltage};

/// Above this DC/AC ratio the inverter clips noticeably
pub const HIGH_OVERSIZING_RATIO: f64 = 1.5;

/// Below this DC/AC ratio the inverter is underused
pub const LOW_OVERSIZING_RATIO: f64 = 0.8;

const SCORE_CLEAN: u8 = 100;
const SCORE_WARNINGS: u8 = 85;
const SCORE_CRITICAL: u8 = 60;

fn issue(kind: IssueKind, severity: Severity, message: String) -> CompatibilityIssue {
    CompatibilityIssue::new(kind, CompatibilityDomain::Electrical, severity, message)
}

/// Strings sharing one MPPT input when strings are spread evenly
pub fn strings_per_mppt(config: &SystemConfiguration) -> u32 {
    config
        .layout
        .strings_per_inverter
        .div_ceil(config.inverter.mppt_count.max(1))
}

pub fn string_voltage(config: &SystemConfiguration) -> f64 {
    config.primary_panel().map_or(0.0, |p| {
        p.stc_voltage_v * f64::from(config.layout.panels_per_string)
    })
}

pub fn check_electrical(config: &SystemConfiguration) -> ElectricalValidation {
    let inverter = &config.inverter;
    let mut issues = Vec::new();
    let mut warnings = Vec::new();

    // ============= String Voltage =============
    let string_v = string_voltage(config);
    if string_v < inverter.min_input_voltage_v {
        issues.push(
            issue(
                IssueKind::VoltageTooLow,
                Severity::Critical,
                format!(
                    "String voltage {string_v:.1} V is below the inverter minimum input of {:.1} V",
                    inverter.min_input_voltage_v
                ),
            )
            .with_component(&inverter.id),
        );
    } else if string_v > inverter.max_input_voltage_v {
        issues.push(
            issue(
                IssueKind::VoltageTooHigh,
                Severity::Critical,
                format!(
                    "String voltage {string_v:.1} V exceeds the inverter maximum input of {:.1} V",
                    inverter.max_input_voltage_v
                ),
            )
            .with_component(&inverter.id),
        );
    }

    let cold_string_v = match (
        config.primary_panel(),
        config.installation.location.min_design_temperature_c,
    ) {
        (Some(panel), Some(t_min)) => Some(temperature_corrected_voltage(
            string_v,
            panel.voc_temp_coefficient_pct,
            t_min,
        )),
        _ => None,
    };
    if let Some(cold_v) = cold_string_v
        && string_v <= inverter.max_input_voltage_v
        && cold_v > inverter.max_input_voltage_v
    {
        warnings.push(
            issue(
                IssueKind::ColdVoltageExceedsMax,
                Severity::High,
                format!(
                    "String voltage rises to {cold_v:.1} V at the design minimum temperature, above the inverter maximum of {:.1} V",
                    inverter.max_input_voltage_v
                ),
            )
            .with_component(&inverter.id),
        );
    }

    // ============= Input Current =============
    let input_current = config
        .primary_panel()
        .and_then(|p| p.isc_a)
        .map(|isc| isc * f64::from(strings_per_mppt(config)));
    if let (Some(current), Some(max_current)) = (input_current, inverter.max_input_current_a)
        && current > max_current
    {
        issues.push(
            issue(
                IssueKind::CurrentTooHigh,
                Severity::Critical,
                format!(
                    "Input current {current:.1} A per MPPT exceeds the inverter limit of {max_current:.1} A"
                ),
            )
            .with_component(&inverter.id),
        );
    }

    // ============= DC/AC Sizing =============
    let ratio = dc_ac_ratio(config.total_dc_power_w(), inverter.ac_capacity_w);
    if ratio > HIGH_OVERSIZING_RATIO {
        warnings.push(issue(
            IssueKind::HighOversizing,
            Severity::Medium,
            format!("DC/AC ratio {ratio:.2} exceeds {HIGH_OVERSIZING_RATIO}; expect clipping losses"),
        ));
    } else if ratio > 0.0 && ratio < LOW_OVERSIZING_RATIO {
        warnings.push(issue(
            IssueKind::LowOversizing,
            Severity::Low,
            format!("DC/AC ratio {ratio:.2} is below {LOW_OVERSIZING_RATIO}; the inverter is oversized"),
        ));
    }

    // ============= Panel Mix =============
    if let Some(first) = config.primary_panel()
        && config
            .panels
            .iter()
            .any(|p| (p.stc_voltage_v - first.stc_voltage_v).abs() > 0.01)
    {
        warnings.push(issue(
            IssueKind::MixedPanelModels,
            Severity::Medium,
            "Panel models with different voltages are mixed; strings must not combine them"
                .to_owned(),
        ));
    }

    // ============= Batteries =============
    if !config.batteries.is_empty() {
        if inverter.kind == InverterKind::Hybrid {
            for battery in &config.batteries {
                let below = inverter
                    .battery_voltage_min_v
                    .is_some_and(|min| battery.nominal_voltage_v < min);
                let above = inverter
                    .battery_voltage_max_v
                    .is_some_and(|max| battery.nominal_voltage_v > max);
                if below || above {
                    issues.push(
                        issue(
                            IssueKind::BatteryVoltageMismatch,
                            Severity::Critical,
                            format!(
                                "Battery nominal voltage {:.1} V is outside the inverter battery window",
                                battery.nominal_voltage_v
                            ),
                        )
                        .with_component(&battery.id),
                    );
                }
            }
        } else {
            warnings.push(
                issue(
                    IssueKind::BatteryRequiresHybridInverter,
                    Severity::Medium,
                    "Batteries need a hybrid inverter or a separate battery inverter".to_owned(),
                )
                .with_component(&inverter.id),
            );
        }
    }

    let has_critical = issues.iter().any(CompatibilityIssue::is_critical);
    let score = if has_critical {
        SCORE_CRITICAL
    } else if issues.is_empty() && warnings.is_empty() {
        SCORE_CLEAN
    } else {
        SCORE_WARNINGS
    };

    ElectricalValidation {
        passed: !has_critical,
        string_voltage_v: string_v,
        cold_string_voltage_v: cold_string_v,
        input_current_a: input_current,
        dc_ac_ratio: ratio,
        issues,
        warnings,
        score,
    }
}
