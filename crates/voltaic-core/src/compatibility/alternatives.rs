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

//! Rule-driven alternative configurations.
//!
//! Each failing check maps to a few fixed candidate deltas. Every candidate is
//! re-analyzed and kept only if it clears the issue that produced it, so the
//! output is never better than "fixes what it claims to fix".

use std::cmp::Ordering;
use std::collections::HashSet;

use tracing::debug;
use voltaic_types::{
    AlternativeConfiguration, CompatibilityIssue, CompatibilityResult, ConfigurationDelta,
    ImpactScores, InverterSpec, IssueKind, RackingSpec, Severity, SystemConfiguration,
};

use super::analyze;
use super::electrical::{string_voltage, strings_per_mppt};
use super::physical::panel_fits;
use super::regulatory::missing_inverter_certifications;
use crate::physics::{estimate_production, temperature_corrected_voltage};

/// Upper bound on returned alternatives
pub const MAX_ALTERNATIVES: usize = 5;

/// DC/AC ratio the oversizing rules aim for
const TARGET_DC_AC_RATIO: f64 = 1.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Trigger {
    kind: IssueKind,
    severity: Severity,
}

impl Trigger {
    fn from_issue(issue: &CompatibilityIssue) -> Self {
        Self {
            kind: issue.kind,
            severity: issue.severity,
        }
    }

    /// Cleared when nothing of the same kind at this severity or worse remains
    fn cleared_by(self, result: &CompatibilityResult) -> bool {
        !result
            .issues
            .iter()
            .chain(&result.warnings)
            .any(|i| i.kind == self.kind && i.severity >= self.severity)
    }
}

#[derive(Debug)]
struct Candidate {
    trigger: Trigger,
    deltas: Vec<ConfigurationDelta>,
    configuration: SystemConfiguration,
}

#[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_count(value: f64) -> u32 {
    value.clamp(0.0, f64::from(u32::MAX)) as u32
}

/// Rough equipment cost from unit prices; unpriced items count as zero
pub fn estimated_cost(config: &SystemConfiguration) -> f64 {
    let panels = f64::from(config.layout.total_panels);
    let panel_cost = config
        .primary_panel()
        .and_then(|p| p.unit_price)
        .unwrap_or(0.0)
        * panels;
    let inverter_cost = config.inverter.unit_price.unwrap_or(0.0);
    let racking_cost = config
        .racking
        .as_ref()
        .and_then(|r| r.unit_price)
        .unwrap_or(0.0)
        * panels;
    let battery_cost: f64 = config.batteries.iter().filter_map(|b| b.unit_price).sum();
    let component_cost: f64 = config
        .mounting
        .iter()
        .chain(&config.electrical)
        .chain(&config.monitoring)
        .map(|c| c.unit_price.unwrap_or(0.0) * f64::from(c.quantity))
        .sum();
    panel_cost + inverter_cost + racking_cost + battery_cost + component_cost
}

/// `None` when the resulting panel count does not fit a `u32`
fn with_panels_per_string(
    config: &SystemConfiguration,
    pps: u32,
    trigger: Trigger,
) -> Option<Candidate> {
    let mut next = config.clone();
    let from_pps = config.layout.panels_per_string;
    let from_total = config.layout.total_panels;
    let to_total = pps.checked_mul(config.layout.strings_per_inverter)?;
    next.layout.panels_per_string = pps;
    next.layout.total_panels = to_total;

    let mut deltas = vec![ConfigurationDelta::PanelsPerString {
        from: from_pps,
        to: pps,
    }];
    if to_total != from_total {
        deltas.push(ConfigurationDelta::TotalPanels {
            from: from_total,
            to: to_total,
        });
    }
    Some(Candidate {
        trigger,
        deltas,
        configuration: next,
    })
}

/// Drop whole strings until the array holds at most `max_panels`
fn with_fewer_strings(
    config: &SystemConfiguration,
    max_panels: u32,
    trigger: Trigger,
) -> Option<Candidate> {
    let layout = &config.layout;
    if layout.panels_per_string == 0 {
        return None;
    }
    let strings = max_panels.div_euclid(layout.panels_per_string);
    if strings == 0 || strings >= layout.strings_per_inverter {
        return None;
    }
    let total = strings * layout.panels_per_string;

    let mut next = config.clone();
    next.layout.strings_per_inverter = strings;
    next.layout.total_panels = total;
    let mut deltas = vec![ConfigurationDelta::StringsPerInverter {
        from: layout.strings_per_inverter,
        to: strings,
    }];
    if total != layout.total_panels {
        deltas.push(ConfigurationDelta::TotalPanels {
            from: layout.total_panels,
            to: total,
        });
    }
    Some(Candidate {
        trigger,
        deltas,
        configuration: next,
    })
}

fn with_inverter(config: &SystemConfiguration, inverter: &InverterSpec, trigger: Trigger) -> Candidate {
    let mut next = config.clone();
    next.inverter = inverter.clone();
    Candidate {
        trigger,
        deltas: vec![ConfigurationDelta::SwapInverter {
            from: config.inverter.id.clone(),
            to: inverter.id.clone(),
        }],
        configuration: next,
    }
}

fn with_racking(config: &SystemConfiguration, racking: &RackingSpec, trigger: Trigger) -> Candidate {
    let mut next = config.clone();
    next.racking = Some(racking.clone());
    Candidate {
        trigger,
        deltas: vec![ConfigurationDelta::SwapRacking {
            from: config.racking.as_ref().map(|r| r.id.clone()),
            to: racking.id.clone(),
        }],
        configuration: next,
    }
}

/// Closest panels-per-string whose string voltage lands in the inverter window,
/// preferring counts that also stay below the maximum on the coldest day
fn nearest_valid_string_length(config: &SystemConfiguration) -> Option<u32> {
    let panel = config.primary_panel()?;
    let inverter = &config.inverter;
    if panel.stc_voltage_v <= 0.0 {
        return None;
    }

    let min_len = to_count((inverter.min_input_voltage_v / panel.stc_voltage_v).ceil()).max(1);
    let mut max_len = to_count((inverter.max_input_voltage_v / panel.stc_voltage_v).floor());
    if let Some(t_min) = config.installation.location.min_design_temperature_c {
        let cold_per_panel =
            temperature_corrected_voltage(panel.stc_voltage_v, panel.voc_temp_coefficient_pct, t_min);
        if cold_per_panel > 0.0 {
            let cold_max = to_count((inverter.max_input_voltage_v / cold_per_panel).floor());
            if cold_max >= min_len {
                max_len = max_len.min(cold_max);
            }
        }
    }
    (min_len <= max_len).then(|| config.layout.panels_per_string.clamp(min_len, max_len))
}

fn inverter_fits_string(config: &SystemConfiguration, inverter: &InverterSpec) -> bool {
    let v = string_voltage(config);
    v >= inverter.min_input_voltage_v && v <= inverter.max_input_voltage_v
}

fn inverter_carries_current(config: &SystemConfiguration, inverter: &InverterSpec) -> bool {
    let Some(isc) = config.primary_panel().and_then(|p| p.isc_a) else {
        return true;
    };
    let mut trial = config.clone();
    trial.inverter.mppt_count = inverter.mppt_count;
    inverter
        .max_input_current_a
        .is_some_and(|max| isc * f64::from(strings_per_mppt(&trial)) <= max)
}

fn collect_candidates(
    config: &SystemConfiguration,
    baseline: &CompatibilityResult,
    inverters: &[InverterSpec],
    racking_systems: &[RackingSpec],
) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    let mut handled = HashSet::new();
    let other_inverters = || inverters.iter().filter(|i| i.id != config.inverter.id);

    for issue in baseline.issues.iter().chain(&baseline.warnings) {
        let trigger = Trigger::from_issue(issue);
        if !handled.insert((trigger.kind, trigger.severity)) {
            continue;
        }
        match issue.kind {
            IssueKind::VoltageTooLow | IssueKind::VoltageTooHigh => {
                if let Some(pps) = nearest_valid_string_length(config)
                    && pps != config.layout.panels_per_string
                {
                    candidates.extend(with_panels_per_string(config, pps, trigger));
                }
                for inverter in other_inverters().filter(|i| inverter_fits_string(config, i)) {
                    candidates.push(with_inverter(config, inverter, trigger));
                }
            }
            IssueKind::CurrentTooHigh => {
                for inverter in other_inverters().filter(|i| inverter_carries_current(config, i)) {
                    candidates.push(with_inverter(config, inverter, trigger));
                }
            }
            IssueKind::RoofTypeUnsupported | IssueKind::PanelDimensionsIncompatible => {
                let current = config.racking.as_ref().map(|r| r.id.as_str());
                for racking in racking_systems.iter().filter(|r| {
                    Some(r.id.as_str()) != current
                        && r.supported_roof_types.contains(&config.installation.roof_type)
                        && config.panels.iter().all(|p| panel_fits(p, r))
                }) {
                    candidates.push(with_racking(config, racking, trigger));
                }
            }
            IssueKind::MissingCertification if issue.is_critical() => {
                for inverter in
                    other_inverters().filter(|i| missing_inverter_certifications(i).is_empty())
                {
                    candidates.push(with_inverter(config, inverter, trigger));
                }
            }
            IssueKind::HighOversizing => {
                if let Some(panel) = config.primary_panel()
                    && panel.rated_power_w > 0.0
                {
                    let target = to_count(
                        (TARGET_DC_AC_RATIO * config.inverter.ac_capacity_w / panel.rated_power_w)
                            .floor(),
                    );
                    candidates.extend(with_fewer_strings(config, target, trigger));
                }
                let dc = config.total_dc_power_w();
                for inverter in other_inverters().filter(|i| {
                    i.ac_capacity_w * TARGET_DC_AC_RATIO >= dc && inverter_fits_string(config, i)
                }) {
                    candidates.push(with_inverter(config, inverter, trigger));
                }
            }
            IssueKind::ColdVoltageExceedsMax
            | IssueKind::LowOversizing
            | IssueKind::MixedPanelModels
            | IssueKind::BatteryRequiresHybridInverter
            | IssueKind::BatteryVoltageMismatch
            | IssueKind::WindLoadExceeded
            | IssueKind::SnowLoadExceeded
            | IssueKind::MissingCertification => {}
        }
    }
    candidates
}

/// Issue kinds of `baseline` that `result` clears
fn resolved_kinds(baseline: &CompatibilityResult, result: &CompatibilityResult) -> Vec<IssueKind> {
    let mut resolves = Vec::new();
    for issue in baseline.issues.iter().chain(&baseline.warnings) {
        let trigger = Trigger::from_issue(issue);
        if trigger.cleared_by(result) && !resolves.contains(&issue.kind) {
            resolves.push(issue.kind);
        }
    }
    resolves
}

fn ratio_or_baseline(new: f64, old: f64) -> f64 {
    if old > 0.0 { 100.0 * new / old } else { 100.0 }
}

fn rank_order(a: &AlternativeConfiguration, b: &AlternativeConfiguration) -> Ordering {
    b.impact
        .compatibility
        .total_cmp(&a.impact.compatibility)
        .then_with(|| b.impact.performance.total_cmp(&a.impact.performance))
        .then_with(|| a.impact.cost.total_cmp(&b.impact.cost))
        .then_with(|| a.description.cmp(&b.description))
}

/// Propose verified alternatives for a configuration and its analysis result
pub fn generate_alternatives(
    config: &SystemConfiguration,
    baseline: &CompatibilityResult,
    inverters: &[InverterSpec],
    racking_systems: &[RackingSpec],
) -> Vec<AlternativeConfiguration> {
    let baseline_production = estimate_production(config).annual_production_kwh;
    let baseline_cost = estimated_cost(config);
    let baseline_criticals = baseline.critical_issues().count();

    let mut seen = HashSet::new();
    let mut alternatives: Vec<AlternativeConfiguration> = Vec::new();

    for candidate in collect_candidates(config, baseline, inverters, racking_systems) {
        let description = candidate
            .deltas
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        if !seen.insert(description.clone()) {
            continue;
        }

        let result = analyze(&candidate.configuration);
        if !candidate.trigger.cleared_by(&result)
            || result.critical_issues().count() > baseline_criticals
        {
            debug!(%description, "Discarding alternative that does not clear its trigger");
            continue;
        }

        let production = estimate_production(&candidate.configuration).annual_production_kwh;
        let impact = ImpactScores {
            compatibility: 100.0 + f64::from(result.scores.overall)
                - f64::from(baseline.scores.overall),
            performance: ratio_or_baseline(production, baseline_production),
            cost: ratio_or_baseline(estimated_cost(&candidate.configuration), baseline_cost),
        };

        alternatives.push(AlternativeConfiguration {
            rank: 0,
            description,
            deltas: candidate.deltas,
            resolves: resolved_kinds(baseline, &result),
            impact,
            configuration: candidate.configuration,
        });
    }

    alternatives.sort_by(rank_order);
    alternatives.truncate(MAX_ALTERNATIVES);
    for (rank, alt) in (1..).zip(alternatives.iter_mut()) {
        alt.rank = rank;
    }
    alternatives
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{inverter, racking, sample_config};
    use voltaic_types::RoofType;

    fn wide_inverter() -> InverterSpec {
        InverterSpec {
            id: "inv-wide".to_owned(),
            model: "VS-LV".to_owned(),
            min_input_voltage_v: 100.0,
            max_input_voltage_v: 600.0,
            unit_price: Some(1500.0),
            ..inverter()
        }
    }

    #[test]
    fn test_short_string_gets_longer_string_and_inverter_swap() {
        let mut config = sample_config();
        config.layout.panels_per_string = 3;
        config.layout.total_panels = 3;
        let baseline = analyze(&config);
        assert!(baseline.has_issue(IssueKind::VoltageTooLow));

        let alternatives = generate_alternatives(&config, &baseline, &[wide_inverter()], &[]);
        assert!(!alternatives.is_empty());
        for alt in &alternatives {
            let rerun = analyze(&alt.configuration);
            assert!(!rerun.has_issue(IssueKind::VoltageTooLow));
            assert!(alt.resolves.contains(&IssueKind::VoltageTooLow));
        }

        let string_fix = alternatives
            .iter()
            .find(|a| {
                a.deltas
                    .iter()
                    .any(|d| matches!(d, ConfigurationDelta::PanelsPerString { .. }))
            })
            .unwrap();
        // 200 V / 40 V = 5 panels minimum
        assert_eq!(string_fix.configuration.layout.panels_per_string, 5);
        assert_eq!(string_fix.configuration.layout.total_panels, 5);

        assert!(alternatives.iter().any(|a| a.deltas
            == vec![ConfigurationDelta::SwapInverter {
                from: "inv-6k".to_owned(),
                to: "inv-wide".to_owned(),
            }]));
        let ranks: Vec<u32> = alternatives.iter().map(|a| a.rank).collect();
        assert_eq!(ranks, (1..=u32::try_from(alternatives.len()).unwrap()).collect::<Vec<_>>());
    }

    #[test]
    fn test_long_string_is_shortened_cold_safe() {
        let mut config = sample_config();
        config.layout.panels_per_string = 16;
        config.layout.total_panels = 16;
        let baseline = analyze(&config);
        let alternatives = generate_alternatives(&config, &baseline, &[], &[]);
        let alt = &alternatives[0];
        // 40 V at -10 °C is ~44.06 V, so 13 panels stay under 600 V
        assert_eq!(alt.configuration.layout.panels_per_string, 13);
        assert!(analyze(&alt.configuration).passed);
    }

    #[test]
    fn test_unsupported_roof_swaps_racking() {
        let mut config = sample_config();
        config.installation.roof_type = RoofType::Slate;
        let baseline = analyze(&config);
        assert!(!baseline.passed);

        let slate = RackingSpec {
            id: "rack-slate".to_owned(),
            supported_roof_types: vec![RoofType::Slate],
            ..racking()
        };
        let tile_only = RackingSpec {
            id: "rack-tile".to_owned(),
            supported_roof_types: vec![RoofType::Tile],
            ..racking()
        };
        let alternatives = generate_alternatives(&config, &baseline, &[], &[tile_only, slate]);
        assert_eq!(alternatives.len(), 1);
        assert_eq!(
            alternatives[0].deltas,
            vec![ConfigurationDelta::SwapRacking {
                from: Some("rack-std".to_owned()),
                to: "rack-slate".to_owned(),
            }]
        );
        assert!(analyze(&alternatives[0].configuration).passed);
        assert!(alternatives[0].impact.compatibility > 100.0);
    }

    #[test]
    fn test_uncertified_inverter_swapped_for_certified() {
        let mut config = sample_config();
        config.inverter.certifications.clear();
        let baseline = analyze(&config);

        let uncertified = InverterSpec {
            id: "inv-bare".to_owned(),
            certifications: Vec::new(),
            ..inverter()
        };
        let certified = InverterSpec {
            id: "inv-cert".to_owned(),
            ..inverter()
        };
        let alternatives = generate_alternatives(&config, &baseline, &[uncertified, certified], &[]);
        assert_eq!(alternatives.len(), 1);
        assert!(alternatives[0].description.contains("inv-cert"));
        assert!(alternatives[0].resolves.contains(&IssueKind::MissingCertification));
    }

    #[test]
    fn test_oversizing_reduces_panel_count() {
        let mut config = sample_config();
        config.layout.strings_per_inverter = 2;
        config.layout.total_panels = 24;
        // 24 × 450 W = 10.8 kW on 6 kW
        let baseline = analyze(&config);
        assert!(baseline.has_warning(IssueKind::HighOversizing));

        let alternatives = generate_alternatives(&config, &baseline, &[], &[]);
        let fewer = &alternatives[0];
        // 1.3 × 6000 / 450 = 17.3 panels at most, so one string of 12 remains
        let layout = &fewer.configuration.layout;
        assert_eq!(layout.strings_per_inverter, 1);
        assert_eq!(layout.panels_per_string, 12);
        assert_eq!(layout.total_panels, 12);
        assert_eq!(
            fewer.deltas,
            vec![
                ConfigurationDelta::StringsPerInverter { from: 2, to: 1 },
                ConfigurationDelta::TotalPanels { from: 24, to: 12 },
            ]
        );
        assert!(fewer.impact.performance < 100.0);
        assert!(fewer.impact.cost < 100.0);
    }

    #[test]
    fn test_string_length_past_u32_is_skipped() {
        let mut config = sample_config();
        config.panels[0].stc_voltage_v = 0.0001;
        config.layout.strings_per_inverter = 3000;
        config.layout.total_panels = 36_000;
        let baseline = analyze(&config);
        assert!(baseline.has_issue(IssueKind::VoltageTooLow));

        // 200 V / 0.0001 V needs 2,000,000 panels per string; × 3000 overflows
        let alternatives = generate_alternatives(&config, &baseline, &[], &[]);
        assert!(alternatives.iter().all(|a| {
            !a.deltas
                .iter()
                .any(|d| matches!(d, ConfigurationDelta::PanelsPerString { .. }))
        }));
    }

    #[test]
    fn test_clean_configuration_has_no_alternatives() {
        let config = sample_config();
        let baseline = analyze(&config);
        assert!(generate_alternatives(&config, &baseline, &[wide_inverter()], &[racking()]).is_empty());
    }

    #[test]
    fn test_estimated_cost() {
        let config = sample_config();
        // 12 × 180 + 1400 + 12 × 45
        assert!((estimated_cost(&config) - 4100.0).abs() < 1e-9);
    }
}
