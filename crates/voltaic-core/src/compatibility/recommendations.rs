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

use voltaic_types::{CompatibilityResult, IssueKind, ProductionEstimate, SystemConfiguration};

use crate::physics::optimal_tilt;

fn hint(kind: IssueKind) -> &'static str {
    match kind {
        IssueKind::VoltageTooLow => "Add panels to each string or pick an inverter with a lower MPPT start voltage",
        IssueKind::VoltageTooHigh => "Shorten the strings or pick an inverter with a higher maximum input voltage",
        IssueKind::ColdVoltageExceedsMax => "Leave voltage headroom for cold mornings: drop one panel per string",
        IssueKind::CurrentTooHigh => "Spread strings over more MPPT inputs or pick an inverter rated for the string current",
        IssueKind::HighOversizing => "Reduce the array size or step up the inverter to limit clipping",
        IssueKind::LowOversizing => "A smaller inverter would run closer to its efficient range",
        IssueKind::MixedPanelModels => "Keep each panel model on its own strings or MPPT input",
        IssueKind::BatteryRequiresHybridInverter => "Use a hybrid inverter or add a dedicated battery inverter",
        IssueKind::BatteryVoltageMismatch => "Pick a battery whose nominal voltage fits the inverter battery port",
        IssueKind::PanelDimensionsIncompatible => "Choose racking rated for the panel dimensions",
        IssueKind::RoofTypeUnsupported => "Choose racking with attachments for this roof type",
        IssueKind::WindLoadExceeded => "Use racking rated for the site design wind speed",
        IssueKind::SnowLoadExceeded => "Use racking rated for the site snow load",
        IssueKind::MissingCertification => "Source equipment carrying the required listings before permitting",
    }
}

/// Plain-language hints for a report, most severe findings first
pub fn recommend(
    config: &SystemConfiguration,
    result: &CompatibilityResult,
    production: &ProductionEstimate,
) -> Vec<String> {
    let mut findings: Vec<_> = result.issues.iter().chain(&result.warnings).collect();
    findings.sort_by(|a, b| b.severity.cmp(&a.severity));

    let mut out: Vec<String> = Vec::new();
    for finding in findings {
        let text = hint(finding.kind);
        if !out.iter().any(|r| r == text) {
            out.push(text.to_owned());
        }
    }

    if production.azimuth_factor < 0.9 {
        out.push(format!(
            "Array orientation costs about {:.0}% of yield; an equator-facing plane would help",
            (1.0 - production.azimuth_factor) * 100.0
        ));
    }
    if production.tilt_factor < 0.95 {
        out.push(format!(
            "Tilt is far from the {:.0}° optimum for this latitude; consider tilt-up racking",
            optimal_tilt(config.installation.location.latitude)
        ));
    }
    if production.shading_factor < 0.9 {
        out.push(
            "Shading is significant; panel-level electronics (optimizers or microinverters) limit the loss"
                .to_owned(),
        );
    }
    if production.clipping_loss > 0.02 {
        out.push(format!(
            "Expect about {:.1}% clipping loss at peak",
            production.clipping_loss * 100.0
        ));
    }

    if out.is_empty() {
        out.push("Configuration is sound; no changes recommended".to_owned());
    }
    out
}
