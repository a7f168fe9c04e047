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

use voltaic_types::{
    CompatibilityDomain, CompatibilityIssue, IssueKind, PanelSpec, PhysicalValidation,
    RackingSpec, Severity, SystemConfiguration,
};

const SCORE_CLEAN: u8 = 100;
const SCORE_ISSUES: u8 = 70;

fn issue(kind: IssueKind, severity: Severity, message: String) -> CompatibilityIssue {
    CompatibilityIssue::new(kind, CompatibilityDomain::Physical, severity, message)
}

/// Whether a panel fits the racking's length/width envelope
pub fn panel_fits(panel: &PanelSpec, racking: &RackingSpec) -> bool {
    (racking.min_panel_length_mm..=racking.max_panel_length_mm).contains(&panel.length_mm)
        && (racking.min_panel_width_mm..=racking.max_panel_width_mm).contains(&panel.width_mm)
}

/// Racking envelope, roof support and load ratings.
///
/// Without a racking spec nothing is checked and the domain passes.
pub fn check_physical(config: &SystemConfiguration) -> PhysicalValidation {
    let Some(racking) = &config.racking else {
        return PhysicalValidation {
            passed: true,
            racking_checked: false,
            issues: Vec::new(),
            warnings: Vec::new(),
            score: SCORE_CLEAN,
        };
    };

    let mut issues = Vec::new();
    let site = &config.installation;

    for panel in config.panels.iter().filter(|p| !panel_fits(p, racking)) {
        issues.push(
            issue(
                IssueKind::PanelDimensionsIncompatible,
                Severity::High,
                format!(
                    "Panel {} ({:.0} × {:.0} mm) is outside the racking envelope {:.0}-{:.0} × {:.0}-{:.0} mm",
                    panel.model,
                    panel.length_mm,
                    panel.width_mm,
                    racking.min_panel_length_mm,
                    racking.max_panel_length_mm,
                    racking.min_panel_width_mm,
                    racking.max_panel_width_mm,
                ),
            )
            .with_component(&panel.id),
        );
    }

    if !racking.supported_roof_types.contains(&site.roof_type) {
        issues.push(
            issue(
                IssueKind::RoofTypeUnsupported,
                Severity::Critical,
                format!(
                    "Racking {} does not support {} roofs",
                    racking.model, site.roof_type
                ),
            )
            .with_component(&racking.id),
        );
    }

    if let (Some(rated), Some(design)) = (
        racking.max_wind_speed_mph,
        site.location.design_wind_speed_mph,
    ) && rated < design
    {
        issues.push(
            issue(
                IssueKind::WindLoadExceeded,
                Severity::High,
                format!("Racking is rated for {rated:.0} mph wind, site design speed is {design:.0} mph"),
            )
            .with_component(&racking.id),
        );
    }

    if let (Some(rated), Some(design)) = (racking.max_snow_load_psf, site.location.snow_load_psf)
        && rated < design
    {
        issues.push(
            issue(
                IssueKind::SnowLoadExceeded,
                Severity::High,
                format!("Racking is rated for {rated:.0} psf snow, site load is {design:.0} psf"),
            )
            .with_component(&racking.id),
        );
    }

    let score = if issues.is_empty() {
        SCORE_CLEAN
    } else {
        SCORE_ISSUES
    };

    PhysicalValidation {
        passed: issues.is_empty(),
        racking_checked: true,
        issues,
        warnings: Vec::new(),
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_config;
    use voltaic_types::RoofType;

    #[test]
    fn test_fitting_racking_passes() {
        let result = check_physical(&sample_config());
        assert!(result.passed);
        assert!(result.racking_checked);
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_missing_racking_is_skipped() {
        let mut config = sample_config();
        config.racking = None;
        config.installation.roof_type = RoofType::Slate;
        let result = check_physical(&config);
        assert!(result.passed);
        assert!(!result.racking_checked);
        assert!(result.issues.is_empty());
    }

    #[test]
    fn test_oversized_panel_is_high() {
        let mut config = sample_config();
        config.panels[0].length_mm = 2300.0;
        let result = check_physical(&config);
        assert!(!result.passed);
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.issues[0].kind, IssueKind::PanelDimensionsIncompatible);
        assert_eq!(result.issues[0].severity, Severity::High);
        assert_eq!(result.score, 70);
    }

    #[test]
    fn test_unsupported_roof_is_critical() {
        let mut config = sample_config();
        config.installation.roof_type = RoofType::Slate;
        let result = check_physical(&config);
        let roof = &result.issues[0];
        assert_eq!(roof.kind, IssueKind::RoofTypeUnsupported);
        assert!(roof.is_critical());
        assert_eq!(roof.component.as_deref(), Some("rack-std"));
    }

    #[test]
    fn test_load_ratings() {
        let mut config = sample_config();
        config.installation.location.design_wind_speed_mph = Some(160.0);
        config.installation.location.snow_load_psf = Some(60.0);
        let result = check_physical(&config);
        let kinds: Vec<_> = result.issues.iter().map(|i| i.kind).collect();
        assert_eq!(
            kinds,
            vec![IssueKind::WindLoadExceeded, IssueKind::SnowLoadExceeded]
        );
    }
}
