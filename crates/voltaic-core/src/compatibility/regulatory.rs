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

use std::collections::HashSet;

use voltaic_types::{
    CompatibilityDomain, CompatibilityIssue, ComplianceCheck, InverterSpec, IssueKind, Severity,
    SystemConfiguration,
};

/// Safety and performance listings every panel model needs
pub const REQUIRED_PANEL_CERTIFICATIONS: &[&str] = &["UL 1703", "IEC 61215", "IEC 61730"];

/// Grid-interconnection listings every inverter needs
pub const REQUIRED_INVERTER_CERTIFICATIONS: &[&str] = &["UL 1741", "IEEE 1547"];

fn normalize(cert: &str) -> String {
    cert.chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Substring match ignoring case, spaces and hyphens ("UL1741-SA" has "UL 1741")
pub fn has_certification(certifications: &[String], required: &str) -> bool {
    let needle = normalize(required);
    certifications.iter().any(|c| normalize(c).contains(&needle))
}

/// Required inverter listings the unit does not carry
pub fn missing_inverter_certifications(inverter: &InverterSpec) -> Vec<String> {
    REQUIRED_INVERTER_CERTIFICATIONS
        .iter()
        .filter(|req| !has_certification(&inverter.certifications, req))
        .map(|req| (*req).to_owned())
        .collect()
}

pub fn check_regulatory(config: &SystemConfiguration) -> ComplianceCheck {
    let mut issues = Vec::new();
    let mut missing_panel = Vec::new();
    let mut seen_panels = HashSet::new();

    for panel in &config.panels {
        if !seen_panels.insert(panel.id.as_str()) {
            continue;
        }
        for req in REQUIRED_PANEL_CERTIFICATIONS {
            if has_certification(&panel.certifications, req) {
                continue;
            }
            if !missing_panel.iter().any(|m| m == req) {
                missing_panel.push((*req).to_owned());
            }
            issues.push(
                CompatibilityIssue::new(
                    IssueKind::MissingCertification,
                    CompatibilityDomain::Regulatory,
                    Severity::High,
                    format!("Panel {} is missing {req} certification", panel.model),
                )
                .with_component(&panel.id),
            );
        }
    }

    let missing_inverter = missing_inverter_certifications(&config.inverter);
    for req in &missing_inverter {
        issues.push(
            CompatibilityIssue::new(
                IssueKind::MissingCertification,
                CompatibilityDomain::Regulatory,
                Severity::Critical,
                format!(
                    "Inverter {} is missing {req} grid-interconnection certification",
                    config.inverter.model
                ),
            )
            .with_component(&config.inverter.id),
        );
    }

    let critical = issues.iter().filter(|i| i.is_critical()).count();
    let high = issues
        .iter()
        .filter(|i| i.severity == Severity::High)
        .count();
    let penalty = critical.saturating_mul(25).saturating_add(high.saturating_mul(10));
    let score = u8::try_from(100_usize.saturating_sub(penalty)).unwrap_or(0);

    ComplianceCheck {
        compliant: critical == 0,
        missing_panel_certifications: missing_panel,
        missing_inverter_certifications: missing_inverter,
        issues,
        score,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_config;

    #[test]
    fn test_certified_system_is_compliant() {
        let result = check_regulatory(&sample_config());
        assert!(result.compliant);
        assert!(result.issues.is_empty());
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_matching_ignores_case_and_separators() {
        let certs = vec!["ul-1741 sa".to_owned()];
        assert!(has_certification(&certs, "UL 1741"));
        assert!(!has_certification(&certs, "IEEE 1547"));
    }

    #[test]
    fn test_missing_panel_cert_is_high() {
        let mut config = sample_config();
        config.panels[0].certifications = vec!["IEC 61215".to_owned(), "IEC 61730".to_owned()];
        let result = check_regulatory(&config);
        assert!(result.compliant);
        assert_eq!(result.missing_panel_certifications, vec!["UL 1703"]);
        assert_eq!(result.issues[0].severity, Severity::High);
        assert_eq!(result.score, 90);
    }

    #[test]
    fn test_missing_inverter_cert_is_critical() {
        let mut config = sample_config();
        config.inverter.certifications.clear();
        let result = check_regulatory(&config);
        assert!(!result.compliant);
        assert_eq!(result.missing_inverter_certifications.len(), 2);
        assert!(result.issues.iter().all(CompatibilityIssue::is_critical));
        assert_eq!(result.score, 50);
    }

    #[test]
    fn test_score_floors_at_zero() {
        let mut config = sample_config();
        config.inverter.certifications.clear();
        for i in 0..4 {
            let mut panel = config.panels[0].clone();
            panel.id = format!("p-{i}");
            panel.certifications.clear();
            config.panels.push(panel);
        }
        let result = check_regulatory(&config);
        assert_eq!(result.score, 0);
    }
}
