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

//! Configuration compatibility analysis.
//!
//! The three checkers are independent pure functions over a
//! [`SystemConfiguration`]; [`analyze`] composes them into one
//! [`CompatibilityResult`]. [`CompatibilityEngine`] adds input validation,
//! the report sections and catalog-backed alternatives.

pub mod alternatives;
pub mod electrical;
pub mod physical;
pub mod recommendations;
pub mod regulatory;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};
use voltaic_types::{
    CompatibilityAnalysis, CompatibilityReport, CompatibilityRequest, CompatibilityResult,
    ComplianceCheck, DomainScores, ElectricalValidation, PhysicalValidation, SystemConfiguration,
    SystemSummary,
};

pub use alternatives::generate_alternatives;
pub use electrical::check_electrical;
pub use physical::check_physical;
pub use recommendations::recommend;
pub use regulatory::check_regulatory;

use crate::error::Result;
use crate::physics::estimate_production;
use crate::store::EquipmentCatalog;
use crate::validation::validate_configuration;

fn aggregate(
    electrical: &ElectricalValidation,
    physical: &PhysicalValidation,
    compliance: &ComplianceCheck,
) -> CompatibilityResult {
    let issues: Vec<_> = electrical
        .issues
        .iter()
        .chain(&physical.issues)
        .chain(&compliance.issues)
        .cloned()
        .collect();
    let warnings: Vec<_> = electrical
        .warnings
        .iter()
        .chain(&physical.warnings)
        .cloned()
        .collect();

    let overall = (f64::from(electrical.score) + f64::from(physical.score) + f64::from(compliance.score))
        / 3.0;
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let overall = overall.round().clamp(0.0, 100.0) as u8;

    CompatibilityResult {
        passed: !issues.iter().any(|i| i.is_critical()),
        issues,
        warnings,
        scores: DomainScores {
            electrical: electrical.score,
            physical: physical.score,
            regulatory: compliance.score,
            overall,
        },
    }
}

/// Run all checkers over a configuration. Pure: no validation, no I/O.
pub fn analyze(config: &SystemConfiguration) -> CompatibilityResult {
    aggregate(
        &check_electrical(config),
        &check_physical(config),
        &check_regulatory(config),
    )
}

/// Compatibility analysis with catalog-backed alternatives
pub struct CompatibilityEngine {
    catalog: Arc<dyn EquipmentCatalog>,
}

impl fmt::Debug for CompatibilityEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompatibilityEngine").finish_non_exhaustive()
    }
}

impl CompatibilityEngine {
    pub fn new(catalog: Arc<dyn EquipmentCatalog>) -> Self {
        Self { catalog }
    }

    /// Validate and analyze a configuration
    pub fn analyze(&self, config: &SystemConfiguration) -> Result<CompatibilityResult> {
        validate_configuration(config)?;
        Ok(analyze(config))
    }

    /// Full report for a compatibility request
    pub fn report(&self, request: &CompatibilityRequest) -> Result<CompatibilityReport> {
        let config = &request.system;
        let options = request.options;
        validate_configuration(config)?;

        let electrical = check_electrical(config);
        let physical = check_physical(config);
        let compliance = check_regulatory(config);
        let result = aggregate(&electrical, &physical, &compliance);
        let production = estimate_production(config);

        let dc_kw = config.total_dc_power_w() / 1000.0;
        let system_summary = SystemSummary {
            panel_count: config.layout.total_panels,
            dc_capacity_kw: dc_kw,
            inverter_ac_capacity_kw: config.inverter.ac_capacity_w / 1000.0,
            dc_ac_ratio: electrical.dc_ac_ratio,
            string_voltage_v: electrical.string_voltage_v,
            battery_capacity_kwh: config.battery_capacity_kwh(),
            estimated_annual_production_kwh: production.annual_production_kwh,
            specific_yield: if dc_kw > 0.0 {
                production.annual_production_kwh / dc_kw
            } else {
                0.0
            },
        };

        let recommendations = options
            .include_recommendations
            .then(|| recommend(config, &result, &production));

        let alternatives = if options.include_alternatives {
            let inverters = self.catalog.inverters()?;
            let racking = self.catalog.racking_systems()?;
            let alternatives = generate_alternatives(config, &result, &inverters, &racking);
            debug!(count = alternatives.len(), "Generated alternatives");
            Some(alternatives)
        } else {
            None
        };

        let analysis = options.detailed_analysis.then(|| CompatibilityAnalysis {
            electrical_validation: electrical,
            physical_validation: physical,
            performance_analysis: production,
            compliance_check: compliance,
        });

        info!(
            passed = result.passed,
            issues = result.issues.len(),
            warnings = result.warnings.len(),
            overall = result.scores.overall,
            "Compatibility analysis complete"
        );

        Ok(CompatibilityReport {
            compatibility: result,
            system_summary,
            analysis,
            recommendations,
            alternatives,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::memory::MemoryCatalog;
    use crate::test_support::{inverter, sample_config};
    use voltaic_types::{CompatibilityOptions, InverterSpec, IssueKind, RoofType};

    fn engine() -> CompatibilityEngine {
        let catalog = MemoryCatalog::new();
        catalog.add_inverter(InverterSpec {
            id: "inv-wide".to_owned(),
            min_input_voltage_v: 100.0,
            ..inverter()
        });
        CompatibilityEngine::new(Arc::new(catalog))
    }

    #[test]
    fn test_clean_configuration_passes() {
        let result = analyze(&sample_config());
        assert!(result.passed);
        assert!(result.issues.is_empty());
        assert_eq!(result.scores.overall, 100);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let mut config = sample_config();
        config.installation.roof_type = RoofType::Flat;
        config.layout.panels_per_string = 3;
        assert_eq!(analyze(&config), analyze(&config));
    }

    #[test]
    fn test_high_issue_alone_does_not_fail() {
        let mut config = sample_config();
        config.panels[0].certifications.clear();
        let result = analyze(&config);
        assert!(result.passed);
        assert!(result.has_issue(IssueKind::MissingCertification));
        assert_eq!(result.scores.regulatory, 70);
        // (100 + 100 + 70) / 3
        assert_eq!(result.scores.overall, 90);
    }

    #[test]
    fn test_report_sections_follow_options() {
        let engine = engine();
        let mut request = CompatibilityRequest {
            system: sample_config(),
            options: CompatibilityOptions::default(),
        };
        let report = engine.report(&request).unwrap();
        assert!(report.analysis.is_some());
        assert!(report.recommendations.is_some());
        assert!(report.alternatives.is_none());
        assert_eq!(report.system_summary.panel_count, 12);
        assert!((report.system_summary.dc_capacity_kw - 5.4).abs() < 1e-9);
        assert!(report.system_summary.specific_yield > 1000.0);

        request.options = CompatibilityOptions {
            include_recommendations: false,
            include_alternatives: true,
            detailed_analysis: false,
        };
        request.system.layout.panels_per_string = 3;
        request.system.layout.total_panels = 3;
        let report = engine.report(&request).unwrap();
        assert!(report.analysis.is_none());
        assert!(report.recommendations.is_none());
        let alternatives = report.alternatives.unwrap();
        assert!(alternatives.iter().any(|a| a.description.contains("inv-wide")));
    }

    #[test]
    fn test_report_rejects_invalid_input() {
        let mut config = sample_config();
        config.inverter.ac_capacity_w = 0.0;
        config.layout.total_panels = 0;
        let err = engine()
            .report(&CompatibilityRequest {
                system: config,
                options: CompatibilityOptions::default(),
            })
            .unwrap_err();
        match err {
            EngineError::Validation(errors) => {
                assert!(errors.contains_field("inverter.acCapacityW"));
                assert!(errors.contains_field("layout.totalPanels"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
