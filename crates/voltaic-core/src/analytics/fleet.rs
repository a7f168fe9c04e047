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

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::Utc;
use tracing::{debug, info};
use voltaic_types::{
    ExcludedUnit, FleetComparison, FleetEntry, PerformanceAnalysis, TimeWindow, Timeframe,
};

use super::performance::PerformanceAnalyzer;
use super::stats::{mean, std_dev};
use crate::config::FleetSettings;
use crate::error::{EngineError, Result};

/// Rank analyses by PR and flag units below `mean - sigma * sd`.
///
/// The ranking depends only on the set of analyses, never on their order.
pub fn rank(
    window: TimeWindow,
    mut analyses: Vec<PerformanceAnalysis>,
    excluded: Vec<ExcludedUnit>,
    outlier_sigma: f64,
) -> FleetComparison {
    analyses.sort_by(|a, b| {
        b.mean_performance_ratio
            .partial_cmp(&a.mean_performance_ratio)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.equipment_id.cmp(&b.equipment_id))
    });

    let prs: Vec<f64> = analyses.iter().map(|a| a.mean_performance_ratio).collect();
    let fleet_mean = mean(prs.iter().copied());
    let sd = std_dev(&prs);
    let cutoff = fleet_mean - outlier_sigma * sd;

    let ranking: Vec<FleetEntry> = (1_u32..)
        .zip(analyses)
        .map(|(rank, a)| {
            let z_score = if sd > 0.0 {
                (a.mean_performance_ratio - fleet_mean) / sd
            } else {
                0.0
            };
            FleetEntry {
                rank,
                outlier: sd > 0.0 && a.mean_performance_ratio < cutoff,
                z_score,
                performance_ratio: a.mean_performance_ratio,
                efficiency: a.mean_efficiency,
                availability: a.mean_availability,
                total_energy_kwh: a.total_energy_kwh,
                equipment_id: a.equipment_id,
            }
        })
        .collect();
    let outliers = ranking
        .iter()
        .filter(|e| e.outlier)
        .map(|e| e.equipment_id.clone())
        .collect();

    FleetComparison {
        window,
        ranking,
        fleet_mean_performance_ratio: fleet_mean,
        fleet_std_dev: sd,
        outliers,
        excluded,
    }
}

#[derive(Debug, Clone)]
pub struct FleetComparator {
    analyzer: PerformanceAnalyzer,
    settings: FleetSettings,
}

impl FleetComparator {
    pub fn new(analyzer: PerformanceAnalyzer, settings: FleetSettings) -> Self {
        Self { analyzer, settings }
    }

    /// Analyze every unit over one shared window and rank them.
    ///
    /// Units without enough samples are listed under `excluded`; the call
    /// fails only when none of them can be analyzed.
    pub fn compare_fleet_performance(
        &self,
        equipment_ids: &[String],
        timeframe: &Timeframe,
    ) -> Result<FleetComparison> {
        if equipment_ids.is_empty() {
            return Err(EngineError::invalid(
                "equipmentIds",
                "at least one equipment id is required",
            ));
        }
        let ids: BTreeSet<&str> = equipment_ids.iter().map(String::as_str).collect();
        let window = timeframe.resolve(Utc::now());

        let mut analyses = Vec::with_capacity(ids.len());
        let mut excluded = Vec::new();
        for id in ids {
            match self.analyzer.analyze_window(id, window) {
                Ok(analysis) => analyses.push(analysis),
                Err(err @ EngineError::InsufficientData { .. }) => {
                    debug!(equipment_id = id, error = %err, "Unit excluded from fleet");
                    excluded.push(ExcludedUnit {
                        equipment_id: id.to_owned(),
                        reason: err.to_string(),
                    });
                }
                Err(err) => return Err(err),
            }
        }

        if analyses.is_empty() {
            return Err(EngineError::InsufficientData {
                equipment_id: "fleet".to_owned(),
                available: 0,
                required: 1,
            });
        }

        let comparison = rank(window, analyses, excluded, self.settings.outlier_sigma);
        info!(
            units = comparison.ranking.len(),
            excluded = comparison.excluded.len(),
            outliers = comparison.outliers.len(),
            "Fleet compared"
        );
        Ok(comparison)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyticsSettings;
    use crate::memory::MemorySampleStore;
    use crate::store::SampleStore;
    use crate::test_support::sample_with;
    use chrono::Duration;
    use std::sync::Arc;
    use voltaic_types::TimeframePreset;

    fn seeded(units: &[(&str, f64, usize)]) -> FleetComparator {
        let store = Arc::new(MemorySampleStore::new());
        let now = Utc::now();
        for (id, pr, count) in units {
            for day in (1_i64..).take(*count) {
                store
                    .upsert_sample(&sample_with(id, now - Duration::days(day), *pr, 99.0))
                    .unwrap();
            }
        }
        FleetComparator::new(
            PerformanceAnalyzer::new(store, AnalyticsSettings::default()),
            FleetSettings::default(),
        )
    }

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_owned()).collect()
    }

    const MONTH: Timeframe = Timeframe::Preset(TimeframePreset::Month);

    #[test]
    fn test_ranking_and_outlier() {
        let fleet = seeded(&[
            ("inv-a", 85.0, 8),
            ("inv-b", 84.0, 8),
            ("inv-c", 86.0, 8),
            ("inv-d", 70.0, 8),
        ]);
        let result = fleet
            .compare_fleet_performance(&ids(&["inv-a", "inv-b", "inv-c", "inv-d"]), &MONTH)
            .unwrap();

        let order: Vec<_> = result.ranking.iter().map(|e| e.equipment_id.as_str()).collect();
        assert_eq!(order, ["inv-c", "inv-a", "inv-b", "inv-d"]);
        assert_eq!(result.ranking[0].rank, 1);
        assert_eq!(result.outliers, ["inv-d"]);
        assert!(result.ranking[3].z_score < -1.0);
        assert!(result.excluded.is_empty());
    }

    #[test]
    fn test_order_independent() {
        let fleet = seeded(&[("inv-a", 85.0, 8), ("inv-b", 80.0, 8), ("inv-c", 82.0, 8)]);
        let forward = fleet
            .compare_fleet_performance(&ids(&["inv-a", "inv-b", "inv-c"]), &MONTH)
            .unwrap();
        let backward = fleet
            .compare_fleet_performance(&ids(&["inv-c", "inv-b", "inv-a", "inv-b"]), &MONTH)
            .unwrap();
        assert_eq!(forward.ranking, backward.ranking);
        assert_eq!(forward.outliers, backward.outliers);
    }

    #[test]
    fn test_sparse_units_excluded() {
        let fleet = seeded(&[("inv-a", 85.0, 8), ("inv-b", 80.0, 2)]);
        let result = fleet
            .compare_fleet_performance(&ids(&["inv-a", "inv-b", "inv-z"]), &MONTH)
            .unwrap();
        assert_eq!(result.ranking.len(), 1);
        assert_eq!(result.excluded.len(), 2);
        assert!(result.outliers.is_empty());
        assert!(result.fleet_std_dev.abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_and_all_excluded() {
        let fleet = seeded(&[("inv-a", 85.0, 2)]);
        assert!(matches!(
            fleet.compare_fleet_performance(&[], &MONTH),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            fleet.compare_fleet_performance(&ids(&["inv-a"]), &MONTH),
            Err(EngineError::InsufficientData { .. })
        ));
    }
}
