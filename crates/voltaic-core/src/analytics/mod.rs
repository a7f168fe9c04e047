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

//! Read-models derived on demand from stored telemetry.
//!
//! Nothing here is persisted; every call re-reads the samples of the
//! requested window.

pub mod benchmarks;
pub mod fleet;
pub mod performance;
pub mod reliability;
pub mod stats;

pub use benchmarks::{Benchmarker, get_market_benchmarks};
pub use fleet::FleetComparator;
pub use performance::PerformanceAnalyzer;
pub use reliability::ReliabilityPredictor;

use voltaic_types::{AnalyticsResult, PerformanceAnalysis, PerformanceTrend};

fn performance_hints(analysis: &PerformanceAnalysis, out: &mut Vec<String>) {
    if analysis.trend == PerformanceTrend::Declining {
        out.push(format!(
            "Performance ratio is declining ({:.1} points per year); inspect for soiling or shading",
            analysis.degradation_rate_per_year
        ));
    }
    if analysis.mean_availability < 95.0 {
        out.push("Availability below 95%; review outage and communication logs".to_owned());
    }
    if analysis.mean_data_completeness < 90.0 {
        out.push("Telemetry is incomplete; check the data logger connection".to_owned());
    }
    if analysis.status_breakdown.fault > 0 {
        out.push(format!(
            "{} fault report(s) in the window; review inverter event codes",
            analysis.status_breakdown.fault
        ));
    }
}

/// Plain-language follow-ups for an analytics result
pub fn recommendations_for(result: &AnalyticsResult) -> Vec<String> {
    let mut out = Vec::new();
    match result {
        AnalyticsResult::Performance(analysis) => performance_hints(analysis, &mut out),
        AnalyticsResult::Reliability(report) => {
            if report.fault_events > 0 {
                out.push(format!(
                    "{} fault event(s) recorded; schedule a diagnostic visit",
                    report.fault_events
                ));
            }
            if report.uptime_pct < 95.0 {
                out.push(format!(
                    "Uptime is {:.1}%; investigate recurring outages",
                    report.uptime_pct
                ));
            }
        }
        AnalyticsResult::Comparison(fleet) => {
            for id in &fleet.outliers {
                out.push(format!(
                    "{id} underperforms the fleet; prioritize it for inspection"
                ));
            }
            for unit in &fleet.excluded {
                out.push(format!(
                    "{} lacks data for comparison; verify its telemetry feed",
                    unit.equipment_id
                ));
            }
        }
        AnalyticsResult::Prediction(forecast) => {
            out.extend(forecast.recommended_actions.iter().cloned());
        }
        AnalyticsResult::Benchmarking(comparison) => {
            if comparison.performance_ratio_percentile < 25.0 {
                out.push(format!(
                    "Performance is in the bottom quartile for {} {}",
                    comparison.benchmark.manufacturer, comparison.benchmark.model
                ));
            }
            if comparison.benchmark.is_stub {
                out.push(
                    "No market reference for this model; percentile uses a generic curve"
                        .to_owned(),
                );
            }
            performance_hints(&comparison.analysis, &mut out);
        }
    }
    if out.is_empty() {
        out.push("No action needed; keep monitoring".to_owned());
    }
    out
}
