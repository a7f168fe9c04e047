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

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::debug;
use voltaic_types::{
    OperatingStatus, PerformanceAnalysis, PerformanceMetricSample, PerformanceTrend,
    StatusBreakdown, TimeWindow, Timeframe,
};

use super::stats::{epoch_secs, mean, third_len};
use crate::config::AnalyticsSettings;
use crate::error::{EngineError, Result};
use crate::store::SampleStore;

/// PR points between leading and trailing thirds that count as a trend
pub const TREND_THRESHOLD: f64 = 0.5;

const DAYS_PER_YEAR: f64 = 365.25;
const SECS_PER_DAY: f64 = 86_400.0;
const MIN_CENTROID_GAP_SECS: f64 = 3_600.0;

/// Mean PR of a slice and the mean of its timestamps
fn third_stats(samples: &[PerformanceMetricSample]) -> (f64, f64) {
    (
        mean(samples.iter().map(|s| s.calculated.performance_ratio)),
        mean(samples.iter().map(|s| epoch_secs(s.timestamp))),
    )
}

/// Annualized PR loss between two thirds (positive means degrading).
/// Zero when the thirds are less than an hour apart.
pub fn degradation_per_year(leading: &[PerformanceMetricSample], trailing: &[PerformanceMetricSample]) -> f64 {
    let (lead_pr, lead_t) = third_stats(leading);
    let (trail_pr, trail_t) = third_stats(trailing);
    let gap_secs = trail_t - lead_t;
    if gap_secs < MIN_CENTROID_GAP_SECS {
        return 0.0;
    }
    (lead_pr - trail_pr) * DAYS_PER_YEAR / (gap_secs / SECS_PER_DAY)
}

pub fn classify_trend(leading_pr: f64, trailing_pr: f64) -> PerformanceTrend {
    let delta = trailing_pr - leading_pr;
    if delta > TREND_THRESHOLD {
        PerformanceTrend::Improving
    } else if delta < -TREND_THRESHOLD {
        PerformanceTrend::Declining
    } else {
        PerformanceTrend::Stable
    }
}

pub fn status_breakdown(samples: &[PerformanceMetricSample]) -> StatusBreakdown {
    samples
        .iter()
        .fold(StatusBreakdown::default(), |mut acc, s| {
            match s.realtime.status {
                OperatingStatus::Normal => acc.normal += 1,
                OperatingStatus::Warning => acc.warning += 1,
                OperatingStatus::Fault => acc.fault += 1,
                OperatingStatus::Offline => acc.offline += 1,
            }
            acc
        })
}

/// Aggregate an ordered, non-empty sample slice
pub fn summarize(
    equipment_id: &str,
    window: TimeWindow,
    samples: &[PerformanceMetricSample],
) -> Option<PerformanceAnalysis> {
    let first = samples.first()?;
    let last = samples.last()?;
    let third = third_len(samples.len());
    let leading = samples.get(..third)?;
    let trailing = samples.get(samples.len() - third..)?;
    let (leading_pr, _) = third_stats(leading);
    let (trailing_pr, _) = third_stats(trailing);

    Some(PerformanceAnalysis {
        equipment_id: equipment_id.to_owned(),
        window,
        sample_count: samples.len(),
        first_sample_at: first.timestamp,
        last_sample_at: last.timestamp,
        total_energy_kwh: samples.iter().map(|s| s.calculated.energy_produced).sum(),
        mean_performance_ratio: mean(samples.iter().map(|s| s.calculated.performance_ratio)),
        mean_efficiency: mean(samples.iter().map(|s| s.realtime.efficiency)),
        mean_availability: mean(samples.iter().map(|s| s.calculated.availability)),
        mean_capacity_utilization: mean(samples.iter().map(|s| s.calculated.capacity_utilization)),
        mean_temperature: mean(samples.iter().map(|s| s.realtime.temperature)),
        peak_power_w: samples
            .iter()
            .map(|s| s.realtime.power)
            .fold(0.0, f64::max),
        mean_data_completeness: mean(samples.iter().map(|s| s.quality.data_completeness)),
        mean_quality_score: mean(samples.iter().map(|s| s.quality.score())),
        leading_performance_ratio: leading_pr,
        trailing_performance_ratio: trailing_pr,
        degradation_rate_per_year: degradation_per_year(leading, trailing),
        trend: classify_trend(leading_pr, trailing_pr),
        status_breakdown: status_breakdown(samples),
    })
}

/// Performance aggregation over stored samples
#[derive(Clone)]
pub struct PerformanceAnalyzer {
    samples: Arc<dyn SampleStore>,
    settings: AnalyticsSettings,
}

impl fmt::Debug for PerformanceAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PerformanceAnalyzer")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PerformanceAnalyzer {
    pub fn new(samples: Arc<dyn SampleStore>, settings: AnalyticsSettings) -> Self {
        Self { samples, settings }
    }

    pub fn min_samples(&self) -> usize {
        self.settings.min_samples
    }

    /// Samples of a unit in a window, failing when there are too few
    pub fn window_samples(
        &self,
        equipment_id: &str,
        window: &TimeWindow,
    ) -> Result<Vec<PerformanceMetricSample>> {
        if window.start > window.end {
            return Err(EngineError::invalid(
                "timeframe",
                "start must not be after end",
            ));
        }
        let samples = self.samples.samples_in(equipment_id, window)?;
        if samples.len() < self.settings.min_samples {
            return Err(EngineError::InsufficientData {
                equipment_id: equipment_id.to_owned(),
                available: samples.len(),
                required: self.settings.min_samples,
            });
        }
        Ok(samples)
    }

    pub fn analyze_window(&self, equipment_id: &str, window: TimeWindow) -> Result<PerformanceAnalysis> {
        let samples = self.window_samples(equipment_id, &window)?;
        let analysis = summarize(equipment_id, window, &samples).ok_or_else(|| {
            EngineError::InsufficientData {
                equipment_id: equipment_id.to_owned(),
                available: 0,
                required: self.settings.min_samples,
            }
        })?;
        debug!(
            equipment_id,
            samples = analysis.sample_count,
            mean_pr = analysis.mean_performance_ratio,
            degradation = analysis.degradation_rate_per_year,
            "Performance analyzed"
        );
        Ok(analysis)
    }

    pub fn analyze_performance(
        &self,
        equipment_id: &str,
        timeframe: &Timeframe,
    ) -> Result<PerformanceAnalysis> {
        self.analyze_window(equipment_id, timeframe.resolve(Utc::now()))
    }
}
