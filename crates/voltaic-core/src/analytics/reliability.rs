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

//! Outage history and maintenance forecasting.
//!
//! Forecasts are straight-line extrapolations: the PR degradation rate and the
//! least-squares availability slope are projected forward until they cross
//! the configured failure thresholds. Sparse or low-quality history widens
//! the uncertainty band and sets `lowConfidence` instead of pretending to be
//! precise.

use chrono::{DateTime, Duration, Utc};
use tracing::info;
use voltaic_types::{
    ConfidenceLevel, DaysEstimate, MaintenanceForecast, MaintenanceUrgency, OperatingStatus,
    PerformanceAnalysis, PerformanceMetricSample, ReliabilityReport, TimeWindow, Timeframe,
};

use super::performance::{PerformanceAnalyzer, summarize};
use super::stats::{count_f64, epoch_secs, linear_slope, mean, third_len};
use crate::config::ReliabilitySettings;
use crate::error::{EngineError, Result};

const DAYS_PER_YEAR: f64 = 365.25;
const SECS_PER_DAY: f64 = 86_400.0;

/// Forecasts further out than this are reported as "not reached"
const MAX_HORIZON_DAYS: f64 = 3_650.0;

fn confidence_for(sample_count: usize, mean_quality: f64) -> ConfidenceLevel {
    if sample_count >= 30 && mean_quality >= 90.0 {
        ConfidenceLevel::High
    } else if sample_count >= 12 && mean_quality >= 75.0 {
        ConfidenceLevel::Medium
    } else {
        ConfidenceLevel::Low
    }
}

/// Relative half-width of the uncertainty band
fn band(confidence: ConfidenceLevel) -> f64 {
    match confidence {
        ConfidenceLevel::High => 0.20,
        ConfidenceLevel::Medium => 0.40,
        ConfidenceLevel::Low => 0.75,
    }
}

fn estimate(days: f64, confidence: ConfidenceLevel) -> Option<DaysEstimate> {
    if !days.is_finite() || days > MAX_HORIZON_DAYS {
        return None;
    }
    let days = days.max(0.0);
    let width = band(confidence);
    Some(DaysEstimate {
        days,
        lower_days: days * (1.0 - width),
        upper_days: days * (1.0 + width),
    })
}

/// Days until `current` falls to `limit` when losing `loss_per_day`
fn days_until(current: f64, limit: f64, loss_per_day: f64) -> Option<f64> {
    if current <= limit {
        Some(0.0)
    } else if loss_per_day > 0.0 {
        Some((current - limit) / loss_per_day)
    } else {
        None
    }
}

fn urgency_for(days: Option<f64>) -> MaintenanceUrgency {
    match days {
        Some(d) if d <= 7.0 => MaintenanceUrgency::Immediate,
        Some(d) if d <= 30.0 => MaintenanceUrgency::Soon,
        Some(d) if d <= 180.0 => MaintenanceUrgency::Scheduled,
        Some(_) | None => MaintenanceUrgency::Routine,
    }
}

#[expect(clippy::cast_possible_truncation)]
fn days_to_duration(days: f64) -> Duration {
    Duration::seconds((days * SECS_PER_DAY).round() as i64)
}

/// Status transitions into `target` (a leading sample in `target` counts)
fn transitions_into(samples: &[PerformanceMetricSample], target: OperatingStatus) -> u32 {
    let mut previous = None;
    let mut count = 0;
    for sample in samples {
        let status = sample.realtime.status;
        if status == target && previous != Some(target) {
            count += 1;
        }
        previous = Some(status);
    }
    count
}

fn recommended_actions(
    forecast_pr: Option<&DaysEstimate>,
    forecast_avail: Option<&DaysEstimate>,
    urgency: MaintenanceUrgency,
    analysis: &PerformanceAnalysis,
    confidence: ConfidenceLevel,
) -> Vec<String> {
    let mut actions = Vec::new();
    match urgency {
        MaintenanceUrgency::Immediate => {
            actions.push("Dispatch a technician for on-site inspection".to_owned());
        }
        MaintenanceUrgency::Soon => {
            actions.push("Schedule a maintenance visit within the next month".to_owned());
        }
        MaintenanceUrgency::Scheduled => {
            actions.push("Include this unit in the next planned maintenance round".to_owned());
        }
        MaintenanceUrgency::Routine => {
            actions.push("No action beyond routine monitoring".to_owned());
        }
    }
    if forecast_pr.is_some() && analysis.degradation_rate_per_year > 0.0 {
        actions.push(
            "Check for soiling, shading changes and module degradation (IV-curve trace)"
                .to_owned(),
        );
    }
    if forecast_avail.is_some() {
        actions.push("Review communication links and inverter event logs for outages".to_owned());
    }
    if analysis.status_breakdown.fault > 0 {
        actions.push(format!(
            "Investigate {} fault report(s) in the window",
            analysis.status_breakdown.fault
        ));
    }
    if confidence == ConfidenceLevel::Low {
        actions.push("Collect more telemetry before committing to a maintenance date".to_owned());
    }
    actions
}

/// Build a forecast from ordered samples (at least one)
pub fn forecast(
    equipment_id: &str,
    window: TimeWindow,
    samples: &[PerformanceMetricSample],
    settings: &ReliabilitySettings,
    now: DateTime<Utc>,
) -> Option<MaintenanceForecast> {
    let analysis = summarize(equipment_id, window, samples)?;
    let trailing = samples.get(samples.len() - third_len(samples.len())..)?;
    let current_pr = analysis.trailing_performance_ratio;
    let current_availability = mean(trailing.iter().map(|s| s.calculated.availability));

    let origin = epoch_secs(samples.first()?.timestamp);
    let points: Vec<(f64, f64)> = samples
        .iter()
        .map(|s| {
            (
                (epoch_secs(s.timestamp) - origin) / SECS_PER_DAY,
                s.calculated.availability,
            )
        })
        .collect();
    let availability_slope = linear_slope(&points).unwrap_or(0.0);

    let confidence = confidence_for(analysis.sample_count, analysis.mean_quality_score);
    let pr_eta = days_until(
        current_pr,
        settings.failure_performance_ratio,
        analysis.degradation_rate_per_year / DAYS_PER_YEAR,
    )
    .and_then(|d| estimate(d, confidence));
    let availability_eta = days_until(
        current_availability,
        settings.failure_availability,
        -availability_slope,
    )
    .and_then(|d| estimate(d, confidence));

    let earliest = [pr_eta, availability_eta]
        .iter()
        .flatten()
        .map(|e| e.days)
        .reduce(f64::min);
    let urgency = urgency_for(earliest);
    let recommended = recommended_actions(
        pr_eta.as_ref(),
        availability_eta.as_ref(),
        urgency,
        &analysis,
        confidence,
    );

    Some(MaintenanceForecast {
        equipment_id: equipment_id.to_owned(),
        generated_at: now,
        window,
        sample_count: analysis.sample_count,
        current_performance_ratio: current_pr,
        current_availability,
        degradation_rate_per_year: analysis.degradation_rate_per_year,
        availability_trend_per_day: availability_slope,
        failure_performance_ratio: settings.failure_performance_ratio,
        failure_availability: settings.failure_availability,
        performance_threshold_eta: pr_eta,
        availability_threshold_eta: availability_eta,
        predicted_maintenance_at: earliest.map(|d| now + days_to_duration(d)),
        urgency,
        confidence,
        low_confidence: confidence == ConfidenceLevel::Low,
        recommended_actions: recommended,
    })
}

/// Fault and outage history of ordered samples (at least one)
pub fn reliability_summary(
    equipment_id: &str,
    window: TimeWindow,
    samples: &[PerformanceMetricSample],
) -> Option<ReliabilityReport> {
    let analysis = summarize(equipment_id, window, samples)?;
    let up = samples
        .iter()
        .filter(|s| {
            matches!(
                s.realtime.status,
                OperatingStatus::Normal | OperatingStatus::Warning
            )
        })
        .count();
    let fault_events = transitions_into(samples, OperatingStatus::Fault);
    let offline_events = transitions_into(samples, OperatingStatus::Offline);
    let span_hours =
        (analysis.last_sample_at - analysis.first_sample_at).num_seconds().max(0);
    #[expect(clippy::cast_precision_loss)]
    let span_hours = span_hours as f64 / 3_600.0;

    Some(ReliabilityReport {
        equipment_id: equipment_id.to_owned(),
        window,
        sample_count: samples.len(),
        mean_availability: analysis.mean_availability,
        uptime_pct: count_f64(up) / count_f64(samples.len()) * 100.0,
        fault_events,
        offline_events,
        mean_time_between_faults_hours: (fault_events > 0)
            .then(|| span_hours / f64::from(fault_events)),
        degradation_rate_per_year: analysis.degradation_rate_per_year,
    })
}

/// Maintenance forecasting over the configured lookback
#[derive(Debug, Clone)]
pub struct ReliabilityPredictor {
    analyzer: PerformanceAnalyzer,
    settings: ReliabilitySettings,
}

impl ReliabilityPredictor {
    pub fn new(analyzer: PerformanceAnalyzer, settings: ReliabilitySettings) -> Self {
        Self { analyzer, settings }
    }

    fn insufficient(&self, equipment_id: &str) -> EngineError {
        EngineError::InsufficientData {
            equipment_id: equipment_id.to_owned(),
            available: 0,
            required: self.analyzer.min_samples(),
        }
    }

    pub fn predict_maintenance_needs(&self, equipment_id: &str) -> Result<MaintenanceForecast> {
        let now = Utc::now();
        let window = Timeframe::last_days(self.settings.lookback_days, now).resolve(now);
        let samples = self.analyzer.window_samples(equipment_id, &window)?;
        let forecast = forecast(equipment_id, window, &samples, &self.settings, now)
            .ok_or_else(|| self.insufficient(equipment_id))?;
        info!(
            equipment_id,
            urgency = ?forecast.urgency,
            confidence = ?forecast.confidence,
            "Maintenance forecast computed"
        );
        Ok(forecast)
    }

    pub fn reliability_report(
        &self,
        equipment_id: &str,
        timeframe: &Timeframe,
    ) -> Result<ReliabilityReport> {
        let window = timeframe.resolve(Utc::now());
        let samples = self.analyzer.window_samples(equipment_id, &window)?;
        reliability_summary(equipment_id, window, &samples)
            .ok_or_else(|| self.insufficient(equipment_id))
    }
}
