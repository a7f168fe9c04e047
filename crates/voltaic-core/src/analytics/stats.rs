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

//! Small numeric helpers shared by the analytics

use chrono::{DateTime, Utc};

#[expect(clippy::cast_precision_loss)]
pub fn count_f64(n: usize) -> f64 {
    n as f64
}

/// Seconds since the Unix epoch as a float, for regressions over time
#[expect(clippy::cast_precision_loss)]
pub fn epoch_secs(ts: DateTime<Utc>) -> f64 {
    ts.timestamp_millis() as f64 / 1000.0
}

/// Arithmetic mean, 0 for an empty input
pub fn mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0_usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 { 0.0 } else { sum / count_f64(n) }
}

/// Population standard deviation
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values.iter().copied());
    let var = mean(values.iter().map(|v| (v - m).powi(2)));
    var.sqrt()
}

/// Least-squares slope of `y` over `x`; `None` when `x` has no spread
pub fn linear_slope(points: &[(f64, f64)]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    let mx = mean(points.iter().map(|p| p.0));
    let my = mean(points.iter().map(|p| p.1));
    let (num, den) = points.iter().fold((0.0, 0.0), |(num, den), (x, y)| {
        (num + (x - mx) * (y - my), den + (x - mx).powi(2))
    });
    (den > f64::EPSILON).then(|| num / den)
}

/// Abramowitz & Stegun 7.1.26, max error 1.5e-7
fn erf(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    sign * (1.0 - poly * (-x * x).exp())
}

/// Standard normal CDF
pub fn normal_cdf(z: f64) -> f64 {
    0.5 * (1.0 + erf(z / std::f64::consts::SQRT_2))
}

/// Percentile (0-100) of `value` in a normal distribution
pub fn percentile(value: f64, mean: f64, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return if value >= mean { 100.0 } else { 0.0 };
    }
    (normal_cdf((value - mean) / std_dev) * 100.0).clamp(0.0, 100.0)
}

/// Size of the leading and trailing thirds of `len` items (at least one)
pub fn third_len(len: usize) -> usize {
    len.div_euclid(3).max(1)
}
