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

//! Unit conversions and simple production physics.
//!
//! These are planning-grade approximations: orientation and tilt losses are
//! modelled as smooth penalties around the latitude optimum, not with a full
//! transposition model.

use voltaic_types::{ProductionEstimate, ShadingLevel, SystemConfiguration};

/// Cell temperature at which datasheet (STC) values are specified
pub const STC_TEMPERATURE_C: f64 = 25.0;

/// Wiring, soiling, mismatch and inverter conversion losses combined
pub const SYSTEM_LOSSES: f64 = 0.14;

/// Azimuth penalty when facing exactly away from the equator
const MAX_AZIMUTH_PENALTY: f64 = 0.35;

/// Quadratic tilt penalty per squared degree off the optimum
const TILT_PENALTY_PER_DEG2: f64 = 1.2e-4;

/// DC/AC ratio below which clipping is negligible
const CLIPPING_ONSET_RATIO: f64 = 1.25;

/// Shift a voltage by a %/°C temperature coefficient.
///
/// With the usual negative Voc coefficient, colder cells give a higher voltage.
#[must_use]
pub fn temperature_corrected_voltage(
    voltage_v: f64,
    coefficient_pct_per_c: f64,
    cell_temperature_c: f64,
) -> f64 {
    voltage_v * (1.0 + coefficient_pct_per_c / 100.0 * (cell_temperature_c - STC_TEMPERATURE_C))
}

/// Equator-facing azimuth for the hemisphere (180° north, 0° south)
#[must_use]
pub fn optimal_azimuth(latitude: f64) -> f64 {
    if latitude >= 0.0 { 180.0 } else { 0.0 }
}

/// Smallest angle between two compass bearings (0-180°)
#[must_use]
pub fn bearing_difference(a_deg: f64, b_deg: f64) -> f64 {
    let diff = (a_deg - b_deg).rem_euclid(360.0);
    if diff > 180.0 { 360.0 - diff } else { diff }
}

/// Production multiplier for array orientation (1.0 at the optimum)
#[must_use]
pub fn azimuth_factor(azimuth_deg: f64, latitude: f64) -> f64 {
    let deviation = bearing_difference(azimuth_deg, optimal_azimuth(latitude)).to_radians();
    1.0 - MAX_AZIMUTH_PENALTY * (1.0 - deviation.cos()) / 2.0
}

/// Rule-of-thumb fixed tilt for annual yield
#[must_use]
pub fn optimal_tilt(latitude: f64) -> f64 {
    (latitude.abs() * 0.87).clamp(0.0, 60.0)
}

/// Production multiplier for array tilt (1.0 at the optimum)
#[must_use]
pub fn tilt_factor(tilt_deg: f64, latitude: f64) -> f64 {
    let delta = tilt_deg - optimal_tilt(latitude);
    (1.0 - TILT_PENALTY_PER_DEG2 * delta * delta).clamp(0.55, 1.0)
}

#[must_use]
pub fn shading_factor(shading: ShadingLevel) -> f64 {
    match shading {
        ShadingLevel::None => 1.0,
        ShadingLevel::Light => 0.95,
        ShadingLevel::Moderate => 0.85,
        ShadingLevel::Heavy => 0.70,
    }
}

/// Annual-average peak sun hours by latitude band
#[must_use]
pub fn peak_sun_hours(latitude: f64) -> f64 {
    (6.2 - 0.06 * (latitude.abs() - 15.0).max(0.0)).clamp(2.5, 6.2)
}

/// Fraction of DC energy clipped by an undersized inverter
#[must_use]
pub fn clipping_loss(dc_ac_ratio: f64) -> f64 {
    ((dc_ac_ratio - CLIPPING_ONSET_RATIO).max(0.0) * 0.08).min(0.3)
}

/// DC/AC ratio, 0 when the inverter capacity is unknown
#[must_use]
pub fn dc_ac_ratio(total_dc_power_w: f64, inverter_ac_capacity_w: f64) -> f64 {
    if inverter_ac_capacity_w > 0.0 {
        total_dc_power_w / inverter_ac_capacity_w
    } else {
        0.0
    }
}

/// Planning estimate of yearly AC production for a configuration
#[must_use]
pub fn estimate_production(config: &SystemConfiguration) -> ProductionEstimate {
    let site = &config.installation;
    let latitude = site.location.latitude;
    let dc_kw = config.total_dc_power_w() / 1000.0;

    let psh = peak_sun_hours(latitude);
    let azimuth = azimuth_factor(site.azimuth_deg, latitude);
    let tilt = tilt_factor(site.tilt_deg, latitude);
    let shading = shading_factor(site.shading);
    let clipping = clipping_loss(dc_ac_ratio(
        config.total_dc_power_w(),
        config.inverter.ac_capacity_w,
    ));

    let annual =
        dc_kw * psh * 365.0 * (1.0 - SYSTEM_LOSSES) * azimuth * tilt * shading * (1.0 - clipping);

    ProductionEstimate {
        annual_production_kwh: annual,
        peak_sun_hours: psh,
        azimuth_factor: azimuth,
        tilt_factor: tilt,
        shading_factor: shading,
        clipping_loss: clipping,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_voltage_rises_in_cold() {
        // 40 V panel, -0.3 %/°C, at -10 °C: 40 × (1 + 0.003 × 35) = 44.2 V
        let v = temperature_corrected_voltage(40.0, -0.3, -10.0);
        assert!(approx(v, 44.2));
        assert!(approx(temperature_corrected_voltage(40.0, -0.3, 25.0), 40.0));
    }

    #[test]
    fn test_azimuth_factor_by_hemisphere() {
        assert!(approx(azimuth_factor(180.0, 45.0), 1.0));
        assert!(approx(azimuth_factor(0.0, -33.0), 1.0));
        assert!(approx(azimuth_factor(0.0, 45.0), 1.0 - MAX_AZIMUTH_PENALTY));
        let east = azimuth_factor(90.0, 45.0);
        assert!(east < 1.0 && east > 1.0 - MAX_AZIMUTH_PENALTY);
    }

    #[test]
    fn test_bearing_difference_wraps() {
        assert!(approx(bearing_difference(350.0, 10.0), 20.0));
        assert!(approx(bearing_difference(10.0, 350.0), 20.0));
        assert!(approx(bearing_difference(0.0, 180.0), 180.0));
    }

    #[test]
    fn test_tilt_factor_penalises_extremes() {
        let lat = 40.0;
        assert!(approx(tilt_factor(optimal_tilt(lat), lat), 1.0));
        assert!(tilt_factor(0.0, lat) < 1.0);
        // 55.2° off the optimum: 1 - 1.2e-4 × 55.2² ≈ 0.634
        let vertical = tilt_factor(90.0, lat);
        assert!(vertical < tilt_factor(60.0, lat));
        assert!((vertical - 0.634).abs() < 1e-3);
        // a vertical array at the equator hits the floor
        assert!(approx(tilt_factor(90.0, 0.0), 0.55));
    }

    #[test]
    fn test_shading_is_monotonic() {
        assert!(shading_factor(ShadingLevel::None) > shading_factor(ShadingLevel::Light));
        assert!(shading_factor(ShadingLevel::Light) > shading_factor(ShadingLevel::Moderate));
        assert!(shading_factor(ShadingLevel::Moderate) > shading_factor(ShadingLevel::Heavy));
    }

    #[test]
    fn test_clipping_loss() {
        assert!(approx(clipping_loss(1.1), 0.0));
        assert!(clipping_loss(1.83) > 0.0);
        assert!(approx(clipping_loss(10.0), 0.3));
    }

    #[test]
    fn test_peak_sun_hours_bounds() {
        assert!(approx(peak_sun_hours(0.0), 6.2));
        assert!(approx(peak_sun_hours(-10.0), 6.2));
        assert!(peak_sun_hours(50.0) < peak_sun_hours(30.0));
        assert!(approx(peak_sun_hours(89.0), 2.5));
    }
}
