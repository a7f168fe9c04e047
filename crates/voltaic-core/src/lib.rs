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

pub mod alerts;
pub mod analytics;
pub mod compatibility;
pub mod config;
pub mod error;
pub mod memory;
pub mod physics;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod validation;

#[cfg(test)]
mod test_support;

pub use alerts::{AlertEngine, Violation, violations};
pub use analytics::{
    Benchmarker, FleetComparator, PerformanceAnalyzer, ReliabilityPredictor,
    get_market_benchmarks, recommendations_for,
};
pub use compatibility::{CompatibilityEngine, analyze, generate_alternatives};
pub use config::{
    AlertSettings, AnalyticsSettings, EngineConfig, FleetSettings, IngestSettings,
    ReliabilitySettings,
};
pub use error::{EngineError, Result, ValidationErrors};
pub use memory::{MemoryAlertStore, MemoryCatalog, MemorySampleStore};
pub use service::VoltaicService;
pub use store::{AlertStore, EquipmentCatalog, SampleStore};
pub use telemetry::PerformanceRecorder;
pub use validation::{validate_configuration, validate_sample, validate_thresholds};
