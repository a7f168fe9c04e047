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

pub mod alert;
pub mod analytics;
pub mod api;
pub mod compatibility;
pub mod configuration;
pub mod equipment;
pub mod telemetry;

// Re-export common types for convenience
pub use alert::{
    Alert, AlertDimension, AlertState, AlertThresholds, ResolutionSource, TransitionError,
};
pub use analytics::{
    Benchmark, BenchmarkComparison, ConfidenceLevel, DaysEstimate, ExcludedUnit,
    FleetComparison, FleetEntry, MaintenanceForecast, MaintenanceUrgency, PerformanceAnalysis,
    PerformanceTrend, ReliabilityReport, StatusBreakdown, TimeWindow, Timeframe, TimeframePreset,
};
pub use api::{
    AlertAction, AlertManagementRequest, AlertManagementResponse, AnalysisType, AnalyticsQuery,
    AnalyticsResponse, AnalyticsResult, BatchItemResult, CompatibilityAnalysis,
    CompatibilityOptions, CompatibilityReport, CompatibilityRequest, FieldError, IngestResponse,
    ProductionEstimate, RecordResult, SystemSummary, TelemetryResponse,
};
pub use compatibility::{
    AlternativeConfiguration, CompatibilityDomain, CompatibilityIssue, CompatibilityResult,
    ComplianceCheck, ConfigurationDelta, DomainScores, ElectricalValidation, ImpactScores,
    IssueKind, PhysicalValidation, Severity,
};
pub use configuration::{Installation, Layout, Location, ShadingLevel, SystemConfiguration};
pub use equipment::{
    BatterySpec, ComponentSpec, EquipmentRecord, EquipmentType, InverterKind, InverterSpec,
    PanelSpec, RackingSpec, RoofType,
};
pub use telemetry::{
    CalculatedMetrics, DataQuality, EnvironmentalConditions, OperatingStatus,
    PerformanceMetricSample, RealtimeMetrics, RecordStatus,
};
