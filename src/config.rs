// Copyright 2026 Hypermesh Foundation. All rights reserved.
// VitalSense Telemetry Engine - Configuration

//! Engine configuration and construction-time validation.
//!
//! Every field defaults to the canonical dashboard values, so an empty JSON
//! object (or `undefined` from the front end) yields the standard session.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::VitalKey;

pub const DEFAULT_VITALS_INTERVAL_MS: u64 = 3000;
pub const DEFAULT_CONNECTIVITY_INTERVAL_MS: u64 = 2000;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Rejected configuration. Raised only at construction, never per tick.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("metric {key}: min {min} exceeds max {max}")]
    InvertedBounds { key: VitalKey, min: f64, max: f64 },

    #[error("metric {key}: variance must be positive, got {variance}")]
    NonPositiveVariance { key: VitalKey, variance: f64 },

    #[error("metric {key}: {field} is not a finite number")]
    NonFiniteParameter { key: VitalKey, field: &'static str },

    #[error("metric {key}: baseline {baseline} outside [{min}, {max}]")]
    BaselineOutOfBounds { key: VitalKey, baseline: f64, min: f64, max: f64 },

    #[error("metric {0} configured more than once")]
    DuplicateMetric(VitalKey),

    #[error("no vital metrics configured")]
    NoMetrics,

    #[error("connection id {0:?} configured more than once")]
    DuplicateConnection(String),

    #[error("connection id must not be empty")]
    EmptyConnectionId,

    #[error("{0} interval must be greater than zero")]
    ZeroInterval(&'static str),

    #[error("invalid configuration document: {0}")]
    Parse(#[from] serde_json::Error),
}

// ---------------------------------------------------------------------------
// MetricSpec
// ---------------------------------------------------------------------------

/// Walk parameters for one vital.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricSpec {
    pub key: VitalKey,
    pub baseline: f64,
    pub min: f64,
    pub max: f64,
    pub variance: f64,
    #[serde(default)]
    pub precision: Option<u32>,
}

impl MetricSpec {
    pub fn new(key: VitalKey, baseline: f64, min: f64, max: f64, variance: f64, precision: Option<u32>) -> Self {
        Self { key, baseline, min, max, variance, precision }
    }

    /// Canonical parameters for each vital.
    pub fn canonical(key: VitalKey) -> Self {
        match key {
            VitalKey::OxygenSaturation => Self::new(key, 98.0, 94.0, 100.0, 2.0, None),
            VitalKey::HeartRate => Self::new(key, 72.0, 60.0, 100.0, 4.0, Some(0)),
            VitalKey::RespiratoryRate => Self::new(key, 16.0, 12.0, 20.0, 2.0, Some(0)),
            VitalKey::BodyTemperature => Self::new(key, 98.6, 97.5, 99.5, 0.3, Some(1)),
            VitalKey::Hydration => Self::new(key, 85.0, 70.0, 100.0, 3.0, Some(0)),
            VitalKey::StressIndex => Self::new(key, 22.0, 10.0, 50.0, 5.0, Some(0)),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let key = self.key;
        for (field, v) in [
            ("baseline", self.baseline),
            ("min", self.min),
            ("max", self.max),
            ("variance", self.variance),
        ] {
            if !v.is_finite() {
                return Err(ConfigError::NonFiniteParameter { key, field });
            }
        }
        if self.min > self.max {
            return Err(ConfigError::InvertedBounds { key, min: self.min, max: self.max });
        }
        if self.variance <= 0.0 {
            return Err(ConfigError::NonPositiveVariance { key, variance: self.variance });
        }
        if self.baseline < self.min || self.baseline > self.max {
            return Err(ConfigError::BaselineOutOfBounds {
                key,
                baseline: self.baseline,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

pub fn default_metric_specs() -> Vec<MetricSpec> {
    VitalKey::ALL.iter().map(|k| MetricSpec::canonical(*k)).collect()
}

// ---------------------------------------------------------------------------
// ConnectionSeed
// ---------------------------------------------------------------------------

/// Initial state of one monitored connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionSeed {
    pub id: String,
    #[serde(default)]
    pub label: String,
    pub latency_ms: u32,
}

impl ConnectionSeed {
    pub fn new(id: &str, label: &str, latency_ms: u32) -> Self {
        Self { id: id.to_string(), label: label.to_string(), latency_ms }
    }
}

pub fn default_connection_seeds() -> Vec<ConnectionSeed> {
    vec![
        ConnectionSeed::new("iot", "IoT Device", 12),
        ConnectionSeed::new("internet", "Internet", 45),
        ConnectionSeed::new("ai", "AI Models", 128),
        ConnectionSeed::new("cloud", "Cloud Sync", 89),
    ]
}

pub(crate) fn validate_metric_specs(specs: &[MetricSpec]) -> Result<(), ConfigError> {
    if specs.is_empty() {
        return Err(ConfigError::NoMetrics);
    }
    let mut seen = HashSet::new();
    for spec in specs {
        spec.validate()?;
        if !seen.insert(spec.key) {
            return Err(ConfigError::DuplicateMetric(spec.key));
        }
    }
    Ok(())
}

pub(crate) fn validate_connection_seeds(seeds: &[ConnectionSeed]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for seed in seeds {
        if seed.id.trim().is_empty() {
            return Err(ConfigError::EmptyConnectionId);
        }
        if !seen.insert(seed.id.as_str()) {
            return Err(ConfigError::DuplicateConnection(seed.id.clone()));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

fn default_vitals_interval() -> u64 { DEFAULT_VITALS_INTERVAL_MS }
fn default_connectivity_interval() -> u64 { DEFAULT_CONNECTIVITY_INTERVAL_MS }

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    #[serde(default)]
    pub seed: u64,
    #[serde(default = "default_vitals_interval")]
    pub vitals_interval_ms: u64,
    #[serde(default = "default_connectivity_interval")]
    pub connectivity_interval_ms: u64,
    #[serde(default = "default_metric_specs")]
    pub vitals: Vec<MetricSpec>,
    #[serde(default = "default_connection_seeds")]
    pub connections: Vec<ConnectionSeed>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            vitals_interval_ms: DEFAULT_VITALS_INTERVAL_MS,
            connectivity_interval_ms: DEFAULT_CONNECTIVITY_INTERVAL_MS,
            vitals: default_metric_specs(),
            connections: default_connection_seeds(),
        }
    }
}

impl EngineConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self { seed, ..Self::default() }
    }

    /// Parse and validate a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vitals_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("vitals"));
        }
        if self.connectivity_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval("connectivity"));
        }
        validate_metric_specs(&self.vitals)?;
        validate_connection_seeds(&self.connections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.vitals.len(), 6);
        assert_eq!(config.connections.len(), 4);
        assert_eq!(config.vitals_interval_ms, 3000);
        assert_eq!(config.connectivity_interval_ms, 2000);
    }

    #[test]
    fn test_empty_document_yields_defaults() {
        let config = EngineConfig::from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_partial_document_overrides() {
        let config = EngineConfig::from_json(
            r#"{"seed": 9, "connections": [{"id": "ble", "latency_ms": 20}]}"#,
        )
        .unwrap();
        assert_eq!(config.seed, 9);
        assert_eq!(config.connections.len(), 1);
        assert_eq!(config.connections[0].label, "");
        assert_eq!(config.vitals.len(), 6);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let spec = MetricSpec::new(VitalKey::HeartRate, 72.0, 100.0, 60.0, 4.0, Some(0));
        assert!(matches!(spec.validate(), Err(ConfigError::InvertedBounds { .. })));
    }

    #[test]
    fn test_non_positive_variance_rejected() {
        let zero = MetricSpec::new(VitalKey::HeartRate, 72.0, 60.0, 100.0, 0.0, Some(0));
        assert!(matches!(zero.validate(), Err(ConfigError::NonPositiveVariance { .. })));
        let negative = MetricSpec::new(VitalKey::HeartRate, 72.0, 60.0, 100.0, -1.0, Some(0));
        assert!(matches!(negative.validate(), Err(ConfigError::NonPositiveVariance { .. })));
    }

    #[test]
    fn test_non_finite_rejected() {
        let spec = MetricSpec::new(VitalKey::Hydration, f64::NAN, 70.0, 100.0, 3.0, Some(0));
        assert!(matches!(
            spec.validate(),
            Err(ConfigError::NonFiniteParameter { field: "baseline", .. })
        ));
    }

    #[test]
    fn test_baseline_outside_bounds_rejected() {
        let spec = MetricSpec::new(VitalKey::StressIndex, 60.0, 10.0, 50.0, 5.0, Some(0));
        assert!(matches!(spec.validate(), Err(ConfigError::BaselineOutOfBounds { .. })));
    }

    #[test]
    fn test_duplicate_metric_rejected() {
        let specs = vec![
            MetricSpec::canonical(VitalKey::HeartRate),
            MetricSpec::canonical(VitalKey::HeartRate),
        ];
        assert!(matches!(
            validate_metric_specs(&specs),
            Err(ConfigError::DuplicateMetric(VitalKey::HeartRate))
        ));
    }

    #[test]
    fn test_empty_metrics_rejected() {
        assert!(matches!(validate_metric_specs(&[]), Err(ConfigError::NoMetrics)));
    }

    #[test]
    fn test_connection_seed_checks() {
        let dup = vec![ConnectionSeed::new("a", "A", 10), ConnectionSeed::new("a", "B", 10)];
        assert!(matches!(
            validate_connection_seeds(&dup),
            Err(ConfigError::DuplicateConnection(id)) if id == "a"
        ));
        let empty = vec![ConnectionSeed::new("  ", "blank", 10)];
        assert!(matches!(validate_connection_seeds(&empty), Err(ConfigError::EmptyConnectionId)));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = EngineConfig { vitals_interval_ms: 0, ..EngineConfig::default() };
        assert!(matches!(config.validate(), Err(ConfigError::ZeroInterval("vitals"))));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = EngineConfig::from_json("{\"seed\": \"x\"}").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("invalid configuration document"));
    }
}
