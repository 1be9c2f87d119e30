// Copyright 2026 Hypermesh Foundation. All rights reserved.
// VitalSense Telemetry Engine - Type Definitions

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Latency floor applied to every connection, in milliseconds.
pub const LATENCY_FLOOR_MS: u32 = 5;

// ─── Vital Key ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum VitalKey {
    OxygenSaturation,
    HeartRate,
    RespiratoryRate,
    BodyTemperature,
    Hydration,
    StressIndex,
}

impl VitalKey {
    pub const ALL: [VitalKey; 6] = [
        Self::OxygenSaturation,
        Self::HeartRate,
        Self::RespiratoryRate,
        Self::BodyTemperature,
        Self::Hydration,
        Self::StressIndex,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OxygenSaturation => "oxygen_saturation",
            Self::HeartRate => "heart_rate",
            Self::RespiratoryRate => "respiratory_rate",
            Self::BodyTemperature => "body_temperature",
            Self::Hydration => "hydration",
            Self::StressIndex => "stress_index",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OxygenSaturation => "Blood Oxygen",
            Self::HeartRate => "Heart Rate",
            Self::RespiratoryRate => "Respiratory Rate",
            Self::BodyTemperature => "Body Temperature",
            Self::Hydration => "Hydration",
            Self::StressIndex => "Stress Index",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::OxygenSaturation | Self::Hydration => "%",
            Self::HeartRate => "bpm",
            Self::RespiratoryRate => "br/min",
            Self::BodyTemperature => "°F",
            Self::StressIndex => "index",
        }
    }
}

impl fmt::Display for VitalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── VitalMetric ─────────────────────────────────────────────────────────────

/// One live vital reading plus the walk parameters that evolve it.
///
/// `min <= value <= max` holds after construction and after every committed tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VitalMetric {
    pub key: VitalKey,
    pub value: f64,
    pub baseline: f64,
    pub min: f64,
    pub max: f64,
    pub variance: f64,
    /// Decimal places kept after each step; `None` keeps the raw float.
    pub precision: Option<u32>,
}

// ─── VitalsSnapshot ──────────────────────────────────────────────────────────

/// Point-in-time copy of every vital, produced once per committed tick.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VitalsSnapshot {
    pub tick: u64,
    pub values: BTreeMap<VitalKey, f64>,
}

impl VitalsSnapshot {
    pub fn get(&self, key: VitalKey) -> Option<f64> {
        self.values.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ─── Connection Status ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    Connected,
    Warning,
    Disconnected,
}

impl Default for ConnectionStatus {
    fn default() -> Self { ConnectionStatus::Connected }
}

impl ConnectionStatus {
    /// Transition threshold out of `Connected` (draw must exceed it).
    pub const DEGRADE_ABOVE: f64 = 0.95;
    /// Transition threshold out of `Warning` (draw must exceed it).
    pub const RECOVER_ABOVE: f64 = 0.5;

    /// Next status given a uniform draw in `[0, 1)`.
    ///
    /// No rule leads into `Disconnected`; once there (only by seeding) it stays.
    pub fn next(self, r: f64) -> Self {
        match self {
            Self::Connected if r > Self::DEGRADE_ABOVE => Self::Warning,
            Self::Warning if r > Self::RECOVER_ABOVE => Self::Connected,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Connected => "connected",
            Self::Warning => "warning",
            Self::Disconnected => "disconnected",
        }
    }
}

// ─── ConnectionResource ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionResource {
    pub id: String,
    pub label: String,
    pub status: ConnectionStatus,
    pub latency_ms: u32,
}

impl ConnectionResource {
    pub fn latency_band(&self) -> LatencyBand {
        LatencyBand::from_latency(self.latency_ms)
    }
}

// ─── Latency Band ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LatencyBand {
    Good,
    Elevated,
    Poor,
}

impl LatencyBand {
    pub fn from_latency(latency_ms: u32) -> Self {
        if latency_ms < 50 {
            Self::Good
        } else if latency_ms < 150 {
            Self::Elevated
        } else {
            Self::Poor
        }
    }
}

// ─── ConnectivitySummary ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ConnectivitySummary {
    pub connected: usize,
    pub total: usize,
    /// Share of connected resources, 0-100.
    pub health_pct: f64,
}

impl ConnectivitySummary {
    pub fn from_resources(resources: &[ConnectionResource]) -> Self {
        let total = resources.len();
        let connected = resources
            .iter()
            .filter(|c| c.status == ConnectionStatus::Connected)
            .count();
        let health_pct = if total == 0 {
            0.0
        } else {
            connected as f64 / total as f64 * 100.0
        };
        Self { connected, total, health_pct }
    }
}

impl fmt::Display for ConnectivitySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} Active", self.connected, self.total)
    }
}

// ─── Risk Level / Health Band ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Status pill text on the home dashboard.
    pub fn status_label(&self) -> &'static str {
        match self {
            Self::Low => "Normal",
            Self::Medium => "Monitor",
            Self::High => "Attention Needed",
        }
    }

    /// Caption under the overall risk ring.
    pub fn ring_label(&self) -> &'static str {
        match self {
            Self::Low => "Excellent",
            Self::Medium => "Good",
            Self::High => "Monitor",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatusBand {
    Excellent,
    Good,
    Fair,
    NeedsAttention,
}

impl HealthStatusBand {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Fair => "Fair",
            Self::NeedsAttention => "Needs Attention",
        }
    }
}

// ─── Trend ───────────────────────────────────────────────────────────────────

/// Direction annotation supplied by the caller; never derived here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

impl Default for Trend {
    fn default() -> Self { Trend::Stable }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource(id: &str, status: ConnectionStatus, latency_ms: u32) -> ConnectionResource {
        ConnectionResource {
            id: id.to_string(),
            label: id.to_string(),
            status,
            latency_ms,
        }
    }

    #[test]
    fn test_connected_degrades_only_above_threshold() {
        assert_eq!(ConnectionStatus::Connected.next(0.95), ConnectionStatus::Connected);
        assert_eq!(ConnectionStatus::Connected.next(0.951), ConnectionStatus::Warning);
        assert_eq!(ConnectionStatus::Connected.next(0.0), ConnectionStatus::Connected);
    }

    #[test]
    fn test_warning_recovers_above_half() {
        assert_eq!(ConnectionStatus::Warning.next(0.5), ConnectionStatus::Warning);
        assert_eq!(ConnectionStatus::Warning.next(0.51), ConnectionStatus::Connected);
    }

    #[test]
    fn test_disconnected_is_absorbing() {
        for r in [0.0, 0.49, 0.5, 0.96, 0.999] {
            assert_eq!(ConnectionStatus::Disconnected.next(r), ConnectionStatus::Disconnected);
        }
    }

    #[test]
    fn test_latency_bands() {
        assert_eq!(LatencyBand::from_latency(5), LatencyBand::Good);
        assert_eq!(LatencyBand::from_latency(49), LatencyBand::Good);
        assert_eq!(LatencyBand::from_latency(50), LatencyBand::Elevated);
        assert_eq!(LatencyBand::from_latency(149), LatencyBand::Elevated);
        assert_eq!(LatencyBand::from_latency(150), LatencyBand::Poor);
    }

    #[test]
    fn test_summary_counts_connected_only() {
        let resources = vec![
            resource("iot", ConnectionStatus::Connected, 12),
            resource("internet", ConnectionStatus::Warning, 45),
            resource("ai", ConnectionStatus::Connected, 128),
            resource("cloud", ConnectionStatus::Disconnected, 89),
        ];
        let summary = ConnectivitySummary::from_resources(&resources);
        assert_eq!(summary.connected, 2);
        assert_eq!(summary.total, 4);
        assert!((summary.health_pct - 50.0).abs() < f64::EPSILON);
        assert_eq!(summary.to_string(), "2/4 Active");
    }

    #[test]
    fn test_summary_of_nothing_is_zero() {
        let summary = ConnectivitySummary::from_resources(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.health_pct, 0.0);
    }

    #[test]
    fn test_wire_names() {
        let json = serde_json::to_string(&VitalKey::BodyTemperature).unwrap();
        assert_eq!(json, "\"body_temperature\"");
        let json = serde_json::to_string(&HealthStatusBand::NeedsAttention).unwrap();
        assert_eq!(json, "\"needs_attention\"");
        let status: ConnectionStatus = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(status, ConnectionStatus::Warning);
    }

    #[test]
    fn test_snapshot_serializes_keys_as_names() {
        let mut values = BTreeMap::new();
        values.insert(VitalKey::HeartRate, 72.0);
        let snapshot = VitalsSnapshot { tick: 3, values };
        let json = serde_json::to_string(&snapshot).unwrap();
        assert_eq!(json, r#"{"tick":3,"values":{"heart_rate":72.0}}"#);
    }
}
