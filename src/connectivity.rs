// Copyright 2026 Hypermesh Foundation. All rights reserved.
// VitalSense Telemetry Engine - Connectivity Simulator

use crate::config::{validate_connection_seeds, ConfigError, ConnectionSeed};
use crate::random::RandomSource;
use crate::types::{ConnectionResource, ConnectionStatus, ConnectivitySummary, LATENCY_FLOOR_MS};

/// Latency jitter span: `floor(u * 20) - 10` gives an integer step in `[-10, +9]`.
const LATENCY_JITTER_SPAN: f64 = 20.0;
const LATENCY_JITTER_OFFSET: i64 = 10;

/// Integer latency walk for a known draw, floored at [`LATENCY_FLOOR_MS`].
pub fn next_latency(previous_ms: u32, u: f64) -> u32 {
    // Non-finite draws count as zero jitter
    let jitter = if u.is_finite() {
        (u * LATENCY_JITTER_SPAN).floor() as i64 - LATENCY_JITTER_OFFSET
    } else {
        0
    };
    let next = (previous_ms as i64 + jitter).max(LATENCY_FLOOR_MS as i64);
    u32::try_from(next).unwrap_or(u32::MAX)
}

// ─── ConnectivitySimulator ───────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ConnectivitySimulator {
    resources: Vec<ConnectionResource>,
    ticks: u64,
}

impl ConnectivitySimulator {
    /// Every resource starts `Connected`; seed latencies below the floor are raised.
    pub fn new(seeds: &[ConnectionSeed]) -> Result<Self, ConfigError> {
        validate_connection_seeds(seeds)?;
        let resources = seeds
            .iter()
            .map(|s| ConnectionResource {
                id: s.id.clone(),
                label: if s.label.is_empty() { s.id.clone() } else { s.label.clone() },
                status: ConnectionStatus::Connected,
                latency_ms: s.latency_ms.max(LATENCY_FLOOR_MS),
            })
            .collect();
        Ok(Self { resources, ticks: 0 })
    }

    /// One latency draw then one status draw per resource, in order.
    pub fn tick<R: RandomSource + ?Sized>(&mut self, rng: &mut R) {
        self.ticks += 1;
        for conn in &mut self.resources {
            conn.latency_ms = next_latency(conn.latency_ms, rng.next_unit());
            let next = conn.status.next(rng.next_unit());
            if next != conn.status {
                log::debug!(
                    "connection {} {} -> {} ({} ms)",
                    conn.id, conn.status.as_str(), next.as_str(), conn.latency_ms
                );
                conn.status = next;
            }
        }
    }

    /// Copy of the current resources.
    pub fn connections(&self) -> Vec<ConnectionResource> {
        self.resources.clone()
    }

    pub fn resources(&self) -> &[ConnectionResource] {
        &self.resources
    }

    pub fn get(&self, id: &str) -> Option<&ConnectionResource> {
        self.resources.iter().find(|c| c.id == id)
    }

    pub fn summary(&self) -> ConnectivitySummary {
        ConnectivitySummary::from_resources(&self.resources)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
