// Per-Poll JSONL Time Series Recorder
// Outputs one JSON line per poll that ran at least one tick

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;
use vitals_engine::{HealthStatusBand, TelemetrySimulation, VitalKey};

#[derive(Debug, Serialize)]
pub struct TickSnapshot {
    pub time_ms: u64,
    pub vitals_tick: u64,
    pub vitals: BTreeMap<VitalKey, f64>,
    pub connected: usize,
    pub total_connections: usize,
    pub latencies_ms: Vec<u32>,
    pub overall_score: Option<f64>,
    pub band: Option<HealthStatusBand>,
}

impl TickSnapshot {
    pub fn from_session(time_ms: u64, sim: &TelemetrySimulation) -> Self {
        let snapshot = sim.vitals_snapshot();
        let summary = sim.connectivity_summary();
        let assessment = sim.assessment();
        Self {
            time_ms,
            vitals_tick: snapshot.tick,
            vitals: snapshot.values.clone(),
            connected: summary.connected,
            total_connections: summary.total,
            latencies_ms: sim.connections().iter().map(|c| c.latency_ms).collect(),
            overall_score: assessment.overall,
            band: assessment.band,
        }
    }
}

/// Accumulates snapshots and writes JSONL
pub struct TimeSeriesRecorder {
    snapshots: Vec<TickSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, time_ms: u64, sim: &TelemetrySimulation) {
        self.snapshots.push(TickSnapshot::from_session(time_ms, sim));
    }

    /// Write all snapshots to a JSONL file
    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
}
