// Copyright 2026 Hypermesh Foundation. All rights reserved.
// VitalSense Telemetry Engine - Session Core

use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::config::{ConfigError, EngineConfig};
use crate::connectivity::ConnectivitySimulator;
use crate::random::SeededRandom;
use crate::risk::{self, HealthAssessment};
use crate::scheduler::{TickScheduler, TimerKind, TimerToken};
use crate::types::*;
use crate::vitals::{VitalSignSimulator, VitalsTick};

const VITALS_STREAM: u64 = 0;
const CONNECTIVITY_STREAM: u64 = 1;

// ─── TelemetrySimulation struct ──────────────────────────────────────────────

/// One dashboard session: both simulators, their random streams, and the
/// scheduler gating every timer-driven mutation.
#[wasm_bindgen]
pub struct TelemetrySimulation {
    pub(crate) config: EngineConfig,
    pub(crate) vitals: VitalSignSimulator,
    pub(crate) connectivity: ConnectivitySimulator,
    pub(crate) scheduler: TickScheduler,
    pub(crate) vitals_rng: SeededRandom,
    pub(crate) connectivity_rng: SeededRandom,
}

// ─── PollReport ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollReport {
    pub vitals_committed: u32,
    pub vitals_discarded: u32,
    pub connectivity_ticks: u32,
    /// Tick number of the latest committed vitals snapshot.
    pub snapshot_tick: u64,
}

impl PollReport {
    pub fn is_empty(&self) -> bool {
        self.vitals_committed == 0 && self.vitals_discarded == 0 && self.connectivity_ticks == 0
    }
}

// ─── Internal Logic (Testable, pure Rust) ────────────────────────────────────

impl TelemetrySimulation {
    pub fn from_config(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let vitals = VitalSignSimulator::new(&config.vitals)?;
        let connectivity = ConnectivitySimulator::new(&config.connections)?;
        let scheduler = TickScheduler::new(config.vitals_interval_ms, config.connectivity_interval_ms);
        log::info!(
            "session created: {} vitals, {} connections, seed {}",
            config.vitals.len(), config.connections.len(), config.seed
        );
        Ok(Self {
            vitals_rng: SeededRandom::with_stream(config.seed, VITALS_STREAM),
            connectivity_rng: SeededRandom::with_stream(config.seed, CONNECTIVITY_STREAM),
            config,
            vitals,
            connectivity,
            scheduler,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn start_core(&mut self, now_ms: u64) -> Vec<TimerToken> {
        self.scheduler.start(now_ms)
    }

    /// Run every tick due by `now_ms`. Nothing happens unless started.
    pub fn poll_core(&mut self, now_ms: u64) -> PollReport {
        let mut report = PollReport::default();
        for kind in self.scheduler.poll(now_ms) {
            match self.step(kind) {
                Some(true) => report.vitals_committed += 1,
                Some(false) => report.vitals_discarded += 1,
                None => report.connectivity_ticks += 1,
            }
        }
        report.snapshot_tick = self.vitals.snapshot().tick;
        report
    }

    /// Handle one external timer callback. Returns whether a tick ran.
    pub fn fire_core(&mut self, token: TimerToken) -> bool {
        if !self.scheduler.accept(token) {
            return false;
        }
        self.step(token.kind);
        true
    }

    /// `Some(committed)` for vitals, `None` for connectivity.
    fn step(&mut self, kind: TimerKind) -> Option<bool> {
        match kind {
            TimerKind::Vitals => {
                let outcome = self.vitals.tick(&mut self.vitals_rng);
                Some(matches!(outcome, VitalsTick::Committed(_)))
            }
            TimerKind::Connectivity => {
                self.connectivity.tick(&mut self.connectivity_rng);
                None
            }
        }
    }

    /// Rebuild both simulators and random streams from the stored config.
    ///
    /// The scheduler is stopped; callers start it again.
    pub fn rebuild(&mut self) -> Result<(), ConfigError> {
        let fresh = Self::from_config(self.config.clone())?;
        self.scheduler.stop();
        self.vitals = fresh.vitals;
        self.connectivity = fresh.connectivity;
        self.vitals_rng = fresh.vitals_rng;
        self.connectivity_rng = fresh.connectivity_rng;
        Ok(())
    }

    pub fn vitals_snapshot(&self) -> &VitalsSnapshot {
        self.vitals.snapshot()
    }

    pub fn vitals(&self) -> &VitalSignSimulator {
        &self.vitals
    }

    pub fn connections(&self) -> Vec<ConnectionResource> {
        self.connectivity.connections()
    }

    pub fn connectivity_summary(&self) -> ConnectivitySummary {
        self.connectivity.summary()
    }

    pub fn assessment(&self) -> HealthAssessment {
        risk::assess(&self.vitals)
    }

    pub fn scheduler(&self) -> &TickScheduler {
        &self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(seed: u64) -> TelemetrySimulation {
        TelemetrySimulation::from_config(EngineConfig::with_seed(seed)).unwrap()
    }

    #[test]
    fn test_poll_before_start_is_noop() {
        let mut sim = session(1);
        let report = sim.poll_core(60_000);
        assert!(report.is_empty());
        assert_eq!(sim.vitals_snapshot().tick, 0);
    }

    #[test]
    fn test_poll_counts_ticks() {
        let mut sim = session(1);
        sim.start_core(0);
        let report = sim.poll_core(6000);
        assert_eq!(report.vitals_committed, 2);
        assert_eq!(report.connectivity_ticks, 3);
        assert_eq!(report.snapshot_tick, 2);
        assert_eq!(sim.connectivity.ticks(), 3);
    }

    #[test]
    fn test_fire_respects_epoch() {
        let mut sim = session(1);
        let tokens = sim.start_core(0);
        let vitals_token = tokens.iter().find(|t| t.kind == TimerKind::Vitals).copied().unwrap();
        assert!(sim.fire_core(vitals_token));
        assert_eq!(sim.vitals_snapshot().tick, 1);

        sim.scheduler.stop();
        assert!(!sim.fire_core(vitals_token));
        assert_eq!(sim.vitals_snapshot().tick, 1);
    }

    #[test]
    fn test_rebuild_restores_baseline() {
        let mut sim = session(4);
        sim.start_core(0);
        sim.poll_core(30_000);
        assert!(sim.vitals_snapshot().tick > 0);
        sim.rebuild().unwrap();
        assert_eq!(sim.vitals_snapshot().tick, 0);
        assert!(!sim.scheduler().is_running());
        assert!(sim.connections().iter().all(|c| c.status == ConnectionStatus::Connected));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = EngineConfig::default();
        config.vitals[0].min = 200.0;
        assert!(TelemetrySimulation::from_config(config).is_err());
    }
}
