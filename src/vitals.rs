// Copyright 2026 Hypermesh Foundation. All rights reserved.
// VitalSense Telemetry Engine - Vital Sign Simulator

use std::collections::BTreeMap;

use crate::config::{validate_metric_specs, ConfigError, MetricSpec};
use crate::random::RandomSource;
use crate::types::{VitalKey, VitalMetric, VitalsSnapshot};
use crate::walk;

/// Outcome of one vitals tick.
#[derive(Debug, Clone, PartialEq)]
pub enum VitalsTick {
    Committed(VitalsSnapshot),
    /// At least one candidate was not finite; nothing changed.
    Discarded { key: VitalKey },
}

impl VitalsTick {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }
}

// ─── VitalSignSimulator ──────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct VitalSignSimulator {
    metrics: Vec<VitalMetric>,
    snapshot: VitalsSnapshot,
    ticks_committed: u64,
    ticks_discarded: u64,
}

impl VitalSignSimulator {
    pub fn new(specs: &[MetricSpec]) -> Result<Self, ConfigError> {
        validate_metric_specs(specs)?;
        let metrics: Vec<VitalMetric> = specs
            .iter()
            .map(|s| VitalMetric {
                key: s.key,
                value: s.baseline,
                baseline: s.baseline,
                min: s.min,
                max: s.max,
                variance: s.variance,
                precision: s.precision,
            })
            .collect();
        let snapshot = snapshot_of(0, &metrics);
        Ok(Self { metrics, snapshot, ticks_committed: 0, ticks_discarded: 0 })
    }

    /// Advance every metric one step, all or nothing.
    ///
    /// Candidates are computed from the last committed values only. If any
    /// candidate is not finite the whole tick is dropped.
    pub fn tick<R: RandomSource + ?Sized>(&mut self, rng: &mut R) -> VitalsTick {
        let mut candidates = Vec::with_capacity(self.metrics.len());
        for metric in &self.metrics {
            let mut next = walk::step(metric.value, metric.variance, metric.min, metric.max, rng);
            if let Some(decimals) = metric.precision {
                next = walk::round_to(next, decimals);
            }
            candidates.push(next);
        }

        if let Some(idx) = candidates.iter().position(|v| !v.is_finite()) {
            let key = self.metrics[idx].key;
            self.ticks_discarded += 1;
            log::warn!(
                "vitals tick discarded: {} produced {} (holding tick {})",
                key, candidates[idx], self.snapshot.tick
            );
            return VitalsTick::Discarded { key };
        }

        for (metric, next) in self.metrics.iter_mut().zip(candidates) {
            // Rounding can step just past a bound that is not on the grid
            metric.value = next.max(metric.min).min(metric.max);
        }
        self.ticks_committed += 1;
        self.snapshot = snapshot_of(self.snapshot.tick + 1, &self.metrics);
        log::trace!("vitals tick {} committed", self.snapshot.tick);
        VitalsTick::Committed(self.snapshot.clone())
    }

    /// Latest committed snapshot.
    pub fn snapshot(&self) -> &VitalsSnapshot {
        &self.snapshot
    }

    pub fn metrics(&self) -> &[VitalMetric] {
        &self.metrics
    }

    pub fn metric(&self, key: VitalKey) -> Option<&VitalMetric> {
        self.metrics.iter().find(|m| m.key == key)
    }

    pub fn ticks_committed(&self) -> u64 {
        self.ticks_committed
    }

    pub fn ticks_discarded(&self) -> u64 {
        self.ticks_discarded
    }
}

fn snapshot_of(tick: u64, metrics: &[VitalMetric]) -> VitalsSnapshot {
    let values: BTreeMap<VitalKey, f64> = metrics.iter().map(|m| (m.key, m.value)).collect();
    VitalsSnapshot { tick, values }
}
