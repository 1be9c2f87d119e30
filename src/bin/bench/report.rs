// Soak Report Types
// Structured output for per-seed runs and their Monte Carlo aggregation

use serde::Serialize;

// ─── Statistics (per-metric Monte Carlo aggregation) ────────────────────────

/// z for a two-sided 95% interval.
const Z_95: f64 = 1.96;

/// Running summary of one per-seed quantity, updated sample by sample.
///
/// Non-finite samples are skipped so one broken run cannot poison the suite.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Stats {
    pub n: usize,
    pub mean: f64,
    pub std_dev: f64,
    /// Half-width of the 95% confidence interval around `mean`.
    pub ci95: f64,
    pub min: f64,
    pub max: f64,
    #[serde(skip)]
    sum_sq_dev: f64,
}

impl Stats {
    pub fn collect<I: IntoIterator<Item = f64>>(samples: I) -> Self {
        let mut stats = Self::default();
        for x in samples {
            stats.push(x);
        }
        stats
    }

    pub fn push(&mut self, x: f64) {
        if !x.is_finite() {
            return;
        }
        self.n += 1;
        if self.n == 1 {
            self.min = x;
            self.max = x;
        } else {
            self.min = self.min.min(x);
            self.max = self.max.max(x);
        }
        let delta = x - self.mean;
        self.mean += delta / self.n as f64;
        self.sum_sq_dev += delta * (x - self.mean);

        let variance = if self.n > 1 { self.sum_sq_dev / (self.n - 1) as f64 } else { 0.0 };
        self.std_dev = variance.sqrt();
        self.ci95 = Z_95 * self.std_dev / (self.n as f64).sqrt();
    }
}

// ─── Single-Run Result ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SoakResult {
    pub seed: u64,
    pub pass: bool,
    pub simulated_ms: u64,
    pub vitals_committed: u32,
    pub vitals_discarded: u32,
    pub connectivity_ticks: u32,
    pub bound_violations: u32,
    pub latency_floor_violations: u32,
    pub unreachable_status_hits: u32,
    pub warning_share_pct: f64,
    pub mean_latency_ms: f64,
    pub mean_overall_score: f64,
    pub min_overall_score: f64,
    pub elapsed_ms: u128,
}

// ─── Monte Carlo Report ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct MonteCarloReport {
    pub n_runs: usize,
    pub pass_rate: f64,
    pub warning_share_pct: Stats,
    pub mean_latency_ms: Stats,
    pub mean_overall_score: Stats,
    pub min_overall_score: Stats,
    pub vitals_discarded: Stats,
    pub elapsed_ms: Stats,
    pub individual_runs: Vec<SoakResult>,
}

// ─── Invariant Summary ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct InvariantValidation {
    pub vitals_within_bounds: bool,
    pub latency_floor_holds: bool,
    pub disconnected_unreachable: bool,
}

impl InvariantValidation {
    pub fn from_runs(runs: &[SoakResult]) -> Self {
        Self {
            vitals_within_bounds: runs.iter().all(|r| r.bound_violations == 0),
            latency_floor_holds: runs.iter().all(|r| r.latency_floor_violations == 0),
            disconnected_unreachable: runs.iter().all(|r| r.unreachable_status_hits == 0),
        }
    }

    pub fn all_pass(&self) -> bool {
        self.vitals_within_bounds && self.latency_floor_holds && self.disconnected_unreachable
    }
}

// ─── Top-Level Report ───────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SoakReport {
    pub timestamp: String,
    pub version: &'static str,
    pub prng: &'static str,
    pub base_seed: u64,
    pub ticks_per_run: u64,
    pub invariants: InvariantValidation,
    pub monte_carlo: MonteCarloReport,
}
