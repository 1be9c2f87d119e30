// Monte Carlo Soak — N seeded sessions with statistical aggregation
// Each run drives one session on a simulated clock and checks the engine
// invariants after every poll

use std::time::Instant;

use vitals_engine::*;

use crate::report::*;
use crate::time_series::TimeSeriesRecorder;

/// Simulated clock resolution; divides both default periods.
pub const POLL_STEP_MS: u64 = 1000;

/// Run a single seeded session for `ticks` vitals periods.
pub fn run_single(
    seed: u64,
    ticks: u64,
    time_series_dir: Option<&std::path::Path>,
) -> Result<SoakResult, ConfigError> {
    let start = Instant::now();
    let mut sim = TelemetrySimulation::from_config(EngineConfig::with_seed(seed))?;
    let simulated_ms = ticks * sim.config().vitals_interval_ms;

    let mut time_series = time_series_dir.map(|_| TimeSeriesRecorder::new());

    let mut vitals_committed = 0u32;
    let mut vitals_discarded = 0u32;
    let mut connectivity_ticks = 0u32;
    let mut bound_violations = 0u32;
    let mut latency_floor_violations = 0u32;
    let mut unreachable_status_hits = 0u32;
    let mut warning_samples = 0u64;
    let mut status_samples = 0u64;
    let mut latency_sum = 0.0_f64;
    let mut overall_sum = 0.0_f64;
    let mut overall_samples = 0u64;
    let mut min_overall = f64::INFINITY;

    sim.start_core(0);
    let mut now = 0;
    while now < simulated_ms {
        now += POLL_STEP_MS;
        let report = sim.poll_core(now);
        if report.is_empty() {
            continue;
        }
        vitals_committed += report.vitals_committed;
        vitals_discarded += report.vitals_discarded;
        connectivity_ticks += report.connectivity_ticks;

        for m in sim.vitals().metrics() {
            if !(m.min <= m.value && m.value <= m.max) {
                bound_violations += 1;
                log::error!("seed {}: {} = {} outside [{}, {}]", seed, m.key, m.value, m.min, m.max);
            }
        }

        for c in sim.connections() {
            status_samples += 1;
            latency_sum += c.latency_ms as f64;
            if c.latency_ms < LATENCY_FLOOR_MS {
                latency_floor_violations += 1;
                log::error!("seed {}: {} latency {} below floor", seed, c.id, c.latency_ms);
            }
            match c.status {
                ConnectionStatus::Warning => warning_samples += 1,
                ConnectionStatus::Disconnected => {
                    unreachable_status_hits += 1;
                    log::error!("seed {}: {} reached Disconnected", seed, c.id);
                }
                ConnectionStatus::Connected => {}
            }
        }

        if let Some(overall) = sim.assessment().overall {
            overall_sum += overall;
            overall_samples += 1;
            min_overall = min_overall.min(overall);
        }

        if let Some(ref mut ts) = time_series {
            ts.record(now, &sim);
        }
    }
    sim.stop();

    if let (Some(ts), Some(dir)) = (&time_series, time_series_dir) {
        let path = dir.join(format!("seed-{}.jsonl", seed));
        match ts.write_jsonl(&path) {
            Ok(()) => log::debug!("wrote {} rows to {}", ts.len(), path.display()),
            Err(e) => log::warn!("failed to write time series {}: {}", path.display(), e),
        }
    }

    let pass = bound_violations == 0 && latency_floor_violations == 0 && unreachable_status_hits == 0;
    Ok(SoakResult {
        seed,
        pass,
        simulated_ms,
        vitals_committed,
        vitals_discarded,
        connectivity_ticks,
        bound_violations,
        latency_floor_violations,
        unreachable_status_hits,
        warning_share_pct: ratio_pct(warning_samples, status_samples),
        mean_latency_ms: if status_samples > 0 { latency_sum / status_samples as f64 } else { 0.0 },
        mean_overall_score: if overall_samples > 0 { overall_sum / overall_samples as f64 } else { 0.0 },
        min_overall_score: if overall_samples > 0 { min_overall } else { 0.0 },
        elapsed_ms: start.elapsed().as_millis(),
    })
}

fn ratio_pct(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 / whole as f64 * 100.0
}

/// Run Monte Carlo: seeds `base_seed..base_seed + n_runs`, aggregate stats.
pub fn run_monte_carlo(
    n_runs: usize,
    ticks: u64,
    base_seed: u64,
    time_series_dir: Option<&std::path::Path>,
) -> Result<MonteCarloReport, ConfigError> {
    let mut results = Vec::with_capacity(n_runs);
    for i in 0..n_runs {
        let seed = base_seed + i as u64;
        results.push(run_single(seed, ticks, time_series_dir)?);
    }
    Ok(aggregate(results))
}

fn aggregate(results: Vec<SoakResult>) -> MonteCarloReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();
    let pass_rate = if n > 0 { passed as f64 / n as f64 } else { 0.0 };

    let collect = |f: fn(&SoakResult) -> f64| Stats::collect(results.iter().map(f));

    MonteCarloReport {
        n_runs: n,
        pass_rate,
        warning_share_pct: collect(|r| r.warning_share_pct),
        mean_latency_ms: collect(|r| r.mean_latency_ms),
        mean_overall_score: collect(|r| r.mean_overall_score),
        min_overall_score: collect(|r| r.min_overall_score),
        vitals_discarded: collect(|r| r.vitals_discarded as f64),
        elapsed_ms: collect(|r| r.elapsed_ms as f64),
        individual_runs: results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_run_holds_invariants() {
        let result = run_single(7, 100, None).unwrap();
        assert!(result.pass);
        assert_eq!(result.vitals_committed, 100);
        assert_eq!(result.connectivity_ticks, 150);
        assert_eq!(result.vitals_discarded, 0);
        assert!(result.mean_latency_ms >= LATENCY_FLOOR_MS as f64);
    }

    #[test]
    fn test_monte_carlo_aggregates_every_seed() {
        let report = run_monte_carlo(3, 20, 100, None).unwrap();
        assert_eq!(report.n_runs, 3);
        assert_eq!(report.pass_rate, 1.0);
        let seeds: Vec<u64> = report.individual_runs.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![100, 101, 102]);
    }

    #[test]
    fn test_ratio_pct() {
        assert_eq!(ratio_pct(1, 4), 25.0);
        assert_eq!(ratio_pct(0, 0), 0.0);
    }
}
