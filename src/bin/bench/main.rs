// Soak Bench Runner — Monte Carlo invariant validation for the telemetry engine
// Seedable ChaCha8 streams, simulated clock, per-poll invariant checks
//
// Usage:
//   cargo run --release --bin bench                     # 30 runs x 1000 vitals ticks
//   cargo run --release --bin bench -- --runs 5         # Quick mode
//   cargo run --release --bin bench -- --ticks 20000    # Longer sessions
//   cargo run --release --bin bench -- --time-series    # Enable JSONL output
//   cargo run --release --bin bench -- --seed 42        # Custom base seed
//
// RUST_LOG=debug shows state transitions and discarded ticks.

mod monte_carlo;
mod report;
mod time_series;

use report::*;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

// ─── CLI Parsing ────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
struct CliArgs {
    runs: usize,
    ticks: u64,
    seed: u64,
    time_series: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self { runs: 30, ticks: 1000, seed: 0, time_series: false }
    }
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> CliArgs {
    let mut cli = CliArgs::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--runs" => cli.runs = flag_value(&arg, args.next(), cli.runs),
            "--ticks" => cli.ticks = flag_value(&arg, args.next(), cli.ticks),
            "--seed" => cli.seed = flag_value(&arg, args.next(), cli.seed),
            "--time-series" => cli.time_series = true,
            other => log::warn!("ignoring unknown argument {}", other),
        }
    }
    cli
}

/// Parsed value of a flag, or `current` when missing or malformed.
fn flag_value<T>(flag: &str, value: Option<String>, current: T) -> T
where
    T: std::str::FromStr + std::fmt::Display,
{
    match value.as_deref().map(str::parse::<T>) {
        Some(Ok(parsed)) => parsed,
        _ => {
            log::warn!("{} needs a numeric value, keeping {}", flag, current);
            current
        }
    }
}

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = parse_args(std::env::args().skip(1));

    let ts_dir = if cli.time_series {
        Some(std::path::Path::new("benchmark-results/time-series").to_path_buf())
    } else {
        None
    };

    println!("\n  Telemetry Soak Runner v0.1.0");
    println!("  PRNG: ChaCha8Rng | Runs: {} | Vitals ticks/run: {} | Base seed: {}",
        cli.runs, cli.ticks, cli.seed);

    let suite_start = Instant::now();
    let mc = match monte_carlo::run_monte_carlo(cli.runs, cli.ticks, cli.seed, ts_dir.as_deref()) {
        Ok(report) => report,
        Err(e) => {
            log::error!("default configuration rejected: {}", e);
            std::process::exit(2);
        }
    };
    let suite_elapsed = suite_start.elapsed();

    println!("  {:<8} {:>5} {:>10} {:>10} {:>12} {:>8} {:>7}",
        "Seed", "Pass", "Warn%", "Latency", "Score(avg)", "Min", "Time");
    println!("  {}", "-".repeat(68));
    for run in &mc.individual_runs {
        println!("  {:<8} {:>5} {:>9.2}% {:>8.1}ms {:>12.1} {:>8.0} {:>5}ms",
            run.seed,
            if run.pass { "PASS" } else { "FAIL" },
            run.warning_share_pct,
            run.mean_latency_ms,
            run.mean_overall_score,
            run.min_overall_score,
            run.elapsed_ms,
        );
    }
    println!("  {}", "-".repeat(68));

    let invariants = InvariantValidation::from_runs(&mc.individual_runs);

    println!("  Pass rate: {:.1}%  Suite time: {:.1}s\n",
        mc.pass_rate * 100.0, suite_elapsed.as_secs_f64());
    println!("  Warning share:  {:.2}% ± {:.2}", mc.warning_share_pct.mean, mc.warning_share_pct.ci95);
    println!("  Mean latency:   {:.1}ms ± {:.1}", mc.mean_latency_ms.mean, mc.mean_latency_ms.ci95);
    println!("  Overall score:  {:.1} ± {:.1}\n", mc.mean_overall_score.mean, mc.mean_overall_score.ci95);

    println!("  Invariants:");
    println!("    Vitals within bounds:     {}", if invariants.vitals_within_bounds { "PASS" } else { "FAIL" });
    println!("    Latency floor (5ms):      {}", if invariants.latency_floor_holds { "PASS" } else { "FAIL" });
    println!("    Disconnected unreachable: {}\n", if invariants.disconnected_unreachable { "PASS" } else { "FAIL" });

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    let all_pass = invariants.all_pass();

    let report = SoakReport {
        timestamp: ts.to_string(),
        version: "0.1.0",
        prng: "ChaCha8Rng",
        base_seed: cli.seed,
        ticks_per_run: cli.ticks,
        invariants,
        monte_carlo: mc,
    };

    let path = std::path::Path::new("benchmark-results").join(format!("soak-{}.json", ts));
    if let Err(e) = write_report(&path, &report) {
        log::error!("failed to write {}: {}", path.display(), e);
    } else {
        println!("  Results saved to: {}\n", path.display());
    }

    if !all_pass {
        std::process::exit(1);
    }
}

fn write_report(path: &std::path::Path, report: &SoakReport) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    std::fs::write(path, json)
}
