// Copyright 2026 Hypermesh Foundation. All rights reserved.
// VitalSense Telemetry Engine - Tick Scheduler

//! Cooperative, clock-driven tick scheduling.
//!
//! The scheduler owns no thread and no timer of its own. The host either
//! polls it with the current time ([`TickScheduler::poll`]) or installs its
//! own repeating timers and checks each callback's [`TimerToken`] with
//! [`TickScheduler::accept`]. Each `start` opens a new epoch; tokens from an
//! older epoch, or any token after `stop`, are refused.

use serde::{Deserialize, Serialize};

/// Ticks fired per timer in a single poll before the timer resyncs to `now`.
pub const MAX_CATCH_UP: usize = 16;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TimerKind {
    Vitals,
    Connectivity,
}

/// Handle given to an external timer callback.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerToken {
    pub kind: TimerKind,
    pub epoch: u64,
    pub period_ms: u64,
}

#[derive(Debug, Clone)]
struct Timer {
    kind: TimerKind,
    period_ms: u64,
    /// `None` once the next deadline would pass the end of the clock range.
    next_due_ms: Option<u64>,
}

impl Timer {
    fn new(kind: TimerKind, period_ms: u64, now_ms: u64) -> Self {
        let mut timer = Self { kind, period_ms, next_due_ms: None };
        timer.reschedule(now_ms.checked_add(period_ms));
        timer
    }

    fn reschedule(&mut self, next_due_ms: Option<u64>) {
        if next_due_ms.is_none() {
            log::warn!("{:?} timer ran past the end of the clock range, retired", self.kind);
        }
        self.next_due_ms = next_due_ms;
    }
}

// ─── TickScheduler ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct TickScheduler {
    vitals_period_ms: u64,
    connectivity_period_ms: u64,
    timers: Vec<Timer>,
    epoch: u64,
    running: bool,
    suppressed: u64,
}

impl TickScheduler {
    /// Periods are validated by `EngineConfig`; zero is raised to 1 ms here.
    pub fn new(vitals_period_ms: u64, connectivity_period_ms: u64) -> Self {
        Self {
            vitals_period_ms: vitals_period_ms.max(1),
            connectivity_period_ms: connectivity_period_ms.max(1),
            timers: Vec::new(),
            epoch: 0,
            running: false,
            suppressed: 0,
        }
    }

    /// Install both repeating timers; first ticks fall one period after `now_ms`.
    ///
    /// Starting while already running keeps the current epoch and timers.
    pub fn start(&mut self, now_ms: u64) -> Vec<TimerToken> {
        if self.running {
            log::debug!("scheduler already running (epoch {})", self.epoch);
            return self.tokens();
        }
        self.epoch += 1;
        self.running = true;
        self.timers = vec![
            Timer::new(TimerKind::Vitals, self.vitals_period_ms, now_ms),
            Timer::new(TimerKind::Connectivity, self.connectivity_period_ms, now_ms),
        ];
        log::info!(
            "scheduler started (epoch {}, vitals {} ms, connectivity {} ms)",
            self.epoch, self.vitals_period_ms, self.connectivity_period_ms
        );
        self.tokens()
    }

    /// Cancel both timers. Returns whether anything was running.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.timers.clear();
        log::info!("scheduler stopped (epoch {})", self.epoch);
        true
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Tokens for the live epoch; empty when stopped.
    pub fn tokens(&self) -> Vec<TimerToken> {
        self.timers
            .iter()
            .map(|t| TimerToken { kind: t.kind, epoch: self.epoch, period_ms: t.period_ms })
            .collect()
    }

    pub fn period_ms(&self, kind: TimerKind) -> u64 {
        match kind {
            TimerKind::Vitals => self.vitals_period_ms,
            TimerKind::Connectivity => self.connectivity_period_ms,
        }
    }

    /// Ticks due up to and including `now_ms`, in firing order.
    ///
    /// Equal deadlines fire vitals before connectivity.
    pub fn poll(&mut self, now_ms: u64) -> Vec<TimerKind> {
        if !self.running {
            return Vec::new();
        }
        let mut due: Vec<(u64, TimerKind)> = Vec::new();
        for timer in &mut self.timers {
            let mut fired = 0;
            while let Some(at) = timer.next_due_ms.filter(|at| *at <= now_ms) {
                if fired == MAX_CATCH_UP {
                    let skipped = (now_ms - at) / timer.period_ms + 1;
                    log::debug!("{:?} timer behind, skipping {} ticks", timer.kind, skipped);
                    timer.reschedule(
                        skipped.checked_mul(timer.period_ms).and_then(|d| at.checked_add(d)),
                    );
                    break;
                }
                due.push((at, timer.kind));
                timer.reschedule(at.checked_add(timer.period_ms));
                fired += 1;
            }
        }
        due.sort_by_key(|(at, kind)| (*at, *kind == TimerKind::Connectivity));
        due.into_iter().map(|(_, kind)| kind).collect()
    }

    /// Gate for an external timer callback.
    ///
    /// Stale or post-stop tokens are refused and counted.
    pub fn accept(&mut self, token: TimerToken) -> bool {
        if self.running && token.epoch == self.epoch {
            return true;
        }
        self.suppressed += 1;
        log::debug!(
            "suppressed {:?} callback from epoch {} (current {}, running {})",
            token.kind, token.epoch, self.epoch, self.running
        );
        false
    }

    /// Callbacks refused by [`accept`](Self::accept) so far.
    pub fn suppressed(&self) -> u64 {
        self.suppressed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(fired: &[TimerKind], kind: TimerKind) -> usize {
        fired.iter().filter(|k| **k == kind).count()
    }

    #[test]
    fn test_nothing_fires_before_start() {
        let mut sched = TickScheduler::new(3000, 2000);
        assert!(sched.poll(10_000).is_empty());
        assert!(!sched.is_running());
    }

    #[test]
    fn test_independent_periods() {
        let mut sched = TickScheduler::new(3000, 2000);
        sched.start(0);
        assert!(sched.poll(1999).is_empty());
        assert_eq!(sched.poll(2000), vec![TimerKind::Connectivity]);
        assert_eq!(sched.poll(3000), vec![TimerKind::Vitals]);
        let fired = sched.poll(12_000);
        assert_eq!(count(&fired, TimerKind::Vitals), 3);
        assert_eq!(count(&fired, TimerKind::Connectivity), 5);
    }

    #[test]
    fn test_firing_order_by_deadline() {
        let mut sched = TickScheduler::new(3000, 2000);
        sched.start(0);
        let fired = sched.poll(6000);
        // 2000 C, 3000 V, 4000 C, 6000 V, 6000 C
        assert_eq!(
            fired,
            vec![
                TimerKind::Connectivity,
                TimerKind::Vitals,
                TimerKind::Connectivity,
                TimerKind::Vitals,
                TimerKind::Connectivity,
            ]
        );
    }

    #[test]
    fn test_each_interval_fires_once() {
        let mut sched = TickScheduler::new(3000, 2000);
        sched.start(0);
        assert_eq!(sched.poll(3000).len(), 2);
        assert!(sched.poll(3000).is_empty());
        assert!(sched.poll(3500).is_empty());
    }

    #[test]
    fn test_stop_is_idempotent_and_final() {
        let mut sched = TickScheduler::new(3000, 2000);
        sched.start(0);
        assert!(sched.stop());
        assert!(!sched.stop());
        assert!(sched.poll(1_000_000).is_empty());
        assert!(sched.tokens().is_empty());
    }

    #[test]
    fn test_stale_tokens_suppressed() {
        let mut sched = TickScheduler::new(3000, 2000);
        let first = sched.start(0);
        assert_eq!(first.len(), 2);
        assert!(sched.accept(first[0]));

        sched.stop();
        assert!(!sched.accept(first[0]));

        let second = sched.start(10_000);
        assert_eq!(second[0].epoch, first[0].epoch + 1);
        assert!(!sched.accept(first[1]));
        assert!(sched.accept(second[1]));
        assert_eq!(sched.suppressed(), 2);
    }

    #[test]
    fn test_restart_realigns_deadlines() {
        let mut sched = TickScheduler::new(3000, 2000);
        sched.start(0);
        sched.stop();
        sched.start(10_000);
        assert!(sched.poll(11_999).is_empty());
        assert_eq!(sched.poll(12_000), vec![TimerKind::Connectivity]);
    }

    #[test]
    fn test_start_while_running_keeps_epoch() {
        let mut sched = TickScheduler::new(3000, 2000);
        let a = sched.start(0);
        let b = sched.start(500);
        assert_eq!(a, b);
        assert_eq!(sched.epoch(), 1);
        assert_eq!(sched.poll(2000), vec![TimerKind::Connectivity]);
    }

    #[test]
    fn test_catch_up_is_capped() {
        let mut sched = TickScheduler::new(3000, 2000);
        sched.start(0);
        let fired = sched.poll(3_600_000);
        assert_eq!(count(&fired, TimerKind::Vitals), MAX_CATCH_UP);
        assert_eq!(count(&fired, TimerKind::Connectivity), MAX_CATCH_UP);
        // Resynced: the next deadline lies after the late poll
        assert!(sched.poll(3_600_000).is_empty());
        assert_eq!(sched.poll(3_602_000), vec![TimerKind::Connectivity]);
    }

    #[test]
    fn test_clock_near_end_of_range() {
        let mut sched = TickScheduler::new(3000, 2000);
        sched.start(u64::MAX - 1000);
        assert!(sched.is_running());
        assert!(sched.poll(u64::MAX).is_empty());
        assert_eq!(sched.tokens().len(), 2);
    }

    #[test]
    fn test_timer_retires_at_end_of_range() {
        let mut sched = TickScheduler::new(100, 100);
        sched.start(u64::MAX - 250);
        let fired = sched.poll(u64::MAX);
        assert_eq!(count(&fired, TimerKind::Vitals), 2);
        assert_eq!(count(&fired, TimerKind::Connectivity), 2);
        assert!(sched.poll(u64::MAX).is_empty());
    }

    #[test]
    fn test_catch_up_resync_past_end_of_range() {
        let mut sched = TickScheduler::new(1, 1);
        sched.start(u64::MAX - 100);
        let fired = sched.poll(u64::MAX);
        assert_eq!(count(&fired, TimerKind::Vitals), MAX_CATCH_UP);
        assert!(sched.poll(u64::MAX).is_empty());
        assert!(sched.stop());
    }

    #[test]
    fn test_zero_period_raised() {
        let sched = TickScheduler::new(0, 0);
        assert_eq!(sched.period_ms(TimerKind::Vitals), 1);
        assert_eq!(sched.period_ms(TimerKind::Connectivity), 1);
    }
}
