// Copyright 2026 Hypermesh Foundation. All rights reserved.
// VitalSense Telemetry Engine

pub mod types;
pub mod random;
pub mod walk;
pub mod config;
pub mod vitals;
pub mod connectivity;
pub mod risk;
pub mod scheduler;
pub mod simulation;

pub use types::*;
pub use config::{ConfigError, ConnectionSeed, EngineConfig, MetricSpec};
pub use risk::{HealthAssessment, InsightScore, ScorePolarity};
pub use scheduler::{TimerKind, TimerToken};
pub use simulation::{PollReport, TelemetrySimulation};

use wasm_bindgen::prelude::*;

// ─── Console Logging ─────────────────────────────────────────────────────────

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = log)]
    fn console_log(s: &str);
}

#[cfg(target_arch = "wasm32")]
struct ConsoleLogger;

#[cfg(target_arch = "wasm32")]
impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            console_log(&format!("[{}] {}: {}", record.level(), record.target(), record.args()));
        }
    }

    fn flush(&self) {}
}

#[cfg(target_arch = "wasm32")]
static CONSOLE_LOGGER: ConsoleLogger = ConsoleLogger;

#[cfg(target_arch = "wasm32")]
fn install_console_logger() {
    // A second session finds the logger already installed
    if log::set_logger(&CONSOLE_LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

/// Change engine log verbosity (`"off"`, `"error"` ... `"trace"`).
#[wasm_bindgen(js_name = setLogLevel)]
pub fn set_log_level(level: &str) -> bool {
    match level.parse::<log::LevelFilter>() {
        Ok(filter) => {
            log::set_max_level(filter);
            true
        }
        Err(_) => false,
    }
}

/// Plain JS objects (not `Map`) so snapshots read like JSON on the front end.
fn to_js<T: serde::Serialize + ?Sized>(value: &T) -> JsValue {
    match value.serialize(&serde_wasm_bindgen::Serializer::json_compatible()) {
        Ok(js) => js,
        Err(e) => {
            log::warn!("failed to serialize {}: {}", std::any::type_name::<T>(), e);
            JsValue::NULL
        }
    }
}

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl TelemetrySimulation {
    /// `config` may be `undefined` for the canonical session.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<TelemetrySimulation, JsError> {
        #[cfg(target_arch = "wasm32")]
        {
            std::panic::set_hook(Box::new(console_error_panic_hook::hook));
            install_console_logger();
        }

        let config: EngineConfig = if config.is_undefined() || config.is_null() {
            EngineConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(|e| JsError::new(&e.to_string()))?
        };
        Self::from_config(config).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Install both timers. Returns the timer tokens for host callbacks.
    pub fn start(&mut self, now_ms: f64) -> JsValue {
        let tokens = self.start_core(now_ms.max(0.0) as u64);
        to_js(&tokens)
    }

    /// Cancel both timers. Safe to call repeatedly.
    pub fn stop(&mut self) -> bool {
        self.scheduler.stop()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn poll(&mut self, now_ms: f64) -> JsValue {
        let report = self.poll_core(now_ms.max(0.0) as u64);
        to_js(&report)
    }

    /// Entry point for a host `setInterval` callback carrying its token.
    pub fn fire(&mut self, token: JsValue) -> bool {
        match serde_wasm_bindgen::from_value::<TimerToken>(token) {
            Ok(token) => self.fire_core(token),
            Err(e) => {
                log::warn!("ignoring malformed timer token: {}", e);
                false
            }
        }
    }

    #[wasm_bindgen(js_name = getVitalsSnapshot)]
    pub fn get_vitals_snapshot(&self) -> JsValue {
        to_js(self.vitals_snapshot())
    }

    #[wasm_bindgen(js_name = getConnections)]
    pub fn get_connections(&self) -> JsValue {
        to_js(&self.connections())
    }

    #[wasm_bindgen(js_name = getSummary)]
    pub fn get_summary(&self) -> JsValue {
        to_js(&self.connectivity_summary())
    }

    #[wasm_bindgen(js_name = getAssessment)]
    pub fn get_assessment(&self) -> JsValue {
        to_js(&self.assessment())
    }

    /// Reset to the configured baselines; the session is left stopped.
    pub fn reset(&mut self) -> Result<(), JsError> {
        self.rebuild().map_err(|e| JsError::new(&e.to_string()))
    }
}

// ─── Pure Risk Functions ─────────────────────────────────────────────────────

#[wasm_bindgen(js_name = classifyMetric)]
pub fn classify_metric_js(score: f64, higher_is_better: Option<bool>) -> JsValue {
    let polarity = if higher_is_better.unwrap_or(false) {
        ScorePolarity::HigherIsBetter
    } else {
        ScorePolarity::LowerIsBetter
    };
    to_js(&risk::classify_metric_with(score, polarity))
}

#[wasm_bindgen(js_name = overallScore)]
pub fn overall_score_js(scores: Vec<f64>) -> Option<f64> {
    risk::overall_score(&scores)
}

#[wasm_bindgen(js_name = classifyOverall)]
pub fn classify_overall_js(score: f64) -> JsValue {
    to_js(&risk::classify_overall(score))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    struct Unserializable;

    impl serde::Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refused"))
        }
    }

    #[wasm_bindgen_test]
    fn test_serialization_failure_yields_null() {
        assert!(to_js(&Unserializable).is_null());
        assert!(to_js(&HealthStatusBand::Good).is_string());
    }
}
