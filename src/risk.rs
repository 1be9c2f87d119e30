// Copyright 2026 Hypermesh Foundation. All rights reserved.
// VitalSense Telemetry Engine - Risk Aggregation

//! Risk classification and health scoring.
//!
//! Pure functions over scores in the 0-100 range. Risk scores are
//! lower-is-better; health scores (stability, overall) are higher-is-better.

use serde::{Deserialize, Serialize};

use crate::types::{HealthStatusBand, RiskLevel, Trend, VitalKey, VitalMetric};
use crate::vitals::VitalSignSimulator;

const RISK_LOW_BELOW: f64 = 30.0;
const RISK_MEDIUM_BELOW: f64 = 60.0;

const BAND_EXCELLENT_ABOVE: f64 = 70.0;
const BAND_GOOD_ABOVE: f64 = 50.0;
const BAND_FAIR_ABOVE: f64 = 30.0;

const SCORE_MAX: f64 = 100.0;

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Whether a larger score means more or less risk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScorePolarity {
    #[default]
    LowerIsBetter,
    HigherIsBetter,
}

/// Risk level of a lower-is-better score: `< 30` Low, `< 60` Medium, else High.
///
/// NaN falls through to `High`.
pub fn classify_metric(score: f64) -> RiskLevel {
    if score < RISK_LOW_BELOW {
        RiskLevel::Low
    } else if score < RISK_MEDIUM_BELOW {
        RiskLevel::Medium
    } else {
        RiskLevel::High
    }
}

/// [`classify_metric`] after mirroring higher-is-better scores onto the risk scale.
pub fn classify_metric_with(score: f64, polarity: ScorePolarity) -> RiskLevel {
    match polarity {
        ScorePolarity::LowerIsBetter => classify_metric(score),
        ScorePolarity::HigherIsBetter => classify_metric(SCORE_MAX - score),
    }
}

/// Arithmetic mean rounded half away from zero.
///
/// Out-of-range inputs are averaged as given, not clamped. `None` for an empty
/// slice, a non-finite score, or a sum that overflows.
pub fn overall_score(scores: &[f64]) -> Option<f64> {
    if scores.is_empty() || scores.iter().any(|s| !s.is_finite()) {
        return None;
    }
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.is_finite().then(|| mean.round())
}

/// Status band of an overall health score.
pub fn classify_overall(score: f64) -> HealthStatusBand {
    if score > BAND_EXCELLENT_ABOVE {
        HealthStatusBand::Excellent
    } else if score > BAND_GOOD_ABOVE {
        HealthStatusBand::Good
    } else if score > BAND_FAIR_ABOVE {
        HealthStatusBand::Fair
    } else {
        HealthStatusBand::NeedsAttention
    }
}

// ---------------------------------------------------------------------------
// Stability scoring
// ---------------------------------------------------------------------------

/// How close a vital sits to its baseline, 100 = on baseline, 0 = at the far bound.
pub fn stability_score(metric: &VitalMetric) -> f64 {
    let max_excursion = (metric.baseline - metric.min).max(metric.max - metric.baseline);
    if max_excursion <= 0.0 {
        return SCORE_MAX;
    }
    let deviation = (metric.value - metric.baseline).abs() / max_excursion;
    (SCORE_MAX * (1.0 - deviation)).clamp(0.0, SCORE_MAX)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricScore {
    pub key: VitalKey,
    pub value: f64,
    pub score: f64,
}

/// Scored view of the latest committed vitals.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthAssessment {
    pub tick: u64,
    pub metric_scores: Vec<MetricScore>,
    pub overall: Option<f64>,
    pub band: Option<HealthStatusBand>,
}

impl HealthAssessment {
    pub fn label(&self) -> &'static str {
        self.band.map(|b| b.label()).unwrap_or("Unavailable")
    }
}

pub fn assess(vitals: &VitalSignSimulator) -> HealthAssessment {
    let metric_scores: Vec<MetricScore> = vitals
        .metrics()
        .iter()
        .map(|m| MetricScore { key: m.key, value: m.value, score: stability_score(m) })
        .collect();
    let scores: Vec<f64> = metric_scores.iter().map(|s| s.score).collect();
    let overall = overall_score(&scores);
    HealthAssessment {
        tick: vitals.snapshot().tick,
        metric_scores,
        overall,
        band: overall.map(classify_overall),
    }
}

// ---------------------------------------------------------------------------
// Insight scores
// ---------------------------------------------------------------------------

/// Externally supplied insight score with its display annotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsightScore {
    pub title: String,
    pub score: f64,
    #[serde(default)]
    pub polarity: ScorePolarity,
    #[serde(default)]
    pub trend: Trend,
}

impl InsightScore {
    pub fn new(title: &str, score: f64, polarity: ScorePolarity, trend: Trend) -> Self {
        Self { title: title.to_string(), score, polarity, trend }
    }

    pub fn risk(&self) -> RiskLevel {
        classify_metric_with(self.score, self.polarity)
    }
}
