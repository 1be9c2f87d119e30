// Copyright 2026 Hypermesh Foundation. All rights reserved.
// VitalSense Telemetry Engine - Bounded Random Walk

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};

use crate::random::RandomSource;

/// One walk step using a fresh draw from `rng`.
///
/// Symmetric noise in `[-variance/2, +variance/2)`, clamped to `[min, max]`.
/// A NaN anywhere in the inputs comes back out as NaN.
pub fn step<R: RandomSource + ?Sized>(
    previous: f64,
    variance: f64,
    min: f64,
    max: f64,
    rng: &mut R,
) -> f64 {
    step_with_draw(previous, variance, min, max, rng.next_unit())
}

/// Pure form of [`step`] for a known draw `u`.
pub fn step_with_draw(previous: f64, variance: f64, min: f64, max: f64, u: f64) -> f64 {
    let candidate = previous + (u - 0.5) * variance;
    // f64::clamp panics on NaN bounds; max/min propagate the NaN candidate instead
    if candidate.is_nan() || min.is_nan() || max.is_nan() {
        return f64::NAN;
    }
    candidate.max(min).min(max)
}

/// Round half away from zero to `decimals` places.
///
/// Goes through `Decimal` so `98.6` stays `98.6`. Non-finite values are
/// returned unchanged.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    Decimal::from_f64(value)
        .map(|d| d.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::{FixedRandom, SeededRandom};

    #[test]
    fn test_midpoint_draw_is_identity() {
        let mut rng = FixedRandom(0.5);
        assert_eq!(step(70.0, 4.0, 60.0, 100.0, &mut rng), 70.0);
    }

    #[test]
    fn test_extreme_draws_span_half_variance() {
        assert_eq!(step_with_draw(70.0, 4.0, 60.0, 100.0, 0.0), 68.0);
        let high = step_with_draw(70.0, 4.0, 60.0, 100.0, 0.999_999);
        assert!(high < 72.0 && high > 71.99);
    }

    #[test]
    fn test_clamps_to_bounds() {
        assert_eq!(step_with_draw(99.5, 4.0, 60.0, 100.0, 0.99), 100.0);
        assert_eq!(step_with_draw(60.5, 4.0, 60.0, 100.0, 0.0), 60.0);
    }

    #[test]
    fn test_nan_propagates() {
        assert!(step_with_draw(f64::NAN, 4.0, 60.0, 100.0, 0.5).is_nan());
        assert!(step_with_draw(70.0, 4.0, 60.0, 100.0, f64::NAN).is_nan());
        assert!(step_with_draw(70.0, f64::NAN, 60.0, 100.0, 0.5).is_nan());
    }

    #[test]
    fn test_random_steps_stay_bounded() {
        let mut rng = SeededRandom::new(99);
        let mut value = 98.0;
        for _ in 0..5_000 {
            value = step(value, 2.0, 94.0, 100.0, &mut rng);
            assert!((94.0..=100.0).contains(&value));
        }
    }

    #[test]
    fn test_round_to_one_decimal() {
        assert_eq!(round_to(98.64, 1), 98.6);
        assert_eq!(round_to(98.65, 1), 98.7);
        assert_eq!(round_to(98.6 + 0.1, 1), 98.7);
    }

    #[test]
    fn test_round_to_integer_half_away_from_zero() {
        assert_eq!(round_to(72.5, 0), 73.0);
        assert_eq!(round_to(71.49, 0), 71.0);
    }

    #[test]
    fn test_round_to_keeps_non_finite() {
        assert!(round_to(f64::NAN, 0).is_nan());
        assert_eq!(round_to(f64::INFINITY, 1), f64::INFINITY);
    }
}
