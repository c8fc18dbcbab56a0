//! # Price Quoter
//!
//! Applies the 4-parameter linear pricing model to an estimated volume.
//!
//! ## The Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  raw      = base_fee + round(volume_cm3 × per_cm3)                      │
//! │  floored  = max(raw, min_fee)                                           │
//! │  subtotal = round_to_step(floored, rounding_step)   (nearest, ties up)  │
//! │                                                                         │
//! │  Example (fallback params, 10 cm³):                                     │
//! │    raw      = 800 + 600 = 1400                                          │
//! │    floored  = max(1400, 1200) = 1400                                    │
//! │    subtotal = 1400  (already a multiple of 10)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - `subtotal_yen` is always a multiple of `rounding_step_yen`
//! - The pre-rounding amount never falls below `min_fee_yen`; after
//!   nearest-step rounding the subtotal may sit just above or below a raw
//!   multiple, but never below the rounded minimum
//! - No error conditions: all inputs clamp into valid ranges before use

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Yen;

// =============================================================================
// Pricing Parameters
// =============================================================================

/// The 4-parameter linear pricing model.
///
/// Sourced from the active [`crate::types::PricingConfig`] row, or from
/// [`PricingParams::fallback`] when no active configuration is available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricingParams {
    pub base_fee_yen: i64,
    pub per_cm3_yen: i64,
    pub min_fee_yen: i64,
    pub rounding_step_yen: i64,
}

impl PricingParams {
    /// The hardcoded fallback used whenever the active pricing config is
    /// unavailable (missing row, query failure). Order submission must stay
    /// possible even with the config store down.
    pub const fn fallback() -> Self {
        PricingParams {
            base_fee_yen: 800,
            per_cm3_yen: 60,
            min_fee_yen: 1200,
            rounding_step_yen: 10,
        }
    }

    /// Clamps every parameter into its valid range
    /// (fees non-negative, step at least 1).
    fn sanitized(self) -> Self {
        PricingParams {
            base_fee_yen: self.base_fee_yen.max(0),
            per_cm3_yen: self.per_cm3_yen.max(0),
            min_fee_yen: self.min_fee_yen.max(0),
            rounding_step_yen: self.rounding_step_yen.max(1),
        }
    }
}

impl Default for PricingParams {
    fn default() -> Self {
        PricingParams::fallback()
    }
}

// =============================================================================
// Quote
// =============================================================================

/// The priced item subtotal with its breakdown.
///
/// Transient: derived on every request, never stored on its own. The
/// breakdown fields feed the persisted order record via the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub volume_cm3: f64,
    pub base_fee_yen: i64,
    pub volume_fee_yen: i64,
    pub min_fee_yen: i64,
    pub rounding_step_yen: i64,
    pub subtotal_yen: i64,
}

/// Computes the item subtotal for an estimated volume.
///
/// ## Example
/// ```rust
/// use qbu_core::pricing::{quote_volume, PricingParams};
///
/// let quote = quote_volume(10.0, &PricingParams::fallback());
/// assert_eq!(quote.base_fee_yen, 800);
/// assert_eq!(quote.volume_fee_yen, 600);
/// assert_eq!(quote.subtotal_yen, 1400);
/// ```
pub fn quote_volume(volume_cm3: f64, params: &PricingParams) -> Quote {
    let params = params.sanitized();
    let volume = if volume_cm3.is_finite() && volume_cm3 > 0.0 {
        volume_cm3
    } else {
        0.0
    };

    // The single float→yen conversion point of the pipeline
    let volume_fee_yen = (volume * params.per_cm3_yen as f64).round() as i64;

    let raw = Yen::from_yen(params.base_fee_yen + volume_fee_yen);
    let floored = if raw.yen() < params.min_fee_yen {
        Yen::from_yen(params.min_fee_yen)
    } else {
        raw
    };
    let subtotal = floored.round_to_step(params.rounding_step_yen);

    Quote {
        volume_cm3: volume,
        base_fee_yen: params.base_fee_yen,
        volume_fee_yen,
        min_fee_yen: params.min_fee_yen,
        rounding_step_yen: params.rounding_step_yen,
        subtotal_yen: subtotal.yen(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_quote() {
        // volume=10cm³, defaults → base 800 + volume 600 = 1400
        let quote = quote_volume(10.0, &PricingParams::fallback());
        assert_eq!(quote.base_fee_yen, 800);
        assert_eq!(quote.volume_fee_yen, 600);
        assert_eq!(quote.subtotal_yen, 1400);
    }

    #[test]
    fn test_minimum_fee_floor() {
        // volume=0 → raw 800 < min 1200 → subtotal 1200
        let quote = quote_volume(0.0, &PricingParams::fallback());
        assert_eq!(quote.volume_fee_yen, 0);
        assert_eq!(quote.subtotal_yen, 1200);
    }

    #[test]
    fn test_minimum_fee_floor_holds_for_any_params() {
        for min_fee in [0, 500, 1200, 9999] {
            for step in [1, 7, 10, 100] {
                let params = PricingParams {
                    base_fee_yen: 0,
                    per_cm3_yen: 60,
                    min_fee_yen: min_fee,
                    rounding_step_yen: step,
                };
                let quote = quote_volume(0.0, &params);
                let rounded_min = Yen::from_yen(min_fee).round_to_step(step).yen();
                assert_eq!(quote.subtotal_yen, rounded_min, "min={} step={}", min_fee, step);
            }
        }
    }

    #[test]
    fn test_subtotal_is_multiple_of_step() {
        for volume in [0.0, 0.3, 1.0, 9.99, 123.456] {
            let quote = quote_volume(volume, &PricingParams::fallback());
            assert_eq!(quote.subtotal_yen % 10, 0, "volume={}", volume);
        }
    }

    #[test]
    fn test_rounding_is_nearest_not_floor() {
        // 0.25cm³ × 60 = 15 → raw 815 < min 1200 → 1200;
        // push past the minimum instead: 7cm³ × 60 = 420 → 1220 (multiple).
        // 7.25cm³ × 60 = 435 → raw 1235 → rounds UP to 1240
        let quote = quote_volume(7.25, &PricingParams::fallback());
        assert_eq!(quote.volume_fee_yen, 435);
        assert_eq!(quote.subtotal_yen, 1240);

        // 7.2cm³ × 60 = 432 → raw 1232 → rounds DOWN to 1230
        let quote = quote_volume(7.2, &PricingParams::fallback());
        assert_eq!(quote.subtotal_yen, 1230);
    }

    #[test]
    fn test_clamps_bad_volume() {
        let quote = quote_volume(f64::NAN, &PricingParams::fallback());
        assert_eq!(quote.volume_cm3, 0.0);
        assert_eq!(quote.subtotal_yen, 1200);

        let quote = quote_volume(-10.0, &PricingParams::fallback());
        assert_eq!(quote.subtotal_yen, 1200);
    }

    #[test]
    fn test_clamps_bad_params() {
        let params = PricingParams {
            base_fee_yen: -100,
            per_cm3_yen: -60,
            min_fee_yen: -1,
            rounding_step_yen: 0,
        };
        let quote = quote_volume(10.0, &params);
        assert_eq!(quote.subtotal_yen, 0);
    }
}
