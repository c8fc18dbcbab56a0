//! # Money Module
//!
//! Provides the `Yen` type for handling monetary values safely.
//!
//! ## Why Integer Yen?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Japanese yen has no minor unit, which makes the fix easy:              │
//! │    every customer-facing amount is a whole-yen i64                      │
//! │                                                                         │
//! │  Floats appear exactly once in the pipeline - the physical volume       │
//! │  estimate (cm³) - and are rounded to yen at a single, documented        │
//! │  point inside the quoter.                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use qbu_core::money::Yen;
//!
//! let subtotal = Yen::from_yen(1815);
//!
//! // Totals are snapped to the configured rounding step,
//! // nearest multiple, ties rounding up
//! assert_eq!(subtotal.round_to_step(10).yen(), 1820);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Yen Type
// =============================================================================

/// A monetary value in whole Japanese yen.
///
/// ## Design Decisions
/// - **i64 (signed)**: Intermediate discount math can dip below zero before
///   being clamped; the sign must be representable
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Yen(i64);

impl Yen {
    /// Creates a Yen value from a whole-yen amount.
    #[inline]
    pub const fn from_yen(yen: i64) -> Self {
        Yen(yen)
    }

    /// Returns the value as a whole-yen i64.
    #[inline]
    pub const fn yen(&self) -> i64 {
        self.0
    }

    /// Returns zero yen.
    #[inline]
    pub const fn zero() -> Self {
        Yen(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (pre-clamp discount math only).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps the value to zero or above.
    ///
    /// ## Example
    /// ```rust
    /// use qbu_core::money::Yen;
    ///
    /// let over_discounted = Yen::from_yen(1000) - Yen::from_yen(1500);
    /// assert_eq!(over_discounted.clamp_non_negative().yen(), 0);
    /// ```
    #[inline]
    pub const fn clamp_non_negative(self) -> Self {
        if self.0 < 0 {
            Yen(0)
        } else {
            self
        }
    }

    /// Snaps the value to the nearest multiple of `step`.
    ///
    /// ## Rounding Rule
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────┐
    /// │  ROUND TO NEAREST STEP (ties round up)                              │
    /// │                                                                     │
    /// │  step = 10:   1814 → 1810     1815 → 1820     1816 → 1820          │
    /// │                                                                     │
    /// │  This is NOT floor/ceil: customer totals may round down as well    │
    /// │  as up, and the discount recorded with an order is recomputed      │
    /// │  after this snap so the breakdown always reconciles exactly.       │
    /// └─────────────────────────────────────────────────────────────────────┘
    /// ```
    ///
    /// ## Contract
    /// - `step` below 1 is treated as 1 (no snapping)
    /// - Negative values are clamped to 0 before snapping; customer totals
    ///   are never negative by the time they are rounded
    /// - Idempotent: snapping a snapped value is a no-op
    ///
    /// ## Example
    /// ```rust
    /// use qbu_core::money::Yen;
    ///
    /// assert_eq!(Yen::from_yen(1815).round_to_step(10).yen(), 1820);
    /// assert_eq!(Yen::from_yen(1814).round_to_step(10).yen(), 1810);
    /// assert_eq!(Yen::from_yen(1400).round_to_step(10).yen(), 1400);
    /// ```
    pub const fn round_to_step(self, step: i64) -> Yen {
        let step = if step < 1 { 1 } else { step };
        let n = if self.0 < 0 { 0 } else { self.0 };
        Yen((n + step / 2) / step * step)
    }

    /// Returns `pct` percent of the value, floored to whole yen.
    ///
    /// ## Contract
    /// - `pct` is clamped into 0..=100
    /// - Exact integer math: `floor(n × pct / 100)`
    ///
    /// ## Example
    /// ```rust
    /// use qbu_core::money::Yen;
    ///
    /// // 20% of ¥1400 = ¥280
    /// assert_eq!(Yen::from_yen(1400).percent(20).yen(), 280);
    /// // 33% of ¥100 = ¥33 (floored)
    /// assert_eq!(Yen::from_yen(100).percent(33).yen(), 33);
    /// ```
    pub fn percent(self, pct: i64) -> Yen {
        let pct = pct.clamp(0, 100);
        // i128 keeps the intermediate product overflow-free
        Yen((self.0 as i128 * pct as i128 / 100) as i64)
    }

    /// Returns the smaller of two values.
    #[inline]
    pub fn min(self, other: Yen) -> Yen {
        if self.0 <= other.0 {
            self
        } else {
            other
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and the plain-text invoice. The storefront formats
/// amounts itself for localization.
impl fmt::Display for Yen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "¥{}", self.0)
    }
}

/// Default yen is zero.
impl Default for Yen {
    fn default() -> Self {
        Yen::zero()
    }
}

/// Addition of two Yen values.
impl Add for Yen {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Yen(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Yen {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Yen values.
impl Sub for Yen {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Yen(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Yen {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yen() {
        let money = Yen::from_yen(1400);
        assert_eq!(money.yen(), 1400);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Yen::from_yen(1400)), "¥1400");
        assert_eq!(format!("{}", Yen::from_yen(0)), "¥0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Yen::from_yen(1400);
        let b = Yen::from_yen(700);

        assert_eq!((a + b).yen(), 2100);
        assert_eq!((a - b).yen(), 700);
    }

    #[test]
    fn test_round_to_step_nearest() {
        assert_eq!(Yen::from_yen(1814).round_to_step(10).yen(), 1810);
        assert_eq!(Yen::from_yen(1816).round_to_step(10).yen(), 1820);
        // tie rounds up
        assert_eq!(Yen::from_yen(1815).round_to_step(10).yen(), 1820);
        // already a multiple: unchanged
        assert_eq!(Yen::from_yen(1400).round_to_step(10).yen(), 1400);
    }

    #[test]
    fn test_round_to_step_idempotent() {
        for x in [0, 1, 4, 5, 6, 123, 1815, 99_999] {
            for step in [1, 3, 7, 10, 50, 100] {
                let once = Yen::from_yen(x).round_to_step(step);
                let twice = once.round_to_step(step);
                assert_eq!(once, twice, "x={} step={}", x, step);
            }
        }
    }

    #[test]
    fn test_round_to_step_degenerate_step() {
        // step below 1 behaves like step 1 (identity for non-negative values)
        assert_eq!(Yen::from_yen(1234).round_to_step(0).yen(), 1234);
        assert_eq!(Yen::from_yen(1234).round_to_step(-5).yen(), 1234);
    }

    #[test]
    fn test_round_to_step_clamps_negative() {
        assert_eq!(Yen::from_yen(-40).round_to_step(10).yen(), 0);
    }

    #[test]
    fn test_percent_floors() {
        assert_eq!(Yen::from_yen(1400).percent(20).yen(), 280);
        assert_eq!(Yen::from_yen(100).percent(33).yen(), 33);
        assert_eq!(Yen::from_yen(999).percent(10).yen(), 99);
    }

    #[test]
    fn test_percent_clamps() {
        assert_eq!(Yen::from_yen(1000).percent(150).yen(), 1000);
        assert_eq!(Yen::from_yen(1000).percent(-10).yen(), 0);
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Yen::from_yen(-500).clamp_non_negative().yen(), 0);
        assert_eq!(Yen::from_yen(500).clamp_non_negative().yen(), 500);
    }
}
