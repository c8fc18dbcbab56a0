//! # Size Tier Resolution
//!
//! Converts a real-world bounding-box size into the discrete shipping size
//! tier the carrier bills by.
//!
//! ## The Ladder
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  padded = each dimension + padding (default 20mm)                       │
//! │  sum_cm = (padded.x + padded.y + padded.z) / 10                         │
//! │                                                                         │
//! │  sum_cm ≤  60  →  tier "60"                                             │
//! │  sum_cm ≤  80  →  tier "80"                                             │
//! │  sum_cm ≤ 100  →  tier "100"                                            │
//! │  otherwise     →  tier "120", capped = true                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Oversized items are forced into the largest tier rather than rejected.
//! That under-charges truly oversized shipments; it is a known policy
//! limitation carried over deliberately, and the `capped` flag is persisted
//! with the order so such shipments stay auditable.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

// =============================================================================
// Size Tier
// =============================================================================

/// A carrier size-tier bucket, named by its girth bound in cm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum SizeTier {
    #[serde(rename = "60")]
    S60,
    #[serde(rename = "80")]
    S80,
    #[serde(rename = "100")]
    S100,
    #[serde(rename = "120")]
    S120,
}

impl SizeTier {
    /// All tiers, smallest first. The rate matrix covers exactly these.
    pub const ALL: [SizeTier; 4] = [SizeTier::S60, SizeTier::S80, SizeTier::S100, SizeTier::S120];

    /// The wire/storage name ("60", "80", "100", "120").
    pub const fn as_str(&self) -> &'static str {
        match self {
            SizeTier::S60 => "60",
            SizeTier::S80 => "80",
            SizeTier::S100 => "100",
            SizeTier::S120 => "120",
        }
    }
}

impl fmt::Display for SizeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeTier {
    type Err = ();

    /// Parses a storage/wire tier name. Whitespace-insensitive; this is the
    /// single normalization point for tier strings coming from config rows.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "60" => Ok(SizeTier::S60),
            "80" => Ok(SizeTier::S80),
            "100" => Ok(SizeTier::S100),
            "120" => Ok(SizeTier::S120),
            _ => Err(()),
        }
    }
}

// =============================================================================
// Size in Millimeters
// =============================================================================

/// A 3D size in real-world millimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SizeMm {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

// =============================================================================
// Resolution
// =============================================================================

/// The outcome of size-tier resolution, persisted into the order breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SizeTierResult {
    pub size_tier: SizeTier,
    /// Sum of the three padded dimensions, in cm. The carrier's girth figure.
    pub sum_cm: f64,
    pub padded_mm: SizeMm,
    /// True when the item exceeded the largest tier and was forced into it.
    pub capped: bool,
}

/// Resolves the shipping size tier for a bounding box.
///
/// ## Contract
/// - Each dimension is padded by `padding_mm` (see
///   [`crate::DEFAULT_PADDING_MM`]) before summing
/// - Negative or non-finite dimensions and padding clamp to 0
/// - The 60/80/100 bounds are inclusive: a sum of exactly 60.0cm is tier "60"
///
/// ## Example
/// ```rust
/// use qbu_core::size_tier::{resolve_size_tier, SizeMm, SizeTier};
/// use qbu_core::DEFAULT_PADDING_MM;
///
/// // 100mm cube, padded to 120mm per side → 36cm girth → tier "60"
/// let result = resolve_size_tier(
///     SizeMm { x: 100.0, y: 100.0, z: 100.0 },
///     DEFAULT_PADDING_MM,
/// );
/// assert_eq!(result.size_tier, SizeTier::S60);
/// assert!(!result.capped);
/// ```
pub fn resolve_size_tier(size_mm: SizeMm, padding_mm: f64) -> SizeTierResult {
    let clamp = |v: f64| if v.is_finite() && v > 0.0 { v } else { 0.0 };
    let padding = clamp(padding_mm);

    let padded_mm = SizeMm {
        x: clamp(size_mm.x) + padding,
        y: clamp(size_mm.y) + padding,
        z: clamp(size_mm.z) + padding,
    };

    let sum_cm = (padded_mm.x + padded_mm.y + padded_mm.z) / 10.0;

    let (size_tier, capped) = if sum_cm <= 60.0 {
        (SizeTier::S60, false)
    } else if sum_cm <= 80.0 {
        (SizeTier::S80, false)
    } else if sum_cm <= 100.0 {
        (SizeTier::S100, false)
    } else {
        // Anything past the 100cm bound bills at the largest tier,
        // flagged for audit
        (SizeTier::S120, true)
    };

    SizeTierResult {
        size_tier,
        sum_cm,
        padded_mm,
        capped,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a size whose padded girth sums to exactly `sum_cm`
    /// with zero padding.
    fn size_summing_cm(sum_cm: f64) -> SizeMm {
        let each = sum_cm * 10.0 / 3.0;
        SizeMm {
            x: each,
            y: each,
            z: each,
        }
    }

    #[test]
    fn test_tier_boundaries_inclusive() {
        let result = resolve_size_tier(size_summing_cm(60.0), 0.0);
        assert_eq!(result.size_tier, SizeTier::S60);
        assert!(!result.capped);

        let result = resolve_size_tier(size_summing_cm(60.01), 0.0);
        assert_eq!(result.size_tier, SizeTier::S80);

        let result = resolve_size_tier(size_summing_cm(80.0), 0.0);
        assert_eq!(result.size_tier, SizeTier::S80);

        let result = resolve_size_tier(size_summing_cm(100.0), 0.0);
        assert_eq!(result.size_tier, SizeTier::S100);

        let result = resolve_size_tier(size_summing_cm(101.0), 0.0);
        assert_eq!(result.size_tier, SizeTier::S120);
    }

    #[test]
    fn test_oversized_caps_into_largest_tier() {
        let result = resolve_size_tier(size_summing_cm(500.0), 0.0);
        assert_eq!(result.size_tier, SizeTier::S120);
        assert!(result.capped);
        assert!((result.sum_cm - 500.0).abs() < 1e-6);
    }

    #[test]
    fn test_everything_past_100_bills_as_capped_120() {
        let result = resolve_size_tier(size_summing_cm(110.0), 0.0);
        assert_eq!(result.size_tier, SizeTier::S120);
        assert!(result.capped);
    }

    #[test]
    fn test_padding_applied_per_dimension() {
        // 100mm cube + 20mm padding = 120mm per side → 36cm
        let result = resolve_size_tier(
            SizeMm {
                x: 100.0,
                y: 100.0,
                z: 100.0,
            },
            20.0,
        );
        assert!((result.sum_cm - 36.0).abs() < 1e-9);
        assert!((result.padded_mm.x - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamps_bad_dimensions() {
        let result = resolve_size_tier(
            SizeMm {
                x: f64::NAN,
                y: -50.0,
                z: 100.0,
            },
            20.0,
        );
        // NaN and negative clamp to 0 before padding
        assert!((result.sum_cm - 16.0).abs() < 1e-9);
        assert_eq!(result.size_tier, SizeTier::S60);
    }

    #[test]
    fn test_tier_string_roundtrip() {
        for tier in SizeTier::ALL {
            assert_eq!(tier.as_str().parse::<SizeTier>().unwrap(), tier);
        }
        assert!(" 80 ".parse::<SizeTier>().is_ok());
        assert!("90".parse::<SizeTier>().is_err());
    }
}
