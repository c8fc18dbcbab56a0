//! # Shipping Rate Lookup
//!
//! Looks up the per-order shipping cost from a (zone, size-tier) rate
//! matrix, with a hardcoded fallback matrix for when no usable
//! configuration exists.
//!
//! ## Lookup Chain
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  active matrix lookup ──miss──► fallback matrix lookup ──miss──► ¥0     │
//! │                                                                         │
//! │  "miss" covers: no active shipping config, config query failed,         │
//! │  or the (zone, tier) cell absent from the active matrix.                │
//! │  Order submission must never fail because rates are unconfigured.       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use crate::size_tier::SizeTier;
use crate::types::ShippingRate;
use crate::zone::Zone;

// =============================================================================
// Fallback Rates
// =============================================================================

/// The hardcoded fallback rate table: 9 zones × 4 tiers, whole yen.
///
/// Values increase with distance from the Kanto hub and with size. These
/// figures are load-bearing for dispute resolution - change them only
/// together with the fulfillment contract.
const FALLBACK_RATES: [(Zone, [i64; 4]); 9] = [
    (Zone::Kanto, [700, 900, 1100, 1300]),
    (Zone::Chubu, [750, 950, 1150, 1350]),
    (Zone::Kinki, [750, 950, 1150, 1350]),
    (Zone::Tohoku, [850, 1050, 1250, 1450]),
    (Zone::Chugoku, [950, 1150, 1350, 1550]),
    (Zone::Shikoku, [950, 1150, 1350, 1550]),
    (Zone::Kyushu, [1050, 1250, 1450, 1650]),
    (Zone::Hokkaido, [1200, 1400, 1600, 1800]),
    (Zone::Okinawa, [1400, 1600, 1800, 2000]),
];

// =============================================================================
// Rate Matrix
// =============================================================================

/// A (zone, size-tier) → yen rate matrix.
///
/// Built from the flat rate rows of a shipping config. The admin write path
/// always produces the full 36-cell grid, but lookups tolerate partial
/// matrices: a missing cell is `None`, never a panic.
#[derive(Debug, Clone, Default)]
pub struct RateMatrix {
    rates: HashMap<(Zone, SizeTier), i64>,
}

impl RateMatrix {
    /// Builds a matrix from flat rate rows.
    ///
    /// Duplicate (zone, tier) keys are last-write-wins; negative prices
    /// clamp to 0.
    pub fn from_rows(rows: &[ShippingRate]) -> Self {
        let mut rates = HashMap::with_capacity(rows.len());
        for row in rows {
            rates.insert((row.zone, row.size_tier), row.price_yen.max(0));
        }
        RateMatrix { rates }
    }

    /// The hardcoded fallback matrix (full 36-cell grid).
    pub fn fallback() -> Self {
        let mut rates = HashMap::with_capacity(36);
        for (zone, prices) in FALLBACK_RATES {
            for (tier, price) in SizeTier::ALL.into_iter().zip(prices) {
                rates.insert((zone, tier), price);
            }
        }
        RateMatrix { rates }
    }

    /// Looks up the rate for a (zone, tier) pair.
    pub fn lookup(&self, zone: Zone, tier: SizeTier) -> Option<i64> {
        self.rates.get(&(zone, tier)).copied()
    }

    /// Number of populated cells.
    pub fn len(&self) -> usize {
        self.rates.len()
    }

    /// Whether the matrix has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }
}

/// Resolves the shipping cost through the full fallback chain.
///
/// `active` is the matrix of the active shipping config, or `None` when no
/// active config exists or its query failed. An unresolved zone also walks
/// the chain to its end: the fallback matrix has no cell for it either, so
/// the cost defaults to 0.
///
/// ## Example
/// ```rust
/// use qbu_core::shipping::resolve_shipping_yen;
/// use qbu_core::size_tier::SizeTier;
/// use qbu_core::zone::Zone;
///
/// // no active config: okinawa/120 comes from the fallback table
/// let yen = resolve_shipping_yen(None, Some(Zone::Okinawa), SizeTier::S120);
/// assert_eq!(yen, 2000);
/// ```
pub fn resolve_shipping_yen(
    active: Option<&RateMatrix>,
    zone: Option<Zone>,
    tier: SizeTier,
) -> i64 {
    let Some(zone) = zone else {
        return 0;
    };

    active
        .and_then(|matrix| matrix.lookup(zone, tier))
        .or_else(|| RateMatrix::fallback().lookup(zone, tier))
        .unwrap_or(0)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(zone: Zone, size_tier: SizeTier, price_yen: i64) -> ShippingRate {
        ShippingRate {
            zone,
            size_tier,
            price_yen,
        }
    }

    #[test]
    fn test_fallback_matrix_is_complete() {
        let matrix = RateMatrix::fallback();
        assert_eq!(matrix.len(), 36);
        for zone in Zone::ALL {
            for tier in SizeTier::ALL {
                assert!(matrix.lookup(zone, tier).is_some(), "{}/{}", zone, tier);
            }
        }
    }

    #[test]
    fn test_fallback_values_bit_exact() {
        let matrix = RateMatrix::fallback();
        assert_eq!(matrix.lookup(Zone::Kanto, SizeTier::S60), Some(700));
        assert_eq!(matrix.lookup(Zone::Kanto, SizeTier::S120), Some(1300));
        assert_eq!(matrix.lookup(Zone::Hokkaido, SizeTier::S60), Some(1200));
        assert_eq!(matrix.lookup(Zone::Okinawa, SizeTier::S120), Some(2000));
        assert_eq!(matrix.lookup(Zone::Kyushu, SizeTier::S80), Some(1250));
    }

    #[test]
    fn test_duplicate_rows_last_write_wins() {
        let matrix = RateMatrix::from_rows(&[
            rate(Zone::Kanto, SizeTier::S60, 700),
            rate(Zone::Kanto, SizeTier::S60, 750),
        ]);
        assert_eq!(matrix.lookup(Zone::Kanto, SizeTier::S60), Some(750));
        assert_eq!(matrix.len(), 1);
    }

    #[test]
    fn test_missing_cell_is_none() {
        let matrix = RateMatrix::from_rows(&[rate(Zone::Kanto, SizeTier::S60, 700)]);
        assert_eq!(matrix.lookup(Zone::Okinawa, SizeTier::S120), None);
    }

    #[test]
    fn test_negative_price_clamps() {
        let matrix = RateMatrix::from_rows(&[rate(Zone::Kanto, SizeTier::S60, -100)]);
        assert_eq!(matrix.lookup(Zone::Kanto, SizeTier::S60), Some(0));
    }

    #[test]
    fn test_resolve_prefers_active_matrix() {
        let active = RateMatrix::from_rows(&[rate(Zone::Kanto, SizeTier::S60, 640)]);
        let yen = resolve_shipping_yen(Some(&active), Some(Zone::Kanto), SizeTier::S60);
        assert_eq!(yen, 640);
    }

    #[test]
    fn test_resolve_falls_back_on_missing_cell() {
        // active matrix exists but lacks the cell: fallback value applies
        let active = RateMatrix::from_rows(&[rate(Zone::Kanto, SizeTier::S60, 640)]);
        let yen = resolve_shipping_yen(Some(&active), Some(Zone::Okinawa), SizeTier::S120);
        assert_eq!(yen, 2000);
    }

    #[test]
    fn test_resolve_falls_back_without_config() {
        let yen = resolve_shipping_yen(None, Some(Zone::Okinawa), SizeTier::S120);
        assert_eq!(yen, 2000);
    }

    #[test]
    fn test_resolve_unknown_zone_defaults_to_zero() {
        let yen = resolve_shipping_yen(None, None, SizeTier::S60);
        assert_eq!(yen, 0);
    }
}
