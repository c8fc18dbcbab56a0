//! # Volume Estimation
//!
//! Converts a block count and a millimeters-per-unit scale into an estimated
//! solid print volume in cm³.
//!
//! Support blocks are smaller sub-voxels in the geometry engine, but the
//! estimator charges them at full unit volume on purpose: pricing
//! over-approximates for safety margin rather than under-charging.

/// Estimates the solid print volume in cm³.
///
/// ## Contract
/// - Each voxel is a cube of side `mm_per_unit` millimeters
/// - `volume = (base + support) × mm_per_unit³ / 1000` (mm³ → cm³)
/// - No error conditions: negative counts and non-finite or negative scale
///   clamp to 0, so the result is always a non-negative finite float
///
/// ## Example
/// ```rust
/// use qbu_core::volume::estimate_volume_cm3;
///
/// // 100 blocks at 10mm per edge = 100 × 1000mm³ = 100 cm³
/// let volume = estimate_volume_cm3(100, 0, 10.0);
/// assert!((volume - 100.0).abs() < 1e-9);
/// ```
pub fn estimate_volume_cm3(base_block_count: i64, support_block_count: i64, mm_per_unit: f64) -> f64 {
    let base = base_block_count.max(0) as f64;
    let support = support_block_count.max(0) as f64;
    let mm = if mm_per_unit.is_finite() && mm_per_unit > 0.0 {
        mm_per_unit
    } else {
        0.0
    };

    (base + support) * mm.powi(3) / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_volume() {
        // one 10mm cube = 1 cm³
        assert!((estimate_volume_cm3(1, 0, 10.0) - 1.0).abs() < 1e-9);
        // 100 blocks at 10mm = 100 cm³
        assert!((estimate_volume_cm3(100, 0, 10.0) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_support_blocks_use_full_unit_volume() {
        let with_support = estimate_volume_cm3(50, 50, 10.0);
        let all_base = estimate_volume_cm3(100, 0, 10.0);
        assert!((with_support - all_base).abs() < 1e-9);
    }

    #[test]
    fn test_clamps_negative_counts() {
        assert_eq!(estimate_volume_cm3(-5, 0, 10.0), 0.0);
        assert!((estimate_volume_cm3(-5, 3, 10.0) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamps_bad_scale() {
        assert_eq!(estimate_volume_cm3(100, 0, f64::NAN), 0.0);
        assert_eq!(estimate_volume_cm3(100, 0, f64::INFINITY), 0.0);
        assert_eq!(estimate_volume_cm3(100, 0, -10.0), 0.0);
        assert_eq!(estimate_volume_cm3(100, 0, 0.0), 0.0);
    }

    #[test]
    fn test_fractional_scale() {
        // 8 blocks at 5mm = 8 × 125mm³ = 1 cm³
        assert!((estimate_volume_cm3(8, 0, 5.0) - 1.0).abs() < 1e-9);
    }
}
