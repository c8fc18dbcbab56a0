//! # Voxel Model Geometry
//!
//! Parses submitted block keys and derives the geometric facts the pricing
//! pipeline needs: block counts, the unit bounding box, the real-world
//! millimeter scale, and the print-readiness (connectivity) guard.
//!
//! ## Pipeline Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  draft.blocks ["0,0,0", "1,0,0", ...]                                   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  VoxelModel::from_keys() ── malformed key → ValidationError             │
//! │       │                                                                 │
//! │       ├── is_connected()  ── false → CoreError::ModelNotReady           │
//! │       │                                                                 │
//! │       ├── mm_per_unit(scale) ──► volume::estimate_volume_cm3            │
//! │       │                                                                 │
//! │       └── size_mm(mm_per_unit) ──► size_tier::resolve_size_tier         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Simplifications (intentional)
//! Support blocks are smaller sub-voxels in the geometry engine, but here
//! they are treated as full unit cubes for both the bounding box and the
//! volume estimate. The estimator over-approximates for safety margin.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::size_tier::SizeMm;
use crate::types::{ScaleMode, ScaleSetting};

// =============================================================================
// Block Key
// =============================================================================

/// A voxel position on the integer editor grid, parsed from an `"x,y,z"` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockKey {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockKey {
    /// Parses a `"x,y,z"` key.
    pub fn parse(key: &str) -> Result<Self, ValidationError> {
        let mut parts = key.trim().split(',');
        let mut next = |axis: &str| -> Result<i32, ValidationError> {
            parts
                .next()
                .map(str::trim)
                .and_then(|p| p.parse::<i32>().ok())
                .ok_or_else(|| ValidationError::InvalidFormat {
                    field: "blocks".to_string(),
                    reason: format!("block key '{}' has no integer {} coordinate", key, axis),
                })
        };

        let x = next("x")?;
        let y = next("y")?;
        let z = next("z")?;

        if parts.next().is_some() {
            return Err(ValidationError::InvalidFormat {
                field: "blocks".to_string(),
                reason: format!("block key '{}' has more than three coordinates", key),
            });
        }

        Ok(BlockKey { x, y, z })
    }

    /// The six face-adjacent neighbors.
    fn neighbors(&self) -> [BlockKey; 6] {
        let BlockKey { x, y, z } = *self;
        [
            BlockKey { x: x + 1, y, z },
            BlockKey { x: x - 1, y, z },
            BlockKey { x, y: y + 1, z },
            BlockKey { x, y: y - 1, z },
            BlockKey { x, y, z: z + 1 },
            BlockKey { x, y, z: z - 1 },
        ]
    }
}

// =============================================================================
// Voxel Model
// =============================================================================

/// The parsed geometry of a submitted draft.
#[derive(Debug, Clone)]
pub struct VoxelModel {
    blocks: HashSet<BlockKey>,
    support_blocks: HashSet<BlockKey>,
}

impl VoxelModel {
    /// Parses base and support block keys into a model.
    ///
    /// Duplicate keys collapse; a key present in both lists counts as a
    /// base block.
    pub fn from_keys(blocks: &[String], support_blocks: &[String]) -> Result<Self, ValidationError> {
        let base: HashSet<BlockKey> = blocks
            .iter()
            .map(|k| BlockKey::parse(k))
            .collect::<Result<_, _>>()?;

        let mut support: HashSet<BlockKey> = support_blocks
            .iter()
            .map(|k| BlockKey::parse(k))
            .collect::<Result<_, _>>()?;
        support.retain(|k| !base.contains(k));

        Ok(VoxelModel {
            blocks: base,
            support_blocks: support,
        })
    }

    /// Number of base blocks.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of support blocks.
    #[inline]
    pub fn support_block_count(&self) -> usize {
        self.support_blocks.len()
    }

    /// Iterator over base and support positions together.
    fn all_blocks(&self) -> impl Iterator<Item = &BlockKey> {
        self.blocks.iter().chain(self.support_blocks.iter())
    }

    /// The unit bounding box (dx, dy, dz) over base and support blocks,
    /// or `None` for an empty model.
    pub fn bounding_box_units(&self) -> Option<(i64, i64, i64)> {
        let mut iter = self.all_blocks();
        let first = *iter.next()?;
        let (mut min, mut max) = (first, first);

        for b in iter {
            min.x = min.x.min(b.x);
            min.y = min.y.min(b.y);
            min.z = min.z.min(b.z);
            max.x = max.x.max(b.x);
            max.y = max.y.max(b.y);
            max.z = max.z.max(b.z);
        }

        Some((
            (max.x - min.x) as i64 + 1,
            (max.y - min.y) as i64 + 1,
            (max.z - min.z) as i64 + 1,
        ))
    }

    /// Whether the model (base + support) forms a single 6-connected
    /// component.
    ///
    /// A disconnected model would fall apart during printing; submissions
    /// failing this guard are rejected before any pricing runs. An empty
    /// model is not connected (the no-blocks case is rejected earlier with
    /// its own error).
    pub fn is_connected(&self) -> bool {
        let all: HashSet<BlockKey> = self.all_blocks().copied().collect();
        let Some(start) = all.iter().next().copied() else {
            return false;
        };

        // Iterative flood fill; recursion depth would scale with model size
        let mut visited: HashSet<BlockKey> = HashSet::with_capacity(all.len());
        let mut stack = vec![start];
        visited.insert(start);

        while let Some(current) = stack.pop() {
            for n in current.neighbors() {
                if all.contains(&n) && visited.insert(n) {
                    stack.push(n);
                }
            }
        }

        visited.len() == all.len()
    }

    /// Derives the real-world millimeter size of one grid unit from the
    /// draft's scale setting.
    ///
    /// ## Contract
    /// - `MaxSide`: the longest bounding-box side prints at `max_side_mm`,
    ///   so one unit is `max_side_mm / longest_side_units`
    /// - `BlockEdge`: one unit prints at `block_edge_mm` directly
    /// - Missing, non-finite, or non-positive inputs clamp to 0 (which in
    ///   turn produces a zero volume and the minimum fee downstream)
    pub fn mm_per_unit(&self, scale: &ScaleSetting) -> f64 {
        let mm = match scale.mode {
            ScaleMode::BlockEdge => scale.block_edge_mm.unwrap_or(0.0),
            ScaleMode::MaxSide => {
                let max_side_mm = scale.max_side_mm.unwrap_or(0.0);
                match self.bounding_box_units() {
                    Some((dx, dy, dz)) => {
                        let longest = dx.max(dy).max(dz) as f64;
                        max_side_mm / longest
                    }
                    None => 0.0,
                }
            }
        };

        if mm.is_finite() && mm > 0.0 {
            mm
        } else {
            0.0
        }
    }

    /// The real-world bounding-box size in millimeters.
    pub fn size_mm(&self, mm_per_unit: f64) -> SizeMm {
        let mm = if mm_per_unit.is_finite() && mm_per_unit > 0.0 {
            mm_per_unit
        } else {
            0.0
        };
        match self.bounding_box_units() {
            Some((dx, dy, dz)) => SizeMm {
                x: dx as f64 * mm,
                y: dy as f64 * mm,
                z: dz as f64 * mm,
            },
            None => SizeMm {
                x: 0.0,
                y: 0.0,
                z: 0.0,
            },
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
