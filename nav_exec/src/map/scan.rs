//! Obstacle scanning
//!
//! The scanner asks an external [`ObstacleDetector`] whether anything overlaps each cell. The scan
//! is full and unconditional, every cell is re-evaluated on every refresh so that moving obstacles
//! are always picked up.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::Grid;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Bit mask of obstacle layers. Bit `n` set means layer `n` is included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerMask(pub u32);

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Geometric overlap test against the obstacles of the world.
pub trait ObstacleDetector {
    /// Returns true if any obstacle on one of the given layers overlaps the sphere of `radius_m`
    /// centred on `position_m`.
    fn check_sphere(&self, position_m: &Vector3<f64>, radius_m: f64, layers: LayerMask) -> bool;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    /// A mask containing only the given layer.
    ///
    /// Layers above 31 cannot be represented and give an empty mask.
    pub fn layer(layer: u32) -> Self {
        LayerMask(1u32.checked_shl(layer).unwrap_or(0))
    }

    /// Returns true if the given layer is part of this mask.
    pub fn contains(&self, layer: u32) -> bool {
        self.intersects(LayerMask::layer(layer))
    }

    /// Returns true if the masks share at least one layer.
    pub fn intersects(&self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        LayerMask::ALL
    }
}

impl<T: ObstacleDetector + ?Sized> ObstacleDetector for &T {
    fn check_sphere(&self, position_m: &Vector3<f64>, radius_m: f64, layers: LayerMask) -> bool {
        (**self).check_sphere(position_m, radius_m, layers)
    }
}

impl Grid {
    /// Re-scan every cell for obstacles.
    ///
    /// Each cell is reset (flags cleared, scores set to infinity, predecessor unset) and then
    /// marked blocked if the detector reports an overlap. Returns the number of blocked cells.
    pub fn scan_obstacles<D: ObstacleDetector + ?Sized>(
        &mut self,
        detector: &D,
        radius_m: f64,
        layers: LayerMask,
    ) -> usize {
        let mut num_blocked = 0;

        for cell in self.cells_mut() {
            cell.reset();

            if detector.check_sphere(&cell.position_m, radius_m, layers) {
                cell.flags.blocked = true;
                num_blocked += 1;
            }
        }

        trace!("Obstacle scan found {} blocked cells", num_blocked);

        num_blocked
    }
}

// ------------------------------------------------------------------------------------------------
// TEST UTILITIES
// ------------------------------------------------------------------------------------------------
