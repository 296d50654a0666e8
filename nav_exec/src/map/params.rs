//! Grid parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::{GridError, LayerMask};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// The lowest allowed lattice density, giving the coarsest lattice.
pub const MIN_DENSITY: u32 = 1;

/// The highest allowed lattice density, giving a step of one unit.
pub const MAX_DENSITY: u32 = 10;

/// The largest number of cells a grid may be built with.
pub const MAX_CELLS: usize = 1_000_000;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters describing the lattice of the navigation grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridParams {
    /// Extent of the grid along the world X axis (the row axis).
    pub width_m: f64,

    /// Extent of the grid along the world Z axis (the column axis).
    pub height_m: f64,

    /// Lattice density, the step between cells is `11 - density`.
    ///
    /// Must be in the range [`MIN_DENSITY`, `MAX_DENSITY`].
    pub density: u32,

    /// Radius of the sphere tested against obstacles at each cell. This is effectively how wide
    /// the agent is and whether it fits through tight gaps.
    pub scan_radius_m: f64,

    /// Layers considered to be obstacles.
    pub obstacle_layers: LayerMask,

    /// Reference pose of the walkable plane, cells are positioned relative to this.
    pub anchor_m: Vector3<f64>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GridParams {
    /// Get the lattice step for the given density.
    pub fn step_for_density(density: u32) -> Result<i32, GridError> {
        if !(MIN_DENSITY..=MAX_DENSITY).contains(&density) {
            return Err(GridError::DensityOutOfRange(
                density,
                MIN_DENSITY,
                MAX_DENSITY,
            ));
        }

        Ok((MAX_DENSITY + 1 - density) as i32)
    }

    /// Get the lattice step of these parameters.
    pub fn step(&self) -> Result<i32, GridError> {
        Self::step_for_density(self.density)
    }

    /// Row coordinates covered by the grid, in scan order.
    pub fn rows(&self, step: i32) -> impl Iterator<Item = i32> {
        axis_coords(self.width_m, step)
    }

    /// Column coordinates covered by the grid, in scan order.
    pub fn cols(&self, step: i32) -> impl Iterator<Item = i32> {
        axis_coords(self.height_m, step)
    }

    /// Number of cells the grid will contain with the given step.
    ///
    /// Computed without iterating the lattice, saturating on overflow.
    pub fn num_cells(&self, step: i32) -> usize {
        axis_len(self.width_m, step).saturating_mul(axis_len(self.height_m, step))
    }
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            width_m: 20.0,
            height_m: 20.0,
            density: MAX_DENSITY,
            scan_radius_m: 0.5,
            obstacle_layers: LayerMask::ALL,
            anchor_m: Vector3::zeros(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Coordinates from `-extent/2` (inclusive) to `extent/2` (exclusive), with the extent truncated
/// to an integer and halved with truncating division.
fn axis_coords(extent_m: f64, step: i32) -> impl Iterator<Item = i32> {
    let extent = extent_m as i32;
    let step = step.max(1) as usize;

    ((-extent / 2)..(extent / 2)).step_by(step)
}

/// Number of coordinates [`axis_coords`] yields for the same extent and step.
fn axis_len(extent_m: f64, step: i32) -> usize {
    let extent = extent_m as i32 as i64;
    let span = extent / 2 - (-extent / 2);
    if span <= 0 {
        return 0;
    }

    let step = step.max(1) as i64;
    ((span + step - 1) / step) as usize
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_step_for_density() {
        assert_eq!(GridParams::step_for_density(10).unwrap(), 1);
        assert_eq!(GridParams::step_for_density(1).unwrap(), 10);
        assert!(GridParams::step_for_density(0).is_err());
        assert!(GridParams::step_for_density(11).is_err());
    }

    #[test]
    fn test_axis_coords() {
        let params = GridParams {
            width_m: 10.0,
            height_m: 11.0,
            ..Default::default()
        };

        assert_eq!(params.rows(1).collect::<Vec<_>>(), (-5..5).collect::<Vec<_>>());
        assert_eq!(params.cols(1).collect::<Vec<_>>(), (-5..5).collect::<Vec<_>>());
        assert_eq!(params.rows(3).collect::<Vec<_>>(), vec![-5, -2, 1, 4]);
        assert_eq!(params.num_cells(1), 100);
        assert_eq!(params.num_cells(3), 16);

        // An extent under two units produces nothing
        let params = GridParams {
            width_m: 1.9,
            ..Default::default()
        };
        assert_eq!(params.num_cells(1), 0);
    }

    #[test]
    fn test_num_cells_matches_coords() {
        for extent in [0.0, 1.0, 2.0, 7.5, 10.0, 11.0, 23.0, -4.0].iter() {
            for step in 1..=10 {
                let params = GridParams {
                    width_m: *extent,
                    height_m: 6.0,
                    ..Default::default()
                };
                assert_eq!(
                    params.num_cells(step),
                    params.rows(step).count() * params.cols(step).count()
                );
            }
        }

        // Huge extents are counted without allocating
        let params = GridParams {
            width_m: 1e7,
            height_m: 1e7,
            ..Default::default()
        };
        assert!(params.num_cells(1) > MAX_CELLS);
    }
}
