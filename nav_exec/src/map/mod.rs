//! # Map
//!
//! This module implements the navigation [`Grid`], a lattice of [`Cell`]s laid over the walkable
//! plane. The grid is built once per lattice density and then refreshed every planning cycle:
//!
//! 1. Every cell is re-scanned against the [`ObstacleDetector`], which resets its search state and
//!    marks it blocked or free.
//! 2. The start and end cells are re-selected as the cells nearest the agent and destination.
//! 3. The neighbour graph is recomputed from the freshly scanned obstacle state.
//!
//! Cells are stored in an arena and refer to each other by [`CellId`], so the predecessor links
//! written during search never alias.

// ------------------------------------------------------------------------------------------------
// MODS
// ------------------------------------------------------------------------------------------------

/// Cell and coordinate types
mod cell;

/// The grid itself and its builder
mod grid;

/// Neighbour graph computation
mod neighbours;

/// Grid parameters
mod params;

/// Obstacle scanning
mod scan;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use cell::{Cell, CellCoord, CellFlags, CellId};
pub use grid::Grid;
pub use params::{GridParams, MAX_CELLS, MAX_DENSITY, MIN_DENSITY};
pub use scan::{LayerMask, ObstacleDetector};

#[cfg(test)]
pub(crate) use scan::test_utils;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("The grid parameters produce a grid with no cells")]
    Empty,

    #[error("Lattice density {0} is outside the allowed range [{1}, {2}]")]
    DensityOutOfRange(u32, u32, u32),

    #[error("The grid parameters produce {0} cells, more than the limit of {1}")]
    TooManyCells(usize, usize),
}
