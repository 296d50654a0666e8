//! Cell and coordinate types

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Lattice coordinate of a cell.
///
/// Rows run along the world X axis and columns along the world Z axis, both in world units
/// relative to the grid anchor.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct CellCoord {
    pub row: i32,
    pub col: i32,
}

/// Stable index of a cell within its grid's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellId(pub usize);

/// State flags of a cell. A cell with no flags set is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CellFlags {
    pub blocked: bool,
    pub open: bool,
    pub closed: bool,
    pub start: bool,
    pub end: bool,
    pub on_path: bool,
}

/// A single cell of the navigation grid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// Lattice coordinate of the cell
    pub coord: CellCoord,

    /// World position of the cell's centre
    pub position_m: Vector3<f64>,

    /// Cost of the best known route from the start cell
    pub g: f64,

    /// Estimated total cost through this cell, `g` plus the heuristic
    pub f: f64,

    /// Predecessor on the best known route, unset until the search reaches this cell
    pub came_from: Option<CellId>,

    pub flags: CellFlags,

    /// Unblocked neighbours, recomputed every refresh
    pub neighbours: Vec<CellId>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CellCoord {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Returns the coordinate offset by the given number of rows and columns.
    pub fn offset(&self, d_row: i32, d_col: i32) -> Self {
        Self {
            row: self.row + d_row,
            col: self.col + d_col,
        }
    }

    /// Chebyshev (chessboard) distance between two coordinates.
    pub fn chebyshev(&self, other: &Self) -> i32 {
        (self.row - other.row)
            .abs()
            .max((self.col - other.col).abs())
    }
}

impl CellFlags {
    /// Clear every flag, leaving the cell free.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// A free cell has no flags set at all.
    pub fn is_free(&self) -> bool {
        *self == Self::default()
    }
}

impl Cell {
    pub fn new(coord: CellCoord, position_m: Vector3<f64>) -> Self {
        Self {
            coord,
            position_m,
            g: f64::INFINITY,
            f: f64::INFINITY,
            came_from: None,
            flags: CellFlags::default(),
            neighbours: Vec::new(),
        }
    }

    /// Clear the flags and search scores of the cell ready for a new cycle.
    pub fn reset(&mut self) {
        self.flags.reset();
        self.g = f64::INFINITY;
        self.f = f64::INFINITY;
        self.came_from = None;
    }

    /// Euclidean distance between this cell's centre and the given world position.
    pub fn distance_to(&self, position_m: &Vector3<f64>) -> f64 {
        (self.position_m - position_m).norm()
    }
}
