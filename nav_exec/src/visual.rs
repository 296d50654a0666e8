//! # Visual representation
//!
//! The engine reports cell state changes to a [`GridVisualiser`]. Visualisers are purely
//! observational, the engine never reads anything back from them.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::BTreeMap;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::map::{CellCoord, CellFlags};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Material applied to a cell's representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellStyle {
    Free,
    Blocked,
    Open,
    Closed,
    Start,
    End,
    Path,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A consumer of grid state for display.
pub trait GridVisualiser {
    /// Discard every existing cell representation.
    fn clear(&mut self);

    /// Create the representation of a new cell. Representations start disabled.
    fn create_cell(&mut self, coord: CellCoord, position_m: &Vector3<f64>, size_m: f64);

    /// Change the material of a cell.
    fn set_style(&mut self, coord: CellCoord, style: CellStyle);

    /// Show or hide a cell.
    fn set_enabled(&mut self, coord: CellCoord, enabled: bool);
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Visualiser which ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullVisualiser;

/// Visualiser which keeps a character map of the grid, for debug logging.
#[derive(Debug, Default, Clone)]
pub struct AsciiVisualiser {
    cells: BTreeMap<CellCoord, AsciiCell>,
}

#[derive(Debug, Clone, Copy)]
struct AsciiCell {
    style: CellStyle,
    enabled: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl CellStyle {
    /// Style of a cell with the given flags, the most significant flag wins.
    pub fn from_flags(flags: &CellFlags) -> Self {
        if flags.on_path {
            CellStyle::Path
        } else if flags.start {
            CellStyle::Start
        } else if flags.end {
            CellStyle::End
        } else if flags.blocked {
            CellStyle::Blocked
        } else if flags.closed {
            CellStyle::Closed
        } else if flags.open {
            CellStyle::Open
        } else {
            CellStyle::Free
        }
    }

    fn as_char(&self) -> char {
        match self {
            CellStyle::Free => '.',
            CellStyle::Blocked => '#',
            CellStyle::Open => 'o',
            CellStyle::Closed => 'x',
            CellStyle::Start => 'S',
            CellStyle::End => 'E',
            CellStyle::Path => '*',
        }
    }
}

impl GridVisualiser for NullVisualiser {
    fn clear(&mut self) {}

    fn create_cell(&mut self, _: CellCoord, _: &Vector3<f64>, _: f64) {}

    fn set_style(&mut self, _: CellCoord, _: CellStyle) {}

    fn set_enabled(&mut self, _: CellCoord, _: bool) {}
}

impl AsciiVisualiser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the grid, one line per row. Disabled cells are drawn as spaces.
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() * 2);
        let mut current_row = None;

        for (coord, cell) in self.cells.iter() {
            if current_row.is_some() && current_row != Some(coord.row) {
                out.push('\n');
            }
            current_row = Some(coord.row);

            out.push(if cell.enabled {
                cell.style.as_char()
            } else {
                ' '
            });
        }

        out
    }

    /// Number of cells currently enabled.
    pub fn num_enabled(&self) -> usize {
        self.cells.values().filter(|c| c.enabled).count()
    }

    pub fn style_of(&self, coord: &CellCoord) -> Option<CellStyle> {
        self.cells.get(coord).map(|c| c.style)
    }
}

impl GridVisualiser for AsciiVisualiser {
    fn clear(&mut self) {
        self.cells.clear();
    }

    fn create_cell(&mut self, coord: CellCoord, _: &Vector3<f64>, _: f64) {
        self.cells.insert(
            coord,
            AsciiCell {
                style: CellStyle::Free,
                enabled: false,
            },
        );
    }

    fn set_style(&mut self, coord: CellCoord, style: CellStyle) {
        if let Some(c) = self.cells.get_mut(&coord) {
            c.style = style;
        }
    }

    fn set_enabled(&mut self, coord: CellCoord, enabled: bool) {
        if let Some(c) = self.cells.get_mut(&coord) {
            c.enabled = enabled;
        }
    }
}
