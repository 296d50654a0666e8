//! The navigation grid and its builder

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::HashMap;

use log::{debug, info};
use nalgebra::Vector3;

use super::{Cell, CellCoord, CellId, GridError, GridParams, MAX_CELLS};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The navigation grid, an arena of cells keyed by lattice coordinate.
///
/// Cells are stored in scan order (rows ascending, then columns ascending). All "first found"
/// tie-breaks in the grid and the planner follow this order.
#[derive(Debug, Clone)]
pub struct Grid {
    cells: Vec<Cell>,

    index: HashMap<CellCoord, CellId>,

    /// Lattice step between neighbouring cells
    step: i32,

    /// Density the grid was built with
    density: u32,

    start: CellId,
    end: CellId,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Grid {
    /// Build a new grid covering the extent described by the parameters.
    ///
    /// Each cell is positioned at `anchor + (row, anchor.y, col)`. The start and end cells are
    /// selected as those nearest the agent and destination positions.
    pub fn build(
        params: &GridParams,
        agent_m: &Vector3<f64>,
        destination_m: &Vector3<f64>,
    ) -> Result<Self, GridError> {
        let step = params.step()?;
        let anchor = params.anchor_m;

        let num_cells = params.num_cells(step);
        if num_cells > MAX_CELLS {
            return Err(GridError::TooManyCells(num_cells, MAX_CELLS));
        }

        let mut cells = Vec::with_capacity(num_cells);
        let mut index = HashMap::with_capacity(cells.capacity());

        for row in params.rows(step) {
            for col in params.cols(step) {
                let coord = CellCoord::new(row, col);
                let position_m = anchor + Vector3::new(row as f64, anchor.y, col as f64);

                index.insert(coord, CellId(cells.len()));
                cells.push(Cell::new(coord, position_m));
            }
        }

        if cells.is_empty() {
            return Err(GridError::Empty);
        }

        let mut grid = Self {
            cells,
            index,
            step,
            density: params.density,
            start: CellId(0),
            end: CellId(0),
        };

        grid.select_endpoints(agent_m, destination_m)?;

        info!(
            "Built grid of {} cells (density {}, step {})",
            grid.len(),
            grid.density,
            grid.step
        );

        Ok(grid)
    }

    /// Select the start and end cells as the cells nearest the agent and destination.
    ///
    /// Selecting a cell clears all of its other flags, so neither endpoint remains blocked. If
    /// both positions resolve to the same cell it is flagged as both start and end.
    pub fn select_endpoints(
        &mut self,
        agent_m: &Vector3<f64>,
        destination_m: &Vector3<f64>,
    ) -> Result<(), GridError> {
        let start = self.nearest(agent_m).ok_or(GridError::Empty)?;
        let end = self.nearest(destination_m).ok_or(GridError::Empty)?;

        for id in [self.start, self.end].iter() {
            if let Some(cell) = self.cells.get_mut(id.0) {
                cell.flags.start = false;
                cell.flags.end = false;
            }
        }

        self.start = start;
        self.end = end;

        let cell = &mut self.cells[start.0];
        cell.flags.reset();
        cell.flags.start = true;

        let cell = &mut self.cells[end.0];
        if start != end {
            cell.flags.reset();
        }
        cell.flags.end = true;

        debug!(
            "Start cell {:?}, end cell {:?}",
            self.cells[start.0].coord, self.cells[end.0].coord
        );

        Ok(())
    }

    /// Find the cell nearest to the given position.
    ///
    /// Uses a linear scan in scan order, the first of several equidistant cells wins.
    pub fn nearest(&self, position_m: &Vector3<f64>) -> Option<CellId> {
        let mut best = None;
        let mut best_dist = f64::INFINITY;

        for (i, cell) in self.cells.iter().enumerate() {
            let dist = cell.distance_to(position_m);
            if dist < best_dist {
                best_dist = dist;
                best = Some(CellId(i));
            }
        }

        best
    }

    /// Number of cells in the grid.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn step(&self) -> i32 {
        self.step
    }

    pub fn density(&self) -> u32 {
        self.density
    }

    pub fn start(&self) -> CellId {
        self.start
    }

    pub fn end(&self) -> CellId {
        self.end
    }

    pub fn get(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(id.0)
    }

    pub fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.cells.get_mut(id.0)
    }

    /// Get the id of the cell at the given coordinate, if there is one.
    pub fn id_of(&self, coord: &CellCoord) -> Option<CellId> {
        self.index.get(coord).copied()
    }

    /// Get the cell at the given coordinate, if there is one.
    pub fn cell_at(&self, coord: &CellCoord) -> Option<&Cell> {
        self.id_of(coord).and_then(|id| self.get(id))
    }

    /// Iterate over all cells in scan order.
    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter()
    }

    /// Iterate over all cell ids in scan order.
    pub fn ids(&self) -> impl Iterator<Item = CellId> {
        (0..self.cells.len()).map(CellId)
    }

    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.cells.iter_mut()
    }

    /// Coordinates of all blocked cells, in scan order.
    pub fn blocked_coords(&self) -> Vec<CellCoord> {
        self.cells
            .iter()
            .filter(|c| c.flags.blocked)
            .map(|c| c.coord)
            .collect()
    }

    /// Coordinates of all cells, in scan order.
    pub fn coords(&self) -> Vec<CellCoord> {
        self.cells.iter().map(|c| c.coord).collect()
    }
}

impl std::ops::Index<CellId> for Grid {
    type Output = Cell;

    fn index(&self, id: CellId) -> &Self::Output {
        &self.cells[id.0]
    }
}

impl std::ops::IndexMut<CellId> for Grid {
    fn index_mut(&mut self, id: CellId) -> &mut Self::Output {
        &mut self.cells[id.0]
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> GridParams {
        GridParams {
            width_m: 10.0,
            height_m: 10.0,
            density: 10,
            anchor_m: Vector3::new(5.0, 0.0, 5.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_build() -> Result<(), GridError> {
        let grid = Grid::build(
            &params(),
            &Vector3::new(0.2, 0.0, -0.1),
            &Vector3::new(9.0, 0.0, 9.0),
        )?;

        assert_eq!(grid.len(), 100);
        assert_eq!(grid.step(), 1);

        // Scan order is row major
        assert_eq!(grid[CellId(0)].coord, CellCoord::new(-5, -5));
        assert_eq!(grid[CellId(1)].coord, CellCoord::new(-5, -4));
        assert_eq!(grid[CellId(10)].coord, CellCoord::new(-4, -5));

        // Positions are offset by the anchor
        assert_eq!(grid[CellId(0)].position_m, Vector3::new(0.0, 0.0, 0.0));
        assert_eq!(
            grid.cell_at(&CellCoord::new(4, 4)).unwrap().position_m,
            Vector3::new(9.0, 0.0, 9.0)
        );

        // Endpoints
        assert_eq!(grid[grid.start()].coord, CellCoord::new(-5, -5));
        assert_eq!(grid[grid.end()].coord, CellCoord::new(4, 4));
        assert!(grid[grid.start()].flags.start);
        assert!(grid[grid.end()].flags.end);
        assert_eq!(grid.iter().filter(|c| c.flags.start).count(), 1);
        assert_eq!(grid.iter().filter(|c| c.flags.end).count(), 1);

        Ok(())
    }

    #[test]
    fn test_anchor_height_is_applied_twice() -> Result<(), GridError> {
        let params = GridParams {
            anchor_m: Vector3::new(0.0, 2.0, 0.0),
            ..params()
        };
        let origin = Vector3::zeros();
        let grid = Grid::build(&params, &origin, &origin)?;

        assert!(grid.iter().all(|c| c.position_m.y == 4.0));

        Ok(())
    }

    #[test]
    fn test_nearest_tie_break_is_first_in_scan_order() -> Result<(), GridError> {
        let origin = Vector3::zeros();
        let grid = Grid::build(&params(), &origin, &origin)?;

        // Equidistant from (0, 0) and (1, 0) in world space, i.e. cells (-5, -5) and (-4, -5)
        let id = grid.nearest(&Vector3::new(0.5, 0.0, 0.0)).unwrap();
        assert_eq!(grid[id].coord, CellCoord::new(-5, -5));

        Ok(())
    }

    #[test]
    fn test_endpoints_clear_blocked() -> Result<(), GridError> {
        let origin = Vector3::zeros();
        let mut grid = Grid::build(&params(), &origin, &Vector3::new(9.0, 0.0, 9.0))?;

        for cell in grid.cells_mut() {
            cell.flags.blocked = true;
        }

        grid.select_endpoints(&origin, &Vector3::new(9.0, 0.0, 9.0))?;

        assert!(!grid[grid.start()].flags.blocked);
        assert!(!grid[grid.end()].flags.blocked);
        assert_eq!(grid.blocked_coords().len(), 98);

        Ok(())
    }

    #[test]
    fn test_shared_endpoint() -> Result<(), GridError> {
        let origin = Vector3::zeros();
        let grid = Grid::build(&params(), &origin, &origin)?;

        assert_eq!(grid.start(), grid.end());
        let cell = &grid[grid.start()];
        assert!(cell.flags.start && cell.flags.end);

        Ok(())
    }

    #[test]
    fn test_empty_and_invalid() {
        let origin = Vector3::zeros();

        let empty = GridParams {
            width_m: 0.0,
            ..params()
        };
        assert!(matches!(
            Grid::build(&empty, &origin, &origin),
            Err(GridError::Empty)
        ));

        let dense = GridParams {
            density: 0,
            ..params()
        };
        assert!(matches!(
            Grid::build(&dense, &origin, &origin),
            Err(GridError::DensityOutOfRange(0, _, _))
        ));

        let huge = GridParams {
            width_m: 1e7,
            height_m: 1e7,
            ..params()
        };
        assert!(matches!(
            Grid::build(&huge, &origin, &origin),
            Err(GridError::TooManyCells(_, MAX_CELLS))
        ));
    }
}
