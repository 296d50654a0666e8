//! Neighbour graph computation

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use super::{CellCoord, CellId, Grid};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Unit offsets of the neighbour candidates, orthogonal first then diagonal.
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (1, 0),
    (-1, 0),
    (0, 1),
    (0, -1),
    (-1, -1),
    (-1, 1),
    (1, -1),
    (1, 1),
];

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Grid {
    /// Recompute the neighbour set of every cell from the current obstacle state.
    ///
    /// A neighbour is any cell one lattice step away (including diagonally) which is present in the
    /// grid and not blocked. Blocked cells are left with no neighbours.
    pub fn update_neighbours(&mut self) {
        let neighbours: Vec<Vec<CellId>> = self
            .iter()
            .map(|cell| {
                if cell.flags.blocked {
                    Vec::new()
                } else {
                    self.free_neighbours_of(&cell.coord)
                }
            })
            .collect();

        for (cell, n) in self.cells_mut().zip(neighbours) {
            cell.neighbours = n;
        }
    }

    /// Get the unblocked cells one step away from the given coordinate.
    ///
    /// Coordinates outside the grid are skipped.
    pub fn free_neighbours_of(&self, coord: &CellCoord) -> Vec<CellId> {
        let step = self.step();

        NEIGHBOUR_OFFSETS
            .iter()
            .filter_map(|(d_row, d_col)| self.id_of(&coord.offset(d_row * step, d_col * step)))
            .filter(|id| !self[*id].flags.blocked)
            .collect()
    }
}

#[cfg(test)]
mod test {
    use nalgebra::Vector3;

    use super::*;
    use crate::map::{test_utils::PointObstacles, GridParams, LayerMask};

    #[test]
    fn test_neighbours() {
        let params = GridParams {
            width_m: 6.0,
            height_m: 6.0,
            density: 9,
            ..Default::default()
        };
        let origin = Vector3::zeros();
        let mut grid = Grid::build(&params, &origin, &origin).unwrap();
        assert_eq!(grid.step(), 2);

        // Block (1, 1)
        grid.scan_obstacles(&PointObstacles::from_xz(&[(1.0, 1.0)]), 0.5, LayerMask::ALL);
        grid.update_neighbours();

        let coords = |id: &CellId| grid[*id].coord;

        // Corner cell only has 3 candidates inside the grid
        let corner = grid.cell_at(&CellCoord::new(-3, -3)).unwrap();
        let n: Vec<_> = corner.neighbours.iter().map(coords).collect();
        assert_eq!(
            n,
            vec![
                CellCoord::new(-1, -3),
                CellCoord::new(-3, -1),
                CellCoord::new(-1, -1)
            ]
        );

        // The edge cell next to the blocked cell loses it
        let edge = grid.cell_at(&CellCoord::new(1, -1)).unwrap();
        let n: Vec<_> = edge.neighbours.iter().map(coords).collect();
        assert_eq!(
            n,
            vec![
                CellCoord::new(-1, -1),
                CellCoord::new(1, -3),
                CellCoord::new(-1, -3),
                CellCoord::new(-1, 1)
            ]
        );

        // Centre cell has all 8 but the blocked diagonal
        let centre = grid.cell_at(&CellCoord::new(-1, -1)).unwrap();
        let n: Vec<_> = centre.neighbours.iter().map(coords).collect();
        assert_eq!(
            n,
            vec![
                CellCoord::new(1, -1),
                CellCoord::new(-3, -1),
                CellCoord::new(-1, 1),
                CellCoord::new(-1, -3),
                CellCoord::new(-3, -3),
                CellCoord::new(-3, 1),
                CellCoord::new(1, -3),
            ]
        );

        // Blocked cell has none, and nobody has it
        assert!(grid.cell_at(&CellCoord::new(1, 1)).unwrap().neighbours.is_empty());
        let blocked = grid.id_of(&CellCoord::new(1, 1)).unwrap();
        assert!(grid.iter().all(|c| !c.neighbours.contains(&blocked)));
    }
}
