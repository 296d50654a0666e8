//! A* search over a [`Grid`].
//!
//! The search runs directly on the grid cells, writing the cost so far (`g`), the estimated total
//! cost (`f`), the predecessor link and the open/closed flags into each cell it touches. Moving
//! to any neighbour costs one unit, while the heuristic is the straight line distance in metres
//! to the end cell.
//!
//! The open set is a plain list of `(f, cell)` entries scanned linearly for the lowest `f`. Ties
//! go to the entry inserted first. Entries superseded by a later, cheaper insertion of the same
//! cell stay in the list and are expanded again when they come up. The total number of
//! expansions is capped at the number of cells in the grid.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use serde::{Deserialize, Serialize};

use crate::map::{CellId, Grid};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Summary of a single search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// True if the end cell was selected for expansion.
    pub end_reached: bool,

    /// Number of expansions performed.
    pub iterations: usize,

    /// Largest size the open list reached.
    pub peak_open_len: usize,
}

/// Entry in the open list.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    f: f64,
    cell: CellId,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Changes made to a cell during the search, used to drive visualisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchEvent {
    /// A cell's cost was improved and it was added to the open list.
    Opened { cell: CellId, g: f64, f: f64 },

    /// A cell was expanded.
    Closed { cell: CellId },
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Heuristic cost between two cells, the euclidean distance between their world positions.
pub fn heuristic(grid: &Grid, from: CellId, to: CellId) -> f64 {
    (grid[to].position_m - grid[from].position_m).norm()
}

/// Run the search from the grid's start cell towards its end cell.
///
/// The grid must have been scanned and had its neighbour sets recomputed beforehand. The
/// `on_event` callback is invoked for every cell opened or closed.
///
/// When the search terminates with `end_reached` the predecessor chain from the end cell leads
/// back to the start cell.
pub fn search<F>(grid: &mut Grid, mut on_event: F) -> SearchResult
where
    F: FnMut(&Grid, SearchEvent),
{
    let mut result = SearchResult::default();

    if grid.is_empty() {
        return result;
    }

    let start = grid.start();
    let end = grid.end();
    let max_iterations = grid.len();

    let mut open: Vec<OpenEntry> = Vec::new();

    while result.iterations < max_iterations {
        // Select the open entry with the lowest estimated cost, the first one wins ties
        let mut selected: Option<usize> = None;
        let mut lowest_f = f64::INFINITY;
        for (i, entry) in open.iter().enumerate() {
            if entry.f < lowest_f {
                lowest_f = entry.f;
                selected = Some(i);
            }
        }

        let current = match selected {
            Some(i) => open[i].cell,
            // Nothing left to expand after the start has been expanded means there's no path
            None if result.iterations > 0 => {
                trace!("Open list exhausted after {} iterations", result.iterations);
                break;
            }
            None => start,
        };

        if grid[current].flags.start {
            let h = heuristic(grid, current, end);
            let cell = &mut grid[current];
            cell.g = 0.0;
            cell.f = h;
        }

        if grid[current].flags.end {
            result.end_reached = true;
            break;
        }

        if let Some(i) = selected {
            open.remove(i);
        }

        let current_g = grid[current].g;
        let num_neighbours = grid[current].neighbours.len();

        for n in 0..num_neighbours {
            let neighbour = grid[current].neighbours[n];

            // Neighbour sets always come from this grid, but skip rather than fault on a bad id
            if grid.get(neighbour).is_none() {
                trace!("Skipping unknown neighbour {:?}", neighbour);
                continue;
            }

            let tentative_g = current_g + 1.0;
            if tentative_g < grid[neighbour].g {
                let f = tentative_g + heuristic(grid, neighbour, end);

                let cell = &mut grid[neighbour];
                cell.came_from = Some(current);
                cell.g = tentative_g;
                cell.f = f;
                cell.flags.open = true;

                open.push(OpenEntry { f, cell: neighbour });

                on_event(
                    &*grid,
                    SearchEvent::Opened {
                        cell: neighbour,
                        g: tentative_g,
                        f,
                    },
                );
            }
        }

        result.iterations += 1;
        result.peak_open_len = result.peak_open_len.max(open.len());

        grid[current].flags.closed = true;
        on_event(&*grid, SearchEvent::Closed { cell: current });
    }

    result
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::map::{test_utils::PointObstacles, CellCoord, GridParams};
    use crate::nav::publisher::reconstruct_path;
    use nalgebra::Vector3;

    /// 10x10 grid at density 10 with cells at world x and z in 0..=9
    fn params() -> GridParams {
        GridParams {
            width_m: 10.0,
            height_m: 10.0,
            density: 10,
            anchor_m: Vector3::new(5.0, 0.0, 5.0),
            ..Default::default()
        }
    }

    fn prepared_grid(agent: (f64, f64), dest: (f64, f64), obstacles: &[(f64, f64)]) -> Grid {
        let p = params();
        let agent_m = Vector3::new(agent.0, 0.0, agent.1);
        let dest_m = Vector3::new(dest.0, 0.0, dest.1);
        let mut grid = Grid::build(&p, &agent_m, &dest_m).unwrap();
        grid.scan_obstacles(
            &PointObstacles::from_xz(obstacles),
            p.scan_radius_m,
            p.obstacle_layers,
        );
        grid.select_endpoints(&agent_m, &dest_m).unwrap();
        grid.update_neighbours();
        grid
    }

    #[test]
    fn test_open_grid_reaches_end() {
        let mut grid = prepared_grid((0.0, 0.0), (9.0, 9.0), &[]);
        let result = search(&mut grid, |_, _| ());

        assert!(result.end_reached);
        assert!(result.iterations <= grid.len());

        // Diagonal moves are one unit, so the end is nine steps away
        assert_eq!(grid[grid.end()].g, 9.0);
        assert_eq!(grid[grid.start()].g, 0.0);
    }

    #[test]
    fn test_walled_off_end_is_not_reached() {
        // Surround the end cell at (9, 9) completely
        let mut grid = prepared_grid((0.0, 0.0), (9.0, 9.0), &[(8.0, 8.0), (9.0, 8.0), (8.0, 9.0)]);
        let result = search(&mut grid, |_, _| ());

        assert!(!result.end_reached);
        assert!(result.iterations <= grid.len());
        assert!(grid[grid.end()].came_from.is_none());
    }

    #[test]
    fn test_g_never_increases_for_a_cell() {
        let mut grid = prepared_grid(
            (0.0, 0.0),
            (9.0, 9.0),
            &[(5.0, 0.0), (5.0, 1.0), (5.0, 2.0), (5.0, 4.0), (5.0, 5.0)],
        );

        let mut last_g = std::collections::HashMap::new();
        let mut violations = 0;
        search(&mut grid, |_, event| {
            if let SearchEvent::Opened { cell, g, .. } = event {
                if let Some(prev) = last_g.insert(cell, g) {
                    if g >= prev {
                        violations += 1;
                    }
                }
            }
        });

        assert_eq!(violations, 0);
    }

    #[test]
    fn test_closed_cells_are_reported() {
        let mut grid = prepared_grid((0.0, 0.0), (3.0, 0.0), &[]);
        let mut closed = Vec::new();
        let result = search(&mut grid, |_, event| {
            if let SearchEvent::Closed { cell } = event {
                closed.push(cell);
            }
        });

        assert_eq!(closed.len(), result.iterations);
        assert_eq!(closed[0], grid.start());
        for id in closed {
            assert!(grid[id].flags.closed);
        }
    }

    #[test]
    fn test_shared_start_and_end() {
        let mut grid = prepared_grid((4.0, 4.0), (4.2, 3.9), &[]);
        let result = search(&mut grid, |_, _| ());

        assert!(result.end_reached);
        assert_eq!(result.iterations, 0);
        assert_eq!(grid[grid.start()].coord, CellCoord::new(-1, -1));
    }

    #[test]
    fn test_search_is_deterministic() {
        let obstacles = [(3.0, 3.0), (3.0, 4.0), (4.0, 3.0), (6.0, 7.0)];
        let mut a = prepared_grid((0.0, 1.0), (8.0, 9.0), &obstacles);
        let mut b = prepared_grid((0.0, 1.0), (8.0, 9.0), &obstacles);

        assert_eq!(search(&mut a, |_, _| ()), search(&mut b, |_, _| ()));
        for id in a.ids() {
            assert_eq!(a[id].came_from, b[id].came_from);
            assert_eq!(a[id].g, b[id].g);
            assert_eq!(a[id].f, b[id].f);
            assert_eq!(a[id].flags, b[id].flags);
        }
    }

    #[test]
    fn test_equal_f_goes_to_first_opened() {
        // Start at (0, 4) and end at (2, 4) with (1, 4) blocked. The detours through (1, 3) and
        // (1, 5) have exactly equal f, and (1, 3) is opened first.
        let mut grid = prepared_grid((0.0, 4.0), (2.0, 4.0), &[(1.0, 4.0)]);
        let lower = grid.id_of(&CellCoord::new(-4, -2)).unwrap();
        let upper = grid.id_of(&CellCoord::new(-4, 0)).unwrap();

        let mut opened = Vec::new();
        let mut closed = Vec::new();
        let result = search(&mut grid, |_, event| match event {
            SearchEvent::Opened { cell, .. } => opened.push(cell),
            SearchEvent::Closed { cell } => closed.push(cell),
        });

        assert_eq!(grid[lower].f, grid[upper].f);
        let pos = |id| opened.iter().position(|c| *c == id).unwrap();
        assert!(pos(lower) < pos(upper));

        assert!(result.end_reached);
        assert_eq!(result.iterations, 2);
        assert_eq!(closed, vec![grid.start(), lower]);
        assert!(!grid[upper].flags.closed);

        let path = reconstruct_path(&mut grid).unwrap();
        assert_eq!(
            path.traversal_order().cloned().collect::<Vec<_>>(),
            vec![Vector3::new(1.0, 0.0, 3.0), Vector3::new(2.0, 0.0, 4.0)]
        );
    }

    #[test]
    fn test_diagonal_offset_path() {
        let mut grid = prepared_grid((0.0, 0.0), (4.0, 2.0), &[]);
        let result = search(&mut grid, |_, _| ());

        assert!(result.end_reached);
        assert_eq!(result.iterations, 4);

        let path = reconstruct_path(&mut grid).unwrap();
        let coords: Vec<CellCoord> = path
            .traversal_order()
            .map(|p| grid[grid.nearest(p).unwrap()].coord)
            .collect();
        assert_eq!(
            coords,
            vec![
                CellCoord::new(-4, -4),
                CellCoord::new(-3, -3),
                CellCoord::new(-2, -3),
                CellCoord::new(-1, -3),
            ]
        );
    }
}
