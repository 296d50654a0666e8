//! # Pathfinding engine
//!
//! The engine owns the navigation grid and runs one full planning cycle on each call to
//! [`PathfindingEngine::refresh_and_plan`]:
//!
//! 1. Every cell is reset and scanned for obstacles.
//! 2. The start and end cells are re-selected from the agent and destination positions. Selecting
//!    a cell clears its blocked flag.
//! 3. Every cell's neighbour set is recomputed.
//! 4. A* is run from start to end.
//! 5. If the end was reached the path is reconstructed and published to all subscribers.
//!
//! If no path is found nothing is published, so subscribers keep the last path they received.
//!
//! The engine never schedules itself, the host is expected to call `refresh_and_plan`
//! periodically, for example using a [`PeriodicTimer`](super::PeriodicTimer).

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, info, warn};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use super::{
    astar::{self, SearchEvent, SearchResult},
    publisher::{reconstruct_path, PathPublisher, PathReceiver, SubscriptionId},
    NavError, PlannerParams, VisualisationParams,
};
use crate::{
    map::{CellCoord, Grid, GridError, GridParams, ObstacleDetector},
    params::NavParams,
    path::Path,
    visual::{CellStyle, GridVisualiser, NullVisualiser},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct PathfindingEngine<V: GridVisualiser = NullVisualiser> {
    grid_params: GridParams,
    planner_params: PlannerParams,
    vis_params: VisualisationParams,

    grid: Option<Grid>,
    publisher: PathPublisher,
    visualiser: V,

    num_cycles: u64,
}

/// Positions sampled by the host at the start of each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanInput {
    pub agent_m: Vector3<f64>,
    pub destination_m: Vector3<f64>,
}

/// Summary of one planning cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanReport {
    pub cycle: u64,
    pub num_cells: usize,
    pub num_blocked: usize,
    pub start: CellCoord,
    pub end: CellCoord,
    pub search: SearchResult,

    /// Number of points in the published path, `None` if no path was found.
    pub path_len: Option<usize>,
}

/// Result of one planning cycle.
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// The path published this cycle, if any.
    pub path: Option<Path>,

    pub report: PlanReport,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PathfindingEngine<NullVisualiser> {
    /// Create an engine with no visual representation.
    pub fn from_params(params: &NavParams) -> Self {
        Self::new(
            params.grid.clone(),
            params.planner.clone(),
            params.visualisation,
            NullVisualiser,
        )
    }
}

impl<V: GridVisualiser> PathfindingEngine<V> {
    /// Create a new engine. No grid exists until [`PathfindingEngine::initialise`] is called.
    pub fn new(
        grid_params: GridParams,
        planner_params: PlannerParams,
        vis_params: VisualisationParams,
        visualiser: V,
    ) -> Self {
        Self {
            grid_params,
            planner_params,
            vis_params,
            grid: None,
            publisher: PathPublisher::new(),
            visualiser,
            num_cycles: 0,
        }
    }

    /// Build the grid using the current parameters, discarding any existing grid.
    pub fn initialise(&mut self, input: &PlanInput) -> Result<(), NavError> {
        let grid = Grid::build(&self.grid_params, &input.agent_m, &input.destination_m)?;

        self.visualiser.clear();
        let size_m = 2.0 * self.grid_params.scan_radius_m;
        for cell in grid.iter() {
            self.visualiser
                .create_cell(cell.coord, &cell.position_m, size_m);
            self.visualiser
                .set_enabled(cell.coord, self.vis_params.visualise_nodes);
        }

        self.grid = Some(grid);

        Ok(())
    }

    /// Rebuild the grid if the given density differs from the one the current grid was built
    /// with, or if no grid has been built yet.
    ///
    /// Returns true if the grid was rebuilt. If the new density is invalid the current grid and
    /// density are kept and an error is returned.
    pub fn rebuild_if_density_changed(
        &mut self,
        density: u32,
        input: &PlanInput,
    ) -> Result<bool, NavError> {
        if let Some(ref grid) = self.grid {
            if grid.density() == density {
                return Ok(false);
            }
        }

        GridParams::step_for_density(density)?;

        info!(
            "Grid density changed from {} to {}, rebuilding",
            self.grid_params.density, density
        );

        let prev_density = self.grid_params.density;
        self.grid_params.density = density;

        if let Err(e) = self.initialise(input) {
            self.grid_params.density = prev_density;
            return Err(e);
        }

        Ok(true)
    }

    /// Run one full refresh and planning cycle.
    ///
    /// A cycle in which no path is found is not an error, the outcome simply carries no path.
    pub fn refresh_and_plan<D>(
        &mut self,
        input: &PlanInput,
        detector: &D,
    ) -> Result<PlanOutcome, NavError>
    where
        D: ObstacleDetector + ?Sized,
    {
        let grid = self.grid.as_mut().ok_or(NavError::NotInitialised)?;
        if grid.is_empty() {
            return Err(GridError::Empty.into());
        }

        self.num_cycles += 1;

        // Refresh
        let num_blocked = grid.scan_obstacles(
            detector,
            self.grid_params.scan_radius_m,
            self.grid_params.obstacle_layers,
        );
        grid.select_endpoints(&input.agent_m, &input.destination_m)?;
        grid.update_neighbours();

        let visualise_nodes = self.vis_params.visualise_nodes;
        let visualiser = &mut self.visualiser;

        if visualise_nodes {
            for cell in grid.iter() {
                visualiser.set_style(cell.coord, CellStyle::from_flags(&cell.flags));
            }
        }

        // Search
        let search = astar::search(grid, |grid, event| {
            if visualise_nodes {
                let id = match event {
                    SearchEvent::Opened { cell, .. } => cell,
                    SearchEvent::Closed { cell } => cell,
                };
                let cell = &grid[id];
                visualiser.set_style(cell.coord, CellStyle::from_flags(&cell.flags));
            }
        });

        // Reconstruct and publish
        let path = if search.end_reached {
            match reconstruct_path(grid) {
                Ok(p) => Some(p),
                Err(e) => {
                    warn!("Could not reconstruct path: {}", e);
                    None
                }
            }
        } else {
            debug!(
                "No path found after {} iterations, keeping previous path",
                search.iterations
            );
            None
        };

        if path.is_some() {
            for cell in grid.iter() {
                if visualise_nodes && cell.flags.on_path {
                    visualiser.set_style(cell.coord, CellStyle::Path);
                }
                if self.vis_params.visualise_path {
                    visualiser.set_enabled(cell.coord, cell.flags.on_path);
                }
            }
        }

        let report = PlanReport {
            cycle: self.num_cycles,
            num_cells: grid.len(),
            num_blocked,
            start: grid[grid.start()].coord,
            end: grid[grid.end()].coord,
            search,
            path_len: path.as_ref().map(|p| p.get_num_points()),
        };

        if let Some(ref p) = path {
            self.publisher.publish(p.clone());
        }

        debug!(
            "Cycle {}: {} blocked, {} iterations, path {:?}",
            report.cycle, report.num_blocked, report.search.iterations, report.path_len
        );

        if self.planner_params.save_reports {
            util::session::save(
                format!("plan_reports/plan_report_{:06}.json", report.cycle),
                report.clone(),
            );
        }

        Ok(PlanOutcome { path, report })
    }

    /// The most recently published path.
    pub fn latest_path(&self) -> Option<&Path> {
        self.publisher.latest()
    }

    /// Register a callback to receive every published path.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Path) + 'static,
    {
        self.publisher.subscribe(callback)
    }

    /// Create a channel receiving every published path.
    pub fn subscribe_channel(&mut self) -> PathReceiver {
        self.publisher.subscribe_channel()
    }

    pub fn grid(&self) -> Option<&Grid> {
        self.grid.as_ref()
    }

    pub fn grid_params(&self) -> &GridParams {
        &self.grid_params
    }

    pub fn planner_params(&self) -> &PlannerParams {
        &self.planner_params
    }

    pub fn visualiser(&self) -> &V {
        &self.visualiser
    }

    pub fn num_cycles(&self) -> u64 {
        self.num_cycles
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
