//! Parameters for the whole navigation stack

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use crate::{
    follow::FollowerParams,
    map::{GridParams, MAX_CELLS, MAX_DENSITY, MIN_DENSITY},
    nav::{
        params::{MAX_REFRESH_PERIOD_S, MIN_REFRESH_PERIOD_S},
        PlannerParams, VisualisationParams,
    },
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Navigation parameters, loaded from `nav_exec.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NavParams {
    pub grid: GridParams,
    pub planner: PlannerParams,
    pub follower: FollowerParams,

    #[serde(default)]
    pub visualisation: VisualisationParams,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamsError {
    #[error("Grid density {0} is outside the range [{1}, {2}]")]
    DensityOutOfRange(u32, u32, u32),

    #[error("Grid of {0} x {1} m at density {2} contains no cells")]
    EmptyGrid(f64, f64, u32),

    #[error("Grid of {0} cells exceeds the limit of {1} cells")]
    TooManyCells(usize, usize),

    #[error("Refresh period {0} s is outside the range [{1}, {2}] s")]
    RefreshPeriodOutOfRange(f64, f64, f64),

    #[error("Start delay must not be negative, got {0} s")]
    NegativeStartDelay(f64),

    #[error("Expected {0} to be at least zero, got {1}")]
    NegativeValue(&'static str, f64),

    #[error("Expected {0} to be greater than zero, got {1}")]
    NonPositiveValue(&'static str, f64),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl NavParams {
    /// Check the parameters describe a usable grid, planner and follower.
    pub fn validate(&self) -> Result<(), ParamsError> {
        let grid = &self.grid;

        let step = GridParams::step_for_density(grid.density).map_err(|_| {
            ParamsError::DensityOutOfRange(grid.density, MIN_DENSITY, MAX_DENSITY)
        })?;

        let num_cells = grid.num_cells(step);
        if num_cells == 0 {
            return Err(ParamsError::EmptyGrid(
                grid.width_m,
                grid.height_m,
                grid.density,
            ));
        }
        if num_cells > MAX_CELLS {
            return Err(ParamsError::TooManyCells(num_cells, MAX_CELLS));
        }

        non_negative("grid.scan_radius_m", grid.scan_radius_m)?;

        let period = self.planner.refresh_period_s;
        if !(MIN_REFRESH_PERIOD_S..=MAX_REFRESH_PERIOD_S).contains(&period) {
            return Err(ParamsError::RefreshPeriodOutOfRange(
                period,
                MIN_REFRESH_PERIOD_S,
                MAX_REFRESH_PERIOD_S,
            ));
        }

        if !(self.planner.start_delay_s >= 0.0) {
            return Err(ParamsError::NegativeStartDelay(self.planner.start_delay_s));
        }

        let follower = &self.follower;
        non_negative("follower.proximity_threshold_m", follower.proximity_threshold_m)?;
        non_negative("follower.chase_radius_m", follower.chase_radius_m)?;
        non_negative("follower.turn_smooth_time_s", follower.turn_smooth_time_s)?;
        positive("follower.move_speed", follower.move_speed)?;
        positive("follower.tick_period_s", follower.tick_period_s)?;

        Ok(())
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<(), ParamsError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ParamsError::NegativeValue(name, value))
    }
}

fn positive(name: &'static str, value: f64) -> Result<(), ParamsError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ParamsError::NonPositiveValue(name, value))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
