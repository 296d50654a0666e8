//! Planner and visualisation parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Shortest allowed refresh period. Full grid rescans any faster than this are wasteful.
pub const MIN_REFRESH_PERIOD_S: f64 = 0.15;

/// Longest allowed refresh period.
pub const MAX_REFRESH_PERIOD_S: f64 = 25.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the periodic planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannerParams {
    /// Period between planning cycles.
    ///
    /// Must be in the range [`MIN_REFRESH_PERIOD_S`, `MAX_REFRESH_PERIOD_S`].
    pub refresh_period_s: f64,

    /// Delay before the first planning cycle.
    #[serde(default = "default_start_delay_s")]
    pub start_delay_s: f64,

    /// If true the report of each planning cycle is saved into the session directory.
    #[serde(default)]
    pub save_reports: bool,
}

/// Toggles for the visual representation of the grid.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct VisualisationParams {
    /// Show every cell and update its material as the search progresses.
    pub visualise_nodes: bool,

    /// After each published path only show the cells on the path.
    pub visualise_path: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for PlannerParams {
    fn default() -> Self {
        Self {
            refresh_period_s: 0.5,
            start_delay_s: default_start_delay_s(),
            save_reports: false,
        }
    }
}

fn default_start_delay_s() -> f64 {
    1.0
}
