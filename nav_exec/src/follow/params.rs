//! Path follower parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the path follower
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FollowerParams {
    /// Distance within which the current waypoint counts as reached.
    pub proximity_threshold_m: f64,

    /// Distance from the path's first point inside which the follower steers directly at it.
    pub chase_radius_m: f64,

    /// Gain applied to the direction vector. The direction is not normalised, so the agent slows
    /// as it closes on its target.
    pub move_speed: f64,

    /// Smoothing time of the heading response.
    pub turn_smooth_time_s: f64,

    /// Period of the follower cycle.
    pub tick_period_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for FollowerParams {
    fn default() -> Self {
        Self {
            proximity_threshold_m: 0.5,
            chase_radius_m: 1.0,
            move_speed: 1.0,
            turn_smooth_time_s: 0.1,
            tick_period_s: 0.02,
        }
    }
}
