//! # Simulated world
//!
//! A small kinematic world used by the executable in place of a physics engine. It provides
//! obstacle detection for the planner and an agent body which applies the follower's demands.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod body;
mod params;
mod world;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use body::AgentBody;
pub use params::*;
pub use world::{SimObstacle, SimWorld};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SimError {
    #[error("Obstacle {0} has a negative radius ({1} m)")]
    NegativeRadius(usize, f64),

    #[error("Obstacle {0} is on layer {1}, layers must be below 32")]
    InvalidLayer(usize, u32),

    #[error("World bounds are empty, min {0:?} must be below max {1:?} in x and z")]
    EmptyBounds([f64; 2], [f64; 2]),

    #[error("Run duration must be greater than zero, got {0} s")]
    NonPositiveDuration(f64),
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
