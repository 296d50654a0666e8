//! Simulated world parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the simulated world, loaded from `sim.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimParams {
    /// Initial position of the agent.
    pub agent_start_m: Vector3<f64>,

    /// Initial heading of the agent.
    #[serde(default)]
    pub agent_heading_rad: f64,

    /// Position the agent is trying to reach.
    pub destination_m: Vector3<f64>,

    /// Maximum run time of the simulation.
    pub duration_s: f64,

    /// Corner of the world with the lowest x and z, moving obstacles bounce off the bounds.
    pub bounds_min_m: [f64; 2],

    /// Corner of the world with the highest x and z.
    pub bounds_max_m: [f64; 2],

    #[serde(default)]
    pub obstacles: Vec<ObstacleParams>,

    /// Optional field of obstacles generated from Perlin noise.
    #[serde(default)]
    pub perlin_field: Option<PerlinFieldParams>,
}

/// A circular obstacle, extruded vertically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObstacleParams {
    pub centre_m: Vector3<f64>,

    pub radius_m: f64,

    /// Layer the obstacle sits on, in the range 0 to 31.
    #[serde(default)]
    pub layer: u32,

    /// Constant velocity of the obstacle in the movement plane, if it moves.
    #[serde(default)]
    pub velocity_ms: Option<[f64; 2]>,
}

/// A field of obstacles wherever Perlin noise exceeds a threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerlinFieldParams {
    pub seed: u32,

    /// Scale applied to world x and z before sampling the noise.
    pub scale: f64,

    /// Offset added to the scaled position before sampling.
    #[serde(default)]
    pub offset: [f64; 2],

    /// Noise values above this are obstacles. Perlin noise lies roughly in [-1, 1].
    pub threshold: f64,

    #[serde(default)]
    pub layer: u32,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for SimParams {
    fn default() -> Self {
        Self {
            agent_start_m: Vector3::zeros(),
            agent_heading_rad: 0.0,
            destination_m: Vector3::zeros(),
            duration_s: 60.0,
            bounds_min_m: [-10.0, -10.0],
            bounds_max_m: [10.0, 10.0],
            obstacles: Vec::new(),
            perlin_field: None,
        }
    }
}

impl Default for ObstacleParams {
    fn default() -> Self {
        Self {
            centre_m: Vector3::zeros(),
            radius_m: 1.0,
            layer: 0,
            velocity_ms: None,
        }
    }
}
