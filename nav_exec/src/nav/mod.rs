//! # Navigation
//!
//! This module provides the planning half of the navigation stack:
//!
//! - [`astar`] - A* search over the navigation grid.
//! - [`publisher`] - path reconstruction and delivery to subscribers.
//! - [`engine`] - the [`PathfindingEngine`], which owns the grid and runs a full refresh and plan
//!   cycle each time it is invoked.
//! - [`schedule`] - the timer used by the host loop to invoke the engine periodically.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod astar;
pub mod engine;
pub mod params;
pub mod publisher;
pub mod schedule;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use engine::{PathfindingEngine, PlanInput, PlanOutcome, PlanReport};
pub use params::{PlannerParams, VisualisationParams};
pub use publisher::{PathPublisher, PathReceiver, SubscriptionId};
pub use schedule::PeriodicTimer;

use crate::map::{CellCoord, GridError};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum NavError {
    #[error("The engine has not been initialised, no grid has been built")]
    NotInitialised,

    #[error("Grid error: {0}")]
    GridError(#[from] GridError),

    #[error("Cell {0:?} on the path has no predecessor")]
    BrokenPredecessorChain(CellCoord),

    #[error("The predecessor chain from the end cell never reaches the start cell")]
    PredecessorCycle,
}
