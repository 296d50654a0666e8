//! # Path follower
//!
//! The follower keeps a cursor into the most recently received path and produces a motion demand
//! each cycle which moves the agent toward the waypoint under the cursor.
//!
//! Paths are stored destination first, so the cursor starts at the last index and counts down to
//! zero as each waypoint is reached. Once the agent is inside the chase radius of the path's
//! first point (the point nearest the destination) the follower steers directly at it, whatever
//! the cursor is pointing at.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod params;
mod state;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use params::*;
pub use state::*;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible errors that can occur during follower operation.
#[derive(Debug, thiserror::Error)]
pub enum FollowerError {
    #[error("Could not create the follower archive: {0}")]
    ArchiveError(#[from] util::archive::ArchiveError),

    #[error("Target index {0} is outside the current path of {1} points")]
    TargetOutOfRange(usize, usize),

    #[error("Invalid cycle period: {0} s")]
    InvalidPeriod(f64),
}
