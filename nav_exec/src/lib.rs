//! # Navigation library.
//!
//! This library provides the grid pathfinding engine and the path follower driven by the
//! `nav_exec` executable. It is split into:
//!
//! - [`map`] - the navigation grid, obstacle scanning and the neighbour graph.
//! - [`nav`] - A* planning over the grid, path publication and the planning engine.
//! - [`follow`] - the path follower which steers the agent along the latest published path.
//! - [`sim`] - a simulated world providing obstacle detection and an agent body for the exec.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Path follower - steers the agent along the most recently published path
pub mod follow;

/// Map module - the navigation grid and its obstacle state
pub mod map;

/// Navigation module - A* planning and path publication
pub mod nav;

/// Parameters for the whole navigation stack
pub mod params;

/// Defines the path type
pub mod path;

/// Simulated world used by the executable
pub mod sim;

/// Visual representation of the grid
pub mod visual;
