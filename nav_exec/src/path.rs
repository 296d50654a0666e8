//! # Path
//!
//! This module defines the path published by the planner and consumed by the follower.
//!
//! Points are stored destination first: index 0 is the cell nearest the destination and the last
//! index is the cell adjacent to the agent's start cell. The follower therefore walks the path
//! from the last index down to 0.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A path of world positions the agent should traverse.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Default)]
pub struct Path {
    pub points_m: Vec<Vector3<f64>>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Path {
    /// Create a new empty path
    pub fn new_empty() -> Self {
        Path {
            points_m: Vec::new(),
        }
    }

    pub fn from_points(points_m: Vec<Vector3<f64>>) -> Self {
        Path { points_m }
    }

    /// Get the number of points in the path
    pub fn get_num_points(&self) -> usize {
        self.points_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points_m.is_empty()
    }

    /// Index of the first point to traverse, i.e. the point nearest the start, or `None` if the
    /// path is empty.
    pub fn first_traversal_index(&self) -> Option<usize> {
        self.points_m.len().checked_sub(1)
    }

    /// Get the point at the given index.
    pub fn get(&self, index: usize) -> Option<&Vector3<f64>> {
        self.points_m.get(index)
    }

    /// The point nearest the destination, which is the final point to be traversed.
    pub fn destination(&self) -> Option<&Vector3<f64>> {
        self.points_m.first()
    }

    /// Iterate over the points in the order the agent traverses them.
    pub fn traversal_order(&self) -> impl Iterator<Item = &Vector3<f64>> {
        self.points_m.iter().rev()
    }

    /// Return the length of the path in meters.
    ///
    /// If the path is empty (not enough points) then `None` is returned.
    pub fn get_length(&self) -> Option<f64> {
        if self.points_m.len() < 2 {
            return None;
        }

        Some(
            self.points_m
                .windows(2)
                .map(|w| (w[1] - w[0]).norm())
                .sum(),
        )
    }
}
