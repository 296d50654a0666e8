//! Path reconstruction and delivery to subscribers.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::mpsc::{self, Receiver, Sender};

use log::{debug, trace};

use super::NavError;
use crate::{map::Grid, path::Path};

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

type PathCallback = Box<dyn FnMut(&Path)>;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Handle returned when subscribing a callback, used to unsubscribe it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Delivers each published path to every subscriber.
///
/// Subscribers are either callbacks, invoked synchronously during [`PathPublisher::publish`], or
/// channel receivers, which may be drained whenever the consumer is next stepped.
#[derive(Default)]
pub struct PathPublisher {
    next_id: u64,
    callbacks: Vec<(SubscriptionId, PathCallback)>,
    senders: Vec<Sender<Path>>,
    latest: Option<Path>,
    num_published: u64,
}

/// Receiving end of a channel subscription.
pub struct PathReceiver {
    receiver: Receiver<Path>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PathPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback to be invoked with every published path.
    pub fn subscribe<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&Path) + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.callbacks.push((id, Box::new(callback)));
        id
    }

    /// Remove a previously registered callback. Returns false if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let len = self.callbacks.len();
        self.callbacks.retain(|(i, _)| *i != id);
        self.callbacks.len() != len
    }

    /// Create a new channel subscription.
    pub fn subscribe_channel(&mut self) -> PathReceiver {
        let (sender, receiver) = mpsc::channel();
        self.senders.push(sender);
        PathReceiver { receiver }
    }

    /// Number of live subscribers of either kind.
    pub fn num_subscribers(&self) -> usize {
        self.callbacks.len() + self.senders.len()
    }

    /// Number of paths published so far.
    pub fn num_published(&self) -> u64 {
        self.num_published
    }

    /// The most recently published path.
    pub fn latest(&self) -> Option<&Path> {
        self.latest.as_ref()
    }

    /// Deliver a path to all subscribers.
    ///
    /// Channel subscribers whose receivers have been dropped are removed.
    pub fn publish(&mut self, path: Path) {
        for (_, callback) in self.callbacks.iter_mut() {
            callback(&path);
        }

        self.senders.retain(|s| s.send(path.clone()).is_ok());

        debug!(
            "Published path of {} points to {} subscribers",
            path.get_num_points(),
            self.num_subscribers()
        );

        self.num_published += 1;
        self.latest = Some(path);
    }
}

impl PathReceiver {
    /// Drain the channel, returning only the newest path if any arrived since the last call.
    pub fn latest(&self) -> Option<Path> {
        self.receiver.try_iter().last()
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build the path by following predecessor links back from the end cell.
///
/// Each cell visited is flagged as on the path. The resulting path contains the end cell but not
/// the start cell, ordered from the end backwards, so index 0 is the destination end. If the start
/// and end cells are the same the path is empty.
pub fn reconstruct_path(grid: &mut Grid) -> Result<Path, NavError> {
    let mut points_m = Vec::new();
    let mut current = grid.end();

    while !grid[current].flags.start {
        // A chain longer than the grid can only be a cycle
        if points_m.len() >= grid.len() {
            return Err(NavError::PredecessorCycle);
        }

        let cell = &mut grid[current];
        cell.flags.on_path = true;
        points_m.push(cell.position_m);

        current = cell
            .came_from
            .ok_or(NavError::BrokenPredecessorChain(cell.coord))?;
    }

    trace!("Reconstructed path of {} points", points_m.len());

    Ok(Path::from_points(points_m))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
