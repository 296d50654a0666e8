//! Path follower state

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use util::{
    archive::{ArchiveError, Archived, Archiver},
    maths::smooth_damp_angle,
    module::State,
    session::{self, Session},
};

use super::{FollowerError, FollowerParams};
use crate::{nav::PathReceiver, path::Path};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Directions shorter than this leave the heading unchanged.
const MIN_HEADING_DIRECTION_M: f64 = 1e-9;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Default)]
pub struct PathFollower {
    params: FollowerParams,

    path: Option<Path>,

    /// Index of the current target point within the path
    target_index: usize,

    /// Persistent angular velocity used by the heading smoothing
    heading_rate_rads: f64,

    report: StatusReport,

    arch_report: Archiver,
}

/// Position and heading of the agent.
///
/// Heading is measured from the world Z axis toward the X axis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentPose {
    pub position_m: Vector3<f64>,
    pub heading_rad: f64,
}

/// Input data to the follower.
#[derive(Debug, Clone, Default)]
pub struct InputData {
    pub pose: AgentPose,

    /// Time since the previous cycle.
    pub dt_s: f64,

    /// A newly published path, if one arrived since the previous cycle.
    pub new_path: Option<Path>,
}

/// Motion the agent body should apply this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionDemand {
    /// Translation to apply, in the movement plane.
    pub translation_m: Vector3<f64>,

    /// New absolute heading.
    pub heading_rad: f64,
}

/// Status report of the follower, archived every cycle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct StatusReport {
    pub time_s: f64,
    pub has_path: bool,
    pub num_points: usize,
    pub target_index: usize,
    pub target_x_m: f64,
    pub target_z_m: f64,
    pub dist_to_target_m: f64,
    pub dist_to_first_m: f64,
    pub chasing: bool,
    pub arrived: bool,
    pub heading_rad: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl State for PathFollower {
    type InitData = FollowerParams;
    type InitError = FollowerError;

    type InputData = InputData;
    type OutputData = Option<MotionDemand>;
    type StatusReport = StatusReport;
    type ProcError = FollowerError;

    /// Initialise the follower with the given parameters, creating its archive in the session.
    fn init(&mut self, init_data: Self::InitData, session: &Session) -> Result<(), Self::InitError> {
        self.params = init_data;
        self.arch_report = Archiver::from_path(session, "follower/status_report.csv")?;

        Ok(())
    }

    /// Run one follower cycle.
    ///
    /// Returns `None` if there is no path to follow or the agent has arrived at the end of the
    /// path. An empty path counts as arrived.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        if !(input_data.dt_s >= 0.0) {
            return Err(FollowerError::InvalidPeriod(input_data.dt_s));
        }

        self.report = StatusReport {
            time_s: session::get_elapsed_seconds(),
            heading_rad: input_data.pose.heading_rad,
            ..Default::default()
        };

        if let Some(ref path) = input_data.new_path {
            self.set_path(path.clone());
        }

        let output = self.follow(&input_data.pose, input_data.dt_s)?;

        Ok((output, self.report))
    }
}

impl Archived for PathFollower {
    fn write(&mut self) -> Result<(), ArchiveError> {
        self.arch_report.serialise(self.report)
    }
}

impl PathFollower {
    /// Create a follower with no archive, for use outside of a session.
    pub fn new(params: FollowerParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    /// Replace the current path, resetting the cursor to the waypoint nearest the start.
    pub fn set_path(&mut self, path: Path) {
        self.target_index = path.first_traversal_index().unwrap_or(0);

        trace!(
            "New path of {} points, target index {}",
            path.get_num_points(),
            self.target_index
        );

        self.path = Some(path);
    }

    /// Take the newest path from a channel subscription, if one has arrived.
    ///
    /// Returns true if the path was replaced.
    pub fn receive(&mut self, receiver: &PathReceiver) -> bool {
        match receiver.latest() {
            Some(path) => {
                self.set_path(path);
                true
            }
            None => false,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_ref()
    }

    pub fn target_index(&self) -> usize {
        self.target_index
    }

    pub fn params(&self) -> &FollowerParams {
        &self.params
    }

    pub fn report(&self) -> &StatusReport {
        &self.report
    }

    fn follow(&mut self, pose: &AgentPose, dt_s: f64) -> Result<Option<MotionDemand>, FollowerError> {
        let path = match self.path {
            Some(ref p) => p,
            None => return Ok(None),
        };

        let num_points = path.get_num_points();
        let point = |i: usize| {
            path.get(i)
                .copied()
                .ok_or(FollowerError::TargetOutOfRange(i, num_points))
        };

        self.report.has_path = true;
        self.report.num_points = num_points;

        // An empty path means the agent is already in the destination's cell
        if path.is_empty() {
            self.report.arrived = true;
            return Ok(None);
        }

        // ---- TARGET MANAGEMENT ----

        if self.target_index > 0
            && planar_dist(&pose.position_m, &point(self.target_index)?)
                < self.params.proximity_threshold_m
        {
            self.target_index -= 1;
            trace!("Target index decremented to {}", self.target_index);
        }

        let target = point(self.target_index)?;
        let first = point(0)?;

        let dist_to_first_m = planar_dist(&pose.position_m, &first);

        self.report.target_index = self.target_index;
        self.report.target_x_m = target.x;
        self.report.target_z_m = target.z;
        self.report.dist_to_target_m = planar_dist(&pose.position_m, &target);
        self.report.dist_to_first_m = dist_to_first_m;

        if self.target_index == 0 && dist_to_first_m < self.params.proximity_threshold_m {
            self.report.arrived = true;
            self.heading_rate_rads = 0.0;
            return Ok(None);
        }

        // ---- COMMAND GENERATION ----

        let mut direction = planar(&(target - pose.position_m));

        if dist_to_first_m < self.params.chase_radius_m {
            direction = planar(&(first - pose.position_m));
            self.report.chasing = true;
        }

        let heading_rad = if direction.norm() > MIN_HEADING_DIRECTION_M {
            smooth_damp_angle(
                pose.heading_rad,
                direction.x.atan2(direction.z),
                &mut self.heading_rate_rads,
                self.params.turn_smooth_time_s,
                dt_s,
            )
        } else {
            pose.heading_rad
        };

        self.report.heading_rad = heading_rad;

        Ok(Some(MotionDemand {
            translation_m: direction * self.params.move_speed * dt_s,
            heading_rad,
        }))
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Project a vector onto the movement plane.
fn planar(v: &Vector3<f64>) -> Vector3<f64> {
    Vector3::new(v.x, 0.0, v.z)
}

/// Distance between two points in the movement plane.
fn planar_dist(a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
    planar(&(b - a)).norm()
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::nav::PathPublisher;

    fn params() -> FollowerParams {
        FollowerParams {
            proximity_threshold_m: 0.5,
            chase_radius_m: 0.6,
            move_speed: 2.0,
            turn_smooth_time_s: 0.1,
            tick_period_s: 0.1,
        }
    }

    fn xz_path(points: &[(f64, f64)]) -> Path {
        Path::from_points(
            points
                .iter()
                .map(|(x, z)| Vector3::new(*x, 0.0, *z))
                .collect(),
        )
    }

    fn input_at(x: f64, z: f64) -> InputData {
        InputData {
            pose: AgentPose {
                position_m: Vector3::new(x, 0.0, z),
                heading_rad: 0.0,
            },
            dt_s: 0.1,
            new_path: None,
        }
    }

    #[test]
    fn test_cursor_walks_down_the_path() -> Result<(), FollowerError> {
        let mut follower = PathFollower::new(params());
        follower.set_path(xz_path(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]));
        assert_eq!(follower.target_index(), 2);

        // At the last index point, moves on to index 1
        let (demand, report) = follower.proc(&input_at(2.0, 0.0))?;
        assert_eq!(follower.target_index(), 1);
        assert!(!report.chasing);
        let demand = demand.unwrap();
        assert!((demand.translation_m - Vector3::new(-0.2, 0.0, 0.0)).norm() < 1e-12);

        // At index 1, moves on to index 0
        follower.proc(&input_at(1.0, 0.0))?;
        assert_eq!(follower.target_index(), 0);

        // Cursor never goes below zero
        follower.proc(&input_at(1.0, 0.0))?;
        assert_eq!(follower.target_index(), 0);

        Ok(())
    }

    #[test]
    fn test_chase_overrides_target() -> Result<(), FollowerError> {
        let mut follower = PathFollower::new(params());
        follower.set_path(xz_path(&[(0.0, 0.0), (5.0, 0.0), (10.0, 0.0)]));

        // Agent is far from index 2 but inside the chase radius of the first point
        let (demand, report) = follower.proc(&input_at(0.0, 0.55))?;
        assert_eq!(follower.target_index(), 2);
        assert!(report.chasing);

        let translation = demand.unwrap().translation_m;
        assert!((translation - Vector3::new(0.0, 0.0, -0.55 * 2.0 * 0.1)).norm() < 1e-12);

        Ok(())
    }

    #[test]
    fn test_direction_is_not_normalised() -> Result<(), FollowerError> {
        let mut follower = PathFollower::new(params());
        follower.set_path(xz_path(&[(0.0, 0.0), (4.0, 0.0)]));

        let (far, _) = follower.proc(&input_at(0.0, 8.0))?;
        let (near, _) = follower.proc(&input_at(0.0, 6.0))?;

        assert!(far.unwrap().translation_m.norm() > near.unwrap().translation_m.norm());

        Ok(())
    }

    #[test]
    fn test_movement_is_planar() -> Result<(), FollowerError> {
        let mut follower = PathFollower::new(params());
        follower.set_path(xz_path(&[(0.0, 0.0), (3.0, 3.0)]));

        let mut input = input_at(0.0, 0.0);
        input.pose.position_m.y = 2.0;

        let (demand, _) = follower.proc(&input)?;
        assert_eq!(demand.unwrap().translation_m.y, 0.0);

        Ok(())
    }

    #[test]
    fn test_arrival() -> Result<(), FollowerError> {
        let mut follower = PathFollower::new(params());
        follower.set_path(xz_path(&[(0.0, 0.0)]));

        let (demand, report) = follower.proc(&input_at(0.2, 0.0))?;
        assert!(demand.is_none());
        assert!(report.arrived);

        Ok(())
    }

    #[test]
    fn test_no_path() -> Result<(), FollowerError> {
        let mut follower = PathFollower::new(params());

        let (demand, report) = follower.proc(&input_at(0.0, 0.0))?;
        assert!(demand.is_none());
        assert!(!report.has_path);

        follower.set_path(Path::new_empty());
        let (demand, report) = follower.proc(&input_at(0.0, 0.0))?;
        assert!(demand.is_none());
        assert!(report.arrived);

        Ok(())
    }

    #[test]
    fn test_new_path_resets_cursor() -> Result<(), FollowerError> {
        let mut publisher = PathPublisher::new();
        let receiver = publisher.subscribe_channel();

        let mut follower = PathFollower::new(params());
        follower.set_path(xz_path(&[(0.0, 0.0), (1.0, 0.0), (2.0, 0.0)]));
        follower.proc(&input_at(2.0, 0.0))?;
        assert_eq!(follower.target_index(), 1);

        assert!(!follower.receive(&receiver));

        publisher.publish(xz_path(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]));
        assert!(follower.receive(&receiver));
        assert_eq!(follower.target_index(), 3);

        // A path passed in the input data replaces it again
        let mut input = input_at(5.0, 5.0);
        input.new_path = Some(xz_path(&[(0.0, 0.0), (1.0, 1.0)]));
        follower.proc(&input)?;
        assert_eq!(follower.target_index(), 1);
        assert_eq!(follower.path().map(|p| p.get_num_points()), Some(2));

        Ok(())
    }

    #[test]
    fn test_heading_turns_toward_target() -> Result<(), FollowerError> {
        let mut follower = PathFollower::new(params());
        follower.set_path(xz_path(&[(0.0, 0.0), (10.0, 0.0)]));

        // Target at (10, 0) seen from (0, 10) is a bearing of 3pi/4 from +Z
        let mut input = input_at(0.0, 10.0);
        let mut heading = 0.0;
        let mut prev_error = std::f64::INFINITY;

        for _ in 0..5 {
            input.pose.heading_rad = heading;
            let (demand, _) = follower.proc(&input)?;
            heading = demand.unwrap().heading_rad;

            let error = (3.0 * std::f64::consts::FRAC_PI_4 - heading).abs();
            assert!(error < prev_error);
            prev_error = error;
        }

        Ok(())
    }

    #[test]
    fn test_negative_period_rejected() {
        let mut follower = PathFollower::new(params());
        let mut input = input_at(0.0, 0.0);
        input.dt_s = -1.0;

        assert!(matches!(
            follower.proc(&input),
            Err(FollowerError::InvalidPeriod(_))
        ));
    }
}
