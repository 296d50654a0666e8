//! Kinematic agent body

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Vector3;

use crate::follow::{AgentPose, MotionDemand};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An agent body which applies motion demands directly, with no dynamics.
#[derive(Debug, Clone)]
pub struct AgentBody {
    pose: AgentPose,
    distance_travelled_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl AgentBody {
    pub fn new(position_m: Vector3<f64>, heading_rad: f64) -> Self {
        Self {
            pose: AgentPose {
                position_m,
                heading_rad,
            },
            distance_travelled_m: 0.0,
        }
    }

    /// Translate the body and set its heading.
    pub fn apply(&mut self, demand: &MotionDemand) {
        self.pose.position_m += demand.translation_m;
        self.pose.heading_rad = demand.heading_rad;
        self.distance_travelled_m += demand.translation_m.norm();
    }

    pub fn pose(&self) -> &AgentPose {
        &self.pose
    }

    pub fn distance_travelled_m(&self) -> f64 {
        self.distance_travelled_m
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_apply() {
        let mut body = AgentBody::new(Vector3::new(1.0, 0.0, 1.0), 0.0);

        body.apply(&MotionDemand {
            translation_m: Vector3::new(3.0, 0.0, 4.0),
            heading_rad: 0.5,
        });

        assert_eq!(body.pose().position_m, Vector3::new(4.0, 0.0, 5.0));
        assert_eq!(body.pose().heading_rad, 0.5);
        assert_eq!(body.distance_travelled_m(), 5.0);
    }
}
