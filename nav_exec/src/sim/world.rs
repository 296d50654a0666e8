//! Simulated obstacle world

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use nalgebra::Vector3;
use noise::{NoiseFn, Perlin, Seedable};

use super::{PerlinFieldParams, SimError, SimParams};
use crate::map::{LayerMask, ObstacleDetector};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of layers an obstacle may sit on.
const NUM_LAYERS: u32 = 32;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A circular obstacle in the world.
#[derive(Debug, Clone)]
pub struct SimObstacle {
    pub centre_m: Vector3<f64>,
    pub radius_m: f64,
    pub layer: u32,
    pub velocity_ms: Vector3<f64>,
}

pub struct SimWorld {
    obstacles: Vec<SimObstacle>,

    field: Option<(Perlin, PerlinFieldParams)>,

    bounds_min_m: [f64; 2],
    bounds_max_m: [f64; 2],

    time_s: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimWorld {
    /// Create the world described by the parameters.
    pub fn new(params: &SimParams) -> Result<Self, SimError> {
        let (min, max) = (params.bounds_min_m, params.bounds_max_m);
        if !(min[0] < max[0] && min[1] < max[1]) {
            return Err(SimError::EmptyBounds(min, max));
        }

        if !(params.duration_s > 0.0) {
            return Err(SimError::NonPositiveDuration(params.duration_s));
        }

        let mut obstacles = Vec::with_capacity(params.obstacles.len());
        for (i, o) in params.obstacles.iter().enumerate() {
            if !(o.radius_m >= 0.0) {
                return Err(SimError::NegativeRadius(i, o.radius_m));
            }
            if o.layer >= NUM_LAYERS {
                return Err(SimError::InvalidLayer(i, o.layer));
            }

            let velocity_ms = match o.velocity_ms {
                Some(v) => Vector3::new(v[0], 0.0, v[1]),
                None => Vector3::zeros(),
            };

            obstacles.push(SimObstacle {
                centre_m: o.centre_m,
                radius_m: o.radius_m,
                layer: o.layer,
                velocity_ms,
            });
        }

        let field = match params.perlin_field {
            Some(ref f) => {
                if f.layer >= NUM_LAYERS {
                    return Err(SimError::InvalidLayer(obstacles.len(), f.layer));
                }
                Some((Perlin::new().set_seed(f.seed), f.clone()))
            }
            None => None,
        };

        debug!(
            "Created world with {} obstacles{}",
            obstacles.len(),
            if field.is_some() {
                " and a noise field"
            } else {
                ""
            }
        );

        Ok(Self {
            obstacles,
            field,
            bounds_min_m: min,
            bounds_max_m: max,
            time_s: 0.0,
        })
    }

    /// Advance the world by `dt_s`, moving obstacles and bouncing them off the world bounds.
    pub fn step(&mut self, dt_s: f64) {
        self.time_s += dt_s;

        let (min, max) = (self.bounds_min_m, self.bounds_max_m);

        for o in self.obstacles.iter_mut() {
            if o.velocity_ms == Vector3::zeros() {
                continue;
            }

            o.centre_m += o.velocity_ms * dt_s;

            bounce(&mut o.centre_m.x, &mut o.velocity_ms.x, min[0], max[0]);
            bounce(&mut o.centre_m.z, &mut o.velocity_ms.z, min[1], max[1]);
        }
    }

    pub fn obstacles(&self) -> &[SimObstacle] {
        &self.obstacles
    }

    pub fn time_s(&self) -> f64 {
        self.time_s
    }

    fn field_blocks(&self, position_m: &Vector3<f64>, layers: LayerMask) -> bool {
        match self.field {
            Some((ref perlin, ref params)) if layers.contains(params.layer) => {
                let value = perlin.get([
                    position_m.x * params.scale + params.offset[0],
                    position_m.z * params.scale + params.offset[1],
                ]);
                value > params.threshold
            }
            _ => false,
        }
    }
}

impl ObstacleDetector for SimWorld {
    /// Obstacles are vertical cylinders, so only the distance in the movement plane is checked.
    fn check_sphere(&self, position_m: &Vector3<f64>, radius_m: f64, layers: LayerMask) -> bool {
        let hit = self.obstacles.iter().any(|o| {
            let dx = o.centre_m.x - position_m.x;
            let dz = o.centre_m.z - position_m.z;
            layers.contains(o.layer) && (dx * dx + dz * dz).sqrt() <= o.radius_m + radius_m
        });

        hit || self.field_blocks(position_m, layers)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Reflect a coordinate and its velocity back inside `[min, max]`.
fn bounce(pos: &mut f64, vel: &mut f64, min: f64, max: f64) {
    if *pos < min {
        *pos = 2.0 * min - *pos;
        *vel = vel.abs();
    } else if *pos > max {
        *pos = 2.0 * max - *pos;
        *vel = -vel.abs();
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::sim::ObstacleParams;

    fn world(obstacles: Vec<ObstacleParams>) -> SimWorld {
        SimWorld::new(&SimParams {
            obstacles,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_check_sphere() {
        let w = world(vec![
            ObstacleParams {
                centre_m: Vector3::new(2.0, 0.0, 0.0),
                radius_m: 1.0,
                ..Default::default()
            },
            ObstacleParams {
                centre_m: Vector3::new(-2.0, 0.0, 0.0),
                radius_m: 1.0,
                layer: 3,
                ..Default::default()
            },
        ]);

        // Overlap with radius, height ignored
        assert!(w.check_sphere(&Vector3::new(0.6, 5.0, 0.0), 0.5, LayerMask::ALL));
        assert!(!w.check_sphere(&Vector3::new(0.4, 0.0, 0.0), 0.5, LayerMask::ALL));

        // Layer filtering
        let p = Vector3::new(-2.0, 0.0, 0.0);
        assert!(w.check_sphere(&p, 0.5, LayerMask::ALL));
        assert!(w.check_sphere(&p, 0.5, LayerMask::layer(3)));
        assert!(!w.check_sphere(&p, 0.5, LayerMask::layer(0)));
        assert!(!w.check_sphere(&p, 0.5, LayerMask::NONE));
    }

    #[test]
    fn test_moving_obstacle_bounces() {
        let mut w = world(vec![ObstacleParams {
            centre_m: Vector3::new(9.0, 0.0, 0.0),
            radius_m: 0.5,
            velocity_ms: Some([2.0, 0.0]),
            ..Default::default()
        }]);

        w.step(1.0);

        let o = &w.obstacles()[0];
        assert_eq!(o.centre_m.x, 9.0);
        assert_eq!(o.velocity_ms.x, -2.0);
        assert_eq!(w.time_s(), 1.0);
    }

    #[test]
    fn test_invalid_world() {
        let params = SimParams {
            obstacles: vec![ObstacleParams {
                radius_m: -1.0,
                ..Default::default()
            }],
            ..Default::default()
        };
        assert_eq!(
            SimWorld::new(&params).err(),
            Some(SimError::NegativeRadius(0, -1.0))
        );

        let params = SimParams {
            bounds_min_m: [0.0, 0.0],
            bounds_max_m: [0.0, 5.0],
            ..Default::default()
        };
        assert!(matches!(
            SimWorld::new(&params),
            Err(SimError::EmptyBounds(..))
        ));
    }

    #[test]
    fn test_noise_field_is_seeded() {
        let make = |seed| {
            SimWorld::new(&SimParams {
                perlin_field: Some(PerlinFieldParams {
                    seed,
                    scale: 0.37,
                    offset: [0.5, 0.5],
                    threshold: 0.0,
                    layer: 1,
                }),
                ..Default::default()
            })
            .unwrap()
        };

        let a = make(7);
        let b = make(7);

        let mut num_blocked = 0;
        for x in -10..10 {
            for z in -10..10 {
                let p = Vector3::new(x as f64, 0.0, z as f64);
                let hit = a.check_sphere(&p, 0.5, LayerMask::ALL);
                assert_eq!(hit, b.check_sphere(&p, 0.5, LayerMask::ALL));
                assert!(!a.check_sphere(&p, 0.5, LayerMask::layer(0)));
                if hit {
                    num_blocked += 1;
                }
            }
        }

        // Some but not all of the area is covered
        assert!(num_blocked > 0);
        assert!(num_blocked < 400);
    }
}
