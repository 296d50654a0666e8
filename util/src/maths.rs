//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Smallest smooth time accepted by [`smooth_damp`], avoids dividing by zero.
const MIN_SMOOTH_TIME: f64 = 1e-4;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Get the shortest signed angular distance from `from` to `to`, in the range `[-pi, pi)`.
pub fn delta_angle<T>(from: T, to: T) -> T
where
    T: Float,
{
    let pi = float::<T>(std::f64::consts::PI);
    let tau = float::<T>(std::f64::consts::TAU);

    rem_euclid(to - from + pi, tau) - pi
}

/// Move `current` towards `target` using a critically damped spring.
///
/// `velocity` is the rate of change of `current`, which is persisted between calls by the caller.
/// `smooth_time` is roughly the time it takes to reach the target. The output never overshoots
/// the target.
pub fn smooth_damp<T>(current: T, target: T, velocity: &mut T, smooth_time: T, dt: T) -> T
where
    T: Float,
{
    let smooth_time = smooth_time.max(float(MIN_SMOOTH_TIME));

    // Spring frequency and the pade approximation of exp(-omega * dt)
    let omega = float::<T>(2.0) / smooth_time;
    let x = omega * dt;
    let exp = T::one() / (T::one() + x + float::<T>(0.48) * x * x + float::<T>(0.235) * x * x * x);

    let change = current - target;
    let temp = (*velocity + omega * change) * dt;

    *velocity = (*velocity - omega * temp) * exp;
    let mut output = target + (change + temp) * exp;

    // Prevent overshooting
    if (target - current > T::zero()) == (output > target) {
        output = target;
        *velocity = if dt > T::zero() {
            (output - target) / dt
        } else {
            T::zero()
        };
    }

    output
}

/// Angular version of [`smooth_damp`], taking the shortest way round to the target angle.
///
/// Angles are in radians, the returned angle is not wrapped.
pub fn smooth_damp_angle<T>(current: T, target: T, velocity: &mut T, smooth_time: T, dt: T) -> T
where
    T: Float,
{
    let target = current + delta_angle(current, target);
    smooth_damp(current, target, velocity, smooth_time, dt)
}

/// Map an angle in radians into the range `[-pi, pi)`.
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float,
{
    delta_angle(T::zero(), angle)
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn float<T: Float>(value: f64) -> T {
    T::from(value).unwrap_or_else(T::nan)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::PI;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_delta_angle() {
        assert!(approx_eq(delta_angle(0.0, 1.0), 1.0));
        assert!(approx_eq(delta_angle(1.0, 0.0), -1.0));
        assert!(approx_eq(delta_angle(0.1, 2.0 * PI - 0.1), -0.2));
        assert!(approx_eq(delta_angle(2.0 * PI - 0.1, 0.1), 0.2));
        assert!(approx_eq(wrap_pi(3.0 * PI / 2.0), -PI / 2.0));
    }

    #[test]
    fn test_smooth_damp_converges_without_overshoot() {
        let mut value = 0.0;
        let mut vel = 0.0;
        let mut prev = value;

        for _ in 0..500 {
            value = smooth_damp(value, 1.0, &mut vel, 0.2, 0.02);
            assert!(value <= 1.0);
            assert!(value >= prev);
            prev = value;
        }

        assert!((value - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_smooth_damp_angle_takes_short_way() {
        let mut vel = 0.0;

        // From just above -pi towards just below pi the short way is to decrease
        let current = -PI + 0.1;
        let next = smooth_damp_angle(current, PI - 0.1, &mut vel, 0.1, 0.02);
        assert!(next < current);
        assert!(vel < 0.0);
    }
}
