use std::f32::consts::PI;

use nalgebra as na;

use crate::collision::{
    settings::DIST_EPS,
    types::{Quat, Vec2, Vec3},
};

/// Move `current` toward `target` by at most `max_delta`, never overshooting.
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = target - current;
    if delta.abs() <= max_delta {
        return target;
    }
    current + delta.signum() * max_delta
}

/// Shortest signed difference between two angles in degrees, in `[-180, 180]`.
#[inline]
pub fn delta_angle(current: f32, target: f32) -> f32 {
    let mut delta = (target - current).rem_euclid(360.0);
    if delta > 180.0 {
        delta -= 360.0;
    }
    delta
}

/// Like [`move_towards`] but for angles in degrees, taking the short way around.
#[inline]
pub fn move_towards_angle(current: f32, target: f32, max_delta: f32) -> f32 {
    let delta = delta_angle(current, target);
    if -max_delta < delta && delta < max_delta {
        return target;
    }
    move_towards(current, current + delta, max_delta)
}

/// Clamp a 2D vector to at most `max_length`.
#[inline]
pub fn clamp_magnitude(v: Vec2, max_length: f32) -> Vec2 {
    let len_sq = v.norm_squared();
    if len_sq > max_length * max_length {
        return v * (max_length / len_sq.sqrt());
    }
    v
}

/// Remove the component of `v` along the unit `normal`.
#[inline]
pub fn project_on_plane(v: Vec3, normal: Vec3) -> Vec3 {
    v - normal * v.dot(&normal)
}

/// Project `direction` onto the plane and normalize it.
///
/// Returns zero when the direction is (nearly) parallel to the normal.
#[inline]
pub fn project_direction_on_plane(direction: Vec3, normal: Vec3) -> Vec3 {
    project_on_plane(direction, normal)
        .try_normalize(DIST_EPS)
        .unwrap_or_else(Vec3::zeros)
}

/// Shortest rotation taking direction `from` onto direction `to`.
///
/// Opposite directions rotate half a turn around any axis perpendicular to `from`.
/// Degenerate (zero) inputs yield the identity.
pub fn from_to_rotation(from: Vec3, to: Vec3) -> Quat {
    let (Some(from), Some(to)) = (from.try_normalize(DIST_EPS), to.try_normalize(DIST_EPS)) else {
        return Quat::identity();
    };
    if let Some(q) = Quat::rotation_between(&from, &to) {
        return q;
    }

    // Antiparallel: pick the world axis least aligned with `from` to build a perpendicular.
    let helper = if from.x.abs() < 0.9 { Vec3::x() } else { Vec3::z() };
    let axis = na::Unit::new_normalize(from.cross(&helper));
    Quat::from_axis_angle(&axis, PI)
}

/// Heading in degrees of a unit planar direction `(x, z)`, clockwise from +Z in `[0, 360)`.
#[inline]
pub fn heading_angle(direction: Vec2) -> f32 {
    let angle = direction.y.clamp(-1.0, 1.0).acos().to_degrees();
    if direction.x < 0.0 { 360.0 - angle } else { angle }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn move_towards_clamps_step_and_never_overshoots() {
        assert_eq!(move_towards(0.0, 5.0, 0.2), 0.2);
        assert_eq!(move_towards(0.0, -5.0, 0.2), -0.2);
        assert_eq!(move_towards(4.9, 5.0, 0.2), 5.0);
    }

    #[test]
    fn delta_angle_wraps_through_zero() {
        assert_relative_eq!(delta_angle(350.0, 10.0), 20.0);
        assert_relative_eq!(delta_angle(10.0, 350.0), -20.0);
        assert_relative_eq!(delta_angle(0.0, 180.0), 180.0);
    }

    #[test]
    fn move_towards_angle_takes_short_way() {
        assert_relative_eq!(move_towards_angle(350.0, 10.0, 5.0), 355.0);
        assert_relative_eq!(move_towards_angle(350.0, 10.0, 50.0), 10.0);
    }

    #[test]
    fn clamp_magnitude_only_shrinks() {
        let v = clamp_magnitude(Vec2::new(3.0, 4.0), 1.0);
        assert_relative_eq!(v.norm(), 1.0, epsilon = 1.0e-6);
        let w = clamp_magnitude(Vec2::new(0.3, 0.4), 1.0);
        assert_eq!(w, Vec2::new(0.3, 0.4));
    }

    #[test]
    fn from_to_rotation_handles_opposite_directions() {
        let q = from_to_rotation(Vec3::y(), -Vec3::y());
        assert_relative_eq!(q * Vec3::y(), -Vec3::y(), epsilon = 1.0e-5);

        let r = from_to_rotation(Vec3::y(), Vec3::x());
        assert_relative_eq!(r * Vec3::y(), Vec3::x(), epsilon = 1.0e-5);
    }

    #[test]
    fn heading_is_clockwise_from_forward() {
        assert_relative_eq!(heading_angle(Vec2::new(0.0, 1.0)), 0.0);
        assert_relative_eq!(heading_angle(Vec2::new(1.0, 0.0)), 90.0, epsilon = 1.0e-4);
        assert_relative_eq!(heading_angle(Vec2::new(-1.0, 0.0)), 270.0, epsilon = 1.0e-4);
    }
}
