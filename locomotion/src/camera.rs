/*!
Orbit camera rig.

The rig follows a focus target with a dead-zone and exponential recentering,
keeps its up axis aligned with local gravity at the focus, and orbits using
pitch/yaw angles expressed in that gravity-aligned frame. When the player has
not touched the look input for a while, yaw drifts toward the heading the focus
is moving in. Finally a near-plane sized box is swept from the target toward the
camera so geometry in between pulls the camera closer.

Angle convention: pitch rotates about local X (positive looks down), yaw about
local Y (clockwise from +Z when seen from above); the orbit rotation is
`Ry(yaw) * Rx(pitch)` and the camera looks along its local +Z.
*/

use crate::{
    collision::{
        settings::DIST_EPS,
        types::{ObstructionCast, Quat, Vec2, Vec3},
    },
    config::{ConfigError, OrbitCameraConfig},
    gravity::GravityField,
    math::{delta_angle, from_to_rotation, heading_angle, move_towards_angle},
};

/// Look input magnitude (per axis) below which it is treated as idle.
const LOOK_INPUT_EPS: f32 = 0.001;
/// Squared focus movement below which automatic rotation does nothing.
const MIN_ALIGN_MOVEMENT_SQ: f32 = 0.0001;
/// Recentering is skipped for orbit distances at or below this.
const MIN_CENTERING_DISTANCE: f32 = 0.01;

/// World transform of the camera for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl CameraPose {
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::z()
    }
}

#[inline]
fn orbit_rotation(angles: Vec2) -> Quat {
    Quat::from_axis_angle(&Vec3::y_axis(), angles.y.to_radians())
        * Quat::from_axis_angle(&Vec3::x_axis(), angles.x.to_radians())
}

#[derive(Clone, Debug)]
pub struct OrbitCamera {
    config: OrbitCameraConfig,
    focus_point: Vec3,
    previous_focus_point: Vec3,
    /// (pitch, yaw) in degrees, relative to the gravity alignment.
    orbit_angles: Vec2,
    gravity_alignment: Quat,
    orbit_rotation: Quat,
    clock: f32,
    last_manual_rotation_time: f32,
}

impl OrbitCamera {
    /// Build a rig focused on `focus`. An inverted vertical range is repaired, other
    /// out-of-range values are rejected.
    pub fn new(config: OrbitCameraConfig, focus: Vec3) -> Result<Self, ConfigError> {
        let config = config.repaired();
        config.validate()?;
        let (pitch, yaw) = config.initial_angles;
        let orbit_angles = Vec2::new(pitch, yaw);
        Ok(Self {
            config,
            focus_point: focus,
            previous_focus_point: focus,
            orbit_angles,
            gravity_alignment: Quat::identity(),
            orbit_rotation: orbit_rotation(orbit_angles),
            clock: 0.0,
            last_manual_rotation_time: 0.0,
        })
    }

    pub fn config(&self) -> &OrbitCameraConfig {
        &self.config
    }

    pub fn focus_point(&self) -> Vec3 {
        self.focus_point
    }

    pub fn orbit_angles(&self) -> Vec2 {
        self.orbit_angles
    }

    pub fn gravity_alignment(&self) -> Quat {
        self.gravity_alignment
    }

    /// Camera rotation: gravity alignment followed by the orbit.
    pub fn look_rotation(&self) -> Quat {
        self.gravity_alignment * self.orbit_rotation
    }

    /// Half size of the near clip rectangle (z is zero).
    pub fn half_extents(&self) -> Vec3 {
        let y = self.config.near_clip * (self.config.field_of_view * 0.5).to_radians().tan();
        Vec3::new(y * self.config.aspect, y, 0.0)
    }

    /// Advance the rig by one rendered frame and return the new camera pose.
    ///
    /// `look_input` is (pitch, yaw) axis input in `[-1, 1]`.
    pub fn update<G, O>(
        &mut self,
        focus_target: Vec3,
        look_input: Vec2,
        gravity: &G,
        obstruction: &O,
        dt: f32,
    ) -> CameraPose
    where
        G: GravityField + ?Sized,
        O: ObstructionCast + ?Sized,
    {
        let dt = dt.max(0.0);
        self.clock += dt;

        self.update_gravity_alignment(gravity);
        self.update_focus_point(focus_target, dt);
        if self.manual_rotation(look_input, dt) || self.automatic_rotation(dt) {
            self.constrain_angles();
            self.orbit_rotation = orbit_rotation(self.orbit_angles);
        }

        let rotation = self.look_rotation();
        let look_direction = rotation * Vec3::z();
        let mut position = self.focus_point - look_direction * self.config.distance;

        let rect_offset = look_direction * self.config.near_clip;
        let rect_position = position + rect_offset;
        let cast_line = rect_position - focus_target;
        let cast_distance = cast_line.norm();
        if cast_distance > DIST_EPS {
            let cast_direction = cast_line / cast_distance;
            if let Some(hit) = obstruction.cast_box(
                focus_target,
                self.half_extents(),
                rotation,
                cast_direction,
                cast_distance,
                self.config.obstruction_mask,
            ) {
                log::trace!("camera obstructed at {}m", hit.distance);
                position = focus_target + cast_direction * hit.distance - rect_offset;
            }
        }

        CameraPose { position, rotation }
    }

    /// Rotate the alignment so its up matches gravity's up at the focus point.
    ///
    /// Incremental: the previous alignment is rotated, never rebuilt, so yaw is kept
    /// when walking around a planet. No-op without gravity.
    fn update_gravity_alignment<G>(&mut self, gravity: &G)
    where
        G: GravityField + ?Sized,
    {
        let Some(up) = gravity.up_axis(self.focus_point) else {
            return;
        };
        let current_up = self.gravity_alignment * Vec3::y();
        let mut alignment = from_to_rotation(current_up, up) * self.gravity_alignment;
        // Composition accumulates rounding; keep the quaternion unit length.
        alignment.renormalize();
        self.gravity_alignment = alignment;
    }

    fn update_focus_point(&mut self, target: Vec3, dt: f32) {
        self.previous_focus_point = self.focus_point;
        let radius = self.config.focus_radius;
        if radius <= 0.0 {
            self.focus_point = target;
            return;
        }

        let mut t = 1.0;
        if self.config.distance > MIN_CENTERING_DISTANCE && self.config.focus_centering > 0.0 {
            t = (1.0 - self.config.focus_centering).powf(dt);
        }
        let distance = (self.focus_point - target).norm();
        if distance > radius {
            t = f32::min(t, radius / distance);
        }
        self.focus_point = target.lerp(&self.focus_point, t);
    }

    fn manual_rotation(&mut self, input: Vec2, dt: f32) -> bool {
        if input.x.abs() <= LOOK_INPUT_EPS && input.y.abs() <= LOOK_INPUT_EPS {
            return false;
        }
        self.orbit_angles += input * self.config.rotation_speed * dt;
        self.last_manual_rotation_time = self.clock;
        true
    }

    /// Drift yaw toward the focus movement heading.
    ///
    /// Notes
    /// - Waits `align_delay` seconds after the last manual rotation.
    /// - Rotation speed scales with `min(dt, movement^2)`, so slow drifts turn slowly.
    /// - Within `align_smooth_range` of the heading (or of its opposite) the rate is
    ///   ramped down linearly, which avoids snapping when backing toward the camera.
    fn automatic_rotation(&mut self, dt: f32) -> bool {
        if self.clock - self.last_manual_rotation_time < self.config.align_delay {
            return false;
        }

        let aligned_delta =
            self.gravity_alignment.inverse() * (self.focus_point - self.previous_focus_point);
        let movement = Vec2::new(aligned_delta.x, aligned_delta.z);
        let movement_sq = movement.norm_squared();
        if movement_sq < MIN_ALIGN_MOVEMENT_SQ {
            return false;
        }

        let heading = heading_angle(movement / movement_sq.sqrt());
        let mut rotation_change = self.config.rotation_speed * dt.min(movement_sq);
        let delta_abs = delta_angle(self.orbit_angles.y, heading).abs();
        let smooth = self.config.align_smooth_range;
        if delta_abs < smooth {
            rotation_change *= delta_abs / smooth;
        } else if 180.0 - delta_abs < smooth {
            rotation_change *= (180.0 - delta_abs) / smooth;
        }
        self.orbit_angles.y = move_towards_angle(self.orbit_angles.y, heading, rotation_change);
        true
    }

    fn constrain_angles(&mut self) {
        self.orbit_angles.x = self
            .orbit_angles
            .x
            .clamp(self.config.min_vertical_angle, self.config.max_vertical_angle);
        let yaw = self.orbit_angles.y.rem_euclid(360.0);
        // rem_euclid can round a tiny negative up to exactly 360.
        self.orbit_angles.y = if yaw >= 360.0 { 0.0 } else { yaw };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        collision::types::{CastHit, EmptyScene},
        gravity::{GravitySphere, UniformGravity},
        layers::LayerMask,
    };
    use approx::assert_relative_eq;
    use std::cell::Cell;

    fn rig(config: OrbitCameraConfig) -> OrbitCamera {
        OrbitCamera::new(config, Vec3::zeros()).unwrap()
    }

    fn idle(cam: &mut OrbitCamera, target: Vec3, dt: f32) -> CameraPose {
        cam.update(target, Vec2::zeros(), &UniformGravity::earth(), &EmptyScene, dt)
    }

    /// Obstruction reporting a hit at a fixed distance and recording the last mask used.
    struct Wall {
        distance: f32,
        mask: Cell<Option<LayerMask>>,
    }

    impl ObstructionCast for Wall {
        fn cast_box(
            &self,
            _: Vec3,
            _: Vec3,
            _: Quat,
            _: Vec3,
            max_distance: f32,
            mask: LayerMask,
        ) -> Option<CastHit> {
            self.mask.set(Some(mask));
            (self.distance <= max_distance).then_some(CastHit {
                distance: self.distance,
            })
        }
    }

    #[test]
    fn initial_pose_orbits_behind_and_above() {
        let mut cam = rig(OrbitCameraConfig::default());
        let pose = idle(&mut cam, Vec3::zeros(), 0.0);
        let s = 45f32.to_radians().sin();
        assert_relative_eq!(pose.forward(), Vec3::new(0.0, -s, s), epsilon = 1.0e-5);
        assert_relative_eq!(pose.position, Vec3::new(0.0, 5.0 * s, -5.0 * s), epsilon = 1.0e-4);
    }

    #[test]
    fn focus_stays_within_radius_of_target() {
        let mut cam = rig(OrbitCameraConfig::default());
        idle(&mut cam, Vec3::new(10.0, 0.0, 0.0), 0.016);
        assert_relative_eq!(cam.focus_point(), Vec3::new(9.0, 0.0, 0.0), epsilon = 1.0e-4);
    }

    #[test]
    fn focus_recenters_exponentially_inside_radius() {
        let mut cam = rig(OrbitCameraConfig::default());
        idle(&mut cam, Vec3::new(0.5, 0.0, 0.0), 1.0);
        assert_relative_eq!(cam.focus_point().x, 0.25, epsilon = 1.0e-5);
    }

    #[test]
    fn zero_focus_radius_snaps_to_target() {
        let cfg = OrbitCameraConfig {
            focus_radius: 0.0,
            ..OrbitCameraConfig::default()
        };
        let mut cam = rig(cfg);
        let target = Vec3::new(3.0, 1.0, -2.0);
        idle(&mut cam, target, 0.016);
        assert_eq!(cam.focus_point(), target);
    }

    #[test]
    fn manual_rotation_clamps_pitch_and_wraps_yaw() {
        let mut cam = rig(OrbitCameraConfig::default());
        let g = UniformGravity::earth();

        cam.update(Vec3::zeros(), Vec2::new(0.0, -1.0), &g, &EmptyScene, 0.1);
        assert_relative_eq!(cam.orbit_angles().y, 351.0, epsilon = 1.0e-3);

        cam.update(Vec3::zeros(), Vec2::new(1.0, 0.0), &g, &EmptyScene, 1.0);
        assert_relative_eq!(cam.orbit_angles().x, 60.0);

        // Tiny input is ignored.
        cam.update(Vec3::zeros(), Vec2::new(0.0005, 0.0), &g, &EmptyScene, 1.0);
        assert_relative_eq!(cam.orbit_angles().x, 60.0);
    }

    #[test]
    fn automatic_rotation_turns_toward_movement_heading() {
        let cfg = OrbitCameraConfig {
            focus_radius: 0.0,
            align_delay: 0.0,
            ..OrbitCameraConfig::default()
        };
        let mut cam = rig(cfg);
        // Heading 90 degrees: outside both damping windows, full rate.
        idle(&mut cam, Vec3::new(0.5, 0.0, 0.0), 0.1);
        assert_relative_eq!(cam.orbit_angles().y, 9.0, epsilon = 1.0e-3);
    }

    #[test]
    fn automatic_rotation_is_damped_near_the_heading() {
        let cfg = OrbitCameraConfig {
            focus_radius: 0.0,
            align_delay: 0.0,
            ..OrbitCameraConfig::default()
        };
        let mut cam = rig(cfg);
        let dir = Vec3::new(30f32.to_radians().sin(), 0.0, 30f32.to_radians().cos());
        idle(&mut cam, dir * 0.5, 0.1);
        // 90 deg/s * 0.1 s, scaled by 30/45.
        assert_relative_eq!(cam.orbit_angles().y, 6.0, epsilon = 1.0e-3);
    }

    #[test]
    fn automatic_rotation_waits_for_align_delay() {
        let cfg = OrbitCameraConfig {
            focus_radius: 0.0,
            ..OrbitCameraConfig::default()
        };
        let mut cam = rig(cfg);
        let g = UniformGravity::earth();
        cam.update(Vec3::zeros(), Vec2::new(0.0, 1.0), &g, &EmptyScene, 0.1);
        let yaw = cam.orbit_angles().y;

        idle(&mut cam, Vec3::new(1.0, 0.0, 0.0), 0.1);
        assert_relative_eq!(cam.orbit_angles().y, yaw);

        // Tiny movement never rotates, even after the delay.
        idle(&mut cam, Vec3::new(1.0, 0.0, 0.0), 10.0);
        idle(&mut cam, Vec3::new(1.005, 0.0, 0.0), 0.1);
        assert_relative_eq!(cam.orbit_angles().y, yaw);
    }

    #[test]
    fn alignment_follows_gravity_up() {
        let mut cam = rig(OrbitCameraConfig::default());
        let sideways = UniformGravity(Vec3::new(-9.81, 0.0, 0.0));
        cam.update(Vec3::zeros(), Vec2::zeros(), &sideways, &EmptyScene, 0.016);
        assert_relative_eq!(cam.gravity_alignment() * Vec3::y(), Vec3::x(), epsilon = 1.0e-5);

        // Weightless keeps the last alignment.
        let before = cam.gravity_alignment();
        let none = UniformGravity(Vec3::zeros());
        cam.update(Vec3::zeros(), Vec2::zeros(), &none, &EmptyScene, 0.016);
        assert_eq!(cam.gravity_alignment(), before);
    }

    #[test]
    fn alignment_stays_unit_length_around_a_planet() {
        let mut cam = rig(OrbitCameraConfig::default());
        let planet = GravitySphere::planet(Vec3::zeros(), 9.81, 10.0, 15.0);
        for i in 0..20_000 {
            let a = i as f32 * 0.013;
            let target = Vec3::new(a.cos() * 10.0, (a * 0.7).sin() * 10.0, a.sin() * 10.0);
            cam.update(target, Vec2::zeros(), &planet, &EmptyScene, 0.016);
        }
        let norm = cam.gravity_alignment().quaternion().norm();
        assert_relative_eq!(norm, 1.0, epsilon = 1.0e-5);
    }

    #[test]
    fn obstruction_pulls_camera_forward() {
        let cfg = OrbitCameraConfig::default();
        let mut cam = rig(cfg);
        let wall = Wall {
            distance: 1.0,
            mask: Cell::new(None),
        };
        let pose = cam.update(Vec3::zeros(), Vec2::zeros(), &UniformGravity::earth(), &wall, 0.0);
        assert_relative_eq!(pose.position.norm(), 1.0 + cfg.near_clip, epsilon = 1.0e-5);
        assert_eq!(wall.mask.get(), Some(cfg.obstruction_mask));
    }

    #[test]
    fn half_extents_match_near_plane() {
        let cam = rig(OrbitCameraConfig::default());
        let he = cam.half_extents();
        let y = 0.3 * 30f32.to_radians().tan();
        assert_relative_eq!(he, Vec3::new(y * 16.0 / 9.0, y, 0.0), epsilon = 1.0e-6);
    }

    #[test]
    fn inverted_vertical_range_is_repaired() {
        let cfg = OrbitCameraConfig {
            min_vertical_angle: 10.0,
            max_vertical_angle: 0.0,
            ..OrbitCameraConfig::default()
        };
        let cam = rig(cfg);
        assert_eq!(cam.config().max_vertical_angle, 10.0);

        let bad = OrbitCameraConfig {
            distance: 0.5,
            ..OrbitCameraConfig::default()
        };
        assert!(OrbitCamera::new(bad, Vec3::zeros()).is_err());
    }
}
