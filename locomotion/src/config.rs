//! Tunable parameters for the controller and the camera rig.
//!
//! Both configs are plain values with `Default`s taken from [`crate::constants`].
//! They are validated once, when a controller or rig is built from them; the
//! per-tick code assumes well-formed values.

use thiserror::Error;

use crate::{
    constants::*,
    layers::{LayerMask, SurfaceLayer},
};

/// Largest accepted `max_air_jumps`.
pub const MAX_AIR_JUMPS_LIMIT: u32 = 5;

/// Errors raised while validating a configuration.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    #[error("max_air_jumps must be at most 5, got {0}")]
    TooManyAirJumps(u32),
}

fn check_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    // `contains` is false for NaN, so NaN is rejected too.
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

/// Locomotion tuning for one agent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocomotionConfig {
    /// Planar speed for a full movement input (m/s), 0..=100.
    pub max_speed: f32,
    /// Planar acceleration on ground (m/s^2), 0..=100.
    pub max_acceleration: f32,
    /// Planar acceleration in the air (m/s^2), 0..=100.
    pub max_air_acceleration: f32,
    /// Jump apex height (m), 0..=10.
    pub jump_height: f32,
    /// Extra jumps allowed while airborne, 0..=5.
    pub max_air_jumps: u32,
    /// Blend every jump direction halfway toward up.
    pub wall_jump: bool,
    /// Steepest walkable slope (degrees), 0..=90.
    pub max_ground_angle: f32,
    /// Steepest walkable slope on `stairs_mask` layers (degrees), 0..=90.
    pub max_stairs_angle: f32,
    /// Snapping is skipped above this speed (m/s), 0..=100.
    pub max_snap_speed: f32,
    /// Ground-snap probe length (m), >= 0.
    pub probe_distance: f32,
    /// Layers the ground-snap probe can hit.
    pub probe_mask: LayerMask,
    /// Layers classified with the stairs slope limit.
    pub stairs_mask: LayerMask,
    /// Add field gravity to the velocity every tick.
    ///
    /// Disable when the physics engine already integrates gravity for the body.
    pub apply_gravity: bool,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            max_speed: DEFAULT_MAX_SPEED,
            max_acceleration: DEFAULT_MAX_ACCELERATION,
            max_air_acceleration: DEFAULT_MAX_AIR_ACCELERATION,
            jump_height: DEFAULT_JUMP_HEIGHT,
            max_air_jumps: 0,
            wall_jump: false,
            max_ground_angle: DEFAULT_MAX_GROUND_ANGLE,
            max_stairs_angle: DEFAULT_MAX_STAIRS_ANGLE,
            max_snap_speed: DEFAULT_MAX_SNAP_SPEED,
            probe_distance: DEFAULT_PROBE_DISTANCE,
            probe_mask: LayerMask::all(),
            stairs_mask: LayerMask::only(&[SurfaceLayer::Stairs]),
            apply_gravity: true,
        }
    }
}

impl LocomotionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("max_speed", self.max_speed, 0.0, 100.0)?;
        check_range("max_acceleration", self.max_acceleration, 0.0, 100.0)?;
        check_range("max_air_acceleration", self.max_air_acceleration, 0.0, 100.0)?;
        check_range("jump_height", self.jump_height, 0.0, 10.0)?;
        if self.max_air_jumps > MAX_AIR_JUMPS_LIMIT {
            return Err(ConfigError::TooManyAirJumps(self.max_air_jumps));
        }
        check_range("max_ground_angle", self.max_ground_angle, 0.0, 90.0)?;
        check_range("max_stairs_angle", self.max_stairs_angle, 0.0, 90.0)?;
        check_range("max_snap_speed", self.max_snap_speed, 0.0, 100.0)?;
        check_range("probe_distance", self.probe_distance, 0.0, f32::MAX)?;
        Ok(())
    }

    /// Cosine thresholds derived from the slope angles.
    pub fn slope_thresholds(&self) -> SlopeThresholds {
        SlopeThresholds {
            min_ground_dot: self.max_ground_angle.to_radians().cos(),
            min_stairs_dot: self.max_stairs_angle.to_radians().cos(),
        }
    }
}

/// Minimum `normal · up` for a surface to count as ground.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlopeThresholds {
    pub min_ground_dot: f32,
    pub min_stairs_dot: f32,
}

impl SlopeThresholds {
    /// Threshold for a surface on `layer`.
    #[inline]
    pub fn min_dot(&self, layer: SurfaceLayer, stairs_mask: LayerMask) -> f32 {
        if stairs_mask.contains(layer) {
            self.min_stairs_dot
        } else {
            self.min_ground_dot
        }
    }
}

/// Orbit camera tuning.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrbitCameraConfig {
    /// Orbit distance (m), 1..=20.
    pub distance: f32,
    /// Dead-zone radius around the focus target (m), >= 0.
    pub focus_radius: f32,
    /// Fraction of the focus offset removed per second, 0..=1.
    pub focus_centering: f32,
    /// Degrees per second, 1..=360.
    pub rotation_speed: f32,
    /// Pitch limits (degrees), -89..=89.
    pub min_vertical_angle: f32,
    pub max_vertical_angle: f32,
    /// Seconds of no look input before automatic alignment, >= 0.
    pub align_delay: f32,
    /// Damping window around 0 and 180 degree heading deltas, 0..=90.
    pub align_smooth_range: f32,
    /// Layers that block the camera.
    pub obstruction_mask: LayerMask,
    /// Initial (pitch, yaw) in degrees.
    pub initial_angles: (f32, f32),
    pub near_clip: f32,
    /// Vertical field of view (degrees).
    pub field_of_view: f32,
    pub aspect: f32,
}

impl Default for OrbitCameraConfig {
    fn default() -> Self {
        Self {
            distance: DEFAULT_CAMERA_DISTANCE,
            focus_radius: DEFAULT_FOCUS_RADIUS,
            focus_centering: DEFAULT_FOCUS_CENTERING,
            rotation_speed: DEFAULT_ROTATION_SPEED,
            min_vertical_angle: -30.0,
            max_vertical_angle: 60.0,
            align_delay: DEFAULT_ALIGN_DELAY,
            align_smooth_range: DEFAULT_ALIGN_SMOOTH_RANGE,
            obstruction_mask: LayerMask::all().without(SurfaceLayer::Agent),
            initial_angles: (45.0, 0.0),
            near_clip: DEFAULT_NEAR_CLIP,
            field_of_view: DEFAULT_FIELD_OF_VIEW,
            aspect: DEFAULT_ASPECT,
        }
    }
}

impl OrbitCameraConfig {
    /// Range checks. An inverted vertical range is not an error; see [`Self::repaired`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("distance", self.distance, 1.0, 20.0)?;
        check_range("focus_radius", self.focus_radius, 0.0, f32::MAX)?;
        check_range("focus_centering", self.focus_centering, 0.0, 1.0)?;
        check_range("rotation_speed", self.rotation_speed, 1.0, 360.0)?;
        check_range("min_vertical_angle", self.min_vertical_angle, -89.0, 89.0)?;
        check_range("max_vertical_angle", self.max_vertical_angle, -89.0, 89.0)?;
        check_range("align_delay", self.align_delay, 0.0, f32::MAX)?;
        check_range("align_smooth_range", self.align_smooth_range, 0.0, 90.0)?;
        check_range("near_clip", self.near_clip, 0.0, f32::MAX)?;
        check_range("field_of_view", self.field_of_view, 0.0, 179.0)?;
        check_range("aspect", self.aspect, 0.0, f32::MAX)?;
        Ok(())
    }

    /// Copy with `max_vertical_angle` raised to `min_vertical_angle` if it was below it.
    #[must_use]
    pub fn repaired(mut self) -> Self {
        if self.max_vertical_angle < self.min_vertical_angle {
            log::warn!(
                "max_vertical_angle {} below min_vertical_angle {}, raising it",
                self.max_vertical_angle,
                self.min_vertical_angle
            );
            self.max_vertical_angle = self.min_vertical_angle;
        }
        self
    }
}
