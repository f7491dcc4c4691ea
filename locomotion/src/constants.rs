//! Default tuning values.
//!
//! These are the values `LocomotionConfig::default()` and
//! `OrbitCameraConfig::default()` start from. Units are meters, seconds and
//! degrees unless noted.

/// Gravity magnitude in meters per second squared (positive value).
pub const GRAVITY_MPS2: f32 = 9.81;

/// Top planar speed requested by a full-tilt movement input (m/s).
pub const DEFAULT_MAX_SPEED: f32 = 10.0;

/// Planar acceleration while grounded (m/s^2).
pub const DEFAULT_MAX_ACCELERATION: f32 = 10.0;

/// Planar acceleration while airborne (m/s^2).
///
/// Convention:
/// - equal to ground acceleration = full air control (arcade / very floaty)
/// - 0.0 = no air control
pub const DEFAULT_MAX_AIR_ACCELERATION: f32 = 1.0;

/// Apex height of a jump from rest (meters).
pub const DEFAULT_JUMP_HEIGHT: f32 = 2.0;

/// Steepest slope still counted as ground (degrees).
pub const DEFAULT_MAX_GROUND_ANGLE: f32 = 25.0;

/// Steepest slope still counted as ground on stairs layers (degrees).
pub const DEFAULT_MAX_STAIRS_ANGLE: f32 = 50.0;

/// Above this speed the agent is allowed to fly off ledges instead of snapping (m/s).
pub const DEFAULT_MAX_SNAP_SPEED: f32 = 100.0;

/// Length of the downward ground-snap probe (meters).
pub const DEFAULT_PROBE_DISTANCE: f32 = 1.0;

/// Camera orbit distance from the focus point (meters).
pub const DEFAULT_CAMERA_DISTANCE: f32 = 5.0;

/// Camera dead-zone radius around the focus target (meters).
pub const DEFAULT_FOCUS_RADIUS: f32 = 1.0;

/// Fraction of the focus offset removed per second.
pub const DEFAULT_FOCUS_CENTERING: f32 = 0.5;

/// Manual and automatic orbit speed (degrees per second).
pub const DEFAULT_ROTATION_SPEED: f32 = 90.0;

/// Seconds without look input before the camera starts trailing the focus.
pub const DEFAULT_ALIGN_DELAY: f32 = 5.0;

/// Angular window near 0/180 degrees where automatic rotation is damped (degrees).
pub const DEFAULT_ALIGN_SMOOTH_RANGE: f32 = 45.0;

/// Near clip plane of the rendered camera (meters).
pub const DEFAULT_NEAR_CLIP: f32 = 0.3;

/// Vertical field of view of the rendered camera (degrees).
pub const DEFAULT_FIELD_OF_VIEW: f32 = 60.0;

/// Width over height of the rendered camera.
pub const DEFAULT_ASPECT: f32 = 16.0 / 9.0;
