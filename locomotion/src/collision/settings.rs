/*!
Contact classification and snapping tolerances.

These constants centralize the fixed numbers used by contact evaluation,
ground snapping and the controller's step bookkeeping. Tunable gameplay
values live on `LocomotionConfig` instead.

Notes
- Distances are in meters, time in seconds, counters in fixed steps.
- Favor practical world-space tolerances over machine epsilon for robust behavior.
*/

/// Practical small length for normalization guards (meters).
/// Vectors shorter than this are never normalized.
pub const DIST_EPS: f32 = 1.0e-6;

/// Contacts whose normal points this far below the horizon are overhangs.
/// Anything with `up_dot > STEEP_MIN_UP_DOT` that is not ground counts as steep.
pub const STEEP_MIN_UP_DOT: f32 = -0.01;

/// Snapping is only attempted this many steps after losing ground.
pub const SNAP_MAX_STEPS_SINCE_GROUNDED: u32 = 1;

/// Snapping is suppressed while the last jump is this recent (steps, inclusive).
pub const SNAP_MIN_STEPS_SINCE_JUMP: u32 = 2;

/// Grounding only clears `jump_phase` once the last jump is older than this (steps).
pub const JUMP_PHASE_RESET_STEPS: u32 = 1;

/// Minimum number of steep contacts that may form a walkable notch.
pub const MIN_NOTCH_CONTACTS: u32 = 2;
