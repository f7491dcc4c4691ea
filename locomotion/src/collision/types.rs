/*!
Core collision types and math aliases shared by the collision submodules.

This module intentionally contains no algorithms. It defines the data types
exchanged between:
- the physics engine (contact manifolds reported each step)
- scene queries (ground probe ray, camera obstruction box cast)
- the contact accumulator and ground snapping
- the locomotion controller and camera rig

Notes
- Normals always point away from the surface, toward the agent.
- Distances are in meters along the (unit) cast direction.
*/

use nalgebra as na;

use crate::layers::{LayerMask, SurfaceLayer};

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Vec2 = na::Vector2<f32>;
pub type Quat = na::UnitQuaternion<f32>;

/// All contact points one collider pair reported during a physics step.
///
/// The physics engine may report several manifolds per step for the same agent;
/// each one is fed to the controller separately.
#[derive(Clone, Debug, PartialEq)]
pub struct ContactManifold {
    /// Layer of the surface the agent touched.
    pub layer: SurfaceLayer,
    /// World-space surface normal of every contact point.
    pub normals: Vec<Vec3>,
}

impl ContactManifold {
    #[inline]
    pub fn new(layer: SurfaceLayer, normals: Vec<Vec3>) -> Self {
        Self { layer, normals }
    }

    /// Convenience for a manifold with a single contact point.
    #[inline]
    pub fn single(layer: SurfaceLayer, normal: Vec3) -> Self {
        Self {
            layer,
            normals: vec![normal],
        }
    }
}

/// Result of a ray probe against the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeHit {
    /// World-space surface normal at the hit point.
    pub normal: Vec3,
    /// Layer of the collider that was hit.
    pub layer: SurfaceLayer,
    /// Distance along the ray (meters).
    pub distance: f32,
}

/// Result of a shape cast against the scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CastHit {
    /// Distance travelled by the shape before touching (meters).
    pub distance: f32,
}

/// Mutable view of the agent's rigid body for one fixed step.
///
/// The host loop fills this from its physics body, hands it to
/// `LocomotionController::tick_fixed`, then writes `velocity` back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyState {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl BodyState {
    #[inline]
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self { position, velocity }
    }

    #[inline]
    pub fn at_rest(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::zeros(),
        }
    }
}

/// Downward ray probe used for ground snapping.
pub trait GroundProbe {
    /// Cast a ray from `origin` along the unit `direction` up to `max_distance`,
    /// considering only colliders whose layer is in `mask`.
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<ProbeHit>;
}

/// Box cast used by the camera rig to keep its near plane out of geometry.
pub trait ObstructionCast {
    /// Sweep an oriented box with `half_extents` from `center` along the unit
    /// `direction` up to `max_distance`, considering only layers in `mask`.
    fn cast_box(
        &self,
        center: Vec3,
        half_extents: Vec3,
        orientation: Quat,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<CastHit>;
}

/// A scene with nothing in it. Every query misses.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmptyScene;

impl GroundProbe for EmptyScene {
    fn cast_ray(&self, _: Vec3, _: Vec3, _: f32, _: LayerMask) -> Option<ProbeHit> {
        None
    }
}

impl ObstructionCast for EmptyScene {
    fn cast_box(&self, _: Vec3, _: Vec3, _: Quat, _: Vec3, _: f32, _: LayerMask) -> Option<CastHit> {
        None
    }
}
