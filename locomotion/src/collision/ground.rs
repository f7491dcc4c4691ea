use crate::{
    config::SlopeThresholds,
    layers::LayerMask,
};

use super::{
    settings::DIST_EPS,
    types::{GroundProbe, ProbeHit, Vec3},
};

/// Inputs of a single ground-snap attempt.
#[derive(Clone, Copy, Debug)]
pub struct SnapQuery {
    /// Probe origin (the body position).
    pub position: Vec3,
    pub velocity: Vec3,
    /// Local up axis; the probe is cast along `-up`.
    pub up: Vec3,
    pub probe_distance: f32,
    pub probe_mask: LayerMask,
    pub stairs_mask: LayerMask,
    pub thresholds: SlopeThresholds,
}

/// A successful snap.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundSnap {
    /// Surface normal of the ground that was found.
    pub normal: Vec3,
    /// Velocity redirected along the surface (same speed), or unchanged when
    /// the body was not moving away from it.
    pub velocity: Vec3,
    pub hit: ProbeHit,
}

/// Probe below the body for walkable ground and redirect velocity onto it.
///
/// Behavior
/// - Casts a ray from `position` along `-up` up to `probe_distance` against `probe_mask`.
/// - Rejects hits whose `normal · up` is below the hit layer's slope threshold
///   (exactly at the threshold is accepted).
/// - If the velocity points away from the surface, the normal component is removed and
///   the remainder is rescaled to the original speed.
///
/// Step-count and speed gating is the caller's job.
pub fn snap_to_ground<P>(probe: &P, query: SnapQuery) -> Option<GroundSnap>
where
    P: GroundProbe + ?Sized,
{
    let hit = probe.cast_ray(query.position, -query.up, query.probe_distance, query.probe_mask)?;

    let min_dot = query.thresholds.min_dot(hit.layer, query.stairs_mask);
    if query.up.dot(&hit.normal) < min_dot {
        return None;
    }

    let speed = query.velocity.norm();
    let dot = query.velocity.dot(&hit.normal);
    let velocity = if dot > 0.0 {
        // Moving straight off the surface has no tangent direction left to keep.
        (query.velocity - hit.normal * dot)
            .try_normalize(DIST_EPS)
            .map_or_else(Vec3::zeros, |dir| dir * speed)
    } else {
        query.velocity
    };

    Some(GroundSnap {
        normal: hit.normal,
        velocity,
        hit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{collision::types::EmptyScene, config::LocomotionConfig, layers::SurfaceLayer};
    use approx::assert_relative_eq;

    struct FixedProbe(ProbeHit);

    impl GroundProbe for FixedProbe {
        fn cast_ray(&self, _: Vec3, _: Vec3, max_distance: f32, mask: LayerMask) -> Option<ProbeHit> {
            (self.0.distance <= max_distance && mask.contains(self.0.layer)).then_some(self.0)
        }
    }

    fn query(velocity: Vec3) -> SnapQuery {
        let cfg = LocomotionConfig::default();
        SnapQuery {
            position: Vec3::new(0.0, 1.0, 0.0),
            velocity,
            up: Vec3::y(),
            probe_distance: cfg.probe_distance,
            probe_mask: cfg.probe_mask,
            stairs_mask: cfg.stairs_mask,
            thresholds: cfg.slope_thresholds(),
        }
    }

    fn hit(normal: Vec3, layer: SurfaceLayer) -> FixedProbe {
        FixedProbe(ProbeHit {
            normal,
            layer,
            distance: 0.6,
        })
    }

    #[test]
    fn nothing_below_means_no_snap() {
        assert!(snap_to_ground(&EmptyScene, query(Vec3::x())).is_none());
    }

    #[test]
    fn snap_preserves_speed_when_leaving_surface() {
        // Launched slightly upward off a flat floor (e.g. over a crest).
        let v = Vec3::new(4.0, 1.5, 0.0);
        let snap = snap_to_ground(&hit(Vec3::y(), SurfaceLayer::Default), query(v)).unwrap();
        assert_relative_eq!(snap.velocity.norm(), v.norm(), epsilon = 1.0e-5);
        assert_relative_eq!(snap.velocity.y, 0.0, epsilon = 1.0e-6);
    }

    #[test]
    fn velocity_into_surface_is_untouched() {
        let v = Vec3::new(4.0, -1.0, 0.0);
        let snap = snap_to_ground(&hit(Vec3::y(), SurfaceLayer::Default), query(v)).unwrap();
        assert_eq!(snap.velocity, v);
    }

    #[test]
    fn threshold_is_inclusive_and_layer_aware() {
        let q = query(Vec3::zeros());
        let at_limit = Vec3::new(
            (1.0 - q.thresholds.min_ground_dot * q.thresholds.min_ground_dot).sqrt(),
            q.thresholds.min_ground_dot,
            0.0,
        );
        assert!(snap_to_ground(&hit(at_limit, SurfaceLayer::Default), q).is_some());

        // 40 degrees: too steep for plain ground, fine for stairs.
        let forty = Vec3::new(40f32.to_radians().sin(), 40f32.to_radians().cos(), 0.0);
        assert!(snap_to_ground(&hit(forty, SurfaceLayer::Default), q).is_none());
        assert!(snap_to_ground(&hit(forty, SurfaceLayer::Stairs), q).is_some());
    }

    #[test]
    fn probe_mask_filters_layers() {
        let mut q = query(Vec3::zeros());
        q.probe_mask = LayerMask::all().without(SurfaceLayer::Detailed);
        assert!(snap_to_ground(&hit(Vec3::y(), SurfaceLayer::Detailed), q).is_none());
    }
}
