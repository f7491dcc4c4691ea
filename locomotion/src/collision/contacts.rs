use super::{
    settings::{DIST_EPS, MIN_NOTCH_CONTACTS, STEEP_MIN_UP_DOT},
    types::{ContactManifold, Vec3},
};

/// How a single contact normal was classified.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactClass {
    Ground,
    Steep,
    /// Ceilings and overhangs; discarded.
    Overhang,
}

/// Classify a contact normal against the local up axis.
///
/// `min_dot` is the ground threshold for the contacted layer. The comparison is
/// inclusive: a slope exactly at the limit is ground.
#[inline]
pub fn classify_normal(normal: Vec3, up: Vec3, min_dot: f32) -> ContactClass {
    let up_dot = up.dot(&normal);
    if up_dot >= min_dot {
        ContactClass::Ground
    } else if up_dot > STEEP_MIN_UP_DOT {
        ContactClass::Steep
    } else {
        ContactClass::Overhang
    }
}

/// Per-step sums of ground and steep contact normals.
///
/// Filled by every manifold the physics engine reports between two fixed steps
/// (any number, including zero) and emptied once at the end of the step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactAccumulator {
    pub contact_normal: Vec3,
    pub steep_normal: Vec3,
    pub ground_contact_count: u32,
    pub steep_contact_count: u32,
}

impl Default for ContactAccumulator {
    fn default() -> Self {
        Self {
            contact_normal: Vec3::zeros(),
            steep_normal: Vec3::zeros(),
            ground_contact_count: 0,
            steep_contact_count: 0,
        }
    }
}

impl ContactAccumulator {
    #[inline]
    pub fn on_ground(&self) -> bool {
        self.ground_contact_count > 0
    }

    #[inline]
    pub fn on_steep(&self) -> bool {
        self.steep_contact_count > 0
    }

    /// Accumulate every point of `manifold`. Overhang contacts are ignored.
    pub fn evaluate(&mut self, manifold: &ContactManifold, up: Vec3, min_dot: f32) {
        for normal in &manifold.normals {
            match classify_normal(*normal, up, min_dot) {
                ContactClass::Ground => {
                    self.ground_contact_count += 1;
                    self.contact_normal += normal;
                }
                ContactClass::Steep => {
                    self.steep_contact_count += 1;
                    self.steep_normal += normal;
                }
                ContactClass::Overhang => {}
            }
        }
    }

    /// Replace the ground sum with a single contact (used by ground snapping).
    pub fn set_single_ground(&mut self, normal: Vec3) {
        self.ground_contact_count = 1;
        self.contact_normal = normal;
    }

    /// Normalize the ground sum when several contacts contributed to it.
    pub fn average_ground_normal(&mut self) {
        if self.ground_contact_count > 1 {
            if let Some(n) = self.contact_normal.try_normalize(DIST_EPS) {
                self.contact_normal = n;
            }
        }
    }

    /// Treat two or more steep faces whose average is walkable as ground (a notch).
    ///
    /// A single steep contact is never promoted. Returns whether promotion happened.
    pub fn promote_steep_notch(&mut self, up: Vec3, min_ground_dot: f32) -> bool {
        if self.steep_contact_count < MIN_NOTCH_CONTACTS {
            return false;
        }
        let Some(steep) = self.steep_normal.try_normalize(DIST_EPS) else {
            return false;
        };
        self.steep_normal = steep;
        if up.dot(&steep) >= min_ground_dot {
            self.ground_contact_count += 1;
            self.contact_normal += steep;
            return true;
        }
        false
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::SurfaceLayer;
    use approx::assert_relative_eq;

    const COS_25: f32 = 0.906_307_8;

    fn wall(x: f32) -> Vec3 {
        Vec3::new(x, 0.0, 0.0)
    }

    #[test]
    fn classification_is_inclusive_at_threshold() {
        let n = Vec3::new(0.0, 0.5, 0.866_025_4);
        assert_eq!(classify_normal(n, Vec3::y(), n.y), ContactClass::Ground);
        assert_eq!(classify_normal(n, Vec3::y(), n.y + 1.0e-4), ContactClass::Steep);
    }

    #[test]
    fn near_horizontal_is_steep_and_overhang_is_dropped() {
        let mut acc = ContactAccumulator::default();
        let manifold = ContactManifold::new(
            SurfaceLayer::Default,
            vec![wall(1.0), Vec3::new(0.0, -0.005, 1.0).normalize(), -Vec3::y()],
        );
        acc.evaluate(&manifold, Vec3::y(), COS_25);
        assert_eq!(acc.steep_contact_count, 2);
        assert_eq!(acc.ground_contact_count, 0);
    }

    #[test]
    fn multiple_manifolds_accumulate() {
        let mut acc = ContactAccumulator::default();
        let flat = ContactManifold::single(SurfaceLayer::Default, Vec3::y());
        acc.evaluate(&flat, Vec3::y(), COS_25);
        acc.evaluate(&flat, Vec3::y(), COS_25);
        assert_eq!(acc.ground_contact_count, 2);
        acc.average_ground_normal();
        assert_relative_eq!(acc.contact_normal, Vec3::y());
    }

    #[test]
    fn single_steep_contact_is_never_promoted() {
        let mut acc = ContactAccumulator::default();
        // Would be walkable on its own average, but one face is ambiguous.
        acc.steep_contact_count = 1;
        acc.steep_normal = Vec3::y();
        assert!(!acc.promote_steep_notch(Vec3::y(), COS_25));
        assert_eq!(acc.ground_contact_count, 0);
    }

    #[test]
    fn opposing_steep_faces_form_a_walkable_notch() {
        let mut acc = ContactAccumulator::default();
        let left = Vec3::new(0.8, 0.6, 0.0);
        let right = Vec3::new(-0.8, 0.6, 0.0);
        let manifold = ContactManifold::new(SurfaceLayer::Default, vec![left, right]);
        acc.evaluate(&manifold, Vec3::y(), COS_25);
        assert_eq!(acc.steep_contact_count, 2);

        assert!(acc.promote_steep_notch(Vec3::y(), COS_25));
        assert!(acc.on_ground());
        assert_relative_eq!(acc.contact_normal, Vec3::y(), epsilon = 1.0e-6);
    }

    #[test]
    fn cancelling_steep_faces_are_guarded() {
        let mut acc = ContactAccumulator::default();
        let manifold = ContactManifold::new(SurfaceLayer::Default, vec![wall(1.0), wall(-1.0)]);
        acc.evaluate(&manifold, Vec3::y(), COS_25);
        assert!(!acc.promote_steep_notch(Vec3::y(), COS_25));
        assert!(!acc.on_ground());
    }

    #[test]
    fn clear_resets_everything() {
        let mut acc = ContactAccumulator::default();
        acc.evaluate(&ContactManifold::single(SurfaceLayer::Default, Vec3::y()), Vec3::y(), COS_25);
        acc.clear();
        assert_eq!(acc, ContactAccumulator::default());
    }
}
