//! Gravity fields queried at arbitrary world positions.
//!
//! The controller, camera rig and free bodies never assume a global "down".
//! They ask an injected [`GravityField`] at their own position every step, so
//! a test can pass a constant vector and a game can pass planets, walls with
//! gravity, or any closure.

use crate::collision::{settings::DIST_EPS, types::Vec3};

/// Source of gravitational acceleration (m/s^2) at a world position.
pub trait GravityField {
    fn gravity(&self, position: Vec3) -> Vec3;

    /// Normalized opposite of gravity, or `None` where there is no gravity.
    fn up_axis(&self, position: Vec3) -> Option<Vec3> {
        up_from_gravity(self.gravity(position))
    }
}

/// Normalized opposite of `gravity`, `None` for (near) zero gravity.
#[inline]
pub fn up_from_gravity(gravity: Vec3) -> Option<Vec3> {
    (-gravity).try_normalize(DIST_EPS)
}

impl<F> GravityField for F
where
    F: Fn(Vec3) -> Vec3,
{
    fn gravity(&self, position: Vec3) -> Vec3 {
        self(position)
    }
}

/// The same acceleration everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformGravity(pub Vec3);

impl UniformGravity {
    /// Earth-like gravity along -Y.
    pub fn earth() -> Self {
        Self(Vec3::new(0.0, -crate::constants::GRAVITY_MPS2, 0.0))
    }
}

impl Default for UniformGravity {
    fn default() -> Self {
        Self::earth()
    }
}

impl GravityField for UniformGravity {
    fn gravity(&self, _position: Vec3) -> Vec3 {
        self.0
    }
}

/// Pulls toward an infinite plane along its normal, fading out linearly up to `range`.
///
/// Below the plane the full strength applies.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GravityPlane {
    pub point: Vec3,
    /// Unit normal; "up" for bodies above the plane.
    pub normal: Vec3,
    /// Acceleration magnitude at the plane (m/s^2).
    pub strength: f32,
    /// Height above the plane where gravity reaches zero (meters).
    pub range: f32,
}

impl GravityField for GravityPlane {
    fn gravity(&self, position: Vec3) -> Vec3 {
        let distance = self.normal.dot(&(position - self.point));
        if distance > self.range {
            return Vec3::zeros();
        }
        let mut g = -self.strength;
        if distance > 0.0 {
            if self.range <= 0.0 {
                return Vec3::zeros();
            }
            g *= 1.0 - distance / self.range;
        }
        self.normal * g
    }
}

/// Pulls toward a center point.
///
/// Full strength between `inner_radius` and `outer_radius`, fading linearly to
/// zero at `inner_falloff_radius` (inside) and `outer_falloff_radius` (outside).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GravitySphere {
    pub center: Vec3,
    pub strength: f32,
    pub inner_falloff_radius: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
    pub outer_falloff_radius: f32,
}

impl GravitySphere {
    /// Planet-like sphere with no inner cavity.
    pub fn planet(center: Vec3, strength: f32, outer_radius: f32, outer_falloff_radius: f32) -> Self {
        Self {
            center,
            strength,
            inner_falloff_radius: 0.0,
            inner_radius: 0.0,
            outer_radius,
            outer_falloff_radius: outer_falloff_radius.max(outer_radius),
        }
    }
}

impl GravityField for GravitySphere {
    fn gravity(&self, position: Vec3) -> Vec3 {
        let to_center = self.center - position;
        let distance = to_center.norm();
        if distance > self.outer_falloff_radius || distance < self.inner_falloff_radius {
            return Vec3::zeros();
        }
        if distance <= DIST_EPS {
            return Vec3::zeros();
        }

        let mut g = self.strength / distance;
        if distance > self.outer_radius {
            let span = self.outer_falloff_radius - self.outer_radius;
            if span > 0.0 {
                g *= 1.0 - (distance - self.outer_radius) / span;
            }
        } else if distance < self.inner_radius {
            let span = self.inner_radius - self.inner_falloff_radius;
            if span > 0.0 {
                g *= 1.0 - (self.inner_radius - distance) / span;
            }
        }
        to_center * g
    }
}

/// One entry of a [`GravitySources`] set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GravitySource {
    Uniform(UniformGravity),
    Plane(GravityPlane),
    Sphere(GravitySphere),
}

impl GravityField for GravitySource {
    fn gravity(&self, position: Vec3) -> Vec3 {
        match self {
            GravitySource::Uniform(s) => s.gravity(position),
            GravitySource::Plane(s) => s.gravity(position),
            GravitySource::Sphere(s) => s.gravity(position),
        }
    }
}

/// Sum of every registered source. Empty means weightless.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GravitySources {
    sources: Vec<GravitySource>,
}

impl GravitySources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, source: GravitySource) {
        self.sources.push(source);
    }

    pub fn with(mut self, source: GravitySource) -> Self {
        self.register(source);
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl GravityField for GravitySources {
    fn gravity(&self, position: Vec3) -> Vec3 {
        self.sources
            .iter()
            .fold(Vec3::zeros(), |acc, s| acc + s.gravity(position))
    }
}
