//! Field gravity for free (non-agent) rigid bodies.
//!
//! Props that should fall toward planets or gravity walls cannot use the
//! engine's global gravity; a [`GravityBody`] is stepped once per fixed step and
//! tells the host what acceleration to apply.

use crate::{
    collision::types::Vec3,
    gravity::GravityField,
};

/// Squared speed (m^2/s^2) below which a body counts as floating.
const FLOAT_SPEED_SQ: f32 = 0.0001;
/// Seconds a body may float before gravity stops being applied.
const FLOAT_DELAY_LIMIT: f32 = 1.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GravityBody {
    /// Let a nearly motionless body drift to sleep instead of fighting the solver
    /// with gravity every step.
    pub float_to_sleep: bool,
    float_delay: f32,
}

impl GravityBody {
    pub fn new(float_to_sleep: bool) -> Self {
        Self {
            float_to_sleep,
            float_delay: 0.0,
        }
    }

    /// Seconds the body has been floating.
    pub fn float_delay(&self) -> f32 {
        self.float_delay
    }

    /// Gravity to apply this step as an acceleration, or `None` when the body should
    /// be left alone (asleep, or floating for at least a second).
    pub fn step<G>(
        &mut self,
        position: Vec3,
        velocity: Vec3,
        sleeping: bool,
        gravity: &G,
        dt: f32,
    ) -> Option<Vec3>
    where
        G: GravityField + ?Sized,
    {
        if self.float_to_sleep {
            if sleeping {
                self.float_delay = 0.0;
                return None;
            }
            if velocity.norm_squared() < FLOAT_SPEED_SQ {
                self.float_delay += dt;
                if self.float_delay >= FLOAT_DELAY_LIMIT {
                    return None;
                }
            } else {
                self.float_delay = 0.0;
            }
        }
        Some(gravity.gravity(position))
    }
}
