use crate::{
    collision::types::{Vec2, Vec3},
    math::clamp_magnitude,
};

/// One frame of player input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputSample {
    /// Movement axes (x = right, y = forward). Clamped to unit length when sampled.
    pub movement: Vec2,
    /// Camera look axes (x = pitch, y = yaw), raw per-frame values.
    pub look: Vec2,
    /// Jump button went down this frame.
    pub jump_pressed: bool,
}

impl Default for InputSample {
    fn default() -> Self {
        Self {
            movement: Vec2::zeros(),
            look: Vec2::zeros(),
            jump_pressed: false,
        }
    }
}

impl InputSample {
    pub fn moving(x: f32, y: f32) -> Self {
        Self {
            movement: Vec2::new(x, y),
            ..Self::default()
        }
    }

    pub fn jump() -> Self {
        Self {
            jump_pressed: true,
            ..Self::default()
        }
    }
}

/// Frame-rate input latched for the next fixed step.
///
/// Frames and fixed steps run at different cadences. The movement intent is simply
/// overwritten by the latest frame; a jump press is OR-latched so a press that
/// lands between two fixed steps is never dropped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputLatch {
    /// Desired planar velocity in input space (x = right, z = forward).
    pub desired_velocity: Vec3,
    pub desired_jump: bool,
}

impl Default for InputLatch {
    fn default() -> Self {
        Self {
            desired_velocity: Vec3::zeros(),
            desired_jump: false,
        }
    }
}

impl InputLatch {
    pub fn sample(&mut self, input: &InputSample, max_speed: f32) {
        self.desired_jump |= input.jump_pressed;
        let movement = clamp_magnitude(input.movement, 1.0);
        self.desired_velocity = Vec3::new(movement.x, 0.0, movement.y) * max_speed;
    }

    /// Take the pending jump request, clearing it.
    pub fn take_jump(&mut self) -> bool {
        std::mem::take(&mut self.desired_jump)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn jump_press_survives_later_frames() {
        let mut latch = InputLatch::default();
        latch.sample(&InputSample::jump(), 10.0);
        latch.sample(&InputSample::default(), 10.0);
        assert!(latch.desired_jump);
        assert!(latch.take_jump());
        assert!(!latch.desired_jump);
    }

    #[test]
    fn diagonal_input_is_clamped() {
        let mut latch = InputLatch::default();
        latch.sample(&InputSample::moving(1.0, 1.0), 10.0);
        assert_relative_eq!(latch.desired_velocity.norm(), 10.0, epsilon = 1.0e-4);
        assert_eq!(latch.desired_velocity.y, 0.0);
    }
}
