//! Per-agent locomotion state machine.
//!
//! The host loop drives a [`LocomotionController`] with three calls:
//! - [`LocomotionController::sample_input`] once per rendered frame,
//! - [`LocomotionController::on_contact`] once per contact manifold the physics
//!   engine reported for the agent during the last step (zero or more times),
//! - [`LocomotionController::tick_fixed`] once per fixed step, after the contacts.
//!
//! All mutation of velocity and contact state happens inside `tick_fixed`; the
//! contact accumulators are emptied at its very end, after they were used.

use crate::{
    collision::{
        contacts::ContactAccumulator,
        ground::{SnapQuery, snap_to_ground},
        settings::{
            DIST_EPS, JUMP_PHASE_RESET_STEPS, SNAP_MAX_STEPS_SINCE_GROUNDED,
            SNAP_MIN_STEPS_SINCE_JUMP,
        },
        types::{BodyState, ContactManifold, GroundProbe, Quat, Vec3},
    },
    config::{ConfigError, LocomotionConfig, SlopeThresholds},
    gravity::{GravityField, up_from_gravity},
    input::{InputLatch, InputSample},
    math::{move_towards, project_direction_on_plane},
};

/// What decided the ground state of a fixed step. Exactly one per step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroundSource {
    /// At least one walkable contact was reported.
    Contact,
    /// No contact, but the downward probe found walkable ground to stick to.
    Snap,
    /// Several steep contacts averaged into a walkable surface.
    SteepNotch,
    /// No walkable support this step; up is used as the contact normal.
    Airborne,
}

impl GroundSource {
    #[inline]
    pub fn is_grounded(self) -> bool {
        self != GroundSource::Airborne
    }
}

/// Which branch a jump took.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpKind {
    /// Off walkable ground, along the contact normal.
    Ground,
    /// Off a steep surface, along its normal. Restores air jumps.
    Wall,
    /// Mid-air, consuming one air jump.
    Air,
}

/// Output of a single `tick_fixed()` call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickOutcome {
    pub ground: GroundSource,
    /// The jump performed this step, if a request was pending and allowed.
    pub jump: Option<JumpKind>,
    /// Velocity written back to the body.
    pub velocity: Vec3,
}

/// Grounding, velocity shaping and jumping for one agent.
#[derive(Clone, Debug)]
pub struct LocomotionController {
    config: LocomotionConfig,
    thresholds: SlopeThresholds,
    velocity: Vec3,
    input: InputLatch,
    contacts: ContactAccumulator,
    /// Up at the body as of the last fixed step; classifies contacts between steps.
    up_axis: Vec3,
    input_space: Option<Quat>,
    right_axis: Vec3,
    forward_axis: Vec3,
    jump_phase: u32,
    steps_since_last_grounded: u32,
    steps_since_last_jump: u32,
}

impl LocomotionController {
    pub fn new(config: LocomotionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            thresholds: config.slope_thresholds(),
            config,
            velocity: Vec3::zeros(),
            input: InputLatch::default(),
            contacts: ContactAccumulator::default(),
            up_axis: Vec3::y(),
            input_space: None,
            right_axis: Vec3::x(),
            forward_axis: Vec3::z(),
            jump_phase: 0,
            steps_since_last_grounded: 0,
            steps_since_last_jump: 0,
        })
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn desired_velocity(&self) -> Vec3 {
        self.input.desired_velocity
    }

    pub fn desired_jump(&self) -> bool {
        self.input.desired_jump
    }

    pub fn up_axis(&self) -> Vec3 {
        self.up_axis
    }

    pub fn contact_normal(&self) -> Vec3 {
        self.contacts.contact_normal
    }

    pub fn steep_normal(&self) -> Vec3 {
        self.contacts.steep_normal
    }

    pub fn on_ground(&self) -> bool {
        self.contacts.on_ground()
    }

    pub fn on_steep(&self) -> bool {
        self.contacts.on_steep()
    }

    pub fn jump_phase(&self) -> u32 {
        self.jump_phase
    }

    pub fn steps_since_last_grounded(&self) -> u32 {
        self.steps_since_last_grounded
    }

    pub fn steps_since_last_jump(&self) -> u32 {
        self.steps_since_last_jump
    }

    /// Latch a frame of input. Call at frame rate; jump presses accumulate until consumed.
    pub fn sample_input(&mut self, input: &InputSample) {
        self.input.sample(input, self.config.max_speed);
    }

    /// Orient movement input by `space` (typically the camera rotation).
    ///
    /// `None` uses the world X and Z axes as right and forward.
    pub fn set_input_space(&mut self, space: Option<Quat>) {
        self.input_space = space;
    }

    /// Accumulate one contact manifold reported by the physics engine.
    pub fn on_contact(&mut self, manifold: &ContactManifold) {
        let min_dot = self.thresholds.min_dot(manifold.layer, self.config.stairs_mask);
        self.contacts.evaluate(manifold, self.up_axis, min_dot);
    }

    /// Run one fixed step.
    ///
    /// Behavior
    /// - Reads `body.velocity`, refreshes up/gravity at `body.position`, advances step counters.
    /// - Decides the ground state: contact, else snap, else steep notch, else airborne.
    /// - Moves the velocity tangent to the contact plane toward the desired velocity.
    /// - Performs a pending jump if the current state allows one.
    /// - Adds field gravity (when `apply_gravity`) and writes the velocity back.
    /// - Clears the contact accumulators for the next step.
    pub fn tick_fixed<G, P>(
        &mut self,
        body: &mut BodyState,
        gravity: &G,
        probe: &P,
        dt: f32,
    ) -> TickOutcome
    where
        G: GravityField + ?Sized,
        P: GroundProbe + ?Sized,
    {
        let dt = dt.max(0.0);
        self.velocity = body.velocity;
        let g = gravity.gravity(body.position);
        // Weightless: keep the previous up so grounding stays meaningful.
        self.up_axis = up_from_gravity(g).unwrap_or(self.up_axis);
        self.refresh_input_axes();
        self.steps_since_last_grounded = self.steps_since_last_grounded.saturating_add(1);
        self.steps_since_last_jump = self.steps_since_last_jump.saturating_add(1);

        let ground = self.update_state(body.position, probe);
        self.adjust_velocity(ground.is_grounded(), dt);

        let jump = if self.input.desired_jump {
            self.jump(g)
        } else {
            None
        };

        if self.config.apply_gravity {
            self.velocity += g * dt;
        }
        body.velocity = self.velocity;

        log::trace!(
            "tick ground={ground:?} jump={jump:?} phase={} v={:?}",
            self.jump_phase,
            self.velocity
        );

        self.contacts.clear();

        TickOutcome {
            ground,
            jump,
            velocity: self.velocity,
        }
    }

    fn refresh_input_axes(&mut self) {
        match self.input_space {
            Some(space) => {
                self.right_axis = project_direction_on_plane(space * Vec3::x(), self.up_axis);
                self.forward_axis = project_direction_on_plane(space * Vec3::z(), self.up_axis);
            }
            None => {
                self.right_axis = Vec3::x();
                self.forward_axis = Vec3::z();
            }
        }
    }

    fn update_state<P>(&mut self, position: Vec3, probe: &P) -> GroundSource
    where
        P: GroundProbe + ?Sized,
    {
        let source = if self.contacts.on_ground() {
            GroundSource::Contact
        } else if self.snap_to_ground(position, probe) {
            GroundSource::Snap
        } else if self
            .contacts
            .promote_steep_notch(self.up_axis, self.thresholds.min_ground_dot)
        {
            log::debug!("steep contacts promoted to ground");
            GroundSource::SteepNotch
        } else {
            GroundSource::Airborne
        };

        if source.is_grounded() {
            self.steps_since_last_grounded = 0;
            // A jump taken last step must not be erased by still touching the ground.
            if self.steps_since_last_jump > JUMP_PHASE_RESET_STEPS {
                self.jump_phase = 0;
            }
            self.contacts.average_ground_normal();
        } else {
            self.contacts.contact_normal = self.up_axis;
        }
        source
    }

    fn snap_to_ground<P>(&mut self, position: Vec3, probe: &P) -> bool
    where
        P: GroundProbe + ?Sized,
    {
        if self.steps_since_last_grounded > SNAP_MAX_STEPS_SINCE_GROUNDED
            || self.steps_since_last_jump <= SNAP_MIN_STEPS_SINCE_JUMP
        {
            return false;
        }
        if self.velocity.norm() > self.config.max_snap_speed {
            return false;
        }

        let query = SnapQuery {
            position,
            velocity: self.velocity,
            up: self.up_axis,
            probe_distance: self.config.probe_distance,
            probe_mask: self.config.probe_mask,
            stairs_mask: self.config.stairs_mask,
            thresholds: self.thresholds,
        };
        let Some(snap) = snap_to_ground(probe, query) else {
            return false;
        };

        log::debug!("snapped to ground {:?} at {}m", snap.normal, snap.hit.distance);
        self.contacts.set_single_ground(snap.normal);
        self.velocity = snap.velocity;
        true
    }

    fn adjust_velocity(&mut self, grounded: bool, dt: f32) {
        let normal = self.contacts.contact_normal;
        let x_axis = project_direction_on_plane(self.right_axis, normal);
        let z_axis = project_direction_on_plane(self.forward_axis, normal);

        let current_x = self.velocity.dot(&x_axis);
        let current_z = self.velocity.dot(&z_axis);

        let acceleration = if grounded {
            self.config.max_acceleration
        } else {
            self.config.max_air_acceleration
        };
        let max_speed_change = acceleration * dt;

        let desired = self.input.desired_velocity;
        let new_x = move_towards(current_x, desired.x, max_speed_change);
        let new_z = move_towards(current_z, desired.z, max_speed_change);

        self.velocity += x_axis * (new_x - current_x) + z_axis * (new_z - current_z);
    }

    fn jump(&mut self, gravity: Vec3) -> Option<JumpKind> {
        // The request is consumed even when no jump is possible.
        self.input.take_jump();

        let (kind, mut direction) = if self.contacts.on_ground() {
            (JumpKind::Ground, self.contacts.contact_normal)
        } else if self.contacts.on_steep() {
            self.jump_phase = 0;
            (JumpKind::Wall, self.contacts.steep_normal)
        } else if self.config.max_air_jumps > 0 && self.jump_phase <= self.config.max_air_jumps {
            // Walking off a ledge spends the ground jump.
            if self.jump_phase == 0 {
                self.jump_phase = 1;
            }
            (JumpKind::Air, self.contacts.contact_normal)
        } else {
            log::debug!("jump request dropped, phase {}", self.jump_phase);
            return None;
        };

        self.steps_since_last_jump = 0;
        self.jump_phase += 1;

        let mut jump_speed = (-2.0 * gravity.dot(&self.up_axis) * self.config.jump_height)
            .max(0.0)
            .sqrt();
        if self.config.wall_jump {
            direction = (direction + self.up_axis)
                .try_normalize(DIST_EPS)
                .unwrap_or(direction);
        }
        let aligned_speed = self.velocity.dot(&direction);
        if aligned_speed > 0.0 {
            jump_speed = (jump_speed - aligned_speed).max(0.0);
        }
        self.velocity += direction * jump_speed;

        log::debug!("jump {kind:?} speed {jump_speed} phase {}", self.jump_phase);
        Some(kind)
    }
}
