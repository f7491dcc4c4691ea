//! Rapier-backed scene for the locomotion controller and camera rig.
//!
//! The scene owns a complete rapier3d world: static geometry built from
//! [`WorldStaticDef`]s, one dynamic sphere driven by a [`LocomotionController`],
//! and any number of free props pulled by field gravity through [`GravityBody`].
//! Rapier's own gravity is zero; every body gets its gravity from the injected
//! [`GravityField`].
//!
//! Layers
//! - Each collider stores its [`SurfaceLayer`] index in `user_data`.
//! - Ray and box queries filter on that layer with the caller's [`LayerMask`].
//!
//! Step order (see [`RapierScene::step`])
//! 1. Contacts the narrow phase found in the previous physics step go to `on_contact`.
//! 2. `tick_fixed` runs against the agent body, probing this scene for ground.
//! 3. Props receive field gravity.
//! 4. The physics pipeline advances by `dt`.

// Re-export Rapier so downstream crates can use Rapier types without depending on
// `rapier3d` directly.
pub use rapier3d;

use rapier3d::na::Translation3;
use rapier3d::parry::{query::ShapeCastOptions, shape::Cuboid};
use rapier3d::prelude::*;

use crate::{
    collision::types::{
        BodyState, CastHit, ContactManifold as AgentContact, GroundProbe, ObstructionCast,
        ProbeHit, Quat, Vec3,
    },
    controller::{LocomotionController, TickOutcome},
    gravity::GravityField,
    gravity_body::GravityBody,
    layers::{LayerMask, SurfaceLayer},
};

/// Contact points further apart than this are predicted, not touching.
const CONTACT_DIST_TOLERANCE: f32 = 0.01;
/// Smallest half extent of a swept box; a flat near-plane box still needs thickness.
const MIN_BOX_HALF_EXTENT: f32 = 1.0e-3;

/// Definition of an immutable world collider.
///
/// Conventions
/// - Units are meters.
/// - Rotation is a unit quaternion.
/// - For planes, the normal is pose-derived: `normal = rotation * +Y`.
#[derive(Clone, Debug)]
pub struct WorldStaticDef {
    /// Stable unique identifier; statics are inserted in `id` order.
    pub id: u32,
    pub translation: Vec3,
    pub rotation: Quat,
    pub shape: ColliderShapeDef,
    pub layer: SurfaceLayer,
}

/// Supported collider shapes.
#[derive(Clone, Debug)]
pub enum ColliderShapeDef {
    /// Infinite plane (half-space) through the pose translation.
    Plane,

    /// Oriented cuboid with given half-extents (meters).
    Cuboid { half_extents: Vec3 },

    /// Sphere/ball (meters).
    Sphere { radius: f32 },

    /// Y-aligned capsule (meters).
    CapsuleY { radius: f32, half_height: f32 },
}

#[inline]
fn layer_user_data(layer: SurfaceLayer) -> u128 {
    layer as u128
}

#[inline]
fn layer_of(collider: &Collider) -> SurfaceLayer {
    u8::try_from(collider.user_data)
        .ok()
        .and_then(SurfaceLayer::from_index)
        .unwrap_or_default()
}

/// Build a collider for `shape` on `layer`, with identity local transform.
pub fn collider_from_def(shape: &ColliderShapeDef, layer: SurfaceLayer) -> Collider {
    let builder = match shape {
        ColliderShapeDef::Plane => ColliderBuilder::halfspace(Vector::y_axis()),
        ColliderShapeDef::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
        ColliderShapeDef::Sphere { radius } => ColliderBuilder::ball(*radius),
        ColliderShapeDef::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),
    };
    builder.user_data(layer_user_data(layer)).build()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct AgentHandles {
    body: RigidBodyHandle,
    collider: ColliderHandle,
}

#[derive(Clone, Copy, Debug)]
struct Prop {
    body: RigidBodyHandle,
    gravity: GravityBody,
}

pub struct RapierScene {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
    islands: IslandManager,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    pipeline: PhysicsPipeline,
    params: IntegrationParameters,
    agent: Option<AgentHandles>,
    props: Vec<Prop>,
}

impl RapierScene {
    /// Build a scene from static collider definitions, stepped with a fixed `dt`.
    ///
    /// The input is sorted by `id` before insertion, so equal inputs build identical sets.
    pub fn build(mut defs: Vec<WorldStaticDef>, dt: f32) -> Self {
        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        for def in defs {
            let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);
            let rb_handle = bodies.insert(RigidBodyBuilder::fixed().pose(iso).build());
            colliders.insert_with_parent(
                collider_from_def(&def.shape, def.layer),
                rb_handle,
                &mut bodies,
            );
        }

        // Collision detection only, so queries work before the first physics step.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        CollisionPipeline::new().step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &(),
            &(),
        );

        log::debug!("built rapier scene with {} static colliders", colliders.len());

        Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
            islands: IslandManager::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            pipeline: PhysicsPipeline::new(),
            params: IntegrationParameters {
                dt,
                ..IntegrationParameters::default()
            },
            agent: None,
            props: Vec::new(),
        }
    }

    pub fn dt(&self) -> f32 {
        self.params.dt
    }

    /// Insert the controller-driven sphere, replacing any previous agent.
    ///
    /// The sphere is frictionless, never rotates and ignores rapier gravity; its
    /// velocity is owned by the controller.
    pub fn spawn_agent(&mut self, position: Vec3, radius: f32) -> RigidBodyHandle {
        if let Some(old) = self.agent.take() {
            log::warn!("replacing existing agent body");
            self.bodies.remove(
                old.body,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            );
        }

        let rb = RigidBodyBuilder::dynamic()
            .translation(position)
            .gravity_scale(0.0)
            .lock_rotations()
            .build();
        let body = self.bodies.insert(rb);
        let collider = ColliderBuilder::ball(radius)
            .friction(0.0)
            .friction_combine_rule(CoefficientCombineRule::Min)
            .user_data(layer_user_data(SurfaceLayer::Agent))
            .build();
        let collider = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);
        self.agent = Some(AgentHandles { body, collider });
        body
    }

    /// Insert a free dynamic body pulled by field gravity.
    pub fn spawn_prop(
        &mut self,
        shape: &ColliderShapeDef,
        position: Vec3,
        float_to_sleep: bool,
    ) -> RigidBodyHandle {
        let rb = RigidBodyBuilder::dynamic()
            .translation(position)
            .gravity_scale(0.0)
            .build();
        let body = self.bodies.insert(rb);
        self.colliders.insert_with_parent(
            collider_from_def(shape, SurfaceLayer::Default),
            body,
            &mut self.bodies,
        );
        self.props.push(Prop {
            body,
            gravity: GravityBody::new(float_to_sleep),
        });
        body
    }

    pub fn agent_body(&self) -> Option<RigidBodyHandle> {
        self.agent.map(|a| a.body)
    }

    /// Position and velocity of the agent body.
    pub fn agent_state(&self) -> Option<BodyState> {
        let rb = self.bodies.get(self.agent?.body)?;
        Some(BodyState::new(*rb.translation(), *rb.linvel()))
    }

    /// Contacts currently touching the agent, one manifold per rapier manifold.
    ///
    /// Normals point from the touched surface toward the agent.
    pub fn agent_contacts(&self) -> Vec<AgentContact> {
        let Some(agent) = self.agent else {
            return Vec::new();
        };

        let mut out = Vec::new();
        for pair in self.narrow_phase.contact_pairs_with(agent.collider) {
            // Rapier normals point from collider1 toward collider2.
            let (other, sign) = if pair.collider1 == agent.collider {
                (pair.collider2, -1.0)
            } else {
                (pair.collider1, 1.0)
            };
            let layer = self
                .colliders
                .get(other)
                .map(layer_of)
                .unwrap_or_default();

            for manifold in &pair.manifolds {
                let normal = manifold.data.normal * sign;
                let touching = manifold
                    .points
                    .iter()
                    .filter(|p| p.dist <= CONTACT_DIST_TOLERANCE)
                    .count();
                if touching > 0 {
                    out.push(AgentContact::new(layer, vec![normal; touching]));
                }
            }
        }
        out
    }

    /// Run one fixed step in host-loop order: contacts, controller tick, prop gravity,
    /// physics. Returns `None` (and only steps the world) when no agent was spawned.
    pub fn step<G>(
        &mut self,
        controller: &mut LocomotionController,
        gravity: &G,
    ) -> Option<TickOutcome>
    where
        G: GravityField + ?Sized,
    {
        let outcome = self.tick_agent(controller, gravity);
        self.step_world(gravity);
        outcome
    }

    fn tick_agent<G>(
        &mut self,
        controller: &mut LocomotionController,
        gravity: &G,
    ) -> Option<TickOutcome>
    where
        G: GravityField + ?Sized,
    {
        let agent = self.agent?;
        for manifold in self.agent_contacts() {
            controller.on_contact(&manifold);
        }

        let mut state = self.agent_state()?;
        let outcome = controller.tick_fixed(&mut state, gravity, &*self, self.params.dt);
        if let Some(rb) = self.bodies.get_mut(agent.body) {
            rb.set_linvel(state.velocity, true);
        }
        Some(outcome)
    }

    /// Apply field gravity to props and advance the physics pipeline.
    pub fn step_world<G>(&mut self, gravity: &G)
    where
        G: GravityField + ?Sized,
    {
        let dt = self.params.dt;
        for prop in &mut self.props {
            let Some(rb) = self.bodies.get_mut(prop.body) else {
                continue;
            };
            let applied = prop.gravity.step(
                *rb.translation(),
                *rb.linvel(),
                rb.is_sleeping(),
                gravity,
                dt,
            );
            if let Some(acceleration) = applied {
                let v = *rb.linvel() + acceleration * dt;
                rb.set_linvel(v, true);
            }
        }

        self.pipeline.step(
            &Vector::zeros(),
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }

    /// Borrowed query pipeline over the current scene.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    fn scene_filter<'a, F>(&self, predicate: &'a F) -> QueryFilter<'a>
    where
        F: Fn(ColliderHandle, &Collider) -> bool,
    {
        let filter = QueryFilter::default().exclude_sensors().predicate(predicate);
        match self.agent {
            Some(agent) => filter.exclude_rigid_body(agent.body),
            None => filter,
        }
    }

    fn layer_of_handle(&self, handle: ColliderHandle) -> SurfaceLayer {
        self.colliders.get(handle).map(layer_of).unwrap_or_default()
    }
}

impl GroundProbe for RapierScene {
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<ProbeHit> {
        let in_mask = |_: ColliderHandle, c: &Collider| mask.contains(layer_of(c));
        let qp = self.query_pipeline(self.scene_filter(&in_mask));

        let ray = Ray::new(Point::from(origin), direction);
        let (handle, hit) = qp.cast_ray_and_get_normal(&ray, max_distance.max(0.0), true)?;
        Some(ProbeHit {
            normal: hit.normal,
            layer: self.layer_of_handle(handle),
            distance: hit.time_of_impact,
        })
    }
}

impl ObstructionCast for RapierScene {
    fn cast_box(
        &self,
        center: Vec3,
        half_extents: Vec3,
        orientation: Quat,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
    ) -> Option<CastHit> {
        let in_mask = |_: ColliderHandle, c: &Collider| mask.contains(layer_of(c));
        let qp = self.query_pipeline(self.scene_filter(&in_mask));

        let shape = Cuboid::new(half_extents.map(|e| e.max(MIN_BOX_HALF_EXTENT)));
        let pose = Isometry::from_parts(Translation3::from(center), orientation);
        let opts = ShapeCastOptions::with_max_time_of_impact(max_distance.max(0.0));
        let (_, hit) = qp.cast_shape(&pose, &direction, &shape, opts)?;
        Some(CastHit {
            distance: hit.time_of_impact,
        })
    }
}
