pub mod camera;
pub mod collision;
pub mod config;
pub mod constants;
pub mod controller;
pub mod gravity;
pub mod gravity_body;
pub mod input;
pub mod layers;
pub mod math;
pub mod rapier_world;

pub use camera::{CameraPose, OrbitCamera};
pub use collision::{
    BodyState, CastHit, ContactManifold, EmptyScene, GroundProbe, ObstructionCast, ProbeHit, Quat,
    Vec2, Vec3,
};
pub use config::{ConfigError, LocomotionConfig, OrbitCameraConfig, SlopeThresholds};
pub use constants::GRAVITY_MPS2;
pub use controller::{GroundSource, JumpKind, LocomotionController, TickOutcome};
pub use gravity::{
    GravityField, GravityPlane, GravitySource, GravitySources, GravitySphere, UniformGravity,
};
pub use gravity_body::GravityBody;
pub use input::{InputLatch, InputSample};
pub use layers::{LayerMask, SurfaceLayer};
pub use rapier_world::{ColliderShapeDef, RapierScene, WorldStaticDef, collider_from_def};
