/*!
Collision root module.

This module groups the engine-independent half of contact resolution. The
physics engine is reached only through the query traits in `types`; the
rapier3d implementation lives in `crate::rapier_world`.

- types:    shared data types (contact manifolds, hits, body state, query traits)
- settings: fixed classification and snapping tolerances
- contacts: per-step ground/steep contact accumulation and notch promotion
- ground:   downward probe and velocity redirection for ground snapping
*/

pub mod contacts;
pub mod ground;
pub mod settings;
pub mod types;

// Re-export commonly used types and functions.
pub use contacts::{ContactAccumulator, ContactClass, classify_normal};
pub use ground::{GroundSnap, SnapQuery, snap_to_ground};
pub use types::{
    BodyState, CastHit, ContactManifold, EmptyScene, GroundProbe, ObstructionCast, ProbeHit, Quat,
    Vec2, Vec3,
};
