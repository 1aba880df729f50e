//! Event Horizon – a continuous-collision 2D rigid body engine.
//!
//! Built for simulations where bodies cross many body-lengths per step, so
//! discrete overlap testing would tunnel. Each frame is driven as a sequence
//! of collision events in causal time order: the world predicts exact times
//! of impact, hands each event to the caller for resolution, and re-predicts
//! only the pairs the resolution disturbed. A signature-based sensor
//! subsystem shares the same registry and frame lifecycle.

pub mod collision;
pub mod config;
pub mod core;
pub mod sensing;
pub mod utils;
pub mod world;

pub use glam::DVec2;

pub use crate::collision::{
    broadphase::SweepAxes,
    ccd::{collide_shapes, ShapeCollision},
    distance::{distance_between_shapes, DistanceResult, Pose},
    response::{CollisionParameters, CollisionResponse},
    shapes::{Polygon, Shape, ShapeError, ShapeGeometry, ShapeKind},
};
pub use crate::core::body::{Body, BodyCollision, BodyError, BodyState};
pub use crate::sensing::{
    sensor::{SensedObject, Sensor, Side},
    signature::Signature,
};
pub use crate::utils::{aabb::Aabb, allocator::BodyId, math::norm_rad};
pub use crate::world::{Collision, World, WorldError};
