//! Collision pipeline: shape geometry, narrow-phase distance and
//! time-of-impact, sweep-and-prune broad phase, and impulse response.

pub mod broadphase;
pub mod ccd;
pub mod distance;
pub mod response;
pub mod shapes;

pub use broadphase::SweepAxes;
pub use ccd::{collide_shapes, ShapeCollision};
pub use distance::{distance_between_shapes, DistanceResult, Pose};
pub use response::{CollisionParameters, CollisionResponse, NotClosing};
pub use shapes::{Polygon, Shape, ShapeError, ShapeGeometry, ShapeKind};
