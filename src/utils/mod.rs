//! Utility helpers: math conventions, bounding boxes, the body arena, logging.

pub mod aabb;
pub mod allocator;
pub mod logging;
pub mod math;

pub use aabb::Aabb;
pub use allocator::{Arena, BodyId};
pub use math::{norm_rad, Rotor};
