//! Core simulation entities.

pub mod body;

pub use body::{Body, BodyCollision, BodyError, BodyState};
