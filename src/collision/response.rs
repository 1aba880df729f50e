use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::body::Body;
use crate::utils::BodyId;

/// Restitution parameters for resolving a collision. 1.0 is perfectly
/// elastic, 0.0 perfectly plastic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionParameters {
    pub restitution: f64,
}

impl CollisionParameters {
    pub fn new(restitution: f64) -> Self {
        Self { restitution }
    }
}

/// Resolving a contact whose relative normal velocity is not closing is a
/// caller contract violation, not a recoverable runtime condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("bodies are not closing at the contact point")]
pub struct NotClosing;

/// One body's view of a resolved collision. `touch_point` is relative to
/// `body`, so it can be fed straight back into `Body::apply_impulse`.
#[derive(Debug, Clone, Copy)]
pub struct CollisionResponse {
    pub body: BodyId,
    pub other: BodyId,
    pub time: f64,
    pub touch_point: DVec2,
    pub impulse: DVec2,
    pub closing_velocity: DVec2,
}

#[derive(Debug)]
pub(crate) struct ImpulseResult {
    pub impulse: DVec2,
    pub closing_velocity: DVec2,
}

/// Impulse on the first body from an impact at `touch_point` (world frame)
/// with `normal` pointing from the first body toward the second. Uses the
/// full angular rigid-body formula; zero mass or zero inertia terms drop out,
/// treating that body as immovable along the corresponding degree of freedom.
pub(crate) fn impulse_between(
    body_a: &Body,
    body_b: &Body,
    touch_point: DVec2,
    normal: DVec2,
    params: &CollisionParameters,
) -> Result<ImpulseResult, NotClosing> {
    let relative = body_b.velocity_at(touch_point) - body_a.velocity_at(touch_point);
    let normal_speed = relative.dot(normal);
    if normal_speed >= 0.0 {
        return Err(NotClosing);
    }

    let offset_a = touch_point - body_a.position();
    let offset_b = touch_point - body_b.position();

    let mut effective_mass = 0.0;
    if body_a.mass() > 0.0 {
        effective_mass += 1.0 / body_a.mass();
    }
    if body_b.mass() > 0.0 {
        effective_mass += 1.0 / body_b.mass();
    }
    let inertia_a = body_a.moment_of_inertia();
    if inertia_a > 0.0 {
        effective_mass += offset_a.perp_dot(normal).powi(2) / inertia_a;
    }
    let inertia_b = body_b.moment_of_inertia();
    if inertia_b > 0.0 {
        effective_mass += offset_b.perp_dot(normal).powi(2) / inertia_b;
    }

    let magnitude = if effective_mass > 0.0 {
        (1.0 + params.restitution) * normal_speed / effective_mass
    } else {
        0.0
    };

    Ok(ImpulseResult {
        impulse: normal * magnitude,
        closing_velocity: normal * normal_speed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::shapes::Shape;

    #[test]
    fn head_on_point_masses() {
        let mut a = Body::new().with_velocity(DVec2::new(30.0, 40.0));
        a.add_shape(Shape::point_mass(10.0));
        let mut b = Body::new()
            .with_position(DVec2::new(2.0, 0.0))
            .with_velocity(DVec2::new(-30.0, 0.0));
        b.add_shape(Shape::point_mass(10.0));

        let result = impulse_between(
            &a,
            &b,
            DVec2::ZERO,
            DVec2::X,
            &CollisionParameters::new(1.0),
        )
        .unwrap();

        assert_eq!(result.impulse, DVec2::new(-600.0, 0.0));
        assert_eq!(result.closing_velocity, DVec2::new(-60.0, 0.0));
    }

    #[test]
    fn same_direction_overtaking() {
        let mut a = Body::new().with_velocity(DVec2::new(-20.0, 0.0));
        a.add_shape(Shape::point_mass(10.0));
        let mut b = Body::new()
            .with_position(DVec2::new(2.0, 0.0))
            .with_velocity(DVec2::new(-30.0, 0.0));
        b.add_shape(Shape::point_mass(10.0));

        let result = impulse_between(
            &a,
            &b,
            DVec2::ZERO,
            DVec2::X,
            &CollisionParameters::new(1.0),
        )
        .unwrap();

        assert_eq!(result.impulse, DVec2::new(-100.0, 0.0));
        assert_eq!(result.closing_velocity, DVec2::new(-10.0, 0.0));
    }

    #[test]
    fn rotating_contact_includes_angular_terms() {
        let mut a = Body::new().with_angular_velocity(1.0);
        a.add_shape(Shape::circle(1.0, 10.0).with_offset(DVec2::new(0.0, 1.0)));
        let mut b = Body::new()
            .with_position(DVec2::new(2.0, 0.0))
            .with_angular_velocity(-1.0);
        b.add_shape(Shape::circle(1.0, 10.0).with_offset(DVec2::new(0.0, 1.0)));

        let result = impulse_between(
            &a,
            &b,
            DVec2::new(1.0, 1.0),
            DVec2::X,
            &CollisionParameters::new(1.0),
        )
        .unwrap();

        assert!((result.impulse.x + 12.0).abs() < 1e-9);
        assert!(result.impulse.y.abs() < 1e-9);
        assert_eq!(result.closing_velocity, DVec2::new(-2.0, 0.0));
    }

    #[test]
    fn separating_contact_is_a_contract_violation() {
        let mut a = Body::new().with_velocity(DVec2::new(-30.0, 0.0));
        a.add_shape(Shape::point_mass(10.0));
        let mut b = Body::new()
            .with_position(DVec2::new(2.0, 0.0))
            .with_velocity(DVec2::new(30.0, 0.0));
        b.add_shape(Shape::point_mass(10.0));

        let result = impulse_between(
            &a,
            &b,
            DVec2::ZERO,
            DVec2::X,
            &CollisionParameters::new(1.0),
        );
        assert_eq!(result.unwrap_err(), NotClosing);
    }
}
