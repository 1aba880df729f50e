use glam::DVec2;

use crate::collision::distance::{distance_between_shapes, Pose};
use crate::collision::shapes::Shape;
use crate::config;
use crate::core::body::Body;
use crate::utils::math::norm_rad;

/// Time-of-impact result for a single shape pair. `normal` points from the
/// first shape toward the second; `entering` is false when the shapes touch
/// but are already moving apart at the contact point.
#[derive(Debug, Clone, Copy)]
pub struct ShapeCollision {
    pub time: f64,
    pub touch_point: DVec2,
    pub normal: DVec2,
    pub entering: bool,
}

fn pose_at(body: &Body, time: f64) -> Pose {
    Pose::new(
        body.position() + body.velocity() * time,
        norm_rad(body.angle() + body.angular_velocity() * time),
    )
}

fn contact_velocity(body: &Body, time: f64, point: DVec2) -> DVec2 {
    let center = body.position() + body.velocity() * time;
    body.velocity() - body.angular_velocity() * (point - center).perp()
}

/// Continuous time-of-impact between two shapes by conservative advancement.
///
/// Bodies advance ballistically (current velocities, accumulated forces
/// ignored) over `[0, end_time]`. `ignore_initial` suppresses a contact the
/// pair starts the window in: time is nudged forward until the shapes
/// actually separate, and only a later re-approach is reported. Returns
/// `None` when the pair cannot meet inside the window; that is a definitive
/// answer for this window, not an error.
pub fn collide_shapes(
    a: &Shape,
    body_a: &Body,
    b: &Shape,
    body_b: &Body,
    end_time: f64,
    ignore_initial: bool,
) -> Option<ShapeCollision> {
    if !a.can_collide() || !b.can_collide() {
        return None;
    }

    // Worst-case closing speed from rotation: the shape's farthest point
    // swings on a lever of offset length plus bounding radius.
    let reach_a = a.position.length() + a.bounding_radius();
    let reach_b = b.position.length() + b.bounding_radius();
    let relative_speed = (body_a.velocity() - body_b.velocity()).length();

    let mut time = 0.0;
    let mut ignoring = ignore_initial;

    for _ in 0..config::CCD_MAX_ITERATIONS {
        if time > end_time || time < 0.0 {
            return None;
        }

        let result = distance_between_shapes(a, pose_at(body_a, time), b, pose_at(body_b, time))?;

        if result.distance < config::CONTACT_EPSILON {
            if ignoring {
                time += config::CONTACT_NUDGE;
                continue;
            }
            let touch_point = (result.a_point + result.b_point) / 2.0;
            let relative = contact_velocity(body_b, time, touch_point)
                - contact_velocity(body_a, time, touch_point);
            return Some(ShapeCollision {
                time,
                touch_point,
                normal: result.normal,
                entering: relative.dot(result.normal) < 0.0,
            });
        }

        // Out of the contact shell: any contact from here on is a fresh one.
        ignoring = false;

        let closing_bound = relative_speed
            + body_a.angular_velocity().abs() * reach_a
            + body_b.angular_velocity().abs() * reach_b;
        if closing_bound <= 0.0 {
            return None;
        }
        time += result.distance / closing_bound;
    }

    log::trace!("conservative advancement exhausted its iteration budget");
    None
}
