use approx::assert_relative_eq;
use event_horizon::*;
use std::f64::consts::PI;

fn circle(radius: f64) -> Shape {
    Shape::circle(radius, 1.0)
}

fn body_at(x: f64, y: f64, vx: f64, vy: f64) -> Body {
    Body::new()
        .with_position(DVec2::new(x, y))
        .with_velocity(DVec2::new(vx, vy))
}

#[test]
fn head_on_circles_match_the_algebraic_root() {
    // Gap of 8, combined closing speed 8: impact at t = 1.
    let mut a = body_at(0.0, 0.0, 2.0, 0.0);
    a.add_shape(circle(1.0));
    let mut b = body_at(10.0, 0.0, -6.0, 0.0);
    b.add_shape(circle(1.0));

    let hit = collide_shapes(&a.shapes()[0], &a, &b.shapes()[0], &b, 2.0, false)
        .expect("closing circles collide");
    assert_relative_eq!(hit.time, 1.0, epsilon = 1e-9);
    assert_relative_eq!(hit.normal.x, 1.0, epsilon = 1e-9);
    assert_relative_eq!(hit.touch_point.x, 3.0, epsilon = 1e-6);
    assert_relative_eq!(hit.touch_point.y, 0.0, epsilon = 1e-9);
    assert!(hit.entering);
}

#[test]
fn vertical_approach() {
    let mut a = body_at(0.0, 0.0, 0.0, 2.0);
    a.add_shape(circle(1.0));
    let mut b = body_at(0.0, 10.0, 0.0, -6.0);
    b.add_shape(circle(1.0));

    let hit = collide_shapes(&a.shapes()[0], &a, &b.shapes()[0], &b, 2.0, false).unwrap();
    assert_relative_eq!(hit.time, 1.0, epsilon = 1e-9);
    assert_relative_eq!(hit.normal.y, 1.0, epsilon = 1e-9);
    assert_relative_eq!(hit.touch_point.y, 3.0, epsilon = 1e-6);
}

#[test]
fn receding_bodies_never_collide() {
    let mut a = body_at(0.0, 0.0, 0.0, 2.0);
    a.add_shape(circle(1.0));
    let mut b = body_at(0.0, 10.0, 0.0, 6.0);
    b.add_shape(circle(1.0));

    assert!(collide_shapes(&a.shapes()[0], &a, &b.shapes()[0], &b, 1.0, false).is_none());
}

#[test]
fn parallel_motion_is_a_non_event() {
    let mut a = body_at(0.0, 0.0, 2.0, 0.0);
    a.add_shape(circle(1.0));
    let mut b = body_at(0.0, 10.0, 2.0, 0.0);
    b.add_shape(circle(1.0));

    assert!(collide_shapes(&a.shapes()[0], &a, &b.shapes()[0], &b, 1.0, false).is_none());
}

#[test]
fn stationary_disjoint_bodies_never_collide() {
    let mut a = body_at(0.0, 0.0, 0.0, 0.0);
    a.add_shape(circle(1.0));
    let mut b = body_at(10.0, 0.0, 0.0, 0.0);
    b.add_shape(circle(1.0));

    assert!(collide_shapes(&a.shapes()[0], &a, &b.shapes()[0], &b, 1e6, false).is_none());
}

#[test]
fn impact_beyond_the_window_is_dropped() {
    let mut a = body_at(0.0, 0.0, 0.0, 2.0);
    a.add_shape(circle(1.0));
    let mut b = body_at(0.0, 100.0, 0.0, -6.0);
    b.add_shape(circle(1.0));

    assert!(collide_shapes(&a.shapes()[0], &a, &b.shapes()[0], &b, 1.0, false).is_none());
}

#[test]
fn point_masses_cannot_collide() {
    let mut a = body_at(0.0, 0.0, 1.0, 0.0);
    a.add_shape(Shape::point_mass(10.0));
    let mut b = body_at(2.0, 0.0, -1.0, 0.0);
    b.add_shape(circle(1.0));

    assert!(collide_shapes(&a.shapes()[0], &a, &b.shapes()[0], &b, 10.0, false).is_none());
}

#[test]
fn touching_and_separating_reports_a_non_entering_contact() {
    let mut a = body_at(0.0, 0.0, -1.0, 0.0);
    a.add_shape(circle(1.0));
    let mut b = body_at(2.0, 0.0, 1.0, 0.0);
    b.add_shape(circle(1.0));

    let hit = collide_shapes(&a.shapes()[0], &a, &b.shapes()[0], &b, 1.0, false).unwrap();
    assert_eq!(hit.time, 0.0);
    assert!(!hit.entering);

    // The body-level query only surfaces entering contacts.
    assert!(a.collide(&b, 1.0, false).is_none());
}

#[test]
fn ignored_initial_contact_is_not_re_reported() {
    // Pressed together and still closing: with the ongoing-overlap flag the
    // pair produces nothing for this window.
    let mut a = body_at(0.0, 0.0, 1.0, 0.0);
    a.add_shape(circle(1.0));
    let mut b = body_at(2.0, 0.0, 0.0, 0.0);
    b.add_shape(circle(1.0));

    assert!(collide_shapes(&a.shapes()[0], &a, &b.shapes()[0], &b, 1.0, true).is_none());
    // Without the flag the same configuration is an immediate contact.
    let hit = collide_shapes(&a.shapes()[0], &a, &b.shapes()[0], &b, 1.0, false).unwrap();
    assert_eq!(hit.time, 0.0);
    assert!(hit.entering);
}

#[test]
fn fresh_shape_pair_is_unaffected_by_the_ignore_flag() {
    // Shape 0 starts in (ignored) contact; shape 1 approaches from far away
    // and must still be reported.
    let mut a = body_at(0.0, 0.0, 0.0, 0.0);
    a.add_shape(circle(1.0));
    let mut b = body_at(4.0, 0.0, -1.0, 0.0);
    b.add_shape(circle(1.0).with_offset(DVec2::new(-2.0, 0.0)));
    b.add_shape(circle(1.0).with_offset(DVec2::new(2.0, 0.0)));

    let result = b.collide(&a, 5.0, true).expect("the far shape still connects");
    assert_eq!(result.shape_a, 1);
    assert_relative_eq!(result.collision.time, 4.0, epsilon = 1e-6);
}

#[test]
fn rotation_alone_can_produce_an_impact() {
    // A stationary hub and a body whose only motion is spin: the offset
    // shape swings into the hub.
    let mut hub = body_at(0.0, 0.0, 0.0, 0.0);
    hub.add_shape(circle(1.0));

    let mut arm = body_at(2.0, 0.0, 0.0, 0.0).with_angular_velocity(PI);
    arm.add_shape(circle(0.5).with_offset(DVec2::new(1.0, 0.0)));

    let hit = collide_shapes(&hub.shapes()[0], &hub, &arm.shapes()[0], &arm, 1.5, false)
        .expect("swinging shape reaches the hub");

    // Shape center distance sqrt(5 + 4 cos(pi t)) meets the combined radius
    // 1.5 at cos(pi t) = -0.6875.
    let expected = (-0.6875_f64).acos() / PI;
    assert_relative_eq!(hit.time, expected, epsilon = 1e-3);
    assert!(hit.entering);
}
