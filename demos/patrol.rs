//! A stationary listening post tracking a patrol ship by signature alone:
//! after two frames the track correlator recovers the target's velocity.

use event_horizon::*;

fn main() {
    let mut world = World::new(1.0);

    let mut post = Body::new().with_side(1);
    post.add_sensor(Sensor::active_radar(80.0, 2.0));
    post.add_sensor(Sensor::passive_thermal(1.5));
    post.add_shape(Shape::point_mass(50.0).with_signature(Signature::new(5.0, 10.0, 30.0)));
    let post = world.add_body(post);

    let mut ship = Body::new()
        .with_position(DVec2::new(120.0, -40.0))
        .with_velocity(DVec2::new(-8.0, 3.0))
        .with_side(2);
    ship.add_shape(Shape::circle(2.0, 400.0).with_signature(Signature::new(12.0, 60.0, 45.0)));
    ship.add_shape(Shape::point_mass(100.0)); // cargo, no emissions
    world.add_body(ship);

    for frame in 0..6 {
        world.begin_frame().unwrap();
        world.end_frame().unwrap();

        let view = world.body(post).unwrap().sensor_view();
        match view.first() {
            Some(track) => println!(
                "frame {frame}: contact at ({:7.2}, {:6.2}) side {:?} velocity ({:5.2}, {:4.2}) signature {:?}",
                track.position.x,
                track.position.y,
                track.side,
                track.velocity.x,
                track.velocity.y,
                track.signature.as_tuple()
            ),
            None => println!("frame {frame}: no contact"),
        }
    }
}
