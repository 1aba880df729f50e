//! A break shot: a cue ball fired into a racked triangle of balls, resolved
//! frame by frame at exact impact times.

use event_horizon::*;

const BALL_RADIUS: f64 = 0.5;
const BALL_MASS: f64 = 1.0;

fn ball(position: DVec2, velocity: DVec2) -> Body {
    let mut body = Body::new().with_position(position).with_velocity(velocity);
    body.add_shape(Shape::circle(BALL_RADIUS, BALL_MASS));
    body
}

fn main() {
    let mut world = World::new(0.1);

    // Rack: five rows in a triangle, touching.
    let spacing = BALL_RADIUS * 2.0 + 1e-4;
    let mut balls = Vec::new();
    for row in 0..5 {
        for i in 0..=row {
            let x = 10.0 + row as f64 * spacing * 0.75_f64.sqrt();
            let y = (i as f64 - row as f64 / 2.0) * spacing;
            balls.push(world.add_body(ball(DVec2::new(x, y), DVec2::ZERO)));
        }
    }
    let cue = world.add_body(ball(DVec2::new(0.0, 0.01), DVec2::new(40.0, 0.0)));

    let params = CollisionParameters::new(0.9);
    for frame in 0..20 {
        world.begin_frame().unwrap();
        let mut impacts = 0;
        while world.has_next_collision() {
            let event = world.next_collision().unwrap();
            match world.calculate_collision(&event, &params) {
                Ok((first, second)) => {
                    world.apply_response(&first).unwrap();
                    world.apply_response(&second).unwrap();
                    impacts += 1;
                }
                Err(WorldError::NotClosing) => {}
                Err(error) => panic!("unexpected scheduler error: {error}"),
            }
            world.finished_collision(&event, true).unwrap();
        }
        world.end_frame().unwrap();

        if impacts > 0 {
            println!("frame {frame:2}: {impacts} impacts");
        }
    }

    let cue_ball = world.body(cue).unwrap();
    println!(
        "cue ball finished at ({:.2}, {:.2}) moving ({:.2}, {:.2})",
        cue_ball.position().x,
        cue_ball.position().y,
        cue_ball.velocity().x,
        cue_ball.velocity().y
    );
    let moving = balls
        .iter()
        .filter(|id| world.body(**id).unwrap().velocity().length() > 0.1)
        .count();
    println!("{moving} of {} racked balls are moving", balls.len());
}
