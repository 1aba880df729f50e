use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collision::ccd::{collide_shapes, ShapeCollision};
use crate::collision::distance::{distance_between_shapes, Pose};
use crate::collision::shapes::Shape;
use crate::config;
use crate::sensing::sensor::{SensedObject, Sensor};
use crate::sensing::signature::Signature;
use crate::utils::math::{norm_rad, Rotor};
use crate::utils::Aabb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BodyError {
    #[error("time step must be non-negative")]
    NegativeTimeStep,
}

/// Immutable snapshot of a body's integrable state. The scheduler uses this
/// to speculatively advance a body and rewind it without touching the rest of
/// the body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub position: DVec2,
    pub velocity: DVec2,
    pub angle: f64,
    pub angular_velocity: f64,
    pub local_force: DVec2,
    pub local_torque: f64,
    pub global_force: DVec2,
    pub global_torque: f64,
}

/// Soonest time-of-impact between two bodies, with the shape pair that
/// produced it.
#[derive(Debug, Clone, Copy)]
pub struct BodyCollision {
    pub collision: ShapeCollision,
    pub shape_a: usize,
    pub shape_b: usize,
}

/// A rigid body: kinematic state, force accumulators, and owned collections
/// of shapes and sensors.
///
/// Mass, moment of inertia, and signature are derived from the shapes, so a
/// body with no shapes is massless and invisible. Local forces rotate with
/// the body (thrusters); global forces stay fixed in the world frame.
#[derive(Debug, Clone)]
pub struct Body {
    position: DVec2,
    velocity: DVec2,
    angle: f64,
    angular_velocity: f64,
    local_force: DVec2,
    local_torque: f64,
    global_force: DVec2,
    global_torque: f64,
    side: i32,
    shapes: Vec<Shape>,
    sensors: Vec<Sensor>,
    sensor_view: Vec<SensedObject>,
}

impl Default for Body {
    fn default() -> Self {
        Self::new()
    }
}

impl Body {
    pub fn new() -> Self {
        Self {
            position: DVec2::ZERO,
            velocity: DVec2::ZERO,
            angle: 0.0,
            angular_velocity: 0.0,
            local_force: DVec2::ZERO,
            local_torque: 0.0,
            global_force: DVec2::ZERO,
            global_torque: 0.0,
            side: 0,
            shapes: Vec::new(),
            sensors: Vec::new(),
            sensor_view: Vec::new(),
        }
    }

    pub fn with_position(mut self, position: DVec2) -> Self {
        self.position = position;
        self
    }

    pub fn with_velocity(mut self, velocity: DVec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = norm_rad(angle);
        self
    }

    pub fn with_angular_velocity(mut self, angular_velocity: f64) -> Self {
        self.angular_velocity = angular_velocity;
        self
    }

    pub fn with_side(mut self, side: i32) -> Self {
        self.side = side;
        self
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn velocity(&self) -> DVec2 {
        self.velocity
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn angular_velocity(&self) -> f64 {
        self.angular_velocity
    }

    pub fn local_force(&self) -> DVec2 {
        self.local_force
    }

    pub fn local_torque(&self) -> f64 {
        self.local_torque
    }

    pub fn global_force(&self) -> DVec2 {
        self.global_force
    }

    pub fn global_torque(&self) -> f64 {
        self.global_torque
    }

    pub fn side(&self) -> i32 {
        self.side
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }

    /// Last frame's detections, with track correlation applied.
    pub fn sensor_view(&self) -> &[SensedObject] {
        &self.sensor_view
    }

    pub(crate) fn take_sensor_view(&mut self) -> Vec<SensedObject> {
        std::mem::take(&mut self.sensor_view)
    }

    pub(crate) fn set_sensor_view(&mut self, view: Vec<SensedObject>) {
        self.sensor_view = view;
    }

    pub fn add_shape(&mut self, shape: Shape) {
        self.shapes.push(shape);
    }

    pub fn remove_shape(&mut self, index: usize) -> Shape {
        self.shapes.remove(index)
    }

    pub fn add_sensor(&mut self, sensor: Sensor) {
        self.sensors.push(sensor);
    }

    pub fn remove_sensor(&mut self, index: usize) -> Sensor {
        self.sensors.remove(index)
    }

    pub fn change_side(&mut self, side: i32) {
        self.side = side;
    }

    /// Discontinuous reposition. Bypasses integration entirely; velocity and
    /// forces are untouched.
    pub fn teleport(&mut self, to: DVec2) {
        self.position = to;
    }

    pub fn mass(&self) -> f64 {
        self.shapes.iter().map(|shape| shape.mass).sum()
    }

    /// Compound moment of inertia about the body origin, by the parallel
    /// axis theorem.
    pub fn moment_of_inertia(&self) -> f64 {
        self.shapes
            .iter()
            .map(|shape| shape.moment_of_inertia() + shape.mass * shape.position.length_squared())
            .sum()
    }

    /// Merged emissions of every shape, component-wise maximum.
    pub fn signature(&self) -> Signature {
        let mut merged = Signature::NONE;
        for shape in &self.shapes {
            merged.merge_max(&shape.signature);
        }
        merged
    }

    pub fn max_sensor_range(&self) -> f64 {
        self.sensors
            .iter()
            .map(|sensor| sensor.max_range())
            .fold(0.0, f64::max)
    }

    /// Velocity of a world-space point riding on this body.
    pub fn velocity_at(&self, world_point: DVec2) -> DVec2 {
        self.velocity - self.angular_velocity * (world_point - self.position).perp()
    }

    /// Instantaneous impulse at a point given relative to the body origin
    /// (world orientation). Zero mass or inertia leaves the corresponding
    /// degree of freedom untouched.
    pub fn apply_impulse(&mut self, impulse: DVec2, point: DVec2) {
        let mass = self.mass();
        if mass > 0.0 {
            self.velocity += impulse / mass;
        }
        let inertia = self.moment_of_inertia();
        if inertia > 0.0 {
            self.angular_velocity += -point.perp_dot(impulse) / inertia;
        }
    }

    /// Accumulates a body-frame force applied at a body-frame offset.
    pub fn apply_local_force(&mut self, force: DVec2, at: DVec2) {
        self.local_force += force;
        self.local_torque += -at.perp_dot(force);
    }

    /// Accumulates a world-frame force applied at a body-frame offset.
    pub fn apply_global_force(&mut self, force: DVec2, at: DVec2) {
        self.global_force += force;
        self.global_torque += -at.perp_dot(force);
    }

    pub fn apply_local_torque(&mut self, torque: f64) {
        self.local_torque += torque;
    }

    pub fn apply_global_torque(&mut self, torque: f64) {
        self.global_torque += torque;
    }

    pub fn clear_local_forces(&mut self) {
        self.local_force = DVec2::ZERO;
        self.local_torque = 0.0;
    }

    pub fn clear_global_forces(&mut self) {
        self.global_force = DVec2::ZERO;
        self.global_torque = 0.0;
    }

    pub fn state(&self) -> BodyState {
        BodyState {
            position: self.position,
            velocity: self.velocity,
            angle: self.angle,
            angular_velocity: self.angular_velocity,
            local_force: self.local_force,
            local_torque: self.local_torque,
            global_force: self.global_force,
            global_torque: self.global_torque,
        }
    }

    pub fn reset(&mut self, state: &BodyState) {
        self.position = state.position;
        self.velocity = state.velocity;
        self.angle = state.angle;
        self.angular_velocity = state.angular_velocity;
        self.local_force = state.local_force;
        self.local_torque = state.local_torque;
        self.global_force = state.global_force;
        self.global_torque = state.global_torque;
    }

    /// Integrates the body forward. Angular motion is exact for the constant
    /// accumulated torque. The local force's world direction rotates with the
    /// body, so its contribution is integrated by the trapezoid rule over
    /// fine substeps; the global force is folded in analytically. Forces are
    /// not cleared here.
    pub fn update(&mut self, dt: f64) -> Result<(), BodyError> {
        if dt < 0.0 {
            return Err(BodyError::NegativeTimeStep);
        }
        if dt == 0.0 {
            return Ok(());
        }
        self.integrate(dt);
        Ok(())
    }

    pub(crate) fn integrate(&mut self, dt: f64) {
        if dt <= 0.0 {
            return;
        }

        let mass = self.mass();
        let inertia = self.moment_of_inertia();
        let angle0 = self.angle;
        let omega0 = self.angular_velocity;
        let alpha = if inertia > 0.0 {
            (self.local_torque + self.global_torque) / inertia
        } else {
            0.0
        };

        let mut delta_position = self.velocity * dt;
        let mut delta_velocity = DVec2::ZERO;

        if mass > 0.0 {
            let global_acceleration = self.global_force / mass;
            delta_velocity += global_acceleration * dt;
            delta_position += global_acceleration * (dt * dt / 2.0);

            if self.local_force != DVec2::ZERO {
                let steps = (dt * config::INTEGRATION_SUBSTEP_RATE).ceil().max(1.0) as u32;
                let h = dt / f64::from(steps);
                let mut velocity_acc = DVec2::ZERO;
                let mut position_acc = DVec2::ZERO;
                let mut previous = Rotor::new(angle0).apply(self.local_force) / mass;
                for i in 1..=steps {
                    let t = h * f64::from(i);
                    let theta = angle0 + omega0 * t + alpha * t * t / 2.0;
                    let current = Rotor::new(theta).apply(self.local_force) / mass;
                    let dv = (previous + current) * (h / 2.0);
                    position_acc += (velocity_acc + velocity_acc + dv) * (h / 2.0);
                    velocity_acc += dv;
                    previous = current;
                }
                delta_velocity += velocity_acc;
                delta_position += position_acc;
            }
        }

        self.position += delta_position;
        self.velocity += delta_velocity;
        self.angle = norm_rad(angle0 + omega0 * dt + alpha * dt * dt / 2.0);
        self.angular_velocity = omega0 + alpha * dt;
    }

    /// Bounding box of the body swept over the next `dt` seconds, relative to
    /// the current position. Rotating shapes are tracked through every
    /// quarter-turn of their offset; a spinning shape is bounded by its
    /// bounding circle, so the box never under-covers.
    pub fn aabb(&self, dt: f64) -> Aabb {
        let mut result: Option<Aabb> = None;
        for shape in &self.shapes {
            let swept = self.sweep_shape(shape, dt);
            match &mut result {
                Some(aabb) => aabb.merge(&swept),
                None => result = Some(swept),
            }
        }
        result.unwrap_or(Aabb::ZERO)
    }

    fn sweep_shape(&self, shape: &Shape, dt: f64) -> Aabb {
        let drift = self.velocity * dt;

        if self.angular_velocity == 0.0 || dt == 0.0 {
            let fixed = shape
                .aabb(self.angle)
                .translated(Rotor::new(self.angle).apply(shape.position));
            return fixed.union(&fixed.translated(drift));
        }

        let radius = shape.bounding_radius();
        let offset_length = shape.position.length();

        if self.angular_velocity.abs() * dt >= std::f64::consts::TAU {
            // A full revolution or more: the whole swing circle.
            let reach = offset_length + radius;
            let circle = Aabb::new(-reach, reach, -reach, reach);
            return circle.union(&circle.translated(drift));
        }

        let mut samples = vec![0.0, dt];
        if offset_length > 0.0 {
            // The offset's world bearing decreases at the body's spin rate;
            // box extremes happen when it crosses a quarter turn.
            let bearing0 = shape.position.to_angle() - self.angle;
            let bearing1 = bearing0 - self.angular_velocity * dt;
            let low = bearing0.min(bearing1);
            let high = bearing0.max(bearing1);
            let quarter = std::f64::consts::FRAC_PI_2;
            let k_low = (low / quarter).ceil() as i64;
            let k_high = (high / quarter).floor() as i64;
            for k in k_low..=k_high {
                let t = (bearing0 - k as f64 * quarter) / self.angular_velocity;
                if t > 0.0 && t < dt {
                    samples.push(t);
                }
            }
        }

        let mut swept: Option<Aabb> = None;
        for t in samples {
            let angle = self.angle + self.angular_velocity * t;
            let center = Rotor::new(angle).apply(shape.position) + self.velocity * t;
            let disc = Aabb::new(
                center.x - radius,
                center.x + radius,
                center.y - radius,
                center.y + radius,
            );
            match &mut swept {
                Some(aabb) => aabb.merge(&disc),
                None => swept = Some(disc),
            }
        }
        swept.unwrap_or(Aabb::ZERO)
    }

    /// Soonest entering time-of-impact against another body over
    /// `[0, end_time]`, across every colliding shape pair.
    pub fn collide(&self, other: &Body, end_time: f64, ignore_initial: bool) -> Option<BodyCollision> {
        let mut soonest: Option<BodyCollision> = None;
        for (index_a, shape_a) in self.shapes.iter().enumerate() {
            if !shape_a.can_collide() {
                continue;
            }
            for (index_b, shape_b) in other.shapes.iter().enumerate() {
                if !shape_b.can_collide() {
                    continue;
                }
                let Some(result) =
                    collide_shapes(shape_a, self, shape_b, other, end_time, ignore_initial)
                else {
                    continue;
                };
                if !result.entering {
                    continue;
                }
                if soonest
                    .as_ref()
                    .map_or(true, |best| result.time < best.collision.time)
                {
                    soonest = Some(BodyCollision {
                        collision: result,
                        shape_a: index_a,
                        shape_b: index_b,
                    });
                }
            }
        }
        soonest
    }

    /// Closest approach between the two bodies' collision shapes at their
    /// current poses, ignoring motion. `None` when either body has no
    /// collision geometry.
    pub fn distance_between(&self, other: &Body) -> Option<f64> {
        let pose_a = Pose::new(self.position, self.angle);
        let pose_b = Pose::new(other.position, other.angle);
        let mut closest: Option<f64> = None;
        for shape_a in self.shapes.iter().filter(|shape| shape.can_collide()) {
            for shape_b in other.shapes.iter().filter(|shape| shape.can_collide()) {
                if let Some(result) = distance_between_shapes(shape_a, pose_a, shape_b, pose_b) {
                    if closest.map_or(true, |best| result.distance < best) {
                        closest = Some(result.distance);
                    }
                }
            }
        }
        closest
    }
}
