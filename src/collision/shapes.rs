use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sensing::signature::Signature;
use crate::utils::{Aabb, Rotor};

/// Shape construction failures. Geometry is validated when a shape is built,
/// never later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("polygon needs at least three non-collinear points")]
    NotEnoughPoints,
    #[error("polygon is concave, only convex polygons are supported")]
    Concave,
}

/// Runtime tag used to key the narrow-phase dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    Polygon,
    PointMass,
}

/// Convex polygon in shape-local coordinates.
///
/// Construction drops collinear points, normalizes the winding, and rejects
/// concave input, so every stored polygon satisfies the narrow phase's
/// assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    points: Vec<DVec2>,
}

impl Polygon {
    const COLLINEAR_EPSILON: f64 = 1e-12;

    pub fn new(points: impl Into<Vec<DVec2>>) -> Result<Self, ShapeError> {
        let mut points: Vec<DVec2> = points.into();

        // Drop collinear (and duplicate) points, wrapping around the ring.
        let mut changed = true;
        while changed && points.len() >= 3 {
            changed = false;
            for i in 0..points.len() {
                let p1 = points[i];
                let p2 = points[(i + 1) % points.len()];
                let p3 = points[(i + 2) % points.len()];
                if (p2 - p1).perp_dot(p3 - p2).abs() < Self::COLLINEAR_EPSILON {
                    points.remove((i + 1) % points.len());
                    changed = true;
                    break;
                }
            }
        }

        if points.len() < 3 {
            return Err(ShapeError::NotEnoughPoints);
        }

        let mut reference = 0.0;
        for i in 0..points.len() {
            let p1 = points[i];
            let p2 = points[(i + 1) % points.len()];
            let p3 = points[(i + 2) % points.len()];
            let turn = (p2 - p1).perp_dot(p3 - p2);
            if reference == 0.0 {
                reference = turn;
            } else if reference * turn < 0.0 {
                return Err(ShapeError::Concave);
            }
        }
        if reference > 0.0 {
            points.reverse();
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    /// Second moment of area times mass, taken about the shape origin (the
    /// parallel-axis shift to the body origin happens on the body).
    fn moment_of_inertia(&self, mass: f64) -> f64 {
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for i in 0..self.points.len() {
            let p = self.points[i];
            let q = self.points[(i + 1) % self.points.len()];
            let cross = p.perp_dot(q).abs();
            numerator += cross * (p.length_squared() + p.dot(q) + q.length_squared());
            denominator += cross;
        }
        if denominator == 0.0 {
            return 0.0;
        }
        mass * numerator / (6.0 * denominator)
    }

    fn bounding_radius(&self) -> f64 {
        self.points.iter().map(|p| p.length()).fold(0.0, f64::max)
    }

    fn aabb(&self, angle: f64) -> Aabb {
        let rotor = Rotor::new(angle);
        let rotated: Vec<DVec2> = self.points.iter().map(|p| rotor.apply(*p)).collect();
        Aabb::from_points(&rotated)
    }
}

/// Geometry variant of a shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeGeometry {
    Circle { radius: f64 },
    Polygon(Polygon),
    /// Massive but immaterial; models distributed mass (cargo, crew, fuel)
    /// without collision geometry.
    PointMass,
}

/// A mass-carrying, signature-emitting piece of a body.
///
/// `position` is the offset of the shape origin from the owning body's
/// origin, in body-local coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub mass: f64,
    pub position: DVec2,
    pub signature: Signature,
    pub geometry: ShapeGeometry,
}

impl Shape {
    pub fn circle(radius: f64, mass: f64) -> Self {
        Self {
            mass,
            position: DVec2::ZERO,
            signature: Signature::NONE,
            geometry: ShapeGeometry::Circle { radius },
        }
    }

    pub fn polygon(polygon: Polygon, mass: f64) -> Self {
        Self {
            mass,
            position: DVec2::ZERO,
            signature: Signature::NONE,
            geometry: ShapeGeometry::Polygon(polygon),
        }
    }

    pub fn point_mass(mass: f64) -> Self {
        Self {
            mass,
            position: DVec2::ZERO,
            signature: Signature::NONE,
            geometry: ShapeGeometry::PointMass,
        }
    }

    pub fn with_offset(mut self, offset: DVec2) -> Self {
        self.position = offset;
        self
    }

    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signature = signature;
        self
    }

    pub fn kind(&self) -> ShapeKind {
        match &self.geometry {
            ShapeGeometry::Circle { .. } => ShapeKind::Circle,
            ShapeGeometry::Polygon(_) => ShapeKind::Polygon,
            ShapeGeometry::PointMass => ShapeKind::PointMass,
        }
    }

    pub fn can_collide(&self) -> bool {
        !matches!(self.geometry, ShapeGeometry::PointMass)
    }

    /// Radius of the smallest circle about the shape origin containing the
    /// geometry.
    pub fn bounding_radius(&self) -> f64 {
        match &self.geometry {
            ShapeGeometry::Circle { radius } => *radius,
            ShapeGeometry::Polygon(polygon) => polygon.bounding_radius(),
            ShapeGeometry::PointMass => 0.0,
        }
    }

    /// Moment of inertia about the shape origin.
    pub fn moment_of_inertia(&self) -> f64 {
        match &self.geometry {
            ShapeGeometry::Circle { radius } => self.mass * radius * radius / 2.0,
            ShapeGeometry::Polygon(polygon) => polygon.moment_of_inertia(self.mass),
            // Unit inertia, so bodies built purely from point masses keep a
            // finite angular response.
            ShapeGeometry::PointMass => 1.0,
        }
    }

    /// Shape-local bounding box at the given orientation, not including the
    /// shape's offset from the body.
    pub fn aabb(&self, angle: f64) -> Aabb {
        match &self.geometry {
            ShapeGeometry::Circle { radius } => Aabb::new(-radius, *radius, -radius, *radius),
            ShapeGeometry::Polygon(polygon) => polygon.aabb(angle),
            ShapeGeometry::PointMass => Aabb::ZERO,
        }
    }
}
