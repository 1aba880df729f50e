use glam::DVec2;

use crate::collision::shapes::{Shape, ShapeGeometry, ShapeKind};
use crate::utils::Rotor;

/// World-space placement of a shape's owning body.
#[derive(Debug, Clone, Copy)]
pub struct Pose {
    pub position: DVec2,
    pub angle: f64,
}

impl Pose {
    pub fn new(position: DVec2, angle: f64) -> Self {
        Self { position, angle }
    }

    fn rotor(&self) -> Rotor {
        Rotor::new(self.angle)
    }
}

/// Closest-feature query result. `normal` points from shape A toward shape B;
/// negative `distance` means the shapes overlap by that depth.
#[derive(Debug, Clone, Copy)]
pub struct DistanceResult {
    pub distance: f64,
    pub a_point: DVec2,
    pub b_point: DVec2,
    pub normal: DVec2,
}

type DistanceFn = fn(&Shape, Pose, &Shape, Pose) -> DistanceResult;

/// Narrow-phase dispatch, keyed by the pair of shape kinds. Point masses have
/// no geometry, so their rows and columns stay empty; adding a shape kind
/// means adding one row, one column, and the new distance functions.
const DISPATCH: [[Option<DistanceFn>; 3]; 3] = [
    // vs. Circle               vs. Polygon               vs. PointMass
    [Some(circle_circle), Some(circle_polygon), None], // Circle
    [Some(polygon_circle), Some(polygon_polygon), None], // Polygon
    [None, None, None],                                // PointMass
];

fn kind_index(kind: ShapeKind) -> usize {
    match kind {
        ShapeKind::Circle => 0,
        ShapeKind::Polygon => 1,
        ShapeKind::PointMass => 2,
    }
}

/// Exact closest-feature distance between two placed shapes, or `None` when
/// either shape has no collision geometry.
pub fn distance_between_shapes(a: &Shape, pose_a: Pose, b: &Shape, pose_b: Pose) -> Option<DistanceResult> {
    DISPATCH[kind_index(a.kind())][kind_index(b.kind())].map(|f| f(a, pose_a, b, pose_b))
}

const DEGENERATE_EPSILON: f64 = 1e-12;
const FEATURE_EPSILON: f64 = 1e-9;

fn world_center(shape: &Shape, pose: &Pose) -> DVec2 {
    pose.position + pose.rotor().apply(shape.position)
}

fn world_points(shape: &Shape, pose: &Pose) -> Vec<DVec2> {
    let rotor = pose.rotor();
    let ShapeGeometry::Polygon(polygon) = &shape.geometry else {
        unreachable!("dispatch table only routes polygons here");
    };
    polygon
        .points()
        .iter()
        .map(|p| pose.position + rotor.apply(shape.position + *p))
        .collect()
}

fn circle_radius(shape: &Shape) -> f64 {
    match &shape.geometry {
        ShapeGeometry::Circle { radius } => *radius,
        _ => unreachable!("dispatch table only routes circles here"),
    }
}

fn closest_point_on_segment(p: DVec2, q: DVec2, point: DVec2) -> DVec2 {
    let edge = q - p;
    let length_squared = edge.length_squared();
    if length_squared < DEGENERATE_EPSILON {
        return p;
    }
    let t = ((point - p).dot(edge) / length_squared).clamp(0.0, 1.0);
    p + edge * t
}

fn circle_circle(a: &Shape, pose_a: Pose, b: &Shape, pose_b: Pose) -> DistanceResult {
    let center_a = world_center(a, &pose_a);
    let center_b = world_center(b, &pose_b);
    let radius_a = circle_radius(a);
    let radius_b = circle_radius(b);

    let delta = center_b - center_a;
    let center_distance = delta.length();
    let normal = if center_distance < DEGENERATE_EPSILON {
        DVec2::X
    } else {
        delta / center_distance
    };

    DistanceResult {
        distance: center_distance - radius_a - radius_b,
        a_point: center_a + normal * radius_a,
        b_point: center_b - normal * radius_b,
        normal,
    }
}

fn circle_polygon(a: &Shape, pose_a: Pose, b: &Shape, pose_b: Pose) -> DistanceResult {
    let center = world_center(a, &pose_a);
    let radius = circle_radius(a);
    let points = world_points(b, &pose_b);

    let mut inside = true;
    let mut closest = points[0];
    let mut closest_distance = f64::MAX;
    let mut closest_edge = 0;

    for i in 0..points.len() {
        let p = points[i];
        let q = points[(i + 1) % points.len()];
        if (q - p).perp_dot(center - p) > 0.0 {
            inside = false;
        }
        let candidate = closest_point_on_segment(p, q, center);
        let candidate_distance = (center - candidate).length();
        if candidate_distance < closest_distance {
            closest_distance = candidate_distance;
            closest = candidate;
            closest_edge = i;
        }
    }

    // Normal stays direction-continuous as the center crosses the boundary:
    // inward edge normal at the boundary, then from the boundary projection
    // toward the center once inside.
    let normal = if closest_distance < DEGENERATE_EPSILON {
        let p = points[closest_edge];
        let q = points[(closest_edge + 1) % points.len()];
        -(q - p).perp().normalize()
    } else if inside {
        (center - closest) / closest_distance
    } else {
        (closest - center) / closest_distance
    };

    let distance = if inside {
        -(closest_distance + radius)
    } else {
        closest_distance - radius
    };

    DistanceResult {
        distance,
        a_point: center + normal * radius,
        b_point: closest,
        normal,
    }
}

fn polygon_circle(a: &Shape, pose_a: Pose, b: &Shape, pose_b: Pose) -> DistanceResult {
    flip(circle_polygon(b, pose_b, a, pose_a))
}

fn flip(result: DistanceResult) -> DistanceResult {
    DistanceResult {
        distance: result.distance,
        a_point: result.b_point,
        b_point: result.a_point,
        normal: -result.normal,
    }
}

/// Best separating axis over one polygon's edge normals.
fn best_axis(reference: &[DVec2], incident: &[DVec2]) -> (f64, usize, DVec2) {
    let mut best_separation = f64::MIN;
    let mut best_edge = 0;
    let mut best_normal = DVec2::X;

    for i in 0..reference.len() {
        let p = reference[i];
        let q = reference[(i + 1) % reference.len()];
        let edge = q - p;
        if edge.length_squared() < DEGENERATE_EPSILON {
            continue;
        }
        // Stored winding keeps the interior on the non-positive side of
        // perp(edge), so perp(edge) is the outward normal.
        let normal = edge.perp().normalize();
        let support = incident.iter().map(|v| normal.dot(*v)).fold(f64::MAX, f64::min);
        let separation = support - normal.dot(p);
        if separation > best_separation {
            best_separation = separation;
            best_edge = i;
            best_normal = normal;
        }
    }

    (best_separation, best_edge, best_normal)
}

fn polygon_polygon(a: &Shape, pose_a: Pose, b: &Shape, pose_b: Pose) -> DistanceResult {
    let points_a = world_points(a, &pose_a);
    let points_b = world_points(b, &pose_b);

    let (separation_a, edge_a, normal_a) = best_axis(&points_a, &points_b);
    let (separation_b, edge_b, normal_b) = best_axis(&points_b, &points_a);

    // First strict maximum wins, so ties resolve to A's axis and the reported
    // normal is stable frame to frame.
    let ref_is_a = separation_a >= separation_b;
    let (separation, edge, normal, reference, incident) = if ref_is_a {
        (separation_a, edge_a, normal_a, &points_a, &points_b)
    } else {
        (separation_b, edge_b, normal_b, &points_b, &points_a)
    };

    let ref_p = reference[edge];
    let ref_q = reference[(edge + 1) % reference.len()];

    // Support feature of the incident polygon along -normal: a vertex, or a
    // whole edge when one runs parallel to the reference edge.
    let mut support_index = 0;
    let mut support_value = f64::MAX;
    for (i, v) in incident.iter().enumerate() {
        let value = normal.dot(*v);
        if value < support_value {
            support_value = value;
            support_index = i;
        }
    }
    let next = (support_index + 1) % incident.len();
    let prev = (support_index + incident.len() - 1) % incident.len();
    let coplanar_neighbor = if normal.dot(incident[next]) - support_value < FEATURE_EPSILON {
        Some(next)
    } else if normal.dot(incident[prev]) - support_value < FEATURE_EPSILON {
        Some(prev)
    } else {
        None
    };

    let (ref_point, inc_point) = match coplanar_neighbor {
        None => {
            let vertex = incident[support_index];
            (closest_point_on_segment(ref_p, ref_q, vertex), vertex)
        }
        Some(neighbor) => {
            // Parallel edge pair: contact at the midpoint of the projected
            // overlap, or at the nearest endpoints when the projections are
            // disjoint.
            let direction = (ref_q - ref_p).normalize();
            let (ref_lo, ref_hi) = ordered(direction.dot(ref_p), direction.dot(ref_q));
            let inc_a = incident[support_index];
            let inc_b = incident[neighbor];
            let (inc_lo, inc_hi) = ordered(direction.dot(inc_a), direction.dot(inc_b));

            let lo = ref_lo.max(inc_lo);
            let hi = ref_hi.min(inc_hi);
            let (ref_param, inc_param) = if lo <= hi {
                let mid = (lo + hi) / 2.0;
                (mid, mid)
            } else if inc_lo > ref_hi {
                (ref_hi, inc_lo)
            } else {
                (ref_lo, inc_hi)
            };

            (
                ref_p + direction * (ref_param - direction.dot(ref_p)),
                inc_a + direction * (inc_param - direction.dot(inc_a)),
            )
        }
    };

    let (a_point, b_point, axis_normal) = if ref_is_a {
        (ref_point, inc_point, normal)
    } else {
        (inc_point, ref_point, -normal)
    };

    if separation > FEATURE_EPSILON {
        // Separated: the true gap is the feature-point distance, which
        // exceeds the axis separation for diagonal (corner-to-corner) cases.
        let delta = b_point - a_point;
        let distance = delta.length();
        let normal = if distance > DEGENERATE_EPSILON {
            delta / distance
        } else {
            axis_normal
        };
        DistanceResult {
            distance,
            a_point,
            b_point,
            normal,
        }
    } else {
        DistanceResult {
            distance: separation,
            a_point,
            b_point,
            normal: axis_normal,
        }
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::shapes::Polygon;

    fn square() -> Shape {
        Shape::polygon(
            Polygon::new(vec![
                DVec2::new(-1.0, -1.0),
                DVec2::new(-1.0, 1.0),
                DVec2::new(1.0, 1.0),
                DVec2::new(1.0, -1.0),
            ])
            .unwrap(),
            0.0,
        )
    }

    fn at(x: f64, y: f64) -> Pose {
        Pose::new(DVec2::new(x, y), 0.0)
    }

    #[test]
    fn point_masses_have_no_distance() {
        let a = Shape::point_mass(1.0);
        let b = Shape::circle(1.0, 1.0);
        assert!(distance_between_shapes(&a, at(0.0, 0.0), &b, at(1.0, 0.0)).is_none());
        assert!(distance_between_shapes(&b, at(0.0, 0.0), &a, at(1.0, 0.0)).is_none());
    }

    #[test]
    fn circle_circle_reports_surface_points() {
        let a = Shape::circle(1.0, 1.0);
        let b = Shape::circle(2.0, 1.0);
        let result = distance_between_shapes(&a, at(0.0, 0.0), &b, at(10.0, 0.0)).unwrap();
        assert!((result.distance - 7.0).abs() < 1e-12);
        assert_eq!(result.normal, DVec2::X);
        assert_eq!(result.a_point, DVec2::new(1.0, 0.0));
        assert_eq!(result.b_point, DVec2::new(8.0, 0.0));
    }

    #[test]
    fn circle_polygon_signed_distance() {
        let circle = Shape::circle(1.0, 0.0);
        let polygon = square();

        let cases = [
            ((1.0, 0.0), (4.0, 0.0), 1.0),
            ((1.0, 0.0), (2.9, 0.0), -0.1),
            ((1.0, 0.0), (0.0, 3.0), 1.0),
            ((1.0, 0.0), (0.0, 1.9), -0.1),
            ((1.0, 0.0), (0.5, 0.5), -1.5),
            ((1.0, 0.0), (0.0, 0.0), -1.0),
        ];
        for ((cx, cy), (px, py), expected) in cases {
            let result =
                distance_between_shapes(&circle, at(cx, cy), &polygon, at(px, py)).unwrap();
            assert!(
                (result.distance - expected).abs() < 1e-9,
                "circle at ({cx},{cy}) vs square at ({px},{py}): {} != {expected}",
                result.distance
            );
        }
    }

    #[test]
    fn polygon_polygon_face_contact() {
        let a = square();
        let b = square();

        let result = distance_between_shapes(&a, at(1.0, 0.0), &b, at(4.0, 0.0)).unwrap();
        assert!((result.distance - 1.0).abs() < 1e-9);
        assert_eq!(result.normal, DVec2::X);
        assert_eq!(result.a_point, DVec2::new(2.0, 0.0));
        assert_eq!(result.b_point, DVec2::new(3.0, 0.0));

        let result = distance_between_shapes(&a, at(1.0, 0.0), &b, at(2.0, 0.0)).unwrap();
        assert!((result.distance + 1.0).abs() < 1e-9);
        assert_eq!(result.normal, DVec2::X);
        assert_eq!(result.a_point, DVec2::new(2.0, 0.0));
        assert_eq!(result.b_point, DVec2::new(1.0, 0.0));
    }

    #[test]
    fn polygon_polygon_corner_to_corner() {
        let a = square();
        let b = square();
        let result = distance_between_shapes(&a, at(0.0, 0.0), &b, at(3.0, 3.0)).unwrap();
        assert!((result.distance - 2.0_f64.sqrt()).abs() < 1e-9);

        let touching = distance_between_shapes(&a, at(0.0, 0.0), &b, at(2.0, 2.0)).unwrap();
        assert!(touching.distance.abs() < 1e-9);
    }

    #[test]
    fn polygon_triangle_overlap_depths() {
        let a = square();
        let triangle = Shape::polygon(
            Polygon::new(vec![
                DVec2::new(-1.0, -1.0),
                DVec2::new(1.0, -1.0),
                DVec2::new(0.0, 1.0),
            ])
            .unwrap(),
            0.0,
        );

        let result = distance_between_shapes(&a, at(1.0, 0.0), &triangle, at(10.0, 0.0)).unwrap();
        assert!((result.distance - 7.0).abs() < 1e-9);

        let result = distance_between_shapes(&a, at(1.0, 0.0), &triangle, at(2.0, 0.0)).unwrap();
        assert!((result.distance + 2.0 / 5.0_f64.sqrt()).abs() < 1e-9);

        let result = distance_between_shapes(&a, at(1.0, 0.0), &triangle, at(1.0, 1.0)).unwrap();
        assert!((result.distance + 1.0).abs() < 1e-9);
    }
}
