use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box. Maintains `min <= max` on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Aabb {
    pub const ZERO: Aabb = Aabb {
        min_x: 0.0,
        max_x: 0.0,
        min_y: 0.0,
        max_y: 0.0,
    };

    pub fn new(min_x: f64, max_x: f64, min_y: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            max_x: min_x.max(max_x),
            min_y: min_y.min(max_y),
            max_y: min_y.max(max_y),
        }
    }

    /// Smallest box containing a set of points. Zero box for an empty set.
    pub fn from_points(points: &[DVec2]) -> Self {
        let Some(first) = points.first() else {
            return Self::ZERO;
        };
        let mut bb = Self::new(first.x, first.x, first.y, first.y);
        for point in &points[1..] {
            bb.min_x = bb.min_x.min(point.x);
            bb.max_x = bb.max_x.max(point.x);
            bb.min_y = bb.min_y.min(point.y);
            bb.max_y = bb.max_y.max(point.y);
        }
        bb
    }

    pub fn centered(center: DVec2, width: f64, height: f64) -> Self {
        Self::new(
            center.x - width / 2.0,
            center.x + width / 2.0,
            center.y - height / 2.0,
            center.y + height / 2.0,
        )
    }

    /// Union with another box, in place.
    pub fn merge(&mut self, other: &Aabb) {
        self.min_x = self.min_x.min(other.min_x);
        self.max_x = self.max_x.max(other.max_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_y = self.max_y.max(other.max_y);
    }

    pub fn union(mut self, other: &Aabb) -> Self {
        self.merge(other);
        self
    }

    pub fn translated(&self, offset: DVec2) -> Self {
        Self {
            min_x: self.min_x + offset.x,
            max_x: self.max_x + offset.x,
            min_y: self.min_y + offset.y,
            max_y: self.max_y + offset.y,
        }
    }

    pub fn contains(&self, point: DVec2) -> bool {
        self.min_x <= point.x && point.x <= self.max_x && self.min_y <= point.y && point.y <= self.max_y
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    pub fn as_tuple(&self) -> (f64, f64, f64, f64) {
        (self.min_x, self.max_x, self.min_y, self.max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_and_translate() {
        let a = Aabb::new(0.0, 2.0, -1.0, 1.0);
        let b = Aabb::new(-1.0, 1.0, 0.0, 2.0);
        assert_eq!(a.union(&b).as_tuple(), (-1.0, 2.0, -1.0, 2.0));
        assert_eq!(a.translated(DVec2::new(1.0, 0.0)).as_tuple(), (1.0, 3.0, -1.0, 1.0));
    }

    #[test]
    fn corner_constructor_sorts_extents() {
        let bb = Aabb::new(3.0, -1.0, 2.0, -2.0);
        assert_eq!(bb.as_tuple(), (-1.0, 3.0, -2.0, 2.0));
        assert!(bb.contains(DVec2::ZERO));
        assert!(!bb.contains(DVec2::new(4.0, 0.0)));
    }
}
