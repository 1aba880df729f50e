use std::collections::BTreeSet;

use crate::utils::{Aabb, BodyId};

/// One endpoint of a body's swept bounding box projected onto an axis.
#[derive(Debug, Clone, Copy)]
struct Shadow {
    position: f64,
    start: bool,
    body: BodyId,
}

/// Sweep-and-prune broad phase.
///
/// Each body contributes a start and an end shadow per axis; a single sweep
/// per axis pairs every body with the bodies whose intervals it overlaps, and
/// the candidate set is the intersection of the X and Y pair sets. Bodies can
/// be removed and re-added with a different time window without rebuilding
/// the other shadows, which is what keeps incremental re-prediction cheap.
#[derive(Debug, Default)]
pub struct SweepAxes {
    x_axis: Vec<Shadow>,
    y_axis: Vec<Shadow>,
}

impl SweepAxes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self, reserve_hint: usize) {
        self.x_axis.clear();
        self.y_axis.clear();
        self.x_axis.reserve(reserve_hint * 2);
        self.y_axis.reserve(reserve_hint * 2);
    }

    /// Inserts a body's world-space swept box.
    pub fn add(&mut self, body: BodyId, aabb: Aabb) {
        Self::insert_shadow(&mut self.x_axis, Shadow { position: aabb.min_x, start: true, body });
        Self::insert_shadow(&mut self.x_axis, Shadow { position: aabb.max_x, start: false, body });
        Self::insert_shadow(&mut self.y_axis, Shadow { position: aabb.min_y, start: true, body });
        Self::insert_shadow(&mut self.y_axis, Shadow { position: aabb.max_y, start: false, body });
    }

    pub fn remove(&mut self, body: BodyId) {
        self.x_axis.retain(|shadow| shadow.body != body);
        self.y_axis.retain(|shadow| shadow.body != body);
    }

    fn insert_shadow(axis: &mut Vec<Shadow>, shadow: Shadow) {
        let index = axis.partition_point(|existing| existing.position <= shadow.position);
        axis.insert(index, shadow);
    }

    fn collisions_on_axis(axis: &[Shadow]) -> BTreeSet<(BodyId, BodyId)> {
        let mut active: BTreeSet<BodyId> = BTreeSet::new();
        let mut pairs = BTreeSet::new();
        for shadow in axis {
            if shadow.start {
                for other in &active {
                    pairs.insert(ordered_pair(*other, shadow.body));
                }
                active.insert(shadow.body);
            } else {
                active.remove(&shadow.body);
            }
        }
        pairs
    }

    /// Candidate pairs whose swept boxes overlap on both axes.
    pub fn possible_collisions(&self) -> Vec<(BodyId, BodyId)> {
        let on_x = Self::collisions_on_axis(&self.x_axis);
        let on_y = Self::collisions_on_axis(&self.y_axis);
        on_x.intersection(&on_y).copied().collect()
    }
}

pub(crate) fn ordered_pair(a: BodyId, b: BodyId) -> (BodyId, BodyId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
