use std::collections::{HashMap, HashSet};

use glam::DVec2;
use thiserror::Error;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::collision::broadphase::{ordered_pair, SweepAxes};
use crate::collision::response::{impulse_between, CollisionParameters, CollisionResponse};
use crate::config;
use crate::core::body::Body;
use crate::sensing::{self, SigObject};
use crate::utils::allocator::{Arena, BodyId};
use crate::utils::logging::ScopedTimer;

/// Frame-protocol contract violations. These indicate caller misuse and are
/// never retried internally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("a frame is already open")]
    FrameAlreadyOpen,
    #[error("no frame is open")]
    NoOpenFrame,
    #[error("no collision is pending, check has_next_collision first")]
    NoPendingCollision,
    #[error("bodies are not closing at the contact point")]
    NotClosing,
    #[error("collision references a body that is no longer registered")]
    UnknownBody,
}

/// An unresolved collision event. The participants have been advanced to
/// `time`; resolution (the impulse) is a separate step so the caller can
/// veto, log, or attach game effects first.
#[derive(Debug, Clone, Copy)]
pub struct Collision {
    pub a: BodyId,
    pub b: BodyId,
    pub shape_a: usize,
    pub shape_b: usize,
    /// Absolute simulation time of the impact, inside the open frame window.
    pub time: f64,
    pub touch_point: DVec2,
    /// Points from `a` toward `b`.
    pub normal: DVec2,
}

/// The simulation container: owns the body registry and drives each frame as
/// a sequence of collision events in causal time order.
///
/// Frame protocol: `begin_frame`, then zero or more
/// `has_next_collision` / `next_collision` / `calculate_collision` /
/// `finished_collision` cycles, then `end_frame`. Bodies advance lazily:
/// only collision participants move before the frame boundary, tracked by a
/// per-body clock so no interval is ever integrated twice. Callers must not
/// mutate a body's kinematic state between `next_collision` and the matching
/// `finished_collision`.
pub struct World {
    bodies: Arena<Body>,
    frame_time: f64,
    current_time: f64,
    time_until: f64,
    frame_open: bool,
    body_times: HashMap<BodyId, f64>,
    changed: HashSet<BodyId>,
    removed: HashSet<BodyId>,
    /// Pairs resolved with `renotify = false`: still touching, do not report
    /// the same contact again. Persists until the pair is resolved again.
    ignore_overlap: HashMap<(BodyId, BodyId), bool>,
    /// Pending events in reverse time order, soonest last.
    pending: Vec<Collision>,
    sweep: SweepAxes,
    parallel_enabled: bool,
}

impl World {
    pub fn new(frame_time: f64) -> Self {
        let frame_time = if frame_time <= 0.0 {
            config::DEFAULT_FRAME_TIME
        } else {
            frame_time
        };
        Self {
            bodies: Arena::new(),
            frame_time,
            current_time: 0.0,
            time_until: 0.0,
            frame_open: false,
            body_times: HashMap::new(),
            changed: HashSet::new(),
            removed: HashSet::new(),
            ignore_overlap: HashMap::new(),
            pending: Vec::new(),
            sweep: SweepAxes::new(),
            parallel_enabled: false,
        }
    }

    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn set_parallel_enabled(&mut self, enabled: bool) {
        self.parallel_enabled = enabled;
    }

    pub fn parallel_enabled(&self) -> bool {
        self.parallel_enabled
    }

    pub fn add_body(&mut self, body: Body) -> BodyId {
        let id = self.bodies.insert(body);
        self.body_times.insert(id, self.current_time);
        self.changed.insert(id);
        id
    }

    /// Unregisters a body and purges every pending event referencing it; a
    /// dangling event would be a correctness bug, not just a stale entry.
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        self.body_times.remove(&id);
        self.changed.remove(&id);
        self.removed.insert(id);
        self.pending
            .retain(|collision| collision.a != id && collision.b != id);
        self.ignore_overlap
            .retain(|(a, b), _| *a != id && *b != id);
        self.bodies.remove(id)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> + '_ {
        self.bodies.iter()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Opens the next frame: snapshots signatures, runs one detection pass
    /// per body, and seeds the scheduler with an initial prediction for every
    /// broad-phase candidate pair.
    pub fn begin_frame(&mut self) -> Result<(), WorldError> {
        if self.frame_open {
            return Err(WorldError::FrameAlreadyOpen);
        }
        self.frame_open = true;
        self.current_time = self.time_until;
        self.time_until = self.current_time + self.frame_time;

        // Everybody was advanced to the frame boundary by the last
        // end_frame; restart the per-body clocks together.
        let ids: Vec<BodyId> = self.bodies.ids().collect();
        self.body_times.clear();
        for id in &ids {
            self.body_times.insert(*id, self.current_time);
        }
        self.changed.clear();
        self.removed.clear();

        {
            let _timer = ScopedTimer::new("sensing::scan");
            let snapshot: Vec<SigObject> = self
                .bodies
                .iter()
                .map(|(id, body)| SigObject {
                    position: body.position(),
                    signature: body.signature(),
                    side: body.side(),
                    body: id,
                })
                .collect();
            for id in &ids {
                let Some(body) = self.bodies.get_mut(*id) else {
                    continue;
                };
                let old_view = body.take_sensor_view();
                let mut new_view = sensing::scan_body(
                    body.position(),
                    body.side(),
                    body.sensors(),
                    &snapshot,
                    *id,
                );
                sensing::correlate(&mut new_view, old_view, self.frame_time);
                body.set_sensor_view(new_view);
            }
        }

        {
            let _timer = ScopedTimer::new("broadphase::seed");
            self.sweep.reset(self.bodies.len());
            for (id, body) in self.bodies.iter() {
                self.sweep
                    .add(id, body.aabb(self.frame_time).translated(body.position()));
            }
        }

        let _timer = ScopedTimer::new("narrowphase::seed");
        let candidates = self.sweep.possible_collisions();
        let predictions = self.predict_initial(&candidates);
        self.pending.clear();
        for collision in predictions {
            self.insert_pending(collision);
        }
        Ok(())
    }

    pub fn has_next_collision(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Pops the soonest pending event and advances only the two participants
    /// to its time. The event is returned unresolved.
    pub fn next_collision(&mut self) -> Result<Collision, WorldError> {
        if !self.frame_open {
            return Err(WorldError::NoOpenFrame);
        }
        let collision = self.pending.pop().ok_or(WorldError::NoPendingCollision)?;
        for id in [collision.a, collision.b] {
            let last = self
                .body_times
                .get(&id)
                .copied()
                .unwrap_or(self.current_time);
            if let Some(body) = self.bodies.get_mut(id) {
                body.integrate((collision.time - last).max(0.0));
            }
            self.body_times.insert(id, collision.time);
            self.changed.insert(id);
        }
        Ok(collision)
    }

    /// Computes the impulse pair for an event, without applying it. Fails
    /// with `NotClosing` when the contact is already separating; resolving
    /// such an event is a caller contract violation.
    pub fn calculate_collision(
        &self,
        collision: &Collision,
        params: &CollisionParameters,
    ) -> Result<(CollisionResponse, CollisionResponse), WorldError> {
        let body_a = self.bodies.get(collision.a).ok_or(WorldError::UnknownBody)?;
        let body_b = self.bodies.get(collision.b).ok_or(WorldError::UnknownBody)?;
        let result = impulse_between(
            body_a,
            body_b,
            collision.touch_point,
            collision.normal,
            params,
        )
        .map_err(|_| WorldError::NotClosing)?;

        Ok((
            CollisionResponse {
                body: collision.a,
                other: collision.b,
                time: collision.time,
                touch_point: collision.touch_point - body_a.position(),
                impulse: result.impulse,
                closing_velocity: result.closing_velocity,
            },
            CollisionResponse {
                body: collision.b,
                other: collision.a,
                time: collision.time,
                touch_point: collision.touch_point - body_b.position(),
                impulse: -result.impulse,
                closing_velocity: -result.closing_velocity,
            },
        ))
    }

    /// Applies a response's impulse to its body.
    pub fn apply_response(&mut self, response: &CollisionResponse) -> Result<(), WorldError> {
        let body = self
            .bodies
            .get_mut(response.body)
            .ok_or(WorldError::UnknownBody)?;
        body.apply_impulse(response.impulse, response.touch_point);
        Ok(())
    }

    /// Reports an event as handled. `renotify = false` marks the pair as
    /// ongoing overlap: the same contact will not be reported again while
    /// they stay touching. Re-predicts only pairs involving bodies changed
    /// since the last pass.
    pub fn finished_collision(
        &mut self,
        collision: &Collision,
        renotify: bool,
    ) -> Result<(), WorldError> {
        if !self.frame_open {
            return Err(WorldError::NoOpenFrame);
        }
        self.ignore_overlap
            .insert(ordered_pair(collision.a, collision.b), !renotify);
        self.repredict_changed();
        Ok(())
    }

    /// Closes the frame, advancing every remaining body to the boundary.
    pub fn end_frame(&mut self) -> Result<(), WorldError> {
        if !self.frame_open {
            return Err(WorldError::NoOpenFrame);
        }
        let _timer = ScopedTimer::new("world::end_frame");
        let ids: Vec<BodyId> = self.bodies.ids().collect();
        for id in ids {
            let last = self
                .body_times
                .get(&id)
                .copied()
                .unwrap_or(self.current_time);
            if let Some(body) = self.bodies.get_mut(id) {
                body.integrate((self.time_until - last).max(0.0));
            }
            self.body_times.insert(id, self.time_until);
        }
        self.pending.clear();
        self.changed.clear();
        self.removed.clear();
        self.frame_open = false;
        Ok(())
    }

    fn insert_pending(&mut self, collision: Collision) {
        // Reverse time order keeps the soonest event at the back, so the pop
        // in next_collision is O(1).
        let index = self
            .pending
            .partition_point(|existing| existing.time > collision.time);
        self.pending.insert(index, collision);
    }

    fn pair_ignored(&self, a: BodyId, b: BodyId) -> bool {
        self.ignore_overlap
            .get(&ordered_pair(a, b))
            .copied()
            .unwrap_or(false)
    }

    fn predict_pair(&self, a: BodyId, b: BodyId) -> Option<Collision> {
        let body_a = self.bodies.get(a)?;
        let body_b = self.bodies.get(b)?;
        let result = body_a.collide(body_b, self.frame_time, self.pair_ignored(a, b))?;
        Some(Collision {
            a,
            b,
            shape_a: result.shape_a,
            shape_b: result.shape_b,
            time: self.current_time + result.collision.time,
            touch_point: result.collision.touch_point,
            normal: result.collision.normal,
        })
    }

    /// Initial prediction over the seeded candidate set. Pure reads over a
    /// fixed snapshot, so the sweep parallelizes when enabled.
    #[cfg(feature = "parallel")]
    fn predict_initial(&self, candidates: &[(BodyId, BodyId)]) -> Vec<Collision> {
        if self.parallel_enabled {
            candidates
                .par_iter()
                .filter_map(|(a, b)| self.predict_pair(*a, *b))
                .collect()
        } else {
            candidates
                .iter()
                .filter_map(|(a, b)| self.predict_pair(*a, *b))
                .collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn predict_initial(&self, candidates: &[(BodyId, BodyId)]) -> Vec<Collision> {
        candidates
            .iter()
            .filter_map(|(a, b)| self.predict_pair(*a, *b))
            .collect()
    }

    /// Incremental re-prediction after a resolution or registry change.
    /// Changed bodies sit at different per-body times, so each candidate
    /// pair is peeked forward to a common start time and rewound afterwards.
    fn repredict_changed(&mut self) {
        let _timer = ScopedTimer::new("narrowphase::repredict");

        {
            let changed = &self.changed;
            self.pending
                .retain(|c| !changed.contains(&c.a) && !changed.contains(&c.b));
        }

        for id in std::mem::take(&mut self.removed) {
            self.sweep.remove(id);
        }
        let changed: Vec<BodyId> = self.changed.iter().copied().collect();
        for id in &changed {
            self.sweep.remove(*id);
            let Some(last) = self.body_times.get(id).copied() else {
                continue;
            };
            if let Some(body) = self.bodies.get(*id) {
                let window = self.time_until - last;
                self.sweep
                    .add(*id, body.aabb(window).translated(body.position()));
            }
        }

        let candidates = self.sweep.possible_collisions();
        for (a, b) in candidates {
            if !self.changed.contains(&a) && !self.changed.contains(&b) {
                continue;
            }
            let (Some(time_a), Some(time_b)) =
                (self.body_times.get(&a).copied(), self.body_times.get(&b).copied())
            else {
                continue;
            };
            let start = time_a.max(time_b);
            let window = self.time_until - start;
            let ignore = self.pair_ignored(a, b);

            let Some((body_a, body_b)) = self.bodies.get2_mut(a, b) else {
                continue;
            };
            let state_a = body_a.state();
            let state_b = body_b.state();
            body_a.integrate(start - time_a);
            body_b.integrate(start - time_b);
            let result = body_a.collide(body_b, window, ignore);
            body_a.reset(&state_a);
            body_b.reset(&state_b);

            if let Some(found) = result {
                self.insert_pending(Collision {
                    a,
                    b,
                    shape_a: found.shape_a,
                    shape_b: found.shape_b,
                    time: start + found.collision.time,
                    touch_point: found.collision.touch_point,
                    normal: found.collision.normal,
                });
            }
        }
        self.changed.clear();
    }
}
