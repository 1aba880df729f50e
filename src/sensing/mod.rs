//! Sensor detection and track correlation.
//!
//! Every frame each body broadcasts its merged signature; every other body's
//! sensor suite gets one detection pass against that snapshot, and the fresh
//! detections are correlated against the previous frame's to estimate target
//! velocities without any telemetry from the targets themselves.

pub mod sensor;
pub mod signature;

pub use sensor::{SensedObject, Sensor, Side};
pub use signature::Signature;

use glam::DVec2;
use rand::seq::SliceRandom;

use crate::config;
use crate::utils::BodyId;

/// Begin-of-frame emission snapshot of one body.
#[derive(Debug, Clone)]
pub(crate) struct SigObject {
    pub position: DVec2,
    pub signature: Signature,
    pub side: i32,
    pub body: BodyId,
}

/// One observer's detection pass over the frame snapshot.
///
/// The result is shuffled so consumers cannot rely on registry ordering to
/// tell targets apart; everything they learn has to come from the detections
/// themselves.
pub(crate) fn scan_body(
    observer_position: DVec2,
    observer_side: i32,
    sensors: &[Sensor],
    snapshot: &[SigObject],
    observer: BodyId,
) -> Vec<SensedObject> {
    let mut detections = Vec::new();

    for target in snapshot {
        if target.body == observer {
            continue;
        }
        let distance =
            (observer_position - target.position).length() + config::SENSOR_DISTANCE_EPSILON;

        let mut merged = Signature::NONE;
        let mut identified = false;
        for sensor in sensors {
            if distance > sensor.max_range() {
                continue;
            }
            let partial = sensor.intensity(&target.signature, distance);
            if partial.is_present() {
                merged.merge_max(&partial);
                identified = identified || sensor.gives_identification();
            }
        }
        if !merged.is_present() {
            continue;
        }

        let side = if identified {
            if target.side == 0 {
                Side::Neutral
            } else if target.side == observer_side {
                Side::Friendly
            } else {
                Side::Enemy
            }
        } else {
            Side::Unknown
        };

        detections.push(SensedObject {
            position: target.position - observer_position,
            velocity: DVec2::ZERO,
            signature: merged,
            side,
            body: target.body,
        });
    }

    detections.shuffle(&mut rand::thread_rng());
    detections
}

/// Matches this frame's detections against last frame's to back-solve target
/// velocities. `old_scan` is consumed; unmatched new detections keep zero
/// velocity (first contact, no track history).
pub(crate) fn correlate(
    new_scan: &mut [SensedObject],
    mut old_scan: Vec<SensedObject>,
    frame_time: f64,
) {
    if frame_time <= 0.0 {
        return;
    }

    // Dead-reckon the old tracks forward one frame, then search around each
    // new detection with an expanding window along the sort axis.
    for old in &mut old_scan {
        old.position += old.velocity * frame_time;
    }
    old_scan.sort_by(|l, r| l.position.x.total_cmp(&r.position.x));

    let mut unmatched: Vec<usize> = (0..new_scan.len()).collect();
    let mut radius = config::TRACK_SEARCH_RADIUS_MIN;

    while radius <= config::TRACK_SEARCH_RADIUS_MAX && !unmatched.is_empty() && !old_scan.is_empty()
    {
        let mut still_unmatched = Vec::with_capacity(unmatched.len());
        for index in unmatched {
            let detection = &new_scan[index];
            let window_start = old_scan
                .partition_point(|old| old.position.x < detection.position.x - radius);
            let window_end = old_scan
                .partition_point(|old| old.position.x <= detection.position.x + radius);

            let matched = (window_start..window_end).find(|&candidate| {
                let old = &old_scan[candidate];
                (old.position.y - detection.position.y).abs() <= radius
                    && detection
                        .signature
                        .approx_equals(&old.signature, config::TRACK_SIGNATURE_RATIO)
            });

            match matched {
                Some(candidate) => {
                    let old = old_scan.remove(candidate);
                    let detection = &mut new_scan[index];
                    detection.velocity =
                        (detection.position - old.position) / frame_time - old.velocity;
                }
                None => still_unmatched.push(index),
            }
        }
        unmatched = still_unmatched;
        radius *= 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(x: f64, y: f64, signature: Signature, body: BodyId) -> SensedObject {
        SensedObject {
            position: DVec2::new(x, y),
            velocity: DVec2::ZERO,
            signature,
            side: Side::Unknown,
            body,
        }
    }

    fn body_ids(count: usize) -> Vec<BodyId> {
        let mut arena = crate::utils::Arena::new();
        (0..count).map(|i| arena.insert(i)).collect()
    }

    #[test]
    fn correlation_back_solves_velocity() {
        let ids = body_ids(1);
        let sig = Signature::new(0.0, 0.0, 50.0);

        let old = vec![detection(10.0, 0.0, sig, ids[0])];
        let mut new = vec![detection(15.0, 0.0, sig, ids[0])];
        correlate(&mut new, old, 1.0);
        assert_eq!(new[0].velocity, DVec2::new(5.0, 0.0));
    }

    #[test]
    fn correlation_rejects_dissimilar_signatures() {
        let ids = body_ids(2);
        let old = vec![detection(10.0, 0.0, Signature::new(0.0, 0.0, 50.0), ids[0])];
        let mut new = vec![detection(12.0, 0.0, Signature::new(0.0, 0.0, 5.0), ids[1])];
        correlate(&mut new, old, 1.0);
        assert_eq!(new[0].velocity, DVec2::ZERO);
    }

    #[test]
    fn correlation_window_expands_to_distant_tracks() {
        let ids = body_ids(1);
        let sig = Signature::new(12.0, 0.0, 0.0);

        // 500 units of travel in one frame: outside the initial window but
        // inside the capped one.
        let old = vec![detection(0.0, 0.0, sig, ids[0])];
        let mut new = vec![detection(500.0, 0.0, sig, ids[0])];
        correlate(&mut new, old, 1.0);
        assert_eq!(new[0].velocity, DVec2::new(500.0, 0.0));
    }
}
