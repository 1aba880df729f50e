//! Global tuning constants for the Event Horizon engine.

/// Fallback frame length (in seconds) when a world is built with a
/// non-positive one.
pub const DEFAULT_FRAME_TIME: f64 = 1.0;

/// Separation below which the narrow phase treats two shapes as touching.
pub const CONTACT_EPSILON: f64 = 1e-8;

/// Time nudge used to escape the contact shell when an initial overlap is
/// being ignored.
pub const CONTACT_NUDGE: f64 = 1e-6;

/// Iteration budget for the conservative-advancement loop. A numerical safety
/// valve, not a user-facing cancellation mechanism.
pub const CCD_MAX_ITERATIONS: u32 = 1000;

/// Substeps per simulated second for the trapezoid integration of rotating
/// local forces.
pub const INTEGRATION_SUBSTEP_RATE: f64 = 100.0;

/// Added to sensor target distances so a co-located target cannot divide by
/// zero.
pub const SENSOR_DISTANCE_EPSILON: f64 = 1e-5;

/// Range factor of an active radar (`power * factor / sensitivity`).
pub const ACTIVE_RADAR_RANGE_FACTOR: f64 = 25.0;

/// Range factor of a passive radar (`factor / sensitivity`).
pub const PASSIVE_RADAR_RANGE_FACTOR: f64 = 50.0;

/// Range factor of a passive thermal sensor (`factor / sensitivity`).
pub const PASSIVE_THERMAL_RANGE_FACTOR: f64 = 2500.0;

/// Initial half-width of the track-correlation search window.
pub const TRACK_SEARCH_RADIUS_MIN: f64 = 16.0;

/// The search window doubles per pass until it reaches this cap.
pub const TRACK_SEARCH_RADIUS_MAX: f64 = 1024.0;

/// Component-wise ratio inside which two signatures are considered the same
/// emitter during track correlation.
pub const TRACK_SIGNATURE_RATIO: f64 = 0.9;
