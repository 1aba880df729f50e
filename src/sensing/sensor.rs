use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::sensing::signature::Signature;
use crate::utils::BodyId;

/// Faction classification of a detection, relative to the observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Friendly,
    Enemy,
    Neutral,
    Unknown,
}

/// One detection in a body's per-frame sensor view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensedObject {
    /// Position relative to the observer.
    pub position: DVec2,
    /// Estimated from frame-to-frame track correlation; zero on first
    /// contact.
    pub velocity: DVec2,
    /// The portion of the target's signature this observer's sensors can see.
    pub signature: Signature,
    pub side: Side,
    pub body: BodyId,
}

/// A detection instrument carried by a body.
///
/// `perf` models degradation (battle damage, interference): 1.0 is nominal,
/// 0.0 is dead. It scales both sensitivity and maximum range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Sensor {
    /// Emits and listens for the echo; sees radar cross-sections and can
    /// identify what it paints.
    ActiveRadar { power: f64, sensitivity: f64, perf: f64 },
    /// Listens for the target's own radar emissions.
    PassiveRadar { sensitivity: f64, perf: f64 },
    /// Listens for the target's thermal emissions.
    PassiveThermal { sensitivity: f64, perf: f64 },
}

impl Sensor {
    pub fn active_radar(power: f64, sensitivity: f64) -> Self {
        Sensor::ActiveRadar {
            power,
            sensitivity,
            perf: 1.0,
        }
    }

    pub fn passive_radar(sensitivity: f64) -> Self {
        Sensor::PassiveRadar {
            sensitivity,
            perf: 1.0,
        }
    }

    pub fn passive_thermal(sensitivity: f64) -> Self {
        Sensor::PassiveThermal {
            sensitivity,
            perf: 1.0,
        }
    }

    pub fn with_perf(mut self, value: f64) -> Self {
        self.set_perf(value);
        self
    }

    pub fn perf(&self) -> f64 {
        match self {
            Sensor::ActiveRadar { perf, .. }
            | Sensor::PassiveRadar { perf, .. }
            | Sensor::PassiveThermal { perf, .. } => *perf,
        }
    }

    pub fn set_perf(&mut self, value: f64) {
        match self {
            Sensor::ActiveRadar { perf, .. }
            | Sensor::PassiveRadar { perf, .. }
            | Sensor::PassiveThermal { perf, .. } => *perf = value,
        }
    }

    /// The part of `target` this sensor picks up at the given distance, or an
    /// empty signature when the return falls below the sensitivity floor.
    pub fn intensity(&self, target: &Signature, distance: f64) -> Signature {
        match self {
            Sensor::ActiveRadar {
                power,
                sensitivity,
                perf,
            } => {
                let echo = target.radar_cross_section * power * perf / (2.0 * distance);
                if echo < *sensitivity {
                    Signature::NONE
                } else {
                    Signature::new(0.0, 0.0, target.radar_cross_section)
                }
            }
            Sensor::PassiveRadar { sensitivity, perf } => {
                if target.radar_emissions * perf / distance < *sensitivity {
                    Signature::NONE
                } else {
                    Signature::new(target.radar_emissions, 0.0, 0.0)
                }
            }
            Sensor::PassiveThermal { sensitivity, perf } => {
                if target.thermal_emissions * perf / distance < *sensitivity {
                    Signature::NONE
                } else {
                    Signature::new(0.0, target.thermal_emissions, 0.0)
                }
            }
        }
    }

    /// Whether a detection through this sensor reveals the target's faction.
    pub fn gives_identification(&self) -> bool {
        matches!(self, Sensor::ActiveRadar { .. })
    }

    pub fn max_range(&self) -> f64 {
        match self {
            Sensor::ActiveRadar {
                power,
                sensitivity,
                perf,
            } => power * config::ACTIVE_RADAR_RANGE_FACTOR * perf / sensitivity,
            Sensor::PassiveRadar { sensitivity, perf } => {
                config::PASSIVE_RADAR_RANGE_FACTOR * perf / sensitivity
            }
            Sensor::PassiveThermal { sensitivity, perf } => {
                config::PASSIVE_THERMAL_RANGE_FACTOR * perf / sensitivity
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_range_scales_with_perf() {
        let radar = Sensor::active_radar(50.0, 2.0);
        assert_eq!(radar.max_range(), 625.0);
        assert_eq!(radar.with_perf(0.5).max_range(), 312.5);

        let passive = Sensor::passive_radar(3.0);
        assert_eq!(passive.max_range(), 50.0 / 3.0);
        assert_eq!(passive.with_perf(0.5).max_range(), 50.0 / 6.0);

        let thermal = Sensor::passive_thermal(3.0);
        assert_eq!(thermal.max_range(), 2500.0 / 3.0);
        assert_eq!(thermal.with_perf(0.5).max_range(), 2500.0 / 6.0);
    }

    #[test]
    fn sensors_see_only_their_component() {
        let target = Signature::new(10.0, 15.0, 20.0);

        let radar = Sensor::active_radar(50.0, 1.0);
        assert_eq!(radar.intensity(&target, 10.0).as_tuple(), (0.0, 0.0, 20.0));

        let passive = Sensor::passive_radar(1.0);
        assert_eq!(passive.intensity(&target, 5.0).as_tuple(), (10.0, 0.0, 0.0));

        let thermal = Sensor::passive_thermal(1.0);
        assert_eq!(thermal.intensity(&target, 10.0).as_tuple(), (0.0, 15.0, 0.0));
    }

    #[test]
    fn weak_returns_fall_below_the_floor() {
        let radar = Sensor::active_radar(1.0, 10.0);
        let faint = Signature::new(0.0, 0.0, 1.0);
        assert!(!radar.intensity(&faint, 100.0).is_present());
    }
}
