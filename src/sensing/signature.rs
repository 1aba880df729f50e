use serde::{Deserialize, Serialize};

/// Detectable emissions of a shape or body.
///
/// Signatures merge component-wise by maximum: a body is as loud as its
/// loudest emitter, and a sensor suite sees the strongest reading any single
/// sensor produced.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    pub radar_emissions: f64,
    pub thermal_emissions: f64,
    pub radar_cross_section: f64,
}

impl Signature {
    pub const NONE: Signature = Signature {
        radar_emissions: 0.0,
        thermal_emissions: 0.0,
        radar_cross_section: 0.0,
    };

    pub fn new(radar_emissions: f64, thermal_emissions: f64, radar_cross_section: f64) -> Self {
        Self {
            radar_emissions,
            thermal_emissions,
            radar_cross_section,
        }
    }

    /// True if any component is nonzero.
    pub fn is_present(&self) -> bool {
        self.radar_emissions != 0.0 || self.thermal_emissions != 0.0 || self.radar_cross_section != 0.0
    }

    /// Component-wise maximum merge, in place.
    pub fn merge_max(&mut self, other: &Signature) {
        self.radar_emissions = self.radar_emissions.max(other.radar_emissions);
        self.thermal_emissions = self.thermal_emissions.max(other.thermal_emissions);
        self.radar_cross_section = self.radar_cross_section.max(other.radar_cross_section);
    }

    /// True when every component of `other` lies within `[self * ratio,
    /// self / ratio]`. Used to decide whether two detections one frame apart
    /// could be the same emitter.
    pub fn approx_equals(&self, other: &Signature, ratio: f64) -> bool {
        let component_ok = |own: f64, theirs: f64| theirs >= own * ratio && theirs <= own / ratio;
        component_ok(self.radar_emissions, other.radar_emissions)
            && component_ok(self.thermal_emissions, other.thermal_emissions)
            && component_ok(self.radar_cross_section, other.radar_cross_section)
    }

    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.radar_emissions, self.thermal_emissions, self.radar_cross_section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_takes_component_maximum() {
        let mut sig = Signature::new(10.0, 0.0, 3.0);
        sig.merge_max(&Signature::new(2.0, 5.0, 4.0));
        assert_eq!(sig.as_tuple(), (10.0, 5.0, 4.0));
    }

    #[test]
    fn approx_equality_is_a_ratio_band() {
        let sig = Signature::new(100.0, 0.0, 0.0);
        assert!(sig.approx_equals(&Signature::new(95.0, 0.0, 0.0), 0.9));
        assert!(sig.approx_equals(&Signature::new(110.0, 0.0, 0.0), 0.9));
        assert!(!sig.approx_equals(&Signature::new(80.0, 0.0, 0.0), 0.9));
        assert!(!sig.approx_equals(&Signature::new(100.0, 1.0, 0.0), 0.9));
        assert!(Signature::NONE.approx_equals(&Signature::NONE, 0.9));
    }
}
