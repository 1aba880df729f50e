use glam::DVec2;

/// Normalizes an angle in radians to the half-open interval `(-PI, PI]`.
pub fn norm_rad(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(std::f64::consts::TAU);
    if wrapped > std::f64::consts::PI {
        wrapped - std::f64::consts::TAU
    } else {
        wrapped
    }
}

/// Precomputed rotation by a bearing angle.
///
/// Bearing angles grow in the direction that turns `+x` toward `-y`; every
/// rotational quantity in the engine (impulses, torque, swept boxes) uses the
/// same convention. `Rotor::new(a).apply(v)` maps a body-local vector into
/// world space for a body at angle `a`.
#[derive(Debug, Clone, Copy)]
pub struct Rotor {
    cos: f64,
    sin: f64,
}

impl Rotor {
    pub fn new(angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self { cos, sin }
    }

    pub fn apply(&self, v: DVec2) -> DVec2 {
        DVec2::new(
            v.x * self.cos + v.y * self.sin,
            -v.x * self.sin + v.y * self.cos,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

    #[test]
    fn norm_rad_wraps_into_half_open_interval() {
        assert_eq!(norm_rad(0.0), 0.0);
        assert_eq!(norm_rad(PI), PI);
        assert_eq!(norm_rad(-PI), PI);
        assert!((norm_rad(3.0 * PI) - PI).abs() < 1e-12);
        assert!((norm_rad(5.0 * FRAC_PI_2) - FRAC_PI_2).abs() < 1e-12);
        assert!((norm_rad(-FRAC_PI_2) + FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn rotor_turns_x_toward_negative_y() {
        let v = Rotor::new(FRAC_PI_2).apply(DVec2::X);
        assert!(v.x.abs() < 1e-12);
        assert!((v.y + 1.0).abs() < 1e-12);

        let v = Rotor::new(-FRAC_PI_4).apply(DVec2::X);
        assert!((v.x - FRAC_PI_4.cos()).abs() < 1e-12);
        assert!((v.y - FRAC_PI_4.sin()).abs() < 1e-12);
    }
}
