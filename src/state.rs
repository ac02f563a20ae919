//! Propagation output and classical (osculating) elements derived from it.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::datetime::TWOPI;

const SMALL: f64 = 1.0e-8;

/// Position (km) and velocity (km/s) in the TEME frame, `minutes` after epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub minutes: f64,
    pub position: [f64; 3],
    pub velocity: [f64; 3],
}

impl StateVector {
    /// Distance from the earth's centre, km.
    pub fn radius(&self) -> f64 {
        mag(&self.position)
    }

    pub fn speed(&self) -> f64 {
        mag(&self.velocity)
    }

    /// Osculating elements for this state under gravitational parameter `mu`
    /// (km³/s²).
    pub fn osculating(&self, mu: f64) -> Option<Osculating> {
        Osculating::from_state(&self.position, &self.velocity, mu)
    }
}

pub fn mag(x: &[f64; 3]) -> f64 {
    dot(x, x).sqrt()
}

pub fn dot(x: &[f64; 3], y: &[f64; 3]) -> f64 {
    x[0] * y[0] + x[1] * y[1] + x[2] * y[2]
}

pub fn cross(a: &[f64; 3], b: &[f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Angle in [0, π] between two vectors, `None` if either is degenerate.
pub fn angle(a: &[f64; 3], b: &[f64; 3]) -> Option<f64> {
    let magab = mag(a) * mag(b);
    if magab > SMALL * SMALL {
        Some((dot(a, b) / magab).clamp(-1.0, 1.0).acos())
    } else {
        None
    }
}

/// Shape of an orbit, which decides which angles are defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrbitShape {
    EllipticalInclined,
    EllipticalEquatorial,
    CircularInclined,
    CircularEquatorial,
}

/// Classical elements of the two-body orbit through one state.
///
/// Angles are radians. Angles that are undefined for the orbit's shape are
/// `None`; `mean_anomaly` is replaced by the argument of latitude for
/// circular inclined orbits and the true longitude for circular equatorial
/// ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Osculating {
    pub shape: OrbitShape,
    /// Semi-latus rectum, km.
    pub semi_latus_rectum: f64,
    /// km, `None` for a parabolic trajectory.
    pub semi_major_axis: Option<f64>,
    pub eccentricity: f64,
    pub inclination: f64,
    pub right_ascension: Option<f64>,
    pub argument_of_perigee: Option<f64>,
    pub true_anomaly: Option<f64>,
    pub mean_anomaly: Option<f64>,
    pub argument_of_latitude: Option<f64>,
    pub true_longitude: Option<f64>,
    pub longitude_of_periapsis: Option<f64>,
}

impl Osculating {
    /// `None` when the angular momentum vanishes (rectilinear motion).
    pub fn from_state(r: &[f64; 3], v: &[f64; 3], mu: f64) -> Option<Osculating> {
        let magr = mag(r);
        let magv = mag(v);
        let hbar = cross(r, v);
        let magh = mag(&hbar);
        if magh <= SMALL {
            return None;
        }

        let nbar = [-hbar[1], hbar[0], 0.0];
        let magn = mag(&nbar);
        let c1 = magv * magv - mu / magr;
        let rdotv = dot(r, v);
        let ebar = [
            (c1 * r[0] - rdotv * v[0]) / mu,
            (c1 * r[1] - rdotv * v[1]) / mu,
            (c1 * r[2] - rdotv * v[2]) / mu,
        ];
        let ecc = mag(&ebar);

        let sme = 0.5 * magv * magv - mu / magr;
        let semi_major_axis = (sme.abs() > SMALL).then(|| -mu / (2.0 * sme));
        let p = magh * magh / mu;
        let incl = (hbar[2] / magh).clamp(-1.0, 1.0).acos();

        let equatorial = incl < SMALL || (incl - PI).abs() < SMALL;
        let shape = match (ecc < SMALL, equatorial) {
            (true, true) => OrbitShape::CircularEquatorial,
            (true, false) => OrbitShape::CircularInclined,
            (false, true) => OrbitShape::EllipticalEquatorial,
            (false, false) => OrbitShape::EllipticalInclined,
        };

        let right_ascension = (magn > SMALL).then(|| {
            let omega = (nbar[0] / magn).clamp(-1.0, 1.0).acos();
            if nbar[1] < 0.0 {
                TWOPI - omega
            } else {
                omega
            }
        });

        let argument_of_perigee = match shape {
            OrbitShape::EllipticalInclined => angle(&nbar, &ebar)
                .map(|argp| if ebar[2] < 0.0 { TWOPI - argp } else { argp }),
            _ => None,
        };

        let true_anomaly = match shape {
            OrbitShape::EllipticalInclined | OrbitShape::EllipticalEquatorial => {
                angle(&ebar, r).map(|nu| if rdotv < 0.0 { TWOPI - nu } else { nu })
            }
            _ => None,
        };

        let argument_of_latitude = match shape {
            OrbitShape::CircularInclined => {
                angle(&nbar, r).map(|u| if r[2] < 0.0 { TWOPI - u } else { u })
            }
            _ => None,
        };

        let longitude_of_periapsis = match shape {
            OrbitShape::EllipticalEquatorial => {
                let mut lonper = (ebar[0] / ecc).clamp(-1.0, 1.0).acos();
                if ebar[1] < 0.0 {
                    lonper = TWOPI - lonper;
                }
                if incl > 0.5 * PI {
                    lonper = TWOPI - lonper;
                }
                Some(lonper)
            }
            _ => None,
        };

        let true_longitude = match shape {
            OrbitShape::CircularEquatorial if magr > SMALL => {
                let mut truelon = (r[0] / magr).clamp(-1.0, 1.0).acos();
                if r[1] < 0.0 {
                    truelon = TWOPI - truelon;
                }
                if incl > 0.5 * PI {
                    truelon = TWOPI - truelon;
                }
                Some(truelon)
            }
            _ => None,
        };

        let mean_anomaly = match shape {
            OrbitShape::CircularInclined => argument_of_latitude,
            OrbitShape::CircularEquatorial => true_longitude,
            _ => true_anomaly.and_then(|nu| mean_from_true(ecc, nu)),
        };

        Some(Osculating {
            shape,
            semi_latus_rectum: p,
            semi_major_axis,
            eccentricity: ecc,
            inclination: incl,
            right_ascension,
            argument_of_perigee,
            true_anomaly,
            mean_anomaly,
            argument_of_latitude,
            true_longitude,
            longitude_of_periapsis,
        })
    }

    /// Perigee radius, km. Undefined for open orbits.
    pub fn perigee(&self) -> Option<f64> {
        self.semi_major_axis
            .filter(|a| *a > 0.0)
            .map(|a| a * (1.0 - self.eccentricity))
    }

    pub fn apogee(&self) -> Option<f64> {
        self.semi_major_axis
            .filter(|a| *a > 0.0 && self.eccentricity < 1.0)
            .map(|a| a * (1.0 + self.eccentricity))
    }
}

/// Mean anomaly in [0, 2π) for a true anomaly on an elliptic orbit. Open
/// orbits have no periodic mean anomaly and give `None`.
pub fn mean_from_true(ecc: f64, nu: f64) -> Option<f64> {
    if ecc.abs() < SMALL {
        return Some(nu.rem_euclid(TWOPI));
    }
    if ecc >= 1.0 - SMALL {
        return None;
    }
    let denom = 1.0 + ecc * nu.cos();
    let sine = (1.0 - ecc * ecc).sqrt() * nu.sin() / denom;
    let cose = (ecc + nu.cos()) / denom;
    let e0 = sine.atan2(cose);
    Some((e0 - ecc * e0.sin()).rem_euclid(TWOPI))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datetime::DEG2RAD;

    fn approx(actual: f64, expected: f64, tol: f64) {
        let diff = (actual - expected).abs();
        assert!(diff <= tol, "expected {expected}, got {actual} (|Δ| = {diff})");
    }

    #[test]
    fn vector_helpers() {
        approx(mag(&[3.0, 4.0, 12.0]), 13.0, 1e-12);
        approx(dot(&[1.0, 2.0, 3.0], &[4.0, -5.0, 6.0]), 12.0, 1e-12);
        assert_eq!(cross(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]), [0.0, 0.0, 1.0]);
        approx(angle(&[1.0, 0.0, 0.0], &[0.0, 1.0, 0.0]).unwrap(), PI / 2.0, 1e-12);
        assert_eq!(angle(&[0.0; 3], &[1.0, 0.0, 0.0]), None);
    }

    #[test]
    fn mean_anomaly_from_true_anomaly() {
        approx(mean_from_true(0.1, 1.0).unwrap(), 0.838_478_542_901_907_3, 1e-12);
        approx(mean_from_true(0.0, 1.2345).unwrap(), 1.2345, 1e-12);
        assert_eq!(mean_from_true(1.5, 0.5), None);
    }

    #[test]
    fn elliptic_inclined_elements() {
        // a = 26560 km, e = 0.1, i = 55°, Ω = 40°, ω = 30°, ν = 10°
        let r = [8374.048172997831, 18547.275009889749, 12603.838242542852];
        let v = [-3.290244896520, -0.275171108848, 2.719387109636];
        let coe = Osculating::from_state(&r, &v, 398_600.4418).unwrap();

        assert_eq!(coe.shape, OrbitShape::EllipticalInclined);
        approx(coe.semi_latus_rectum, 26294.4, 1e-2);
        approx(coe.semi_major_axis.unwrap(), 26560.0, 1e-2);
        approx(coe.eccentricity, 0.1, 1e-8);
        approx(coe.inclination, 55.0 * DEG2RAD, 1e-8);
        approx(coe.right_ascension.unwrap(), 40.0 * DEG2RAD, 1e-8);
        approx(coe.argument_of_perigee.unwrap(), 30.0 * DEG2RAD, 1e-8);
        approx(coe.true_anomaly.unwrap(), 10.0 * DEG2RAD, 1e-8);
        approx(coe.mean_anomaly.unwrap(), 0.142215, 1e-6);
        assert_eq!(coe.argument_of_latitude, None);
        assert_eq!(coe.longitude_of_periapsis, None);
        approx(coe.perigee().unwrap(), 23904.0, 1e-2);
        approx(coe.apogee().unwrap(), 29216.0, 1e-2);
    }

    #[test]
    fn circular_equatorial_uses_true_longitude() {
        let mu: f64 = 398_600.8;
        let radius = 7000.0;
        let speed = (mu / radius).sqrt();
        let r = [0.0, radius, 0.0];
        let v = [-speed, 0.0, 0.0];
        let coe = Osculating::from_state(&r, &v, mu).unwrap();
        assert_eq!(coe.shape, OrbitShape::CircularEquatorial);
        assert_eq!(coe.right_ascension, None);
        approx(coe.true_longitude.unwrap(), PI / 2.0, 1e-9);
        assert_eq!(coe.mean_anomaly, coe.true_longitude);
        approx(coe.semi_major_axis.unwrap(), radius, 1e-6);
    }

    #[test]
    fn rectilinear_motion_has_no_elements() {
        assert!(Osculating::from_state(&[7000.0, 0.0, 0.0], &[1.0, 0.0, 0.0], 398_600.8).is_none());
    }
}
