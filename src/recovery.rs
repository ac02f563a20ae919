//! Recovery of Brouwer mean elements from the published (Kozai) ones, and
//! the near-earth / deep-space split that follows from them.

use std::f64::consts::PI;

use crate::config::OperationMode;
use crate::datetime::{gstime, gstime_afspc, JD_1950, TWOPI};
use crate::earth_gravity::EarthGravity;
use crate::error::{InvalidOrbit, Result};

/// Orbits with a period at or above this many minutes take the deep-space path.
pub const DEEP_SPACE_PERIOD_MINUTES: f64 = 225.0;

const X2O3: f64 = 2.0 / 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    NearEarth,
    DeepSpace,
}

impl Regime {
    /// Regime for a recovered mean motion in rad/min.
    pub fn classify(mean_motion: f64) -> Regime {
        if TWOPI / mean_motion >= DEEP_SPACE_PERIOD_MINUTES {
            Regime::DeepSpace
        } else {
            Regime::NearEarth
        }
    }
}

/// Epoch quantities shared by the near-earth and deep-space initialisation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recovered {
    /// Brouwer mean motion, rad/min.
    pub mean_motion: f64,
    /// Semi-major axis, earth radii.
    pub semi_major_axis: f64,
    /// Perigee radius, earth radii.
    pub perigee: f64,
    pub eccsq: f64,
    pub omeosq: f64,
    pub rteosq: f64,
    pub cosio: f64,
    pub cosio2: f64,
    pub sinio: f64,
    pub posq: f64,
    pub con41: f64,
    pub con42: f64,
    /// Greenwich sidereal time at epoch, radians.
    pub gsto: f64,
}

/// Undo the Kozai J2 correction baked into a TLE mean motion.
///
/// `mean_motion` is the Kozai value in rad/min, `epoch` is days since
/// 1950 January 0.0.
pub fn recover(
    gravity: &EarthGravity,
    mode: OperationMode,
    eccentricity: f64,
    inclination: f64,
    mean_motion: f64,
    epoch: f64,
) -> Result<Recovered> {
    let eccsq = eccentricity * eccentricity;
    let omeosq = 1.0 - eccsq;
    let rteosq = omeosq.sqrt();
    let cosio = inclination.cos();
    let cosio2 = cosio * cosio;

    let ak = (gravity.xke / mean_motion).powf(X2O3);
    let d1 = 0.75 * gravity.j2 * (3.0 * cosio2 - 1.0) / (rteosq * omeosq);
    let mut del = d1 / (ak * ak);
    let adel = ak * (1.0 - del * del - del * (1.0 / 3.0 + 134.0 * del * del / 81.0));
    del = d1 / (adel * adel);
    let no_unkozai = mean_motion / (1.0 + del);

    let ao = (gravity.xke / no_unkozai).powf(X2O3);
    let po = ao * omeosq;
    let con42 = 1.0 - 5.0 * cosio2;
    let con41 = -con42 - cosio2 - cosio2;
    let rp = ao * (1.0 - eccentricity);

    if !(rp >= 1.0) {
        return Err(InvalidOrbit::PerigeeInsideEarth { perigee_er: rp }.into());
    }

    let gsto = match mode {
        OperationMode::Afspc => gstime_afspc(epoch),
        OperationMode::Improved => gstime(epoch + JD_1950),
    };

    Ok(Recovered {
        mean_motion: no_unkozai,
        semi_major_axis: ao,
        perigee: rp,
        eccsq,
        omeosq,
        rteosq,
        cosio,
        cosio2,
        sinio: inclination.sin(),
        posq: po * po,
        con41,
        con42,
        gsto,
    })
}

impl Recovered {
    pub fn regime(&self) -> Regime {
        Regime::classify(self.mean_motion)
    }

    /// Orbital period in minutes.
    pub fn period(&self) -> f64 {
        2.0 * PI / self.mean_motion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::earth_gravity::GravityModel;
    use crate::elements::fixtures::vanguard;

    fn recover_set(set: &crate::OrbitalElementSet) -> Result<Recovered> {
        recover(
            &GravityModel::Wgs72.constants(),
            OperationMode::Improved,
            set.eccentricity,
            set.inclination,
            set.mean_motion_rad_per_min(),
            set.epoch_days_since_1950(),
        )
    }

    #[test]
    fn recovered_motion_is_slightly_slower_for_prograde_orbits() {
        let set = vanguard();
        let rec = recover_set(&set).unwrap();
        let kozai = set.mean_motion_rad_per_min();
        assert!(rec.mean_motion < kozai);
        assert!((rec.mean_motion - kozai).abs() / kozai < 1.0e-3);
        let a_km = rec.semi_major_axis * 6378.135;
        assert!((a_km - 8635.356).abs() < 1.0e-2, "{a_km}");
        assert!((rec.perigee - rec.semi_major_axis * (1.0 - set.eccentricity)).abs() < 1.0e-15);
    }

    #[test]
    fn period_threshold_splits_regimes() {
        assert_eq!(Regime::classify(TWOPI / 224.5), Regime::NearEarth);
        assert_eq!(Regime::classify(TWOPI / 225.5), Regime::DeepSpace);
        assert_eq!(Regime::classify(TWOPI / 1436.0), Regime::DeepSpace);
        assert_eq!(recover_set(&vanguard()).unwrap().regime(), Regime::NearEarth);
    }

    #[test]
    fn perigee_inside_earth_is_rejected() {
        let sunk = crate::OrbitalElementSet {
            mean_motion: 16.5,
            eccentricity: 0.2,
            ..vanguard()
        };
        assert!(matches!(
            recover_set(&sunk),
            Err(crate::Error::InvalidOrbit(InvalidOrbit::PerigeeInsideEarth { .. }))
        ));
    }

    #[test]
    fn afspc_mode_changes_only_sidereal_time_slightly() {
        let set = vanguard();
        let improved = recover_set(&set).unwrap();
        let afspc = recover(
            &GravityModel::Wgs72.constants(),
            OperationMode::Afspc,
            set.eccentricity,
            set.inclination,
            set.mean_motion_rad_per_min(),
            set.epoch_days_since_1950(),
        )
        .unwrap();
        assert_eq!(improved.mean_motion, afspc.mean_motion);
        assert!((improved.gsto - afspc.gsto).abs() < 1.0e-8);
    }
}
