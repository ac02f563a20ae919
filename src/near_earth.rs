//! Near-earth secular model: J2/J4 secular rates, the drag polynomials and
//! the drag decay of semi-major axis and eccentricity.
//!
//! Deep-space orbits run through the same secular stage with the simplified
//! drag model; the lunar/solar terms are layered on top in `deep_space`.

use crate::datetime::TWOPI;
use crate::earth_gravity::EarthGravity;
use crate::error::{Decay, Error, Result};
use crate::recovery::Recovered;

const X2O3: f64 = 2.0 / 3.0;
/// Guards the (1 + cos i) divisor for retrograde equatorial orbits.
const TEMP4: f64 = 1.5e-12;

/// Epoch mean elements in radians, as the propagator sees them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochElements {
    pub ecco: f64,
    pub inclo: f64,
    pub nodeo: f64,
    pub argpo: f64,
    pub mo: f64,
    pub bstar: f64,
}

/// Per-satellite coefficients of the secular and drag series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct NearEarth {
    /// Simplified drag: perigee below 220 km, or any deep-space orbit.
    pub isimp: bool,
    pub aycof: f64,
    pub con41: f64,
    pub cc1: f64,
    pub cc4: f64,
    pub cc5: f64,
    pub d2: f64,
    pub d3: f64,
    pub d4: f64,
    pub delmo: f64,
    pub eta: f64,
    pub argpdot: f64,
    pub omgcof: f64,
    pub sinmao: f64,
    pub t2cof: f64,
    pub t3cof: f64,
    pub t4cof: f64,
    pub t5cof: f64,
    pub x1mth2: f64,
    pub x7thm1: f64,
    pub mdot: f64,
    pub nodedot: f64,
    pub xpidot: f64,
    pub xlcof: f64,
    pub xmcof: f64,
    pub nodecf: f64,
}

/// Mean elements after the secular update but before drag decay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecularElements {
    pub eccentricity: f64,
    pub inclination: f64,
    pub node: f64,
    pub argument_of_perigee: f64,
    pub mean_anomaly: f64,
    /// rad/min
    pub mean_motion: f64,
}

/// Drag factors accumulated over the elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragTerms {
    /// Semi-major axis decay factor (squared before use).
    pub tempa: f64,
    /// Eccentricity decrement.
    pub tempe: f64,
    /// Mean longitude drift in units of the recovered mean motion.
    pub templ: f64,
}

/// Fully updated mean elements at the requested time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanElements {
    /// earth radii
    pub semi_major_axis: f64,
    pub eccentricity: f64,
    pub inclination: f64,
    pub node: f64,
    pub argument_of_perigee: f64,
    pub mean_anomaly: f64,
    /// rad/min
    pub mean_motion: f64,
}

impl NearEarth {
    /// Coefficients for one element set. `deep_space` forces the simplified
    /// drag model and leaves the higher-order drag polynomials at zero.
    pub fn new(
        gravity: &EarthGravity,
        epoch: &EpochElements,
        rec: &Recovered,
        deep_space: bool,
    ) -> NearEarth {
        let no = rec.mean_motion;
        let ao = rec.semi_major_axis;
        let ecco = epoch.ecco;
        let bstar = epoch.bstar;

        let ss = 78.0 / gravity.radius_km + 1.0;
        let qzms2ttemp = (120.0 - 78.0) / gravity.radius_km;
        let qzms2t = qzms2ttemp * qzms2ttemp * qzms2ttemp * qzms2ttemp;

        let mut ne = NearEarth {
            isimp: rec.perigee < 220.0 / gravity.radius_km + 1.0,
            con41: rec.con41,
            ..NearEarth::default()
        };

        let mut sfour = ss;
        let mut qzms24 = qzms2t;
        let perige = (rec.perigee - 1.0) * gravity.radius_km;

        // below 156 km the density function's s and qoms2t move with perigee
        if perige < 156.0 {
            sfour = perige - 78.0;
            if perige < 98.0 {
                sfour = 20.0;
            }
            let qzms24temp = (120.0 - sfour) / gravity.radius_km;
            qzms24 = qzms24temp * qzms24temp * qzms24temp * qzms24temp;
            sfour = sfour / gravity.radius_km + 1.0;
        }

        let pinvsq = 1.0 / rec.posq;
        let tsi = 1.0 / (ao - sfour);
        ne.eta = ao * ecco * tsi;
        let etasq = ne.eta * ne.eta;
        let eeta = ecco * ne.eta;
        let psisq = (1.0 - etasq).abs();
        let coef = qzms24 * tsi.powf(4.0);
        let coef1 = coef / psisq.powf(3.5);
        let cc2 = coef1
            * no
            * (ao * (1.0 + 1.5 * etasq + eeta * (4.0 + etasq))
                + 0.375 * gravity.j2 * tsi / psisq * ne.con41 * (8.0 + 3.0 * etasq * (8.0 + etasq)));
        ne.cc1 = bstar * cc2;
        let cc3 = if ecco > 1.0e-4 {
            -2.0 * coef * tsi * gravity.j3oj2 * no * rec.sinio / ecco
        } else {
            0.0
        };
        ne.x1mth2 = 1.0 - rec.cosio2;
        ne.cc4 = 2.0
            * no
            * coef1
            * ao
            * rec.omeosq
            * (ne.eta * (2.0 + 0.5 * etasq) + ecco * (0.5 + 2.0 * etasq)
                - gravity.j2 * tsi / (ao * psisq)
                    * (-3.0 * ne.con41 * (1.0 - 2.0 * eeta + etasq * (1.5 - 0.5 * eeta))
                        + 0.75
                            * ne.x1mth2
                            * (2.0 * etasq - eeta * (1.0 + etasq))
                            * (2.0 * epoch.argpo).cos()));
        ne.cc5 = 2.0 * coef1 * ao * rec.omeosq * (1.0 + 2.75 * (etasq + eeta) + eeta * etasq);

        let cosio = rec.cosio;
        let cosio2 = rec.cosio2;
        let cosio4 = cosio2 * cosio2;
        let temp1 = 1.5 * gravity.j2 * pinvsq * no;
        let temp2 = 0.5 * temp1 * gravity.j2 * pinvsq;
        let temp3 = -0.46875 * gravity.j4 * pinvsq * pinvsq * no;
        ne.mdot = no
            + 0.5 * temp1 * rec.rteosq * ne.con41
            + 0.0625 * temp2 * rec.rteosq * (13.0 - 78.0 * cosio2 + 137.0 * cosio4);
        ne.argpdot = -0.5 * temp1 * rec.con42
            + 0.0625 * temp2 * (7.0 - 114.0 * cosio2 + 395.0 * cosio4)
            + temp3 * (3.0 - 36.0 * cosio2 + 49.0 * cosio4);
        let xhdot1 = -temp1 * cosio;
        ne.nodedot = xhdot1
            + (0.5 * temp2 * (4.0 - 19.0 * cosio2) + 2.0 * temp3 * (3.0 - 7.0 * cosio2)) * cosio;
        ne.xpidot = ne.argpdot + ne.nodedot;
        ne.omgcof = bstar * cc3 * epoch.argpo.cos();
        ne.xmcof = if ecco > 1.0e-4 {
            -X2O3 * coef * bstar / eeta
        } else {
            0.0
        };
        ne.nodecf = 3.5 * rec.omeosq * xhdot1 * ne.cc1;
        ne.t2cof = 1.5 * ne.cc1;
        let (aycof, xlcof) = long_period_coefficients(gravity, rec.sinio, cosio);
        ne.aycof = aycof;
        ne.xlcof = xlcof;
        let delmotemp = 1.0 + ne.eta * epoch.mo.cos();
        ne.delmo = delmotemp * delmotemp * delmotemp;
        ne.sinmao = epoch.mo.sin();
        ne.x7thm1 = 7.0 * cosio2 - 1.0;

        if deep_space {
            ne.isimp = true;
        }

        if !ne.isimp {
            let cc1sq = ne.cc1 * ne.cc1;
            ne.d2 = 4.0 * ao * tsi * cc1sq;
            let temp = ne.d2 * tsi * ne.cc1 / 3.0;
            ne.d3 = (17.0 * ao + sfour) * temp;
            ne.d4 = 0.5 * temp * ao * tsi * (221.0 * ao + 31.0 * sfour) * ne.cc1;
            ne.t3cof = ne.d2 + 2.0 * cc1sq;
            ne.t4cof = 0.25 * (3.0 * ne.d3 + ne.cc1 * (12.0 * ne.d2 + 10.0 * cc1sq));
            ne.t5cof = 0.2
                * (3.0 * ne.d4
                    + 12.0 * ne.cc1 * ne.d3
                    + 6.0 * ne.d2 * ne.d2
                    + 15.0 * cc1sq * (2.0 * ne.d2 + cc1sq));
        }

        ne
    }

    /// Secular gravity drift and the drag polynomials at `t` minutes.
    pub fn secular(
        &self,
        epoch: &EpochElements,
        no_unkozai: f64,
        t: f64,
    ) -> (SecularElements, DragTerms) {
        let xmdf = epoch.mo + self.mdot * t;
        let argpdf = epoch.argpo + self.argpdot * t;
        let nodedf = epoch.nodeo + self.nodedot * t;
        let mut argpm = argpdf;
        let mut mm = xmdf;
        let t2 = t * t;
        let nodem = nodedf + self.nodecf * t2;
        let mut tempa = 1.0 - self.cc1 * t;
        let mut tempe = epoch.bstar * self.cc4 * t;
        let mut templ = self.t2cof * t2;

        if !self.isimp {
            let delomg = self.omgcof * t;
            let delmtemp = 1.0 + self.eta * xmdf.cos();
            let delm = self.xmcof * (delmtemp * delmtemp * delmtemp - self.delmo);
            let temp = delomg + delm;
            mm = xmdf + temp;
            argpm = argpdf - temp;
            let t3 = t2 * t;
            let t4 = t3 * t;
            tempa = tempa - self.d2 * t2 - self.d3 * t3 - self.d4 * t4;
            tempe += epoch.bstar * self.cc5 * (mm.sin() - self.sinmao);
            templ = templ + self.t3cof * t3 + t4 * (self.t4cof + t * self.t5cof);
        }

        (
            SecularElements {
                eccentricity: epoch.ecco,
                inclination: epoch.inclo,
                node: nodem,
                argument_of_perigee: argpm,
                mean_anomaly: mm,
                mean_motion: no_unkozai,
            },
            DragTerms { tempa, tempe, templ },
        )
    }
}

/// Apply drag decay to the secular elements and normalise the angles.
pub fn decay(
    gravity: &EarthGravity,
    no_unkozai: f64,
    secular: SecularElements,
    drag: DragTerms,
    t: f64,
) -> Result<MeanElements> {
    let decayed = |cause| Error::OrbitDecayed { minutes: t, cause };

    let nm = secular.mean_motion;
    if nm <= 0.0 || nm.is_nan() {
        return Err(decayed(Decay::MeanMotion(nm)));
    }

    let am = (gravity.xke / nm).powf(X2O3) * drag.tempa * drag.tempa;
    let nm = gravity.xke / am.powf(1.5);
    let mut em = secular.eccentricity - drag.tempe;

    // tolerance below zero leaves room for rounding on circular orbits
    if em >= 1.0 || em < -0.001 || em.is_nan() {
        return Err(decayed(Decay::Eccentricity(em)));
    }
    if em < 1.0e-6 {
        em = 1.0e-6;
    }

    let mm = secular.mean_anomaly + no_unkozai * drag.templ;
    let xlm = (mm + secular.argument_of_perigee + secular.node) % TWOPI;
    let nodem = secular.node % TWOPI;
    let argpm = secular.argument_of_perigee % TWOPI;
    let mm = (xlm - argpm - nodem) % TWOPI;

    Ok(MeanElements {
        semi_major_axis: am,
        eccentricity: em,
        inclination: secular.inclination,
        node: nodem,
        argument_of_perigee: argpm,
        mean_anomaly: mm,
        mean_motion: nm,
    })
}

/// J3 long-period coefficients `(aycof, xlcof)` for an inclination.
pub fn long_period_coefficients(gravity: &EarthGravity, sini: f64, cosi: f64) -> (f64, f64) {
    let aycof = -0.5 * gravity.j3oj2 * sini;
    let divisor = if (cosi + 1.0).abs() > 1.5e-12 {
        1.0 + cosi
    } else {
        TEMP4
    };
    let xlcof = -0.25 * gravity.j3oj2 * sini * (3.0 + 5.0 * cosi) / divisor;
    (aycof, xlcof)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::OperationMode;
    use crate::earth_gravity::GravityModel;
    use crate::elements::fixtures::{circular_leo, vanguard};
    use crate::recovery::recover;
    use crate::OrbitalElementSet;

    fn build(set: &OrbitalElementSet) -> (EarthGravity, EpochElements, Recovered, NearEarth) {
        let gravity = GravityModel::Wgs72.constants();
        let epoch = EpochElements {
            ecco: set.eccentricity,
            inclo: set.inclination,
            nodeo: set.right_ascension,
            argpo: set.argument_of_perigee,
            mo: set.mean_anomaly,
            bstar: set.bstar,
        };
        let rec = recover(
            &gravity,
            OperationMode::Improved,
            set.eccentricity,
            set.inclination,
            set.mean_motion_rad_per_min(),
            set.epoch_days_since_1950(),
        )
        .unwrap();
        let ne = NearEarth::new(&gravity, &epoch, &rec, false);
        (gravity, epoch, rec, ne)
    }

    #[test]
    fn secular_state_at_epoch_is_the_epoch_state() {
        let (_, epoch, rec, ne) = build(&vanguard());
        let (sec, drag) = ne.secular(&epoch, rec.mean_motion, 0.0);
        assert_eq!(sec.mean_anomaly, epoch.mo);
        assert_eq!(sec.argument_of_perigee, epoch.argpo);
        assert_eq!(sec.node, epoch.nodeo);
        assert_eq!(drag.tempa, 1.0);
        assert_eq!(drag.templ, 0.0);
        assert!(drag.tempe.abs() < 1.0e-15);
    }

    #[test]
    fn oblateness_regresses_the_node_of_prograde_orbits() {
        let (_, _, _, ne) = build(&vanguard());
        assert!(ne.nodedot < 0.0);
        // below the critical inclination the perigee advances
        assert!(ne.argpdot > 0.0);
        assert!(!ne.isimp);
    }

    #[test]
    fn drag_free_orbit_has_no_decay() {
        let (gravity, epoch, rec, ne) = build(&circular_leo());
        assert_eq!(ne.cc1, 0.0);
        let (sec, drag) = ne.secular(&epoch, rec.mean_motion, 10_000.0);
        assert_eq!(drag.tempa, 1.0);
        let mean = decay(&gravity, rec.mean_motion, sec, drag, 10_000.0).unwrap();
        assert!((mean.semi_major_axis - rec.semi_major_axis).abs() < 1.0e-12);
        // circular orbits are clamped off exactly zero eccentricity
        assert_eq!(mean.eccentricity, 1.0e-6);
    }

    #[test]
    fn heavy_drag_eventually_decays_the_orbit() {
        let draggy = OrbitalElementSet {
            bstar: 0.05,
            eccentricity: 0.01,
            mean_motion: 16.0,
            ..circular_leo()
        };
        let (gravity, epoch, rec, ne) = build(&draggy);
        let t = 30.0 * 1440.0;
        let (sec, drag) = ne.secular(&epoch, rec.mean_motion, t);
        let result = decay(&gravity, rec.mean_motion, sec, drag, t);
        assert!(
            matches!(result, Err(Error::OrbitDecayed { .. })),
            "{result:?}"
        );
    }

    #[test]
    fn retrograde_equatorial_orbit_keeps_xlcof_finite() {
        let g = GravityModel::Wgs72.constants();
        let (aycof, xlcof) = long_period_coefficients(&g, 0.0, -1.0);
        assert_eq!(aycof, 0.0);
        assert!(xlcof.is_finite());
    }
}
