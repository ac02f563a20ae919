//! Long-period J3 terms, Kepler's equation and the short-period J2
//! corrections, ending in a TEME position and velocity.

use crate::earth_gravity::EarthGravity;
use crate::error::{Decay, Error, InvalidOrbit, Result};
use crate::kepler;
use crate::near_earth::{long_period_coefficients, MeanElements, NearEarth};
use crate::state::StateVector;

/// Mean elements after any lunar/solar periodics, ready for the periodic
/// gravity terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerturbedElements {
    pub eccentricity: f64,
    pub inclination: f64,
    pub node: f64,
    pub argument_of_perigee: f64,
    pub mean_anomaly: f64,
}

impl From<&MeanElements> for PerturbedElements {
    fn from(mean: &MeanElements) -> Self {
        PerturbedElements {
            eccentricity: mean.eccentricity,
            inclination: mean.inclination,
            node: mean.node,
            argument_of_perigee: mean.argument_of_perigee,
            mean_anomaly: mean.mean_anomaly,
        }
    }
}

/// Inclination-dependent factors of the periodic terms.
struct Inclination {
    sinip: f64,
    cosip: f64,
    aycof: f64,
    xlcof: f64,
    con41: f64,
    x1mth2: f64,
    x7thm1: f64,
}

/// Position and velocity at `t` minutes.
///
/// `deep_space` selects inclination factors from the perturbed
/// inclination; near-earth orbits reuse the ones fixed at epoch.
pub fn reconstruct(
    gravity: &EarthGravity,
    near: &NearEarth,
    deep_space: bool,
    mean: &MeanElements,
    p: &PerturbedElements,
    t: f64,
) -> Result<StateVector> {
    let (sinip, cosip) = p.inclination.sin_cos();
    let inc = if deep_space {
        let (aycof, xlcof) = long_period_coefficients(gravity, sinip, cosip);
        let cosisq = cosip * cosip;
        Inclination {
            sinip,
            cosip,
            aycof,
            xlcof,
            con41: 3.0 * cosisq - 1.0,
            x1mth2: 1.0 - cosisq,
            x7thm1: 7.0 * cosisq - 1.0,
        }
    } else {
        Inclination {
            sinip,
            cosip,
            aycof: near.aycof,
            xlcof: near.xlcof,
            con41: near.con41,
            x1mth2: near.x1mth2,
            x7thm1: near.x7thm1,
        }
    };

    let am = mean.semi_major_axis;
    let nm = mean.mean_motion;
    let ep = p.eccentricity;

    // long-period periodics
    let axnl = ep * p.argument_of_perigee.cos();
    let temp = 1.0 / (am * (1.0 - ep * ep));
    let aynl = ep * p.argument_of_perigee.sin() + temp * inc.aycof;
    let xl = p.mean_anomaly + p.argument_of_perigee + p.node + temp * inc.xlcof * axnl;

    let eo1 = kepler::solve_modified(xl - p.node, axnl, aynl, t)?;
    let (sineo1, coseo1) = eo1.sin_cos();

    // short-period preliminary quantities
    let ecose = axnl * coseo1 + aynl * sineo1;
    let esine = axnl * sineo1 - aynl * coseo1;
    let el2 = axnl * axnl + aynl * aynl;
    let pl = am * (1.0 - el2);
    if !(pl > 0.0) {
        return Err(InvalidOrbit::SemiLatusRectum {
            semi_latus_rectum: pl,
            minutes: t,
        }
        .into());
    }

    let rl = am * (1.0 - ecose);
    let rdotl = am.sqrt() * esine / rl;
    let rvdotl = pl.sqrt() / rl;
    let betal = (1.0 - el2).sqrt();
    let temp = esine / (1.0 + betal);
    let sinu = am / rl * (sineo1 - aynl - axnl * temp);
    let cosu = am / rl * (coseo1 - axnl + aynl * temp);
    let su = sinu.atan2(cosu);
    let sin2u = (cosu + cosu) * sinu;
    let cos2u = 1.0 - 2.0 * sinu * sinu;
    let temp = 1.0 / pl;
    let temp1 = 0.5 * gravity.j2 * temp;
    let temp2 = temp1 * temp;

    // short-period periodics
    let mrt = rl * (1.0 - 1.5 * temp2 * betal * inc.con41) + 0.5 * temp1 * inc.x1mth2 * cos2u;
    let su = su - 0.25 * temp2 * inc.x7thm1 * sin2u;
    let xnode = p.node + 1.5 * temp2 * inc.cosip * sin2u;
    let xinc = p.inclination + 1.5 * temp2 * inc.cosip * inc.sinip * cos2u;
    let mvt = rdotl - nm * temp1 * inc.x1mth2 * sin2u / gravity.xke;
    let rvdot = rvdotl + nm * temp1 * (inc.x1mth2 * cos2u + 1.5 * inc.con41) / gravity.xke;

    if mrt < 1.0 {
        return Err(Error::OrbitDecayed {
            minutes: t,
            cause: Decay::BelowSurface { radius_er: mrt },
        });
    }

    // orientation vectors
    let (sinsu, cossu) = su.sin_cos();
    let (snod, cnod) = xnode.sin_cos();
    let (sini, cosi) = xinc.sin_cos();
    let xmx = -snod * cosi;
    let xmy = cnod * cosi;
    let ux = xmx * sinsu + cnod * cossu;
    let uy = xmy * sinsu + snod * cossu;
    let uz = sini * sinsu;
    let vx = xmx * cossu - cnod * sinsu;
    let vy = xmy * cossu - snod * sinsu;
    let vz = sini * cossu;

    let radius = gravity.radius_km;
    let vkmpersec = gravity.velocity_km_per_s();
    Ok(StateVector {
        minutes: t,
        position: [mrt * ux * radius, mrt * uy * radius, mrt * uz * radius],
        velocity: [
            (mvt * ux + rvdot * vx) * vkmpersec,
            (mvt * uy + rvdot * vy) * vkmpersec,
            (mvt * uz + rvdot * vz) * vkmpersec,
        ],
    })
}
