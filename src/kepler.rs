//! Kepler's equation, in the modified form SGP4 solves after the
//! long-period periodics.

use crate::datetime::TWOPI;
use crate::error::{Error, Result};

pub const MAX_ITERATIONS: u32 = 10;
pub const TOLERANCE: f64 = 1.0e-12;
/// A final correction above this after the iteration cap is a failure.
pub const ACCEPTANCE: f64 = 1.0e-6;
const MAX_STEP: f64 = 0.95;

/// Solve `U = E + aynl·cos E − axnl·sin E` for `E` (the eccentric longitude).
///
/// `u` is the mean longitude minus the node, `axnl`/`aynl` are the
/// eccentricity vector components including the long-period terms. The
/// Newton step is clamped to ±0.95 so a poor first guess cannot overshoot.
/// `minutes` is only used to label a failure.
pub fn solve_modified(u: f64, axnl: f64, aynl: f64, minutes: f64) -> Result<f64> {
    if !(u.is_finite() && axnl.is_finite() && aynl.is_finite()) {
        return Err(Error::KeplerConvergence {
            minutes,
            iterations: 0,
            correction: f64::NAN,
        });
    }

    let u = u % TWOPI;
    let mut eo1 = u;
    let mut tem5: f64 = 9999.9;
    let mut ktr = 1;

    while tem5.abs() >= TOLERANCE && ktr <= MAX_ITERATIONS {
        let (sineo1, coseo1) = eo1.sin_cos();
        tem5 = 1.0 - coseo1 * axnl - sineo1 * aynl;
        tem5 = (u - aynl * coseo1 + axnl * sineo1 - eo1) / tem5;
        tem5 = tem5.clamp(-MAX_STEP, MAX_STEP);
        eo1 += tem5;
        ktr += 1;
    }

    if tem5.abs() > ACCEPTANCE || !eo1.is_finite() {
        return Err(Error::KeplerConvergence {
            minutes,
            iterations: ktr - 1,
            correction: tem5,
        });
    }
    Ok(eo1)
}

/// Eccentric anomaly for mean anomaly `m` on an orbit of eccentricity `e`.
pub fn solve(m: f64, e: f64) -> Result<f64> {
    // classical form is the modified one with the perigee on the x axis
    solve_modified(m, e, 0.0, 0.0)
}
