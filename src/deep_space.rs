//! Lunar/solar perturbations and the 12h/24h geopotential resonances for
//! orbits with periods of 225 minutes or more.

use std::f64::consts::PI;

use log::trace;

use crate::config::OperationMode;
use crate::datetime::TWOPI;
use crate::earth_gravity::EarthGravity;
use crate::error::{DeepSpaceFailure, Error, Result};
use crate::near_earth::{EpochElements, MeanElements, NearEarth, SecularElements};
use crate::reconstruct::PerturbedElements;
use crate::recovery::Recovered;

const ZES: f64 = 0.01675;
const ZEL: f64 = 0.05490;
const ZNS: f64 = 1.19459e-5;
const ZNL: f64 = 1.5835218e-4;
const C1SS: f64 = 2.9864797e-6;
const C1L: f64 = 4.7968065e-7;
const ZSINIS: f64 = 0.39785416;
const ZCOSIS: f64 = 0.91744867;
const ZCOSGS: f64 = 0.1945905;
const ZSINGS: f64 = -0.98088458;

const Q22: f64 = 1.7891679e-6;
const Q31: f64 = 2.1460748e-6;
const Q33: f64 = 2.2123015e-7;
const ROOT22: f64 = 1.7891679e-6;
const ROOT44: f64 = 7.3636953e-9;
const ROOT54: f64 = 2.1765803e-9;
const ROOT32: f64 = 3.7393792e-7;
const ROOT52: f64 = 1.1428639e-7;
/// Earth rotation rate, rad/min.
const RPTIM: f64 = 4.37526908801129966e-3;

const FASX2: f64 = 0.13130908;
const FASX4: f64 = 2.8843198;
const FASX6: f64 = 0.37448087;
const G22: f64 = 5.7686396;
const G32: f64 = 0.95240898;
const G44: f64 = 1.8014998;
const G52: f64 = 1.0508330;
const G54: f64 = 4.4108898;

/// Resonance integrator step, minutes.
pub const STEP: f64 = 720.0;
const STEP2: f64 = STEP * STEP * 0.5;
/// Longest integration accepted, in steps (about 1370 years either way).
pub const MAX_STEPS: u64 = 1_000_000;

/// Inclination (rad) below which the lunar/solar node terms are dropped.
const NEAR_EQUATORIAL: f64 = 5.2359877e-2;
/// Lyddane's modification takes over below this perturbed inclination.
const LYDDANE_INCLINATION: f64 = 0.2;

/// Which geopotential resonance, if any, the orbit sits in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResonanceClass {
    None,
    /// One revolution per sidereal day (geostationary belt).
    Synchronous,
    /// Two revolutions per day on an eccentric orbit (Molniya).
    HalfDay,
}

impl ResonanceClass {
    /// Classify a recovered mean motion (rad/min) and eccentricity.
    pub fn classify(mean_motion: f64, eccentricity: f64) -> ResonanceClass {
        if mean_motion > 0.0034906585 && mean_motion < 0.0052359877 {
            ResonanceClass::Synchronous
        } else if (8.26e-3..=9.24e-3).contains(&mean_motion) && eccentricity >= 0.5 {
            ResonanceClass::HalfDay
        } else {
            ResonanceClass::None
        }
    }
}

/// Integrator state for the resonance terms: elapsed time of the last
/// step, resonant longitude and resonant mean motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResonanceState {
    pub atime: f64,
    pub xli: f64,
    pub xni: f64,
}

/// Coefficients of the lunar/solar periodic terms.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct Periodics {
    e3: f64,
    ee2: f64,
    se2: f64,
    se3: f64,
    sgh2: f64,
    sgh3: f64,
    sgh4: f64,
    sh2: f64,
    sh3: f64,
    si2: f64,
    si3: f64,
    sl2: f64,
    sl3: f64,
    sl4: f64,
    xgh2: f64,
    xgh3: f64,
    xgh4: f64,
    xh2: f64,
    xh3: f64,
    xi2: f64,
    xi3: f64,
    xl2: f64,
    xl3: f64,
    xl4: f64,
    zmol: f64,
    zmos: f64,
}

/// Lunar/solar secular rates, per minute.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SecularRates {
    pub dedt: f64,
    pub didt: f64,
    pub dmdt: f64,
    pub dnodt: f64,
    pub domdt: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ResonanceTerms {
    Synchronous {
        del1: f64,
        del2: f64,
        del3: f64,
    },
    HalfDay {
        d2201: f64,
        d2211: f64,
        d3210: f64,
        d3222: f64,
        d4410: f64,
        d4422: f64,
        d5220: f64,
        d5232: f64,
        d5421: f64,
        d5433: f64,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Resonance {
    terms: ResonanceTerms,
    xfact: f64,
    xlamo: f64,
}

/// Lunar/solar geometry shared between the secular and periodic setup.
/// One set of `s`/`z` coefficients each for the sun and the moon.
#[derive(Debug, Clone, Copy, Default)]
struct ThirdBody {
    s1: f64,
    s2: f64,
    s3: f64,
    s4: f64,
    s5: f64,
    s6: f64,
    s7: f64,
    z1: f64,
    z2: f64,
    z3: f64,
    z11: f64,
    z12: f64,
    z13: f64,
    z21: f64,
    z22: f64,
    z23: f64,
    z31: f64,
    z32: f64,
    z33: f64,
}

struct Common {
    sun: ThirdBody,
    moon: ThirdBody,
    sinim: f64,
    cosim: f64,
    emsq: f64,
    periodics: Periodics,
}

/// Everything the deep-space stage needs, fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeepSpace {
    periodics: Periodics,
    rates: SecularRates,
    resonance: Option<Resonance>,
    gsto: f64,
    argpo: f64,
    argpdot: f64,
    no: f64,
}

impl DeepSpace {
    pub fn new(
        gravity: &EarthGravity,
        epoch: &EpochElements,
        rec: &Recovered,
        near: &NearEarth,
        epoch_days_1950: f64,
    ) -> DeepSpace {
        let common = dscom(
            epoch_days_1950,
            epoch.ecco,
            epoch.argpo,
            0.0,
            epoch.inclo,
            epoch.nodeo,
            rec.mean_motion,
        );
        let rates = secular_rates(&common, epoch.inclo);
        let resonance = resonance_terms(gravity, epoch, rec, near, &common, &rates);

        DeepSpace {
            periodics: common.periodics,
            rates,
            resonance,
            gsto: rec.gsto,
            argpo: epoch.argpo,
            argpdot: near.argpdot,
            no: rec.mean_motion,
        }
    }

    pub fn rates(&self) -> SecularRates {
        self.rates
    }

    pub fn resonance_class(&self) -> ResonanceClass {
        match self.resonance {
            None => ResonanceClass::None,
            Some(Resonance {
                terms: ResonanceTerms::Synchronous { .. },
                ..
            }) => ResonanceClass::Synchronous,
            Some(Resonance {
                terms: ResonanceTerms::HalfDay { .. },
                ..
            }) => ResonanceClass::HalfDay,
        }
    }

    /// Add the lunar/solar secular drift to `elements` and, for resonant
    /// orbits, replace mean anomaly and mean motion with the integrated
    /// resonance solution at `t`.
    pub fn secular(&self, t: f64, elements: &mut SecularElements) -> Result<()> {
        let rates = &self.rates;
        elements.eccentricity += rates.dedt * t;
        elements.inclination += rates.didt * t;
        elements.argument_of_perigee += rates.domdt * t;
        elements.node += rates.dnodt * t;
        elements.mean_anomaly += rates.dmdt * t;

        let Some(resonance) = &self.resonance else {
            return Ok(());
        };

        let theta = (self.gsto + t * RPTIM) % TWOPI;
        let (nm, xl) = self.integrate(resonance, t)?;
        elements.mean_anomaly = match resonance.terms {
            ResonanceTerms::Synchronous { .. } => {
                xl - elements.node - elements.argument_of_perigee + theta
            }
            ResonanceTerms::HalfDay { .. } => xl - 2.0 * elements.node + 2.0 * theta,
        };
        elements.mean_motion = nm;
        Ok(())
    }

    /// Step the resonance equations from epoch to `t` and finish with a
    /// second-order Taylor expansion. Returns `(mean motion, longitude)`.
    fn integrate(&self, resonance: &Resonance, t: f64) -> Result<(f64, f64)> {
        let mut state = ResonanceState {
            atime: 0.0,
            xli: resonance.xlamo,
            xni: self.no,
        };
        let delt = if t > 0.0 { STEP } else { -STEP };

        if !t.is_finite() || (t / STEP).abs() > MAX_STEPS as f64 {
            return Err(Error::DeepSpaceIntegration {
                minutes: t,
                cause: DeepSpaceFailure::ResonanceDiverged {
                    mean_motion: state.xni,
                    steps: MAX_STEPS,
                },
            });
        }
        let mut steps: u64 = 0;

        loop {
            let (xndt, xldot, xnddt) = self.rates_at(resonance, &state);

            if (t - state.atime).abs() < STEP {
                let ft = t - state.atime;
                trace!(
                    "resonance integrated to {t} min in {steps} steps, xni={}",
                    state.xni
                );
                let nm = state.xni + xndt * ft + xnddt * ft * ft * 0.5;
                let xl = state.xli + xldot * ft + xndt * ft * ft * 0.5;
                return Ok((nm, xl));
            }

            state.xli += xldot * delt + xndt * STEP2;
            state.xni += xndt * delt + xnddt * STEP2;
            state.atime += delt;
            steps += 1;

            if !state.xni.is_finite() || state.xni <= 0.0 || !state.xli.is_finite() {
                return Err(Error::DeepSpaceIntegration {
                    minutes: t,
                    cause: DeepSpaceFailure::ResonanceDiverged {
                        mean_motion: state.xni,
                        steps,
                    },
                });
            }
        }
    }

    /// `(dn/dt, dλ/dt, d²n/dt²)` at the current integrator state.
    fn rates_at(&self, resonance: &Resonance, state: &ResonanceState) -> (f64, f64, f64) {
        let xli = state.xli;
        let xldot = state.xni + resonance.xfact;
        match resonance.terms {
            ResonanceTerms::Synchronous { del1, del2, del3 } => {
                let xndt = del1 * (xli - FASX2).sin()
                    + del2 * (2.0 * (xli - FASX4)).sin()
                    + del3 * (3.0 * (xli - FASX6)).sin();
                let xnddt = del1 * (xli - FASX2).cos()
                    + 2.0 * del2 * (2.0 * (xli - FASX4)).cos()
                    + 3.0 * del3 * (3.0 * (xli - FASX6)).cos();
                (xndt, xldot, xnddt * xldot)
            }
            ResonanceTerms::HalfDay {
                d2201,
                d2211,
                d3210,
                d3222,
                d4410,
                d4422,
                d5220,
                d5232,
                d5421,
                d5433,
            } => {
                let xomi = self.argpo + self.argpdot * state.atime;
                let x2omi = xomi + xomi;
                let x2li = xli + xli;
                let xndt = d2201 * (x2omi + xli - G22).sin()
                    + d2211 * (xli - G22).sin()
                    + d3210 * (xomi + xli - G32).sin()
                    + d3222 * (-xomi + xli - G32).sin()
                    + d4410 * (x2omi + x2li - G44).sin()
                    + d4422 * (x2li - G44).sin()
                    + d5220 * (xomi + xli - G52).sin()
                    + d5232 * (-xomi + xli - G52).sin()
                    + d5421 * (xomi + x2li - G54).sin()
                    + d5433 * (-xomi + x2li - G54).sin();
                let xnddt = d2201 * (x2omi + xli - G22).cos()
                    + d2211 * (xli - G22).cos()
                    + d3210 * (xomi + xli - G32).cos()
                    + d3222 * (-xomi + xli - G32).cos()
                    + d5220 * (xomi + xli - G52).cos()
                    + d5232 * (-xomi + xli - G52).cos()
                    + 2.0
                        * (d4410 * (x2omi + x2li - G44).cos()
                            + d4422 * (x2li - G44).cos()
                            + d5421 * (xomi + x2li - G54).cos()
                            + d5433 * (-xomi + x2li - G54).cos());
                (xndt, xldot, xnddt * xldot)
            }
        }
    }

    /// Apply the lunar/solar periodics to the decayed mean elements.
    pub fn periodics(
        &self,
        mode: OperationMode,
        t: f64,
        mean: &MeanElements,
    ) -> Result<PerturbedElements> {
        let p = &self.periodics;
        let (pe, pinc, pl, pgh, ph) = p.at(t);

        let mut ep = mean.eccentricity + pe;
        let mut inclp = mean.inclination + pinc;
        let mut nodep = mean.node;
        let mut argpp = mean.argument_of_perigee;
        let mut mp = mean.mean_anomaly;

        let (sinip, cosip) = inclp.sin_cos();
        if inclp >= LYDDANE_INCLINATION {
            let ph = ph / sinip;
            let pgh = pgh - cosip * ph;
            argpp += pgh;
            nodep += ph;
            mp += pl;
        } else {
            // Lyddane: perturb the node through its direction cosines
            let (sinop, cosop) = nodep.sin_cos();
            let alfdp = sinip * sinop + (ph * cosop + pinc * cosip * sinop);
            let betdp = sinip * cosop + (-ph * sinop + pinc * cosip * cosop);
            nodep %= TWOPI;
            if nodep < 0.0 && mode == OperationMode::Afspc {
                nodep += TWOPI;
            }
            let xls = mp + argpp + cosip * nodep + (pl + pgh - pinc * nodep * sinip);
            let xnoh = nodep;
            nodep = alfdp.atan2(betdp);
            if nodep < 0.0 && mode == OperationMode::Afspc {
                nodep += TWOPI;
            }
            if (xnoh - nodep).abs() > PI {
                if nodep < xnoh {
                    nodep += TWOPI;
                } else {
                    nodep -= TWOPI;
                }
            }
            mp += pl;
            argpp = xls - mp - cosip * nodep;
        }

        if inclp < 0.0 {
            inclp = -inclp;
            nodep += PI;
            argpp -= PI;
        }

        if !(0.0..=1.0).contains(&ep) {
            return Err(Error::DeepSpaceIntegration {
                minutes: t,
                cause: DeepSpaceFailure::PerturbedEccentricity(ep),
            });
        }

        Ok(PerturbedElements {
            eccentricity: ep,
            inclination: inclp,
            node: nodep,
            argument_of_perigee: argpp,
            mean_anomaly: mp,
        })
    }
}

impl Periodics {
    /// Periodic offsets `(pe, pinc, pl, pgh, ph)` at `t` minutes.
    fn at(&self, t: f64) -> (f64, f64, f64, f64, f64) {
        let zm = self.zmos + ZNS * t;
        let zf = zm + 2.0 * ZES * zm.sin();
        let sinzf = zf.sin();
        let f2 = 0.5 * sinzf * sinzf - 0.25;
        let f3 = -0.5 * sinzf * zf.cos();
        let ses = self.se2 * f2 + self.se3 * f3;
        let sis = self.si2 * f2 + self.si3 * f3;
        let sls = self.sl2 * f2 + self.sl3 * f3 + self.sl4 * sinzf;
        let sghs = self.sgh2 * f2 + self.sgh3 * f3 + self.sgh4 * sinzf;
        let shs = self.sh2 * f2 + self.sh3 * f3;

        let zm = self.zmol + ZNL * t;
        let zf = zm + 2.0 * ZEL * zm.sin();
        let sinzf = zf.sin();
        let f2 = 0.5 * sinzf * sinzf - 0.25;
        let f3 = -0.5 * sinzf * zf.cos();
        let sel = self.ee2 * f2 + self.e3 * f3;
        let sil = self.xi2 * f2 + self.xi3 * f3;
        let sll = self.xl2 * f2 + self.xl3 * f3 + self.xl4 * sinzf;
        let sghl = self.xgh2 * f2 + self.xgh3 * f3 + self.xgh4 * sinzf;
        let shll = self.xh2 * f2 + self.xh3 * f3;

        (ses + sel, sis + sil, sls + sll, sghs + sghl, shs + shll)
    }
}

/// Lunar and solar geometry at `epoch + tc` and the periodic coefficients
/// derived from it.
fn dscom(epoch: f64, ep: f64, argpp: f64, tc: f64, inclp: f64, nodep: f64, np: f64) -> Common {
    let em = ep;
    let (snodm, cnodm) = nodep.sin_cos();
    let (sinomm, cosomm) = argpp.sin_cos();
    let (sinim, cosim) = inclp.sin_cos();
    let emsq = em * em;
    let betasq = 1.0 - emsq;
    let rtemsq = betasq.sqrt();

    let day = epoch + 18_261.5 + tc / 1440.0;
    let xnodce = (4.5236020 - 9.2422029e-4 * day) % TWOPI;
    let (stem, ctem) = xnodce.sin_cos();
    let zcosil = 0.91375164 - 0.03568096 * ctem;
    let zsinil = (1.0 - zcosil * zcosil).sqrt();
    let zsinhl = 0.089683511 * stem / zsinil;
    let zcoshl = (1.0 - zsinhl * zsinhl).sqrt();
    let gam = 5.8351514 + 0.0019443680 * day;
    let zx = 0.39785416 * stem / zsinil;
    let zy = zcoshl * ctem + 0.91744867 * zsinhl * stem;
    let zx = gam + zx.atan2(zy) - xnodce;
    let (zsingl, zcosgl) = zx.sin_cos();

    let xnoi = 1.0 / np;

    let body = |zcosg: f64, zsing: f64, zcosi: f64, zsini: f64, zcosh: f64, zsinh: f64, cc: f64| {
        let a1 = zcosg * zcosh + zsing * zcosi * zsinh;
        let a3 = -zsing * zcosh + zcosg * zcosi * zsinh;
        let a7 = -zcosg * zsinh + zsing * zcosi * zcosh;
        let a8 = zsing * zsini;
        let a9 = zsing * zsinh + zcosg * zcosi * zcosh;
        let a10 = zcosg * zsini;
        let a2 = cosim * a7 + sinim * a8;
        let a4 = cosim * a9 + sinim * a10;
        let a5 = -sinim * a7 + cosim * a8;
        let a6 = -sinim * a9 + cosim * a10;

        let x1 = a1 * cosomm + a2 * sinomm;
        let x2 = a3 * cosomm + a4 * sinomm;
        let x3 = -a1 * sinomm + a2 * cosomm;
        let x4 = -a3 * sinomm + a4 * cosomm;
        let x5 = a5 * sinomm;
        let x6 = a6 * sinomm;
        let x7 = a5 * cosomm;
        let x8 = a6 * cosomm;

        let z31 = 12.0 * x1 * x1 - 3.0 * x3 * x3;
        let z32 = 24.0 * x1 * x2 - 6.0 * x3 * x4;
        let z33 = 12.0 * x2 * x2 - 3.0 * x4 * x4;
        let z1 = 3.0 * (a1 * a1 + a2 * a2) + z31 * emsq;
        let z2 = 6.0 * (a1 * a3 + a2 * a4) + z32 * emsq;
        let z3 = 3.0 * (a3 * a3 + a4 * a4) + z33 * emsq;
        let s3 = cc * xnoi;
        let s4 = s3 * rtemsq;
        ThirdBody {
            s1: -15.0 * em * s4,
            s2: -0.5 * s3 / rtemsq,
            s3,
            s4,
            s5: x1 * x3 + x2 * x4,
            s6: x2 * x3 + x1 * x4,
            s7: x2 * x4 - x1 * x3,
            z1: z1 + z1 + betasq * z31,
            z2: z2 + z2 + betasq * z32,
            z3: z3 + z3 + betasq * z33,
            z11: -6.0 * a1 * a5 + emsq * (-24.0 * x1 * x7 - 6.0 * x3 * x5),
            z12: -6.0 * (a1 * a6 + a3 * a5)
                + emsq * (-24.0 * (x2 * x7 + x1 * x8) - 6.0 * (x3 * x6 + x4 * x5)),
            z13: -6.0 * a3 * a6 + emsq * (-24.0 * x2 * x8 - 6.0 * x4 * x6),
            z21: 6.0 * a2 * a5 + emsq * (24.0 * x1 * x5 - 6.0 * x3 * x7),
            z22: 6.0 * (a4 * a5 + a2 * a6)
                + emsq * (24.0 * (x2 * x5 + x1 * x6) - 6.0 * (x4 * x7 + x3 * x8)),
            z23: 6.0 * a4 * a6 + emsq * (24.0 * x2 * x6 - 6.0 * x4 * x8),
            z31,
            z32,
            z33,
        }
    };

    let sun = body(ZCOSGS, ZSINGS, ZCOSIS, ZSINIS, cnodm, snodm, C1SS);
    let moon = body(
        zcosgl,
        zsingl,
        zcosil,
        zsinil,
        zcoshl * cnodm + zsinhl * snodm,
        snodm * zcoshl - cnodm * zsinhl,
        C1L,
    );

    let (ss, s) = (&sun, &moon);
    let periodics = Periodics {
        se2: 2.0 * ss.s1 * ss.s6,
        se3: 2.0 * ss.s1 * ss.s7,
        si2: 2.0 * ss.s2 * ss.z12,
        si3: 2.0 * ss.s2 * (ss.z13 - ss.z11),
        sl2: -2.0 * ss.s3 * ss.z2,
        sl3: -2.0 * ss.s3 * (ss.z3 - ss.z1),
        sl4: -2.0 * ss.s3 * (-21.0 - 9.0 * emsq) * ZES,
        sgh2: 2.0 * ss.s4 * ss.z32,
        sgh3: 2.0 * ss.s4 * (ss.z33 - ss.z31),
        sgh4: -18.0 * ss.s4 * ZES,
        sh2: -2.0 * ss.s2 * ss.z22,
        sh3: -2.0 * ss.s2 * (ss.z23 - ss.z21),

        ee2: 2.0 * s.s1 * s.s6,
        e3: 2.0 * s.s1 * s.s7,
        xi2: 2.0 * s.s2 * s.z12,
        xi3: 2.0 * s.s2 * (s.z13 - s.z11),
        xl2: -2.0 * s.s3 * s.z2,
        xl3: -2.0 * s.s3 * (s.z3 - s.z1),
        xl4: -2.0 * s.s3 * (-21.0 - 9.0 * emsq) * ZEL,
        xgh2: 2.0 * s.s4 * s.z32,
        xgh3: 2.0 * s.s4 * (s.z33 - s.z31),
        xgh4: -18.0 * s.s4 * ZEL,
        xh2: -2.0 * s.s2 * s.z22,
        xh3: -2.0 * s.s2 * (s.z23 - s.z21),

        zmol: (4.7199672 + 0.22997150 * day - gam) % TWOPI,
        zmos: (6.2565837 + 0.017201977 * day) % TWOPI,
    };

    Common {
        sun,
        moon,
        sinim,
        cosim,
        emsq,
        periodics,
    }
}

fn secular_rates(common: &Common, inclm: f64) -> SecularRates {
    let (ss, s) = (&common.sun, &common.moon);
    let (sinim, cosim, emsq) = (common.sinim, common.cosim, common.emsq);
    let near_equatorial = inclm < NEAR_EQUATORIAL || inclm > PI - NEAR_EQUATORIAL;

    let ses = ss.s1 * ZNS * ss.s5;
    let sis = ss.s2 * ZNS * (ss.z11 + ss.z13);
    let sls = -ZNS * ss.s3 * (ss.z1 + ss.z3 - 14.0 - 6.0 * emsq);
    let sghs = ss.s4 * ZNS * (ss.z31 + ss.z33 - 6.0);
    let mut shs = -ZNS * ss.s2 * (ss.z21 + ss.z23);
    if near_equatorial {
        shs = 0.0;
    }
    if sinim != 0.0 {
        shs /= sinim;
    }
    let sgs = sghs - cosim * shs;

    let sghl = s.s4 * ZNL * (s.z31 + s.z33 - 6.0);
    let mut shll = -ZNL * s.s2 * (s.z21 + s.z23);
    if near_equatorial {
        shll = 0.0;
    }

    let mut rates = SecularRates {
        dedt: ses + s.s1 * ZNL * s.s5,
        didt: sis + s.s2 * ZNL * (s.z11 + s.z13),
        dmdt: sls - ZNL * s.s3 * (s.z1 + s.z3 - 14.0 - 6.0 * emsq),
        domdt: sgs + sghl,
        dnodt: shs,
    };
    if sinim != 0.0 {
        rates.domdt -= cosim / sinim * shll;
        rates.dnodt += shll / sinim;
    }
    rates
}

fn resonance_terms(
    gravity: &EarthGravity,
    epoch: &EpochElements,
    rec: &Recovered,
    near: &NearEarth,
    common: &Common,
    rates: &SecularRates,
) -> Option<Resonance> {
    let nm = rec.mean_motion;
    let theta = rec.gsto % TWOPI;
    let aonv = (nm / gravity.xke).powf(2.0 / 3.0);
    let (sinim, cosim) = (common.sinim, common.cosim);

    match ResonanceClass::classify(nm, epoch.ecco) {
        ResonanceClass::None => None,
        ResonanceClass::HalfDay => {
            let cosisq = cosim * cosim;
            let em = epoch.ecco;
            let emsq = rec.eccsq;
            let eoc = em * emsq;
            let g201 = -0.306 - (em - 0.64) * 0.440;

            let (g211, g310, g322, g410, g422, g520);
            if em <= 0.65 {
                g211 = 3.616 - 13.2470 * em + 16.2900 * emsq;
                g310 = -19.302 + 117.3900 * em - 228.4190 * emsq + 156.5910 * eoc;
                g322 = -18.9068 + 109.7927 * em - 214.6334 * emsq + 146.5816 * eoc;
                g410 = -41.122 + 242.6940 * em - 471.0940 * emsq + 313.9530 * eoc;
                g422 = -146.407 + 841.8800 * em - 1629.014 * emsq + 1083.4350 * eoc;
                g520 = -532.114 + 3017.977 * em - 5740.032 * emsq + 3708.2760 * eoc;
            } else {
                g211 = -72.099 + 331.819 * em - 508.738 * emsq + 266.724 * eoc;
                g310 = -346.844 + 1582.851 * em - 2415.925 * emsq + 1246.113 * eoc;
                g322 = -342.585 + 1554.908 * em - 2366.899 * emsq + 1215.972 * eoc;
                g410 = -1052.797 + 4758.686 * em - 7193.992 * emsq + 3651.957 * eoc;
                g422 = -3581.690 + 16178.110 * em - 24462.770 * emsq + 12422.520 * eoc;
                g520 = if em > 0.715 {
                    -5149.66 + 29936.92 * em - 54087.36 * emsq + 31324.56 * eoc
                } else {
                    1464.74 - 4664.75 * em + 3763.64 * emsq
                };
            }

            let (g533, g521, g532);
            if em < 0.7 {
                g533 = -919.22770 + 4988.6100 * em - 9064.7700 * emsq + 5542.21 * eoc;
                g521 = -822.71072 + 4568.6173 * em - 8491.4146 * emsq + 5337.524 * eoc;
                g532 = -853.66600 + 4690.2500 * em - 8624.7700 * emsq + 5341.4 * eoc;
            } else {
                g533 = -37995.780 + 161616.52 * em - 229838.20 * emsq + 109377.94 * eoc;
                g521 = -51752.104 + 218913.95 * em - 309468.16 * emsq + 146349.42 * eoc;
                g532 = -40023.880 + 170470.89 * em - 242699.48 * emsq + 115605.82 * eoc;
            }

            let sini2 = sinim * sinim;
            let f220 = 0.75 * (1.0 + 2.0 * cosim + cosisq);
            let f221 = 1.5 * sini2;
            let f321 = 1.875 * sinim * (1.0 - 2.0 * cosim - 3.0 * cosisq);
            let f322 = -1.875 * sinim * (1.0 + 2.0 * cosim - 3.0 * cosisq);
            let f441 = 35.0 * sini2 * f220;
            let f442 = 39.3750 * sini2 * sini2;
            let f522 = 9.84375
                * sinim
                * (sini2 * (1.0 - 2.0 * cosim - 5.0 * cosisq)
                    + 0.33333333 * (-2.0 + 4.0 * cosim + 6.0 * cosisq));
            let f523 = sinim
                * (4.92187512 * sini2 * (-2.0 - 4.0 * cosim + 10.0 * cosisq)
                    + 6.56250012 * (1.0 + 2.0 * cosim - 3.0 * cosisq));
            let f542 = 29.53125
                * sinim
                * (2.0 - 8.0 * cosim + cosisq * (-12.0 + 8.0 * cosim + 10.0 * cosisq));
            let f543 = 29.53125
                * sinim
                * (-2.0 - 8.0 * cosim + cosisq * (12.0 + 8.0 * cosim - 10.0 * cosisq));

            let xno2 = nm * nm;
            let ainv2 = aonv * aonv;
            let mut temp1 = 3.0 * xno2 * ainv2;
            let mut temp = temp1 * ROOT22;
            let d2201 = temp * f220 * g201;
            let d2211 = temp * f221 * g211;
            temp1 *= aonv;
            temp = temp1 * ROOT32;
            let d3210 = temp * f321 * g310;
            let d3222 = temp * f322 * g322;
            temp1 *= aonv;
            temp = 2.0 * temp1 * ROOT44;
            let d4410 = temp * f441 * g410;
            let d4422 = temp * f442 * g422;
            temp1 *= aonv;
            temp = temp1 * ROOT52;
            let d5220 = temp * f522 * g520;
            let d5232 = temp * f523 * g532;
            temp = 2.0 * temp1 * ROOT54;
            let d5421 = temp * f542 * g521;
            let d5433 = temp * f543 * g533;

            Some(Resonance {
                terms: ResonanceTerms::HalfDay {
                    d2201,
                    d2211,
                    d3210,
                    d3222,
                    d4410,
                    d4422,
                    d5220,
                    d5232,
                    d5421,
                    d5433,
                },
                xlamo: (epoch.mo + epoch.nodeo + epoch.nodeo - theta - theta) % TWOPI,
                xfact: near.mdot + rates.dmdt + 2.0 * (near.nodedot + rates.dnodt - RPTIM) - nm,
            })
        }
        ResonanceClass::Synchronous => {
            let emsq = common.emsq;
            let g200 = 1.0 + emsq * (-2.5 + 0.8125 * emsq);
            let g310 = 1.0 + 2.0 * emsq;
            let g300 = 1.0 + emsq * (-6.0 + 6.60937 * emsq);
            let f220 = 0.75 * (1.0 + cosim) * (1.0 + cosim);
            let f311 = 0.9375 * sinim * sinim * (1.0 + 3.0 * cosim) - 0.75 * (1.0 + cosim);
            let f330 = 1.0 + cosim;
            let f330 = 1.875 * f330 * f330 * f330;
            let del1 = 3.0 * nm * nm * aonv * aonv;
            let del2 = 2.0 * del1 * f220 * g200 * Q22;
            let del3 = 3.0 * del1 * f330 * g300 * Q33 * aonv;
            let del1 = del1 * f311 * g310 * Q31 * aonv;

            Some(Resonance {
                terms: ResonanceTerms::Synchronous { del1, del2, del3 },
                xlamo: (epoch.mo + epoch.nodeo + epoch.argpo - theta) % TWOPI,
                xfact: near.mdot + near.xpidot - RPTIM + rates.dmdt + rates.domdt + rates.dnodt
                    - nm,
            })
        }
    }
}
