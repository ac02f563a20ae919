//! The propagator: one element set in, TEME states out.

use chrono::{DateTime, Utc};
use log::debug;

use crate::config::{OperationMode, PropagatorConfig};
use crate::datetime::{julian_from_datetime, MINUTES_PER_DAY};
use crate::deep_space::{DeepSpace, ResonanceClass};
use crate::earth_gravity::EarthGravity;
use crate::elements::OrbitalElementSet;
use crate::error::{Error, Result};
use crate::near_earth::{self, EpochElements, NearEarth};
use crate::reconstruct::{reconstruct, PerturbedElements};
use crate::recovery::{recover, Recovered, Regime};
use crate::state::StateVector;

/// Everything derived from one element set at construction. Never changes
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
struct WorkingElements {
    epoch: EpochElements,
    recovered: Recovered,
    near: NearEarth,
    deep: Option<DeepSpace>,
}

/// SGP4/SDP4 propagator for a single satellite.
///
/// Construction validates the element set and computes all per-satellite
/// coefficients once. [`Propagator::propagate`] is then a pure function of
/// the elapsed time, so a propagator can be shared between threads freely.
///
/// ```
/// use sgp4_engine::{Propagator, Tle};
///
/// let tle = Tle::parse(
///     "1 00005U 58002B   00179.78495062  .00000023  00000-0  28098-4 0  4753",
///     "2 00005  34.2682 348.7242 1859667 331.7664  19.3264 10.82419157413667",
/// )?;
/// let propagator = Propagator::new(&tle.elements)?;
/// let state = propagator.propagate(360.0)?;
/// assert!((state.position[0] + 7154.031).abs() < 1e-3);
/// # Ok::<(), sgp4_engine::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Propagator {
    elements: OrbitalElementSet,
    config: PropagatorConfig,
    gravity: EarthGravity,
    working: WorkingElements,
}

impl Propagator {
    /// Build with WGS-72 constants in improved mode.
    pub fn new(elements: &OrbitalElementSet) -> Result<Propagator> {
        Self::with_config(elements, PropagatorConfig::default())
    }

    pub fn with_config(elements: &OrbitalElementSet, config: PropagatorConfig) -> Result<Propagator> {
        elements.validate()?;
        let gravity = config.gravity.constants();

        let epoch = EpochElements {
            ecco: elements.eccentricity,
            inclo: elements.inclination,
            nodeo: elements.right_ascension,
            argpo: elements.argument_of_perigee,
            mo: elements.mean_anomaly,
            bstar: elements.bstar,
        };
        let epoch_days = elements.epoch_days_since_1950();
        let recovered = recover(
            &gravity,
            config.mode,
            elements.eccentricity,
            elements.inclination,
            elements.mean_motion_rad_per_min(),
            epoch_days,
        )?;

        let regime = recovered.regime();
        let deep_space = regime == Regime::DeepSpace;
        let near = NearEarth::new(&gravity, &epoch, &recovered, deep_space);
        let deep =
            deep_space.then(|| DeepSpace::new(&gravity, &epoch, &recovered, &near, epoch_days));

        let propagator = Propagator {
            elements: elements.clone(),
            config,
            gravity,
            working: WorkingElements {
                epoch,
                recovered,
                near,
                deep,
            },
        };

        debug!(
            "initialised {:05} ({:?}, {:?} resonance, {:?}/{}): a={:.3} km, n={:.9} rad/min, perigee={:.3} km",
            elements.catalog_number,
            regime,
            propagator.resonance(),
            config.gravity,
            config.mode.code(),
            propagator.semi_major_axis_km(),
            recovered.mean_motion,
            propagator.perigee_altitude_km(),
        );

        // propagate once at epoch so a set that cannot even be evaluated
        // there is rejected up front
        propagator.propagate(0.0)?;
        Ok(propagator)
    }

    /// State `minutes` after epoch (negative for earlier times).
    pub fn propagate(&self, minutes: f64) -> Result<StateVector> {
        if !minutes.is_finite() {
            return Err(Error::InvalidTimestamp(format!(
                "{minutes} minutes since epoch"
            )));
        }
        let t = minutes;
        let w = &self.working;
        let no = w.recovered.mean_motion;

        let (mut secular, drag) = w.near.secular(&w.epoch, no, t);
        if let Some(deep) = &w.deep {
            deep.secular(t, &mut secular)?;
        }
        let mean = near_earth::decay(&self.gravity, no, secular, drag, t)?;

        let perturbed = match &w.deep {
            Some(deep) => deep.periodics(self.config.mode, t, &mean)?,
            None => PerturbedElements::from(&mean),
        };

        reconstruct(&self.gravity, &w.near, w.deep.is_some(), &mean, &perturbed, t)
    }

    /// State at a UTC instant.
    pub fn propagate_to(&self, when: &DateTime<Utc>) -> Result<StateVector> {
        self.propagate(self.minutes_since_epoch(when))
    }

    /// Minutes from the element set epoch to `when`.
    pub fn minutes_since_epoch(&self, when: &DateTime<Utc>) -> f64 {
        let (jd, fr) = julian_from_datetime(when);
        let (epoch_jd, epoch_fr) = self.elements.epoch_julian();
        ((jd - epoch_jd) + (fr - epoch_fr)) * MINUTES_PER_DAY
    }

    pub fn elements(&self) -> &OrbitalElementSet {
        &self.elements
    }

    pub fn config(&self) -> PropagatorConfig {
        self.config
    }

    pub fn gravity(&self) -> &EarthGravity {
        &self.gravity
    }

    pub fn operation_mode(&self) -> OperationMode {
        self.config.mode
    }

    pub fn regime(&self) -> Regime {
        self.working.recovered.regime()
    }

    pub fn resonance(&self) -> ResonanceClass {
        self.working
            .deep
            .as_ref()
            .map_or(ResonanceClass::None, DeepSpace::resonance_class)
    }

    /// Brouwer mean motion recovered from the Kozai value, rad/min.
    pub fn recovered_mean_motion(&self) -> f64 {
        self.working.recovered.mean_motion
    }

    pub fn semi_major_axis_km(&self) -> f64 {
        self.working.recovered.semi_major_axis * self.gravity.radius_km
    }

    pub fn perigee_altitude_km(&self) -> f64 {
        (self.working.recovered.perigee - 1.0) * self.gravity.radius_km
    }

    pub fn apogee_altitude_km(&self) -> f64 {
        let a = self.working.recovered.semi_major_axis;
        (a * (1.0 + self.elements.eccentricity) - 1.0) * self.gravity.radius_km
    }

    /// Orbital period, minutes.
    pub fn period_minutes(&self) -> f64 {
        self.working.recovered.period()
    }

    /// Greenwich sidereal time at epoch, radians.
    pub fn gsto(&self) -> f64 {
        self.working.recovered.gsto
    }
}
