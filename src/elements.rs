//! The mean element set a propagator is built from.

use std::f64::consts::PI;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::datetime::{self, jday, JD_1950, MINUTES_PER_DAY, TWOPI};
use crate::error::{InvalidOrbit, Result};

/// rev/day per rad/min
pub const XPDOTP: f64 = MINUTES_PER_DAY / TWOPI;

/// Mean orbital elements of one satellite at one epoch, in the units the
/// propagator consumes: radians for angles, revolutions per day for mean
/// motion, rev/day² and rev/day³ for its derivatives, inverse earth radii for
/// B*.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElementSet {
    pub name: Option<String>,
    pub catalog_number: u32,
    pub classification: char,
    pub international_designator: String,
    /// Four-digit year of the epoch.
    pub epoch_year: i32,
    /// Fractional day of year of the epoch, 1.0 being January 1 00:00 UTC.
    pub epoch_day: f64,
    /// First derivative of mean motion divided by two.
    pub mean_motion_dot: f64,
    /// Second derivative of mean motion divided by six.
    pub mean_motion_ddot: f64,
    pub bstar: f64,
    pub ephemeris_type: u8,
    pub element_set_number: u32,
    pub inclination: f64,
    pub right_ascension: f64,
    pub eccentricity: f64,
    pub argument_of_perigee: f64,
    pub mean_anomaly: f64,
    /// Kozai mean motion, rev/day.
    pub mean_motion: f64,
    pub revolution_number: u32,
}

impl OrbitalElementSet {
    /// Check the invariants every element set must satisfy before a
    /// propagator may be built from it.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.eccentricity) {
            return Err(InvalidOrbit::Eccentricity(self.eccentricity).into());
        }
        if !(0.0..=PI).contains(&self.inclination) {
            return Err(InvalidOrbit::Inclination(self.inclination).into());
        }
        if !(self.mean_motion > 0.0) || !self.mean_motion.is_finite() {
            return Err(InvalidOrbit::MeanMotion(self.mean_motion).into());
        }
        Ok(())
    }

    /// Kozai mean motion in rad/min.
    pub fn mean_motion_rad_per_min(&self) -> f64 {
        self.mean_motion / XPDOTP
    }

    /// Split Julian date of the epoch.
    pub fn epoch_julian(&self) -> (f64, f64) {
        let (jan0, _) = jday(self.epoch_year, 1, 0, 0, 0, 0.0);
        let whole = self.epoch_day.floor();
        (jan0 + whole, self.epoch_day - whole)
    }

    /// Epoch in days since 1950 January 0.0.
    pub fn epoch_days_since_1950(&self) -> f64 {
        let (jd, fr) = self.epoch_julian();
        (jd - JD_1950) + fr
    }

    pub fn epoch_datetime(&self) -> Result<NaiveDateTime> {
        datetime::datetime_from_year_day(self.epoch_year, self.epoch_day)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::datetime::DEG2RAD;

    /// Catalog object 00005 (Vanguard 1), the first verification case.
    pub fn vanguard() -> OrbitalElementSet {
        OrbitalElementSet {
            name: None,
            catalog_number: 5,
            classification: 'U',
            international_designator: "58002B".into(),
            epoch_year: 2000,
            epoch_day: 179.784_950_62,
            mean_motion_dot: 0.000_000_23,
            mean_motion_ddot: 0.0,
            bstar: 0.280_98e-4,
            ephemeris_type: 0,
            element_set_number: 475,
            inclination: 34.2682 * DEG2RAD,
            right_ascension: 348.7242 * DEG2RAD,
            eccentricity: 0.185_966_7,
            argument_of_perigee: 331.7664 * DEG2RAD,
            mean_anomaly: 19.3264 * DEG2RAD,
            mean_motion: 10.824_191_57,
            revolution_number: 41366,
        }
    }

    /// A low, drag-free orbit with every angle at zero.
    pub fn circular_leo() -> OrbitalElementSet {
        OrbitalElementSet {
            name: Some("TEST LEO".into()),
            catalog_number: 99_001,
            international_designator: "24001A".into(),
            epoch_year: 2024,
            epoch_day: 1.5,
            mean_motion_dot: 0.0,
            bstar: 0.0,
            inclination: 0.0,
            right_ascension: 0.0,
            eccentricity: 0.0,
            argument_of_perigee: 0.0,
            mean_anomaly: 0.0,
            mean_motion: 15.5,
            revolution_number: 1,
            element_set_number: 1,
            ..vanguard()
        }
    }
}
