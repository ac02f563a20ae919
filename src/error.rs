//! Error types surfaced by the propagator.
//!
//! Every failure is a deterministic function of the element set and the
//! requested time, so nothing here is retried. A failed call never touches
//! the propagator's working elements.

use thiserror::Error;

use crate::alpha5::Alpha5Error;

/// TLE text could not be turned into an element set.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TleError {
    #[error("TLE lines contain non-ASCII characters")]
    NonAscii,

    #[error("line {line} is too short: expected at least {expected} columns, got {got}")]
    TooShort { line: u8, expected: usize, got: usize },

    #[error("line {line} does not follow the TLE column layout:\n{given}")]
    Layout { line: u8, given: String },

    #[error("catalog numbers in lines 1 and 2 do not match: {0} vs {1}")]
    CatalogMismatch(String, String),

    #[error("checksum failed on line {line}: line gives {given}, computed {computed}")]
    Checksum { line: u8, given: u32, computed: u32 },

    #[error("failed to parse field '{field}' from {text:?}")]
    Field { field: &'static str, text: String },

    #[error("invalid catalog number: {0}")]
    CatalogNumber(#[from] Alpha5Error),

    #[error("expected two or three lines, got {0}")]
    LineCount(usize),
}

/// Element set or reconstructed orbit is geometrically impossible.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidOrbit {
    #[error("eccentricity {0} not within range 0.0 <= e < 1.0")]
    Eccentricity(f64),

    #[error("inclination {0} rad not within range 0 <= i <= pi")]
    Inclination(f64),

    #[error("mean motion {0} rev/day must be positive")]
    MeanMotion(f64),

    #[error("perigee radius {perigee_er} earth radii lies inside the earth")]
    PerigeeInsideEarth { perigee_er: f64 },

    #[error("semi-latus rectum {semi_latus_rectum} is not positive at {minutes} minutes")]
    SemiLatusRectum { semi_latus_rectum: f64, minutes: f64 },
}

/// Why a drag-decayed orbit was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Decay {
    #[error("mean motion {0} is less than zero")]
    MeanMotion(f64),

    #[error("mean eccentricity {0} not within range 0.0 <= e < 1.0")]
    Eccentricity(f64),

    #[error("radius {radius_er} earth radii is below the surface")]
    BelowSurface { radius_er: f64 },
}

/// Why the deep-space stage gave up.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DeepSpaceFailure {
    #[error("resonance mean motion {mean_motion} diverged after {steps} steps")]
    ResonanceDiverged { mean_motion: f64, steps: u64 },

    #[error("perturbed eccentricity {0} not within range 0.0 <= e <= 1.0")]
    PerturbedEccentricity(f64),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("malformed element set: {0}")]
    MalformedElementSet(#[from] TleError),

    #[error("invalid orbit: {0}")]
    InvalidOrbit(#[from] InvalidOrbit),

    #[error("orbit decayed at {minutes} minutes since epoch: {cause}")]
    OrbitDecayed { minutes: f64, cause: Decay },

    #[error("deep-space integration failed at {minutes} minutes since epoch: {cause}")]
    DeepSpaceIntegration { minutes: f64, cause: DeepSpaceFailure },

    #[error(
        "Kepler's equation did not converge at {minutes} minutes since epoch \
         ({iterations} iterations, last correction {correction})"
    )]
    KeplerConvergence {
        minutes: f64,
        iterations: u32,
        correction: f64,
    },

    #[error("unknown gravity model {0:?} (use wgs72old, wgs72, wgs84)")]
    UnknownGravityModel(String),

    #[error("timestamp is not a valid calendar date: {0}")]
    InvalidTimestamp(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Status code used across the C ABI. Zero is reserved for success.
    pub fn code(&self) -> i32 {
        match self {
            Error::MalformedElementSet(_) => -1,
            Error::InvalidOrbit(_) => -2,
            Error::OrbitDecayed { .. } => -3,
            Error::DeepSpaceIntegration { .. } => -4,
            Error::KeplerConvergence { .. } => -5,
            Error::UnknownGravityModel(_) => -6,
            Error::InvalidTimestamp(_) => -7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct_and_negative() {
        let errors = [
            Error::MalformedElementSet(TleError::NonAscii),
            Error::InvalidOrbit(InvalidOrbit::Eccentricity(1.2)),
            Error::OrbitDecayed {
                minutes: 1.0,
                cause: Decay::MeanMotion(-1.0),
            },
            Error::DeepSpaceIntegration {
                minutes: 1.0,
                cause: DeepSpaceFailure::PerturbedEccentricity(1.5),
            },
            Error::KeplerConvergence {
                minutes: 1.0,
                iterations: 10,
                correction: 0.5,
            },
            Error::UnknownGravityModel("egm96".into()),
            Error::InvalidTimestamp("2021-02-30".into()),
        ];
        let mut codes: Vec<i32> = errors.iter().map(Error::code).collect();
        assert!(codes.iter().all(|&c| c < 0));
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn messages_carry_the_offending_value() {
        let err = Error::from(InvalidOrbit::PerigeeInsideEarth { perigee_er: 0.98 });
        assert!(err.to_string().contains("0.98"));

        let err = Error::OrbitDecayed {
            minutes: 1440.0,
            cause: Decay::BelowSurface { radius_er: 0.99 },
        };
        let text = err.to_string();
        assert!(text.contains("1440"), "{text}");
        assert!(text.contains("below the surface"), "{text}");
    }
}
