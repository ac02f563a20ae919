//! SGP4/SDP4 analytic propagation of two-line element sets.
//!
//! Parse a TLE with [`Tle`], build a [`Propagator`] once, then ask for TEME
//! position and velocity at any number of times since epoch. Orbits with a
//! period of 225 minutes or more take the deep-space (SDP4) path with
//! lunar/solar perturbations and 12h/24h resonance.
//!
//! The [`ffi`] module exposes the same pipeline over a C ABI.

pub mod alpha5;
pub mod config;
pub mod datetime;
pub mod deep_space;
pub mod earth_gravity;
pub mod elements;
pub mod error;
pub mod ffi;
pub mod kepler;
pub mod near_earth;
pub mod propagator;
pub mod reconstruct;
pub mod recovery;
pub mod state;
pub mod tle;

pub use alpha5::Alpha5Error;
pub use config::{OperationMode, PropagatorConfig};
pub use deep_space::ResonanceClass;
pub use earth_gravity::{EarthGravity, GravityModel};
pub use elements::OrbitalElementSet;
pub use error::{Decay, DeepSpaceFailure, Error, InvalidOrbit, Result, TleError};
pub use propagator::Propagator;
pub use recovery::Regime;
pub use state::{Osculating, StateVector};
pub use tle::Tle;
