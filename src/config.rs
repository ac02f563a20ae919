//! Propagator configuration.

use serde::{Deserialize, Serialize};

use crate::earth_gravity::GravityModel;

/// Which flavour of the algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationMode {
    /// Legacy AFSPC behaviour: 1970-referenced sidereal time and node
    /// wrapping into [0, 2π) in the low-inclination lunar/solar branch.
    Afspc,
    /// IAU-82 sidereal time, no node wrapping.
    #[default]
    Improved,
}

impl OperationMode {
    /// The single-letter code used in the reference literature.
    pub fn code(self) -> char {
        match self {
            OperationMode::Afspc => 'a',
            OperationMode::Improved => 'i',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PropagatorConfig {
    pub gravity: GravityModel,
    pub mode: OperationMode,
}

impl PropagatorConfig {
    pub fn with_gravity(mut self, gravity: GravityModel) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_mode(mut self, mode: OperationMode) -> Self {
        self.mode = mode;
        self
    }
}
