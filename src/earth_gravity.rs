//! Earth gravity model parameters used by SGP4.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Which set of geopotential constants to propagate with.
///
/// TLEs are fitted with WGS-72, so that is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GravityModel {
    Wgs72Old,
    #[default]
    Wgs72,
    Wgs84,
}

/// Constants of one gravity model, in SGP4's canonical units
/// (earth radii, minutes).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EarthGravity {
    /// Minutes per canonical time unit.
    pub tumin: f64,
    /// km^3 / s^2
    pub mu: f64,
    pub radius_km: f64,
    /// sqrt(GM) in earth radii^1.5 / minute.
    pub xke: f64,
    pub j2: f64,
    pub j3: f64,
    pub j4: f64,
    pub j3oj2: f64,
}

impl EarthGravity {
    fn from_parts(mu: f64, radius_km: f64, xke: f64, j2: f64, j3: f64, j4: f64) -> Self {
        EarthGravity {
            tumin: 1.0 / xke,
            mu,
            radius_km,
            xke,
            j2,
            j3,
            j4,
            j3oj2: j3 / j2,
        }
    }

    /// Earth-radii-per-minute to km/s.
    pub fn velocity_km_per_s(&self) -> f64 {
        self.radius_km * self.xke / 60.0
    }
}

fn xke_from(mu: f64, radius_km: f64) -> f64 {
    60.0 / (radius_km * radius_km * radius_km / mu).sqrt()
}

impl GravityModel {
    pub fn constants(self) -> EarthGravity {
        match self {
            GravityModel::Wgs72Old => EarthGravity::from_parts(
                398_600.799_64,
                6378.135,
                0.074_366_916_1,
                0.001_082_616,
                -0.000_002_538_81,
                -0.000_001_655_97,
            ),
            GravityModel::Wgs72 => {
                let mu = 398_600.8;
                let radius_km = 6378.135;
                EarthGravity::from_parts(
                    mu,
                    radius_km,
                    xke_from(mu, radius_km),
                    0.001_082_616,
                    -0.000_002_538_81,
                    -0.000_001_655_97,
                )
            }
            GravityModel::Wgs84 => {
                let mu = 398_600.5;
                let radius_km = 6378.137;
                EarthGravity::from_parts(
                    mu,
                    radius_km,
                    xke_from(mu, radius_km),
                    0.001_082_629_989_05,
                    -0.000_002_532_153_06,
                    -0.000_001_610_987_61,
                )
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GravityModel::Wgs72Old => "wgs72old",
            GravityModel::Wgs72 => "wgs72",
            GravityModel::Wgs84 => "wgs84",
        }
    }
}

impl FromStr for GravityModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wgs72old" => Ok(GravityModel::Wgs72Old),
            "wgs72" => Ok(GravityModel::Wgs72),
            "wgs84" => Ok(GravityModel::Wgs84),
            other => Err(Error::UnknownGravityModel(other.to_string())),
        }
    }
}

impl fmt::Display for GravityModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) {
        assert!((a - b).abs() <= tol, "expected {b}, got {a}");
    }

    #[test]
    fn wgs72_xke_matches_published_value() {
        let g = GravityModel::Wgs72.constants();
        approx_eq(g.xke, 0.074_366_916_133_17, 1.0e-12);
        approx_eq(g.tumin, 13.446_839_696_959_31, 1.0e-9);
        approx_eq(g.j3oj2, -0.002_345_069_720_011_528, 1.0e-15);
    }

    #[test]
    fn old_wgs72_uses_the_truncated_xke() {
        let old = GravityModel::Wgs72Old.constants();
        let new = GravityModel::Wgs72.constants();
        assert_eq!(old.xke, 0.074_366_916_1);
        assert_ne!(old.xke, new.xke);
        assert_eq!(old.j2, new.j2);
    }

    #[test]
    fn names_round_trip_through_from_str() {
        for model in [GravityModel::Wgs72Old, GravityModel::Wgs72, GravityModel::Wgs84] {
            assert_eq!(model.name().parse::<GravityModel>().unwrap(), model);
        }
        assert_eq!("WGS84".parse::<GravityModel>().unwrap(), GravityModel::Wgs84);
        assert!(matches!(
            "egm2008".parse::<GravityModel>(),
            Err(Error::UnknownGravityModel(_))
        ));
    }
}
