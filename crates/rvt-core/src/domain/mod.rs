pub mod errors;

pub use errors::{MotionError, MotionResult, RegionError, SpreadingError};

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One segment of a piecewise power-law geometric-spreading model.
///
/// `limit` is the distance in km out to which the segment applies; `None`
/// marks the final, unbounded segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadingSegment {
    pub slope: f64,
    pub limit: Option<f64>,
}

impl SpreadingSegment {
    pub const fn new(slope: f64, limit: Option<f64>) -> Self {
        Self { slope, limit }
    }
}

/// Closed set of supported regional attenuation models.
///
/// The set is fixed by the published empirical models and is not
/// user-extensible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// Western United States, Campbell (2003).
    Wus,
    /// Central and Eastern United States, Campbell (2003).
    Ceus,
}

impl Region {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wus => "wus",
            Self::Ceus => "ceus",
        }
    }

    pub const fn model(self) -> &'static RegionModel {
        match self {
            Self::Wus => &WUS_MODEL,
            Self::Ceus => &CEUS_MODEL,
        }
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for Region {
    type Err = RegionError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "wus" => Ok(Self::Wus),
            "ceus" => Ok(Self::Ceus),
            _ => Err(RegionError::Unsupported {
                name: name.to_string(),
            }),
        }
    }
}

/// Regional constant record of the point-source model.
///
/// Crustal amplification is tabulated as anchor frequencies in Hz paired with
/// amplification factors from a quarter-wavelength approximation; the motion
/// models interpolate it against log-frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionModel {
    /// Crustal shear-wave velocity in km/s.
    pub shear_velocity: f64,
    /// Crustal density in g/cm^3.
    pub density: f64,
    /// Coefficient of the frequency-dependent quality factor Q(f).
    pub path_atten_coeff: f64,
    /// Power of the frequency-dependent quality factor Q(f).
    pub path_atten_power: f64,
    /// Site attenuation (kappa) in seconds.
    pub site_atten: f64,
    /// Default stress drop in bars.
    pub default_stress_drop: f64,
    pub geometric_spreading: &'static [SpreadingSegment],
    pub site_amp_frequency: &'static [f64],
    pub site_amp: &'static [f64],
}

pub static WUS_MODEL: RegionModel = RegionModel {
    shear_velocity: 3.5,
    density: 2.8,
    path_atten_coeff: 180.0,
    path_atten_power: 0.45,
    site_atten: 0.04,
    default_stress_drop: 100.0,
    geometric_spreading: &[
        SpreadingSegment::new(1.0, Some(40.0)),
        SpreadingSegment::new(0.5, None),
    ],
    site_amp_frequency: &[
        0.01, 0.09, 0.16, 0.51, 0.84, 1.25, 2.26, 3.17, 6.05, 16.60, 61.20, 100.00,
    ],
    site_amp: &[
        1.00, 1.10, 1.18, 1.42, 1.58, 1.74, 2.06, 2.25, 2.58, 3.13, 4.00, 4.40,
    ],
};

pub static CEUS_MODEL: RegionModel = RegionModel {
    shear_velocity: 3.6,
    density: 2.8,
    path_atten_coeff: 680.0,
    path_atten_power: 0.36,
    site_atten: 0.006,
    default_stress_drop: 150.0,
    geometric_spreading: &[
        SpreadingSegment::new(1.0, Some(70.0)),
        SpreadingSegment::new(0.0, Some(130.0)),
        SpreadingSegment::new(0.5, None),
    ],
    site_amp_frequency: &[
        0.01, 0.10, 0.20, 0.30, 0.50, 0.90, 1.25, 1.80, 3.00, 5.30, 8.00, 14.00, 30.00, 60.00,
        100.00,
    ],
    site_amp: &[
        1.00, 1.02, 1.03, 1.05, 1.07, 1.09, 1.11, 1.12, 1.13, 1.14, 1.15, 1.15, 1.15, 1.15, 1.15,
    ],
};
