//! Random vibration theory (RVT) models of strong ground-motion Fourier
//! amplitude spectra.
//!
//! The crate forward-models a point-source Fourier amplitude spectrum from
//! earthquake source parameters ([`SourceTheoryMotion`]) and inverts a target
//! oscillator response spectrum back into a compatible spectrum
//! ([`CompatibleMotion`]). Peak-factor statistics are consumed through the
//! [`PeakCalculator`] capability so they can be substituted with a test
//! double.

pub mod common;
pub mod domain;
pub mod motions;
pub mod numerics;
pub mod peaks;

pub use domain::{
    MotionError, MotionResult, Region, RegionError, RegionModel, SpreadingError, SpreadingSegment,
};
pub use motions::{
    geometric_spreading, stress_drop, CompatibleMotion, DurationSpec, MatchingConfig,
    MatchingDiagnostics, Motion, SourceTheoryMotion,
};
pub use peaks::{
    default_peak_calculator, BooreJoyner1984, LiuPezeshk1999, PeakCalculator, PeakError, PeakInput,
    RmsDurationMethod,
};
