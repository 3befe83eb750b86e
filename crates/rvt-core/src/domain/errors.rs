use crate::peaks::PeakError;

pub type MotionResult<T> = Result<T, MotionError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegionError {
    #[error("unsupported region '{name}', expected one of: wus, ceus")]
    Unsupported { name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SpreadingError {
    #[error("geometric spreading requires at least one segment")]
    EmptySegments,
    #[error("geometric spreading segment {index} lacks a distance limit but is not the final segment")]
    UnboundedInnerSegment { index: usize },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MotionError {
    #[error(
        "frequency and fourier amplitude length mismatch: frequency={frequency}, fourier_amplitude={fourier_amplitude}"
    )]
    LengthMismatch {
        frequency: usize,
        fourier_amplitude: usize,
    },
    #[error("motion requires at least 2 frequency points, got {actual}")]
    InsufficientPoints { actual: usize },
    #[error("frequency grid entry must be finite and > 0 at index {index}, got {value}")]
    InvalidFrequency { index: usize, value: f64 },
    #[error(
        "frequency grid must be strictly increasing, index {index} has {current} after {previous}"
    )]
    NonIncreasingFrequency {
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("fourier amplitude must be finite and >= 0 at index {index}, got {value}")]
    InvalidAmplitude { index: usize, value: f64 },
    #[error("duration must be finite and > 0, got {value}")]
    InvalidDuration { value: f64 },
    #[error("fourier amplitude has not been computed for this motion")]
    FourierAmplitudeNotComputed,
    #[error(
        "target spectrum length mismatch: osc_freq={osc_freq}, osc_resp_target={osc_resp_target}"
    )]
    TargetLengthMismatch {
        osc_freq: usize,
        osc_resp_target: usize,
    },
    #[error("target spectrum requires at least 2 oscillator frequencies, got {actual}")]
    InsufficientTargetPoints { actual: usize },
    #[error("target response must be finite and > 0 at index {index}, got {value}")]
    InvalidTargetResponse { index: usize, value: f64 },
    #[error(
        "matched frequency band leaves only {interior_points} interior grid points, need at least 2"
    )]
    NarrowTargetBand { interior_points: usize },
    #[error("matching configuration field '{field}' is out of range: {value}")]
    InvalidMatchingConfig { field: &'static str, value: f64 },
    #[error(transparent)]
    Region(#[from] RegionError),
    #[error(transparent)]
    Spreading(#[from] SpreadingError),
    #[error(transparent)]
    Peak(#[from] PeakError),
}
