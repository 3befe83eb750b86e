//! Random vibration theory peak-factor calculators.
//!
//! Converts a Fourier amplitude spectrum and a ground-motion duration into an
//! expected peak time-domain response. The motion models consume this layer
//! only through [`PeakCalculator`], so a test double can stand in for the
//! statistics when isolating the spectrum-matching logic.

use crate::numerics::trapezoid;
use std::f64::consts::PI;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::Arc;

/// Upper limit and resolution of the peak-factor integrand grid.
const PEAK_FACTOR_Z_MAX: f64 = 10.0;
const PEAK_FACTOR_Z_STEPS: usize = 2_000;

/// Minimum number of extrema assumed by the peak-factor statistics.
const MIN_EXTREMA: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakInput<'a> {
    pub duration: f64,
    pub frequency: &'a [f64],
    pub fourier_amplitude: &'a [f64],
    pub osc_freq: Option<f64>,
    pub osc_damping: Option<f64>,
}

impl<'a> PeakInput<'a> {
    pub fn new(
        duration: f64,
        frequency: &'a [f64],
        fourier_amplitude: &'a [f64],
        osc_freq: Option<f64>,
        osc_damping: Option<f64>,
    ) -> Self {
        Self {
            duration,
            frequency,
            fourier_amplitude,
            osc_freq,
            osc_damping,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PeakError {
    #[error("peak calculation requires at least 2 frequency points, got {actual}")]
    InsufficientPoints { actual: usize },
    #[error(
        "peak input length mismatch: frequency={frequency}, fourier_amplitude={fourier_amplitude}"
    )]
    LengthMismatch {
        frequency: usize,
        fourier_amplitude: usize,
    },
    #[error("frequency grid entry must be finite at index {index}, got {value}")]
    NonFiniteFrequency { index: usize, value: f64 },
    #[error(
        "frequency grid must be strictly increasing, index {index} has {current} after {previous}"
    )]
    NonIncreasingFrequency {
        index: usize,
        previous: f64,
        current: f64,
    },
    #[error("fourier amplitude must be finite at index {index}, got {value}")]
    NonFiniteAmplitude { index: usize, value: f64 },
    #[error("duration must be finite and > 0, got {value}")]
    InvalidDuration { value: f64 },
    #[error("oscillator frequency must be finite and > 0, got {value}")]
    InvalidOscFreq { value: f64 },
    #[error("oscillator damping must be finite and > 0, got {value}")]
    InvalidOscDamping { value: f64 },
    #[error("unsupported rms duration method '{name}', expected one of: boore_joyner")]
    UnsupportedRmsDurationMethod { name: String },
}

/// RMS-duration estimation methods supported by the calculators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RmsDurationMethod {
    BooreJoyner,
}

impl RmsDurationMethod {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BooreJoyner => "boore_joyner",
        }
    }
}

impl Display for RmsDurationMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}

impl FromStr for RmsDurationMethod {
    type Err = PeakError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name.to_ascii_lowercase().as_str() {
            "boore_joyner" => Ok(Self::BooreJoyner),
            _ => Err(PeakError::UnsupportedRmsDurationMethod {
                name: name.to_string(),
            }),
        }
    }
}

/// Stateless peak-response capability shared by all motion instances.
pub trait PeakCalculator: Send + Sync {
    /// Expected peak response for the given spectral and duration inputs.
    fn compute_peak(&self, input: PeakInput<'_>) -> Result<f64, PeakError>;

    /// RMS duration of an oscillator response for the given ground-motion
    /// duration.
    fn compute_duration_rms(
        &self,
        duration: f64,
        osc_freq: f64,
        osc_damping: f64,
        method: RmsDurationMethod,
    ) -> Result<f64, PeakError>;
}

/// Default calculator injected when a motion is built without one.
pub fn default_peak_calculator() -> Arc<dyn PeakCalculator> {
    Arc::new(LiuPezeshk1999)
}

/// Spectral moment `m_n = 2 * integral (2*pi*f)^n |FA(f)|^2 df`.
pub fn spectral_moment(frequency: &[f64], fourier_amplitude: &[f64], order: i32) -> Option<f64> {
    if frequency.len() != fourier_amplitude.len() {
        return None;
    }

    let integrand: Vec<f64> = frequency
        .iter()
        .zip(fourier_amplitude)
        .map(|(&f, &a)| (2.0 * PI * f).powi(order) * a * a)
        .collect();
    trapezoid(frequency, &integrand).map(|value| 2.0 * value)
}

/// Cartwright and Longuet-Higgins (1956) expected peak factor:
/// `sqrt(2) * integral 0..inf of 1 - (1 - bandwidth * exp(-z^2))^num_extrema`.
fn clh_peak_factor(bandwidth: f64, num_extrema: f64) -> f64 {
    let step = PEAK_FACTOR_Z_MAX / PEAK_FACTOR_Z_STEPS as f64;
    let integrand = |z: f64| 1.0 - (1.0 - bandwidth * (-z * z).exp()).powf(num_extrema);

    let mut integral = 0.0;
    let mut previous = integrand(0.0);
    for index in 1..=PEAK_FACTOR_Z_STEPS {
        let current = integrand(step * index as f64);
        integral += step * (previous + current) / 2.0;
        previous = current;
    }

    2.0_f64.sqrt() * integral
}

/// Boore and Joyner (1984) oscillator RMS-duration correction.
fn boore_joyner_duration_rms(duration: f64, osc_freq: f64, osc_damping: f64) -> f64 {
    let osc_duration = 1.0 / (2.0 * PI * osc_damping * osc_freq);
    let duration_ratio = (duration / osc_duration).powi(3);
    duration + osc_duration * duration_ratio / (duration_ratio + 1.0 / 3.0)
}

fn validate_peak_input(input: &PeakInput<'_>) -> Result<(), PeakError> {
    if input.frequency.len() < 2 {
        return Err(PeakError::InsufficientPoints {
            actual: input.frequency.len(),
        });
    }
    if input.frequency.len() != input.fourier_amplitude.len() {
        return Err(PeakError::LengthMismatch {
            frequency: input.frequency.len(),
            fourier_amplitude: input.fourier_amplitude.len(),
        });
    }
    if !input.duration.is_finite() || input.duration <= 0.0 {
        return Err(PeakError::InvalidDuration {
            value: input.duration,
        });
    }

    for (index, value) in input.frequency.iter().copied().enumerate() {
        if !value.is_finite() {
            return Err(PeakError::NonFiniteFrequency { index, value });
        }
        if index > 0 {
            let previous = input.frequency[index - 1];
            if value <= previous {
                return Err(PeakError::NonIncreasingFrequency {
                    index,
                    previous,
                    current: value,
                });
            }
        }
    }

    for (index, value) in input.fourier_amplitude.iter().copied().enumerate() {
        if !value.is_finite() {
            return Err(PeakError::NonFiniteAmplitude { index, value });
        }
    }

    if let Some(value) = input.osc_freq
        && (!value.is_finite() || value <= 0.0)
    {
        return Err(PeakError::InvalidOscFreq { value });
    }
    if let Some(value) = input.osc_damping
        && (!value.is_finite() || value <= 0.0)
    {
        return Err(PeakError::InvalidOscDamping { value });
    }

    Ok(())
}

fn validate_oscillator(osc_freq: f64, osc_damping: f64) -> Result<(), PeakError> {
    if !osc_freq.is_finite() || osc_freq <= 0.0 {
        return Err(PeakError::InvalidOscFreq { value: osc_freq });
    }
    if !osc_damping.is_finite() || osc_damping <= 0.0 {
        return Err(PeakError::InvalidOscDamping { value: osc_damping });
    }
    Ok(())
}

fn rms_duration_for_input(
    calculator: &dyn PeakCalculator,
    input: &PeakInput<'_>,
) -> Result<f64, PeakError> {
    match (input.osc_freq, input.osc_damping) {
        (Some(osc_freq), Some(osc_damping)) => calculator.compute_duration_rms(
            input.duration,
            osc_freq,
            osc_damping,
            RmsDurationMethod::BooreJoyner,
        ),
        _ => Ok(input.duration),
    }
}

fn moment(frequency: &[f64], fourier_amplitude: &[f64], order: i32) -> Result<f64, PeakError> {
    spectral_moment(frequency, fourier_amplitude, order).ok_or(PeakError::InsufficientPoints {
        actual: frequency.len(),
    })
}

/// Boore and Joyner (1984) peak calculator built on the Cartwright and
/// Longuet-Higgins statistics with the m2/m4 bandwidth definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooreJoyner1984;

impl PeakCalculator for BooreJoyner1984 {
    fn compute_peak(&self, input: PeakInput<'_>) -> Result<f64, PeakError> {
        validate_peak_input(&input)?;
        let duration_rms = rms_duration_for_input(self, &input)?;

        let m0 = moment(input.frequency, input.fourier_amplitude, 0)?;
        let m2 = moment(input.frequency, input.fourier_amplitude, 2)?;
        let m4 = moment(input.frequency, input.fourier_amplitude, 4)?;

        let bandwidth = (m2 * m2 / (m0 * m4)).sqrt();
        let num_extrema = ((m4 / m2).sqrt() * input.duration / PI).max(MIN_EXTREMA);
        let peak_factor = clh_peak_factor(bandwidth, num_extrema);

        Ok(peak_factor * (m0 / duration_rms).sqrt())
    }

    fn compute_duration_rms(
        &self,
        duration: f64,
        osc_freq: f64,
        osc_damping: f64,
        method: RmsDurationMethod,
    ) -> Result<f64, PeakError> {
        validate_oscillator(osc_freq, osc_damping)?;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(PeakError::InvalidDuration { value: duration });
        }
        match method {
            RmsDurationMethod::BooreJoyner => {
                Ok(boore_joyner_duration_rms(duration, osc_freq, osc_damping))
            }
        }
    }
}

/// Liu and Pezeshk (1999) peak calculator: the m1-based bandwidth with the
/// zero-crossing count, reusing the Boore and Joyner RMS-duration correction.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiuPezeshk1999;

impl PeakCalculator for LiuPezeshk1999 {
    fn compute_peak(&self, input: PeakInput<'_>) -> Result<f64, PeakError> {
        validate_peak_input(&input)?;
        let duration_rms = rms_duration_for_input(self, &input)?;

        let m0 = moment(input.frequency, input.fourier_amplitude, 0)?;
        let m1 = moment(input.frequency, input.fourier_amplitude, 1)?;
        let m2 = moment(input.frequency, input.fourier_amplitude, 2)?;

        let bandwidth = (1.0 - m1 * m1 / (m0 * m2)).max(0.0).sqrt();
        let num_crossings = ((m2 / m0).sqrt() * input.duration / PI).max(MIN_EXTREMA);
        let peak_factor = clh_peak_factor(bandwidth, num_crossings);

        Ok(peak_factor * (m0 / duration_rms).sqrt())
    }

    fn compute_duration_rms(
        &self,
        duration: f64,
        osc_freq: f64,
        osc_damping: f64,
        method: RmsDurationMethod,
    ) -> Result<f64, PeakError> {
        BooreJoyner1984.compute_duration_rms(duration, osc_freq, osc_damping, method)
    }
}

#[cfg(test)]
mod tests {
    use super::{
        spectral_moment, BooreJoyner1984, LiuPezeshk1999, PeakCalculator, PeakError, PeakInput,
        RmsDurationMethod,
    };
    use std::f64::consts::PI;
    use std::str::FromStr;

    fn flat_spectrum(f_min: f64, f_max: f64, count: usize) -> (Vec<f64>, Vec<f64>) {
        let step = (f_max - f_min) / ((count - 1) as f64);
        let frequency: Vec<f64> = (0..count).map(|i| f_min + step * i as f64).collect();
        let amplitude = vec![1.0; count];
        (frequency, amplitude)
    }

    #[test]
    fn spectral_moments_match_analytic_flat_spectrum() {
        let (frequency, amplitude) = flat_spectrum(1.0, 5.0, 4_001);

        let m0 = spectral_moment(&frequency, &amplitude, 0).expect("m0");
        assert!((m0 - 2.0 * 4.0).abs() < 1.0e-9);

        let expected_m2 = 2.0 * (2.0 * PI).powi(2) * (125.0 - 1.0) / 3.0;
        let m2 = spectral_moment(&frequency, &amplitude, 2).expect("m2");
        assert!((m2 - expected_m2).abs() / expected_m2 < 1.0e-6);
    }

    #[test]
    fn spectral_moment_rejects_mismatched_lengths() {
        assert_eq!(spectral_moment(&[1.0, 2.0], &[1.0], 0), None);
    }

    #[test]
    fn peak_exceeds_rms_for_flat_spectrum() {
        let (frequency, amplitude) = flat_spectrum(0.1, 20.0, 2_001);
        let duration = 10.0;
        let input = PeakInput::new(duration, &frequency, &amplitude, None, None);

        for calculator in [
            &BooreJoyner1984 as &dyn PeakCalculator,
            &LiuPezeshk1999 as &dyn PeakCalculator,
        ] {
            let peak = calculator.compute_peak(input).expect("peak");
            let m0 = spectral_moment(&frequency, &amplitude, 0).expect("m0");
            let rms = (m0 / duration).sqrt();
            assert!(peak > rms, "peak {peak} should exceed rms {rms}");
            assert!(peak < 10.0 * rms, "peak factor should stay bounded");
        }
    }

    #[test]
    fn peak_scales_linearly_with_amplitude() {
        let (frequency, amplitude) = flat_spectrum(0.1, 20.0, 1_001);
        let doubled: Vec<f64> = amplitude.iter().map(|a| 2.0 * a).collect();
        let calculator = LiuPezeshk1999;

        let base = calculator
            .compute_peak(PeakInput::new(8.0, &frequency, &amplitude, None, None))
            .expect("base peak");
        let scaled = calculator
            .compute_peak(PeakInput::new(8.0, &frequency, &doubled, None, None))
            .expect("scaled peak");

        assert!((scaled / base - 2.0).abs() < 1.0e-9);
    }

    #[test]
    fn rms_duration_correction_exceeds_ground_motion_duration() {
        let calculator = BooreJoyner1984;
        let duration = 12.0;
        let corrected = calculator
            .compute_duration_rms(duration, 1.0, 0.05, RmsDurationMethod::BooreJoyner)
            .expect("duration");
        assert!(corrected > duration);

        // Short-period oscillators decay quickly, so the correction vanishes.
        let short_period = calculator
            .compute_duration_rms(duration, 100.0, 0.05, RmsDurationMethod::BooreJoyner)
            .expect("duration");
        assert!(short_period - duration < 0.05);
    }

    #[test]
    fn rms_duration_rejects_invalid_oscillator_parameters() {
        let calculator = BooreJoyner1984;
        let error = calculator
            .compute_duration_rms(10.0, -1.0, 0.05, RmsDurationMethod::BooreJoyner)
            .expect_err("negative frequency should fail");
        assert_eq!(error, PeakError::InvalidOscFreq { value: -1.0 });

        let error = calculator
            .compute_duration_rms(10.0, 1.0, 0.0, RmsDurationMethod::BooreJoyner)
            .expect_err("zero damping should fail");
        assert_eq!(error, PeakError::InvalidOscDamping { value: 0.0 });
    }

    #[test]
    fn peak_input_validation_reports_shape_errors() {
        let calculator = LiuPezeshk1999;
        let error = calculator
            .compute_peak(PeakInput::new(10.0, &[1.0, 2.0], &[1.0], None, None))
            .expect_err("length mismatch should fail");
        assert_eq!(
            error,
            PeakError::LengthMismatch {
                frequency: 2,
                fourier_amplitude: 1,
            }
        );

        let error = calculator
            .compute_peak(PeakInput::new(
                10.0,
                &[1.0, 1.0],
                &[1.0, 1.0],
                None,
                None,
            ))
            .expect_err("duplicate frequency should fail");
        assert_eq!(
            error,
            PeakError::NonIncreasingFrequency {
                index: 1,
                previous: 1.0,
                current: 1.0,
            }
        );

        let error = calculator
            .compute_peak(PeakInput::new(0.0, &[1.0, 2.0], &[1.0, 1.0], None, None))
            .expect_err("zero duration should fail");
        assert_eq!(error, PeakError::InvalidDuration { value: 0.0 });
    }

    #[test]
    fn rms_duration_method_parses_its_published_name() {
        assert_eq!(
            RmsDurationMethod::from_str("boore_joyner").unwrap(),
            RmsDurationMethod::BooreJoyner
        );
        assert_eq!(RmsDurationMethod::BooreJoyner.to_string(), "boore_joyner");

        let error = RmsDurationMethod::from_str("vanmarcke").unwrap_err();
        assert_eq!(
            error,
            PeakError::UnsupportedRmsDurationMethod {
                name: "vanmarcke".to_string(),
            }
        );
    }
}
