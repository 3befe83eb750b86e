//! Random vibration theory motion models.

pub mod compatible;
pub mod source;

pub use compatible::{
    CompatibleMotion, DurationSpec, MatchingConfig, MatchingDiagnostics,
};
pub use source::{geometric_spreading, stress_drop, SourceTheoryMotion};

use crate::domain::{MotionError, MotionResult};
use crate::peaks::{default_peak_calculator, PeakCalculator, PeakInput, RmsDurationMethod};
use num_complex::Complex64;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

/// A ground motion described by its Fourier amplitude spectrum and duration.
///
/// Oscillator-response evaluation is built from the single-degree-of-freedom
/// transfer function and the injected peak-factor capability; all peak
/// statistics are the calculator's responsibility.
#[derive(Clone)]
pub struct Motion {
    frequency: Vec<f64>,
    fourier_amplitude: Vec<f64>,
    duration: f64,
    peak_calculator: Arc<dyn PeakCalculator>,
}

impl Debug for Motion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Motion")
            .field("points", &self.frequency.len())
            .field("duration", &self.duration)
            .finish_non_exhaustive()
    }
}

impl Motion {
    pub fn new(
        frequency: Vec<f64>,
        fourier_amplitude: Vec<f64>,
        duration: f64,
        peak_calculator: Arc<dyn PeakCalculator>,
    ) -> MotionResult<Self> {
        validate_spectrum(&frequency, &fourier_amplitude)?;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(MotionError::InvalidDuration { value: duration });
        }

        Ok(Self {
            frequency,
            fourier_amplitude,
            duration,
            peak_calculator,
        })
    }

    pub fn with_default_calculator(
        frequency: Vec<f64>,
        fourier_amplitude: Vec<f64>,
        duration: f64,
    ) -> MotionResult<Self> {
        Self::new(
            frequency,
            fourier_amplitude,
            duration,
            default_peak_calculator(),
        )
    }

    pub fn frequency(&self) -> &[f64] {
        &self.frequency
    }

    pub fn fourier_amplitude(&self) -> &[f64] {
        &self.fourier_amplitude
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn peak_calculator(&self) -> Arc<dyn PeakCalculator> {
        Arc::clone(&self.peak_calculator)
    }

    /// Peak pseudo-spectral acceleration of a damped oscillator at each
    /// requested natural frequency, in the caller's order.
    pub fn oscillator_response(&self, osc_freqs: &[f64], damping: f64) -> MotionResult<Vec<f64>> {
        osc_freqs
            .iter()
            .map(|&osc_freq| self.oscillator_peak(osc_freq, damping))
            .collect()
    }

    fn oscillator_peak(&self, osc_freq: f64, damping: f64) -> MotionResult<f64> {
        let transfer: Vec<f64> = self
            .frequency
            .iter()
            .map(|&freq| oscillator_transfer(freq, osc_freq, damping))
            .collect();
        self.peak(Some(&transfer), Some(osc_freq), Some(damping))
    }

    /// Expected peak response; the raw spectrum is used when no transfer
    /// function is given.
    pub fn peak(
        &self,
        transfer_function: Option<&[f64]>,
        osc_freq: Option<f64>,
        osc_damping: Option<f64>,
    ) -> MotionResult<f64> {
        let scaled;
        let fourier_amplitude: &[f64] = match transfer_function {
            Some(transfer) => {
                if transfer.len() != self.fourier_amplitude.len() {
                    return Err(MotionError::LengthMismatch {
                        frequency: self.fourier_amplitude.len(),
                        fourier_amplitude: transfer.len(),
                    });
                }
                scaled = transfer
                    .iter()
                    .zip(&self.fourier_amplitude)
                    .map(|(h, a)| h * a)
                    .collect::<Vec<f64>>();
                &scaled
            }
            None => &self.fourier_amplitude,
        };

        Ok(self.peak_calculator.compute_peak(PeakInput::new(
            self.duration,
            &self.frequency,
            fourier_amplitude,
            osc_freq,
            osc_damping,
        ))?)
    }

    /// RMS duration of an oscillator response, delegated to the calculator
    /// with this motion's ground-motion duration.
    pub fn duration_rms(
        &self,
        osc_freq: f64,
        osc_damping: f64,
        method: RmsDurationMethod,
    ) -> MotionResult<f64> {
        Ok(self
            .peak_calculator
            .compute_duration_rms(self.duration, osc_freq, osc_damping, method)?)
    }
}

/// Magnitude of the single-degree-of-freedom acceleration transfer function
/// `-fn^2 / (f^2 - fn^2 - 2i*damping*fn*f)`.
fn oscillator_transfer(freq: f64, osc_freq: f64, damping: f64) -> f64 {
    let numerator = Complex64::new(-osc_freq * osc_freq, 0.0);
    let denominator = Complex64::new(
        freq * freq - osc_freq * osc_freq,
        -2.0 * damping * osc_freq * freq,
    );
    (numerator / denominator).norm()
}

fn validate_spectrum(frequency: &[f64], fourier_amplitude: &[f64]) -> MotionResult<()> {
    if frequency.len() < 2 {
        return Err(MotionError::InsufficientPoints {
            actual: frequency.len(),
        });
    }
    if frequency.len() != fourier_amplitude.len() {
        return Err(MotionError::LengthMismatch {
            frequency: frequency.len(),
            fourier_amplitude: fourier_amplitude.len(),
        });
    }

    for (index, value) in frequency.iter().copied().enumerate() {
        if !value.is_finite() || value <= 0.0 {
            return Err(MotionError::InvalidFrequency { index, value });
        }
        if index > 0 {
            let previous = frequency[index - 1];
            if value <= previous {
                return Err(MotionError::NonIncreasingFrequency {
                    index,
                    previous,
                    current: value,
                });
            }
        }
    }

    for (index, value) in fourier_amplitude.iter().copied().enumerate() {
        if !value.is_finite() || value < 0.0 {
            return Err(MotionError::InvalidAmplitude { index, value });
        }
    }

    Ok(())
}
