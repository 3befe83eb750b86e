//! Inversion of a target oscillator response spectrum into a compatible
//! Fourier amplitude spectrum.
//!
//! The initial spectrum comes from the Vanmarcke recursive relation: each
//! frequency's squared amplitude depends on a running integral of all
//! lower-frequency amplitudes. The seed is interpolated onto an extended
//! log-spaced grid, extrapolated outside the matched band, and then corrected
//! iteratively against the peak-calculator-evaluated response until the fit
//! converges or the iteration budget runs out.

use crate::common::constants::{
    DEFAULT_DAMPING, DEFAULT_GRID_POINTS, DEFAULT_MAX_ITERATIONS, DEFAULT_PEAK_FACTOR,
    DEFAULT_TOLERANCE,
};
use crate::domain::{MotionError, MotionResult, Region};
use crate::motions::{Motion, SourceTheoryMotion};
use crate::numerics::{
    argsort, interpolate_clamped, log_spaced, root_mean_square_error, smooth_uniform,
};
use crate::peaks::{default_peak_calculator, PeakCalculator, RmsDurationMethod};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::sync::Arc;
use tracing::debug;

/// Tunable constants of the spectrum-matching engine.
///
/// The defaults reproduce the published methodology; none of them is a
/// physical law.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Fractional oscillator damping of the target spectrum.
    pub damping: f64,
    /// Fixed peak factor of the Vanmarcke seed derivation.
    pub peak_factor: f64,
    /// Convergence threshold on the target-response RMSE.
    pub tolerance: f64,
    /// Iteration budget of the correction loop.
    pub max_iterations: usize,
    /// Number of points in the extended log-spaced frequency grid.
    pub grid_points: usize,
    /// Length of the uniform smoothing window; `None` disables smoothing.
    pub window_len: Option<usize>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            damping: DEFAULT_DAMPING,
            peak_factor: DEFAULT_PEAK_FACTOR,
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            grid_points: DEFAULT_GRID_POINTS,
            window_len: None,
        }
    }
}

impl MatchingConfig {
    fn validate(&self) -> MotionResult<()> {
        if !self.damping.is_finite() || self.damping <= 0.0 {
            return Err(MotionError::InvalidMatchingConfig {
                field: "damping",
                value: self.damping,
            });
        }
        if !self.peak_factor.is_finite() || self.peak_factor <= 0.0 {
            return Err(MotionError::InvalidMatchingConfig {
                field: "peak_factor",
                value: self.peak_factor,
            });
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(MotionError::InvalidMatchingConfig {
                field: "tolerance",
                value: self.tolerance,
            });
        }
        if self.grid_points < 8 {
            return Err(MotionError::InvalidMatchingConfig {
                field: "grid_points",
                value: self.grid_points as f64,
            });
        }
        Ok(())
    }
}

/// Where the ground-motion duration of the fitted motion comes from.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DurationSpec {
    /// Use the duration directly.
    Fixed(f64),
    /// Derive the duration from a transient point-source model; the model is
    /// discarded afterwards.
    SourceTheory {
        magnitude: f64,
        distance: f64,
        region: Region,
        stress_drop: Option<f64>,
    },
}

impl DurationSpec {
    fn resolve(self) -> MotionResult<f64> {
        match self {
            Self::Fixed(duration) => {
                if !duration.is_finite() || duration <= 0.0 {
                    return Err(MotionError::InvalidDuration { value: duration });
                }
                Ok(duration)
            }
            Self::SourceTheory {
                magnitude,
                distance,
                region,
                stress_drop,
            } => Ok(SourceTheoryMotion::new(magnitude, distance, region, stress_drop)
                .compute_duration()),
        }
    }
}

/// Fit-quality summary of a finished match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchingDiagnostics {
    pub iterations: usize,
    pub rmse: f64,
}

/// A motion whose Fourier amplitude spectrum reproduces a target oscillator
/// response spectrum.
///
/// Non-convergence is not an error: the best-effort spectrum is retained
/// together with its quality signals for the caller to judge.
#[derive(Debug)]
pub struct CompatibleMotion {
    motion: Motion,
    config: MatchingConfig,
    iterations: usize,
    rmse: f64,
}

impl CompatibleMotion {
    pub fn new(
        osc_freq: &[f64],
        osc_resp_target: &[f64],
        duration: DurationSpec,
        config: MatchingConfig,
    ) -> MotionResult<Self> {
        Self::with_peak_calculator(
            osc_freq,
            osc_resp_target,
            duration,
            config,
            default_peak_calculator(),
        )
    }

    pub fn with_peak_calculator(
        osc_freq: &[f64],
        osc_resp_target: &[f64],
        duration: DurationSpec,
        config: MatchingConfig,
        peak_calculator: Arc<dyn PeakCalculator>,
    ) -> MotionResult<Self> {
        config.validate()?;
        validate_target(osc_freq, osc_resp_target)?;

        // Order by increasing frequency; the caller's order is not required.
        let order = argsort(osc_freq);
        let osc_freq: Vec<f64> = order.iter().map(|&i| osc_freq[i]).collect();
        let target: Vec<f64> = order.iter().map(|&i| osc_resp_target[i]).collect();
        for index in 1..osc_freq.len() {
            if osc_freq[index] <= osc_freq[index - 1] {
                return Err(MotionError::NonIncreasingFrequency {
                    index,
                    previous: osc_freq[index - 1],
                    current: osc_freq[index],
                });
            }
        }

        let duration = duration.resolve()?;
        let seed = vanmarcke_seed(&osc_freq, &target, duration, &config, peak_calculator.as_ref())?;

        // The grid is extended past the matched band because the oscillator
        // transfer function has a width.
        let last_osc = osc_freq[osc_freq.len() - 1];
        let frequency = log_spaced(osc_freq[0] / 2.0, 2.0 * last_osc, config.grid_points).ok_or(
            MotionError::InvalidMatchingConfig {
                field: "grid_points",
                value: config.grid_points as f64,
            },
        )?;

        // Index range strictly inside the matched band; the flanks are always
        // extrapolated, never fitted.
        let first = frequency.partition_point(|&f| f <= osc_freq[0]);
        let last = frequency.partition_point(|&f| f < last_osc);
        if last < first + 2 {
            return Err(MotionError::NarrowTargetBand {
                interior_points: last.saturating_sub(first),
            });
        }

        let log_frequency: Vec<f64> = frequency.iter().map(|f| f.ln()).collect();
        let log_osc_freq: Vec<f64> = osc_freq.iter().map(|f| f.ln()).collect();
        let log_seed: Vec<f64> = seed.iter().map(|a| a.ln()).collect();

        let mut fourier_amplitude = vec![0.0; frequency.len()];
        for index in first..last {
            fourier_amplitude[index] =
                interpolate_clamped(log_frequency[index], &log_osc_freq, &log_seed).exp();
        }
        extrapolate(&mut fourier_amplitude, &log_frequency, first, last);

        let response = |amplitude: &[f64]| -> MotionResult<Vec<f64>> {
            Motion::new(
                frequency.clone(),
                amplitude.to_vec(),
                duration,
                Arc::clone(&peak_calculator),
            )?
            .oscillator_response(&osc_freq, config.damping)
        };

        // Ratio correction between the computed and target responses,
        // interpolated over the matched band in log space.
        let mut iterations = 0;
        let mut rmse = 1.0;
        let mut osc_resp = response(&fourier_amplitude)?;

        while iterations < config.max_iterations && rmse > config.tolerance {
            let log_ratio: Vec<f64> = target
                .iter()
                .zip(&osc_resp)
                .map(|(t, r)| (t / r).ln())
                .collect();
            for index in first..last {
                fourier_amplitude[index] *=
                    interpolate_clamped(log_frequency[index], &log_osc_freq, &log_ratio).exp();
            }

            extrapolate(&mut fourier_amplitude, &log_frequency, first, last);

            if let Some(window_len) = config.window_len
                && window_len > 1
            {
                fourier_amplitude = smooth_uniform(&fourier_amplitude, window_len);
            }

            osc_resp = response(&fourier_amplitude)?;
            rmse = root_mean_square_error(&target, &osc_resp);
            iterations += 1;
            debug!(iterations, rmse, "spectrum matching iteration");
        }

        if rmse <= config.tolerance {
            debug!(iterations, rmse, "spectrum matching converged");
        } else {
            debug!(iterations, rmse, "spectrum matching budget exhausted");
        }

        let motion = Motion::new(frequency, fourier_amplitude, duration, peak_calculator)?;
        Ok(Self {
            motion,
            config,
            iterations,
            rmse,
        })
    }

    pub fn motion(&self) -> &Motion {
        &self.motion
    }

    pub fn into_motion(self) -> Motion {
        self.motion
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn rmse(&self) -> f64 {
        self.rmse
    }

    pub fn converged(&self) -> bool {
        self.rmse <= self.config.tolerance
    }

    pub fn diagnostics(&self) -> MatchingDiagnostics {
        MatchingDiagnostics {
            iterations: self.iterations,
            rmse: self.rmse,
        }
    }

    pub fn oscillator_response(&self, osc_freqs: &[f64], damping: f64) -> MotionResult<Vec<f64>> {
        self.motion.oscillator_response(osc_freqs, damping)
    }
}

/// Analytic seed of the Fourier amplitude at the target frequencies via the
/// Vanmarcke recursion, evaluated at ascending frequency.
///
/// A negative squared-amplitude increment means the target implies a negative
/// energy increment; the amplitude is then held at the previous value and the
/// running integral is kept consistent with the flattened value. This policy
/// never fails the computation.
fn vanmarcke_seed(
    osc_freq: &[f64],
    target: &[f64],
    duration: f64,
    config: &MatchingConfig,
    peak_calculator: &dyn PeakCalculator,
) -> MotionResult<Vec<f64>> {
    let sdof_factor = PI / (4.0 * config.damping) - 1.0;
    let peak_factor_sqr = config.peak_factor * config.peak_factor;

    let mut seed = vec![0.0; osc_freq.len()];
    let mut total = 0.0;
    let mut fa_sqr_prev = 0.0;

    for index in 0..osc_freq.len() {
        let duration_rms = peak_calculator.compute_duration_rms(
            duration,
            osc_freq[index],
            config.damping,
            RmsDurationMethod::BooreJoyner,
        )?;

        let mut fa_sqr = ((duration_rms * target[index] * target[index])
            / (2.0 * peak_factor_sqr)
            - total)
            / (osc_freq[index] * sdof_factor);

        if fa_sqr < 0.0 && index > 0 {
            seed[index] = seed[index - 1];
            fa_sqr = seed[index] * seed[index];
        } else {
            seed[index] = fa_sqr.sqrt();
        }

        if index == 0 {
            total = fa_sqr * osc_freq[0] / 2.0;
        } else {
            total += (fa_sqr - fa_sqr_prev) / 2.0 * (osc_freq[index] - osc_freq[index - 1]);
        }
        fa_sqr_prev = fa_sqr;
    }

    Ok(seed)
}

/// Log-log extrapolation of the flanks from the two nearest interior points.
/// The interior values at `first` and `last - 1` are left untouched.
fn extrapolate(fourier_amplitude: &mut [f64], log_frequency: &[f64], first: usize, last: usize) {
    let low_slope = (fourier_amplitude[first + 1].ln() - fourier_amplitude[first].ln())
        / (log_frequency[first + 1] - log_frequency[first]);
    let low_anchor = fourier_amplitude[first].ln();
    for index in 0..first {
        fourier_amplitude[index] =
            (low_slope * (log_frequency[index] - log_frequency[first]) + low_anchor).exp();
    }

    let high_slope = (fourier_amplitude[last - 1].ln() - fourier_amplitude[last - 2].ln())
        / (log_frequency[last - 1] - log_frequency[last - 2]);
    let high_anchor = fourier_amplitude[last - 2].ln();
    for index in last..fourier_amplitude.len() {
        fourier_amplitude[index] =
            (high_slope * (log_frequency[index] - log_frequency[last - 2]) + high_anchor).exp();
    }
}

fn validate_target(osc_freq: &[f64], osc_resp_target: &[f64]) -> MotionResult<()> {
    if osc_freq.len() != osc_resp_target.len() {
        return Err(MotionError::TargetLengthMismatch {
            osc_freq: osc_freq.len(),
            osc_resp_target: osc_resp_target.len(),
        });
    }
    if osc_freq.len() < 2 {
        return Err(MotionError::InsufficientTargetPoints {
            actual: osc_freq.len(),
        });
    }

    for (index, value) in osc_freq.iter().copied().enumerate() {
        if !value.is_finite() || value <= 0.0 {
            return Err(MotionError::InvalidFrequency { index, value });
        }
    }
    for (index, value) in osc_resp_target.iter().copied().enumerate() {
        if !value.is_finite() || value <= 0.0 {
            return Err(MotionError::InvalidTargetResponse { index, value });
        }
    }

    Ok(())
}
