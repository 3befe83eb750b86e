//! Single-corner point-source seismological model.

use crate::common::constants::{
    CORNER_FREQ_COEF, DYNE_CM_CONVERSION, FREE_SURFACE_FACTOR, GRAVITY_CM_S2, RADIATION_PATTERN,
    RUPTURE_DEPTH_KM, SEISMIC_MOMENT_OFFSET, SEISMIC_MOMENT_SLOPE, STRESS_DROP_INTERCEPT,
    STRESS_DROP_MIN_MAGNITUDE, STRESS_DROP_SLOPE,
};
use crate::domain::{MotionResult, Region, SpreadingError, SpreadingSegment};
use crate::motions::Motion;
use crate::numerics::interpolate_clamped;
use crate::peaks::{default_peak_calculator, PeakCalculator};
use std::f64::consts::{PI, SQRT_2};
use std::sync::Arc;

/// Stress drop in bars from the Atkinson and Boore (2011) model.
///
/// Magnitudes below 5 are clamped, not rejected.
pub fn stress_drop(magnitude: f64) -> f64 {
    10.0_f64.powf(
        STRESS_DROP_INTERCEPT - STRESS_DROP_SLOPE * magnitude.max(STRESS_DROP_MIN_MAGNITUDE),
    )
}

/// Piecewise power-law geometric spreading `Z(R)` at the given distance.
///
/// Each segment multiplies by `(reference / effective)^slope` where
/// `effective` is the distance capped at the segment limit; the reference
/// then advances to the cap. The first segment that is not distance-limited
/// governs out to infinity and stops the walk.
pub fn geometric_spreading(
    distance: f64,
    segments: &[SpreadingSegment],
) -> Result<f64, SpreadingError> {
    if segments.is_empty() {
        return Err(SpreadingError::EmptySegments);
    }
    for (index, segment) in segments[..segments.len() - 1].iter().enumerate() {
        if segment.limit.is_none() {
            return Err(SpreadingError::UnboundedInnerSegment { index });
        }
    }

    let mut reference = 1.0;
    let mut spreading = 1.0;
    for segment in segments {
        let effective = segment
            .limit
            .map_or(distance, |limit| distance.min(limit));
        spreading *= (reference / effective).powf(segment.slope);

        if effective < distance {
            reference = effective;
        } else {
            break;
        }
    }

    Ok(spreading)
}

/// Crustal amplification interpolated against log-frequency, clamped at the
/// tabulated anchor range.
#[derive(Debug, Clone)]
struct SiteAmplification {
    log_frequency: Vec<f64>,
    amplification: Vec<f64>,
}

impl SiteAmplification {
    fn for_region(region: Region) -> Self {
        let model = region.model();
        Self {
            log_frequency: model.site_amp_frequency.iter().map(|f| f.ln()).collect(),
            amplification: model.site_amp.to_vec(),
        }
    }

    fn at(&self, freq: f64) -> f64 {
        interpolate_clamped(freq.ln(), &self.log_frequency, &self.amplification)
    }
}

/// Point-source model combining source, path, and site terms into a
/// forward-modeled Fourier amplitude spectrum.
///
/// All derived constants are fixed at construction; the spectrum, its
/// frequency grid, and the duration are populated by
/// [`compute_fourier_amplitude`](Self::compute_fourier_amplitude).
pub struct SourceTheoryMotion {
    magnitude: f64,
    distance: f64,
    region: Region,
    stress_drop: f64,
    site_amplification: SiteAmplification,
    hypo_distance: f64,
    seismic_moment: f64,
    corner_freq: f64,
    peak_calculator: Arc<dyn PeakCalculator>,
    motion: Option<Motion>,
}

impl SourceTheoryMotion {
    pub fn new(
        magnitude: f64,
        distance: f64,
        region: Region,
        stress_drop_override: Option<f64>,
    ) -> Self {
        Self::with_peak_calculator(
            magnitude,
            distance,
            region,
            stress_drop_override,
            default_peak_calculator(),
        )
    }

    pub fn with_peak_calculator(
        magnitude: f64,
        distance: f64,
        region: Region,
        stress_drop_override: Option<f64>,
        peak_calculator: Arc<dyn PeakCalculator>,
    ) -> Self {
        let model = region.model();
        let stress_drop = stress_drop_override.unwrap_or(model.default_stress_drop);
        let hypo_distance = (distance * distance + RUPTURE_DEPTH_KM * RUPTURE_DEPTH_KM).sqrt();
        let seismic_moment =
            10.0_f64.powf(SEISMIC_MOMENT_SLOPE * (magnitude + SEISMIC_MOMENT_OFFSET));
        let corner_freq = CORNER_FREQ_COEF
            * model.shear_velocity
            * (stress_drop / seismic_moment).powf(1.0 / 3.0);

        Self {
            magnitude,
            distance,
            region,
            stress_drop,
            site_amplification: SiteAmplification::for_region(region),
            hypo_distance,
            seismic_moment,
            corner_freq,
            peak_calculator,
            motion: None,
        }
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn stress_drop(&self) -> f64 {
        self.stress_drop
    }

    pub fn hypo_distance(&self) -> f64 {
        self.hypo_distance
    }

    pub fn seismic_moment(&self) -> f64 {
        self.seismic_moment
    }

    pub fn corner_freq(&self) -> f64 {
        self.corner_freq
    }

    /// Ground-motion duration from the Atkinson and Boore (1995) model:
    /// source rise time plus a regional path term.
    pub fn compute_duration(&self) -> f64 {
        let duration_source = 1.0 / self.corner_freq;

        let duration_path = match self.region {
            Region::Wus => 0.05 * self.hypo_distance,
            Region::Ceus => {
                let r = self.hypo_distance;
                let mut duration = 0.0;
                if r > 10.0 {
                    // 10 < R <= 70 km
                    duration += 0.16 * (r.min(70.0) - 10.0);
                }
                if r > 70.0 {
                    // 70 < R <= 130 km
                    duration += -0.03 * (r.min(130.0) - 70.0);
                }
                if r > 130.0 {
                    // 130 km < R
                    duration += 0.04 * (r - 130.0);
                }
                duration
            }
        };

        duration_source + duration_path
    }

    /// Acceleration Fourier amplitude spectrum at the given frequencies,
    /// in g-sec.
    pub fn fourier_amplitude_at(&self, frequency: &[f64]) -> MotionResult<Vec<f64>> {
        let model = self.region.model();
        let spreading = geometric_spreading(self.hypo_distance, model.geometric_spreading)?;

        let source_const = (RADIATION_PATTERN * FREE_SURFACE_FACTOR)
            / (SQRT_2 * 4.0 * PI * model.density * model.shear_velocity.powi(3));
        let conversion = DYNE_CM_CONVERSION / GRAVITY_CM_S2;

        let amplitude = frequency
            .iter()
            .map(|&freq| {
                let source = source_const * self.seismic_moment
                    / (1.0 + (freq / self.corner_freq).powi(2));

                let path_atten = model.path_atten_coeff * freq.powf(model.path_atten_power);
                let path = spreading
                    * (-PI * freq * self.hypo_distance / (path_atten * model.shear_velocity))
                        .exp();

                let site =
                    self.site_amplification.at(freq) * (-PI * model.site_atten * freq).exp();

                // Double time-differentiation converts displacement to
                // acceleration.
                conversion * (2.0 * PI * freq).powi(2) * source * path * site
            })
            .collect();

        Ok(amplitude)
    }

    /// Populates the held motion with the modeled spectrum and the duration
    /// recomputed from the source and path model. Idempotent for the same
    /// frequency grid.
    pub fn compute_fourier_amplitude(&mut self, frequency: &[f64]) -> MotionResult<&Motion> {
        let amplitude = self.fourier_amplitude_at(frequency)?;
        let motion = Motion::new(
            frequency.to_vec(),
            amplitude,
            self.compute_duration(),
            Arc::clone(&self.peak_calculator),
        )?;
        Ok(self.motion.insert(motion))
    }

    /// The modeled motion, available after
    /// [`compute_fourier_amplitude`](Self::compute_fourier_amplitude).
    pub fn motion(&self) -> MotionResult<&Motion> {
        self.motion
            .as_ref()
            .ok_or(crate::domain::MotionError::FourierAmplitudeNotComputed)
    }

    pub fn oscillator_response(&self, osc_freqs: &[f64], damping: f64) -> MotionResult<Vec<f64>> {
        self.motion()?.oscillator_response(osc_freqs, damping)
    }
}

#[cfg(test)]
mod tests {
    use super::{geometric_spreading, stress_drop, SourceTheoryMotion};
    use crate::domain::{MotionError, Region, SpreadingError, SpreadingSegment};
    use crate::numerics::log_spaced;

    #[test]
    fn single_unbounded_segment_gives_inverse_distance() {
        let segments = [SpreadingSegment::new(1.0, None)];
        for distance in [1.0, 2.5, 40.0, 316.0] {
            let spreading = geometric_spreading(distance, &segments).expect("spreading");
            assert!((spreading - 1.0 / distance).abs() < 1.0e-12);
        }
    }

    #[test]
    fn two_segment_model_is_continuous_at_the_breakpoint() {
        let segments = [
            SpreadingSegment::new(1.0, Some(40.0)),
            SpreadingSegment::new(0.5, None),
        ];
        let at_limit = geometric_spreading(40.0, &segments).expect("at limit");
        let just_past = geometric_spreading(40.0 + 1.0e-9, &segments).expect("just past");
        assert!((at_limit - just_past).abs() < 1.0e-9);
        assert!((at_limit - 1.0 / 40.0).abs() < 1.0e-12);
    }

    #[test]
    fn spreading_rejects_malformed_segment_lists() {
        let error = geometric_spreading(10.0, &[]).unwrap_err();
        assert_eq!(error, SpreadingError::EmptySegments);

        let segments = [
            SpreadingSegment::new(1.0, None),
            SpreadingSegment::new(0.5, None),
        ];
        let error = geometric_spreading(10.0, &segments).unwrap_err();
        assert_eq!(error, SpreadingError::UnboundedInnerSegment { index: 0 });
    }

    #[test]
    fn stress_drop_clamps_below_magnitude_five() {
        let at_five = stress_drop(5.0);
        assert!((at_five - 10.0_f64.powf(3.45)).abs() < 1.0e-9);
        assert_eq!(stress_drop(4.0), at_five);
        assert_eq!(stress_drop(3.0), at_five);
    }

    #[test]
    fn stress_drop_decreases_above_magnitude_five() {
        let mut previous = stress_drop(5.0);
        for magnitude in [5.5, 6.0, 6.5, 7.0, 8.0] {
            let current = stress_drop(magnitude);
            assert!(current < previous);
            previous = current;
        }
    }

    #[test]
    fn wus_duration_matches_the_closed_form() {
        let motion = SourceTheoryMotion::new(6.0, 10.0, Region::Wus, None);
        let expected = 1.0 / motion.corner_freq() + 0.05 * motion.hypo_distance();
        assert!((motion.compute_duration() - expected).abs() < 1.0e-12);
    }

    #[test]
    fn ceus_duration_is_continuous_at_the_breakpoints() {
        // Pick epicentral distances whose hypocentral distances straddle each
        // breakpoint.
        for hypo_breakpoint in [10.0_f64, 70.0, 130.0] {
            let epicentral = (hypo_breakpoint * hypo_breakpoint - 64.0).sqrt();
            let below = SourceTheoryMotion::new(6.0, epicentral - 1.0e-6, Region::Ceus, None);
            let above = SourceTheoryMotion::new(6.0, epicentral + 1.0e-6, Region::Ceus, None);
            let jump = (above.compute_duration() - below.compute_duration()).abs();
            assert!(
                jump < 1.0e-5,
                "duration jump {jump} at breakpoint {hypo_breakpoint}"
            );
        }
    }

    #[test]
    fn derived_constants_follow_the_published_relations() {
        let motion = SourceTheoryMotion::new(6.0, 20.0, Region::Wus, None);
        assert!((motion.hypo_distance() - (400.0_f64 + 64.0).sqrt()).abs() < 1.0e-12);
        assert!((motion.seismic_moment() - 10.0_f64.powf(1.5 * 16.7)).abs() < 1.0e12);
        assert_eq!(motion.stress_drop(), 100.0);

        let expected_corner = 4.9e6 * 3.5 * (100.0 / motion.seismic_moment()).powf(1.0 / 3.0);
        assert!((motion.corner_freq() - expected_corner).abs() < 1.0e-9);

        let overridden = SourceTheoryMotion::new(6.0, 20.0, Region::Wus, Some(200.0));
        assert!(overridden.corner_freq() > motion.corner_freq());
    }

    #[test]
    fn forward_spectrum_is_positive_and_decays_at_high_frequency() {
        for region in [Region::Wus, Region::Ceus] {
            let mut motion = SourceTheoryMotion::new(6.5, 30.0, region, None);
            let frequency = log_spaced(0.05, 100.0, 301).expect("grid");
            let computed = motion
                .compute_fourier_amplitude(&frequency)
                .expect("spectrum");

            let amplitude = computed.fourier_amplitude();
            assert!(amplitude.iter().all(|&a| a > 0.0 && a.is_finite()));

            // The kappa filter dominates the tail.
            let tail_start = frequency.iter().position(|&f| f >= 20.0).expect("tail");
            for index in tail_start + 1..amplitude.len() {
                assert!(
                    amplitude[index] < amplitude[index - 1],
                    "tail should decay at index {index} for region {region}"
                );
            }
        }
    }

    #[test]
    fn oscillator_response_requires_a_computed_spectrum() {
        let motion = SourceTheoryMotion::new(6.0, 20.0, Region::Wus, None);
        let error = motion.oscillator_response(&[1.0], 0.05).unwrap_err();
        assert_eq!(error, MotionError::FourierAmplitudeNotComputed);
    }

    #[test]
    fn forward_response_peaks_inside_the_band() {
        let mut motion = SourceTheoryMotion::new(6.5, 20.0, Region::Wus, None);
        let frequency = log_spaced(0.05, 200.0, 513).expect("grid");
        motion
            .compute_fourier_amplitude(&frequency)
            .expect("spectrum");

        let osc_freqs = [0.2, 1.0, 5.0, 20.0];
        let response = motion
            .oscillator_response(&osc_freqs, 0.05)
            .expect("response");
        assert!(response.iter().all(|&r| r > 0.0 && r.is_finite()));
        // Mid-band oscillators should respond more strongly than the 0.2 Hz
        // oscillator for a moderate magnitude event.
        assert!(response[1] > response[0]);
    }
}
