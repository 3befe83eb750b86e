//! Seismological model constants shared across the motion models.
//!
//! These values are shared by the point-source and spectrum-matching code to
//! avoid ad hoc per-module literal constants.

/// Gravitational acceleration in cm/s^2, used to express spectra in g-sec.
pub const GRAVITY_CM_S2: f64 = 981.0;

/// Conversion from dyne-cm seismic-moment units into cm units.
pub const DYNE_CM_CONVERSION: f64 = 1.0e-20;

/// Average radiation pattern for shear waves.
pub const RADIATION_PATTERN: f64 = 0.55;

/// Free-surface amplification of incident shear waves.
pub const FREE_SURFACE_FACTOR: f64 = 2.0;

/// Fixed depth to rupture in km.
pub const RUPTURE_DEPTH_KM: f64 = 8.0;

/// Coefficient of the Brune corner-frequency relation, in cm/s units.
pub const CORNER_FREQ_COEF: f64 = 4.9e6;

/// Slope and offset of the moment-magnitude to seismic-moment relation.
pub const SEISMIC_MOMENT_SLOPE: f64 = 1.5;
pub const SEISMIC_MOMENT_OFFSET: f64 = 10.7;

/// Atkinson and Boore (2011) stress-drop relation coefficients.
pub const STRESS_DROP_INTERCEPT: f64 = 3.45;
pub const STRESS_DROP_SLOPE: f64 = 0.2;
pub const STRESS_DROP_MIN_MAGNITUDE: f64 = 5.0;

/// Default fractional oscillator damping.
pub const DEFAULT_DAMPING: f64 = 0.05;

/// Vanmarcke seed peak factor used by the spectrum-matching derivation.
pub const DEFAULT_PEAK_FACTOR: f64 = 2.5;

/// Convergence threshold on the target-response RMSE.
pub const DEFAULT_TOLERANCE: f64 = 5.0e-6;

/// Iteration budget of the spectrum-matching correction loop.
pub const DEFAULT_MAX_ITERATIONS: usize = 30;

/// Number of points in the extended log-spaced frequency grid.
pub const DEFAULT_GRID_POINTS: usize = 512;
