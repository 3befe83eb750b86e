//! Pure array helpers shared by the motion models.

/// Base-10 log-spaced inclusive grid from `start` to `end`.
///
/// Returns `None` for fewer than 2 points or non-positive endpoints.
pub fn log_spaced(start: f64, end: f64, count: usize) -> Option<Vec<f64>> {
    if count < 2 || !start.is_finite() || !end.is_finite() || start <= 0.0 || end <= 0.0 {
        return None;
    }

    let log_start = start.log10();
    let log_end = end.log10();
    let step = (log_end - log_start) / ((count - 1) as f64);
    let mut grid = Vec::with_capacity(count);
    for index in 0..count {
        grid.push(10.0_f64.powf(log_start + step * (index as f64)));
    }

    grid[0] = start;
    if let Some(last) = grid.last_mut() {
        *last = end;
    }

    Some(grid)
}

/// Piecewise-linear interpolation with endpoint clamping.
///
/// `x_grid` must be strictly increasing with at least 2 entries and the same
/// length as `y_grid`; callers validate their grids once up front.
pub fn interpolate_clamped(x: f64, x_grid: &[f64], y_grid: &[f64]) -> f64 {
    debug_assert!(x_grid.len() >= 2);
    debug_assert_eq!(x_grid.len(), y_grid.len());
    debug_assert!(x_grid.windows(2).all(|w| w[0] < w[1]));

    let last = x_grid.len() - 1;
    if x <= x_grid[0] {
        return y_grid[0];
    }
    if x >= x_grid[last] {
        return y_grid[last];
    }

    match x_grid.binary_search_by(|probe| probe.total_cmp(&x)) {
        Ok(index) => y_grid[index],
        Err(upper) => {
            let lower = upper - 1;
            let fraction = (x - x_grid[lower]) / (x_grid[upper] - x_grid[lower]);
            y_grid[lower] + fraction * (y_grid[upper] - y_grid[lower])
        }
    }
}

/// Trapezoidal integral of `y` over a non-decreasing grid `x`.
pub fn trapezoid(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() < 2 || x.len() != y.len() {
        return None;
    }
    if !x.windows(2).all(|w| w[0] <= w[1]) {
        return None;
    }

    let mut integral = 0.0;
    for index in 1..x.len() {
        integral += (x[index] - x[index - 1]) * (y[index] + y[index - 1]) / 2.0;
    }

    Some(integral)
}

/// Convolution with a normalized uniform window, same-length output.
///
/// Matches the centered slice of the full discrete convolution with implicit
/// zero padding at the edges. A window of 0 or 1 points is the identity.
pub fn smooth_uniform(values: &[f64], window_len: usize) -> Vec<f64> {
    if window_len <= 1 || values.is_empty() {
        return values.to_vec();
    }

    let weight = 1.0 / window_len as f64;
    let offset = (window_len - 1) / 2;
    let mut smoothed = Vec::with_capacity(values.len());
    for index in 0..values.len() {
        let center = index + offset;
        let mut sum = 0.0;
        for tap in 0..window_len {
            if let Some(source) = center.checked_sub(tap)
                && source < values.len()
            {
                sum += values[source];
            }
        }
        smoothed.push(sum * weight);
    }

    smoothed
}

/// Indices that sort `values` ascending, ties broken by original index.
pub fn argsort(values: &[f64]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_unstable_by(|lhs, rhs| {
        values[*lhs]
            .total_cmp(&values[*rhs])
            .then_with(|| lhs.cmp(rhs))
    });
    indices
}

/// Root-mean-square error between two equal-length sequences.
pub fn root_mean_square_error(target: &[f64], actual: &[f64]) -> f64 {
    debug_assert!(!target.is_empty());
    debug_assert_eq!(target.len(), actual.len());

    let sum_sqr: f64 = target
        .iter()
        .zip(actual)
        .map(|(t, a)| (t - a) * (t - a))
        .sum();
    (sum_sqr / target.len() as f64).sqrt()
}
