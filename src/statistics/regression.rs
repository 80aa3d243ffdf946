//! Ordinary least-squares fits over plain slices.

/// Slope and intercept of a least-squares line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    /// Change in y per unit x.
    pub slope: f64,

    /// Fitted y at x = 0.
    pub intercept: f64,
}

/// Fit `y` against `x` by ordinary least squares.
///
/// Returns `None` when the fit is undefined: mismatched lengths, fewer
/// than two points, or zero variance in `x`.
pub fn fit_line(x: &[f64], y: &[f64]) -> Option<LineFit> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        sxx += dx * dx;
        sxy += dx * (yi - mean_y);
    }

    if sxx == 0.0 {
        return None;
    }

    let slope = sxy / sxx;
    Some(LineFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

/// Slope of `values` against their 0-based position index.
///
/// This is the per-tick trend used for stability testing. `None` for
/// fewer than two values.
pub fn slope_over_index(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let index: Vec<f64> = (0..values.len()).map(|i| i as f64).collect();
    fit_line(&index, values).map(|fit| fit.slope)
}
