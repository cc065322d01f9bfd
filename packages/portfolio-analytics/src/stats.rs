//! Sample statistics shared by the metric functions.
//!
//! Variances and covariances use the sample (n-1) denominator throughout.

use std::cmp::Ordering;

/// Arithmetic mean. `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample covariance of two equally long series.
///
/// `None` when the lengths differ or fewer than two observations exist.
pub fn covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let mean_x = mean(x)?;
    let mean_y = mean(y)?;

    let sum: f64 = x
        .iter()
        .zip(y)
        .map(|(xi, yi)| (xi - mean_x) * (yi - mean_y))
        .sum();

    Some(sum / (x.len() - 1) as f64)
}

/// Sample variance.
///
/// Computed as the covariance of the series with itself, so that
/// `covariance(x, x) / sample_variance(x)` is exactly 1.
pub fn sample_variance(values: &[f64]) -> Option<f64> {
    covariance(values, values)
}

/// True when every value equals the first one.
///
/// Exact test for a zero-variance series; the computed variance of a
/// constant non-zero series can be a tiny positive number.
pub fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Sample standard deviation.
pub fn sample_std_dev(values: &[f64]) -> Option<f64> {
    sample_variance(values).map(f64::sqrt)
}

/// Empirical quantile with linear interpolation between order statistics.
///
/// For `n` values sorted ascending, the quantile `q` sits at rank
/// `h = (n - 1) * q` and interpolates between `x[floor(h)]` and `x[floor(h) + 1]`.
/// `None` for an empty slice or `q` outside `[0, 1]`.
pub fn quantile(values: &[f64], q: f64) -> Option<f64> {
    if values.is_empty() || !(0.0..=1.0).contains(&q) {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    let rank = (sorted.len() - 1) as f64 * q;
    let lower = rank.floor() as usize;
    let frac = rank - lower as f64;

    match sorted.get(lower + 1) {
        Some(&upper) if frac > 0.0 => Some(sorted[lower] + frac * (upper - sorted[lower])),
        _ => Some(sorted[lower]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 4.0, 5.0]), Some(3.0));
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_sample_variance() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        // Sum of squared deviations is 32, over n - 1 = 7
        assert_relative_eq!(sample_variance(&values).unwrap(), 32.0 / 7.0, epsilon = 1e-12);
        assert_eq!(sample_variance(&[1.0]), None);
    }

    #[test]
    fn test_covariance_requires_matching_lengths() {
        assert_eq!(covariance(&[1.0, 2.0], &[1.0, 2.0, 3.0]), None);
    }

    #[test]
    fn test_covariance_of_scaled_series() {
        let x = [0.01, -0.02, 0.03, 0.00];
        let y: Vec<f64> = x.iter().map(|v| v * 2.0).collect();
        let var_x = sample_variance(&x).unwrap();
        assert_relative_eq!(covariance(&x, &y).unwrap(), 2.0 * var_x, epsilon = 1e-15);
    }

    #[test]
    fn test_is_constant() {
        assert!(is_constant(&[0.001; 50]));
        assert!(is_constant(&[]));
        assert!(!is_constant(&[0.001, 0.001, 0.0011]));
    }

    #[test]
    fn test_quantile_interpolates() {
        let values = [-0.05, -0.03, -0.01, 0.00, 0.01, 0.02, 0.04];
        // rank = 6 * 0.05 = 0.3 -> -0.05 + 0.3 * 0.02
        assert_relative_eq!(quantile(&values, 0.05).unwrap(), -0.044, epsilon = 1e-12);
        assert_relative_eq!(quantile(&values, 0.5).unwrap(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(quantile(&values, 1.0).unwrap(), 0.04, epsilon = 1e-12);
    }

    #[test]
    fn test_quantile_unsorted_input() {
        let values = [3.0, 1.0, 2.0];
        assert_eq!(quantile(&values, 0.0), Some(1.0));
        assert_eq!(quantile(&values, 0.75), Some(2.5));
    }

    #[test]
    fn test_quantile_edge_cases() {
        assert_eq!(quantile(&[], 0.5), None);
        assert_eq!(quantile(&[1.0], 1.5), None);
        assert_eq!(quantile(&[7.0], 0.05), Some(7.0));
    }
}
