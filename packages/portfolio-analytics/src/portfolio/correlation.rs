//! Pairwise correlation between holdings.

use crate::stats::{covariance, is_constant, sample_std_dev};
use crate::types::{CorrelationMatrix, ReturnsPanel};

/// Calculate the Pearson correlation matrix of a returns panel.
///
/// The diagonal is exactly 1.0 and `[i][j]` is the same value as `[j][i]`.
/// Pairs involving a constant series have no defined coefficient: two
/// constant series correlate at 1.0, a constant series against a varying
/// one at 0.0. An empty panel yields an empty matrix.
pub fn correlation_matrix(returns: &ReturnsPanel) -> CorrelationMatrix {
    if returns.is_empty() {
        return CorrelationMatrix::default();
    }

    let columns = returns.columns();
    let std_devs: Vec<f64> = columns
        .iter()
        .map(|col| {
            if is_constant(col) {
                0.0
            } else {
                sample_std_dev(col).unwrap_or(0.0)
            }
        })
        .collect();

    let n = columns.len();
    let mut values = vec![vec![1.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let rho = pearson(&columns[i], &columns[j], std_devs[i], std_devs[j]);
            values[i][j] = rho;
            values[j][i] = rho;
        }
    }

    CorrelationMatrix::from_parts(returns.instruments().to_vec(), values)
}

fn pearson(x: &[f64], y: &[f64], std_x: f64, std_y: f64) -> f64 {
    match (std_x > 0.0, std_y > 0.0) {
        (false, false) => 1.0,
        (true, false) | (false, true) => 0.0,
        (true, true) => covariance(x, y)
            .map(|cov| (cov / (std_x * std_y)).clamp(-1.0, 1.0))
            .unwrap_or(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Days, NaiveDate};

    fn returns_panel(columns: Vec<(&str, Vec<f64>)>) -> ReturnsPanel {
        let n = columns[0].1.len() as u64;
        let dates = (0..n)
            .map(|i| NaiveDate::from_ymd_opt(2024, 5, 1).unwrap() + Days::new(i))
            .collect();
        let (names, cols) = columns
            .into_iter()
            .map(|(name, col)| (name.to_string(), col))
            .unzip();
        ReturnsPanel::from_returns(dates, names, cols).unwrap()
    }

    #[test]
    fn test_perfectly_correlated() {
        let a = vec![0.01, -0.01, 0.01, -0.01, 0.01, -0.01];
        let b: Vec<f64> = a.iter().map(|r| r * 2.0).collect();
        let c: Vec<f64> = a.iter().map(|r| -r).collect();

        let corr = correlation_matrix(&returns_panel(vec![("A", a), ("B", b), ("C", c)]));

        assert_relative_eq!(corr.get("A", "B").unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(corr.get("A", "C").unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_symmetric_with_unit_diagonal() {
        let corr = correlation_matrix(&returns_panel(vec![
            ("A", vec![0.01, 0.02, -0.01, 0.005, 0.0]),
            ("B", vec![0.00, 0.01, -0.02, 0.01, 0.003]),
            ("C", vec![-0.01, 0.02, 0.01, -0.004, 0.002]),
        ]));

        for a in corr.instruments() {
            assert_eq!(corr.get(a, a), Some(1.0));
            for b in corr.instruments() {
                let v = corr.get(a, b).unwrap();
                assert_eq!(v, corr.get(b, a).unwrap());
                assert!((-1.0..=1.0).contains(&v));
            }
        }
    }

    #[test]
    fn test_constant_series_fallbacks() {
        let corr = correlation_matrix(&returns_panel(vec![
            ("FLAT1", vec![0.0; 5]),
            ("FLAT2", vec![0.0; 5]),
            ("MOVE", vec![0.01, -0.02, 0.03, 0.0, 0.01]),
        ]));

        assert_eq!(corr.get("FLAT1", "FLAT2"), Some(1.0));
        assert_eq!(corr.get("FLAT1", "MOVE"), Some(0.0));
        assert_eq!(corr.get("MOVE", "FLAT2"), Some(0.0));
    }

    #[test]
    fn test_constant_nonzero_series_fallbacks() {
        let corr = correlation_matrix(&returns_panel(vec![
            ("DRIFT1", vec![0.001; 6]),
            ("DRIFT2", vec![-0.002; 6]),
            ("MOVE", vec![0.01, -0.02, 0.03, 0.0, 0.01, -0.005]),
        ]));

        assert_eq!(corr.get("DRIFT1", "DRIFT2"), Some(1.0));
        assert_eq!(corr.get("DRIFT1", "MOVE"), Some(0.0));
    }

    #[test]
    fn test_empty_panel() {
        let corr = correlation_matrix(&ReturnsPanel::empty(vec!["A".to_string()]));
        assert!(corr.is_empty());
    }

    #[test]
    fn test_serializes_as_nested_map() {
        let corr = correlation_matrix(&returns_panel(vec![
            ("A", vec![0.0; 3]),
            ("B", vec![0.0; 3]),
        ]));
        let json = serde_json::to_string(&corr).unwrap();
        assert_eq!(json, r#"{"A":{"A":1.0,"B":1.0},"B":{"A":1.0,"B":1.0}}"#);
    }
}
