//! Derived series consumed by charting front ends.
//!
//! Only the data is produced here; rendering belongs to the presentation layer.

use crate::portfolio::{annualized_return, volatility};
use crate::types::{Panel, ReturnsPanel};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Rolling mean of daily returns, in percent.
///
/// Row `d` holds the mean of the `window` returns ending at `d`, times 100.
/// The first `window - 1` rows have no full window and are `None`.
///
/// # Errors
///
/// `window` is zero.
pub fn rolling_returns(returns: &ReturnsPanel, window: usize) -> Result<Panel<Option<f64>>> {
    if window == 0 {
        return Err(Error::InvalidParameter(
            "rolling window must be at least 1".to_string(),
        ));
    }

    let columns = returns
        .columns()
        .iter()
        .map(|column| {
            let mut out = Vec::with_capacity(column.len());
            let mut sum = 0.0;
            for (i, value) in column.iter().enumerate() {
                sum += value;
                if i >= window {
                    sum -= column[i - window];
                }
                out.push((i + 1 >= window).then(|| sum / window as f64 * 100.0));
            }
            out
        })
        .collect();

    Ok(Panel::from_parts(
        returns.dates().to_vec(),
        returns.instruments().to_vec(),
        columns,
    ))
}

/// One instrument's position on the risk/return plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskReturnPoint {
    pub instrument: String,
    /// Annualized volatility in percent
    pub volatility: f64,
    /// Annualized return in percent
    pub annualized_return: f64,
}

/// Volatility and annualized return per instrument, in column order.
pub fn risk_return_profile(returns: &ReturnsPanel) -> Vec<RiskReturnPoint> {
    let vol = volatility(returns);
    let ret = annualized_return(returns);

    returns
        .instruments()
        .iter()
        .filter_map(|name| {
            Some(RiskReturnPoint {
                instrument: name.clone(),
                volatility: vol.get(name)?,
                annualized_return: ret.get(name)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Days, NaiveDate};

    fn returns_panel(columns: Vec<(&str, Vec<f64>)>) -> ReturnsPanel {
        let n = columns[0].1.len() as u64;
        let dates = (0..n)
            .map(|i| NaiveDate::from_ymd_opt(2024, 7, 1).unwrap() + Days::new(i))
            .collect();
        let (names, cols) = columns
            .into_iter()
            .map(|(name, col)| (name.to_string(), col))
            .unzip();
        ReturnsPanel::from_returns(dates, names, cols).unwrap()
    }

    #[test]
    fn test_rolling_returns() {
        let returns = returns_panel(vec![("A", vec![0.01, 0.02, 0.03, -0.03])]);
        let rolling = rolling_returns(&returns, 2).unwrap();
        let col = rolling.column("A").unwrap();

        assert_eq!(col[0], None);
        assert_relative_eq!(col[1].unwrap(), 1.5, epsilon = 1e-9);
        assert_relative_eq!(col[2].unwrap(), 2.5, epsilon = 1e-9);
        assert_relative_eq!(col[3].unwrap(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_rolling_window_longer_than_series() {
        let returns = returns_panel(vec![("A", vec![0.01, 0.02])]);
        let rolling = rolling_returns(&returns, 30).unwrap();
        assert!(rolling.column("A").unwrap().iter().all(Option::is_none));
    }

    #[test]
    fn test_rolling_zero_window_rejected() {
        let returns = returns_panel(vec![("A", vec![0.01])]);
        assert!(matches!(
            rolling_returns(&returns, 0),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_risk_return_profile_order() {
        let returns = returns_panel(vec![
            ("ZZ", vec![0.01, -0.01, 0.02]),
            ("AA", vec![0.0, 0.0, 0.0]),
        ]);

        let profile = risk_return_profile(&returns);

        assert_eq!(profile.len(), 2);
        assert_eq!(profile[0].instrument, "ZZ");
        assert_eq!(profile[1].volatility, 0.0);
        assert_eq!(profile[1].annualized_return, 0.0);
        assert!(profile[0].volatility > 0.0);
    }
}
