//! Portfolio analytics module.
//!
//! Provides risk/return metrics, drawdown, correlation, the performance
//! summary table and the facade that bundles them.

mod correlation;
mod drawdown;
mod metrics;
mod performance;
mod risk;
mod turnover;

pub use correlation::correlation_matrix;
pub use drawdown::calculate_drawdown;
pub use metrics::{compute_metrics, PortfolioAnalyzer, PortfolioMetrics};
pub use performance::{annualized_return, performance_summary, total_return, PERIOD_LABELS};
pub use risk::{alpha, beta, sharpe_ratio, value_at_risk, volatility};
pub use turnover::turnover_rate;

use crate::types::{MetricVector, ReturnsPanel};

/// Annualization constant: trading days per year.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Apply `f` to every column of a returns panel.
///
/// An empty panel (no rows or no instruments) yields an empty vector.
fn per_instrument(returns: &ReturnsPanel, f: impl Fn(&[f64]) -> f64) -> MetricVector {
    if returns.is_empty() {
        return MetricVector::new();
    }

    returns
        .iter_columns()
        .map(|(name, column)| (name.to_string(), f(column)))
        .collect()
}
