//! Portfolio risk metrics calculation.
//!
//! Provides volatility, beta, historical VaR, Sharpe ratio and CAPM alpha.
//! Every function works column-wise on a returns panel of daily returns
//! (e.g., 0.01 for a 1% day) and reports percentages where noted.

use super::performance::annualized_return;
use super::{per_instrument, TRADING_DAYS_PER_YEAR};
use crate::stats::{covariance, is_constant, mean, quantile, sample_std_dev, sample_variance};
use crate::types::{Benchmark, MetricVector, ReturnsPanel};
use crate::{Error, Result};

/// Calculate annualized volatility in percent.
///
/// `sample_std(daily) * sqrt(252) * 100`. A constant series, or fewer than
/// two observations, yields exactly 0.
pub fn volatility(returns: &ReturnsPanel) -> MetricVector {
    per_instrument(returns, annualized_volatility)
}

fn annualized_volatility(column: &[f64]) -> f64 {
    if is_constant(column) {
        return 0.0;
    }
    sample_std_dev(column)
        .map(|std| std * TRADING_DAYS_PER_YEAR.sqrt() * 100.0)
        .unwrap_or(0.0)
}

/// Calculate beta of each instrument against a benchmark.
///
/// `cov(instrument, benchmark) / var(benchmark)` over the dates both share.
/// When the benchmark is constant or too short to have a variance, beta is
/// 1.0 for every instrument.
///
/// # Errors
///
/// A provided benchmark that shares no dates with a non-empty returns panel.
pub fn beta(returns: &ReturnsPanel, benchmark: &Benchmark) -> Result<MetricVector> {
    if returns.is_empty() {
        return Ok(MetricVector::new());
    }

    let aligned = AlignedBenchmark::resolve(returns, benchmark)?;
    let variance = sample_variance(&aligned.values).unwrap_or(0.0);

    if is_constant(&aligned.values) || variance <= 0.0 {
        tracing::warn!(variance, "benchmark variance is not positive, beta defaults to 1.0");
        return Ok(per_instrument(returns, |_| 1.0));
    }

    Ok(per_instrument(returns, |column| {
        let x = aligned.select(column);
        covariance(&x, &aligned.values)
            .map(|cov| cov / variance)
            .unwrap_or(1.0)
    }))
}

/// Calculate historical Value at Risk in percent.
///
/// The `1 - confidence` empirical quantile of each instrument's daily
/// returns, linearly interpolated between order statistics. A loss shows up
/// as a negative number.
///
/// # Errors
///
/// `confidence` outside the open interval (0, 1).
pub fn value_at_risk(returns: &ReturnsPanel, confidence: f64) -> Result<MetricVector> {
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(Error::InvalidParameter(format!(
            "confidence level must be in (0, 1), got {}",
            confidence
        )));
    }

    Ok(per_instrument(returns, |column| {
        quantile(column, 1.0 - confidence)
            .map(|q| q * 100.0)
            .unwrap_or(0.0)
    }))
}

/// Calculate the annualized Sharpe ratio.
///
/// `(mean(daily) - rf / 252) * 252 * 100 / annualized_volatility`, with
/// `risk_free_rate` annual (0.02 for 2%). Zero volatility yields 0.
pub fn sharpe_ratio(returns: &ReturnsPanel, risk_free_rate: f64) -> MetricVector {
    let daily_rf = risk_free_rate / TRADING_DAYS_PER_YEAR;

    per_instrument(returns, |column| {
        let vol = annualized_volatility(column);
        if vol <= 0.0 {
            return 0.0;
        }
        let excess = (mean(column).unwrap_or(0.0) - daily_rf) * TRADING_DAYS_PER_YEAR * 100.0;
        excess / vol
    })
}

/// Calculate CAPM alpha in percent per year.
///
/// `annualized_return - (rf * 100 + beta * (benchmark_annualized - rf * 100))`.
/// Pass the betas returned by [`beta`] for the same benchmark so that alpha
/// and beta stay consistent. The benchmark return is annualized with the
/// same simple scaling as [`annualized_return`].
///
/// # Errors
///
/// Same as [`beta`].
pub fn alpha(
    returns: &ReturnsPanel,
    betas: &MetricVector,
    benchmark: &Benchmark,
    risk_free_rate: f64,
) -> Result<MetricVector> {
    if returns.is_empty() {
        return Ok(MetricVector::new());
    }

    let aligned = AlignedBenchmark::resolve(returns, benchmark)?;
    let benchmark_annualized =
        mean(&aligned.values).unwrap_or(0.0) * TRADING_DAYS_PER_YEAR * 100.0;
    let rf_percent = risk_free_rate * 100.0;

    Ok(annualized_return(returns)
        .iter()
        .map(|(name, annualized)| {
            let b = betas.get(name).unwrap_or(1.0);
            let expected = rf_percent + b * (benchmark_annualized - rf_percent);
            (name.to_string(), annualized - expected)
        })
        .collect())
}

/// Benchmark returns restricted to the rows of a returns panel they cover.
struct AlignedBenchmark {
    /// Row indices into the returns panel
    rows: Option<Vec<usize>>,
    values: Vec<f64>,
}

impl AlignedBenchmark {
    fn resolve(returns: &ReturnsPanel, benchmark: &Benchmark) -> Result<Self> {
        match benchmark {
            Benchmark::EqualWeighted => {
                let n = returns.instrument_count() as f64;
                let values = (0..returns.len())
                    .map(|row| returns.columns().iter().map(|col| col[row]).sum::<f64>() / n)
                    .collect();
                Ok(Self { rows: None, values })
            }
            Benchmark::Provided(series) => {
                let (rows, values): (Vec<usize>, Vec<f64>) = returns
                    .dates()
                    .iter()
                    .enumerate()
                    .filter_map(|(row, date)| series.get(date).map(|v| (row, *v)))
                    .unzip();

                if rows.is_empty() {
                    return Err(Error::InsufficientData(
                        "benchmark shares no dates with the returns panel".to_string(),
                    ));
                }
                if rows.len() < returns.len() {
                    tracing::debug!(
                        covered = rows.len(),
                        total = returns.len(),
                        "benchmark covers a subset of return dates"
                    );
                }
                Ok(Self {
                    rows: Some(rows),
                    values,
                })
            }
        }
    }

    /// The instrument's returns on the benchmark's rows.
    fn select(&self, column: &[f64]) -> Vec<f64> {
        match &self.rows {
            None => column.to_vec(),
            Some(rows) => rows.iter().map(|&row| column[row]).collect(),
        }
    }
}
