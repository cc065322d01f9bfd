//! The metrics bundle: every analytic computed from one price panel.

use super::correlation::correlation_matrix;
use super::drawdown::calculate_drawdown;
use super::performance::{annualized_return, performance_summary, total_return};
use super::risk::{alpha, beta, sharpe_ratio, value_at_risk, volatility};
use super::turnover::turnover_rate;
use crate::config::AnalyticsConfig;
use crate::loader::PriceLoader;
use crate::returns::calculate_returns;
use crate::types::{
    Benchmark, CorrelationMatrix, DrawdownPanel, MetricVector, PerformanceRow, PricePanel,
    ReturnsPanel,
};
use crate::Result;
use chrono::{Local, NaiveDate};
use serde::Serialize;

/// All analytics for one price panel.
#[derive(Debug, Clone, Serialize)]
pub struct PortfolioMetrics {
    /// Instruments in column order
    pub instruments: Vec<String>,
    /// Inception date the summary was anchored to
    pub start_date: NaiveDate,
    /// Last date of the price panel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Input prices
    pub prices: PricePanel,
    /// Daily returns shared by every metric below
    pub returns: ReturnsPanel,
    /// Percent return from first to last date
    pub total_return: MetricVector,
    /// Simple-scaled annual return in percent
    pub annualized_return: MetricVector,
    /// Annualized volatility in percent
    pub volatility: MetricVector,
    pub beta: MetricVector,
    /// Historical VaR in percent at `confidence_level`
    pub var_95: MetricVector,
    pub confidence_level: f64,
    pub sharpe_ratio: MetricVector,
    /// CAPM alpha against the same benchmark and betas as `beta`
    pub alpha: MetricVector,
    pub turnover_rate: f64,
    pub performance_summary: Vec<PerformanceRow>,
    pub drawdown: DrawdownPanel,
    pub correlation_matrix: CorrelationMatrix,
}

/// Compute the full metrics bundle for a price panel.
///
/// Returns are derived once and every metric reads that same panel; alpha is
/// computed from the exact betas reported in the bundle.
///
/// # Errors
///
/// An invalid configuration, or a provided benchmark that shares no dates
/// with the returns panel.
pub fn compute_metrics(
    prices: &PricePanel,
    config: &AnalyticsConfig,
    benchmark: &Benchmark,
    inception: NaiveDate,
) -> Result<PortfolioMetrics> {
    config.validate_metric_params()?;

    tracing::debug!(
        rows = prices.len(),
        instruments = prices.instrument_count(),
        "calculating returns"
    );
    let returns = calculate_returns(prices);

    let total = match (prices.first_date(), prices.last_date()) {
        (Some(first), Some(last)) => total_return(prices, first, last)?,
        _ => MetricVector::new(),
    };

    tracing::debug!(rows = returns.len(), "calculating portfolio metrics");
    let betas = beta(&returns, benchmark)?;
    let alphas = alpha(&returns, &betas, benchmark, config.risk_free_rate)?;

    Ok(PortfolioMetrics {
        instruments: prices.instruments().to_vec(),
        start_date: inception,
        end_date: prices.last_date(),
        total_return: total,
        annualized_return: annualized_return(&returns),
        volatility: volatility(&returns),
        var_95: value_at_risk(&returns, config.confidence_level)?,
        confidence_level: config.confidence_level,
        sharpe_ratio: sharpe_ratio(&returns, config.risk_free_rate),
        beta: betas,
        alpha: alphas,
        turnover_rate: turnover_rate(&config.rebalance_frequency),
        performance_summary: performance_summary(prices, inception, config.lookback_basis),
        drawdown: calculate_drawdown(prices),
        correlation_matrix: correlation_matrix(&returns),
        returns,
        prices: prices.clone(),
    })
}

/// Loads a price panel through an injected loader and computes its metrics.
#[derive(Debug, Clone)]
pub struct PortfolioAnalyzer<L> {
    loader: L,
    config: AnalyticsConfig,
    benchmark: Benchmark,
}

impl<L: PriceLoader> PortfolioAnalyzer<L> {
    /// Create an analyzer with the default configuration and an
    /// equal-weighted benchmark.
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            config: AnalyticsConfig::default(),
            benchmark: Benchmark::EqualWeighted,
        }
    }

    pub fn with_config(mut self, config: AnalyticsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_benchmark(mut self, benchmark: Benchmark) -> Self {
        self.benchmark = benchmark;
        self
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Load prices for `instruments` from `start` to `end` (today when
    /// `None`) and compute the metrics bundle, with `start` as inception.
    pub fn analyze(
        &self,
        instruments: &[String],
        start: NaiveDate,
        end: Option<NaiveDate>,
    ) -> Result<PortfolioMetrics> {
        let end = end.unwrap_or_else(|| Local::now().date_naive());

        tracing::debug!(%start, %end, "loading portfolio data");
        let prices = self.loader.load(instruments, start, end)?;

        compute_metrics(&prices, &self.config, &self.benchmark, start)
    }
}
