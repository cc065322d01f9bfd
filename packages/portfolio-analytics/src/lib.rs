//! Portfolio Analytics - risk and return metrics over aligned price panels.
//!
//! This crate turns a panel of daily closing prices into the standard set of
//! portfolio analytics:
//!
//! - **Returns**: daily period-over-period returns
//! - **Risk/return metrics**: total and annualized return, volatility, beta,
//!   VaR, Sharpe ratio, alpha
//! - **Drawdown**: per-instrument decline from the running peak
//! - **Correlation**: pairwise Pearson matrix
//! - **Performance summary**: returns over 1M, 3M, YTD, 1Y, 3Y, 5Y and inception
//! - **Turnover**: rebalance-frequency policy estimate
//!
//! Data loading is injected through the [`loader::PriceLoader`] trait; the
//! engine itself performs no I/O.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use portfolio_analytics::{compute_metrics, AnalyticsConfig, Benchmark, PricePanel};
//!
//! let dates: Vec<NaiveDate> = (1..=5)
//!     .map(|d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap())
//!     .collect();
//! let panel = PricePanel::from_columns(
//!     dates,
//!     vec!["AAPL".to_string(), "MSFT".to_string()],
//!     vec![
//!         vec![100.0, 101.0, 102.0, 101.5, 103.0],
//!         vec![200.0, 199.0, 202.0, 204.0, 203.0],
//!     ],
//! )
//! .unwrap();
//!
//! let inception = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let metrics =
//!     compute_metrics(&panel, &AnalyticsConfig::default(), &Benchmark::EqualWeighted, inception)
//!         .unwrap();
//!
//! println!("Sharpe: {:?}", metrics.sharpe_ratio.get("AAPL"));
//! ```

pub mod config;
pub mod loader;
pub mod portfolio;
pub mod returns;
pub mod series;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use config::{AnalyticsConfig, LookbackBasis, RebalanceFrequency};
pub use loader::{InMemoryLoader, JsonFileLoader, PriceLoader};
pub use types::{
    ApiResponse, Benchmark, CorrelationMatrix, DrawdownPanel, MetricVector, Panel,
    PerformanceRow, PricePanel, PriceRecord, ReturnsPanel,
};

// Re-export main functionality
pub use portfolio::{
    alpha, annualized_return, beta, calculate_drawdown, compute_metrics, correlation_matrix,
    performance_summary, sharpe_ratio, total_return, turnover_rate, value_at_risk, volatility,
    PortfolioAnalyzer, PortfolioMetrics, PERIOD_LABELS, TRADING_DAYS_PER_YEAR,
};
pub use returns::calculate_returns;
pub use series::{risk_return_profile, rolling_returns, RiskReturnPoint};

use chrono::NaiveDate;

/// Error types for portfolio-analytics operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed price panel: {0}")]
    MalformedPanel(String),

    #[error("Date not in panel: {0}")]
    DateNotInPanel(NaiveDate),

    #[error("Unknown instrument: {0}")]
    UnknownInstrument(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),
}

/// Result type for portfolio-analytics operations.
pub type Result<T> = std::result::Result<T, Error>;
