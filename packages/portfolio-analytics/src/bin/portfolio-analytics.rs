//! Portfolio analytics CLI - computes metrics from a JSON price file.
//!
//! Every command prints a JSON `ApiResponse` on stdout; logs go to stderr.

use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use portfolio_analytics::{
    calculate_drawdown, calculate_returns, compute_metrics, risk_return_profile, rolling_returns,
    AnalyticsConfig, ApiResponse, Benchmark, JsonFileLoader, PriceLoader, PricePanel,
    RebalanceFrequency,
};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "portfolio-analytics")]
#[command(about = "Portfolio risk and return analytics over daily closing prices")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.portfolio-analytics/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute the full metrics bundle
    Metrics {
        #[command(flatten)]
        data: DataArgs,
        /// Confidence level for VaR (0.95 = 95%)
        #[arg(long)]
        confidence: Option<f64>,
        /// Annual risk-free rate (0.02 = 2%)
        #[arg(long)]
        risk_free: Option<f64>,
        /// Rebalance frequency (M, Q, ...)
        #[arg(long)]
        rebalance: Option<String>,
        /// Use this ticker's returns as the benchmark instead of the equal-weighted mean
        #[arg(long)]
        benchmark: Option<String>,
    },
    /// Price series for charting
    Prices {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Daily return series in percent
    Returns {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Drawdown series in percent
    Drawdown {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Rolling mean returns in percent
    Rolling {
        #[command(flatten)]
        data: DataArgs,
        /// Window length in trading days
        #[arg(short, long)]
        window: Option<usize>,
    },
    /// Annualized volatility and return per ticker
    Profile {
        #[command(flatten)]
        data: DataArgs,
    },
    /// Show the effective configuration
    Config {
        /// Write the effective configuration back to the config file
        #[arg(long)]
        write: bool,
    },
}

#[derive(Args)]
struct DataArgs {
    /// JSON file of price records (defaults to ~/.portfolio-analytics/prices.json)
    #[arg(short, long)]
    data: Option<PathBuf>,
    /// Tickers to analyze (comma-separated, defaults to every ticker in the file)
    #[arg(short, long)]
    tickers: Option<String>,
    /// Portfolio inception date
    #[arg(short, long, default_value = "2020-01-01")]
    start: NaiveDate,
    /// Last date to load (defaults to today)
    #[arg(short, long)]
    end: Option<NaiveDate>,
}

impl DataArgs {
    fn loader(&self) -> JsonFileLoader {
        JsonFileLoader::new(self.data.clone().unwrap_or_else(JsonFileLoader::default_path))
    }

    fn load(&self) -> anyhow::Result<(PricePanel, NaiveDate)> {
        let loader = self.loader();
        let tickers: Vec<String> = match &self.tickers {
            Some(list) => list.split(',').map(|s| s.trim().to_uppercase()).collect(),
            None => loader
                .tickers()
                .with_context(|| format!("reading {}", loader.path().display()))?,
        };
        let end = self.end.unwrap_or_else(|| Local::now().date_naive());

        let panel = loader
            .load(&tickers, self.start, end)
            .with_context(|| format!("loading prices from {}", loader.path().display()))?;
        Ok((panel, end))
    }
}

fn main() {
    // Logs go to stderr, stdout carries the JSON response
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config_path = cli.config.unwrap_or_else(AnalyticsConfig::default_path);

    let result = match cli.command {
        Commands::Metrics {
            data,
            confidence,
            risk_free,
            rebalance,
            benchmark,
        } => handle_metrics(&config_path, data, confidence, risk_free, rebalance, benchmark),
        Commands::Prices { data } => handle_prices(data),
        Commands::Returns { data } => handle_returns(data),
        Commands::Drawdown { data } => handle_drawdown(data),
        Commands::Rolling { data, window } => handle_rolling(&config_path, data, window),
        Commands::Profile { data } => handle_profile(data),
        Commands::Config { write } => handle_config(&config_path, write),
    };

    match result {
        Ok(value) => println!("{}", render(&ApiResponse::ok(value))),
        Err(e) => {
            tracing::error!(error = ?e, "command failed");
            println!("{}", render(&ApiResponse::<()>::err(format!("{:#}", e))));
            std::process::exit(1);
        }
    }
}

fn render<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string_pretty(response)
        .unwrap_or_else(|e| json!({ "ok": false, "error": e.to_string() }).to_string())
}

fn load_config(path: &Path) -> anyhow::Result<AnalyticsConfig> {
    AnalyticsConfig::load_from_path(path)
        .with_context(|| format!("loading config from {}", path.display()))
}

fn handle_metrics(
    config_path: &Path,
    data: DataArgs,
    confidence: Option<f64>,
    risk_free: Option<f64>,
    rebalance: Option<String>,
    benchmark: Option<String>,
) -> anyhow::Result<serde_json::Value> {
    let mut config = load_config(config_path)?;
    if let Some(confidence) = confidence {
        config.confidence_level = confidence;
    }
    if let Some(rate) = risk_free {
        config.risk_free_rate = rate;
    }
    if let Some(label) = rebalance {
        config.rebalance_frequency = RebalanceFrequency::parse(&label);
    }

    let (prices, _) = data.load()?;
    let benchmark = match benchmark {
        Some(ticker) => {
            Benchmark::from_instrument(&calculate_returns(&prices), &ticker.to_uppercase())?
        }
        None => Benchmark::EqualWeighted,
    };

    let metrics = compute_metrics(&prices, &config, &benchmark, data.start)?;
    Ok(serde_json::to_value(metrics)?)
}

fn handle_prices(data: DataArgs) -> anyhow::Result<serde_json::Value> {
    let (prices, end) = data.load()?;
    Ok(json!({ "end_date": end, "prices": prices }))
}

fn handle_returns(data: DataArgs) -> anyhow::Result<serde_json::Value> {
    let (prices, _) = data.load()?;
    Ok(json!({ "returns": calculate_returns(&prices) }))
}

fn handle_drawdown(data: DataArgs) -> anyhow::Result<serde_json::Value> {
    let (prices, _) = data.load()?;
    Ok(json!({ "drawdown": calculate_drawdown(&prices) }))
}

fn handle_rolling(
    config_path: &Path,
    data: DataArgs,
    window: Option<usize>,
) -> anyhow::Result<serde_json::Value> {
    let window = match window {
        Some(w) => w,
        None => load_config(config_path)?.rolling_window,
    };
    let (prices, _) = data.load()?;
    let rolling = rolling_returns(&calculate_returns(&prices), window)?;
    Ok(json!({ "window": window, "rolling_returns": rolling }))
}

fn handle_profile(data: DataArgs) -> anyhow::Result<serde_json::Value> {
    let (prices, _) = data.load()?;
    Ok(json!({ "profile": risk_return_profile(&calculate_returns(&prices)) }))
}

fn handle_config(config_path: &Path, write: bool) -> anyhow::Result<serde_json::Value> {
    let config = load_config(config_path)?;
    if write {
        config
            .save_to_path(config_path)
            .with_context(|| format!("writing config to {}", config_path.display()))?;
    }
    Ok(json!({ "path": config_path, "config": config }))
}
