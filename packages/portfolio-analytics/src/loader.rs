//! Price loading collaborators.
//!
//! The engine never fetches data itself: callers hand it a [`PricePanel`],
//! usually produced by a [`PriceLoader`].

use crate::types::{PricePanel, PriceRecord};
use crate::{Error, Result};
use chrono::NaiveDate;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Source of aligned price panels.
pub trait PriceLoader {
    /// Load closing prices for `instruments` between `start` and `end`
    /// inclusive. Columns follow the order of `instruments`.
    fn load(&self, instruments: &[String], start: NaiveDate, end: NaiveDate) -> Result<PricePanel>;
}

impl<L: PriceLoader + ?Sized> PriceLoader for &L {
    fn load(&self, instruments: &[String], start: NaiveDate, end: NaiveDate) -> Result<PricePanel> {
        (**self).load(instruments, start, end)
    }
}

/// Loader over records already held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLoader {
    records: Vec<PriceRecord>,
}

impl InMemoryLoader {
    pub fn new(records: Vec<PriceRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[PriceRecord] {
        &self.records
    }
}

impl PriceLoader for InMemoryLoader {
    fn load(&self, instruments: &[String], start: NaiveDate, end: NaiveDate) -> Result<PricePanel> {
        build_panel(&self.records, instruments, start, end)
    }
}

/// Loader reading a JSON array of [`PriceRecord`]s from disk.
///
/// The file is read on every call so each request sees its own snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileLoader {
    path: PathBuf,
}

impl JsonFileLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the default price file path.
    ///
    /// Default path: `~/.portfolio-analytics/prices.json`
    /// Can be overridden with `PORTFOLIO_ANALYTICS_DATA` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var("PORTFOLIO_ANALYTICS_DATA") {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.home_dir().join(".portfolio-analytics/prices.json"))
            .unwrap_or_else(|| PathBuf::from("prices.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every record in the file.
    pub fn read_records(&self) -> Result<Vec<PriceRecord>> {
        let content = fs::read_to_string(&self.path)?;
        let records: Vec<PriceRecord> = serde_json::from_str(&content)?;
        tracing::debug!(path = %self.path.display(), records = records.len(), "read price records");
        Ok(records)
    }

    /// Distinct tickers in the file, upper-cased, in first-seen order.
    pub fn tickers(&self) -> Result<Vec<String>> {
        let mut tickers: Vec<String> = Vec::new();
        for record in self.read_records()? {
            let ticker = record.ticker.to_uppercase();
            if !tickers.contains(&ticker) {
                tickers.push(ticker);
            }
        }
        Ok(tickers)
    }
}

impl PriceLoader for JsonFileLoader {
    fn load(&self, instruments: &[String], start: NaiveDate, end: NaiveDate) -> Result<PricePanel> {
        build_panel(&self.read_records()?, instruments, start, end)
    }
}

fn build_panel(
    records: &[PriceRecord],
    instruments: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PricePanel> {
    if start > end {
        return Err(Error::InvalidParameter(format!(
            "start date {} is after end date {}",
            start, end
        )));
    }

    let in_range: Vec<PriceRecord> = records
        .iter()
        .filter(|r| r.date >= start && r.date <= end)
        .cloned()
        .collect();

    let panel = PricePanel::from_records(instruments, &in_range)?;
    if panel.is_empty() {
        return Err(Error::InsufficientData(format!(
            "no prices for {} between {} and {}",
            instruments.join(","),
            start,
            end
        )));
    }

    tracing::debug!(
        rows = panel.len(),
        instruments = panel.instrument_count(),
        "loaded price panel"
    );
    Ok(panel)
}
