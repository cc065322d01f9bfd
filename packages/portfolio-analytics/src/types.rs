//! Core data types for the analytics engine.

use crate::{Error, Result};
use chrono::NaiveDate;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A date-indexed table with one column per instrument.
///
/// Dates are strictly ascending and every column has exactly one cell per
/// date. Panels are immutable once built; every computation produces a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel<T> {
    dates: Vec<NaiveDate>,
    instruments: Vec<String>,
    columns: Vec<Vec<T>>,
}

/// Closing prices. Gaps are `None`, never dropped rows.
pub type PricePanel = Panel<Option<f64>>;

/// Daily returns. Only complete rows survive, so every cell is present.
pub type ReturnsPanel = Panel<f64>;

/// Percentage decline from the running peak, same shape as the price panel.
pub type DrawdownPanel = Panel<Option<f64>>;

impl<T> Panel<T> {
    /// Build a panel, checking its shape.
    ///
    /// Fails on non-ascending or duplicate dates, duplicate instruments, or
    /// columns whose length does not match the date index.
    pub fn new(dates: Vec<NaiveDate>, instruments: Vec<String>, columns: Vec<Vec<T>>) -> Result<Self> {
        if let Some(pair) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(Error::MalformedPanel(format!(
                "dates must be strictly ascending, found {} followed by {}",
                pair[0], pair[1]
            )));
        }

        let mut seen = BTreeSet::new();
        for name in &instruments {
            if !seen.insert(name.as_str()) {
                return Err(Error::MalformedPanel(format!("duplicate instrument {}", name)));
            }
        }

        if columns.len() != instruments.len() {
            return Err(Error::MalformedPanel(format!(
                "{} instruments but {} columns",
                instruments.len(),
                columns.len()
            )));
        }

        for (name, column) in instruments.iter().zip(&columns) {
            if column.len() != dates.len() {
                return Err(Error::MalformedPanel(format!(
                    "column {} has {} values for {} dates",
                    name,
                    column.len(),
                    dates.len()
                )));
            }
        }

        Ok(Self::from_parts(dates, instruments, columns))
    }

    /// Assemble a panel the caller already knows is well-formed.
    pub(crate) fn from_parts(
        dates: Vec<NaiveDate>,
        instruments: Vec<String>,
        columns: Vec<Vec<T>>,
    ) -> Self {
        Self {
            dates,
            instruments,
            columns,
        }
    }

    /// A panel with the given instruments and no rows.
    pub fn empty(instruments: Vec<String>) -> Self {
        let columns = instruments.iter().map(|_| Vec::new()).collect();
        Self::from_parts(Vec::new(), instruments, columns)
    }

    /// The date index.
    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    /// Instrument identifiers in column order.
    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    /// All columns in instrument order.
    pub fn columns(&self) -> &[Vec<T>] {
        &self.columns
    }

    /// Look up a column by instrument identifier.
    pub fn column(&self, instrument: &str) -> Option<&[T]> {
        self.instruments
            .iter()
            .position(|name| name == instrument)
            .map(|idx| self.columns[idx].as_slice())
    }

    /// Iterate over `(instrument, column)` pairs in column order.
    pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.instruments
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// True when the panel has no rows or no instruments.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() || self.instruments.is_empty()
    }

    /// Number of instruments.
    pub fn instrument_count(&self) -> usize {
        self.instruments.len()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }

    /// Row index of an exact date.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Row index of the first date at or after `date`.
    pub fn position_at_or_after(&self, date: NaiveDate) -> Option<usize> {
        let idx = self.dates.partition_point(|d| *d < date);
        (idx < self.dates.len()).then_some(idx)
    }
}

impl PricePanel {
    /// Build a price panel with no gaps.
    pub fn from_columns(
        dates: Vec<NaiveDate>,
        instruments: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let columns = columns
            .into_iter()
            .map(|col| col.into_iter().map(Some).collect())
            .collect();
        Self::with_gaps(dates, instruments, columns)
    }

    /// Build a price panel where `None` marks a missing observation.
    ///
    /// Besides the shape checks of [`Panel::new`], every present price must be
    /// finite and strictly positive.
    pub fn with_gaps(
        dates: Vec<NaiveDate>,
        instruments: Vec<String>,
        columns: Vec<Vec<Option<f64>>>,
    ) -> Result<Self> {
        let panel = Panel::new(dates, instruments, columns)?;
        panel.validate_prices()?;
        Ok(panel)
    }

    /// Pivot long-form records into an aligned panel.
    ///
    /// The index is the union of record dates; columns follow `instruments`
    /// order. Records for other tickers are ignored, and instruments with no
    /// records at all are left out of the panel.
    pub fn from_records(instruments: &[String], records: &[PriceRecord]) -> Result<Self> {
        let wanted: Vec<String> = instruments.iter().map(|s| s.to_uppercase()).collect();
        let index: HashMap<&str, usize> = wanted
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();

        let relevant: Vec<(usize, &PriceRecord)> = records
            .iter()
            .filter_map(|r| index.get(r.ticker.to_uppercase().as_str()).map(|&i| (i, r)))
            .collect();

        let dates: Vec<NaiveDate> = relevant
            .iter()
            .map(|(_, r)| r.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut columns: Vec<Vec<Option<f64>>> = vec![vec![None; dates.len()]; wanted.len()];
        for (col, record) in relevant {
            let row = dates.binary_search(&record.date).map_err(|_| {
                Error::MalformedPanel(format!("record date {} missing from index", record.date))
            })?;
            let cell = &mut columns[col][row];
            if cell.is_some() {
                return Err(Error::MalformedPanel(format!(
                    "duplicate record for {} on {}",
                    wanted[col], record.date
                )));
            }
            *cell = Some(record.close);
        }

        let mut kept_names = Vec::with_capacity(wanted.len());
        let mut kept_columns = Vec::with_capacity(wanted.len());
        for (name, column) in wanted.into_iter().zip(columns) {
            if column.iter().all(Option::is_none) {
                tracing::warn!(instrument = %name, "no price records, dropping instrument");
                continue;
            }
            kept_names.push(name);
            kept_columns.push(column);
        }

        Self::with_gaps(dates, kept_names, kept_columns)
    }

    /// Price of an instrument at an exact row.
    pub fn price(&self, instrument: &str, row: usize) -> Option<f64> {
        self.column(instrument).and_then(|col| col.get(row).copied().flatten())
    }

    fn validate_prices(&self) -> Result<()> {
        for (name, column) in self.iter_columns() {
            for (date, value) in self.dates.iter().zip(column) {
                if let Some(price) = value {
                    if !price.is_finite() || *price <= 0.0 {
                        return Err(Error::MalformedPanel(format!(
                            "invalid price {} for {} on {}",
                            price, name, date
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

impl ReturnsPanel {
    /// Build a returns panel directly from complete columns.
    ///
    /// Mostly useful for feeding the metric functions without going through
    /// a price panel. Every value must be finite.
    pub fn from_returns(
        dates: Vec<NaiveDate>,
        instruments: Vec<String>,
        columns: Vec<Vec<f64>>,
    ) -> Result<Self> {
        let panel = Panel::new(dates, instruments, columns)?;
        for (name, column) in panel.iter_columns() {
            if column.iter().any(|r| !r.is_finite()) {
                return Err(Error::MalformedPanel(format!("non-finite return for {}", name)));
            }
        }
        Ok(panel)
    }
}

/// Serializes as `{ "dates": [...], "series": { instrument: [...] } }`.
impl<T: Serialize> Serialize for Panel<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Panel", 2)?;
        state.serialize_field("dates", &self.dates)?;
        state.serialize_field("series", &SeriesMap(self))?;
        state.end()
    }
}

struct SeriesMap<'a, T>(&'a Panel<T>);

impl<T: Serialize> Serialize for SeriesMap<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter_columns())
    }
}

/// A raw daily price record as produced by the data store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRecord {
    /// Ticker symbol
    #[serde(alias = "Ticker")]
    pub ticker: String,
    /// Trading date (YYYY-MM-DD)
    #[serde(alias = "Date")]
    pub date: NaiveDate,
    /// Closing price
    #[serde(alias = "Close")]
    pub close: f64,
    /// Traded volume
    #[serde(default, alias = "Volume")]
    pub volume: u64,
}

impl PriceRecord {
    /// Create a new record. The ticker is upper-cased.
    pub fn new(ticker: &str, date: NaiveDate, close: f64) -> Self {
        Self {
            ticker: ticker.to_uppercase(),
            date,
            close,
            volume: 0,
        }
    }

    pub fn with_volume(mut self, volume: u64) -> Self {
        self.volume = volume;
        self
    }
}

/// One scalar per instrument.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricVector(BTreeMap<String, f64>);

impl MetricVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, instrument: impl Into<String>, value: f64) {
        self.0.insert(instrument.into(), value);
    }

    pub fn get(&self, instrument: &str) -> Option<f64> {
        self.0.get(instrument).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, f64)> for MetricVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One row of the performance summary table.
#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceRow {
    /// Period label ("1M", "3M", "YTD", ...)
    pub period: String,
    /// Date the window was anchored to
    pub anchor: NaiveDate,
    /// Percentage return per instrument, rounded to 2 decimals
    pub returns: Vec<(String, f64)>,
}

impl PerformanceRow {
    pub fn get(&self, instrument: &str) -> Option<f64> {
        self.returns
            .iter()
            .find(|(name, _)| name == instrument)
            .map(|(_, value)| *value)
    }
}

/// Serializes flat, as `{ "Period": "1M", "AAPL": 1.23, ... }`.
impl Serialize for PerformanceRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.returns.len() + 1))?;
        map.serialize_entry("Period", &self.period)?;
        for (name, value) in &self.returns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Square, symmetric instrument-by-instrument matrix with a unit diagonal.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorrelationMatrix {
    instruments: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub(crate) fn from_parts(instruments: Vec<String>, values: Vec<Vec<f64>>) -> Self {
        Self {
            instruments,
            values,
        }
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    /// Row-major coefficients in instrument order.
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.instruments.iter().position(|n| n == a)?;
        let j = self.instruments.iter().position(|n| n == b)?;
        Some(self.values[i][j])
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

/// Serializes as a nested map, instrument -> instrument -> coefficient.
impl Serialize for CorrelationMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(
            self.instruments
                .iter()
                .zip(&self.values)
                .map(|(name, row)| (name, CorrelationRow(&self.instruments, row))),
        )
    }
}

struct CorrelationRow<'a>(&'a [String], &'a [f64]);

impl Serialize for CorrelationRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().zip(self.1))
    }
}

/// The reference return series for beta and alpha.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "series", rename_all = "snake_case")]
pub enum Benchmark {
    /// Equal-weighted mean of every instrument in the returns panel
    #[default]
    EqualWeighted,
    /// Caller-supplied daily returns keyed by date
    Provided(BTreeMap<NaiveDate, f64>),
}

impl Benchmark {
    /// Build a provided benchmark from `(date, daily_return)` pairs.
    pub fn provided(series: impl IntoIterator<Item = (NaiveDate, f64)>) -> Self {
        Self::Provided(series.into_iter().collect())
    }

    /// Use one instrument of the returns panel as the benchmark.
    pub fn from_instrument(returns: &ReturnsPanel, instrument: &str) -> Result<Self> {
        let column = returns
            .column(instrument)
            .ok_or_else(|| Error::UnknownInstrument(instrument.to_string()))?;
        Ok(Self::provided(
            returns.dates().iter().copied().zip(column.iter().copied()),
        ))
    }
}

/// API response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
