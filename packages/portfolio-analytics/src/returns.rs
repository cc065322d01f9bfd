//! Daily returns from a price panel.

use crate::types::{Panel, PricePanel, ReturnsPanel};

/// Calculate period-over-period returns.
///
/// Prices are forward-filled before differencing: cell `(d, i)` is
/// `fill(d, i) / fill(prev, i) - 1`, where `fill` is the last price observed
/// at or before a date. A gap day therefore shows a 0 return for the gapped
/// instrument and leaves every other instrument untouched, so each column
/// still compounds back to its own price path.
///
/// The first row has no prior value and is dropped, as is any row where some
/// instrument has not been observed yet (a leading gap).
///
/// Empty and single-row panels yield an empty returns panel.
pub fn calculate_returns(prices: &PricePanel) -> ReturnsPanel {
    let instruments = prices.instruments().to_vec();
    if prices.len() < 2 || prices.instrument_count() == 0 {
        return Panel::empty(instruments);
    }

    let mut filled: Vec<Option<f64>> = prices.columns().iter().map(|col| col[0]).collect();
    let mut dates = Vec::with_capacity(prices.len() - 1);
    let mut columns: Vec<Vec<f64>> = vec![Vec::with_capacity(prices.len() - 1); instruments.len()];
    let mut row = Vec::with_capacity(instruments.len());

    for (idx, date) in prices.dates().iter().enumerate().skip(1) {
        row.clear();
        for (col, last) in prices.columns().iter().zip(filled.iter_mut()) {
            let previous = *last;
            if col[idx].is_some() {
                *last = col[idx];
            }
            if let (Some(current), Some(previous)) = (*last, previous) {
                row.push(current / previous - 1.0);
            }
        }

        if row.len() == instruments.len() {
            dates.push(*date);
            for (column, value) in columns.iter_mut().zip(&row) {
                column.push(*value);
            }
        }
    }

    let dropped = prices.len() - 1 - dates.len();
    if dropped > 0 {
        tracing::debug!(dropped, "dropped return rows before every instrument was observed");
    }

    Panel::from_parts(dates, instruments, columns)
}
