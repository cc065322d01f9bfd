//! Drawdown series from a price panel.

use crate::types::{DrawdownPanel, Panel, PricePanel};

/// Calculate the drawdown of every instrument at every date, in percent.
///
/// The cumulative-return index is `cum[d] = price[d] / price[first]`, which is
/// the compounded product of daily returns starting from 1. Drawdown is
/// `(cum - running_max) / running_max * 100`: always `<= 0`, and exactly 0 on
/// a new running high. Interior gaps carry the last observed price forward,
/// matching [`calculate_returns`](crate::returns::calculate_returns); cells
/// before an instrument's first observation stay missing.
pub fn calculate_drawdown(prices: &PricePanel) -> DrawdownPanel {
    let columns = prices
        .columns()
        .iter()
        .map(|column| drawdown_series(column))
        .collect();

    Panel::from_parts(prices.dates().to_vec(), prices.instruments().to_vec(), columns)
}

fn drawdown_series(prices: &[Option<f64>]) -> Vec<Option<f64>> {
    let mut base: Option<f64> = None;
    let mut last: Option<f64> = None;
    let mut running_max = f64::NEG_INFINITY;

    prices
        .iter()
        .map(|observed| {
            if observed.is_some() {
                last = *observed;
            }
            let price = last?;
            let first = *base.get_or_insert(price);
            let cumulative = price / first;
            if cumulative >= running_max {
                running_max = cumulative;
                return Some(0.0);
            }
            Some((cumulative - running_max) / running_max * 100.0)
        })
        .collect()
}
