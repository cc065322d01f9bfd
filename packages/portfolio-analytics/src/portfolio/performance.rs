//! Portfolio performance analytics.

use super::{per_instrument, TRADING_DAYS_PER_YEAR};
use crate::config::LookbackBasis;
use crate::stats::mean;
use crate::types::{MetricVector, PerformanceRow, PricePanel, ReturnsPanel};
use crate::{Error, Result};
use chrono::{Datelike, Days, NaiveDate};

/// Period labels of the performance summary, in row order.
pub const PERIOD_LABELS: [&str; 7] = ["1M", "3M", "YTD", "1Y", "3Y", "5Y", "Inception"];

/// How a lookback window finds its nominal start date.
#[derive(Debug, Clone, Copy)]
enum Window {
    /// Calendar days before the end date
    CalendarDays(u64),
    /// Nominal trading days, interpreted per [`LookbackBasis`]
    TradingDays(u64),
    /// January 1 of the end date's year
    YearToDate,
    /// The caller-supplied inception date
    Inception,
}

const WINDOWS: [(&str, Window); 7] = [
    ("1M", Window::CalendarDays(30)),
    ("3M", Window::CalendarDays(90)),
    ("YTD", Window::YearToDate),
    ("1Y", Window::TradingDays(252)),
    ("3Y", Window::TradingDays(756)),
    ("5Y", Window::TradingDays(1260)),
    ("Inception", Window::Inception),
];

/// Calculate total return in percent between two dates of the panel.
///
/// `(price[end] / price[start] - 1) * 100` per instrument. An instrument
/// with no price on either date gets NaN.
///
/// # Errors
///
/// `start` or `end` is not a date of the panel.
pub fn total_return(prices: &PricePanel, start: NaiveDate, end: NaiveDate) -> Result<MetricVector> {
    let start_row = prices.position(start).ok_or(Error::DateNotInPanel(start))?;
    let end_row = prices.position(end).ok_or(Error::DateNotInPanel(end))?;

    Ok(prices
        .iter_columns()
        .map(|(name, column)| {
            let value = match (column[start_row], column[end_row]) {
                (Some(first), Some(last)) => (last / first - 1.0) * 100.0,
                _ => f64::NAN,
            };
            (name.to_string(), value)
        })
        .collect())
}

/// Calculate annualized return in percent.
///
/// `mean(daily) * 252 * 100`. This is simple scaling of the mean daily
/// return, not geometric compounding, so it is linear in the daily returns
/// and overstates the compounded figure for volatile series.
pub fn annualized_return(returns: &ReturnsPanel) -> MetricVector {
    per_instrument(returns, |column| {
        mean(column).unwrap_or(0.0) * TRADING_DAYS_PER_YEAR * 100.0
    })
}

/// Returns over the fixed lookback windows, one row per period.
///
/// Each window's nominal start is clamped to the panel's first date and then
/// snapped forward to the first date present in the panel; the window ends on
/// the panel's last date. Values are percent returns rounded to 2 decimals.
/// A window covering fewer than two rows is left out.
pub fn performance_summary(
    prices: &PricePanel,
    inception: NaiveDate,
    basis: LookbackBasis,
) -> Vec<PerformanceRow> {
    let (Some(first), Some(end)) = (prices.first_date(), prices.last_date()) else {
        return Vec::new();
    };
    let end_row = prices.len() - 1;

    let mut rows = Vec::with_capacity(WINDOWS.len());
    for (label, window) in WINDOWS {
        let nominal = match window {
            Window::CalendarDays(days) => end.checked_sub_days(Days::new(days)).unwrap_or(first),
            Window::TradingDays(days) => match basis {
                LookbackBasis::CalendarDays => {
                    end.checked_sub_days(Days::new(days)).unwrap_or(first)
                }
                LookbackBasis::TradingRows => {
                    let back = usize::try_from(days).unwrap_or(usize::MAX);
                    prices.dates()[end_row.saturating_sub(back)]
                }
            },
            Window::YearToDate => NaiveDate::from_yo_opt(end.year(), 1).unwrap_or(first),
            Window::Inception => inception,
        };

        let Some(anchor_row) = prices.position_at_or_after(nominal.max(first)) else {
            tracing::warn!(period = label, %nominal, "no panel date at or after window start");
            continue;
        };

        if end_row - anchor_row + 1 < 2 {
            tracing::warn!(period = label, "window covers fewer than two rows, omitted");
            continue;
        }

        let returns = prices
            .iter_columns()
            .map(|(name, column)| {
                let value = match (column[anchor_row], column[end_row]) {
                    (Some(start), Some(last)) => round2((last / start - 1.0) * 100.0),
                    _ => f64::NAN,
                };
                (name.to_string(), value)
            })
            .collect();

        rows.push(PerformanceRow {
            period: label.to_string(),
            anchor: prices.dates()[anchor_row],
            returns,
        });
    }

    rows
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::returns::calculate_returns;
    use approx::assert_relative_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// One row per calendar day from `start`, price rising by 1 a day.
    fn daily_panel(start: NaiveDate, days: u64) -> PricePanel {
        let dates: Vec<NaiveDate> = (0..days).map(|i| start + Days::new(i)).collect();
        let prices = (0..days).map(|i| 100.0 + i as f64).collect();
        PricePanel::from_columns(dates, vec!["AAPL".to_string()], vec![prices]).unwrap()
    }

    #[test]
    fn test_total_return() {
        let panel = daily_panel(ymd(2024, 1, 1), 11);
        let tr = total_return(&panel, ymd(2024, 1, 1), ymd(2024, 1, 11)).unwrap();
        assert_relative_eq!(tr.get("AAPL").unwrap(), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_total_return_requires_panel_dates() {
        let panel = daily_panel(ymd(2024, 1, 1), 5);
        let result = total_return(&panel, ymd(2023, 12, 31), ymd(2024, 1, 5));
        assert!(matches!(result, Err(Error::DateNotInPanel(d)) if d == ymd(2023, 12, 31)));
    }

    #[test]
    fn test_annualized_return_is_linear() {
        let panel = PricePanel::from_columns(
            (1..=6).map(|d| ymd(2024, 2, d)).collect(),
            vec!["A".to_string()],
            vec![vec![100.0, 101.0, 99.5, 102.0, 103.1, 102.7]],
        )
        .unwrap();
        let returns = calculate_returns(&panel);
        let base = annualized_return(&returns).get("A").unwrap();

        let scaled: Vec<f64> = returns.column("A").unwrap().iter().map(|r| r * 3.0).collect();
        let scaled =
            ReturnsPanel::from_returns(returns.dates().to_vec(), vec!["A".to_string()], vec![scaled])
                .unwrap();

        assert_relative_eq!(annualized_return(&scaled).get("A").unwrap(), 3.0 * base, epsilon = 1e-9);
    }

    #[test]
    fn test_summary_has_all_periods_in_order() {
        // Six years of daily rows ending 2025-06-30
        let start = ymd(2019, 6, 30);
        let panel = daily_panel(start, 2193);
        assert_eq!(panel.last_date(), Some(ymd(2025, 6, 30)));

        let rows = performance_summary(&panel, start, LookbackBasis::CalendarDays);
        let labels: Vec<&str> = rows.iter().map(|r| r.period.as_str()).collect();
        assert_eq!(labels, PERIOD_LABELS);

        assert_eq!(rows[0].anchor, ymd(2025, 5, 31));
        assert_eq!(rows[2].anchor, ymd(2025, 1, 1));
        assert_eq!(rows[3].anchor, ymd(2024, 10, 21));
        assert_eq!(rows[6].anchor, start);
    }

    #[test]
    fn test_summary_values_rounded() {
        let panel = PricePanel::from_columns(
            vec![ymd(2024, 1, 2), ymd(2024, 1, 3), ymd(2024, 1, 4)],
            vec!["A".to_string()],
            vec![vec![3.0, 3.5, 4.0]],
        )
        .unwrap();

        let rows = performance_summary(&panel, ymd(2024, 1, 2), LookbackBasis::CalendarDays);
        // 4 / 3 - 1 = 33.333...%
        assert_eq!(rows[0].get("A"), Some(33.33));
    }

    #[test]
    fn test_inception_before_panel_clamps_to_first_date() {
        let panel = daily_panel(ymd(2024, 3, 1), 20);
        let rows = performance_summary(&panel, ymd(2010, 1, 1), LookbackBasis::CalendarDays);

        let inception = rows.iter().find(|r| r.period == "Inception").unwrap();
        assert_eq!(inception.anchor, ymd(2024, 3, 1));
    }

    #[test]
    fn test_inception_snaps_forward_to_next_date() {
        let panel = PricePanel::from_columns(
            vec![ymd(2024, 1, 2), ymd(2024, 1, 5), ymd(2024, 1, 8)],
            vec!["A".to_string()],
            vec![vec![10.0, 11.0, 12.0]],
        )
        .unwrap();

        let rows = performance_summary(&panel, ymd(2024, 1, 3), LookbackBasis::CalendarDays);
        let inception = rows.iter().find(|r| r.period == "Inception").unwrap();
        assert_eq!(inception.anchor, ymd(2024, 1, 5));
        assert!(inception.anchor >= ymd(2024, 1, 3));
    }

    #[test]
    fn test_inception_after_last_date_is_omitted() {
        let panel = daily_panel(ymd(2024, 3, 1), 10);
        let rows = performance_summary(&panel, ymd(2025, 1, 1), LookbackBasis::CalendarDays);
        assert!(rows.iter().all(|r| r.period != "Inception"));
        assert_eq!(rows.len(), 6);
    }

    #[test]
    fn test_trading_rows_basis_counts_rows() {
        // Weekday-only rows: 252 rows back is about a calendar year
        let mut dates = Vec::new();
        let mut day = ymd(2022, 1, 3);
        while dates.len() < 600 {
            if day.weekday().num_days_from_monday() < 5 {
                dates.push(day);
            }
            day = day + Days::new(1);
        }
        let prices = (0..dates.len()).map(|i| 50.0 + i as f64 * 0.1).collect();
        let panel = PricePanel::from_columns(dates.clone(), vec!["A".to_string()], vec![prices])
            .unwrap();

        let rows = performance_summary(&panel, dates[0], LookbackBasis::TradingRows);
        let one_year = rows.iter().find(|r| r.period == "1Y").unwrap();
        assert_eq!(one_year.anchor, dates[599 - 252]);

        let calendar = performance_summary(&panel, dates[0], LookbackBasis::CalendarDays);
        let one_year_calendar = calendar.iter().find(|r| r.period == "1Y").unwrap();
        assert!(one_year_calendar.anchor > one_year.anchor);
    }

    #[test]
    fn test_single_row_panel_has_no_rows() {
        let panel = daily_panel(ymd(2024, 3, 1), 1);
        assert!(performance_summary(&panel, ymd(2024, 3, 1), LookbackBasis::CalendarDays).is_empty());
    }

    #[test]
    fn test_empty_panel_has_no_rows() {
        let panel = PricePanel::empty(vec!["A".to_string()]);
        assert!(performance_summary(&panel, ymd(2024, 3, 1), LookbackBasis::CalendarDays).is_empty());
    }
}
