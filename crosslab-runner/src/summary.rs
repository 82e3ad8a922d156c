//! Human-readable summaries of a run.

use crosslab_core::{PriceSeries, Trade};

use crate::runner::RunResult;

const RULE: &str = "==================================================";

/// Percentage return from the first to the last tradable price.
///
/// 0 when the series has fewer than two tradable prices.
pub fn buy_and_hold_return_pct(series: &PriceSeries) -> f64 {
    let mut tradable = series.points().iter().filter(|p| p.is_tradable());
    let first = tradable.next();
    let last = tradable.last();
    match (first, last) {
        (Some(first), Some(last)) => (last.price - first.price) / first.price * 100.0,
        _ => 0.0,
    }
}

/// Multi-line performance summary with a buy-and-hold comparison.
pub fn generate_summary(result: &RunResult) -> String {
    let m = &result.report.performance_metrics;
    let p = &result.params;
    let mut out = String::new();

    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!("MA CROSSOVER BACKTEST SUMMARY: {}\n", result.symbol));
    out.push_str(RULE);
    out.push('\n');
    if result.has_synthetic {
        out.push_str("WARNING: synthetic data\n");
    }
    out.push_str(&format!("Strategy: MA({}) / MA({})\n", p.short_period, p.long_period));
    if let (Some(start), Some(end)) = (result.start_date, result.end_date) {
        out.push_str(&format!("Period: {start} to {end}\n"));
    }
    out.push_str(&format!("Initial Capital: ${}\n", money(m.initial_capital)));
    out.push_str(&format!("Final Portfolio Value: ${}\n", money(m.final_portfolio_value)));
    out.push_str(&format!(
        "Total Return: ${} ({:.2}%)\n",
        money(m.profit_loss),
        m.total_return_pct
    ));
    out.push_str(&format!("Annualized Return: {:.2}%\n", m.annualized_return_pct));
    out.push('\n');
    out.push_str(&format!(
        "Trading Period: {} days ({:.2} years)\n",
        m.trading_days, m.years
    ));
    out.push_str(&format!("Total Trades: {}\n", m.num_trades));
    out.push_str(&format!("  - Buy Signals: {}\n", m.num_buy_signals));
    out.push_str(&format!("  - Sell Signals: {}\n", m.num_sell_signals));
    out.push_str(&format!("Winning Trades: {}\n", m.num_winning_trades));
    out.push_str(&format!("Losing Trades: {}\n", m.num_losing_trades));
    out.push_str(&format!("Win Rate: {:.2}%\n", m.win_rate_pct));
    if !result.skipped_entries.is_empty() {
        out.push_str(&format!("Skipped Entries: {}\n", result.skipped_entries.len()));
    }
    out.push('\n');
    out.push_str(&format!("Max Drawdown: {:.2}%\n", m.max_drawdown_pct));
    out.push_str(&format!("Sharpe Ratio: {:.3}\n", m.sharpe_ratio));
    out.push('\n');
    out.push_str(&format!("Buy & Hold Return: {:.2}%\n", result.buy_and_hold_return_pct));
    out.push_str(&format!("MA Strategy Return: {:.2}%\n", m.total_return_pct));
    out.push_str(&format!("Excess Return: {:+.2}%\n", result.excess_return_pct()));
    out.push_str(RULE);
    out.push('\n');
    out
}

/// Fixed-width trade history table.
pub fn format_trade_history(trades: &[Trade]) -> String {
    if trades.is_empty() {
        return "No trades executed during this period.\n".to_string();
    }
    let mut out = String::new();
    out.push_str(&format!(
        "{:<10}  {:<4}  {:>10}  {:>8}  {:>14}  {:>10}  {:>14}\n",
        "date", "type", "price", "shares", "value", "commission", "portfolio"
    ));
    for t in trades {
        out.push_str(&format!(
            "{:<10}  {:<4}  {:>10.2}  {:>8}  {:>14.2}  {:>10.2}  {:>14.2}\n",
            t.date,
            format!("{:?}", t.side).to_uppercase(),
            t.price,
            t.shares,
            t.value,
            t.commission,
            t.portfolio_value_after
        ));
    }
    out
}

/// `1234567.891` → `1,234,567.89`.
fn money(v: f64) -> String {
    let formatted = format!("{:.2}", v.abs());
    let (int_part, frac) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if v < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{frac}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BacktestConfig, DataSection};
    use crate::data_loader::{generate_synthetic_series, DataSource, LoadedData};
    use crate::runner::run_backtest_from_data;
    use chrono::NaiveDate;
    use crosslab_core::{BacktestParams, TradeSide};

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0.0), "0.00");
        assert_eq!(money(999.5), "999.50");
        assert_eq!(money(1_234_567.891), "1,234,567.89");
        assert_eq!(money(-25_430.5), "-25,430.50");
    }

    #[test]
    fn buy_and_hold_skips_missing_prices() {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates: Vec<_> = (0..4).map(|i| base + chrono::Duration::days(i)).collect();
        let series =
            PriceSeries::from_parts(&dates, &[f64::NAN, 100.0, 120.0, f64::NAN]).unwrap();
        assert!((buy_and_hold_return_pct(&series) - 20.0).abs() < 1e-12);
    }

    #[test]
    fn buy_and_hold_needs_two_prices() {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let series = PriceSeries::from_parts(&[base], &[100.0]).unwrap();
        assert_eq!(buy_and_hold_return_pct(&series), 0.0);
    }

    #[test]
    fn empty_trade_history() {
        assert!(format_trade_history(&[]).contains("No trades"));
    }

    fn synthetic_run() -> RunResult {
        let series = generate_synthetic_series(
            "SUMM",
            NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap(),
        )
        .unwrap();
        let loaded = LoadedData {
            series,
            source: DataSource::Synthetic,
            dataset_hash: "h".into(),
            has_synthetic: true,
        };
        let config =
            BacktestConfig::new("SUMM", &BacktestParams::default(), DataSection::default());
        run_backtest_from_data(&config, &loaded).unwrap()
    }

    #[test]
    fn summary_lists_every_section() {
        let result = synthetic_run();
        let text = generate_summary(&result);

        assert!(text.ends_with('\n'));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], RULE);
        assert_eq!(lines[1], "MA CROSSOVER BACKTEST SUMMARY: SUMM");
        assert_eq!(lines[2], RULE);
        assert_eq!(lines[3], "WARNING: synthetic data");
        assert_eq!(*lines.last().unwrap(), RULE);
        for label in [
            "Strategy: MA(",
            "Period: 2022-",
            "Initial Capital: $100,000.00",
            "Annualized Return:",
            "Win Rate:",
            "Sharpe Ratio:",
            "Excess Return:",
        ] {
            assert!(text.contains(label), "missing {label:?}");
        }
        assert_eq!(lines.iter().filter(|l| l.is_empty()).count(), 3);
    }

    #[test]
    fn trade_history_has_one_line_per_trade() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let trade = |side: TradeSide, price: f64, index: usize| Trade {
            date: date + chrono::Duration::days(index as i64),
            index,
            side,
            price,
            shares: 10,
            value: 10.0 * price,
            commission: 0.0,
            cash_after: 0.0,
            portfolio_value_after: 10.0 * price,
        };
        let trades = [
            trade(TradeSide::Buy, 100.0, 0),
            trade(TradeSide::Sell, 110.0, 5),
        ];
        let table = format_trade_history(&trades);

        assert!(table.ends_with('\n'));
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("date"));
        assert!(lines[1].starts_with("2024-03-01  BUY"));
        assert!(lines[2].starts_with("2024-03-06  SELL"));
        assert!(lines[2].contains("1100.00"));
    }
}
