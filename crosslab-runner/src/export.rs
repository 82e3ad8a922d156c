//! Artifact export: JSON round-trip and CSV tables.
//!
//! All persisted artifacts include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use crosslab_core::{ChartData, Trade};

use crate::runner::{RunResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `RunResult` to pretty JSON.
pub fn export_json(result: &RunResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize RunResult to JSON")
}

/// Deserialize a `RunResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunResult> {
    let result: RunResult =
        serde_json::from_str(json).context("failed to deserialize RunResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the trade log as CSV.
///
/// Columns: date, index, type, price, shares, value, commission, cash_after,
/// portfolio_value_after
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "date",
        "index",
        "type",
        "price",
        "shares",
        "value",
        "commission",
        "cash_after",
        "portfolio_value_after",
    ])?;
    for t in trades {
        let side = if t.is_buy() { "BUY" } else { "SELL" };
        wtr.write_record([
            t.date.to_string(),
            t.index.to_string(),
            side.to_string(),
            format!("{:.6}", t.price),
            t.shares.to_string(),
            format!("{:.2}", t.value),
            format!("{:.2}", t.commission),
            format!("{:.2}", t.cash_after),
            format!("{:.2}", t.portfolio_value_after),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the per-day chart series as CSV.
///
/// Columns: date, price, short_ma, long_ma, portfolio_value. Undefined values
/// are already 0 in the chart data.
pub fn export_portfolio_csv(chart: &ChartData) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "price", "short_ma", "long_ma", "portfolio_value"])?;
    for (i, date) in chart.dates.iter().enumerate() {
        wtr.write_record([
            date.to_string(),
            format!("{:.6}", value_at(&chart.prices, i)),
            format!("{:.6}", value_at(&chart.short_ma, i)),
            format!("{:.6}", value_at(&chart.long_ma, i)),
            format!("{:.2}", value_at(&chart.portfolio_values, i)),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn value_at(values: &[f64], i: usize) -> f64 {
    values.get(i).copied().unwrap_or(0.0)
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a single run.
///
/// Creates a directory named `{symbol}_{run_id prefix}/` under `output_dir`
/// containing:
/// - `result.json`: the full `RunResult`
/// - `trades.csv`: trade log
/// - `portfolio.csv`: day-by-day prices, averages and portfolio value
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &RunResult, output_dir: &Path) -> Result<PathBuf> {
    let prefix: String = result.run_id.chars().take(12).collect();
    let run_dir = output_dir.join(format!("{}_{}", result.symbol, prefix));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("result.json"), export_json(result)?)?;
    std::fs::write(
        run_dir.join("trades.csv"),
        export_trades_csv(&result.report.trades)?,
    )?;
    std::fs::write(
        run_dir.join("portfolio.csv"),
        export_portfolio_csv(&result.report.chart_data)?,
    )?;

    Ok(run_dir)
}

/// Load a `RunResult` from an artifact directory's result.json.
pub fn load_artifacts(dir: &Path) -> Result<RunResult> {
    let path = dir.join("result.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
