//! Artifact bundle written by a real run, read back from disk.

use crosslab_core::BacktestParams;
use crosslab_runner::config::DataSection;
use crosslab_runner::export::{export_json, import_json, load_artifacts, save_artifacts};
use crosslab_runner::{run_single_backtest, BacktestConfig, RunResult};

fn synthetic_run() -> RunResult {
    let params = BacktestParams {
        short_period: 10,
        long_period: 30,
        ..BacktestParams::default()
    };
    let data = DataSection {
        csv: None,
        synthetic: true,
    };
    run_single_backtest(&BacktestConfig::new("SYN", &params, data)).unwrap()
}

fn assert_same_run(a: &RunResult, b: &RunResult) {
    assert_eq!(a.schema_version, b.schema_version);
    assert_eq!(a.run_id, b.run_id);
    assert_eq!(a.symbol, b.symbol);
    assert_eq!(a.dataset_hash, b.dataset_hash);
    assert_eq!(a.cross_summary, b.cross_summary);
    assert_eq!(a.report.trades.len(), b.report.trades.len());
    for (x, y) in a.report.trades.iter().zip(&b.report.trades) {
        assert_eq!(x.side, y.side);
        assert_eq!(x.shares, y.shares);
        assert_eq!(x.date, y.date);
    }
    let (ma, mb) = (&a.report.performance_metrics, &b.report.performance_metrics);
    assert_eq!(ma.num_trades, mb.num_trades);
    assert!((ma.final_portfolio_value - mb.final_portfolio_value).abs() < 1e-6);
    assert!((ma.sharpe_ratio - mb.sharpe_ratio).abs() < 1e-9);
}

#[test]
fn json_roundtrip() {
    let result = synthetic_run();
    let json = export_json(&result).unwrap();
    assert!(json.contains("\"schema_version\": 1"));
    assert!(json.contains("\"performance_metrics\""));
    assert!(json.contains("\"chart_data\""));
    let back = import_json(&json).unwrap();
    assert_same_run(&result, &back);
}

#[test]
fn json_rejects_future_schema() {
    let result = synthetic_run();
    let json = export_json(&result)
        .unwrap()
        .replace("\"schema_version\": 1", "\"schema_version\": 99");
    let err = import_json(&json).unwrap_err();
    assert!(err.to_string().contains("unsupported schema version"));
}

#[test]
fn json_without_schema_version_defaults_to_current() {
    let result = synthetic_run();
    let json = export_json(&result)
        .unwrap()
        .replace("\"schema_version\": 1,", "");
    assert_eq!(import_json(&json).unwrap().schema_version, 1);
}

#[test]
fn save_load_artifacts_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let result = synthetic_run();
    let run_dir = save_artifacts(&result, dir.path()).unwrap();

    assert!(run_dir.join("result.json").exists());
    assert!(run_dir.join("trades.csv").exists());
    assert!(run_dir.join("portfolio.csv").exists());
    assert!(run_dir
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("SYN_"));

    let portfolio = std::fs::read_to_string(run_dir.join("portfolio.csv")).unwrap();
    assert_eq!(
        portfolio.lines().count(),
        result.report.chart_data.dates.len() + 1
    );
    let trades = std::fs::read_to_string(run_dir.join("trades.csv")).unwrap();
    assert_eq!(trades.lines().count(), result.report.trades.len() + 1);

    let loaded = load_artifacts(&run_dir).unwrap();
    assert_same_run(&result, &loaded);
}
