//! Property tests for sweeps and synthetic data.

use chrono::NaiveDate;
use crosslab_core::BacktestParams;
use crosslab_runner::config::DataSection;
use crosslab_runner::data_loader::{compute_dataset_hash, generate_synthetic_series};
use crosslab_runner::{run_sweep, BacktestConfig, DataSource, LoadedData, ParamGrid};
use proptest::prelude::*;

fn arb_symbol() -> impl Strategy<Value = String> {
    "[A-Z]{1,5}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn synthetic_series_is_positive_and_reproducible(symbol in arb_symbol(), days in 1i64..400) {
        let start = NaiveDate::from_ymd_opt(2021, 3, 1).unwrap();
        let end = start + chrono::Duration::days(days);
        let a = generate_synthetic_series(&symbol, start, end).unwrap();
        let b = generate_synthetic_series(&symbol, start, end).unwrap();
        prop_assert!(a.prices().iter().all(|p| p.is_finite() && *p > 0.0));
        prop_assert_eq!(compute_dataset_hash(&symbol, &a), compute_dataset_hash(&symbol, &b));
    }

    #[test]
    fn sweep_covers_exactly_the_valid_pairs(
        shorts in prop::collection::vec(1usize..30, 1..4),
        longs in prop::collection::vec(2usize..80, 1..4),
    ) {
        let series = generate_synthetic_series(
            "GRID",
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
        )
        .unwrap();
        let loaded = LoadedData {
            dataset_hash: compute_dataset_hash("GRID", &series),
            series,
            source: DataSource::Synthetic,
            has_synthetic: true,
        };
        let base = BacktestConfig::new("GRID", &BacktestParams::default(), DataSection::default());
        let grid = ParamGrid::new(shorts, longs);

        let sweep = run_sweep(&base, &loaded, &grid).unwrap();
        prop_assert_eq!(sweep.len() + sweep.skipped.len(), grid.size());
        for r in &sweep.results {
            prop_assert!(r.params.short_period < r.params.long_period);
            prop_assert!(r.params.long_period <= loaded.series.len());
        }
    }
}
