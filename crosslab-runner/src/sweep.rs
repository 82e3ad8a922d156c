//! Parameter sweep over (short, long) period grids.


use rayon::prelude::*;
use tracing::{debug, info};

use crate::config::BacktestConfig;
use crate::data_loader::LoadedData;
use crate::runner::{run_backtest_from_data, RunError, RunResult};
use crate::store::ResultStore;

/// Period grid to sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamGrid {
    pub short_periods: Vec<usize>,
    pub long_periods: Vec<usize>,
}

impl ParamGrid {
    pub fn new(short_periods: Vec<usize>, long_periods: Vec<usize>) -> Self {
        Self {
            short_periods,
            long_periods,
        }
    }

    /// Short periods: 10, 20, 50
    /// Long periods: 100, 150, 200
    pub fn ma_crossover_default() -> Self {
        Self::new(vec![10, 20, 50], vec![100, 150, 200])
    }

    /// Valid (short, long) pairs in grid order. Pairs with `short >= long`
    /// or a zero period are skipped.
    pub fn pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for &short in &self.short_periods {
            for &long in &self.long_periods {
                if short == 0 || short >= long {
                    continue;
                }
                pairs.push((short, long));
            }
        }
        pairs
    }

    /// Number of valid pairs.
    pub fn size(&self) -> usize {
        self.pairs().len()
    }
}

/// Results of a sweep, in grid order.
#[derive(Debug, Clone, Default)]
pub struct SweepResults {
    pub results: Vec<RunResult>,
    /// Pairs not run because the series is shorter than the long period.
    pub skipped: Vec<(usize, usize)>,
}

impl SweepResults {
    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Highest total return; ties go to the earlier pair in grid order.
    pub fn best_by_return(&self) -> Option<&RunResult> {
        self.results.iter().reduce(|best, r| {
            let m = |x: &RunResult| x.report.performance_metrics.total_return_pct;
            if m(r) > m(best) {
                r
            } else {
                best
            }
        })
    }

    /// Highest Sharpe ratio; ties go to the earlier pair in grid order.
    pub fn best_by_sharpe(&self) -> Option<&RunResult> {
        self.results.iter().reduce(|best, r| {
            let m = |x: &RunResult| x.report.performance_metrics.sharpe_ratio;
            if m(r) > m(best) {
                r
            } else {
                best
            }
        })
    }

    /// Move every result into `store`, in grid order.
    pub fn store_into(self, store: &mut ResultStore) {
        for result in self.results {
            store.put(result);
        }
    }

    /// One line per pair: periods, trades, return, drawdown, Sharpe.
    pub fn to_table(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!(
            "{:>6}  {:>6}  {:>7}  {:>10}  {:>10}  {:>8}\n",
            "short", "long", "trades", "return%", "maxdd%", "sharpe"
        ));
        for r in &self.results {
            let m = &r.report.performance_metrics;
            out.push_str(&format!(
                "{:>6}  {:>6}  {:>7}  {:>10.2}  {:>10.2}  {:>8.3}\n",
                r.params.short_period,
                r.params.long_period,
                m.num_trades,
                m.total_return_pct,
                m.max_drawdown_pct,
                m.sharpe_ratio
            ));
        }
        out
    }
}

/// Run every grid pair against the same pre-loaded prices, in parallel.
///
/// `base` supplies the symbol, account settings and data section; only the
/// periods vary. Each run is independent, so results do not depend on the
/// thread count.
pub fn run_sweep(
    base: &BacktestConfig,
    loaded: &LoadedData,
    grid: &ParamGrid,
) -> Result<SweepResults, RunError> {
    let available = loaded.series.len();
    let (runnable, skipped): (Vec<_>, Vec<_>) = grid
        .pairs()
        .into_iter()
        .partition(|&(_, long)| long <= available);
    for (short, long) in &skipped {
        debug!(short, long, available, "skipping pair: series too short");
    }

    let configs: Vec<BacktestConfig> = runnable
        .iter()
        .map(|&(short, long)| {
            let mut config = base.clone();
            config.strategy.short_period = short;
            config.strategy.long_period = long;
            config
        })
        .collect();

    let results = configs
        .par_iter()
        .map(|config| run_backtest_from_data(config, loaded))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        symbol = %base.backtest.symbol,
        runs = results.len(),
        skipped = skipped.len(),
        "sweep complete"
    );
    Ok(SweepResults { results, skipped })
}
