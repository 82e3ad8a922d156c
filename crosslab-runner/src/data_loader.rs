//! Price loading for the runner.
//!
//! Resolves a symbol to a [`PriceSeries`] with a simple fallback policy:
//! 1. If a CSV path is given → read it
//! 2. If not, and `synthetic` is set → generate a synthetic series (tagged)
//! 3. Otherwise → fail with a clear error
//!
//! No network access happens here. Synthetic data is a developer-only mode;
//! results produced on it carry `has_synthetic = true`.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crosslab_core::{BacktestError, PricePoint, PriceSeries};

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in '{path}': {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("'{path}' has no {column} column")]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("'{path}' line {line}: {reason}")]
    BadRow {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("no data source for '{symbol}' (set a CSV file or enable synthetic data)")]
    NoSource { symbol: String },

    #[error("no prices for '{symbol}' in the requested date range")]
    Empty { symbol: String },

    #[error("invalid price series: {0}")]
    Series(#[from] BacktestError),
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Csv,
    Synthetic,
}

/// Options controlling how prices are loaded.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// First date to keep (inclusive).
    pub start: Option<NaiveDate>,
    /// Last date to keep (inclusive).
    pub end: Option<NaiveDate>,
    /// CSV file with `date` and `close` columns.
    pub csv: Option<PathBuf>,
    /// Generate a synthetic series when no CSV is given.
    pub synthetic: bool,
}

/// Result of loading prices, including provenance.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub series: PriceSeries,
    pub source: DataSource,
    /// BLAKE3 hash over symbol, dates and prices, for fingerprinting.
    pub dataset_hash: String,
    pub has_synthetic: bool,
}

/// Synthetic range used when the config gives no dates.
const DEFAULT_SYNTHETIC_START: (i32, u32, u32) = (2020, 1, 1);
const DEFAULT_SYNTHETIC_END: (i32, u32, u32) = (2023, 12, 31);

/// Load prices for `symbol` according to `opts`, trimmed to the date range.
pub fn load_prices(symbol: &str, opts: &LoadOptions) -> Result<LoadedData, LoadError> {
    let (series, source) = if let Some(path) = &opts.csv {
        debug!(symbol, path = %path.display(), "loading CSV prices");
        (load_csv(path)?, DataSource::Csv)
    } else if opts.synthetic {
        warn!(symbol, "generating synthetic data; results will be tagged as synthetic");
        let start = opts.start.unwrap_or_else(|| ymd(DEFAULT_SYNTHETIC_START));
        let end = opts.end.unwrap_or_else(|| ymd(DEFAULT_SYNTHETIC_END));
        (
            generate_synthetic_series(symbol, start, end)?,
            DataSource::Synthetic,
        )
    } else {
        return Err(LoadError::NoSource {
            symbol: symbol.to_string(),
        });
    };

    let series = series.slice_dates(opts.start, opts.end);
    if series.is_empty() {
        return Err(LoadError::Empty {
            symbol: symbol.to_string(),
        });
    }
    debug!(symbol, points = series.len(), ?source, "prices loaded");

    Ok(LoadedData {
        dataset_hash: compute_dataset_hash(symbol, &series),
        has_synthetic: source == DataSource::Synthetic,
        series,
        source,
    })
}

fn ymd((y, m, d): (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

/// Read a CSV price file from disk.
pub fn load_csv(path: &Path) -> Result<PriceSeries, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv(file, path)
}

/// Parse CSV prices from any reader. `path` only labels errors.
///
/// The header must contain a date column (`date`/`Date`) and a price column
/// (`close`/`Close`, else `adj_close`/`Adj Close`). Dates are `YYYY-MM-DD`,
/// optionally followed by a time part. An empty price cell is a missing
/// price (NaN). Rows may appear in any order; duplicates are rejected.
pub fn read_csv<R: Read>(reader: R, path: &Path) -> Result<PriceSeries, LoadError> {
    let csv_err = |source| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let find = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
    };
    let date_col = find(&["date"]).ok_or_else(|| LoadError::MissingColumn {
        path: path.to_path_buf(),
        column: "date",
    })?;
    let close_col = find(&["close", "adj_close", "adj close"]).ok_or_else(|| {
        LoadError::MissingColumn {
            path: path.to_path_buf(),
            column: "close",
        }
    })?;

    let mut points = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        let line = record.position().map_or(0, |p| p.line());
        let bad_row = |reason: String| LoadError::BadRow {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let raw_date = record.get(date_col).unwrap_or("");
        let date = parse_date(raw_date).ok_or_else(|| bad_row(format!("bad date '{raw_date}'")))?;

        let raw_close = record.get(close_col).unwrap_or("");
        let price = if raw_close.is_empty() {
            f64::NAN
        } else {
            raw_close
                .parse::<f64>()
                .map_err(|_| bad_row(format!("bad price '{raw_close}'")))?
        };
        points.push(PricePoint::new(date, price));
    }

    points.sort_by_key(|p| p.date);
    Ok(PriceSeries::new(points)?)
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw.get(..10)?, "%Y-%m-%d").ok())
}

/// Compute a deterministic BLAKE3 hash over a series.
///
/// NaN prices hash by their bit pattern, so a gap changes the hash.
pub fn compute_dataset_hash(symbol: &str, series: &PriceSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(symbol.as_bytes());
    for point in series.points() {
        hasher.update(point.date.to_string().as_bytes());
        hasher.update(&point.price.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Generate a synthetic daily close series for testing/development.
///
/// A random walk from 100.0 over weekdays in `[start, end]`, seeded from the
/// symbol name so the same symbol always yields the same series.
pub fn generate_synthetic_series(
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<PriceSeries, LoadError> {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let seed: [u8; 32] = *blake3::hash(symbol.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    let mut points = Vec::new();
    let mut price = 100.0_f64;
    let mut current = start;
    while current <= end {
        let weekday = current.weekday();
        if weekday != chrono::Weekday::Sat && weekday != chrono::Weekday::Sun {
            let daily_return: f64 = rng.gen_range(-0.03..0.03);
            price *= 1.0 + daily_return;
            points.push(PricePoint::new(current, price));
        }
        current += chrono::Duration::days(1);
    }

    Ok(PriceSeries::new(points)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn parse(text: &str) -> Result<PriceSeries, LoadError> {
        read_csv(text.as_bytes(), Path::new("test.csv"))
    }

    #[test]
    fn reads_lowercase_columns() {
        let series = parse("date,close\n2024-01-02,100.5\n2024-01-03,101.0\n").unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.prices(), vec![100.5, 101.0]);
        assert_eq!(series.first().unwrap().date, d(2024, 1, 2));
    }

    #[test]
    fn reads_yahoo_style_export() {
        let text = "Date,Open,High,Low,Close,Adj Close,Volume\n\
                    2024-01-02 00:00:00-05:00,1,2,0.5,10.0,9.5,100\n\
                    2024-01-03 00:00:00-05:00,1,2,0.5,11.0,10.5,100\n";
        let series = parse(text).unwrap();
        assert_eq!(series.prices(), vec![10.0, 11.0]);
    }

    #[test]
    fn falls_back_to_adjusted_close() {
        let series = parse("Date,Adj Close\n2024-01-02,9.5\n").unwrap();
        assert_eq!(series.prices(), vec![9.5]);
    }

    #[test]
    fn empty_close_is_missing_price() {
        let series = parse("date,close\n2024-01-02,10\n2024-01-03,\n2024-01-04,12\n").unwrap();
        assert!(series.prices()[1].is_nan());
    }

    #[test]
    fn unsorted_rows_are_sorted() {
        let series = parse("date,close\n2024-01-03,11\n2024-01-02,10\n").unwrap();
        assert_eq!(series.dates(), vec![d(2024, 1, 2), d(2024, 1, 3)]);
    }

    #[test]
    fn duplicate_dates_rejected() {
        let err = parse("date,close\n2024-01-02,10\n2024-01-02,11\n").unwrap_err();
        assert!(matches!(err, LoadError::Series(_)));
    }

    #[test]
    fn missing_close_column() {
        let err = parse("date,open\n2024-01-02,10\n").unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { column: "close", .. }));
    }

    #[test]
    fn bad_price_reports_line() {
        let err = parse("date,close\n2024-01-02,10\n2024-01-03,abc\n").unwrap_err();
        match err {
            LoadError::BadRow { line, reason, .. } => {
                assert_eq!(line, 3);
                assert!(reason.contains("abc"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_price_rejected() {
        let err = parse("date,close\n2024-01-02,-5\n").unwrap_err();
        assert!(matches!(err, LoadError::Series(_)));
    }

    #[test]
    fn synthetic_is_deterministic_per_symbol() {
        let a = generate_synthetic_series("SPY", d(2024, 1, 1), d(2024, 3, 31)).unwrap();
        let b = generate_synthetic_series("SPY", d(2024, 1, 1), d(2024, 3, 31)).unwrap();
        let c = generate_synthetic_series("QQQ", d(2024, 1, 1), d(2024, 3, 31)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a.prices(), c.prices());
    }

    #[test]
    fn synthetic_skips_weekends() {
        let series = generate_synthetic_series("SPY", d(2024, 1, 1), d(2024, 1, 14)).unwrap();
        assert_eq!(series.len(), 10);
        assert!(series
            .dates()
            .iter()
            .all(|dt| dt.weekday() != chrono::Weekday::Sat && dt.weekday() != chrono::Weekday::Sun));
    }

    #[test]
    fn load_without_source_fails() {
        let err = load_prices("SPY", &LoadOptions::default()).unwrap_err();
        assert!(err.to_string().contains("no data source"));
    }

    #[test]
    fn load_synthetic_is_tagged_and_trimmed() {
        let opts = LoadOptions {
            start: Some(d(2024, 2, 1)),
            end: Some(d(2024, 2, 29)),
            csv: None,
            synthetic: true,
        };
        let loaded = load_prices("SPY", &opts).unwrap();
        assert!(loaded.has_synthetic);
        assert_eq!(loaded.source, DataSource::Synthetic);
        assert_eq!(loaded.series.first().unwrap().date, d(2024, 2, 1));
        assert_eq!(loaded.dataset_hash.len(), 64);
    }

    #[test]
    fn dataset_hash_tracks_content() {
        let a = parse("date,close\n2024-01-02,10\n").unwrap();
        let b = parse("date,close\n2024-01-02,10.01\n").unwrap();
        assert_eq!(compute_dataset_hash("X", &a), compute_dataset_hash("X", &a));
        assert_ne!(compute_dataset_hash("X", &a), compute_dataset_hash("X", &b));
        assert_ne!(compute_dataset_hash("X", &a), compute_dataset_hash("Y", &a));
    }
}
