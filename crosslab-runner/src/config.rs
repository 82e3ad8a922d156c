//! TOML backtest configuration.
//!
//! ```toml
//! [backtest]
//! symbol = "SPY"
//! start_date = "2020-01-01"
//! end_date = "2023-12-31"
//!
//! [strategy]
//! short_period = 50
//! long_period = 200
//!
//! [account]
//! initial_capital = 100000.0
//! commission = 0.001
//! lot_size = 1
//!
//! [data]
//! csv = "data/SPY.csv"
//! synthetic = false
//! ```
//!
//! Every section except `[backtest]` may be omitted and falls back to the
//! defaults of [`BacktestParams`].

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crosslab_core::{BacktestError, BacktestParams};

/// Unique identifier for a backtest run (content-addressable hash).
pub type RunId = String;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("backtest.symbol must not be empty")]
    MissingSymbol,

    #[error("start_date {start} is after end_date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error(transparent)]
    Invalid(#[from] BacktestError),
}

/// Complete configuration for one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    #[serde(default)]
    pub strategy: StrategySection,
    #[serde(default)]
    pub account: AccountSection,
    #[serde(default)]
    pub data: DataSection,
}

/// What to backtest and over which dates (both bounds inclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestSection {
    pub symbol: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySection {
    pub short_period: usize,
    pub long_period: usize,
}

impl Default for StrategySection {
    fn default() -> Self {
        let params = BacktestParams::default();
        Self {
            short_period: params.short_period,
            long_period: params.long_period,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountSection {
    pub initial_capital: f64,
    pub commission: f64,
    pub lot_size: u64,
}

impl Default for AccountSection {
    fn default() -> Self {
        let params = BacktestParams::default();
        Self {
            initial_capital: params.initial_capital,
            commission: params.commission,
            lot_size: params.lot_size,
        }
    }
}

/// Where prices come from. With no `csv`, `synthetic = true` generates a
/// deterministic random walk instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    pub csv: Option<PathBuf>,
    pub synthetic: bool,
}

impl BacktestConfig {
    /// Build a config from explicit parameters, as the CLI does without a file.
    pub fn new(symbol: impl Into<String>, params: &BacktestParams, data: DataSection) -> Self {
        Self {
            backtest: BacktestSection {
                symbol: symbol.into(),
                start_date: None,
                end_date: None,
            },
            strategy: StrategySection {
                short_period: params.short_period,
                long_period: params.long_period,
            },
            account: AccountSection {
                initial_capital: params.initial_capital,
                commission: params.commission,
                lot_size: params.lot_size,
            },
            data,
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Check everything that can be checked before prices are loaded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.symbol.trim().is_empty() {
            return Err(ConfigError::MissingSymbol);
        }
        if let (Some(start), Some(end)) = (self.backtest.start_date, self.backtest.end_date) {
            if start > end {
                return Err(ConfigError::InvalidDateRange { start, end });
            }
        }
        // Series length is unknown until load; the runner re-validates against it.
        self.to_params().validate(usize::MAX)?;
        Ok(())
    }

    pub fn to_params(&self) -> BacktestParams {
        BacktestParams {
            short_period: self.strategy.short_period,
            long_period: self.strategy.long_period,
            initial_capital: self.account.initial_capital,
            commission: self.account.commission,
            lot_size: self.account.lot_size,
        }
    }

    /// BLAKE3 fingerprint of the config alone.
    ///
    /// Covers the CSV *path*, not the file contents, so it identifies what was
    /// asked for rather than what was run. Use [`Self::run_id`] to key results.
    pub fn config_id(&self) -> RunId {
        self.hasher().finalize().to_hex().to_string()
    }

    /// Deterministic id of a run: the config fingerprint combined with the
    /// hash of the prices it ran on.
    ///
    /// Re-running the same config on the same data yields the same id, so the
    /// result store deduplicates repeated runs. Editing the CSV behind an
    /// unchanged path yields a new id.
    pub fn run_id(&self, dataset_hash: &str) -> RunId {
        let mut hasher = self.hasher();
        hasher.update(b"\0dataset:");
        hasher.update(dataset_hash.as_bytes());
        hasher.finalize().to_hex().to_string()
    }

    fn hasher(&self) -> blake3::Hasher {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.backtest.symbol.as_bytes());
        for date in [self.backtest.start_date, self.backtest.end_date] {
            match date {
                Some(d) => hasher.update(d.to_string().as_bytes()),
                None => hasher.update(b"-"),
            };
        }
        hasher.update(&(self.strategy.short_period as u64).to_le_bytes());
        hasher.update(&(self.strategy.long_period as u64).to_le_bytes());
        hasher.update(&self.account.initial_capital.to_le_bytes());
        hasher.update(&self.account.commission.to_le_bytes());
        hasher.update(&self.account.lot_size.to_le_bytes());
        match &self.data.csv {
            Some(path) => hasher.update(path.to_string_lossy().as_bytes()),
            None => hasher.update(b"-"),
        };
        hasher.update(&[u8::from(self.data.synthetic)]);
        hasher
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
        [backtest]
        symbol = "SPY"
        start_date = "2020-01-01"
        end_date = "2023-12-31"

        [strategy]
        short_period = 20
        long_period = 100

        [account]
        initial_capital = 50000.0
        commission = 0.002
        lot_size = 10

        [data]
        csv = "data/SPY.csv"
    "#;

    #[test]
    fn parses_full_config() {
        let config = BacktestConfig::from_toml(FULL).unwrap();
        assert_eq!(config.backtest.symbol, "SPY");
        assert_eq!(config.backtest.start_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(config.strategy.short_period, 20);
        assert_eq!(config.account.lot_size, 10);
        assert_eq!(config.data.csv, Some(PathBuf::from("data/SPY.csv")));
        assert!(!config.data.synthetic);

        let params = config.to_params();
        assert_eq!(params.long_period, 100);
        assert_eq!(params.initial_capital, 50_000.0);
        assert_eq!(params.commission, 0.002);
    }

    #[test]
    fn omitted_sections_use_defaults() {
        let config = BacktestConfig::from_toml("[backtest]\nsymbol = \"QQQ\"\n").unwrap();
        assert_eq!(config.to_params(), BacktestParams::default());
        assert_eq!(config.data, DataSection::default());
    }

    #[test]
    fn rejects_inverted_periods() {
        let text = "[backtest]\nsymbol = \"SPY\"\n[strategy]\nshort_period = 200\nlong_period = 50\n";
        let err = BacktestConfig::from_toml(text).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_inverted_dates() {
        let text = "[backtest]\nsymbol = \"SPY\"\nstart_date = \"2024-01-01\"\nend_date = \"2023-01-01\"\n";
        let err = BacktestConfig::from_toml(text).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDateRange { .. }));
    }

    #[test]
    fn rejects_blank_symbol() {
        let err = BacktestConfig::from_toml("[backtest]\nsymbol = \"  \"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingSymbol));
    }

    #[test]
    fn rejects_bad_commission() {
        let text = "[backtest]\nsymbol = \"SPY\"\n[account]\ncommission = 1.5\n";
        let err = BacktestConfig::from_toml(text).unwrap_err();
        assert!(err.to_string().contains("commission"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = BacktestConfig::from_toml("[backtest\nsymbol = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = BacktestConfig::from_file(Path::new("/nonexistent/crosslab.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn config_id_deterministic() {
        let a = BacktestConfig::from_toml(FULL).unwrap();
        let b = BacktestConfig::from_toml(FULL).unwrap();
        assert_eq!(a.config_id(), b.config_id());
        assert_eq!(a.config_id().len(), 64);
    }

    #[test]
    fn config_id_changes_with_params() {
        let a = BacktestConfig::from_toml(FULL).unwrap();
        let mut b = a.clone();
        b.strategy.short_period = 21;
        let mut c = a.clone();
        c.backtest.end_date = None;
        assert_ne!(a.config_id(), b.config_id());
        assert_ne!(a.config_id(), c.config_id());
    }

    #[test]
    fn run_id_depends_on_dataset_hash() {
        let config = BacktestConfig::from_toml(FULL).unwrap();
        let before = config.run_id("aaaa");
        assert_eq!(before, config.run_id("aaaa"));
        assert_eq!(before.len(), 64);
        assert_ne!(before, config.run_id("bbbb"));
        assert_ne!(before, config.config_id());

        let mut other = config.clone();
        other.strategy.long_period = 100;
        assert_ne!(before, other.run_id("aaaa"));
    }

    #[test]
    fn new_mirrors_params() {
        let params = BacktestParams {
            short_period: 5,
            long_period: 20,
            ..BacktestParams::default()
        };
        let config = BacktestConfig::new("AAPL", &params, DataSection::default());
        assert_eq!(config.to_params(), params);
        assert!(config.validate().is_ok());
    }
}
