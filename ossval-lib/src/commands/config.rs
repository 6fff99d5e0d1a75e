use crate::Result;
use crate::estimate::{CostModel, Methodology, Region};
use camino::{Utf8Path, Utf8PathBuf};
use core::time::Duration;
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

const CONFIG_FILE: &str = "ossval.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Labor market used to price effort
    #[serde(default)]
    pub region: Region,

    /// Maximum number of packages analyzed at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Seconds allowed to acquire one repository
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,

    #[serde(default)]
    pub methodology: Methodology,

    #[serde(default)]
    pub cost: CostConfig,
}

/// Overrides for the cost model calibration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CostConfig {
    /// Effort coefficient; the methodology's value when unset
    pub a: Option<f64>,

    /// Scale exponent; the methodology's value when unset
    pub b: Option<f64>,

    #[serde(default = "default_eaf")]
    pub eaf: f64,

    #[serde(default = "default_range_fraction")]
    pub range_fraction: f64,
}

const fn default_concurrency() -> usize {
    4
}

const fn default_acquire_timeout_secs() -> u64 {
    300
}

const fn default_eaf() -> f64 {
    1.0
}

const fn default_range_fraction() -> f64 {
    0.25
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            a: None,
            b: None,
            eaf: default_eaf(),
            range_fraction: default_range_fraction(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: Region::default(),
            concurrency: default_concurrency(),
            acquire_timeout_secs: default_acquire_timeout_secs(),
            methodology: Methodology::default(),
            cost: CostConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// Without an explicit path, `ossval.toml` in the current directory is used if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated
    pub fn load(config_path: Option<&Utf8Path>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading ossval configuration file '{path}'"))?;
            (path.to_owned(), text)
        } else {
            let path = Utf8PathBuf::from(CONFIG_FILE);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    (Utf8PathBuf::from("<built-in defaults>"), DEFAULT_CONFIG_TOML.to_string())
                }
                Err(e) => return Err(e).into_app_err_with(|| format!("reading ossval configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    pub const fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// The cost model for a methodology with this configuration's calibration applied.
    pub fn cost_model(&self, methodology: Methodology) -> CostModel {
        let base = CostModel::new(methodology);
        CostModel {
            a: self.cost.a.unwrap_or(base.a),
            b: self.cost.b.unwrap_or(base.b),
            eaf: self.cost.eaf,
            range_fraction: self.cost.range_fraction,
            ..base
        }
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range
    fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(app_err!("concurrency must be at least 1"));
        }

        for (name, value) in [("cost.a", self.cost.a), ("cost.b", self.cost.b), ("cost.eaf", Some(self.cost.eaf))] {
            if let Some(value) = value
                && value <= 0.0
            {
                return Err(app_err!("{name} must be positive, got {value}"));
            }
        }

        if !(self.cost.range_fraction > 0.0 && self.cost.range_fraction < 1.0) {
            return Err(app_err!(
                "cost.range_fraction must be between 0 and 1 (exclusive), got {}",
                self.cost.range_fraction
            ));
        }

        Ok(())
    }
}
