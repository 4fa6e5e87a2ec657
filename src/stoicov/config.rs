//! TOML configuration for the quoter and the command-line tool.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::bucket::SpreadBucket;
use super::fixed::parse_decimal;
use super::reservation::{InventoryMode, ReservationParams};
use crate::consts::PPB_DECIMALS;
use crate::{Error, Result, RiskyMode};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct QuoterConfig {
    #[serde(default)]
    pub quoter: QuoterSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QuoterSection {
    /// Exposure the pool minimizes: neutral, risky0, risky1
    #[serde(default)]
    pub risky_mode: RiskyMode,
    #[serde(default)]
    pub bucket: BucketConfig,
    /// Reservation-price centring; quotes stay on mid when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reservation: Option<ReservationConfig>,
}

impl Default for QuoterSection {
    fn default() -> Self {
        Self {
            risky_mode: RiskyMode::Neutral,
            bucket: BucketConfig::default(),
            reservation: None,
        }
    }
}

impl QuoterSection {
    /// Resolved reservation settings, `None` when the section is absent.
    pub fn reservation_params(&self) -> Result<Option<ReservationParams>> {
        self.reservation
            .as_ref()
            .map(|r| r.to_params(self.risky_mode))
            .transpose()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ReservationConfig {
    /// no_inventory, risky0_zero, risky1_zero, value_neutral.
    /// Follows risky_mode when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory_mode: Option<InventoryMode>,
    /// Decimals of asset0's native unit
    #[serde(default = "default_asset0_decimals")]
    pub asset0_decimals: u32,
    /// Horizon τ as a decimal string
    #[serde(default = "default_tau")]
    pub tau: String,
}

fn default_asset0_decimals() -> u32 {
    18
}

fn default_tau() -> String {
    "1".to_string()
}

impl Default for ReservationConfig {
    fn default() -> Self {
        Self {
            inventory_mode: None,
            asset0_decimals: default_asset0_decimals(),
            tau: default_tau(),
        }
    }
}

impl ReservationConfig {
    pub fn to_params(&self, risky_mode: RiskyMode) -> Result<ReservationParams> {
        let mode = self
            .inventory_mode
            .unwrap_or_else(|| InventoryMode::for_risky_mode(risky_mode));
        ReservationParams::new(mode, self.asset0_decimals, parse_decimal(&self.tau, PPB_DECIMALS)?)
    }
}

/// Bucket parameters as decimal strings so TOML never goes through floats.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BucketConfig {
    /// Target half-spread level in bps (e.g. "30", "7.5")
    #[serde(default = "default_level_bps")]
    pub level_bps: String,
    /// Volatility in bps
    #[serde(default = "default_stdev_bps")]
    pub stdev_bps: String,
    /// Gamma scale, 0 to disable the risk terms
    #[serde(default = "default_gamma_scale")]
    pub gamma_scale: String,
}

fn default_level_bps() -> String {
    "30".to_string()
}

fn default_stdev_bps() -> String {
    "30".to_string()
}

fn default_gamma_scale() -> String {
    "1".to_string()
}

impl Default for BucketConfig {
    fn default() -> Self {
        Self {
            level_bps: default_level_bps(),
            stdev_bps: default_stdev_bps(),
            gamma_scale: default_gamma_scale(),
        }
    }
}

impl BucketConfig {
    pub fn to_bucket(&self) -> Result<SpreadBucket> {
        SpreadBucket::from_bps(&self.level_bps, &self.stdev_bps, &self.gamma_scale)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Output format: pretty, json, compact
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl QuoterConfig {
    /// Load and validate `path`, falling back to defaults when it does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), mode = %config.quoter.risky_mode, "Loaded config");
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        self.quoter
            .bucket
            .to_bucket()
            .map_err(|e| Error::InvalidConfig(format!("[quoter.bucket] {e}")))?;
        self.quoter
            .reservation_params()
            .map_err(|e| Error::InvalidConfig(format!("[quoter.reservation] {e}")))?;
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            other => Err(Error::InvalidConfig(format!(
                "unknown log level '{other}'. Use: trace, debug, info, warn, error"
            ))),
        }
    }
}
