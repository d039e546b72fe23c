//! Engine configuration.

use crate::analytics::DEFAULT_RISK_FREE_RATE;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV_VAR: &str = "FUNDLENS_CONFIG";

/// Which dates make up the performance series.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateAxis {
    /// Dates of the first requested symbol. Empty if that symbol's lookup fails.
    #[default]
    ReferenceSymbol,
    /// Every date on which any holding has a price.
    Union,
}

/// Tunables for the analytics engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Annual risk-free rate (e.g., 0.02 for 2%)
    pub risk_free_rate: f64,
    /// TTL for cached performance series, in milliseconds
    pub cache_ttl_ms: u64,
    /// Maximum number of price lookups in flight at once
    pub max_concurrent_lookups: usize,
    /// Holdings counted for top-N concentration
    pub top_n: usize,
    /// Date axis for the performance series
    pub date_axis: DateAxis,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            cache_ttl_ms: 24 * 60 * 60 * 1000,
            max_concurrent_lookups: 8,
            top_n: 10,
            date_axis: DateAxis::ReferenceSymbol,
        }
    }
}

impl EngineConfig {
    /// Get the default config file path.
    ///
    /// Default path: `<config dir>/fundlens/config.toml`
    /// Can be overridden with the `FUNDLENS_CONFIG` environment variable.
    pub fn default_path() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return PathBuf::from(path);
        }

        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("fundlens/config.toml"))
            .unwrap_or_else(|| PathBuf::from("fundlens.toml"))
    }

    /// Load from the default path, falling back to defaults if no file exists.
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::default_path())
    }

    /// Load from a specific path, falling back to defaults if no file exists.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;

        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    /// Check that every field is usable.
    pub fn validate(&self) -> Result<()> {
        if !self.risk_free_rate.is_finite() || self.risk_free_rate < 0.0 {
            return Err(Error::InvalidInput(format!(
                "risk_free_rate must be a non-negative number, got {}",
                self.risk_free_rate
            )));
        }

        if self.max_concurrent_lookups == 0 {
            return Err(Error::InvalidInput(
                "max_concurrent_lookups must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Cache TTL as a duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_ms)
    }
}
