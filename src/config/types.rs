//! Configuration types

use serde::{Deserialize, Serialize};

use crate::common::errors::{Result, StakeError};
use crate::stakes::Strategy;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Allocation engine settings
    #[serde(default)]
    pub engine: EngineConfig,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.engine.validate()
    }
}

/// Per-deployment stake engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Granularity every pairwise amount must conform to
    #[serde(default = "default_rounding_unit")]
    pub rounding_unit: u64,
    /// Absolute minimum pairing size used by the optimized planner
    #[serde(default = "default_minimum_floor")]
    pub minimum_floor: u64,
    /// Planner to run first
    #[serde(default)]
    pub strategy: Strategy,
    /// Run the interquartile-range outlier cap before allocation
    #[serde(default)]
    pub cap_outliers: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rounding_unit: default_rounding_unit(),
            minimum_floor: default_minimum_floor(),
            strategy: Strategy::default(),
            cap_outliers: false,
        }
    }
}

impl EngineConfig {
    pub fn new(rounding_unit: u64, minimum_floor: u64, strategy: Strategy) -> Self {
        Self {
            rounding_unit,
            minimum_floor,
            strategy,
            cap_outliers: false,
        }
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_outlier_capping(mut self, enabled: bool) -> Self {
        self.cap_outliers = enabled;
        self
    }

    /// Reject configurations no allocation can satisfy
    pub fn validate(&self) -> Result<()> {
        if self.rounding_unit == 0 {
            return Err(StakeError::InvalidConfiguration(
                "rounding_unit must be positive".to_string(),
            ));
        }
        if self.minimum_floor == 0 {
            return Err(StakeError::InvalidConfiguration(
                "minimum_floor must be positive".to_string(),
            ));
        }
        if self.minimum_floor % self.rounding_unit != 0 {
            return Err(StakeError::InvalidConfiguration(format!(
                "minimum_floor {} is not a multiple of rounding_unit {}",
                self.minimum_floor, self.rounding_unit
            )));
        }
        Ok(())
    }
}

fn default_rounding_unit() -> u64 {
    10
}

fn default_minimum_floor() -> u64 {
    10
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log output format (pretty, json)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}
