//! Configuration loader

use config::{Config, Environment, File};
use std::path::Path;

use super::types::{AppConfig, AppSettings, EngineConfig};
use crate::common::errors::{Result, StakeError};
use crate::stakes::Strategy;

/// Load configuration from file and environment variables
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with APP__, e.g. APP__ENGINE__ROUNDING_UNIT)
/// 2. Configuration file (TOML format)
/// 3. Default values
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path).required(false));
        }
    }

    builder = builder.add_source(
        Environment::with_prefix("APP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config: AppConfig = builder.build()?.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

/// Load `config_path` when the file exists, otherwise fall back to `STAKES_*` variables
pub fn load(config_path: &str) -> Result<AppConfig> {
    if Path::new(config_path).exists() {
        load_config(Some(config_path))
    } else {
        load_from_env()
    }
}

/// Load configuration from environment variables only
pub fn load_from_env() -> Result<AppConfig> {
    dotenvy::dotenv().ok();

    let defaults = EngineConfig::default();
    let engine = EngineConfig {
        rounding_unit: env_number("STAKES_ROUNDING_UNIT")?.unwrap_or(defaults.rounding_unit),
        minimum_floor: env_number("STAKES_MINIMUM_FLOOR")?.unwrap_or(defaults.minimum_floor),
        strategy: match std::env::var("STAKES_STRATEGY") {
            Ok(raw) => raw.parse::<Strategy>()?,
            Err(_) => defaults.strategy,
        },
        cap_outliers: std::env::var("STAKES_CAP_OUTLIERS")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false),
    };

    let config = AppConfig {
        engine,
        settings: AppSettings {
            log_level: std::env::var("STAKES_LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            ..AppSettings::default()
        },
    };
    config.validate()?;
    Ok(config)
}

fn env_number(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|e| StakeError::Configuration(format!("{key}: {e}"))),
        Err(_) => Ok(None),
    }
}
