//! Configuration validation.
//!
//! Resolves the configured strategy, applies `[parameters]` overrides and
//! checks `[policy]` values before anything is computed.

use crate::domain::error::ScalptraderError;
use crate::domain::presets;
use crate::domain::strategy::Strategy;
use crate::ports::config_port::ConfigPort;
use tracing::info;

/// Default exchange leverage cap when `[policy] max_leverage` is absent.
pub const DEFAULT_MAX_LEVERAGE: f64 = 125.0;

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub strategy: Strategy,
    pub max_leverage: f64,
}

pub fn load_run_config(config: &dyn ConfigPort) -> Result<RunConfig, ScalptraderError> {
    let strategy = load_strategy(config)?;
    let max_leverage = validate_max_leverage(config)?;
    Ok(RunConfig {
        strategy,
        max_leverage,
    })
}

pub fn load_strategy(config: &dyn ConfigPort) -> Result<Strategy, ScalptraderError> {
    let name = match config.get_string("strategy", "name") {
        Some(s) if !s.trim().is_empty() => s,
        _ => {
            return Err(ScalptraderError::ConfigMissing {
                section: "strategy".to_string(),
                key: "name".to_string(),
            });
        }
    };
    let strategy = presets::by_name(&name)?;

    let overrides: Vec<(String, String)> = config
        .keys("parameters")
        .into_iter()
        .filter_map(|key| {
            config
                .get_string("parameters", &key)
                .map(|value| (key, value))
        })
        .collect();
    if !overrides.is_empty() {
        info!(
            strategy = strategy.name,
            count = overrides.len(),
            "applying parameter overrides"
        );
    }
    strategy.with_overrides(overrides.iter().map(|(k, v)| (k.as_str(), v.as_str())))
}

fn validate_max_leverage(config: &dyn ConfigPort) -> Result<f64, ScalptraderError> {
    let raw = match config.get_string("policy", "max_leverage") {
        None => return Ok(DEFAULT_MAX_LEVERAGE),
        Some(raw) => raw,
    };
    let invalid = |reason: &str| ScalptraderError::ConfigInvalid {
        section: "policy".to_string(),
        key: "max_leverage".to_string(),
        reason: reason.to_string(),
    };
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid("max_leverage must be a number"))?;
    if !value.is_finite() || value < 1.0 {
        return Err(invalid("max_leverage must be at least 1"));
    }
    Ok(value)
}
