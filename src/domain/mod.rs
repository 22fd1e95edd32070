//! Core domain types and logic.

pub mod ohlcv;
pub mod indicator;
pub mod indicator_engine;
pub mod params;
pub mod rule;
pub mod rule_eval;
pub mod policy;
pub mod strategy;
pub mod presets;
pub mod config_validation;
pub mod error;
