//! Domain error types.
//!
//! Indicator and rule edge cases never produce errors; they fall back to
//! "undefined" / `false`. Everything here is a rejection at the pipeline
//! boundary: malformed bars, bad parameters, bad configuration.

use chrono::{DateTime, Utc};

/// Top-level error type for scalptrader.
#[derive(Debug, thiserror::Error)]
pub enum ScalptraderError {
    #[error("bar {index}: timestamp {current} is not after previous timestamp {previous}")]
    NonMonotonicTimestamp {
        index: usize,
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },

    #[error("bar {index}: {field} is not a finite number ({value})")]
    InvalidPrice {
        index: usize,
        field: &'static str,
        value: f64,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("unknown parameter '{name}'")]
    UnknownParameter { name: String },

    #[error("parameter '{name}' expects a {expected} value, got '{got}'")]
    ParameterType {
        name: String,
        expected: &'static str,
        got: String,
    },

    #[error("parameter '{name}' = {value} is outside [{low}, {high}]")]
    ParameterOutOfRange {
        name: String,
        value: f64,
        low: f64,
        high: f64,
    },

    #[error("invalid period for {indicator}: {reason}")]
    InvalidPeriod { indicator: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("unknown strategy '{name}' (available: {available})")]
    UnknownStrategy { name: String, available: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScalptraderError> for std::process::ExitCode {
    fn from(err: &ScalptraderError) -> Self {
        let code: u8 = match err {
            ScalptraderError::Io(_) => 1,
            ScalptraderError::ConfigParse { .. }
            | ScalptraderError::ConfigMissing { .. }
            | ScalptraderError::ConfigInvalid { .. } => 2,
            ScalptraderError::NonMonotonicTimestamp { .. }
            | ScalptraderError::InvalidPrice { .. }
            | ScalptraderError::Data { .. } => 3,
            ScalptraderError::UnknownParameter { .. }
            | ScalptraderError::ParameterType { .. }
            | ScalptraderError::ParameterOutOfRange { .. }
            | ScalptraderError::InvalidPeriod { .. } => 4,
            ScalptraderError::UnknownStrategy { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
