//! Built-in strategies.

pub mod advanced_scalp;
pub mod classic;
pub mod image_based;

use crate::domain::error::ScalptraderError;
use crate::domain::strategy::Strategy;

/// MACD histogram above which a long is closed on a bullish HA flip.
pub const EXIT_LONG_HISTOGRAM: f64 = 15.0;
/// MACD histogram below which a short is closed on a bearish HA flip.
pub const EXIT_SHORT_HISTOGRAM: f64 = -12.0;

pub const NAMES: [&str; 3] = [image_based::NAME, classic::NAME, advanced_scalp::NAME];

/// Build a preset by name with its default parameters.
pub fn by_name(name: &str) -> Result<Strategy, ScalptraderError> {
    let strategy = match name.trim().to_lowercase().as_str() {
        image_based::NAME => image_based::strategy()?,
        classic::NAME => classic::strategy()?,
        advanced_scalp::NAME => advanced_scalp::strategy()?,
        _ => {
            return Err(ScalptraderError::UnknownStrategy {
                name: name.to_string(),
                available: NAMES.join(", "),
            });
        }
    };
    strategy.validate()?;
    Ok(strategy)
}
