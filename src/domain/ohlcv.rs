//! OHLCV bar representation and the validated columnar view used by the
//! indicator engine.

use crate::domain::error::ScalptraderError;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    /// (open + high + low + close) / 4
    pub fn ohlc4(&self) -> f64 {
        (self.open + self.high + self.low + self.close) / 4.0
    }
}

/// Struct-of-arrays view over a validated, strictly ascending bar sequence.
///
/// The only way to build one is [`Candles::from_bars`], so every `Candles`
/// value has finite prices and monotonic timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct Candles {
    pub timestamps: Vec<DateTime<Utc>>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
    pub volume: Vec<f64>,
}

impl Candles {
    pub fn from_bars(bars: &[PriceBar]) -> Result<Self, ScalptraderError> {
        let mut candles = Candles {
            timestamps: Vec::with_capacity(bars.len()),
            open: Vec::with_capacity(bars.len()),
            high: Vec::with_capacity(bars.len()),
            low: Vec::with_capacity(bars.len()),
            close: Vec::with_capacity(bars.len()),
            volume: Vec::with_capacity(bars.len()),
        };

        for (index, bar) in bars.iter().enumerate() {
            if let Some(&previous) = candles.timestamps.last() {
                if bar.timestamp <= previous {
                    return Err(ScalptraderError::NonMonotonicTimestamp {
                        index,
                        previous,
                        current: bar.timestamp,
                    });
                }
            }
            for (field, value) in [
                ("open", bar.open),
                ("high", bar.high),
                ("low", bar.low),
                ("close", bar.close),
                ("volume", bar.volume),
            ] {
                if !value.is_finite() {
                    return Err(ScalptraderError::InvalidPrice {
                        index,
                        field,
                        value,
                    });
                }
            }

            candles.timestamps.push(bar.timestamp);
            candles.open.push(bar.open);
            candles.high.push(bar.high);
            candles.low.push(bar.low);
            candles.close.push(bar.close);
            candles.volume.push(bar.volume);
        }

        Ok(candles)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}
