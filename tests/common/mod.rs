#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
pub use scalptrader::domain::ohlcv::PriceBar;
use scalptrader::domain::error::ScalptraderError;
use scalptrader::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, pair: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(pair.to_string(), bars);
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, pair: &str) -> Result<Vec<PriceBar>, ScalptraderError> {
        self.data
            .get(pair)
            .cloned()
            .ok_or_else(|| ScalptraderError::Data {
                reason: format!("no data for {}", pair),
            })
    }

    fn list_pairs(&self) -> Result<Vec<String>, ScalptraderError> {
        let mut pairs: Vec<String> = self.data.keys().cloned().collect();
        pairs.sort();
        Ok(pairs)
    }
}

pub fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 25, 9, 0, 0).unwrap()
}

pub fn make_bar(minute: i64, open: f64, high: f64, low: f64, close: f64) -> PriceBar {
    PriceBar {
        timestamp: start() + Duration::minutes(minute),
        open,
        high,
        low,
        close,
        volume: 1_000.0,
    }
}

/// One-minute bars from closes; open is the previous close, wicks 0.5 out.
pub fn bars_from_closes(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            let open = if i == 0 { c } else { closes[i - 1] };
            make_bar(i as i64, open, open.max(c) + 0.5, open.min(c) - 0.5, c)
        })
        .collect()
}

pub fn flat_bars(n: usize, price: f64) -> Vec<PriceBar> {
    (0..n)
        .map(|i| make_bar(i as i64, price, price, price, price))
        .collect()
}

/// Deterministic choppy series around 100 with a slow drift.
pub fn choppy_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| {
            let x = i as f64;
            100.0 + (x * 0.31).sin() * 4.0 + (x * 0.07).cos() * 6.0 + x * 0.01
        })
        .collect()
}

pub fn choppy_bars(n: usize) -> Vec<PriceBar> {
    bars_from_closes(&choppy_closes(n))
}

/// Trending legs of 40 per bar around 20000, broken by single-bar counter
/// moves large enough to flip Heikin-Ashi colour mid-trend.
pub fn swing_closes() -> Vec<f64> {
    const STEP: f64 = 40.0;
    const LEGS: [(usize, f64); 13] = [
        (30, 1.0),
        (12, -1.0),
        (1, 4.0),
        (1, -7.0),
        (10, -1.0),
        (6, 1.0),
        (1, -4.0),
        (1, 7.0),
        (6, 1.0),
        (20, -1.0),
        (1, 4.0),
        (1, -7.0),
        (8, -1.0),
    ];
    let mut closes = vec![20_000.0];
    for (count, moves) in LEGS {
        for _ in 0..count {
            let last = closes[closes.len() - 1];
            closes.push(last + STEP * moves);
        }
    }
    closes
}

pub fn swing_bars() -> Vec<PriceBar> {
    bars_from_closes(&swing_closes())
}
