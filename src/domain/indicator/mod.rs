//! Technical indicator implementations.
//!
//! This module provides the columnar containers the engine fills:
//! - `Series`: `f64` values aligned with the candles, NaN marking undefined rows
//! - `Column`: typed key for a numeric indicator output (serves as HashMap key)
//! - `Flag`: typed key for a derived boolean output
//! - `IndicatorFrame`: the per-call mapping of columns and flags
//!
//! The calculations themselves live in the submodules and work on plain
//! slices so they can be chained (RSI feeds Stochastic RSI, MACD feeds its
//! own signal EMA).

pub mod ema;
pub mod heikin_ashi;
pub mod macd;
pub mod parabolic_sar;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod williams_r;

use std::collections::HashMap;
use std::fmt;

pub use ema::calculate_ema;
pub use sma::{calculate_sma, rolling_max, rolling_min};

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// A series of `len` undefined rows.
    pub fn undefined(len: usize) -> Self {
        Self {
            values: vec![f64::NAN; len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, or `None` when out of range or undefined.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().filter(|v| !v.is_nan())
    }

    pub fn last(&self) -> Option<f64> {
        self.values.len().checked_sub(1).and_then(|i| self.get(i))
    }

    /// Index of the first defined row.
    pub fn first_defined(&self) -> Option<usize> {
        self.values.iter().position(|v| !v.is_nan())
    }

    /// Bit-level equality, treating NaN rows as equal to each other.
    pub fn bit_eq(&self, other: &Series) -> bool {
        self.values.len() == other.values.len()
            && self
                .values
                .iter()
                .zip(&other.values)
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    HaOpen,
    HaClose,
    HaHigh,
    HaLow,
    Resistance,
    Rsi,
    StochRsi,
    StochRsiK,
    Macd,
    MacdSignal,
    MacdHist,
    StochK,
    StochD,
    WilliamsR,
    MaShort,
    MaLong,
    MaTrend,
    Sma,
    Psar,
}

impl Column {
    pub const ALL: [Column; 19] = [
        Column::HaOpen,
        Column::HaClose,
        Column::HaHigh,
        Column::HaLow,
        Column::Resistance,
        Column::Rsi,
        Column::StochRsi,
        Column::StochRsiK,
        Column::Macd,
        Column::MacdSignal,
        Column::MacdHist,
        Column::StochK,
        Column::StochD,
        Column::WilliamsR,
        Column::MaShort,
        Column::MaLong,
        Column::MaTrend,
        Column::Sma,
        Column::Psar,
    ];

    /// Column name as it appears in the host's table.
    pub fn name(self) -> &'static str {
        match self {
            Column::HaOpen => "HA_open",
            Column::HaClose => "HA_close",
            Column::HaHigh => "HA_high",
            Column::HaLow => "HA_low",
            Column::Resistance => "resistance",
            Column::Rsi => "rsi",
            Column::StochRsi => "stoch_rsi",
            Column::StochRsiK => "stoch_rsi_k",
            Column::Macd => "macd",
            Column::MacdSignal => "macdsignal",
            Column::MacdHist => "macdhist",
            Column::StochK => "stoch_k",
            Column::StochD => "stoch_d",
            Column::WilliamsR => "williams_r",
            Column::MaShort => "ma_short",
            Column::MaLong => "ma_long",
            Column::MaTrend => "ma_trend",
            Column::Sma => "sma",
            Column::Psar => "psar",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Flag {
    HaBullish,
    HaBearish,
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flag::HaBullish => write!(f, "HA_bullish"),
            Flag::HaBearish => write!(f, "HA_bearish"),
        }
    }
}

/// Indicator outputs for one price window.
///
/// Every series and flag vector has exactly `len` rows. Indicators switched
/// off by a toggle are simply absent.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorFrame {
    len: usize,
    columns: HashMap<Column, Series>,
    flags: HashMap<Flag, Vec<bool>>,
}

impl IndicatorFrame {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            columns: HashMap::new(),
            flags: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Store a column. Panics if the series length does not match the
    /// frame, which would be a bug in an indicator implementation.
    pub fn insert(&mut self, column: Column, series: Series) {
        assert_eq!(
            series.len(),
            self.len,
            "{column} has {} rows, frame has {}",
            series.len(),
            self.len
        );
        self.columns.insert(column, series);
    }

    pub fn insert_flag(&mut self, flag: Flag, values: Vec<bool>) {
        assert_eq!(values.len(), self.len, "{flag} length mismatch");
        self.flags.insert(flag, values);
    }

    pub fn series(&self, column: Column) -> Option<&Series> {
        self.columns.get(&column)
    }

    /// Value of `column` at `index`; `None` if absent or undefined.
    pub fn value(&self, column: Column, index: usize) -> Option<f64> {
        self.columns.get(&column).and_then(|s| s.get(index))
    }

    /// Flag at `index`; an absent flag reads as `false`.
    pub fn flag(&self, flag: Flag, index: usize) -> bool {
        self.flags
            .get(&flag)
            .and_then(|v| v.get(index).copied())
            .unwrap_or(false)
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains_key(&flag)
    }

    pub fn contains(&self, column: Column) -> bool {
        self.columns.contains_key(&column)
    }

    /// Present columns in declaration order.
    pub fn columns(&self) -> Vec<Column> {
        Column::ALL
            .iter()
            .copied()
            .filter(|c| self.columns.contains_key(c))
            .collect()
    }

    /// Bit-identical comparison of every column and flag.
    pub fn bit_eq(&self, other: &IndicatorFrame) -> bool {
        self.len == other.len
            && self.flags == other.flags
            && self.columns.len() == other.columns.len()
            && self
                .columns
                .iter()
                .all(|(k, s)| other.columns.get(k).is_some_and(|o| s.bit_eq(o)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn series_get_skips_undefined() {
        let s = Series::new(vec![f64::NAN, 1.5, 2.5]);
        assert_eq!(s.get(0), None);
        assert_eq!(s.get(1), Some(1.5));
        assert_eq!(s.get(3), None);
        assert_eq!(s.last(), Some(2.5));
        assert_eq!(s.first_defined(), Some(1));
    }

    #[test]
    fn series_undefined() {
        let s = Series::undefined(3);
        assert_eq!(s.len(), 3);
        assert_eq!(s.first_defined(), None);
        assert_eq!(s.last(), None);
    }

    #[test]
    fn series_bit_eq_treats_nan_as_equal() {
        let a = Series::new(vec![f64::NAN, 1.0]);
        let b = Series::new(vec![f64::NAN, 1.0]);
        assert!(a.bit_eq(&b));
        assert_ne!(a, b);
    }

    #[test]
    fn column_display_uses_host_names() {
        assert_eq!(Column::HaClose.to_string(), "HA_close");
        assert_eq!(Column::StochRsi.to_string(), "stoch_rsi");
        assert_eq!(Column::MacdHist.to_string(), "macdhist");
        assert_eq!(Flag::HaBullish.to_string(), "HA_bullish");
    }

    #[test]
    fn frame_absent_column_reads_none() {
        let mut frame = IndicatorFrame::new(2);
        frame.insert(Column::Rsi, Series::new(vec![f64::NAN, 40.0]));
        assert_eq!(frame.value(Column::Rsi, 1), Some(40.0));
        assert_eq!(frame.value(Column::WilliamsR, 1), None);
        assert!(!frame.flag(Flag::HaBullish, 0));
        assert_eq!(frame.columns(), vec![Column::Rsi]);
    }

    #[test]
    #[should_panic]
    fn frame_rejects_misaligned_series() {
        let mut frame = IndicatorFrame::new(3);
        frame.insert(Column::Rsi, Series::new(vec![1.0]));
    }
}
