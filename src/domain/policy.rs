//! Per-trade decisions: stoploss, leverage and holding timeout.
//!
//! All three are pure functions of the open trade, the latest indicator
//! snapshot, the clock and the current parameter values.

use crate::domain::error::ScalptraderError;
use crate::domain::indicator::{Column, IndicatorFrame};
use crate::domain::indicator_engine::ParamRef;
use crate::domain::params::ParameterSpace;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeSide {
    Long,
    Short,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Long => write!(f, "long"),
            TradeSide::Short => write!(f, "short"),
        }
    }
}

impl FromStr for TradeSide {
    type Err = ScalptraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" => Ok(TradeSide::Long),
            "short" => Ok(TradeSide::Short),
            other => Err(ScalptraderError::Data {
                reason: format!("unknown trade side '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenTrade {
    pub pair: String,
    pub open_time: DateTime<Utc>,
    pub side: TradeSide,
}

impl OpenTrade {
    /// Minutes since the trade opened; negative if `now` precedes it.
    pub fn minutes_open(&self, now: DateTime<Utc>) -> f64 {
        (now - self.open_time).num_milliseconds() as f64 / 60_000.0
    }
}

/// Last-row values of an analyzed frame. Columns undefined on that row are
/// left out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    values: HashMap<Column, f64>,
}

impl Snapshot {
    pub fn latest(frame: &IndicatorFrame) -> Self {
        let values = frame
            .columns()
            .into_iter()
            .filter_map(|c| frame.series(c).and_then(|s| s.last()).map(|v| (c, v)))
            .collect();
        Self { values }
    }

    pub fn from_values<I: IntoIterator<Item = (Column, f64)>>(values: I) -> Self {
        Self {
            values: values.into_iter().filter(|(_, v)| !v.is_nan()).collect(),
        }
    }

    /// `None` when the column is absent or was undefined on the last row.
    pub fn get(&self, column: Column) -> Option<f64> {
        self.values.get(&column).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StoplossPolicy {
    Fixed(f64),
    /// Once profit reaches `activation`, hold the stop at `locked`.
    ProfitLock {
        base: f64,
        activation: f64,
        locked: f64,
    },
}

impl StoplossPolicy {
    pub fn base(&self) -> f64 {
        match *self {
            StoplossPolicy::Fixed(v) => v,
            StoplossPolicy::ProfitLock { base, .. } => base,
        }
    }

    pub fn stoploss(&self, current_profit: f64) -> f64 {
        match *self {
            StoplossPolicy::Fixed(v) => v,
            StoplossPolicy::ProfitLock {
                base,
                activation,
                locked,
            } => {
                if current_profit >= activation {
                    locked
                } else {
                    base
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LeveragePolicy {
    Fixed(f64),
    /// Pick a tier from the latest value of an oscillator column.
    Tiered {
        column: Column,
        gate: Option<&'static str>,
        overbought: f64,
        oversold: f64,
        overbought_leverage: f64,
        oversold_leverage: f64,
        default_leverage: f64,
    },
}

impl LeveragePolicy {
    /// Requested leverage before clamping.
    pub fn requested(&self, snapshot: &Snapshot, params: &ParameterSpace) -> f64 {
        match self {
            LeveragePolicy::Fixed(v) => *v,
            LeveragePolicy::Tiered {
                column,
                gate,
                overbought,
                oversold,
                overbought_leverage,
                oversold_leverage,
                default_leverage,
            } => {
                if gate.is_some_and(|toggle| !params.enabled(toggle)) {
                    return *default_leverage;
                }
                match snapshot.get(*column) {
                    Some(v) if v > *overbought => *overbought_leverage,
                    Some(v) if v < *oversold => *oversold_leverage,
                    _ => *default_leverage,
                }
            }
        }
    }

    /// Leverage clamped to `[1, max_leverage]`.
    pub fn leverage(&self, snapshot: &Snapshot, params: &ParameterSpace, max_leverage: f64) -> f64 {
        let requested = self.requested(snapshot, params);
        requested.min(max_leverage).max(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeoutPolicy {
    Disabled,
    /// Exit once the trade has been open longer than this many minutes.
    MaxMinutes(ParamRef),
}

impl TimeoutPolicy {
    pub fn timed_out(&self, trade: &OpenTrade, now: DateTime<Utc>, params: &ParameterSpace) -> bool {
        match self {
            TimeoutPolicy::Disabled => false,
            TimeoutPolicy::MaxMinutes(limit) => limit
                .resolve(params)
                .is_ok_and(|max| trade.minutes_open(now) > max),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradePolicy {
    pub stoploss: StoplossPolicy,
    pub leverage: LeveragePolicy,
    pub timeout: TimeoutPolicy,
}
