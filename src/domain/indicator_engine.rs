//! Indicator plan resolution and computation.
//!
//! A strategy declares the indicators it needs as a list of
//! [`PlannedIndicator`]s. Periods and factors are either fixed numbers or
//! references to named parameters, resolved against the current
//! [`ParameterSpace`] on every call. An indicator gated by a toggle that is
//! switched off is skipped entirely and its columns stay absent.

use crate::domain::error::ScalptraderError;
use crate::domain::indicator::heikin_ashi::calculate_heikin_ashi;
use crate::domain::indicator::macd::calculate_macd;
use crate::domain::indicator::parabolic_sar::calculate_sar;
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::stochastic::{calculate_stoch, calculate_stoch_rsi};
use crate::domain::indicator::williams_r::calculate_williams_r;
use crate::domain::indicator::{
    Column, Flag, IndicatorFrame, Series, calculate_sma, rolling_max,
};
use crate::domain::ohlcv::Candles;
use crate::domain::params::ParameterSpace;
use std::fmt;
use tracing::debug;

/// Upper bound for any resolved period.
pub const MAX_PERIOD: usize = 10_000;

/// A number that is either fixed or read from a named parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamRef {
    Fixed(f64),
    Named(&'static str),
}

impl ParamRef {
    pub fn resolve(self, params: &ParameterSpace) -> Result<f64, ScalptraderError> {
        match self {
            ParamRef::Fixed(v) => Ok(v),
            ParamRef::Named(name) => {
                let param = params
                    .get(name)
                    .ok_or_else(|| ScalptraderError::UnknownParameter {
                        name: name.to_string(),
                    })?;
                param
                    .value
                    .as_f64()
                    .ok_or_else(|| ScalptraderError::ParameterType {
                        name: name.to_string(),
                        expected: "number",
                        got: param.value.to_string(),
                    })
            }
        }
    }
}

impl From<f64> for ParamRef {
    fn from(v: f64) -> Self {
        ParamRef::Fixed(v)
    }
}

impl From<&'static str> for ParamRef {
    fn from(name: &'static str) -> Self {
        ParamRef::Named(name)
    }
}

impl fmt::Display for ParamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamRef::Fixed(v) => write!(f, "{}", v),
            ParamRef::Named(name) => write!(f, "{}", name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndicatorSpec {
    /// HA_open/close/high/low plus the bullish/bearish flags.
    HeikinAshi,
    /// Rolling max of `high`.
    Resistance { window: ParamRef },
    Rsi { period: ParamRef },
    /// Publishes fastd as `stoch_rsi` and fastk as `stoch_rsi_k`.
    StochRsi {
        rsi_period: ParamRef,
        fastk_period: ParamRef,
        fastd_period: ParamRef,
    },
    Macd {
        fast: ParamRef,
        slow: ParamRef,
        signal: ParamRef,
    },
    Stoch {
        fastk_period: ParamRef,
        slowk_period: ParamRef,
        slowd_period: ParamRef,
    },
    WilliamsR { period: ParamRef },
    /// SMA of close written to `column`.
    Sma { period: ParamRef, column: Column },
    Sar {
        acceleration: ParamRef,
        maximum: ParamRef,
    },
}

impl IndicatorSpec {
    pub fn name(&self) -> &'static str {
        match self {
            IndicatorSpec::HeikinAshi => "heikin_ashi",
            IndicatorSpec::Resistance { .. } => "resistance",
            IndicatorSpec::Rsi { .. } => "rsi",
            IndicatorSpec::StochRsi { .. } => "stochrsi",
            IndicatorSpec::Macd { .. } => "macd",
            IndicatorSpec::Stoch { .. } => "stoch",
            IndicatorSpec::WilliamsR { .. } => "willr",
            IndicatorSpec::Sma { .. } => "sma",
            IndicatorSpec::Sar { .. } => "sar",
        }
    }

    /// Columns this indicator writes.
    pub fn columns(&self) -> Vec<Column> {
        match self {
            IndicatorSpec::HeikinAshi => vec![
                Column::HaOpen,
                Column::HaClose,
                Column::HaHigh,
                Column::HaLow,
            ],
            IndicatorSpec::Resistance { .. } => vec![Column::Resistance],
            IndicatorSpec::Rsi { .. } => vec![Column::Rsi],
            IndicatorSpec::StochRsi { .. } => vec![Column::StochRsi, Column::StochRsiK],
            IndicatorSpec::Macd { .. } => vec![Column::Macd, Column::MacdSignal, Column::MacdHist],
            IndicatorSpec::Stoch { .. } => vec![Column::StochK, Column::StochD],
            IndicatorSpec::WilliamsR { .. } => vec![Column::WilliamsR],
            IndicatorSpec::Sma { column, .. } => vec![*column],
            IndicatorSpec::Sar { .. } => vec![Column::Psar],
        }
    }
}

impl fmt::Display for IndicatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = match self {
            IndicatorSpec::HeikinAshi => Vec::new(),
            IndicatorSpec::Resistance { window } => vec![window.to_string()],
            IndicatorSpec::Rsi { period } | IndicatorSpec::WilliamsR { period } => {
                vec![period.to_string()]
            }
            IndicatorSpec::StochRsi {
                rsi_period,
                fastk_period,
                fastd_period,
            } => vec![
                rsi_period.to_string(),
                fastk_period.to_string(),
                fastd_period.to_string(),
            ],
            IndicatorSpec::Macd { fast, slow, signal } => {
                vec![fast.to_string(), slow.to_string(), signal.to_string()]
            }
            IndicatorSpec::Stoch {
                fastk_period,
                slowk_period,
                slowd_period,
            } => vec![
                fastk_period.to_string(),
                slowk_period.to_string(),
                slowd_period.to_string(),
            ],
            IndicatorSpec::Sma { period, column } => vec![period.to_string(), column.to_string()],
            IndicatorSpec::Sar {
                acceleration,
                maximum,
            } => vec![acceleration.to_string(), maximum.to_string()],
        };
        write!(f, "{}({})", self.name(), args.join(", "))
    }
}

/// An indicator in a strategy's plan, optionally switched by a toggle.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedIndicator {
    pub spec: IndicatorSpec,
    pub gate: Option<&'static str>,
}

impl PlannedIndicator {
    pub fn always(spec: IndicatorSpec) -> Self {
        Self { spec, gate: None }
    }

    pub fn gated_by(spec: IndicatorSpec, toggle: &'static str) -> Self {
        Self {
            spec,
            gate: Some(toggle),
        }
    }

    pub fn is_enabled(&self, params: &ParameterSpace) -> bool {
        self.gate.is_none_or(|toggle| params.enabled(toggle))
    }
}

fn period(
    value: ParamRef,
    indicator: &str,
    params: &ParameterSpace,
) -> Result<usize, ScalptraderError> {
    let raw = value.resolve(params)?;
    if !raw.is_finite() || raw.fract() != 0.0 || raw < 1.0 || raw > MAX_PERIOD as f64 {
        return Err(ScalptraderError::InvalidPeriod {
            indicator: indicator.to_string(),
            reason: format!("{} resolved to {}", value, raw),
        });
    }
    Ok(raw as usize)
}

fn factor(
    value: ParamRef,
    indicator: &str,
    params: &ParameterSpace,
) -> Result<f64, ScalptraderError> {
    let raw = value.resolve(params)?;
    if !raw.is_finite() || raw <= 0.0 {
        return Err(ScalptraderError::InvalidPeriod {
            indicator: indicator.to_string(),
            reason: format!("{} resolved to {}", value, raw),
        });
    }
    Ok(raw)
}

fn compute_one(
    spec: &IndicatorSpec,
    candles: &Candles,
    params: &ParameterSpace,
    frame: &mut IndicatorFrame,
) -> Result<(), ScalptraderError> {
    let name = spec.name();
    match spec {
        IndicatorSpec::HeikinAshi => {
            let ha = calculate_heikin_ashi(candles);
            frame.insert_flag(Flag::HaBullish, ha.bullish());
            frame.insert_flag(Flag::HaBearish, ha.bearish());
            frame.insert(Column::HaOpen, Series::new(ha.open));
            frame.insert(Column::HaClose, Series::new(ha.close));
            frame.insert(Column::HaHigh, Series::new(ha.high));
            frame.insert(Column::HaLow, Series::new(ha.low));
        }
        IndicatorSpec::Resistance { window } => {
            let window = period(*window, name, params)?;
            frame.insert(
                Column::Resistance,
                Series::new(rolling_max(&candles.high, window)),
            );
        }
        IndicatorSpec::Rsi { period: p } => {
            let p = period(*p, name, params)?;
            frame.insert(Column::Rsi, Series::new(calculate_rsi(&candles.close, p)));
        }
        IndicatorSpec::StochRsi {
            rsi_period,
            fastk_period,
            fastd_period,
        } => {
            let out = calculate_stoch_rsi(
                &candles.close,
                period(*rsi_period, name, params)?,
                period(*fastk_period, name, params)?,
                period(*fastd_period, name, params)?,
            );
            frame.insert(Column::StochRsi, Series::new(out.d));
            frame.insert(Column::StochRsiK, Series::new(out.k));
        }
        IndicatorSpec::Macd { fast, slow, signal } => {
            let fast = period(*fast, name, params)?;
            let slow = period(*slow, name, params)?;
            let signal = period(*signal, name, params)?;
            if fast >= slow {
                return Err(ScalptraderError::InvalidPeriod {
                    indicator: name.to_string(),
                    reason: format!("fast period {} must be shorter than slow {}", fast, slow),
                });
            }
            let out = calculate_macd(&candles.close, fast, slow, signal);
            frame.insert(Column::Macd, Series::new(out.macd));
            frame.insert(Column::MacdSignal, Series::new(out.signal));
            frame.insert(Column::MacdHist, Series::new(out.histogram));
        }
        IndicatorSpec::Stoch {
            fastk_period,
            slowk_period,
            slowd_period,
        } => {
            let out = calculate_stoch(
                &candles.high,
                &candles.low,
                &candles.close,
                period(*fastk_period, name, params)?,
                period(*slowk_period, name, params)?,
                period(*slowd_period, name, params)?,
            );
            frame.insert(Column::StochK, Series::new(out.k));
            frame.insert(Column::StochD, Series::new(out.d));
        }
        IndicatorSpec::WilliamsR { period: p } => {
            let p = period(*p, name, params)?;
            frame.insert(
                Column::WilliamsR,
                Series::new(calculate_williams_r(
                    &candles.high,
                    &candles.low,
                    &candles.close,
                    p,
                )),
            );
        }
        IndicatorSpec::Sma { period: p, column } => {
            let p = period(*p, name, params)?;
            frame.insert(*column, Series::new(calculate_sma(&candles.close, p)));
        }
        IndicatorSpec::Sar {
            acceleration,
            maximum,
        } => {
            let acceleration = factor(*acceleration, name, params)?;
            let maximum = factor(*maximum, name, params)?;
            frame.insert(
                Column::Psar,
                Series::new(calculate_sar(&candles.high, &candles.low, acceleration, maximum)),
            );
        }
    }
    Ok(())
}

/// Compute every enabled indicator in `plan` over `candles`.
pub fn compute_indicators(
    candles: &Candles,
    plan: &[PlannedIndicator],
    params: &ParameterSpace,
) -> Result<IndicatorFrame, ScalptraderError> {
    let mut frame = IndicatorFrame::new(candles.len());
    for planned in plan {
        if !planned.is_enabled(params) {
            debug!(
                indicator = planned.spec.name(),
                toggle = planned.gate.unwrap_or_default(),
                "indicator disabled"
            );
            continue;
        }
        compute_one(&planned.spec, candles, params, &mut frame)?;
        for column in planned.spec.columns() {
            debug!(
                column = column.name(),
                first_defined = ?frame.series(column).and_then(|s| s.first_defined()),
                "indicator computed"
            );
        }
    }
    Ok(frame)
}
