//! Stochastic RSI + MACD + Heikin-Ashi reversal.
//!
//! Longs are entered on the first bearish HA candle after a bullish one while
//! Stochastic RSI is oversold and the MACD histogram is negative; shorts
//! mirror it. Exits wait for a strong histogram and the opposite HA flip.

use crate::domain::error::ScalptraderError;
use crate::domain::indicator::{Column, Flag};
use crate::domain::indicator_engine::{IndicatorSpec, PlannedIndicator};
use crate::domain::params::{Parameter, ParameterSpace, Space};
use crate::domain::policy::{LeveragePolicy, StoplossPolicy, TimeoutPolicy, TradePolicy};
use crate::domain::presets::{EXIT_LONG_HISTOGRAM, EXIT_SHORT_HISTOGRAM};
use crate::domain::rule::{Operand, Rule, RuleBlock, SignalKind};
use crate::domain::strategy::{RoiTable, Strategy, TrailingStop};

pub const NAME: &str = "image_based";

pub const STOPLOSS: f64 = -0.05;

pub const LEVERAGE_OVERBOUGHT: f64 = 80.0;
pub const LEVERAGE_OVERSOLD: f64 = 20.0;

fn parameters() -> Result<ParameterSpace, ScalptraderError> {
    ParameterSpace::new(vec![
        Parameter::int("stoch_rsi_period", 3, 15, 14, Space::Both),
        Parameter::int("stoch_rsi_overbought", 70, 90, 80, Space::Both),
        Parameter::int("stoch_rsi_oversold", 10, 30, 20, Space::Both),
        Parameter::int("macd_fast", 8, 16, 12, Space::Both),
        Parameter::int("macd_slow", 18, 32, 26, Space::Both),
        Parameter::int("macd_signal", 3, 15, 9, Space::Both),
        Parameter::decimal("take_profit", 0.01, 0.05, 0.02, Space::Exit),
        Parameter::int("max_holding_time", 2, 10, 5, Space::Exit),
    ])
}

fn plan() -> Vec<PlannedIndicator> {
    vec![
        PlannedIndicator::always(IndicatorSpec::HeikinAshi),
        PlannedIndicator::always(IndicatorSpec::StochRsi {
            rsi_period: 14.0.into(),
            fastk_period: "stoch_rsi_period".into(),
            fastd_period: 3.0.into(),
        }),
        PlannedIndicator::always(IndicatorSpec::Macd {
            fast: "macd_fast".into(),
            slow: "macd_slow".into(),
            signal: "macd_signal".into(),
        }),
    ]
}

fn blocks() -> Vec<RuleBlock> {
    vec![
        RuleBlock::all(
            "stoch_rsi_reversal",
            SignalKind::EnterLong,
            vec![
                Rule::below(Column::StochRsi, Operand::Param("stoch_rsi_oversold")),
                Rule::below(Column::MacdHist, 0.0),
                Rule::Is(Flag::HaBearish),
                Rule::previous(Rule::Is(Flag::HaBullish)),
            ],
        ),
        RuleBlock::all(
            "stoch_rsi_reversal",
            SignalKind::EnterShort,
            vec![
                Rule::above(Column::StochRsi, Operand::Param("stoch_rsi_overbought")),
                Rule::above(Column::MacdHist, 0.0),
                Rule::Is(Flag::HaBullish),
                Rule::previous(Rule::Is(Flag::HaBearish)),
            ],
        ),
        RuleBlock::all(
            "histogram_exit",
            SignalKind::ExitLong,
            vec![
                Rule::above(Column::MacdHist, EXIT_LONG_HISTOGRAM),
                Rule::Is(Flag::HaBullish),
                Rule::previous(Rule::Is(Flag::HaBearish)),
            ],
        ),
        RuleBlock::all(
            "histogram_exit",
            SignalKind::ExitShort,
            vec![
                Rule::below(Column::MacdHist, EXIT_SHORT_HISTOGRAM),
                Rule::Is(Flag::HaBearish),
                Rule::previous(Rule::Is(Flag::HaBullish)),
            ],
        ),
    ]
}

pub fn strategy() -> Result<Strategy, ScalptraderError> {
    Ok(Strategy {
        name: NAME,
        description: "Stochastic RSI and MACD histogram reversal on Heikin-Ashi colour flips",
        timeframe: "1m",
        params: parameters()?,
        plan: plan(),
        blocks: blocks(),
        policy: TradePolicy {
            stoploss: StoplossPolicy::Fixed(STOPLOSS),
            leverage: LeveragePolicy::Tiered {
                column: Column::StochRsi,
                gate: None,
                overbought: LEVERAGE_OVERBOUGHT,
                oversold: LEVERAGE_OVERSOLD,
                overbought_leverage: 20.0,
                oversold_leverage: 25.0,
                default_leverage: 15.0,
            },
            timeout: TimeoutPolicy::MaxMinutes("max_holding_time".into()),
        },
        minimal_roi: RoiTable::new(vec![(0, 0.02)]),
        trailing_stop: TrailingStop {
            enabled: true,
            positive: Some(0.04),
            positive_offset: 0.05,
            only_offset_is_reached: false,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::policy::Snapshot;

    #[test]
    fn declares_host_metadata() {
        let s = strategy().unwrap();
        assert_eq!(s.stoploss(), -0.05);
        assert_eq!(s.minimal_roi.threshold_at(0.0), Some(0.02));
        assert!(s.trailing_stop.enabled);
        assert_eq!(s.params.len(), 8);
        assert_eq!(s.params.number("stoch_rsi_period"), Some(14.0));
    }

    #[test]
    fn leverage_follows_stoch_rsi() {
        let s = strategy().unwrap();
        let at = |v: f64| {
            s.policy.leverage.leverage(
                &Snapshot::from_values([(Column::StochRsi, v)]),
                &s.params,
                100.0,
            )
        };
        assert_eq!(at(85.0), 20.0);
        assert_eq!(at(10.0), 25.0);
        assert_eq!(at(50.0), 15.0);
    }

    #[test]
    fn one_block_per_signal() {
        let s = strategy().unwrap();
        for kind in [
            SignalKind::EnterLong,
            SignalKind::EnterShort,
            SignalKind::ExitLong,
            SignalKind::ExitShort,
        ] {
            assert_eq!(s.blocks.iter().filter(|b| b.signal == kind).count(), 1);
        }
    }
}
