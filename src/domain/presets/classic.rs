//! Multi-oscillator scalper behind a resistance gate.
//!
//! Four independent entry families per side, each OR-ed into the signal:
//! a toggled Williams %R / MACD / RSI reversal, a stochastic cross, moving
//! average trend alignment and a Parabolic SAR flip. Every long family
//! requires the close to clear the previous bar's rolling resistance;
//! shorts require it to stay below.

use crate::domain::error::ScalptraderError;
use crate::domain::indicator::{Column, Flag};
use crate::domain::indicator::stochastic::DEFAULT_SLOWK_PERIOD;
use crate::domain::indicator_engine::{IndicatorSpec, PlannedIndicator};
use crate::domain::params::{Parameter, ParameterSpace, Space};
use crate::domain::policy::{LeveragePolicy, StoplossPolicy, TimeoutPolicy, TradePolicy};
use crate::domain::presets::{EXIT_LONG_HISTOGRAM, EXIT_SHORT_HISTOGRAM};
use crate::domain::rule::{Operand, Rule, RuleBlock, SignalKind};
use crate::domain::strategy::{RoiTable, Strategy, TrailingStop};

pub const NAME: &str = "classic";

pub const STOPLOSS: f64 = -0.05;

/// Williams %R confirmation for exits.
pub const EXIT_LONG_WILLIAMS: f64 = -31.0;
pub const EXIT_SHORT_WILLIAMS: f64 = -84.0;

pub const LEVERAGE_OVERBOUGHT: f64 = 70.0;
pub const LEVERAGE_OVERSOLD: f64 = 30.0;

fn parameters() -> Result<ParameterSpace, ScalptraderError> {
    ParameterSpace::new(vec![
        Parameter::int("williams_period", 6, 20, 14, Space::Both),
        Parameter::decimal("williams_upper", -7.0, -2.0, -4.0, Space::Both),
        Parameter::decimal("williams_lower", -88.0, -94.0, -92.0, Space::Both),
        Parameter::int("macd_fast", 8, 16, 12, Space::Both),
        Parameter::int("macd_slow", 18, 32, 26, Space::Both),
        Parameter::int("macd_signal", 3, 15, 9, Space::Both),
        Parameter::int("rsi_period", 5, 25, 14, Space::Both),
        Parameter::int("rsi_overbought", 65, 90, 80, Space::Both),
        Parameter::int("rsi_oversold", 10, 35, 23, Space::Both),
        Parameter::boolean("use_williams", true, Space::Both),
        Parameter::boolean("use_macd", true, Space::Both),
        Parameter::boolean("use_rsi", true, Space::Both),
        Parameter::decimal("take_profit", 0.01, 0.05, 0.02, Space::Exit),
        Parameter::int("max_holding_time", 2, 10, 5, Space::Exit),
        Parameter::int("stoch_k_period", 3, 15, 14, Space::Both),
        Parameter::int("stoch_d_period", 3, 15, 3, Space::Both),
        Parameter::int("stoch_oversold", 10, 30, 20, Space::Both),
        Parameter::int("stoch_overbought", 70, 90, 80, Space::Both),
        Parameter::int("ma_short", 5, 20, 5, Space::Both),
        Parameter::int("ma_long", 20, 50, 20, Space::Both),
        Parameter::int("ma_trend", 100, 200, 200, Space::Both),
        Parameter::decimal("psar_af", 0.01, 0.04, 0.02, Space::Both),
        Parameter::decimal("psar_max_af", 0.1, 0.5, 0.2, Space::Both),
        Parameter::int("resistance_period", 15, 50, 30, Space::Both),
    ])
}

fn plan() -> Vec<PlannedIndicator> {
    vec![
        PlannedIndicator::always(IndicatorSpec::HeikinAshi),
        PlannedIndicator::always(IndicatorSpec::Resistance {
            window: "resistance_period".into(),
        }),
        PlannedIndicator::gated_by(
            IndicatorSpec::WilliamsR {
                period: "williams_period".into(),
            },
            "use_williams",
        ),
        PlannedIndicator::gated_by(
            IndicatorSpec::Macd {
                fast: "macd_fast".into(),
                slow: "macd_slow".into(),
                signal: "macd_signal".into(),
            },
            "use_macd",
        ),
        PlannedIndicator::gated_by(
            IndicatorSpec::Rsi {
                period: "rsi_period".into(),
            },
            "use_rsi",
        ),
        PlannedIndicator::always(IndicatorSpec::Stoch {
            fastk_period: "stoch_k_period".into(),
            slowk_period: (DEFAULT_SLOWK_PERIOD as f64).into(),
            slowd_period: "stoch_d_period".into(),
        }),
        PlannedIndicator::always(IndicatorSpec::Sma {
            period: "ma_short".into(),
            column: Column::MaShort,
        }),
        PlannedIndicator::always(IndicatorSpec::Sma {
            period: "ma_long".into(),
            column: Column::MaLong,
        }),
        PlannedIndicator::always(IndicatorSpec::Sma {
            period: "ma_trend".into(),
            column: Column::MaTrend,
        }),
        PlannedIndicator::always(IndicatorSpec::Sar {
            acceleration: "psar_af".into(),
            maximum: "psar_max_af".into(),
        }),
    ]
}

fn prev_resistance() -> Operand {
    Operand::prev(Column::Resistance.into())
}

fn above_resistance() -> Rule {
    Rule::above(Operand::Close, prev_resistance())
}

fn below_resistance() -> Rule {
    Rule::below(Operand::Close, prev_resistance())
}

fn entry_blocks() -> Vec<RuleBlock> {
    vec![
        RuleBlock::all(
            "oscillator_reversal",
            SignalKind::EnterLong,
            vec![
                Rule::Enabled("use_williams"),
                Rule::at_most(Column::WilliamsR, Operand::Param("williams_lower")),
                Rule::Enabled("use_macd"),
                Rule::below(Column::MacdHist, 0.0),
                Rule::Enabled("use_rsi"),
                Rule::at_most(Column::Rsi, Operand::Param("rsi_oversold")),
                Rule::Is(Flag::HaBearish),
                Rule::previous(Rule::Is(Flag::HaBullish)),
                above_resistance(),
            ],
        ),
        RuleBlock::all(
            "oscillator_reversal",
            SignalKind::EnterShort,
            vec![
                Rule::Enabled("use_williams"),
                Rule::at_least(Column::WilliamsR, Operand::Param("williams_upper")),
                Rule::Enabled("use_macd"),
                Rule::above(Column::MacdHist, 0.0),
                Rule::Enabled("use_rsi"),
                Rule::at_least(Column::Rsi, Operand::Param("rsi_overbought")),
                Rule::Is(Flag::HaBullish),
                Rule::previous(Rule::Is(Flag::HaBearish)),
                below_resistance(),
            ],
        ),
        RuleBlock::all(
            "stochastic",
            SignalKind::EnterLong,
            vec![
                Rule::below(Column::StochK, Operand::Param("stoch_oversold")),
                Rule::below(Column::StochD, Operand::Param("stoch_oversold")),
                Rule::previous(Rule::at_most(Column::StochK, Column::StochD)),
                Rule::Is(Flag::HaBearish),
                above_resistance(),
            ],
        ),
        RuleBlock::all(
            "stochastic",
            SignalKind::EnterShort,
            vec![
                Rule::above(Column::StochK, Operand::Param("stoch_overbought")),
                Rule::above(Column::StochD, Operand::Param("stoch_overbought")),
                Rule::previous(Rule::at_least(Column::StochK, Column::StochD)),
                Rule::Is(Flag::HaBullish),
                below_resistance(),
            ],
        ),
        RuleBlock::all(
            "ma_trend",
            SignalKind::EnterLong,
            vec![
                Rule::above(Column::MaShort, Column::MaLong),
                Rule::above(Operand::Close, Column::MaTrend),
                Rule::Is(Flag::HaBearish),
                above_resistance(),
            ],
        ),
        RuleBlock::all(
            "ma_trend",
            SignalKind::EnterShort,
            vec![
                Rule::below(Column::MaShort, Column::MaLong),
                Rule::below(Operand::Close, Column::MaTrend),
                Rule::Is(Flag::HaBullish),
                below_resistance(),
            ],
        ),
        RuleBlock::all(
            "psar",
            SignalKind::EnterLong,
            vec![
                Rule::above(Operand::Close, Column::Psar),
                Rule::Is(Flag::HaBearish),
                above_resistance(),
            ],
        ),
        RuleBlock::all(
            "psar",
            SignalKind::EnterShort,
            vec![
                Rule::below(Operand::Close, Column::Psar),
                Rule::Is(Flag::HaBullish),
                below_resistance(),
            ],
        ),
    ]
}

fn exit_blocks() -> Vec<RuleBlock> {
    vec![
        RuleBlock::all(
            "histogram_exit",
            SignalKind::ExitLong,
            vec![
                Rule::above(Column::MacdHist, EXIT_LONG_HISTOGRAM),
                Rule::at_least(Column::WilliamsR, EXIT_LONG_WILLIAMS),
                Rule::Is(Flag::HaBullish),
                Rule::previous(Rule::Is(Flag::HaBearish)),
                above_resistance(),
            ],
        ),
        RuleBlock::all(
            "histogram_exit",
            SignalKind::ExitShort,
            vec![
                Rule::below(Column::MacdHist, EXIT_SHORT_HISTOGRAM),
                Rule::at_most(Column::WilliamsR, EXIT_SHORT_WILLIAMS),
                Rule::Is(Flag::HaBearish),
                Rule::previous(Rule::Is(Flag::HaBullish)),
                below_resistance(),
            ],
        ),
    ]
}

pub fn strategy() -> Result<Strategy, ScalptraderError> {
    let mut blocks = entry_blocks();
    blocks.extend(exit_blocks());
    Ok(Strategy {
        name: NAME,
        description: "Williams %R, MACD, RSI, stochastic, MA and PSAR entries gated by resistance",
        timeframe: "1m",
        params: parameters()?,
        plan: plan(),
        blocks,
        policy: TradePolicy {
            stoploss: StoplossPolicy::Fixed(STOPLOSS),
            leverage: LeveragePolicy::Tiered {
                column: Column::Rsi,
                gate: Some("use_rsi"),
                overbought: LEVERAGE_OVERBOUGHT,
                oversold: LEVERAGE_OVERSOLD,
                overbought_leverage: 20.0,
                oversold_leverage: 25.0,
                default_leverage: 5.0,
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
    use crate::domain::params::ParamKind;
    use crate::domain::policy::Snapshot;

    #[test]
    fn williams_lower_bounds_normalized() {
        let s = strategy().unwrap();
        let p = s.params.get("williams_lower").unwrap();
        assert_eq!(p.kind, ParamKind::Decimal { low: -94.0, high: -88.0 });
        assert_eq!(s.params.number("williams_lower"), Some(-92.0));
    }

    #[test]
    fn every_long_entry_is_resistance_gated() {
        let s = strategy().unwrap();
        let gate = above_resistance();
        for block in s.blocks.iter().filter(|b| b.signal == SignalKind::EnterLong) {
            match &block.rule {
                Rule::And(predicates) => assert!(predicates.contains(&gate), "{}", block.name),
                other => panic!("unexpected rule shape {}", other),
            }
        }
    }

    #[test]
    fn rsi_leverage_gated_by_toggle() {
        let s = strategy().unwrap();
        let hot = Snapshot::from_values([(Column::Rsi, 75.0)]);
        let cold = Snapshot::from_values([(Column::Rsi, 25.0)]);
        assert_eq!(s.policy.leverage.leverage(&hot, &s.params, 50.0), 20.0);
        assert_eq!(s.policy.leverage.leverage(&cold, &s.params, 50.0), 25.0);

        let off = s.with_overrides([("use_rsi", "false")]).unwrap();
        assert_eq!(off.policy.leverage.leverage(&hot, &off.params, 50.0), 5.0);
    }

    #[test]
    fn four_entry_families_per_side() {
        let s = strategy().unwrap();
        assert_eq!(
            s.blocks.iter().filter(|b| b.signal == SignalKind::EnterLong).count(),
            4
        );
        assert_eq!(
            s.blocks.iter().filter(|b| b.signal == SignalKind::EnterShort).count(),
            4
        );
    }
}
