//! RSI band scalper with a profit-locking stop.
//!
//! Fixed periods, no tunable parameters. Entries fire inside narrow RSI
//! bands; any one of RSI extreme, MACD signal cross or SMA breach exits.

use crate::domain::error::ScalptraderError;
use crate::domain::indicator::Column;
use crate::domain::indicator::macd::{DEFAULT_FAST, DEFAULT_SIGNAL, DEFAULT_SLOW};
use crate::domain::indicator::rsi::DEFAULT_PERIOD;
use crate::domain::indicator_engine::{IndicatorSpec, PlannedIndicator};
use crate::domain::params::ParameterSpace;
use crate::domain::policy::{LeveragePolicy, StoplossPolicy, TimeoutPolicy, TradePolicy};
use crate::domain::rule::{Operand, Rule, RuleBlock, SignalKind};
use crate::domain::strategy::{RoiTable, Strategy, TrailingStop};

pub const NAME: &str = "advanced_scalp";

pub const SMA_PERIOD: usize = 30;
pub const LEVERAGE: f64 = 2.0;

pub const STOPLOSS: StoplossPolicy = StoplossPolicy::ProfitLock {
    base: -0.03,
    activation: 0.01,
    locked: 0.01,
};

fn plan() -> Vec<PlannedIndicator> {
    vec![
        PlannedIndicator::always(IndicatorSpec::Rsi {
            period: (DEFAULT_PERIOD as f64).into(),
        }),
        PlannedIndicator::always(IndicatorSpec::Sma {
            period: (SMA_PERIOD as f64).into(),
            column: Column::Sma,
        }),
        PlannedIndicator::always(IndicatorSpec::Macd {
            fast: (DEFAULT_FAST as f64).into(),
            slow: (DEFAULT_SLOW as f64).into(),
            signal: (DEFAULT_SIGNAL as f64).into(),
        }),
    ]
}

fn blocks() -> Vec<RuleBlock> {
    vec![
        RuleBlock::all(
            "rsi_band",
            SignalKind::EnterLong,
            vec![Rule::above(Column::Rsi, 25.0), Rule::below(Column::Rsi, 29.0)],
        ),
        RuleBlock::all(
            "rsi_band",
            SignalKind::EnterShort,
            vec![Rule::below(Column::Rsi, 80.0), Rule::above(Column::Rsi, 75.0)],
        ),
        RuleBlock::all("rsi_high", SignalKind::ExitLong, vec![Rule::above(Column::Rsi, 70.0)]),
        RuleBlock::all(
            "macd_cross",
            SignalKind::ExitLong,
            vec![Rule::cross_below(Column::Macd, Column::MacdSignal)],
        ),
        RuleBlock::all(
            "above_sma",
            SignalKind::ExitLong,
            vec![Rule::above(Operand::Close, Column::Sma)],
        ),
        RuleBlock::all("rsi_low", SignalKind::ExitShort, vec![Rule::below(Column::Rsi, 32.0)]),
        RuleBlock::all(
            "macd_cross",
            SignalKind::ExitShort,
            vec![Rule::cross_above(Column::Macd, Column::MacdSignal)],
        ),
        RuleBlock::all(
            "below_sma",
            SignalKind::ExitShort,
            vec![Rule::below(Operand::Close, Column::Sma)],
        ),
    ]
}

pub fn strategy() -> Result<Strategy, ScalptraderError> {
    Ok(Strategy {
        name: NAME,
        description: "RSI band entries with RSI, MACD cross and SMA exits",
        timeframe: "1m",
        params: ParameterSpace::new(Vec::new())?,
        plan: plan(),
        blocks: blocks(),
        policy: TradePolicy {
            stoploss: STOPLOSS,
            leverage: LeveragePolicy::Fixed(LEVERAGE),
            timeout: TimeoutPolicy::Disabled,
        },
        minimal_roi: RoiTable::new(vec![(0, 0.01)]),
        trailing_stop: TrailingStop::DISABLED,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::policy::Snapshot;

    #[test]
    fn profit_lock_stop() {
        let s = strategy().unwrap();
        assert_eq!(s.stoploss(), -0.03);
        assert_eq!(s.policy.stoploss.stoploss(0.005), -0.03);
        assert_eq!(s.policy.stoploss.stoploss(0.01), 0.01);
    }

    #[test]
    fn fixed_leverage_ignores_snapshot() {
        let s = strategy().unwrap();
        let snap = Snapshot::from_values([(Column::Rsi, 99.0)]);
        assert_eq!(s.policy.leverage.leverage(&snap, &s.params, 125.0), 2.0);
    }

    #[test]
    fn no_parameters_or_timeout() {
        let s = strategy().unwrap();
        assert!(s.params.is_empty());
        assert_eq!(s.policy.timeout, TimeoutPolicy::Disabled);
    }

    #[test]
    fn exits_are_separate_blocks() {
        let s = strategy().unwrap();
        let exit_long: Vec<_> = s
            .blocks
            .iter()
            .filter(|b| b.signal == SignalKind::ExitLong)
            .map(|b| b.name)
            .collect();
        assert_eq!(exit_long, vec!["rsi_high", "macd_cross", "above_sma"]);
    }
}
