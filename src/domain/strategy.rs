//! Strategy composition: parameters, indicator plan, rule blocks, trade
//! policy and host metadata bundled into one value.

use crate::domain::error::ScalptraderError;
use crate::domain::indicator::IndicatorFrame;
use crate::domain::indicator_engine::{ParamRef, PlannedIndicator, compute_indicators};
use crate::domain::ohlcv::{Candles, PriceBar};
use crate::domain::params::{ParamKind, ParameterSpace};
use crate::domain::policy::{
    LeveragePolicy, OpenTrade, Snapshot, TimeoutPolicy, TradePolicy, TradeSide,
};
use crate::domain::rule::{Operand, Rule, RuleBlock, SignalRow};
use crate::domain::rule_eval::{EvalContext, apply_blocks};
use crate::ports::strategy_port::StrategyPort;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

/// Minutes-since-open → minimum ROI before the host takes profit.
#[derive(Debug, Clone, PartialEq)]
pub struct RoiTable {
    entries: Vec<(u32, f64)>,
}

impl RoiTable {
    pub fn new(mut entries: Vec<(u32, f64)>) -> Self {
        entries.sort_by_key(|(minutes, _)| *minutes);
        entries.dedup_by_key(|(minutes, _)| *minutes);
        Self { entries }
    }

    pub fn entries(&self) -> &[(u32, f64)] {
        &self.entries
    }

    /// Threshold of the entry with the largest key not above `minutes`.
    pub fn threshold_at(&self, minutes: f64) -> Option<f64> {
        self.entries
            .iter()
            .rev()
            .find(|(key, _)| f64::from(*key) <= minutes)
            .map(|(_, roi)| *roi)
    }
}

/// Trailing stop settings handed to the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailingStop {
    pub enabled: bool,
    pub positive: Option<f64>,
    pub positive_offset: f64,
    pub only_offset_is_reached: bool,
}

impl TrailingStop {
    pub const DISABLED: TrailingStop = TrailingStop {
        enabled: false,
        positive: None,
        positive_offset: 0.0,
        only_offset_is_reached: false,
    };
}

/// Candles with their indicator columns and signals, for one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedFrame {
    pub pair: String,
    pub candles: Candles,
    pub indicators: IndicatorFrame,
    pub signals: Vec<SignalRow>,
}

impl AnalyzedFrame {
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot::latest(&self.indicators)
    }

    /// Bit-identical comparison, NaN rows included.
    pub fn bit_eq(&self, other: &AnalyzedFrame) -> bool {
        self.pair == other.pair
            && self.candles == other.candles
            && self.signals == other.signals
            && self.indicators.bit_eq(&other.indicators)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Strategy {
    pub name: &'static str,
    pub description: &'static str,
    pub timeframe: &'static str,
    pub params: ParameterSpace,
    pub plan: Vec<PlannedIndicator>,
    pub blocks: Vec<RuleBlock>,
    pub policy: TradePolicy,
    pub minimal_roi: RoiTable,
    pub trailing_stop: TrailingStop,
}

#[derive(Clone, Copy)]
enum Expect {
    Number,
    Toggle,
}

fn check_reference(
    params: &ParameterSpace,
    name: &str,
    expect: Expect,
) -> Result<(), ScalptraderError> {
    let param = params
        .get(name)
        .ok_or_else(|| ScalptraderError::UnknownParameter {
            name: name.to_string(),
        })?;
    let ok = match expect {
        Expect::Number => !matches!(param.kind, ParamKind::Bool),
        Expect::Toggle => matches!(param.kind, ParamKind::Bool),
    };
    if ok {
        Ok(())
    } else {
        Err(ScalptraderError::ParameterType {
            name: name.to_string(),
            expected: match expect {
                Expect::Number => "number",
                Expect::Toggle => "boolean",
            },
            got: param.value.to_string(),
        })
    }
}

fn operand_references<'a>(operand: &'a Operand, out: &mut Vec<(&'a str, Expect)>) {
    match operand {
        Operand::Param(name) => out.push((*name, Expect::Number)),
        Operand::Prev(inner) => operand_references(inner, out),
        _ => {}
    }
}

fn rule_references<'a>(rule: &'a Rule, out: &mut Vec<(&'a str, Expect)>) {
    match rule {
        Rule::Above { left, right }
        | Rule::Below { left, right }
        | Rule::AtLeast { left, right }
        | Rule::AtMost { left, right }
        | Rule::CrossAbove { left, right }
        | Rule::CrossBelow { left, right } => {
            operand_references(left, out);
            operand_references(right, out);
        }
        Rule::Enabled(toggle) => out.push((*toggle, Expect::Toggle)),
        Rule::Previous(inner) => rule_references(inner, out),
        Rule::And(rules) | Rule::Or(rules) => {
            for r in rules {
                rule_references(r, out);
            }
        }
        Rule::Is(_) => {}
    }
}

fn spec_references(planned: &PlannedIndicator) -> Vec<ParamRef> {
    use crate::domain::indicator_engine::IndicatorSpec as S;
    match &planned.spec {
        S::HeikinAshi => vec![],
        S::Resistance { window } => vec![*window],
        S::Rsi { period } | S::WilliamsR { period } | S::Sma { period, .. } => vec![*period],
        S::StochRsi {
            rsi_period,
            fastk_period,
            fastd_period,
        } => vec![*rsi_period, *fastk_period, *fastd_period],
        S::Macd { fast, slow, signal } => vec![*fast, *slow, *signal],
        S::Stoch {
            fastk_period,
            slowk_period,
            slowd_period,
        } => vec![*fastk_period, *slowk_period, *slowd_period],
        S::Sar {
            acceleration,
            maximum,
        } => vec![*acceleration, *maximum],
    }
}

impl Strategy {
    /// Check that every parameter the plan, rules and policy name exists
    /// with the right kind.
    pub fn validate(&self) -> Result<(), ScalptraderError> {
        let mut refs: Vec<(&str, Expect)> = Vec::new();
        for planned in &self.plan {
            if let Some(gate) = planned.gate {
                refs.push((gate, Expect::Toggle));
            }
            for r in spec_references(planned) {
                if let ParamRef::Named(name) = r {
                    refs.push((name, Expect::Number));
                }
            }
        }
        for block in &self.blocks {
            rule_references(&block.rule, &mut refs);
        }
        if let LeveragePolicy::Tiered {
            gate: Some(gate), ..
        } = &self.policy.leverage
        {
            refs.push((*gate, Expect::Toggle));
        }
        if let TimeoutPolicy::MaxMinutes(ParamRef::Named(name)) = self.policy.timeout {
            refs.push((name, Expect::Number));
        }

        for (name, expect) in refs {
            check_reference(&self.params, name, expect)?;
        }
        Ok(())
    }

    /// Same strategy with textual parameter overrides applied.
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Result<Self, ScalptraderError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        self.params = self.params.with_overrides(overrides)?;
        self.validate()?;
        Ok(self)
    }

    pub fn stoploss(&self) -> f64 {
        self.policy.stoploss.base()
    }

    fn apply(&self, mut frame: AnalyzedFrame, entry: bool) -> AnalyzedFrame {
        if frame.signals.len() != frame.len() {
            frame.signals = vec![SignalRow::default(); frame.len()];
        }
        for row in frame.signals.iter_mut() {
            if entry {
                row.enter_long = false;
                row.enter_short = false;
                row.enter_tags.clear();
            } else {
                row.exit_long = false;
                row.exit_short = false;
                row.exit_tags.clear();
            }
        }
        let ctx = EvalContext::new(&frame.candles, &frame.indicators, &self.params);
        apply_blocks(
            self.blocks.iter().filter(|b| b.signal.is_entry() == entry),
            &ctx,
            &mut frame.signals,
        );
        frame
    }

    /// Indicators, entries and exits in one pass.
    pub fn analyze(&self, bars: &[PriceBar], pair: &str) -> Result<AnalyzedFrame, ScalptraderError> {
        let frame = self.populate_indicators(bars, pair)?;
        let frame = self.populate_entry_trend(frame, pair);
        let frame = self.populate_exit_trend(frame, pair);
        let count = |f: fn(&SignalRow) -> bool| frame.signals.iter().filter(|r| f(r)).count();
        info!(
            strategy = self.name,
            pair,
            rows = frame.len(),
            enter_long = count(|r| r.enter_long),
            enter_short = count(|r| r.enter_short),
            exit_long = count(|r| r.exit_long),
            exit_short = count(|r| r.exit_short),
            "pair analyzed"
        );
        Ok(frame)
    }
}

impl StrategyPort for Strategy {
    fn name(&self) -> &str {
        self.name
    }

    fn timeframe(&self) -> &str {
        self.timeframe
    }

    fn populate_indicators(
        &self,
        bars: &[PriceBar],
        pair: &str,
    ) -> Result<AnalyzedFrame, ScalptraderError> {
        let candles = Candles::from_bars(bars)?;
        let indicators = compute_indicators(&candles, &self.plan, &self.params)?;
        debug!(
            strategy = self.name,
            pair,
            rows = candles.len(),
            columns = indicators.columns().len(),
            "indicators populated"
        );
        let signals = vec![SignalRow::default(); candles.len()];
        Ok(AnalyzedFrame {
            pair: pair.to_string(),
            candles,
            indicators,
            signals,
        })
    }

    fn populate_entry_trend(&self, frame: AnalyzedFrame, _pair: &str) -> AnalyzedFrame {
        self.apply(frame, true)
    }

    fn populate_exit_trend(&self, frame: AnalyzedFrame, _pair: &str) -> AnalyzedFrame {
        self.apply(frame, false)
    }

    fn custom_stoploss(
        &self,
        _pair: &str,
        _trade: &OpenTrade,
        _current_time: DateTime<Utc>,
        _current_rate: f64,
        current_profit: f64,
    ) -> f64 {
        self.policy.stoploss.stoploss(current_profit)
    }

    fn leverage(
        &self,
        pair: &str,
        snapshot: &Snapshot,
        _current_time: DateTime<Utc>,
        _current_rate: f64,
        _proposed_leverage: f64,
        max_leverage: f64,
        side: TradeSide,
    ) -> f64 {
        let leverage = self
            .policy
            .leverage
            .leverage(snapshot, &self.params, max_leverage);
        debug!(strategy = self.name, pair, %side, leverage, "leverage chosen");
        leverage
    }

    fn check_exit_timeout(
        &self,
        _pair: &str,
        trade: &OpenTrade,
        current_time: DateTime<Utc>,
        _current_rate: f64,
        _current_profit: f64,
    ) -> bool {
        self.policy.timeout.timed_out(trade, current_time, &self.params)
    }
}
