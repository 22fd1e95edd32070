//! Rule evaluation engine.
//!
//! Evaluates rules against candles, pre-computed indicator columns and the
//! current parameter values.
//!
//! # Evaluation Semantics
//!
//! - Any comparison touching an undefined value (NaN warm-up row, absent
//!   column, unknown parameter) is `false`
//! - `Prev`, `Previous`, `CROSS_ABOVE`/`CROSS_BELOW`: return `false` at index 0
//! - `AND`: Short-circuits on first `false`
//! - `OR`: Short-circuits on first `true`
//! - Rule blocks are all evaluated; each signal is the OR of its blocks

use crate::domain::indicator::IndicatorFrame;
use crate::domain::ohlcv::Candles;
use crate::domain::params::ParameterSpace;
use crate::domain::rule::{Operand, Rule, RuleBlock, SignalRow};
use tracing::debug;

/// Everything a rule can read.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub candles: &'a Candles,
    pub frame: &'a IndicatorFrame,
    pub params: &'a ParameterSpace,
}

impl<'a> EvalContext<'a> {
    pub fn new(candles: &'a Candles, frame: &'a IndicatorFrame, params: &'a ParameterSpace) -> Self {
        Self {
            candles,
            frame,
            params,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

pub fn resolve_operand(operand: &Operand, ctx: &EvalContext<'_>, index: usize) -> Option<f64> {
    let price = |values: &[f64]| values.get(index).copied();
    let value = match operand {
        Operand::Open => price(&ctx.candles.open),
        Operand::High => price(&ctx.candles.high),
        Operand::Low => price(&ctx.candles.low),
        Operand::Close => price(&ctx.candles.close),
        Operand::Volume => price(&ctx.candles.volume),
        Operand::Constant(v) => Some(*v),
        Operand::Param(name) => ctx.params.number(name),
        Operand::Column(column) => ctx.frame.value(*column, index),
        Operand::Prev(inner) => index
            .checked_sub(1)
            .and_then(|prev| resolve_operand(inner, ctx, prev)),
    };
    value.filter(|v| !v.is_nan())
}

fn compare(
    left: &Operand,
    right: &Operand,
    ctx: &EvalContext<'_>,
    index: usize,
    op: fn(f64, f64) -> bool,
) -> bool {
    match (
        resolve_operand(left, ctx, index),
        resolve_operand(right, ctx, index),
    ) {
        (Some(l), Some(r)) => op(l, r),
        _ => false,
    }
}

fn crossed(
    left: &Operand,
    right: &Operand,
    ctx: &EvalContext<'_>,
    index: usize,
    now: fn(f64, f64) -> bool,
    before: fn(f64, f64) -> bool,
) -> bool {
    if index == 0 {
        return false;
    }
    compare(left, right, ctx, index, now) && compare(left, right, ctx, index - 1, before)
}

pub fn evaluate(rule: &Rule, ctx: &EvalContext<'_>, index: usize) -> bool {
    match rule {
        Rule::Above { left, right } => compare(left, right, ctx, index, |l, r| l > r),
        Rule::Below { left, right } => compare(left, right, ctx, index, |l, r| l < r),
        Rule::AtLeast { left, right } => compare(left, right, ctx, index, |l, r| l >= r),
        Rule::AtMost { left, right } => compare(left, right, ctx, index, |l, r| l <= r),
        Rule::CrossAbove { left, right } => {
            crossed(left, right, ctx, index, |l, r| l > r, |l, r| l <= r)
        }
        Rule::CrossBelow { left, right } => {
            crossed(left, right, ctx, index, |l, r| l < r, |l, r| l >= r)
        }
        Rule::Is(flag) => ctx.frame.flag(*flag, index),
        Rule::Enabled(toggle) => ctx.params.enabled(toggle),
        Rule::Previous(inner) => index
            .checked_sub(1)
            .is_some_and(|prev| evaluate(inner, ctx, prev)),
        Rule::And(rules) => {
            for r in rules {
                if !evaluate(r, ctx, index) {
                    return false;
                }
            }
            true
        }
        Rule::Or(rules) => {
            for r in rules {
                if evaluate(r, ctx, index) {
                    return true;
                }
            }
            false
        }
    }
}

/// Evaluate `rule` on every row.
pub fn evaluate_series(rule: &Rule, ctx: &EvalContext<'_>) -> Vec<bool> {
    (0..ctx.len()).map(|i| evaluate(rule, ctx, i)).collect()
}

/// OR each block into `rows`, recording which blocks fired.
pub fn apply_blocks<'b, I>(blocks: I, ctx: &EvalContext<'_>, rows: &mut [SignalRow])
where
    I: IntoIterator<Item = &'b RuleBlock>,
{
    for block in blocks {
        let mut hits = 0usize;
        for (index, row) in rows.iter_mut().enumerate() {
            if evaluate(&block.rule, ctx, index) {
                row.raise(block.signal, block.name);
                hits += 1;
            }
        }
        debug!(block = block.name, signal = %block.signal, hits, "rule block evaluated");
    }
}

/// One `SignalRow` per candle, every block applied.
pub fn compose_signals(blocks: &[RuleBlock], ctx: &EvalContext<'_>) -> Vec<SignalRow> {
    let mut rows = vec![SignalRow::default(); ctx.len()];
    apply_blocks(blocks, ctx, &mut rows);
    rows
}
