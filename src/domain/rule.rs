//! Rule AST data structures.
//!
//! This module defines the declarative predicates signals are built from:
//! - `Operand`: What can be compared (price fields, constants, parameters, columns)
//! - `Rule`: Comparison, crossover, flag, toggle and composite predicates
//! - `RuleBlock`: A named rule that raises one signal
//! - `SignalRow`: The four signal flags of one row plus the blocks that fired

use crate::domain::indicator::{Column, Flag};
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Open,
    High,
    Low,
    Close,
    Volume,
    Constant(f64),
    /// Current value of a numeric parameter.
    Param(&'static str),
    Column(Column),
    /// The operand's value on the previous row.
    Prev(Box<Operand>),
}

impl Operand {
    pub fn prev(operand: Operand) -> Self {
        Operand::Prev(Box::new(operand))
    }
}

impl From<Column> for Operand {
    fn from(column: Column) -> Self {
        Operand::Column(column)
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Constant(v)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Open => write!(f, "open"),
            Operand::High => write!(f, "high"),
            Operand::Low => write!(f, "low"),
            Operand::Close => write!(f, "close"),
            Operand::Volume => write!(f, "volume"),
            Operand::Constant(v) => write!(f, "{}", v),
            Operand::Param(name) => write!(f, "${}", name),
            Operand::Column(c) => write!(f, "{}", c),
            Operand::Prev(inner) => write!(f, "{}[-1]", inner),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Above { left: Operand, right: Operand },
    Below { left: Operand, right: Operand },
    AtLeast { left: Operand, right: Operand },
    AtMost { left: Operand, right: Operand },
    /// left > right now and left <= right on the previous row.
    CrossAbove { left: Operand, right: Operand },
    /// left < right now and left >= right on the previous row.
    CrossBelow { left: Operand, right: Operand },
    Is(Flag),
    /// A boolean toggle parameter is switched on.
    Enabled(&'static str),
    /// The inner rule held on the previous row.
    Previous(Box<Rule>),
    And(Vec<Rule>),
    Or(Vec<Rule>),
}

impl Rule {
    pub fn above(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Rule::Above {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn below(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Rule::Below {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn at_least(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Rule::AtLeast {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn at_most(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Rule::AtMost {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn cross_above(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Rule::CrossAbove {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn cross_below(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Rule::CrossBelow {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn previous(rule: Rule) -> Self {
        Rule::Previous(Box::new(rule))
    }
}

fn join(f: &mut fmt::Formatter<'_>, rules: &[Rule], sep: &str) -> fmt::Result {
    write!(f, "(")?;
    for (i, rule) in rules.iter().enumerate() {
        if i > 0 {
            write!(f, " {} ", sep)?;
        }
        write!(f, "{}", rule)?;
    }
    write!(f, ")")
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Above { left, right } => write!(f, "{} > {}", left, right),
            Rule::Below { left, right } => write!(f, "{} < {}", left, right),
            Rule::AtLeast { left, right } => write!(f, "{} >= {}", left, right),
            Rule::AtMost { left, right } => write!(f, "{} <= {}", left, right),
            Rule::CrossAbove { left, right } => write!(f, "cross_above({}, {})", left, right),
            Rule::CrossBelow { left, right } => write!(f, "cross_below({}, {})", left, right),
            Rule::Is(flag) => write!(f, "{}", flag),
            Rule::Enabled(toggle) => write!(f, "${}", toggle),
            Rule::Previous(inner) => write!(f, "prev({})", inner),
            Rule::And(rules) => join(f, rules, "and"),
            Rule::Or(rules) => join(f, rules, "or"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    EnterLong,
    EnterShort,
    ExitLong,
    ExitShort,
}

impl SignalKind {
    pub fn is_entry(self) -> bool {
        matches!(self, SignalKind::EnterLong | SignalKind::EnterShort)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::EnterLong => write!(f, "enter_long"),
            SignalKind::EnterShort => write!(f, "enter_short"),
            SignalKind::ExitLong => write!(f, "exit_long"),
            SignalKind::ExitShort => write!(f, "exit_short"),
        }
    }
}

/// A named rule raising one signal. Blocks targeting the same signal are
/// OR-ed together.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleBlock {
    pub name: &'static str,
    pub signal: SignalKind,
    pub rule: Rule,
}

impl RuleBlock {
    /// A block whose rule is the AND of `predicates`.
    pub fn all(name: &'static str, signal: SignalKind, predicates: Vec<Rule>) -> Self {
        Self {
            name,
            signal,
            rule: Rule::And(predicates),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignalRow {
    pub enter_long: bool,
    pub enter_short: bool,
    pub exit_long: bool,
    pub exit_short: bool,
    /// Names of the entry blocks that fired on this row.
    pub enter_tags: Vec<&'static str>,
    /// Names of the exit blocks that fired on this row.
    pub exit_tags: Vec<&'static str>,
}

impl SignalRow {
    pub fn get(&self, kind: SignalKind) -> bool {
        match kind {
            SignalKind::EnterLong => self.enter_long,
            SignalKind::EnterShort => self.enter_short,
            SignalKind::ExitLong => self.exit_long,
            SignalKind::ExitShort => self.exit_short,
        }
    }

    /// Raise `kind` and record the block that raised it.
    pub fn raise(&mut self, kind: SignalKind, block: &'static str) {
        match kind {
            SignalKind::EnterLong => self.enter_long = true,
            SignalKind::EnterShort => self.enter_short = true,
            SignalKind::ExitLong => self.exit_long = true,
            SignalKind::ExitShort => self.exit_short = true,
        }
        let tags = if kind.is_entry() {
            &mut self.enter_tags
        } else {
            &mut self.exit_tags
        };
        if !tags.contains(&block) {
            tags.push(block);
        }
    }
}
