//! Tunable strategy parameters.
//!
//! Each parameter declares a range, a default and the optimization space it
//! belongs to. A `ParameterSpace` is validated once when it is built and is
//! read-only afterwards; overrides produce a new space.

use crate::domain::error::ScalptraderError;
use std::fmt;

/// Optimization space a parameter is searched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Space {
    Entry,
    Exit,
    Both,
}

impl fmt::Display for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Space::Entry => write!(f, "buy"),
            Space::Exit => write!(f, "sell"),
            Space::Both => write!(f, "buy_sell"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamValue {
    Int(i64),
    Decimal(f64),
    Bool(bool),
}

impl ParamValue {
    /// Numeric view; booleans have none.
    pub fn as_f64(self) -> Option<f64> {
        match self {
            ParamValue::Int(v) => Some(v as f64),
            ParamValue::Decimal(v) => Some(v),
            ParamValue::Bool(_) => None,
        }
    }

    pub fn as_bool(self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(b),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Decimal(v) => write!(f, "{}", v),
            ParamValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamKind {
    Int { low: i64, high: i64 },
    Decimal { low: f64, high: f64 },
    Bool,
}

impl ParamKind {
    pub fn type_name(self) -> &'static str {
        match self {
            ParamKind::Int { .. } => "integer",
            ParamKind::Decimal { .. } => "decimal",
            ParamKind::Bool => "boolean",
        }
    }

    /// Declared bounds as floats, `None` for booleans.
    pub fn bounds(self) -> Option<(f64, f64)> {
        match self {
            ParamKind::Int { low, high } => Some((low as f64, high as f64)),
            ParamKind::Decimal { low, high } => Some((low, high)),
            ParamKind::Bool => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParamKind,
    pub default: ParamValue,
    pub value: ParamValue,
    pub space: Space,
}

impl Parameter {
    /// Integer parameter; bounds may be given in either order.
    pub fn int(name: &str, low: i64, high: i64, default: i64, space: Space) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Int {
                low: low.min(high),
                high: low.max(high),
            },
            default: ParamValue::Int(default),
            value: ParamValue::Int(default),
            space,
        }
    }

    /// Decimal parameter; bounds may be given in either order.
    pub fn decimal(name: &str, low: f64, high: f64, default: f64, space: Space) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Decimal {
                low: low.min(high),
                high: low.max(high),
            },
            default: ParamValue::Decimal(default),
            value: ParamValue::Decimal(default),
            space,
        }
    }

    pub fn boolean(name: &str, default: bool, space: Space) -> Self {
        Self {
            name: name.to_string(),
            kind: ParamKind::Bool,
            default: ParamValue::Bool(default),
            value: ParamValue::Bool(default),
            space,
        }
    }

    fn check(&self, value: ParamValue) -> Result<(), ScalptraderError> {
        let type_error = || ScalptraderError::ParameterType {
            name: self.name.clone(),
            expected: self.kind.type_name(),
            got: value.to_string(),
        };
        match (self.kind, value) {
            (ParamKind::Int { .. }, ParamValue::Int(_))
            | (ParamKind::Decimal { .. }, ParamValue::Decimal(_))
            | (ParamKind::Bool, ParamValue::Bool(_)) => {}
            _ => return Err(type_error()),
        }

        if let (Some((low, high)), Some(v)) = (self.kind.bounds(), value.as_f64()) {
            if !(v >= low && v <= high) {
                return Err(ScalptraderError::ParameterOutOfRange {
                    name: self.name.clone(),
                    value: v,
                    low,
                    high,
                });
            }
        }
        Ok(())
    }

    /// Parse a textual override according to this parameter's kind.
    fn parse(&self, raw: &str) -> Result<ParamValue, ScalptraderError> {
        let raw = raw.trim();
        let type_error = || ScalptraderError::ParameterType {
            name: self.name.clone(),
            expected: self.kind.type_name(),
            got: raw.to_string(),
        };
        match self.kind {
            ParamKind::Int { .. } => raw
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|_| type_error()),
            ParamKind::Decimal { .. } => raw
                .parse::<f64>()
                .map(ParamValue::Decimal)
                .map_err(|_| type_error()),
            ParamKind::Bool => match raw.to_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(ParamValue::Bool(true)),
                "false" | "no" | "0" => Ok(ParamValue::Bool(false)),
                _ => Err(type_error()),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSpace {
    params: Vec<Parameter>,
}

impl ParameterSpace {
    /// Validate names and defaults.
    pub fn new(params: Vec<Parameter>) -> Result<Self, ScalptraderError> {
        for (i, p) in params.iter().enumerate() {
            if params[..i].iter().any(|q| q.name == p.name) {
                return Err(ScalptraderError::ConfigInvalid {
                    section: "parameters".into(),
                    key: p.name.clone(),
                    reason: "declared twice".into(),
                });
            }
            p.check(p.default)?;
            p.check(p.value)?;
        }
        Ok(Self { params })
    }

    pub fn get(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Current numeric value of `name`; `None` if unknown or boolean.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|p| p.value.as_f64())
    }

    /// Current value of a boolean toggle; unknown names read as disabled.
    pub fn enabled(&self, name: &str) -> bool {
        self.get(name)
            .and_then(|p| p.value.as_bool())
            .unwrap_or(false)
    }

    /// New space with one value replaced.
    pub fn with_value(&self, name: &str, value: ParamValue) -> Result<Self, ScalptraderError> {
        let mut params = self.params.clone();
        let param = params
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| ScalptraderError::UnknownParameter {
                name: name.to_string(),
            })?;
        param.check(value)?;
        param.value = value;
        Ok(Self { params })
    }

    /// New space with textual overrides applied, e.g. from a config file.
    pub fn with_overrides<'a, I>(&self, overrides: I) -> Result<Self, ScalptraderError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut space = self.clone();
        for (name, raw) in overrides {
            let param = space
                .get(name)
                .ok_or_else(|| ScalptraderError::UnknownParameter {
                    name: name.to_string(),
                })?;
            let value = param.parse(raw)?;
            space = space.with_value(name, value)?;
        }
        Ok(space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ParameterSpace {
        ParameterSpace::new(vec![
            Parameter::int("rsi_period", 5, 25, 14, Space::Both),
            Parameter::decimal("williams_lower", -88.0, -94.0, -92.0, Space::Both),
            Parameter::boolean("use_rsi", true, Space::Both),
            Parameter::decimal("take_profit", 0.01, 0.05, 0.02, Space::Exit),
        ])
        .unwrap()
    }

    #[test]
    fn defaults_are_current_values() {
        let space = sample();
        assert_eq!(space.number("rsi_period"), Some(14.0));
        assert_eq!(space.number("williams_lower"), Some(-92.0));
        assert!(space.enabled("use_rsi"));
        assert_eq!(space.len(), 4);
    }

    #[test]
    fn reversed_bounds_are_normalized() {
        let space = sample();
        let p = space.get("williams_lower").unwrap();
        assert_eq!(p.kind.bounds(), Some((-94.0, -88.0)));
    }

    #[test]
    fn unknown_toggle_reads_disabled() {
        assert!(!sample().enabled("use_williams"));
        assert_eq!(sample().number("use_rsi"), None);
    }

    #[test]
    fn default_out_of_range_rejected() {
        let err = ParameterSpace::new(vec![Parameter::int("p", 1, 5, 9, Space::Entry)]).unwrap_err();
        assert!(matches!(err, ScalptraderError::ParameterOutOfRange { .. }));
    }

    #[test]
    fn duplicate_name_rejected() {
        let err = ParameterSpace::new(vec![
            Parameter::int("p", 1, 5, 2, Space::Entry),
            Parameter::boolean("p", true, Space::Entry),
        ])
        .unwrap_err();
        assert!(matches!(err, ScalptraderError::ConfigInvalid { .. }));
    }

    #[test]
    fn with_value_validates_range() {
        let space = sample();
        let ok = space.with_value("rsi_period", ParamValue::Int(20)).unwrap();
        assert_eq!(ok.number("rsi_period"), Some(20.0));
        // receiver unchanged
        assert_eq!(space.number("rsi_period"), Some(14.0));

        let err = space.with_value("rsi_period", ParamValue::Int(30)).unwrap_err();
        assert!(matches!(err, ScalptraderError::ParameterOutOfRange { .. }));
    }

    #[test]
    fn with_value_rejects_wrong_type() {
        let err = sample()
            .with_value("use_rsi", ParamValue::Int(1))
            .unwrap_err();
        assert!(matches!(err, ScalptraderError::ParameterType { .. }));
    }

    #[test]
    fn overrides_parse_by_kind() {
        let space = sample()
            .with_overrides([
                ("rsi_period", "10"),
                ("williams_lower", "-90.5"),
                ("use_rsi", "no"),
            ])
            .unwrap();
        assert_eq!(space.number("rsi_period"), Some(10.0));
        assert_eq!(space.number("williams_lower"), Some(-90.5));
        assert!(!space.enabled("use_rsi"));
    }

    #[test]
    fn overrides_reject_unknown_and_garbage() {
        let err = sample().with_overrides([("nope", "1")]).unwrap_err();
        assert!(matches!(err, ScalptraderError::UnknownParameter { .. }));

        let err = sample().with_overrides([("rsi_period", "ten")]).unwrap_err();
        assert!(matches!(err, ScalptraderError::ParameterType { .. }));

        let err = sample().with_overrides([("take_profit", "0.5")]).unwrap_err();
        assert!(matches!(err, ScalptraderError::ParameterOutOfRange { .. }));
    }

    #[test]
    fn space_display_matches_host_names() {
        assert_eq!(Space::Entry.to_string(), "buy");
        assert_eq!(Space::Exit.to_string(), "sell");
        assert_eq!(Space::Both.to_string(), "buy_sell");
    }
}
