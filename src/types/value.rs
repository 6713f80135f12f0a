//! Decoded datapoint values

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single numeric element, raw or gain-scaled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    /// Multiply by a dictionary gain. Always yields a float.
    pub fn scaled(self, gain: f64) -> Self {
        Number::Float(self.as_f64() * gain)
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Number::Int(v) => v as f64,
            Number::Float(v) => v,
        }
    }

    pub fn as_i64(self) -> Option<i64> {
        match self {
            Number::Int(v) => Some(v),
            Number::Float(_) => None,
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(v) => write!(f, "{}", v),
            // Whole floats keep a `.0`
            Number::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{:.1}", v),
            Number::Float(v) => write!(f, "{}", v),
        }
    }
}

/// A point in time carried by a `TimeOfDay` datapoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamp {
    /// Seconds since the Unix epoch
    pub epoch_seconds: i64,
    /// ISO-8601 UTC rendering of `epoch_seconds`
    pub iso8601: String,
}

/// An enumeration member, with its dictionary label when one exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    pub raw: u8,
    pub label: Option<String>,
}

impl fmt::Display for EnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => f.write_str(label),
            None => write!(f, "{}", self.raw),
        }
    }
}

/// Output of the value decode engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecodedValue {
    /// A single numeric element
    Number(Number),
    /// Several numeric elements of an array datapoint
    Array(Vec<Number>),
    /// A `TimeOfDay` value
    Time(Timestamp),
    /// An `Enum` value
    Enum(EnumValue),
    /// A `VisibleString` value, NUL padding removed
    Text(String),
    /// Bytes that could not be interpreted with the descriptor
    Raw(Vec<u8>),
}

impl DecodedValue {
    /// Numeric elements of this value, empty for non-numeric values.
    pub fn numbers(&self) -> &[Number] {
        match self {
            DecodedValue::Number(n) => std::slice::from_ref(n),
            DecodedValue::Array(values) => values,
            _ => &[],
        }
    }
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::Number(n) => write!(f, "{}", n),
            DecodedValue::Array(values) => {
                f.write_str("[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                f.write_str("]")
            }
            DecodedValue::Time(ts) => write!(f, "{} ({})", ts.epoch_seconds, ts.iso8601),
            DecodedValue::Enum(e) => write!(f, "{}", e),
            DecodedValue::Text(s) => write!(f, "\"{}\"", s),
            DecodedValue::Raw(bytes) => write!(f, "raw:{}", hex::encode(bytes)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_forms() {
        assert_eq!(DecodedValue::Number(Number::Int(-3)).to_string(), "-3");
        assert_eq!(DecodedValue::Number(Number::Float(5.5)).to_string(), "5.5");
        assert_eq!(
            DecodedValue::Array(vec![Number::Int(1), Number::Int(2)]).to_string(),
            "[1, 2]"
        );
        assert_eq!(DecodedValue::Enum(EnumValue { raw: 2, label: None }).to_string(), "2");
        assert_eq!(
            DecodedValue::Enum(EnumValue { raw: 1, label: Some("on".into()) }).to_string(),
            "on"
        );
        assert_eq!(DecodedValue::Raw(vec![0xDE, 0xAD]).to_string(), "raw:dead");
        assert_eq!(DecodedValue::Text("BOILER".into()).to_string(), "\"BOILER\"");
    }

    #[test]
    fn whole_scaled_values_keep_a_fraction() {
        assert_eq!(Number::Int(1).scaled(2.0).to_string(), "2.0");
        assert_eq!(Number::Float(-3.0).to_string(), "-3.0");
        assert_eq!(
            DecodedValue::Array(vec![Number::Float(2.0), Number::Float(4.5), Number::Int(6)]).to_string(),
            "[2.0, 4.5, 6]"
        );
    }

    #[test]
    fn scaling_produces_floats() {
        let scaled = Number::Int(550).scaled(0.01);
        assert!(matches!(scaled, Number::Float(_)));
        assert!((scaled.as_f64() - 5.5).abs() < 1e-9);
        assert_eq!(scaled.as_i64(), None);
    }

    #[test]
    fn numbers_view() {
        let single = DecodedValue::Number(Number::Int(7));
        assert_eq!(single.numbers(), &[Number::Int(7)]);
        assert!(DecodedValue::Text("x".into()).numbers().is_empty());
    }
}
