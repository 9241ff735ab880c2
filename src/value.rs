//! Tagged runtime content of a field
//!
//! A [`Value`] is exactly one of text, integer, real or boolean. Fields fix
//! their variant at construction, so every assignment goes through
//! [`Value::coerce_to`] rather than replacing the variant.

use crate::error::{RecordError, RecordResult};
use std::fmt;
use std::str::FromStr;

/// Runtime value held by a field
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Integer(i64),
    Real(f64),
    Boolean(bool),
}

/// The variant tag of a [`Value`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Real,
    Boolean,
}

#[derive(Debug, Clone, Copy)]
enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl ArithOp {
    fn name(self) -> &'static str {
        match self {
            ArithOp::Add => "add",
            ArithOp::Subtract => "subtract",
            ArithOp::Multiply => "multiply",
            ArithOp::Divide => "divide",
        }
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Text(_) => ValueKind::Text,
            Value::Integer(_) => ValueKind::Integer,
            Value::Real(_) => ValueKind::Real,
            Value::Boolean(_) => ValueKind::Boolean,
        }
    }

    /// Zero value of the given variant
    pub fn zero(kind: ValueKind) -> Self {
        match kind {
            ValueKind::Text => Value::Text(String::new()),
            ValueKind::Integer => Value::Integer(0),
            ValueKind::Real => Value::Real(0.0),
            ValueKind::Boolean => Value::Boolean(false),
        }
    }

    pub fn is_numeric_kind(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Real(_))
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Real(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness used when a boolean target receives another variant
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Text(s) => !s.trim().is_empty(),
            Value::Integer(n) => *n != 0,
            Value::Real(x) => *x != 0.0,
            Value::Boolean(b) => *b,
        }
    }

    /// Convert this value into the requested variant.
    ///
    /// Numeric targets parse text leniently: text that does not parse becomes
    /// the zero of the target type instead of an error. Real to integer
    /// truncates toward zero.
    pub fn coerce_to(&self, kind: ValueKind) -> Value {
        match kind {
            ValueKind::Text => match self {
                Value::Text(s) => Value::Text(s.clone()),
                other => Value::Text(other.to_string()),
            },
            ValueKind::Integer => Value::Integer(match self {
                Value::Integer(n) => *n,
                Value::Real(x) => *x as i64,
                Value::Boolean(b) => i64::from(*b),
                Value::Text(s) => parse_or_zero(s, kind),
            }),
            ValueKind::Real => Value::Real(match self {
                Value::Integer(n) => *n as f64,
                Value::Real(x) => *x,
                Value::Boolean(b) => f64::from(u8::from(*b)),
                Value::Text(s) => parse_or_zero(s, kind),
            }),
            ValueKind::Boolean => Value::Boolean(self.is_truthy()),
        }
    }

    /// Strict parse of `text` into `kind`; `None` when the text does not parse
    /// or the kind has no textual form.
    pub fn parse_as(text: &str, kind: ValueKind) -> Option<Value> {
        match kind {
            ValueKind::Text => Some(Value::Text(text.to_string())),
            ValueKind::Integer => text.trim().parse().ok().map(Value::Integer),
            ValueKind::Real => text.trim().parse().ok().map(Value::Real),
            ValueKind::Boolean => None,
        }
    }

    pub fn add(&self, rhs: &Value) -> RecordResult<Value> {
        self.arithmetic(rhs, ArithOp::Add)
    }

    pub fn subtract(&self, rhs: &Value) -> RecordResult<Value> {
        self.arithmetic(rhs, ArithOp::Subtract)
    }

    pub fn multiply(&self, rhs: &Value) -> RecordResult<Value> {
        self.arithmetic(rhs, ArithOp::Multiply)
    }

    /// Exact integer quotients stay integers, anything else becomes real
    pub fn divide(&self, rhs: &Value) -> RecordResult<Value> {
        self.arithmetic(rhs, ArithOp::Divide)
    }

    fn arithmetic(&self, rhs: &Value, op: ArithOp) -> RecordResult<Value> {
        let name = op.name();
        if let (Value::Integer(a), Value::Integer(b)) = (self, rhs) {
            let (a, b) = (*a, *b);
            let result = match op {
                ArithOp::Add => a.checked_add(b),
                ArithOp::Subtract => a.checked_sub(b),
                ArithOp::Multiply => a.checked_mul(b),
                ArithOp::Divide => {
                    if b == 0 {
                        return Err(RecordError::DivideByZero);
                    }
                    match a.checked_rem(b) {
                        Some(0) => a.checked_div(b),
                        Some(_) => return Ok(Value::Real(a as f64 / b as f64)),
                        None => None,
                    }
                }
            };
            return result
                .map(Value::Integer)
                .ok_or_else(|| RecordError::overflow(name));
        }

        let a = self
            .as_f64()
            .ok_or_else(|| RecordError::invalid_operand(name, self.kind()))?;
        let b = rhs
            .as_f64()
            .ok_or_else(|| RecordError::invalid_operand(name, rhs.kind()))?;
        let result = match op {
            ArithOp::Add => a + b,
            ArithOp::Subtract => a - b,
            ArithOp::Multiply => a * b,
            ArithOp::Divide => {
                if b == 0.0 {
                    return Err(RecordError::DivideByZero);
                }
                a / b
            }
        };
        Ok(Value::Real(result))
    }
}

fn parse_or_zero<T: FromStr + Default>(text: &str, kind: ValueKind) -> T {
    match text.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            tracing::debug!(input = text, %kind, "numeric parse failed, substituting zero");
            T::default()
        }
    }
}

/// Reals always print with a decimal point so `3` renders as `3.0`
fn format_real(x: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if x.is_finite() && x.fract() == 0.0 && x.abs() < 1e16 {
        write!(f, "{x:.1}")
    } else {
        write!(f, "{x}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Real(x) => format_real(*x, f),
            Value::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Text => "text",
            ValueKind::Integer => "integer",
            ValueKind::Real => "real",
            ValueKind::Boolean => "boolean",
        };
        write!(f, "{name}")
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Real(b)) | (Value::Real(b), Value::Integer(a)) => {
                *a as f64 == *b
            }
            _ => false,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Real(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_forms() {
        assert_eq!(Value::from("AB C").to_string(), "AB C");
        assert_eq!(Value::from(-42).to_string(), "-42");
        assert_eq!(Value::from(3.0).to_string(), "3.0");
        assert_eq!(Value::from(2.25).to_string(), "2.25");
        assert_eq!(Value::from(true).to_string(), "true");
    }

    #[test]
    fn test_lenient_numeric_coercion() {
        assert_eq!(Value::from("xyz").coerce_to(ValueKind::Integer), Value::Integer(0));
        assert_eq!(Value::from(" 017 ").coerce_to(ValueKind::Integer), Value::Integer(17));
        assert_eq!(Value::from("3.5").coerce_to(ValueKind::Integer), Value::Integer(0));
        assert_eq!(Value::from("3.5").coerce_to(ValueKind::Real), Value::Real(3.5));
        assert_eq!(Value::from("").coerce_to(ValueKind::Real), Value::Real(0.0));
        assert_eq!(Value::from(9.9).coerce_to(ValueKind::Integer), Value::Integer(9));
        assert_eq!(Value::from(-9.9).coerce_to(ValueKind::Integer), Value::Integer(-9));
    }

    #[test]
    fn test_coercion_to_text_and_boolean() {
        assert_eq!(Value::from(12).coerce_to(ValueKind::Text), Value::from("12"));
        assert_eq!(Value::from(1.0).coerce_to(ValueKind::Text), Value::from("1.0"));
        assert_eq!(Value::from("  ").coerce_to(ValueKind::Boolean), Value::from(false));
        assert_eq!(Value::from(2).coerce_to(ValueKind::Boolean), Value::from(true));
    }

    #[test]
    fn test_strict_parse() {
        assert_eq!(Value::parse_as("12", ValueKind::Integer), Some(Value::Integer(12)));
        assert_eq!(Value::parse_as("1x", ValueKind::Integer), None);
        assert_eq!(Value::parse_as("1.5", ValueKind::Real), Some(Value::Real(1.5)));
        assert_eq!(Value::parse_as("true", ValueKind::Boolean), None);
    }

    #[test]
    fn test_integer_arithmetic() {
        let a = Value::from(7);
        assert_eq!(a.add(&Value::from(3)).expect("add"), Value::Integer(10));
        assert_eq!(a.subtract(&Value::from(10)).expect("subtract"), Value::Integer(-3));
        assert_eq!(a.multiply(&Value::from(6)).expect("multiply"), Value::Integer(42));
        assert!(matches!(a.divide(&Value::from(7)).expect("divide"), Value::Integer(1)));
        assert!(matches!(a.divide(&Value::from(2)).expect("divide"), Value::Real(x) if x == 3.5));
    }

    #[test]
    fn test_mixed_arithmetic_promotes_to_real() {
        let result = Value::from(2).multiply(&Value::from(1.5)).expect("multiply");
        assert!(matches!(result, Value::Real(x) if x == 3.0));
    }

    #[test]
    fn test_arithmetic_failures() {
        assert!(matches!(
            Value::from("10").add(&Value::from(1)),
            Err(RecordError::InvalidOperand { .. })
        ));
        assert!(matches!(
            Value::from(1).add(&Value::from(true)),
            Err(RecordError::InvalidOperand { kind, .. }) if kind == "boolean"
        ));
        assert!(matches!(
            Value::from(1).divide(&Value::from(0)),
            Err(RecordError::DivideByZero)
        ));
        assert!(matches!(
            Value::from(1.0).divide(&Value::from(0.0)),
            Err(RecordError::DivideByZero)
        ));
        assert!(matches!(
            Value::from(i64::MAX).add(&Value::from(1)),
            Err(RecordError::Overflow { .. })
        ));
        assert!(matches!(
            Value::from(i64::MIN).divide(&Value::from(-1)),
            Err(RecordError::Overflow { .. })
        ));
    }

    #[test]
    fn test_equality() {
        assert_eq!(Value::from(5), Value::from(5.0));
        assert_ne!(Value::from("5"), Value::from(5));
        assert_ne!(Value::from(true), Value::from(1));
    }
}
