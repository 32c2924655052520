//! Coercion rules: every value converts to a number, a boolean and a string.
//!
//! All three conversions are total. Operators that need something stricter
//! (for example refusing aggregates in arithmetic) check the operand kind
//! before they coerce.

use crate::values::Value;

/// Numeric view of a value.
///
/// `is_float` says whether an operator combining this operand must compute
/// in floating point. `int` is the value truncated toward zero, `float` the
/// value widened to `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Number {
    pub is_float: bool,
    pub int: i64,
    pub float: f64,
}

impl Number {
    pub const ZERO_FLOAT: Number = Number {
        is_float: true,
        int: 0,
        float: 0.0,
    };

    pub fn integral(n: i64) -> Self {
        Self {
            is_float: false,
            int: n,
            float: n as f64,
        }
    }

    pub fn floating(f: f64) -> Self {
        Self {
            is_float: true,
            int: truncate(f),
            float: f,
        }
    }

    /// The value as it would be emitted by an operator: `Int64` or `Float64`.
    pub fn to_value(self) -> Value {
        if self.is_float {
            Value::Float(self.float)
        } else {
            Value::Int(self.int)
        }
    }
}

/// Truncate toward zero. Saturates at the `i64` range; NaN becomes 0.
pub fn truncate(f: f64) -> i64 {
    f as i64
}

/// Parse a numeric literal: optionally signed, optional fraction and
/// exponent. Integers are tried first so `"7"` stays integral.
/// Surrounding whitespace is not accepted.
pub fn parse_number(s: &str) -> Option<Number> {
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        return Some(Number::integral(n));
    }
    s.parse::<f64>().ok().map(Number::floating)
}

/// Case-insensitive `"true"` / `"false"`.
pub fn parse_bool_literal(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Run `f` over the textual form of a string-like value without allocating
/// for chars. Returns `None` for every other kind.
pub fn with_text<R>(value: &Value, f: impl FnOnce(&str) -> R) -> Option<R> {
    match value {
        Value::String(s) => Some(f(s)),
        Value::Char(c) => {
            let mut buf = [0u8; 4];
            Some(f(c.encode_utf8(&mut buf)))
        }
        _ => None,
    }
}

/// Numeric coercion.
///
/// Strings, chars and nil always report `is_float`: an arithmetic operator
/// that has to coerce one of them computes in floating point. Aggregates,
/// callables and native handles read as zero.
pub fn to_number(value: &Value) -> Number {
    match value {
        Value::Nil => Number::ZERO_FLOAT,
        Value::Bool(b) => Number::integral(i64::from(*b)),
        Value::Int32(n) => Number::integral(i64::from(*n)),
        Value::Int(n) => Number::integral(*n),
        Value::Float32(f) => Number::floating(f64::from(*f)),
        Value::Float(f) => Number::floating(*f),
        Value::String(_) | Value::Char(_) => with_text(value, parse_number)
            .flatten()
            .map(|n| Number { is_float: true, ..n })
            .unwrap_or(Number::ZERO_FLOAT),
        Value::Slice(_) | Value::Map(_) | Value::Func(_) | Value::Native(_) => Number::ZERO_FLOAT,
    }
}

/// Truthiness used by `!`, `&&` and `||`.
pub fn to_bool(value: &Value) -> bool {
    match value {
        Value::Nil => false,
        Value::Bool(b) => *b,
        Value::Int32(n) => *n != 0,
        Value::Int(n) => *n != 0,
        Value::Float32(f) => *f != 0.0,
        Value::Float(f) => *f != 0.0,
        Value::String(_) | Value::Char(_) => with_text(value, text_truthiness).unwrap_or(false),
        Value::Slice(items) => !items.borrow().is_empty(),
        Value::Map(entries) => !entries.borrow().is_empty(),
        Value::Func(_) => true,
        Value::Native(native) => !native.is_nil(),
    }
}

fn text_truthiness(s: &str) -> bool {
    if let Some(b) = parse_bool_literal(s) {
        return b;
    }
    if s.eq_ignore_ascii_case("y") || s.eq_ignore_ascii_case("yes") {
        return true;
    }
    parse_number(s).is_some_and(|n| n.float != 0.0)
}

pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_string(),
        other => other.to_string(),
    }
}
