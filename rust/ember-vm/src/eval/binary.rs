//! Arithmetic, bitwise and shift operators.

use super::not_defined;
use crate::error::{EvalError, EvalResult};
use crate::ops::BinaryOp;
use crate::options::EvalOptions;
use ember_core::coerce::{to_display_string, to_number, truncate, Number};
use ember_core::Value;

/// Evaluate `left op right` with default options.
pub fn eval_binary(op: BinaryOp, left: &Value, right: &Value) -> EvalResult<Value> {
    eval_binary_with(op, left, right, &EvalOptions::default())
}

pub fn eval_binary_with(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    options: &EvalOptions,
) -> EvalResult<Value> {
    if options.trace_operations {
        tracing::trace!(op = %op, lhs = left.type_name(), rhs = right.type_name(), "binary");
    }
    let result = match op {
        BinaryOp::Add => add(left, right),
        BinaryOp::Mul => mul(left, right, options),
        BinaryOp::Sub => {
            numeric_operands(op, left, right).map(|(l, r)| arith(l, r, i64::wrapping_sub, |x, y| x - y))
        }
        BinaryOp::Div => numeric_operands(op, left, right).map(|(l, r)| Value::Float(l.float / r.float)),
        BinaryOp::Mod => {
            numeric_operands(op, left, right).and_then(|(l, r)| modulo(l.int, r.int).map(Value::Int))
        }
        BinaryOp::Pow => numeric_operands(op, left, right).map(|(l, r)| power(l, r)),
        BinaryOp::BitAnd => numeric_operands(op, left, right).map(|(l, r)| Value::Int(l.int & r.int)),
        BinaryOp::BitOr => numeric_operands(op, left, right).map(|(l, r)| Value::Int(l.int | r.int)),
        BinaryOp::Shl | BinaryOp::Shr => numeric_operands(op, left, right)
            .and_then(|(l, r)| shift(op, l.int, r.int).map(Value::Int)),
    };
    if let Err(err) = &result {
        tracing::debug!(op = %op, error = %err, "binary operator failed");
    }
    result
}

/// Coerce both operands for a numeric operator. Only scalars qualify.
fn numeric_operands(op: BinaryOp, left: &Value, right: &Value) -> EvalResult<(Number, Number)> {
    if !left.is_scalar() || !right.is_scalar() {
        return Err(not_defined(op, &[left, right]));
    }
    Ok((to_number(left), to_number(right)))
}

/// Integer arithmetic when both sides are integral, float otherwise.
fn arith(l: Number, r: Number, int_op: fn(i64, i64) -> i64, float_op: fn(f64, f64) -> f64) -> Value {
    if l.is_float || r.is_float {
        Value::Float(float_op(l.float, r.float))
    } else {
        Value::Int(int_op(l.int, r.int))
    }
}

fn add(left: &Value, right: &Value) -> EvalResult<Value> {
    match (left, right) {
        (Value::Native(_), _) | (_, Value::Native(_)) => Err(not_defined(BinaryOp::Add, &[left, right])),
        (Value::String(_), _) | (_, Value::String(_)) => {
            Ok(Value::from(to_display_string(left) + &to_display_string(right)))
        }
        (Value::Slice(a), Value::Slice(b)) => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::new_slice(items))
        }
        _ => numeric_operands(BinaryOp::Add, left, right)
            .map(|(l, r)| arith(l, r, i64::wrapping_add, |x, y| x + y)),
    }
}

fn mul(left: &Value, right: &Value, options: &EvalOptions) -> EvalResult<Value> {
    if let (Value::String(s), Value::Int(_) | Value::Int32(_)) = (left, right) {
        return repeat(s, to_number(right).int, options);
    }
    numeric_operands(BinaryOp::Mul, left, right).map(|(l, r)| arith(l, r, i64::wrapping_mul, |x, y| x * y))
}

fn repeat(s: &str, count: i64, options: &EvalOptions) -> EvalResult<Value> {
    if count <= 0 || s.is_empty() {
        return Ok(Value::from(""));
    }
    let count = usize::try_from(count).map_err(|_| EvalError::invalid("repeat count out of range"))?;
    let len = s
        .len()
        .checked_mul(count)
        .ok_or_else(|| EvalError::invalid("string repetition overflows"))?;
    if let Some(limit) = options.max_string_repeat {
        if len > limit {
            return Err(EvalError::invalid(format!(
                "string repetition of {} bytes exceeds limit of {}",
                len, limit
            )));
        }
    }
    let mut out = String::new();
    out.try_reserve_exact(len)
        .map_err(|_| EvalError::invalid(format!("string repetition of {} bytes cannot be allocated", len)))?;
    for _ in 0..count {
        out.push_str(s);
    }
    Ok(Value::from(out))
}

fn modulo(l: i64, r: i64) -> EvalResult<i64> {
    if r == 0 {
        return Err(EvalError::invalid("integer modulo by zero"));
    }
    Ok(l.wrapping_rem(r))
}

/// The result kind follows the base.
fn power(base: Number, exp: Number) -> Value {
    if base.is_float {
        return Value::Float(base.float.powf(exp.float));
    }
    if !exp.is_float && exp.int >= 0 {
        return Value::Int(wrapping_pow(base.int, exp.int as u64));
    }
    Value::Int(truncate(base.float.powf(exp.float)))
}

/// Square-and-multiply with two's-complement wrap-around.
fn wrapping_pow(mut base: i64, mut exp: u64) -> i64 {
    let mut acc: i64 = 1;
    while exp > 0 {
        if exp & 1 == 1 {
            acc = acc.wrapping_mul(base);
        }
        base = base.wrapping_mul(base);
        exp >>= 1;
    }
    acc
}

/// Counts of 64 or more shift everything out (`>>` fills with the sign).
fn shift(op: BinaryOp, value: i64, count: i64) -> EvalResult<i64> {
    if count < 0 {
        return Err(EvalError::invalid(format!("negative shift count {}", count)));
    }
    let count = u32::try_from(count).unwrap_or(u32::MAX);
    Ok(match op {
        BinaryOp::Shl => value.checked_shl(count).unwrap_or(0),
        _ => value
            .checked_shr(count)
            .unwrap_or(if value < 0 { -1 } else { 0 }),
    })
}
