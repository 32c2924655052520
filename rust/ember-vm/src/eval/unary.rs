//! Prefix operators: negate, complement, logical not.

use super::not_defined;
use crate::error::EvalResult;
use crate::ops::UnaryOp;
use crate::options::EvalOptions;
use ember_core::coerce::{to_bool, to_number};
use ember_core::Value;

pub fn eval_unary(op: UnaryOp, operand: &Value) -> EvalResult<Value> {
    eval_unary_with(op, operand, &EvalOptions::default())
}

pub fn eval_unary_with(op: UnaryOp, operand: &Value, options: &EvalOptions) -> EvalResult<Value> {
    if options.trace_operations {
        tracing::trace!(op = %op, operand = operand.type_name(), "unary");
    }
    match op {
        UnaryOp::Not => Ok(Value::Bool(!to_bool(operand))),
        UnaryOp::Neg => match operand {
            Value::Int(n) => Ok(Value::Int(n.wrapping_neg())),
            Value::Int32(n) => Ok(Value::Int(-i64::from(*n))),
            Value::Float(f) => Ok(Value::Float(-f)),
            Value::Float32(f) => Ok(Value::Float(-f64::from(*f))),
            // nil, bool, string and char negate through the float path: -0.0 for zero
            v if v.is_scalar() => Ok(Value::Float(-to_number(v).float)),
            v => Err(not_defined(op, &[v])),
        },
        // integer path: the complement of a zero coercion is -1
        UnaryOp::BitNot if operand.is_scalar() => Ok(Value::Int(!to_number(operand).int)),
        UnaryOp::BitNot => Err(not_defined(op, &[operand])),
    }
}
