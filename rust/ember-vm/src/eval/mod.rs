//! Operator evaluation over already-evaluated operands.
//!
//! Arithmetic and comparison are pure functions of their operands. The
//! assignment family additionally reads and writes through an
//! [`Environment`](crate::env::Environment).

pub mod access;
pub mod assign;
pub mod binary;
pub mod compare;
pub mod unary;

pub use access::{index_get, member_get, slice_range};
pub use assign::{assign, compound_assign, inc_dec, multi_assign, read_target, Target};
pub use binary::{eval_binary, eval_binary_with};
pub use compare::{eval_compare, eval_logical, values_equal};
pub use unary::{eval_unary, eval_unary_with};

use crate::error::EvalError;
use ember_core::Value;
use std::fmt::Display;

/// Error for an operator applied to operand kinds it has no rule for.
pub(crate) fn not_defined(op: impl Display, operands: &[&Value]) -> EvalError {
    let kinds: Vec<&str> = operands.iter().map(|v| v.type_name()).collect();
    EvalError::invalid(format!("operator {} not defined for {}", op, kinds.join(" and ")))
}
