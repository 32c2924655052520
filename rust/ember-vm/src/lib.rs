//! Ember VM
//!
//! Operator evaluation for Ember scripts: binary, unary, comparison and
//! logical operators, the assignment family, and a small expression walker
//! that drives them against an [`Environment`].

pub mod env;
pub mod error;
pub mod eval;
pub mod expr;
pub mod host;
pub mod ops;
pub mod options;

pub use ember_core::{NativeValue, Value, ValueKind};
pub use env::{Env, Environment};
pub use error::{EvalError, EvalResult};
pub use eval::{
    eval_binary, eval_binary_with, eval_compare, eval_logical, eval_unary, eval_unary_with,
    values_equal, Target,
};
pub use expr::{Evaluator, Expr};
pub use host::{value_from_json, value_to_json, HostError};
pub use ops::{AssignOp, BinaryOp, CompareOp, IncDecOp, LogicalOp, UnaryOp};
pub use options::{EvalOptions, OptionsError};
