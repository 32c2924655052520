//! A small expression tree and the walker that drives the operator
//! evaluators over it.
//!
//! There is no parser here. Embedders (and the test suites) build trees
//! directly with the constructor helpers:
//!
//! ```
//! use ember_vm::{BinaryOp, Env, Evaluator, Expr, Value};
//!
//! let mut env = Env::new();
//! let tree = Expr::seq(vec![
//!     Expr::assign(Expr::ident("a"), Expr::lit(2i64)),
//!     Expr::binary(BinaryOp::Mul, Expr::ident("a"), Expr::lit(3i64)),
//! ]);
//! assert_eq!(Evaluator::new(&mut env).eval(&tree), Ok(Value::Int(6)));
//! ```

use crate::env::Environment;
use crate::error::EvalResult;
use crate::eval::{
    assign, compound_assign, eval_binary_with, eval_compare, eval_logical, eval_unary_with,
    inc_dec, index_get, member_get, multi_assign, slice_range, Target,
};
use crate::ops::{AssignOp, BinaryOp, CompareOp, IncDecOp, LogicalOp, UnaryOp};
use crate::options::EvalOptions;
use ember_core::Value;

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Value),
    Ident(String),
    /// `[a, b, c]`: a fresh slice of the evaluated elements.
    Slice(Vec<Expr>),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Compare {
        op: CompareOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Logical {
        op: LogicalOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    MultiAssign {
        targets: Vec<Expr>,
        values: Vec<Expr>,
    },
    CompoundAssign {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    IncDec {
        op: IncDecOp,
        target: Box<Expr>,
    },
    Member {
        object: Box<Expr>,
        field: String,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    SliceRange {
        object: Box<Expr>,
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
    },
    /// Statements in order; the value of the last one (or `Nil`).
    Sequence(Vec<Expr>),
}

impl Expr {
    pub fn lit(value: impl Into<Value>) -> Self {
        Expr::Literal(value.into())
    }

    pub fn nil() -> Self {
        Expr::Literal(Value::Nil)
    }

    pub fn ident(name: impl Into<String>) -> Self {
        Expr::Ident(name.into())
    }

    pub fn slice(items: Vec<Expr>) -> Self {
        Expr::Slice(items)
    }

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn unary(op: UnaryOp, operand: Expr) -> Self {
        Expr::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn compare(op: CompareOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Compare {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn logical(op: LogicalOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Logical {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn assign(target: Expr, value: Expr) -> Self {
        Expr::Assign {
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    pub fn multi_assign(targets: Vec<Expr>, values: Vec<Expr>) -> Self {
        Expr::MultiAssign { targets, values }
    }

    pub fn compound(op: AssignOp, target: Expr, value: Expr) -> Self {
        Expr::CompoundAssign {
            op,
            target: Box::new(target),
            value: Box::new(value),
        }
    }

    pub fn inc_dec(op: IncDecOp, target: Expr) -> Self {
        Expr::IncDec {
            op,
            target: Box::new(target),
        }
    }

    pub fn member(object: Expr, field: impl Into<String>) -> Self {
        Expr::Member {
            object: Box::new(object),
            field: field.into(),
        }
    }

    pub fn index(object: Expr, index: Expr) -> Self {
        Expr::Index {
            object: Box::new(object),
            index: Box::new(index),
        }
    }

    pub fn slice_range(object: Expr, start: Option<Expr>, end: Option<Expr>) -> Self {
        Expr::SliceRange {
            object: Box::new(object),
            start: start.map(Box::new),
            end: end.map(Box::new),
        }
    }

    pub fn seq(items: Vec<Expr>) -> Self {
        Expr::Sequence(items)
    }
}

/// Walks an [`Expr`] against one environment.
pub struct Evaluator<'e, E: Environment + ?Sized> {
    env: &'e mut E,
    options: EvalOptions,
}

impl<'e, E: Environment + ?Sized> Evaluator<'e, E> {
    pub fn new(env: &'e mut E) -> Self {
        Self::with_options(env, EvalOptions::default())
    }

    pub fn with_options(env: &'e mut E, options: EvalOptions) -> Self {
        Self { env, options }
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    pub fn env(&self) -> &E {
        &*self.env
    }

    pub fn eval(&mut self, expr: &Expr) -> EvalResult<Value> {
        match expr {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Ident(name) => self.env.get(name),
            Expr::Slice(items) => {
                let items = items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::new_slice(items))
            }
            Expr::Binary { op, lhs, rhs } => {
                let l = self.eval(lhs)?;
                let r = self.eval(rhs)?;
                eval_binary_with(*op, &l, &r, &self.options)
            }
            Expr::Unary { op, operand } => {
                let v = self.eval(operand)?;
                eval_unary_with(*op, &v, &self.options)
            }
            Expr::Compare { op, lhs, rhs } => {
                let l = self.eval(lhs)?;
                let r = self.eval(rhs)?;
                if self.options.trace_operations {
                    tracing::trace!(op = %op, lhs = l.type_name(), rhs = r.type_name(), "compare");
                }
                Ok(Value::Bool(eval_compare(*op, &l, &r)))
            }
            Expr::Logical { op, lhs, rhs } => {
                let l = self.eval(lhs)?;
                eval_logical(*op, &l, || self.eval(rhs))
            }
            Expr::Assign { target, value } => {
                let value = self.eval(value)?;
                let target = self.resolve_target(target)?;
                assign(&mut *self.env, &target, value)
            }
            Expr::MultiAssign { targets, values } => {
                let values = values
                    .iter()
                    .map(|value| self.eval(value))
                    .collect::<EvalResult<Vec<_>>>()?;
                let targets = targets
                    .iter()
                    .map(|target| self.resolve_target(target))
                    .collect::<EvalResult<Vec<_>>>()?;
                multi_assign(&mut *self.env, &targets, values)
            }
            Expr::CompoundAssign { op, target, value } => {
                let rhs = self.eval(value)?;
                let target = self.resolve_target(target)?;
                compound_assign(&mut *self.env, *op, &target, &rhs, &self.options)
            }
            Expr::IncDec { op, target } => {
                let target = self.resolve_target(target)?;
                inc_dec(&mut *self.env, *op, &target)
            }
            Expr::Member { object, field } => {
                let object = self.eval(object)?;
                member_get(&object, field)
            }
            Expr::Index { object, index } => {
                let object = self.eval(object)?;
                let index = self.eval(index)?;
                index_get(&object, &index)
            }
            Expr::SliceRange { object, start, end } => {
                let object = self.eval(object)?;
                let start = start.as_deref().map(|e| self.eval(e)).transpose()?;
                let end = end.as_deref().map(|e| self.eval(e)).transpose()?;
                slice_range(&object, start.as_ref(), end.as_ref())
            }
            Expr::Sequence(items) => {
                let mut last = Value::Nil;
                for item in items {
                    last = self.eval(item)?;
                }
                Ok(last)
            }
        }
    }

    /// Turn a left-hand side into a [`Target`]. Container bases are
    /// evaluated here, so an undefined base reports its own name.
    pub fn resolve_target(&mut self, expr: &Expr) -> EvalResult<Target> {
        Ok(match expr {
            Expr::Ident(name) => Target::Ident(name.clone()),
            Expr::Member { object, field } => Target::Member {
                object: self.eval(object)?,
                field: field.clone(),
            },
            Expr::Index { object, index } => Target::Index {
                object: self.eval(object)?,
                index: self.eval(index)?,
            },
            _ => Target::Literal,
        })
    }
}
