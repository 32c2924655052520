//! Equality, ordering and short-circuit logic.
//!
//! Comparison never fails. Cross-kind equality is symmetric but not
//! transitive: `"1.0" == 1` and `1 == "1"` hold while `"1.0" == "1"` does not.

use crate::error::EvalResult;
use crate::ops::{CompareOp, LogicalOp};
use ember_core::coerce::{parse_bool_literal, parse_number, to_bool, to_number, with_text, Number};
use ember_core::Value;
use std::rc::Rc;

pub fn eval_compare(op: CompareOp, left: &Value, right: &Value) -> bool {
    match op {
        CompareOp::Eq => values_equal(left, right),
        CompareOp::NotEq => !values_equal(left, right),
        CompareOp::Lt | CompareOp::LtEq | CompareOp::Gt | CompareOp::GtEq => {
            ordering(op, to_number(left), to_number(right))
        }
    }
}

/// Short-circuit `&&` / `||`. `right` runs only when it decides the result.
pub fn eval_logical(
    op: LogicalOp,
    left: &Value,
    right: impl FnOnce() -> EvalResult<Value>,
) -> EvalResult<Value> {
    let lhs = to_bool(left);
    match op {
        LogicalOp::And if !lhs => Ok(Value::Bool(false)),
        LogicalOp::Or if lhs => Ok(Value::Bool(true)),
        _ => Ok(Value::Bool(to_bool(&right()?))),
    }
}

/// Script-level `==`.
///
/// Aggregates compare element-wise. A pair of stores met again while it is
/// still being compared counts as equal, so self-containing slices and maps
/// compare without unbounded recursion.
pub fn values_equal(left: &Value, right: &Value) -> bool {
    equal_in(left, right, &mut Vec::new())
}

/// Store pairs currently under comparison.
type Seen = Vec<(*const (), *const ())>;

fn equal_in(left: &Value, right: &Value, seen: &mut Seen) -> bool {
    let (left_nil, right_nil) = (nil_like(left), nil_like(right));
    if left_nil || right_nil {
        return left_nil && right_nil;
    }
    match (left, right) {
        (l, r) if l.is_numeric() && r.is_numeric() => numbers_equal(to_number(l), to_number(r)),
        (n, s @ (Value::String(_) | Value::Char(_))) | (s @ (Value::String(_) | Value::Char(_)), n)
            if n.is_numeric() =>
        {
            with_text(s, parse_number)
                .flatten()
                .is_some_and(|parsed| numbers_equal(to_number(n), parsed))
        }
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Bool(b), s @ (Value::String(_) | Value::Char(_)))
        | (s @ (Value::String(_) | Value::Char(_)), Value::Bool(b)) => {
            with_text(s, parse_bool_literal).flatten() == Some(*b)
        }
        (Value::Bool(b), n) | (n, Value::Bool(b)) if n.is_numeric() => *b == to_bool(n),
        (Value::String(_) | Value::Char(_), Value::String(_) | Value::Char(_)) => {
            with_text(left, |l| with_text(right, |r| l == r)).flatten() == Some(true)
        }
        (Value::Slice(a), Value::Slice(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            within(left, right, seen, |seen| {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| equal_in(x, y, seen))
            })
        }
        (Value::Map(a), Value::Map(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            within(left, right, seen, |seen| {
                let (a, b) = (a.borrow(), b.borrow());
                a.len() == b.len()
                    && a.iter()
                        .all(|(k, x)| b.get(k).is_some_and(|y| equal_in(x, y, seen)))
            })
        }
        (Value::Func(_), Value::Func(_)) => left.same_ref(right),
        (Value::Native(a), Value::Native(b)) => {
            left.same_ref(right)
                || a.native_eq(b.as_ref())
                    .or_else(|| b.native_eq(a.as_ref()))
                    .unwrap_or(false)
        }
        _ => false,
    }
}

/// Compare two aggregates with their store pair marked as in progress.
fn within(left: &Value, right: &Value, seen: &mut Seen, body: impl FnOnce(&mut Seen) -> bool) -> bool {
    let (Some(l), Some(r)) = (left.store_addr(), right.store_addr()) else {
        return false;
    };
    if seen.contains(&(l, r)) {
        return true;
    }
    seen.push((l, r));
    let eq = body(seen);
    seen.pop();
    eq
}

/// `Nil`, or a native handle the host reports as nil.
fn nil_like(value: &Value) -> bool {
    match value {
        Value::Nil => true,
        Value::Native(native) => native.is_nil(),
        _ => false,
    }
}

fn numbers_equal(l: Number, r: Number) -> bool {
    if l.is_float || r.is_float {
        l.float == r.float
    } else {
        l.int == r.int
    }
}

fn ordering(op: CompareOp, l: Number, r: Number) -> bool {
    if l.is_float || r.is_float {
        apply_order(op, l.float, r.float)
    } else {
        apply_order(op, l.int, r.int)
    }
}

fn apply_order<T: PartialOrd>(op: CompareOp, l: T, r: T) -> bool {
    match op {
        CompareOp::Lt => l < r,
        CompareOp::LtEq => l <= r,
        CompareOp::Gt => l > r,
        CompareOp::GtEq => l >= r,
        CompareOp::Eq => l == r,
        CompareOp::NotEq => l != r,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;
    use std::cell::Cell;
    use std::collections::BTreeMap;

    fn eq(l: impl Into<Value>, r: impl Into<Value>) -> bool {
        values_equal(&l.into(), &r.into())
    }

    #[test]
    fn numeric_widths_compare_by_value() {
        assert!(eq(1i64, 1.0f64));
        assert!(eq(2i32, 2i64));
        assert!(eq(1.5f32, 1.5f64));
        assert!(!eq(2i64, 1.0f64));
        assert!(eq(i64::MAX, i64::MAX));
        assert!(!eq(i64::MAX, i64::MAX - 1));
    }

    #[test]
    fn nil_equals_only_nil() {
        assert!(values_equal(&Value::Nil, &Value::Nil));
        assert!(!values_equal(&Value::Nil, &Value::Int(0)));
        assert!(!values_equal(&Value::Bool(false), &Value::Nil));
        assert!(!values_equal(&Value::Nil, &Value::from("")));
    }

    #[test]
    fn numeric_strings() {
        assert!(eq(0i64, "0"));
        assert!(eq("1.0", 1i64));
        assert!(eq(1i64, "1"));
        assert!(eq(0.0f64, "0.0"));
        assert!(eq(1.2f64, "1.2"));
        assert!(!eq(1.2f64, "1"));
        assert!(!eq("1.1", 1i64));
        assert!(!eq(0i64, "1"));
        assert!(!eq(0i64, "a"));
        assert!(eq('7', 7i64));
    }

    #[test]
    fn equality_is_not_transitive_across_kinds() {
        assert!(eq("1.0", 1i64));
        assert!(eq(1i64, "1"));
        assert!(!eq("1.0", "1"));
    }

    #[test]
    fn bool_against_strings_and_numbers() {
        assert!(eq(true, "true"));
        assert!(eq(true, "TRUE"));
        assert!(eq("True", true));
        assert!(!eq(true, "false"));
        assert!(!eq(true, "foo"));
        assert!(!eq(false, "foo"));
        assert!(eq(false, "FALSE"));
        assert!(eq(true, 1i64));
        assert!(eq(false, 0.0f64));
        assert!(!eq(false, 2i64));
    }

    #[test]
    fn strings_and_chars() {
        assert!(eq("a", "a"));
        assert!(!eq("a", "b"));
        assert!(eq('a', 'a'));
        assert!(eq('t', "t"));
        assert!(!eq('t', "te"));
    }

    #[test]
    fn aggregates() {
        let a = Value::new_slice(vec![Value::Int(1), Value::from("x")]);
        let b = Value::new_slice(vec![Value::Float(1.0), Value::from("x")]);
        assert!(values_equal(&a, &a.clone()));
        assert!(values_equal(&a, &b));
        assert!(!values_equal(&a, &Value::new_slice(vec![])));
        let m = Value::new_map([("k".to_string(), Value::Int(1))].into_iter().collect());
        let n = Value::new_map([("k".to_string(), Value::from("1"))].into_iter().collect());
        assert!(values_equal(&m, &n));
    }

    fn cyclic_slice(head: Value) -> Value {
        let v = Value::new_slice(vec![head, Value::Nil]);
        v.as_slice().unwrap().borrow_mut()[1] = v.clone();
        v
    }

    #[test]
    fn cyclic_aggregates_compare_without_overflow() {
        let b = cyclic_slice(Value::Int(0));
        let c = cyclic_slice(Value::Float(0.0));
        let d = cyclic_slice(Value::Int(1));
        assert!(values_equal(&b, &c));
        assert!(values_equal(&c, &b));
        assert!(!values_equal(&b, &d));
        assert!(!values_equal(&b, &Value::new_slice(vec![Value::Int(0), Value::Nil])));

        let m = Value::new_map(BTreeMap::new());
        m.as_map().unwrap().borrow_mut().insert("self".into(), m.clone());
        let n = Value::new_map(BTreeMap::new());
        n.as_map().unwrap().borrow_mut().insert("self".into(), n.clone());
        assert!(values_equal(&m, &n));

        for v in [&b, &c, &d] {
            v.as_slice().unwrap().borrow_mut().clear();
        }
        m.as_map().unwrap().borrow_mut().clear();
        n.as_map().unwrap().borrow_mut().clear();
    }

    #[test]
    fn ordering_is_numeric() {
        assert!(eval_compare(CompareOp::Gt, &Value::Int(2), &Value::Int(1)));
        assert!(!eval_compare(CompareOp::Lt, &Value::Int(2), &Value::Float(2.0)));
        assert!(eval_compare(CompareOp::LtEq, &Value::Float(2.0), &Value::Int(2)));
        assert!(eval_compare(CompareOp::GtEq, &Value::Int32(3), &Value::Float(2.5)));
        assert!(eval_compare(CompareOp::NotEq, &Value::Int(2), &Value::Int(1)));
    }

    #[test]
    fn logical_short_circuits() {
        let called = Cell::new(false);
        let rhs = || {
            called.set(true);
            Ok(Value::Bool(true))
        };
        assert_eq!(eval_logical(LogicalOp::And, &Value::Bool(false), rhs), Ok(Value::Bool(false)));
        assert!(!called.get());

        let result = eval_logical(LogicalOp::Or, &Value::Bool(false), || Ok(Value::Bool(true)));
        assert_eq!(result, Ok(Value::Bool(true)));

        let err = eval_logical(LogicalOp::And, &Value::Bool(true), || {
            Err(EvalError::UndefinedSymbol("z".into()))
        });
        assert_eq!(err, Err(EvalError::UndefinedSymbol("z".into())));
    }
}
