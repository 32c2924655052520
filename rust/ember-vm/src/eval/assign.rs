//! Assignment family: `=`, multi-assign, compound assignment and `++`/`--`.

use super::access::{index_get, map_key, member_get, position};
use super::binary::eval_binary_with;
use super::not_defined;
use crate::env::Environment;
use crate::error::{EvalError, EvalResult};
use crate::ops::{AssignOp, IncDecOp};
use crate::options::EvalOptions;
use ember_core::coerce::to_number;
use ember_core::Value;

/// A resolved left-hand side. Container bases are already evaluated; since
/// slices and maps share their store, writing through the base is visible
/// to every alias.
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    Ident(String),
    Member { object: Value, field: String },
    Index { object: Value, index: Value },
    /// Anything that cannot be written to (`1 = 2`, `1++`).
    Literal,
}

impl Target {
    pub fn ident(name: impl Into<String>) -> Self {
        Target::Ident(name.into())
    }

    pub fn describe(&self) -> String {
        match self {
            Target::Ident(name) => name.clone(),
            Target::Member { field, .. } => format!(".{}", field),
            Target::Index { index, .. } => format!("[{}]", index),
            Target::Literal => "literal".to_string(),
        }
    }
}

/// Current value of a target.
pub fn read_target<E: Environment + ?Sized>(env: &E, target: &Target) -> EvalResult<Value> {
    match target {
        Target::Ident(name) => env.get(name),
        Target::Member { object, field } => member_get(object, field),
        Target::Index { object, index } => index_get(object, index),
        Target::Literal => Err(EvalError::invalid("cannot read a literal as an assignment target")),
    }
}

/// `target = value`. Yields the assigned value.
pub fn assign<E: Environment + ?Sized>(env: &mut E, target: &Target, value: Value) -> EvalResult<Value> {
    tracing::debug!(target = %target.describe(), kind = value.type_name(), "assign");
    write(env, target, value.clone())?;
    Ok(value)
}

/// `t1, t2 = v1, v2`. Values are already evaluated; pairs are written left
/// to right and the last value is the result. Every target is checked
/// before the first write, so a failing target leaves all of them untouched.
pub fn multi_assign<E: Environment + ?Sized>(
    env: &mut E,
    targets: &[Target],
    values: Vec<Value>,
) -> EvalResult<Value> {
    if targets.len() != values.len() {
        return Err(EvalError::invalid(format!(
            "assignment mismatch: {} targets but {} values",
            targets.len(),
            values.len()
        )));
    }
    targets.iter().try_for_each(writable)?;
    let mut last = Value::Nil;
    for (target, value) in targets.iter().zip(values) {
        last = assign(env, target, value)?;
    }
    Ok(last)
}

/// `target op= rhs`.
pub fn compound_assign<E: Environment + ?Sized>(
    env: &mut E,
    op: AssignOp,
    target: &Target,
    rhs: &Value,
    options: &EvalOptions,
) -> EvalResult<Value> {
    if *target == Target::Literal {
        return Err(EvalError::invalid(format!("cannot apply {} to a literal", op)));
    }
    let current = read_target(env, target)?;
    let result = eval_binary_with(op.binary(), &current, rhs, options)?;
    assign(env, target, result)
}

/// `target++` / `target--`. A `Float64` steps as a float; every other
/// scalar steps through its integer coercion and comes back as `Int64`.
pub fn inc_dec<E: Environment + ?Sized>(env: &mut E, op: IncDecOp, target: &Target) -> EvalResult<Value> {
    if *target == Target::Literal {
        return Err(EvalError::invalid(format!("cannot apply {} to a literal", op)));
    }
    let current = read_target(env, target)?;
    let next = match &current {
        Value::Float(f) => Value::Float(f + op.delta() as f64),
        v if v.is_scalar() => Value::Int(to_number(v).int.wrapping_add(op.delta())),
        v => return Err(not_defined(op, &[v])),
    };
    assign(env, target, next)
}

/// Whether `target` accepts a write, without performing it.
fn writable(target: &Target) -> EvalResult<()> {
    match target {
        Target::Ident(_)
        | Target::Member { object: Value::Map(_), .. }
        | Target::Index { object: Value::Map(_), .. } => Ok(()),
        Target::Member { object, field } => Err(EvalError::invalid(format!(
            "cannot set member '{}' on {}",
            field,
            object.type_name()
        ))),
        Target::Index { object: Value::Slice(items), index } => position(index, items.borrow().len()).map(drop),
        Target::Index { object, index } => Err(not_defined("[]=", &[object, index])),
        Target::Literal => Err(EvalError::invalid("cannot assign to a literal")),
    }
}

fn write<E: Environment + ?Sized>(env: &mut E, target: &Target, value: Value) -> EvalResult<()> {
    writable(target)?;
    match target {
        Target::Ident(name) => env.set(name, value),
        Target::Member { object: Value::Map(entries), field } => {
            entries.borrow_mut().insert(field.clone(), value);
        }
        Target::Index { object: Value::Slice(items), index } => {
            let mut items = items.borrow_mut();
            let i = position(index, items.len())?;
            items[i] = value;
        }
        Target::Index { object: Value::Map(entries), index } => {
            entries.borrow_mut().insert(map_key(index), value);
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Env;
    use std::collections::BTreeMap;

    fn a() -> Target {
        Target::ident("a")
    }

    #[test]
    fn assign_defines_and_returns_value() {
        let mut env = Env::new();
        assert_eq!(assign(&mut env, &a(), Value::Int(1)), Ok(Value::Int(1)));
        assert_eq!(env.get("a"), Ok(Value::Int(1)));
    }

    #[test]
    fn assign_to_literal_fails() {
        let mut env = Env::new();
        let err = assign(&mut env, &Target::Literal, Value::Int(2)).unwrap_err();
        assert!(err.is_invalid_operation());
    }

    #[test]
    fn multi_assign_pairs_left_to_right() {
        let mut env = Env::new();
        let targets = [a(), Target::ident("b")];
        let result = multi_assign(&mut env, &targets, vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(result, Ok(Value::Int(2)));
        assert_eq!(env.get("a"), Ok(Value::Int(1)));
        assert_eq!(env.get("b"), Ok(Value::Int(2)));

        let err = multi_assign(&mut env, &targets, vec![Value::Int(1)]).unwrap_err();
        assert!(err.is_invalid_operation());
        assert_eq!(multi_assign(&mut env, &[], vec![]), Ok(Value::Nil));
    }

    #[test]
    fn multi_assign_checks_every_target_first() {
        let mut env = Env::new();
        let targets = [a(), Target::Literal];
        let err = multi_assign(&mut env, &targets, vec![Value::Int(1), Value::Int(2)]).unwrap_err();
        assert!(err.is_invalid_operation());
        assert!(!env.contains("a"));

        let slice = Value::new_slice(vec![Value::Int(0)]);
        let targets = [
            a(),
            Target::Index { object: slice.clone(), index: Value::Int(0) },
            Target::Index { object: slice.clone(), index: Value::Int(5) },
        ];
        let err = multi_assign(&mut env, &targets, vec![Value::Int(1), Value::Int(2), Value::Int(3)]).unwrap_err();
        assert!(err.is_invalid_operation());
        assert!(!env.contains("a"));
        assert_eq!(slice.to_string(), "[0]");

        let targets = [a(), Target::Member { object: Value::Int(1), field: "x".into() }];
        assert!(multi_assign(&mut env, &targets, vec![Value::Int(1), Value::Int(2)]).is_err());
        assert!(!env.contains("a"));
    }

    #[test]
    fn compound_reads_applies_writes() {
        let mut env = Env::new().with("a", 2i64);
        let opts = EvalOptions::default();
        assert_eq!(
            compound_assign(&mut env, AssignOp::AddAssign, &a(), &Value::Int(1), &opts),
            Ok(Value::Int(3))
        );
        assert_eq!(
            compound_assign(&mut env, AssignOp::DivAssign, &a(), &Value::Int(2), &opts),
            Ok(Value::Float(1.5))
        );
        assert_eq!(env.get("a"), Ok(Value::Float(1.5)));

        let err = compound_assign(&mut env, AssignOp::AddAssign, &Target::ident("z"), &Value::Int(1), &opts)
            .unwrap_err();
        assert_eq!(err.undefined_symbol(), Some("z"));
    }

    #[test]
    fn inc_dec_widths() {
        let mut env = Env::new();
        for (start, op, expected) in [
            (Value::Int(2), IncDecOp::Inc, Value::Int(3)),
            (Value::Int32(2), IncDecOp::Inc, Value::Int(3)),
            (Value::Float(2.1), IncDecOp::Inc, Value::Float(3.1)),
            (Value::Float32(2.1), IncDecOp::Inc, Value::Int(3)),
            (Value::Int(2), IncDecOp::Dec, Value::Int(1)),
            (Value::Float(2.1), IncDecOp::Dec, Value::Float(1.1)),
            (Value::from("2"), IncDecOp::Inc, Value::Int(3)),
            (Value::Nil, IncDecOp::Inc, Value::Int(1)),
        ] {
            env.set("a", start.clone());
            let got = inc_dec(&mut env, op, &a()).unwrap();
            match (&got, &expected) {
                (Value::Float(g), Value::Float(e)) => assert!((g - e).abs() < 1e-9, "{} {} {}", start, op, got),
                _ => assert_eq!(got, expected, "{} {}", start, op),
            }
            assert_eq!(env.get("a").unwrap(), got);
        }
    }

    #[test]
    fn inc_dec_errors() {
        let mut env = Env::new();
        assert!(inc_dec(&mut env, IncDecOp::Inc, &Target::Literal)
            .unwrap_err()
            .is_invalid_operation());
        assert_eq!(
            inc_dec(&mut env, IncDecOp::Inc, &Target::ident("z")),
            Err(EvalError::UndefinedSymbol("z".into()))
        );
        env.set("s", Value::new_slice(vec![]));
        assert!(inc_dec(&mut env, IncDecOp::Inc, &Target::ident("s"))
            .unwrap_err()
            .is_invalid_operation());
    }

    #[test]
    fn writes_through_shared_containers() {
        let mut env = Env::new();
        let map = Value::new_map(BTreeMap::new());
        let slice = Value::new_slice(vec![Value::Int(0), Value::Int(0)]);
        env.set("m", map.clone());
        env.set("s", slice.clone());

        let member = Target::Member { object: map.clone(), field: "x".into() };
        assign(&mut env, &member, Value::Int(1)).unwrap();
        inc_dec(&mut env, IncDecOp::Inc, &member).unwrap();
        let index = Target::Index { object: slice.clone(), index: Value::Int(1) };
        assign(&mut env, &index, Value::from("b")).unwrap();

        let m = env.get("m").unwrap();
        assert_eq!(m.as_map().unwrap().borrow().get("x"), Some(&Value::Int(2)));
        assert_eq!(env.get("s").unwrap().to_string(), "[0 b]");

        let out_of_range = Target::Index { object: slice, index: Value::Int(2) };
        assert!(assign(&mut env, &out_of_range, Value::Nil).unwrap_err().is_invalid_operation());
        let on_int = Target::Member { object: Value::Int(1), field: "x".into() };
        assert!(assign(&mut env, &on_int, Value::Nil).unwrap_err().is_invalid_operation());
    }
}
