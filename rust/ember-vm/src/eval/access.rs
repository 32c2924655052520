//! Member, index and range reads on containers.

use super::not_defined;
use crate::error::{EvalError, EvalResult};
use ember_core::coerce::to_display_string;
use ember_core::Value;

/// `object.field`. Maps yield the entry or `Nil` when absent.
pub fn member_get(object: &Value, field: &str) -> EvalResult<Value> {
    match object {
        Value::Map(entries) => Ok(entries.borrow().get(field).cloned().unwrap_or(Value::Nil)),
        other => Err(EvalError::invalid(format!(
            "no member '{}' on {}",
            field,
            other.type_name()
        ))),
    }
}

/// `object[index]`: slice element, string char, or map entry.
pub fn index_get(object: &Value, index: &Value) -> EvalResult<Value> {
    match object {
        Value::Slice(items) => {
            let items = items.borrow();
            let i = position(index, items.len())?;
            Ok(items[i].clone())
        }
        Value::String(s) => {
            let len = s.chars().count();
            let i = position(index, len)?;
            s.chars()
                .nth(i)
                .map(Value::Char)
                .ok_or_else(|| out_of_range(i as i64, len))
        }
        Value::Map(entries) => Ok(entries
            .borrow()
            .get(&map_key(index))
            .cloned()
            .unwrap_or(Value::Nil)),
        other => Err(not_defined("[]", &[other, index])),
    }
}

/// `object[start:end]` over a string (by chars) or a slice. Missing bounds
/// default to the ends. The slice result is a fresh copy.
pub fn slice_range(object: &Value, start: Option<&Value>, end: Option<&Value>) -> EvalResult<Value> {
    match object {
        Value::String(s) => {
            let (start, end) = range_bounds(start, end, s.chars().count())?;
            Ok(Value::from(s.chars().skip(start).take(end - start).collect::<String>()))
        }
        Value::Slice(items) => {
            let items = items.borrow();
            let (start, end) = range_bounds(start, end, items.len())?;
            Ok(Value::new_slice(items[start..end].to_vec()))
        }
        other => Err(not_defined("[:]", &[other])),
    }
}

fn range_bounds(start: Option<&Value>, end: Option<&Value>, len: usize) -> EvalResult<(usize, usize)> {
    let start = start.map_or(Ok(0), |v| bound(v, len))?;
    let end = end.map_or(Ok(len), |v| bound(v, len))?;
    if start > end {
        return Err(EvalError::invalid(format!(
            "slice bounds out of range [{}:{}]",
            start, end
        )));
    }
    Ok((start, end))
}

/// Keys are stored by their display form.
pub(crate) fn map_key(index: &Value) -> String {
    to_display_string(index)
}

fn integral_index(index: &Value) -> EvalResult<i64> {
    index
        .as_int()
        .ok_or_else(|| EvalError::invalid(format!("index must be an integer, got {}", index.type_name())))
}

/// Element position: `0 <= i < len`.
pub(crate) fn position(index: &Value, len: usize) -> EvalResult<usize> {
    let i = integral_index(index)?;
    usize::try_from(i)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| out_of_range(i, len))
}

/// Range bound: `0 <= i <= len`.
fn bound(index: &Value, len: usize) -> EvalResult<usize> {
    let i = integral_index(index)?;
    usize::try_from(i)
        .ok()
        .filter(|&i| i <= len)
        .ok_or_else(|| out_of_range(i, len))
}

fn out_of_range(i: i64, len: usize) -> EvalError {
    EvalError::invalid(format!("index {} out of range for length {}", i, len))
}
