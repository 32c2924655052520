//! Tagged value representation for Ember scripts.

use serde::Serialize;
use std::any::Any;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use strum::{Display, EnumIter, IntoStaticStr};

/// Shared, mutable backing store of a slice. Cloning the handle aliases it.
pub type SliceRef = Rc<RefCell<Vec<Value>>>;
/// Shared, mutable backing store of a map. Cloning the handle aliases it.
pub type MapRef = Rc<RefCell<BTreeMap<String, Value>>>;
/// Opaque host value.
pub type NativeRef = Rc<dyn NativeValue>;

/// Runtime values seen by the operator evaluator.
///
/// `Int32` and `Float32` only enter through the environment or the host;
/// operators normalize them and never produce them.
///
/// A slice or map may contain itself (`a[0] = a`). Display, `Debug` and
/// equality track the stores they are inside of and stop on re-entry.
#[derive(Clone)]
pub enum Value {
    Nil,
    Bool(bool),
    Int32(i32),
    Int(i64),
    Float32(f32),
    Float(f64),
    String(Rc<str>),
    Char(char),
    Slice(SliceRef),
    Map(MapRef),
    Func(Rc<FuncValue>),
    Native(NativeRef),
}

/// Discriminant of a [`Value`], used in diagnostics and trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Nil,
    Bool,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
    Char,
    Slice,
    Map,
    Func,
    Native,
}

/// Capability surface a host value must provide to live inside a script.
///
/// The evaluator only ever compares and moves native values around; any
/// other operator applied to one fails.
pub trait NativeValue: fmt::Debug {
    /// Host type name, shown in diagnostics and display output.
    fn type_name(&self) -> &str;

    /// Whether this handle stands for the host's nil (an empty handle).
    fn is_nil(&self) -> bool {
        false
    }

    /// Host equality. `None` means the host has no notion of equality and
    /// callers fall back to handle identity.
    fn native_eq(&self, _other: &dyn NativeValue) -> Option<bool> {
        None
    }

    fn as_any(&self) -> &dyn Any;
}

/// Opaque callable. Only the host invokes it; scripts compare it by identity.
pub struct FuncValue {
    name: String,
    body: Box<dyn Fn(&[Value]) -> Value>,
}

impl FuncValue {
    pub fn new(name: impl Into<String>, body: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self {
            name: name.into(),
            body: Box::new(body),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.body)(args)
    }
}

impl fmt::Debug for FuncValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FuncValue").field("name", &self.name).finish_non_exhaustive()
    }
}

impl Value {
    pub fn new_slice(items: Vec<Value>) -> Self {
        Value::Slice(Rc::new(RefCell::new(items)))
    }

    pub fn new_map(entries: BTreeMap<String, Value>) -> Self {
        Value::Map(Rc::new(RefCell::new(entries)))
    }

    pub fn new_func(func: FuncValue) -> Self {
        Value::Func(Rc::new(func))
    }

    pub fn new_native(native: impl NativeValue + 'static) -> Self {
        Value::Native(Rc::new(native))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Nil => ValueKind::Nil,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int32(_) => ValueKind::Int32,
            Value::Int(_) => ValueKind::Int64,
            Value::Float32(_) => ValueKind::Float32,
            Value::Float(_) => ValueKind::Float64,
            Value::String(_) => ValueKind::String,
            Value::Char(_) => ValueKind::Char,
            Value::Slice(_) => ValueKind::Slice,
            Value::Map(_) => ValueKind::Map,
            Value::Func(_) => ValueKind::Func,
            Value::Native(_) => ValueKind::Native,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().into()
    }

    /// Scalars take part in arithmetic; aggregates, callables and native
    /// handles do not.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Nil
                | Value::Bool(_)
                | Value::Int32(_)
                | Value::Int(_)
                | Value::Float32(_)
                | Value::Float(_)
                | Value::String(_)
                | Value::Char(_)
        )
    }

    /// Any integer or float width.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Value::Int32(_) | Value::Int(_) | Value::Float32(_) | Value::Float(_)
        )
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, Value::Int32(_) | Value::Int(_))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Int32(n) => Some(i64::from(*n)),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Float32(f) => Some(f64::from(*f)),
            Value::Int(n) => Some(*n as f64),
            Value::Int32(n) => Some(f64::from(*n)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_slice(&self) -> Option<&SliceRef> {
        match self {
            Value::Slice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapRef> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// True when both values share the same backing store or host handle.
    /// Scalars never alias.
    pub fn same_ref(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Slice(a), Value::Slice(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::Func(a), Value::Func(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => {
                std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int32(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float32(f)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(Rc::from(s))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::new_slice(items)
    }
}

/// Format a float the way script output expects: shortest round-trip
/// digits, switching to `d.ddde±XX` when the decimal exponent is below -4
/// or at least 6 (`1e+06`, `1.5e-07`), and Go-style spellings for the
/// non-finite values.
fn format_float<T>(x: T) -> String
where
    T: Copy + Into<f64> + fmt::Display + fmt::LowerExp,
{
    let wide: f64 = x.into();
    if wide.is_nan() {
        return "NaN".to_string();
    }
    if wide.is_infinite() {
        let sign = if wide > 0.0 { "+" } else { "-" };
        return format!("{}Inf", sign);
    }
    let sci = format!("{:e}", x);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return format!("{}", x);
    };
    let exp: i32 = exp.parse().unwrap_or(0);
    if (-4..6).contains(&exp) {
        format!("{}", x)
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exp.unsigned_abs())
    }
}

/// Stores currently being walked, innermost last.
type Walk = RefCell<Vec<*const ()>>;

/// A value being formatted as part of an enclosing walk.
struct Nested<'a> {
    value: &'a Value,
    walk: &'a Walk,
}

impl Nested<'_> {
    fn nest<'b>(&'b self, value: &'b Value) -> Nested<'b> {
        Nested {
            value,
            walk: self.walk,
        }
    }

    /// Run `body` with `addr` marked as in progress. `None` on re-entry.
    fn enter<R>(&self, addr: *const (), body: impl FnOnce() -> R) -> Option<R> {
        if self.walk.borrow().contains(&addr) {
            return None;
        }
        self.walk.borrow_mut().push(addr);
        let out = body();
        self.walk.borrow_mut().pop();
        Some(out)
    }
}

impl fmt::Display for Nested<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Nil => write!(f, "nil"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int32(n) => write!(f, "{}", n),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float32(x) => write!(f, "{}", format_float(*x)),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
            Value::String(s) => write!(f, "{}", s),
            Value::Char(c) => write!(f, "{}", c),
            Value::Slice(items) => {
                let shown = self.enter(Rc::as_ptr(items).cast(), || -> fmt::Result {
                    write!(f, "[")?;
                    for (i, item) in items.borrow().iter().enumerate() {
                        if i > 0 {
                            write!(f, " ")?;
                        }
                        write!(f, "{}", self.nest(item))?;
                    }
                    write!(f, "]")
                });
                shown.unwrap_or_else(|| write!(f, "[...]"))
            }
            Value::Map(entries) => {
                let shown = self.enter(Rc::as_ptr(entries).cast(), || -> fmt::Result {
                    write!(f, "map[")?;
                    for (i, (k, v)) in entries.borrow().iter().enumerate() {
                        if i > 0 {
                            write!(f, " ")?;
                        }
                        write!(f, "{}:{}", k, self.nest(v))?;
                    }
                    write!(f, "]")
                });
                shown.unwrap_or_else(|| write!(f, "map[...]"))
            }
            Value::Func(func) => write!(f, "<func {}>", func.name()),
            Value::Native(native) => write!(f, "<native {}>", native.type_name()),
        }
    }
}

impl fmt::Debug for Nested<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Nil => write!(f, "Nil"),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Int32(n) => f.debug_tuple("Int32").field(n).finish(),
            Value::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Value::Float32(x) => f.debug_tuple("Float32").field(x).finish(),
            Value::Float(x) => f.debug_tuple("Float").field(x).finish(),
            Value::String(s) => f.debug_tuple("String").field(s).finish(),
            Value::Char(c) => f.debug_tuple("Char").field(c).finish(),
            Value::Slice(items) => {
                let shown = self.enter(Rc::as_ptr(items).cast(), || -> fmt::Result {
                    write!(f, "Slice(")?;
                    f.debug_list()
                        .entries(items.borrow().iter().map(|item| self.nest(item)))
                        .finish()?;
                    write!(f, ")")
                });
                shown.unwrap_or_else(|| write!(f, "Slice([...])"))
            }
            Value::Map(entries) => {
                let shown = self.enter(Rc::as_ptr(entries).cast(), || -> fmt::Result {
                    write!(f, "Map(")?;
                    f.debug_map()
                        .entries(entries.borrow().iter().map(|(k, v)| (k, self.nest(v))))
                        .finish()?;
                    write!(f, ")")
                });
                shown.unwrap_or_else(|| write!(f, "Map({{...}})"))
            }
            Value::Func(func) => f.debug_tuple("Func").field(func).finish(),
            Value::Native(native) => f.debug_tuple("Native").field(native).finish(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let walk = Walk::default();
        fmt::Display::fmt(&Nested { value: self, walk: &walk }, f)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let walk = Walk::default();
        fmt::Debug::fmt(&Nested { value: self, walk: &walk }, f)
    }
}

impl Value {
    /// Address of the backing store of a slice or map, for cycle tracking.
    pub fn store_addr(&self) -> Option<*const ()> {
        match self {
            Value::Slice(items) => Some(Rc::as_ptr(items).cast()),
            Value::Map(entries) => Some(Rc::as_ptr(entries).cast()),
            _ => None,
        }
    }
}

/// Kind-exact structural equality, for hosts and tests.
///
/// `Int(1)` and `Float(1.0)` are different here; the script-level `==`
/// with its cross-kind coercions lives in the evaluator. A pair of stores
/// met again while it is still being compared counts as equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        structural_eq(self, other, &mut Vec::new())
    }
}

fn structural_eq(left: &Value, right: &Value, seen: &mut Vec<(*const (), *const ())>) -> bool {
    match (left, right) {
        (Value::Nil, Value::Nil) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int32(a), Value::Int32(b)) => a == b,
        (Value::Int(a), Value::Int(b)) => a == b,
        (Value::Float32(a), Value::Float32(b)) => a == b,
        (Value::Float(a), Value::Float(b)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Char(a), Value::Char(b)) => a == b,
        (Value::Slice(a), Value::Slice(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            let pair = (Rc::as_ptr(a).cast(), Rc::as_ptr(b).cast());
            if seen.contains(&pair) {
                return true;
            }
            seen.push(pair);
            let (a, b) = (a.borrow(), b.borrow());
            let eq = a.len() == b.len()
                && a.iter().zip(b.iter()).all(|(x, y)| structural_eq(x, y, seen));
            seen.pop();
            eq
        }
        (Value::Map(a), Value::Map(b)) => {
            if Rc::ptr_eq(a, b) {
                return true;
            }
            let pair = (Rc::as_ptr(a).cast(), Rc::as_ptr(b).cast());
            if seen.contains(&pair) {
                return true;
            }
            seen.push(pair);
            let (a, b) = (a.borrow(), b.borrow());
            let eq = a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|((ka, x), (kb, y))| ka == kb && structural_eq(x, y, seen));
            seen.pop();
            eq
        }
        (Value::Native(a), Value::Native(b)) => {
            left.same_ref(right) || a.native_eq(b.as_ref()).unwrap_or(false)
        }
        (Value::Func(_), Value::Func(_)) => left.same_ref(right),
        _ => false,
    }
}
