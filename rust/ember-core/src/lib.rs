//! Ember Core
//!
//! The runtime value model shared by the operator evaluator and embedders:
//! the closed `Value` enum, host capability handles, and coercion rules.

pub mod coerce;
pub mod values;

pub use coerce::{to_bool, to_display_string, to_number, Number};
pub use values::{FuncValue, MapRef, NativeRef, NativeValue, SliceRef, Value, ValueKind};
