//! Evaluation options.
//!
//! Embedders usually take the defaults. The options can also be read from a
//! TOML table or from `EMBER_*` environment variables.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("invalid options toml: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid value for {var}: {value:?}")]
    Var { var: &'static str, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalOptions {
    /// Emit a `trace` event for every operator dispatch. Default: `false`.
    pub trace_operations: bool,
    /// Upper bound on the length of a string produced by `string * n`.
    /// `None` (the default) means unbounded.
    pub max_string_repeat: Option<usize>,
}

impl EvalOptions {
    pub const TRACE_VAR: &'static str = "EMBER_TRACE";
    pub const MAX_STRING_REPEAT_VAR: &'static str = "EMBER_MAX_STRING_REPEAT";

    pub fn from_toml_str(s: &str) -> Result<Self, OptionsError> {
        Ok(toml::from_str(s)?)
    }

    /// Defaults overridden by `EMBER_TRACE` and `EMBER_MAX_STRING_REPEAT`.
    pub fn from_env() -> Result<Self, OptionsError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, OptionsError> {
        let mut options = Self::default();
        if let Some(raw) = lookup(Self::TRACE_VAR) {
            options.trace_operations = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => {
                    return Err(OptionsError::Var {
                        var: Self::TRACE_VAR,
                        value: raw,
                    })
                }
            };
        }
        if let Some(raw) = lookup(Self::MAX_STRING_REPEAT_VAR) {
            let limit = raw.trim().parse::<usize>().map_err(|_| OptionsError::Var {
                var: Self::MAX_STRING_REPEAT_VAR,
                value: raw.clone(),
            })?;
            options.max_string_repeat = Some(limit);
        }
        Ok(options)
    }
}
