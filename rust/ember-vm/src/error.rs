//! Errors surfaced by operator evaluation.

use thiserror::Error;

pub type EvalResult<T> = Result<T, EvalError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// The operator has no meaning for the operand shape it was given.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),
    #[error("undefined symbol '{0}'")]
    UndefinedSymbol(String),
}

impl EvalError {
    pub(crate) fn invalid(detail: impl Into<String>) -> Self {
        EvalError::InvalidOperation(detail.into())
    }

    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, EvalError::InvalidOperation(_))
    }

    /// Name of the missing symbol, if that is what went wrong.
    pub fn undefined_symbol(&self) -> Option<&str> {
        match self {
            EvalError::UndefinedSymbol(name) => Some(name),
            _ => None,
        }
    }
}
