//! Configuration validation.
//!
//! Validators collect every problem they find instead of stopping at the
//! first one, so a user can fix a file in a single pass.

use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Numeric value outside its allowed range.
    #[error("'{param}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the field.
        param: String,
        /// The offending value.
        value: f64,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
    },

    /// Value that is not out of range but still unusable.
    #[error("invalid '{param}': {reason}")]
    Invalid {
        /// Name of the field.
        param: String,
        /// Description of the problem.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

impl ValidationError {
    pub(crate) fn invalid(param: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::Invalid {
            param: param.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn out_of_range(param: impl Into<String>, value: f64, min: f64, max: f64) -> Self {
        ValidationError::OutOfRange {
            param: param.into(),
            value,
            min,
            max,
        }
    }

    /// Every individual problem, flattening [`ValidationError::Multiple`].
    pub fn problems(&self) -> Vec<&ValidationError> {
        match self {
            ValidationError::Multiple(errors) => errors.iter().flat_map(|e| e.problems()).collect(),
            other => vec![other],
        }
    }
}

/// Accumulates problems found while checking a configuration.
#[derive(Debug, Default)]
pub(crate) struct Problems(Vec<ValidationError>);

impl Problems {
    pub(crate) fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    /// Record `error` when `ok` is false.
    pub(crate) fn check(&mut self, ok: bool, error: impl FnOnce() -> ValidationError) {
        if !ok {
            self.0.push(error());
        }
    }

    /// `Ok` when empty, the single error, or [`ValidationError::Multiple`].
    pub(crate) fn finish(mut self) -> ValidationResult<()> {
        match self.0.len() {
            0 => Ok(()),
            1 => Err(self.0.remove(0)),
            _ => Err(ValidationError::Multiple(self.0)),
        }
    }
}
