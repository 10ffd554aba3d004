//! Error types for machine-model operations.

use sg_core::CoreError;
use thiserror::Error;

/// Errors surfaced by the machine model.
///
/// Everything is detected eagerly (parameter checks at construction, input
/// checks at the start of each public operation), so no arithmetic ever runs
/// on values that would silently produce NaN or ∞.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MachineError {
    /// Invalid or physically inconsistent parameters or inputs.
    #[error("Physically inconsistent value: {what}")]
    Domain { what: &'static str },

    /// State or phase vector of the wrong arity.
    #[error("Wrong {what} arity: expected {expected}, got {got}")]
    InputShape {
        what: &'static str,
        expected: usize,
        got: usize,
    },
}

pub type MachineResult<T> = Result<T, MachineError>;

impl From<CoreError> for MachineError {
    fn from(e: CoreError) -> Self {
        match e {
            CoreError::NonFinite { what, .. } => MachineError::Domain { what },
            CoreError::Domain { what } => MachineError::Domain { what },
        }
    }
}
