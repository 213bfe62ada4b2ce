//! Error types for amplitude store operations

use qureg_core::QuantumError;
use thiserror::Error;

/// Errors that can occur during amplitude store operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    /// Bit position outside the store
    #[error("Invalid bit {bit} for {width}-qubit state")]
    InvalidBit { bit: usize, width: usize },

    /// Basis index outside the store
    #[error("Basis index {index} out of range for {width}-qubit state")]
    IndexOutOfRange { index: u64, width: usize },

    /// Store width beyond what a u64 index can address
    #[error("Invalid state width {width}, maximum is {max}")]
    InvalidWidth { width: usize, max: usize },

    /// Control bit equal to the target bit
    #[error("Control bit equals target bit {bit}")]
    ControlEqualsTarget { bit: usize },

    /// Amplitude with a NaN or infinite component
    #[error("State contains a non-finite amplitude")]
    NonFinite,

    /// State has no weight to normalize
    #[error("State has zero norm")]
    ZeroNorm,

    /// Collapse requested onto an outcome that cannot occur
    #[error("Outcome {outcome} has zero probability")]
    ImpossibleOutcome { outcome: u64 },

    /// Operation needs a bit range holding one classical value
    #[error("Bits [{offset}, {offset}+{width}) are not in a classical state")]
    NotClassical { offset: usize, width: usize },

    /// Dense export requested for a store too wide to materialize
    #[error("Cannot materialize {width}-qubit state densely, limit is {max}")]
    TooWideForDense { width: usize, max: usize },
}

/// Result type for amplitude store operations
pub type Result<T> = std::result::Result<T, StateError>;

impl From<StateError> for QuantumError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::InvalidWidth { width, max } => QuantumError::InvalidWidth { width, max },
            StateError::ControlEqualsTarget { bit } => QuantumError::ControlEqualsTarget { bit },
            other => QuantumError::InvalidState(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_keeps_specific_variants() {
        let err: QuantumError = StateError::ControlEqualsTarget { bit: 2 }.into();
        assert_eq!(err, QuantumError::ControlEqualsTarget { bit: 2 });

        let err: QuantumError = StateError::ZeroNorm.into();
        assert!(matches!(err, QuantumError::InvalidState(_)));
    }
}
