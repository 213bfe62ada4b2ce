//! Error types for qureg

use crate::Register;
use thiserror::Error;

/// Errors that can occur in register simulation
///
/// Every variant is a precondition violation detected before the
/// amplitude store is touched, so an `Err` never leaves a session
/// half-mutated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuantumError {
    /// Handle does not name a live register (never created or deleted)
    #[error("Unknown register {0}")]
    UnknownRegister(Register),

    /// Qubit offset outside the register
    #[error("Qubit offset {offset} out of range for register {register} of width {width}")]
    QubitOutOfRange {
        register: Register,
        offset: usize,
        width: usize,
    },

    /// Slice does not fit inside the register it is taken from
    #[error("Slice [{offset}, {width}] does not fit in register {register} of width {register_width}")]
    InvalidSlice {
        register: Register,
        offset: usize,
        width: usize,
        register_width: usize,
    },

    /// Requested register width is zero or too large
    #[error("Invalid register width {width}: must be between 1 and {max}")]
    InvalidWidth { width: usize, max: usize },

    /// Merging would create a root wider than allowed
    #[error("Root register would span {width} qubits, limit is {max}")]
    RootTooWide { width: usize, max: usize },

    /// Classical value does not fit in the register
    #[error("Value {value} does not fit in a {width}-qubit register")]
    ValueOutOfRange { value: u64, width: usize },

    /// Control and target resolve to the same root bit
    #[error("Control and target address the same qubit (root bit {bit})")]
    ControlEqualsTarget { bit: usize },

    /// The same control qubit was listed twice
    #[error("Duplicate control qubit (root bit {bit})")]
    DuplicateControl { bit: usize },

    /// Gate needs more control qubits than were supplied
    #[error("Gate '{gate}' requires at least {required} control qubits, got {actual}")]
    TooFewControls {
        gate: &'static str,
        required: usize,
        actual: usize,
    },

    /// Register widths do not satisfy an operation's contract
    #[error("Operation '{operation}' expects width {expected} for {operand}, got {actual}")]
    WidthMismatch {
        operation: &'static str,
        operand: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Two operands share qubits where the operation needs disjoint registers
    #[error("Operation '{operation}' requires disjoint registers")]
    OverlappingRegisters { operation: &'static str },

    /// Modulus or multiplier unsuitable for modular arithmetic
    #[error("Invalid modular arithmetic arguments: {0}")]
    InvalidModulus(String),

    /// Amplitude data could not form a valid state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Gate matrix or registration rejected
    #[error("Invalid gate '{name}': {reason}")]
    InvalidGate { name: String, reason: String },

    /// Gate name not present in a registry
    #[error("Unknown gate '{0}'")]
    UnknownGate(String),

    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl QuantumError {
    /// Create an invalid width error against the global qubit limit
    pub fn invalid_width(width: usize) -> Self {
        Self::InvalidWidth {
            width,
            max: crate::MAX_QUBITS,
        }
    }

    /// Create a width mismatch error
    pub fn width_mismatch(
        operation: &'static str,
        operand: &'static str,
        expected: usize,
        actual: usize,
    ) -> Self {
        Self::WidthMismatch {
            operation,
            operand,
            expected,
            actual,
        }
    }

    /// Create an invalid gate error
    pub fn invalid_gate(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidGate {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_register_error() {
        let err = QuantumError::UnknownRegister(Register::new(4));
        assert_eq!(format!("{}", err), "Unknown register r4");
    }

    #[test]
    fn test_width_mismatch_error() {
        let err = QuantumError::width_mismatch("add", "b", 4, 3);
        let msg = format!("{}", err);
        assert!(msg.contains("add"));
        assert!(msg.contains("4"));
        assert!(msg.contains("3"));
    }

    #[test]
    fn test_too_few_controls_error() {
        let err = QuantumError::TooFewControls {
            gate: "Toffoli",
            required: 2,
            actual: 1,
        };
        assert!(format!("{}", err).contains("Toffoli"));
    }
}
