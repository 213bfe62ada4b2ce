//! Core types for the qureg register simulator
//!
//! This crate provides the vocabulary shared by every other qureg crate:
//! - [`Register`]: a stable handle to a register owned by a simulation session
//! - [`QubitRef`]: a single qubit addressed through a register handle
//! - [`QuantumError`]: the error returned by every engine operation
//! - [`SimulationConfig`]: session configuration
//!
//! # Example
//! ```
//! use qureg_core::{Register, SimulationConfig};
//!
//! let reg = Register::new(3);
//! let q = reg.qubit(1);
//! assert_eq!(q.register(), reg);
//! assert_eq!(q.offset(), 1);
//!
//! let config = SimulationConfig::deterministic(7);
//! assert!(config.validate().is_ok());
//! ```

pub mod config;
pub mod error;
pub mod register;

pub use config::SimulationConfig;
pub use error::QuantumError;
pub use register::{QubitRef, Register};

/// Global numerical threshold below which a squared amplitude is zero.
pub const EPSILON: f64 = 1e-6;

/// Basis indices are `u64`, so a root can never span more qubits than this.
pub const MAX_QUBITS: usize = 64;

/// Type alias for results in qureg
pub type Result<T> = std::result::Result<T, QuantumError>;

/// Epsilon scaled by the size of a `width`-qubit state space.
///
/// Used both as the drop threshold for squared amplitudes and as the
/// normalization tolerance of a root of that width.
///
/// # Example
/// ```
/// use qureg_core::{epsilon_for_width, EPSILON};
///
/// assert_eq!(epsilon_for_width(0), EPSILON);
/// assert_eq!(epsilon_for_width(2), EPSILON / 4.0);
/// ```
#[inline]
pub fn epsilon_for_width(width: usize) -> f64 {
    EPSILON / 2f64.powi(width as i32)
}

/// Bit mask covering `width` bits starting at bit 0.
#[inline]
pub fn width_mask(width: usize) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_mask() {
        assert_eq!(width_mask(0), 0);
        assert_eq!(width_mask(4), 0b1111);
        assert_eq!(width_mask(64), u64::MAX);
    }

    #[test]
    fn test_epsilon_shrinks_with_width() {
        assert!(epsilon_for_width(10) < epsilon_for_width(9));
    }
}
