//! User-supplied single-qubit gates with validation
//!
//! A [`CustomGate`] is the typed form of an arbitrary `Gate1(matrix)`
//! call. Construction validates the matrix once so that applying the gate
//! never has to.
//!
//! # Example
//!
//! ```rust
//! use qureg_gates::{CustomGate, SingleQubitGate};
//! use num_complex::Complex64;
//! use std::f64::consts::FRAC_1_SQRT_2;
//!
//! let s = FRAC_1_SQRT_2;
//! let gate = CustomGate::new(
//!     "MyH",
//!     [
//!         [Complex64::new(s, 0.0), Complex64::new(s, 0.0)],
//!         [Complex64::new(s, 0.0), Complex64::new(-s, 0.0)],
//!     ],
//! )
//! .unwrap();
//! assert_eq!(gate.name(), "MyH");
//! ```

use crate::matrices::{self, Matrix2};
use crate::standard::SingleQubitGate;
use qureg_core::{QuantumError, Result};

/// Default tolerance for the unitarity check
pub const DEFAULT_UNITARY_TOLERANCE: f64 = 1e-10;

/// A named single-qubit gate with a validated unitary matrix
#[derive(Debug, Clone, PartialEq)]
pub struct CustomGate {
    name: String,
    matrix: Matrix2,
    description: Option<String>,
}

impl CustomGate {
    /// Create a custom gate with the default unitarity tolerance
    ///
    /// # Errors
    /// Returns error if the name is empty, the matrix contains NaN or
    /// infinite values, or the matrix is not unitary.
    pub fn new(name: impl Into<String>, matrix: Matrix2) -> Result<Self> {
        Self::with_tolerance(name, matrix, DEFAULT_UNITARY_TOLERANCE)
    }

    /// Create a custom gate with an explicit unitarity tolerance
    pub fn with_tolerance(name: impl Into<String>, matrix: Matrix2, tolerance: f64) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(QuantumError::invalid_gate(name, "gate name is empty"));
        }

        if matrix
            .iter()
            .flatten()
            .any(|c| !c.re.is_finite() || !c.im.is_finite())
        {
            return Err(QuantumError::invalid_gate(
                name,
                "matrix contains NaN or infinite values",
            ));
        }

        let deviation = matrices::unitarity_deviation(&matrix);
        if deviation > tolerance {
            return Err(QuantumError::invalid_gate(
                name,
                format!(
                    "matrix is not unitary (deviation {:.2e}, tolerance {:.2e})",
                    deviation, tolerance
                ),
            ));
        }

        Ok(Self {
            name,
            matrix,
            description: None,
        })
    }

    /// Attach a human-readable description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// The adjoint gate, named `<name>†`
    pub fn adjoint(&self) -> Self {
        Self {
            name: format!("{}†", self.name),
            matrix: matrices::adjoint(&self.matrix),
            description: None,
        }
    }
}

impl SingleQubitGate for CustomGate {
    fn name(&self) -> &str {
        &self.name
    }

    fn matrix(&self) -> Matrix2 {
        self.matrix
    }

    fn description(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("custom gate '{}'", self.name))
    }
}
