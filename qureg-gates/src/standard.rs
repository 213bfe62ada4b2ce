//! Standard single-qubit gate types

use crate::matrices::{self, Matrix2};
use std::fmt;

/// Trait for single-qubit unitary operations
///
/// Gates are stateless values (apart from their angle parameters) and can
/// be applied to any target with any set of controls.
pub trait SingleQubitGate: Send + Sync + fmt::Debug {
    /// The name of the gate (e.g., "H", "RX")
    fn name(&self) -> &str;

    /// The 2×2 unitary this gate applies
    fn matrix(&self) -> Matrix2;

    /// The matrix undoing this gate
    ///
    /// Defaults to the conjugate transpose.
    fn inverse_matrix(&self) -> Matrix2 {
        matrices::adjoint(&self.matrix())
    }

    /// Whether this gate is its own inverse
    fn is_self_inverse(&self) -> bool {
        false
    }

    /// Get a description of this gate
    fn description(&self) -> String {
        self.name().to_string()
    }
}

/// Helper macro for the constant-matrix gates
macro_rules! constant_gate {
    ($(#[$doc:meta])* $gate:ident, $name:expr, $matrix:expr, $self_inverse:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
        pub struct $gate;

        impl SingleQubitGate for $gate {
            fn name(&self) -> &str {
                $name
            }

            #[inline]
            fn matrix(&self) -> Matrix2 {
                $matrix
            }

            fn is_self_inverse(&self) -> bool {
                $self_inverse
            }
        }
    };
}

constant_gate!(
    /// Hadamard gate
    ///
    /// Creates superposition: H|0⟩ = (|0⟩ + |1⟩)/√2
    Hadamard,
    "H",
    matrices::HADAMARD,
    true
);

constant_gate!(
    /// Sigma-X gate (NOT)
    ///
    /// Bit flip: X|0⟩ = |1⟩, X|1⟩ = |0⟩
    SigmaX,
    "X",
    matrices::SIGMA_X,
    true
);

constant_gate!(
    /// Sigma-Y gate
    ///
    /// Combined bit and phase flip
    SigmaY,
    "Y",
    matrices::SIGMA_Y,
    true
);

constant_gate!(
    /// Sigma-Z gate
    ///
    /// Phase flip: Z|0⟩ = |0⟩, Z|1⟩ = -|1⟩
    SigmaZ,
    "Z",
    matrices::SIGMA_Z,
    true
);

constant_gate!(
    /// Square root of NOT
    SqrtX,
    "SqrtX",
    matrices::SQRT_X,
    false
);

/// Helper macro for the single-angle gates, whose inverse is the negated angle
macro_rules! angle_gate {
    ($(#[$doc:meta])* $gate:ident, $name:expr, $builder:path) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $gate {
            angle: f64,
        }

        impl $gate {
            /// Create the gate for the given angle
            pub const fn new(angle: f64) -> Self {
                Self { angle }
            }

            /// Returns the angle
            pub const fn angle(&self) -> f64 {
                self.angle
            }

            /// The gate with the negated angle
            pub fn inverse(&self) -> Self {
                Self::new(-self.angle)
            }
        }

        impl SingleQubitGate for $gate {
            fn name(&self) -> &str {
                $name
            }

            #[inline]
            fn matrix(&self) -> Matrix2 {
                $builder(self.angle)
            }

            #[inline]
            fn inverse_matrix(&self) -> Matrix2 {
                $builder(-self.angle)
            }

            fn description(&self) -> String {
                format!("{}({:.4})", $name, self.angle)
            }
        }
    };
}

angle_gate!(
    /// Rotation about the X axis by γ
    RotateX,
    "RX",
    matrices::rotate_x
);

angle_gate!(
    /// Rotation about the Y axis by γ
    RotateY,
    "RY",
    matrices::rotate_y
);

angle_gate!(
    /// Rotation about the Z axis by γ
    RotateZ,
    "RZ",
    matrices::rotate_z
);

angle_gate!(
    /// Uniform phase e^(iθ); only meaningful under control
    PhaseScale,
    "PhaseScale",
    matrices::phase_scale
);

angle_gate!(
    /// Relative phase e^(iθ) on |1⟩
    PhaseKick,
    "PhaseKick",
    matrices::phase_kick
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrices::{approx_eq, multiply, IDENTITY};
    use std::f64::consts::PI;

    #[test]
    fn test_names() {
        assert_eq!(Hadamard.name(), "H");
        assert_eq!(SigmaX.name(), "X");
        assert_eq!(RotateZ::new(1.0).name(), "RZ");
        assert_eq!(RotateX::new(0.5).description(), "RX(0.5000)");
    }

    #[test]
    fn test_self_inverse_flags() {
        assert!(Hadamard.is_self_inverse());
        assert!(SigmaY.is_self_inverse());
        assert!(!SqrtX.is_self_inverse());
        assert!(!RotateY::new(1.0).is_self_inverse());
    }

    #[test]
    fn test_inverse_matrices_undo_gates() {
        let gates: Vec<Box<dyn SingleQubitGate>> = vec![
            Box::new(Hadamard),
            Box::new(SigmaX),
            Box::new(SigmaY),
            Box::new(SigmaZ),
            Box::new(SqrtX),
            Box::new(RotateX::new(PI / 5.0)),
            Box::new(RotateY::new(-1.3)),
            Box::new(RotateZ::new(2.0)),
            Box::new(PhaseScale::new(0.7)),
            Box::new(PhaseKick::new(PI / 8.0)),
        ];

        for gate in &gates {
            let product = multiply(&gate.inverse_matrix(), &gate.matrix());
            assert!(
                approx_eq(&product, &IDENTITY, 1e-12),
                "{} inverse does not undo it",
                gate.name()
            );
        }
    }

    #[test]
    fn test_angle_gate_inverse() {
        let rx = RotateX::new(0.25);
        assert_eq!(rx.inverse().angle(), -0.25);
        assert!(approx_eq(&rx.inverse().matrix(), &rx.inverse_matrix(), 0.0));
    }
}
