//! Single-qubit gate library for qureg
//!
//! Every single-qubit operation the engine performs is a 2×2 complex
//! matrix applied to one target bit, optionally conditioned on control
//! bits. This crate provides those matrices and the types that name them.
//!
//! # Features
//!
//! - **Constant matrices**: H, X, Y, Z, √X and identity as `const` data
//! - **Parameterized builders**: rotations about X/Y/Z, global phase scale
//!   and the relative phase kick
//! - **Typed gates**: the [`SingleQubitGate`] trait and one type per gate
//!   family, each knowing its own inverse
//! - **Custom gates**: [`CustomGate`] validates unitarity at construction
//! - **Registry**: [`GateRegistry`] maps names to gates, validated when a
//!   gate is registered rather than when it is applied
//!
//! # Example
//!
//! ```
//! use qureg_gates::{matrices, Hadamard, RotateX, SingleQubitGate};
//! use std::f64::consts::PI;
//!
//! let h = Hadamard.matrix();
//! assert_eq!(h, matrices::HADAMARD);
//!
//! let rx = RotateX::new(PI / 2.0);
//! let back = matrices::multiply(&rx.inverse_matrix(), &rx.matrix());
//! assert!(matrices::approx_eq(&back, &matrices::IDENTITY, 1e-12));
//! ```

pub mod custom;
pub mod gate_registry;
pub mod matrices;
pub mod standard;

pub use custom::CustomGate;
pub use gate_registry::{GateInfo, GateRegistry};
pub use matrices::Matrix2;
pub use standard::*;
