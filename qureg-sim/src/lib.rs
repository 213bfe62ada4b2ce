//! Register-level quantum simulation session
//!
//! [`QuantumComputer`] is the entry point: it creates registers, merges
//! them on demand when a gate spans more than one, applies gates, and
//! measures. Registers are plain [`Register`] handles into the session's
//! arena; a register is either a root owning amplitudes or a view of a
//! root's bit range.
//!
//! # Features
//!
//! - **Lazy merging**: independent registers share nothing until a gate
//!   needs them together; the merge is an exact tensor product
//! - **Views**: `slice` addresses part of a register without copying
//! - **Deletion**: measured qubits are compacted out of their root
//! - **Seeded sampling**: a fixed seed reproduces every measurement
//!
//! # Example
//!
//! ```
//! use qureg_sim::QuantumComputer;
//! use qureg_core::SimulationConfig;
//!
//! let mut qc = QuantumComputer::with_config(SimulationConfig::deterministic(7)).unwrap();
//! let r = qc.new_register(0, 2).unwrap();
//! qc.hadamard(r.qubit(0), &[]).unwrap();
//! qc.cnot(r.qubit(1), r.qubit(0)).unwrap();
//!
//! let probs = qc.probabilities(r).unwrap();
//! assert_eq!(probs.keys().copied().collect::<Vec<_>>(), vec![0, 3]);
//!
//! let outcome = qc.measure(r).unwrap();
//! assert!(outcome == 0 || outcome == 3);
//! ```

pub mod compose;
pub mod computer;
pub mod display;
pub mod gates;
pub mod measure;

pub use computer::QuantumComputer;
pub use display::RegisterDump;
pub use gates::cphase_angle;
pub use qureg_core::{QuantumError, QubitRef, Register, Result, SimulationConfig};
