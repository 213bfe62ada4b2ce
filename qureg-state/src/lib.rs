//! Sparse amplitude storage and in-place kernels
//!
//! This crate owns the numerical side of the simulator:
//!
//! - [`AmplitudeStore`]: `AHashMap<u64, Complex64>` keyed by basis index,
//!   with gate kernels, marginals, collapse, tensor product and compaction
//! - [`measurement`]: outcome selection and Walker alias sampling
//! - [`validation`]: normalization diagnostics
//!
//! Nothing here knows about registers or views; callers pass bit offsets
//! relative to the store.
//!
//! # Example
//!
//! ```
//! use qureg_state::{AmplitudeStore, sample_outcome};
//! use qureg_gates::matrices;
//!
//! let mut store = AmplitudeStore::new(1).unwrap();
//! store.apply_matrix(&matrices::HADAMARD, 0, &[]).unwrap();
//!
//! let dist = store.slice_probabilities(0, 1).unwrap();
//! let (outcome, p) = sample_outcome(&dist, 0.75).unwrap();
//! assert_eq!(outcome, 1);
//! assert!((p - 0.5).abs() < 1e-12);
//! ```

pub mod amplitude_store;
pub mod error;
pub mod measurement;
pub mod validation;

pub use amplitude_store::{slice_value, AmplitudeStore, MAX_DENSE_WIDTH};
pub use error::{Result, StateError};
pub use measurement::{sample_bit, sample_outcome, AliasTable, SamplingResult};
pub use validation::{validate_normalization, ValidationResult};
