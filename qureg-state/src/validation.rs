//! Normalization checks for amplitude stores
//!
//! The session runs these after public mutations when
//! `SimulationConfig::check_normalization` is set, and stores reject
//! non-finite input through [`check_finite`].

use crate::amplitude_store::AmplitudeStore;
use num_complex::Complex64;
use std::fmt;

/// Validation result with diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// Whether the state passed validation
    pub valid: bool,
    /// Total probability (sum of |amplitude|^2)
    pub total_probability: f64,
    /// Probability error from 1.0
    pub probability_error: f64,
    /// Tolerance the error was compared against
    pub tolerance: f64,
    /// Human-readable diagnostic message
    pub message: String,
}

impl ValidationResult {
    fn from_total(total_probability: f64, tolerance: f64) -> Self {
        let probability_error = (total_probability - 1.0).abs();
        let valid = probability_error <= tolerance;
        let message = if valid {
            format!("State is normalized (total = {:.10})", total_probability)
        } else {
            format!(
                "State normalization error: total = {:.10}, error = {:.2e}, tolerance = {:.2e}",
                total_probability, probability_error, tolerance
            )
        };

        Self {
            valid,
            total_probability,
            probability_error,
            tolerance,
            message,
        }
    }

    /// Check if the state is valid within tolerance
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ValidationResult(valid={}, total={:.6}, error={:.2e})",
            self.valid, self.total_probability, self.probability_error
        )
    }
}

/// Validate a store against its own width-scaled tolerance `ε / 2^width`
///
/// # Example
/// ```
/// use qureg_state::{AmplitudeStore, validation::validate_normalization};
///
/// let store = AmplitudeStore::from_basis_state(3, 5, 1).unwrap();
/// assert!(validate_normalization(&store).is_valid());
/// ```
pub fn validate_normalization(store: &AmplitudeStore) -> ValidationResult {
    ValidationResult::from_total(store.norm_sqr(), store.threshold())
}

/// Check that every amplitude is finite
pub fn check_finite<'a, I>(amplitudes: I) -> bool
where
    I: IntoIterator<Item = &'a Complex64>,
{
    amplitudes
        .into_iter()
        .all(|a| a.re.is_finite() && a.im.is_finite())
}
