//! Simulation session configuration

use crate::{QuantumError, Result, MAX_QUBITS};
use serde::{Deserialize, Serialize};

/// Configuration for a simulation session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Random number generator seed for reproducibility
    ///
    /// If None, the session seeds from OS entropy. Set to Some(seed) for
    /// deterministic measurement outcomes.
    ///
    /// Default: None (random)
    pub seed: Option<u64>,

    /// Maximum width of any root register
    ///
    /// Merges that would exceed this are rejected. Cannot exceed 64 because
    /// basis indices are `u64`.
    ///
    /// Default: 64
    pub max_qubits: usize,

    /// Check normalization after every mutating operation
    ///
    /// Drift beyond `ε / 2^width` is logged as a warning; it is never
    /// corrected silently.
    ///
    /// Default: true in debug builds
    pub check_normalization: bool,

    /// Initial capacity hint for new amplitude maps
    ///
    /// Default: 16
    pub default_capacity: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_qubits: MAX_QUBITS,
            check_normalization: cfg!(debug_assertions),
            default_capacity: 16,
        }
    }
}

impl SimulationConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration with a fixed seed
    pub fn deterministic(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Create a configuration for debugging
    ///
    /// - Deterministic seed
    /// - Normalization checked after every operation
    pub fn debug() -> Self {
        Self {
            seed: Some(42),
            check_normalization: true,
            ..Default::default()
        }
    }

    /// Set the seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the maximum root width
    pub fn with_max_qubits(mut self, max_qubits: usize) -> Self {
        self.max_qubits = max_qubits;
        self
    }

    /// Enable or disable normalization checking
    pub fn with_normalization_check(mut self, enable: bool) -> Self {
        self.check_normalization = enable;
        self
    }

    /// Set the default amplitude map capacity
    pub fn with_default_capacity(mut self, capacity: usize) -> Self {
        self.default_capacity = capacity;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_qubits == 0 {
            return Err(QuantumError::InvalidConfig(
                "max_qubits must be > 0".to_string(),
            ));
        }

        if self.max_qubits > MAX_QUBITS {
            return Err(QuantumError::InvalidConfig(format!(
                "max_qubits too large (max: {})",
                MAX_QUBITS
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SimulationConfig::default();
        assert_eq!(config.seed, None);
        assert_eq!(config.max_qubits, 64);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_presets() {
        assert_eq!(SimulationConfig::deterministic(9).seed, Some(9));
        let debug = SimulationConfig::debug();
        assert!(debug.check_normalization);
        assert!(debug.seed.is_some());
    }

    #[test]
    fn test_builder() {
        let config = SimulationConfig::new()
            .with_seed(3)
            .with_max_qubits(20)
            .with_normalization_check(false)
            .with_default_capacity(128);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.max_qubits, 20);
        assert!(!config.check_normalization);
        assert_eq!(config.default_capacity, 128);
    }

    #[test]
    fn test_validation_rejects_bad_limits() {
        assert!(SimulationConfig::new().with_max_qubits(0).validate().is_err());
        assert!(SimulationConfig::new().with_max_qubits(65).validate().is_err());
    }

    #[test]
    fn test_config_serde() {
        let config = SimulationConfig::deterministic(11);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: SimulationConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
