//! Named gate registry
//!
//! The registry maps a gate name to a typed gate value. All validation
//! happens in [`GateRegistry::register`]; a gate that made it into the
//! registry can be applied without further checks.
//!
//! # Example
//!
//! ```rust
//! use qureg_gates::{GateRegistry, CustomGate, SigmaX, matrices};
//!
//! let mut registry = GateRegistry::with_standard_gates();
//! assert!(registry.contains("H"));
//!
//! let v = CustomGate::new("V", matrices::SQRT_X).unwrap();
//! registry.register("V", v).unwrap();
//! assert!(registry.get("V").is_some());
//!
//! // Names are unique
//! assert!(registry.register("V", SigmaX).is_err());
//! ```

use crate::custom::DEFAULT_UNITARY_TOLERANCE;
use crate::matrices;
use crate::standard::{Hadamard, SigmaX, SigmaY, SigmaZ, SingleQubitGate, SqrtX};
use qureg_core::{QuantumError, Result};
use std::collections::HashMap;
use std::sync::Arc;

/// A registry of named single-qubit gates
#[derive(Debug, Default, Clone)]
pub struct GateRegistry {
    gates: HashMap<String, Arc<dyn SingleQubitGate>>,
}

/// Summary of a registered gate
#[derive(Debug, Clone, PartialEq)]
pub struct GateInfo {
    pub name: String,
    pub gate_name: String,
    pub is_self_inverse: bool,
    pub description: String,
}

impl GateRegistry {
    /// Create a new empty gate registry
    pub fn new() -> Self {
        Self {
            gates: HashMap::new(),
        }
    }

    /// Create a registry holding H, X, Y, Z and SqrtX under their gate names
    pub fn with_standard_gates() -> Self {
        let mut registry = Self::new();
        let standard: [Arc<dyn SingleQubitGate>; 5] = [
            Arc::new(Hadamard),
            Arc::new(SigmaX),
            Arc::new(SigmaY),
            Arc::new(SigmaZ),
            Arc::new(SqrtX),
        ];
        for gate in standard {
            registry.gates.insert(gate.name().to_string(), gate);
        }
        registry
    }

    /// Register a gate under `name`
    ///
    /// # Errors
    /// Returns error if the name is empty, already registered, or the
    /// gate's matrix is not unitary.
    pub fn register<G>(&mut self, name: impl Into<String>, gate: G) -> Result<()>
    where
        G: SingleQubitGate + 'static,
    {
        self.register_arc(name, Arc::new(gate))
    }

    /// Register a shared gate under `name`
    pub fn register_arc(
        &mut self,
        name: impl Into<String>,
        gate: Arc<dyn SingleQubitGate>,
    ) -> Result<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(QuantumError::invalid_gate(name, "gate name is empty"));
        }
        if self.gates.contains_key(&name) {
            return Err(QuantumError::invalid_gate(name, "name already registered"));
        }
        if !matrices::is_unitary(&gate.matrix(), DEFAULT_UNITARY_TOLERANCE) {
            return Err(QuantumError::invalid_gate(name, "matrix is not unitary"));
        }

        self.gates.insert(name, gate);
        Ok(())
    }

    /// Retrieve a registered gate
    pub fn get(&self, name: &str) -> Option<Arc<dyn SingleQubitGate>> {
        self.gates.get(name).cloned()
    }

    /// Retrieve a registered gate or fail with [`QuantumError::UnknownGate`]
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn SingleQubitGate>> {
        self.get(name)
            .ok_or_else(|| QuantumError::UnknownGate(name.to_string()))
    }

    /// Check if a gate is registered
    pub fn contains(&self, name: &str) -> bool {
        self.gates.contains_key(name)
    }

    /// Get all registered gate names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.gates.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Remove a registered gate
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn SingleQubitGate>> {
        self.gates.remove(name)
    }

    /// Get the number of registered gates
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    /// List gates with detailed information, sorted by name
    pub fn list_gates(&self) -> Vec<GateInfo> {
        let mut infos: Vec<GateInfo> = self
            .gates
            .iter()
            .map(|(name, gate)| GateInfo {
                name: name.clone(),
                gate_name: gate.name().to_string(),
                is_self_inverse: gate.is_self_inverse(),
                description: gate.description(),
            })
            .collect();
        infos.sort_by(|a, b| a.name.cmp(&b.name));
        infos
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom::CustomGate;
    use crate::standard::RotateX;
    use num_complex::Complex64;

    #[test]
    fn test_standard_registry() {
        let registry = GateRegistry::with_standard_gates();
        assert_eq!(registry.len(), 5);
        assert_eq!(registry.names(), vec!["H", "SqrtX", "X", "Y", "Z"]);
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = GateRegistry::new();
        assert!(registry.is_empty());

        registry.register("rx_quarter", RotateX::new(0.25)).unwrap();
        let gate = registry.lookup("rx_quarter").unwrap();
        assert_eq!(gate.name(), "RX");

        assert!(matches!(
            registry.lookup("missing"),
            Err(QuantumError::UnknownGate(_))
        ));
    }

    #[test]
    fn test_register_validation() {
        let mut registry = GateRegistry::with_standard_gates();
        assert!(registry.register("", Hadamard).is_err());
        assert!(registry.register("H", Hadamard).is_err());
    }

    #[test]
    fn test_rejects_non_unitary_gate() {
        #[derive(Debug)]
        struct Leaky;

        impl SingleQubitGate for Leaky {
            fn name(&self) -> &str {
                "Leaky"
            }

            fn matrix(&self) -> matrices::Matrix2 {
                [
                    [Complex64::new(0.5, 0.0), Complex64::new(0.0, 0.0)],
                    [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
                ]
            }
        }

        let mut registry = GateRegistry::new();
        assert!(registry.register("leaky", Leaky).is_err());
        assert!(!registry.contains("leaky"));
    }

    #[test]
    fn test_unregister_and_list() {
        let mut registry = GateRegistry::new();
        let v = CustomGate::new("V", matrices::SQRT_X).unwrap();
        registry.register("V", v).unwrap();

        let infos = registry.list_gates();
        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].gate_name, "V");
        assert!(!infos[0].is_self_inverse);

        assert!(registry.unregister("V").is_some());
        assert!(registry.is_empty());
    }
}
