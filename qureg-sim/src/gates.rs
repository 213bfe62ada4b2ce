//! Gate application through qubit references
//!
//! Every gate names its target and controls as [`QubitRef`]s, which may
//! belong to different registers. Before touching amplitudes the session
//! validates all references, rejects a control equal to the target or
//! listed twice, and merges the involved roots.

use crate::computer::QuantumComputer;
use qureg_core::{QuantumError, QubitRef, Register, Result};
use qureg_gates::custom::DEFAULT_UNITARY_TOLERANCE;
use qureg_gates::{matrices, GateRegistry, Matrix2, SingleQubitGate};
use smallvec::SmallVec;
use std::f64::consts::PI;
use tracing::trace;

/// Target and control bits resolved against a single root
#[derive(Debug)]
pub(crate) struct ResolvedGate {
    pub(crate) root: Register,
    pub(crate) target: usize,
    pub(crate) controls: SmallVec<[usize; 4]>,
}

/// Phase angle `π / 2^dist` used by the controlled phase shifts
#[inline]
pub fn cphase_angle(dist: u32) -> f64 {
    PI * 0.5f64.powi(i32::try_from(dist).unwrap_or(i32::MAX))
}

impl QuantumComputer {
    /// Validate a gate's qubits and bring them under one root
    pub(crate) fn resolve_gate(&mut self, target: QubitRef, controls: &[QubitRef]) -> Result<ResolvedGate> {
        let located_target = self.locate(target)?;
        let mut located: SmallVec<[(Register, usize); 4]> = SmallVec::with_capacity(controls.len());
        for &control in controls {
            let position = self.locate(control)?;
            if position == located_target {
                return Err(QuantumError::ControlEqualsTarget { bit: position.1 });
            }
            if located.contains(&position) {
                return Err(QuantumError::DuplicateControl { bit: position.1 });
            }
            located.push(position);
        }

        let mut roots: SmallVec<[Register; 4]> = SmallVec::new();
        roots.push(located_target.0);
        for &(root, _) in &located {
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
        let root = self.unify_roots(&roots)?;

        let (_, target_bit) = self.locate(target)?;
        let control_bits = controls
            .iter()
            .map(|&control| self.locate(control).map(|(_, bit)| bit))
            .collect::<Result<SmallVec<[usize; 4]>>>()?;

        Ok(ResolvedGate {
            root,
            target: target_bit,
            controls: control_bits,
        })
    }

    /// Apply a 2×2 matrix to `target` under `controls`
    ///
    /// The general primitive behind every single-qubit gate. The matrix is
    /// trusted to be unitary; use [`gate1`](Self::gate1) to validate it.
    pub fn apply_matrix(&mut self, matrix: &Matrix2, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        self.apply_named_matrix("matrix", matrix, target, controls)
    }

    fn apply_named_matrix(
        &mut self,
        name: &str,
        matrix: &Matrix2,
        target: QubitRef,
        controls: &[QubitRef],
    ) -> Result<()> {
        let gate = self.resolve_gate(target, controls)?;
        self.store_mut(gate.root)?
            .apply_matrix(matrix, gate.target, &gate.controls)?;
        trace!(gate = name, root = %gate.root, target = gate.target, controls = ?gate.controls, "applied gate");
        self.check_normalization(gate.root);
        Ok(())
    }

    /// Apply a typed gate
    pub fn apply_gate(&mut self, gate: &dyn SingleQubitGate, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        self.apply_named_matrix(gate.name(), &gate.matrix(), target, controls)
    }

    /// Apply the inverse of a typed gate
    pub fn apply_gate_inverse(
        &mut self,
        gate: &dyn SingleQubitGate,
        target: QubitRef,
        controls: &[QubitRef],
    ) -> Result<()> {
        self.apply_named_matrix(gate.name(), &gate.inverse_matrix(), target, controls)
    }

    /// Apply a gate looked up by name in a registry
    ///
    /// # Errors
    /// Returns [`QuantumError::UnknownGate`] if the name is not registered
    pub fn apply_registered(
        &mut self,
        registry: &GateRegistry,
        name: &str,
        target: QubitRef,
        controls: &[QubitRef],
    ) -> Result<()> {
        let gate = registry.lookup(name)?;
        self.apply_named_matrix(name, &gate.matrix(), target, controls)
    }

    /// Apply an arbitrary 2×2 matrix after checking it is unitary
    pub fn gate1(&mut self, matrix: &Matrix2, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        if !matrices::is_unitary(matrix, DEFAULT_UNITARY_TOLERANCE) {
            return Err(QuantumError::invalid_gate("Gate1", "matrix is not unitary"));
        }
        self.apply_named_matrix("Gate1", matrix, target, controls)
    }

    /// Hadamard
    pub fn hadamard(&mut self, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        self.apply_named_matrix("H", &matrices::HADAMARD, target, controls)
    }

    /// Pauli X
    pub fn sigma_x(&mut self, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        self.apply_named_matrix("X", &matrices::SIGMA_X, target, controls)
    }

    /// Pauli Y
    pub fn sigma_y(&mut self, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        self.apply_named_matrix("Y", &matrices::SIGMA_Y, target, controls)
    }

    /// Pauli Z
    pub fn sigma_z(&mut self, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        self.apply_named_matrix("Z", &matrices::SIGMA_Z, target, controls)
    }

    /// Square root of NOT
    pub fn sqrt_x(&mut self, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        self.apply_named_matrix("SqrtX", &matrices::SQRT_X, target, controls)
    }

    /// Rotation about X by `gamma`
    pub fn rotate_x(&mut self, gamma: f64, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        self.apply_named_matrix("RX", &matrices::rotate_x(gamma), target, controls)
    }

    /// Rotation about Y by `gamma`
    pub fn rotate_y(&mut self, gamma: f64, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        self.apply_named_matrix("RY", &matrices::rotate_y(gamma), target, controls)
    }

    /// Rotation about Z by `gamma`
    pub fn rotate_z(&mut self, gamma: f64, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        self.apply_named_matrix("RZ", &matrices::rotate_z(gamma), target, controls)
    }

    /// Multiply by e^(iθ) regardless of the target's value
    ///
    /// A global phase unless controlled.
    pub fn phase_scale(&mut self, theta: f64, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        self.apply_named_matrix("PhaseScale", &matrices::phase_scale(theta), target, controls)
    }

    /// Multiply by e^(iγ) every state with the target and all controls set
    pub fn phase_kick(&mut self, gamma: f64, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        self.apply_phase_named("PhaseKick", gamma, target, controls)
    }

    /// Phase shift by `π / 2^dist`, the rotation of the Fourier transform
    pub fn cphase_shift(&mut self, dist: u32, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        self.apply_phase_named("CPhaseShift", cphase_angle(dist), target, controls)
    }

    /// Phase shift by `-π / 2^dist`, undoing [`cphase_shift`](Self::cphase_shift)
    pub fn inverse_cphase_shift(&mut self, dist: u32, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        self.apply_phase_named("InverseCPhaseShift", -cphase_angle(dist), target, controls)
    }

    fn apply_phase_named(&mut self, name: &str, theta: f64, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        let gate = self.resolve_gate(target, controls)?;
        self.store_mut(gate.root)?
            .apply_phase(theta, gate.target, &gate.controls)?;
        trace!(gate = name, theta, root = %gate.root, target = gate.target, controls = ?gate.controls, "applied phase");
        self.check_normalization(gate.root);
        Ok(())
    }

    /// Controlled NOT
    pub fn cnot(&mut self, target: QubitRef, control: QubitRef) -> Result<()> {
        self.flip_named("CNot", target, &[control])
    }

    /// NOT under two or more controls
    ///
    /// # Errors
    /// Returns [`QuantumError::TooFewControls`] for fewer than two controls
    pub fn toffoli(&mut self, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        if controls.len() < 2 {
            return Err(QuantumError::TooFewControls {
                gate: "Toffoli",
                required: 2,
                actual: controls.len(),
            });
        }
        self.flip_named("Toffoli", target, controls)
    }

    /// NOT under any number of controls, including none
    ///
    /// Bit-permutation fast path shared by CNot and Toffoli.
    pub fn flip(&mut self, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        self.flip_named("Flip", target, controls)
    }

    fn flip_named(&mut self, name: &str, target: QubitRef, controls: &[QubitRef]) -> Result<()> {
        let gate = self.resolve_gate(target, controls)?;
        self.store_mut(gate.root)?.flip(gate.target, &gate.controls)?;
        trace!(gate = name, root = %gate.root, target = gate.target, controls = ?gate.controls, "applied flip");
        Ok(())
    }

    /// Hadamard on every qubit of a register
    pub fn walsh_hadamard(&mut self, reg: Register) -> Result<()> {
        let width = self.width(reg)?;
        for offset in 0..width {
            self.hadamard(reg.qubit(offset), &[])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_complex::Complex64;
    use qureg_core::SimulationConfig;
    use qureg_gates::{CustomGate, RotateY};
    use std::f64::consts::FRAC_1_SQRT_2;

    fn session() -> QuantumComputer {
        QuantumComputer::with_config(SimulationConfig::debug()).unwrap()
    }

    #[test]
    fn test_cphase_angle() {
        assert_relative_eq!(cphase_angle(0), PI);
        assert_relative_eq!(cphase_angle(2), PI / 4.0);
    }

    #[test]
    fn test_cphase_angle_saturates_for_huge_distance() {
        for dist in [1u32 << 31, u32::MAX] {
            let angle = cphase_angle(dist);
            assert!(angle.is_finite());
            assert!(angle >= 0.0);
            assert!(angle < 1e-300);
        }
    }

    #[test]
    fn test_bell_state() {
        let mut qc = session();
        let r = qc.new_register(0, 2).unwrap();
        qc.hadamard(r.qubit(0), &[]).unwrap();
        qc.cnot(r.qubit(1), r.qubit(0)).unwrap();

        let store = qc.store(r).unwrap();
        assert_eq!(store.len(), 2);
        assert_relative_eq!(store.amplitude(0).re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(store.amplitude(3).re, FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_gate_across_registers_merges() {
        let mut qc = session();
        let a = qc.new_register(1, 1).unwrap();
        let b = qc.new_register(0, 1).unwrap();

        qc.cnot(b.first_qubit(), a.first_qubit()).unwrap();
        let root = qc.root_of(a).unwrap();
        assert_eq!(qc.root_of(b).unwrap(), root);
        assert_eq!(qc.get_value(b).unwrap(), Some(1));
    }

    #[test]
    fn test_control_validation_leaves_state_untouched() {
        let mut qc = session();
        let r = qc.new_register(0, 2).unwrap();
        let v = qc.slice(r, 1, 1).unwrap();

        assert_eq!(
            qc.cnot(r.qubit(1), v.qubit(0)),
            Err(QuantumError::ControlEqualsTarget { bit: 1 })
        );
        assert_eq!(
            qc.toffoli(r.qubit(0), &[r.qubit(1), v.qubit(0)]),
            Err(QuantumError::DuplicateControl { bit: 1 })
        );
        assert!(matches!(
            qc.toffoli(r.qubit(0), &[r.qubit(1)]),
            Err(QuantumError::TooFewControls { required: 2, actual: 1, .. })
        ));
        assert!(qc.hadamard(r.qubit(2), &[]).is_err());
        assert_eq!(qc.get_value(r).unwrap(), Some(0));
    }

    #[test]
    fn test_failed_gate_does_not_merge() {
        let mut qc = session();
        let a = qc.new_register(0, 1).unwrap();
        let b = qc.new_register(0, 1).unwrap();
        assert!(qc.cnot(b.qubit(3), a.qubit(0)).is_err());
        assert!(qc.is_root(a).unwrap());
        assert!(qc.is_root(b).unwrap());
    }

    #[test]
    fn test_toffoli_needs_all_controls() {
        let mut qc = session();
        let r = qc.new_register(0b011, 3).unwrap();
        qc.toffoli(r.qubit(2), &[r.qubit(0), r.qubit(1)]).unwrap();
        assert_eq!(qc.get_value(r).unwrap(), Some(0b111));

        let r = qc.new_register(0b010, 3).unwrap();
        qc.toffoli(r.qubit(2), &[r.qubit(0), r.qubit(1)]).unwrap();
        assert_eq!(qc.get_value(r).unwrap(), Some(0b010));
    }

    #[test]
    fn test_cphase_shift_inverse() {
        let mut qc = session();
        let r = qc.new_register(0, 2).unwrap();
        qc.walsh_hadamard(r).unwrap();
        let before = qc.store(r).unwrap().clone();

        qc.cphase_shift(1, r.qubit(1), &[r.qubit(0)]).unwrap();
        assert_relative_eq!(qc.store(r).unwrap().amplitude(3).im, 0.5, epsilon = 1e-12);

        qc.inverse_cphase_shift(1, r.qubit(1), &[r.qubit(0)]).unwrap();
        let after = qc.store(r).unwrap();
        for (index, amp) in before.iter() {
            assert!((after.amplitude(index) - amp).norm() < 1e-12);
        }
    }

    #[test]
    fn test_phase_scale_under_control_is_relative() {
        let mut qc = session();
        let r = qc.new_register(0, 2).unwrap();
        qc.hadamard(r.qubit(0), &[]).unwrap();
        qc.sigma_x(r.qubit(1), &[]).unwrap();
        qc.phase_scale(PI, r.qubit(1), &[r.qubit(0)]).unwrap();

        let store = qc.store(r).unwrap();
        assert_relative_eq!(store.amplitude(0b10).re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(store.amplitude(0b11).re, -FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_gate1_validates() {
        let mut qc = session();
        let r = qc.new_register(0, 1).unwrap();
        let not_unitary = [
            [Complex64::new(1.0, 0.0), Complex64::new(1.0, 0.0)],
            [Complex64::new(0.0, 0.0), Complex64::new(1.0, 0.0)],
        ];
        assert!(matches!(
            qc.gate1(&not_unitary, r.first_qubit(), &[]),
            Err(QuantumError::InvalidGate { .. })
        ));
        qc.gate1(&matrices::SIGMA_X, r.first_qubit(), &[]).unwrap();
        assert_eq!(qc.get_value(r).unwrap(), Some(1));
    }

    #[test]
    fn test_typed_and_registered_gates() {
        let mut qc = session();
        let r = qc.new_register(0, 1).unwrap();

        let ry = RotateY::new(0.9);
        qc.apply_gate(&ry, r.first_qubit(), &[]).unwrap();
        qc.apply_gate_inverse(&ry, r.first_qubit(), &[]).unwrap();
        assert_eq!(qc.get_value(r).unwrap(), Some(0));

        let mut registry = GateRegistry::with_standard_gates();
        registry
            .register("NOT", CustomGate::new("NOT", matrices::SIGMA_X).unwrap())
            .unwrap();
        qc.apply_registered(&registry, "NOT", r.first_qubit(), &[]).unwrap();
        assert_eq!(qc.get_value(r).unwrap(), Some(1));
        assert!(matches!(
            qc.apply_registered(&registry, "nope", r.first_qubit(), &[]),
            Err(QuantumError::UnknownGate(_))
        ));
    }
}
