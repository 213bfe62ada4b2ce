//! Measurement, reset and state introspection

use crate::computer::QuantumComputer;
use num_complex::Complex64;
use qureg_core::{width_mask, QuantumError, QubitRef, Register, Result};
use qureg_state::{
    sample_bit, sample_outcome, AliasTable, AmplitudeStore, SamplingResult, MAX_DENSE_WIDTH,
};
use rand::Rng;
use std::collections::BTreeMap;
use tracing::debug;

impl QuantumComputer {
    /// Measure every qubit of a register and collapse the state
    ///
    /// The outcome is drawn from the register's marginal distribution with
    /// the session's random source. States inconsistent with the outcome
    /// are removed and the rest rescaled by `1/√p`.
    pub fn measure(&mut self, reg: Register) -> Result<u64> {
        let (root, offset, width) = self.bit_range(reg)?;
        let distribution = self.store(root)?.slice_probabilities(offset, width)?;

        let u = self.draw();
        let (outcome, probability) = sample_outcome(&distribution, u)
            .ok_or_else(|| QuantumError::InvalidState(format!("{} has no amplitudes", root)))?;

        self.store_mut(root)?.collapse_slice(offset, width, outcome)?;
        debug!(register = %reg, outcome, probability, "measured register");
        self.check_normalization(root);
        Ok(outcome)
    }

    /// Measure a single qubit and collapse the state
    pub fn measure_bit(&mut self, qubit: QubitRef) -> Result<u8> {
        let (root, bit) = self.locate(qubit)?;
        let (p_zero, p_one) = self.store(root)?.bit_weights(bit)?;

        let u = self.draw();
        let outcome = sample_bit(p_zero, p_one, u);

        self.store_mut(root)?.collapse_bit(bit, outcome)?;
        debug!(qubit = %qubit, outcome, p_one, "measured qubit");
        self.check_normalization(root);
        Ok(outcome)
    }

    /// Force a register into the classical value `value`
    ///
    /// An independent register has its store replaced outright; a register
    /// sharing its root is measured and then corrected bit by bit.
    pub fn reset(&mut self, reg: Register, value: u64) -> Result<()> {
        let (root, offset, width) = self.bit_range(reg)?;
        if value & !width_mask(width) != 0 {
            return Err(QuantumError::ValueOutOfRange { value, width });
        }

        if offset == 0 && width == self.width(root)? {
            let capacity = self.config().default_capacity;
            *self.store_mut(root)? = AmplitudeStore::from_basis_state(width, value, capacity)?;
        } else {
            self.measure(reg)?;
            self.store_mut(root)?.set_slice(offset, width, value)?;
        }

        debug!(register = %reg, value, "reset register");
        Ok(())
    }

    /// Classical value of a register, or `None` while it is in superposition
    pub fn get_value(&self, reg: Register) -> Result<Option<u64>> {
        let (root, offset, width) = self.bit_range(reg)?;
        Ok(self.store(root)?.classical_slice_value(offset, width)?)
    }

    /// Marginal distribution over the register's values
    pub fn probabilities(&self, reg: Register) -> Result<BTreeMap<u64, f64>> {
        let (root, offset, width) = self.bit_range(reg)?;
        Ok(self.store(root)?.slice_probabilities(offset, width)?)
    }

    /// Probability that a qubit reads 1
    pub fn bit_probability(&self, qubit: QubitRef) -> Result<f64> {
        let (root, bit) = self.locate(qubit)?;
        Ok(self.store(root)?.bit_probability(bit)?)
    }

    /// Amplitudes of the register on its own
    ///
    /// Returns `None` when the register is entangled with the rest of its
    /// root. For a register spanning its whole root the stored amplitudes
    /// are returned verbatim; otherwise the global phase is fixed so the
    /// lowest populated value has a real positive amplitude.
    pub fn amplitudes(&self, reg: Register) -> Result<Option<BTreeMap<u64, Complex64>>> {
        let (root, offset, width) = self.bit_range(reg)?;
        Ok(self.store(root)?.factor_slice(offset, width)?)
    }

    /// Dense amplitude vector of length `2^width`, `None` if entangled
    ///
    /// # Errors
    /// Returns error for registers wider than 30 qubits
    pub fn vector(&self, reg: Register) -> Result<Option<Vec<Complex64>>> {
        let width = self.width(reg)?;
        if width > MAX_DENSE_WIDTH {
            return Err(QuantumError::InvalidWidth {
                width,
                max: MAX_DENSE_WIDTH,
            });
        }

        Ok(self.amplitudes(reg)?.map(|amplitudes| {
            let mut dense = vec![Complex64::new(0.0, 0.0); 1usize << width];
            for (value, amp) in amplitudes {
                dense[value as usize] = amp;
            }
            dense
        }))
    }

    /// Sample `shots` outcomes without collapsing the state
    pub fn sample(&mut self, reg: Register, shots: usize) -> Result<SamplingResult> {
        if shots == 0 {
            return Ok(SamplingResult::new(0));
        }

        let distribution = self.probabilities(reg)?;
        let table = AliasTable::new(&distribution)?;

        let rng = self.rng_mut();
        let result = table.sample_many(shots, &mut || rng.gen::<f64>());
        debug!(register = %reg, shots, outcomes = result.counts.len(), "sampled register");
        Ok(result)
    }
}
