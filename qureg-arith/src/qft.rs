//! Quantum Fourier transform and Draper phase adders
//!
//! The transform maps `|x>` to `Σ_y e^(2πi·x·y/2^n) |y> / √2^n` with the
//! output in the same little-endian qubit order as the input.

use crate::arithmetic::ensure_disjoint;
use qureg_core::{width_mask, QuantumError, QubitRef, Register, Result};
use qureg_sim::QuantumComputer;
use std::f64::consts::PI;

/// Quantum Fourier transform of a register
///
/// # Example
/// ```
/// use qureg_sim::QuantumComputer;
/// use qureg_arith::qft::{inverse_qft, qft};
///
/// let mut qc = QuantumComputer::new();
/// let r = qc.new_register(5, 3).unwrap();
/// qft(&mut qc, r).unwrap();
/// assert_eq!(qc.get_value(r).unwrap(), None);
/// inverse_qft(&mut qc, r).unwrap();
/// assert_eq!(qc.get_value(r).unwrap(), Some(5));
/// ```
pub fn qft(qc: &mut QuantumComputer, reg: Register) -> Result<()> {
    let width = qc.width(reg)?;
    for i in (0..width).rev() {
        qc.hadamard(reg.qubit(i), &[])?;
        for j in (0..i).rev() {
            qc.cphase_shift((i - j) as u32, reg.qubit(i), &[reg.qubit(j)])?;
        }
    }
    reverse_qubits(qc, reg, width)
}

/// Inverse of [`qft`]
pub fn inverse_qft(qc: &mut QuantumComputer, reg: Register) -> Result<()> {
    let width = qc.width(reg)?;
    reverse_qubits(qc, reg, width)?;
    for i in 0..width {
        for j in 0..i {
            qc.inverse_cphase_shift((i - j) as u32, reg.qubit(i), &[reg.qubit(j)])?;
        }
        qc.hadamard(reg.qubit(i), &[])?;
    }
    Ok(())
}

fn reverse_qubits(qc: &mut QuantumComputer, reg: Register, width: usize) -> Result<()> {
    for i in 0..width / 2 {
        crate::arithmetic::swap(qc, reg.qubit(i), reg.qubit(width - 1 - i))?;
    }
    Ok(())
}

/// Hadamard on every qubit of a register
pub fn walsh_hadamard(qc: &mut QuantumComputer, reg: Register) -> Result<()> {
    qc.walsh_hadamard(reg)
}

fn check_draper(qc: &QuantumComputer, operation: &'static str, a: Register, b: Register) -> Result<(usize, usize)> {
    let m = qc.width(a)?;
    let n = qc.width(b)?;
    if m > n {
        return Err(QuantumError::width_mismatch(operation, "a", n, m));
    }
    ensure_disjoint(
        operation,
        &[
            (qc.root_of(a)?, qc.offset_to_root(a)?, m),
            (qc.root_of(b)?, qc.offset_to_root(b)?, n),
        ],
    )?;
    Ok((m, n))
}

/// Add `a` to a register `b` already in Fourier space
///
/// Each pair `a[j]`, `b[l]` with `j + l < n` contributes a controlled
/// phase of `π / 2^(n-1-j-l)`. `a` may be narrower than `b`.
pub fn add_qft_phi(qc: &mut QuantumComputer, a: Register, b: Register) -> Result<()> {
    let (m, n) = check_draper(qc, "add_qft_phi", a, b)?;
    for j in 0..m {
        for l in 0..n - j {
            qc.cphase_shift((n - 1 - j - l) as u32, b.qubit(l), &[a.qubit(j)])?;
        }
    }
    Ok(())
}

/// Subtract `a` from a register `b` already in Fourier space
pub fn inverse_add_qft_phi(qc: &mut QuantumComputer, a: Register, b: Register) -> Result<()> {
    let (m, n) = check_draper(qc, "inverse_add_qft_phi", a, b)?;
    for j in (0..m).rev() {
        for l in (0..n - j).rev() {
            qc.inverse_cphase_shift((n - 1 - j - l) as u32, b.qubit(l), &[a.qubit(j)])?;
        }
    }
    Ok(())
}

/// `b = (a + b) mod 2^n` by transforming `b`, phase-adding and transforming back
pub fn add_qft(qc: &mut QuantumComputer, a: Register, b: Register) -> Result<()> {
    check_draper(qc, "add_qft", a, b)?;
    qft(qc, b)?;
    add_qft_phi(qc, a, b)?;
    inverse_qft(qc, b)
}

/// `b = (b - a) mod 2^n`
pub fn inverse_add_qft(qc: &mut QuantumComputer, a: Register, b: Register) -> Result<()> {
    check_draper(qc, "inverse_add_qft", a, b)?;
    qft(qc, b)?;
    inverse_add_qft_phi(qc, a, b)?;
    inverse_qft(qc, b)
}

/// Phase angle added to `b[bit]` when adding `value` in Fourier space
fn constant_phase(value: u64, bit: usize, width: usize) -> f64 {
    let modulus = u128::from(width_mask(width)) + 1;
    let turns = (u128::from(value) << bit) % modulus;
    2.0 * PI * (turns as f64) / (modulus as f64)
}

fn add_const_phases(
    qc: &mut QuantumComputer,
    b: Register,
    value: u64,
    controls: &[QubitRef],
    sign: f64,
) -> Result<()> {
    let width = qc.width(b)?;
    for bit in 0..width {
        let angle = constant_phase(value, bit, width);
        if angle != 0.0 {
            qc.phase_kick(sign * angle, b.qubit(bit), controls)?;
        }
    }
    Ok(())
}

/// Add a classical constant to a register in Fourier space, under optional controls
///
/// The constant is taken modulo `2^n`.
pub fn add_const_qft_phi(qc: &mut QuantumComputer, b: Register, value: u64, controls: &[QubitRef]) -> Result<()> {
    add_const_phases(qc, b, value, controls, 1.0)
}

/// Subtract a classical constant from a register in Fourier space
pub fn inverse_add_const_qft_phi(
    qc: &mut QuantumComputer,
    b: Register,
    value: u64,
    controls: &[QubitRef],
) -> Result<()> {
    add_const_phases(qc, b, value, controls, -1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use num_complex::Complex64;
    use qureg_core::SimulationConfig;

    fn session() -> QuantumComputer {
        QuantumComputer::with_config(SimulationConfig::deterministic(11)).unwrap()
    }

    #[test]
    fn test_constant_phase() {
        assert_relative_eq!(constant_phase(1, 0, 2), PI / 2.0);
        assert_relative_eq!(constant_phase(1, 1, 2), PI);
        assert_eq!(constant_phase(2, 1, 2), 0.0);
        assert_eq!(constant_phase(u64::MAX, 63, 64), PI);
    }

    #[test]
    fn test_qft_of_one() {
        let mut qc = session();
        let r = qc.new_register(1, 2).unwrap();
        qft(&mut qc, r).unwrap();

        let v = qc.vector(r).unwrap().unwrap();
        let expected = [
            Complex64::new(0.5, 0.0),
            Complex64::new(0.0, 0.5),
            Complex64::new(-0.5, 0.0),
            Complex64::new(0.0, -0.5),
        ];
        for (got, want) in v.iter().zip(expected.iter()) {
            assert_relative_eq!(got.re, want.re, epsilon = 1e-12);
            assert_relative_eq!(got.im, want.im, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_qft_of_zero_is_uniform() {
        let mut qc = session();
        let r = qc.new_register(0, 3).unwrap();
        qft(&mut qc, r).unwrap();
        let probs = qc.probabilities(r).unwrap();
        assert_eq!(probs.len(), 8);
        for p in probs.values() {
            assert_relative_eq!(*p, 0.125, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_add_qft() {
        for a_val in 0..4u64 {
            for b_val in 0..8u64 {
                let mut qc = session();
                let a = qc.new_register(a_val, 2).unwrap();
                let b = qc.new_register(b_val, 3).unwrap();
                add_qft(&mut qc, a, b).unwrap();
                assert_eq!(qc.get_value(b).unwrap(), Some((a_val + b_val) % 8));

                inverse_add_qft(&mut qc, a, b).unwrap();
                assert_eq!(qc.get_value(b).unwrap(), Some(b_val));
            }
        }
    }

    #[test]
    fn test_add_qft_rejects_wider_addend() {
        let mut qc = session();
        let a = qc.new_register(0, 3).unwrap();
        let b = qc.new_register(0, 2).unwrap();
        assert!(matches!(add_qft(&mut qc, a, b), Err(QuantumError::WidthMismatch { .. })));
    }

    #[test]
    fn test_add_const_with_controls() {
        for control_val in 0..2u64 {
            let mut qc = session();
            let ctrl = qc.new_register(control_val, 1).unwrap();
            let b = qc.new_register(6, 3).unwrap();

            qft(&mut qc, b).unwrap();
            add_const_qft_phi(&mut qc, b, 3, &[ctrl.first_qubit()]).unwrap();
            inverse_qft(&mut qc, b).unwrap();
            let expected = if control_val == 1 { 1 } else { 6 };
            assert_eq!(qc.get_value(b).unwrap(), Some(expected));

            qft(&mut qc, b).unwrap();
            inverse_add_const_qft_phi(&mut qc, b, 3, &[ctrl.first_qubit()]).unwrap();
            inverse_qft(&mut qc, b).unwrap();
            assert_eq!(qc.get_value(b).unwrap(), Some(6));
        }
    }
}
