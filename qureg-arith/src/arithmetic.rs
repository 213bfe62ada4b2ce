//! Reversible ripple-carry and modular arithmetic
//!
//! Circuits follow Vedral, Barenco and Ekert, "Quantum networks for
//! elementary arithmetic operations" (1996). Registers are little-endian:
//! qubit 0 holds the least significant bit.
//!
//! Every validating function checks widths, disjointness and ancilla
//! values before the first gate and returns an error without touching the
//! state. The `*_unchecked` variants skip those checks; they are what the
//! composite circuits call internally, and misuse gives wrong amplitudes
//! rather than an error.

use crate::number_theory::{gcd, mod_inverse, mod_pow};
use qureg_core::{width_mask, QuantumError, QubitRef, Register, Result};
use qureg_sim::QuantumComputer;
use tracing::debug;

/// Root, offset within the root and width of some qubits
type Span = (Register, usize, usize);

fn register_span(qc: &QuantumComputer, reg: Register) -> Result<Span> {
    Ok((qc.root_of(reg)?, qc.offset_to_root(reg)?, qc.width(reg)?))
}

fn qubit_span(qc: &QuantumComputer, qubit: QubitRef) -> Result<Span> {
    let reg = qubit.register();
    let width = qc.width(reg)?;
    if qubit.offset() >= width {
        return Err(QuantumError::QubitOutOfRange {
            register: reg,
            offset: qubit.offset(),
            width,
        });
    }
    Ok((qc.root_of(reg)?, qc.offset_to_root(reg)? + qubit.offset(), 1))
}

pub(crate) fn ensure_disjoint(operation: &'static str, spans: &[Span]) -> Result<()> {
    for (i, &(root_a, start_a, width_a)) in spans.iter().enumerate() {
        for &(root_b, start_b, width_b) in &spans[i + 1..] {
            if root_a == root_b && start_a < start_b + width_b && start_b < start_a + width_a {
                return Err(QuantumError::OverlappingRegisters { operation });
            }
        }
    }
    Ok(())
}

pub(crate) fn expect_width(
    qc: &QuantumComputer,
    operation: &'static str,
    operand: &'static str,
    reg: Register,
    expected: usize,
) -> Result<()> {
    let actual = qc.width(reg)?;
    if actual != expected {
        return Err(QuantumError::width_mismatch(operation, operand, expected, actual));
    }
    Ok(())
}

fn operand_width(qc: &QuantumComputer, reg: Register) -> Result<usize> {
    match qc.width(reg)? {
        0 => Err(QuantumError::invalid_width(0)),
        width => Ok(width),
    }
}

fn expect_value(
    qc: &QuantumComputer,
    operation: &'static str,
    operand: &'static str,
    reg: Register,
    expected: u64,
) -> Result<()> {
    if qc.get_value(reg)? != Some(expected) {
        return Err(QuantumError::InvalidState(format!(
            "{}: register {} must hold {}",
            operation, operand, expected
        )));
    }
    Ok(())
}

fn expect_clear_qubit(
    qc: &QuantumComputer,
    operation: &'static str,
    operand: &'static str,
    qubit: QubitRef,
) -> Result<()> {
    if qc.bit_probability(qubit)? != 0.0 {
        return Err(QuantumError::InvalidState(format!(
            "{}: qubit {} must be |0>",
            operation, operand
        )));
    }
    Ok(())
}

fn check_modulus(modulus: u64, width: usize) -> Result<()> {
    if modulus < 2 || modulus > width_mask(width) {
        return Err(QuantumError::InvalidModulus(format!(
            "modulus {} must be at least 2 and fit in {} bits",
            modulus, width
        )));
    }
    Ok(())
}

/// `value · 2^shift mod modulus` without overflow
fn shifted_mod(value: u64, shift: usize, modulus: u64) -> u64 {
    ((u128::from(value) << shift) % u128::from(modulus)) as u64
}

// ============================================================================
// Classical loading and swaps
// ============================================================================

/// XOR a classical value into a register under optional controls
///
/// Each set bit of `value` becomes an X, CNot or Toffoli depending on the
/// number of controls. Applied to a register holding 0 this loads the
/// value; applied again it unloads it.
pub fn load_number(qc: &mut QuantumComputer, reg: Register, value: u64, controls: &[QubitRef]) -> Result<()> {
    let width = qc.width(reg)?;
    if value & !width_mask(width) != 0 {
        return Err(QuantumError::ValueOutOfRange { value, width });
    }
    let mut spans = vec![register_span(qc, reg)?];
    for &control in controls {
        spans.push(qubit_span(qc, control)?);
    }
    ensure_disjoint("load_number", &spans)?;

    load_number_unchecked(qc, reg, value, controls)
}

/// [`load_number`] without validation
pub fn load_number_unchecked(
    qc: &mut QuantumComputer,
    reg: Register,
    value: u64,
    controls: &[QubitRef],
) -> Result<()> {
    let width = qc.width(reg)?;
    for bit in (0..width).filter(|&bit| (value >> bit) & 1 == 1) {
        let target = reg.qubit(bit);
        match controls {
            [] => qc.sigma_x(target, &[])?,
            [control] => qc.cnot(target, *control)?,
            _ => qc.toffoli(target, controls)?,
        }
    }
    Ok(())
}

/// Exchange two qubits with three CNots
pub fn swap(qc: &mut QuantumComputer, q1: QubitRef, q2: QubitRef) -> Result<()> {
    qc.cnot(q1, q2)?;
    qc.cnot(q2, q1)?;
    qc.cnot(q1, q2)
}

/// Exchange two qubits when `control` is set (Fredkin gate)
pub fn controlled_swap(qc: &mut QuantumComputer, control: QubitRef, q1: QubitRef, q2: QubitRef) -> Result<()> {
    qc.cnot(q1, q2)?;
    qc.toffoli(q2, &[control, q1])?;
    qc.cnot(q1, q2)
}

/// Exchange two registers of equal width qubit by qubit
pub fn swap_registers(qc: &mut QuantumComputer, a: Register, b: Register) -> Result<()> {
    let width = qc.width(a)?;
    expect_width(qc, "swap_registers", "b", b, width)?;
    ensure_disjoint("swap_registers", &[register_span(qc, a)?, register_span(qc, b)?])?;

    for bit in 0..width {
        swap(qc, a.qubit(bit), b.qubit(bit))?;
    }
    Ok(())
}

// ============================================================================
// Ripple-carry adder
// ============================================================================

/// Carry block: `c1 ^= majority-style carry of (c, a, b)`, `b ^= a`
pub fn carry(qc: &mut QuantumComputer, c: QubitRef, a: QubitRef, b: QubitRef, c1: QubitRef) -> Result<()> {
    qc.toffoli(c1, &[a, b])?;
    qc.cnot(b, a)?;
    qc.toffoli(c1, &[c, b])
}

/// Reverse of [`carry`]
pub fn inverse_carry(qc: &mut QuantumComputer, c: QubitRef, a: QubitRef, b: QubitRef, c1: QubitRef) -> Result<()> {
    qc.toffoli(c1, &[c, b])?;
    qc.cnot(b, a)?;
    qc.toffoli(c1, &[a, b])
}

/// Sum block: `b ^= a ^ c`; its own inverse
pub fn sum(qc: &mut QuantumComputer, c: QubitRef, a: QubitRef, b: QubitRef) -> Result<()> {
    qc.cnot(b, a)?;
    qc.cnot(b, c)
}

/// Index of the most significant bit of a `width`-bit operand
fn top_bit(width: usize) -> Result<usize> {
    width.checked_sub(1).ok_or_else(|| QuantumError::invalid_width(0))
}

fn check_adder(qc: &QuantumComputer, operation: &'static str, a: Register, b: Register, c: Register) -> Result<()> {
    let n = operand_width(qc, a)?;
    expect_width(qc, operation, "b", b, n + 1)?;
    expect_width(qc, operation, "c", c, n)?;
    ensure_disjoint(
        operation,
        &[register_span(qc, a)?, register_span(qc, b)?, register_span(qc, c)?],
    )?;
    expect_value(qc, operation, "c", c, 0)
}

/// `b = (a + b) mod 2^(n+1)`
///
/// `a` has `n` qubits and is left unchanged, `b` has `n + 1` so the carry
/// out lands in its top qubit, and `c` is an `n`-qubit carry ancilla that
/// must hold 0 and is returned to 0.
///
/// # Example
/// ```
/// use qureg_sim::QuantumComputer;
/// use qureg_arith::arithmetic::add;
///
/// let mut qc = QuantumComputer::new();
/// let a = qc.new_register(3, 2).unwrap();
/// let b = qc.new_register(2, 3).unwrap();
/// let c = qc.new_register(0, 2).unwrap();
///
/// add(&mut qc, a, b, c).unwrap();
/// assert_eq!(qc.get_value(b).unwrap(), Some(5));
/// assert_eq!(qc.get_value(a).unwrap(), Some(3));
/// ```
pub fn add(qc: &mut QuantumComputer, a: Register, b: Register, c: Register) -> Result<()> {
    check_adder(qc, "add", a, b, c)?;
    add_unchecked(qc, a, b, c)
}

/// [`add`] without validation
pub fn add_unchecked(qc: &mut QuantumComputer, a: Register, b: Register, c: Register) -> Result<()> {
    let n = qc.width(a)?;
    let top = top_bit(n)?;

    for i in 0..top {
        carry(qc, c.qubit(i), a.qubit(i), b.qubit(i), c.qubit(i + 1))?;
    }
    carry(qc, c.qubit(top), a.qubit(top), b.qubit(top), b.qubit(n))?;
    qc.cnot(b.qubit(top), a.qubit(top))?;
    sum(qc, c.qubit(top), a.qubit(top), b.qubit(top))?;
    for i in (0..top).rev() {
        inverse_carry(qc, c.qubit(i), a.qubit(i), b.qubit(i), c.qubit(i + 1))?;
        sum(qc, c.qubit(i), a.qubit(i), b.qubit(i))?;
    }
    Ok(())
}

/// Undo [`add`]: `b = (b - a) mod 2^(n+1)`
pub fn inverse_add(qc: &mut QuantumComputer, a: Register, b: Register, c: Register) -> Result<()> {
    check_adder(qc, "inverse_add", a, b, c)?;
    inverse_add_unchecked(qc, a, b, c)
}

/// [`inverse_add`] without validation
pub fn inverse_add_unchecked(qc: &mut QuantumComputer, a: Register, b: Register, c: Register) -> Result<()> {
    let n = qc.width(a)?;
    let top = top_bit(n)?;

    for i in 0..top {
        sum(qc, c.qubit(i), a.qubit(i), b.qubit(i))?;
        carry(qc, c.qubit(i), a.qubit(i), b.qubit(i), c.qubit(i + 1))?;
    }
    sum(qc, c.qubit(top), a.qubit(top), b.qubit(top))?;
    qc.cnot(b.qubit(top), a.qubit(top))?;
    inverse_carry(qc, c.qubit(top), a.qubit(top), b.qubit(top), b.qubit(n))?;
    for i in (0..top).rev() {
        inverse_carry(qc, c.qubit(i), a.qubit(i), b.qubit(i), c.qubit(i + 1))?;
    }
    Ok(())
}

// ============================================================================
// Modular adder
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn check_modular_adder(
    qc: &QuantumComputer,
    operation: &'static str,
    a: Register,
    b: Register,
    c: Register,
    n_reg: Register,
    t: QubitRef,
    modulus: u64,
) -> Result<()> {
    let n = operand_width(qc, a)?;
    expect_width(qc, operation, "b", b, n + 1)?;
    expect_width(qc, operation, "c", c, n)?;
    expect_width(qc, operation, "n_reg", n_reg, n)?;
    check_modulus(modulus, n)?;
    ensure_disjoint(
        operation,
        &[
            register_span(qc, a)?,
            register_span(qc, b)?,
            register_span(qc, c)?,
            register_span(qc, n_reg)?,
            qubit_span(qc, t)?,
        ],
    )?;
    expect_value(qc, operation, "c", c, 0)?;
    expect_value(qc, operation, "n_reg", n_reg, modulus)?;
    expect_clear_qubit(qc, operation, "t", t)
}

/// Toggle the modulus register to 0 when `t` is set
fn clear_modulus_if(qc: &mut QuantumComputer, n_reg: Register, t: QubitRef, modulus: u64) -> Result<()> {
    load_number_unchecked(qc, n_reg, modulus, &[t])
}

/// `b = (a + b) mod N`
///
/// Widths: `a`, `c` and `n_reg` have `n` qubits, `b` has `n + 1`.
/// `n_reg` must hold `N`, `c` and `t` must be 0, and both `a` and `b`
/// must be below `N`; all ancillas are restored.
#[allow(clippy::too_many_arguments)]
pub fn add_modulo(
    qc: &mut QuantumComputer,
    a: Register,
    b: Register,
    c: Register,
    n_reg: Register,
    t: QubitRef,
    modulus: u64,
) -> Result<()> {
    check_modular_adder(qc, "add_modulo", a, b, c, n_reg, t, modulus)?;
    add_modulo_unchecked(qc, a, b, c, n_reg, t, modulus)
}

/// [`add_modulo`] without validation
#[allow(clippy::too_many_arguments)]
pub fn add_modulo_unchecked(
    qc: &mut QuantumComputer,
    a: Register,
    b: Register,
    c: Register,
    n_reg: Register,
    t: QubitRef,
    modulus: u64,
) -> Result<()> {
    let top = b.qubit(qc.width(a)?);

    add_unchecked(qc, a, b, c)?;
    inverse_add_unchecked(qc, n_reg, b, c)?;

    // t = 1 unless a + b - N underflowed
    qc.sigma_x(top, &[])?;
    qc.cnot(t, top)?;
    qc.sigma_x(top, &[])?;

    clear_modulus_if(qc, n_reg, t, modulus)?;
    add_unchecked(qc, n_reg, b, c)?;
    clear_modulus_if(qc, n_reg, t, modulus)?;

    // b - a underflows exactly when t was set
    inverse_add_unchecked(qc, a, b, c)?;
    qc.cnot(t, top)?;
    add_unchecked(qc, a, b, c)
}

/// Undo [`add_modulo`]: `b = (b - a) mod N`
#[allow(clippy::too_many_arguments)]
pub fn inverse_add_modulo(
    qc: &mut QuantumComputer,
    a: Register,
    b: Register,
    c: Register,
    n_reg: Register,
    t: QubitRef,
    modulus: u64,
) -> Result<()> {
    check_modular_adder(qc, "inverse_add_modulo", a, b, c, n_reg, t, modulus)?;
    inverse_add_modulo_unchecked(qc, a, b, c, n_reg, t, modulus)
}

/// [`inverse_add_modulo`] without validation
#[allow(clippy::too_many_arguments)]
pub fn inverse_add_modulo_unchecked(
    qc: &mut QuantumComputer,
    a: Register,
    b: Register,
    c: Register,
    n_reg: Register,
    t: QubitRef,
    modulus: u64,
) -> Result<()> {
    let top = b.qubit(qc.width(a)?);

    inverse_add_unchecked(qc, a, b, c)?;
    qc.cnot(t, top)?;
    add_unchecked(qc, a, b, c)?;

    clear_modulus_if(qc, n_reg, t, modulus)?;
    inverse_add_unchecked(qc, n_reg, b, c)?;
    clear_modulus_if(qc, n_reg, t, modulus)?;

    qc.sigma_x(top, &[])?;
    qc.cnot(t, top)?;
    qc.sigma_x(top, &[])?;

    add_unchecked(qc, n_reg, b, c)?;
    inverse_add_unchecked(qc, a, b, c)
}

// ============================================================================
// Controlled modular multiplier
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn check_multiplier(
    qc: &QuantumComputer,
    operation: &'static str,
    control: QubitRef,
    x: Register,
    b: Register,
    c: Register,
    n_reg: Register,
    t: QubitRef,
    xa: Register,
    modulus: u64,
) -> Result<()> {
    let n = operand_width(qc, x)?;
    expect_width(qc, operation, "b", b, n + 1)?;
    expect_width(qc, operation, "c", c, n)?;
    expect_width(qc, operation, "n_reg", n_reg, n)?;
    expect_width(qc, operation, "xa", xa, n)?;
    check_modulus(modulus, n)?;
    ensure_disjoint(
        operation,
        &[
            qubit_span(qc, control)?,
            register_span(qc, x)?,
            register_span(qc, b)?,
            register_span(qc, c)?,
            register_span(qc, n_reg)?,
            qubit_span(qc, t)?,
            register_span(qc, xa)?,
        ],
    )?;
    expect_value(qc, operation, "c", c, 0)?;
    expect_value(qc, operation, "xa", xa, 0)?;
    expect_value(qc, operation, "n_reg", n_reg, modulus)?;
    expect_clear_qubit(qc, operation, "t", t)
}

/// Copy `x` into `b` when `control` is clear
fn copy_when_clear(qc: &mut QuantumComputer, control: QubitRef, x: Register, b: Register) -> Result<()> {
    qc.sigma_x(control, &[])?;
    for bit in 0..qc.width(x)? {
        qc.toffoli(b.qubit(bit), &[control, x.qubit(bit)])?;
    }
    qc.sigma_x(control, &[])
}

/// Controlled `b = b + x·m mod N`, or `b = b ⊕ x` when `control` is clear
///
/// Each bit `x[i]` adds `m·2^i mod N`, loaded into the scratch register
/// `xa` under `control` and `x[i]`. Starting from `b = 0` this leaves
/// `x·m mod N` in `b` when the control is set and a copy of `x` otherwise.
///
/// Widths: `x`, `c`, `n_reg` and `xa` have `n` qubits, `b` has `n + 1`.
/// `n_reg` must hold `N`; `c`, `t` and `xa` must be 0.
#[allow(clippy::too_many_arguments)]
pub fn mult_modulo(
    qc: &mut QuantumComputer,
    control: QubitRef,
    x: Register,
    b: Register,
    c: Register,
    n_reg: Register,
    t: QubitRef,
    xa: Register,
    multiplier: u64,
    modulus: u64,
) -> Result<()> {
    check_multiplier(qc, "mult_modulo", control, x, b, c, n_reg, t, xa, modulus)?;
    mult_modulo_unchecked(qc, control, x, b, c, n_reg, t, xa, multiplier, modulus)
}

/// [`mult_modulo`] without validation
#[allow(clippy::too_many_arguments)]
pub fn mult_modulo_unchecked(
    qc: &mut QuantumComputer,
    control: QubitRef,
    x: Register,
    b: Register,
    c: Register,
    n_reg: Register,
    t: QubitRef,
    xa: Register,
    multiplier: u64,
    modulus: u64,
) -> Result<()> {
    for i in 0..qc.width(x)? {
        let term = shifted_mod(multiplier, i, modulus);
        let controls = [control, x.qubit(i)];
        load_number_unchecked(qc, xa, term, &controls)?;
        add_modulo_unchecked(qc, xa, b, c, n_reg, t, modulus)?;
        load_number_unchecked(qc, xa, term, &controls)?;
    }
    copy_when_clear(qc, control, x, b)
}

/// Undo [`mult_modulo`]
#[allow(clippy::too_many_arguments)]
pub fn inverse_mult_modulo(
    qc: &mut QuantumComputer,
    control: QubitRef,
    x: Register,
    b: Register,
    c: Register,
    n_reg: Register,
    t: QubitRef,
    xa: Register,
    multiplier: u64,
    modulus: u64,
) -> Result<()> {
    check_multiplier(qc, "inverse_mult_modulo", control, x, b, c, n_reg, t, xa, modulus)?;
    inverse_mult_modulo_unchecked(qc, control, x, b, c, n_reg, t, xa, multiplier, modulus)
}

/// [`inverse_mult_modulo`] without validation
#[allow(clippy::too_many_arguments)]
pub fn inverse_mult_modulo_unchecked(
    qc: &mut QuantumComputer,
    control: QubitRef,
    x: Register,
    b: Register,
    c: Register,
    n_reg: Register,
    t: QubitRef,
    xa: Register,
    multiplier: u64,
    modulus: u64,
) -> Result<()> {
    copy_when_clear(qc, control, x, b)?;
    for i in (0..qc.width(x)?).rev() {
        let term = shifted_mod(multiplier, i, modulus);
        let controls = [control, x.qubit(i)];
        load_number_unchecked(qc, xa, term, &controls)?;
        inverse_add_modulo_unchecked(qc, xa, b, c, n_reg, t, modulus)?;
        load_number_unchecked(qc, xa, term, &controls)?;
    }
    Ok(())
}

// ============================================================================
// Modular exponentiation
// ============================================================================

/// `y = y · base^x mod N`
///
/// Initialize `y` to 1 to compute `base^x mod N`. For each exponent bit
/// `x[i]` the circuit multiplies into `b` by `base^(2^i)`, swaps `y` and
/// `b`, and clears `b` by multiplying with the inverse, so `base` must be
/// coprime to `N`.
///
/// Widths: `y`, `c`, `n_reg` and `xa` have `n` qubits, `b` has `n + 1`,
/// `x` has any width. `n_reg` must hold `N`; `b`, `c`, `t` and `xa` must
/// be 0 and are restored.
#[allow(clippy::too_many_arguments)]
pub fn exp_modulo(
    qc: &mut QuantumComputer,
    x: Register,
    y: Register,
    b: Register,
    c: Register,
    n_reg: Register,
    t: QubitRef,
    xa: Register,
    base: u64,
    modulus: u64,
) -> Result<()> {
    const OPERATION: &str = "exp_modulo";

    let n = operand_width(qc, y)?;
    operand_width(qc, x)?;
    expect_width(qc, OPERATION, "b", b, n + 1)?;
    expect_width(qc, OPERATION, "c", c, n)?;
    expect_width(qc, OPERATION, "n_reg", n_reg, n)?;
    expect_width(qc, OPERATION, "xa", xa, n)?;
    check_modulus(modulus, n)?;
    if gcd(base, modulus) != 1 {
        return Err(QuantumError::InvalidModulus(format!(
            "base {} is not coprime to modulus {}",
            base, modulus
        )));
    }
    ensure_disjoint(
        OPERATION,
        &[
            register_span(qc, x)?,
            register_span(qc, y)?,
            register_span(qc, b)?,
            register_span(qc, c)?,
            register_span(qc, n_reg)?,
            qubit_span(qc, t)?,
            register_span(qc, xa)?,
        ],
    )?;
    expect_value(qc, OPERATION, "b", b, 0)?;
    expect_value(qc, OPERATION, "c", c, 0)?;
    expect_value(qc, OPERATION, "xa", xa, 0)?;
    expect_value(qc, OPERATION, "n_reg", n_reg, modulus)?;
    expect_clear_qubit(qc, OPERATION, "t", t)?;

    exp_modulo_unchecked(qc, x, y, b, c, n_reg, t, xa, base, modulus)
}

/// [`exp_modulo`] without validation
#[allow(clippy::too_many_arguments)]
pub fn exp_modulo_unchecked(
    qc: &mut QuantumComputer,
    x: Register,
    y: Register,
    b: Register,
    c: Register,
    n_reg: Register,
    t: QubitRef,
    xa: Register,
    base: u64,
    modulus: u64,
) -> Result<()> {
    let n = qc.width(y)?;
    let mut factor = base % modulus;

    for i in 0..qc.width(x)? {
        let inverse = mod_inverse(factor, modulus).ok_or_else(|| {
            QuantumError::InvalidModulus(format!("{} has no inverse modulo {}", factor, modulus))
        })?;
        let control = x.qubit(i);

        mult_modulo_unchecked(qc, control, y, b, c, n_reg, t, xa, factor, modulus)?;
        for bit in 0..n {
            swap(qc, y.qubit(bit), b.qubit(bit))?;
        }
        inverse_mult_modulo_unchecked(qc, control, y, b, c, n_reg, t, xa, inverse, modulus)?;

        debug!(bit = i, factor, "exp_modulo step");
        factor = mod_pow(factor, 2, modulus);
    }
    Ok(())
}
