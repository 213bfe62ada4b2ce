//! Reversible arithmetic and Fourier-transform circuits for qureg
//!
//! Every function here is a stateless sequence of gates issued through a
//! [`QuantumComputer`](qureg_sim::QuantumComputer); nothing touches the
//! amplitude store directly.
//!
//! - [`arithmetic`]: ripple-carry adder, modular adder, controlled modular
//!   multiplier and modular exponentiation
//! - [`qft`]: quantum Fourier transform and Draper phase adders
//! - [`number_theory`]: classical helpers for choosing circuit parameters
//!
//! # Example
//! ```
//! use qureg_sim::QuantumComputer;
//! use qureg_arith::{add, inverse_add};
//!
//! let mut qc = QuantumComputer::new();
//! let a = qc.new_register(6, 3).unwrap();
//! let b = qc.new_register(7, 4).unwrap();
//! let c = qc.new_register(0, 3).unwrap();
//!
//! add(&mut qc, a, b, c).unwrap();
//! assert_eq!(qc.get_value(b).unwrap(), Some(13));
//!
//! inverse_add(&mut qc, a, b, c).unwrap();
//! assert_eq!(qc.get_value(b).unwrap(), Some(7));
//! ```

pub mod arithmetic;
pub mod number_theory;
pub mod qft;

pub use arithmetic::{
    add, add_modulo, carry, controlled_swap, exp_modulo, inverse_add, inverse_add_modulo,
    inverse_carry, inverse_mult_modulo, load_number, mult_modulo, sum, swap, swap_registers,
};
pub use number_theory::{gcd, mod_inverse, mod_pow};
pub use qft::{
    add_const_qft_phi, add_qft, add_qft_phi, inverse_add_const_qft_phi, inverse_add_qft,
    inverse_add_qft_phi, inverse_qft, qft, walsh_hadamard,
};
