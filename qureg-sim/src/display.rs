//! Human-readable register dump
//!
//! One line per populated value, ascending:
//!
//! ```text
//! (0.707107, 0.000000)|0>  0.500000  00
//! (0.707107, 0.000000)|3>  0.500000  11
//! ```
//!
//! Entangled views print `entangled` instead of an amplitude.

use crate::computer::QuantumComputer;
use num_complex::Complex64;
use qureg_core::{Register, Result};
use std::fmt;

/// Snapshot of a register's state, formatted by `Display`
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterDump {
    width: usize,
    entries: Vec<DumpEntry>,
}

#[derive(Debug, Clone, PartialEq)]
struct DumpEntry {
    value: u64,
    amplitude: Option<Complex64>,
    probability: f64,
}

impl RegisterDump {
    /// Number of populated values
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is populated
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if the register could not be isolated from its root
    pub fn is_entangled(&self) -> bool {
        self.entries.iter().any(|entry| entry.amplitude.is_none())
    }
}

impl QuantumComputer {
    /// Capture a register for display
    ///
    /// # Example
    /// ```
    /// use qureg_sim::QuantumComputer;
    ///
    /// let mut qc = QuantumComputer::new();
    /// let r = qc.new_register(5, 4).unwrap();
    /// let dump = qc.display(r).unwrap();
    /// assert_eq!(dump.to_string(), "(1.000000, 0.000000)|5>  1.000000  0101\n");
    /// ```
    pub fn display(&self, reg: Register) -> Result<RegisterDump> {
        let width = self.width(reg)?;
        let entries = match self.amplitudes(reg)? {
            Some(amplitudes) => amplitudes
                .into_iter()
                .map(|(value, amp)| DumpEntry {
                    value,
                    amplitude: Some(amp),
                    probability: amp.norm_sqr(),
                })
                .collect(),
            None => self
                .probabilities(reg)?
                .into_iter()
                .map(|(value, probability)| DumpEntry {
                    value,
                    amplitude: None,
                    probability,
                })
                .collect(),
        };

        Ok(RegisterDump { width, entries })
    }
}

/// Print `-0.000000` as `0.000000`
fn clean(x: f64) -> f64 {
    if x.abs() < 5e-7 {
        0.0
    } else {
        x
    }
}

/// Binary digits, most significant first, space every four from the right
fn grouped_bits(value: u64, width: usize) -> String {
    let digits = format!("{:0width$b}", value, width = width);
    let mut grouped = String::with_capacity(width + width / 4);
    for (i, digit) in digits.chars().enumerate() {
        if i > 0 && (width - i) % 4 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }
    grouped
}

impl fmt::Display for RegisterDump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            match entry.amplitude {
                Some(amp) => write!(f, "({:.6}, {:.6})", clean(amp.re), clean(amp.im))?,
                None => write!(f, "entangled")?,
            }
            writeln!(
                f,
                "|{}>  {:.6}  {}",
                entry.value,
                entry.probability,
                grouped_bits(entry.value, self.width)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qureg_core::SimulationConfig;

    #[test]
    fn test_grouped_bits() {
        assert_eq!(grouped_bits(5, 4), "0101");
        assert_eq!(grouped_bits(5, 6), "00 0101");
        assert_eq!(grouped_bits(0xAB, 9), "0 1010 1011");
        assert_eq!(grouped_bits(1, 1), "1");
    }

    #[test]
    fn test_bell_dump() {
        let mut qc = QuantumComputer::with_config(SimulationConfig::deterministic(0)).unwrap();
        let r = qc.new_register(0, 2).unwrap();
        qc.hadamard(r.qubit(0), &[]).unwrap();
        qc.cnot(r.qubit(1), r.qubit(0)).unwrap();

        let dump = qc.display(r).unwrap();
        assert!(!dump.is_entangled());
        assert_eq!(
            dump.to_string(),
            "(0.707107, 0.000000)|0>  0.500000  00\n(0.707107, 0.000000)|3>  0.500000  11\n"
        );

        let low = qc.slice(r, 0, 1).unwrap();
        let dump = qc.display(low).unwrap();
        assert!(dump.is_entangled());
        assert_eq!(
            dump.to_string(),
            "entangled|0>  0.500000  0\nentangled|1>  0.500000  1\n"
        );
    }

    #[test]
    fn test_negative_zero_is_cleaned() {
        let mut qc = QuantumComputer::new();
        let r = qc.new_register(0, 1).unwrap();
        qc.hadamard(r.first_qubit(), &[]).unwrap();
        qc.sigma_z(r.first_qubit(), &[]).unwrap();
        let text = qc.display(r).unwrap().to_string();
        assert!(text.contains("(-0.707107, 0.000000)|1>"));
        assert!(!text.contains("-0.000000"));
    }
}
