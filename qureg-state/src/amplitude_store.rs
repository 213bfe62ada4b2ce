//! Sparse amplitude storage for root registers
//!
//! An [`AmplitudeStore`] maps basis-state indices to complex amplitudes.
//! Bit `i` of an index is the qubit at offset `i` of the owning root.
//!
//! # Invariants
//!
//! - Every stored amplitude has squared magnitude at or above
//!   `ε / 2^width`; anything smaller is treated as exactly zero and removed.
//! - Indices not present have amplitude zero.
//! - `Σ |amplitude|² = 1` within `ε / 2^width` after every public mutation.
//!
//! All gate kernels mutate the map in place; none of them renormalize, so
//! drift is visible to validation instead of being hidden.

use crate::error::{Result, StateError};
use crate::validation::check_finite;
use ahash::{AHashMap, AHashSet};
use num_complex::Complex64;
use qureg_core::{epsilon_for_width, width_mask, MAX_QUBITS};
use qureg_gates::Matrix2;
use std::collections::BTreeMap;
use std::fmt;

/// Widest store `to_dense` will materialize
pub const MAX_DENSE_WIDTH: usize = 30;

const ONE: Complex64 = Complex64::new(1.0, 0.0);

/// Extract `width` bits starting at `offset` from a basis index
#[inline]
pub fn slice_value(index: u64, offset: usize, width: usize) -> u64 {
    if width == 0 {
        0
    } else {
        (index >> offset) & width_mask(width)
    }
}

/// Sparse map from basis index to amplitude
///
/// # Example
///
/// ```
/// use qureg_state::AmplitudeStore;
/// use qureg_gates::matrices;
///
/// let mut store = AmplitudeStore::from_basis_state(2, 0, 4).unwrap();
/// store.apply_matrix(&matrices::HADAMARD, 0, &[]).unwrap();
/// store.flip(1, &[0]).unwrap();
///
/// // Bell state (|00⟩ + |11⟩)/√2
/// assert_eq!(store.len(), 2);
/// assert!((store.amplitude(3).norm_sqr() - 0.5).abs() < 1e-12);
/// ```
#[derive(Clone, PartialEq)]
pub struct AmplitudeStore {
    /// Number of qubits addressed by indices
    width: usize,

    /// Map from basis state index to amplitude
    amplitudes: AHashMap<u64, Complex64>,
}

impl AmplitudeStore {
    /// Create a store in |0...0⟩
    pub fn new(width: usize) -> Result<Self> {
        Self::from_basis_state(width, 0, 1)
    }

    /// Create a store holding a single classical basis state
    ///
    /// # Arguments
    /// * `width` - Number of qubits (at most 64)
    /// * `value` - Basis state index
    /// * `capacity` - Initial map capacity hint
    ///
    /// # Errors
    /// Returns error if `width` is too large or `value` does not fit
    pub fn from_basis_state(width: usize, value: u64, capacity: usize) -> Result<Self> {
        check_width(width)?;
        if value & !width_mask(width) != 0 {
            return Err(StateError::IndexOutOfRange { index: value, width });
        }

        let mut amplitudes = AHashMap::with_capacity(capacity.max(1));
        amplitudes.insert(value, ONE);

        Ok(Self { width, amplitudes })
    }

    /// Create a store from explicit amplitudes
    ///
    /// Negligible entries are dropped and the result is normalized when
    /// `Σ |a|²` is off from 1 by more than `ε / 2^width`. Repeated indices
    /// accumulate.
    ///
    /// # Errors
    /// Returns error if an index does not fit in `width` bits, an amplitude
    /// is NaN or infinite, or nothing with non-negligible weight remains.
    pub fn from_amplitudes<I>(width: usize, states: I) -> Result<Self>
    where
        I: IntoIterator<Item = (u64, Complex64)>,
    {
        check_width(width)?;
        let mask = width_mask(width);

        let mut amplitudes: AHashMap<u64, Complex64> = AHashMap::new();
        for (index, amplitude) in states {
            if index & !mask != 0 {
                return Err(StateError::IndexOutOfRange { index, width });
            }
            *amplitudes.entry(index).or_insert(Complex64::new(0.0, 0.0)) += amplitude;
        }
        if !check_finite(amplitudes.values()) {
            return Err(StateError::NonFinite);
        }

        let threshold = epsilon_for_width(width);
        amplitudes.retain(|_, amp| amp.norm_sqr() >= threshold);

        let mut store = Self { width, amplitudes };
        if store.amplitudes.is_empty() {
            return Err(StateError::ZeroNorm);
        }
        if store.normalization_error() > threshold {
            store.normalize()?;
        }
        Ok(store)
    }

    /// Number of qubits
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Squared-magnitude threshold below which amplitudes are dropped
    #[inline]
    pub fn threshold(&self) -> f64 {
        epsilon_for_width(self.width)
    }

    /// Number of stored (non-zero) amplitudes
    #[inline]
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    /// True if no amplitude is stored
    ///
    /// Only possible transiently; a valid store always has weight.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// Amplitude of a basis state (zero if not stored)
    pub fn amplitude(&self, index: u64) -> Complex64 {
        self.amplitudes
            .get(&index)
            .copied()
            .unwrap_or_else(|| Complex64::new(0.0, 0.0))
    }

    /// Iterate over stored entries in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (u64, Complex64)> + '_ {
        self.amplitudes.iter().map(|(&k, &v)| (k, v))
    }

    /// Stored entries sorted by basis index
    pub fn sorted_entries(&self) -> Vec<(u64, Complex64)> {
        let mut entries: Vec<(u64, Complex64)> = self.iter().collect();
        entries.sort_unstable_by_key(|&(k, _)| k);
        entries
    }

    /// `Σ |amplitude|²`
    pub fn norm_sqr(&self) -> f64 {
        self.amplitudes.values().map(|amp| amp.norm_sqr()).sum()
    }

    /// `|Σ |amplitude|² − 1|`
    pub fn normalization_error(&self) -> f64 {
        (self.norm_sqr() - 1.0).abs()
    }

    /// Check if the state is normalized within `tolerance`
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        self.normalization_error() <= tolerance
    }

    /// Rescale to unit norm
    ///
    /// # Errors
    /// Returns error if the state has no weight
    pub fn normalize(&mut self) -> Result<()> {
        let norm = self.norm_sqr().sqrt();
        if norm == 0.0 || !norm.is_finite() {
            return Err(StateError::ZeroNorm);
        }

        let scale = norm.recip();
        for amp in self.amplitudes.values_mut() {
            *amp *= scale;
        }
        Ok(())
    }

    /// Dense amplitude vector of length 2^width
    ///
    /// # Errors
    /// Returns error if the store is wider than [`MAX_DENSE_WIDTH`]
    pub fn to_dense(&self) -> Result<Vec<Complex64>> {
        if self.width > MAX_DENSE_WIDTH {
            return Err(StateError::TooWideForDense {
                width: self.width,
                max: MAX_DENSE_WIDTH,
            });
        }

        let mut dense = vec![Complex64::new(0.0, 0.0); 1usize << self.width];
        for (&idx, &amp) in &self.amplitudes {
            dense[idx as usize] = amp;
        }
        Ok(dense)
    }

    // ========================================================================
    // Gate kernels
    // ========================================================================

    /// Apply a 2×2 unitary to `target`, conditioned on every bit in `controls`
    ///
    /// Each stored state whose controls are all set is paired with its
    /// partner differing only in the target bit; the pair is visited once
    /// and both amplitudes are replaced by the matrix product. States whose
    /// controls are not all set are left untouched.
    pub fn apply_matrix(&mut self, matrix: &Matrix2, target: usize, controls: &[usize]) -> Result<()> {
        let control_mask = self.check_gate_bits(target, controls)?;
        let target_mask = 1u64 << target;
        let threshold = self.threshold();

        let keys: Vec<u64> = self.amplitudes.keys().copied().collect();
        let mut processed: AHashSet<u64> = AHashSet::with_capacity(keys.len());

        for state in keys {
            if state & control_mask != control_mask {
                continue;
            }

            let zero = state & !target_mask;
            if !processed.insert(zero) {
                continue;
            }
            let one = zero | target_mask;

            let a0 = self.amplitude(zero);
            let a1 = self.amplitude(one);
            let new0 = matrix[0][0] * a0 + matrix[0][1] * a1;
            let new1 = matrix[1][0] * a0 + matrix[1][1] * a1;

            write_or_drop(&mut self.amplitudes, zero, new0, threshold);
            write_or_drop(&mut self.amplitudes, one, new1, threshold);
        }

        Ok(())
    }

    /// Flip `target` on every state whose controls are all set
    ///
    /// The CNot / Toffoli fast path: a permutation of indices, no arithmetic
    /// on amplitudes.
    pub fn flip(&mut self, target: usize, controls: &[usize]) -> Result<()> {
        let control_mask = self.check_gate_bits(target, controls)?;
        let target_mask = 1u64 << target;

        let previous = std::mem::take(&mut self.amplitudes);
        let mut flipped = AHashMap::with_capacity(previous.len());
        flipped.extend(previous.into_iter().map(|(state, amp)| {
            if state & control_mask == control_mask {
                (state ^ target_mask, amp)
            } else {
                (state, amp)
            }
        }));
        self.amplitudes = flipped;

        Ok(())
    }

    /// Multiply by e^(iθ) every state with `target` and all `controls` set
    pub fn apply_phase(&mut self, theta: f64, target: usize, controls: &[usize]) -> Result<()> {
        let control_mask = self.check_gate_bits(target, controls)?;
        let mask = control_mask | (1u64 << target);
        let phase = Complex64::from_polar(1.0, theta);

        for (&state, amp) in self.amplitudes.iter_mut() {
            if state & mask == mask {
                *amp *= phase;
            }
        }

        Ok(())
    }

    fn check_gate_bits(&self, target: usize, controls: &[usize]) -> Result<u64> {
        self.check_bit(target)?;
        let mut control_mask = 0u64;
        for &control in controls {
            self.check_bit(control)?;
            if control == target {
                return Err(StateError::ControlEqualsTarget { bit: control });
            }
            control_mask |= 1u64 << control;
        }
        Ok(control_mask)
    }

    fn check_bit(&self, bit: usize) -> Result<()> {
        if bit >= self.width {
            return Err(StateError::InvalidBit {
                bit,
                width: self.width,
            });
        }
        Ok(())
    }

    fn check_slice(&self, offset: usize, width: usize) -> Result<()> {
        if offset + width > self.width {
            return Err(StateError::InvalidBit {
                bit: offset + width,
                width: self.width,
            });
        }
        Ok(())
    }

    // ========================================================================
    // Marginals and collapse
    // ========================================================================

    /// Marginal distribution of the value held in bits `[offset, offset+width)`
    pub fn slice_probabilities(&self, offset: usize, width: usize) -> Result<BTreeMap<u64, f64>> {
        self.check_slice(offset, width)?;

        let mut probabilities = BTreeMap::new();
        for (&state, amp) in &self.amplitudes {
            *probabilities
                .entry(slice_value(state, offset, width))
                .or_insert(0.0) += amp.norm_sqr();
        }
        Ok(probabilities)
    }

    /// Probability that `bit` reads 1
    pub fn bit_probability(&self, bit: usize) -> Result<f64> {
        self.check_bit(bit)?;
        let mask = 1u64 << bit;
        Ok(self
            .amplitudes
            .iter()
            .filter(|(&state, _)| state & mask != 0)
            .map(|(_, amp)| amp.norm_sqr())
            .sum())
    }

    /// Total weight of the states with `bit` clear and with `bit` set
    pub fn bit_weights(&self, bit: usize) -> Result<(f64, f64)> {
        self.check_bit(bit)?;
        let mask = 1u64 << bit;
        Ok(self
            .amplitudes
            .iter()
            .fold((0.0, 0.0), |(zero, one), (&state, amp)| {
                if state & mask != 0 {
                    (zero, one + amp.norm_sqr())
                } else {
                    (zero + amp.norm_sqr(), one)
                }
            }))
    }

    /// The single value held in a bit range, if the range is classical
    pub fn classical_slice_value(&self, offset: usize, width: usize) -> Result<Option<u64>> {
        self.check_slice(offset, width)?;

        let mut values = self
            .amplitudes
            .keys()
            .map(|&state| slice_value(state, offset, width));
        let first = match values.next() {
            Some(value) => value,
            None => return Ok(None),
        };
        if values.all(|value| value == first) {
            Ok(Some(first))
        } else {
            Ok(None)
        }
    }

    /// Project onto states whose bit range equals `value` and renormalize
    ///
    /// When the range spans the whole store the result is the single entry
    /// `|value⟩` with amplitude 1.
    ///
    /// # Returns
    /// The probability of the outcome before projection
    ///
    /// # Errors
    /// Returns error if the outcome has zero probability
    pub fn collapse_slice(&mut self, offset: usize, width: usize, value: u64) -> Result<f64> {
        self.check_slice(offset, width)?;

        let probability: f64 = self
            .amplitudes
            .iter()
            .filter(|(&state, _)| slice_value(state, offset, width) == value)
            .map(|(_, amp)| amp.norm_sqr())
            .sum();
        if probability <= 0.0 {
            return Err(StateError::ImpossibleOutcome { outcome: value });
        }

        if offset == 0 && width == self.width {
            self.amplitudes.clear();
            self.amplitudes.insert(value, ONE);
            return Ok(probability);
        }

        let scale = probability.sqrt().recip();
        let threshold = self.threshold();
        self.amplitudes.retain(|&state, amp| {
            if slice_value(state, offset, width) != value {
                return false;
            }
            *amp *= scale;
            amp.norm_sqr() >= threshold
        });

        Ok(probability)
    }

    /// Project a single bit onto `value` (0 or 1) and renormalize
    pub fn collapse_bit(&mut self, bit: usize, value: u8) -> Result<f64> {
        self.collapse_slice(bit, 1, u64::from(value & 1))
    }

    /// Overwrite a classical bit range with `value`
    ///
    /// # Errors
    /// Returns error if the range is in superposition (collapse it first)
    /// or `value` does not fit in `width` bits
    pub fn set_slice(&mut self, offset: usize, width: usize, value: u64) -> Result<()> {
        if value & !width_mask(width) != 0 {
            return Err(StateError::IndexOutOfRange { index: value, width });
        }
        let current = self
            .classical_slice_value(offset, width)?
            .ok_or(StateError::NotClassical { offset, width })?;
        if current == value {
            return Ok(());
        }

        let correction = (current ^ value) << offset;
        let previous = std::mem::take(&mut self.amplitudes);
        let mut corrected = AHashMap::with_capacity(previous.len());
        corrected.extend(
            previous
                .into_iter()
                .map(|(state, amp)| (state ^ correction, amp)),
        );
        self.amplitudes = corrected;
        Ok(())
    }

    // ========================================================================
    // Composition
    // ========================================================================

    /// Absorb `incoming` as the new high bits of this store (tensor product)
    ///
    /// Joint index is `(incoming_index << self.width) | self_index` and the
    /// joint amplitude is the product of the two.
    pub fn tensor_with(&mut self, incoming: AmplitudeStore) -> Result<()> {
        let shift = self.width;
        let joint_width = self.width + incoming.width;
        check_width(joint_width)?;

        // Empty receiver: the incoming store becomes the joint store, scaled
        // by the receiver's lone amplitude.
        if shift == 0 {
            let factor = self.amplitude(0);
            let mut amplitudes = incoming.amplitudes;
            if factor != ONE {
                for amp in amplitudes.values_mut() {
                    *amp *= factor;
                }
            }
            self.amplitudes = amplitudes;
            self.width = joint_width;
            return Ok(());
        }

        // Incoming |0...0⟩: indices are unchanged.
        if incoming.amplitudes.len() == 1 {
            if let Some(&factor) = incoming.amplitudes.get(&0) {
                if factor != ONE {
                    for amp in self.amplitudes.values_mut() {
                        *amp *= factor;
                    }
                }
                self.width = joint_width;
                return Ok(());
            }
        }

        let threshold = epsilon_for_width(joint_width);
        let mut joint = AHashMap::with_capacity(self.amplitudes.len() * incoming.amplitudes.len());
        for (&high, &high_amp) in &incoming.amplitudes {
            for (&low, &low_amp) in &self.amplitudes {
                let amp = high_amp * low_amp;
                if amp.norm_sqr() >= threshold {
                    joint.insert((high << shift) | low, amp);
                }
            }
        }

        self.amplitudes = joint;
        self.width = joint_width;
        Ok(())
    }

    /// Remove a classical bit range, compacting higher bits down
    ///
    /// # Errors
    /// Returns error if the range is still in superposition; measure it
    /// first so no residual entanglement is discarded.
    pub fn remove_slice(&mut self, offset: usize, width: usize) -> Result<()> {
        if self.classical_slice_value(offset, width)?.is_none() {
            return Err(StateError::NotClassical { offset, width });
        }

        let end = offset + width;
        let low_mask = width_mask(offset);
        let previous = std::mem::take(&mut self.amplitudes);
        let mut compacted = AHashMap::with_capacity(previous.len());
        compacted.extend(previous.into_iter().map(|(state, amp)| {
            let high = if end >= 64 { 0 } else { state >> end };
            ((state & low_mask) | (high << offset), amp)
        }));

        self.amplitudes = compacted;
        self.width -= width;
        Ok(())
    }

    /// Amplitudes of a bit range, if it factors out of the rest of the store
    ///
    /// Returns `None` when the range is entangled with the remaining bits.
    /// For a proper sub-range the global phase is fixed so that the
    /// lowest-index amplitude is real and positive.
    pub fn factor_slice(&self, offset: usize, width: usize) -> Result<Option<BTreeMap<u64, Complex64>>> {
        self.check_slice(offset, width)?;

        if offset == 0 && width == self.width {
            return Ok(Some(self.iter().collect()));
        }

        let slice_mask = width_mask(width) << offset;
        let mut groups: BTreeMap<u64, BTreeMap<u64, Complex64>> = BTreeMap::new();
        for (&state, &amp) in &self.amplitudes {
            groups
                .entry(state & !slice_mask)
                .or_default()
                .insert(slice_value(state, offset, width), amp);
        }

        let weight = |vector: &BTreeMap<u64, Complex64>| -> f64 {
            vector.values().map(|a| a.norm_sqr()).sum()
        };

        // Reference vector: the heaviest group, first by index on ties
        let mut reference: Option<(&BTreeMap<u64, Complex64>, f64)> = None;
        for vector in groups.values() {
            let w = weight(vector);
            if reference.map_or(true, |(_, best)| w > best) {
                reference = Some((vector, w));
            }
        }
        let (reference, reference_weight) = match reference {
            Some(found) => found,
            None => return Ok(None),
        };
        let scale = reference_weight.sqrt().recip();
        let unit: BTreeMap<u64, Complex64> =
            reference.iter().map(|(&k, &a)| (k, a * scale)).collect();

        for vector in groups.values() {
            let overlap: Complex64 = unit
                .iter()
                .map(|(k, u)| u.conj() * vector.get(k).copied().unwrap_or_default())
                .sum();

            let mut residual: f64 = vector
                .iter()
                .map(|(k, &a)| (a - overlap * unit.get(k).copied().unwrap_or_default()).norm_sqr())
                .sum();
            residual += unit
                .iter()
                .filter(|(k, _)| !vector.contains_key(k))
                .map(|(_, &u)| (overlap * u).norm_sqr())
                .sum::<f64>();

            if residual > qureg_core::EPSILON * weight(vector).max(self.threshold()) {
                return Ok(None);
            }
        }

        let phase = unit
            .values()
            .next()
            .map(|first| first.conj() / first.norm())
            .unwrap_or(ONE);
        let slice_threshold = epsilon_for_width(width);
        Ok(Some(
            unit.into_iter()
                .map(|(k, a)| (k, a * phase))
                .filter(|(_, a)| a.norm_sqr() >= slice_threshold)
                .collect(),
        ))
    }
}

fn check_width(width: usize) -> Result<()> {
    if width > MAX_QUBITS {
        return Err(StateError::InvalidWidth {
            width,
            max: MAX_QUBITS,
        });
    }
    Ok(())
}

#[inline]
fn write_or_drop(map: &mut AHashMap<u64, Complex64>, index: u64, amp: Complex64, threshold: f64) {
    if amp.norm_sqr() < threshold {
        map.remove(&index);
    } else {
        map.insert(index, amp);
    }
}

impl fmt::Debug for AmplitudeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AmplitudeStore")
            .field("width", &self.width)
            .field("num_amplitudes", &self.amplitudes.len())
            .finish()
    }
}

impl fmt::Display for AmplitudeStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AmplitudeStore({} qubits, {} non-zero amplitudes)",
            self.width,
            self.amplitudes.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use qureg_gates::matrices;
    use std::f64::consts::FRAC_1_SQRT_2;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn bell() -> AmplitudeStore {
        let mut store = AmplitudeStore::new(2).unwrap();
        store.apply_matrix(&matrices::HADAMARD, 0, &[]).unwrap();
        store.flip(1, &[0]).unwrap();
        store
    }

    #[test]
    fn test_new_store() {
        let store = AmplitudeStore::new(3).unwrap();
        assert_eq!(store.width(), 3);
        assert_eq!(store.len(), 1);
        assert_eq!(store.amplitude(0), ONE);
    }

    #[test]
    fn test_from_basis_state_range() {
        let store = AmplitudeStore::from_basis_state(4, 5, 8).unwrap();
        assert_eq!(store.amplitude(5), ONE);
        assert!(AmplitudeStore::from_basis_state(2, 4, 1).is_err());
        assert!(AmplitudeStore::from_basis_state(65, 0, 1).is_err());
        assert!(AmplitudeStore::from_basis_state(64, u64::MAX, 1).is_ok());
    }

    #[test]
    fn test_from_amplitudes_normalizes() {
        let store = AmplitudeStore::from_amplitudes(2, vec![(0, c(3.0, 0.0)), (3, c(0.0, 4.0))]).unwrap();
        assert!(store.is_normalized(1e-12));
        assert_relative_eq!(store.amplitude(0).re, 0.6, epsilon = 1e-12);
        assert_relative_eq!(store.amplitude(3).im, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn test_from_amplitudes_rejects_bad_input() {
        assert_eq!(
            AmplitudeStore::from_amplitudes(2, vec![(0, c(0.0, 0.0))]),
            Err(StateError::ZeroNorm)
        );
        assert!(AmplitudeStore::from_amplitudes(2, vec![(4, ONE)]).is_err());
    }

    #[test]
    fn test_from_amplitudes_rejects_non_finite() {
        assert_eq!(
            AmplitudeStore::from_amplitudes(2, vec![(0, ONE), (1, c(f64::NAN, 0.0))]),
            Err(StateError::NonFinite)
        );
        assert_eq!(
            AmplitudeStore::from_amplitudes(1, vec![(1, c(0.0, f64::INFINITY))]),
            Err(StateError::NonFinite)
        );
    }

    #[test]
    fn test_hadamard_creates_and_cancels_superposition() {
        let mut store = AmplitudeStore::new(1).unwrap();
        store.apply_matrix(&matrices::HADAMARD, 0, &[]).unwrap();
        assert_eq!(store.len(), 2);
        assert_relative_eq!(store.amplitude(1).re, FRAC_1_SQRT_2, epsilon = 1e-12);

        store.apply_matrix(&matrices::HADAMARD, 0, &[]).unwrap();
        assert_eq!(store.len(), 1);
        assert_relative_eq!(store.amplitude(0).re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_controlled_matrix_skips_unset_control() {
        let mut store = AmplitudeStore::from_basis_state(2, 0b00, 1).unwrap();
        store.apply_matrix(&matrices::SIGMA_X, 1, &[0]).unwrap();
        assert_eq!(store.amplitude(0), ONE);

        let mut store = AmplitudeStore::from_basis_state(2, 0b01, 1).unwrap();
        store.apply_matrix(&matrices::SIGMA_X, 1, &[0]).unwrap();
        assert_eq!(store.amplitude(0b11), ONE);
    }

    #[test]
    fn test_bell_state() {
        let store = bell();
        assert_eq!(store.len(), 2);
        assert_relative_eq!(store.amplitude(0).re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(store.amplitude(3).re, FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_gate_bit_validation() {
        let mut store = AmplitudeStore::new(2).unwrap();
        assert_eq!(
            store.flip(1, &[1]),
            Err(StateError::ControlEqualsTarget { bit: 1 })
        );
        assert!(store.apply_matrix(&matrices::HADAMARD, 2, &[]).is_err());
        assert!(store.apply_phase(0.1, 0, &[5]).is_err());
    }

    #[test]
    fn test_toffoli_flip() {
        let mut store = AmplitudeStore::from_basis_state(3, 0b011, 1).unwrap();
        store.flip(2, &[0, 1]).unwrap();
        assert_eq!(store.amplitude(0b111), ONE);

        let mut store = AmplitudeStore::from_basis_state(3, 0b001, 1).unwrap();
        store.flip(2, &[0, 1]).unwrap();
        assert_eq!(store.amplitude(0b001), ONE);
    }

    #[test]
    fn test_phase_only_on_set_bits() {
        let mut store = bell();
        store.apply_phase(std::f64::consts::PI, 1, &[0]).unwrap();
        assert_relative_eq!(store.amplitude(0).re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(store.amplitude(3).re, -FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_slice_probabilities_and_bit_probability() {
        let store = bell();
        let probs = store.slice_probabilities(0, 2).unwrap();
        assert_eq!(probs.len(), 2);
        assert_relative_eq!(probs[&0], 0.5, epsilon = 1e-12);
        assert_relative_eq!(probs[&3], 0.5, epsilon = 1e-12);

        let high = store.slice_probabilities(1, 1).unwrap();
        assert_relative_eq!(high[&1], 0.5, epsilon = 1e-12);
        assert_relative_eq!(store.bit_probability(0).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_collapse_bit_on_entangled_state() {
        let mut store = bell();
        let p = store.collapse_bit(0, 1).unwrap();
        assert_relative_eq!(p, 0.5, epsilon = 1e-12);
        assert_eq!(store.len(), 1);
        assert_relative_eq!(store.amplitude(3).re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_collapse_whole_store() {
        let mut store = bell();
        store.apply_phase(0.3, 0, &[]).unwrap();
        store.collapse_slice(0, 2, 3).unwrap();
        assert_eq!(store.amplitude(3), ONE);
        assert!(store.collapse_slice(0, 2, 1).is_err());
    }

    #[test]
    fn test_set_slice_requires_classical() {
        let mut store = bell();
        assert!(matches!(
            store.set_slice(0, 1, 0),
            Err(StateError::NotClassical { .. })
        ));

        let mut store = AmplitudeStore::from_basis_state(4, 0b0110, 1).unwrap();
        store.set_slice(1, 2, 0b01).unwrap();
        assert_eq!(store.amplitude(0b0010), ONE);
    }

    #[test]
    fn test_tensor_product_layout() {
        let mut low = AmplitudeStore::from_basis_state(2, 0b01, 1).unwrap();
        let mut high = AmplitudeStore::new(1).unwrap();
        high.apply_matrix(&matrices::HADAMARD, 0, &[]).unwrap();

        low.tensor_with(high).unwrap();
        assert_eq!(low.width(), 3);
        assert_eq!(low.len(), 2);
        assert_relative_eq!(low.amplitude(0b001).re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(low.amplitude(0b101).re, FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_tensor_fast_paths() {
        let mut empty = AmplitudeStore::new(0).unwrap();
        empty.tensor_with(bell()).unwrap();
        assert_eq!(empty, bell());

        let mut store = bell();
        store.tensor_with(AmplitudeStore::new(3).unwrap()).unwrap();
        assert_eq!(store.width(), 5);
        assert_relative_eq!(store.amplitude(3).re, FRAC_1_SQRT_2, epsilon = 1e-12);
    }

    #[test]
    fn test_tensor_width_limit() {
        let mut a = AmplitudeStore::new(40).unwrap();
        let b = AmplitudeStore::new(30).unwrap();
        assert!(a.tensor_with(b).is_err());
    }

    #[test]
    fn test_remove_slice_compacts() {
        let mut store = AmplitudeStore::from_basis_state(5, 0b10110, 1).unwrap();
        store.remove_slice(1, 2).unwrap();
        assert_eq!(store.width(), 3);
        assert_eq!(store.amplitude(0b100), ONE);

        let mut store = bell();
        assert!(store.remove_slice(0, 1).is_err());
    }

    #[test]
    fn test_factor_slice_product_state() {
        // |+⟩ on bit 0, |1⟩ on bit 1
        let mut store = AmplitudeStore::from_basis_state(2, 0b10, 1).unwrap();
        store.apply_matrix(&matrices::HADAMARD, 0, &[]).unwrap();

        let low = store.factor_slice(0, 1).unwrap().unwrap();
        assert_relative_eq!(low[&0].re, FRAC_1_SQRT_2, epsilon = 1e-12);
        assert_relative_eq!(low[&1].re, FRAC_1_SQRT_2, epsilon = 1e-12);

        let high = store.factor_slice(1, 1).unwrap().unwrap();
        assert_eq!(high.len(), 1);
        assert_relative_eq!(high[&1].re, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_factor_slice_entangled() {
        assert_eq!(bell().factor_slice(0, 1).unwrap(), None);
        assert!(bell().factor_slice(0, 2).unwrap().is_some());
    }

    #[test]
    fn test_to_dense() {
        let dense = bell().to_dense().unwrap();
        assert_eq!(dense.len(), 4);
        assert_eq!(dense[1], Complex64::new(0.0, 0.0));
        assert!(AmplitudeStore::new(31).unwrap().to_dense().is_err());
    }
}
