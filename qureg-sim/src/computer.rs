//! Simulation session and register arena
//!
//! A [`QuantumComputer`] owns every register it creates. Registers live in
//! an arena keyed by [`Register`] handles: a root record owns an
//! [`AmplitudeStore`] and the list of views into it, a view record holds
//! its width, its offset relative to the ultimate root, and the root's
//! handle. Handles are never reused, so a stale handle always fails with
//! [`QuantumError::UnknownRegister`].

use ahash::AHashMap;
use num_complex::Complex64;
use qureg_core::{width_mask, QuantumError, QubitRef, Register, Result, SimulationConfig};
use qureg_state::{validate_normalization, AmplitudeStore};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

/// What a register record owns
#[derive(Debug, Clone)]
pub(crate) enum RecordKind {
    /// Owns the amplitudes for all qubits in its bit space
    Root {
        store: AmplitudeStore,
        children: Vec<Register>,
    },
    /// Window into a root's bit space
    View { root: Register },
}

#[derive(Debug, Clone)]
pub(crate) struct RegisterRecord {
    pub(crate) width: usize,
    pub(crate) offset_to_root: usize,
    pub(crate) kind: RecordKind,
}

impl RegisterRecord {
    pub(crate) fn root(store: AmplitudeStore, children: Vec<Register>) -> Self {
        Self {
            width: store.width(),
            offset_to_root: 0,
            kind: RecordKind::Root { store, children },
        }
    }
}

/// A simulation session
///
/// Replaces a process-wide engine singleton: each session owns its random
/// source and its registers, so independent sessions can run side by side.
///
/// # Example
///
/// ```
/// use qureg_sim::QuantumComputer;
/// use qureg_core::SimulationConfig;
///
/// let mut qc = QuantumComputer::with_config(SimulationConfig::deterministic(1)).unwrap();
/// let r = qc.new_register(5, 4).unwrap();
/// assert_eq!(qc.get_value(r).unwrap(), Some(5));
/// ```
#[derive(Debug)]
pub struct QuantumComputer {
    config: SimulationConfig,
    rng: StdRng,
    pub(crate) registers: AHashMap<Register, RegisterRecord>,
    next_id: u64,
}

impl Default for QuantumComputer {
    fn default() -> Self {
        Self::new()
    }
}

impl QuantumComputer {
    /// Create a session with the default configuration
    pub fn new() -> Self {
        Self::build(SimulationConfig::default())
    }

    /// Create a session with a validated configuration
    pub fn with_config(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            config,
            rng,
            registers: AHashMap::new(),
            next_id: 0,
        }
    }

    /// Get the session configuration
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Number of live registers, roots and views
    pub fn register_count(&self) -> usize {
        self.registers.len()
    }

    /// Check whether a handle names a live register
    pub fn contains(&self, reg: Register) -> bool {
        self.registers.contains_key(&reg)
    }

    // ========================================================================
    // Factory
    // ========================================================================

    /// Create an independent register holding a classical value
    ///
    /// # Errors
    /// Returns error if `width` is zero or above `max_qubits`, or `value`
    /// does not fit in `width` bits
    pub fn new_register(&mut self, value: u64, width: usize) -> Result<Register> {
        let capacity = self.config.default_capacity;
        self.new_register_with_capacity(value, width, capacity)
    }

    /// Create a register, reserving room for `capacity` amplitudes
    pub fn new_register_with_capacity(
        &mut self,
        value: u64,
        width: usize,
        capacity: usize,
    ) -> Result<Register> {
        self.check_new_width(width)?;
        if value & !width_mask(width) != 0 {
            return Err(QuantumError::ValueOutOfRange { value, width });
        }

        let store = AmplitudeStore::from_basis_state(width, value, capacity)?;
        let reg = self.insert_root(store);
        debug!(register = %reg, width, value, "created register");
        Ok(reg)
    }

    /// Create a register from weighted basis states
    ///
    /// Amplitudes are normalized when `Σ|a|²` is off from 1 by more than
    /// `ε / 2^width`.
    ///
    /// # Errors
    /// Returns error on an invalid width, an index that does not fit, a NaN
    /// or infinite amplitude, or a state with no weight
    pub fn new_register_from_amplitudes<I>(&mut self, states: I, width: usize) -> Result<Register>
    where
        I: IntoIterator<Item = (u64, Complex64)>,
    {
        self.check_new_width(width)?;

        let store = AmplitudeStore::from_amplitudes(width, states)?;
        let populated = store.len();
        let reg = self.insert_root(store);
        debug!(register = %reg, width, populated, "created register from amplitudes");
        Ok(reg)
    }

    /// Create a view of `width` qubits starting at `offset` within `reg`
    ///
    /// The view shares the root's amplitudes; gates applied through it act
    /// on the corresponding root bits.
    pub fn slice(&mut self, reg: Register, offset: usize, width: usize) -> Result<Register> {
        let record = self.record(reg)?;
        if width == 0 || offset + width > record.width {
            return Err(QuantumError::InvalidSlice {
                register: reg,
                offset,
                width,
                register_width: record.width,
            });
        }
        let offset_to_root = record.offset_to_root + offset;
        let root = self.root_of(reg)?;

        let view = self.allocate();
        self.registers.insert(
            view,
            RegisterRecord {
                width,
                offset_to_root,
                kind: RecordKind::View { root },
            },
        );
        self.children_mut(root)?.push(view);
        Ok(view)
    }

    fn check_new_width(&self, width: usize) -> Result<()> {
        if width == 0 || width > self.config.max_qubits {
            return Err(QuantumError::InvalidWidth {
                width,
                max: self.config.max_qubits,
            });
        }
        Ok(())
    }

    pub(crate) fn allocate(&mut self) -> Register {
        let reg = Register::new(self.next_id);
        self.next_id += 1;
        reg
    }

    pub(crate) fn insert_root(&mut self, store: AmplitudeStore) -> Register {
        let reg = self.allocate();
        self.registers
            .insert(reg, RegisterRecord::root(store, Vec::new()));
        reg
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Width of a register in qubits
    pub fn width(&self, reg: Register) -> Result<usize> {
        Ok(self.record(reg)?.width)
    }

    /// Bit offset of a register within its root
    pub fn offset_to_root(&self, reg: Register) -> Result<usize> {
        Ok(self.record(reg)?.offset_to_root)
    }

    /// Root register owning this register's amplitudes
    pub fn root_of(&self, reg: Register) -> Result<Register> {
        match self.record(reg)?.kind {
            RecordKind::Root { .. } => Ok(reg),
            RecordKind::View { root } => Ok(root),
        }
    }

    /// True if the register owns its amplitude store
    pub fn is_root(&self, reg: Register) -> Result<bool> {
        Ok(matches!(self.record(reg)?.kind, RecordKind::Root { .. }))
    }

    /// Views currently attached to a root
    pub fn children(&self, root: Register) -> Result<&[Register]> {
        match &self.record(root)?.kind {
            RecordKind::Root { children, .. } => Ok(children.as_slice()),
            RecordKind::View { .. } => Err(not_a_root(root)),
        }
    }

    /// Amplitude store of a root register
    pub fn store(&self, root: Register) -> Result<&AmplitudeStore> {
        match &self.record(root)?.kind {
            RecordKind::Root { store, .. } => Ok(store),
            RecordKind::View { .. } => Err(not_a_root(root)),
        }
    }

    pub(crate) fn record(&self, reg: Register) -> Result<&RegisterRecord> {
        self.registers
            .get(&reg)
            .ok_or(QuantumError::UnknownRegister(reg))
    }

    pub(crate) fn record_mut(&mut self, reg: Register) -> Result<&mut RegisterRecord> {
        self.registers
            .get_mut(&reg)
            .ok_or(QuantumError::UnknownRegister(reg))
    }

    pub(crate) fn store_mut(&mut self, root: Register) -> Result<&mut AmplitudeStore> {
        match &mut self.record_mut(root)?.kind {
            RecordKind::Root { store, .. } => Ok(store),
            RecordKind::View { .. } => Err(not_a_root(root)),
        }
    }

    pub(crate) fn children_mut(&mut self, root: Register) -> Result<&mut Vec<Register>> {
        match &mut self.record_mut(root)?.kind {
            RecordKind::Root { children, .. } => Ok(children),
            RecordKind::View { .. } => Err(not_a_root(root)),
        }
    }

    /// Root, offset within the root, and width of a register's bit range
    pub(crate) fn bit_range(&self, reg: Register) -> Result<(Register, usize, usize)> {
        let record = self.record(reg)?;
        Ok((self.root_of(reg)?, record.offset_to_root, record.width))
    }

    /// Root and root bit addressed by a qubit reference
    pub(crate) fn locate(&self, qubit: QubitRef) -> Result<(Register, usize)> {
        let reg = qubit.register();
        let record = self.record(reg)?;
        if qubit.offset() >= record.width {
            return Err(QuantumError::QubitOutOfRange {
                register: reg,
                offset: qubit.offset(),
                width: record.width,
            });
        }
        Ok((self.root_of(reg)?, record.offset_to_root + qubit.offset()))
    }

    // ========================================================================
    // Session services
    // ========================================================================

    /// Uniform draw in [0, 1) from the session's random source
    pub(crate) fn draw(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Log a warning when a root has drifted off unit norm
    pub(crate) fn check_normalization(&self, root: Register) {
        if !self.config.check_normalization {
            return;
        }
        if let Ok(store) = self.store(root) {
            let result = validate_normalization(store);
            if !result.is_valid() {
                warn!(
                    register = %root,
                    total = result.total_probability,
                    error = result.probability_error,
                    tolerance = result.tolerance,
                    "normalization drift"
                );
            }
        }
    }
}

fn not_a_root(reg: Register) -> QuantumError {
    QuantumError::InvalidState(format!("{} is a view, not a root register", reg))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> QuantumComputer {
        QuantumComputer::with_config(SimulationConfig::deterministic(7)).unwrap()
    }

    #[test]
    fn test_new_register_is_root() {
        let mut qc = session();
        let r = qc.new_register(5, 4).unwrap();
        assert!(qc.is_root(r).unwrap());
        assert_eq!(qc.width(r).unwrap(), 4);
        assert_eq!(qc.offset_to_root(r).unwrap(), 0);
        assert_eq!(qc.root_of(r).unwrap(), r);
        assert_eq!(qc.store(r).unwrap().amplitude(5), Complex64::new(1.0, 0.0));
    }

    #[test]
    fn test_new_register_validation() {
        let mut qc = session();
        assert!(matches!(
            qc.new_register(0, 0),
            Err(QuantumError::InvalidWidth { .. })
        ));
        assert!(matches!(
            qc.new_register(16, 4),
            Err(QuantumError::ValueOutOfRange { value: 16, width: 4 })
        ));

        let mut small = QuantumComputer::with_config(SimulationConfig::new().with_max_qubits(8)).unwrap();
        assert!(small.new_register(0, 9).is_err());
        assert_eq!(small.register_count(), 0);
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        assert!(QuantumComputer::with_config(SimulationConfig::new().with_max_qubits(0)).is_err());
    }

    #[test]
    fn test_new_register_from_amplitudes() {
        let mut qc = session();
        let r = qc
            .new_register_from_amplitudes(vec![(1, Complex64::new(1.0, 0.0)), (2, Complex64::new(1.0, 0.0))], 2)
            .unwrap();
        let store = qc.store(r).unwrap();
        assert!((store.amplitude(1).norm_sqr() - 0.5).abs() < 1e-12);
        assert!(qc.new_register_from_amplitudes(vec![(4, Complex64::new(1.0, 0.0))], 2).is_err());
    }

    #[test]
    fn test_new_register_rejects_nan_amplitude() {
        let mut qc = session();
        let result = qc.new_register_from_amplitudes(
            vec![(0, Complex64::new(1.0, 0.0)), (1, Complex64::new(f64::NAN, 0.0))],
            1,
        );
        assert!(matches!(result, Err(QuantumError::InvalidState(_))));
        assert_eq!(qc.register_count(), 0);
    }

    #[test]
    fn test_slice_creates_view() {
        let mut qc = session();
        let r = qc.new_register(0b1011, 4).unwrap();
        let view = qc.slice(r, 1, 2).unwrap();
        assert!(!qc.is_root(view).unwrap());
        assert_eq!(qc.root_of(view).unwrap(), r);
        assert_eq!(qc.offset_to_root(view).unwrap(), 1);
        assert_eq!(qc.children(r).unwrap(), &[view]);

        // Nested slices are relative to the ultimate root
        let inner = qc.slice(view, 1, 1).unwrap();
        assert_eq!(qc.offset_to_root(inner).unwrap(), 2);
        assert_eq!(qc.root_of(inner).unwrap(), r);

        assert!(matches!(
            qc.slice(r, 3, 2),
            Err(QuantumError::InvalidSlice { .. })
        ));
    }

    #[test]
    fn test_locate_checks_offset() {
        let mut qc = session();
        let r = qc.new_register(0, 2).unwrap();
        assert_eq!(qc.locate(r.qubit(1)).unwrap(), (r, 1));
        assert!(matches!(
            qc.locate(r.qubit(2)),
            Err(QuantumError::QubitOutOfRange { .. })
        ));
        assert!(matches!(
            qc.locate(Register::new(99).qubit(0)),
            Err(QuantumError::UnknownRegister(_))
        ));
    }

    #[test]
    fn test_handles_are_not_reused() {
        let mut qc = session();
        let a = qc.new_register(0, 1).unwrap();
        let b = qc.new_register(0, 1).unwrap();
        assert_ne!(a, b);
        assert!(b.id() > a.id());
    }
}
