//! Register composition: merging roots and deleting registers
//!
//! Merging two roots builds a fresh root whose amplitude store is the
//! tensor product of the two, the first root in the low bits. The old
//! roots stay valid as views into the new one, so handles the caller
//! already holds keep addressing the same qubits.

use crate::computer::{QuantumComputer, RecordKind, RegisterRecord};
use qureg_core::{QuantumError, QubitRef, Register, Result};
use qureg_state::AmplitudeStore;
use smallvec::SmallVec;
use tracing::debug;

impl QuantumComputer {
    /// Root register shared by every referenced qubit, merging as needed
    ///
    /// Roots are merged left to right: the first two are combined, then
    /// the result with the next, and so on. Returns `None` for an empty
    /// slice.
    ///
    /// # Errors
    /// Returns error if a reference is invalid or the merged root would
    /// exceed `max_qubits`. Nothing is merged in that case.
    ///
    /// # Example
    /// ```
    /// use qureg_sim::QuantumComputer;
    ///
    /// let mut qc = QuantumComputer::new();
    /// let a = qc.new_register(1, 2).unwrap();
    /// let b = qc.new_register(2, 3).unwrap();
    ///
    /// let root = qc.root_register(&[a.first_qubit(), b.first_qubit()]).unwrap().unwrap();
    /// assert_eq!(qc.width(root).unwrap(), 5);
    /// assert_eq!(qc.offset_to_root(b).unwrap(), 2);
    /// assert_eq!(qc.get_value(b).unwrap(), Some(2));
    /// ```
    pub fn root_register(&mut self, refs: &[QubitRef]) -> Result<Option<Register>> {
        if refs.is_empty() {
            return Ok(None);
        }

        let mut roots: SmallVec<[Register; 4]> = SmallVec::new();
        for &qubit in refs {
            let (root, _) = self.locate(qubit)?;
            if !roots.contains(&root) {
                roots.push(root);
            }
        }

        self.unify_roots(&roots).map(Some)
    }

    /// Merge distinct roots into one, checking the joint width first
    pub(crate) fn unify_roots(&mut self, roots: &[Register]) -> Result<Register> {
        let mut joint_width = 0;
        for &root in roots {
            joint_width += self.width(root)?;
        }
        let max = self.config().max_qubits;
        if joint_width > max {
            return Err(QuantumError::RootTooWide {
                width: joint_width,
                max,
            });
        }

        let (&first, rest) = roots
            .split_first()
            .ok_or_else(|| QuantumError::InvalidState("no registers to merge".to_string()))?;

        let mut merged = self.root_of(first)?;
        for &next in rest {
            let next = self.root_of(next)?;
            if next != merged {
                merged = self.merge_roots(merged, next)?;
            }
        }
        Ok(merged)
    }

    /// Tensor product of two independent roots
    ///
    /// Returns `None` unless both registers are roots and distinct. `r1`
    /// occupies the low bits of the result.
    pub fn tensor_product(&mut self, r1: Register, r2: Register) -> Result<Option<Register>> {
        if r1 == r2 || !self.is_root(r1)? || !self.is_root(r2)? {
            return Ok(None);
        }
        self.unify_roots(&[r1, r2]).map(Some)
    }

    /// Combine two roots into a new root, `low` in the low bits
    fn merge_roots(&mut self, low: Register, high: Register) -> Result<Register> {
        if !self.is_root(low)? || !self.is_root(high)? {
            return Err(QuantumError::InvalidState(format!(
                "cannot merge {} and {}: both must be roots",
                low, high
            )));
        }
        let low_width = self.width(low)?;

        let merged = self.allocate();
        let (low_store, low_children) = self.demote_root(low, merged, 0)?;
        let (high_store, high_children) = self.demote_root(high, merged, low_width)?;

        let mut store = AmplitudeStore::new(0)?;
        store.tensor_with(low_store)?;
        store.tensor_with(high_store)?;

        let mut children = Vec::with_capacity(low_children.len() + high_children.len() + 2);
        children.push(low);
        children.extend(low_children);
        children.push(high);
        children.extend(high_children);

        debug!(
            low = %low,
            high = %high,
            merged = %merged,
            width = store.width(),
            populated = store.len(),
            "merged registers"
        );
        self.registers
            .insert(merged, RegisterRecord::root(store, children));
        Ok(merged)
    }

    /// Turn a root into a view of `new_root` at `shift`, handing back its
    /// store and children
    fn demote_root(
        &mut self,
        reg: Register,
        new_root: Register,
        shift: usize,
    ) -> Result<(AmplitudeStore, Vec<Register>)> {
        let record = self.record_mut(reg)?;
        let kind = std::mem::replace(&mut record.kind, RecordKind::View { root: new_root });
        record.offset_to_root = shift;

        let (store, children) = match kind {
            RecordKind::Root { store, children } => (store, children),
            RecordKind::View { root } => {
                record.kind = RecordKind::View { root };
                return Err(QuantumError::InvalidState(format!(
                    "{} is already a view",
                    reg
                )));
            }
        };

        for child in &children {
            if let Some(record) = self.registers.get_mut(child) {
                record.offset_to_root += shift;
                record.kind = RecordKind::View { root: new_root };
            }
        }
        Ok((store, children))
    }

    /// Delete a register, measuring it first
    ///
    /// Deleting a root deletes every view into it. Deleting a view removes
    /// its qubits from the root: views inside the deleted range go with
    /// it, views above it shift down, and views overlapping it shrink.
    /// A root whose qubits are all deleted is removed along with them.
    ///
    /// The handle is invalid afterwards.
    pub fn delete_register(&mut self, reg: Register) -> Result<()> {
        let (root, offset, width) = self.bit_range(reg)?;
        self.measure(reg)?;

        if root == reg {
            let children = match self.registers.remove(&reg) {
                Some(RegisterRecord {
                    kind: RecordKind::Root { children, .. },
                    ..
                }) => children,
                _ => Vec::new(),
            };
            for child in &children {
                self.registers.remove(child);
            }
            debug!(register = %reg, width, removed_views = children.len(), "deleted root register");
            return Ok(());
        }

        let remaining = {
            let store = self.store_mut(root)?;
            store.remove_slice(offset, width)?;
            store.width()
        };
        self.record_mut(root)?.width = remaining;
        self.registers.remove(&reg);

        let end = offset + width;
        let siblings = std::mem::take(self.children_mut(root)?);
        let mut survivors = Vec::with_capacity(siblings.len());
        for child in siblings {
            let (start, stop) = match self.registers.get(&child) {
                Some(record) => (record.offset_to_root, record.offset_to_root + record.width),
                None => continue,
            };

            if start >= offset && stop <= end {
                self.registers.remove(&child);
                continue;
            }

            if let Some(record) = self.registers.get_mut(&child) {
                if start >= end {
                    record.offset_to_root -= width;
                } else if stop > offset {
                    let overlap = stop.min(end) - start.max(offset);
                    record.width -= overlap;
                    if start > offset {
                        record.offset_to_root = offset;
                    }
                }
            }
            survivors.push(child);
        }
        if remaining == 0 && survivors.is_empty() {
            self.registers.remove(&root);
            debug!(register = %reg, root = %root, "deleted last view, root removed");
            return Ok(());
        }
        *self.children_mut(root)? = survivors;

        debug!(register = %reg, root = %root, width, root_width = remaining, "deleted view");
        self.check_normalization(root);
        Ok(())
    }
}
