//! Register handles and qubit references

use std::fmt;

/// Handle to a register living in a simulation session
///
/// A register is either a root (owning amplitude storage) or a view into
/// a root's bit space. The handle itself is only an id; every operation
/// goes through the session that issued it. Ids are never reused within
/// a session, so a handle to a deleted register stays invalid.
///
/// # Example
/// ```
/// use qureg_core::Register;
///
/// let r = Register::new(2);
/// assert_eq!(r.id(), 2);
/// assert_eq!(format!("{}", r), "r2");
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Register(u64);

impl Register {
    /// Wrap a raw register id
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying id
    #[inline]
    pub const fn id(&self) -> u64 {
        self.0
    }

    /// Reference the qubit at `offset` within this register
    ///
    /// The offset is checked when the reference is used, not here.
    ///
    /// # Example
    /// ```
    /// use qureg_core::Register;
    ///
    /// let q = Register::new(0).qubit(3);
    /// assert_eq!(q.offset(), 3);
    /// ```
    #[inline]
    pub const fn qubit(self, offset: usize) -> QubitRef {
        QubitRef::new(self, offset)
    }

    /// Reference the least significant qubit of this register
    #[inline]
    pub const fn first_qubit(self) -> QubitRef {
        QubitRef::new(self, 0)
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A single qubit addressed as (register, local offset)
///
/// Its position in the root's bit space is
/// `offset_to_root(register) + offset`, resolved by the session.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct QubitRef {
    register: Register,
    offset: usize,
}

impl QubitRef {
    /// Create a new qubit reference
    #[inline]
    pub const fn new(register: Register, offset: usize) -> Self {
        Self { register, offset }
    }

    /// Register this qubit is addressed through
    #[inline]
    pub const fn register(&self) -> Register {
        self.register
    }

    /// Offset of the qubit within its register
    #[inline]
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

impl fmt::Display for QubitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.register, self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_equality() {
        assert_eq!(Register::new(1), Register::new(1));
        assert_ne!(Register::new(1), Register::new(2));
    }

    #[test]
    fn test_first_qubit() {
        let r = Register::new(5);
        assert_eq!(r.first_qubit(), r.qubit(0));
    }

    #[test]
    fn test_qubit_ref_display() {
        let q = Register::new(5).qubit(2);
        assert_eq!(format!("{}", q), "r5[2]");
    }
}
