//! Qubit, classical bit and register types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Flat index of a qubit wire within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QubitId(pub u32);

impl QubitId {
    /// The wire row this qubit is drawn on.
    #[inline]
    pub fn wire(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

impl From<u32> for QubitId {
    fn from(id: u32) -> Self {
        QubitId(id)
    }
}

/// Flat index of a classical bit within a circuit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClbitId(pub u32);

impl fmt::Display for ClbitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

impl From<u32> for ClbitId {
    fn from(id: u32) -> Self {
        ClbitId(id)
    }
}

/// Whether a register holds qubits or classical bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterKind {
    Quantum,
    Classical,
}

impl fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterKind::Quantum => write!(f, "quantum"),
            RegisterKind::Classical => write!(f, "classical"),
        }
    }
}

/// A named, contiguous block of qubits or classical bits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Register {
    /// Quantum or classical.
    pub kind: RegisterKind,
    /// Declared name.
    pub name: String,
    /// Number of slots (at least one).
    pub size: u32,
    /// Flat index of the first slot.
    pub offset: u32,
}

impl Register {
    /// Create a register description.
    pub fn new(kind: RegisterKind, name: impl Into<String>, size: u32, offset: u32) -> Self {
        Self {
            kind,
            name: name.into(),
            size,
            offset,
        }
    }

    /// Whether the flat index belongs to this register.
    pub fn contains(&self, flat: u32) -> bool {
        flat >= self.offset && flat - self.offset < self.size
    }

    /// Flat index of the slot at `index`, if in range.
    pub fn slot(&self, index: u32) -> Option<u32> {
        (index < self.size).then(|| self.offset + index)
    }

    /// Human-readable name of the slot at `index`.
    ///
    /// Single-slot registers are referred to by their bare name.
    pub fn slot_label(&self, index: u32) -> String {
        if self.size == 1 {
            self.name.clone()
        } else {
            format!("{}[{index}]", self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        assert_eq!(QubitId(3).to_string(), "q3");
        assert_eq!(ClbitId(0).to_string(), "c0");
    }

    #[test]
    fn test_register_slots() {
        let reg = Register::new(RegisterKind::Quantum, "anc", 2, 3);
        assert!(reg.contains(3));
        assert!(reg.contains(4));
        assert!(!reg.contains(5));
        assert!(!reg.contains(2));
        assert_eq!(reg.slot(1), Some(4));
        assert_eq!(reg.slot(2), None);
    }

    #[test]
    fn test_slot_label() {
        let wide = Register::new(RegisterKind::Quantum, "q", 3, 0);
        assert_eq!(wide.slot_label(2), "q[2]");

        let scalar = Register::new(RegisterKind::Classical, "flag", 1, 0);
        assert_eq!(scalar.slot_label(0), "flag");
    }
}
