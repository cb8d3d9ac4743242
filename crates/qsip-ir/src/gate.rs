//! Gate vocabulary.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::parameter::ParameterExpression;
use crate::qubit::QubitId;

/// The gates the translator knows how to draw, plus a fallback for
/// everything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateKind {
    /// Identity gate.
    I,
    /// Pauli-X gate.
    X,
    /// Pauli-Y gate.
    Y,
    /// Pauli-Z gate.
    Z,
    /// Hadamard gate.
    H,
    /// S gate (sqrt(Z)).
    S,
    /// S-dagger gate.
    Sdg,
    /// T gate (fourth root of Z).
    T,
    /// T-dagger gate.
    Tdg,
    /// sqrt(X) gate.
    SX,
    /// sqrt(X)-dagger gate.
    SXdg,
    /// Rotation around X axis.
    Rx,
    /// Rotation around Y axis.
    Ry,
    /// Rotation around Z axis.
    Rz,
    /// Phase gate.
    P,
    /// Universal single-qubit gate U(θ, φ, λ).
    U,
    /// Controlled-X (CNOT) gate.
    CX,
    /// Controlled-Y gate.
    CY,
    /// Controlled-Z gate.
    CZ,
    /// SWAP gate.
    Swap,
    /// Toffoli gate (CCX).
    CCX,
    /// Any gate outside the fixed vocabulary. Drawn as a labelled box.
    Custom(String),
}

impl GateKind {
    /// Resolve a gate identifier as written in source.
    ///
    /// Lookup is case-insensitive for the fixed vocabulary; unknown names
    /// are kept verbatim.
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "id" | "i" => GateKind::I,
            "x" => GateKind::X,
            "y" => GateKind::Y,
            "z" => GateKind::Z,
            "h" => GateKind::H,
            "s" => GateKind::S,
            "sdg" => GateKind::Sdg,
            "t" => GateKind::T,
            "tdg" => GateKind::Tdg,
            "sx" => GateKind::SX,
            "sxdg" => GateKind::SXdg,
            "rx" => GateKind::Rx,
            "ry" => GateKind::Ry,
            "rz" => GateKind::Rz,
            "p" | "phase" => GateKind::P,
            "u" | "u3" => GateKind::U,
            "cx" | "cnot" => GateKind::CX,
            "cy" => GateKind::CY,
            "cz" => GateKind::CZ,
            "swap" => GateKind::Swap,
            "ccx" | "toffoli" => GateKind::CCX,
            _ => GateKind::Custom(name.to_string()),
        }
    }

    /// Canonical name of this gate.
    #[inline]
    pub fn name(&self) -> &str {
        match self {
            GateKind::I => "id",
            GateKind::X => "x",
            GateKind::Y => "y",
            GateKind::Z => "z",
            GateKind::H => "h",
            GateKind::S => "s",
            GateKind::Sdg => "sdg",
            GateKind::T => "t",
            GateKind::Tdg => "tdg",
            GateKind::SX => "sx",
            GateKind::SXdg => "sxdg",
            GateKind::Rx => "rx",
            GateKind::Ry => "ry",
            GateKind::Rz => "rz",
            GateKind::P => "p",
            GateKind::U => "u",
            GateKind::CX => "cx",
            GateKind::CY => "cy",
            GateKind::CZ => "cz",
            GateKind::Swap => "swap",
            GateKind::CCX => "ccx",
            GateKind::Custom(name) => name,
        }
    }

    /// Number of qubit operands, or `None` for custom gates.
    pub fn num_qubits(&self) -> Option<usize> {
        match self {
            GateKind::Custom(_) => None,
            GateKind::CX | GateKind::CY | GateKind::CZ | GateKind::Swap => Some(2),
            GateKind::CCX => Some(3),
            _ => Some(1),
        }
    }

    /// Number of parameters, or `None` for custom gates.
    pub fn num_params(&self) -> Option<usize> {
        match self {
            GateKind::Custom(_) => None,
            GateKind::Rx | GateKind::Ry | GateKind::Rz | GateKind::P => Some(1),
            GateKind::U => Some(3),
            _ => Some(0),
        }
    }

    /// Number of leading operands that act as controls.
    pub fn num_controls(&self) -> usize {
        match self {
            GateKind::CX | GateKind::CY | GateKind::CZ => 1,
            GateKind::CCX => 2,
            _ => 0,
        }
    }

    /// Whether this is a custom (unknown) gate.
    pub fn is_custom(&self) -> bool {
        matches!(self, GateKind::Custom(_))
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A gate application: the gate, its parameters and its operands split into
/// control and target roles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gate {
    /// The kind of gate.
    pub kind: GateKind,
    /// Parameters in call order.
    pub params: Vec<ParameterExpression>,
    /// Target qubits.
    pub targets: Vec<QubitId>,
    /// Control qubits, outermost first.
    pub controls: Vec<QubitId>,
}

impl Gate {
    /// Build a gate from operands in call order. The leading
    /// [`GateKind::num_controls`] operands become controls.
    pub fn new(kind: GateKind, params: Vec<ParameterExpression>, qubits: Vec<QubitId>) -> Self {
        let split = kind.num_controls().min(qubits.len());
        let mut controls = qubits;
        let targets = controls.split_off(split);
        Self {
            kind,
            params,
            targets,
            controls,
        }
    }

    /// Operands in call order (controls first).
    pub fn qubits(&self) -> impl Iterator<Item = QubitId> + '_ {
        self.controls.iter().chain(self.targets.iter()).copied()
    }

    /// Number of operands.
    pub fn num_qubits(&self) -> usize {
        self.controls.len() + self.targets.len()
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.params.is_empty() {
            write!(f, "(")?;
            for (i, p) in self.params.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{p}")?;
            }
            write!(f, ")")?;
        }
        for (i, q) in self.qubits().enumerate() {
            if i == 0 {
                write!(f, " {q}")?;
            } else {
                write!(f, ", {q}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_aliases() {
        assert_eq!(GateKind::from_name("cnot"), GateKind::CX);
        assert_eq!(GateKind::from_name("CX"), GateKind::CX);
        assert_eq!(GateKind::from_name("toffoli"), GateKind::CCX);
        assert_eq!(GateKind::from_name("u3"), GateKind::U);
        assert_eq!(
            GateKind::from_name("Oracle_1"),
            GateKind::Custom("Oracle_1".into())
        );
    }

    #[test]
    fn test_arity() {
        assert_eq!(GateKind::H.num_qubits(), Some(1));
        assert_eq!(GateKind::CCX.num_qubits(), Some(3));
        assert_eq!(GateKind::U.num_params(), Some(3));
        assert_eq!(GateKind::Custom("f".into()).num_qubits(), None);
    }

    #[test]
    fn test_operand_roles() {
        let g = Gate::new(
            GateKind::CCX,
            vec![],
            vec![QubitId(0), QubitId(2), QubitId(1)],
        );
        assert_eq!(g.controls, vec![QubitId(0), QubitId(2)]);
        assert_eq!(g.targets, vec![QubitId(1)]);
        assert_eq!(g.qubits().collect::<Vec<_>>().len(), 3);

        let swap = Gate::new(GateKind::Swap, vec![], vec![QubitId(1), QubitId(0)]);
        assert!(swap.controls.is_empty());
        assert_eq!(swap.targets, vec![QubitId(1), QubitId(0)]);
    }

    #[test]
    fn test_display() {
        let g = Gate::new(
            GateKind::Rx,
            vec![ParameterExpression::pi()],
            vec![QubitId(3)],
        );
        assert_eq!(g.to_string(), "rx(pi) q3");
    }
}
