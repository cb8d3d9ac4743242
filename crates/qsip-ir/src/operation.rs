//! Circuit operations.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::gate::Gate;
use crate::qubit::{ClbitId, QubitId};

/// One step of a circuit, in program order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// A unitary gate.
    Gate(Gate),
    /// Measurement of one qubit, optionally stored into a classical bit.
    Measure {
        qubit: QubitId,
        target: Option<ClbitId>,
    },
    /// Reset of one qubit to |0⟩.
    Reset { qubit: QubitId },
    /// Synchronization point across the listed qubits.
    Barrier { qubits: Vec<QubitId> },
    /// A gate applied only when `condition` reads 1.
    ConditionalGate { condition: ClbitId, gate: Gate },
}

impl Operation {
    /// Create a measurement into `clbit`.
    pub fn measure(qubit: QubitId, clbit: ClbitId) -> Self {
        Operation::Measure {
            qubit,
            target: Some(clbit),
        }
    }

    /// Qubits this operation touches, in operand order.
    pub fn qubits(&self) -> Vec<QubitId> {
        match self {
            Operation::Gate(gate) | Operation::ConditionalGate { gate, .. } => {
                gate.qubits().collect()
            }
            Operation::Measure { qubit, .. } | Operation::Reset { qubit } => vec![*qubit],
            Operation::Barrier { qubits } => qubits.clone(),
        }
    }

    /// The inclusive range of wires between the lowest and highest touched
    /// qubit, or `None` if the operation touches nothing.
    pub fn wire_span(&self) -> Option<(usize, usize)> {
        let qubits = self.qubits();
        let lo = qubits.iter().map(|q| q.wire()).min()?;
        let hi = qubits.iter().map(|q| q.wire()).max()?;
        Some((lo, hi))
    }

    /// The gate carried by this operation, if any.
    pub fn gate(&self) -> Option<&Gate> {
        match self {
            Operation::Gate(gate) | Operation::ConditionalGate { gate, .. } => Some(gate),
            _ => None,
        }
    }

    /// Short name used in logs and layout dumps.
    pub fn name(&self) -> &str {
        match self {
            Operation::Gate(gate) | Operation::ConditionalGate { gate, .. } => gate.kind.name(),
            Operation::Measure { .. } => "measure",
            Operation::Reset { .. } => "reset",
            Operation::Barrier { .. } => "barrier",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Gate(gate) => write!(f, "{gate}"),
            Operation::Measure {
                qubit,
                target: Some(c),
            } => write!(f, "measure {qubit} -> {c}"),
            Operation::Measure {
                qubit,
                target: None,
            } => write!(f, "measure {qubit}"),
            Operation::Reset { qubit } => write!(f, "reset {qubit}"),
            Operation::Barrier { qubits } => {
                write!(f, "barrier")?;
                for (i, q) in qubits.iter().enumerate() {
                    write!(f, "{}{q}", if i == 0 { " " } else { ", " })?;
                }
                Ok(())
            }
            Operation::ConditionalGate { condition, gate } => write!(f, "if ({condition}) {gate}"),
        }
    }
}

/// Association between a conditional gate and the measurement whose result
/// it reads. Indices refer to the circuit's operation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ControlLink {
    /// Index of the producing [`Operation::Measure`].
    pub measure: usize,
    /// Index of the consuming [`Operation::ConditionalGate`].
    pub gate: usize,
    /// The classical bit carrying the result.
    pub bit: ClbitId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateKind;

    #[test]
    fn test_wire_span() {
        let cx = Operation::Gate(Gate::new(
            GateKind::CX,
            vec![],
            vec![QubitId(3), QubitId(1)],
        ));
        assert_eq!(cx.wire_span(), Some((1, 3)));

        let empty = Operation::Barrier { qubits: vec![] };
        assert_eq!(empty.wire_span(), None);
    }

    #[test]
    fn test_names_and_display() {
        let m = Operation::measure(QubitId(0), ClbitId(2));
        assert_eq!(m.name(), "measure");
        assert_eq!(m.to_string(), "measure q0 -> c2");

        let cond = Operation::ConditionalGate {
            condition: ClbitId(0),
            gate: Gate::new(GateKind::X, vec![], vec![QubitId(1)]),
        };
        assert_eq!(cond.name(), "x");
        assert!(cond.gate().is_some());
        assert_eq!(cond.to_string(), "if (c0) x q1");
    }
}
