//! The circuit model handed to layout and rendering.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SemanticError, SemanticResult};
use crate::gate::{Gate, GateKind};
use crate::operation::{ControlLink, Operation};
use crate::parameter::ParameterExpression;
use crate::qubit::{ClbitId, QubitId, Register, RegisterKind};

/// A quantum circuit: declared registers plus an ordered operation list.
///
/// Operations are validated as they are appended, so every stored index
/// refers to a declared qubit or bit. Control links are derived in a
/// separate pass by [`Circuit::resolve_control_links`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    qregs: Vec<Register>,
    cregs: Vec<Register>,
    num_qubits: u32,
    num_clbits: u32,
    operations: Vec<Operation>,
    links: Vec<ControlLink>,
}

impl Circuit {
    /// Create an empty circuit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a quantum register and return its first qubit.
    pub fn add_qreg(&mut self, name: impl Into<String>, size: u32) -> SemanticResult<QubitId> {
        let reg = self.declare(RegisterKind::Quantum, name.into(), size)?;
        Ok(QubitId(reg.offset))
    }

    /// Declare a classical register and return its first bit.
    pub fn add_creg(&mut self, name: impl Into<String>, size: u32) -> SemanticResult<ClbitId> {
        let reg = self.declare(RegisterKind::Classical, name.into(), size)?;
        Ok(ClbitId(reg.offset))
    }

    fn declare(&mut self, kind: RegisterKind, name: String, size: u32) -> SemanticResult<&Register> {
        if self.register(&name).is_some() {
            return Err(SemanticError::DuplicateDeclaration(name));
        }
        if size == 0 {
            return Err(SemanticError::EmptyRegister(name));
        }
        let (regs, counter) = match kind {
            RegisterKind::Quantum => (&mut self.qregs, &mut self.num_qubits),
            RegisterKind::Classical => (&mut self.cregs, &mut self.num_clbits),
        };
        debug!("declare {kind} register {name}[{size}] at offset {counter}");
        regs.push(Register::new(kind, name, size, *counter));
        *counter += size;
        Ok(&regs[regs.len() - 1])
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Append an operation after validating its operands. Returns its index.
    pub fn push(&mut self, op: Operation) -> SemanticResult<usize> {
        for q in op.qubits() {
            self.check_qubit(q)?;
        }
        match &op {
            Operation::Gate(gate) | Operation::ConditionalGate { gate, .. } => {
                check_distinct(gate)?;
            }
            _ => {}
        }
        match &op {
            Operation::Measure {
                target: Some(c), ..
            } => self.check_clbit(*c)?,
            Operation::ConditionalGate { condition, .. } => self.check_clbit(*condition)?,
            _ => {}
        }
        self.operations.push(op);
        Ok(self.operations.len() - 1)
    }

    /// Apply a gate.
    pub fn gate(
        &mut self,
        kind: GateKind,
        params: Vec<ParameterExpression>,
        qubits: Vec<QubitId>,
    ) -> SemanticResult<&mut Self> {
        self.push(Operation::Gate(Gate::new(kind, params, qubits)))?;
        Ok(self)
    }

    /// Apply Hadamard gate.
    pub fn h(&mut self, qubit: QubitId) -> SemanticResult<&mut Self> {
        self.gate(GateKind::H, vec![], vec![qubit])
    }

    /// Apply Pauli-X gate.
    pub fn x(&mut self, qubit: QubitId) -> SemanticResult<&mut Self> {
        self.gate(GateKind::X, vec![], vec![qubit])
    }

    /// Apply CNOT gate.
    pub fn cx(&mut self, control: QubitId, target: QubitId) -> SemanticResult<&mut Self> {
        self.gate(GateKind::CX, vec![], vec![control, target])
    }

    /// Measure a qubit into a classical bit.
    pub fn measure(&mut self, qubit: QubitId, clbit: ClbitId) -> SemanticResult<&mut Self> {
        self.push(Operation::measure(qubit, clbit))?;
        Ok(self)
    }

    /// Reset a qubit to |0⟩.
    pub fn reset(&mut self, qubit: QubitId) -> SemanticResult<&mut Self> {
        self.push(Operation::Reset { qubit })?;
        Ok(self)
    }

    /// Apply a barrier to the given qubits.
    pub fn barrier(&mut self, qubits: Vec<QubitId>) -> SemanticResult<&mut Self> {
        self.push(Operation::Barrier { qubits })?;
        Ok(self)
    }

    /// Apply `gate` only when `condition` reads 1.
    pub fn conditional(&mut self, condition: ClbitId, gate: Gate) -> SemanticResult<&mut Self> {
        self.push(Operation::ConditionalGate { condition, gate })?;
        Ok(self)
    }

    fn check_qubit(&self, qubit: QubitId) -> SemanticResult<()> {
        if qubit.0 < self.num_qubits {
            Ok(())
        } else {
            Err(SemanticError::InvalidIndex {
                kind: RegisterKind::Quantum,
                index: qubit.0,
                len: self.num_qubits,
            })
        }
    }

    fn check_clbit(&self, clbit: ClbitId) -> SemanticResult<()> {
        if clbit.0 < self.num_clbits {
            Ok(())
        } else {
            Err(SemanticError::InvalidIndex {
                kind: RegisterKind::Classical,
                index: clbit.0,
                len: self.num_clbits,
            })
        }
    }

    // =========================================================================
    // Control links
    // =========================================================================

    /// Bind every conditional gate to the most recent preceding measurement
    /// that writes its condition bit.
    ///
    /// A later measurement into the same bit supersedes an earlier one.
    /// Replaces any previously resolved links.
    pub fn resolve_control_links(&mut self) -> SemanticResult<&[ControlLink]> {
        let mut last_writer: FxHashMap<ClbitId, usize> = FxHashMap::default();
        let mut links = Vec::new();

        for (index, op) in self.operations.iter().enumerate() {
            match op {
                Operation::Measure {
                    target: Some(bit), ..
                } => {
                    last_writer.insert(*bit, index);
                }
                Operation::ConditionalGate { condition, .. } => {
                    let measure = last_writer.get(condition).copied().ok_or_else(|| {
                        SemanticError::UnboundCondition {
                            bit: self.clbit_label(*condition),
                        }
                    })?;
                    links.push(ControlLink {
                        measure,
                        gate: index,
                        bit: *condition,
                    });
                }
                _ => {}
            }
        }

        debug!("resolved {} control links", links.len());
        self.links = links;
        Ok(&self.links)
    }

    /// Links whose source is the measurement at `measure`.
    pub fn links_from(&self, measure: usize) -> impl Iterator<Item = &ControlLink> + '_ {
        self.links.iter().filter(move |l| l.measure == measure)
    }

    /// The link consumed by the conditional gate at `gate`, if resolved.
    pub fn link_into(&self, gate: usize) -> Option<&ControlLink> {
        self.links.iter().find(|l| l.gate == gate)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of qubit wires.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits as usize
    }

    /// Number of classical bits.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits as usize
    }

    /// Operations in program order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Resolved control links, in gate order.
    pub fn links(&self) -> &[ControlLink] {
        &self.links
    }

    /// Quantum registers in declaration order.
    pub fn qregs(&self) -> &[Register] {
        &self.qregs
    }

    /// Classical registers in declaration order.
    pub fn cregs(&self) -> &[Register] {
        &self.cregs
    }

    /// Look up a register of either kind by name.
    pub fn register(&self, name: &str) -> Option<&Register> {
        self.qregs
            .iter()
            .chain(self.cregs.iter())
            .find(|r| r.name == name)
    }

    /// Source-level name of a qubit, e.g. `q[1]`.
    pub fn qubit_label(&self, qubit: QubitId) -> String {
        label_in(&self.qregs, qubit.0).unwrap_or_else(|| qubit.to_string())
    }

    /// Source-level name of a classical bit, e.g. `c[0]`.
    pub fn clbit_label(&self, clbit: ClbitId) -> String {
        label_in(&self.cregs, clbit.0).unwrap_or_else(|| clbit.to_string())
    }
}

fn label_in(regs: &[Register], flat: u32) -> Option<String> {
    regs.iter()
        .find(|r| r.contains(flat))
        .map(|r| r.slot_label(flat - r.offset))
}

fn check_distinct(gate: &Gate) -> SemanticResult<()> {
    let qubits: Vec<_> = gate.qubits().collect();
    for (i, q) in qubits.iter().enumerate() {
        if qubits[..i].contains(q) {
            return Err(SemanticError::DuplicateQubit {
                qubit: *q,
                gate: gate.kind.name().to_string(),
            });
        }
    }
    Ok(())
}
