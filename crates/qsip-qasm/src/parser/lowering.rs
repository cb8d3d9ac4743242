//! AST-to-circuit lowering.

use qsip_ir::{
    Circuit, ClbitId, Gate, GateKind, Operation, ParameterExpression, QubitId, RegisterKind,
    SemanticError, SemanticResult, Warning,
};
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use crate::ast::{BinOp, BitRef, Expression, GateCall, Program, QubitRef, Spanned, Statement};

/// A validated circuit together with the warnings raised while building it.
#[derive(Debug, Clone)]
pub struct Lowered {
    pub circuit: Circuit,
    pub warnings: Vec<Warning>,
}

/// Build the circuit model for a parsed program.
///
/// Statements are lowered in program order, so every reference must follow
/// the declaration of its register. Control links are resolved in a final
/// pass over the operation list.
pub fn build(program: &Program) -> SemanticResult<Lowered> {
    let mut lowerer = Lowerer::new();
    lowerer.lower(program)?;
    Ok(Lowered {
        circuit: lowerer.circuit,
        warnings: lowerer.warnings,
    })
}

/// Lowers AST to Circuit.
struct Lowerer {
    /// Qubit registers: name -> (`start_id`, size).
    qregs: FxHashMap<String, (u32, u32)>,
    /// Classical bit registers: name -> (`start_id`, size).
    cregs: FxHashMap<String, (u32, u32)>,
    circuit: Circuit,
    warnings: Vec<Warning>,
}

impl Lowerer {
    fn new() -> Self {
        Self {
            qregs: FxHashMap::default(),
            cregs: FxHashMap::default(),
            circuit: Circuit::new(),
            warnings: Vec::new(),
        }
    }

    fn lower(&mut self, program: &Program) -> SemanticResult<()> {
        for stmt in &program.statements {
            self.lower_statement(stmt)?;
        }

        self.circuit.resolve_control_links()?;

        for w in &self.warnings {
            warn!("{w}");
        }
        debug!(
            "built circuit: {} qubits, {} clbits, {} operations",
            self.circuit.num_qubits(),
            self.circuit.num_clbits(),
            self.circuit.operations().len()
        );
        Ok(())
    }

    fn lower_statement(&mut self, stmt: &Spanned<Statement>) -> SemanticResult<()> {
        match &stmt.node {
            Statement::QubitDecl { name, size } => {
                let size = size.unwrap_or(1);
                let start = self.circuit.add_qreg(name.clone(), size)?;
                self.qregs.insert(name.clone(), (start.0, size));
                Ok(())
            }

            Statement::BitDecl { name, size } => {
                let size = size.unwrap_or(1);
                let start = self.circuit.add_creg(name.clone(), size)?;
                self.cregs.insert(name.clone(), (start.0, size));
                Ok(())
            }

            Statement::Include(path) => {
                debug!("ignoring include \"{path}\" at {}", stmt.position);
                Ok(())
            }

            Statement::ClassicalDecl { ty, name } => {
                debug!("ignoring {ty} declaration of '{name}' at {}", stmt.position);
                Ok(())
            }

            Statement::Gate(call) => {
                for gate in self.lower_gate_call(call)? {
                    self.circuit.push(Operation::Gate(gate))?;
                }
                Ok(())
            }

            Statement::Measure { qubits, bits } => {
                let q_ids = self.resolve_qubits(qubits)?;

                if bits.is_empty() {
                    for q in q_ids {
                        self.circuit.push(Operation::Measure {
                            qubit: q,
                            target: None,
                        })?;
                    }
                    return Ok(());
                }

                let c_ids = self.resolve_clbits(bits)?;
                if q_ids.len() != c_ids.len() {
                    return Err(SemanticError::WidthMismatch {
                        left: q_ids.len(),
                        right: c_ids.len(),
                    });
                }
                for (q, c) in q_ids.into_iter().zip(c_ids) {
                    self.circuit.push(Operation::measure(q, c))?;
                }
                Ok(())
            }

            Statement::Reset { qubits } => {
                for q in self.resolve_qubits(qubits)? {
                    self.circuit.push(Operation::Reset { qubit: q })?;
                }
                Ok(())
            }

            Statement::Barrier { qubits } => {
                let mut q_ids = if qubits.is_empty() {
                    (0..self.circuit.num_qubits())
                        .map(|i| QubitId(i as u32))
                        .collect()
                } else {
                    self.resolve_qubits(qubits)?
                };
                let mut seen = Vec::with_capacity(q_ids.len());
                q_ids.retain(|q| {
                    let fresh = !seen.contains(q);
                    seen.push(*q);
                    fresh
                });
                if !q_ids.is_empty() {
                    self.circuit.push(Operation::Barrier { qubits: q_ids })?;
                }
                Ok(())
            }

            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                if else_body.is_some() {
                    return Err(SemanticError::unsupported("else branch"));
                }
                let call = match then_body.as_slice() {
                    [Spanned {
                        node: Statement::Gate(call),
                        ..
                    }] => call,
                    [single] => {
                        return Err(SemanticError::unsupported(format!(
                            "{} inside if body",
                            single.node.describe()
                        )));
                    }
                    _ => {
                        return Err(SemanticError::unsupported(
                            "if body with more than one statement",
                        ));
                    }
                };
                let bit = self.resolve_condition(condition)?;
                for gate in self.lower_gate_call(call)? {
                    self.circuit.push(Operation::ConditionalGate {
                        condition: bit,
                        gate,
                    })?;
                }
                Ok(())
            }

            Statement::Delay { .. }
            | Statement::For { .. }
            | Statement::While { .. }
            | Statement::GateDef { .. }
            | Statement::Assignment { .. } => {
                Err(SemanticError::unsupported(stmt.node.describe()))
            }
        }
    }

    /// Lower one gate call, broadcasting whole-register operands.
    fn lower_gate_call(&self, call: &GateCall) -> SemanticResult<Vec<Gate>> {
        let kind = GateKind::from_name(&call.name);
        let params: Vec<_> = call
            .params
            .iter()
            .map(expr_to_param)
            .collect::<SemanticResult<_>>()?;

        if let Some(expected) = kind.num_params() {
            check_param_count(&call.name, &params, expected)?;
        }

        let mut gates = Vec::new();
        for qubits in self.broadcast(&call.qubits)? {
            if let Some(expected) = kind.num_qubits() {
                check_qubit_count(&call.name, &qubits, expected)?;
            }
            gates.push(Gate::new(kind.clone(), params.clone(), qubits));
        }
        Ok(gates)
    }

    /// Expand operands into one qubit list per gate application.
    ///
    /// `h q;` on a 3-qubit register yields three applications. Indexed
    /// operands and one-qubit registers are repeated alongside the
    /// broadcasting ones.
    fn broadcast(&self, refs: &[QubitRef]) -> SemanticResult<Vec<Vec<QubitId>>> {
        let operands = refs
            .iter()
            .map(|r| {
                let ids = self.resolve_qubit_ref(r)?;
                Ok((r.index.is_none() && ids.len() > 1, ids))
            })
            .collect::<SemanticResult<Vec<_>>>()?;

        let mut width = None;
        for (whole, ids) in &operands {
            if !*whole {
                continue;
            }
            match width {
                None => width = Some(ids.len()),
                Some(w) if w != ids.len() => {
                    return Err(SemanticError::WidthMismatch {
                        left: w,
                        right: ids.len(),
                    });
                }
                Some(_) => {}
            }
        }

        let rows = width.unwrap_or(1);
        Ok((0..rows)
            .map(|i| {
                operands
                    .iter()
                    .map(|(whole, ids)| if *whole { ids[i] } else { ids[0] })
                    .collect()
            })
            .collect())
    }

    fn resolve_qubit_ref(&self, r: &QubitRef) -> SemanticResult<Vec<QubitId>> {
        let (start, size) = lookup(&self.qregs, RegisterKind::Quantum, &r.register)?;
        match r.index {
            Some(idx) => Ok(vec![QubitId(start + check_index(&r.register, idx, size)?)]),
            None => Ok((0..size).map(|i| QubitId(start + i)).collect()),
        }
    }

    fn resolve_qubits(&self, refs: &[QubitRef]) -> SemanticResult<Vec<QubitId>> {
        let mut ids = Vec::new();
        for r in refs {
            ids.extend(self.resolve_qubit_ref(r)?);
        }
        Ok(ids)
    }

    fn resolve_clbits(&self, refs: &[BitRef]) -> SemanticResult<Vec<ClbitId>> {
        let mut ids = Vec::new();
        for r in refs {
            let (start, size) = lookup(&self.cregs, RegisterKind::Classical, &r.register)?;
            match r.index {
                Some(idx) => ids.push(ClbitId(start + check_index(&r.register, idx, size)?)),
                None => ids.extend((0..size).map(|i| ClbitId(start + i))),
            }
        }
        Ok(ids)
    }

    /// Reduce an `if` condition to the single bit it tests.
    fn resolve_condition(&mut self, expr: &Expression) -> SemanticResult<ClbitId> {
        match expr {
            Expression::Paren(inner) => self.resolve_condition(inner),

            Expression::Identifier(name) => {
                let (start, size) = lookup(&self.cregs, RegisterKind::Classical, name)?;
                if size > 1 {
                    self.warnings.push(Warning::MultiBitCondition {
                        register: name.clone(),
                        size,
                    });
                }
                Ok(ClbitId(start))
            }

            Expression::Index { target, index } => match (&**target, &**index) {
                (Expression::Identifier(name), Expression::Int(i)) => {
                    let (start, size) = lookup(&self.cregs, RegisterKind::Classical, name)?;
                    let idx = u32::try_from(*i).unwrap_or(u32::MAX);
                    Ok(ClbitId(start + check_index(name, idx, size)?))
                }
                _ => Err(SemanticError::unsupported(format!("condition `{expr}`"))),
            },

            Expression::BinOp {
                left,
                op: BinOp::Eq,
                right,
            } if is_true_literal(right) => {
                let bit = self.resolve_condition(left)?;
                self.warnings.push(Warning::ConditionNormalized {
                    condition: expr.to_string(),
                });
                Ok(bit)
            }

            _ => Err(SemanticError::unsupported(format!("condition `{expr}`"))),
        }
    }
}

fn lookup(
    regs: &FxHashMap<String, (u32, u32)>,
    kind: RegisterKind,
    name: &str,
) -> SemanticResult<(u32, u32)> {
    regs.get(name)
        .copied()
        .ok_or_else(|| SemanticError::Undeclared {
            kind,
            name: name.to_string(),
        })
}

fn check_index(register: &str, index: u32, size: u32) -> SemanticResult<u32> {
    if index < size {
        Ok(index)
    } else {
        Err(SemanticError::OutOfRange {
            register: register.to_string(),
            index,
            size,
        })
    }
}

fn is_true_literal(expr: &Expression) -> bool {
    matches!(expr, Expression::Int(1) | Expression::Bool(true))
}

/// Convert AST expression to `ParameterExpression`.
#[allow(clippy::cast_precision_loss)]
fn expr_to_param(expr: &Expression) -> SemanticResult<ParameterExpression> {
    Ok(match expr {
        Expression::Int(v) => ParameterExpression::Constant(*v as f64),
        Expression::Float(v) => ParameterExpression::Constant(*v),
        Expression::Pi => ParameterExpression::Pi,
        Expression::Tau => ParameterExpression::Constant(std::f64::consts::TAU),
        Expression::Euler => ParameterExpression::Symbol("e".into()),
        Expression::Identifier(name) => ParameterExpression::Symbol(name.clone()),
        Expression::Neg(e) => ParameterExpression::Neg(Box::new(expr_to_param(e)?)),
        Expression::Paren(e) => expr_to_param(e)?,
        Expression::BinOp { left, op, right } => {
            let l = Box::new(expr_to_param(left)?);
            let r = Box::new(expr_to_param(right)?);
            match op {
                BinOp::Add => ParameterExpression::Add(l, r),
                BinOp::Sub => ParameterExpression::Sub(l, r),
                BinOp::Mul => ParameterExpression::Mul(l, r),
                BinOp::Div => ParameterExpression::Div(l, r),
                BinOp::Pow => ParameterExpression::Pow(l, r),
                _ => {
                    return Err(SemanticError::unsupported(format!(
                        "operator '{op}' in gate parameter"
                    )));
                }
            }
        }
        Expression::FnCall { name, args } => ParameterExpression::Call(
            name.clone(),
            args.iter().map(expr_to_param).collect::<SemanticResult<_>>()?,
        ),
        Expression::Bool(_) | Expression::Not(_) | Expression::Index { .. } | Expression::Range { .. } => {
            return Err(SemanticError::unsupported(format!(
                "gate parameter `{expr}`"
            )));
        }
    })
}

fn check_param_count(
    gate: &str,
    params: &[ParameterExpression],
    expected: usize,
) -> SemanticResult<()> {
    if params.len() == expected {
        Ok(())
    } else {
        Err(SemanticError::ArityMismatch {
            gate: gate.into(),
            operand: "parameters",
            expected,
            got: params.len(),
        })
    }
}

fn check_qubit_count(gate: &str, qubits: &[QubitId], expected: usize) -> SemanticResult<()> {
    if qubits.len() == expected {
        Ok(())
    } else {
        Err(SemanticError::ArityMismatch {
            gate: gate.into(),
            operand: "qubits",
            expected,
            got: qubits.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn lower(source: &str) -> SemanticResult<Lowered> {
        build(&parse(source).unwrap())
    }

    #[test]
    fn test_bell_with_register_measure() {
        let lowered = lower(
            r"
            OPENQASM 3.0;
            qubit[2] q;
            bit[2] c;
            h q[0];
            cx q[0], q[1];
            c = measure q;
        ",
        )
        .unwrap();
        let ops = lowered.circuit.operations();
        assert_eq!(ops.len(), 4);
        assert_eq!(ops[2], Operation::measure(QubitId(0), ClbitId(0)));
        assert_eq!(ops[3], Operation::measure(QubitId(1), ClbitId(1)));
        assert!(lowered.warnings.is_empty());
    }

    #[test]
    fn test_broadcast_single_qubit_gate() {
        let lowered = lower("qubit[3] q; h q;").unwrap();
        assert_eq!(lowered.circuit.operations().len(), 3);
    }

    #[test]
    fn test_broadcast_mixed_operands() {
        let lowered = lower("qubit a; qubit[2] b; cx a, b;").unwrap();
        let ops = lowered.circuit.operations();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].qubits(), vec![QubitId(0), QubitId(1)]);
        assert_eq!(ops[1].qubits(), vec![QubitId(0), QubitId(2)]);

        let lowered = lower("qubit[2] a; qubit[1] t; cz a, t;").unwrap();
        let ops = lowered.circuit.operations();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[1].qubits(), vec![QubitId(1), QubitId(2)]);
    }

    #[test]
    fn test_scalar_operands_do_not_broadcast() {
        let lowered = lower("qubit a; qubit b; cx a, b; h a;").unwrap();
        assert_eq!(lowered.circuit.operations().len(), 2);
    }

    #[test]
    fn test_reference_before_declaration() {
        let err = lower("h q[0]; qubit[1] q;").unwrap_err();
        assert_eq!(
            err,
            SemanticError::Undeclared {
                kind: RegisterKind::Quantum,
                name: "q".into()
            }
        );
        let err = lower("qubit q; c = measure q; bit c;").unwrap_err();
        assert!(matches!(err, SemanticError::Undeclared { .. }));
    }

    #[test]
    fn test_broadcast_width_mismatch() {
        let err = lower("qubit[2] a; qubit[3] b; cx a, b;").unwrap_err();
        assert_eq!(err, SemanticError::WidthMismatch { left: 2, right: 3 });
    }

    #[test]
    fn test_out_of_range() {
        let err = lower("qubit[2] q; x q[2];").unwrap_err();
        assert_eq!(
            err,
            SemanticError::OutOfRange {
                register: "q".into(),
                index: 2,
                size: 2
            }
        );
    }

    #[test]
    fn test_undeclared() {
        let err = lower("h undefined[0];").unwrap_err();
        assert!(matches!(err, SemanticError::Undeclared { .. }));
    }

    #[test]
    fn test_redeclaration() {
        let err = lower("qubit q; bit q;").unwrap_err();
        assert_eq!(err, SemanticError::DuplicateDeclaration("q".into()));
    }

    #[test]
    fn test_arity_checks() {
        let err = lower("qubit[2] q; cx q[0];").unwrap_err();
        assert!(matches!(
            err,
            SemanticError::ArityMismatch {
                operand: "qubits",
                ..
            }
        ));
        let err = lower("qubit q; rx q;").unwrap_err();
        assert!(matches!(
            err,
            SemanticError::ArityMismatch {
                operand: "parameters",
                ..
            }
        ));
    }

    #[test]
    fn test_custom_gate_any_arity() {
        let lowered = lower("qubit[3] q; oracle(theta, 2) q[0], q[2];").unwrap();
        match &lowered.circuit.operations()[0] {
            Operation::Gate(g) => {
                assert_eq!(g.kind, GateKind::Custom("oracle".into()));
                assert_eq!(g.params.len(), 2);
                assert_eq!(g.targets.len(), 2);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_conditional_links_to_measure() {
        let lowered = lower("qubit[2] q; bit c; h q[0]; c = measure q[0]; if (c) x q[1];")
            .unwrap();
        let links = lowered.circuit.links();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].measure, 1);
        assert_eq!(links[0].gate, 2);
    }

    #[test]
    fn test_unbound_condition() {
        let err = lower("qubit q; bit c; if (c) x q;").unwrap_err();
        assert_eq!(err, SemanticError::UnboundCondition { bit: "c".into() });
    }

    #[test]
    fn test_condition_normalization_warns() {
        let lowered = lower(
            "qubit[2] q; bit[2] c; c[1] = measure q[0]; if (c[1] == 1) { x q[1]; }",
        )
        .unwrap();
        assert_eq!(lowered.circuit.links()[0].bit, ClbitId(1));
        assert!(matches!(
            lowered.warnings[0],
            Warning::ConditionNormalized { .. }
        ));
    }

    #[test]
    fn test_multibit_condition_uses_first_bit() {
        let lowered = lower("qubit[2] q; bit[2] c; c = measure q; if (c) z q[1];").unwrap();
        assert_eq!(lowered.circuit.links()[0].bit, ClbitId(0));
        assert_eq!(
            lowered.warnings,
            vec![Warning::MultiBitCondition {
                register: "c".into(),
                size: 2
            }]
        );
    }

    #[test]
    fn test_unsupported_control_flow() {
        let cases = [
            "qubit q; bit c; c = measure q; if (c) x q; else z q;",
            "qubit[2] q; bit[2] c; c = measure q; if (c[0] && c[1]) x q[0];",
            "qubit[2] q; bit[2] c; c = measure q; if (c[0] || c[1]) x q[0];",
            "qubit q; bit c; c = measure q; if (c == 0) x q;",
            "qubit q; bit c; c = measure q; if (!c) x q;",
            "qubit q; bit c; c = measure q; if (c) { x q; z q; }",
            "qubit q; bit c; c = measure q; if (c) reset q;",
            "qubit[2] q; for int i in [0:1] { h q[i]; }",
            "qubit q; while (true) { x q; }",
            "gate g a { h a; } qubit q;",
            "bit c; c = 1;",
            "qubit q; delay[10] q;",
        ];
        for source in cases {
            let err = lower(source).unwrap_err();
            assert!(
                matches!(err, SemanticError::Unsupported { .. }),
                "{source}: {err:?}"
            );
        }
    }

    #[test]
    fn test_bare_measure_has_no_target() {
        let lowered = lower("qubit q; measure q;").unwrap();
        assert_eq!(
            lowered.circuit.operations()[0],
            Operation::Measure {
                qubit: QubitId(0),
                target: None
            }
        );
    }

    #[test]
    fn test_barrier_defaults_to_all_qubits() {
        let lowered = lower("qubit[3] q; barrier;").unwrap();
        assert_eq!(
            lowered.circuit.operations()[0].qubits(),
            vec![QubitId(0), QubitId(1), QubitId(2)]
        );
    }

    #[test]
    fn test_parameter_tree() {
        let lowered = lower("qubit q; rz(-pi/4) q;").unwrap();
        let gate = lowered.circuit.operations()[0].gate().unwrap();
        assert_eq!(
            gate.params[0],
            ParameterExpression::Div(
                Box::new(ParameterExpression::Neg(Box::new(ParameterExpression::Pi))),
                Box::new(ParameterExpression::Constant(4.0))
            )
        );
    }

    #[test]
    fn test_classical_declarations_ignored() {
        let lowered = lower("input float theta; qubit q; rx(theta) q;").unwrap();
        assert_eq!(lowered.circuit.operations().len(), 1);
    }
}
