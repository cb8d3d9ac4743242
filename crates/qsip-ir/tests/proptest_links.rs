//! Property-based tests for control-link resolution.

use proptest::prelude::*;
use qsip_ir::{Circuit, ClbitId, Gate, GateKind, Operation, QubitId, SemanticError};

const QUBITS: u32 = 4;
const BITS: u32 = 3;

#[derive(Debug, Clone)]
enum Step {
    H(u32),
    Measure(u32, u32),
    Conditional(u32, u32),
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0..QUBITS).prop_map(Step::H),
        (0..QUBITS, 0..BITS).prop_map(|(q, c)| Step::Measure(q, c)),
        (0..BITS, 0..QUBITS).prop_map(|(c, q)| Step::Conditional(c, q)),
    ]
}

fn build(steps: &[Step]) -> Circuit {
    let mut circuit = Circuit::new();
    circuit.add_qreg("q", QUBITS).unwrap();
    circuit.add_creg("c", BITS).unwrap();
    for step in steps {
        match *step {
            Step::H(q) => {
                circuit.h(QubitId(q)).unwrap();
            }
            Step::Measure(q, c) => {
                circuit.measure(QubitId(q), ClbitId(c)).unwrap();
            }
            Step::Conditional(c, q) => {
                let gate = Gate::new(GateKind::X, vec![], vec![QubitId(q)]);
                circuit.conditional(ClbitId(c), gate).unwrap();
            }
        }
    }
    circuit
}

proptest! {
    #[test]
    fn links_bind_to_latest_writer(steps in prop::collection::vec(arb_step(), 0..40)) {
        let mut circuit = build(&steps);
        let ops = circuit.operations().to_vec();

        // Reference: the nearest earlier measure into the same bit.
        let expected: Option<Vec<(usize, usize)>> = ops
            .iter()
            .enumerate()
            .filter_map(|(index, op)| match op {
                Operation::ConditionalGate { condition, .. } => Some((index, *condition)),
                _ => None,
            })
            .map(|(gate, bit)| {
                ops[..gate]
                    .iter()
                    .rposition(|op| matches!(op, Operation::Measure { target: Some(b), .. } if *b == bit))
                    .map(|measure| (measure, gate))
            })
            .collect();

        match (circuit.resolve_control_links(), expected) {
            (Ok(links), Some(expected)) => {
                let got: Vec<_> = links.iter().map(|l| (l.measure, l.gate)).collect();
                prop_assert_eq!(got, expected);
            }
            (Err(SemanticError::UnboundCondition { .. }), None) => {}
            (result, expected) => {
                prop_assert!(false, "resolved {:?}, expected {:?}", result, expected);
            }
        }
    }

    #[test]
    fn resolution_is_idempotent(steps in prop::collection::vec(arb_step(), 0..40)) {
        let mut circuit = build(&steps);
        let first = circuit.resolve_control_links().map(<[_]>::to_vec);
        let second = circuit.resolve_control_links().map(<[_]>::to_vec);
        prop_assert_eq!(first, second);
    }
}
