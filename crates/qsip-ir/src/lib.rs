//! QSIP circuit model
//!
//! The data structures shared by every stage of the translator: registers,
//! a closed gate vocabulary, symbolic parameters, the ordered operation list
//! and the links between measurements and the classically controlled gates
//! that read them.
//!
//! # Example
//!
//! ```rust
//! use qsip_ir::{Circuit, Gate, GateKind, QubitId};
//!
//! let mut circuit = Circuit::new();
//! let q = circuit.add_qreg("q", 2).unwrap();
//! let c = circuit.add_creg("c", 1).unwrap();
//!
//! circuit.h(q).unwrap();
//! circuit.measure(q, c).unwrap();
//! circuit
//!     .conditional(c, Gate::new(GateKind::X, vec![], vec![QubitId(1)]))
//!     .unwrap();
//!
//! let links = circuit.resolve_control_links().unwrap();
//! assert_eq!(links.len(), 1);
//! assert_eq!(links[0].measure, 1);
//! ```

pub mod circuit;
pub mod error;
pub mod gate;
pub mod operation;
pub mod parameter;
pub mod qubit;
pub mod warning;

pub use circuit::Circuit;
pub use error::{SemanticError, SemanticResult};
pub use gate::{Gate, GateKind};
pub use operation::{ControlLink, Operation};
pub use parameter::ParameterExpression;
pub use qubit::{ClbitId, QubitId, Register, RegisterKind};
pub use warning::Warning;
