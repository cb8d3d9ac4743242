//! `OpenQASM` 3 subset front end for QSIP
//!
//! Turns program text into a validated [`qsip_ir::Circuit`] in two steps:
//! [`parse`] produces a positioned syntax tree and [`build`] resolves
//! registers, broadcasts register operands, checks arity and links every
//! classically controlled gate to the measurement that feeds its bit.
//!
//! # Supported Features
//!
//! | Feature | Status | Example |
//! |---------|--------|---------|
//! | Version header (optional) | ✅ | `OPENQASM 3.0;` |
//! | Includes (ignored) | ✅ | `include "stdgates.inc";` |
//! | Qubit declarations | ✅ | `qubit[5] q;`, `qreg q[5];` |
//! | Classical bits | ✅ | `bit[5] c;`, `creg c[5];` |
//! | Parameterized gates | ✅ | `rx(pi/4) q[0];` |
//! | Measurements | ✅ | `c = measure q;`, `measure q -> c;` |
//! | Single-bit conditions | ✅ | `if (c[0]) x q[1];` |
//! | Barriers and resets | ✅ | `barrier q;`, `reset q[0];` |
//! | Loops, gate definitions, `else` | parsed, rejected by [`build`] | |
//!
//! # Example
//!
//! ```rust
//! use qsip_qasm::{build, parse};
//!
//! let source = r#"
//!     OPENQASM 3.0;
//!     qubit[2] q;
//!     bit c;
//!     h q[0];
//!     c = measure q[0];
//!     if (c) x q[1];
//! "#;
//!
//! let program = parse(source).unwrap();
//! let lowered = build(&program).unwrap();
//! assert_eq!(lowered.circuit.num_qubits(), 2);
//! assert_eq!(lowered.circuit.links().len(), 1);
//! assert!(lowered.warnings.is_empty());
//! ```

mod ast;
mod error;
mod lexer;
mod parser;

pub use error::{ParseError, ParseResult, Position};
pub use parser::{Lowered, build, parse};

// Re-export AST types for advanced users
pub mod syntax {
    pub use crate::ast::*;
}
