//! Semantic errors raised while building a circuit.

use crate::qubit::{QubitId, RegisterKind};
use thiserror::Error;

/// A well-formed program that does not describe a drawable circuit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SemanticError {
    /// Reference to a register that was never declared.
    #[error("Undeclared {kind} register '{name}'")]
    Undeclared { kind: RegisterKind, name: String },

    /// Index past the end of a register.
    #[error("Index {index} out of range for register '{register}' of size {size}")]
    OutOfRange {
        register: String,
        index: u32,
        size: u32,
    },

    /// A register name declared twice.
    #[error("Duplicate declaration of '{0}'")]
    DuplicateDeclaration(String),

    /// A register declared with size zero.
    #[error("Register '{0}' must have at least one slot")]
    EmptyRegister(String),

    /// A condition on a bit no preceding measurement writes.
    #[error("Condition on '{bit}' has no preceding measurement")]
    UnboundCondition { bit: String },

    /// A construct outside the supported subset.
    #[error("Unsupported construct: {construct}")]
    Unsupported { construct: String },

    /// Wrong number of operands or parameters for a fixed gate.
    #[error("Gate '{gate}' expects {expected} {operand}, got {got}")]
    ArityMismatch {
        gate: String,
        operand: &'static str,
        expected: usize,
        got: usize,
    },

    /// The same qubit used twice by one gate.
    #[error("Duplicate qubit {qubit} in gate '{gate}'")]
    DuplicateQubit { qubit: QubitId, gate: String },

    /// Broadcast operands of different widths.
    #[error("Operand widths do not match: {left} vs {right}")]
    WidthMismatch { left: usize, right: usize },

    /// A flat index not backed by any declared register.
    #[error("Wire index {index} outside the {kind} range of {len}")]
    InvalidIndex {
        kind: RegisterKind,
        index: u32,
        len: u32,
    },
}

impl SemanticError {
    /// Shorthand for [`SemanticError::Unsupported`].
    pub fn unsupported(construct: impl Into<String>) -> Self {
        SemanticError::Unsupported {
            construct: construct.into(),
        }
    }
}

/// Result type for circuit construction.
pub type SemanticResult<T> = Result<T, SemanticError>;
