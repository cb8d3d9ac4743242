//! Abstract syntax tree for the `OpenQASM` subset.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Position;

/// A parsed program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// Version from the `OPENQASM` header, if present.
    pub version: Option<String>,
    /// Statements in source order.
    pub statements: Vec<Spanned<Statement>>,
}

/// A node together with the position of its first token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub node: T,
    pub position: Position,
}

/// A statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    /// Include statement.
    Include(String),

    /// `qubit[n] name;`, `qubit name;` or `qreg name[n];`
    QubitDecl { name: String, size: Option<u32> },

    /// `bit[n] name;`, `bit name;` or `creg name[n];`
    BitDecl { name: String, size: Option<u32> },

    /// Classical scalar declaration such as `input float theta;`.
    ClassicalDecl { ty: String, name: String },

    /// Gate application.
    Gate(GateCall),

    /// `measure q -> c;`, `c = measure q;` or bare `measure q;`
    Measure {
        qubits: Vec<QubitRef>,
        bits: Vec<BitRef>,
    },

    /// `reset q;`
    Reset { qubits: Vec<QubitRef> },

    /// `barrier q;` or `barrier;` (all qubits).
    Barrier { qubits: Vec<QubitRef> },

    /// `delay[duration] q;`
    Delay {
        duration: Expression,
        qubits: Vec<QubitRef>,
    },

    /// If statement.
    If {
        condition: Expression,
        then_body: Vec<Spanned<Statement>>,
        else_body: Option<Vec<Spanned<Statement>>>,
    },

    /// For loop.
    For {
        variable: String,
        iterable: Expression,
        body: Vec<Spanned<Statement>>,
    },

    /// While loop.
    While {
        condition: Expression,
        body: Vec<Spanned<Statement>>,
    },

    /// Gate definition.
    GateDef {
        name: String,
        params: Vec<String>,
        qubits: Vec<String>,
        body: Vec<Spanned<Statement>>,
    },

    /// Classical assignment.
    Assignment {
        target: String,
        index: Option<u32>,
        value: Expression,
    },
}

impl Statement {
    /// Keyword-level description used in diagnostics.
    pub fn describe(&self) -> &'static str {
        match self {
            Statement::Include(_) => "include",
            Statement::QubitDecl { .. } => "qubit declaration",
            Statement::BitDecl { .. } => "bit declaration",
            Statement::ClassicalDecl { .. } => "classical declaration",
            Statement::Gate(_) => "gate call",
            Statement::Measure { .. } => "measure",
            Statement::Reset { .. } => "reset",
            Statement::Barrier { .. } => "barrier",
            Statement::Delay { .. } => "delay",
            Statement::If { .. } => "if statement",
            Statement::For { .. } => "for loop",
            Statement::While { .. } => "while loop",
            Statement::GateDef { .. } => "gate definition",
            Statement::Assignment { .. } => "classical assignment",
        }
    }
}

/// A gate call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateCall {
    /// Gate name as written.
    pub name: String,
    /// Gate parameters (angles, etc.).
    pub params: Vec<Expression>,
    /// Qubits the gate acts on.
    pub qubits: Vec<QubitRef>,
}

/// `q` (whole register) or `q[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QubitRef {
    pub register: String,
    pub index: Option<u32>,
}

impl QubitRef {
    /// Reference to a single qubit.
    pub fn single(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index: Some(index),
        }
    }

    /// Reference to an entire register.
    pub fn register(register: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            index: None,
        }
    }
}

/// `c` (whole register) or `c[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitRef {
    pub register: String,
    pub index: Option<u32>,
}

impl BitRef {
    /// Reference to a single bit.
    pub fn single(register: impl Into<String>, index: u32) -> Self {
        Self {
            register: register.into(),
            index: Some(index),
        }
    }

    /// Reference to an entire register.
    pub fn register(register: impl Into<String>) -> Self {
        Self {
            register: register.into(),
            index: None,
        }
    }
}

/// An expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Integer literal.
    Int(u64),
    /// Float literal.
    Float(f64),
    /// Boolean literal.
    Bool(bool),
    /// Identifier.
    Identifier(String),
    /// Pi constant.
    Pi,
    /// Tau constant (2π).
    Tau,
    /// Euler's number.
    Euler,
    /// Arithmetic negation.
    Neg(Box<Expression>),
    /// Logical negation.
    Not(Box<Expression>),
    /// Binary operation.
    BinOp {
        left: Box<Expression>,
        op: BinOp,
        right: Box<Expression>,
    },
    /// Function call.
    FnCall { name: String, args: Vec<Expression> },
    /// Index expression: `c[i]`.
    Index {
        target: Box<Expression>,
        index: Box<Expression>,
    },
    /// Range `start:end` or `start:step:end`, as used by `for` loops.
    Range {
        start: Box<Expression>,
        end: Box<Expression>,
        step: Option<Box<Expression>>,
    },
    /// Parenthesized expression.
    Paren(Box<Expression>),
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Int(v) => write!(f, "{v}"),
            Expression::Float(v) => write!(f, "{v}"),
            Expression::Bool(v) => write!(f, "{v}"),
            Expression::Identifier(name) => write!(f, "{name}"),
            Expression::Pi => write!(f, "pi"),
            Expression::Tau => write!(f, "tau"),
            Expression::Euler => write!(f, "euler"),
            Expression::Neg(e) => write!(f, "-{e}"),
            Expression::Not(e) => write!(f, "!{e}"),
            Expression::BinOp { left, op, right } => write!(f, "{left} {op} {right}"),
            Expression::FnCall { name, args } => {
                write!(f, "{name}(")?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{a}")?;
                }
                write!(f, ")")
            }
            Expression::Index { target, index } => write!(f, "{target}[{index}]"),
            Expression::Range { start, end, step } => match step {
                Some(step) => write!(f, "[{start}:{step}:{end}]"),
                None => write!(f, "[{start}:{end}]"),
            },
            Expression::Paren(e) => write!(f, "({e})"),
        }
    }
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Pow => "**",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::BitAnd => "&",
            BinOp::BitOr => "|",
            BinOp::BitXor => "^",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expression_display() {
        let expr = Expression::BinOp {
            left: Box::new(Expression::Index {
                target: Box::new(Expression::Identifier("c".into())),
                index: Box::new(Expression::Int(0)),
            }),
            op: BinOp::Eq,
            right: Box::new(Expression::Int(1)),
        };
        assert_eq!(expr.to_string(), "c[0] == 1");
    }

    #[test]
    fn test_refs() {
        let qr = QubitRef::single("q", 0);
        assert_eq!(qr.index, Some(0));
        assert_eq!(BitRef::register("c").index, None);
    }
}
