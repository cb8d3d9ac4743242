//! Syntax errors.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A location in the source text. Lines and columns are 1-based; the column
/// counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl Position {
    /// Compute the position of byte `offset` in `source`.
    pub fn locate(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let before = source.get(..offset).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self {
            offset,
            line,
            column,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// Errors that can occur during parsing. The first error aborts the parse.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// Lexer error (invalid token).
    #[error("Lexer error at {position}: {message}")]
    LexerError { position: Position, message: String },

    /// Unexpected token.
    #[error("Unexpected token at {position}: expected {expected}, found {found}")]
    UnexpectedToken {
        position: Position,
        expected: String,
        found: String,
    },

    /// Unexpected end of input.
    #[error("Unexpected end of input at {position}: expected {expected}")]
    UnexpectedEof { position: Position, expected: String },

    /// Malformed version header.
    #[error("Invalid OPENQASM version at {position}: {found}")]
    InvalidVersion { position: Position, found: String },

    /// Integer literal that does not fit a register size or index.
    #[error("Integer {value} at {position} is too large")]
    IntegerOverflow { position: Position, value: u64 },
}

impl ParseError {
    /// Where the error occurred.
    pub fn position(&self) -> Position {
        match self {
            ParseError::LexerError { position, .. }
            | ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedEof { position, .. }
            | ParseError::InvalidVersion { position, .. }
            | ParseError::IntegerOverflow { position, .. } => *position,
        }
    }
}

/// Result type for parsing operations.
pub type ParseResult<T> = Result<T, ParseError>;
