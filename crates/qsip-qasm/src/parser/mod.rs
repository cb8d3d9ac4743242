//! Parser for the `OpenQASM` subset.

mod expression;
mod lowering;
mod statement;

pub use lowering::{Lowered, build};

use tracing::debug;

use crate::ast::Program;
use crate::error::{ParseError, ParseResult, Position};
use crate::lexer::{SpannedToken, Token, tokenize};

/// Parse a source string into a [`Program`].
///
/// The `OPENQASM` header and `include` lines are optional. The first error
/// aborts the parse.
pub fn parse(source: &str) -> ParseResult<Program> {
    let mut parser = Parser::new(source)?;
    let program = parser.parse_program()?;
    debug!(
        "parsed {} statements (version {})",
        program.statements.len(),
        program.version.as_deref().unwrap_or("unspecified")
    );
    Ok(program)
}

/// Parser state.
pub(super) struct Parser<'a> {
    pub(super) source: &'a str,
    pub(super) tokens: Vec<SpannedToken>,
    pub(super) pos: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser from source.
    fn new(source: &'a str) -> ParseResult<Self> {
        let mut tokens = Vec::new();

        for result in tokenize(source) {
            match result {
                Ok(t) => tokens.push(t),
                Err((span, message)) => {
                    return Err(ParseError::LexerError {
                        position: Position::locate(source, span.start),
                        message,
                    });
                }
            }
        }

        Ok(Self {
            source,
            tokens,
            pos: 0,
        })
    }

    /// Check if we've reached the end.
    pub(super) fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Peek at the current token.
    pub(super) fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    /// Peek `n` tokens ahead of the current one.
    pub(super) fn peek_nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.pos + n).map(|t| &t.token)
    }

    /// Position of the current token, or of the end of input.
    pub(super) fn position(&self) -> Position {
        let offset = self
            .tokens
            .get(self.pos)
            .map_or(self.source.len(), |t| t.span.start);
        Position::locate(self.source, offset)
    }

    /// Advance and return the current token.
    pub(super) fn advance(&mut self) -> Option<Token> {
        if self.is_eof() {
            return None;
        }
        let token = self.tokens[self.pos].token.clone();
        self.pos += 1;
        Some(token)
    }

    /// Error for the current token not being `expected`. Does not consume.
    pub(super) fn unexpected(&self, expected: &str) -> ParseError {
        let position = self.position();
        match self.peek() {
            Some(found) => ParseError::UnexpectedToken {
                position,
                expected: expected.to_string(),
                found: found.to_string(),
            },
            None => ParseError::UnexpectedEof {
                position,
                expected: expected.to_string(),
            },
        }
    }

    /// Expect a specific token.
    #[allow(clippy::needless_pass_by_value)]
    pub(super) fn expect(&mut self, expected: Token) -> ParseResult<()> {
        if self.check(&expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(&expected.to_string()))
        }
    }

    /// Check if current token matches.
    pub(super) fn check(&self, token: &Token) -> bool {
        self.peek()
            .is_some_and(|t| std::mem::discriminant(t) == std::mem::discriminant(token))
    }

    /// Consume token if it matches.
    pub(super) fn consume(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Parse the entire program.
    fn parse_program(&mut self) -> ParseResult<Program> {
        let version = if self.consume(&Token::OpenQasm) {
            let version = self.parse_version()?;
            self.expect(Token::Semicolon)?;
            Some(version)
        } else {
            None
        };

        let mut statements = Vec::new();
        while !self.is_eof() {
            statements.push(self.parse_statement()?);
        }

        Ok(Program {
            version,
            statements,
        })
    }

    /// Parse version number.
    fn parse_version(&mut self) -> ParseResult<String> {
        let position = self.position();
        match self.advance() {
            Some(Token::FloatLiteral(v)) => Ok(format!("{v:?}")),
            Some(Token::IntLiteral(v)) => Ok(format!("{v}.0")),
            Some(other) => Err(ParseError::InvalidVersion {
                position,
                found: other.to_string(),
            }),
            None => Err(ParseError::UnexpectedEof {
                position,
                expected: "version number".into(),
            }),
        }
    }

    /// Parse identifier list.
    pub(super) fn parse_identifier_list(&mut self) -> ParseResult<Vec<String>> {
        let mut ids = vec![self.parse_identifier()?];
        while self.consume(&Token::Comma) {
            ids.push(self.parse_identifier()?);
        }
        Ok(ids)
    }

    /// Parse an identifier.
    pub(super) fn parse_identifier(&mut self) -> ParseResult<String> {
        match self.peek() {
            Some(Token::Identifier(s)) => {
                let s = s.clone();
                self.advance();
                Ok(s)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// Parse an integer literal.
    pub(super) fn parse_int_literal(&mut self) -> ParseResult<u64> {
        match self.peek() {
            Some(Token::IntLiteral(v)) => {
                let v = *v;
                self.advance();
                Ok(v)
            }
            _ => Err(self.unexpected("integer")),
        }
    }

    /// Parse an integer literal used as a size or index.
    pub(super) fn parse_index(&mut self) -> ParseResult<u32> {
        let position = self.position();
        let value = self.parse_int_literal()?;
        u32::try_from(value).map_err(|_| ParseError::IntegerOverflow { position, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Statement;

    #[test]
    fn test_parse_bell_state() {
        let source = r#"
            OPENQASM 3.0;
            include "stdgates.inc";
            qubit[2] q;
            bit[2] c;
            h q[0];
            cx q[0], q[1];
            c = measure q;
        "#;

        let program = parse(source).unwrap();
        assert_eq!(program.version.as_deref(), Some("3.0"));
        assert_eq!(program.statements.len(), 6);
        assert!(matches!(
            program.statements[5].node,
            Statement::Measure { ref bits, .. } if bits.len() == 1
        ));
    }

    #[test]
    fn test_header_is_optional() {
        let program = parse("qubit q; x q;").unwrap();
        assert_eq!(program.version, None);
        assert_eq!(program.statements.len(), 2);
    }

    #[test]
    fn test_integer_version() {
        let program = parse("OPENQASM 2; qreg q[1];").unwrap();
        assert_eq!(program.version.as_deref(), Some("2.0"));
    }

    #[test]
    fn test_invalid_version() {
        let err = parse("OPENQASM three;").unwrap_err();
        assert!(matches!(err, ParseError::InvalidVersion { .. }));
    }

    #[test]
    fn test_statement_positions() {
        let source = "qubit q;\n\n  h q;";
        let program = parse(source).unwrap();
        let pos = program.statements[1].position;
        assert_eq!((pos.line, pos.column), (3, 3));
    }

    #[test]
    fn test_error_reports_line_and_column() {
        let source = "qubit[2] q;\nh q[0]\ncx q[0], q[1];";
        let err = parse(source).unwrap_err();
        match err {
            ParseError::UnexpectedToken {
                position,
                expected,
                found,
            } => {
                assert_eq!(position.line, 3);
                assert_eq!(position.column, 1);
                assert_eq!(expected, ";");
                assert_eq!(found, "cx");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unexpected_eof() {
        let err = parse("qubit[2] q").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }

    #[test]
    fn test_lexer_error_position() {
        let err = parse("qubit q;\nh $q;").unwrap_err();
        assert!(matches!(err, ParseError::LexerError { .. }));
        assert_eq!(err.position().line, 2);
        assert_eq!(err.position().column, 3);
    }

    #[test]
    fn test_index_overflow() {
        let err = parse("qubit[99999999999] q;").unwrap_err();
        assert!(matches!(err, ParseError::IntegerOverflow { .. }));
    }
}
