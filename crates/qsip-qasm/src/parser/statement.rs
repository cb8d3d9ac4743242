//! Statement parsing.

use super::Parser;
use crate::ast::{BitRef, Expression, GateCall, QubitRef, Spanned, Statement};
use crate::error::ParseResult;
use crate::lexer::Token;

impl Parser<'_> {
    /// Parse a statement, recording where it starts.
    pub(super) fn parse_statement(&mut self) -> ParseResult<Spanned<Statement>> {
        let position = self.position();
        let token = self
            .peek()
            .cloned()
            .ok_or_else(|| self.unexpected("statement"))?;

        let node = match token {
            Token::Include => self.parse_include(),
            Token::Qubit => self.parse_qubit_decl(),
            Token::Bit => self.parse_bit_decl(),
            Token::Qreg => self.parse_legacy_decl(true),
            Token::Creg => self.parse_legacy_decl(false),
            Token::Const
            | Token::Input
            | Token::Output
            | Token::Int
            | Token::Uint
            | Token::Float
            | Token::Angle
            | Token::Bool => self.parse_classical_decl(),
            Token::Measure => self.parse_measure(),
            Token::Reset => self.parse_reset(),
            Token::Barrier => self.parse_barrier(),
            Token::Delay => self.parse_delay(),
            Token::If => self.parse_if(),
            Token::For => self.parse_for(),
            Token::While => self.parse_while(),
            Token::Gate => self.parse_gate_def(),
            Token::Identifier(_) => self.parse_identifier_statement(),
            _ => Err(self.unexpected("statement")),
        }?;

        Ok(Spanned { node, position })
    }

    /// Parse include statement.
    fn parse_include(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Include)?;
        let path = match self.peek() {
            Some(Token::StringLiteral(s)) => s.clone(),
            _ => return Err(self.unexpected("string literal")),
        };
        self.advance();
        self.expect(Token::Semicolon)?;
        Ok(Statement::Include(path))
    }

    /// Parse an optional `[n]` size designator.
    fn parse_designator(&mut self) -> ParseResult<Option<u32>> {
        if self.consume(&Token::LBracket) {
            let size = self.parse_index()?;
            self.expect(Token::RBracket)?;
            Ok(Some(size))
        } else {
            Ok(None)
        }
    }

    /// Parse qubit declaration.
    fn parse_qubit_decl(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Qubit)?;
        let size = self.parse_designator()?;
        let name = self.parse_identifier()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::QubitDecl { name, size })
    }

    /// Parse bit declaration.
    fn parse_bit_decl(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Bit)?;
        let size = self.parse_designator()?;
        let name = self.parse_identifier()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::BitDecl { name, size })
    }

    /// Parse `qreg name[n];` or `creg name[n];`.
    fn parse_legacy_decl(&mut self, quantum: bool) -> ParseResult<Statement> {
        self.advance();
        let name = self.parse_identifier()?;
        let size = self.parse_designator()?;
        self.expect(Token::Semicolon)?;
        Ok(if quantum {
            Statement::QubitDecl { name, size }
        } else {
            Statement::BitDecl { name, size }
        })
    }

    /// Parse a classical scalar declaration: `[const|input|output] type[width]? name [= expr];`
    fn parse_classical_decl(&mut self) -> ParseResult<Statement> {
        while self.consume(&Token::Const)
            || self.consume(&Token::Input)
            || self.consume(&Token::Output)
        {}

        let ty = match self.peek() {
            Some(t @ (Token::Int | Token::Uint | Token::Float | Token::Angle | Token::Bool)) => {
                t.to_string()
            }
            _ => return Err(self.unexpected("type")),
        };
        self.advance();

        if self.consume(&Token::LBracket) {
            self.parse_expression()?;
            self.expect(Token::RBracket)?;
        }

        let name = self.parse_identifier()?;
        if self.consume(&Token::Eq) {
            self.parse_expression()?;
        }
        self.expect(Token::Semicolon)?;

        Ok(Statement::ClassicalDecl { ty, name })
    }

    /// Parse measure statement.
    fn parse_measure(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Measure)?;

        let qubits = self.parse_qubit_refs()?;

        // Arrow syntax: measure q -> c;
        let bits = if self.consume(&Token::Arrow) {
            self.parse_bit_refs()?
        } else {
            vec![]
        };

        self.expect(Token::Semicolon)?;

        Ok(Statement::Measure { qubits, bits })
    }

    /// Parse reset statement.
    fn parse_reset(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Reset)?;
        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Reset { qubits })
    }

    /// Parse barrier statement.
    fn parse_barrier(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Barrier)?;
        let qubits = if self.check(&Token::Semicolon) {
            vec![]
        } else {
            self.parse_qubit_refs()?
        };
        self.expect(Token::Semicolon)?;
        Ok(Statement::Barrier { qubits })
    }

    /// Parse `delay[duration] qubits;`.
    fn parse_delay(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Delay)?;
        self.expect(Token::LBracket)?;
        let duration = self.parse_expression()?;
        self.expect(Token::RBracket)?;
        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Semicolon)?;
        Ok(Statement::Delay { duration, qubits })
    }

    /// Parse if statement.
    fn parse_if(&mut self) -> ParseResult<Statement> {
        self.expect(Token::If)?;
        self.expect(Token::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(Token::RParen)?;

        let then_body = self.parse_block_or_statement()?;

        let else_body = if self.consume(&Token::Else) {
            Some(self.parse_block_or_statement()?)
        } else {
            None
        };

        Ok(Statement::If {
            condition,
            then_body,
            else_body,
        })
    }

    /// Parse `for [type] var in iterable body`.
    fn parse_for(&mut self) -> ParseResult<Statement> {
        self.expect(Token::For)?;
        if matches!(self.peek(), Some(Token::Int | Token::Uint)) {
            self.advance();
            if self.consume(&Token::LBracket) {
                self.parse_expression()?;
                self.expect(Token::RBracket)?;
            }
        }
        let variable = self.parse_identifier()?;
        self.expect(Token::In)?;

        let iterable = if self.consume(&Token::LBracket) {
            let start = self.parse_expression()?;
            self.expect(Token::Colon)?;
            let second = self.parse_expression()?;
            let (step, end) = if self.consume(&Token::Colon) {
                (Some(Box::new(second)), self.parse_expression()?)
            } else {
                (None, second)
            };
            self.expect(Token::RBracket)?;
            Expression::Range {
                start: Box::new(start),
                end: Box::new(end),
                step,
            }
        } else {
            self.parse_expression()?
        };

        let body = self.parse_block_or_statement()?;

        Ok(Statement::For {
            variable,
            iterable,
            body,
        })
    }

    /// Parse `while (cond) body`.
    fn parse_while(&mut self) -> ParseResult<Statement> {
        self.expect(Token::While)?;
        self.expect(Token::LParen)?;
        let condition = self.parse_expression()?;
        self.expect(Token::RParen)?;
        let body = self.parse_block_or_statement()?;
        Ok(Statement::While { condition, body })
    }

    /// Parse gate definition.
    fn parse_gate_def(&mut self) -> ParseResult<Statement> {
        self.expect(Token::Gate)?;
        let name = self.parse_identifier()?;

        let params = if self.consume(&Token::LParen) {
            let p = if self.check(&Token::RParen) {
                vec![]
            } else {
                self.parse_identifier_list()?
            };
            self.expect(Token::RParen)?;
            p
        } else {
            vec![]
        };

        let qubits = self.parse_identifier_list()?;
        let body = self.parse_block()?;

        Ok(Statement::GateDef {
            name,
            params,
            qubits,
            body,
        })
    }

    /// Parse statement starting with identifier (gate call or assignment).
    fn parse_identifier_statement(&mut self) -> ParseResult<Statement> {
        // `c = ...` or `c[0] = ...`
        if matches!(self.peek_nth(1), Some(Token::Eq | Token::LBracket)) {
            let target = self.parse_identifier()?;
            return self.parse_assignment(target);
        }

        let name = self.parse_identifier()?;
        self.parse_gate_call(name)
    }

    /// Parse assignment statement.
    fn parse_assignment(&mut self, target: String) -> ParseResult<Statement> {
        let index = if self.consume(&Token::LBracket) {
            let idx = self.parse_index()?;
            self.expect(Token::RBracket)?;
            Some(idx)
        } else {
            None
        };

        self.expect(Token::Eq)?;

        // `c = measure q;`
        if self.consume(&Token::Measure) {
            let qubits = self.parse_qubit_refs()?;
            self.expect(Token::Semicolon)?;

            let bits = match index {
                Some(idx) => vec![BitRef::single(target, idx)],
                None => vec![BitRef::register(target)],
            };

            return Ok(Statement::Measure { qubits, bits });
        }

        let value = self.parse_expression()?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::Assignment {
            target,
            index,
            value,
        })
    }

    /// Parse gate call.
    fn parse_gate_call(&mut self, name: String) -> ParseResult<Statement> {
        let params = if self.consume(&Token::LParen) {
            let p = self.parse_expression_list()?;
            self.expect(Token::RParen)?;
            p
        } else {
            vec![]
        };

        let qubits = self.parse_qubit_refs()?;
        self.expect(Token::Semicolon)?;

        Ok(Statement::Gate(GateCall {
            name,
            params,
            qubits,
        }))
    }

    /// Parse a braced block.
    fn parse_block(&mut self) -> ParseResult<Vec<Spanned<Statement>>> {
        self.expect(Token::LBrace)?;
        let mut stmts = Vec::new();
        while !self.check(&Token::RBrace) {
            if self.is_eof() {
                return Err(self.unexpected("}"));
            }
            stmts.push(self.parse_statement()?);
        }
        self.expect(Token::RBrace)?;
        Ok(stmts)
    }

    /// Parse a block or single statement.
    pub(super) fn parse_block_or_statement(&mut self) -> ParseResult<Vec<Spanned<Statement>>> {
        if self.check(&Token::LBrace) {
            self.parse_block()
        } else {
            Ok(vec![self.parse_statement()?])
        }
    }

    /// Parse qubit references.
    fn parse_qubit_refs(&mut self) -> ParseResult<Vec<QubitRef>> {
        let mut refs = vec![self.parse_qubit_ref()?];
        while self.consume(&Token::Comma) {
            refs.push(self.parse_qubit_ref()?);
        }
        Ok(refs)
    }

    /// Parse a single qubit reference.
    fn parse_qubit_ref(&mut self) -> ParseResult<QubitRef> {
        let register = self.parse_identifier()?;
        let index = self.parse_designator()?;
        Ok(QubitRef { register, index })
    }

    /// Parse bit references.
    fn parse_bit_refs(&mut self) -> ParseResult<Vec<BitRef>> {
        let mut refs = vec![self.parse_bit_ref()?];
        while self.consume(&Token::Comma) {
            refs.push(self.parse_bit_ref()?);
        }
        Ok(refs)
    }

    /// Parse a single bit reference.
    fn parse_bit_ref(&mut self) -> ParseResult<BitRef> {
        let register = self.parse_identifier()?;
        let index = self.parse_designator()?;
        Ok(BitRef { register, index })
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use crate::ast::{Expression, Statement};

    fn statements(source: &str) -> Vec<Statement> {
        parse(source)
            .unwrap()
            .statements
            .into_iter()
            .map(|s| s.node)
            .collect()
    }

    #[test]
    fn test_legacy_registers() {
        let stmts = statements("qreg q[3]; creg c[3];");
        assert_eq!(
            stmts[0],
            Statement::QubitDecl {
                name: "q".into(),
                size: Some(3)
            }
        );
        assert_eq!(
            stmts[1],
            Statement::BitDecl {
                name: "c".into(),
                size: Some(3)
            }
        );
    }

    #[test]
    fn test_measure_forms() {
        let stmts = statements(
            "qubit[2] q; bit[2] c; c[1] = measure q[0]; measure q[1] -> c[0]; measure q;",
        );
        match &stmts[2] {
            Statement::Measure { qubits, bits } => {
                assert_eq!(qubits[0].index, Some(0));
                assert_eq!(bits[0].index, Some(1));
            }
            other => panic!("expected measure, got {other:?}"),
        }
        assert!(matches!(&stmts[3], Statement::Measure { bits, .. } if bits[0].index == Some(0)));
        assert!(matches!(&stmts[4], Statement::Measure { bits, .. } if bits.is_empty()));
    }

    #[test]
    fn test_if_with_block_and_else() {
        let stmts = statements(
            "qubit q; bit c; c = measure q; if (c == 1) { x q; } else z q;",
        );
        match &stmts[3] {
            Statement::If {
                condition,
                then_body,
                else_body,
            } => {
                assert!(matches!(condition, Expression::BinOp { .. }));
                assert_eq!(then_body.len(), 1);
                assert_eq!(else_body.as_ref().map(Vec::len), Some(1));
            }
            other => panic!("expected if, got {other:?}"),
        }
    }

    #[test]
    fn test_loops_parse() {
        let stmts = statements(
            "qubit[2] q; for int i in [0:2:10] { h q[0]; } while (true) { x q[1]; }",
        );
        match &stmts[1] {
            Statement::For { variable, iterable, .. } => {
                assert_eq!(variable, "i");
                assert!(
                    matches!(iterable, Expression::Range { step: Some(_), .. }),
                    "{iterable:?}"
                );
            }
            other => panic!("expected for, got {other:?}"),
        }
        assert!(matches!(stmts[2], Statement::While { .. }));
    }

    #[test]
    fn test_gate_definition() {
        let stmts = statements("gate bell a, b { h a; cx a, b; }");
        match &stmts[0] {
            Statement::GateDef {
                name, qubits, body, ..
            } => {
                assert_eq!(name, "bell");
                assert_eq!(qubits.len(), 2);
                assert_eq!(body.len(), 2);
            }
            other => panic!("expected gate def, got {other:?}"),
        }
    }

    #[test]
    fn test_classical_declarations() {
        let stmts = statements("input float[64] theta; const int n = 3; qubit q;");
        assert_eq!(
            stmts[0],
            Statement::ClassicalDecl {
                ty: "float".into(),
                name: "theta".into()
            }
        );
        assert!(matches!(stmts[1], Statement::ClassicalDecl { .. }));
    }

    #[test]
    fn test_delay_and_barrier() {
        let stmts = statements("qubit[2] q; delay[100] q[0]; barrier; barrier q[0], q[1];");
        assert!(matches!(stmts[1], Statement::Delay { .. }));
        assert!(matches!(&stmts[2], Statement::Barrier { qubits } if qubits.is_empty()));
        assert!(matches!(&stmts[3], Statement::Barrier { qubits } if qubits.len() == 2));
    }

    #[test]
    fn test_unterminated_block() {
        assert!(parse("qubit q; if (c) { x q;").is_err());
    }
}
