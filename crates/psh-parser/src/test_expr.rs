//! `[[ … ]]` enhanced test expressions.
//!
//! Precedence: `||` < `&&` < `!` / parentheses / primaries. Operands are
//! plain words; `<` and `>` arrive as redirect tokens and are reinterpreted
//! as string comparisons here.

use psh_ast::*;
use psh_token::TokenKind;

use crate::error::{ParseError, Result, Terminator};
use crate::parser::Parser;

const UNARY_OPS: &[&str] = &[
    "-b", "-c", "-d", "-e", "-f", "-g", "-h", "-k", "-p", "-r", "-s", "-t", "-u", "-w", "-x",
    "-G", "-L", "-N", "-O", "-S", "-z", "-n", "-o", "-v",
];

const BINARY_WORD_OPS: &[&str] = &[
    "==", "=", "!=", "=~", "-eq", "-ne", "-lt", "-le", "-gt", "-ge", "-nt", "-ot", "-ef",
];

impl Parser {
    pub(crate) fn parse_enhanced_test(&mut self) -> Result<CompoundCommand> {
        let start = self.peek().token.span.start;
        self.advance(); // [[
        let expression = self.parse_test_or()?;
        self.expect(
            TokenKind::DoubleRBracket,
            "DOUBLE_RBRACKET",
            Some(Terminator::DoubleRBracket),
        )?;
        let redirects = self.parse_trailing_redirects()?;
        Ok(CompoundCommand::Test(EnhancedTestStatement {
            expression,
            redirects,
            span: self.span_from(start),
        }))
    }

    fn parse_test_or(&mut self) -> Result<TestExpr> {
        let start = self.peek().token.span.start;
        let mut left = self.parse_test_and()?;
        while self.eat(TokenKind::OrOr) {
            let right = self.parse_test_and()?;
            left = TestExpr::Compound(CompoundTestExpression {
                operator: AndOrOp::Or,
                left: Box::new(left),
                right: Box::new(right),
                span: self.span_from(start),
            });
        }
        Ok(left)
    }

    fn parse_test_and(&mut self) -> Result<TestExpr> {
        let start = self.peek().token.span.start;
        let mut left = self.parse_test_primary()?;
        while self.eat(TokenKind::AndAnd) {
            let right = self.parse_test_primary()?;
            left = TestExpr::Compound(CompoundTestExpression {
                operator: AndOrOp::And,
                left: Box::new(left),
                right: Box::new(right),
                span: self.span_from(start),
            });
        }
        Ok(left)
    }

    fn parse_test_primary(&mut self) -> Result<TestExpr> {
        let start = self.peek().token.span.start;

        if self.eat(TokenKind::Bang) {
            let inner = self.parse_test_primary()?;
            return Ok(TestExpr::Negated(NegatedTestExpression {
                expression: Box::new(inner),
                span: self.span_from(start),
            }));
        }
        if self.eat(TokenKind::LParen) {
            let inner = self.parse_test_or()?;
            self.expect(TokenKind::RParen, "')'", Some(Terminator::DoubleRBracket))?;
            return Ok(inner);
        }

        // Unary operator with a following operand.
        if self.peek_kind() == TokenKind::Word
            && UNARY_OPS.contains(&self.peek().token.value.as_ref())
            && is_test_operand_kind(self.peek_kind_at(1))
        {
            let operator = self.advance().token.value.to_string();
            let operand = self.parse_test_operand()?;
            return Ok(TestExpr::Unary(UnaryTestExpression {
                operator,
                operand,
                span: self.span_from(start),
            }));
        }

        let left = self.parse_test_operand()?;

        let operator = match self.peek_kind() {
            TokenKind::Word if BINARY_WORD_OPS.contains(&self.peek().token.value.as_ref()) => {
                Some(self.advance().token.value.to_string())
            }
            TokenKind::Equals => {
                self.advance();
                Some("=".to_string())
            }
            TokenKind::Less => {
                self.advance();
                Some("<".to_string())
            }
            TokenKind::Great => {
                self.advance();
                Some(">".to_string())
            }
            _ => None,
        };

        match operator {
            Some(operator) => {
                let right = self.parse_test_operand()?;
                Ok(TestExpr::Binary(BinaryTestExpression {
                    left,
                    operator,
                    right,
                    span: self.span_from(start),
                }))
            }
            // A bare word tests for a non-empty string.
            None => Ok(TestExpr::Unary(UnaryTestExpression {
                operator: "-n".to_string(),
                operand: left,
                span: self.span_from(start),
            })),
        }
    }

    fn parse_test_operand(&mut self) -> Result<String> {
        if is_test_operand_kind(self.peek_kind()) {
            Ok(self.parse_word()?.text)
        } else {
            // Awaiting more input: `[[ $x &&` at end of line reads on.
            Err(ParseError::Incomplete {
                awaiting: Terminator::TestOperand,
                found: self.error_token(),
            })
        }
    }
}

fn is_test_operand_kind(kind: TokenKind) -> bool {
    kind.is_word_like() || kind.is_keyword()
}
