//! Compound commands: conditionals, loops, case, groups, functions.

use psh_ast::*;
use psh_token::TokenKind;

use crate::error::{ParseError, Result, Terminator};
use crate::parser::Parser;

impl Parser {
    pub(crate) fn parse_if(&mut self) -> Result<CompoundCommand> {
        let start = self.peek().token.span.start;
        self.advance(); // if

        let condition =
            self.parse_statement_list(&[TokenKind::Then], Some(Terminator::Then))?;
        self.expect(TokenKind::Then, "THEN", Some(Terminator::Then))?;
        let then_part = self.parse_statement_list(
            &[TokenKind::Elif, TokenKind::Else, TokenKind::Fi],
            Some(Terminator::Fi),
        )?;

        let mut elif_parts = Vec::new();
        while self.eat(TokenKind::Elif) {
            let elif_cond =
                self.parse_statement_list(&[TokenKind::Then], Some(Terminator::Then))?;
            self.expect(TokenKind::Then, "THEN", Some(Terminator::Then))?;
            let elif_then = self.parse_statement_list(
                &[TokenKind::Elif, TokenKind::Else, TokenKind::Fi],
                Some(Terminator::Fi),
            )?;
            elif_parts.push((elif_cond, elif_then));
        }

        let else_part = if self.eat(TokenKind::Else) {
            Some(self.parse_statement_list(&[TokenKind::Fi], Some(Terminator::Fi))?)
        } else {
            None
        };
        self.expect(TokenKind::Fi, "FI", Some(Terminator::Fi))?;
        let redirects = self.parse_trailing_redirects()?;

        Ok(CompoundCommand::If(IfConditional {
            condition,
            then_part,
            elif_parts,
            else_part,
            redirects,
            span: self.span_from(start),
        }))
    }

    /// `while` and `until` share one node; `until` flips the condition's
    /// meaning at execution time.
    pub(crate) fn parse_while_like(&mut self, until: bool) -> Result<CompoundCommand> {
        let start = self.peek().token.span.start;
        self.advance(); // while / until

        let condition = self.parse_statement_list(&[TokenKind::Do], Some(Terminator::Do))?;
        self.expect(TokenKind::Do, "DO", Some(Terminator::Do))?;
        let body = self.parse_statement_list(&[TokenKind::Done], Some(Terminator::Done))?;
        self.expect(TokenKind::Done, "DONE", Some(Terminator::Done))?;
        let redirects = self.parse_trailing_redirects()?;

        Ok(CompoundCommand::While(WhileLoop {
            condition,
            body,
            until,
            redirects,
            span: self.span_from(start),
        }))
    }

    pub(crate) fn parse_for(&mut self) -> Result<CompoundCommand> {
        let start = self.peek().token.span.start;
        self.advance(); // for

        if self.at(TokenKind::DoubleLParen) {
            return self.parse_c_style_for(start);
        }

        let variable = match self.peek_kind() {
            TokenKind::Word => self.advance().token.value.to_string(),
            _ => {
                return Err(ParseError::expected(
                    "loop variable",
                    self.error_token(),
                    vec!["name".into()],
                ));
            }
        };

        let mut items = Vec::new();
        if self.eat(TokenKind::In) {
            while self.peek_kind().is_word_like() || self.peek_kind().is_keyword() {
                items.push(self.parse_word()?.text);
            }
        }
        self.eat(TokenKind::Semicolon);
        self.skip_newlines();
        self.expect(TokenKind::Do, "DO", Some(Terminator::Do))?;
        let body = self.parse_statement_list(&[TokenKind::Done], Some(Terminator::Done))?;
        self.expect(TokenKind::Done, "DONE", Some(Terminator::Done))?;
        let redirects = self.parse_trailing_redirects()?;

        Ok(CompoundCommand::For(ForLoop {
            variable,
            items,
            body,
            redirects,
            span: self.span_from(start),
        }))
    }

    fn parse_c_style_for(&mut self, start: usize) -> Result<CompoundCommand> {
        self.advance(); // ((
        let header = if self.at(TokenKind::Word) {
            self.advance().token.value.to_string()
        } else {
            String::new()
        };
        self.expect(TokenKind::DoubleRParen, "DOUBLE_RPAREN", Some(Terminator::DoubleRParen))?;

        let mut sections = header.splitn(3, ';').map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() { None } else { Some(trimmed.to_string()) }
        });
        let init_expr = sections.next().flatten();
        let condition_expr = sections.next().flatten();
        let update_expr = sections.next().flatten();

        self.eat(TokenKind::Semicolon);
        self.skip_newlines();
        // A missing `do` is tolerated here: the next command list is taken
        // as the body.
        self.eat(TokenKind::Do);
        let body = self.parse_statement_list(&[TokenKind::Done], Some(Terminator::Done))?;
        self.expect(TokenKind::Done, "DONE", Some(Terminator::Done))?;
        let redirects = self.parse_trailing_redirects()?;

        Ok(CompoundCommand::CStyleFor(CStyleForLoop {
            init_expr,
            condition_expr,
            update_expr,
            body,
            redirects,
            span: self.span_from(start),
        }))
    }

    pub(crate) fn parse_case(&mut self) -> Result<CompoundCommand> {
        let start = self.peek().token.span.start;
        self.advance(); // case

        let expr = if self.peek_kind().is_word_like() {
            self.parse_word()?.text
        } else {
            return Err(ParseError::expected(
                "case expression",
                self.error_token(),
                vec!["word".into()],
            ));
        };
        self.skip_newlines();
        self.expect(TokenKind::In, "IN", Some(Terminator::In))?;

        let mut items = Vec::new();
        loop {
            self.skip_newlines();
            if self.at(TokenKind::Esac) {
                break;
            }
            if self.at(TokenKind::Eof) {
                return Err(ParseError::Incomplete { awaiting: Terminator::Esac, found: None });
            }
            items.push(self.parse_case_item()?);
        }
        self.expect(TokenKind::Esac, "ESAC", Some(Terminator::Esac))?;
        let redirects = self.parse_trailing_redirects()?;

        Ok(CompoundCommand::Case(CaseConditional {
            expr,
            items,
            redirects,
            span: self.span_from(start),
        }))
    }

    fn parse_case_item(&mut self) -> Result<CaseItem> {
        let start = self.peek().token.span.start;
        self.eat(TokenKind::LParen); // optional `( pattern )` form

        let mut patterns = Vec::new();
        loop {
            let kind = self.peek_kind();
            if kind.is_word_like() || kind.is_keyword() {
                patterns.push(CasePattern { pattern: self.parse_word()?.text });
            } else {
                return Err(ParseError::expected(
                    "case pattern",
                    self.error_token(),
                    vec!["pattern".into()],
                ));
            }
            if !self.eat(TokenKind::Pipe) {
                break;
            }
        }
        self.expect(TokenKind::RParen, "')'", Some(Terminator::Esac))?;

        let commands = self.parse_statement_list(
            &[
                TokenKind::DoubleSemicolon,
                TokenKind::SemiAmp,
                TokenKind::DoubleSemicolonAmp,
                TokenKind::Esac,
            ],
            Some(Terminator::Esac),
        )?;

        let terminator = match self.peek_kind() {
            TokenKind::DoubleSemicolon => {
                self.advance();
                CaseTerminator::Normal
            }
            TokenKind::SemiAmp => {
                self.advance();
                CaseTerminator::FallThrough
            }
            TokenKind::DoubleSemicolonAmp => {
                self.advance();
                CaseTerminator::ContinueMatching
            }
            // The last item may omit its terminator before `esac`.
            _ => CaseTerminator::Normal,
        };

        Ok(CaseItem { patterns, commands, terminator, span: self.span_from(start) })
    }

    pub(crate) fn parse_select(&mut self) -> Result<CompoundCommand> {
        let start = self.peek().token.span.start;
        self.advance(); // select

        let variable = match self.peek_kind() {
            TokenKind::Word => self.advance().token.value.to_string(),
            _ => {
                return Err(ParseError::expected(
                    "select variable",
                    self.error_token(),
                    vec!["name".into()],
                ));
            }
        };
        let mut items = Vec::new();
        if self.eat(TokenKind::In) {
            while self.peek_kind().is_word_like() || self.peek_kind().is_keyword() {
                items.push(self.parse_word()?.text);
            }
        }
        self.eat(TokenKind::Semicolon);
        self.skip_newlines();
        self.expect(TokenKind::Do, "DO", Some(Terminator::Do))?;
        let body = self.parse_statement_list(&[TokenKind::Done], Some(Terminator::Done))?;
        self.expect(TokenKind::Done, "DONE", Some(Terminator::Done))?;
        let redirects = self.parse_trailing_redirects()?;

        Ok(CompoundCommand::Select(SelectLoop {
            variable,
            items,
            body,
            redirects,
            span: self.span_from(start),
        }))
    }

    pub(crate) fn parse_brace_group(&mut self) -> Result<CompoundCommand> {
        let start = self.peek().token.span.start;
        self.advance(); // {
        let body =
            self.parse_statement_list(&[TokenKind::RBrace], Some(Terminator::RightBrace))?;
        self.expect(
            TokenKind::RBrace,
            "'}' to end compound command",
            Some(Terminator::RightBrace),
        )?;
        let redirects = self.parse_trailing_redirects()?;
        Ok(CompoundCommand::BraceGroup(BraceGroup {
            body,
            redirects,
            span: self.span_from(start),
        }))
    }

    pub(crate) fn parse_subshell(&mut self) -> Result<CompoundCommand> {
        let start = self.peek().token.span.start;
        self.advance(); // (
        let body =
            self.parse_statement_list(&[TokenKind::RParen], Some(Terminator::RightParen))?;
        self.expect(TokenKind::RParen, "RPAREN", Some(Terminator::RightParen))?;
        let redirects = self.parse_trailing_redirects()?;
        Ok(CompoundCommand::Subshell(SubshellGroup {
            body,
            redirects,
            span: self.span_from(start),
        }))
    }

    pub(crate) fn parse_arith_eval(&mut self) -> Result<CompoundCommand> {
        let start = self.peek().token.span.start;
        self.advance(); // ((
        let expression = if self.at(TokenKind::Word) {
            self.advance().token.value.to_string()
        } else {
            String::new()
        };
        self.expect(TokenKind::DoubleRParen, "DOUBLE_RPAREN", Some(Terminator::DoubleRParen))?;
        let redirects = self.parse_trailing_redirects()?;
        Ok(CompoundCommand::Arithmetic(ArithmeticEvaluation {
            expression,
            redirects,
            span: self.span_from(start),
        }))
    }

    /// Accepts `name() …`, `function name …`, and `function name() …`.
    /// The body is a brace group.
    pub(crate) fn parse_function_def(&mut self) -> Result<FunctionDef> {
        let start = self.peek().token.span.start;

        let name = if self.eat(TokenKind::Function) {
            let name = match self.peek_kind() {
                TokenKind::Word => self.advance().token.value.to_string(),
                _ => {
                    return Err(ParseError::expected(
                        "function name",
                        self.error_token(),
                        vec!["name".into()],
                    ));
                }
            };
            if self.eat(TokenKind::LParen) {
                self.expect(TokenKind::RParen, "')'", None)?;
            }
            name
        } else {
            let name = self.advance().token.value.to_string();
            self.expect(TokenKind::LParen, "'('", None)?;
            self.expect(TokenKind::RParen, "')'", None)?;
            name
        };

        self.skip_newlines();
        self.expect(TokenKind::LBrace, "'{'", Some(Terminator::RightBrace))?;
        let body =
            self.parse_statement_list(&[TokenKind::RBrace], Some(Terminator::RightBrace))?;
        self.expect(
            TokenKind::RBrace,
            "'}' to end compound command",
            Some(Terminator::RightBrace),
        )?;

        Ok(FunctionDef { name, body, span: self.span_from(start) })
    }
}
