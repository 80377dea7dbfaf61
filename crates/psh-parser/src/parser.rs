//! Parser cursor, statement/pipeline structure, simple commands, words,
//! and redirections. Compound commands and `[[ ]]` expressions live in
//! sibling modules.

use psh_ast::*;
use psh_position_tracking::ByteSpan;
use psh_token::{AnnotatedToken, Token, TokenKind};

use crate::error::{ParseError, Result, Terminator};

/// Hand-written recursive-descent parser over an annotated token stream.
///
/// The parser never recovers: the first violation aborts the parse. Callers
/// that drive interactive input inspect [`ParseError::is_incomplete`] to
/// decide whether the buffer simply needs more lines.
pub struct Parser {
    pub(crate) tokens: Vec<AnnotatedToken>,
    pub(crate) pos: usize,
}

impl Parser {
    /// Builds a parser; a trailing `Eof` token is guaranteed.
    pub fn new(mut tokens: Vec<AnnotatedToken>) -> Self {
        let needs_eof = tokens.last().map(|t| t.kind() != TokenKind::Eof).unwrap_or(true);
        if needs_eof {
            let end = tokens.last().map(|t| t.token.span.end).unwrap_or(0);
            tokens.push(AnnotatedToken {
                token: Token::new(TokenKind::Eof, "", ByteSpan::empty(end)),
                followed_by_whitespace: true,
                in_case_body: false,
            });
        }
        Parser { tokens, pos: 0 }
    }

    // ===== cursor =====

    pub(crate) fn peek(&self) -> &AnnotatedToken {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    pub(crate) fn peek_kind(&self) -> TokenKind {
        self.peek().kind()
    }

    pub(crate) fn peek_kind_at(&self, ahead: usize) -> TokenKind {
        self.tokens[(self.pos + ahead).min(self.tokens.len() - 1)].kind()
    }

    pub(crate) fn advance(&mut self) -> AnnotatedToken {
        let token = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes a token of `kind` or fails. With `awaiting` set, end of
    /// input turns into the incomplete-parse error instead of a plain
    /// mismatch.
    pub(crate) fn expect(
        &mut self,
        kind: TokenKind,
        what: &str,
        awaiting: Option<Terminator>,
    ) -> Result<AnnotatedToken> {
        if self.at(kind) {
            return Ok(self.advance());
        }
        if self.at(TokenKind::Eof) {
            if let Some(awaiting) = awaiting {
                return Err(ParseError::Incomplete { awaiting, found: None });
            }
        }
        Err(ParseError::expected(what, self.error_token(), vec![what.to_string()]))
    }

    pub(crate) fn skip_newlines(&mut self) {
        while self.at(TokenKind::Newline) {
            self.advance();
        }
    }

    /// The current token for error reporting; `None` at end of input.
    pub(crate) fn error_token(&self) -> Option<Token> {
        if self.at(TokenKind::Eof) { None } else { Some(self.peek().token.clone()) }
    }

    pub(crate) fn span_from(&self, start: usize) -> Option<ByteSpan> {
        let end = if self.pos > 0 { self.tokens[self.pos - 1].token.span.end } else { start };
        Some(ByteSpan::new(start, end.max(start)))
    }

    // ===== program structure =====

    /// Parses a whole buffer into a `TopLevel`: function definitions
    /// interleaved with statement groups.
    pub fn parse_program(&mut self) -> Result<TopLevel> {
        let start = self.peek().token.span.start;
        let mut items = Vec::new();
        let mut pending: Vec<AndOrList> = Vec::new();
        let mut pending_start = start;

        loop {
            self.skip_newlines();
            if self.at(TokenKind::Eof) {
                break;
            }
            if self.at_function_def() {
                flush_statements(&mut items, &mut pending, self.span_from(pending_start));
                let function = self.parse_function_def()?;
                items.push(TopLevelItem::Function(function));
                if matches!(
                    self.peek_kind(),
                    TokenKind::Semicolon | TokenKind::Newline | TokenKind::Amp
                ) {
                    self.advance();
                }
                pending_start = self.peek().token.span.start;
                continue;
            }
            if pending.is_empty() {
                pending_start = self.peek().token.span.start;
            }
            let mut list = self.parse_and_or_list()?;
            self.finish_statement(&mut list, &[])?;
            pending.push(list);
        }
        flush_statements(&mut items, &mut pending, self.span_from(pending_start));

        let span = self.span_from(start);
        Ok(TopLevel { items, span })
    }

    /// True when the cursor sits on a function definition: either the
    /// `function` keyword or the `name()` form.
    pub(crate) fn at_function_def(&self) -> bool {
        match self.peek_kind() {
            TokenKind::Function => true,
            TokenKind::Word => {
                self.peek_kind_at(1) == TokenKind::LParen
                    && self.peek_kind_at(2) == TokenKind::RParen
            }
            _ => false,
        }
    }

    /// Parses statements until one of `stop` appears at command position.
    /// Hitting end of input with `awaiting` set raises the incomplete
    /// error so the caller can read more lines.
    pub(crate) fn parse_statement_list(
        &mut self,
        stop: &[TokenKind],
        awaiting: Option<Terminator>,
    ) -> Result<StatementList> {
        let start = self.peek().token.span.start;
        let mut statements = Vec::new();
        loop {
            self.skip_newlines();
            let kind = self.peek_kind();
            if stop.contains(&kind) {
                break;
            }
            if kind == TokenKind::Eof {
                match awaiting {
                    Some(awaiting) => {
                        return Err(ParseError::Incomplete { awaiting, found: None });
                    }
                    None => break,
                }
            }
            let mut list = self.parse_and_or_list()?;
            self.finish_statement(&mut list, stop)?;
            statements.push(list);
        }
        Ok(StatementList { statements, span: self.span_from(start) })
    }

    /// Consumes the separator after an and/or list: `;`, `&` (background),
    /// or a newline. A stop token or end of input needs no separator. Case
    /// terminators outside their case body are rejected here with the
    /// precise token in the message.
    fn finish_statement(&mut self, list: &mut AndOrList, stop: &[TokenKind]) -> Result<()> {
        match self.peek_kind() {
            TokenKind::Semicolon | TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Amp => {
                mark_background(list);
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            kind if stop.contains(&kind) => Ok(()),
            TokenKind::DoubleSemicolon | TokenKind::SemiAmp | TokenKind::DoubleSemicolonAmp => {
                let found = self.peek().token.clone();
                Err(ParseError::unexpected(
                    format!("Unexpected token '{}'", found.value),
                    Some(found),
                ))
            }
            _ => {
                let found = self.peek().token.clone();
                Err(ParseError::expected(
                    "command separator",
                    Some(found),
                    vec![";".into(), "&".into(), "newline".into()],
                ))
            }
        }
    }

    pub(crate) fn parse_and_or_list(&mut self) -> Result<AndOrList> {
        let start = self.peek().token.span.start;
        let mut pipelines = vec![self.parse_pipeline()?];
        let mut operators = Vec::new();
        loop {
            let op = match self.peek_kind() {
                TokenKind::AndAnd => AndOrOp::And,
                TokenKind::OrOr => AndOrOp::Or,
                _ => break,
            };
            self.advance();
            self.skip_newlines();
            operators.push(op);
            pipelines.push(self.parse_pipeline()?);
        }
        Ok(AndOrList { pipelines, operators, span: self.span_from(start) })
    }

    pub(crate) fn parse_pipeline(&mut self) -> Result<Pipeline> {
        let start = self.peek().token.span.start;
        let negated = self.eat(TokenKind::Bang);
        let mut commands = vec![self.parse_command()?];
        while self.eat(TokenKind::Pipe) {
            self.skip_newlines();
            commands.push(self.parse_command()?);
        }
        Ok(Pipeline { commands, negated, span: self.span_from(start) })
    }

    pub(crate) fn parse_command(&mut self) -> Result<Command> {
        match self.peek_kind() {
            TokenKind::If => Ok(Command::Compound(self.parse_if()?)),
            TokenKind::While => Ok(Command::Compound(self.parse_while_like(false)?)),
            TokenKind::Until => Ok(Command::Compound(self.parse_while_like(true)?)),
            TokenKind::For => Ok(Command::Compound(self.parse_for()?)),
            TokenKind::Case => Ok(Command::Compound(self.parse_case()?)),
            TokenKind::Select => Ok(Command::Compound(self.parse_select()?)),
            TokenKind::LBrace => Ok(Command::Compound(self.parse_brace_group()?)),
            TokenKind::LParen => Ok(Command::Compound(self.parse_subshell()?)),
            TokenKind::DoubleLParen => Ok(Command::Compound(self.parse_arith_eval()?)),
            TokenKind::DoubleLBracket => Ok(Command::Compound(self.parse_enhanced_test()?)),
            TokenKind::Function => Ok(Command::Function(self.parse_function_def()?)),
            TokenKind::Break | TokenKind::Continue => self.parse_loop_control(),
            TokenKind::Word if self.at_function_def() => {
                Ok(Command::Function(self.parse_function_def()?))
            }
            TokenKind::Eof => {
                Err(ParseError::expected("command", None, vec!["command".into()]))
            }
            kind if kind.is_word_like() || kind.is_redirect() || kind == TokenKind::Return => {
                self.parse_simple_command()
            }
            _ => {
                let found = self.peek().token.clone();
                Err(ParseError::unexpected(
                    format!("Unexpected token '{}'", found.value),
                    Some(found),
                ))
            }
        }
    }

    fn parse_loop_control(&mut self) -> Result<Command> {
        let tok = self.advance();
        let start = tok.token.span.start;
        let mut level = 1u32;
        if self.peek_kind() == TokenKind::Word {
            let value = self.peek().token.value.clone();
            if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
                level = value.parse().unwrap_or(1);
                self.advance();
            }
        }
        let span = self.span_from(start);
        Ok(match tok.kind() {
            TokenKind::Break => Command::Break(BreakStatement { level, span }),
            _ => Command::Continue(ContinueStatement { level, span }),
        })
    }

    // ===== simple commands =====

    pub(crate) fn parse_simple_command(&mut self) -> Result<Command> {
        let start = self.peek().token.span.start;
        let mut cmd = SimpleCommand::default();
        let mut saw_plain_arg = false;

        loop {
            let kind = self.peek_kind();
            if kind.is_redirect() {
                let redirect = self.parse_redirect()?;
                cmd.redirects.push(redirect);
                continue;
            }
            if kind == TokenKind::AssignmentWord && !saw_plain_arg {
                if self.assignment_starts_array_init() {
                    let init = self.parse_array_initialization()?;
                    cmd.array_assignments.push(ArrayAssignment::Initialization(init));
                    continue;
                }
                if self.peek().token.value.contains('[') {
                    let assignment = self.parse_array_element_assignment()?;
                    cmd.array_assignments.push(ArrayAssignment::ElementAssignment(assignment));
                    continue;
                }
                let word = self.parse_word()?;
                cmd.push_arg(word);
                continue;
            }
            if kind.is_word_like()
                || kind.is_keyword()
                || matches!(kind, TokenKind::Equals | TokenKind::PlusEquals | TokenKind::Bang)
            {
                let word = self.parse_word()?;
                cmd.push_arg(word);
                saw_plain_arg = true;
                continue;
            }
            break;
        }

        if cmd.args.is_empty() && cmd.array_assignments.is_empty() && cmd.redirects.is_empty() {
            let found = self.peek().token.clone();
            return Err(ParseError::unexpected(
                format!("Unexpected token '{}'", found.value),
                Some(found),
            ));
        }
        cmd.span = self.span_from(start);
        Ok(Command::Simple(cmd))
    }

    fn assignment_starts_array_init(&self) -> bool {
        let current = self.peek();
        current.token.value.ends_with('=')
            && !current.followed_by_whitespace
            && self.peek_kind_at(1) == TokenKind::LParen
    }

    fn parse_array_initialization(&mut self) -> Result<ArrayInitialization> {
        let tok = self.advance();
        let start = tok.token.span.start;
        let raw = tok.token.value.as_ref();
        let (name, is_append) = match raw.strip_suffix("+=") {
            Some(name) => (name.to_string(), true),
            None => (raw.trim_end_matches('=').to_string(), false),
        };
        self.expect(TokenKind::LParen, "'('", None)?;

        let mut elements = Vec::new();
        let mut element_types = Vec::new();
        let mut element_quote_types = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(TokenKind::RParen) {
                break;
            }
            if self.at(TokenKind::Eof) {
                return Err(ParseError::Incomplete {
                    awaiting: Terminator::RightParen,
                    found: None,
                });
            }
            let kind = self.peek_kind();
            if kind.is_word_like() || kind.is_keyword() {
                let word = self.parse_word()?;
                element_types.push(if word.is_composite {
                    ArgType::Composite
                } else {
                    word.parts.first().map(|p| p.kind).unwrap_or(ArgType::Word)
                });
                element_quote_types.push(word.quote_char);
                elements.push(word.text);
            } else {
                let found = self.peek().token.clone();
                return Err(ParseError::expected(
                    "array element",
                    Some(found),
                    vec!["word".into(), ")".into()],
                ));
            }
        }

        Ok(ArrayInitialization {
            name,
            elements,
            element_types,
            element_quote_types,
            is_append,
            span: self.span_from(start),
        })
    }

    fn parse_array_element_assignment(&mut self) -> Result<ArrayElementAssignment> {
        let tok = self.advance();
        let start = tok.token.span.start;
        let raw = tok.token.value.as_ref();

        let invalid = || {
            ParseError::unexpected(
                format!("Invalid array assignment '{raw}'"),
                Some(tok.token.clone()),
            )
        };
        let open = raw.find('[').ok_or_else(invalid)?;
        let close = raw.find(']').ok_or_else(invalid)?;
        if close < open {
            return Err(invalid());
        }
        let name = raw[..open].to_string();
        let index = raw[open + 1..close].to_string();
        let after = &raw[close + 1..];
        let (is_append, tail) = match after.strip_prefix("+=") {
            Some(tail) => (true, tail),
            None => (false, after.strip_prefix('=').ok_or_else(invalid)?),
        };

        let (value, value_type, value_quote_type) = if tail.is_empty()
            && !tok.followed_by_whitespace
            && self.peek_kind().is_word_like()
        {
            let word = self.parse_word()?;
            let value_type = if word.is_composite {
                ArgType::Composite
            } else {
                word.parts.first().map(|p| p.kind).unwrap_or(ArgType::Word)
            };
            (word.text, value_type, word.quote_char)
        } else {
            (tail.to_string(), ArgType::Word, None)
        };

        Ok(ArrayElementAssignment {
            name,
            index,
            value,
            value_type,
            value_quote_type,
            is_append,
            span: self.span_from(start),
        })
    }

    // ===== words =====

    /// Parses one shell word, fusing adjacent word-producing tokens into a
    /// composite argument. Quoting information survives in the parts.
    pub(crate) fn parse_word(&mut self) -> Result<Word> {
        let first = self.advance();
        let mut parts = vec![word_part(&first.token)];
        let mut prev = first;
        while !prev.followed_by_whitespace {
            let kind = self.peek_kind();
            let continues = kind.is_word_like()
                || kind.is_keyword()
                || matches!(kind, TokenKind::Equals | TokenKind::PlusEquals | TokenKind::Bang);
            if !continues {
                break;
            }
            prev = self.advance();
            parts.push(word_part(&prev.token));
        }

        let is_composite = parts.len() > 1;
        let text: String = parts.iter().map(|p| p.text.as_str()).collect();
        let (quote_char, is_quoted) = if is_composite {
            (None, false)
        } else {
            let quote = parts[0].quote_char;
            (quote, quote.is_some())
        };
        let is_variable_expansion = !is_composite && parts[0].kind == ArgType::Variable;
        // Composite and quoted words are tagged so the expander skips
        // pathname expansion (quoted wildcards do not glob).
        let expand_glob = !is_composite && !is_quoted;

        Ok(Word {
            text,
            is_quoted,
            quote_char,
            is_variable_expansion,
            is_composite,
            expand_glob,
            parts,
        })
    }

    // ===== redirections =====

    pub(crate) fn parse_trailing_redirects(&mut self) -> Result<Vec<Redirect>> {
        let mut redirects = Vec::new();
        while self.peek_kind().is_redirect() {
            redirects.push(self.parse_redirect()?);
        }
        Ok(redirects)
    }

    pub(crate) fn parse_redirect(&mut self) -> Result<Redirect> {
        let tok = self.advance();
        let start = tok.token.span.start;
        let fd = leading_fd(&tok.token.value);

        let kind = match tok.kind() {
            TokenKind::Less => RedirectKind::In,
            TokenKind::Great => RedirectKind::Out,
            TokenKind::DGreat => RedirectKind::Append,
            TokenKind::Great2 => RedirectKind::Out,
            TokenKind::DGreat2 => RedirectKind::Append,
            TokenKind::GreatAnd => RedirectKind::DupOut,
            TokenKind::LessAnd => RedirectKind::DupIn,
            TokenKind::LessGreat => RedirectKind::ReadWrite,
            TokenKind::AmpGreat => RedirectKind::OutErr,
            TokenKind::HeredocStart => RedirectKind::Heredoc,
            TokenKind::HeredocStripStart => RedirectKind::HeredocStrip,
            TokenKind::Herestring => RedirectKind::Herestring,
            _ => {
                return Err(ParseError::unexpected(
                    format!("Unexpected token '{}'", tok.token.value),
                    Some(tok.token.clone()),
                ));
            }
        };

        if kind.is_heredoc() {
            // Body collection happens after the parse; record the
            // delimiter and its quoting only.
            return Ok(Redirect {
                kind,
                fd,
                target: Some(tok.token.value.to_string()),
                dup_fd: None,
                heredoc_content: None,
                heredoc_quoted: Some(tok.token.heredoc_quoted),
                span: self.span_from(start),
            });
        }

        if matches!(kind, RedirectKind::DupOut | RedirectKind::DupIn) {
            let word = self.parse_redirect_target(kind)?;
            let (target, dup_fd) = if !word.is_empty() && word.bytes().all(|b| b.is_ascii_digit())
            {
                (None, word.parse().ok())
            } else {
                (Some(word), None)
            };
            return Ok(Redirect {
                kind,
                fd,
                target,
                dup_fd,
                heredoc_content: None,
                heredoc_quoted: None,
                span: self.span_from(start),
            });
        }

        // `> &1` with an inserted space: keep the malformed target so the
        // validator can point at it with a suggestion.
        let target = if self.at(TokenKind::Amp) {
            let amp = self.peek().clone();
            if !amp.followed_by_whitespace
                && self.peek_kind_at(1) == TokenKind::Word
                && self.tokens[(self.pos + 1).min(self.tokens.len() - 1)]
                    .token
                    .value
                    .bytes()
                    .all(|b| b.is_ascii_digit())
            {
                self.advance();
                let digits = self.advance();
                format!("&{}", digits.token.value)
            } else {
                return Err(ParseError::expected(
                    "redirect target",
                    self.error_token(),
                    vec!["word".into()],
                ));
            }
        } else {
            self.parse_redirect_target(kind)?
        };

        Ok(Redirect {
            kind,
            fd,
            target: Some(target),
            dup_fd: None,
            heredoc_content: None,
            heredoc_quoted: None,
            span: self.span_from(start),
        })
    }

    fn parse_redirect_target(&mut self, kind: RedirectKind) -> Result<String> {
        let peeked = self.peek_kind();
        if peeked.is_word_like() || peeked.is_keyword() {
            Ok(self.parse_word()?.text)
        } else {
            Err(ParseError::expected(
                format!("target after '{}'", kind.as_str()),
                self.error_token(),
                vec!["word".into()],
            ))
        }
    }
}

/// Background `&` applies to the final simple command of the list.
fn mark_background(list: &mut AndOrList) {
    if let Some(pipeline) = list.pipelines.last_mut() {
        if let Some(Command::Simple(cmd)) = pipeline.commands.last_mut() {
            cmd.background = true;
        }
    }
}

fn flush_statements(
    items: &mut Vec<TopLevelItem>,
    pending: &mut Vec<AndOrList>,
    span: Option<ByteSpan>,
) {
    if !pending.is_empty() {
        items.push(TopLevelItem::Statements(StatementList {
            statements: std::mem::take(pending),
            span,
        }));
    }
}

fn word_part(token: &Token) -> WordPart {
    let (kind, quote_char) = match token.kind {
        TokenKind::String => (ArgType::String, Some('"')),
        TokenKind::SingleString => (ArgType::SingleString, Some('\'')),
        TokenKind::Variable => (ArgType::Variable, None),
        TokenKind::CommandSub => (ArgType::CommandSub, None),
        TokenKind::CommandSubBacktick => (ArgType::CommandSubBacktick, None),
        TokenKind::ArithSub => (ArgType::ArithSub, None),
        _ => (ArgType::Word, None),
    };
    WordPart { text: token.value.to_string(), kind, quote_char }
}

fn leading_fd(value: &str) -> Option<u32> {
    let digits: String = value.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() { None } else { digits.parse().ok() }
}
