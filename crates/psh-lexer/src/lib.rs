//! State-machine lexer for shell source.
//!
//! The lexer consumes one code point at a time and produces [`Token`]s with
//! exact byte spans. Each quoting/expansion context is handled by a
//! dedicated scanning state: normal scanning, words, single quotes, double
//! quotes, simple and braced variables, `$(...)` command substitution with
//! parenthesis nesting, backtick substitution with its own escape rules,
//! `$((...))` arithmetic substitution with a doubled-paren terminator, and
//! `<(...)`/`>(...)` process substitution. Here-document *bodies* are never
//! read here; a `<<`/`<<-` operator only emits a start token carrying the
//! delimiter word and its quoting flag, and the source processor attaches
//! bodies after parsing.
//!
//! Two guarantees matter to the parser:
//!
//! - **Adjacency**: tokens emitted without intervening whitespace have
//!   exactly contiguous spans, so `pre'mid'$post` can be fused back into a
//!   single composite argument.
//! - **Longest match**: operator scanning always prefers the longest valid
//!   operator (`>>` over `>`, `;;&` over `;;`, `2>>` over `2>`).
//!
//! On malformed input (unterminated quoting or substitution) the lexer
//! fails with a single [`LexerError`] carrying the offending span; it does
//! not attempt recovery.

use std::collections::VecDeque;

use memchr::memchr;
use psh_position_tracking::ByteSpan;
use psh_token::{Token, TokenKind};

pub mod error;

pub use error::{LexerError, Result};
pub use psh_token::{AnnotatedToken, annotate};

/// Tokenizes an entire source buffer, appending a final `Eof` token.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    tokens.push(Token::new(TokenKind::Eof, "", ByteSpan::empty(input.len())));
    Ok(tokens)
}

/// The shell lexer.
///
/// Operates on the raw bytes of the input; multi-byte UTF-8 sequences only
/// ever appear inside words and quoted regions, where they are copied
/// through verbatim.
pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    /// Tokens synthesized ahead of the cursor (the `((...))` arithmetic
    /// command expands to three tokens in one scan).
    pending: VecDeque<Token>,
    /// End offset of the previously emitted token, used to decide whether
    /// `#` starts a comment or continues a word.
    prev_end: Option<(usize, TokenKind)>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer { input, bytes: input.as_bytes(), pos: 0, pending: VecDeque::new(), prev_end: None }
    }

    /// Produces the next token, or `None` at end of input.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if let Some(tok) = self.pending.pop_front() {
            self.prev_end = Some((tok.span.end, tok.kind));
            return Ok(Some(tok));
        }
        let token = self.scan()?;
        if let Some(tok) = &token {
            self.prev_end = Some((tok.span.end, tok.kind));
        }
        Ok(token)
    }

    fn scan(&mut self) -> Result<Option<Token>> {
        self.skip_blanks();

        let Some(&b) = self.bytes.get(self.pos) else {
            return Ok(None);
        };

        // A `#` begins a comment only at the start of a word.
        if b == b'#' && self.at_word_start() {
            self.skip_comment();
            return self.scan();
        }

        let token = match b {
            b'\n' => self.single(TokenKind::Newline),
            b'|' => self.scan_pipe_or_or(),
            b'&' => self.scan_amp(),
            b';' => self.scan_semi(),
            b'(' => self.scan_lparen()?,
            b')' => self.single(TokenKind::RParen),
            b'{' | b'}' if self.brace_is_operator() => self.single(if b == b'{' {
                TokenKind::LBrace
            } else {
                TokenKind::RBrace
            }),
            b'[' if self.starts_double_bracket() => self.double(TokenKind::DoubleLBracket),
            b']' if self.starts_double_rbracket() => self.double(TokenKind::DoubleRBracket),
            b'<' => self.scan_less()?,
            b'>' => self.scan_great()?,
            b'\'' => self.scan_single_quote()?,
            b'"' => self.scan_double_quote()?,
            b'`' => self.scan_backtick()?,
            b'$' => self.scan_dollar()?,
            b'0'..=b'9' if self.digits_prefix_redirect() => self.scan_fd_redirect(),
            _ => self.scan_word(),
        };
        Ok(Some(token))
    }

    // ===== cursor helpers =====

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.pos + ahead).copied()
    }

    fn skip_blanks(&mut self) {
        while matches!(self.bytes.get(self.pos), Some(b' ' | b'\t' | b'\r')) {
            self.pos += 1;
        }
    }

    fn skip_comment(&mut self) {
        match memchr(b'\n', &self.bytes[self.pos..]) {
            Some(off) => self.pos += off,
            None => self.pos = self.bytes.len(),
        }
    }

    fn at_word_start(&self) -> bool {
        match self.prev_end {
            Some((end, kind)) => end < self.pos || !kind.is_word_like(),
            None => true,
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let span = ByteSpan::new(self.pos, self.pos + 1);
        self.pos += 1;
        Token::new(kind, span.slice(self.input), span)
    }

    fn double(&mut self, kind: TokenKind) -> Token {
        let span = ByteSpan::new(self.pos, self.pos + 2);
        self.pos += 2;
        Token::new(kind, span.slice(self.input), span)
    }

    fn op(&mut self, kind: TokenKind, len: usize) -> Token {
        let span = ByteSpan::new(self.pos, self.pos + len);
        self.pos += len;
        Token::new(kind, span.slice(self.input), span)
    }

    /// True when the byte at `at` would end an operator-like word (`{`,
    /// `}`, `[[`, `]]`, `!`).
    fn is_boundary(&self, at: usize) -> bool {
        match self.bytes.get(at) {
            None => true,
            Some(b) => matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b';' | b'&' | b'|' | b'(' | b')' | b'<' | b'>'),
        }
    }

    fn brace_is_operator(&self) -> bool {
        self.is_boundary(self.pos + 1)
    }

    fn starts_double_bracket(&self) -> bool {
        self.peek(1) == Some(b'[') && self.is_boundary(self.pos + 2)
    }

    fn starts_double_rbracket(&self) -> bool {
        self.peek(1) == Some(b']') && self.is_boundary(self.pos + 2)
    }

    // ===== operators =====

    fn scan_pipe_or_or(&mut self) -> Token {
        if self.peek(1) == Some(b'|') { self.double(TokenKind::OrOr) } else { self.single(TokenKind::Pipe) }
    }

    fn scan_amp(&mut self) -> Token {
        match self.peek(1) {
            Some(b'&') => self.double(TokenKind::AndAnd),
            Some(b'>') => self.double(TokenKind::AmpGreat),
            _ => self.single(TokenKind::Amp),
        }
    }

    fn scan_semi(&mut self) -> Token {
        match (self.peek(1), self.peek(2)) {
            (Some(b';'), Some(b'&')) => self.op(TokenKind::DoubleSemicolonAmp, 3),
            (Some(b';'), _) => self.double(TokenKind::DoubleSemicolon),
            (Some(b'&'), _) => self.double(TokenKind::SemiAmp),
            _ => self.single(TokenKind::Semicolon),
        }
    }

    fn scan_lparen(&mut self) -> Result<Token> {
        if self.peek(1) == Some(b'(') {
            return self.scan_arith_command();
        }
        Ok(self.single(TokenKind::LParen))
    }

    /// `((expr))` arithmetic command: emits `((`, a single word holding the
    /// raw expression, and `))`.
    fn scan_arith_command(&mut self) -> Result<Token> {
        let start = self.pos;
        let open = self.double(TokenKind::DoubleLParen);
        let content_start = self.pos;
        let mut depth = 0usize;
        loop {
            match self.bytes.get(self.pos) {
                None => return Err(LexerError::UnterminatedArithCommand {
                    span: ByteSpan::new(start, self.pos),
                }),
                Some(b'(') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some(b')') if depth > 0 => {
                    depth -= 1;
                    self.pos += 1;
                }
                Some(b')') if self.peek(1) == Some(b')') => {
                    let content_span = ByteSpan::new(content_start, self.pos);
                    if !content_span.is_empty() {
                        self.pending.push_back(Token::new(
                            TokenKind::Word,
                            content_span.slice(self.input),
                            content_span,
                        ));
                    }
                    let close = ByteSpan::new(self.pos, self.pos + 2);
                    self.pos += 2;
                    self.pending.push_back(Token::new(TokenKind::DoubleRParen, "))", close));
                    return Ok(open);
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn digits_prefix_redirect(&self) -> bool {
        let mut i = self.pos;
        while matches!(self.bytes.get(i), Some(b'0'..=b'9')) {
            i += 1;
        }
        i > self.pos && matches!(self.bytes.get(i), Some(b'<' | b'>'))
            && self.at_word_start()
    }

    /// IO_NUMBER-prefixed redirect: `2>`, `2>>`, `3<&`, `10>&`, …
    /// The fd digits stay in the token value; `2>` and `2>>` keep their
    /// dedicated kinds.
    fn scan_fd_redirect(&mut self) -> Token {
        let start = self.pos;
        while matches!(self.bytes.get(self.pos), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        let fd_is_two = &self.input[start..self.pos] == "2";
        let kind = match (self.bytes.get(self.pos), self.peek(1)) {
            (Some(b'>'), Some(b'>')) => {
                self.pos += 2;
                if fd_is_two { TokenKind::DGreat2 } else { TokenKind::DGreat }
            }
            (Some(b'>'), Some(b'&')) => {
                self.pos += 2;
                TokenKind::GreatAnd
            }
            (Some(b'>'), _) => {
                self.pos += 1;
                if fd_is_two { TokenKind::Great2 } else { TokenKind::Great }
            }
            (Some(b'<'), Some(b'&')) => {
                self.pos += 2;
                TokenKind::LessAnd
            }
            (Some(b'<'), Some(b'>')) => {
                self.pos += 2;
                TokenKind::LessGreat
            }
            _ => {
                self.pos += 1;
                TokenKind::Less
            }
        };
        let span = ByteSpan::new(start, self.pos);
        Token::new(kind, span.slice(self.input), span)
    }

    fn scan_less(&mut self) -> Result<Token> {
        match (self.peek(1), self.peek(2)) {
            (Some(b'<'), Some(b'<')) => Ok(self.op(TokenKind::Herestring, 3)),
            (Some(b'<'), Some(b'-')) => {
                let start = self.pos;
                self.pos += 3;
                self.scan_heredoc_delimiter(TokenKind::HeredocStripStart, start)
            }
            (Some(b'<'), _) => {
                let start = self.pos;
                self.pos += 2;
                self.scan_heredoc_delimiter(TokenKind::HeredocStart, start)
            }
            (Some(b'&'), _) => Ok(self.double(TokenKind::LessAnd)),
            (Some(b'>'), _) => Ok(self.double(TokenKind::LessGreat)),
            (Some(b'('), _) => self.scan_process_sub(TokenKind::ProcessSubIn),
            _ => Ok(self.single(TokenKind::Less)),
        }
    }

    fn scan_great(&mut self) -> Result<Token> {
        match self.peek(1) {
            Some(b'>') => Ok(self.double(TokenKind::DGreat)),
            Some(b'&') => Ok(self.double(TokenKind::GreatAnd)),
            Some(b'(') => self.scan_process_sub(TokenKind::ProcessSubOut),
            _ => Ok(self.single(TokenKind::Great)),
        }
    }

    /// Reads the delimiter word after `<<`/`<<-`. A quoted delimiter makes
    /// the eventual body literal; the quoting is recorded on the token, not
    /// in its value.
    fn scan_heredoc_delimiter(&mut self, kind: TokenKind, start: usize) -> Result<Token> {
        while matches!(self.bytes.get(self.pos), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
        let (delim, quoted) = match self.bytes.get(self.pos) {
            Some(b'\'') => {
                let open = self.pos;
                self.pos += 1;
                let close = memchr(b'\'', &self.bytes[self.pos..]).ok_or(
                    LexerError::UnterminatedSingleQuote { span: ByteSpan::new(open, self.pos) },
                )?;
                let delim = self.input[self.pos..self.pos + close].to_string();
                self.pos += close + 1;
                (delim, true)
            }
            Some(b'"') => {
                let open = self.pos;
                self.pos += 1;
                let close = memchr(b'"', &self.bytes[self.pos..]).ok_or(
                    LexerError::UnterminatedDoubleQuote { span: ByteSpan::new(open, self.pos) },
                )?;
                let delim = self.input[self.pos..self.pos + close].to_string();
                self.pos += close + 1;
                (delim, true)
            }
            _ => {
                let word_start = self.pos;
                while let Some(&b) = self.bytes.get(self.pos) {
                    if matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b';' | b'&' | b'|' | b'(' | b')' | b'<' | b'>') {
                        break;
                    }
                    self.pos += 1;
                }
                (self.input[word_start..self.pos].to_string(), false)
            }
        };
        if delim.is_empty() {
            return Err(LexerError::MissingHeredocDelimiter {
                span: ByteSpan::new(start, self.pos),
            });
        }
        let span = ByteSpan::new(start, self.pos);
        Ok(Token::heredoc_start(kind, delim, span, quoted))
    }

    // ===== quoting states =====

    /// Single quotes are fully literal: no escapes, no interpolation.
    fn scan_single_quote(&mut self) -> Result<Token> {
        let start = self.pos;
        self.pos += 1;
        match memchr(b'\'', &self.bytes[self.pos..]) {
            Some(off) => {
                let value = &self.input[self.pos..self.pos + off];
                self.pos += off + 1;
                let span = ByteSpan::new(start, self.pos);
                Ok(Token::new(TokenKind::SingleString, value, span))
            }
            None => Err(LexerError::UnterminatedSingleQuote {
                span: ByteSpan::new(start, start + 1),
            }),
        }
    }

    /// Double quotes apply the `\\`, `\"`, `\$`, `` \` `` escapes, keep all
    /// other backslashes literally, and carry interpolations through raw
    /// (expansion is the executor's job).
    fn scan_double_quote(&mut self) -> Result<Token> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        loop {
            match self.bytes.get(self.pos) {
                None => {
                    return Err(LexerError::UnterminatedDoubleQuote {
                        span: ByteSpan::new(start, start + 1),
                    });
                }
                Some(b'"') => {
                    self.pos += 1;
                    let span = ByteSpan::new(start, self.pos);
                    return Ok(Token::new(TokenKind::String, value, span));
                }
                Some(b'\\') => match self.peek(1) {
                    Some(c @ (b'\\' | b'"' | b'$' | b'`')) => {
                        value.push(c as char);
                        self.pos += 2;
                    }
                    Some(_) | None => {
                        value.push('\\');
                        self.pos += 1;
                    }
                },
                Some(b'$') => {
                    let sub_start = self.pos;
                    if self.peek(1) == Some(b'(') && self.peek(2) == Some(b'(') {
                        self.skip_raw_arith_sub()?;
                    } else if self.peek(1) == Some(b'(') {
                        self.skip_raw_command_sub()?;
                    } else if self.peek(1) == Some(b'{') {
                        self.skip_raw_brace_var()?;
                    } else {
                        self.pos += 1;
                    }
                    value.push_str(&self.input[sub_start..self.pos]);
                }
                Some(b'`') => {
                    let sub_start = self.pos;
                    self.skip_raw_backtick()?;
                    value.push_str(&self.input[sub_start..self.pos]);
                }
                Some(_) => {
                    // Copy a full UTF-8 scalar at a time.
                    let ch_len = utf8_len(self.bytes[self.pos]);
                    value.push_str(&self.input[self.pos..self.pos + ch_len]);
                    self.pos += ch_len;
                }
            }
        }
    }

    /// Backtick substitution: value keeps the backticks; `\$`, `` \` ``,
    /// and `\\` are recognized, everything else is literal.
    fn scan_backtick(&mut self) -> Result<Token> {
        let start = self.pos;
        self.skip_raw_backtick()?;
        let span = ByteSpan::new(start, self.pos);
        Ok(Token::new(TokenKind::CommandSubBacktick, span.slice(self.input), span))
    }

    // ===== dollar expansions =====

    fn scan_dollar(&mut self) -> Result<Token> {
        let start = self.pos;
        if self.peek(1) == Some(b'(') && self.peek(2) == Some(b'(') {
            self.skip_raw_arith_sub()?;
            let span = ByteSpan::new(start, self.pos);
            return Ok(Token::new(TokenKind::ArithSub, span.slice(self.input), span));
        }
        if self.peek(1) == Some(b'(') {
            self.skip_raw_command_sub()?;
            let span = ByteSpan::new(start, self.pos);
            return Ok(Token::new(TokenKind::CommandSub, span.slice(self.input), span));
        }
        if self.peek(1) == Some(b'{') {
            self.skip_raw_brace_var()?;
            let span = ByteSpan::new(start, self.pos);
            return Ok(Token::new(TokenKind::Variable, span.slice(self.input), span));
        }
        match self.peek(1) {
            Some(c) if c == b'_' || c.is_ascii_alphabetic() => {
                self.pos += 2;
                while matches!(self.bytes.get(self.pos), Some(b) if b.is_ascii_alphanumeric() || *b == b'_')
                {
                    self.pos += 1;
                }
                let span = ByteSpan::new(start, self.pos);
                Ok(Token::new(TokenKind::Variable, span.slice(self.input), span))
            }
            Some(b'?' | b'$' | b'!' | b'#' | b'@' | b'*' | b'-' | b'0'..=b'9') => {
                self.pos += 2;
                let span = ByteSpan::new(start, self.pos);
                Ok(Token::new(TokenKind::Variable, span.slice(self.input), span))
            }
            // A lone `$` is an ordinary word character.
            _ => Ok(self.scan_word()),
        }
    }

    fn scan_process_sub(&mut self, kind: TokenKind) -> Result<Token> {
        let start = self.pos;
        self.pos += 2; // `<(` or `>(`
        self.skip_balanced_parens(start, 1)
            .map_err(|_| LexerError::UnterminatedProcessSub { span: ByteSpan::new(start, start + 2) })?;
        let span = ByteSpan::new(start, self.pos);
        Ok(Token::new(kind, span.slice(self.input), span))
    }

    // ===== raw substitution scanners (shared by normal and string states) =====

    /// Cursor on `$` of `$(`; skips past the matching `)`.
    fn skip_raw_command_sub(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 2;
        self.skip_balanced_parens(start, 1)
            .map_err(|_| LexerError::UnterminatedCommandSub { span: ByteSpan::new(start, start + 2) })
    }

    /// Cursor on `$` of `$((`; skips past the doubled closing parenthesis
    /// at the correct nesting.
    fn skip_raw_arith_sub(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 3;
        let mut depth = 0usize;
        loop {
            match self.bytes.get(self.pos) {
                None => {
                    return Err(LexerError::UnterminatedArithSub {
                        span: ByteSpan::new(start, start + 3),
                    });
                }
                Some(b'(') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some(b')') if depth > 0 => {
                    depth -= 1;
                    self.pos += 1;
                }
                Some(b')') if self.peek(1) == Some(b')') => {
                    self.pos += 2;
                    return Ok(());
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Cursor on `$` of `${`; skips past the matching `}` with nesting and
    /// quote awareness (`${x:-"}"}` stays balanced).
    fn skip_raw_brace_var(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 2;
        let mut depth = 1usize;
        loop {
            match self.bytes.get(self.pos) {
                None => {
                    return Err(LexerError::UnterminatedBraceVar {
                        span: ByteSpan::new(start, start + 2),
                    });
                }
                Some(b'{') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some(b'}') => {
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(b'\'') => self.skip_quoted_segment(b'\'', start)?,
                Some(b'"') => self.skip_quoted_segment(b'"', start)?,
                Some(b'\\') => self.pos += if self.peek(1).is_some() { 2 } else { 1 },
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Cursor on the opening backtick; skips past the closing one.
    fn skip_raw_backtick(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.bytes.get(self.pos) {
                None => {
                    return Err(LexerError::UnterminatedBacktick {
                        span: ByteSpan::new(start, start + 1),
                    });
                }
                Some(b'`') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b'\\') if matches!(self.peek(1), Some(b'$' | b'`' | b'\\')) => self.pos += 2,
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Skips until the parenthesis depth drops to zero, honoring any kind
    /// of quoting nested inside.
    fn skip_balanced_parens(&mut self, open_at: usize, mut depth: usize) -> Result<()> {
        loop {
            match self.bytes.get(self.pos) {
                None => {
                    return Err(LexerError::UnterminatedCommandSub {
                        span: ByteSpan::new(open_at, open_at + 1),
                    });
                }
                Some(b'(') => {
                    depth += 1;
                    self.pos += 1;
                }
                Some(b')') => {
                    depth -= 1;
                    self.pos += 1;
                    if depth == 0 {
                        return Ok(());
                    }
                }
                Some(b'\'') => self.skip_quoted_segment(b'\'', open_at)?,
                Some(b'"') => self.skip_quoted_segment(b'"', open_at)?,
                Some(b'`') => self.skip_raw_backtick()?,
                Some(b'\\') => self.pos += if self.peek(1).is_some() { 2 } else { 1 },
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Cursor on a quote byte inside a substitution; skips the quoted
    /// segment. Double quotes honor backslash escapes, single quotes are
    /// literal.
    fn skip_quoted_segment(&mut self, quote: u8, context_start: usize) -> Result<()> {
        let unterminated = || {
            if quote == b'\'' {
                LexerError::UnterminatedSingleQuote { span: ByteSpan::new(context_start, context_start + 1) }
            } else {
                LexerError::UnterminatedDoubleQuote { span: ByteSpan::new(context_start, context_start + 1) }
            }
        };
        self.pos += 1;
        loop {
            match self.bytes.get(self.pos) {
                None => return Err(unterminated()),
                Some(&b) if b == quote => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b'\\') if quote == b'"' && self.peek(1).is_some() => self.pos += 2,
                Some(_) => self.pos += 1,
            }
        }
    }

    // ===== words =====

    /// Scans an unquoted word. Backslash escapes the following character
    /// (quote removal applies: the value keeps the escaped character only).
    /// The finished word is classified as an assignment word, a reserved
    /// word, `!`, `=`, `+=`, or a plain word.
    fn scan_word(&mut self) -> Token {
        let start = self.pos;
        let mut value = String::new();
        while let Some(&b) = self.bytes.get(self.pos) {
            match b {
                b' ' | b'\t' | b'\r' | b'\n' | b'|' | b'&' | b';' | b'(' | b')' | b'<' | b'>'
                | b'\'' | b'"' | b'`' => break,
                b'$' => {
                    // `$` followed by expandable material starts a new token;
                    // a trailing or inert `$` stays in the word.
                    match self.peek(1) {
                        Some(c)
                            if c == b'(' || c == b'{' || c == b'_'
                                || c.is_ascii_alphanumeric()
                                || matches!(c, b'?' | b'$' | b'!' | b'#' | b'@' | b'*' | b'-') =>
                        {
                            break;
                        }
                        _ => {
                            value.push('$');
                            self.pos += 1;
                        }
                    }
                }
                b'\\' => match self.peek(1) {
                    Some(c) => {
                        let ch_len = utf8_len(c);
                        value.push_str(&self.input[self.pos + 1..self.pos + 1 + ch_len]);
                        self.pos += 1 + ch_len;
                    }
                    None => {
                        value.push('\\');
                        self.pos += 1;
                    }
                },
                _ => {
                    let ch_len = utf8_len(b);
                    value.push_str(&self.input[self.pos..self.pos + ch_len]);
                    self.pos += ch_len;
                }
            }
        }
        let span = ByteSpan::new(start, self.pos);
        let raw = span.slice(self.input);
        let kind = classify_word(&value, raw);
        Token::new(kind, value, span)
    }
}

/// Number of bytes in the UTF-8 sequence introduced by `first`.
fn utf8_len(first: u8) -> usize {
    match first {
        0x00..=0x7F => 1,
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        _ => 4,
    }
}

fn classify_word(value: &str, raw: &str) -> TokenKind {
    match value {
        "!" => return TokenKind::Bang,
        "=" => return TokenKind::Equals,
        "+=" => return TokenKind::PlusEquals,
        _ => {}
    }
    // Reserved words only when nothing was escaped away.
    if value == raw {
        if let Some(kw) = TokenKind::keyword(value) {
            return kw;
        }
    }
    if is_assignment_word(value) { TokenKind::AssignmentWord } else { TokenKind::Word }
}

/// `name=…`, `name+=…`, or `name[index]=…` with a valid identifier.
fn is_assignment_word(value: &str) -> bool {
    let bytes = value.as_bytes();
    let Some(&first) = bytes.first() else { return false };
    if first != b'_' && !first.is_ascii_alphabetic() {
        return false;
    }
    let mut i = 1;
    while i < bytes.len() && (bytes[i] == b'_' || bytes[i].is_ascii_alphanumeric()) {
        i += 1;
    }
    // Optional subscript
    if bytes.get(i) == Some(&b'[') {
        let Some(close) = value[i..].find(']') else { return false };
        i += close + 1;
    }
    match bytes.get(i) {
        Some(b'=') => true,
        Some(b'+') => bytes.get(i + 1) == Some(&b'='),
        _ => false,
    }
}
