//! Pre-parse token stream annotation.
//!
//! Runs once over the lexer output before parsing. The lexer guarantees
//! longest-match operators, so this pass is a carrier of context the parser
//! wants up front: whitespace adjacency and whether a token sits inside a
//! `case` body (where `;;`, `;&`, and `;;&` are legal). The token kinds are
//! preserved unchanged so the parser can still report a precise
//! "unexpected token ';;'" outside a case.

use crate::{Token, TokenKind};

/// A token plus stream-derived context flags.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedToken {
    pub token: Token,
    /// True when whitespace (or end of stream) separates this token from
    /// the next one. Derived from span gaps.
    pub followed_by_whitespace: bool,
    /// True when this token lies between a `case` keyword and its matching
    /// `esac`. Case terminators are only legal here.
    pub in_case_body: bool,
}

impl AnnotatedToken {
    /// Shorthand for the underlying token kind.
    pub fn kind(&self) -> TokenKind {
        self.token.kind
    }
}

/// Annotates a lexed token stream.
pub fn annotate(tokens: Vec<Token>) -> Vec<AnnotatedToken> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut case_depth: usize = 0;

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Case => case_depth += 1,
            TokenKind::Esac => case_depth = case_depth.saturating_sub(1),
            _ => {}
        }

        let followed_by_whitespace = match tokens.get(i + 1) {
            Some(next) => next.span.start > token.span.end,
            None => true,
        };

        out.push(AnnotatedToken {
            token: token.clone(),
            followed_by_whitespace,
            in_case_body: case_depth > 0,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use psh_position_tracking::ByteSpan;

    fn tok(kind: TokenKind, value: &str, start: usize, end: usize) -> Token {
        Token::new(kind, value, ByteSpan::new(start, end))
    }

    #[test]
    fn whitespace_flag_from_span_gaps() {
        // echo 'a'b  → Word, SingleString (adjacent), Word (adjacent)
        let tokens = vec![
            tok(TokenKind::Word, "echo", 0, 4),
            tok(TokenKind::SingleString, "a", 5, 8),
            tok(TokenKind::Word, "b", 8, 9),
            tok(TokenKind::Eof, "", 9, 9),
        ];
        let annotated = annotate(tokens);
        assert!(annotated[0].followed_by_whitespace);
        assert!(!annotated[1].followed_by_whitespace);
        assert!(!annotated[2].followed_by_whitespace);
        assert!(annotated[3].followed_by_whitespace);
    }

    #[test]
    fn case_body_tracking() {
        let tokens = vec![
            tok(TokenKind::Word, "echo", 0, 4),
            tok(TokenKind::Case, "case", 5, 9),
            tok(TokenKind::Word, "x", 10, 11),
            tok(TokenKind::DoubleSemicolon, ";;", 12, 14),
            tok(TokenKind::Esac, "esac", 15, 19),
            tok(TokenKind::DoubleSemicolon, ";;", 20, 22),
        ];
        let annotated = annotate(tokens);
        assert!(!annotated[0].in_case_body);
        assert!(annotated[3].in_case_body);
        // After esac, terminators are illegal again.
        assert!(!annotated[5].in_case_body);
    }
}
