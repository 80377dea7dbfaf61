//! Parse error types.
//!
//! Every parse error carries a message, the offending token (when there is
//! one), and the expectation that was violated. The `Incomplete` variant is
//! the distinguished "awaiting terminator" case: the source processor uses
//! it to decide whether to read more input instead of reporting an error.

use psh_lexer::LexerError;
use psh_token::Token;
use thiserror::Error;

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;

/// The closing construct a partial parse is waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    Do,
    Done,
    Fi,
    Then,
    In,
    Esac,
    /// `}` closing a brace group or function body
    RightBrace,
    /// `)` closing a subshell
    RightParen,
    /// `]]` closing an enhanced test
    DoubleRBracket,
    /// `))` closing an arithmetic command
    DoubleRParen,
    /// An operand after `&&`/`||`/an operator inside `[[ ]]`
    TestOperand,
}

impl Terminator {
    /// The expectation text used in error messages.
    pub fn expectation(self) -> &'static str {
        match self {
            Terminator::Do => "DO",
            Terminator::Done => "DONE",
            Terminator::Fi => "FI",
            Terminator::Then => "THEN",
            Terminator::In => "IN",
            Terminator::Esac => "ESAC",
            Terminator::RightBrace => "'}' to end compound command",
            Terminator::RightParen => "RPAREN",
            Terminator::DoubleRBracket => "DOUBLE_RBRACKET",
            Terminator::DoubleRParen => "DOUBLE_RPAREN",
            Terminator::TestOperand => "test operand",
        }
    }
}

/// Errors produced while parsing a token stream.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    /// Lexical error surfaced through a parse attempt
    #[error(transparent)]
    Lex(#[from] LexerError),

    /// A token that cannot appear here
    #[error("{message}")]
    Unexpected {
        message: String,
        found: Option<Token>,
        expected: Vec<String>,
    },

    /// A construct is missing its closing terminator; more input may
    /// complete the parse.
    #[error("Expected {}, got {}", awaiting.expectation(), found_text(found))]
    Incomplete {
        awaiting: Terminator,
        found: Option<Token>,
    },
}

fn found_text(found: &Option<Token>) -> String {
    match found {
        Some(token) if !token.value.is_empty() => format!("'{}'", token.value),
        _ => "EOF".to_string(),
    }
}

impl ParseError {
    /// True for the "awaiting terminator" cases the source processor treats
    /// as a request for more input.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, ParseError::Incomplete { .. })
    }

    /// The token the error was reported at, when known.
    pub fn token(&self) -> Option<&Token> {
        match self {
            ParseError::Lex(_) => None,
            ParseError::Unexpected { found, .. } | ParseError::Incomplete { found, .. } => {
                found.as_ref()
            }
        }
    }

    pub(crate) fn unexpected(message: impl Into<String>, found: Option<Token>) -> Self {
        ParseError::Unexpected { message: message.into(), found, expected: Vec::new() }
    }

    pub(crate) fn expected(
        what: impl Into<String>,
        found: Option<Token>,
        expected: Vec<String>,
    ) -> Self {
        let what = what.into();
        let message = format!("Expected {}, got {}", what, found_text(&found));
        ParseError::Unexpected { message, found, expected }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psh_position_tracking::ByteSpan;
    use psh_token::TokenKind;

    #[test]
    fn incomplete_messages_match_awaiting_patterns() {
        let err = ParseError::Incomplete { awaiting: Terminator::Done, found: None };
        assert_eq!(err.to_string(), "Expected DONE, got EOF");
        assert!(err.is_incomplete());

        let err = ParseError::Incomplete { awaiting: Terminator::RightBrace, found: None };
        assert_eq!(err.to_string(), "Expected '}' to end compound command, got EOF");
    }

    #[test]
    fn unexpected_formats_token_value() {
        let token = Token::new(TokenKind::DoubleSemicolon, ";;", ByteSpan::new(10, 12));
        let err = ParseError::unexpected("Unexpected token ';;'", Some(token));
        assert_eq!(err.to_string(), "Unexpected token ';;'");
        assert!(!err.is_incomplete());
        assert!(err.token().is_some());
    }
}
