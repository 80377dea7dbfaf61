//! Error types for the shell lexer.

use psh_position_tracking::ByteSpan;
use thiserror::Error;

/// Result type for lexer operations
pub type Result<T> = std::result::Result<T, LexerError>;

/// Errors that can occur during lexing.
///
/// All variants are fatal to the current parse buffer; the lexer does not
/// attempt recovery. The span points at the construct's opening delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexerError {
    /// Unterminated single-quoted string
    #[error("Unterminated single quote starting at position {}", span.start)]
    UnterminatedSingleQuote { span: ByteSpan },

    /// Unterminated double-quoted string
    #[error("Unterminated double quote starting at position {}", span.start)]
    UnterminatedDoubleQuote { span: ByteSpan },

    /// Unterminated `$(...)` command substitution
    #[error("Unterminated command substitution starting at position {}", span.start)]
    UnterminatedCommandSub { span: ByteSpan },

    /// Unterminated backtick command substitution
    #[error("Unterminated backtick substitution starting at position {}", span.start)]
    UnterminatedBacktick { span: ByteSpan },

    /// Unterminated `$((...))` arithmetic substitution
    #[error("Unterminated arithmetic substitution starting at position {}", span.start)]
    UnterminatedArithSub { span: ByteSpan },

    /// Unterminated `${...}` parameter expansion
    #[error("Unterminated parameter expansion starting at position {}", span.start)]
    UnterminatedBraceVar { span: ByteSpan },

    /// Unterminated `<(...)` / `>(...)` process substitution
    #[error("Unterminated process substitution starting at position {}", span.start)]
    UnterminatedProcessSub { span: ByteSpan },

    /// Unterminated `((...))` arithmetic command
    #[error("Unterminated arithmetic command starting at position {}", span.start)]
    UnterminatedArithCommand { span: ByteSpan },

    /// `<<` with no delimiter word following it
    #[error("Missing here-document delimiter at position {}", span.start)]
    MissingHeredocDelimiter { span: ByteSpan },
}

impl LexerError {
    /// The span of the offending construct.
    pub fn span(&self) -> ByteSpan {
        match self {
            LexerError::UnterminatedSingleQuote { span }
            | LexerError::UnterminatedDoubleQuote { span }
            | LexerError::UnterminatedCommandSub { span }
            | LexerError::UnterminatedBacktick { span }
            | LexerError::UnterminatedArithSub { span }
            | LexerError::UnterminatedBraceVar { span }
            | LexerError::UnterminatedProcessSub { span }
            | LexerError::UnterminatedArithCommand { span }
            | LexerError::MissingHeredocDelimiter { span } => *span,
        }
    }
}
