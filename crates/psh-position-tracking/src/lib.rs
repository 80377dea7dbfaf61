//! Byte-based source location tracking for the shell front end.
//!
//! The lexer and parser record byte offsets only; line/column pairs are
//! derived lazily through [`LineIndex`] when a diagnostic is rendered.

mod line_index;
mod span;

pub use line_index::{LineCol, LineIndex};
pub use span::ByteSpan;
