//! Collaborator seams.
//!
//! The core never executes anything itself. Hosts plug in an [`Executor`]
//! (process spawning, builtins), an optional [`AliasExpander`], and an
//! optional [`HistorySink`]; the processor only describes work and hands
//! it over.

use psh_ast::{StatementList, TopLevel};
use psh_token::Token;
use thiserror::Error;

/// Distinguished return channels from the executor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecError {
    /// `break [n]` escaped the executor without an enclosing loop.
    #[error("break {0}")]
    LoopBreak(u32),
    /// `continue [n]` escaped the executor without an enclosing loop.
    #[error("continue {0}")]
    LoopContinue(u32),
    /// Any other execution failure.
    #[error("{0}")]
    Failure(String),
}

/// Executes parsed trees and raw command text.
pub trait Executor {
    /// Executes a whole parsed buffer; returns the last exit code.
    fn execute_toplevel(&mut self, ast: &TopLevel) -> Result<i32, ExecError>;

    /// Executes a bare statement list (used by hosts that dispatch on the
    /// root kind themselves).
    fn execute_command_list(&mut self, list: &StatementList) -> Result<i32, ExecError>;

    /// Runs raw command text (trap actions take this path).
    fn run_command(&mut self, source: &str, add_to_history: bool) -> Result<i32, ExecError>;
}

/// Rewrites the token stream before parsing (alias expansion).
pub trait AliasExpander {
    fn expand(&mut self, tokens: Vec<Token>) -> Vec<Token>;
}

/// Receives accepted input lines.
pub trait HistorySink {
    fn add(&mut self, line: &str);
}

/// Pass-through alias expander.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAliases;

impl AliasExpander for NoAliases {
    fn expand(&mut self, tokens: Vec<Token>) -> Vec<Token> {
        tokens
    }
}

/// Discards history.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl HistorySink for NoHistory {
    fn add(&mut self, _line: &str) {}
}
