//! Incremental source processing.
//!
//! The processor accumulates input lines into a command buffer, probes the
//! buffer for completeness after every line (a parse that fails with an
//! "awaiting terminator" error just means: read more), expands aliases,
//! attaches here-document bodies, and hands finished trees to the
//! executor. Diagnostics carry `file:line[:column]` locations.

use std::io::{self, Write};

use psh_ast::NodeRef;
use psh_parser::ParseError;
use psh_position_tracking::LineIndex;
use psh_visitor::{AstFormat, ScriptFormatter, render};
use tracing::debug;

use crate::input::InputSource;
use crate::traits::{AliasExpander, ExecError, Executor, HistorySink, NoAliases, NoHistory};

/// Debug switches for the processor.
#[derive(Debug, Clone, Default)]
pub struct ProcessorConfig {
    /// Dump the token stream of every accepted buffer to stderr.
    pub debug_tokens: bool,
    /// Dump the parsed AST of every accepted buffer to stderr.
    pub debug_ast: bool,
    /// Format for AST dumps.
    pub ast_format: AstFormat,
}

impl ProcessorConfig {
    /// Reads the default dump format from `PSH_AST_FORMAT` (falls back to
    /// `tree`).
    pub fn from_env() -> Self {
        let ast_format = std::env::var("PSH_AST_FORMAT")
            .ok()
            .and_then(|name| AstFormat::parse(&name))
            .unwrap_or_default();
        ProcessorConfig { debug_tokens: false, debug_ast: false, ast_format }
    }
}

/// Drives lexing and parsing over a line-yielding input source.
///
/// One processor holds one active parse buffer; it is reentrancy-safe only
/// across non-overlapping inputs.
pub struct SourceProcessor<E, A = NoAliases, H = NoHistory> {
    executor: E,
    aliases: A,
    history: H,
    config: ProcessorConfig,
    last_exit_code: i32,
    stderr: Box<dyn Write>,
}

impl<E: Executor> SourceProcessor<E> {
    pub fn new(executor: E) -> Self {
        SourceProcessor {
            executor,
            aliases: NoAliases,
            history: NoHistory,
            config: ProcessorConfig::from_env(),
            last_exit_code: 0,
            stderr: Box::new(io::stderr()),
        }
    }
}

impl<E: Executor, A: AliasExpander, H: HistorySink> SourceProcessor<E, A, H> {
    pub fn with_aliases<A2: AliasExpander>(self, aliases: A2) -> SourceProcessor<E, A2, H> {
        SourceProcessor {
            executor: self.executor,
            aliases,
            history: self.history,
            config: self.config,
            last_exit_code: self.last_exit_code,
            stderr: self.stderr,
        }
    }

    pub fn with_history<H2: HistorySink>(self, history: H2) -> SourceProcessor<E, A, H2> {
        SourceProcessor {
            executor: self.executor,
            aliases: self.aliases,
            history,
            config: self.config,
            last_exit_code: self.last_exit_code,
            stderr: self.stderr,
        }
    }

    pub fn with_config(mut self, config: ProcessorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_stderr(mut self, stderr: Box<dyn Write>) -> Self {
        self.stderr = stderr;
        self
    }

    pub fn last_exit_code(&self) -> i32 {
        self.last_exit_code
    }

    pub fn executor_mut(&mut self) -> &mut E {
        &mut self.executor
    }

    /// Consumes the input until EOF, executing complete command groups as
    /// they appear. Returns the exit code of the last executed command.
    pub fn run(&mut self, input: &mut dyn InputSource, add_to_history: bool) -> i32 {
        let mut exit_code = 0;
        let mut buffer = String::new();
        let mut start_line = 0usize;

        loop {
            let Some(line) = input.read_line() else {
                // EOF flushes whatever is buffered (erroring if the
                // construct never completed).
                if !buffer.trim().is_empty() {
                    exit_code = self.accept_buffer(
                        &buffer,
                        input,
                        start_line,
                        add_to_history,
                    );
                }
                break;
            };

            // Blank and comment-only lines (including a shebang) vanish
            // while no command is being built.
            if buffer.is_empty() && line.trim().is_empty() {
                continue;
            }
            if buffer.is_empty() && line.trim_start().starts_with('#') {
                continue;
            }

            if buffer.is_empty() {
                start_line = input.line_number();
            }

            // Backslash continuation joins without a newline.
            if let Some(stripped) = line.strip_suffix('\\') {
                buffer.push_str(stripped);
                buffer.push(' ');
                continue;
            }

            if !buffer.is_empty() && !buffer.ends_with('\n') {
                buffer.push('\n');
            }
            buffer.push_str(&line);
            if buffer.trim().is_empty() {
                continue;
            }

            // Completeness probe: a full tokenize + parse of the buffer.
            match psh_parser::parse_source(&buffer) {
                Ok(_) => {
                    exit_code = self.accept_buffer(
                        buffer.trim_end_matches('\n'),
                        input,
                        start_line,
                        add_to_history,
                    );
                    buffer.clear();
                    start_line = 0;
                }
                Err(error) if error.is_incomplete() => {
                    debug!(awaiting = %error, "buffer incomplete, reading more input");
                }
                Err(error) => {
                    self.report_parse_error(input.name(), start_line, &buffer, &error);
                    buffer.clear();
                    start_line = 0;
                    exit_code = 1;
                    self.last_exit_code = 1;
                }
            }
        }

        exit_code
    }

    /// Parses and executes one complete buffer.
    fn accept_buffer(
        &mut self,
        command: &str,
        input: &mut dyn InputSource,
        start_line: usize,
        add_to_history: bool,
    ) -> i32 {
        if command.trim().is_empty() || command.trim_start().starts_with('#') {
            return 0;
        }

        let tokens = match psh_lexer::tokenize(command) {
            Ok(tokens) => tokens,
            Err(error) => {
                self.report_parse_error(input.name(), start_line, command, &error.into());
                self.last_exit_code = 1;
                return 1;
            }
        };

        if self.config.debug_tokens {
            let _ = writeln!(self.stderr, "=== Token Debug Output ===");
            for token in &tokens {
                let _ = writeln!(
                    self.stderr,
                    "{:?} {:?} @{}",
                    token.kind, token.value, token.span
                );
            }
            let _ = writeln!(self.stderr, "========================");
        }

        let tokens = self.aliases.expand(tokens);

        let mut ast = match psh_parser::parse(tokens) {
            Ok(ast) => ast,
            Err(error) => {
                self.report_parse_error(input.name(), start_line, command, &error);
                self.last_exit_code = 1;
                return 1;
            }
        };

        if self.config.debug_ast {
            let _ = writeln!(self.stderr, "=== AST Debug Output ===");
            let dump = render(NodeRef::TopLevel(&ast), self.config.ast_format, true);
            let _ = writeln!(self.stderr, "{dump}");
            let _ = writeln!(self.stderr, "======================");
        }

        if add_to_history {
            self.history.add(command.trim());
        }

        // Here-document bodies follow the parsed line; pull them from the
        // same input before execution.
        let mut read_line = || input.read_line();
        psh_heredoc::attach_bodies(&mut ast, &mut read_line);

        match self.executor.execute_toplevel(&ast) {
            Ok(code) => {
                self.last_exit_code = code;
                code
            }
            Err(ExecError::LoopBreak(_)) => {
                let _ = writeln!(
                    self.stderr,
                    "break: only meaningful in a `for' or `while' loop"
                );
                self.last_exit_code = 1;
                1
            }
            Err(ExecError::LoopContinue(_)) => {
                let _ = writeln!(
                    self.stderr,
                    "continue: only meaningful in a `for' or `while' loop"
                );
                self.last_exit_code = 1;
                1
            }
            Err(ExecError::Failure(message)) => {
                let _ = writeln!(self.stderr, "psh: {message}");
                self.last_exit_code = 1;
                1
            }
        }
    }

    fn report_parse_error(
        &mut self,
        name: &str,
        start_line: usize,
        buffer: &str,
        error: &ParseError,
    ) {
        let offset = match error {
            ParseError::Lex(lex) => Some(lex.span().start),
            _ => error.token().map(|t| t.span.start),
        };
        let location = match offset {
            Some(offset) => {
                let index = LineIndex::new(buffer);
                let position = index.line_col(offset);
                format!("{name}:{}:{}", start_line + position.line, position.column + 1)
            }
            None => format!("{name}:{start_line}"),
        };
        let _ = writeln!(self.stderr, "psh: {location}: {error}");
    }
}

/// Formats an AST back to source text (convenience for hosts echoing
/// accepted commands).
pub fn format_ast(ast: &psh_ast::TopLevel) -> String {
    ScriptFormatter::new().format(ast)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::StringInput;
    use pretty_assertions::assert_eq;
    use psh_ast::{StatementList, TopLevel};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Executor that records formatted commands and canned exit codes.
    #[derive(Default)]
    struct RecordingExecutor {
        commands: Vec<String>,
        trees: Vec<TopLevel>,
        exit_code: i32,
        error: Option<ExecError>,
    }

    impl Executor for RecordingExecutor {
        fn execute_toplevel(&mut self, ast: &TopLevel) -> Result<i32, ExecError> {
            if let Some(error) = self.error.clone() {
                return Err(error);
            }
            self.commands.push(format_ast(ast));
            self.trees.push(ast.clone());
            Ok(self.exit_code)
        }

        fn execute_command_list(&mut self, _list: &StatementList) -> Result<i32, ExecError> {
            Ok(self.exit_code)
        }

        fn run_command(&mut self, source: &str, _add_to_history: bool) -> Result<i32, ExecError> {
            self.commands.push(source.to_string());
            Ok(self.exit_code)
        }
    }

    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.borrow()).to_string()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn processor() -> (SourceProcessor<RecordingExecutor>, SharedBuf) {
        let stderr = SharedBuf::default();
        let processor = SourceProcessor::new(RecordingExecutor::default())
            .with_config(ProcessorConfig::default())
            .with_stderr(Box::new(stderr.clone()));
        (processor, stderr)
    }

    fn run(source: &str) -> (SourceProcessor<RecordingExecutor>, SharedBuf, i32) {
        let (mut p, stderr) = processor();
        let code = p.run(&mut StringInput::new(source), false);
        (p, stderr, code)
    }

    #[test]
    fn executes_single_line_commands_one_at_a_time() {
        let (p, _, code) = run("echo one\necho two\n");
        assert_eq!(code, 0);
        assert_eq!(p.executor.commands, vec!["echo one", "echo two"]);
    }

    #[test]
    fn multi_line_constructs_accumulate_until_complete() {
        let (p, _, _) = run("if true\nthen\n  echo inside\nfi\n");
        assert_eq!(p.executor.commands.len(), 1);
        assert!(p.executor.commands[0].contains("echo inside"));
    }

    #[test]
    fn backslash_continuation_joins_lines() {
        let (p, _, _) = run("echo one \\\ntwo\n");
        assert_eq!(p.executor.commands, vec!["echo one two"]);
    }

    #[test]
    fn comments_blanks_and_shebang_are_skipped() {
        let (p, _, _) = run("#!/bin/sh\n\n# a comment\necho real\n");
        assert_eq!(p.executor.commands, vec!["echo real"]);
    }

    #[test]
    fn parse_error_reports_location_and_continues() {
        let (p, stderr, _) = run("echo hello;; echo world\necho next\n");
        let err = stderr.contents();
        assert!(
            err.contains("psh: <string>:1:11: Unexpected token ';;'"),
            "stderr was: {err}"
        );
        // Processing continues after the failed buffer.
        assert_eq!(p.executor.commands, vec!["echo next"]);
    }

    #[test]
    fn parse_error_sets_exit_code_one() {
        let (p, _, code) = run("echo hello;; echo world\n");
        assert_eq!(code, 1);
        assert_eq!(p.last_exit_code(), 1);
    }

    #[test]
    fn unterminated_construct_at_eof_is_an_error() {
        let (p, stderr, code) = run("if true\nthen\n  echo never\n");
        assert_eq!(code, 1);
        assert!(p.executor.commands.is_empty());
        assert!(stderr.contents().contains("Expected FI, got EOF"));
    }

    #[test]
    fn heredoc_bodies_are_collected_from_following_lines() {
        let (p, _, _) = run("cat <<EOF\nhello\nworld\nEOF\necho after\n");
        assert_eq!(p.executor.trees.len(), 2);

        let tree = &p.executor.trees[0];
        let rendered = format!("{tree:?}");
        assert!(rendered.contains("hello\\nworld\\n"), "tree: {rendered}");
        assert_eq!(p.executor.commands[1], "echo after");
    }

    #[test]
    fn heredoc_strip_tabs() {
        let (p, _, _) = run("cat <<-END\n\tindented\n\tEND\n");
        let rendered = format!("{:?}", p.executor.trees[0]);
        assert!(rendered.contains("\"indented\\n\""), "tree: {rendered}");
    }

    #[test]
    fn executor_exit_code_is_tracked() {
        let stderr = SharedBuf::default();
        let executor = RecordingExecutor { exit_code: 3, ..Default::default() };
        let mut p = SourceProcessor::new(executor)
            .with_config(ProcessorConfig::default())
            .with_stderr(Box::new(stderr));
        let code = p.run(&mut StringInput::new("false-ish\n"), false);
        assert_eq!(code, 3);
        assert_eq!(p.last_exit_code(), 3);
    }

    #[test]
    fn loop_break_leak_becomes_diagnostic() {
        let stderr = SharedBuf::default();
        let executor =
            RecordingExecutor { error: Some(ExecError::LoopBreak(1)), ..Default::default() };
        let mut p = SourceProcessor::new(executor)
            .with_config(ProcessorConfig::default())
            .with_stderr(Box::new(stderr.clone()));
        let code = p.run(&mut StringInput::new("break\n"), false);
        assert_eq!(code, 1);
        assert!(
            stderr
                .contents()
                .contains("break: only meaningful in a `for' or `while' loop")
        );
    }

    #[test]
    fn alias_hook_rewrites_tokens() {
        struct UpcaseEcho;
        impl AliasExpander for UpcaseEcho {
            fn expand(&mut self, tokens: Vec<psh_token::Token>) -> Vec<psh_token::Token> {
                tokens
                    .into_iter()
                    .map(|mut token| {
                        if &*token.value == "echo" {
                            token.value = "printf".into();
                        }
                        token
                    })
                    .collect()
            }
        }

        let stderr = SharedBuf::default();
        let mut p = SourceProcessor::new(RecordingExecutor::default())
            .with_config(ProcessorConfig::default())
            .with_stderr(Box::new(stderr))
            .with_aliases(UpcaseEcho);
        p.run(&mut StringInput::new("echo hi\n"), false);
        assert_eq!(p.executor.commands, vec!["printf hi"]);
    }

    #[test]
    fn history_receives_accepted_lines() {
        #[derive(Default)]
        struct VecHistory(Rc<RefCell<Vec<String>>>);
        impl HistorySink for VecHistory {
            fn add(&mut self, line: &str) {
                self.0.borrow_mut().push(line.to_string());
            }
        }

        let lines = Rc::new(RefCell::new(Vec::new()));
        let stderr = SharedBuf::default();
        let mut p = SourceProcessor::new(RecordingExecutor::default())
            .with_config(ProcessorConfig::default())
            .with_stderr(Box::new(stderr))
            .with_history(VecHistory(lines.clone()));
        p.run(&mut StringInput::new("echo one\n# skipped\necho two\n"), true);
        assert_eq!(*lines.borrow(), vec!["echo one", "echo two"]);
    }

    #[test]
    fn debug_ast_dump_goes_to_stderr() {
        let stderr = SharedBuf::default();
        let config = ProcessorConfig {
            debug_tokens: true,
            debug_ast: true,
            ast_format: AstFormat::Tree,
        };
        let mut p = SourceProcessor::new(RecordingExecutor::default())
            .with_config(config)
            .with_stderr(Box::new(stderr.clone()));
        p.run(&mut StringInput::new("echo hi\n"), false);
        let err = stderr.contents();
        assert!(err.contains("=== Token Debug Output ==="));
        assert!(err.contains("=== AST Debug Output ==="));
        assert!(err.contains("TopLevel"));
    }

    #[test]
    fn config_from_env_parses_format() {
        // Only checks the parsing fallback; the env var itself is global
        // state better left alone in tests.
        let config = ProcessorConfig::default();
        assert_eq!(config.ast_format, AstFormat::Tree);
    }
}
