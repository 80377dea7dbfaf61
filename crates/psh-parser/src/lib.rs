//! Recursive-descent parser for shell source.
//!
//! Tokens flow in from `psh-lexer`, get annotated with adjacency and case
//! context, and come out as the typed AST of `psh-ast`. The grammar follows
//! POSIX shell shape with the usual bash extensions: `[[ ]]` tests, `(( ))`
//! arithmetic, C-style `for`, `select`, arrays, process substitution, and
//! the three case terminators.
//!
//! The parser reports precise errors and never recovers. The one
//! distinguished error shape is [`ParseError::Incomplete`], raised when a
//! closing terminator (`fi`, `done`, `esac`, `]]`, `))`, `}`, `)`) is
//! missing at end of input; interactive drivers use it to keep reading
//! lines instead of reporting a failure.

mod compound;
mod error;
mod parser;
mod test_expr;

use psh_ast::TopLevel;
use psh_token::Token;

pub use error::{ParseError, Result, Terminator};
pub use parser::Parser;

/// Parses a lexed token stream (annotating it first).
pub fn parse(tokens: Vec<Token>) -> Result<TopLevel> {
    let annotated = psh_token::annotate(tokens);
    Parser::new(annotated).parse_program()
}

/// Tokenizes and parses a complete source buffer.
pub fn parse_source(source: &str) -> Result<TopLevel> {
    let tokens = psh_lexer::tokenize(source)?;
    parse(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use psh_ast::*;

    fn first_command(ast: &TopLevel) -> &Command {
        match &ast.items[0] {
            TopLevelItem::Statements(list) => &list.statements[0].pipelines[0].commands[0],
            TopLevelItem::Function(_) => panic!("expected statements"),
        }
    }

    fn first_simple(ast: &TopLevel) -> &SimpleCommand {
        match first_command(ast) {
            Command::Simple(cmd) => cmd,
            other => panic!("expected simple command, got {other:?}"),
        }
    }

    #[test]
    fn parses_simple_command() {
        let ast = parse_source("echo hello world").unwrap();
        let cmd = first_simple(&ast);
        assert_eq!(cmd.args, vec!["echo", "hello", "world"]);
        assert_eq!(cmd.arg_types, vec![ArgType::Word; 3]);
    }

    #[test]
    fn composite_argument_fusion() {
        let ast = parse_source("echo 'hello'.txt").unwrap();
        let cmd = first_simple(&ast);
        assert_eq!(cmd.args, vec!["echo", "hello.txt"]);
        assert_eq!(cmd.arg_types[1], ArgType::Composite);
        let word = &cmd.words[1];
        assert!(word.is_composite);
        assert!(!word.expand_glob);
        assert_eq!(word.parts.len(), 2);
        assert_eq!(word.parts[0].kind, ArgType::SingleString);
        assert_eq!(word.parts[1].kind, ArgType::Word);
    }

    #[test]
    fn double_semicolon_outside_case_is_rejected() {
        let err = parse_source("echo hello;; echo world").unwrap_err();
        assert!(!err.is_incomplete());
        assert_eq!(err.to_string(), "Unexpected token ';;'");
    }

    #[test]
    fn incomplete_constructs_ask_for_more_input() {
        for (src, terminator) in [
            ("if true; then echo hi", Terminator::Fi),
            ("if true", Terminator::Then),
            ("while true; do echo", Terminator::Done),
            ("while true", Terminator::Do),
            ("for i in 1 2", Terminator::Do),
            ("case $x in", Terminator::Esac),
            ("{ echo hi", Terminator::RightBrace),
            ("( echo hi", Terminator::RightParen),
            ("[[ -f x", Terminator::DoubleRBracket),
            ("[[ $x &&", Terminator::TestOperand),
            ("foo() {", Terminator::RightBrace),
        ] {
            match parse_source(src) {
                Err(ParseError::Incomplete { awaiting, .. }) => {
                    assert_eq!(awaiting, terminator, "source: {src}")
                }
                other => panic!("expected incomplete for {src:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn and_or_list_shape() {
        let ast = parse_source("a && b || c").unwrap();
        match &ast.items[0] {
            TopLevelItem::Statements(list) => {
                let and_or = &list.statements[0];
                assert_eq!(and_or.pipelines.len(), 3);
                assert_eq!(and_or.operators, vec![AndOrOp::And, AndOrOp::Or]);
            }
            _ => panic!("expected statements"),
        }
    }

    #[test]
    fn background_flag() {
        let ast = parse_source("sleep 5 &").unwrap();
        assert!(first_simple(&ast).background);
    }
}
