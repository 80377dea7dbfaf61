//! `parse-tree`, `show-ast`, and `ast-dot` builtins.

use std::io::Write;

use psh_ast::NodeRef;
use psh_visitor::{AstFormat, render};

const USAGE: &str = "\
Usage: parse-tree [OPTIONS] COMMAND

Options:
    -f FORMAT    Output format: pretty, tree, compact, dot (default: tree)
    -p           Show position information
    -h           Show this help

Examples:
    parse-tree \"echo hello | grep world\"
    parse-tree -f pretty \"if true; then echo hi; fi\"
    parse-tree -f dot \"for i in 1 2 3; do echo $i; done\"";

const FORMATS: &[&str] = &["pretty", "tree", "compact", "dot"];

/// `parse-tree [-f FORMAT] [-p] COMMAND…`
///
/// `args[0]` is the builtin name. Exit codes: 0 on success, 1 on parse
/// error, 2 on usage/option errors.
pub fn parse_tree(args: &[String], out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    let name = args.first().map(String::as_str).unwrap_or("parse-tree");
    if args.len() < 2 {
        let _ = writeln!(err, "{name}: usage: parse-tree [options] command");
        return 2;
    }

    let mut format = AstFormat::Tree;
    let mut show_positions = false;
    let mut command_args: &[String] = &[];

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                let _ = writeln!(out, "{USAGE}");
                return 0;
            }
            "-f" | "--format" => {
                let Some(requested) = args.get(i + 1) else {
                    let _ = writeln!(err, "{name}: -f requires a format argument");
                    return 2;
                };
                if !FORMATS.contains(&requested.as_str()) {
                    let _ = writeln!(err, "{name}: invalid format: {requested}");
                    return 2;
                }
                format = AstFormat::parse(requested).unwrap_or_default();
                i += 2;
            }
            "-p" | "--positions" => {
                show_positions = true;
                i += 1;
            }
            option if option.starts_with('-') => {
                let _ = writeln!(err, "{name}: unknown option: {option}");
                return 2;
            }
            _ => {
                command_args = &args[i..];
                break;
            }
        }
    }

    if command_args.is_empty() {
        let _ = writeln!(err, "{name}: no command specified");
        return 2;
    }
    let command = command_args.join(" ");

    let ast = match psh_parser::parse_source(&command) {
        Ok(ast) => ast,
        Err(error) => {
            let _ = writeln!(err, "{name}: parse error: {error}");
            return 1;
        }
    };

    if format == AstFormat::Dot {
        let _ = writeln!(out, "# Graphviz DOT format - save to file and render with:");
        let _ = writeln!(out, "# dot -Tpng output.dot -o ast.png && xdg-open ast.png");
        let _ = writeln!(out);
    }
    let _ = writeln!(out, "{}", render(NodeRef::TopLevel(&ast), format, show_positions));
    0
}

/// `show-ast COMMAND…`: `parse-tree -f pretty`.
pub fn show_ast(args: &[String], out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    let mut delegated = vec!["show-ast".to_string(), "-f".to_string(), "pretty".to_string()];
    delegated.extend(args.iter().skip(1).cloned());
    parse_tree(&delegated, out, err)
}

/// `ast-dot COMMAND…`: `parse-tree -f dot` with the rendering hint
/// comment.
pub fn ast_dot(args: &[String], out: &mut dyn Write, err: &mut dyn Write) -> i32 {
    let mut delegated = vec!["ast-dot".to_string(), "-f".to_string(), "dot".to_string()];
    delegated.extend(args.iter().skip(1).cloned());
    parse_tree(&delegated, out, err)
}
