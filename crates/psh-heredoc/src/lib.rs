//! Here-document body collection.
//!
//! The lexer only records a heredoc's delimiter and quoting; bodies are
//! read from the input *after* the line containing the operator has been
//! fully parsed. The source processor calls [`attach_bodies`] with the
//! freshly parsed tree and its line source; every pending `<<`/`<<-`
//! redirect is filled in source order.
//!
//! `<<-` strips leading tab characters (tabs only, spaces are preserved)
//! from each body line and from the delimiter line before comparison. A
//! quoted delimiter was already recorded by the lexer as
//! `heredoc_quoted`, which downstream expansion consults; collection
//! itself is identical either way.

use psh_ast::{
    Command, CompoundCommand, Redirect, StatementList, TopLevel, TopLevelItem,
};

/// One body read from the input.
#[derive(Debug, Clone, PartialEq)]
pub struct HeredocBody {
    pub content: String,
    /// False when the input ended before the delimiter line.
    pub terminated: bool,
}

/// Reads one heredoc body from `read_line` up to (and not including) the
/// line equal to `delimiter`. With `strip_tabs`, leading tabs are removed
/// from body lines and ignored on the delimiter line.
pub fn collect_body(
    delimiter: &str,
    strip_tabs: bool,
    read_line: &mut dyn FnMut() -> Option<String>,
) -> HeredocBody {
    let mut content = String::new();
    loop {
        let Some(line) = read_line() else {
            return HeredocBody { content, terminated: false };
        };
        let line = line.strip_suffix('\n').unwrap_or(&line);
        let compare = if strip_tabs { line.trim_start_matches('\t') } else { line };
        if compare == delimiter {
            return HeredocBody { content, terminated: true };
        }
        let kept = if strip_tabs { line.trim_start_matches('\t') } else { line };
        content.push_str(kept);
        content.push('\n');
    }
}

/// Walks the tree and fills `heredoc_content` on every pending heredoc
/// redirect, reading bodies from `read_line` in source order. Returns the
/// number of bodies attached.
pub fn attach_bodies(
    ast: &mut TopLevel,
    read_line: &mut dyn FnMut() -> Option<String>,
) -> usize {
    let mut pending = Vec::new();
    for item in &mut ast.items {
        match item {
            TopLevelItem::Function(f) => collect_list(&mut f.body, &mut pending),
            TopLevelItem::Statements(list) => collect_list(list, &mut pending),
        }
    }

    let mut attached = 0;
    for redirect in pending {
        let strip = redirect.kind == psh_ast::RedirectKind::HeredocStrip;
        let delimiter = redirect.target.clone().unwrap_or_default();
        let body = collect_body(&delimiter, strip, read_line);
        redirect.heredoc_content = Some(body.content);
        attached += 1;
    }
    attached
}

fn collect_list<'a>(list: &'a mut StatementList, out: &mut Vec<&'a mut Redirect>) {
    for and_or in &mut list.statements {
        for pipeline in &mut and_or.pipelines {
            for command in &mut pipeline.commands {
                collect_command(command, out);
            }
        }
    }
}

fn collect_redirects<'a>(redirects: &'a mut [Redirect], out: &mut Vec<&'a mut Redirect>) {
    for redirect in redirects {
        if redirect.kind.is_heredoc() && redirect.heredoc_content.is_none() {
            out.push(redirect);
        }
    }
}

fn collect_command<'a>(command: &'a mut Command, out: &mut Vec<&'a mut Redirect>) {
    match command {
        Command::Simple(cmd) => collect_redirects(&mut cmd.redirects, out),
        Command::Function(f) => collect_list(&mut f.body, out),
        Command::Break(_) | Command::Continue(_) => {}
        Command::Compound(compound) => match compound {
            CompoundCommand::While(n) => {
                collect_list(&mut n.condition, out);
                collect_list(&mut n.body, out);
                collect_redirects(&mut n.redirects, out);
            }
            CompoundCommand::For(n) => {
                collect_list(&mut n.body, out);
                collect_redirects(&mut n.redirects, out);
            }
            CompoundCommand::CStyleFor(n) => {
                collect_list(&mut n.body, out);
                collect_redirects(&mut n.redirects, out);
            }
            CompoundCommand::If(n) => {
                collect_list(&mut n.condition, out);
                collect_list(&mut n.then_part, out);
                for (cond, then) in &mut n.elif_parts {
                    collect_list(cond, out);
                    collect_list(then, out);
                }
                if let Some(else_part) = &mut n.else_part {
                    collect_list(else_part, out);
                }
                collect_redirects(&mut n.redirects, out);
            }
            CompoundCommand::Case(n) => {
                for item in &mut n.items {
                    collect_list(&mut item.commands, out);
                }
                collect_redirects(&mut n.redirects, out);
            }
            CompoundCommand::Select(n) => {
                collect_list(&mut n.body, out);
                collect_redirects(&mut n.redirects, out);
            }
            CompoundCommand::Arithmetic(n) => collect_redirects(&mut n.redirects, out),
            CompoundCommand::Test(n) => collect_redirects(&mut n.redirects, out),
            CompoundCommand::Subshell(n) => {
                collect_list(&mut n.body, out);
                collect_redirects(&mut n.redirects, out);
            }
            CompoundCommand::BraceGroup(n) => {
                collect_list(&mut n.body, out);
                collect_redirects(&mut n.redirects, out);
            }
        },
    }
}
