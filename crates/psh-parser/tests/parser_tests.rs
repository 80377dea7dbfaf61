//! Grammar coverage tests for the shell parser.

use psh_ast::*;
use psh_parser::{ParseError, parse_source};
use rstest::rstest;

fn statements(ast: &TopLevel) -> &StatementList {
    match &ast.items[0] {
        TopLevelItem::Statements(list) => list,
        TopLevelItem::Function(f) => panic!("expected statements, got function {}", f.name),
    }
}

fn first_command(ast: &TopLevel) -> &Command {
    &statements(ast).statements[0].pipelines[0].commands[0]
}

fn compound(ast: &TopLevel) -> &CompoundCommand {
    match first_command(ast) {
        Command::Compound(c) => c,
        other => panic!("expected compound command, got {other:?}"),
    }
}

#[test]
fn pipeline_with_negation() {
    let ast = parse_source("! cat file | grep x | wc -l").unwrap();
    let pipeline = &statements(&ast).statements[0].pipelines[0];
    assert!(pipeline.negated);
    assert_eq!(pipeline.commands.len(), 3);
}

#[test]
fn if_elif_else() {
    let ast = parse_source(
        "if test -f a; then echo a; elif test -f b; then echo b; else echo c; fi",
    )
    .unwrap();
    match compound(&ast) {
        CompoundCommand::If(node) => {
            assert_eq!(node.elif_parts.len(), 1);
            assert!(node.else_part.is_some());
            assert_eq!(node.condition.statements.len(), 1);
        }
        other => panic!("expected if, got {other:?}"),
    }
}

#[test]
fn while_and_until() {
    let ast = parse_source("while true; do echo hi; done").unwrap();
    match compound(&ast) {
        CompoundCommand::While(node) => assert!(!node.until),
        other => panic!("expected while, got {other:?}"),
    }
    let ast = parse_source("until test -f lock; do sleep 1; done").unwrap();
    match compound(&ast) {
        CompoundCommand::While(node) => assert!(node.until),
        other => panic!("expected until, got {other:?}"),
    }
}

#[test]
fn for_loop_items() {
    let ast = parse_source("for i in a b \"c d\"; do echo $i; done").unwrap();
    match compound(&ast) {
        CompoundCommand::For(node) => {
            assert_eq!(node.variable, "i");
            assert_eq!(node.items, vec!["a", "b", "c d"]);
        }
        other => panic!("expected for, got {other:?}"),
    }
}

#[test]
fn c_style_for_loop() {
    let ast = parse_source("for ((i=0;i<3;i++)); do echo $i; done").unwrap();
    match compound(&ast) {
        CompoundCommand::CStyleFor(node) => {
            assert_eq!(node.init_expr.as_deref(), Some("i=0"));
            assert_eq!(node.condition_expr.as_deref(), Some("i<3"));
            assert_eq!(node.update_expr.as_deref(), Some("i++"));
        }
        other => panic!("expected c-style for, got {other:?}"),
    }
}

#[test]
fn c_style_for_without_do() {
    // The `do` keyword may be omitted; the next command list is the body.
    let ast = parse_source("for ((;;))\necho forever\ndone").unwrap();
    match compound(&ast) {
        CompoundCommand::CStyleFor(node) => {
            assert!(node.init_expr.is_none());
            assert!(node.condition_expr.is_none());
            assert_eq!(node.body.statements.len(), 1);
        }
        other => panic!("expected c-style for, got {other:?}"),
    }
}

#[test]
fn case_with_terminators() {
    let ast = parse_source("case $x in a) echo a;; b) echo b;& c) echo c;;& esac").unwrap();
    match compound(&ast) {
        CompoundCommand::Case(node) => {
            assert_eq!(node.expr, "$x");
            assert_eq!(node.items.len(), 3);
            assert_eq!(node.items[0].terminator, CaseTerminator::Normal);
            assert_eq!(node.items[1].terminator, CaseTerminator::FallThrough);
            assert_eq!(node.items[2].terminator, CaseTerminator::ContinueMatching);
        }
        other => panic!("expected case, got {other:?}"),
    }
}

#[test]
fn case_multi_pattern_item() {
    let ast = parse_source("case $x in a|b) echo ab;; *) echo other;; esac").unwrap();
    match compound(&ast) {
        CompoundCommand::Case(node) => {
            assert_eq!(node.items[0].patterns.len(), 2);
            assert_eq!(node.items[1].patterns[0].pattern, "*");
        }
        other => panic!("expected case, got {other:?}"),
    }
}

#[test]
fn select_loop() {
    let ast = parse_source("select opt in one two; do echo $opt; done").unwrap();
    match compound(&ast) {
        CompoundCommand::Select(node) => {
            assert_eq!(node.variable, "opt");
            assert_eq!(node.items, vec!["one", "two"]);
        }
        other => panic!("expected select, got {other:?}"),
    }
}

#[test]
fn subshell_and_brace_group() {
    let ast = parse_source("( cd /tmp; ls )").unwrap();
    assert!(matches!(compound(&ast), CompoundCommand::Subshell(_)));

    let ast = parse_source("{ echo a; echo b; }").unwrap();
    match compound(&ast) {
        CompoundCommand::BraceGroup(node) => assert_eq!(node.body.statements.len(), 2),
        other => panic!("expected brace group, got {other:?}"),
    }
}

#[test]
fn arithmetic_evaluation() {
    let ast = parse_source("((x = x + 1))").unwrap();
    match compound(&ast) {
        CompoundCommand::Arithmetic(node) => assert_eq!(node.expression, "x = x + 1"),
        other => panic!("expected arithmetic, got {other:?}"),
    }
}

#[test]
fn enhanced_test_expressions() {
    let ast = parse_source("[[ -f $file && ( $x == y* || $z != w ) ]]").unwrap();
    match compound(&ast) {
        CompoundCommand::Test(node) => match &node.expression {
            TestExpr::Compound(c) => {
                assert_eq!(c.operator, AndOrOp::And);
                assert!(matches!(&*c.left, TestExpr::Unary(u) if u.operator == "-f"));
                assert!(matches!(&*c.right, TestExpr::Compound(inner) if inner.operator == AndOrOp::Or));
            }
            other => panic!("expected compound test, got {other:?}"),
        },
        other => panic!("expected test, got {other:?}"),
    }
}

#[test]
fn negated_test_expression() {
    let ast = parse_source("[[ ! -d $dir ]]").unwrap();
    match compound(&ast) {
        CompoundCommand::Test(node) => {
            assert!(matches!(&node.expression, TestExpr::Negated(_)));
        }
        other => panic!("expected test, got {other:?}"),
    }
}

#[test]
fn function_definition_forms() {
    for src in ["greet() { echo hi; }", "function greet { echo hi; }", "function greet() { echo hi; }"] {
        let ast = parse_source(src).unwrap();
        match &ast.items[0] {
            TopLevelItem::Function(f) => {
                assert_eq!(f.name, "greet", "source: {src}");
                assert_eq!(f.body.statements.len(), 1);
            }
            other => panic!("expected function for {src:?}, got {other:?}"),
        }
    }
}

#[test]
fn functions_interleave_with_statements() {
    let ast = parse_source("echo before\nf() { echo in; }\necho after").unwrap();
    assert_eq!(ast.items.len(), 3);
    assert!(matches!(ast.items[0], TopLevelItem::Statements(_)));
    assert!(matches!(ast.items[1], TopLevelItem::Function(_)));
    assert!(matches!(ast.items[2], TopLevelItem::Statements(_)));
}

#[test]
fn redirections_collected_in_source_order() {
    let ast = parse_source("> first cmd < second arg >> third").unwrap();
    match first_command(&ast) {
        Command::Simple(cmd) => {
            assert_eq!(cmd.args, vec!["cmd", "arg"]);
            let kinds: Vec<_> = cmd.redirects.iter().map(|r| r.kind).collect();
            assert_eq!(
                kinds,
                vec![RedirectKind::Out, RedirectKind::In, RedirectKind::Append]
            );
            assert_eq!(cmd.redirects[0].target.as_deref(), Some("first"));
        }
        other => panic!("expected simple, got {other:?}"),
    }
}

#[test]
fn fd_redirects_and_duplication() {
    let ast = parse_source("cmd 2> err.log 2>&1 3<&0").unwrap();
    match first_command(&ast) {
        Command::Simple(cmd) => {
            assert_eq!(cmd.redirects[0].fd, Some(2));
            assert_eq!(cmd.redirects[0].kind, RedirectKind::Out);
            assert_eq!(cmd.redirects[1].kind, RedirectKind::DupOut);
            assert_eq!(cmd.redirects[1].dup_fd, Some(1));
            assert_eq!(cmd.redirects[2].fd, Some(3));
            assert_eq!(cmd.redirects[2].kind, RedirectKind::DupIn);
            assert_eq!(cmd.redirects[2].dup_fd, Some(0));
        }
        other => panic!("expected simple, got {other:?}"),
    }
}

#[test]
fn malformed_dup_target_is_preserved_for_validation() {
    // `> &1` with a space: parses with the suspicious target so the
    // validator can flag it.
    let ast = parse_source("cmd > &1").unwrap();
    match first_command(&ast) {
        Command::Simple(cmd) => {
            assert_eq!(cmd.redirects[0].target.as_deref(), Some("&1"));
        }
        other => panic!("expected simple, got {other:?}"),
    }
}

#[test]
fn heredoc_redirect_records_delimiter_and_quoting() {
    let ast = parse_source("cat <<EOF").unwrap();
    match first_command(&ast) {
        Command::Simple(cmd) => {
            let r = &cmd.redirects[0];
            assert_eq!(r.kind, RedirectKind::Heredoc);
            assert_eq!(r.target.as_deref(), Some("EOF"));
            assert_eq!(r.heredoc_quoted, Some(false));
            assert!(r.heredoc_content.is_none());
        }
        other => panic!("expected simple, got {other:?}"),
    }

    let ast = parse_source("cat <<-'END'").unwrap();
    match first_command(&ast) {
        Command::Simple(cmd) => {
            assert_eq!(cmd.redirects[0].kind, RedirectKind::HeredocStrip);
            assert_eq!(cmd.redirects[0].heredoc_quoted, Some(true));
        }
        other => panic!("expected simple, got {other:?}"),
    }
}

#[test]
fn array_initialization() {
    let ast = parse_source("files=(a.txt 'b c.txt' $d)").unwrap();
    match first_command(&ast) {
        Command::Simple(cmd) => {
            assert!(cmd.args.is_empty());
            match &cmd.array_assignments[0] {
                ArrayAssignment::Initialization(init) => {
                    assert_eq!(init.name, "files");
                    assert_eq!(init.elements, vec!["a.txt", "b c.txt", "$d"]);
                    assert_eq!(
                        init.element_types,
                        vec![ArgType::Word, ArgType::SingleString, ArgType::Variable]
                    );
                    assert!(!init.is_append);
                }
                other => panic!("expected initialization, got {other:?}"),
            }
        }
        other => panic!("expected simple, got {other:?}"),
    }
}

#[test]
fn array_append_and_element_assignment() {
    let ast = parse_source("files+=(d.txt)").unwrap();
    match first_command(&ast) {
        Command::Simple(cmd) => match &cmd.array_assignments[0] {
            ArrayAssignment::Initialization(init) => assert!(init.is_append),
            other => panic!("expected initialization, got {other:?}"),
        },
        other => panic!("expected simple, got {other:?}"),
    }

    let ast = parse_source("arr[2]=value").unwrap();
    match first_command(&ast) {
        Command::Simple(cmd) => match &cmd.array_assignments[0] {
            ArrayAssignment::ElementAssignment(assign) => {
                assert_eq!(assign.name, "arr");
                assert_eq!(assign.index, "2");
                assert_eq!(assign.value, "value");
            }
            other => panic!("expected element assignment, got {other:?}"),
        },
        other => panic!("expected simple, got {other:?}"),
    }
}

#[test]
fn break_and_continue_levels() {
    let ast = parse_source("while true; do break 2; done").unwrap();
    match compound(&ast) {
        CompoundCommand::While(node) => {
            match &node.body.statements[0].pipelines[0].commands[0] {
                Command::Break(b) => assert_eq!(b.level, 2),
                other => panic!("expected break, got {other:?}"),
            }
        }
        other => panic!("expected while, got {other:?}"),
    }
    // The parser accepts break/continue anywhere; loop context is the
    // validator's concern.
    let ast = parse_source("continue").unwrap();
    assert!(matches!(first_command(&ast), Command::Continue(c) if c.level == 1));
}

#[test]
fn keywords_are_plain_words_in_argument_position() {
    let ast = parse_source("echo done fi esac").unwrap();
    match first_command(&ast) {
        Command::Simple(cmd) => assert_eq!(cmd.args, vec!["echo", "done", "fi", "esac"]),
        other => panic!("expected simple, got {other:?}"),
    }
}

#[test]
fn prefix_assignments_flow_into_args() {
    let ast = parse_source("LC_ALL=C sort file").unwrap();
    match first_command(&ast) {
        Command::Simple(cmd) => {
            assert_eq!(cmd.args, vec!["LC_ALL=C", "sort", "file"]);
        }
        other => panic!("expected simple, got {other:?}"),
    }
}

#[rstest]
#[case("echo )")]
#[case("| echo")]
#[case("echo a ; ; echo b")]
#[case("then")]
fn hard_errors_are_not_incomplete(#[case] src: &str) {
    let err = parse_source(src).unwrap_err();
    assert!(!err.is_incomplete(), "source {src:?} gave incomplete {err:?}");
}

#[test]
fn and_or_shape_invariant_holds_across_corpus() {
    let corpus = [
        "a",
        "a && b",
        "a || b && c",
        "a | b || c && d | e",
        "! a && b",
    ];
    for src in corpus {
        let ast = parse_source(src).unwrap();
        for statement in &statements(&ast).statements {
            assert_eq!(
                statement.operators.len(),
                statement.pipelines.len().saturating_sub(1),
                "source: {src}"
            );
        }
    }
}

#[test]
fn parse_error_reports_offending_token() {
    let err = parse_source("echo hello;; echo world").unwrap_err();
    match err {
        ParseError::Unexpected { found: Some(token), .. } => {
            assert_eq!(&*token.value, ";;");
            assert_eq!(token.span.start, 10);
        }
        other => panic!("expected unexpected-token error, got {other:?}"),
    }
}
