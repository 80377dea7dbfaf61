//! AST optimizer.
//!
//! Bottom-up transformer applying a small set of sound rewrites:
//!
//! - useless-`cat` elimination in multi-command pipelines (leading `cat
//!   FILE` becomes an input redirection on the next command),
//! - constant-condition folding for `if` (`true`, `:`, `false`),
//! - dead `while false` loops,
//! - removal of statements that collapse to nothing,
//! - retagging of expansion-free WORD arguments as LITERAL so a
//!   downstream expander can skip them.
//!
//! Each rule is applied to a fixed point, and the whole pass is
//! idempotent. `while true` loops are deliberately left alone.

use psh_ast::*;

use crate::transform::{self, AstTransformer};

/// Optimizing transformer. Counts applied rewrites in
/// [`Optimizer::optimizations_applied`].
#[derive(Default)]
pub struct Optimizer {
    pub optimizations_applied: usize,
}

impl Optimizer {
    pub fn new() -> Self {
        Optimizer::default()
    }

    /// Optimizes a whole tree.
    pub fn optimize(&mut self, ast: TopLevel) -> TopLevel {
        self.transform_top_level(ast)
    }

    /// Folds one already-transformed statement into zero or more
    /// replacement statements.
    fn fold_statement(&mut self, list: AndOrList) -> Vec<AndOrList> {
        enum Fold {
            Keep,
            IfTrue,
            IfFalse,
            DeadWhile,
        }

        let decision = match single_command(&list) {
            Some(Command::Compound(CompoundCommand::If(node))) => {
                if is_constant_true(&node.condition) {
                    Fold::IfTrue
                } else if is_constant_false(&node.condition) {
                    Fold::IfFalse
                } else {
                    Fold::Keep
                }
            }
            // `while false` never runs; `while true` is a real loop and
            // stays untouched.
            Some(Command::Compound(CompoundCommand::While(node)))
                if !node.until && is_constant_false(&node.condition) =>
            {
                Fold::DeadWhile
            }
            _ => Fold::Keep,
        };

        match decision {
            Fold::Keep => vec![list],
            Fold::DeadWhile => {
                self.optimizations_applied += 1;
                vec![]
            }
            Fold::IfTrue => {
                self.optimizations_applied += 1;
                match extract_if(list) {
                    CompoundCommand::If(node) => node.then_part.statements,
                    _ => vec![],
                }
            }
            Fold::IfFalse => {
                self.optimizations_applied += 1;
                match extract_if(list) {
                    CompoundCommand::If(node) => self.fold_false_if(node),
                    _ => vec![],
                }
            }
        }
    }

    /// `if false; …` reduces to the first elif (promoted to `if`), the
    /// else branch, or nothing.
    fn fold_false_if(&mut self, node: IfConditional) -> Vec<AndOrList> {
        let IfConditional { mut elif_parts, else_part, redirects, span, .. } = node;
        if !elif_parts.is_empty() {
            let (condition, then_part) = elif_parts.remove(0);
            let promoted = IfConditional {
                condition,
                then_part,
                elif_parts,
                else_part,
                redirects,
                span,
            };
            let statement = AndOrList {
                pipelines: vec![Pipeline {
                    commands: vec![Command::Compound(CompoundCommand::If(promoted))],
                    negated: false,
                    span,
                }],
                operators: vec![],
                span,
            };
            return self.fold_statement(statement);
        }
        match else_part {
            Some(else_part) => else_part.statements,
            None => vec![],
        }
    }

    /// Removes useless `cat` commands from a pipeline until stable.
    fn eliminate_useless_cat(&mut self, mut commands: Vec<Command>) -> Vec<Command> {
        loop {
            if commands.len() <= 1 {
                return commands;
            }
            // Leading `cat [FILE]` only forwards input: drop it and move
            // its input onto the next command.
            if let Some(redirect) = forwardable_input(&commands[0]) {
                let can_absorb = matches!(commands.get(1), Some(Command::Simple(_)));
                if can_absorb || redirect.is_none() {
                    self.optimizations_applied += 1;
                    commands.remove(0);
                    if let (Some(redirect), Some(Command::Simple(next))) =
                        (redirect, commands.first_mut())
                    {
                        next.redirects.insert(0, redirect);
                    }
                    continue;
                }
            }
            // Trailing plain `cat` just forwards the pipe.
            if commands.len() > 1 && is_plain_cat(&commands[commands.len() - 1]) {
                self.optimizations_applied += 1;
                commands.pop();
                continue;
            }
            // Plain `cat` between two non-cat commands.
            let middle = (1..commands.len().saturating_sub(1)).find(|&i| {
                is_plain_cat(&commands[i])
                    && !is_plain_cat(&commands[i - 1])
                    && !is_plain_cat(&commands[i + 1])
            });
            if let Some(i) = middle {
                self.optimizations_applied += 1;
                commands.remove(i);
                continue;
            }
            return commands;
        }
    }
}

impl AstTransformer for Optimizer {
    fn transform_top_level(&mut self, node: TopLevel) -> TopLevel {
        let transformed = transform::walk_top_level(self, node);
        let items = transformed
            .items
            .into_iter()
            .filter(|item| match item {
                TopLevelItem::Statements(list) => !list.statements.is_empty(),
                TopLevelItem::Function(_) => true,
            })
            .collect();
        TopLevel { items, span: transformed.span }
    }

    fn transform_statement_list(&mut self, node: StatementList) -> StatementList {
        let span = node.span;
        let mut statements = Vec::with_capacity(node.statements.len());
        for statement in node.statements {
            let transformed = self.transform_and_or_list(statement);
            statements.extend(self.fold_statement(transformed));
        }
        StatementList { statements, span }
    }

    fn transform_pipeline(&mut self, node: Pipeline) -> Pipeline {
        let transformed = transform::walk_pipeline(self, node);
        let commands = self.eliminate_useless_cat(transformed.commands);
        Pipeline { commands, negated: transformed.negated, span: transformed.span }
    }

    fn transform_simple_command(&mut self, mut node: SimpleCommand) -> SimpleCommand {
        // Expansion-free words need no runtime expansion pass.
        for (i, arg_type) in node.arg_types.iter_mut().enumerate() {
            if *arg_type == ArgType::Word
                && !node.args[i].chars().any(|c| matches!(c, '$' | '*' | '?' | '[' | '~'))
            {
                *arg_type = ArgType::Literal;
            }
        }
        node
    }
}

fn single_command(list: &AndOrList) -> Option<&Command> {
    if list.operators.is_empty() && list.pipelines.len() == 1 {
        let pipeline = &list.pipelines[0];
        if !pipeline.negated && pipeline.commands.len() == 1 {
            return pipeline.commands.first();
        }
    }
    None
}

/// Unwraps the single `if` command checked by [`single_command`].
fn extract_if(mut list: AndOrList) -> CompoundCommand {
    let mut pipeline = list.pipelines.remove(0);
    match pipeline.commands.remove(0) {
        Command::Compound(compound) => compound,
        // Unreachable: callers verified the shape.
        _ => CompoundCommand::BraceGroup(BraceGroup {
            body: StatementList::default(),
            redirects: vec![],
            span: None,
        }),
    }
}

/// A condition is constant iff it is exactly one simple command whose only
/// argument is `true`/`:` (or `false`).
fn constant_condition(condition: &StatementList) -> Option<&str> {
    if condition.statements.len() != 1 {
        return None;
    }
    let list = &condition.statements[0];
    let command = single_command(list)?;
    match command {
        Command::Simple(cmd) if cmd.args.len() == 1 && cmd.redirects.is_empty() => {
            Some(cmd.args[0].as_str())
        }
        _ => None,
    }
}

fn is_constant_true(condition: &StatementList) -> bool {
    matches!(constant_condition(condition), Some("true") | Some(":"))
}

fn is_constant_false(condition: &StatementList) -> bool {
    matches!(constant_condition(condition), Some("false"))
}

fn is_plain_cat(command: &Command) -> bool {
    match command {
        Command::Simple(cmd) => {
            cmd.args.len() == 1 && cmd.args[0] == "cat" && cmd.redirects.is_empty()
        }
        _ => false,
    }
}

/// `cat`, `cat FILE`, or `cat` with only input redirects at the head of a
/// pipeline forwards its input unchanged. Returns the input redirect to
/// reattach (if any); `None` inside `Some` means plain stdin passthrough.
#[allow(clippy::option_option)]
fn forwardable_input(command: &Command) -> Option<Option<Redirect>> {
    let Command::Simple(cmd) = command else { return None };
    if cmd.name() != Some("cat") || !cmd.array_assignments.is_empty() {
        return None;
    }
    match (cmd.args.len(), cmd.redirects.as_slice()) {
        (1, []) => Some(None),
        (2, []) => Some(Some(Redirect::to_target(RedirectKind::In, cmd.args[1].clone()))),
        (1, [single]) if single.kind == RedirectKind::In => Some(Some(single.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psh_ast::{NodeRef, structural_eq};
    use psh_parser::parse_source;

    fn optimize(src: &str) -> (TopLevel, usize) {
        let ast = parse_source(src).unwrap();
        let mut optimizer = Optimizer::new();
        let out = optimizer.optimize(ast);
        (out, optimizer.optimizations_applied)
    }

    fn first_statements(ast: &TopLevel) -> &StatementList {
        match &ast.items[0] {
            TopLevelItem::Statements(list) => list,
            TopLevelItem::Function(f) => &f.body,
        }
    }

    fn first_pipeline(ast: &TopLevel) -> &Pipeline {
        &first_statements(ast).statements[0].pipelines[0]
    }

    #[test]
    fn useless_cat_chain_reduces_to_redirected_grep() {
        let (ast, applied) = optimize("cat file | cat | grep x | cat");
        assert!(applied >= 3, "applied = {applied}");
        let pipeline = first_pipeline(&ast);
        assert_eq!(pipeline.commands.len(), 1);
        match &pipeline.commands[0] {
            Command::Simple(cmd) => {
                assert_eq!(cmd.args, vec!["grep", "x"]);
                assert_eq!(cmd.redirects.len(), 1);
                assert_eq!(cmd.redirects[0].kind, RedirectKind::In);
                assert_eq!(cmd.redirects[0].target.as_deref(), Some("file"));
            }
            other => panic!("expected grep, got {other:?}"),
        }
    }

    #[test]
    fn leading_plain_cat_is_dropped() {
        let (ast, applied) = optimize("cat | grep x");
        assert_eq!(applied, 1);
        assert_eq!(first_pipeline(&ast).commands.len(), 1);
    }

    #[test]
    fn cat_with_own_arguments_survives_in_the_middle() {
        let (ast, applied) = optimize("ls | cat -n | wc");
        assert_eq!(applied, 0);
        assert_eq!(first_pipeline(&ast).commands.len(), 3);
    }

    #[test]
    fn if_true_folds_to_then_branch() {
        let (ast, applied) = optimize("if true; then echo yes; fi");
        assert_eq!(applied, 1);
        let statements = first_statements(&ast);
        match &statements.statements[0].pipelines[0].commands[0] {
            Command::Simple(cmd) => assert_eq!(cmd.args[0], "echo"),
            other => panic!("expected folded echo, got {other:?}"),
        }
    }

    #[test]
    fn colon_counts_as_constant_true() {
        let (ast, applied) = optimize("if :; then echo yes; fi");
        assert_eq!(applied, 1);
        assert_eq!(first_statements(&ast).statements.len(), 1);
    }

    #[test]
    fn if_false_promotes_first_elif() {
        let (ast, applied) =
            optimize("if false; then echo a; elif $cond; then echo b; else echo c; fi");
        assert_eq!(applied, 1);
        match &first_statements(&ast).statements[0].pipelines[0].commands[0] {
            Command::Compound(CompoundCommand::If(node)) => {
                assert!(node.elif_parts.is_empty());
                assert!(node.else_part.is_some());
            }
            other => panic!("expected promoted if, got {other:?}"),
        }
    }

    #[test]
    fn if_false_without_branches_vanishes() {
        let (ast, _) = optimize("if false; then echo a; fi");
        assert!(ast.items.is_empty());
    }

    #[test]
    fn if_false_with_else_keeps_else_body() {
        let (ast, applied) = optimize("if false; then echo a; else echo b; fi");
        assert_eq!(applied, 1);
        match &first_statements(&ast).statements[0].pipelines[0].commands[0] {
            Command::Simple(cmd) => assert_eq!(cmd.args, vec!["echo", "b"]),
            other => panic!("expected else body, got {other:?}"),
        }
    }

    #[test]
    fn while_false_is_dead_code() {
        let (ast, applied) = optimize("while false; do echo never; done");
        assert_eq!(applied, 1);
        assert!(ast.items.is_empty());
    }

    #[test]
    fn while_true_is_not_touched() {
        let (ast, applied) = optimize("while true; do echo loop; done");
        assert_eq!(applied, 0);
        assert!(matches!(
            first_statements(&ast).statements[0].pipelines[0].commands[0],
            Command::Compound(CompoundCommand::While(_))
        ));
    }

    #[test]
    fn until_false_is_not_dead() {
        let (_, applied) = optimize("until false; do echo once; done");
        assert_eq!(applied, 0);
    }

    #[test]
    fn literal_retagging() {
        let (ast, _) = optimize("echo plain $var 'quoted'");
        match &first_pipeline(&ast).commands[0] {
            Command::Simple(cmd) => {
                assert_eq!(cmd.arg_types[0], ArgType::Literal); // echo
                assert_eq!(cmd.arg_types[1], ArgType::Literal); // plain
                assert_eq!(cmd.arg_types[2], ArgType::Variable);
                assert_eq!(cmd.arg_types[3], ArgType::SingleString);
            }
            other => panic!("expected simple, got {other:?}"),
        }
    }

    #[test]
    fn glob_words_are_not_retagged() {
        let (ast, _) = optimize("echo *.txt");
        match &first_pipeline(&ast).commands[0] {
            Command::Simple(cmd) => assert_eq!(cmd.arg_types[1], ArgType::Word),
            other => panic!("expected simple, got {other:?}"),
        }
    }

    #[test]
    fn optimizer_is_idempotent() {
        let sources = [
            "cat file | cat | grep x | cat",
            "if true; then echo yes; fi",
            "if false; then a; elif false; then b; else echo c; fi",
            "while false; do x; done\necho after",
            "f() { if :; then echo body; fi; }",
        ];
        for src in sources {
            let ast = parse_source(src).unwrap();
            let once = Optimizer::new().optimize(ast.clone());
            let twice = Optimizer::new().optimize(once.clone());
            assert!(
                structural_eq(NodeRef::TopLevel(&once), NodeRef::TopLevel(&twice)),
                "not idempotent for {src:?}"
            );
        }
    }

    #[test]
    fn nested_folding_inside_functions() {
        let (ast, applied) = optimize("f() { if true; then echo body; fi; }");
        assert_eq!(applied, 1);
        match &ast.items[0] {
            TopLevelItem::Function(f) => {
                match &f.body.statements[0].pipelines[0].commands[0] {
                    Command::Simple(cmd) => assert_eq!(cmd.args[0], "echo"),
                    other => panic!("expected folded body, got {other:?}"),
                }
            }
            other => panic!("expected function, got {other:?}"),
        }
    }

    #[test]
    fn chained_false_conditions_fold_completely() {
        let (ast, applied) = optimize("if false; then a; elif false; then b; else echo end; fi");
        assert_eq!(applied, 2);
        match &first_statements(&ast).statements[0].pipelines[0].commands[0] {
            Command::Simple(cmd) => assert_eq!(cmd.args, vec!["echo", "end"]),
            other => panic!("expected folded else, got {other:?}"),
        }
    }
}
