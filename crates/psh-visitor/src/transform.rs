//! Transforming visitor base.
//!
//! Transformers rebuild the tree bottom-up: every `transform_*` method
//! defaults to the matching `walk_*` function, which transforms the
//! children first and reassembles the node. Overrides therefore see
//! already-simplified children. Unchanged subtrees are moved, not cloned;
//! the input tree is consumed.

use psh_ast::*;

/// AST → AST rewriter. All rewrites are total: the default for every node
/// kind is reconstruction with transformed children.
pub trait AstTransformer {
    fn transform_top_level(&mut self, node: TopLevel) -> TopLevel {
        walk_top_level(self, node)
    }

    fn transform_statement_list(&mut self, node: StatementList) -> StatementList {
        walk_statement_list(self, node)
    }

    fn transform_and_or_list(&mut self, node: AndOrList) -> AndOrList {
        walk_and_or_list(self, node)
    }

    fn transform_pipeline(&mut self, node: Pipeline) -> Pipeline {
        walk_pipeline(self, node)
    }

    fn transform_command(&mut self, node: Command) -> Command {
        walk_command(self, node)
    }

    fn transform_simple_command(&mut self, node: SimpleCommand) -> SimpleCommand {
        node
    }

    fn transform_while_loop(&mut self, node: WhileLoop) -> WhileLoop {
        walk_while_loop(self, node)
    }

    fn transform_for_loop(&mut self, node: ForLoop) -> ForLoop {
        walk_for_loop(self, node)
    }

    fn transform_c_style_for_loop(&mut self, node: CStyleForLoop) -> CStyleForLoop {
        walk_c_style_for_loop(self, node)
    }

    fn transform_if_conditional(&mut self, node: IfConditional) -> IfConditional {
        walk_if_conditional(self, node)
    }

    fn transform_case_conditional(&mut self, node: CaseConditional) -> CaseConditional {
        walk_case_conditional(self, node)
    }

    fn transform_select_loop(&mut self, node: SelectLoop) -> SelectLoop {
        walk_select_loop(self, node)
    }

    fn transform_arithmetic_evaluation(&mut self, node: ArithmeticEvaluation) -> ArithmeticEvaluation {
        node
    }

    fn transform_enhanced_test_statement(&mut self, node: EnhancedTestStatement) -> EnhancedTestStatement {
        node
    }

    fn transform_subshell_group(&mut self, node: SubshellGroup) -> SubshellGroup {
        walk_subshell_group(self, node)
    }

    fn transform_brace_group(&mut self, node: BraceGroup) -> BraceGroup {
        walk_brace_group(self, node)
    }

    fn transform_function_def(&mut self, node: FunctionDef) -> FunctionDef {
        walk_function_def(self, node)
    }

    fn transform_redirect(&mut self, node: Redirect) -> Redirect {
        node
    }
}

pub fn walk_top_level<T: AstTransformer + ?Sized>(t: &mut T, node: TopLevel) -> TopLevel {
    let items = node
        .items
        .into_iter()
        .map(|item| match item {
            TopLevelItem::Function(f) => TopLevelItem::Function(t.transform_function_def(f)),
            TopLevelItem::Statements(s) => {
                TopLevelItem::Statements(t.transform_statement_list(s))
            }
        })
        .collect();
    TopLevel { items, span: node.span }
}

pub fn walk_statement_list<T: AstTransformer + ?Sized>(
    t: &mut T,
    node: StatementList,
) -> StatementList {
    let statements = node.statements.into_iter().map(|s| t.transform_and_or_list(s)).collect();
    StatementList { statements, span: node.span }
}

pub fn walk_and_or_list<T: AstTransformer + ?Sized>(t: &mut T, node: AndOrList) -> AndOrList {
    let pipelines = node.pipelines.into_iter().map(|p| t.transform_pipeline(p)).collect();
    AndOrList { pipelines, operators: node.operators, span: node.span }
}

pub fn walk_pipeline<T: AstTransformer + ?Sized>(t: &mut T, node: Pipeline) -> Pipeline {
    let commands = node.commands.into_iter().map(|c| t.transform_command(c)).collect();
    Pipeline { commands, negated: node.negated, span: node.span }
}

pub fn walk_command<T: AstTransformer + ?Sized>(t: &mut T, node: Command) -> Command {
    match node {
        Command::Simple(cmd) => Command::Simple(t.transform_simple_command(cmd)),
        Command::Function(f) => Command::Function(t.transform_function_def(f)),
        Command::Break(b) => Command::Break(b),
        Command::Continue(c) => Command::Continue(c),
        Command::Compound(compound) => Command::Compound(match compound {
            CompoundCommand::While(n) => CompoundCommand::While(t.transform_while_loop(n)),
            CompoundCommand::For(n) => CompoundCommand::For(t.transform_for_loop(n)),
            CompoundCommand::CStyleFor(n) => {
                CompoundCommand::CStyleFor(t.transform_c_style_for_loop(n))
            }
            CompoundCommand::If(n) => CompoundCommand::If(t.transform_if_conditional(n)),
            CompoundCommand::Case(n) => CompoundCommand::Case(t.transform_case_conditional(n)),
            CompoundCommand::Select(n) => CompoundCommand::Select(t.transform_select_loop(n)),
            CompoundCommand::Arithmetic(n) => {
                CompoundCommand::Arithmetic(t.transform_arithmetic_evaluation(n))
            }
            CompoundCommand::Test(n) => {
                CompoundCommand::Test(t.transform_enhanced_test_statement(n))
            }
            CompoundCommand::Subshell(n) => {
                CompoundCommand::Subshell(t.transform_subshell_group(n))
            }
            CompoundCommand::BraceGroup(n) => {
                CompoundCommand::BraceGroup(t.transform_brace_group(n))
            }
        }),
    }
}

fn walk_redirects<T: AstTransformer + ?Sized>(t: &mut T, redirects: Vec<Redirect>) -> Vec<Redirect> {
    redirects.into_iter().map(|r| t.transform_redirect(r)).collect()
}

pub fn walk_while_loop<T: AstTransformer + ?Sized>(t: &mut T, node: WhileLoop) -> WhileLoop {
    WhileLoop {
        condition: t.transform_statement_list(node.condition),
        body: t.transform_statement_list(node.body),
        until: node.until,
        redirects: walk_redirects(t, node.redirects),
        span: node.span,
    }
}

pub fn walk_for_loop<T: AstTransformer + ?Sized>(t: &mut T, node: ForLoop) -> ForLoop {
    ForLoop {
        variable: node.variable,
        items: node.items,
        body: t.transform_statement_list(node.body),
        redirects: walk_redirects(t, node.redirects),
        span: node.span,
    }
}

pub fn walk_c_style_for_loop<T: AstTransformer + ?Sized>(
    t: &mut T,
    node: CStyleForLoop,
) -> CStyleForLoop {
    CStyleForLoop {
        init_expr: node.init_expr,
        condition_expr: node.condition_expr,
        update_expr: node.update_expr,
        body: t.transform_statement_list(node.body),
        redirects: walk_redirects(t, node.redirects),
        span: node.span,
    }
}

pub fn walk_if_conditional<T: AstTransformer + ?Sized>(
    t: &mut T,
    node: IfConditional,
) -> IfConditional {
    IfConditional {
        condition: t.transform_statement_list(node.condition),
        then_part: t.transform_statement_list(node.then_part),
        elif_parts: node
            .elif_parts
            .into_iter()
            .map(|(c, b)| (t.transform_statement_list(c), t.transform_statement_list(b)))
            .collect(),
        else_part: node.else_part.map(|e| t.transform_statement_list(e)),
        redirects: walk_redirects(t, node.redirects),
        span: node.span,
    }
}

pub fn walk_case_conditional<T: AstTransformer + ?Sized>(
    t: &mut T,
    node: CaseConditional,
) -> CaseConditional {
    CaseConditional {
        expr: node.expr,
        items: node
            .items
            .into_iter()
            .map(|item| CaseItem {
                patterns: item.patterns,
                commands: t.transform_statement_list(item.commands),
                terminator: item.terminator,
                span: item.span,
            })
            .collect(),
        redirects: walk_redirects(t, node.redirects),
        span: node.span,
    }
}

pub fn walk_select_loop<T: AstTransformer + ?Sized>(t: &mut T, node: SelectLoop) -> SelectLoop {
    SelectLoop {
        variable: node.variable,
        items: node.items,
        body: t.transform_statement_list(node.body),
        redirects: walk_redirects(t, node.redirects),
        span: node.span,
    }
}

pub fn walk_subshell_group<T: AstTransformer + ?Sized>(
    t: &mut T,
    node: SubshellGroup,
) -> SubshellGroup {
    SubshellGroup {
        body: t.transform_statement_list(node.body),
        redirects: walk_redirects(t, node.redirects),
        span: node.span,
    }
}

pub fn walk_brace_group<T: AstTransformer + ?Sized>(t: &mut T, node: BraceGroup) -> BraceGroup {
    BraceGroup {
        body: t.transform_statement_list(node.body),
        redirects: walk_redirects(t, node.redirects),
        span: node.span,
    }
}

pub fn walk_function_def<T: AstTransformer + ?Sized>(t: &mut T, node: FunctionDef) -> FunctionDef {
    FunctionDef { name: node.name, body: t.transform_statement_list(node.body), span: node.span }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psh_ast::{NodeRef, structural_eq};

    /// Identity transformer: the walk alone must reproduce the tree.
    struct Identity;
    impl AstTransformer for Identity {}

    #[test]
    fn default_walk_is_identity() {
        let src = "if [[ -f x ]]; then echo a | wc; fi\nf() { for i in 1 2; do echo $i; done; }";
        let ast = psh_parser::parse_source(src).unwrap();
        let copy = ast.clone();
        let out = Identity.transform_top_level(ast);
        assert!(structural_eq(NodeRef::TopLevel(&copy), NodeRef::TopLevel(&out)));
    }

    /// Renaming transformer exercises the bottom-up override path.
    struct RenameEcho;
    impl AstTransformer for RenameEcho {
        fn transform_simple_command(&mut self, mut node: psh_ast::SimpleCommand) -> psh_ast::SimpleCommand {
            if node.name() == Some("echo") {
                node.args[0] = "printf".to_string();
            }
            node
        }
    }

    #[test]
    fn overrides_reach_nested_commands() {
        let ast = psh_parser::parse_source("while true; do echo hi; done").unwrap();
        let out = RenameEcho.transform_top_level(ast);
        let rendered = format!("{out:?}");
        assert!(rendered.contains("printf"));
        assert!(!rendered.contains("\"echo\""));
    }
}
