//! Read-only visitor dispatch.
//!
//! [`AstVisitor::visit`] dispatches by node kind through a match (constant
//! time; the tagged union plays the role the reflective method cache plays
//! in dynamic languages). Every per-kind method defaults to
//! [`AstVisitor::generic_visit`], which fails with a typed error so strict
//! analyzers get completeness checking for free; traversing analyzers
//! override `generic_visit` with [`walk_children`].

use psh_ast::{NodeKind, NodeRef};
use thiserror::Error;

/// Visit failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VisitError {
    /// A strict visitor met a node kind it has no handler for.
    #[error("No handler for node kind {kind}")]
    UnhandledNode { kind: NodeKind },
}

/// Result type for visitor operations
pub type VisitResult = std::result::Result<(), VisitError>;

/// Double-dispatch visitor over [`NodeRef`].
pub trait AstVisitor {
    /// Dispatches to the handler for the node's kind.
    fn visit(&mut self, node: NodeRef<'_>) -> VisitResult {
        match node {
            NodeRef::TopLevel(n) => self.visit_top_level(n),
            NodeRef::StatementList(n) => self.visit_statement_list(n),
            NodeRef::AndOrList(n) => self.visit_and_or_list(n),
            NodeRef::Pipeline(n) => self.visit_pipeline(n),
            NodeRef::SimpleCommand(n) => self.visit_simple_command(n),
            NodeRef::WhileLoop(n) => self.visit_while_loop(n),
            NodeRef::ForLoop(n) => self.visit_for_loop(n),
            NodeRef::CStyleForLoop(n) => self.visit_c_style_for_loop(n),
            NodeRef::IfConditional(n) => self.visit_if_conditional(n),
            NodeRef::CaseConditional(n) => self.visit_case_conditional(n),
            NodeRef::CaseItem(n) => self.visit_case_item(n),
            NodeRef::SelectLoop(n) => self.visit_select_loop(n),
            NodeRef::ArithmeticEvaluation(n) => self.visit_arithmetic_evaluation(n),
            NodeRef::EnhancedTestStatement(n) => self.visit_enhanced_test_statement(n),
            NodeRef::SubshellGroup(n) => self.visit_subshell_group(n),
            NodeRef::BraceGroup(n) => self.visit_brace_group(n),
            NodeRef::FunctionDef(n) => self.visit_function_def(n),
            NodeRef::BreakStatement(n) => self.visit_break_statement(n),
            NodeRef::ContinueStatement(n) => self.visit_continue_statement(n),
            NodeRef::Redirect(n) => self.visit_redirect(n),
            NodeRef::ArrayInitialization(n) => self.visit_array_initialization(n),
            NodeRef::ArrayElementAssignment(n) => self.visit_array_element_assignment(n),
            NodeRef::BinaryTestExpression(n) => self.visit_binary_test_expression(n),
            NodeRef::UnaryTestExpression(n) => self.visit_unary_test_expression(n),
            NodeRef::CompoundTestExpression(n) => self.visit_compound_test_expression(n),
            NodeRef::NegatedTestExpression(n) => self.visit_negated_test_expression(n),
        }
    }

    /// Fallback handler. The default is the strict behavior: a typed
    /// "unhandled" error. Traversing analyzers override this with
    /// `walk_children(self, node)`.
    fn generic_visit(&mut self, node: NodeRef<'_>) -> VisitResult {
        Err(VisitError::UnhandledNode { kind: node.kind() })
    }

    fn visit_top_level(&mut self, n: &psh_ast::TopLevel) -> VisitResult {
        self.generic_visit(NodeRef::TopLevel(n))
    }
    fn visit_statement_list(&mut self, n: &psh_ast::StatementList) -> VisitResult {
        self.generic_visit(NodeRef::StatementList(n))
    }
    fn visit_and_or_list(&mut self, n: &psh_ast::AndOrList) -> VisitResult {
        self.generic_visit(NodeRef::AndOrList(n))
    }
    fn visit_pipeline(&mut self, n: &psh_ast::Pipeline) -> VisitResult {
        self.generic_visit(NodeRef::Pipeline(n))
    }
    fn visit_simple_command(&mut self, n: &psh_ast::SimpleCommand) -> VisitResult {
        self.generic_visit(NodeRef::SimpleCommand(n))
    }
    fn visit_while_loop(&mut self, n: &psh_ast::WhileLoop) -> VisitResult {
        self.generic_visit(NodeRef::WhileLoop(n))
    }
    fn visit_for_loop(&mut self, n: &psh_ast::ForLoop) -> VisitResult {
        self.generic_visit(NodeRef::ForLoop(n))
    }
    fn visit_c_style_for_loop(&mut self, n: &psh_ast::CStyleForLoop) -> VisitResult {
        self.generic_visit(NodeRef::CStyleForLoop(n))
    }
    fn visit_if_conditional(&mut self, n: &psh_ast::IfConditional) -> VisitResult {
        self.generic_visit(NodeRef::IfConditional(n))
    }
    fn visit_case_conditional(&mut self, n: &psh_ast::CaseConditional) -> VisitResult {
        self.generic_visit(NodeRef::CaseConditional(n))
    }
    fn visit_case_item(&mut self, n: &psh_ast::CaseItem) -> VisitResult {
        self.generic_visit(NodeRef::CaseItem(n))
    }
    fn visit_select_loop(&mut self, n: &psh_ast::SelectLoop) -> VisitResult {
        self.generic_visit(NodeRef::SelectLoop(n))
    }
    fn visit_arithmetic_evaluation(&mut self, n: &psh_ast::ArithmeticEvaluation) -> VisitResult {
        self.generic_visit(NodeRef::ArithmeticEvaluation(n))
    }
    fn visit_enhanced_test_statement(&mut self, n: &psh_ast::EnhancedTestStatement) -> VisitResult {
        self.generic_visit(NodeRef::EnhancedTestStatement(n))
    }
    fn visit_subshell_group(&mut self, n: &psh_ast::SubshellGroup) -> VisitResult {
        self.generic_visit(NodeRef::SubshellGroup(n))
    }
    fn visit_brace_group(&mut self, n: &psh_ast::BraceGroup) -> VisitResult {
        self.generic_visit(NodeRef::BraceGroup(n))
    }
    fn visit_function_def(&mut self, n: &psh_ast::FunctionDef) -> VisitResult {
        self.generic_visit(NodeRef::FunctionDef(n))
    }
    fn visit_break_statement(&mut self, n: &psh_ast::BreakStatement) -> VisitResult {
        self.generic_visit(NodeRef::BreakStatement(n))
    }
    fn visit_continue_statement(&mut self, n: &psh_ast::ContinueStatement) -> VisitResult {
        self.generic_visit(NodeRef::ContinueStatement(n))
    }
    fn visit_redirect(&mut self, n: &psh_ast::Redirect) -> VisitResult {
        self.generic_visit(NodeRef::Redirect(n))
    }
    fn visit_array_initialization(&mut self, n: &psh_ast::ArrayInitialization) -> VisitResult {
        self.generic_visit(NodeRef::ArrayInitialization(n))
    }
    fn visit_array_element_assignment(
        &mut self,
        n: &psh_ast::ArrayElementAssignment,
    ) -> VisitResult {
        self.generic_visit(NodeRef::ArrayElementAssignment(n))
    }
    fn visit_binary_test_expression(&mut self, n: &psh_ast::BinaryTestExpression) -> VisitResult {
        self.generic_visit(NodeRef::BinaryTestExpression(n))
    }
    fn visit_unary_test_expression(&mut self, n: &psh_ast::UnaryTestExpression) -> VisitResult {
        self.generic_visit(NodeRef::UnaryTestExpression(n))
    }
    fn visit_compound_test_expression(
        &mut self,
        n: &psh_ast::CompoundTestExpression,
    ) -> VisitResult {
        self.generic_visit(NodeRef::CompoundTestExpression(n))
    }
    fn visit_negated_test_expression(&mut self, n: &psh_ast::NegatedTestExpression) -> VisitResult {
        self.generic_visit(NodeRef::NegatedTestExpression(n))
    }
}

/// Visits all children of `node` in source order.
pub fn walk_children<V: AstVisitor + ?Sized>(visitor: &mut V, node: NodeRef<'_>) -> VisitResult {
    for child in node.children() {
        visitor.visit(child)?;
    }
    Ok(())
}
