//! Structural AST validator.
//!
//! Collects issues without ever aborting the traversal. Rules cover
//! semantic errors (break/continue outside loops), common mistakes (cd
//! with too many arguments), and suspicious constructs (duplicate case
//! patterns, empty loop conditions). The enhanced tier in
//! [`crate::enhanced`] reuses the per-node checks here and layers variable
//! tracking, quoting, and security analysis on top.

use std::fmt;

use psh_ast::*;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::visit::{AstVisitor, VisitResult, walk_children};

/// Severity levels for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validation issue found in the AST.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub message: String,
    #[serde(serialize_with = "serialize_kind")]
    pub node_kind: NodeKind,
    /// Human-readable location, e.g. "for loop (var: i) > if statement".
    pub context: Option<String>,
}

fn serialize_kind<S: serde::Serializer>(kind: &NodeKind, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(kind.as_str())
}

/// Visitor that validates AST correctness and collects issues.
pub struct Validator {
    pub issues: Vec<ValidationIssue>,
    pub(crate) in_loop: usize,
    pub(crate) in_function: bool,
    pub(crate) function_names: FxHashSet<String>,
    pub(crate) variable_names: FxHashSet<String>,
    pub(crate) pipeline_commands: usize,
    context: Vec<String>,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Validator {
            issues: Vec::new(),
            in_loop: 0,
            in_function: false,
            function_names: FxHashSet::default(),
            variable_names: FxHashSet::default(),
            pipeline_commands: 0,
            context: Vec::new(),
        }
    }

    pub(crate) fn push_context(&mut self, context: impl Into<String>) {
        self.context.push(context.into());
    }

    pub(crate) fn pop_context(&mut self) {
        self.context.pop();
    }

    pub(crate) fn current_context(&self) -> Option<String> {
        if self.context.is_empty() { None } else { Some(self.context.join(" > ")) }
    }

    pub(crate) fn add(&mut self, severity: Severity, message: impl Into<String>, kind: NodeKind) {
        self.issues.push(ValidationIssue {
            severity,
            message: message.into(),
            node_kind: kind,
            context: self.current_context(),
        });
    }

    pub(crate) fn add_error(&mut self, message: impl Into<String>, kind: NodeKind) {
        self.add(Severity::Error, message, kind);
    }

    pub(crate) fn add_warning(&mut self, message: impl Into<String>, kind: NodeKind) {
        self.add(Severity::Warning, message, kind);
    }

    pub(crate) fn add_info(&mut self, message: impl Into<String>, kind: NodeKind) {
        self.add(Severity::Info, message, kind);
    }

    pub fn error_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Warning).count()
    }

    pub fn info_count(&self) -> usize {
        self.issues.iter().filter(|i| i.severity == Severity::Info).count()
    }

    /// Formatted summary of validation results.
    pub fn get_summary(&self) -> String {
        if self.issues.is_empty() {
            return "No issues found - AST is valid!".to_string();
        }
        let mut lines = vec![format!("Found {} issue(s):", self.issues.len())];
        let errors = self.error_count();
        let warnings = self.warning_count();
        let infos = self.info_count();
        if errors > 0 {
            lines.push(format!("  - {errors} error(s)"));
        }
        if warnings > 0 {
            lines.push(format!("  - {warnings} warning(s)"));
        }
        if infos > 0 {
            lines.push(format!("  - {infos} info message(s)"));
        }
        lines.push(String::new());

        for severity in [Severity::Error, Severity::Warning, Severity::Info] {
            let group: Vec<_> = self.issues.iter().filter(|i| i.severity == severity).collect();
            if group.is_empty() {
                continue;
            }
            lines.push(format!("{}S:", severity.as_str().to_uppercase()));
            for issue in group {
                let mut prefix = format!("  [{}]", issue.node_kind);
                if let Some(context) = &issue.context {
                    prefix.push_str(&format!(" in {context}"));
                }
                lines.push(format!("{prefix}: {}", issue.message));
            }
            lines.push(String::new());
        }
        lines.join("\n").trim_end().to_string()
    }

    // ===== per-node rule checks (shared with the enhanced tier) =====

    pub(crate) fn check_simple_command(&mut self, node: &SimpleCommand) {
        let kind = NodeKind::SimpleCommand;
        if node.args.is_empty() && node.array_assignments.is_empty() {
            self.add_error("Empty command with no arguments or assignments", kind);
            return;
        }
        if let Some(cmd) = node.name() {
            if cmd == "cd" && node.args.len() > 2 {
                self.add_warning(
                    format!(
                        "cd: too many arguments (got {}, expected 0 or 1)",
                        node.args.len() - 1
                    ),
                    kind,
                );
            }
            if cmd == "which" {
                self.add_info(
                    "Consider using 'command -v' instead of 'which' for better portability",
                    kind,
                );
            }
            if cmd == "cat" && node.args.len() == 2 && self.pipeline_commands > 1 {
                self.add_warning(
                    "Useless use of cat - consider using input redirection instead",
                    kind,
                );
            }
            // Track assignment-looking arguments for later passes.
            for arg in &node.args {
                if let Some(eq) = arg.find('=') {
                    if eq > 0 {
                        self.variable_names.insert(arg[..eq].to_string());
                    }
                }
            }
        }
    }

    pub(crate) fn check_pipeline(&mut self, node: &Pipeline) {
        if node.commands.is_empty() {
            self.add_error("Empty pipeline with no commands", NodeKind::Pipeline);
        }
    }

    pub(crate) fn check_and_or_list(&mut self, node: &AndOrList) {
        let kind = NodeKind::AndOrList;
        if node.pipelines.is_empty() {
            self.add_error("Empty and/or list with no pipelines", kind);
            return;
        }
        if node.operators.len() != node.pipelines.len() - 1 {
            self.add_error(
                format!(
                    "Mismatched operators and pipelines: {} operators for {} pipelines",
                    node.operators.len(),
                    node.pipelines.len()
                ),
                kind,
            );
        }
    }

    pub(crate) fn check_while_loop(&mut self, node: &WhileLoop) {
        if node.condition.statements.is_empty() {
            self.add_warning(
                "While loop with empty condition will loop forever",
                NodeKind::WhileLoop,
            );
        }
    }

    pub(crate) fn check_for_loop(&mut self, node: &ForLoop) {
        let kind = NodeKind::ForLoop;
        if node.items.is_empty() {
            self.add_warning("For loop with no items will not execute", kind);
        }
        if !node.variable.is_empty() && node.variable.bytes().all(|b| b.is_ascii_digit()) {
            self.add_error(
                format!("Invalid variable name '{}' (cannot be numeric)", node.variable),
                kind,
            );
        }
        self.variable_names.insert(node.variable.clone());
    }

    pub(crate) fn check_c_style_for_loop(&mut self, node: &CStyleForLoop) {
        if node.condition_expr.is_none() {
            self.add_warning(
                "C-style for loop with no condition will loop forever (use 'while true' for clarity)",
                NodeKind::CStyleForLoop,
            );
        }
    }

    pub(crate) fn check_if_conditional(&mut self, node: &IfConditional) {
        let kind = NodeKind::IfConditional;
        if node.condition.statements.is_empty() {
            self.add_error("If statement with empty condition", kind);
        }
        if node.then_part.statements.is_empty() {
            self.add_warning("If statement with empty then block", kind);
        }
    }

    pub(crate) fn check_case_conditional(&mut self, node: &CaseConditional) {
        let kind = NodeKind::CaseConditional;
        if node.items.is_empty() {
            self.add_warning("Case statement with no patterns", kind);
        }
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        for item in &node.items {
            for pattern in &item.patterns {
                if !seen.insert(&pattern.pattern) {
                    self.add_warning(
                        format!("Duplicate case pattern '{}'", pattern.pattern),
                        kind,
                    );
                }
            }
        }
    }

    pub(crate) fn check_case_item(&mut self, node: &CaseItem) {
        let kind = NodeKind::CaseItem;
        if node.patterns.is_empty() {
            self.add_error("Case item with no patterns", kind);
        }
        if node.terminator != CaseTerminator::Normal {
            self.add_info(
                format!(
                    "Using advanced case terminator '{}' - ensure this is intentional",
                    node.terminator
                ),
                kind,
            );
        }
    }

    pub(crate) fn check_select_loop(&mut self, node: &SelectLoop) {
        if node.items.is_empty() {
            self.add_warning("Select loop with no items", NodeKind::SelectLoop);
        }
        self.variable_names.insert(node.variable.clone());
    }

    pub(crate) fn check_break(&mut self, node: &BreakStatement) {
        self.check_loop_control("break", node.level, NodeKind::BreakStatement);
    }

    pub(crate) fn check_continue(&mut self, node: &ContinueStatement) {
        self.check_loop_control("continue", node.level, NodeKind::ContinueStatement);
    }

    fn check_loop_control(&mut self, name: &str, level: u32, kind: NodeKind) {
        if self.in_loop == 0 {
            self.add_error(
                format!("{name}: only meaningful in a `for', `while', or `until' loop"),
                kind,
            );
        } else if level as usize > self.in_loop {
            self.add_error(
                format!(
                    "{name}: loop count {level} exceeds maximum nesting level {}",
                    self.in_loop
                ),
                kind,
            );
        }
    }

    pub(crate) fn check_function_def(&mut self, node: &FunctionDef) {
        let kind = NodeKind::FunctionDef;
        if !self.function_names.insert(node.name.clone()) {
            self.add_warning(format!("Redefinition of function '{}'", node.name), kind);
        }
        if node.name.as_bytes().first().is_some_and(|b| b.is_ascii_digit()) {
            self.add_error(
                format!("Invalid function name '{}' (cannot start with digit)", node.name),
                kind,
            );
        }
    }

    pub(crate) fn check_array_initialization(&mut self, node: &ArrayInitialization) {
        self.variable_names.insert(node.name.clone());
        if let Some(first) = node.element_types.first() {
            if node.element_types.iter().any(|t| t != first) {
                self.add_info(
                    format!("Array '{}' initialized with mixed element types", node.name),
                    NodeKind::ArrayInitialization,
                );
            }
        }
    }

    pub(crate) fn check_array_element_assignment(&mut self, node: &ArrayElementAssignment) {
        self.variable_names.insert(node.name.clone());
    }

    pub(crate) fn check_redirect(&mut self, node: &Redirect) {
        let kind = NodeKind::Redirect;
        if node.kind == RedirectKind::Out {
            if let Some(target) = &node.target {
                if target == "&1" || target == "&2" {
                    self.add_error(
                        format!(
                            "Invalid redirection syntax '>{target}' - use '>&{}' instead",
                            &target[1..]
                        ),
                        kind,
                    );
                } else if target != "/dev/null" {
                    self.add_info(
                        "Consider using '>|' to force overwrite or '>>' to append",
                        kind,
                    );
                }
            }
        }
    }
}

impl AstVisitor for Validator {
    fn generic_visit(&mut self, node: NodeRef<'_>) -> VisitResult {
        walk_children(self, node)
    }

    fn visit_simple_command(&mut self, node: &SimpleCommand) -> VisitResult {
        self.check_simple_command(node);
        for assignment in &node.array_assignments {
            self.visit(assignment.into())?;
        }
        for redirect in &node.redirects {
            self.visit_redirect(redirect)?;
        }
        Ok(())
    }

    fn visit_pipeline(&mut self, node: &Pipeline) -> VisitResult {
        self.check_pipeline(node);
        let saved = self.pipeline_commands;
        self.pipeline_commands = node.commands.len();
        for (i, command) in node.commands.iter().enumerate() {
            if i > 0 {
                self.push_context(format!("pipeline command {}", i + 1));
            }
            self.visit(command.into())?;
            if i > 0 {
                self.pop_context();
            }
        }
        self.pipeline_commands = saved;
        Ok(())
    }

    fn visit_and_or_list(&mut self, node: &AndOrList) -> VisitResult {
        self.check_and_or_list(node);
        for pipeline in &node.pipelines {
            self.visit_pipeline(pipeline)?;
        }
        Ok(())
    }

    fn visit_while_loop(&mut self, node: &WhileLoop) -> VisitResult {
        self.push_context(if node.until { "until loop" } else { "while loop" });
        self.in_loop += 1;
        self.check_while_loop(node);
        self.visit_statement_list(&node.condition)?;
        self.visit_statement_list(&node.body)?;
        self.in_loop -= 1;
        self.pop_context();
        Ok(())
    }

    fn visit_for_loop(&mut self, node: &ForLoop) -> VisitResult {
        self.push_context(format!("for loop (var: {})", node.variable));
        self.in_loop += 1;
        self.check_for_loop(node);
        self.visit_statement_list(&node.body)?;
        self.in_loop -= 1;
        self.pop_context();
        Ok(())
    }

    fn visit_c_style_for_loop(&mut self, node: &CStyleForLoop) -> VisitResult {
        self.push_context("C-style for loop");
        self.in_loop += 1;
        self.check_c_style_for_loop(node);
        self.visit_statement_list(&node.body)?;
        self.in_loop -= 1;
        self.pop_context();
        Ok(())
    }

    fn visit_if_conditional(&mut self, node: &IfConditional) -> VisitResult {
        self.push_context("if statement");
        self.check_if_conditional(node);
        self.visit_statement_list(&node.condition)?;
        self.visit_statement_list(&node.then_part)?;
        for (i, (condition, then_part)) in node.elif_parts.iter().enumerate() {
            self.push_context(format!("elif {}", i + 1));
            if condition.statements.is_empty() {
                self.add_error("Elif with empty condition", NodeKind::IfConditional);
            }
            self.visit_statement_list(condition)?;
            self.visit_statement_list(then_part)?;
            self.pop_context();
        }
        if let Some(else_part) = &node.else_part {
            self.push_context("else");
            self.visit_statement_list(else_part)?;
            self.pop_context();
        }
        self.pop_context();
        Ok(())
    }

    fn visit_case_conditional(&mut self, node: &CaseConditional) -> VisitResult {
        self.push_context(format!("case statement (expr: {})", node.expr));
        self.check_case_conditional(node);
        for item in &node.items {
            self.visit_case_item(item)?;
        }
        self.pop_context();
        Ok(())
    }

    fn visit_case_item(&mut self, node: &CaseItem) -> VisitResult {
        self.check_case_item(node);
        let patterns: Vec<&str> = node.patterns.iter().map(|p| p.pattern.as_str()).collect();
        self.push_context(format!("case pattern: {}", patterns.join(", ")));
        self.visit_statement_list(&node.commands)?;
        self.pop_context();
        Ok(())
    }

    fn visit_select_loop(&mut self, node: &SelectLoop) -> VisitResult {
        self.push_context(format!("select loop (var: {})", node.variable));
        self.in_loop += 1;
        self.check_select_loop(node);
        self.visit_statement_list(&node.body)?;
        self.in_loop -= 1;
        self.pop_context();
        Ok(())
    }

    fn visit_break_statement(&mut self, node: &BreakStatement) -> VisitResult {
        self.check_break(node);
        Ok(())
    }

    fn visit_continue_statement(&mut self, node: &ContinueStatement) -> VisitResult {
        self.check_continue(node);
        Ok(())
    }

    fn visit_function_def(&mut self, node: &FunctionDef) -> VisitResult {
        self.check_function_def(node);
        let saved = self.in_function;
        self.in_function = true;
        self.push_context(format!("function {}", node.name));
        self.visit_statement_list(&node.body)?;
        self.pop_context();
        self.in_function = saved;
        Ok(())
    }

    fn visit_array_initialization(&mut self, node: &ArrayInitialization) -> VisitResult {
        self.check_array_initialization(node);
        Ok(())
    }

    fn visit_array_element_assignment(&mut self, node: &ArrayElementAssignment) -> VisitResult {
        self.check_array_element_assignment(node);
        Ok(())
    }

    fn visit_redirect(&mut self, node: &Redirect) -> VisitResult {
        self.check_redirect(node);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psh_parser::parse_source;

    fn validate(src: &str) -> Validator {
        let ast = parse_source(src).unwrap();
        let mut validator = Validator::new();
        validator.visit(NodeRef::TopLevel(&ast)).unwrap();
        validator
    }

    fn messages(validator: &Validator, severity: Severity) -> Vec<String> {
        validator
            .issues
            .iter()
            .filter(|i| i.severity == severity)
            .map(|i| i.message.clone())
            .collect()
    }

    #[test]
    fn break_outside_loop_is_error() {
        let v = validate("break");
        assert_eq!(v.error_count(), 1);
        assert!(v.issues[0].message.contains("only meaningful"));
    }

    #[test]
    fn break_level_exceeding_nesting_is_error() {
        let v = validate("while true; do break 3; done");
        let errors = messages(&v, Severity::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("loop count 3 exceeds maximum nesting level 1"));
    }

    #[test]
    fn break_inside_loop_is_fine() {
        let v = validate("while true; do break; done");
        assert_eq!(v.error_count(), 0);
    }

    #[test]
    fn nested_loops_allow_deeper_levels() {
        let v = validate("for i in 1; do while true; do break 2; done; done");
        assert_eq!(v.error_count(), 0);
    }

    #[test]
    fn cd_with_many_arguments_warns() {
        let v = validate("cd a b");
        let warnings = messages(&v, Severity::Warning);
        assert!(warnings.iter().any(|m| m.contains("cd: too many arguments (got 2")));
    }

    #[test]
    fn which_suggests_command_v() {
        let v = validate("which ls");
        assert!(messages(&v, Severity::Info).iter().any(|m| m.contains("command -v")));
    }

    #[test]
    fn numeric_for_variable_is_error() {
        let v = validate("for 1 in a b; do echo x; done");
        assert!(messages(&v, Severity::Error)
            .iter()
            .any(|m| m.contains("Invalid variable name '1'")));
    }

    #[test]
    fn duplicate_case_pattern_warns() {
        let v = validate("case $x in a) echo 1;; a) echo 2;; esac");
        assert!(messages(&v, Severity::Warning)
            .iter()
            .any(|m| m.contains("Duplicate case pattern 'a'")));
    }

    #[test]
    fn duplicate_function_warns_and_digit_name_errors() {
        let v = validate("f() { echo 1; }\nf() { echo 2; }");
        assert!(messages(&v, Severity::Warning)
            .iter()
            .any(|m| m.contains("Redefinition of function 'f'")));
    }

    #[test]
    fn malformed_dup_redirect_is_error() {
        let v = validate("echo hi > &1");
        assert!(messages(&v, Severity::Error)
            .iter()
            .any(|m| m.contains("Invalid redirection syntax '>&1'")));
    }

    #[test]
    fn useless_cat_in_pipeline_warns() {
        let v = validate("cat file | grep x");
        assert!(messages(&v, Severity::Warning)
            .iter()
            .any(|m| m.contains("Useless use of cat")));
        // Not in a pipeline: no warning.
        let v = validate("cat file");
        assert!(!messages(&v, Severity::Warning)
            .iter()
            .any(|m| m.contains("Useless use of cat")));
    }

    #[test]
    fn context_path_reads_naturally() {
        let v = validate("for i in 1 2; do if true; then break 2; fi; done");
        let issue = v.issues.iter().find(|i| i.severity == Severity::Error).unwrap();
        assert_eq!(issue.context.as_deref(), Some("for loop (var: i) > if statement"));
    }

    #[test]
    fn advanced_case_terminator_is_info() {
        let v = validate("case $x in a) echo a;& b) echo b;; esac");
        assert!(messages(&v, Severity::Info)
            .iter()
            .any(|m| m.contains("advanced case terminator ';&'")));
    }

    #[test]
    fn summary_groups_by_severity() {
        let v = validate("break");
        let summary = v.get_summary();
        assert!(summary.starts_with("Found 1 issue(s):"));
        assert!(summary.contains("ERRORS:"));
        assert!(summary.contains("[BreakStatement]"));
    }

    #[test]
    fn clean_script_has_no_issues() {
        let v = validate("ls -l /tmp");
        assert!(v.issues.is_empty(), "{:?}", v.issues);
        assert_eq!(v.get_summary(), "No issues found - AST is valid!");
    }
}
