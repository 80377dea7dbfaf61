//! Script metrics collection: command counts, structure, complexity, and
//! feature usage.

use psh_ast::*;
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::constants::SHELL_BUILTINS;
use crate::visit::{AstVisitor, VisitResult, walk_children};

/// Sectioned metrics report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub summary: SummaryMetrics,
    pub complexity: ComplexityMetrics,
    pub commands: CommandMetrics,
    pub control_flow: ControlFlowMetrics,
    pub advanced_features: AdvancedFeatureMetrics,
    pub identifiers: IdentifierMetrics,
    /// Cyclomatic complexity per defined function.
    pub function_metrics: Vec<FunctionMetrics>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMetrics {
    pub total_commands: usize,
    pub total_pipelines: usize,
    pub total_functions: usize,
    pub total_loops: usize,
    pub total_conditionals: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplexityMetrics {
    pub cyclomatic_complexity: usize,
    pub max_nesting_depth: usize,
    pub max_pipeline_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandMetrics {
    pub builtin_commands: usize,
    pub external_commands: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ControlFlowMetrics {
    pub loops: usize,
    pub conditionals: usize,
    pub case_statements: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdvancedFeatureMetrics {
    pub variable_assignments: usize,
    pub array_operations: usize,
    pub command_substitutions: usize,
    pub arithmetic_operations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifierMetrics {
    pub function_names: Vec<String>,
    pub variable_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionMetrics {
    pub name: String,
    pub cyclomatic_complexity: usize,
}

/// Collects metrics about shell scripts.
///
/// Cyclomatic complexity starts at 1 and adds one per `if`, `elif`,
/// `while`/`until`, `for`, C-style `for`, case arm, `&&`/`||` operator,
/// `break`, and `continue`.
pub struct MetricsVisitor {
    total_commands: usize,
    builtin_commands: usize,
    external_commands: usize,
    total_pipelines: usize,
    max_pipeline_length: usize,
    total_functions: usize,
    total_loops: usize,
    total_conditionals: usize,
    case_statements: usize,
    max_nesting_depth: usize,
    variable_assignments: usize,
    array_operations: usize,
    command_substitutions: usize,
    arithmetic_operations: usize,
    complexity: usize,
    depth: usize,
    function_names: Vec<String>,
    variable_names: Vec<String>,
    function_complexity: FxHashMap<String, usize>,
    current_function: Option<String>,
}

impl Default for MetricsVisitor {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsVisitor {
    pub fn new() -> Self {
        MetricsVisitor {
            total_commands: 0,
            builtin_commands: 0,
            external_commands: 0,
            total_pipelines: 0,
            max_pipeline_length: 0,
            total_functions: 0,
            total_loops: 0,
            total_conditionals: 0,
            case_statements: 0,
            max_nesting_depth: 0,
            variable_assignments: 0,
            array_operations: 0,
            command_substitutions: 0,
            arithmetic_operations: 0,
            complexity: 1,
            depth: 0,
            function_names: Vec::new(),
            variable_names: Vec::new(),
            function_complexity: FxHashMap::default(),
            current_function: None,
        }
    }

    pub fn get_report(&self) -> MetricsReport {
        let mut function_metrics: Vec<FunctionMetrics> = self
            .function_complexity
            .iter()
            .map(|(name, complexity)| FunctionMetrics {
                name: name.clone(),
                cyclomatic_complexity: *complexity,
            })
            .collect();
        function_metrics.sort_by(|a, b| a.name.cmp(&b.name));

        let mut function_names = self.function_names.clone();
        function_names.sort();
        let mut variable_names = self.variable_names.clone();
        variable_names.sort();
        variable_names.dedup();

        MetricsReport {
            summary: SummaryMetrics {
                total_commands: self.total_commands,
                total_pipelines: self.total_pipelines,
                total_functions: self.total_functions,
                total_loops: self.total_loops,
                total_conditionals: self.total_conditionals,
            },
            complexity: ComplexityMetrics {
                cyclomatic_complexity: self.complexity,
                max_nesting_depth: self.max_nesting_depth,
                max_pipeline_length: self.max_pipeline_length,
            },
            commands: CommandMetrics {
                builtin_commands: self.builtin_commands,
                external_commands: self.external_commands,
            },
            control_flow: ControlFlowMetrics {
                loops: self.total_loops,
                conditionals: self.total_conditionals,
                case_statements: self.case_statements,
            },
            advanced_features: AdvancedFeatureMetrics {
                variable_assignments: self.variable_assignments,
                array_operations: self.array_operations,
                command_substitutions: self.command_substitutions,
                arithmetic_operations: self.arithmetic_operations,
            },
            identifiers: IdentifierMetrics { function_names, variable_names },
            function_metrics,
        }
    }

    /// Formatted summary of collected metrics.
    pub fn get_summary(&self) -> String {
        format!(
            "Script Metrics Summary:\n\
             ═══════════════════════════════════════\n\
             Commands:\n\
             \x20 Total Commands:        {:>6}\n\
             \x20 Built-in Commands:     {:>6}\n\
             \x20 External Commands:     {:>6}\n\
             \n\
             Structure:\n\
             \x20 Functions Defined:     {:>6}\n\
             \x20 Pipelines:             {:>6}\n\
             \x20 Loops:                 {:>6}\n\
             \x20 Conditionals:          {:>6}\n\
             \n\
             Complexity:\n\
             \x20 Cyclomatic Complexity: {:>6}\n\
             \x20 Max Pipeline Length:   {:>6}\n\
             \x20 Max Nesting Depth:     {:>6}\n\
             \n\
             Advanced Features:\n\
             \x20 Variable Assignments:  {:>6}\n\
             \x20 Array Operations:      {:>6}\n\
             \x20 Command Substitutions: {:>6}\n\
             \x20 Arithmetic Operations: {:>6}",
            self.total_commands,
            self.builtin_commands,
            self.external_commands,
            self.total_functions,
            self.total_pipelines,
            self.total_loops,
            self.total_conditionals,
            self.complexity,
            self.max_pipeline_length,
            self.max_nesting_depth,
            self.variable_assignments,
            self.array_operations,
            self.command_substitutions,
            self.arithmetic_operations,
        )
    }

    fn bump_complexity(&mut self, amount: usize) {
        self.complexity += amount;
        if let Some(name) = &self.current_function {
            *self.function_complexity.entry(name.clone()).or_insert(1) += amount;
        }
    }

    fn enter_depth(&mut self) {
        self.depth += 1;
        self.max_nesting_depth = self.max_nesting_depth.max(self.depth);
    }

    fn exit_depth(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}

impl AstVisitor for MetricsVisitor {
    fn generic_visit(&mut self, node: NodeRef<'_>) -> VisitResult {
        walk_children(self, node)
    }

    fn visit_simple_command(&mut self, node: &SimpleCommand) -> VisitResult {
        self.total_commands += 1;
        self.array_operations += node.array_assignments.len();

        // Count substitutions before classifying: assignments carry them
        // in their values too.
        for arg in &node.args {
            if arg.contains("$(") || arg.contains('`') {
                self.command_substitutions += 1;
            }
            if arg.contains("$((") {
                self.arithmetic_operations += 1;
            }
        }

        let Some(cmd) = node.name() else { return Ok(()) };

        // A pure assignment is not an invocation of anything.
        if cmd.contains('=') && !node.args.iter().any(|a| a.starts_with('-')) {
            self.variable_assignments += 1;
            if let Some(name) = cmd.split('=').next() {
                self.variable_names.push(name.to_string());
            }
            return Ok(());
        }

        if SHELL_BUILTINS.contains(cmd) {
            self.builtin_commands += 1;
        } else if !self.function_names.iter().any(|f| f == cmd) {
            self.external_commands += 1;
        }
        Ok(())
    }

    fn visit_pipeline(&mut self, node: &Pipeline) -> VisitResult {
        if node.commands.len() > 1 {
            self.total_pipelines += 1;
            self.max_pipeline_length = self.max_pipeline_length.max(node.commands.len());
        }
        for command in &node.commands {
            self.visit(command.into())?;
        }
        Ok(())
    }

    fn visit_and_or_list(&mut self, node: &AndOrList) -> VisitResult {
        self.bump_complexity(node.operators.len());
        for pipeline in &node.pipelines {
            self.visit_pipeline(pipeline)?;
        }
        Ok(())
    }

    fn visit_function_def(&mut self, node: &FunctionDef) -> VisitResult {
        self.total_functions += 1;
        self.function_names.push(node.name.clone());
        self.function_complexity.entry(node.name.clone()).or_insert(1);
        let previous = self.current_function.replace(node.name.clone());
        self.enter_depth();
        self.visit_statement_list(&node.body)?;
        self.exit_depth();
        self.current_function = previous;
        Ok(())
    }

    fn visit_while_loop(&mut self, node: &WhileLoop) -> VisitResult {
        self.total_loops += 1;
        self.bump_complexity(1);
        self.enter_depth();
        self.visit_statement_list(&node.condition)?;
        self.visit_statement_list(&node.body)?;
        self.exit_depth();
        Ok(())
    }

    fn visit_for_loop(&mut self, node: &ForLoop) -> VisitResult {
        self.total_loops += 1;
        self.bump_complexity(1);
        self.variable_names.push(node.variable.clone());
        for item in &node.items {
            if item.contains("$(") || item.contains('`') {
                self.command_substitutions += 1;
            }
        }
        self.enter_depth();
        self.visit_statement_list(&node.body)?;
        self.exit_depth();
        Ok(())
    }

    fn visit_c_style_for_loop(&mut self, node: &CStyleForLoop) -> VisitResult {
        self.total_loops += 1;
        self.bump_complexity(1);
        // C-style loop headers are arithmetic by construction.
        self.arithmetic_operations += 1;
        self.enter_depth();
        self.visit_statement_list(&node.body)?;
        self.exit_depth();
        Ok(())
    }

    fn visit_if_conditional(&mut self, node: &IfConditional) -> VisitResult {
        self.total_conditionals += 1;
        self.bump_complexity(1 + node.elif_parts.len());
        self.enter_depth();
        self.visit_statement_list(&node.condition)?;
        self.visit_statement_list(&node.then_part)?;
        for (condition, then_part) in &node.elif_parts {
            self.visit_statement_list(condition)?;
            self.visit_statement_list(then_part)?;
        }
        if let Some(else_part) = &node.else_part {
            self.visit_statement_list(else_part)?;
        }
        self.exit_depth();
        Ok(())
    }

    fn visit_case_conditional(&mut self, node: &CaseConditional) -> VisitResult {
        self.total_conditionals += 1;
        self.case_statements += 1;
        self.bump_complexity(node.items.len());
        self.enter_depth();
        for item in &node.items {
            self.visit_statement_list(&item.commands)?;
        }
        self.exit_depth();
        Ok(())
    }

    fn visit_select_loop(&mut self, node: &SelectLoop) -> VisitResult {
        // Select is both a loop and a conditional.
        self.total_loops += 1;
        self.total_conditionals += 1;
        self.bump_complexity(1);
        self.variable_names.push(node.variable.clone());
        self.enter_depth();
        self.visit_statement_list(&node.body)?;
        self.exit_depth();
        Ok(())
    }

    fn visit_arithmetic_evaluation(&mut self, _node: &ArithmeticEvaluation) -> VisitResult {
        self.arithmetic_operations += 1;
        Ok(())
    }

    fn visit_enhanced_test_statement(&mut self, _node: &EnhancedTestStatement) -> VisitResult {
        self.total_conditionals += 1;
        Ok(())
    }

    fn visit_break_statement(&mut self, _node: &BreakStatement) -> VisitResult {
        self.bump_complexity(1);
        Ok(())
    }

    fn visit_continue_statement(&mut self, _node: &ContinueStatement) -> VisitResult {
        self.bump_complexity(1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psh_parser::parse_source;

    fn collect(src: &str) -> MetricsReport {
        let ast = parse_source(src).unwrap();
        let mut visitor = MetricsVisitor::new();
        visitor.visit(NodeRef::TopLevel(&ast)).unwrap();
        visitor.get_report()
    }

    #[test]
    fn counts_commands_and_builtins() {
        let report = collect("echo hi\nls -l\ncd /tmp");
        assert_eq!(report.summary.total_commands, 3);
        assert_eq!(report.commands.builtin_commands, 2);
        assert_eq!(report.commands.external_commands, 1);
    }

    #[test]
    fn pipelines_and_max_length() {
        let report = collect("a | b | c\nd | e");
        assert_eq!(report.summary.total_pipelines, 2);
        assert_eq!(report.complexity.max_pipeline_length, 3);
    }

    #[test]
    fn c_style_for_counts_loop_and_complexity() {
        let report = collect("for ((i=0;i<3;i++)); do echo $i; done");
        assert_eq!(report.summary.total_loops, 1);
        assert!(report.complexity.cyclomatic_complexity >= 2);
        assert_eq!(report.advanced_features.arithmetic_operations, 1);
    }

    #[test]
    fn complexity_counts_branches_and_operators() {
        let report = collect(
            "if a; then b; elif c; then d; fi\nwhile e; do break; done\nx && y || z",
        );
        // 1 base + if + elif + while + break + && + || = 7
        assert_eq!(report.complexity.cyclomatic_complexity, 7);
    }

    #[test]
    fn case_arms_count_toward_complexity() {
        let report = collect("case $x in a) echo a;; b) echo b;; esac");
        assert_eq!(report.complexity.cyclomatic_complexity, 3);
        assert_eq!(report.control_flow.case_statements, 1);
        assert_eq!(report.summary.total_conditionals, 1);
    }

    #[test]
    fn nesting_depth() {
        let report = collect(
            "if a; then\n  while b; do\n    if c; then echo deep; fi\n  done\nfi",
        );
        assert_eq!(report.complexity.max_nesting_depth, 3);
    }

    #[test]
    fn variable_assignments_are_not_commands() {
        let report = collect("x=1\ny=2\necho $x");
        assert_eq!(report.advanced_features.variable_assignments, 2);
        assert_eq!(report.commands.builtin_commands, 1);
        assert_eq!(report.commands.external_commands, 0);
    }

    #[test]
    fn substitution_counting() {
        let report = collect("echo $(date) `uptime`");
        assert_eq!(report.advanced_features.command_substitutions, 2);

        // `$((…))` is an arithmetic substitution; its `$(` prefix also
        // satisfies the command-substitution test.
        let report = collect("x=$((1+2))");
        assert_eq!(report.advanced_features.arithmetic_operations, 1);
        assert_eq!(report.advanced_features.command_substitutions, 1);
    }

    #[test]
    fn function_metrics_track_per_function_complexity() {
        let report = collect(
            "simple() { echo hi; }\nbranchy() { if a; then b; fi; while c; do d; done; }",
        );
        assert_eq!(report.summary.total_functions, 2);
        assert_eq!(report.function_metrics.len(), 2);
        let branchy = report.function_metrics.iter().find(|f| f.name == "branchy").unwrap();
        assert_eq!(branchy.cyclomatic_complexity, 3);
        let simple = report.function_metrics.iter().find(|f| f.name == "simple").unwrap();
        assert_eq!(simple.cyclomatic_complexity, 1);
    }

    #[test]
    fn function_calls_are_not_external_commands() {
        let report = collect("mine() { echo hi; }\nmine");
        assert_eq!(report.commands.external_commands, 0);
    }

    #[test]
    fn select_counts_as_loop_and_conditional() {
        let report = collect("select x in a b; do echo $x; done");
        assert_eq!(report.summary.total_loops, 1);
        assert_eq!(report.summary.total_conditionals, 1);
    }

    #[test]
    fn array_operations() {
        let report = collect("arr=(1 2 3)\narr[0]=9");
        assert_eq!(report.advanced_features.array_operations, 2);
    }

    #[test]
    fn summary_renders() {
        let ast = parse_source("echo hi | wc").unwrap();
        let mut visitor = MetricsVisitor::new();
        visitor.visit(NodeRef::TopLevel(&ast)).unwrap();
        let summary = visitor.get_summary();
        assert!(summary.starts_with("Script Metrics Summary:"));
        assert!(summary.contains("Total Commands:"));
    }

    #[test]
    fn report_serializes_to_json() {
        let report = collect("echo hi");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["summary"]["total_commands"], 1);
        assert!(json["complexity"]["cyclomatic_complexity"].is_number());
    }
}
