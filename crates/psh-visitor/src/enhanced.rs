//! Enhanced validator: scoped variable tracking, command/typo checking,
//! quoting analysis, and security rules layered over the structural
//! validator.

use lazy_static::lazy_static;
use psh_ast::*;
use regex::Regex;
use rustc_hash::FxHashMap;

use crate::constants::{
    COMMON_TYPOS, DEPRECATED_COMMANDS, GLOBBING_COMMANDS, SHELL_BUILTINS, SPECIAL_VARIABLES,
};
use crate::validate::{ValidationIssue, Validator};
use crate::visit::{AstVisitor, VisitResult};

#[allow(clippy::unwrap_used)]
mod patterns {
    use super::*;

    lazy_static! {
        /// `$NAME` and `${NAME…}` references inside argument text.
        pub(super) static ref VAR_REF: Regex =
            Regex::new(r"\$\{?([A-Za-z_][A-Za-z0-9_]*)").unwrap();

        /// Glob patterns that usually mean what they say.
        pub(super) static ref INTENTIONAL_GLOBS: Vec<Regex> = vec![
            Regex::new(r"^\*\.[A-Za-z0-9_]+$").unwrap(),
            Regex::new(r"^[A-Za-z0-9_]+\*$").unwrap(),
            Regex::new(r"^\*[A-Za-z0-9_]+$").unwrap(),
            Regex::new(r"^\[[A-Za-z0-9_-]+\]").unwrap(),
            Regex::new(r"^[A-Za-z0-9_/]+/\*$").unwrap(),
        ];
    }
}

/// Information about a tracked variable definition.
#[derive(Debug, Clone, Default)]
pub struct VariableInfo {
    pub name: String,
    pub defined_at: Option<String>,
    pub is_exported: bool,
    pub is_readonly: bool,
    pub is_array: bool,
    pub is_local: bool,
    pub is_special: bool,
    pub is_positional: bool,
}

impl VariableInfo {
    fn defined(name: &str, context: Option<String>) -> Self {
        VariableInfo { name: name.to_string(), defined_at: context, ..Default::default() }
    }
}

/// Stack of variable scopes; the global scope sits at index 0 and is never
/// popped. Lookup walks from the innermost scope outwards.
#[derive(Debug, Default)]
pub struct VariableTracker {
    scopes: Vec<FxHashMap<String, VariableInfo>>,
}

impl VariableTracker {
    pub fn new() -> Self {
        VariableTracker { scopes: vec![FxHashMap::default()] }
    }

    pub fn enter_scope(&mut self) {
        self.scopes.push(FxHashMap::default());
    }

    pub fn exit_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    pub fn define(&mut self, name: &str, info: VariableInfo) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), info);
        }
    }

    pub fn lookup(&self, name: &str) -> Option<VariableInfo> {
        for scope in self.scopes.iter().rev() {
            if let Some(info) = scope.get(name) {
                return Some(info.clone());
            }
        }
        if SPECIAL_VARIABLES.contains(name) {
            return Some(VariableInfo {
                name: name.to_string(),
                is_special: true,
                ..Default::default()
            });
        }
        if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
            return Some(VariableInfo {
                name: name.to_string(),
                is_positional: true,
                ..Default::default()
            });
        }
        None
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn mark_exported(&mut self, name: &str) {
        self.mark(name, |info| info.is_exported = true);
    }

    pub fn mark_readonly(&mut self, name: &str) {
        self.mark(name, |info| info.is_readonly = true);
    }

    fn mark(&mut self, name: &str, apply: impl Fn(&mut VariableInfo)) {
        for scope in self.scopes.iter_mut().rev() {
            if let Some(info) = scope.get_mut(name) {
                apply(info);
                return;
            }
        }
    }
}

/// Feature flags for the enhanced validator. Defaults enable everything
/// except treating arithmetic references as always-defined.
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    pub check_undefined_vars: bool,
    pub check_command_exists: bool,
    pub check_quoting: bool,
    pub check_security: bool,

    pub warn_undefined_in_conditionals: bool,
    pub ignore_undefined_with_defaults: bool,
    pub ignore_undefined_in_arithmetic: bool,

    pub check_typos: bool,
    pub suggest_alternatives: bool,

    pub warn_unquoted_variables: bool,
    pub warn_glob_expansion: bool,
    pub strict_quoting: bool,

    pub warn_dangerous_commands: bool,
    pub check_command_injection: bool,
    pub check_file_permissions: bool,
    pub check_eval_usage: bool,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig {
            check_undefined_vars: true,
            check_command_exists: true,
            check_quoting: true,
            check_security: true,
            warn_undefined_in_conditionals: true,
            ignore_undefined_with_defaults: true,
            ignore_undefined_in_arithmetic: false,
            check_typos: true,
            suggest_alternatives: true,
            warn_unquoted_variables: true,
            warn_glob_expansion: true,
            strict_quoting: false,
            warn_dangerous_commands: true,
            check_command_injection: true,
            check_file_permissions: true,
            check_eval_usage: true,
        }
    }
}

/// Validator with scoped variable tracking, typo detection, quoting
/// analysis, and security checks. All structural rules of [`Validator`]
/// apply as well.
pub struct EnhancedValidator {
    pub(crate) base: Validator,
    config: ValidatorConfig,
    tracker: VariableTracker,
    current_function: Option<String>,
}

impl Default for EnhancedValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl EnhancedValidator {
    pub fn new() -> Self {
        Self::with_config(ValidatorConfig::default())
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        EnhancedValidator {
            base: Validator::new(),
            config,
            tracker: VariableTracker::new(),
            current_function: None,
        }
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.base.issues
    }

    pub fn into_issues(self) -> Vec<ValidationIssue> {
        self.base.issues
    }

    pub fn get_summary(&self) -> String {
        self.base.get_summary()
    }

    // ===== variable tracking =====

    fn process_variable_assignments(&mut self, node: &SimpleCommand) {
        let context = self.base.current_context();
        for arg in &node.args {
            if let Some(eq) = arg.find('=') {
                if eq == 0 {
                    continue;
                }
                let name = &arg[..eq];
                if is_identifier(name) {
                    self.tracker.define(name, VariableInfo::defined(name, context.clone()));
                    if self.config.check_undefined_vars {
                        self.check_text_for_undefined(&arg[eq + 1..], node);
                    }
                }
            }
        }

        match node.name() {
            Some("export") => {
                for arg in &node.args[1..] {
                    let name = arg.split('=').next().unwrap_or(arg);
                    self.tracker.mark_exported(name);
                }
            }
            Some("readonly") => {
                for arg in &node.args[1..] {
                    let name = arg.split('=').next().unwrap_or(arg);
                    self.tracker.mark_readonly(name);
                }
            }
            _ => {}
        }
    }

    fn handle_special_commands(&mut self, node: &SimpleCommand) {
        let context = self.base.current_context();
        match node.name() {
            // `read NAME…` defines each non-option operand.
            Some("read") => {
                for arg in &node.args[1..] {
                    if !arg.starts_with('-') && is_identifier(arg) {
                        self.tracker.define(arg, VariableInfo::defined(arg, context.clone()));
                    }
                }
            }
            Some("declare") | Some("typeset") | Some("local") => {
                let is_local = node.name() == Some("local");
                let mut is_array = false;
                for arg in &node.args[1..] {
                    if arg == "-a" || arg == "-A" {
                        is_array = true;
                        continue;
                    }
                    if arg.starts_with('-') {
                        continue;
                    }
                    let name = arg.split('=').next().unwrap_or(arg);
                    if is_identifier(name) {
                        let mut info = VariableInfo::defined(name, context.clone());
                        info.is_array = is_array;
                        info.is_local = is_local && self.current_function.is_some();
                        self.tracker.define(name, info);
                    }
                }
            }
            _ => {}
        }
        for assignment in &node.array_assignments {
            let name = match assignment {
                ArrayAssignment::Initialization(init) => &init.name,
                ArrayAssignment::ElementAssignment(assign) => &assign.name,
            };
            let mut info = VariableInfo::defined(name, context.clone());
            info.is_array = true;
            self.tracker.define(name, info);
        }
    }

    // ===== command checking =====

    fn check_command_exists(&mut self, node: &SimpleCommand) {
        let Some(cmd) = node.name() else { return };
        if SHELL_BUILTINS.contains(cmd) || self.base.function_names.contains(cmd) {
            return;
        }
        if self.config.check_typos {
            if let Some(suggestion) = COMMON_TYPOS.get(cmd) {
                self.base.add_warning(
                    format!("Possible typo: '{cmd}' - did you mean '{suggestion}'?"),
                    NodeKind::SimpleCommand,
                );
            }
        }
        if self.config.suggest_alternatives {
            if let Some(note) = DEPRECATED_COMMANDS.get(cmd) {
                self.base.add_info(*note, NodeKind::SimpleCommand);
            }
        }
    }

    // ===== undefined variable analysis =====

    fn check_undefined_variables(&mut self, node: &SimpleCommand) {
        for (i, (arg, arg_type)) in node.args.iter().zip(node.arg_types.iter()).enumerate() {
            if i == 0 {
                continue;
            }
            match arg_type {
                ArgType::Word | ArgType::String | ArgType::Composite => {
                    self.check_text_for_undefined(arg, node);
                }
                ArgType::Variable => {
                    if let Some(name) = extract_variable_name(arg) {
                        if !self.tracker.is_defined(&name)
                            && !(self.config.ignore_undefined_with_defaults
                                && has_parameter_default(arg))
                            && !self.suppressed_by_test(node, &name)
                        {
                            self.base.add_warning(
                                format!("Possible use of undefined variable '${name}'"),
                                NodeKind::SimpleCommand,
                            );
                        }
                    }
                }
                ArgType::ArithSub => {
                    if !self.config.ignore_undefined_in_arithmetic {
                        self.check_text_for_undefined(arg, node);
                    }
                }
                _ => {}
            }
        }
    }

    fn check_text_for_undefined(&mut self, text: &str, node: &SimpleCommand) {
        if text.is_empty() {
            return;
        }
        let mut reported = Vec::new();
        for captures in patterns::VAR_REF.captures_iter(text) {
            let Some(name_match) = captures.get(1) else { continue };
            let name = name_match.as_str();
            if reported.iter().any(|r| r == name) || self.tracker.is_defined(name) {
                continue;
            }
            let Some(whole) = captures.get(0) else { continue };
            if self.config.ignore_undefined_with_defaults
                && whole.as_str().starts_with("${")
                && brace_has_default(text, name_match.end())
            {
                continue;
            }
            if self.suppressed_by_test(node, name) {
                continue;
            }
            reported.push(name.to_string());
            self.base.add_warning(
                format!("Possible use of undefined variable '${name}'"),
                NodeKind::SimpleCommand,
            );
        }
    }

    /// `[ -z "$X" ]` / `test -n $X` style existence probes do not warn.
    fn suppressed_by_test(&self, node: &SimpleCommand, var_name: &str) -> bool {
        if !self.config.warn_undefined_in_conditionals {
            return false;
        }
        if !matches!(node.name(), Some("test") | Some("[")) {
            return false;
        }
        for (i, arg) in node.args.iter().enumerate() {
            if (arg == "-z" || arg == "-n")
                && node.args.get(i + 1).is_some_and(|next| next.contains(var_name))
            {
                return true;
            }
        }
        false
    }

    // ===== quoting analysis =====

    fn check_quoting_issues(&mut self, node: &SimpleCommand) {
        for (i, (arg, arg_type)) in node.args.iter().zip(node.arg_types.iter()).enumerate() {
            if i == 0 {
                continue;
            }
            // `$@` outside quotes loses argument boundaries.
            if *arg_type == ArgType::Variable && (arg == "$@" || arg == "${@}") {
                self.base.add_info(
                    "Unquoted $@ should be \"$@\" to preserve arguments correctly",
                    NodeKind::SimpleCommand,
                );
                continue;
            }
            if *arg_type != ArgType::Word {
                continue;
            }
            if self.config.warn_unquoted_variables && arg.contains('$') {
                let numeric_comparison = i > 0
                    && matches!(
                        node.args.get(i - 1).map(String::as_str),
                        Some("-eq" | "-ne" | "-lt" | "-le" | "-gt" | "-ge")
                    );
                let assignment_like = arg.contains('=') && i < node.args.len() - 1;
                if !numeric_comparison && !assignment_like {
                    if arg.contains("$@") {
                        self.base.add_info(
                            "Unquoted $@ should be \"$@\" to preserve arguments correctly",
                            NodeKind::SimpleCommand,
                        );
                    } else {
                        self.base.add_info(
                            format!("Unquoted variable expansion '{arg}' may cause word splitting"),
                            NodeKind::SimpleCommand,
                        );
                    }
                }
            }
            if self.config.warn_glob_expansion
                && arg.chars().any(|c| matches!(c, '*' | '?' | '['))
                && !self.looks_like_intentional_glob(arg, node)
            {
                self.base.add_warning(
                    format!("Unquoted pattern '{arg}' will undergo pathname expansion"),
                    NodeKind::SimpleCommand,
                );
            }
        }
    }

    fn looks_like_intentional_glob(&self, pattern: &str, node: &SimpleCommand) -> bool {
        if patterns::INTENTIONAL_GLOBS.iter().any(|re| re.is_match(pattern)) {
            return true;
        }
        node.name().is_some_and(|cmd| GLOBBING_COMMANDS.contains(cmd))
    }

    // ===== security =====

    fn check_security_issues(&mut self, node: &SimpleCommand) {
        let Some(cmd) = node.name() else { return };

        if self.config.warn_dangerous_commands {
            let advice = match cmd {
                "eval" if self.config.check_eval_usage => {
                    Some("Avoid 'eval' - it can execute arbitrary code from user input")
                }
                "source" | "." => {
                    Some("Be careful with 'source' - ensure the file path is trusted")
                }
                "exec" => Some("Be careful with 'exec' - it replaces the current shell process"),
                _ => None,
            };
            if let Some(advice) = advice {
                self.base.add_warning(format!("Security: {advice}"), NodeKind::SimpleCommand);
            }
        }

        if self.config.check_command_injection {
            for (i, arg) in node.args.iter().enumerate().skip(1) {
                let has_metachars = arg.contains(';')
                    || arg.contains("&&")
                    || arg.contains("||")
                    || arg.contains('|')
                    || arg.contains('`');
                if arg.contains('$')
                    && has_metachars
                    && node.arg_types.get(i) == Some(&ArgType::Word)
                {
                    self.base.add_error(
                        format!(
                            "Potential command injection: unquoted expansion '{arg}' contains shell metacharacters"
                        ),
                        NodeKind::SimpleCommand,
                    );
                }
            }
        }

        if self.config.check_file_permissions && cmd == "chmod" {
            for arg in &node.args[1..] {
                if arg.contains("777") || arg.contains("a+w") || arg.contains("o+w") {
                    self.base.add_warning(
                        "Security: Creating world-writable files is a security risk",
                        NodeKind::SimpleCommand,
                    );
                } else if arg.contains("666") {
                    self.base.add_warning(
                        "Security: Mode 666 makes files writable by everyone",
                        NodeKind::SimpleCommand,
                    );
                }
            }
        }
    }

    // ===== test command quoting =====

    fn check_test_command_quoting(&mut self, node: &SimpleCommand) {
        let args = &node.args[1..];
        let arg_types = &node.arg_types[1..];
        const FILE_OPS: &[&str] = &["-f", "-d", "-e", "-r", "-w", "-x", "-s", "-L", "-h"];
        const STRING_OPS: &[&str] = &["=", "==", "!=", "<", ">"];

        let unquoted_expansion = |arg: &str, arg_type: &ArgType| {
            matches!(arg_type, ArgType::Word | ArgType::Variable | ArgType::Composite)
                && arg.contains('$')
        };

        for (i, (arg, _)) in args.iter().zip(arg_types.iter()).enumerate() {
            if FILE_OPS.contains(&arg.as_str()) {
                if let (Some(next), Some(next_type)) = (args.get(i + 1), arg_types.get(i + 1)) {
                    if unquoted_expansion(next, next_type) {
                        self.base.add_warning(
                            format!(
                                "Unquoted variable '{next}' in test - may fail if value contains spaces"
                            ),
                            NodeKind::SimpleCommand,
                        );
                    }
                }
            } else if STRING_OPS.contains(&arg.as_str()) {
                for neighbor in [i.checked_sub(1), Some(i + 1)].into_iter().flatten() {
                    if let (Some(other), Some(other_type)) =
                        (args.get(neighbor), arg_types.get(neighbor))
                    {
                        if unquoted_expansion(other, other_type) {
                            self.base.add_warning(
                                format!(
                                    "Unquoted variable '{other}' in test comparison - use quotes"
                                ),
                                NodeKind::SimpleCommand,
                            );
                        }
                    }
                }
            }
        }
    }
}

impl AstVisitor for EnhancedValidator {
    fn generic_visit(&mut self, node: NodeRef<'_>) -> VisitResult {
        crate::visit::walk_children(self, node)
    }

    fn visit_simple_command(&mut self, node: &SimpleCommand) -> VisitResult {
        self.base.check_simple_command(node);
        if node.args.is_empty() && node.array_assignments.is_empty() {
            return Ok(());
        }

        self.process_variable_assignments(node);
        self.handle_special_commands(node);
        if self.config.check_command_exists {
            self.check_command_exists(node);
        }
        if self.config.check_undefined_vars {
            self.check_undefined_variables(node);
        }
        if self.config.check_quoting {
            self.check_quoting_issues(node);
        }
        if self.config.check_security {
            self.check_security_issues(node);
        }
        if matches!(node.name(), Some("test") | Some("[")) && node.args.len() > 2 {
            self.check_test_command_quoting(node);
        }

        for assignment in &node.array_assignments {
            self.visit(assignment.into())?;
        }
        for redirect in &node.redirects {
            self.visit_redirect(redirect)?;
        }
        Ok(())
    }

    fn visit_pipeline(&mut self, node: &Pipeline) -> VisitResult {
        self.base.check_pipeline(node);
        let saved = self.base.pipeline_commands;
        self.base.pipeline_commands = node.commands.len();
        for (i, command) in node.commands.iter().enumerate() {
            if i > 0 {
                self.base.push_context(format!("pipeline command {}", i + 1));
            }
            self.visit(command.into())?;
            if i > 0 {
                self.base.pop_context();
            }
        }
        self.base.pipeline_commands = saved;
        Ok(())
    }

    fn visit_and_or_list(&mut self, node: &AndOrList) -> VisitResult {
        self.base.check_and_or_list(node);
        for pipeline in &node.pipelines {
            self.visit_pipeline(pipeline)?;
        }
        Ok(())
    }

    fn visit_while_loop(&mut self, node: &WhileLoop) -> VisitResult {
        self.base.push_context(if node.until { "until loop" } else { "while loop" });
        self.base.in_loop += 1;
        self.base.check_while_loop(node);
        self.visit_statement_list(&node.condition)?;
        self.visit_statement_list(&node.body)?;
        self.base.in_loop -= 1;
        self.base.pop_context();
        Ok(())
    }

    fn visit_for_loop(&mut self, node: &ForLoop) -> VisitResult {
        self.base.push_context(format!("for loop (var: {})", node.variable));
        self.base.in_loop += 1;
        self.base.check_for_loop(node);

        let context = self.base.current_context();
        self.tracker.define(&node.variable, VariableInfo::defined(&node.variable, context));
        if self.config.check_undefined_vars {
            for item in &node.items {
                if item.starts_with('$') {
                    if let Some(name) = extract_variable_name(item) {
                        if !self.tracker.is_defined(&name) {
                            self.base.add_warning(
                                format!(
                                    "Possible use of undefined variable '${name}' in for loop items"
                                ),
                                NodeKind::ForLoop,
                            );
                        }
                    }
                }
            }
        }

        self.visit_statement_list(&node.body)?;
        self.base.in_loop -= 1;
        self.base.pop_context();
        Ok(())
    }

    fn visit_c_style_for_loop(&mut self, node: &CStyleForLoop) -> VisitResult {
        self.base.push_context("C-style for loop");
        self.base.in_loop += 1;
        self.base.check_c_style_for_loop(node);
        if let Some(init) = &node.init_expr {
            if let Some(name) = init.split('=').next() {
                if is_identifier(name.trim()) {
                    let context = self.base.current_context();
                    self.tracker.define(name.trim(), VariableInfo::defined(name.trim(), context));
                }
            }
        }
        self.visit_statement_list(&node.body)?;
        self.base.in_loop -= 1;
        self.base.pop_context();
        Ok(())
    }

    fn visit_if_conditional(&mut self, node: &IfConditional) -> VisitResult {
        self.base.push_context("if statement");
        self.base.check_if_conditional(node);
        self.visit_statement_list(&node.condition)?;
        self.visit_statement_list(&node.then_part)?;
        for (i, (condition, then_part)) in node.elif_parts.iter().enumerate() {
            self.base.push_context(format!("elif {}", i + 1));
            if condition.statements.is_empty() {
                self.base.add_error("Elif with empty condition", NodeKind::IfConditional);
            }
            self.visit_statement_list(condition)?;
            self.visit_statement_list(then_part)?;
            self.base.pop_context();
        }
        if let Some(else_part) = &node.else_part {
            self.base.push_context("else");
            self.visit_statement_list(else_part)?;
            self.base.pop_context();
        }
        self.base.pop_context();
        Ok(())
    }

    fn visit_case_conditional(&mut self, node: &CaseConditional) -> VisitResult {
        self.base.push_context(format!("case statement (expr: {})", node.expr));
        self.base.check_case_conditional(node);
        for item in &node.items {
            self.visit_case_item(item)?;
        }
        self.base.pop_context();
        Ok(())
    }

    fn visit_case_item(&mut self, node: &CaseItem) -> VisitResult {
        self.base.check_case_item(node);
        let patterns: Vec<&str> = node.patterns.iter().map(|p| p.pattern.as_str()).collect();
        self.base.push_context(format!("case pattern: {}", patterns.join(", ")));
        self.visit_statement_list(&node.commands)?;
        self.base.pop_context();
        Ok(())
    }

    fn visit_select_loop(&mut self, node: &SelectLoop) -> VisitResult {
        self.base.push_context(format!("select loop (var: {})", node.variable));
        self.base.in_loop += 1;
        self.base.check_select_loop(node);
        let context = self.base.current_context();
        self.tracker.define(&node.variable, VariableInfo::defined(&node.variable, context));
        self.visit_statement_list(&node.body)?;
        self.base.in_loop -= 1;
        self.base.pop_context();
        Ok(())
    }

    fn visit_break_statement(&mut self, node: &BreakStatement) -> VisitResult {
        self.base.check_break(node);
        Ok(())
    }

    fn visit_continue_statement(&mut self, node: &ContinueStatement) -> VisitResult {
        self.base.check_continue(node);
        Ok(())
    }

    fn visit_function_def(&mut self, node: &FunctionDef) -> VisitResult {
        self.base.check_function_def(node);
        self.tracker.enter_scope();
        let previous = self.current_function.replace(node.name.clone());
        self.base.push_context(format!("function {}", node.name));
        // Positional parameters exist inside the function body.
        self.tracker.define("0", VariableInfo {
            name: "0".to_string(),
            defined_at: Some(format!("function {}", node.name)),
            is_positional: true,
            ..Default::default()
        });
        let saved = self.base.in_function;
        self.base.in_function = true;
        self.visit_statement_list(&node.body)?;
        self.base.in_function = saved;
        self.base.pop_context();
        self.current_function = previous;
        self.tracker.exit_scope();
        Ok(())
    }

    fn visit_array_initialization(&mut self, node: &ArrayInitialization) -> VisitResult {
        self.base.check_array_initialization(node);
        Ok(())
    }

    fn visit_array_element_assignment(&mut self, node: &ArrayElementAssignment) -> VisitResult {
        self.base.check_array_element_assignment(node);
        Ok(())
    }

    fn visit_redirect(&mut self, node: &Redirect) -> VisitResult {
        self.base.check_redirect(node);
        Ok(())
    }
}

fn is_identifier(text: &str) -> bool {
    let bytes = text.as_bytes();
    match bytes.first() {
        Some(b) if *b == b'_' || b.is_ascii_alphabetic() => {}
        _ => return false,
    }
    bytes.iter().all(|b| *b == b'_' || b.is_ascii_alphanumeric())
}

/// Extracts the variable name from `$NAME`, `${NAME}`, `${NAME:-x}`, and
/// subscripted forms.
fn extract_variable_name(text: &str) -> Option<String> {
    let text = text.strip_prefix('$').unwrap_or(text);
    let text = text.strip_prefix('{').unwrap_or(text);
    let end = text
        .find(|c: char| !(c == '_' || c.is_ascii_alphanumeric()))
        .unwrap_or(text.len());
    if end == 0 { None } else { Some(text[..end].to_string()) }
}

fn has_parameter_default(text: &str) -> bool {
    [":-", ":=", ":+", ":?"].iter().any(|op| text.contains(op))
}

/// After `${NAME`, checks whether the expansion carries a default
/// (`:-`, `:=`, `:+`, `:?`) before the closing brace.
fn brace_has_default(text: &str, name_end: usize) -> bool {
    match text[name_end..].find('}') {
        Some(close) => has_parameter_default(&text[name_end..name_end + close]),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::Severity;
    use psh_parser::parse_source;

    fn validate(src: &str) -> EnhancedValidator {
        let ast = parse_source(src).unwrap();
        let mut validator = EnhancedValidator::new();
        validator.visit(NodeRef::TopLevel(&ast)).unwrap();
        validator
    }

    fn has_message(validator: &EnhancedValidator, fragment: &str) -> bool {
        validator.issues().iter().any(|i| i.message.contains(fragment))
    }

    #[test]
    fn undefined_variable_warns() {
        let v = validate("echo $undefined_thing");
        assert!(has_message(&v, "undefined variable '$undefined_thing'"));
    }

    #[test]
    fn defined_variable_does_not_warn() {
        let v = validate("x=5\necho $x");
        assert!(!has_message(&v, "undefined variable"));
    }

    #[test]
    fn special_and_positional_variables_are_always_defined() {
        let v = validate("echo $HOME $? $1 $PATH");
        assert!(!has_message(&v, "undefined variable"));
    }

    #[test]
    fn parameter_default_suppresses_warning() {
        let v = validate("echo ${missing:-fallback}");
        assert!(!has_message(&v, "undefined variable"));
    }

    #[test]
    fn test_z_probe_suppresses_warning() {
        let v = validate("[ -z \"$maybe\" ]");
        assert!(!has_message(&v, "undefined variable '$maybe'"));
    }

    #[test]
    fn read_defines_variables() {
        let v = validate("read name city\necho $name $city");
        assert!(!has_message(&v, "undefined variable"));
    }

    #[test]
    fn declare_and_local_define_variables() {
        let v = validate("declare -a list\nf() { local tmp=1; echo $tmp; }\necho $list");
        assert!(!has_message(&v, "undefined variable"));
    }

    #[test]
    fn function_scope_pops_on_exit() {
        let v = validate("f() { local inner=1; }\necho $inner");
        assert!(has_message(&v, "undefined variable '$inner'"));
    }

    #[test]
    fn for_loop_variable_is_defined_in_body() {
        let v = validate("for f in a b; do echo $f; done");
        assert!(!has_message(&v, "undefined variable"));
    }

    #[test]
    fn undefined_in_for_items_warns() {
        let v = validate("for f in $nowhere; do echo $f; done");
        assert!(has_message(&v, "undefined variable '$nowhere' in for loop items"));
    }

    #[test]
    fn typo_detection() {
        let v = validate("grpe pattern file");
        assert!(has_message(&v, "did you mean 'grep'?"));
        let v = validate("sl");
        assert!(has_message(&v, "did you mean 'ls'?"));
    }

    #[test]
    fn deprecated_command_info() {
        let v = validate("ifconfig eth0");
        assert!(has_message(&v, "'ip' instead of deprecated 'ifconfig'"));
    }

    #[test]
    fn eval_flags_security_warning() {
        let v = validate("x=1\neval $x");
        assert!(has_message(&v, "Avoid 'eval'"));
    }

    #[test]
    fn command_injection_is_error() {
        // Escaped metacharacters survive quote removal inside one word:
        // `run \$x\;ls` carries "$x;ls" as a single unquoted argument.
        let v = validate(r"run \$x\;ls");
        assert!(
            v.issues()
                .iter()
                .any(|i| i.severity == Severity::Error
                    && i.message.contains("command injection"))
        );
    }

    #[test]
    fn chmod_world_writable_warns() {
        let v = validate("chmod 777 file");
        assert!(has_message(&v, "world-writable"));
        let v = validate("chmod 666 file");
        assert!(has_message(&v, "Mode 666"));
    }

    #[test]
    fn unquoted_glob_warns_unless_intentional() {
        let v = validate("grep foo *");
        assert!(has_message(&v, "pathname expansion"));
        // *.txt matches the intentional pattern list.
        let v = validate("grep foo *.txt");
        assert!(!has_message(&v, "pathname expansion"));
        // rm is in the globbers set.
        let v = validate("rm -f *~");
        assert!(!has_message(&v, "pathname expansion"));
    }

    #[test]
    fn unquoted_dollar_at_gets_info() {
        let v = validate("printf '%s\\n' $@");
        assert!(has_message(&v, "Unquoted $@ should be \"$@\""));
    }

    #[test]
    fn test_comparison_quoting_warns() {
        let v = validate("x=1\n[ -f $x ]");
        assert!(has_message(&v, "Unquoted variable '$x' in test"));
    }

    #[test]
    fn config_flags_disable_checks() {
        let ast = parse_source("grpe pattern").unwrap();
        let mut config = ValidatorConfig::default();
        config.check_typos = false;
        let mut validator = EnhancedValidator::with_config(config);
        validator.visit(NodeRef::TopLevel(&ast)).unwrap();
        assert!(!validator.issues().iter().any(|i| i.message.contains("did you mean")));
    }

    #[test]
    fn structural_rules_still_apply() {
        let v = validate("break");
        assert!(v.issues().iter().any(|i| i.severity == Severity::Error));
    }
}
