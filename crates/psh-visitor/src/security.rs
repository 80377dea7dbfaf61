//! Pattern-based security analysis over the AST.
//!
//! Complements the security rules in the enhanced validator; this visitor
//! is the standalone scan used by the security pipeline and reports
//! severity-ranked [`SecurityIssue`]s instead of validation issues.

use std::fmt;

use psh_ast::*;
use serde::Serialize;

use crate::constants::{
    DANGEROUS_COMMANDS, DANGEROUS_RM_TARGETS, SENSITIVE_COMMANDS, SENSITIVE_FILES,
    SHELL_INTERPRETERS,
};
use crate::visit::{AstVisitor, VisitResult, walk_children};

/// Risk level of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::High => "HIGH",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::Low => "LOW",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A security finding.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityIssue {
    pub severity: RiskLevel,
    /// Stable issue tag, e.g. `DANGEROUS_COMMAND`.
    pub kind: String,
    pub message: String,
    #[serde(serialize_with = "serialize_node_kind")]
    pub node_kind: NodeKind,
}

fn serialize_node_kind<S: serde::Serializer>(kind: &NodeKind, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(kind.as_str())
}

impl fmt::Display for SecurityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.kind, self.message)
    }
}

/// Aggregated scan result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SecurityReport {
    pub total_issues: usize,
    pub high_severity: usize,
    pub medium_severity: usize,
    pub low_severity: usize,
    pub issues: Vec<SecurityIssue>,
}

/// Analyzes the AST for dangerous commands and risky patterns.
#[derive(Default)]
pub struct SecurityVisitor {
    pub issues: Vec<SecurityIssue>,
}

impl SecurityVisitor {
    pub fn new() -> Self {
        SecurityVisitor::default()
    }

    fn report(&mut self, severity: RiskLevel, kind: &str, message: impl Into<String>, node: NodeKind) {
        self.issues.push(SecurityIssue {
            severity,
            kind: kind.to_string(),
            message: message.into(),
            node_kind: node,
        });
    }

    pub fn get_report(&self) -> SecurityReport {
        let count = |level| self.issues.iter().filter(|i| i.severity == level).count();
        SecurityReport {
            total_issues: self.issues.len(),
            high_severity: count(RiskLevel::High),
            medium_severity: count(RiskLevel::Medium),
            low_severity: count(RiskLevel::Low),
            issues: self.issues.clone(),
        }
    }

    /// Formatted summary grouped by severity.
    pub fn get_summary(&self) -> String {
        if self.issues.is_empty() {
            return "No security issues found!".to_string();
        }
        let report = self.get_report();
        let mut lines = vec![
            "Security Analysis Summary:".to_string(),
            "═".repeat(30),
            format!("Total Issues: {}", report.total_issues),
            format!("  High Risk:   {:>3}", report.high_severity),
            format!("  Medium Risk: {:>3}", report.medium_severity),
            format!("  Low Risk:    {:>3}", report.low_severity),
            String::new(),
        ];
        for level in [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low] {
            let group: Vec<_> = self.issues.iter().filter(|i| i.severity == level).collect();
            if group.is_empty() {
                continue;
            }
            lines.push(format!("{level} RISK ISSUES:"));
            for issue in group {
                lines.push(format!("  • {}", issue.message));
            }
            lines.push(String::new());
        }
        lines.join("\n").trim_end().to_string()
    }
}

impl AstVisitor for SecurityVisitor {
    fn generic_visit(&mut self, node: NodeRef<'_>) -> VisitResult {
        walk_children(self, node)
    }

    fn visit_simple_command(&mut self, node: &SimpleCommand) -> VisitResult {
        let kind = NodeKind::SimpleCommand;
        let Some(cmd) = node.name() else {
            return Ok(());
        };

        if let Some(reason) = DANGEROUS_COMMANDS.get(cmd) {
            self.report(RiskLevel::High, "DANGEROUS_COMMAND", format!("{cmd}: {reason}"), kind);
        }
        if let Some(reason) = SENSITIVE_COMMANDS.get(cmd) {
            self.report(RiskLevel::Medium, "SENSITIVE_COMMAND", format!("{cmd}: {reason}"), kind);
        }

        if cmd == "chmod" {
            for arg in &node.args[1..] {
                if is_world_writable_permission(arg) {
                    self.report(
                        RiskLevel::High,
                        "WORLD_WRITABLE",
                        format!("chmod {arg}: Creates world-writable files - security risk"),
                        kind,
                    );
                }
            }
        }

        // Unquoted expansions handed to an interpreter.
        if cmd == "eval" || SHELL_INTERPRETERS.contains(cmd) {
            for (i, arg) in node.args.iter().enumerate().skip(1) {
                let word = node.words.get(i);
                let unquoted_expansion = match word {
                    Some(word) => {
                        word.is_variable_expansion || (!word.is_quoted && arg.contains('$'))
                    }
                    None => arg.contains('$'),
                };
                if unquoted_expansion {
                    self.report(
                        RiskLevel::High,
                        "UNQUOTED_EXPANSION",
                        format!("Unquoted variable in {cmd} - potential command injection"),
                        kind,
                    );
                }
            }
        }

        if cmd == "rm" && node.args.iter().any(|a| a == "-rf" || a == "-fr") {
            for arg in &node.args[1..] {
                if DANGEROUS_RM_TARGETS.contains(arg.as_str()) {
                    self.report(
                        RiskLevel::High,
                        "DANGEROUS_RM",
                        format!("rm -rf {arg}: Extremely dangerous operation"),
                        kind,
                    );
                }
            }
        }

        for redirect in &node.redirects {
            self.visit_redirect(redirect)?;
        }
        Ok(())
    }

    fn visit_pipeline(&mut self, node: &Pipeline) -> VisitResult {
        let names: Vec<&str> = node
            .commands
            .iter()
            .filter_map(|c| match c {
                Command::Simple(cmd) => cmd.name(),
                _ => None,
            })
            .collect();
        if names.len() >= 2 {
            let first = names[0];
            let last = names[names.len() - 1];
            if (first == "curl" || first == "wget") && SHELL_INTERPRETERS.contains(last) {
                self.report(
                    RiskLevel::High,
                    "REMOTE_CODE_EXECUTION",
                    "Downloading and executing remote code without verification",
                    NodeKind::Pipeline,
                );
            }
        }
        for command in &node.commands {
            self.visit(command.into())?;
        }
        Ok(())
    }

    fn visit_redirect(&mut self, node: &Redirect) -> VisitResult {
        if matches!(node.kind, RedirectKind::Out | RedirectKind::Append) {
            if let Some(target) = &node.target {
                if SENSITIVE_FILES.contains(target.as_str()) {
                    self.report(
                        RiskLevel::High,
                        "SENSITIVE_FILE_WRITE",
                        format!("Writing to sensitive file: {target}"),
                        NodeKind::Redirect,
                    );
                }
            }
        }
        Ok(())
    }

    fn visit_for_loop(&mut self, node: &ForLoop) -> VisitResult {
        for item in &node.items {
            if item.starts_with("$(") || item.starts_with('`') {
                self.report(
                    RiskLevel::Medium,
                    "UNQUOTED_SUBSTITUTION",
                    "Iterating over unquoted command substitution - may break on spaces",
                    NodeKind::ForLoop,
                );
            }
        }
        self.visit_statement_list(&node.body)
    }

    fn visit_arithmetic_evaluation(&mut self, node: &ArithmeticEvaluation) -> VisitResult {
        // Any alphabetic residue after dropping numbers and operators is a
        // variable reference the script may not sanitize.
        let residue: String = node
            .expression
            .chars()
            .filter(|c| !matches!(c, '0'..='9' | '+' | '-' | '*' | '/' | '%' | '(' | ')' | '='
                | ' ' | '\t' | '<' | '>' | '!' | '&' | '|' | '^' | '~' | '$' | ';' | ','))
            .collect();
        if residue.chars().any(|c| c.is_alphabetic() || c == '_') {
            self.report(
                RiskLevel::Medium,
                "ARITHMETIC_INJECTION",
                "Variable expansion in arithmetic - ensure variables contain only numbers",
                NodeKind::ArithmeticEvaluation,
            );
        }
        Ok(())
    }
}

fn is_world_writable_permission(perm: &str) -> bool {
    let digits = perm.strip_prefix('0').unwrap_or(perm);
    if (3..=4).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()) {
        return digits.as_bytes().last().is_some_and(|b| (b - b'0') & 2 != 0);
    }
    perm.contains("o+w") || perm.contains("a+w") || perm.contains("o=w")
}

#[cfg(test)]
mod tests {
    use super::*;
    use psh_parser::parse_source;

    fn scan(src: &str) -> SecurityVisitor {
        let ast = parse_source(src).unwrap();
        let mut visitor = SecurityVisitor::new();
        visitor.visit(NodeRef::TopLevel(&ast)).unwrap();
        visitor
    }

    fn has(visitor: &SecurityVisitor, severity: RiskLevel, kind: &str) -> bool {
        visitor.issues.iter().any(|i| i.severity == severity && i.kind == kind)
    }

    #[test]
    fn eval_with_expansion_is_high_risk() {
        // `eval` on expanded input is the canonical injection vector.
        let v = scan("eval $user_input");
        assert!(has(&v, RiskLevel::High, "DANGEROUS_COMMAND"));
        assert!(has(&v, RiskLevel::High, "UNQUOTED_EXPANSION"));
    }

    #[test]
    fn quoted_expansion_in_eval_is_not_flagged_as_unquoted() {
        let v = scan("eval \"$cmd\"");
        assert!(has(&v, RiskLevel::High, "DANGEROUS_COMMAND"));
        // Double quotes remove word splitting but keep the eval warning.
        assert!(!has(&v, RiskLevel::High, "UNQUOTED_EXPANSION"));
    }

    #[test]
    fn sensitive_commands_are_medium() {
        let v = scan("dd if=/dev/zero of=/dev/sda");
        assert!(has(&v, RiskLevel::Medium, "SENSITIVE_COMMAND"));
    }

    #[test]
    fn world_writable_chmod() {
        for mode in ["777", "0777", "666", "a+w", "o+w"] {
            let v = scan(&format!("chmod {mode} file"));
            assert!(has(&v, RiskLevel::High, "WORLD_WRITABLE"), "mode {mode}");
        }
        let v = scan("chmod 644 file");
        assert!(!has(&v, RiskLevel::High, "WORLD_WRITABLE"));
    }

    #[test]
    fn rm_rf_on_root_paths() {
        let v = scan("rm -rf /");
        assert!(has(&v, RiskLevel::High, "DANGEROUS_RM"));
        let v = scan("rm -rf ./build");
        assert!(!has(&v, RiskLevel::High, "DANGEROUS_RM"));
    }

    #[test]
    fn curl_piped_to_shell() {
        let v = scan("curl https://example.com/install.sh | sh");
        assert!(has(&v, RiskLevel::High, "REMOTE_CODE_EXECUTION"));
        let v = scan("wget -qO- https://example.com/x | bash");
        assert!(has(&v, RiskLevel::High, "REMOTE_CODE_EXECUTION"));
        let v = scan("curl https://example.com | jq .");
        assert!(!has(&v, RiskLevel::High, "REMOTE_CODE_EXECUTION"));
    }

    #[test]
    fn sensitive_file_writes() {
        let v = scan("echo 'root::0:0::/:/bin/sh' >> /etc/passwd");
        assert!(has(&v, RiskLevel::High, "SENSITIVE_FILE_WRITE"));
        let v = scan("cat < /etc/passwd");
        assert!(!has(&v, RiskLevel::High, "SENSITIVE_FILE_WRITE"));
    }

    #[test]
    fn unquoted_substitution_in_for_items() {
        let v = scan("for f in $(ls); do echo $f; done");
        assert!(has(&v, RiskLevel::Medium, "UNQUOTED_SUBSTITUTION"));
    }

    #[test]
    fn arithmetic_with_identifiers() {
        let v = scan("((total = count * 2))");
        assert!(has(&v, RiskLevel::Medium, "ARITHMETIC_INJECTION"));
        let v = scan("((1 + 2))");
        assert!(!has(&v, RiskLevel::Medium, "ARITHMETIC_INJECTION"));
    }

    #[test]
    fn report_counts_by_severity() {
        let v = scan("eval $x\nchmod 777 f\nrm -rf /etc");
        let report = v.get_report();
        assert_eq!(report.total_issues, report.issues.len());
        assert!(report.high_severity >= 3);
        let summary = v.get_summary();
        assert!(summary.contains("HIGH RISK ISSUES:"));
    }

    #[test]
    fn clean_script_summary() {
        let v = scan("ls -l");
        assert_eq!(v.get_summary(), "No security issues found!");
    }
}
