//! Lisp-style S-expression renderer.
//!
//! `(NodeKind :field value …)` with two special shapes: and/or lists with
//! operators render as a left-associative operator tree
//! (`(|| (&& a b) c)`), and simple commands whose arguments are plain
//! strings use the shorthand `(SimpleCommand "a" "b")`.

use psh_ast::{AndOrList, FieldValue, NodeRef, SimpleCommand};

/// Renders AST nodes as S-expressions.
#[derive(Debug, Clone)]
pub struct SexpRenderer {
    pub compact_mode: bool,
    pub max_width: usize,
    pub show_empty_fields: bool,
}

impl Default for SexpRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SexpRenderer {
    pub fn new() -> Self {
        SexpRenderer { compact_mode: false, max_width: 80, show_empty_fields: false }
    }

    pub fn compact() -> Self {
        SexpRenderer { compact_mode: true, max_width: 120, show_empty_fields: false }
    }

    pub fn render(&self, node: NodeRef<'_>) -> String {
        self.render_node(node, 0)
    }

    fn render_node(&self, node: NodeRef<'_>, indent: usize) -> String {
        match node {
            NodeRef::SimpleCommand(cmd) if is_plain_command(cmd) => {
                let args: Vec<String> = cmd.args.iter().map(|a| atom(a)).collect();
                return format!("(SimpleCommand {})", args.join(" "));
            }
            NodeRef::AndOrList(list) if !list.operators.is_empty() => {
                return self.operator_tree(list, indent);
            }
            _ => {}
        }

        let fields = self.visible_fields(node);
        if fields.is_empty() {
            return format!("({})", node.kind());
        }

        let rendered: Vec<String> = fields
            .iter()
            .map(|(name, value)| format!(":{name} {value}"))
            .collect();
        let single_line = format!("({} {})", node.kind(), rendered.join(" "));
        if single_line.len() <= self.max_width || self.compact_mode {
            return single_line;
        }

        // Multi-line: one field per line, indented under the head.
        let pad = "  ".repeat(indent + 1);
        let mut out = format!("({}", node.kind());
        for field in rendered {
            out.push('\n');
            out.push_str(&pad);
            out.push_str(&field);
        }
        out.push(')');
        out
    }

    /// `(|| (&& a b) c)`: left-associative fold over the pipelines.
    fn operator_tree(&self, list: &AndOrList, indent: usize) -> String {
        let mut pipelines = list.pipelines.iter();
        let mut tree = match pipelines.next() {
            Some(p) => self.render_node(NodeRef::Pipeline(p), indent),
            None => return "(AndOrList)".to_string(),
        };
        for (op, pipeline) in list.operators.iter().zip(pipelines) {
            let right = self.render_node(NodeRef::Pipeline(pipeline), indent);
            tree = format!("({} {tree} {right})", op.as_str());
        }
        tree
    }

    fn visible_fields(&self, node: NodeRef<'_>) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        for field in node.fields() {
            let value = match &field.value {
                FieldValue::Str(v) => atom(v),
                FieldValue::Text(v) => atom(v),
                // False booleans are noise; skip them.
                FieldValue::Bool(false) if !self.show_empty_fields => continue,
                FieldValue::Bool(v) => v.to_string(),
                FieldValue::Int(v) => v.to_string(),
                FieldValue::StrList(items) => {
                    if items.is_empty() && !self.show_empty_fields {
                        continue;
                    }
                    let rendered: Vec<String> = items.iter().map(|i| atom(i)).collect();
                    format!("({})", rendered.join(" "))
                }
                FieldValue::TextList(items) => {
                    if items.is_empty() && !self.show_empty_fields {
                        continue;
                    }
                    let rendered: Vec<String> = items.iter().map(|i| atom(i)).collect();
                    format!("({})", rendered.join(" "))
                }
                FieldValue::Node(child) => self.render_node(*child, 0),
                FieldValue::Nodes(children) => {
                    if children.is_empty() && !self.show_empty_fields {
                        continue;
                    }
                    if children.len() == 1 {
                        self.render_node(children[0], 0)
                    } else {
                        let rendered: Vec<String> =
                            children.iter().map(|c| self.render_node(*c, 0)).collect();
                        format!("({})", rendered.join(" "))
                    }
                }
            };
            out.push((field.name, value));
        }
        out
    }
}

fn is_plain_command(cmd: &SimpleCommand) -> bool {
    !cmd.args.is_empty()
        && cmd.redirects.is_empty()
        && !cmd.background
        && cmd.array_assignments.is_empty()
}

/// Quotes atoms that contain whitespace or structural characters.
fn atom(value: &str) -> String {
    if value.is_empty()
        || value.contains(' ')
        || value.chars().any(|c| matches!(c, '(' | ')' | '[' | ']' | '{' | '}' | '"' | '\'' | '\\'))
    {
        format!("\"{value}\"")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psh_parser::parse_source;

    fn sexp(src: &str) -> String {
        let ast = parse_source(src).unwrap();
        SexpRenderer::new().render(NodeRef::TopLevel(&ast))
    }

    #[test]
    fn simple_command_shorthand() {
        let out = sexp("echo hello world");
        assert!(out.contains("(SimpleCommand echo hello world)"));
    }

    #[test]
    fn arguments_with_spaces_are_quoted() {
        let out = sexp("echo \"a b\"");
        assert!(out.contains("(SimpleCommand echo \"a b\")"));
    }

    #[test]
    fn operator_tree_is_left_associative() {
        // `a && b || c` must nest as (|| (&& a b) c).
        let out = sexp("a && b || c");
        assert!(
            out.contains("(|| (&& "),
            "expected left-associative nesting, got: {out}"
        );
    }

    #[test]
    fn pipelines_render_commands() {
        let out = sexp("cat f | wc");
        assert!(out.contains(":commands"));
        assert!(out.contains("(SimpleCommand cat f)"));
        assert!(out.contains("(SimpleCommand wc)"));
    }

    #[test]
    fn false_booleans_are_skipped() {
        let out = sexp("echo hi | wc");
        assert!(!out.contains(":negated false"));
        let out = sexp("! echo hi | wc");
        assert!(out.contains(":negated true"));
    }

    #[test]
    fn function_definition_renders() {
        let out = sexp("f() { echo hi; }");
        assert!(out.contains("(FunctionDef :name f"));
    }
}
