//! Box-drawing tree renderer.
//!
//! Prints one header line per node (`ClassName [@span]`) and a line per
//! field, connecting levels with `├──`/`└──`/`│`. Works over the describe
//! tables, so any node kind renders. Compact and detailed presets match
//! the two common uses: dense overviews and full dumps.

use psh_ast::{Field, FieldValue, NodeRef};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const VERTICAL: &str = "│   ";
const SPACE: &str = "    ";
const LEAF: &str = "◦ ";
const LIST_ITEM: &str = "• ";

/// Renders AST nodes as an ASCII art tree.
#[derive(Debug, Clone)]
pub struct AsciiTreeRenderer {
    pub show_positions: bool,
    pub max_width: usize,
    pub compact_mode: bool,
    pub show_empty_fields: bool,
}

impl Default for AsciiTreeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl AsciiTreeRenderer {
    pub fn new() -> Self {
        AsciiTreeRenderer {
            show_positions: false,
            max_width: 80,
            compact_mode: false,
            show_empty_fields: false,
        }
    }

    /// Dense output: collapsed simple fields, no positions, narrow width.
    pub fn compact() -> Self {
        AsciiTreeRenderer {
            show_positions: false,
            max_width: 60,
            compact_mode: true,
            show_empty_fields: false,
        }
    }

    /// Full dump: positions and empty fields included.
    pub fn detailed() -> Self {
        AsciiTreeRenderer {
            show_positions: true,
            max_width: 100,
            compact_mode: false,
            show_empty_fields: true,
        }
    }

    pub fn render(&self, node: NodeRef<'_>) -> String {
        self.render_node(node, "", true)
    }

    fn truncate(&self, text: String) -> String {
        if text.chars().count() <= self.max_width {
            return text;
        }
        let kept: String = text.chars().take(self.max_width.saturating_sub(3)).collect();
        format!("{kept}...")
    }

    fn node_label(&self, node: NodeRef<'_>) -> String {
        let mut label = node.kind().as_str().to_string();
        if self.show_positions {
            if let Some(span) = node.span() {
                label.push_str(&format!(" @{span}"));
            }
        }
        self.truncate(label)
    }

    fn render_node(&self, node: NodeRef<'_>, prefix: &str, is_last: bool) -> String {
        let mut lines = Vec::new();
        let connector = if is_last { LAST_BRANCH } else { BRANCH };
        lines.push(format!("{prefix}{connector}{}", self.node_label(node)));

        let child_prefix = format!("{prefix}{}", if is_last { SPACE } else { VERTICAL });

        enum Disposition {
            Simple(String),
            Complex,
            Skip,
        }

        let mut simple: Vec<(&'static str, String)> = Vec::new();
        let mut complex: Vec<Field<'_>> = Vec::new();
        for field in node.fields() {
            let empty_list = |is_empty: bool| {
                if !is_empty {
                    Disposition::Complex
                } else if self.show_empty_fields {
                    Disposition::Simple("[]".to_string())
                } else {
                    Disposition::Skip
                }
            };
            let disposition = match &field.value {
                FieldValue::Str(v) => Disposition::Simple(format_string(v)),
                FieldValue::Text(v) => Disposition::Simple(format_string(v)),
                FieldValue::Bool(v) => Disposition::Simple(v.to_string()),
                FieldValue::Int(v) => Disposition::Simple(v.to_string()),
                FieldValue::StrList(items) => empty_list(items.is_empty()),
                FieldValue::TextList(items) => empty_list(items.is_empty()),
                FieldValue::Nodes(nodes) => empty_list(nodes.is_empty()),
                FieldValue::Node(_) => Disposition::Complex,
            };
            match disposition {
                Disposition::Simple(value) => simple.push((field.name, value)),
                Disposition::Complex => complex.push(field),
                Disposition::Skip => {}
            }
        }

        if self.compact_mode && !simple.is_empty() {
            let joined: Vec<String> =
                simple.iter().map(|(name, value)| format!("{name}: {value}")).collect();
            let line = self.truncate(joined.join(", "));
            lines.push(format!("{child_prefix}{LEAF}{line}"));
        } else {
            for (i, (name, value)) in simple.iter().enumerate() {
                let is_last_simple = i == simple.len() - 1 && complex.is_empty();
                let connector = if is_last_simple { LAST_BRANCH } else { BRANCH };
                let line = self.truncate(format!("{name}: {value}"));
                lines.push(format!("{child_prefix}{connector}{line}"));
            }
        }

        for (i, field) in complex.iter().enumerate() {
            let is_last_field = i == complex.len() - 1;
            match &field.value {
                FieldValue::Node(child) => {
                    let connector = if is_last_field { LAST_BRANCH } else { BRANCH };
                    lines.push(format!("{child_prefix}{connector}{}:", field.name));
                    let node_prefix =
                        format!("{child_prefix}{}", if is_last_field { SPACE } else { VERTICAL });
                    lines.push(self.render_node(*child, &node_prefix, true));
                }
                FieldValue::Nodes(children) => {
                    lines.push(self.list_header(&child_prefix, field.name, children.len(), is_last_field));
                    let list_prefix =
                        format!("{child_prefix}{}", if is_last_field { SPACE } else { VERTICAL });
                    for (j, child) in children.iter().enumerate() {
                        lines.push(self.render_node(*child, &list_prefix, j == children.len() - 1));
                    }
                }
                FieldValue::StrList(items) => {
                    let rendered: Vec<String> = items.iter().map(|i| format_string(i)).collect();
                    lines.extend(self.render_value_list(
                        &child_prefix,
                        field.name,
                        &rendered,
                        is_last_field,
                    ));
                }
                FieldValue::TextList(items) => {
                    let rendered: Vec<String> = items.iter().map(|i| format_string(i)).collect();
                    lines.extend(self.render_value_list(
                        &child_prefix,
                        field.name,
                        &rendered,
                        is_last_field,
                    ));
                }
                _ => {}
            }
        }

        lines.join("\n")
    }

    fn list_header(&self, prefix: &str, name: &str, count: usize, is_last: bool) -> String {
        let connector = if is_last { LAST_BRANCH } else { BRANCH };
        format!("{prefix}{connector}{name}: [{count} items]")
    }

    fn render_value_list(
        &self,
        prefix: &str,
        name: &str,
        items: &[String],
        is_last: bool,
    ) -> Vec<String> {
        let mut lines = vec![self.list_header(prefix, name, items.len(), is_last)];
        let list_prefix = format!("{prefix}{}", if is_last { SPACE } else { VERTICAL });
        for (i, item) in items.iter().enumerate() {
            let connector = if i == items.len() - 1 { LAST_BRANCH } else { BRANCH };
            let line = self.truncate(item.clone());
            lines.push(format!("{list_prefix}{connector}{LIST_ITEM}{line}"));
        }
        lines
    }
}

fn format_string(value: &str) -> String {
    if value.chars().count() > 30 {
        let kept: String = value.chars().take(27).collect();
        format!("\"{kept}...\"")
    } else {
        format!("\"{value}\"")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use psh_parser::parse_source;

    fn render(src: &str) -> String {
        let ast = parse_source(src).unwrap();
        AsciiTreeRenderer::new().render(NodeRef::TopLevel(&ast))
    }

    #[test]
    fn renders_nested_structure_with_connectors() {
        let out = render("echo hi | wc -l");
        assert!(out.starts_with("└── TopLevel"));
        assert!(out.contains("├── "));
        assert!(out.contains("│   "));
        assert!(out.contains("SimpleCommand"));
        assert!(out.contains("args: [2 items]"));
        assert!(out.contains("• \"echo\""));
    }

    #[test]
    fn detailed_shows_positions_and_empty_fields() {
        let ast = parse_source("echo hi").unwrap();
        let out = AsciiTreeRenderer::detailed().render(NodeRef::TopLevel(&ast));
        assert!(out.contains("@0..7"));
        assert!(out.contains("redirects: []"));
    }

    #[test]
    fn compact_collapses_simple_fields() {
        let ast = parse_source("echo hi").unwrap();
        let out = AsciiTreeRenderer::compact().render(NodeRef::TopLevel(&ast));
        assert!(out.contains("◦ "));
        assert!(!out.contains("@0..7"));
    }

    #[test]
    fn long_values_are_truncated() {
        let long = "x".repeat(60);
        let out = render(&format!("echo {long}"));
        assert!(out.contains("..."));
        assert!(!out.contains(&long));
    }

    #[test]
    fn case_items_render() {
        let out = render("case $x in a) echo a;; esac");
        assert!(out.contains("CaseConditional"));
        assert!(out.contains("CaseItem"));
        assert!(out.contains("terminator: \";;\""));
    }
}
