//! Graphviz DOT output for AST diagrams.

use psh_ast::{FieldValue, NodeKind, NodeRef};

/// Generates a Graphviz `digraph` from an AST.
///
/// Node ids are assigned in visit order; list-valued fields with more than
/// one entry are grouped under an intermediate ellipse labeled
/// `{field} [N items]`.
#[derive(Debug, Clone)]
pub struct DotGenerator {
    pub graph_name: String,
    pub show_positions: bool,
    pub compact_nodes: bool,
    pub color_by_type: bool,
    counter: usize,
    nodes: Vec<String>,
    edges: Vec<String>,
}

impl Default for DotGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DotGenerator {
    pub fn new() -> Self {
        DotGenerator {
            graph_name: "AST".to_string(),
            show_positions: false,
            compact_nodes: true,
            color_by_type: true,
            counter: 0,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Converts an AST to DOT format.
    pub fn to_dot(&mut self, root: NodeRef<'_>) -> String {
        self.counter = 0;
        self.nodes.clear();
        self.edges.clear();
        self.visit(root);

        let mut out = vec![
            format!("digraph {} {{", self.graph_name),
            "    rankdir=TB;".to_string(),
            "    node [fontname=\"Helvetica\", fontsize=10];".to_string(),
            "    edge [fontname=\"Helvetica\", fontsize=8];".to_string(),
            String::new(),
        ];
        if !self.nodes.is_empty() {
            out.push("    // Nodes".to_string());
            for node in &self.nodes {
                out.push(format!("    {node}"));
            }
            out.push(String::new());
        }
        if !self.edges.is_empty() {
            out.push("    // Edges".to_string());
            for edge in &self.edges {
                out.push(format!("    {edge}"));
            }
        }
        out.push("}".to_string());
        out.join("\n")
    }

    fn next_id(&mut self) -> String {
        self.counter += 1;
        format!("node{}", self.counter)
    }

    fn visit(&mut self, node: NodeRef<'_>) -> String {
        let id = self.next_id();
        let label = self.node_label(node);
        let color = self.node_color(node.kind());
        self.nodes.push(format!(
            "{id} [label=\"{}\", shape=box, style=filled, fillcolor=\"{color}\"];",
            escape_label(&label)
        ));

        for field in node.fields() {
            match field.value {
                FieldValue::Node(child) => {
                    let child_id = self.visit(child);
                    self.add_edge(&id, &child_id, field.name);
                }
                FieldValue::Nodes(children) => {
                    if children.is_empty() {
                        continue;
                    }
                    if children.len() == 1 {
                        let child_id = self.visit(children[0]);
                        self.add_edge(&id, &child_id, field.name);
                    } else {
                        let list_id = self.add_list_node(field.name, children.len());
                        self.add_edge(&id, &list_id, field.name);
                        for (i, child) in children.into_iter().enumerate() {
                            let child_id = self.visit(child);
                            self.add_edge(&list_id, &child_id, &i.to_string());
                        }
                    }
                }
                FieldValue::StrList(items) => {
                    self.add_value_items(&id, field.name, items.iter().map(String::as_str));
                }
                FieldValue::TextList(ref items) => {
                    self.add_value_items(&id, field.name, items.iter().map(String::as_str));
                }
                // Simple scalars already appear in the node label.
                _ => {}
            }
        }
        id
    }

    fn node_label(&self, node: NodeRef<'_>) -> String {
        let mut parts = vec![node.kind().as_str().to_string()];
        if self.show_positions {
            if let Some(span) = node.span() {
                parts.push(format!("@{span}"));
            }
        }
        if self.compact_nodes {
            for field in node.fields() {
                match &field.value {
                    FieldValue::Str(v) if v.len() < 20 => {
                        parts.push(format!("{}: {v}", field.name));
                    }
                    FieldValue::Text(v) if v.len() < 20 => {
                        parts.push(format!("{}: {v}", field.name));
                    }
                    FieldValue::Int(v) => parts.push(format!("{}: {v}", field.name)),
                    FieldValue::Bool(true) => parts.push(format!("{}: true", field.name)),
                    _ => {}
                }
            }
        }
        parts.join("\\n")
    }

    fn node_color(&self, kind: NodeKind) -> &'static str {
        if !self.color_by_type {
            return "#FFFFFF";
        }
        match kind {
            NodeKind::SimpleCommand => "#E3F2FD",
            NodeKind::Pipeline => "#E8F5E8",
            NodeKind::IfConditional => "#FFF3E0",
            NodeKind::WhileLoop | NodeKind::ForLoop | NodeKind::CStyleForLoop
            | NodeKind::SelectLoop => "#F3E5F5",
            NodeKind::FunctionDef => "#FFEBEE",
            NodeKind::CaseConditional => "#E0F2F1",
            NodeKind::StatementList => "#F5F5F5",
            NodeKind::AndOrList => "#E1F5FE",
            NodeKind::Redirect => "#FFF8E1",
            _ => "#F0F0F0",
        }
    }

    fn add_list_node(&mut self, field_name: &str, count: usize) -> String {
        let id = self.next_id();
        self.nodes.push(format!(
            "{id} [label=\"{field_name}\\n[{count} items]\", shape=ellipse, style=filled, fillcolor=\"#F5F5F5\"];"
        ));
        id
    }

    fn add_value_items<'i>(
        &mut self,
        parent: &str,
        field_name: &str,
        items: impl Iterator<Item = &'i str>,
    ) {
        let items: Vec<&str> = items.collect();
        if items.is_empty() {
            return;
        }
        let attach_to = if items.len() > 1 {
            let list_id = self.add_list_node(field_name, items.len());
            self.add_edge(parent, &list_id, field_name);
            list_id
        } else {
            parent.to_string()
        };
        for (i, item) in items.iter().enumerate() {
            let id = self.next_id();
            let label = if item.chars().count() > 30 {
                let kept: String = item.chars().take(30).collect();
                format!("{kept}...")
            } else {
                (*item).to_string()
            };
            self.nodes.push(format!(
                "{id} [label=\"{}\", shape=ellipse, style=filled, fillcolor=\"#EEEEEE\"];",
                escape_label(&label)
            ));
            let edge_label = if items.len() > 1 { i.to_string() } else { field_name.to_string() };
            self.add_edge(&attach_to, &id, &edge_label);
        }
    }

    fn add_edge(&mut self, from: &str, to: &str, label: &str) {
        if label.is_empty() {
            self.edges.push(format!("{from} -> {to};"));
        } else {
            self.edges.push(format!("{from} -> {to} [label=\"{}\"];", escape_label(label)));
        }
    }
}

fn escape_label(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use psh_parser::parse_source;

    fn dot(src: &str) -> String {
        let ast = parse_source(src).unwrap();
        DotGenerator::new().to_dot(NodeRef::TopLevel(&ast))
    }

    #[test]
    fn output_is_a_digraph() {
        let out = dot("echo hi");
        assert!(out.starts_with("digraph AST {"));
        assert!(out.ends_with("}"));
        assert!(out.contains("rankdir=TB;"));
    }

    #[test]
    fn case_nodes_and_terminators_appear() {
        let out = dot("case $x in a) echo a;; b) echo b;; esac");
        assert!(out.contains("CaseConditional"));
        assert_eq!(out.matches("CaseItem").count(), 2);
        assert!(out.contains("terminator: ;;"));
    }

    #[test]
    fn multi_item_lists_get_group_nodes() {
        let out = dot("a | b | c");
        assert!(out.contains("commands\\n[3 items]"));
        assert!(out.contains("shape=ellipse"));
    }

    #[test]
    fn labels_are_escaped() {
        let out = dot("echo '<tag>' '\"x\"'");
        assert!(out.contains("&lt;tag&gt;"));
        assert!(out.contains("&quot;x&quot;"));
    }

    #[test]
    fn colors_by_node_kind() {
        let out = dot("echo hi | wc");
        assert!(out.contains("#E3F2FD")); // SimpleCommand
        assert!(out.contains("#E8F5E8")); // Pipeline
    }

    #[test]
    fn colors_can_be_disabled() {
        let ast = parse_source("echo hi").unwrap();
        let mut generator = DotGenerator::new();
        generator.color_by_type = false;
        let out = generator.to_dot(NodeRef::TopLevel(&ast));
        assert!(!out.contains("#E3F2FD"));
        assert!(out.contains("#FFFFFF"));
    }
}
