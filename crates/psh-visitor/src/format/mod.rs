//! AST renderers.
//!
//! All renderers are pure: they take a node and return a string. The tree,
//! DOT, and S-expression renderers work over the describe tables and thus
//! handle any node kind; the script formatter reconstructs runnable shell
//! source from the typed tree.

mod dot;
mod pretty;
mod sexp;
mod tree;

pub use dot::DotGenerator;
pub use pretty::ScriptFormatter;
pub use sexp::SexpRenderer;
pub use tree::AsciiTreeRenderer;

/// Output format selector for AST debug dumps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AstFormat {
    Pretty,
    #[default]
    Tree,
    Compact,
    Dot,
    Sexp,
}

impl AstFormat {
    /// Parses a format name (`pretty`, `tree`, `compact`, `dot`, `sexp`).
    pub fn parse(name: &str) -> Option<AstFormat> {
        Some(match name {
            "pretty" => AstFormat::Pretty,
            "tree" => AstFormat::Tree,
            "compact" => AstFormat::Compact,
            "dot" => AstFormat::Dot,
            "sexp" => AstFormat::Sexp,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AstFormat::Pretty => "pretty",
            AstFormat::Tree => "tree",
            AstFormat::Compact => "compact",
            AstFormat::Dot => "dot",
            AstFormat::Sexp => "sexp",
        }
    }
}

/// Renders `node` in the requested format with default renderer settings.
pub fn render(node: psh_ast::NodeRef<'_>, format: AstFormat, show_positions: bool) -> String {
    match format {
        AstFormat::Pretty => match node {
            psh_ast::NodeRef::TopLevel(top) => {
                ScriptFormatter::new().with_spans(show_positions).format(top)
            }
            other => ScriptFormatter::new().format_node(other),
        },
        AstFormat::Tree => {
            let mut renderer = AsciiTreeRenderer::new();
            renderer.show_positions = show_positions;
            renderer.render(node)
        }
        AstFormat::Compact => AsciiTreeRenderer::compact().render(node),
        AstFormat::Dot => {
            let mut generator = DotGenerator::new();
            generator.show_positions = show_positions;
            generator.to_dot(node)
        }
        AstFormat::Sexp => SexpRenderer::new().render(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_names_round_trip() {
        for format in [
            AstFormat::Pretty,
            AstFormat::Tree,
            AstFormat::Compact,
            AstFormat::Dot,
            AstFormat::Sexp,
        ] {
            assert_eq!(AstFormat::parse(format.as_str()), Some(format));
        }
        assert_eq!(AstFormat::parse("json"), None);
    }
}
