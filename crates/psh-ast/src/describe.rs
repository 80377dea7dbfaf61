//! Reflection layer over the node taxonomy.
//!
//! The generic renderers (tree, DOT, S-expression) and the structural
//! equality check walk arbitrary nodes without matching on every type.
//! Instead of runtime reflection, each node kind has a manually maintained
//! field table exposed through [`NodeRef::fields`]. Kind names are the
//! abstract node names, never Rust type paths.

use crate::ast::*;
use psh_position_tracking::ByteSpan;

/// Node kind identity, used for dispatch caching, issue reporting, and
/// renderer labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    TopLevel,
    StatementList,
    AndOrList,
    Pipeline,
    SimpleCommand,
    WhileLoop,
    ForLoop,
    CStyleForLoop,
    IfConditional,
    CaseConditional,
    CaseItem,
    SelectLoop,
    ArithmeticEvaluation,
    EnhancedTestStatement,
    SubshellGroup,
    BraceGroup,
    FunctionDef,
    BreakStatement,
    ContinueStatement,
    Redirect,
    ArrayInitialization,
    ArrayElementAssignment,
    BinaryTestExpression,
    UnaryTestExpression,
    CompoundTestExpression,
    NegatedTestExpression,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::TopLevel => "TopLevel",
            NodeKind::StatementList => "StatementList",
            NodeKind::AndOrList => "AndOrList",
            NodeKind::Pipeline => "Pipeline",
            NodeKind::SimpleCommand => "SimpleCommand",
            NodeKind::WhileLoop => "WhileLoop",
            NodeKind::ForLoop => "ForLoop",
            NodeKind::CStyleForLoop => "CStyleForLoop",
            NodeKind::IfConditional => "IfConditional",
            NodeKind::CaseConditional => "CaseConditional",
            NodeKind::CaseItem => "CaseItem",
            NodeKind::SelectLoop => "SelectLoop",
            NodeKind::ArithmeticEvaluation => "ArithmeticEvaluation",
            NodeKind::EnhancedTestStatement => "EnhancedTestStatement",
            NodeKind::SubshellGroup => "SubshellGroup",
            NodeKind::BraceGroup => "BraceGroup",
            NodeKind::FunctionDef => "FunctionDef",
            NodeKind::BreakStatement => "BreakStatement",
            NodeKind::ContinueStatement => "ContinueStatement",
            NodeKind::Redirect => "Redirect",
            NodeKind::ArrayInitialization => "ArrayInitialization",
            NodeKind::ArrayElementAssignment => "ArrayElementAssignment",
            NodeKind::BinaryTestExpression => "BinaryTestExpression",
            NodeKind::UnaryTestExpression => "UnaryTestExpression",
            NodeKind::CompoundTestExpression => "CompoundTestExpression",
            NodeKind::NegatedTestExpression => "NegatedTestExpression",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Borrowed reference to any node in the tree.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    TopLevel(&'a TopLevel),
    StatementList(&'a StatementList),
    AndOrList(&'a AndOrList),
    Pipeline(&'a Pipeline),
    SimpleCommand(&'a SimpleCommand),
    WhileLoop(&'a WhileLoop),
    ForLoop(&'a ForLoop),
    CStyleForLoop(&'a CStyleForLoop),
    IfConditional(&'a IfConditional),
    CaseConditional(&'a CaseConditional),
    CaseItem(&'a CaseItem),
    SelectLoop(&'a SelectLoop),
    ArithmeticEvaluation(&'a ArithmeticEvaluation),
    EnhancedTestStatement(&'a EnhancedTestStatement),
    SubshellGroup(&'a SubshellGroup),
    BraceGroup(&'a BraceGroup),
    FunctionDef(&'a FunctionDef),
    BreakStatement(&'a BreakStatement),
    ContinueStatement(&'a ContinueStatement),
    Redirect(&'a Redirect),
    ArrayInitialization(&'a ArrayInitialization),
    ArrayElementAssignment(&'a ArrayElementAssignment),
    BinaryTestExpression(&'a BinaryTestExpression),
    UnaryTestExpression(&'a UnaryTestExpression),
    CompoundTestExpression(&'a CompoundTestExpression),
    NegatedTestExpression(&'a NegatedTestExpression),
}

/// One entry in a node's field table.
#[derive(Debug, Clone)]
pub struct Field<'a> {
    pub name: &'static str,
    pub value: FieldValue<'a>,
}

impl<'a> Field<'a> {
    fn new(name: &'static str, value: FieldValue<'a>) -> Self {
        Field { name, value }
    }
}

/// A field value: either simple data or nested nodes.
#[derive(Debug, Clone)]
pub enum FieldValue<'a> {
    Str(&'a str),
    /// Owned text computed for display (operator spellings, enum names).
    Text(String),
    Bool(bool),
    Int(i64),
    StrList(&'a [String]),
    /// Owned list computed for display.
    TextList(Vec<String>),
    Node(NodeRef<'a>),
    Nodes(Vec<NodeRef<'a>>),
}

impl FieldValue<'_> {
    /// True for values the renderers print inline (everything that is not
    /// a nested node).
    pub fn is_simple(&self) -> bool {
        !matches!(self, FieldValue::Node(_) | FieldValue::Nodes(_))
    }
}

impl<'a> From<&'a TopLevelItem> for NodeRef<'a> {
    fn from(item: &'a TopLevelItem) -> Self {
        match item {
            TopLevelItem::Function(f) => NodeRef::FunctionDef(f),
            TopLevelItem::Statements(s) => NodeRef::StatementList(s),
        }
    }
}

impl<'a> From<&'a Command> for NodeRef<'a> {
    fn from(command: &'a Command) -> Self {
        match command {
            Command::Simple(c) => NodeRef::SimpleCommand(c),
            Command::Compound(c) => c.into(),
            Command::Function(f) => NodeRef::FunctionDef(f),
            Command::Break(b) => NodeRef::BreakStatement(b),
            Command::Continue(c) => NodeRef::ContinueStatement(c),
        }
    }
}

impl<'a> From<&'a CompoundCommand> for NodeRef<'a> {
    fn from(compound: &'a CompoundCommand) -> Self {
        match compound {
            CompoundCommand::While(n) => NodeRef::WhileLoop(n),
            CompoundCommand::For(n) => NodeRef::ForLoop(n),
            CompoundCommand::CStyleFor(n) => NodeRef::CStyleForLoop(n),
            CompoundCommand::If(n) => NodeRef::IfConditional(n),
            CompoundCommand::Case(n) => NodeRef::CaseConditional(n),
            CompoundCommand::Select(n) => NodeRef::SelectLoop(n),
            CompoundCommand::Arithmetic(n) => NodeRef::ArithmeticEvaluation(n),
            CompoundCommand::Test(n) => NodeRef::EnhancedTestStatement(n),
            CompoundCommand::Subshell(n) => NodeRef::SubshellGroup(n),
            CompoundCommand::BraceGroup(n) => NodeRef::BraceGroup(n),
        }
    }
}

impl<'a> From<&'a TestExpr> for NodeRef<'a> {
    fn from(expr: &'a TestExpr) -> Self {
        match expr {
            TestExpr::Binary(n) => NodeRef::BinaryTestExpression(n),
            TestExpr::Unary(n) => NodeRef::UnaryTestExpression(n),
            TestExpr::Compound(n) => NodeRef::CompoundTestExpression(n),
            TestExpr::Negated(n) => NodeRef::NegatedTestExpression(n),
        }
    }
}

impl<'a> From<&'a ArrayAssignment> for NodeRef<'a> {
    fn from(assignment: &'a ArrayAssignment) -> Self {
        match assignment {
            ArrayAssignment::Initialization(n) => NodeRef::ArrayInitialization(n),
            ArrayAssignment::ElementAssignment(n) => NodeRef::ArrayElementAssignment(n),
        }
    }
}

fn redirect_refs(redirects: &[Redirect]) -> Vec<NodeRef<'_>> {
    redirects.iter().map(NodeRef::Redirect).collect()
}

impl<'a> NodeRef<'a> {
    /// The abstract node kind.
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::TopLevel(_) => NodeKind::TopLevel,
            NodeRef::StatementList(_) => NodeKind::StatementList,
            NodeRef::AndOrList(_) => NodeKind::AndOrList,
            NodeRef::Pipeline(_) => NodeKind::Pipeline,
            NodeRef::SimpleCommand(_) => NodeKind::SimpleCommand,
            NodeRef::WhileLoop(_) => NodeKind::WhileLoop,
            NodeRef::ForLoop(_) => NodeKind::ForLoop,
            NodeRef::CStyleForLoop(_) => NodeKind::CStyleForLoop,
            NodeRef::IfConditional(_) => NodeKind::IfConditional,
            NodeRef::CaseConditional(_) => NodeKind::CaseConditional,
            NodeRef::CaseItem(_) => NodeKind::CaseItem,
            NodeRef::SelectLoop(_) => NodeKind::SelectLoop,
            NodeRef::ArithmeticEvaluation(_) => NodeKind::ArithmeticEvaluation,
            NodeRef::EnhancedTestStatement(_) => NodeKind::EnhancedTestStatement,
            NodeRef::SubshellGroup(_) => NodeKind::SubshellGroup,
            NodeRef::BraceGroup(_) => NodeKind::BraceGroup,
            NodeRef::FunctionDef(_) => NodeKind::FunctionDef,
            NodeRef::BreakStatement(_) => NodeKind::BreakStatement,
            NodeRef::ContinueStatement(_) => NodeKind::ContinueStatement,
            NodeRef::Redirect(_) => NodeKind::Redirect,
            NodeRef::ArrayInitialization(_) => NodeKind::ArrayInitialization,
            NodeRef::ArrayElementAssignment(_) => NodeKind::ArrayElementAssignment,
            NodeRef::BinaryTestExpression(_) => NodeKind::BinaryTestExpression,
            NodeRef::UnaryTestExpression(_) => NodeKind::UnaryTestExpression,
            NodeRef::CompoundTestExpression(_) => NodeKind::CompoundTestExpression,
            NodeRef::NegatedTestExpression(_) => NodeKind::NegatedTestExpression,
        }
    }

    /// Source span, when the parser recorded one.
    pub fn span(&self) -> Option<ByteSpan> {
        match self {
            NodeRef::TopLevel(n) => n.span,
            NodeRef::StatementList(n) => n.span,
            NodeRef::AndOrList(n) => n.span,
            NodeRef::Pipeline(n) => n.span,
            NodeRef::SimpleCommand(n) => n.span,
            NodeRef::WhileLoop(n) => n.span,
            NodeRef::ForLoop(n) => n.span,
            NodeRef::CStyleForLoop(n) => n.span,
            NodeRef::IfConditional(n) => n.span,
            NodeRef::CaseConditional(n) => n.span,
            NodeRef::CaseItem(n) => n.span,
            NodeRef::SelectLoop(n) => n.span,
            NodeRef::ArithmeticEvaluation(n) => n.span,
            NodeRef::EnhancedTestStatement(n) => n.span,
            NodeRef::SubshellGroup(n) => n.span,
            NodeRef::BraceGroup(n) => n.span,
            NodeRef::FunctionDef(n) => n.span,
            NodeRef::BreakStatement(n) => n.span,
            NodeRef::ContinueStatement(n) => n.span,
            NodeRef::Redirect(n) => n.span,
            NodeRef::ArrayInitialization(n) => n.span,
            NodeRef::ArrayElementAssignment(n) => n.span,
            NodeRef::BinaryTestExpression(n) => n.span,
            NodeRef::UnaryTestExpression(n) => n.span,
            NodeRef::CompoundTestExpression(n) => n.span,
            NodeRef::NegatedTestExpression(n) => n.span,
        }
    }

    /// The node's field table, in declaration order. Optional fields are
    /// omitted when absent; empty collections are kept so renderers can
    /// decide whether to show them.
    pub fn fields(&self) -> Vec<Field<'a>> {
        match *self {
            NodeRef::TopLevel(n) => vec![Field::new(
                "items",
                FieldValue::Nodes(n.items.iter().map(NodeRef::from).collect()),
            )],
            NodeRef::StatementList(n) => vec![Field::new(
                "statements",
                FieldValue::Nodes(n.statements.iter().map(NodeRef::AndOrList).collect()),
            )],
            NodeRef::AndOrList(n) => vec![
                Field::new(
                    "pipelines",
                    FieldValue::Nodes(n.pipelines.iter().map(NodeRef::Pipeline).collect()),
                ),
                Field::new(
                    "operators",
                    FieldValue::TextList(n.operators.iter().map(|op| op.as_str().to_string()).collect()),
                ),
            ],
            NodeRef::Pipeline(n) => vec![
                Field::new(
                    "commands",
                    FieldValue::Nodes(n.commands.iter().map(NodeRef::from).collect()),
                ),
                Field::new("negated", FieldValue::Bool(n.negated)),
            ],
            NodeRef::SimpleCommand(n) => {
                let mut fields = vec![
                    Field::new("args", FieldValue::StrList(&n.args)),
                    Field::new(
                        "arg_types",
                        FieldValue::TextList(n.arg_types.iter().map(|t| t.as_str().to_string()).collect()),
                    ),
                    Field::new(
                        "quote_types",
                        FieldValue::TextList(
                            n.quote_types
                                .iter()
                                .map(|q| q.map(|c| c.to_string()).unwrap_or_else(|| "None".to_string()))
                                .collect(),
                        ),
                    ),
                    Field::new("redirects", FieldValue::Nodes(redirect_refs(&n.redirects))),
                    Field::new("background", FieldValue::Bool(n.background)),
                ];
                if !n.array_assignments.is_empty() {
                    fields.push(Field::new(
                        "array_assignments",
                        FieldValue::Nodes(n.array_assignments.iter().map(NodeRef::from).collect()),
                    ));
                }
                fields
            }
            NodeRef::WhileLoop(n) => {
                let mut fields = Vec::new();
                if n.until {
                    fields.push(Field::new("until", FieldValue::Bool(true)));
                }
                fields.push(Field::new("condition", FieldValue::Node(NodeRef::StatementList(&n.condition))));
                fields.push(Field::new("body", FieldValue::Node(NodeRef::StatementList(&n.body))));
                fields.push(Field::new("redirects", FieldValue::Nodes(redirect_refs(&n.redirects))));
                fields
            }
            NodeRef::ForLoop(n) => vec![
                Field::new("variable", FieldValue::Str(&n.variable)),
                Field::new("items", FieldValue::StrList(&n.items)),
                Field::new("body", FieldValue::Node(NodeRef::StatementList(&n.body))),
                Field::new("redirects", FieldValue::Nodes(redirect_refs(&n.redirects))),
            ],
            NodeRef::CStyleForLoop(n) => {
                let mut fields = Vec::new();
                if let Some(init) = &n.init_expr {
                    fields.push(Field::new("init_expr", FieldValue::Str(init)));
                }
                if let Some(cond) = &n.condition_expr {
                    fields.push(Field::new("condition_expr", FieldValue::Str(cond)));
                }
                if let Some(update) = &n.update_expr {
                    fields.push(Field::new("update_expr", FieldValue::Str(update)));
                }
                fields.push(Field::new("body", FieldValue::Node(NodeRef::StatementList(&n.body))));
                fields.push(Field::new("redirects", FieldValue::Nodes(redirect_refs(&n.redirects))));
                fields
            }
            NodeRef::IfConditional(n) => {
                let mut fields = vec![
                    Field::new("condition", FieldValue::Node(NodeRef::StatementList(&n.condition))),
                    Field::new("then_part", FieldValue::Node(NodeRef::StatementList(&n.then_part))),
                ];
                if !n.elif_parts.is_empty() {
                    let mut refs = Vec::new();
                    for (cond, then) in &n.elif_parts {
                        refs.push(NodeRef::StatementList(cond));
                        refs.push(NodeRef::StatementList(then));
                    }
                    fields.push(Field::new("elif_parts", FieldValue::Nodes(refs)));
                }
                if let Some(else_part) = &n.else_part {
                    fields.push(Field::new("else_part", FieldValue::Node(NodeRef::StatementList(else_part))));
                }
                fields.push(Field::new("redirects", FieldValue::Nodes(redirect_refs(&n.redirects))));
                fields
            }
            NodeRef::CaseConditional(n) => vec![
                Field::new("expr", FieldValue::Str(&n.expr)),
                Field::new("items", FieldValue::Nodes(n.items.iter().map(NodeRef::CaseItem).collect())),
                Field::new("redirects", FieldValue::Nodes(redirect_refs(&n.redirects))),
            ],
            NodeRef::CaseItem(n) => vec![
                Field::new(
                    "patterns",
                    FieldValue::TextList(n.patterns.iter().map(|p| p.pattern.clone()).collect()),
                ),
                Field::new("commands", FieldValue::Node(NodeRef::StatementList(&n.commands))),
                Field::new("terminator", FieldValue::Text(n.terminator.as_str().to_string())),
            ],
            NodeRef::SelectLoop(n) => vec![
                Field::new("variable", FieldValue::Str(&n.variable)),
                Field::new("items", FieldValue::StrList(&n.items)),
                Field::new("body", FieldValue::Node(NodeRef::StatementList(&n.body))),
                Field::new("redirects", FieldValue::Nodes(redirect_refs(&n.redirects))),
            ],
            NodeRef::ArithmeticEvaluation(n) => vec![
                Field::new("expression", FieldValue::Str(&n.expression)),
                Field::new("redirects", FieldValue::Nodes(redirect_refs(&n.redirects))),
            ],
            NodeRef::EnhancedTestStatement(n) => vec![
                Field::new("expression", FieldValue::Node(NodeRef::from(&n.expression))),
                Field::new("redirects", FieldValue::Nodes(redirect_refs(&n.redirects))),
            ],
            NodeRef::SubshellGroup(n) => vec![
                Field::new("body", FieldValue::Node(NodeRef::StatementList(&n.body))),
                Field::new("redirects", FieldValue::Nodes(redirect_refs(&n.redirects))),
            ],
            NodeRef::BraceGroup(n) => vec![
                Field::new("body", FieldValue::Node(NodeRef::StatementList(&n.body))),
                Field::new("redirects", FieldValue::Nodes(redirect_refs(&n.redirects))),
            ],
            NodeRef::FunctionDef(n) => vec![
                Field::new("name", FieldValue::Str(&n.name)),
                Field::new("body", FieldValue::Node(NodeRef::StatementList(&n.body))),
            ],
            NodeRef::BreakStatement(n) => {
                vec![Field::new("level", FieldValue::Int(n.level as i64))]
            }
            NodeRef::ContinueStatement(n) => {
                vec![Field::new("level", FieldValue::Int(n.level as i64))]
            }
            NodeRef::Redirect(n) => {
                let mut fields = vec![Field::new("type", FieldValue::Text(n.kind.as_str().to_string()))];
                if let Some(fd) = n.fd {
                    fields.push(Field::new("fd", FieldValue::Int(fd as i64)));
                }
                if let Some(target) = &n.target {
                    fields.push(Field::new("target", FieldValue::Str(target)));
                }
                if let Some(dup_fd) = n.dup_fd {
                    fields.push(Field::new("dup_fd", FieldValue::Int(dup_fd as i64)));
                }
                if let Some(content) = &n.heredoc_content {
                    fields.push(Field::new("heredoc_content", FieldValue::Str(content)));
                }
                if let Some(quoted) = n.heredoc_quoted {
                    fields.push(Field::new("heredoc_quoted", FieldValue::Bool(quoted)));
                }
                fields
            }
            NodeRef::ArrayInitialization(n) => vec![
                Field::new("name", FieldValue::Str(&n.name)),
                Field::new("elements", FieldValue::StrList(&n.elements)),
                Field::new(
                    "element_types",
                    FieldValue::TextList(n.element_types.iter().map(|t| t.as_str().to_string()).collect()),
                ),
                Field::new("is_append", FieldValue::Bool(n.is_append)),
            ],
            NodeRef::ArrayElementAssignment(n) => vec![
                Field::new("name", FieldValue::Str(&n.name)),
                Field::new("index", FieldValue::Str(&n.index)),
                Field::new("value", FieldValue::Str(&n.value)),
                Field::new("is_append", FieldValue::Bool(n.is_append)),
            ],
            NodeRef::BinaryTestExpression(n) => vec![
                Field::new("left", FieldValue::Str(&n.left)),
                Field::new("operator", FieldValue::Str(&n.operator)),
                Field::new("right", FieldValue::Str(&n.right)),
            ],
            NodeRef::UnaryTestExpression(n) => vec![
                Field::new("operator", FieldValue::Str(&n.operator)),
                Field::new("operand", FieldValue::Str(&n.operand)),
            ],
            NodeRef::CompoundTestExpression(n) => vec![
                Field::new("operator", FieldValue::Text(n.operator.as_str().to_string())),
                Field::new("left", FieldValue::Node(NodeRef::from(&*n.left))),
                Field::new("right", FieldValue::Node(NodeRef::from(&*n.right))),
            ],
            NodeRef::NegatedTestExpression(n) => vec![Field::new(
                "expression",
                FieldValue::Node(NodeRef::from(&*n.expression)),
            )],
        }
    }

    /// All directly nested nodes, in field order.
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let mut out = Vec::new();
        for field in self.fields() {
            match field.value {
                FieldValue::Node(node) => out.push(node),
                FieldValue::Nodes(nodes) => out.extend(nodes),
                _ => {}
            }
        }
        out
    }
}

/// Structural tree equality: compares kinds and field tables recursively,
/// ignoring source spans.
pub fn structural_eq(a: NodeRef<'_>, b: NodeRef<'_>) -> bool {
    if a.kind() != b.kind() {
        return false;
    }
    let (fa, fb) = (a.fields(), b.fields());
    if fa.len() != fb.len() {
        return false;
    }
    fa.iter().zip(fb.iter()).all(|(x, y)| x.name == y.name && value_eq(&x.value, &y.value))
}

fn value_eq(a: &FieldValue<'_>, b: &FieldValue<'_>) -> bool {
    use FieldValue::*;
    match (a, b) {
        (Str(x), Str(y)) => x == y,
        (Str(x), Text(y)) | (Text(y), Str(x)) => *x == y.as_str(),
        (Text(x), Text(y)) => x == y,
        (Bool(x), Bool(y)) => x == y,
        (Int(x), Int(y)) => x == y,
        (StrList(x), StrList(y)) => x == y,
        (TextList(x), TextList(y)) => x == y,
        (StrList(x), TextList(y)) | (TextList(y), StrList(x)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| a == b)
        }
        (Node(x), Node(y)) => structural_eq(*x, *y),
        (Nodes(x), Nodes(y)) => {
            x.len() == y.len() && x.iter().zip(y.iter()).all(|(a, b)| structural_eq(*a, *b))
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple(args: &[&str]) -> SimpleCommand {
        let mut cmd = SimpleCommand::default();
        for arg in args {
            cmd.push_arg(Word {
                text: (*arg).to_string(),
                is_quoted: false,
                quote_char: None,
                is_variable_expansion: false,
                is_composite: false,
                expand_glob: true,
                parts: vec![WordPart {
                    text: (*arg).to_string(),
                    kind: ArgType::Word,
                    quote_char: None,
                }],
            });
        }
        cmd
    }

    #[test]
    fn kind_names_are_abstract() {
        let cmd = simple(&["echo"]);
        let node = NodeRef::SimpleCommand(&cmd);
        assert_eq!(node.kind().as_str(), "SimpleCommand");
    }

    #[test]
    fn structural_eq_ignores_spans() {
        let mut a = simple(&["echo", "hi"]);
        let mut b = simple(&["echo", "hi"]);
        a.span = Some(ByteSpan::new(0, 7));
        b.span = Some(ByteSpan::new(100, 107));
        assert!(structural_eq(NodeRef::SimpleCommand(&a), NodeRef::SimpleCommand(&b)));

        let c = simple(&["echo", "bye"]);
        assert!(!structural_eq(NodeRef::SimpleCommand(&a), NodeRef::SimpleCommand(&c)));
    }

    #[test]
    fn children_follow_field_order() {
        let pipeline = Pipeline {
            commands: vec![
                Command::Simple(simple(&["cat"])),
                Command::Simple(simple(&["grep", "x"])),
            ],
            negated: false,
            span: None,
        };
        let children = NodeRef::Pipeline(&pipeline).children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].kind(), NodeKind::SimpleCommand);
    }
}
