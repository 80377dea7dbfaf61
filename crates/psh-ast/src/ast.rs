//! The shell node taxonomy.

use std::fmt;

use psh_position_tracking::ByteSpan;

/// Root of a parsed buffer: an ordered sequence of function definitions and
/// statement groups.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TopLevel {
    pub items: Vec<TopLevelItem>,
    pub span: Option<ByteSpan>,
}

impl TopLevel {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TopLevelItem {
    Function(FunctionDef),
    Statements(StatementList),
}

/// An ordered sequence of and/or lists (one per statement).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatementList {
    pub statements: Vec<AndOrList>,
    pub span: Option<ByteSpan>,
}

impl StatementList {
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

/// Short-circuit connective between pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AndOrOp {
    /// `&&`
    And,
    /// `||`
    Or,
}

impl AndOrOp {
    pub fn as_str(self) -> &'static str {
        match self {
            AndOrOp::And => "&&",
            AndOrOp::Or => "||",
        }
    }
}

impl fmt::Display for AndOrOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipelines connected by `&&`/`||`.
///
/// Invariant: `operators.len() == pipelines.len().saturating_sub(1)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AndOrList {
    pub pipelines: Vec<Pipeline>,
    pub operators: Vec<AndOrOp>,
    pub span: Option<ByteSpan>,
}

/// One or more commands joined by `|`, optionally negated by a leading `!`.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    pub commands: Vec<Command>,
    pub negated: bool,
    pub span: Option<ByteSpan>,
}

/// A single command position inside a pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Simple(SimpleCommand),
    Compound(CompoundCommand),
    Function(FunctionDef),
    Break(BreakStatement),
    Continue(ContinueStatement),
}

/// Classification of a simple-command argument (or array element).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    /// Unquoted word
    Word,
    /// Double-quoted
    String,
    /// Single-quoted
    SingleString,
    /// `$name` / `${...}`
    Variable,
    /// `$(...)`
    CommandSub,
    /// `` `...` ``
    CommandSubBacktick,
    /// `$((...))`
    ArithSub,
    /// Fused from adjacent mixed-kind tokens; pathname expansion disabled
    Composite,
    /// Pre-expanded literal (optimizer output): no `$`/glob/tilde material
    Literal,
}

impl ArgType {
    pub fn as_str(self) -> &'static str {
        match self {
            ArgType::Word => "WORD",
            ArgType::String => "STRING",
            ArgType::SingleString => "SINGLE_STRING",
            ArgType::Variable => "VARIABLE",
            ArgType::CommandSub => "COMMAND_SUB",
            ArgType::CommandSubBacktick => "COMMAND_SUB_BACKTICK",
            ArgType::ArithSub => "ARITH_SUB",
            ArgType::Composite => "COMPOSITE",
            ArgType::Literal => "LITERAL",
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of a composite argument.
#[derive(Debug, Clone, PartialEq)]
pub struct WordPart {
    pub text: String,
    pub kind: ArgType,
    pub quote_char: Option<char>,
}

/// Structured view of one argument, used by the script formatter and the
/// security visitor.
#[derive(Debug, Clone, PartialEq)]
pub struct Word {
    pub text: String,
    pub is_quoted: bool,
    pub quote_char: Option<char>,
    /// True when the whole argument is a single `$name`/`${...}` expansion.
    pub is_variable_expansion: bool,
    /// True when the argument was fused from multiple adjacent parts.
    pub is_composite: bool,
    /// Pathname expansion tag for the downstream expander. Quoted material
    /// and composites with quoted parts do not glob.
    pub expand_glob: bool,
    /// The fused parts; a single entry for non-composite words.
    pub parts: Vec<WordPart>,
}

/// A command made of plain words: assignments, arguments, redirections.
///
/// Invariant: `args`, `arg_types`, `quote_types`, and `words` are the same
/// length; use [`SimpleCommand::push_arg`] to keep them aligned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SimpleCommand {
    pub args: Vec<String>,
    pub arg_types: Vec<ArgType>,
    pub quote_types: Vec<Option<char>>,
    pub words: Vec<Word>,
    pub redirects: Vec<Redirect>,
    pub background: bool,
    pub array_assignments: Vec<ArrayAssignment>,
    pub span: Option<ByteSpan>,
}

impl SimpleCommand {
    /// Appends one argument, keeping the parallel vectors aligned.
    pub fn push_arg(&mut self, word: Word) {
        self.args.push(word.text.clone());
        self.arg_types.push(if word.is_composite {
            ArgType::Composite
        } else {
            word.parts.first().map(|p| p.kind).unwrap_or(ArgType::Word)
        });
        self.quote_types.push(word.quote_char);
        self.words.push(word);
    }

    /// The command word, when any argument is present.
    pub fn name(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// Array-affecting assignment attached to a simple command.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayAssignment {
    Initialization(ArrayInitialization),
    ElementAssignment(ArrayElementAssignment),
}

/// `name=(a b c)` or `name+=(d)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayInitialization {
    pub name: String,
    pub elements: Vec<String>,
    pub element_types: Vec<ArgType>,
    pub element_quote_types: Vec<Option<char>>,
    pub is_append: bool,
    pub span: Option<ByteSpan>,
}

/// `name[index]=value` or `name[index]+=value`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayElementAssignment {
    pub name: String,
    pub index: String,
    pub value: String,
    pub value_type: ArgType,
    pub value_quote_type: Option<char>,
    pub is_append: bool,
    pub span: Option<ByteSpan>,
}

/// Compound command variants.
#[derive(Debug, Clone, PartialEq)]
pub enum CompoundCommand {
    While(WhileLoop),
    For(ForLoop),
    CStyleFor(CStyleForLoop),
    If(IfConditional),
    Case(CaseConditional),
    Select(SelectLoop),
    Arithmetic(ArithmeticEvaluation),
    Test(EnhancedTestStatement),
    Subshell(SubshellGroup),
    BraceGroup(BraceGroup),
}

/// `while`/`until` loop. `until` negates the condition's meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct WhileLoop {
    pub condition: StatementList,
    pub body: StatementList,
    pub until: bool,
    pub redirects: Vec<Redirect>,
    pub span: Option<ByteSpan>,
}

/// `for var in items; do …; done`.
#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub variable: String,
    pub items: Vec<String>,
    pub body: StatementList,
    pub redirects: Vec<Redirect>,
    pub span: Option<ByteSpan>,
}

/// `for ((init; cond; update)); do …; done`.
#[derive(Debug, Clone, PartialEq)]
pub struct CStyleForLoop {
    pub init_expr: Option<String>,
    pub condition_expr: Option<String>,
    pub update_expr: Option<String>,
    pub body: StatementList,
    pub redirects: Vec<Redirect>,
    pub span: Option<ByteSpan>,
}

/// `if`/`elif`/`else` conditional.
#[derive(Debug, Clone, PartialEq)]
pub struct IfConditional {
    pub condition: StatementList,
    pub then_part: StatementList,
    pub elif_parts: Vec<(StatementList, StatementList)>,
    pub else_part: Option<StatementList>,
    pub redirects: Vec<Redirect>,
    pub span: Option<ByteSpan>,
}

/// `case expr in …; esac`.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseConditional {
    pub expr: String,
    pub items: Vec<CaseItem>,
    pub redirects: Vec<Redirect>,
    pub span: Option<ByteSpan>,
}

/// One case arm: patterns, commands, terminator.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseItem {
    pub patterns: Vec<CasePattern>,
    pub commands: StatementList,
    pub terminator: CaseTerminator,
    pub span: Option<ByteSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CasePattern {
    pub pattern: String,
}

/// Case arm terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseTerminator {
    /// `;;`
    Normal,
    /// `;&`
    FallThrough,
    /// `;;&`
    ContinueMatching,
}

impl CaseTerminator {
    pub fn as_str(self) -> &'static str {
        match self {
            CaseTerminator::Normal => ";;",
            CaseTerminator::FallThrough => ";&",
            CaseTerminator::ContinueMatching => ";;&",
        }
    }
}

impl fmt::Display for CaseTerminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `select var in items; do …; done`.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectLoop {
    pub variable: String,
    pub items: Vec<String>,
    pub body: StatementList,
    pub redirects: Vec<Redirect>,
    pub span: Option<ByteSpan>,
}

/// `((expression))`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArithmeticEvaluation {
    pub expression: String,
    pub redirects: Vec<Redirect>,
    pub span: Option<ByteSpan>,
}

/// `[[ expression ]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancedTestStatement {
    pub expression: TestExpr,
    pub redirects: Vec<Redirect>,
    pub span: Option<ByteSpan>,
}

/// `( body )`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubshellGroup {
    pub body: StatementList,
    pub redirects: Vec<Redirect>,
    pub span: Option<ByteSpan>,
}

/// `{ body; }`.
#[derive(Debug, Clone, PartialEq)]
pub struct BraceGroup {
    pub body: StatementList,
    pub redirects: Vec<Redirect>,
    pub span: Option<ByteSpan>,
}

/// Function definition (`name() { … }` or `function name { … }`).
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub name: String,
    pub body: StatementList,
    pub span: Option<ByteSpan>,
}

/// `break [n]`; `level >= 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakStatement {
    pub level: u32,
    pub span: Option<ByteSpan>,
}

/// `continue [n]`; `level >= 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinueStatement {
    pub level: u32,
    pub span: Option<ByteSpan>,
}

/// Test-expression tree inside `[[ ]]`.
#[derive(Debug, Clone, PartialEq)]
pub enum TestExpr {
    Binary(BinaryTestExpression),
    Unary(UnaryTestExpression),
    Compound(CompoundTestExpression),
    Negated(NegatedTestExpression),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryTestExpression {
    pub left: String,
    pub operator: String,
    pub right: String,
    pub span: Option<ByteSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryTestExpression {
    pub operator: String,
    pub operand: String,
    pub span: Option<ByteSpan>,
}

/// `expr && expr` / `expr || expr` inside `[[ ]]`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundTestExpression {
    pub operator: AndOrOp,
    pub left: Box<TestExpr>,
    pub right: Box<TestExpr>,
    pub span: Option<ByteSpan>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NegatedTestExpression {
    pub expression: Box<TestExpr>,
    pub span: Option<ByteSpan>,
}

/// Redirection operator classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectKind {
    /// `>`
    Out,
    /// `>>`
    Append,
    /// `<`
    In,
    /// `<<`
    Heredoc,
    /// `<<-`
    HeredocStrip,
    /// `<<<`
    Herestring,
    /// `>&`
    DupOut,
    /// `<&`
    DupIn,
    /// `<>`
    ReadWrite,
    /// `&>`
    OutErr,
}

impl RedirectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RedirectKind::Out => ">",
            RedirectKind::Append => ">>",
            RedirectKind::In => "<",
            RedirectKind::Heredoc => "<<",
            RedirectKind::HeredocStrip => "<<-",
            RedirectKind::Herestring => "<<<",
            RedirectKind::DupOut => ">&",
            RedirectKind::DupIn => "<&",
            RedirectKind::ReadWrite => "<>",
            RedirectKind::OutErr => "&>",
        }
    }

    /// True for the two here-document kinds.
    pub fn is_heredoc(self) -> bool {
        matches!(self, RedirectKind::Heredoc | RedirectKind::HeredocStrip)
    }
}

impl fmt::Display for RedirectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A redirection.
///
/// Exactly one of `target`, `dup_fd`, or `heredoc_content` is meaningful,
/// depending on `kind`. Heredoc content is attached after parsing by the
/// heredoc collector; until then it is `None` with the delimiter in
/// `target`.
#[derive(Debug, Clone, PartialEq)]
pub struct Redirect {
    pub kind: RedirectKind,
    pub fd: Option<u32>,
    pub target: Option<String>,
    pub dup_fd: Option<u32>,
    pub heredoc_content: Option<String>,
    pub heredoc_quoted: Option<bool>,
    pub span: Option<ByteSpan>,
}

impl Redirect {
    /// A redirect with only kind and target set.
    pub fn to_target(kind: RedirectKind, target: impl Into<String>) -> Self {
        Redirect {
            kind,
            fd: None,
            target: Some(target.into()),
            dup_fd: None,
            heredoc_content: None,
            heredoc_quoted: None,
            span: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn push_arg_keeps_vectors_aligned() {
        let mut cmd = SimpleCommand::default();
        cmd.push_arg(Word {
            text: "echo".into(),
            is_quoted: false,
            quote_char: None,
            is_variable_expansion: false,
            is_composite: false,
            expand_glob: true,
            parts: vec![WordPart { text: "echo".into(), kind: ArgType::Word, quote_char: None }],
        });
        cmd.push_arg(Word {
            text: "hello.txt".into(),
            is_quoted: true,
            quote_char: Some('\''),
            is_variable_expansion: false,
            is_composite: true,
            expand_glob: false,
            parts: vec![
                WordPart { text: "hello".into(), kind: ArgType::SingleString, quote_char: Some('\'') },
                WordPart { text: ".txt".into(), kind: ArgType::Word, quote_char: None },
            ],
        });
        assert_eq!(cmd.args.len(), cmd.arg_types.len());
        assert_eq!(cmd.args.len(), cmd.quote_types.len());
        assert_eq!(cmd.args.len(), cmd.words.len());
        assert_eq!(cmd.arg_types[1], ArgType::Composite);
        assert_eq!(cmd.name(), Some("echo"));
    }

    #[test]
    fn display_forms() {
        assert_eq!(AndOrOp::And.to_string(), "&&");
        assert_eq!(CaseTerminator::ContinueMatching.to_string(), ";;&");
        assert_eq!(RedirectKind::HeredocStrip.to_string(), "<<-");
        assert_eq!(ArgType::CommandSubBacktick.to_string(), "COMMAND_SUB_BACKTICK");
    }
}
