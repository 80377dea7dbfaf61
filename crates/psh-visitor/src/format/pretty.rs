//! Shell source reconstruction.
//!
//! Rebuilds runnable source from the tree: string arguments are re-quoted
//! with their recorded quote character, fused composite parts stay
//! adjacent, operators get canonical spacing, and `done`/`fi`/`esac` land
//! on their own lines.

use psh_ast::*;

/// Pretty printer from AST back to shell source.
#[derive(Debug, Clone)]
pub struct ScriptFormatter {
    indent_size: usize,
    show_spans: bool,
    level: usize,
}

impl Default for ScriptFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptFormatter {
    pub fn new() -> Self {
        ScriptFormatter { indent_size: 2, show_spans: false, level: 0 }
    }

    pub fn with_indent(mut self, indent_size: usize) -> Self {
        self.indent_size = indent_size;
        self
    }

    /// Annotate each top-level item with its source span as a comment.
    pub fn with_spans(mut self, show_spans: bool) -> Self {
        self.show_spans = show_spans;
        self
    }

    pub fn format(&self, ast: &TopLevel) -> String {
        let mut formatter = self.clone();
        let mut parts = Vec::new();
        for item in &ast.items {
            let (text, span) = match item {
                TopLevelItem::Function(f) => (formatter.fmt_function(f), f.span),
                TopLevelItem::Statements(list) => (formatter.fmt_statement_list(list), list.span),
            };
            match (formatter.show_spans, span) {
                (true, Some(span)) => parts.push(format!("# @{span}\n{text}")),
                _ => parts.push(text),
            }
        }
        parts.join("\n\n")
    }

    /// Formats a single node of any command-ish kind.
    pub fn format_node(&self, node: NodeRef<'_>) -> String {
        let mut formatter = self.clone();
        match node {
            NodeRef::TopLevel(n) => self.format(n),
            NodeRef::StatementList(n) => formatter.fmt_statement_list(n),
            NodeRef::AndOrList(n) => formatter.fmt_and_or_list(n),
            NodeRef::Pipeline(n) => formatter.fmt_pipeline(n),
            NodeRef::SimpleCommand(n) => formatter.fmt_simple(n),
            NodeRef::FunctionDef(n) => formatter.fmt_function(n),
            NodeRef::Redirect(n) => fmt_redirect(n),
            NodeRef::WhileLoop(n) => formatter.fmt_while(n),
            NodeRef::ForLoop(n) => formatter.fmt_for(n),
            NodeRef::CStyleForLoop(n) => formatter.fmt_c_style_for(n),
            NodeRef::IfConditional(n) => formatter.fmt_if(n),
            NodeRef::CaseConditional(n) => formatter.fmt_case(n),
            NodeRef::SelectLoop(n) => formatter.fmt_select(n),
            NodeRef::ArithmeticEvaluation(n) => formatter.fmt_arith(n),
            NodeRef::EnhancedTestStatement(n) => formatter.fmt_test(n),
            NodeRef::SubshellGroup(n) => formatter.fmt_subshell(n),
            NodeRef::BraceGroup(n) => formatter.fmt_brace_group(n),
            NodeRef::BreakStatement(n) => formatter.fmt_break("break", n.level),
            NodeRef::ContinueStatement(n) => formatter.fmt_break("continue", n.level),
            NodeRef::CaseItem(n) => formatter.fmt_case_item(n),
            NodeRef::ArrayInitialization(n) => fmt_array_init(n),
            NodeRef::ArrayElementAssignment(n) => fmt_array_element(n),
            NodeRef::BinaryTestExpression(_)
            | NodeRef::UnaryTestExpression(_)
            | NodeRef::CompoundTestExpression(_)
            | NodeRef::NegatedTestExpression(_) => fmt_test_expr_ref(node),
        }
    }

    fn indent(&self) -> String {
        " ".repeat(self.level * self.indent_size)
    }

    fn fmt_statement_list(&mut self, list: &StatementList) -> String {
        let parts: Vec<String> =
            list.statements.iter().map(|s| self.fmt_and_or_list(s)).collect();
        parts.join("\n")
    }

    fn fmt_and_or_list(&mut self, list: &AndOrList) -> String {
        let mut out = String::new();
        for (i, pipeline) in list.pipelines.iter().enumerate() {
            if i == 0 {
                out.push_str(&self.fmt_pipeline(pipeline));
            } else {
                let op = list.operators.get(i - 1).map(|o| o.as_str()).unwrap_or("&&");
                out.push_str(&format!(" {op} "));
                out.push_str(self.fmt_pipeline(pipeline).trim_start());
            }
        }
        out
    }

    fn fmt_pipeline(&mut self, pipeline: &Pipeline) -> String {
        // Pipeline members render flush; the pipeline itself is indented.
        let saved = self.level;
        self.level = 0;
        let parts: Vec<String> =
            pipeline.commands.iter().map(|c| self.fmt_command(c).trim().to_string()).collect();
        self.level = saved;

        let mut joined = parts.join(" | ");
        if pipeline.negated {
            joined = format!("! {joined}");
        }
        format!("{}{joined}", self.indent())
    }

    fn fmt_command(&mut self, command: &Command) -> String {
        match command {
            Command::Simple(cmd) => self.fmt_simple(cmd),
            Command::Function(f) => self.fmt_function(f),
            Command::Break(b) => self.fmt_break("break", b.level),
            Command::Continue(c) => self.fmt_break("continue", c.level),
            Command::Compound(compound) => match compound {
                CompoundCommand::While(n) => self.fmt_while(n),
                CompoundCommand::For(n) => self.fmt_for(n),
                CompoundCommand::CStyleFor(n) => self.fmt_c_style_for(n),
                CompoundCommand::If(n) => self.fmt_if(n),
                CompoundCommand::Case(n) => self.fmt_case(n),
                CompoundCommand::Select(n) => self.fmt_select(n),
                CompoundCommand::Arithmetic(n) => self.fmt_arith(n),
                CompoundCommand::Test(n) => self.fmt_test(n),
                CompoundCommand::Subshell(n) => self.fmt_subshell(n),
                CompoundCommand::BraceGroup(n) => self.fmt_brace_group(n),
            },
        }
    }

    fn fmt_simple(&mut self, cmd: &SimpleCommand) -> String {
        let mut parts = Vec::new();
        for assignment in &cmd.array_assignments {
            parts.push(match assignment {
                ArrayAssignment::Initialization(init) => fmt_array_init(init),
                ArrayAssignment::ElementAssignment(assign) => fmt_array_element(assign),
            });
        }
        for (i, arg) in cmd.args.iter().enumerate() {
            parts.push(match cmd.words.get(i) {
                Some(word) => fmt_word(word),
                None => arg.clone(),
            });
        }
        for redirect in &cmd.redirects {
            parts.push(fmt_redirect(redirect));
        }
        if cmd.background {
            parts.push("&".to_string());
        }
        format!("{}{}", self.indent(), parts.join(" "))
    }

    fn fmt_break(&mut self, keyword: &str, level: u32) -> String {
        if level == 1 {
            format!("{}{keyword}", self.indent())
        } else {
            format!("{}{keyword} {level}", self.indent())
        }
    }

    fn fmt_while(&mut self, node: &WhileLoop) -> String {
        let keyword = if node.until { "until" } else { "while" };
        let mut lines = vec![format!("{}{keyword}", self.indent())];
        self.level += 1;
        lines.push(self.indented_list(&node.condition));
        self.level -= 1;
        lines.push(format!("{}do", self.indent()));
        self.level += 1;
        lines.push(self.indented_list(&node.body));
        self.level -= 1;
        lines.push(format!("{}done", self.indent()));
        self.append_redirects(&mut lines, &node.redirects);
        lines.join("\n")
    }

    fn fmt_for(&mut self, node: &ForLoop) -> String {
        let items: Vec<String> = node.items.iter().map(|i| quote_item(i)).collect();
        let header = if items.is_empty() {
            format!("{}for {}", self.indent(), node.variable)
        } else {
            format!("{}for {} in {}", self.indent(), node.variable, items.join(" "))
        };
        let mut lines = vec![header, format!("{}do", self.indent())];
        self.level += 1;
        lines.push(self.indented_list(&node.body));
        self.level -= 1;
        lines.push(format!("{}done", self.indent()));
        self.append_redirects(&mut lines, &node.redirects);
        lines.join("\n")
    }

    fn fmt_c_style_for(&mut self, node: &CStyleForLoop) -> String {
        let init = node.init_expr.as_deref().unwrap_or("");
        let cond = node.condition_expr.as_deref().unwrap_or("");
        let update = node.update_expr.as_deref().unwrap_or("");
        let mut lines = vec![
            format!("{}for (({init}; {cond}; {update}))", self.indent()),
            format!("{}do", self.indent()),
        ];
        self.level += 1;
        lines.push(self.indented_list(&node.body));
        self.level -= 1;
        lines.push(format!("{}done", self.indent()));
        self.append_redirects(&mut lines, &node.redirects);
        lines.join("\n")
    }

    fn fmt_if(&mut self, node: &IfConditional) -> String {
        let mut lines = vec![format!("{}if", self.indent())];
        self.level += 1;
        lines.push(self.indented_list(&node.condition));
        self.level -= 1;
        lines.push(format!("{}then", self.indent()));
        self.level += 1;
        lines.push(self.indented_list(&node.then_part));
        self.level -= 1;
        for (condition, then_part) in &node.elif_parts {
            lines.push(format!("{}elif", self.indent()));
            self.level += 1;
            lines.push(self.indented_list(condition));
            self.level -= 1;
            lines.push(format!("{}then", self.indent()));
            self.level += 1;
            lines.push(self.indented_list(then_part));
            self.level -= 1;
        }
        if let Some(else_part) = &node.else_part {
            lines.push(format!("{}else", self.indent()));
            self.level += 1;
            lines.push(self.indented_list(else_part));
            self.level -= 1;
        }
        lines.push(format!("{}fi", self.indent()));
        self.append_redirects(&mut lines, &node.redirects);
        lines.join("\n")
    }

    fn fmt_case(&mut self, node: &CaseConditional) -> String {
        let mut lines = vec![format!("{}case {} in", self.indent(), node.expr)];
        self.level += 1;
        for item in &node.items {
            lines.push(self.fmt_case_item(item));
        }
        self.level -= 1;
        lines.push(format!("{}esac", self.indent()));
        self.append_redirects(&mut lines, &node.redirects);
        lines.join("\n")
    }

    fn fmt_case_item(&mut self, item: &CaseItem) -> String {
        let patterns: Vec<&str> = item.patterns.iter().map(|p| p.pattern.as_str()).collect();
        let mut lines = vec![format!("{}{})", self.indent(), patterns.join(" | "))];
        self.level += 1;
        if !item.commands.statements.is_empty() {
            lines.push(self.indented_list(&item.commands));
        }
        self.level -= 1;
        lines.push(format!("{}{}", self.indent(), item.terminator));
        lines.join("\n")
    }

    fn fmt_select(&mut self, node: &SelectLoop) -> String {
        let items: Vec<String> = node.items.iter().map(|i| quote_item(i)).collect();
        let mut lines = vec![
            format!("{}select {} in {}", self.indent(), node.variable, items.join(" ")),
            format!("{}do", self.indent()),
        ];
        self.level += 1;
        lines.push(self.indented_list(&node.body));
        self.level -= 1;
        lines.push(format!("{}done", self.indent()));
        self.append_redirects(&mut lines, &node.redirects);
        lines.join("\n")
    }

    fn fmt_arith(&mut self, node: &ArithmeticEvaluation) -> String {
        let mut out = format!("{}(({}))", self.indent(), node.expression);
        for redirect in &node.redirects {
            out.push(' ');
            out.push_str(&fmt_redirect(redirect));
        }
        out
    }

    fn fmt_test(&mut self, node: &EnhancedTestStatement) -> String {
        let mut out = format!("{}[[ {} ]]", self.indent(), fmt_test_expr(&node.expression));
        for redirect in &node.redirects {
            out.push(' ');
            out.push_str(&fmt_redirect(redirect));
        }
        out
    }

    fn fmt_subshell(&mut self, node: &SubshellGroup) -> String {
        let mut lines = vec![format!("{}(", self.indent())];
        self.level += 1;
        lines.push(self.indented_list(&node.body));
        self.level -= 1;
        lines.push(format!("{})", self.indent()));
        self.append_redirects(&mut lines, &node.redirects);
        lines.join("\n")
    }

    fn fmt_brace_group(&mut self, node: &BraceGroup) -> String {
        let mut lines = vec![format!("{}{{", self.indent())];
        self.level += 1;
        lines.push(self.indented_list(&node.body));
        self.level -= 1;
        lines.push(format!("{}}}", self.indent()));
        self.append_redirects(&mut lines, &node.redirects);
        lines.join("\n")
    }

    fn fmt_function(&mut self, node: &FunctionDef) -> String {
        // `function name` input is normalized to the portable form.
        let mut lines = vec![format!("{}{}() {{", self.indent(), node.name)];
        self.level += 1;
        lines.push(self.indented_list(&node.body));
        self.level -= 1;
        lines.push(format!("{}}}", self.indent()));
        lines.join("\n")
    }

    fn indented_list(&mut self, list: &StatementList) -> String {
        self.fmt_statement_list(list)
    }

    fn append_redirects(&self, lines: &mut Vec<String>, redirects: &[Redirect]) {
        if redirects.is_empty() {
            return;
        }
        let rendered: Vec<String> = redirects.iter().map(fmt_redirect).collect();
        if let Some(last) = lines.last_mut() {
            last.push(' ');
            last.push_str(&rendered.join(" "));
        }
    }
}

fn fmt_word(word: &Word) -> String {
    if word.is_composite {
        word.parts.iter().map(fmt_part).collect()
    } else {
        match word.parts.first() {
            Some(part) => fmt_part(part),
            None => word.text.clone(),
        }
    }
}

fn fmt_part(part: &WordPart) -> String {
    match part.quote_char {
        Some(q) => format!("{q}{}{q}", part.text),
        None => part.text.clone(),
    }
}

fn quote_item(item: &str) -> String {
    if item.contains(' ') || item.chars().any(|c| matches!(c, '*' | '?' | '[' | ']')) {
        format!("\"{item}\"")
    } else {
        item.to_string()
    }
}

pub(crate) fn fmt_redirect(redirect: &Redirect) -> String {
    let mut out = String::new();
    match redirect.fd {
        // `2>` style operators already carry their fd.
        Some(2) if matches!(redirect.kind, RedirectKind::Out | RedirectKind::Append) => {
            out.push('2');
        }
        Some(fd) => out.push_str(&fd.to_string()),
        None => {}
    }
    out.push_str(redirect.kind.as_str());
    if let Some(dup_fd) = redirect.dup_fd {
        out.push_str(&dup_fd.to_string());
    } else if let Some(target) = &redirect.target {
        out.push_str(target);
    }
    out
}

fn fmt_test_expr(expr: &TestExpr) -> String {
    match expr {
        TestExpr::Binary(e) => format!("{} {} {}", e.left, e.operator, e.right),
        TestExpr::Unary(e) => format!("{} {}", e.operator, e.operand),
        TestExpr::Compound(e) => format!(
            "{} {} {}",
            fmt_test_expr(&e.left),
            e.operator.as_str(),
            fmt_test_expr(&e.right)
        ),
        TestExpr::Negated(e) => format!("! {}", fmt_test_expr(&e.expression)),
    }
}

fn fmt_test_expr_ref(node: NodeRef<'_>) -> String {
    match node {
        NodeRef::BinaryTestExpression(e) => format!("{} {} {}", e.left, e.operator, e.right),
        NodeRef::UnaryTestExpression(e) => format!("{} {}", e.operator, e.operand),
        NodeRef::CompoundTestExpression(e) => format!(
            "{} {} {}",
            fmt_test_expr(&e.left),
            e.operator.as_str(),
            fmt_test_expr(&e.right)
        ),
        NodeRef::NegatedTestExpression(e) => format!("! {}", fmt_test_expr(&e.expression)),
        _ => String::new(),
    }
}

fn fmt_array_init(node: &ArrayInitialization) -> String {
    let elements: Vec<String> = node
        .elements
        .iter()
        .enumerate()
        .map(|(i, element)| match node.element_quote_types.get(i).copied().flatten() {
            Some(q) => format!("{q}{element}{q}"),
            None => element.clone(),
        })
        .collect();
    let op = if node.is_append { "+=" } else { "=" };
    format!("{}{op}({})", node.name, elements.join(" "))
}

fn fmt_array_element(node: &ArrayElementAssignment) -> String {
    let op = if node.is_append { "+=" } else { "=" };
    let value = match node.value_quote_type {
        Some(q) => format!("{q}{}{q}", node.value),
        None => node.value.clone(),
    };
    format!("{}[{}]{op}{value}", node.name, node.index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use psh_parser::parse_source;

    fn fmt(src: &str) -> String {
        let ast = parse_source(src).unwrap();
        ScriptFormatter::new().format(&ast)
    }

    #[test]
    fn composite_word_keeps_quoting_and_adjacency() {
        assert_eq!(fmt("echo 'hello'.txt"), "echo 'hello'.txt");
    }

    #[test]
    fn quoted_strings_restore_their_quote_char() {
        assert_eq!(fmt("echo \"a b\" 'c d'"), "echo \"a b\" 'c d'");
    }

    #[test]
    fn pipeline_spacing() {
        assert_eq!(fmt("a|b|c"), "a | b | c");
        assert_eq!(fmt("! a | b"), "! a | b");
        assert_eq!(fmt("a&&b||c"), "a && b || c");
    }

    #[test]
    fn if_keywords_on_their_own_lines() {
        let out = fmt("if true; then echo yes; else echo no; fi");
        let expected = "if\n  true\nthen\n  echo yes\nelse\n  echo no\nfi";
        assert_eq!(out, expected);
    }

    #[test]
    fn while_loop_layout() {
        let out = fmt("while true; do echo tick; done");
        assert_eq!(out, "while\n  true\ndo\n  echo tick\ndone");
    }

    #[test]
    fn until_loop_prints_until() {
        let out = fmt("until test -f x; do sleep 1; done");
        assert!(out.starts_with("until"));
    }

    #[test]
    fn for_loop_quotes_items_with_spaces() {
        let out = fmt("for i in a \"b c\"; do echo $i; done");
        assert!(out.contains("for i in a \"b c\""));
        assert!(out.ends_with("done"));
    }

    #[test]
    fn c_style_for_header() {
        let out = fmt("for ((i=0;i<3;i++)); do echo $i; done");
        assert!(out.starts_with("for ((i=0; i<3; i++))"));
    }

    #[test]
    fn case_layout_with_terminators() {
        let out = fmt("case $x in a) echo a;; b|c) echo bc;& esac");
        assert!(out.starts_with("case $x in"));
        assert!(out.contains("  a)"));
        assert!(out.contains("  b | c)"));
        assert!(out.contains("  ;;"));
        assert!(out.contains("  ;&"));
        assert!(out.ends_with("esac"));
    }

    #[test]
    fn function_normalizes_to_portable_form() {
        let out = fmt("function greet { echo hi; }");
        assert_eq!(out, "greet() {\n  echo hi\n}");
    }

    #[test]
    fn redirects_render_compactly() {
        assert_eq!(fmt("cmd > out 2>err 2>&1"), "cmd >out 2>err 2>&1");
        assert_eq!(fmt("cat <<EOF"), "cat <<EOF");
    }

    #[test]
    fn background_ampersand() {
        assert_eq!(fmt("sleep 1 &"), "sleep 1 &");
    }

    #[test]
    fn break_levels() {
        let out = fmt("while true; do break 2; done");
        assert!(out.contains("break 2"));
    }

    #[test]
    fn test_statement_round_trip() {
        assert_eq!(fmt("[[ -f $file && $x == y ]]"), "[[ -f $file && $x == y ]]");
    }

    #[test]
    fn array_forms() {
        assert_eq!(fmt("a=(1 'two' 3)"), "a=(1 'two' 3)");
        assert_eq!(fmt("a[0]=x"), "a[0]=x");
        assert_eq!(fmt("a+=(4)"), "a+=(4)");
    }

    #[test]
    fn variables_render_with_sigil() {
        assert_eq!(fmt("echo $x ${y:-d}"), "echo $x ${y:-d}");
    }

    #[test]
    fn span_comments_when_enabled() {
        let ast = parse_source("echo hi").unwrap();
        let out = ScriptFormatter::new().with_spans(true).format(&ast);
        assert!(out.starts_with("# @0..7\n"));
    }

    #[test]
    fn formatted_source_reparses_equivalently() {
        // Round-trip property: format → parse → format is stable.
        for src in [
            "echo 'hello'.txt",
            "if true; then echo a; fi",
            "for i in 1 2 3; do echo $i; done",
            "case $x in a) echo a;; esac",
            "f() { echo hi; }\nf",
        ] {
            let once = fmt(src);
            let twice = {
                let ast = parse_source(&once).unwrap();
                ScriptFormatter::new().format(&ast)
            };
            assert_eq!(once, twice, "unstable for {src:?}");
        }
    }
}
