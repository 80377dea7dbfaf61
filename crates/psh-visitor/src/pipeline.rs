//! Visitor registry and ordered pipeline composition.
//!
//! The registry maps names to visitor factories with a description and a
//! category; the pipeline runs named steps in order, threading the AST
//! through transformers so that each analyzer sees the output of the most
//! recent transformer before it.

use psh_ast::{NodeRef, TopLevel};
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::debug;

use crate::enhanced::EnhancedValidator;
use crate::format::ScriptFormatter;
use crate::metrics::{MetricsReport, MetricsVisitor};
use crate::optimize::Optimizer;
use crate::security::{SecurityReport, SecurityVisitor};
use crate::validate::{ValidationIssue, Validator};
use crate::visit::{AstVisitor, VisitError};

/// What an analyzer surfaced after its run.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    Issues(Vec<ValidationIssue>),
    Metrics(MetricsReport),
    Security(SecurityReport),
    Text(String),
}

/// A read-only pipeline step.
pub trait AnalysisPass {
    fn analyze(&mut self, ast: &TopLevel) -> Result<(), VisitError>;
    fn outcome(&self) -> AnalysisOutcome;
}

/// A rewriting pipeline step.
pub trait TransformPass {
    fn apply(&mut self, ast: TopLevel) -> TopLevel;
}

/// A step instance ready to run.
pub enum PipelineStep {
    Analyzer(Box<dyn AnalysisPass>),
    Transformer(Box<dyn TransformPass>),
}

/// Step classification for registry listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Analyzer,
    Transformer,
}

impl StepKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StepKind::Analyzer => "analyzer",
            StepKind::Transformer => "transformer",
        }
    }
}

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Visitor '{0}' is already registered")]
    Duplicate(String),
    #[error("No visitor registered with name '{0}'")]
    Unknown(String),
}

/// Pipeline failures. Results recorded before the failing step remain
/// accessible on the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error(transparent)]
    Visit(#[from] VisitError),
}

struct RegistryEntry {
    description: String,
    category: String,
    kind: StepKind,
    factory: Box<dyn Fn() -> PipelineStep>,
}

/// Listing row for a registered visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorInfo {
    pub name: String,
    pub description: String,
    pub category: String,
    pub kind: StepKind,
}

/// Named visitor catalog.
#[derive(Default)]
pub struct VisitorRegistry {
    entries: FxHashMap<String, RegistryEntry>,
}

impl VisitorRegistry {
    pub fn new() -> Self {
        VisitorRegistry::default()
    }

    /// Registers a visitor factory. Duplicate names fail.
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        category: &str,
        kind: StepKind,
        factory: impl Fn() -> PipelineStep + 'static,
    ) -> Result<(), RegistryError> {
        if self.entries.contains_key(name) {
            return Err(RegistryError::Duplicate(name.to_string()));
        }
        self.entries.insert(
            name.to_string(),
            RegistryEntry {
                description: description.to_string(),
                category: category.to_string(),
                kind,
                factory: Box::new(factory),
            },
        );
        Ok(())
    }

    /// Instantiates a registered visitor.
    pub fn get(&self, name: &str) -> Result<PipelineStep, RegistryError> {
        self.entries
            .get(name)
            .map(|entry| (entry.factory)())
            .ok_or_else(|| RegistryError::Unknown(name.to_string()))
    }

    /// Lists registered visitors, optionally filtered by category, sorted
    /// by (category, name).
    pub fn list(&self, category: Option<&str>) -> Vec<VisitorInfo> {
        let mut rows: Vec<VisitorInfo> = self
            .entries
            .iter()
            .filter(|(_, entry)| category.is_none_or(|c| entry.category == c))
            .map(|(name, entry)| VisitorInfo {
                name: name.clone(),
                description: entry.description.clone(),
                category: entry.category.clone(),
                kind: entry.kind,
            })
            .collect();
        rows.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));
        rows
    }

    /// All distinct categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut categories: Vec<String> =
            self.entries.values().map(|e| e.category.clone()).collect();
        categories.sort();
        categories.dedup();
        categories
    }
}

/// Builds the registry pre-loaded with the built-in analyzers and
/// transformers.
pub fn builtin_registry() -> VisitorRegistry {
    let mut registry = VisitorRegistry::new();
    let entries: [(&str, &str, &str, StepKind, fn() -> PipelineStep); 6] = [
        (
            "validator",
            "Validate script for syntax and semantic errors",
            "analysis",
            StepKind::Analyzer,
            || PipelineStep::Analyzer(Box::new(Validator::new())),
        ),
        (
            "enhanced-validator",
            "Validate with variable tracking, quoting, and security checks",
            "analysis",
            StepKind::Analyzer,
            || PipelineStep::Analyzer(Box::new(EnhancedValidator::new())),
        ),
        (
            "security",
            "Analyze script for security vulnerabilities",
            "analysis",
            StepKind::Analyzer,
            || PipelineStep::Analyzer(Box::new(SecurityVisitor::new())),
        ),
        (
            "metrics",
            "Collect code metrics and complexity analysis",
            "analysis",
            StepKind::Analyzer,
            || PipelineStep::Analyzer(Box::new(ValuePass::metrics())),
        ),
        (
            "formatter",
            "Format AST back to shell script",
            "transformation",
            StepKind::Analyzer,
            || PipelineStep::Analyzer(Box::new(ValuePass::script())),
        ),
        (
            "optimizer",
            "Optimize AST for better performance",
            "transformation",
            StepKind::Transformer,
            || PipelineStep::Transformer(Box::new(Optimizer::new())),
        ),
    ];
    for (name, description, category, kind, factory) in entries {
        // A fresh registry cannot contain duplicates.
        let _ = registry.register(name, description, category, kind, factory);
    }
    registry
}

/// Ordered list of named steps with result capture.
#[derive(Default)]
pub struct VisitorPipeline {
    steps: Vec<(String, PipelineStep)>,
    results: Vec<(String, StepResult)>,
    final_ast: Option<TopLevel>,
}

/// Result recorded for one executed step.
#[derive(Debug, Clone)]
pub enum StepResult {
    Transformer { output_ast: TopLevel },
    Analyzer { outcome: AnalysisOutcome },
}

impl VisitorPipeline {
    pub fn new() -> Self {
        VisitorPipeline::default()
    }

    /// Appends a step.
    pub fn add_step(&mut self, name: &str, step: PipelineStep) -> &mut Self {
        self.steps.push((name.to_string(), step));
        self
    }

    /// Appends a step instantiated from a registry.
    pub fn add_registered(
        &mut self,
        registry: &VisitorRegistry,
        name: &str,
    ) -> Result<&mut Self, RegistryError> {
        let step = registry.get(name)?;
        Ok(self.add_step(name, step))
    }

    /// Runs all steps in order. Transformer output replaces the current
    /// AST; analyzers see the most recent transformer output.
    pub fn run(&mut self, ast: TopLevel) -> Result<(), PipelineError> {
        self.results.clear();
        self.final_ast = None;
        let mut current = ast;

        for (name, step) in &mut self.steps {
            match step {
                PipelineStep::Transformer(transformer) => {
                    debug!(step = name.as_str(), "running transformer step");
                    current = transformer.apply(current);
                    self.results
                        .push((name.clone(), StepResult::Transformer { output_ast: current.clone() }));
                    self.final_ast = Some(current.clone());
                }
                PipelineStep::Analyzer(analyzer) => {
                    debug!(step = name.as_str(), "running analyzer step");
                    analyzer.analyze(&current)?;
                    self.results
                        .push((name.clone(), StepResult::Analyzer { outcome: analyzer.outcome() }));
                }
            }
        }
        Ok(())
    }

    /// Result of a specific step, by name.
    pub fn get_result(&self, name: &str) -> Option<&StepResult> {
        self.results.iter().find(|(n, _)| n == name).map(|(_, r)| r)
    }

    /// All recorded results, in execution order.
    pub fn results(&self) -> &[(String, StepResult)] {
        &self.results
    }

    /// Output of the last transformer step, if any ran.
    pub fn get_final_ast(&self) -> Option<&TopLevel> {
        self.final_ast.as_ref()
    }

    /// Drops all steps and results.
    pub fn clear(&mut self) -> &mut Self {
        self.steps.clear();
        self.results.clear();
        self.final_ast = None;
        self
    }
}

// ===== pass adapters =====

impl AnalysisPass for Validator {
    fn analyze(&mut self, ast: &TopLevel) -> Result<(), VisitError> {
        self.visit(NodeRef::TopLevel(ast))
    }

    fn outcome(&self) -> AnalysisOutcome {
        AnalysisOutcome::Issues(self.issues.clone())
    }
}

impl AnalysisPass for EnhancedValidator {
    fn analyze(&mut self, ast: &TopLevel) -> Result<(), VisitError> {
        self.visit(NodeRef::TopLevel(ast))
    }

    fn outcome(&self) -> AnalysisOutcome {
        AnalysisOutcome::Issues(self.issues().to_vec())
    }
}

impl AnalysisPass for SecurityVisitor {
    fn analyze(&mut self, ast: &TopLevel) -> Result<(), VisitError> {
        self.visit(NodeRef::TopLevel(ast))
    }

    fn outcome(&self) -> AnalysisOutcome {
        AnalysisOutcome::Security(self.get_report())
    }
}

impl TransformPass for Optimizer {
    fn apply(&mut self, ast: TopLevel) -> TopLevel {
        self.optimize(ast)
    }
}

/// Adapter for the metrics visitor and the script formatter, both of which
/// produce a value rather than accumulate issues.
enum ValuePass {
    Metrics(MetricsVisitor),
    Script { formatter: ScriptFormatter, output: String },
}

impl ValuePass {
    fn metrics() -> Self {
        ValuePass::Metrics(MetricsVisitor::new())
    }

    fn script() -> Self {
        ValuePass::Script { formatter: ScriptFormatter::new(), output: String::new() }
    }
}

impl AnalysisPass for ValuePass {
    fn analyze(&mut self, ast: &TopLevel) -> Result<(), VisitError> {
        match self {
            ValuePass::Metrics(visitor) => visitor.visit(NodeRef::TopLevel(ast)),
            ValuePass::Script { formatter, output } => {
                *output = formatter.format(ast);
                Ok(())
            }
        }
    }

    fn outcome(&self) -> AnalysisOutcome {
        match self {
            ValuePass::Metrics(visitor) => AnalysisOutcome::Metrics(visitor.get_report()),
            ValuePass::Script { output, .. } => AnalysisOutcome::Text(output.clone()),
        }
    }
}
