//! Visitor framework and built-in visitors for the shell AST.
//!
//! The crate provides:
//!
//! - [`AstVisitor`]: read-only double-dispatch visitor with strict
//!   (`UnhandledNode`) or traversing defaults,
//! - [`AstTransformer`]: bottom-up AST → AST rewriting,
//! - renderers: script reconstruction, ASCII tree (compact/detailed),
//!   Graphviz DOT, S-expressions,
//! - analyzers: structural [`Validator`], [`EnhancedValidator`] with
//!   scoped variable tracking and security rules, [`MetricsVisitor`],
//!   [`SecurityVisitor`],
//! - the [`Optimizer`] transformer,
//! - a [`VisitorRegistry`] and [`VisitorPipeline`] for named, ordered
//!   composition.

pub mod constants;
mod enhanced;
mod format;
mod metrics;
mod optimize;
mod pipeline;
mod security;
pub mod transform;
mod validate;
mod visit;

pub use enhanced::{EnhancedValidator, ValidatorConfig, VariableInfo, VariableTracker};
pub use format::{AsciiTreeRenderer, AstFormat, DotGenerator, ScriptFormatter, SexpRenderer, render};
pub use metrics::{MetricsReport, MetricsVisitor};
pub use optimize::Optimizer;
pub use pipeline::{
    AnalysisOutcome, AnalysisPass, PipelineError, PipelineStep, RegistryError, StepKind,
    StepResult, TransformPass, VisitorInfo, VisitorPipeline, VisitorRegistry, builtin_registry,
};
pub use security::{RiskLevel, SecurityIssue, SecurityReport, SecurityVisitor};
pub use transform::AstTransformer;
pub use validate::{Severity, ValidationIssue, Validator};
pub use visit::{AstVisitor, VisitError, VisitResult, walk_children};

pub use psh_ast::{NodeKind, NodeRef};
