//! Rule scheduling, traversal and autocorrect engine.
//!
//! A [`RuleRegistry`] holds the [`RuleProvider`]s of all loaded rule sets.
//! For every file the [`LintEngine`] works out which rules are active, sorts
//! them into an [`ExecutionOrder`], creates fresh [`Rule`] instances and walks
//! the [`SyntaxTree`](lintkit_syntax::SyntaxTree) once, calling each rule's
//! hooks in order. Rules report through [`VisitContext::emit`] and are told
//! by the returned [`AutocorrectDecision`] whether to fix the tree.

mod cache;
mod context;
mod diagnostics;
mod engine;
mod error;
mod registry;
mod rule;
mod sorter;
mod traversal;
mod visitor;

pub use cache::ExecutionOrderCache;
pub use context::{
    AutocorrectAll, AutocorrectDecision, AutocorrectNone, AutocorrectOutside, AutocorrectPolicy,
    AutocorrectWithin, VisitContext,
};
pub use diagnostics::{HookPhase, LintViolation, RuleFailure};
pub use engine::{FileResult, FormatOutcome, LintEngine, SourceFile, MAX_FORMAT_PASSES};
pub use error::{EngineError, Result};
pub use registry::{RegistryError, RegistryId, RuleRegistry};
pub use rule::{
    InvalidRuleId, Rule, RuleFactory, RuleId, RuleProvider, RuleSetProvider, RunAfterMode,
    VisitorModifier,
};
pub use sorter::{sort_rule_providers, BlockedRule, ExecutionOrder, OrderingError};
pub use visitor::{FileVisitor, LintOutcome, VisitorProvider};

/// Prelude module for convenient imports.
///
/// This module re-exports what rule authors need. Import with:
///
/// ```rust
/// use lintkit_linter::prelude::*;
/// ```
pub mod prelude {
    pub use crate::context::{AutocorrectDecision, VisitContext};
    pub use crate::rule::{Rule, RuleProvider, RuleSetProvider, RunAfterMode};
    pub use lintkit_config::{ConfigKey, ConfigView};
    pub use lintkit_syntax::{NodeId, SyntaxKind, SyntaxTree};
}
