use crate::cache::ExecutionOrderCache;
use crate::context::{AutocorrectNone, AutocorrectPolicy};
use crate::diagnostics::{LintViolation, RuleFailure};
use crate::error::{EngineError, Result};
use crate::registry::RuleRegistry;
use crate::sorter::{ExecutionOrder, OrderingError};
use crate::visitor::{LintOutcome, VisitorProvider};
use crossbeam_channel::unbounded;
use lintkit_config::ConfigSnapshot;
use lintkit_syntax::SyntaxTree;
use std::sync::Arc;
use threadpool::ThreadPool;

/// Upper bound on format passes over one file.
pub const MAX_FORMAT_PASSES: usize = 3;

/// Result of formatting one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOutcome {
    /// Corrected violations of every pass in pass order, followed by the
    /// remaining violations of the last pass.
    ///
    /// Offsets and positions refer to the text as it was when the pass that
    /// reported them ran. Each pass is sorted by offset on its own.
    pub violations: Vec<LintViolation>,
    pub failures: Vec<RuleFailure>,
    /// The formatted text, `None` when nothing was corrected
    pub text: Option<String>,
    pub passes: usize,
}

/// A file handed to [`LintEngine::lint_files`].
#[derive(Debug)]
pub struct SourceFile {
    pub name: String,
    pub tree: SyntaxTree,
    pub config: Arc<ConfigSnapshot>,
}

#[derive(Debug)]
pub struct FileResult {
    pub name: String,
    pub outcome: Result<LintOutcome>,
}

/// Entry point for linting and formatting.
///
/// Owns the rule registry and the execution order cache. Clones share both,
/// so an engine can be handed to worker threads.
///
/// ```rust
/// use lintkit_config::ConfigSnapshot;
/// use lintkit_linter::{LintEngine, Rule, RuleProvider, RuleRegistry};
/// use lintkit_syntax::{SyntaxKind, TreeBuilder};
///
/// struct Quiet;
/// impl Rule for Quiet {}
///
/// let registry = RuleRegistry::new(vec![RuleProvider::new("custom:quiet", || Quiet)]).unwrap();
/// let engine = LintEngine::new(registry);
///
/// let mut builder = TreeBuilder::new(SyntaxKind::File);
/// builder.token(SyntaxKind::Identifier, "x");
/// let mut tree = builder.finish();
///
/// let outcome = engine.lint(&mut tree, &ConfigSnapshot::default()).unwrap();
/// assert!(outcome.violations.is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct LintEngine {
    registry: Arc<RuleRegistry>,
    cache: Arc<ExecutionOrderCache>,
}

impl LintEngine {
    #[must_use]
    pub fn new(registry: RuleRegistry) -> Self {
        Self::with_cache(Arc::new(registry), Arc::new(ExecutionOrderCache::new()))
    }

    /// Engine sharing a cache with other engines.
    #[must_use]
    pub fn with_cache(registry: Arc<RuleRegistry>, cache: Arc<ExecutionOrderCache>) -> Self {
        Self { registry, cache }
    }

    #[must_use]
    pub fn registry(&self) -> &RuleRegistry {
        &self.registry
    }

    #[must_use]
    pub fn cache(&self) -> &ExecutionOrderCache {
        &self.cache
    }

    /// Order in which the rules active for `config` run.
    pub fn execution_order(
        &self,
        config: &ConfigSnapshot,
    ) -> std::result::Result<ExecutionOrder, OrderingError> {
        self.visitor_provider(config, false)
            .map(|provider| provider.execution_order().clone())
    }

    /// Visitor provider for the rules active for `config`.
    pub fn visitor_provider(
        &self,
        config: &ConfigSnapshot,
        recreate: bool,
    ) -> std::result::Result<VisitorProvider, OrderingError> {
        let disabled = self.registry.disabled_rules(config);
        VisitorProvider::new(&self.registry, &disabled, &self.cache, recreate)
    }

    /// Report violations without changing the tree.
    #[tracing::instrument(skip_all, fields(registry = ?self.registry.id()))]
    pub fn lint(&self, tree: &mut SyntaxTree, config: &ConfigSnapshot) -> Result<LintOutcome> {
        let outcome = self
            .visitor_provider(config, false)?
            .file_visitor(config)?
            .visit(tree, &AutocorrectNone);
        tracing::debug!(
            violations = outcome.violations.len(),
            failures = outcome.failures.len(),
            "Lint finished"
        );
        Ok(outcome)
    }

    /// Fix the violations `policy` allows, repeating until a pass corrects
    /// nothing or [`MAX_FORMAT_PASSES`] is reached.
    #[tracing::instrument(skip_all, fields(registry = ?self.registry.id()))]
    pub fn format(
        &self,
        tree: &mut SyntaxTree,
        config: &ConfigSnapshot,
        policy: &dyn AutocorrectPolicy,
    ) -> Result<FormatOutcome> {
        let provider = self.visitor_provider(config, false)?;
        let mut corrected = Vec::new();
        let mut remaining = Vec::new();
        let mut failures: Vec<RuleFailure> = Vec::new();
        let mut passes = 0;

        while passes < MAX_FORMAT_PASSES {
            passes += 1;
            let outcome = provider.file_visitor(config)?.visit(tree, policy);
            for failure in outcome.failures {
                if !failures.contains(&failure) {
                    failures.push(failure);
                }
            }
            let (fixed, unfixed): (Vec<_>, Vec<_>) = outcome
                .violations
                .into_iter()
                .partition(|violation| violation.corrected);
            tracing::debug!(pass = passes, corrected = fixed.len(), "Format pass finished");
            remaining = unfixed;
            if fixed.is_empty() {
                break;
            }
            corrected.extend(fixed);
        }

        let text = (!corrected.is_empty()).then(|| tree.to_text());
        let mut violations = corrected;
        violations.extend(remaining);

        Ok(FormatOutcome {
            violations,
            failures,
            text,
            passes,
        })
    }

    /// Lint many files on a pool of `workers` threads.
    ///
    /// Results come back in the order of `files`.
    #[tracing::instrument(skip_all, fields(files = files.len(), workers = workers))]
    pub fn lint_files(&self, files: Vec<SourceFile>, workers: usize) -> Vec<FileResult> {
        let pool = ThreadPool::with_name(String::from("lintkit-worker"), workers.max(1));
        let (sender, receiver) = unbounded();
        let mut names = Vec::with_capacity(files.len());

        for (index, file) in files.into_iter().enumerate() {
            names.push(file.name.clone());
            let engine = self.clone();
            let sender = sender.clone();
            pool.execute(move || {
                let SourceFile {
                    name,
                    mut tree,
                    config,
                } = file;
                tracing::trace!(file = %name, "Linting file");
                let outcome = engine.lint(&mut tree, &config);
                let _ = sender.send((index, outcome));
            });
        }
        drop(sender);

        let mut outcomes: Vec<Option<Result<LintOutcome>>> = names.iter().map(|_| None).collect();
        for (index, outcome) in receiver {
            if let Some(slot) = outcomes.get_mut(index) {
                *slot = Some(outcome);
            }
        }

        names
            .into_iter()
            .zip(outcomes)
            .map(|(name, outcome)| {
                let outcome = outcome.unwrap_or_else(|| {
                    tracing::warn!(file = %name, "No result from worker");
                    Err(EngineError::WorkerLost(name.clone()))
                });
                FileResult { name, outcome }
            })
            .collect()
    }
}
