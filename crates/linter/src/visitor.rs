use crate::cache::{self, ExecutionOrderCache};
use crate::context::AutocorrectPolicy;
use crate::diagnostics::{HookPhase, LintViolation, RuleFailure};
use crate::error::{EngineError, Result};
use crate::registry::RuleRegistry;
use crate::rule::RuleId;
use crate::sorter::{ExecutionOrder, OrderingError};
use crate::traversal::{panic_message, ActiveRule, Traversal};
use lintkit_config::ConfigSnapshot;
use lintkit_syntax::SyntaxTree;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};

/// Violations and rule failures of one traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintOutcome {
    /// Sorted by offset, ties in discovery order
    pub violations: Vec<LintViolation>,
    pub failures: Vec<RuleFailure>,
}

/// Hands out [`FileVisitor`]s for one execution order.
#[derive(Debug, Clone)]
pub struct VisitorProvider {
    order: ExecutionOrder,
}

impl VisitorProvider {
    /// Resolve the execution order for `disabled` through `cache`.
    ///
    /// With `recreate` the order is computed again without reading or
    /// updating the cache.
    pub fn new(
        registry: &RuleRegistry,
        disabled: &BTreeSet<RuleId>,
        cache: &ExecutionOrderCache,
        recreate: bool,
    ) -> std::result::Result<Self, OrderingError> {
        let order = if recreate {
            tracing::debug!(registry = ?registry.id(), "Recreating execution order");
            cache::compute(registry, disabled)?
        } else {
            cache.get_or_compute(registry, disabled)?
        };
        Ok(Self { order })
    }

    #[must_use]
    pub fn execution_order(&self) -> &ExecutionOrder {
        &self.order
    }

    /// Create fresh rule instances for one file and bind their configuration.
    ///
    /// A panic in `before_first_node` is recorded as a failure of that rule;
    /// the rule does not take part in the traversal.
    pub fn file_visitor(&self, config: &ConfigSnapshot) -> Result<FileVisitor> {
        let mut rules = Vec::with_capacity(self.order.len());
        let mut failures = Vec::new();

        for provider in self.order.providers() {
            let rule_id = provider.rule_id();
            let created = panic::catch_unwind(AssertUnwindSafe(|| provider.create_rule()))
                .unwrap_or_else(|payload| Err(panic_message(payload.as_ref())));
            let mut rule = created.map_err(|reason| {
                tracing::warn!(rule = %rule_id, reason = %reason, "Unable to create rule");
                EngineError::RuleInstantiation {
                    rule_id: rule_id.clone(),
                    reason,
                }
            })?;

            let view = config.view_for(rule_id.as_str(), provider.config_keys());
            let bound = panic::catch_unwind(AssertUnwindSafe(|| rule.before_first_node(&view)));
            match bound {
                Ok(()) => rules.push(ActiveRule::new(rule_id.clone(), rule)),
                Err(payload) => {
                    let message = panic_message(payload.as_ref());
                    tracing::warn!(rule = %rule_id, message = %message, "Rule failed before traversal");
                    failures.push(RuleFailure {
                        rule_id: rule_id.clone(),
                        offset: 0,
                        phase: HookPhase::BeforeFirstNode,
                        message,
                    });
                }
            }
        }

        Ok(FileVisitor { rules, failures })
    }
}

/// The rules of one file, ready to visit its tree once.
pub struct FileVisitor {
    rules: Vec<ActiveRule>,
    failures: Vec<RuleFailure>,
}

impl FileVisitor {
    /// Ids of the rules that take part in the traversal, in execution order.
    #[must_use]
    pub fn rule_ids(&self) -> Vec<&RuleId> {
        self.rules.iter().map(|active| &active.rule_id).collect()
    }

    #[tracing::instrument(skip_all, fields(rules = self.rules.len()))]
    pub fn visit(mut self, tree: &mut SyntaxTree, policy: &dyn AutocorrectPolicy) -> LintOutcome {
        if self.rules.is_empty() {
            tracing::debug!("No enabled rules, skipping traversal");
            return LintOutcome {
                violations: Vec::new(),
                failures: self.failures,
            };
        }

        let (violations, failures) = Traversal::new(tree, policy, &mut self.rules).run();
        self.failures.extend(failures);
        LintOutcome {
            violations: violations.into_sorted(),
            failures: self.failures,
        }
    }
}

impl std::fmt::Debug for FileVisitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileVisitor")
            .field("rules", &self.rule_ids())
            .field("failures", &self.failures)
            .finish()
    }
}
