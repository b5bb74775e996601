use crate::diagnostics::{HookPhase, LintViolation, RuleFailure, ViolationCollector};
use crate::rule::RuleId;
use lintkit_syntax::{SyntaxTree, TreeError};
use lintkit_types::{LineColumn, LineIndex, OffsetRange};

/// Answer of the engine to an emitted violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutocorrectDecision {
    /// The rule must fix the violation now.
    Allow,
    /// The rule must leave the tree untouched.
    NoAutocorrect,
}

impl AutocorrectDecision {
    #[must_use]
    pub fn is_allowed(self) -> bool {
        self == Self::Allow
    }
}

/// Decides whether a violation may be fixed.
///
/// Suppression comments, baselines and "format only this selection" are all
/// expressed as a policy. Any `Fn(&RuleId, usize) -> bool` is a policy.
pub trait AutocorrectPolicy: Send + Sync {
    fn should_fix(&self, rule_id: &RuleId, offset: usize) -> bool;
}

impl<F> AutocorrectPolicy for F
where
    F: Fn(&RuleId, usize) -> bool + Send + Sync,
{
    fn should_fix(&self, rule_id: &RuleId, offset: usize) -> bool {
        self(rule_id, offset)
    }
}

/// Fix everything that can be fixed.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutocorrectAll;

impl AutocorrectPolicy for AutocorrectAll {
    fn should_fix(&self, _rule_id: &RuleId, _offset: usize) -> bool {
        true
    }
}

/// Fix nothing; used for plain linting.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutocorrectNone;

impl AutocorrectPolicy for AutocorrectNone {
    fn should_fix(&self, _rule_id: &RuleId, _offset: usize) -> bool {
        false
    }
}

/// Only fix violations inside one of the ranges.
#[derive(Debug, Clone, Default)]
pub struct AutocorrectWithin(pub Vec<OffsetRange>);

impl AutocorrectPolicy for AutocorrectWithin {
    fn should_fix(&self, _rule_id: &RuleId, offset: usize) -> bool {
        self.0.iter().any(|range| range.contains(offset))
    }
}

/// Only fix violations outside all of the ranges.
#[derive(Debug, Clone, Default)]
pub struct AutocorrectOutside(pub Vec<OffsetRange>);

impl AutocorrectPolicy for AutocorrectOutside {
    fn should_fix(&self, _rule_id: &RuleId, offset: usize) -> bool {
        !self.0.iter().any(|range| range.contains(offset))
    }
}

/// Line index of the tree text, rebuilt only when the tree revision moved.
#[derive(Debug, Default)]
pub(crate) struct LineCache {
    index: Option<(u64, LineIndex)>,
}

impl LineCache {
    pub(crate) fn line_column(&mut self, tree: &SyntaxTree, offset: usize) -> LineColumn {
        let revision = tree.revision();
        let index = match self.index.take() {
            Some((cached, index)) if cached == revision => index,
            _ => tree.line_index(),
        };
        let line_column = index.line_column(offset);
        self.index = Some((revision, index));
        line_column
    }

    #[cfg(test)]
    fn revision(&self) -> Option<u64> {
        self.index.as_ref().map(|(revision, _)| *revision)
    }
}

/// What a rule hook gets to work with: the tree and the means to report.
pub struct VisitContext<'a> {
    tree: &'a mut SyntaxTree,
    rule_id: &'a RuleId,
    policy: &'a dyn AutocorrectPolicy,
    violations: &'a mut ViolationCollector,
    failures: &'a mut Vec<RuleFailure>,
    lines: &'a mut LineCache,
}

impl<'a> VisitContext<'a> {
    pub(crate) fn new(
        tree: &'a mut SyntaxTree,
        rule_id: &'a RuleId,
        policy: &'a dyn AutocorrectPolicy,
        violations: &'a mut ViolationCollector,
        failures: &'a mut Vec<RuleFailure>,
        lines: &'a mut LineCache,
    ) -> Self {
        Self {
            tree,
            rule_id,
            policy,
            violations,
            failures,
            lines,
        }
    }

    #[must_use]
    pub fn tree(&self) -> &SyntaxTree {
        self.tree
    }

    /// Mutable access for fixes. Only edit the tree after an
    /// [`AutocorrectDecision::Allow`].
    pub fn tree_mut(&mut self) -> &mut SyntaxTree {
        self.tree
    }

    #[must_use]
    pub fn rule_id(&self) -> &RuleId {
        self.rule_id
    }

    /// Report a violation at `offset`.
    ///
    /// The policy is consulted exactly once. The result is
    /// [`AutocorrectDecision::Allow`] only when the policy agrees and the
    /// violation can be autocorrected, in which case the violation is already
    /// recorded as corrected and the rule must apply its fix right away.
    #[must_use = "the fix must be applied when the decision allows it"]
    pub fn emit(
        &mut self,
        offset: usize,
        message: impl Into<String>,
        can_be_autocorrected: bool,
    ) -> AutocorrectDecision {
        self.record(offset, message.into(), can_be_autocorrected).0
    }

    /// Report an autocorrectable violation and, when allowed, apply `fix`.
    ///
    /// The fix runs in its own tree transaction: when it returns an error its
    /// edits are reverted, the violation is reported as not corrected and a
    /// [`RuleFailure`] is recorded.
    pub fn emit_and_fix<F>(
        &mut self,
        offset: usize,
        message: impl Into<String>,
        fix: F,
    ) -> AutocorrectDecision
    where
        F: FnOnce(&mut SyntaxTree) -> Result<(), TreeError>,
    {
        let (decision, index) = self.record(offset, message.into(), true);
        if !decision.is_allowed() {
            return decision;
        }

        let checkpoint = self.tree.begin();
        match fix(self.tree) {
            Ok(()) => {
                self.tree.commit(checkpoint);
                AutocorrectDecision::Allow
            }
            Err(error) => {
                self.tree.rollback(checkpoint);
                self.violations.set_corrected(index, false);
                tracing::warn!(
                    rule = %self.rule_id,
                    offset,
                    %error,
                    "Autocorrect failed, changes reverted"
                );
                self.failures.push(RuleFailure {
                    rule_id: self.rule_id.clone(),
                    offset,
                    phase: HookPhase::Autocorrect,
                    message: error.to_string(),
                });
                AutocorrectDecision::NoAutocorrect
            }
        }
    }

    fn record(
        &mut self,
        offset: usize,
        message: String,
        can_be_autocorrected: bool,
    ) -> (AutocorrectDecision, usize) {
        let policy_allows = self.policy.should_fix(self.rule_id, offset);
        let decision = if can_be_autocorrected && policy_allows {
            AutocorrectDecision::Allow
        } else {
            AutocorrectDecision::NoAutocorrect
        };
        let line_column = self.lines.line_column(self.tree, offset);
        tracing::trace!(
            rule = %self.rule_id,
            offset,
            ?decision,
            message = %message,
            "Violation emitted"
        );
        let index = self.violations.push(LintViolation {
            offset,
            line: line_column.line,
            col: line_column.column,
            message,
            rule_id: self.rule_id.clone(),
            can_be_autocorrected,
            corrected: decision.is_allowed(),
        });
        (decision, index)
    }
}
