//! Depth-first dispatch of rule hooks over a live tree.
//!
//! Every hook call runs inside its own tree transaction. When the hook
//! panics, its edits are rolled back, the violations it reported lose their
//! corrected flag and the rule is excluded from the rest of the file.

use crate::context::{AutocorrectPolicy, LineCache, VisitContext};
use crate::diagnostics::{HookPhase, RuleFailure, ViolationCollector};
use crate::rule::{Rule, RuleId};
use lintkit_syntax::{NodeId, SyntaxTree};
use std::any::Any;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};

/// A rule instance bound to one file.
pub(crate) struct ActiveRule {
    pub(crate) rule_id: RuleId,
    pub(crate) rule: Box<dyn Rule>,
    pub(crate) failed: bool,
}

impl ActiveRule {
    pub(crate) fn new(rule_id: RuleId, rule: Box<dyn Rule>) -> Self {
        Self {
            rule_id,
            rule,
            failed: false,
        }
    }
}

pub(crate) struct Traversal<'a> {
    tree: &'a mut SyntaxTree,
    policy: &'a dyn AutocorrectPolicy,
    rules: &'a mut [ActiveRule],
    violations: ViolationCollector,
    failures: Vec<RuleFailure>,
    lines: LineCache,
}

impl<'a> Traversal<'a> {
    pub(crate) fn new(
        tree: &'a mut SyntaxTree,
        policy: &'a dyn AutocorrectPolicy,
        rules: &'a mut [ActiveRule],
    ) -> Self {
        Self {
            tree,
            policy,
            rules,
            violations: ViolationCollector::default(),
            failures: Vec::new(),
            lines: LineCache::default(),
        }
    }

    /// Walk the whole tree, then call `after_last_node` on every rule.
    pub(crate) fn run(mut self) -> (ViolationCollector, Vec<RuleFailure>) {
        let root = self.tree.root();
        self.visit(root);
        for index in 0..self.rules.len() {
            self.invoke(index, HookPhase::AfterLastNode, None);
        }
        (self.violations, self.failures)
    }

    fn visit(&mut self, node: NodeId) {
        for index in 0..self.rules.len() {
            if !self.tree.is_attached(node) {
                return;
            }
            self.invoke(index, HookPhase::BeforeVisitChildNodes, Some(node));
        }

        self.visit_children(node);

        for index in 0..self.rules.len() {
            if !self.tree.is_attached(node) {
                return;
            }
            self.invoke(index, HookPhase::AfterVisitChildNodes, Some(node));
        }
    }

    /// Visit every child of `node` exactly once while rules edit the live
    /// child list.
    ///
    /// A child moved by a rule is not visited again, and the siblings it
    /// jumped over are still visited. Children inserted behind the visited
    /// child are never visited; those inserted ahead of it are.
    fn visit_children(&mut self, node: NodeId) {
        let mut passed: HashSet<NodeId> = HashSet::new();
        loop {
            if !self.tree.is_attached(node) {
                return;
            }
            let before = self.tree.children(node).to_vec();
            let Some(child) = before.iter().copied().find(|c| !passed.contains(c)) else {
                break;
            };
            self.visit(child);
            passed.insert(child);

            if !self.tree.is_attached(node) {
                return;
            }
            let after = self.tree.children(node);
            if after == before.as_slice() {
                continue;
            }
            let existing: HashSet<NodeId> = before.into_iter().collect();
            let cursor = if self.tree.parent(child) == Some(node) {
                after.iter().position(|c| *c == child)
            } else {
                after
                    .iter()
                    .position(|c| existing.contains(c) && !passed.contains(c))
            }
            .unwrap_or(after.len());
            let inserted_behind: Vec<NodeId> = after[..cursor]
                .iter()
                .copied()
                .filter(|c| !existing.contains(c))
                .collect();
            passed.extend(inserted_behind);
        }
    }

    fn invoke(&mut self, index: usize, phase: HookPhase, node: Option<NodeId>) {
        let active = &mut self.rules[index];
        if active.failed {
            return;
        }
        tracing::trace!(rule = %active.rule_id, %phase, node = ?node, "Invoking rule");

        let first_violation = self.violations.len();
        let checkpoint = self.tree.begin();
        let result = {
            let mut ctx = VisitContext::new(
                self.tree,
                &active.rule_id,
                self.policy,
                &mut self.violations,
                &mut self.failures,
                &mut self.lines,
            );
            let rule = &mut active.rule;
            panic::catch_unwind(AssertUnwindSafe(|| match (phase, node) {
                (HookPhase::BeforeVisitChildNodes, Some(node)) => {
                    rule.before_visit_child_nodes(node, &mut ctx);
                }
                (HookPhase::AfterVisitChildNodes, Some(node)) => {
                    rule.after_visit_child_nodes(node, &mut ctx);
                }
                _ => rule.after_last_node(&mut ctx),
            }))
        };

        match result {
            Ok(()) => self.tree.commit(checkpoint),
            Err(payload) => {
                self.tree.rollback(checkpoint);
                self.violations.uncorrect_from(first_violation);
                let offset = node.map_or(0, |node| self.tree.start_offset(node));
                let message = panic_message(payload.as_ref());
                tracing::warn!(
                    rule = %active.rule_id,
                    %phase,
                    offset,
                    message = %message,
                    "Rule failed, changes reverted and rule skipped for the rest of the file"
                );
                self.failures.push(RuleFailure {
                    rule_id: active.rule_id.clone(),
                    offset,
                    phase,
                    message,
                });
                active.failed = true;
            }
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("rule panicked")
    }
}
