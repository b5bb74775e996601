//! Deterministic execution order of rule providers.
//!
//! Rules form a dependency graph: a `RunAfterRule` modifier is an edge from
//! the target to the rule, and `RunAsLateAsPossible` adds an edge from every
//! other rule to the late rule. The order is the topological order of that
//! graph where, among all rules that are ready, the rule with the lexically
//! smallest id goes first.

use crate::rule::{RuleId, RuleProvider, VisitorModifier};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Ordered sequence of rule providers. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct ExecutionOrder(Arc<[Arc<RuleProvider>]>);

impl ExecutionOrder {
    #[must_use]
    pub fn providers(&self) -> &[Arc<RuleProvider>] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn rule_ids(&self) -> Vec<&RuleId> {
        self.0.iter().map(|provider| provider.rule_id()).collect()
    }

    /// `true` when both orders are the same shared computation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// A rule that could not be placed, with the rules it was still waiting for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedRule {
    pub rule_id: RuleId,
    pub waits_for: Vec<RuleId>,
}

impl std::fmt::Display for BlockedRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (waits for ", self.rule_id)?;
        for (i, rule_id) in self.waits_for.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{rule_id}")?;
        }
        f.write_str(")")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderingError {
    #[error("rule ordering constraints contradict each other: {}", format_blocked(.blocked))]
    Cycle { blocked: Vec<BlockedRule> },
}

fn format_blocked(blocked: &[BlockedRule]) -> String {
    blocked
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Sort the enabled providers into an [`ExecutionOrder`].
///
/// Providers whose id is in `disabled` are left out. A constraint that
/// cannot be satisfied is reported, never dropped.
#[tracing::instrument(skip_all, fields(providers = providers.len(), disabled = disabled.len()))]
pub fn sort_rule_providers(
    providers: &[Arc<RuleProvider>],
    disabled: &BTreeSet<RuleId>,
) -> Result<ExecutionOrder, OrderingError> {
    let enabled: BTreeMap<&RuleId, &Arc<RuleProvider>> = providers
        .iter()
        .filter(|provider| !disabled.contains(provider.rule_id()))
        .map(|provider| (provider.rule_id(), provider))
        .collect();

    // For every rule, the rules it still waits for
    let mut waits_for: BTreeMap<&RuleId, BTreeSet<&RuleId>> =
        enabled.keys().map(|id| (*id, BTreeSet::new())).collect();

    for (rule_id, provider) in &enabled {
        for modifier in provider.visitor_modifiers() {
            match modifier {
                VisitorModifier::RunAfterRule { rule_id: target, .. } => {
                    // A target that does not run leaves nothing to order
                    // against, whatever the mode.
                    if let Some((target, _)) = enabled.get_key_value(target) {
                        waits_for.entry(*rule_id).or_default().insert(*target);
                    }
                }
                VisitorModifier::RunAsLateAsPossible => {
                    let earlier = enabled
                        .iter()
                        .filter(|(_, other)| !other.runs_as_late_as_possible())
                        .map(|(other_id, _)| *other_id);
                    waits_for.entry(*rule_id).or_default().extend(earlier);
                }
            }
        }
    }

    let mut dependents: BTreeMap<&RuleId, Vec<&RuleId>> = BTreeMap::new();
    for (rule_id, targets) in &waits_for {
        for target in targets {
            dependents.entry(*target).or_default().push(*rule_id);
        }
    }

    let mut ready: BTreeSet<&RuleId> = waits_for
        .iter()
        .filter(|(_, targets)| targets.is_empty())
        .map(|(rule_id, _)| *rule_id)
        .collect();
    let mut sorted: Vec<Arc<RuleProvider>> = Vec::with_capacity(enabled.len());

    while let Some(rule_id) = ready.pop_first() {
        waits_for.remove(rule_id);
        if let Some(provider) = enabled.get(rule_id) {
            sorted.push(Arc::clone(provider));
        }
        for dependent in dependents.get(rule_id).into_iter().flatten() {
            if let Some(targets) = waits_for.get_mut(dependent) {
                targets.remove(rule_id);
                if targets.is_empty() {
                    ready.insert(*dependent);
                }
            }
        }
    }

    if !waits_for.is_empty() {
        let blocked: Vec<BlockedRule> = waits_for
            .into_iter()
            .map(|(rule_id, targets)| BlockedRule {
                rule_id: rule_id.clone(),
                waits_for: targets.into_iter().cloned().collect(),
            })
            .collect();
        let error = OrderingError::Cycle { blocked };
        tracing::warn!(%error, "Unable to order rules");
        return Err(error);
    }

    let order = ExecutionOrder(sorted.into());
    tracing::debug!(
        order = %order
            .rule_ids()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        "Rules will be executed in this order"
    );
    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Rule, RunAfterMode};

    struct Empty;
    impl Rule for Empty {}

    fn provider(id: &str) -> RuleProvider {
        RuleProvider::new(id, || Empty)
    }

    fn sort(providers: Vec<RuleProvider>, disabled: &[&str]) -> Result<Vec<String>, OrderingError> {
        let providers: Vec<Arc<RuleProvider>> = providers.into_iter().map(Arc::new).collect();
        let disabled = disabled.iter().map(|id| RuleId::new(id)).collect();
        sort_rule_providers(&providers, &disabled).map(|order| {
            order
                .rule_ids()
                .into_iter()
                .map(ToString::to_string)
                .collect()
        })
    }

    #[test]
    fn test_lexical_order_without_constraints() {
        let order = sort(
            vec![provider("b:x"), provider("a:y"), provider("a:b")],
            &[],
        )
        .unwrap();
        assert_eq!(order, vec!["a:b", "a:y", "b:x"]);
    }

    #[test]
    fn test_run_after_and_late_bucket() {
        let providers = || {
            vec![
                provider("t:c").run_as_late_as_possible(),
                provider("t:b").run_after("t:a", RunAfterMode::Regardless),
                provider("t:a"),
            ]
        };
        assert_eq!(sort(providers(), &[]).unwrap(), vec!["t:a", "t:b", "t:c"]);
        assert_eq!(sort(providers(), &["t:b"]).unwrap(), vec!["t:a", "t:c"]);
    }

    #[test]
    fn test_run_after_overrides_lexical_order() {
        let order = sort(
            vec![
                provider("t:a").run_after("t:z", RunAfterMode::Regardless),
                provider("t:m"),
                provider("t:z"),
            ],
            &[],
        )
        .unwrap();
        assert_eq!(order, vec!["t:m", "t:z", "t:a"]);
    }

    #[test]
    fn test_late_rules_follow_every_normal_rule() {
        let order = sort(
            vec![
                provider("a:late").run_as_late_as_possible(),
                provider("z:normal"),
                provider("m:late").run_as_late_as_possible(),
                provider("b:normal"),
            ],
            &[],
        )
        .unwrap();
        assert_eq!(order, vec!["b:normal", "z:normal", "a:late", "m:late"]);
    }

    #[test]
    fn test_run_after_inside_late_bucket() {
        let order = sort(
            vec![
                provider("t:a")
                    .run_as_late_as_possible()
                    .run_after("t:b", RunAfterMode::Regardless),
                provider("t:b").run_as_late_as_possible(),
                provider("t:c"),
            ],
            &[],
        )
        .unwrap();
        assert_eq!(order, vec!["t:c", "t:b", "t:a"]);
    }

    #[test]
    fn test_missing_targets_are_ignored() {
        let order = sort(
            vec![
                provider("t:a").run_after("t:missing", RunAfterMode::Regardless),
                provider("t:b").run_after("t:disabled", RunAfterMode::OnlyIfActive),
                provider("t:disabled"),
            ],
            &["t:disabled"],
        )
        .unwrap();
        assert_eq!(order, vec!["t:a", "t:b"]);
    }

    #[test]
    fn test_cycle_names_blocked_rules() {
        let err = sort(
            vec![
                provider("t:a").run_after("t:b", RunAfterMode::Regardless),
                provider("t:b").run_after("t:a", RunAfterMode::OnlyIfActive),
                provider("t:c"),
            ],
            &[],
        )
        .unwrap_err();
        assert_eq!(
            err,
            OrderingError::Cycle {
                blocked: vec![
                    BlockedRule {
                        rule_id: RuleId::new("t:a"),
                        waits_for: vec![RuleId::new("t:b")],
                    },
                    BlockedRule {
                        rule_id: RuleId::new("t:b"),
                        waits_for: vec![RuleId::new("t:a")],
                    },
                ]
            }
        );
        assert_eq!(
            err.to_string(),
            "rule ordering constraints contradict each other: \
             t:a (waits for t:b); t:b (waits for t:a)"
        );
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let err = sort(
            vec![provider("t:a").run_after("t:a", RunAfterMode::Regardless)],
            &[],
        )
        .unwrap_err();
        let OrderingError::Cycle { blocked } = err;
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].rule_id.as_str(), "t:a");
    }

    #[test]
    fn test_normal_rule_after_late_rule_is_a_contradiction() {
        let err = sort(
            vec![
                provider("t:late").run_as_late_as_possible(),
                provider("t:normal").run_after("t:late", RunAfterMode::Regardless),
            ],
            &[],
        )
        .unwrap_err();
        let OrderingError::Cycle { blocked } = err;
        let blocked: Vec<&str> = blocked.iter().map(|b| b.rule_id.as_str()).collect();
        assert_eq!(blocked, vec!["t:late", "t:normal"]);
    }

    #[test]
    fn test_order_does_not_depend_on_registration_order() {
        let forward = sort(
            vec![
                provider("x:one"),
                provider("x:two").run_after("x:three", RunAfterMode::Regardless),
                provider("x:three"),
            ],
            &[],
        )
        .unwrap();
        let backward = sort(
            vec![
                provider("x:three"),
                provider("x:two").run_after("x:three", RunAfterMode::Regardless),
                provider("x:one"),
            ],
            &[],
        )
        .unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward, vec!["x:one", "x:three", "x:two"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(sort(Vec::new(), &[]).unwrap().is_empty());
    }
}
