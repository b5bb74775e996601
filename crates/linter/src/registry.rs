//! Registry of the rule providers known to an engine.

use crate::rule::{RuleId, RuleProvider, RuleSetProvider, VisitorModifier};
use lintkit_config::ConfigSnapshot;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_REGISTRY_ID: AtomicU64 = AtomicU64::new(0);

/// Identity of a [`RuleRegistry`], part of the execution order cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistryId(u64);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("invalid rule id '{0}': expected '<rule-set>:<rule-name>'")]
    InvalidRuleId(RuleId),

    #[error("rule '{rule_id}' runs after '{target}', which is not a valid rule id")]
    InvalidRunAfterTarget { rule_id: RuleId, target: RuleId },

    #[error("rule id '{0}' is provided more than once")]
    DuplicateRuleId(RuleId),
}

/// Validated, immutable set of rule providers.
///
/// Providers are kept in rule id order, so iteration is deterministic no
/// matter in which order they were registered.
#[derive(Debug)]
pub struct RuleRegistry {
    id: RegistryId,
    providers: BTreeMap<RuleId, Arc<RuleProvider>>,
}

impl RuleRegistry {
    /// Build a registry, rejecting malformed and duplicate rule ids.
    pub fn new(providers: impl IntoIterator<Item = RuleProvider>) -> Result<Self, RegistryError> {
        let mut by_id = BTreeMap::new();
        for provider in providers {
            let rule_id = provider.rule_id().clone();
            if !rule_id.is_valid() {
                return Err(RegistryError::InvalidRuleId(rule_id));
            }
            for modifier in provider.visitor_modifiers() {
                if let VisitorModifier::RunAfterRule { rule_id: target, .. } = modifier {
                    if !target.is_valid() {
                        return Err(RegistryError::InvalidRunAfterTarget {
                            rule_id,
                            target: target.clone(),
                        });
                    }
                }
            }
            if by_id.insert(rule_id.clone(), Arc::new(provider)).is_some() {
                return Err(RegistryError::DuplicateRuleId(rule_id));
            }
        }

        let id = RegistryId(NEXT_REGISTRY_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(registry = id.0, providers = by_id.len(), "Rule registry created");
        Ok(Self {
            id,
            providers: by_id,
        })
    }

    /// Build a registry from the providers of several rule sets.
    pub fn from_rule_sets(rule_sets: &[&dyn RuleSetProvider]) -> Result<Self, RegistryError> {
        Self::new(
            rule_sets
                .iter()
                .flat_map(|rule_set| rule_set.rule_providers()),
        )
    }

    #[must_use]
    pub fn id(&self) -> RegistryId {
        self.id
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    #[must_use]
    pub fn get(&self, rule_id: &RuleId) -> Option<&Arc<RuleProvider>> {
        self.providers.get(rule_id)
    }

    /// Providers in rule id order
    pub fn providers(&self) -> impl Iterator<Item = &Arc<RuleProvider>> + '_ {
        self.providers.values()
    }

    pub fn rule_ids(&self) -> impl Iterator<Item = &RuleId> + '_ {
        self.providers.keys()
    }

    /// Ids of the providers that are not active for `config`.
    #[must_use]
    pub fn disabled_rules(&self, config: &ConfigSnapshot) -> BTreeSet<RuleId> {
        self.providers
            .values()
            .filter(|provider| !provider.is_active(config))
            .map(|provider| provider.rule_id().clone())
            .collect()
    }
}

impl RuleProvider {
    /// A rule is active unless it is turned off, requires another code style,
    /// or is experimental while experimental rules are disabled.
    #[must_use]
    pub fn is_active(&self, config: &ConfigSnapshot) -> bool {
        let rule_id = self.rule_id().as_str();
        if config.is_rule_disabled(rule_id) {
            tracing::trace!(rule = rule_id, "Rule turned off in config");
            return false;
        }
        if !self
            .required_code_style()
            .is_none_or(|code_style| code_style == config.code_style)
        {
            tracing::trace!(
                rule = rule_id,
                code_style = %config.code_style,
                "Rule does not apply to code style"
            );
            return false;
        }
        if self.is_experimental() && !config.experimental {
            tracing::trace!(rule = rule_id, "Experimental rule not enabled");
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::{Rule, RunAfterMode};
    use lintkit_config::{CodeStyle, RuleConfig, RuleSeverity};

    struct Empty;
    impl Rule for Empty {}

    fn provider(id: &str) -> RuleProvider {
        RuleProvider::new(id, || Empty)
    }

    #[test]
    fn test_registry_orders_by_rule_id() {
        let registry = RuleRegistry::new(vec![
            provider("b:one"),
            provider("a:two"),
            provider("a:one"),
        ])
        .unwrap();
        let ids: Vec<&str> = registry.rule_ids().map(RuleId::as_str).collect();
        assert_eq!(ids, vec!["a:one", "a:two", "b:one"]);
        assert_eq!(registry.len(), 3);
        assert!(registry.get(&RuleId::new("a:two")).is_some());
    }

    #[test]
    fn test_registry_rejects_duplicates() {
        let result = RuleRegistry::new(vec![provider("a:one"), provider("a:one")]);
        assert_eq!(
            result.err(),
            Some(RegistryError::DuplicateRuleId(RuleId::new("a:one")))
        );
    }

    #[test]
    fn test_registry_rejects_malformed_ids() {
        let result = RuleRegistry::new(vec![provider("no-rule-set")]);
        assert_eq!(
            result.err(),
            Some(RegistryError::InvalidRuleId(RuleId::new("no-rule-set")))
        );

        let result = RuleRegistry::new(vec![
            provider("a:one").run_after("Bad Target", RunAfterMode::Regardless)
        ]);
        assert!(matches!(
            result,
            Err(RegistryError::InvalidRunAfterTarget { .. })
        ));
    }

    #[test]
    fn test_registries_have_distinct_identity() {
        let first = RuleRegistry::new(vec![provider("a:one")]).unwrap();
        let second = RuleRegistry::new(vec![provider("a:one")]).unwrap();
        assert_ne!(first.id(), second.id());
    }

    #[test]
    fn test_activation() {
        let registry = RuleRegistry::new(vec![
            provider("a:plain"),
            provider("a:off"),
            provider("a:official").requires_code_style(CodeStyle::KtlintOfficial),
            provider("a:experimental").experimental(),
        ])
        .unwrap();
        let config = ConfigSnapshot::default()
            .with_code_style(CodeStyle::IntellijIdea)
            .with_rule("a:off", RuleConfig::Severity(RuleSeverity::Off));

        let disabled = registry.disabled_rules(&config);
        assert_eq!(disabled.len(), 3);
        assert!(disabled.contains(&RuleId::new("a:off")));
        assert!(disabled.contains(&RuleId::new("a:official")));
        assert!(disabled.contains(&RuleId::new("a:experimental")));

        let config = ConfigSnapshot::default().with_experimental(true);
        assert!(registry.disabled_rules(&config).is_empty());
    }
}
