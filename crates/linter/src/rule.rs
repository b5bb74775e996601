use crate::context::VisitContext;
use lintkit_config::{CodeStyle, ConfigKey, ConfigView};
use lintkit_syntax::NodeId;
use std::sync::Arc;

/// Identifier of a rule, `"<rule-set>:<rule-name>"`.
///
/// Ids order lexically; the rule ordering uses that order to break ties.
/// Cloning is cheap.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RuleId(Arc<str>);

impl RuleId {
    /// Wrap an id without checking its shape. [`RuleRegistry::new`] rejects
    /// malformed ids, use [`RuleId::parse`] to check one up front.
    ///
    /// [`RuleRegistry::new`]: crate::RuleRegistry::new
    #[must_use]
    pub fn new(id: &str) -> Self {
        Self(Arc::from(id))
    }

    pub fn parse(id: &str) -> Result<Self, InvalidRuleId> {
        if lintkit_config::is_valid_rule_id(id) {
            Ok(Self::new(id))
        } else {
            Err(InvalidRuleId(id.to_owned()))
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        lintkit_config::is_valid_rule_id(&self.0)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The part before the `:`
    #[must_use]
    pub fn rule_set(&self) -> &str {
        self.0.split_once(':').map_or("", |(set, _)| set)
    }

    /// The part after the `:`
    #[must_use]
    pub fn name(&self) -> &str {
        let id: &str = &self.0;
        id.split_once(':').map_or(id, |(_, name)| name)
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Debug for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RuleId({:?})", &*self.0)
    }
}

impl serde::Serialize for RuleId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid rule id '{0}': expected '<rule-set>:<rule-name>'")]
pub struct InvalidRuleId(pub String);

/// How a `RunAfterRule` constraint behaves when its target is not running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunAfterMode {
    /// Order after the target when it runs; otherwise there is nothing to
    /// order against and the constraint has no effect.
    #[default]
    Regardless,
    /// The constraint only exists while the target rule is active.
    OnlyIfActive,
}

/// Ordering constraint a rule declares about itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VisitorModifier {
    /// Run after every rule that does not carry this modifier.
    RunAsLateAsPossible,
    /// Run after the rule with the given id.
    RunAfterRule { rule_id: RuleId, mode: RunAfterMode },
}

/// A lint rule instance.
///
/// A fresh instance is created for every file, so a rule may keep per-file
/// state in `self`. All hooks default to doing nothing.
///
/// A hook that hits an unexpected state should panic: the engine reverts the
/// tree changes of that hook call, reports a [`RuleFailure`] and continues
/// with the other rules.
///
/// [`RuleFailure`]: crate::RuleFailure
pub trait Rule {
    /// Called once per file, before the traversal starts.
    fn before_first_node(&mut self, _config: &ConfigView) {}

    /// Called for every node before its children are visited.
    fn before_visit_child_nodes(&mut self, _node: NodeId, _ctx: &mut VisitContext<'_>) {}

    /// Called for every node after its children are visited.
    fn after_visit_child_nodes(&mut self, _node: NodeId, _ctx: &mut VisitContext<'_>) {}

    /// Called once per file, after the root has been visited.
    fn after_last_node(&mut self, _ctx: &mut VisitContext<'_>) {}
}

/// Creates a fresh rule instance, or explains why it cannot.
pub type RuleFactory = dyn Fn() -> Result<Box<dyn Rule>, String> + Send + Sync;

/// Factory and static metadata for one rule.
///
/// ```rust
/// use lintkit_linter::{Rule, RuleProvider, RunAfterMode};
///
/// #[derive(Default)]
/// struct NoTabs;
/// impl Rule for NoTabs {}
///
/// let provider = RuleProvider::new("custom:no-tabs", NoTabs::default)
///     .run_after("standard:indent", RunAfterMode::OnlyIfActive);
/// assert_eq!(provider.rule_id().as_str(), "custom:no-tabs");
/// ```
#[derive(Clone)]
pub struct RuleProvider {
    rule_id: RuleId,
    factory: Arc<RuleFactory>,
    visitor_modifiers: Vec<VisitorModifier>,
    uses_config_keys: Vec<ConfigKey>,
    required_code_style: Option<CodeStyle>,
    experimental: bool,
}

impl RuleProvider {
    /// Provider for a rule that can always be created.
    #[must_use]
    pub fn new<R, F>(rule_id: &str, factory: F) -> Self
    where
        R: Rule + 'static,
        F: Fn() -> R + Send + Sync + 'static,
    {
        Self::try_new(rule_id, move || Ok(Box::new(factory()) as Box<dyn Rule>))
    }

    /// Provider for a rule whose creation can fail.
    #[must_use]
    pub fn try_new<F>(rule_id: &str, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Rule>, String> + Send + Sync + 'static,
    {
        Self {
            rule_id: RuleId::new(rule_id),
            factory: Arc::new(factory),
            visitor_modifiers: Vec::new(),
            uses_config_keys: Vec::new(),
            required_code_style: None,
            experimental: false,
        }
    }

    #[must_use]
    pub fn run_as_late_as_possible(mut self) -> Self {
        if !self
            .visitor_modifiers
            .contains(&VisitorModifier::RunAsLateAsPossible)
        {
            self.visitor_modifiers
                .push(VisitorModifier::RunAsLateAsPossible);
        }
        self
    }

    #[must_use]
    pub fn run_after(mut self, rule_id: &str, mode: RunAfterMode) -> Self {
        self.visitor_modifiers.push(VisitorModifier::RunAfterRule {
            rule_id: RuleId::new(rule_id),
            mode,
        });
        self
    }

    /// Config keys the rule reads in [`Rule::before_first_node`].
    #[must_use]
    pub fn uses_config_keys(mut self, keys: &[ConfigKey]) -> Self {
        for key in keys {
            if !self.uses_config_keys.contains(key) {
                self.uses_config_keys.push(*key);
            }
        }
        self
    }

    /// Only run the rule for this code style.
    #[must_use]
    pub fn requires_code_style(mut self, code_style: CodeStyle) -> Self {
        self.required_code_style = Some(code_style);
        self
    }

    /// Only run the rule when experimental rules are enabled.
    #[must_use]
    pub fn experimental(mut self) -> Self {
        self.experimental = true;
        self
    }

    #[must_use]
    pub fn rule_id(&self) -> &RuleId {
        &self.rule_id
    }

    #[must_use]
    pub fn visitor_modifiers(&self) -> &[VisitorModifier] {
        &self.visitor_modifiers
    }

    #[must_use]
    pub fn config_keys(&self) -> &[ConfigKey] {
        &self.uses_config_keys
    }

    #[must_use]
    pub fn required_code_style(&self) -> Option<CodeStyle> {
        self.required_code_style
    }

    #[must_use]
    pub fn is_experimental(&self) -> bool {
        self.experimental
    }

    #[must_use]
    pub fn runs_as_late_as_possible(&self) -> bool {
        self.visitor_modifiers
            .contains(&VisitorModifier::RunAsLateAsPossible)
    }

    /// A fresh rule instance.
    pub fn create_rule(&self) -> Result<Box<dyn Rule>, String> {
        (self.factory)()
    }
}

impl std::fmt::Debug for RuleProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleProvider")
            .field("rule_id", &self.rule_id)
            .field("visitor_modifiers", &self.visitor_modifiers)
            .field("uses_config_keys", &self.uses_config_keys)
            .field("required_code_style", &self.required_code_style)
            .field("experimental", &self.experimental)
            .finish_non_exhaustive()
    }
}

/// A named collection of rule providers, such as the standard rule set.
pub trait RuleSetProvider {
    /// Rule set id, the part before the `:` of its rule ids.
    fn id(&self) -> &str;

    fn rule_providers(&self) -> Vec<RuleProvider>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Empty;
    impl Rule for Empty {}

    #[test]
    fn test_rule_id_parts() {
        let id = RuleId::parse("standard:chain-wrapping").unwrap();
        assert_eq!(id.rule_set(), "standard");
        assert_eq!(id.name(), "chain-wrapping");
        assert_eq!(id.to_string(), "standard:chain-wrapping");
        assert!(id.is_valid());
    }

    #[test]
    fn test_rule_id_parse_rejects_malformed() {
        assert_eq!(
            RuleId::parse("chain-wrapping"),
            Err(InvalidRuleId("chain-wrapping".to_owned()))
        );
        assert!(!RuleId::new("Std:Rule").is_valid());
    }

    #[test]
    fn test_rule_ids_order_lexically() {
        let mut ids = vec![
            RuleId::new("b:a"),
            RuleId::new("a:z"),
            RuleId::new("a:b"),
        ];
        ids.sort();
        let ids: Vec<&str> = ids.iter().map(RuleId::as_str).collect();
        assert_eq!(ids, vec!["a:b", "a:z", "b:a"]);
    }

    #[test]
    fn test_provider_builder() {
        let provider = RuleProvider::new("custom:a", || Empty)
            .run_after("custom:b", RunAfterMode::OnlyIfActive)
            .run_as_late_as_possible()
            .run_as_late_as_possible()
            .uses_config_keys(&[ConfigKey::INDENT_SIZE, ConfigKey::INDENT_SIZE])
            .requires_code_style(CodeStyle::AndroidStudio)
            .experimental();

        assert_eq!(
            provider.visitor_modifiers(),
            &[
                VisitorModifier::RunAfterRule {
                    rule_id: RuleId::new("custom:b"),
                    mode: RunAfterMode::OnlyIfActive
                },
                VisitorModifier::RunAsLateAsPossible
            ]
        );
        assert!(provider.runs_as_late_as_possible());
        assert_eq!(provider.config_keys(), &[ConfigKey::INDENT_SIZE]);
        assert_eq!(
            provider.required_code_style(),
            Some(CodeStyle::AndroidStudio)
        );
        assert!(provider.is_experimental());
        assert!(provider.create_rule().is_ok());
    }

    #[test]
    fn test_failing_factory() {
        let provider = RuleProvider::try_new("custom:broken", || Err("missing data".to_owned()));
        assert_eq!(provider.create_rule().err(), Some("missing data".to_owned()));
    }
}
