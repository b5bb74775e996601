//! Standard rule set for lintkit.
//!
//! ```rust
//! use lintkit_linter::RuleRegistry;
//! use lintkit_ruleset_standard::StandardRuleSetProvider;
//!
//! let registry = RuleRegistry::from_rule_sets(&[&StandardRuleSetProvider]).unwrap();
//! assert_eq!(registry.len(), 3);
//! ```

mod rules;

pub use rules::{BlankLineBeforeDeclarationRule, ChainWrappingRule, ParameterListSpacingRule};

use lintkit_linter::{RuleProvider, RuleSetProvider};

/// Id of the standard rule set.
pub const RULE_SET_ID: &str = "standard";

/// Provides every rule of the `standard` rule set.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRuleSetProvider;

impl RuleSetProvider for StandardRuleSetProvider {
    fn id(&self) -> &str {
        RULE_SET_ID
    }

    fn rule_providers(&self) -> Vec<RuleProvider> {
        vec![
            BlankLineBeforeDeclarationRule::provider(),
            ChainWrappingRule::provider(),
            ParameterListSpacingRule::provider(),
        ]
    }
}
