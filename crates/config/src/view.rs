use crate::{CodeStyle, ConfigSnapshot, IndentStyle};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

/// Name of a configuration value a rule can declare that it reads.
///
/// The built-in keys map onto the typed fields of [`ConfigSnapshot`]; any
/// other key is looked up in its free-form `properties`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigKey {
    name: &'static str,
}

impl ConfigKey {
    pub const CODE_STYLE: Self = Self::new("code_style");
    pub const INDENT_STYLE: Self = Self::new("indent_style");
    pub const INDENT_SIZE: Self = Self::new("indent_size");
    pub const MAX_LINE_LENGTH: Self = Self::new("max_line_length");

    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        Self { name }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        self.name
    }
}

impl std::fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Indentation settings derived from the indent keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentConfig {
    pub style: IndentStyle,
    pub size: usize,
}

impl Default for IndentConfig {
    fn default() -> Self {
        Self {
            style: IndentStyle::Space,
            size: 4,
        }
    }
}

impl IndentConfig {
    /// Text of a single indentation level.
    #[must_use]
    pub fn unit(&self) -> String {
        match self.style {
            IndentStyle::Space => " ".repeat(self.size),
            IndentStyle::Tab => String::from("\t"),
        }
    }

    /// Indent one level deeper than `indent`, which is usually the result of
    /// `SyntaxTree::indent` and starts with a newline.
    #[must_use]
    pub fn child_indent_of(&self, indent: &str) -> String {
        format!("{indent}{}", self.unit())
    }
}

/// Read-only slice of a [`ConfigSnapshot`] handed to one rule.
///
/// Only keys the rule declared are visible, together with the options
/// configured for that rule. The code style is always visible.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigView {
    rule_id: String,
    code_style: CodeStyle,
    /// Declared keys; `None` when the key is declared but has no value
    values: BTreeMap<ConfigKey, Option<serde_json::Value>>,
    options: Option<serde_json::Value>,
}

impl ConfigView {
    pub(crate) fn restricted(snapshot: &ConfigSnapshot, rule_id: &str, keys: &[ConfigKey]) -> Self {
        let values = keys
            .iter()
            .map(|key| (*key, snapshot.value_of(*key)))
            .collect();
        Self {
            rule_id: rule_id.to_owned(),
            code_style: snapshot.code_style,
            values,
            options: snapshot.rule_options(rule_id).cloned(),
        }
    }

    /// Id of the rule this view was built for
    #[must_use]
    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    #[must_use]
    pub fn code_style(&self) -> CodeStyle {
        self.code_style
    }

    #[must_use]
    pub fn is_declared(&self, key: ConfigKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Value of a declared key. Undeclared keys always read as `None`.
    #[must_use]
    pub fn get(&self, key: ConfigKey) -> Option<&serde_json::Value> {
        self.values.get(&key).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn get_usize(&self, key: ConfigKey) -> Option<usize> {
        self.get(key)
            .and_then(serde_json::Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
    }

    #[must_use]
    pub fn get_str(&self, key: ConfigKey) -> Option<&str> {
        self.get(key).and_then(serde_json::Value::as_str)
    }

    /// Indentation settings, falling back to four spaces for undeclared keys.
    #[must_use]
    pub fn indent_config(&self) -> IndentConfig {
        let default = IndentConfig::default();
        let style = match self.get_str(ConfigKey::INDENT_STYLE) {
            Some("tab") => IndentStyle::Tab,
            Some(_) => IndentStyle::Space,
            None => default.style,
        };
        IndentConfig {
            style,
            size: self
                .get_usize(ConfigKey::INDENT_SIZE)
                .unwrap_or(default.size),
        }
    }

    /// Maximum line length, `None` when unlimited or undeclared.
    #[must_use]
    pub fn max_line_length(&self) -> Option<usize> {
        self.get_usize(ConfigKey::MAX_LINE_LENGTH)
    }

    /// Options configured for this rule, if any.
    #[must_use]
    pub fn options(&self) -> Option<&serde_json::Value> {
        self.options.as_ref()
    }

    /// Typed lookup of one option. Missing or mistyped options read as `None`.
    #[must_use]
    pub fn option<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let value = self.options.as_ref()?.get(name)?;
        serde_json::from_value(value.clone()).ok()
    }
}
