use crate::view::{ConfigKey, ConfigView};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Code style a project is formatted with.
///
/// Some rules only apply to one code style; the engine disables them for
/// every other style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeStyle {
    IntellijIdea,
    AndroidStudio,
    #[default]
    KtlintOfficial,
}

impl CodeStyle {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IntellijIdea => "intellij_idea",
            Self::AndroidStudio => "android_studio",
            Self::KtlintOfficial => "ktlint_official",
        }
    }
}

impl std::fmt::Display for CodeStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndentStyle {
    #[default]
    Space,
    Tab,
}

impl IndentStyle {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Space => "space",
            Self::Tab => "tab",
        }
    }
}

/// Severity level for a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum RuleSeverity {
    Off,
    Warn,
    Error,
}

/// Configuration for a single rule
///
/// Supports multiple formats:
/// ```yaml
/// # Simple severity
/// standard:chain-wrapping: warn
///
/// # Object style with options
/// custom:max-depth:
///   severity: warn
///   options:
///     limit: 3
///
/// # Array style: [severity, options]
/// custom:max-depth: [error, { limit: 3 }]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleConfig {
    /// Just a severity level
    Severity(RuleSeverity),

    /// Severity with rule specific options
    Detailed {
        severity: RuleSeverity,
        #[serde(skip_serializing_if = "Option::is_none")]
        options: Option<serde_json::Value>,
    },
}

impl RuleConfig {
    #[must_use]
    pub fn severity(&self) -> RuleSeverity {
        match self {
            Self::Severity(s) | Self::Detailed { severity: s, .. } => *s,
        }
    }

    #[must_use]
    pub fn options(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Severity(_) => None,
            Self::Detailed { options, .. } => options.as_ref(),
        }
    }
}

/// Custom deserializer for `RuleConfig` to accept the string, array and
/// object forms
impl<'de> Deserialize<'de> for RuleConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{self, MapAccess, SeqAccess, Visitor};

        struct RuleConfigVisitor;

        impl<'de> Visitor<'de> for RuleConfigVisitor {
            type Value = RuleConfig;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str(
                    "a severity string ('off', 'warn', 'error'), \
                     an array [severity, options], \
                     or an object { severity, options }",
                )
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let severity = match value {
                    "off" => RuleSeverity::Off,
                    "warn" => RuleSeverity::Warn,
                    "error" => RuleSeverity::Error,
                    _ => return Err(E::custom(format!("unknown severity: {value}"))),
                };
                Ok(RuleConfig::Severity(severity))
            }

            // YAML 1.1 readers turn a bare `off` into `false`
            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                if value {
                    Err(E::custom("use 'warn' or 'error' to enable a rule"))
                } else {
                    Ok(RuleConfig::Severity(RuleSeverity::Off))
                }
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let severity: RuleSeverity = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &"array with severity"))?;

                let options: Option<serde_json::Value> = seq.next_element()?;

                Ok(RuleConfig::Detailed { severity, options })
            }

            fn visit_map<A>(self, map: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                #[derive(Deserialize)]
                struct DetailedConfig {
                    severity: RuleSeverity,
                    #[serde(default)]
                    options: Option<serde_json::Value>,
                }

                let config =
                    DetailedConfig::deserialize(de::value::MapAccessDeserializer::new(map))?;
                Ok(RuleConfig::Detailed {
                    severity: config.severity,
                    options: config.options,
                })
            }
        }

        deserializer.deserialize_any(RuleConfigVisitor)
    }
}

/// Resolved configuration for one file.
///
/// Discovering and merging configuration files is the job of the host; the
/// engine only ever sees the final snapshot, and every rule observes the same
/// snapshot for the whole file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigSnapshot {
    pub code_style: CodeStyle,

    pub indent_style: IndentStyle,

    pub indent_size: usize,

    /// `None` means lines may be arbitrarily long
    #[serde(
        deserialize_with = "deserialize_max_line_length",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_line_length: Option<usize>,

    /// Run rules that are marked experimental
    pub experimental: bool,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub rules: HashMap<String, RuleConfig>,

    /// Free-form properties for rules that declare their own config keys
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, serde_json::Value>,
}

impl Default for ConfigSnapshot {
    fn default() -> Self {
        Self {
            code_style: CodeStyle::default(),
            indent_style: IndentStyle::default(),
            indent_size: 4,
            max_line_length: None,
            experimental: false,
            rules: HashMap::new(),
            properties: BTreeMap::new(),
        }
    }
}

/// Accepts a positive number, or `off` / a negative number for "unlimited"
fn deserialize_max_line_length<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(i64),
        Text(String),
        Flag(bool),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None | Some(Raw::Flag(false)) => Ok(None),
        Some(Raw::Number(n)) if n <= 0 => Ok(None),
        Some(Raw::Number(n)) => Ok(usize::try_from(n).ok()),
        Some(Raw::Text(text)) if text == "off" => Ok(None),
        Some(Raw::Text(text)) => text
            .parse()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid max_line_length: {text}"))),
        Some(Raw::Flag(true)) => Err(serde::de::Error::custom(
            "max_line_length must be a number or 'off'",
        )),
    }
}

impl ConfigSnapshot {
    #[must_use]
    pub fn with_code_style(mut self, code_style: CodeStyle) -> Self {
        self.code_style = code_style;
        self
    }

    #[must_use]
    pub fn with_indent(mut self, indent_style: IndentStyle, indent_size: usize) -> Self {
        self.indent_style = indent_style;
        self.indent_size = indent_size;
        self
    }

    #[must_use]
    pub fn with_max_line_length(mut self, max_line_length: Option<usize>) -> Self {
        self.max_line_length = max_line_length;
        self
    }

    #[must_use]
    pub fn with_experimental(mut self, experimental: bool) -> Self {
        self.experimental = experimental;
        self
    }

    #[must_use]
    pub fn with_rule(mut self, rule_id: impl Into<String>, config: RuleConfig) -> Self {
        self.rules.insert(rule_id.into(), config);
        self
    }

    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Configured severity for a rule, `None` when the rule is not mentioned
    #[must_use]
    pub fn severity(&self, rule_id: &str) -> Option<RuleSeverity> {
        self.rules.get(rule_id).map(RuleConfig::severity)
    }

    #[must_use]
    pub fn rule_options(&self, rule_id: &str) -> Option<&serde_json::Value> {
        self.rules.get(rule_id).and_then(RuleConfig::options)
    }

    /// Rules are enabled unless explicitly turned off
    #[must_use]
    pub fn is_rule_disabled(&self, rule_id: &str) -> bool {
        self.severity(rule_id) == Some(RuleSeverity::Off)
    }

    /// Value of a config key, as seen by rules
    pub(crate) fn value_of(&self, key: ConfigKey) -> Option<serde_json::Value> {
        match key {
            ConfigKey::CODE_STYLE => Some(self.code_style.as_str().into()),
            ConfigKey::INDENT_STYLE => Some(self.indent_style.as_str().into()),
            ConfigKey::INDENT_SIZE => Some(self.indent_size.into()),
            ConfigKey::MAX_LINE_LENGTH => self.max_line_length.map(Into::into),
            other => self.properties.get(other.name()).cloned(),
        }
    }

    /// The part of this snapshot a rule is allowed to see: the keys it
    /// declared plus its own options.
    #[must_use]
    pub fn view_for(&self, rule_id: &str, keys: &[ConfigKey]) -> ConfigView {
        ConfigView::restricted(self, rule_id, keys)
    }
}
