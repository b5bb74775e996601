mod config;
mod error;
mod loader;
mod view;

pub use config::{CodeStyle, ConfigSnapshot, IndentStyle, RuleConfig, RuleSeverity};
pub use error::{ConfigError, Result};
pub use loader::{is_valid_rule_id, load_config, load_config_from_str};
pub use view::{ConfigKey, ConfigView, IndentConfig};
