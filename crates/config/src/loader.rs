use crate::{ConfigError, ConfigSnapshot, Result};
use std::fs;
use std::path::Path;

/// `true` for ids of the form `<rule-set>:<rule-name>`, where both parts are
/// non-empty and made of lower-case letters, digits and `-`.
#[must_use]
pub fn is_valid_rule_id(rule_id: &str) -> bool {
    let valid_part = |part: &str| {
        !part.is_empty()
            && part
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    };
    match rule_id.split_once(':') {
        Some((rule_set, name)) => valid_part(rule_set) && valid_part(name),
        None => false,
    }
}

/// Load a config snapshot from the specified path.
/// Automatically detects the format based on file extension.
#[tracing::instrument(fields(path = %path.display()))]
pub fn load_config(path: &Path) -> Result<ConfigSnapshot> {
    tracing::debug!("Reading config file");
    let contents = fs::read_to_string(path)?;
    let config = load_config_from_str(&contents, path)?;
    tracing::info!(
        code_style = %config.code_style,
        rules = config.rules.len(),
        "Config loaded successfully"
    );
    Ok(config)
}

/// Load a config snapshot from a string.
/// The path is used for error messages and format detection.
#[tracing::instrument(skip(contents), fields(path = %path.display(), size = contents.len()))]
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<ConfigSnapshot> {
    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("");

    tracing::debug!(extension, file_name, "Detecting config format");

    let config = match extension {
        "yml" | "yaml" => {
            tracing::trace!("Parsing as YAML");
            parse_yaml(contents, path)?
        }
        "json" => {
            tracing::trace!("Parsing as JSON");
            parse_json(contents, path)?
        }
        "" if file_name == ".lintkitrc" => {
            tracing::trace!("Trying YAML then JSON for .lintkitrc");
            parse_yaml(contents, path).or_else(|_| parse_json(contents, path))?
        }
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    validate_config(&config, path)?;

    Ok(config)
}

fn parse_yaml(contents: &str, path: &Path) -> Result<ConfigSnapshot> {
    // An empty document means "all defaults"
    if contents.trim().is_empty() {
        return Ok(ConfigSnapshot::default());
    }
    serde_saphyr::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("YAML parse error: {e}"),
    })
}

fn parse_json(contents: &str, path: &Path) -> Result<ConfigSnapshot> {
    serde_json::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("JSON parse error: {e}"),
    })
}

#[tracing::instrument(skip(config, path), fields(path = %path.display(), rules = config.rules.len()))]
fn validate_config(config: &ConfigSnapshot, path: &Path) -> Result<()> {
    if config.indent_size == 0 {
        return Err(ConfigError::Invalid {
            path: path.to_path_buf(),
            message: "indent_size must be greater than zero".to_owned(),
        });
    }

    let mut rule_ids: Vec<&String> = config.rules.keys().collect();
    rule_ids.sort();
    for rule_id in rule_ids {
        if !is_valid_rule_id(rule_id) {
            return Err(ConfigError::InvalidRuleId {
                path: path.to_path_buf(),
                rule_id: rule_id.clone(),
            });
        }
    }

    tracing::debug!("Config validation passed");
    Ok(())
}
