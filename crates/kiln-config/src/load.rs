//! Loading kiln.toml.

use std::fs;
use std::path::Path;

use crate::config::{ConfigError, KilnConfig};
use crate::rules::RuleSet;

/// Configuration file looked up when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "kiln.toml";

/// Parse configuration from TOML source.
///
/// `origin` names the source in error messages.
pub fn parse_config(content: &str, origin: &str) -> Result<KilnConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse {
        path: origin.to_string(),
        message: e.to_string(),
    })
}

/// Load configuration from `path` if it exists.
///
/// A missing file yields the defaults. A file that exists but cannot be read
/// or parsed is an error. Relative paths in the result are resolved against
/// the directory holding `path`.
pub fn load_config(path: &Path) -> Result<KilnConfig, ConfigError> {
    let mut config = if path.exists() {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        parse_config(&content, &path.display().to_string())?
    } else {
        KilnConfig::default()
    };

    if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        config.rebase(base);
    }

    Ok(config)
}

/// Load, apply environment overrides, and validate.
pub fn resolve_config<F>(path: &Path, lookup: F) -> Result<(KilnConfig, RuleSet), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = load_config(path)?;
    config.apply_env(lookup)?;
    let rules = config.validate()?;

    Ok((config, rules))
}
