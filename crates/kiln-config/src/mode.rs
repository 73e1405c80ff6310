//! Build mode.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Operating mode of a build.
///
/// Parsing ignores case and surrounding whitespace, whether the value comes
/// from `NODE_ENV`, `--mode` or kiln.toml.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Mode {
    #[default]
    Development,
    Production,
    None,
}

impl Mode {
    /// Whether development-only behavior (in-page style injection) applies.
    pub fn is_development(self) -> bool {
        self == Self::Development
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::None => "none",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "none" => Ok(Self::None),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

impl TryFrom<String> for Mode {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_modes() {
        assert_eq!("development".parse::<Mode>().unwrap(), Mode::Development);
        assert_eq!("Production".parse::<Mode>().unwrap(), Mode::Production);
        assert_eq!("none".parse::<Mode>().unwrap(), Mode::None);
    }

    #[test]
    fn rejects_unknown_mode() {
        let result = "staging".parse::<Mode>();

        assert!(matches!(result, Err(ConfigError::InvalidMode(m)) if m == "staging"));
    }

    #[test]
    fn deserializes_any_case() {
        let modes: Vec<Mode> =
            serde_json::from_str(r#"["Production", "DEVELOPMENT", " none "]"#).unwrap();

        assert_eq!(modes, vec![Mode::Production, Mode::Development, Mode::None]);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Mode::Production).unwrap(), "\"production\"");
    }

    #[test]
    fn only_development_is_development() {
        assert!(Mode::Development.is_development());
        assert!(!Mode::Production.is_development());
        assert!(!Mode::None.is_development());
    }
}
