//! Rule table: file patterns mapped to loader chains.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ConfigError;
use crate::mode::Mode;

/// Reference to a loader as written in the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LoaderRef {
    /// Bare loader name: `"css-loader"`
    Name(String),

    /// Loader with options: `{ loader = "file-loader", options = { ... } }`
    Detailed {
        loader: String,
        #[serde(default)]
        options: BTreeMap<String, Value>,
    },

    /// Loader chosen by mode: `{ development = "...", production = "..." }`
    ByMode {
        development: String,
        production: String,
    },
}

impl LoaderRef {
    /// Resolve this reference against the active mode.
    ///
    /// `none` picks the production loader.
    pub fn resolve(&self, mode: Mode) -> Loader {
        match self {
            Self::Name(name) => Loader::named(name),
            Self::Detailed { loader, options } => Loader {
                name: loader.clone(),
                options: options.clone(),
            },
            Self::ByMode {
                development,
                production,
            } => {
                if mode.is_development() {
                    Loader::named(development)
                } else {
                    Loader::named(production)
                }
            }
        }
    }
}

/// A loader with its options, after mode resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Loader {
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub options: BTreeMap<String, Value>,
}

impl Loader {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            options: BTreeMap::new(),
        }
    }
}

/// A rule as written in the configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleConfig {
    /// Regular expression tested against the file path
    pub test: String,

    /// Loaders applied to matching files, in order
    #[serde(rename = "use")]
    pub uses: Vec<LoaderRef>,
}

impl RuleConfig {
    pub fn new(test: &str, uses: Vec<LoaderRef>) -> Self {
        Self {
            test: test.to_string(),
            uses,
        }
    }
}

/// A rule with its test compiled.
#[derive(Debug, Clone)]
pub struct Rule {
    pub test: Regex,
    pub uses: Vec<LoaderRef>,
}

/// A rule after mode resolution, as forwarded to the bundler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRule {
    pub test: String,
    #[serde(rename = "use")]
    pub loaders: Vec<Loader>,
}

impl Rule {
    pub fn resolve(&self, mode: Mode) -> ResolvedRule {
        ResolvedRule {
            test: self.test.as_str().to_string(),
            loaders: self.uses.iter().map(|l| l.resolve(mode)).collect(),
        }
    }
}

/// Compiled rule table.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// Compile every rule's test expression.
    pub fn compile(configs: &[RuleConfig]) -> Result<Self, ConfigError> {
        let rules = configs
            .iter()
            .map(|config| {
                let test = Regex::new(&config.test).map_err(|e| ConfigError::InvalidRule {
                    test: config.test.clone(),
                    message: e.to_string(),
                })?;
                Ok(Rule {
                    test,
                    uses: config.uses.clone(),
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        Ok(Self { rules })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules whose test matches `path`, in table order.
    ///
    /// More than one rule may match (an `.svg` is both an image and a font).
    pub fn matching<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a Rule> + 'a {
        self.rules.iter().filter(move |rule| rule.test.is_match(path))
    }

    /// Resolve the loader chains applied to `path`.
    pub fn resolve(&self, path: &str, mode: Mode) -> Vec<ResolvedRule> {
        self.matching(path).map(|rule| rule.resolve(mode)).collect()
    }

    /// Resolve the whole table for the bundler.
    pub fn resolve_all(&self, mode: Mode) -> Vec<ResolvedRule> {
        self.rules.iter().map(|rule| rule.resolve(mode)).collect()
    }
}
