//! Configuration for kiln builds.
//!
//! Holds the typed form of a bundle configuration (entries, output, rule
//! table, copy patterns, CSS extraction, template discovery, dev server),
//! loads it from `kiln.toml`, applies environment overrides, and resolves
//! file paths to loader chains.

pub mod config;
pub mod load;
pub mod mode;
pub mod rules;

pub use config::{
    ConfigError, CopyPattern, CssConfig, DevServerConfig, KilnConfig, OutputConfig, StatsConfig,
    TemplateConfig,
};
pub use load::{load_config, parse_config, resolve_config, DEFAULT_CONFIG_FILE};
pub use mode::Mode;
pub use rules::{Loader, LoaderRef, ResolvedRule, Rule, RuleConfig, RuleSet};
