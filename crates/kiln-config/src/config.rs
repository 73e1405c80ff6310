//! Configuration model (kiln.toml).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mode::Mode;
use crate::rules::{LoaderRef, RuleConfig, RuleSet};

/// Complete build configuration.
///
/// Every field has a default, so an empty file (or no file at all) describes
/// the stock project layout: `src/js/app.js` and `src/style/main.scss` bundled
/// into `dist/`, HTML templates discovered under `src/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KilnConfig {
    #[serde(default)]
    pub mode: Mode,

    /// Entry points handed to the bundler
    #[serde(default = "default_entry")]
    pub entry: Vec<String>,

    #[serde(default)]
    pub output: OutputConfig,

    /// Rule table; replaces the default table entirely when present
    #[serde(default = "default_rules")]
    pub rules: Vec<RuleConfig>,

    /// Directories copied verbatim into the output
    #[serde(default = "default_copy")]
    pub copy: Vec<CopyPattern>,

    #[serde(default)]
    pub css: CssConfig,

    #[serde(default)]
    pub templates: TemplateConfig,

    #[serde(default)]
    pub stats: StatsConfig,

    #[serde(default)]
    pub dev_server: DevServerConfig,
}

impl Default for KilnConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            entry: default_entry(),
            output: OutputConfig::default(),
            rules: default_rules(),
            copy: default_copy(),
            css: CssConfig::default(),
            templates: TemplateConfig::default(),
            stats: StatsConfig::default(),
            dev_server: DevServerConfig::default(),
        }
    }
}

/// Where the bundle is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,

    /// Script bundle file name
    #[serde(default = "default_bundle_filename")]
    pub filename: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            filename: default_bundle_filename(),
        }
    }
}

/// A directory copied into the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopyPattern {
    pub from: PathBuf,
    /// Destination relative to the output directory
    pub to: PathBuf,
}

/// Stylesheet extraction settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CssConfig {
    /// Extracted stylesheet name; `[name]` is the chunk name
    #[serde(default = "default_css_filename")]
    pub filename: String,

    /// Legacy text-extraction output name
    #[serde(default = "default_extract_filename")]
    pub extract_filename: String,

    /// Register the CSS minimizer
    #[serde(default = "default_true")]
    pub minimize: bool,
}

impl Default for CssConfig {
    fn default() -> Self {
        Self {
            filename: default_css_filename(),
            extract_filename: default_extract_filename(),
            minimize: true,
        }
    }
}

/// Where HTML templates are discovered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default = "default_template_root")]
    pub root: PathBuf,

    /// Glob matched against paths relative to `root`
    #[serde(default = "default_template_pattern")]
    pub pattern: String,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            root: default_template_root(),
            pattern: default_template_pattern(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsConfig {
    #[serde(default = "default_true")]
    pub colors: bool,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self { colors: true }
    }
}

/// Development server options.
///
/// kiln does not run the server; these are forwarded to the bundler as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DevServerConfig {
    /// Directory served as static content
    #[serde(default = "default_content_base")]
    pub content_base: PathBuf,

    /// Reload when files under `content_base` change
    #[serde(default = "default_true")]
    pub watch_content_base: bool,

    /// Hot module replacement
    #[serde(default = "default_true")]
    pub hot: bool,

    /// Open a browser on start
    #[serde(default = "default_true")]
    pub open: bool,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,
}

impl Default for DevServerConfig {
    fn default() -> Self {
        Self {
            content_base: default_content_base(),
            watch_content_base: true,
            hot: true,
            open: true,
            port: default_port(),
            host: default_host(),
        }
    }
}

impl KilnConfig {
    /// Apply `NODE_ENV`, `PORT` and `HOST` from `lookup`.
    ///
    /// Unset and empty variables leave the current value in place.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(mode) = get("NODE_ENV") {
            self.mode = mode.parse()?;
            tracing::debug!("Mode {} taken from NODE_ENV", self.mode);
        }

        if let Some(port) = get("PORT") {
            self.dev_server.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port.clone()))?;
        }

        if let Some(host) = get("HOST") {
            self.dev_server.host = host;
        }

        Ok(())
    }

    /// Check the configuration and compile its rule table.
    pub fn validate(&self) -> Result<RuleSet, ConfigError> {
        if self.entry.is_empty() {
            return Err(ConfigError::Empty("entry"));
        }
        if self.output.filename.trim().is_empty() {
            return Err(ConfigError::Empty("output.filename"));
        }
        if self.css.filename.trim().is_empty() {
            return Err(ConfigError::Empty("css.filename"));
        }
        if self.templates.pattern.trim().is_empty() {
            return Err(ConfigError::Empty("templates.pattern"));
        }
        kiln_templates::compile_pattern(&self.templates.pattern).map_err(|e| {
            ConfigError::InvalidPattern {
                pattern: self.templates.pattern.clone(),
                message: e.to_string(),
            }
        })?;
        if self.dev_server.port == 0 {
            return Err(ConfigError::InvalidPort("0".to_string()));
        }

        RuleSet::compile(&self.rules)
    }

    /// Resolve relative filesystem paths against `base`.
    ///
    /// Covers `output.path`, `templates.root`, every `copy[].from` and
    /// `dev_server.content_base`. Copy destinations stay relative to the
    /// output directory, and entries are left for the bundler.
    pub fn rebase(&mut self, base: &Path) {
        fn join(base: &Path, path: &mut PathBuf) {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }

        join(base, &mut self.output.path);
        join(base, &mut self.templates.root);
        join(base, &mut self.dev_server.content_base);
        for pattern in &mut self.copy {
            join(base, &mut pattern.from);
        }
    }
}

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid mode {0:?}: expected development, production or none")]
    InvalidMode(String),

    #[error("Invalid port {0:?}")]
    InvalidPort(String),

    #[error("Invalid template pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("Invalid rule test {test:?}: {message}")]
    InvalidRule { test: String, message: String },

    #[error("Configuration field `{0}` must not be empty")]
    Empty(&'static str),
}

fn default_entry() -> Vec<String> {
    vec![
        "./src/js/app.js".to_string(),
        "./src/style/main.scss".to_string(),
    ]
}

/// The stock rule table: scripts, raw HTML, Sass, images and fonts.
pub fn default_rules() -> Vec<RuleConfig> {
    vec![
        RuleConfig::new(r"\.js$", vec![LoaderRef::Name("babel-loader".into())]),
        RuleConfig::new(r"\.html$", vec![LoaderRef::Name("raw-loader".into())]),
        RuleConfig::new(
            r"\.(sass|scss)$",
            vec![
                LoaderRef::ByMode {
                    development: "style-loader".into(),
                    production: "mini-css-extract-loader".into(),
                },
                LoaderRef::Name("css-loader".into()),
                LoaderRef::Name("postcss-loader".into()),
                LoaderRef::Name("sass-loader".into()),
            ],
        ),
        RuleConfig::new(
            r"\.(pdf|gif|png|jpe?g|svg)$",
            vec![file_loader(&[("outputPath", "static/")])],
        ),
        RuleConfig::new(
            r"\.(woff(2)?|ttf|eot|svg)(\?v=\d+\.\d+\.\d+)?$",
            vec![file_loader(&[
                ("name", "[name].[ext]"),
                ("outputPath", "fonts/"),
            ])],
        ),
    ]
}

fn file_loader(options: &[(&str, &str)]) -> LoaderRef {
    LoaderRef::Detailed {
        loader: "file-loader".into(),
        options: options
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect::<BTreeMap<_, _>>(),
    }
}

fn default_copy() -> Vec<CopyPattern> {
    vec![CopyPattern {
        from: PathBuf::from("./src/static"),
        to: PathBuf::from("./static"),
    }]
}

fn default_output_path() -> PathBuf {
    PathBuf::from("dist")
}
fn default_bundle_filename() -> String {
    "app.bundle.js".to_string()
}
fn default_css_filename() -> String {
    "[name].css".to_string()
}
fn default_extract_filename() -> String {
    "styles.css".to_string()
}
fn default_template_root() -> PathBuf {
    PathBuf::from("./src")
}
fn default_template_pattern() -> String {
    "**/*.html".to_string()
}
fn default_content_base() -> PathBuf {
    PathBuf::from("src")
}
fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "localhost".to_string()
}
fn default_true() -> bool {
    true
}
