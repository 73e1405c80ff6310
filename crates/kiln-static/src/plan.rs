//! Build plan: the resolved configuration handed to the bundler.

use std::path::{Path, PathBuf};

use serde::Serialize;

use kiln_config::{
    ConfigError, CopyPattern, DevServerConfig, KilnConfig, Mode, OutputConfig, ResolvedRule,
    RuleSet, StatsConfig,
};
use kiln_templates::{register_outputs, DiscoveryError, OutputDirective, OutputRegistrar};

/// Chunk name substituted for `[name]` in extracted stylesheet names.
const MAIN_CHUNK: &str = "main";

/// Loader that opts a template into rendering.
pub const JINJA_LOADER: &str = "jinja-loader";

/// How an HTML template becomes its output page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateLoader {
    /// Emitted as-is, like `raw-loader`
    #[default]
    Raw,

    /// Rendered with minijinja
    Jinja,
}

impl TemplateLoader {
    /// Pick the loader for `template` from the rules that match it.
    pub fn for_template(rules: &RuleSet, template: &Path, mode: Mode) -> Self {
        let path = template.to_string_lossy();
        let jinja = rules
            .resolve(&path, mode)
            .iter()
            .flat_map(|rule| &rule.loaders)
            .any(|loader| loader.name == JINJA_LOADER);

        if jinja {
            Self::Jinja
        } else {
            Self::Raw
        }
    }
}

/// A plugin registration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "plugin", rename_all = "snake_case")]
pub enum Plugin {
    /// Copy directories into the output
    Copy { patterns: Vec<CopyPattern> },

    /// Extract stylesheets into separate files
    MiniCssExtract { filename: String },

    HotModuleReplacement,

    /// Legacy single-file stylesheet extraction
    ExtractText { filename: String },

    /// Emit `filename` from an HTML template
    Html {
        filename: String,
        template: PathBuf,
        loader: TemplateLoader,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Minimizer {
    OptimizeCssAssets,
}

/// Ordered plugin list.
///
/// Receives one [`Plugin::Html`] per discovered template through
/// [`OutputRegistrar`]. Templates are emitted raw unless `rules` route them
/// through [`JINJA_LOADER`].
#[derive(Debug, Clone, Default)]
pub struct PluginRegistry {
    plugins: Vec<Plugin>,
    rules: RuleSet,
    mode: Mode,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that picks each template's loader from `rules`.
    pub fn with_rules(rules: RuleSet, mode: Mode) -> Self {
        Self {
            plugins: Vec::new(),
            rules,
            mode,
        }
    }

    pub fn push(&mut self, plugin: Plugin) {
        self.plugins.push(plugin);
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    pub fn into_plugins(self) -> Vec<Plugin> {
        self.plugins
    }

    fn has_html_output(&self, name: &str) -> bool {
        self.plugins
            .iter()
            .any(|p| matches!(p, Plugin::Html { filename, .. } if filename == name))
    }
}

impl OutputRegistrar for PluginRegistry {
    fn register(&mut self, directive: OutputDirective) {
        if self.has_html_output(&directive.output_name) {
            tracing::warn!(
                "Template {} emits {}, which another template already emits",
                directive.source_path.display(),
                directive.output_name
            );
        }

        let loader =
            TemplateLoader::for_template(&self.rules, &directive.source_path, self.mode);

        self.plugins.push(Plugin::Html {
            filename: directive.output_name,
            template: directive.source_path,
            loader,
        });
    }
}

/// Resolved build configuration.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    pub mode: Mode,
    pub entry: Vec<String>,
    pub output: OutputConfig,
    pub rules: Vec<ResolvedRule>,
    pub minimizers: Vec<Minimizer>,
    pub plugins: Vec<Plugin>,
    /// Directory templates were discovered in
    pub template_root: PathBuf,
    pub stats: StatsConfig,
    pub dev_server: DevServerConfig,
}

impl BuildPlan {
    /// Validate `config`, discover templates, and assemble the plugin list.
    ///
    /// Static plugins come first, followed by one HTML plugin per template in
    /// path order.
    pub fn from_config(config: &KilnConfig) -> Result<Self, PlanError> {
        let rules = config.validate()?;
        let resolved = rules.resolve_all(config.mode);

        let mut registry = PluginRegistry::with_rules(rules, config.mode);

        if !config.copy.is_empty() {
            registry.push(Plugin::Copy {
                patterns: config.copy.clone(),
            });
        }
        registry.push(Plugin::MiniCssExtract {
            filename: config.css.filename.clone(),
        });
        registry.push(Plugin::HotModuleReplacement);
        registry.push(Plugin::ExtractText {
            filename: config.css.extract_filename.clone(),
        });

        let templates = register_outputs(
            &config.templates.root,
            &config.templates.pattern,
            &mut registry,
        )?;

        tracing::info!(
            "Registered {} HTML outputs from {}",
            templates,
            config.templates.root.display()
        );

        let minimizers = if config.css.minimize {
            vec![Minimizer::OptimizeCssAssets]
        } else {
            vec![]
        };

        Ok(Self {
            mode: config.mode,
            entry: config.entry.clone(),
            output: config.output.clone(),
            rules: resolved,
            minimizers,
            plugins: registry.into_plugins(),
            template_root: config.templates.root.clone(),
            stats: config.stats.clone(),
            dev_server: config.dev_server.clone(),
        })
    }

    /// HTML outputs as `(filename, template, loader)` triples.
    pub fn html_outputs(&self) -> impl Iterator<Item = (&str, &Path, TemplateLoader)> {
        self.plugins.iter().filter_map(|plugin| match plugin {
            Plugin::Html {
                filename,
                template,
                loader,
            } => Some((filename.as_str(), template.as_path(), *loader)),
            _ => None,
        })
    }

    /// Copy patterns from the copy plugin.
    pub fn copy_patterns(&self) -> impl Iterator<Item = &CopyPattern> {
        self.plugins
            .iter()
            .filter_map(|plugin| match plugin {
                Plugin::Copy { patterns } => Some(patterns.iter()),
                _ => None,
            })
            .flatten()
    }

    /// Script URL referenced by emitted pages.
    pub fn bundle_href(&self) -> &str {
        &self.output.filename
    }

    /// Stylesheet URLs referenced by emitted pages.
    ///
    /// Development builds inject styles from the script bundle, so only
    /// production and `none` builds link an extracted stylesheet.
    pub fn stylesheet_hrefs(&self) -> Vec<String> {
        if self.mode.is_development() {
            return vec![];
        }

        self.plugins
            .iter()
            .filter_map(|plugin| match plugin {
                Plugin::MiniCssExtract { filename } => Some(filename.replace("[name]", MAIN_CHUNK)),
                _ => None,
            })
            .collect()
    }
}

/// Errors that can occur while building a plan.
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_config::{LoaderRef, RuleConfig};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn config_for(root: &Path) -> KilnConfig {
        let mut config = KilnConfig::default();
        config.templates.root = root.join("src");
        config.copy = vec![];
        config
    }

    fn write(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<html><head></head><body></body></html>").unwrap();
    }

    #[test]
    fn registers_one_html_plugin_per_template() {
        let temp = tempdir().unwrap();
        write(&temp.path().join("src/index.html"));
        write(&temp.path().join("src/pages/about.html"));
        write(&temp.path().join("src/js/app.js"));

        let plan = BuildPlan::from_config(&config_for(temp.path())).unwrap();

        let outputs: Vec<&str> = plan.html_outputs().map(|(name, _, _)| name).collect();
        assert_eq!(outputs, vec!["index.html", "about.html"]);
    }

    #[test]
    fn static_plugins_precede_html_plugins() {
        let temp = tempdir().unwrap();
        write(&temp.path().join("src/index.html"));

        let plan = BuildPlan::from_config(&config_for(temp.path())).unwrap();

        assert_eq!(
            plan.plugins[..3].to_vec(),
            vec![
                Plugin::MiniCssExtract {
                    filename: "[name].css".to_string()
                },
                Plugin::HotModuleReplacement,
                Plugin::ExtractText {
                    filename: "styles.css".to_string()
                },
            ]
        );
        assert!(matches!(plan.plugins.last(), Some(Plugin::Html { .. })));
    }

    #[test]
    fn registers_hot_module_replacement_even_when_hot_disabled() {
        let temp = tempdir().unwrap();
        let mut config = config_for(temp.path());
        config.dev_server.hot = false;

        let plan = BuildPlan::from_config(&config).unwrap();

        assert!(plan.plugins.contains(&Plugin::HotModuleReplacement));
        assert!(!plan.dev_server.hot);
    }

    #[test]
    fn templates_default_to_raw_loader() {
        let temp = tempdir().unwrap();
        write(&temp.path().join("src/index.html"));

        let plan = BuildPlan::from_config(&config_for(temp.path())).unwrap();

        let loaders: Vec<TemplateLoader> = plan.html_outputs().map(|(_, _, l)| l).collect();
        assert_eq!(loaders, vec![TemplateLoader::Raw]);
    }

    #[test]
    fn jinja_rule_opts_templates_into_rendering() {
        let temp = tempdir().unwrap();
        write(&temp.path().join("src/index.html"));
        write(&temp.path().join("src/plain.htm"));
        let mut config = config_for(temp.path());
        config.templates.pattern = "**/*.htm*".to_string();
        config.rules[1] = RuleConfig::new(
            r"\.html$",
            vec![LoaderRef::Name(JINJA_LOADER.to_string())],
        );

        let plan = BuildPlan::from_config(&config).unwrap();

        let outputs: Vec<(&str, TemplateLoader)> =
            plan.html_outputs().map(|(name, _, l)| (name, l)).collect();
        assert_eq!(
            outputs,
            vec![
                ("index.html", TemplateLoader::Jinja),
                ("plain.htm", TemplateLoader::Raw),
            ]
        );
    }

    #[test]
    fn missing_template_root_registers_no_html() {
        let temp = tempdir().unwrap();

        let plan = BuildPlan::from_config(&config_for(temp.path())).unwrap();

        assert_eq!(plan.html_outputs().count(), 0);
        assert!(!plan.plugins.is_empty());
    }

    #[test]
    fn invalid_template_pattern_fails() {
        let temp = tempdir().unwrap();
        let mut config = config_for(temp.path());
        config.templates.pattern = "[oops".to_string();

        let result = BuildPlan::from_config(&config);

        assert!(matches!(
            result,
            Err(PlanError::Config(ConfigError::InvalidPattern { .. }))
        ));
    }

    #[test]
    fn stylesheets_linked_only_outside_development() {
        let temp = tempdir().unwrap();
        let mut config = config_for(temp.path());

        let dev = BuildPlan::from_config(&config).unwrap();
        assert!(dev.stylesheet_hrefs().is_empty());

        config.mode = Mode::Production;
        let prod = BuildPlan::from_config(&config).unwrap();
        assert_eq!(prod.stylesheet_hrefs(), vec!["main.css".to_string()]);
    }

    #[test]
    fn rules_resolved_for_mode() {
        let temp = tempdir().unwrap();
        let mut config = config_for(temp.path());
        config.mode = Mode::Production;

        let plan = BuildPlan::from_config(&config).unwrap();

        let sass = plan
            .rules
            .iter()
            .find(|r| r.test.contains("scss"))
            .unwrap();
        assert_eq!(sass.loaders[0].name, "mini-css-extract-loader");
    }

    #[test]
    fn minimizer_follows_css_setting() {
        let temp = tempdir().unwrap();
        let mut config = config_for(temp.path());

        assert_eq!(
            BuildPlan::from_config(&config).unwrap().minimizers,
            vec![Minimizer::OptimizeCssAssets]
        );

        config.css.minimize = false;
        assert!(BuildPlan::from_config(&config).unwrap().minimizers.is_empty());
    }

    #[test]
    fn registry_keeps_duplicate_output_names() {
        let mut registry = PluginRegistry::new();
        for dir in ["a", "b"] {
            registry.register(OutputDirective {
                output_name: "index.html".to_string(),
                source_path: PathBuf::from(dir).join("index.html"),
            });
        }

        assert_eq!(registry.plugins().len(), 2);
    }

    #[test]
    fn plan_serializes_plugin_tags() {
        let temp = tempdir().unwrap();
        write(&temp.path().join("src/index.html"));

        let plan = BuildPlan::from_config(&config_for(temp.path())).unwrap();
        let json = serde_json::to_value(&plan).unwrap();

        let tags: Vec<&str> = json["plugins"]
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["plugin"].as_str().unwrap())
            .collect();
        assert_eq!(
            tags,
            vec!["mini_css_extract", "hot_module_replacement", "extract_text", "html"]
        );
        assert_eq!(json["mode"], "development");
        assert_eq!(json["plugins"][3]["loader"], "raw");
    }
}
