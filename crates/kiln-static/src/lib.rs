//! Build plans and static output emission for kiln.
//!
//! Resolves a configuration into the plugin list handed to the bundler and
//! emits the outputs that need no compilation: discovered HTML templates and
//! copied static directories.

pub mod assets;
pub mod builder;
pub mod plan;
pub mod templates;

pub use builder::{BuildError, BuildResult, StaticBuilder};
pub use plan::{
    BuildPlan, Minimizer, PlanError, Plugin, PluginRegistry, TemplateLoader, JINJA_LOADER,
};
