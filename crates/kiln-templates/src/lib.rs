//! Template discovery for kiln builds.
//!
//! Scans a source tree for template files and turns every match into an
//! output directive that a plugin registry can consume.

pub mod discovery;
pub mod traits;

pub use discovery::{
    compile_pattern, discover_outputs, discover_templates, output_name_for, register_outputs,
    DiscoveryError, TemplateEntry,
};
pub use traits::{OutputDirective, OutputRegistrar};
