//! Trait definitions for output registration.

use std::path::PathBuf;

use serde::Serialize;

use crate::discovery::TemplateEntry;

/// Instruction to emit one additional output file from one template.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct OutputDirective {
    /// File name of the generated output (e.g., "index.html")
    pub output_name: String,

    /// Template the output is generated from
    pub source_path: PathBuf,
}

impl From<TemplateEntry> for OutputDirective {
    fn from(entry: TemplateEntry) -> Self {
        Self {
            output_name: entry.output_name,
            source_path: entry.source_path,
        }
    }
}

/// Sink for output directives.
///
/// Implemented by whatever keeps the bundler's plugin list; discovery calls
/// [`register`](OutputRegistrar::register) once per discovered template.
pub trait OutputRegistrar {
    /// Register one output directive.
    fn register(&mut self, directive: OutputDirective);
}

impl OutputRegistrar for Vec<OutputDirective> {
    fn register(&mut self, directive: OutputDirective) {
        self.push(directive);
    }
}

impl<R: OutputRegistrar + ?Sized> OutputRegistrar for &mut R {
    fn register(&mut self, directive: OutputDirective) {
        (**self).register(directive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directive_from_entry_keeps_names() {
        let entry = TemplateEntry::new("src/pages/about.html").unwrap();
        let directive = OutputDirective::from(entry);

        assert_eq!(directive.output_name, "about.html");
        assert_eq!(directive.source_path, PathBuf::from("src/pages/about.html"));
    }

    fn register_index(mut registrar: impl OutputRegistrar) {
        registrar.register(OutputDirective {
            output_name: "index.html".to_string(),
            source_path: PathBuf::from("src/index.html"),
        });
    }

    #[test]
    fn vec_collects_registrations_through_mut_ref() {
        let mut outputs: Vec<OutputDirective> = Vec::new();
        register_index(&mut outputs);

        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].output_name, "index.html");
    }
}
