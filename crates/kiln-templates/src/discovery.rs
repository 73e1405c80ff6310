//! Template discovery.
//!
//! Walks a template root, matches every file's root-relative path against a
//! glob pattern, and turns each match into a [`TemplateEntry`]. A missing root
//! is not an error: it simply has no templates.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use walkdir::{DirEntry, WalkDir};

use crate::traits::{OutputDirective, OutputRegistrar};

/// A discovered template file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplateEntry {
    /// Path of the template on disk
    pub source_path: PathBuf,

    /// Last component of `source_path`
    pub output_name: String,
}

impl TemplateEntry {
    /// Create an entry for a template path.
    ///
    /// Returns `None` when the path has no final component (e.g. `/` or `..`).
    pub fn new(source_path: impl Into<PathBuf>) -> Option<Self> {
        let source_path = source_path.into();
        let output_name = output_name_for(&source_path)?;

        Some(Self {
            source_path,
            output_name,
        })
    }
}

/// Derive the output file name for a template path.
pub fn output_name_for(path: &Path) -> Option<String> {
    path.file_name().map(|name| name.to_string_lossy().into_owned())
}

/// Compile a discovery pattern.
///
/// `*` crosses directory separators, so `*.html` matches `a/b/page.html`.
/// A leading `./` is ignored.
pub fn compile_pattern(pattern: &str) -> Result<GlobMatcher, DiscoveryError> {
    let normalized = pattern.strip_prefix("./").unwrap_or(pattern);

    Glob::new(normalized)
        .map(|glob| glob.compile_matcher())
        .map_err(|e| DiscoveryError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

/// Whether a walked entry is hidden (its name starts with `.`).
///
/// The root itself is never hidden, so `.` and `./src` can be walked.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

/// Find every file under `root` whose relative path matches `pattern`.
///
/// Hidden files and everything inside hidden directories are skipped.
/// Entries are sorted by source path. A root that does not exist (or is not a
/// directory) yields an empty list.
pub fn discover_templates(
    root: &Path,
    pattern: &str,
) -> Result<Vec<TemplateEntry>, DiscoveryError> {
    let matcher = compile_pattern(pattern)?;

    if !root.is_dir() {
        tracing::debug!(
            "Template root {} is not a directory, no templates discovered",
            root.display()
        );
        return Ok(Vec::new());
    }

    let mut entries = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if !matcher.is_match(relative) {
            continue;
        }

        if let Some(template) = TemplateEntry::new(path) {
            entries.push(template);
        }
    }

    entries.sort();

    tracing::debug!(
        "Discovered {} templates matching {} under {}",
        entries.len(),
        pattern,
        root.display()
    );

    Ok(entries)
}

/// Discover templates and convert them to output directives.
pub fn discover_outputs(
    root: &Path,
    pattern: &str,
) -> Result<Vec<OutputDirective>, DiscoveryError> {
    Ok(discover_templates(root, pattern)?
        .into_iter()
        .map(OutputDirective::from)
        .collect())
}

/// Discover templates and register one directive per template.
///
/// Returns the number of directives registered.
pub fn register_outputs<R>(
    root: &Path,
    pattern: &str,
    registrar: &mut R,
) -> Result<usize, DiscoveryError>
where
    R: OutputRegistrar + ?Sized,
{
    let outputs = discover_outputs(root, pattern)?;
    let count = outputs.len();

    for directive in outputs {
        registrar.register(directive);
    }

    Ok(count)
}

/// Errors that can occur during discovery.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Invalid template pattern {pattern:?}: {message}")]
    InvalidPattern { pattern: String, message: String },
}
