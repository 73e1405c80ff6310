//! Static output emission.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

use crate::assets::copy_into;
use crate::plan::{BuildPlan, PlanError, TemplateLoader};
use crate::templates::{inject_assets, PageContext, TemplateEngine};

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of HTML pages emitted
    pub pages: usize,

    /// Number of static files copied
    pub copied: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Failed to read: {0}")]
    ReadError(String),

    #[error("Failed to render template: {path}: {message}")]
    TemplateError { path: String, message: String },

    #[error("Failed to write output: {0}")]
    WriteError(String),

    #[error("Output {filename} is emitted by both {first} and {second}")]
    DuplicateOutput {
        filename: String,
        first: String,
        second: String,
    },

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// A page to be emitted.
#[derive(Debug)]
struct PageInfo<'a> {
    /// Template path on disk
    source_path: &'a Path,

    /// Template name relative to the template root
    template_name: String,

    /// Output path
    output_path: PathBuf,

    /// Output file name
    filename: &'a str,

    loader: TemplateLoader,
}

/// Emits the HTML pages and static copies described by a [`BuildPlan`].
pub struct StaticBuilder {
    plan: BuildPlan,
    output_dir: PathBuf,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a builder writing to the plan's output path.
    pub fn new(plan: BuildPlan) -> Self {
        let output_dir = plan.output.path.clone();
        Self::with_output_dir(plan, output_dir)
    }

    /// Create a builder writing to `output_dir` instead of the plan's path.
    pub fn with_output_dir(plan: BuildPlan, output_dir: PathBuf) -> Self {
        let templates = TemplateEngine::new(&plan.template_root);

        Self {
            plan,
            output_dir,
            templates,
        }
    }

    pub fn plan(&self) -> &BuildPlan {
        &self.plan
    }

    /// Emit every HTML output, then copy static directories.
    pub fn build(&self) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        fs::create_dir_all(&self.output_dir).map_err(|e| BuildError::WriteError(e.to_string()))?;

        let pages = self.collect_pages()?;

        let context_base = PageContext {
            mode: self.plan.mode.to_string(),
            bundle: self.plan.bundle_href().to_string(),
            styles: self.plan.stylesheet_hrefs(),
            filename: String::new(),
        };

        pages
            .par_iter()
            .map(|page| self.build_page(page, &context_base))
            .collect::<Result<Vec<()>, BuildError>>()?;

        let copied = self.copy_static()?;

        let duration = start.elapsed();

        Ok(BuildResult {
            pages: pages.len(),
            copied,
            duration_ms: duration.as_millis() as u64,
            output_dir: self.output_dir.clone(),
        })
    }

    /// Collect HTML outputs, rejecting two templates with the same output.
    fn collect_pages(&self) -> Result<Vec<PageInfo<'_>>, BuildError> {
        let mut seen: HashMap<&str, &Path> = HashMap::new();
        let mut pages = Vec::new();

        for (filename, source_path, loader) in self.plan.html_outputs() {
            if let Some(first) = seen.insert(filename, source_path) {
                return Err(BuildError::DuplicateOutput {
                    filename: filename.to_string(),
                    first: first.display().to_string(),
                    second: source_path.display().to_string(),
                });
            }

            let relative = source_path
                .strip_prefix(&self.plan.template_root)
                .unwrap_or(source_path);

            pages.push(PageInfo {
                source_path,
                template_name: relative.to_string_lossy().replace('\\', "/"),
                output_path: self.output_dir.join(filename),
                filename,
                loader,
            });
        }

        Ok(pages)
    }

    /// Load or render a single page, link its assets and write it.
    fn build_page(&self, page: &PageInfo<'_>, base: &PageContext) -> Result<(), BuildError> {
        let context = PageContext {
            filename: page.filename.to_string(),
            ..base.clone()
        };

        let rendered = match page.loader {
            TemplateLoader::Raw => fs::read_to_string(page.source_path).map_err(|e| {
                BuildError::ReadError(format!("{}: {}", page.source_path.display(), e))
            })?,
            TemplateLoader::Jinja => self
                .templates
                .render_page(&page.template_name, &context)
                .map_err(|e| BuildError::TemplateError {
                    path: page.source_path.display().to_string(),
                    message: e.to_string(),
                })?,
        };

        let html = inject_assets(&rendered, &context.bundle, &context.styles);

        fs::write(&page.output_path, html).map_err(|e| BuildError::WriteError(e.to_string()))?;

        tracing::debug!(
            "Emitted {} from {}",
            page.output_path.display(),
            page.source_path.display()
        );

        Ok(())
    }

    fn copy_static(&self) -> Result<usize, BuildError> {
        let mut copied = 0;

        for pattern in self.plan.copy_patterns() {
            let dest = self.output_dir.join(&pattern.to);
            copied += copy_into(&pattern.from, &dest)?;
            tracing::info!("Copied {} to {}", pattern.from.display(), dest.display());
        }

        Ok(copied)
    }
}
