//! Template discovery command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use kiln_config::KilnConfig;
use kiln_templates::discover_outputs;

/// Run the discover command.
pub fn run(
    config: &KilnConfig,
    root: Option<PathBuf>,
    pattern: Option<String>,
    json: bool,
) -> Result<()> {
    let root = root.unwrap_or_else(|| config.templates.root.clone());
    let pattern = pattern.unwrap_or_else(|| config.templates.pattern.clone());

    let outputs = discover_outputs(&root, &pattern)?;

    if json {
        let json = serde_json::to_string_pretty(&outputs).context("Failed to serialize outputs")?;
        println!("{}", json);
        return Ok(());
    }

    for directive in &outputs {
        println!(
            "{} <- {}",
            directive.output_name,
            directive.source_path.display()
        );
    }

    tracing::info!(
        "{} templates matching {} under {}",
        outputs.len(),
        pattern,
        root.display()
    );

    Ok(())
}
