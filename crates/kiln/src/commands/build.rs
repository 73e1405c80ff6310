//! Static emission command.

use std::path::PathBuf;

use anyhow::Result;
use kiln_config::KilnConfig;
use kiln_static::{BuildPlan, StaticBuilder};

/// Run the build command.
pub fn run(config: &KilnConfig, output: Option<PathBuf>) -> Result<()> {
    tracing::info!("Building in {} mode...", config.mode);

    let plan = BuildPlan::from_config(config)?;
    let output_dir = output.unwrap_or_else(|| plan.output.path.clone());

    let result = StaticBuilder::with_output_dir(plan, output_dir).build()?;

    tracing::info!(
        "Emitted {} pages and copied {} files in {}ms",
        result.pages,
        result.copied,
        result.duration_ms
    );

    tracing::info!("Output: {}", result.output_dir.display());

    Ok(())
}
