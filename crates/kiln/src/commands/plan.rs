//! Build plan command.

use anyhow::{Context, Result};
use kiln_config::KilnConfig;
use kiln_static::BuildPlan;

/// Run the plan command.
pub fn run(config: &KilnConfig) -> Result<()> {
    let plan = BuildPlan::from_config(config)?;

    let json = serde_json::to_string_pretty(&plan).context("Failed to serialize build plan")?;
    println!("{}", json);

    Ok(())
}
