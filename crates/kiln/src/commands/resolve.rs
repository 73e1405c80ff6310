//! Loader resolution command.

use anyhow::Result;
use kiln_config::KilnConfig;

/// Run the resolve command.
pub fn run(config: &KilnConfig, files: &[String]) -> Result<()> {
    let rules = config.validate()?;

    for file in files {
        let resolved = rules.resolve(file, config.mode);

        if resolved.is_empty() {
            println!("{}: no matching rule", file);
            continue;
        }

        for rule in resolved {
            let chain: Vec<&str> = rule.loaders.iter().map(|l| l.name.as_str()).collect();
            println!("{}: {} ({})", file, chain.join(" -> "), rule.test);
        }
    }

    Ok(())
}
