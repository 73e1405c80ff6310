//! kiln CLI - front-end bundle configuration, template discovery and emission.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kiln_config::{load_config, KilnConfig, Mode, DEFAULT_CONFIG_FILE};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Front-end bundle configuration and template discovery")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to kiln.toml config file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Build mode, overriding NODE_ENV and the config file
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold kiln.toml and a source tree in the current directory
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// List HTML outputs discovered from templates
    Discover {
        /// Template root (defaults to config)
        #[arg(short, long)]
        root: Option<PathBuf>,

        /// Template glob (defaults to config)
        #[arg(short, long)]
        pattern: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the loader chains applied to files
    Resolve {
        /// Files to resolve
        #[arg(required = true)]
        files: Vec<String>,
    },

    /// Print the resolved build plan as JSON
    Plan,

    /// Emit HTML outputs and copy static assets
    Build {
        /// Output directory (defaults to config or "dist")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { yes } => {
            init_logging(cli.verbose, true);
            commands::init::run(&cli.config, yes)?;
        }
        Commands::Discover {
            root,
            pattern,
            json,
        } => {
            let config = setup(&cli.config, cli.mode, cli.verbose)?;
            commands::discover::run(&config, root, pattern, json)?;
        }
        Commands::Resolve { files } => {
            let config = setup(&cli.config, cli.mode, cli.verbose)?;
            commands::resolve::run(&config, &files)?;
        }
        Commands::Plan => {
            let config = setup(&cli.config, cli.mode, cli.verbose)?;
            commands::plan::run(&config)?;
        }
        Commands::Build { output } => {
            let config = setup(&cli.config, cli.mode, cli.verbose)?;
            commands::build::run(&config, output)?;
        }
    }

    Ok(())
}

/// Load the config file, apply the environment and `--mode`, then start
/// logging with the configured color setting.
fn setup(path: &Path, mode: Option<Mode>, verbose: bool) -> Result<KilnConfig> {
    let mut config = load_config(path)?;

    config
        .apply_env(|key| std::env::var(key).ok())
        .context("Invalid environment")?;

    if let Some(mode) = mode {
        config.mode = mode;
    }

    init_logging(verbose, config.stats.colors);
    log_config_source(path);
    tracing::debug!("Building in {} mode", config.mode);

    Ok(config)
}

/// Report which config file was used. Must run once logging is installed.
fn log_config_source(path: &Path) {
    if path.exists() {
        tracing::info!("Loaded config from {}", path.display());
    } else {
        tracing::debug!("No config at {}, using defaults", path.display());
    }
}

fn init_logging(verbose: bool, colors: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(colors)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn logged_at_info(path: &Path) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = fmt()
            .with_env_filter(EnvFilter::new("info"))
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        tracing::subscriber::with_default(subscriber, || log_config_source(path));

        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn reports_loaded_config_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("kiln.toml");
        std::fs::write(&path, "mode = \"production\"").unwrap();

        assert!(logged_at_info(&path).contains("Loaded config from"));
    }

    #[test]
    fn missing_config_is_quiet_at_info() {
        let temp = tempdir().unwrap();

        assert_eq!(logged_at_info(&temp.path().join("kiln.toml")), "");
    }
}
