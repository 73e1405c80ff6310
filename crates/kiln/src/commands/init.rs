//! Initialize a kiln project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Files created by `kiln init`, relative to the project root.
const SCAFFOLD: &[(&str, &str)] = &[
    ("src/index.html", DEFAULT_INDEX),
    ("src/js/app.js", DEFAULT_APP_JS),
    ("src/style/main.scss", DEFAULT_MAIN_SCSS),
    ("src/static/.gitkeep", ""),
];

/// Run the init command.
pub fn run(config_path: &Path, yes: bool) -> Result<()> {
    tracing::info!("Initializing kiln...");

    let root = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));

    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());

    for (relative, content) in SCAFFOLD {
        let path = root.join(relative);
        if path.exists() && !yes {
            tracing::debug!("Keeping existing {}", path.display());
            continue;
        }

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!("Created {}", path.display());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Run 'kiln build' to emit pages into dist/.");

    Ok(())
}

const DEFAULT_CONFIG: &str = r#"# kiln configuration
# NODE_ENV, PORT and HOST override mode, dev_server.port and dev_server.host.

mode = "development"
entry = ["./src/js/app.js", "./src/style/main.scss"]

[output]
path = "dist"
filename = "app.bundle.js"

[[copy]]
from = "./src/static"
to = "./static"

[css]
filename = "[name].css"
extract_filename = "styles.css"
minimize = true

[templates]
# Every file under root matching pattern becomes an output page
root = "./src"
pattern = "**/*.html"

[stats]
colors = true

[dev_server]
content_base = "src"
watch_content_base = true
hot = true
open = true
port = 3000
host = "localhost"
"#;

const DEFAULT_INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Hello kiln</title>
</head>
<body>
  <h1>Hello kiln</h1>
  <p>Edit src/index.html and run kiln build.</p>
</body>
</html>
"#;

const DEFAULT_APP_JS: &str = r#"document.addEventListener("DOMContentLoaded", () => {
  console.log("kiln app loaded");
});
"#;

const DEFAULT_MAIN_SCSS: &str = r#"$text: #222;

body {
  font-family: system-ui, sans-serif;
  color: $text;
}
"#;
