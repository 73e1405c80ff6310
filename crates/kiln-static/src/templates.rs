//! Template rendering and asset tag injection for HTML outputs.

use std::path::Path;

use minijinja::{context, path_loader, Environment};
use serde::Serialize;

/// Values exposed to templates as `kiln.*`.
#[derive(Debug, Clone, Serialize)]
pub struct PageContext {
    /// Build mode ("development", "production", "none")
    pub mode: String,
    /// Script bundle URL
    pub bundle: String,
    /// Extracted stylesheet URLs
    pub styles: Vec<String>,
    /// Output file name of the page being rendered
    pub filename: String,
}

/// Template engine using minijinja.
///
/// Templates are loaded by path relative to the template root, so a page can
/// `{% include %}` partials that live next to it.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    pub fn new(template_root: &Path) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(template_root));

        Self { env }
    }

    /// Render the template at `name` (relative to the template root).
    pub fn render_page(
        &self,
        name: &str,
        context: &PageContext,
    ) -> Result<String, minijinja::Error> {
        let tmpl = self.env.get_template(name)?;

        tmpl.render(context! { kiln => context })
    }
}

/// Insert stylesheet links before `</head>` and the bundle script before
/// `</body>`.
///
/// A page without `</head>` gets its links prepended; a page without
/// `</body>` gets the script appended.
pub fn inject_assets(html: &str, bundle: &str, styles: &[String]) -> String {
    let mut output = html.to_string();

    if !styles.is_empty() {
        let links: String = styles
            .iter()
            .map(|href| format!(r#"<link href="{}" rel="stylesheet">"#, href))
            .collect();

        output = match find_tag(&output, "</head>") {
            Some(pos) => splice(&output, pos, &links),
            None => format!("{}{}", links, output),
        };
    }

    let script = format!(r#"<script src="{}"></script>"#, bundle);
    output = match find_tag(&output, "</body>") {
        Some(pos) => splice(&output, pos, &script),
        None => format!("{}{}", output, script),
    };

    output
}

/// Byte offset of the last case-insensitive occurrence of `tag`.
fn find_tag(html: &str, tag: &str) -> Option<usize> {
    html.to_ascii_lowercase().rfind(tag)
}

fn splice(html: &str, pos: usize, snippet: &str) -> String {
    let mut result = String::with_capacity(html.len() + snippet.len());
    result.push_str(&html[..pos]);
    result.push_str(snippet);
    result.push_str(&html[pos..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn context() -> PageContext {
        PageContext {
            mode: "production".to_string(),
            bundle: "app.bundle.js".to_string(),
            styles: vec!["main.css".to_string()],
            filename: "index.html".to_string(),
        }
    }

    #[test]
    fn renders_context_values() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("index.html"),
            "<title>{{ kiln.filename }} ({{ kiln.mode }})</title>",
        )
        .unwrap();

        let engine = TemplateEngine::new(temp.path());
        let html = engine.render_page("index.html", &context()).unwrap();

        assert_eq!(html, "<title>index.html (production)</title>");
    }

    #[test]
    fn renders_included_partials() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("partials")).unwrap();
        fs::write(temp.path().join("partials/nav.html"), "<nav>menu</nav>").unwrap();
        fs::write(
            temp.path().join("index.html"),
            r#"<body>{% include "partials/nav.html" %}</body>"#,
        )
        .unwrap();

        let engine = TemplateEngine::new(temp.path());
        let html = engine.render_page("index.html", &context()).unwrap();

        assert_eq!(html, "<body><nav>menu</nav></body>");
    }

    #[test]
    fn missing_template_is_an_error() {
        let temp = tempdir().unwrap();

        let engine = TemplateEngine::new(temp.path());

        assert!(engine.render_page("nope.html", &context()).is_err());
    }

    #[test]
    fn injects_links_and_script() {
        let html = "<html><head><title>x</title></head><body><p>hi</p></body></html>";

        let result = inject_assets(html, "app.bundle.js", &["main.css".to_string()]);

        assert_eq!(
            result,
            concat!(
                "<html><head><title>x</title>",
                r#"<link href="main.css" rel="stylesheet">"#,
                "</head><body><p>hi</p>",
                r#"<script src="app.bundle.js"></script>"#,
                "</body></html>"
            )
        );
    }

    #[test]
    fn appends_script_without_body() {
        let result = inject_assets("<p>fragment</p>", "app.bundle.js", &[]);

        assert_eq!(result, r#"<p>fragment</p><script src="app.bundle.js"></script>"#);
    }

    #[test]
    fn matches_uppercase_tags() {
        let result = inject_assets("<BODY></BODY>", "a.js", &[]);

        assert_eq!(result, r#"<BODY><script src="a.js"></script></BODY>"#);
    }
}
