//! Page rendering via `minijinja`.
//!
//! A page is two templates: an inner content template and an outer layout.
//! The content is rendered first and handed to the layout as `content`.
//! Templates are read from disk on every call so edits (and removals) take
//! effect on the next request without restarting the worker.

use std::path::{Path, PathBuf};

use minijinja::{Environment, ErrorKind, Value, context};

use crate::config::ViewPaths;
use crate::error::RenderError;

/// Renders the fixed page served by a route worker.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    views: ViewPaths,
}

impl PageRenderer {
    /// Create a renderer for the given layout and content templates.
    pub const fn new(views: ViewPaths) -> Self {
        Self { views }
    }

    /// Render the content template embedded in the layout.
    pub fn render(&self) -> Result<String, RenderError> {
        render_page(&self.views.content, &self.views.layout)
    }
}

/// Render `template` and substitute the result into `layout`.
///
/// # Errors
///
/// Returns [`RenderError::NotFound`] if either file is missing and
/// [`RenderError::Syntax`] if either contains malformed markup.
pub fn render_page(template: &Path, layout: &Path) -> Result<String, RenderError> {
    let layout_src = load_template(layout)?;
    let template_src = load_template(template)?;

    let env = Environment::new();
    let content = render_source(&env, template, &template_src, context! {})?;
    render_source(
        &env,
        layout,
        &layout_src,
        context! { content => Value::from_safe_string(content) },
    )
}

fn render_source<'source>(
    env: &Environment<'source>,
    path: &Path,
    source: &'source str,
    ctx: Value,
) -> Result<String, RenderError> {
    env.template_from_str(source)
        .and_then(|template| template.render(ctx))
        .map_err(|e| classify(path, e))
}

fn classify(path: &Path, source: minijinja::Error) -> RenderError {
    let path = PathBuf::from(path);
    if source.kind() == ErrorKind::SyntaxError {
        RenderError::Syntax { path, source }
    } else {
        RenderError::Render { path, source }
    }
}

/// Read a template file from disk.
fn load_template(path: &Path) -> Result<String, RenderError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            RenderError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            RenderError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(label: &str) -> PathBuf {
        let unique = format!(
            "polyblog_render_{label}_{}_{:?}",
            std::process::id(),
            std::thread::current().id(),
        );
        let dir = std::env::temp_dir().join(unique);
        std::fs::create_dir_all(&dir).ok();
        dir
    }

    fn write_views(dir: &Path, layout: &str, content: &str) -> ViewPaths {
        let views = ViewPaths {
            layout: dir.join("layout.html"),
            content: dir.join("content.html"),
        };
        std::fs::write(&views.layout, layout).ok();
        std::fs::write(&views.content, content).ok();
        views
    }

    #[test]
    fn content_is_embedded_in_layout_once() -> Result<(), RenderError> {
        let dir = scratch_dir("embed");
        let views = write_views(
            &dir,
            "<html><body>{{ content }}</body></html>",
            "<form>{% for field in [\"title\", \"content\"] %}<input name=\"{{ field }}\">{% endfor %}</form>",
        );

        let page = PageRenderer::new(views).render()?;
        let form = "<form><input name=\"title\"><input name=\"content\"></form>";
        assert_eq!(page, format!("<html><body>{form}</body></html>"));
        assert_eq!(page.matches(form).count(), 1);

        std::fs::remove_dir_all(&dir).ok();
        Ok(())
    }

    #[test]
    fn html_in_content_is_not_escaped() -> Result<(), RenderError> {
        let dir = scratch_dir("escape");
        let views = write_views(&dir, "<main>{{ content }}</main>", "<h1>New post</h1>");

        let page = render_page(&views.content, &views.layout)?;
        assert_eq!(page, "<main><h1>New post</h1></main>");

        std::fs::remove_dir_all(&dir).ok();
        Ok(())
    }

    #[test]
    fn rendering_is_deterministic() -> Result<(), RenderError> {
        let dir = scratch_dir("determinism");
        let views = write_views(&dir, "[{{ content }}]", "{{ 6 * 7 }}");

        let renderer = PageRenderer::new(views);
        assert_eq!(renderer.render()?, renderer.render()?);
        assert_eq!(renderer.render()?, "[42]");

        std::fs::remove_dir_all(&dir).ok();
        Ok(())
    }

    #[test]
    fn missing_content_template_is_not_found() {
        let dir = scratch_dir("missing_content");
        let views = write_views(&dir, "{{ content }}", "body");
        std::fs::remove_file(&views.content).ok();

        let result = PageRenderer::new(views.clone()).render();
        assert!(
            matches!(&result, Err(RenderError::NotFound { path }) if *path == views.content),
            "expected NotFound for content, got {result:?}"
        );

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_layout_is_not_found() {
        let dir = scratch_dir("missing_layout");
        let views = write_views(&dir, "{{ content }}", "body");
        std::fs::remove_file(&views.layout).ok();

        let result = PageRenderer::new(views.clone()).render();
        assert!(matches!(&result, Err(RenderError::NotFound { path }) if *path == views.layout));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn malformed_markup_is_a_syntax_error() {
        let dir = scratch_dir("syntax");
        let views = write_views(&dir, "{{ content }}", "{{ unclosed");

        let result = PageRenderer::new(views.clone()).render();
        assert!(matches!(&result, Err(RenderError::Syntax { path, .. }) if *path == views.content));

        std::fs::remove_dir_all(&dir).ok();
    }
}
