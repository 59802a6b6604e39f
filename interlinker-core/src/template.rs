//! Template rendering used to compile embedded pages.
use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::Result;

/// Renders embedded page content.
///
/// The host installs an implementation at configuration time; without one,
/// embeds of existing pages produce no content.
#[async_trait]
pub trait TemplateRenderer: Send + Sync {
  /// Wrap `content` in a template that renders it inside `layout`.
  fn wrap_in_layout(&self, layout: &str, content: &str) -> String;

  /// Render `template` through every language in `language`, in order.
  ///
  /// `language` is a comma separated list such as `tera,md`. `data` is the
  /// front matter of the embedded page.
  async fn compile(
    &self,
    template: &str,
    language: &str,
    data: &Map<String, Value>,
  ) -> Result<String>;
}

/// Render markdown to HTML with the options used for page bodies.
#[must_use]
pub fn markdown_to_html(markdown: &str) -> String {
  let mut options = comrak::options::Options::default();
  options.extension.table = true;
  options.extension.footnotes = true;
  options.extension.strikethrough = true;
  options.extension.tasklist = true;
  options.extension.autolink = true;
  options.render.r#unsafe = true;
  comrak::markdown_to_html(markdown, &options)
}

#[cfg(feature = "tera")]
pub use tera_renderer::TeraRenderer;

#[cfg(feature = "tera")]
mod tera_renderer {
  use std::path::Path;

  use async_trait::async_trait;
  use parking_lot::Mutex;
  use serde_json::{Map, Value};
  use tera::{Context, Tera};

  use super::{TemplateRenderer, markdown_to_html};
  use crate::error::{InterlinkError, Result};

  /// [`TemplateRenderer`] backed by Tera.
  ///
  /// Layouts are regular Tera templates exposing a `content` block.
  #[derive(Debug)]
  pub struct TeraRenderer {
    tera: Mutex<Tera>,
  }

  impl Default for TeraRenderer {
    fn default() -> Self {
      Self::new()
    }
  }

  impl TeraRenderer {
    /// Create a renderer with no layouts.
    #[must_use]
    pub fn new() -> Self {
      Self {
        tera: Mutex::new(Tera::default()),
      }
    }

    /// Create a renderer with every template under `dir` available as a
    /// layout, named by its path relative to `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if a template fails to parse.
    pub fn from_dir(dir: &Path) -> Result<Self> {
      let glob = format!("{}/**/*", dir.display());
      let tera = Tera::new(&glob)?;
      log::debug!(
        "Loaded {} layout templates from {}",
        tera.get_template_names().count(),
        dir.display()
      );
      Ok(Self {
        tera: Mutex::new(tera),
      })
    }

    /// Register a layout template named `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to parse.
    pub fn add_layout(&self, name: &str, source: &str) -> Result<()> {
      self.tera.lock().add_raw_template(name, source)?;
      Ok(())
    }

    fn render_tera(&self, template: &str, data: &Map<String, Value>) -> Result<String> {
      let context = Context::from_value(Value::Object(data.clone()))?;
      Ok(self.tera.lock().render_str(template, &context)?)
    }
  }

  #[async_trait]
  impl TemplateRenderer for TeraRenderer {
    fn wrap_in_layout(&self, layout: &str, content: &str) -> String {
      format!(
        "{{% extends \"{layout}\" %}}{{% block content %}}{content}{{% endblock \
         content %}}"
      )
    }

    async fn compile(
      &self,
      template: &str,
      language: &str,
      data: &Map<String, Value>,
    ) -> Result<String> {
      let mut output = template.to_string();
      for lang in language.split(',').map(str::trim) {
        output = match lang {
          "tera" => self.render_tera(&output, data)?,
          "md" | "markdown" => markdown_to_html(&output),
          "" | "html" => output,
          other => {
            return Err(InterlinkError::Template(format!(
              "Unsupported template language: {other}"
            )));
          },
        };
      }
      Ok(output)
    }
  }
}

#[cfg(all(test, feature = "tera"))]
mod tests {
  #![allow(clippy::expect_used, reason = "Fine in tests")]
  use serde_json::json;

  use super::*;

  fn data(value: Value) -> Map<String, Value> {
    value.as_object().cloned().unwrap_or_default()
  }

  #[tokio::test]
  async fn compiles_markdown_and_tera() {
    let renderer = TeraRenderer::new();
    let html = renderer
      .compile("# {{ title }}", "tera,md", &data(json!({ "title": "Hi" })))
      .await
      .expect("Failed to compile");
    assert_eq!(html.trim(), "<h1>Hi</h1>");
  }

  #[tokio::test]
  async fn wraps_content_in_layout() {
    let renderer = TeraRenderer::new();
    renderer
      .add_layout(
        "embed.html",
        "<div class=\"embed\">{% block content %}{% endblock content %}</div>",
      )
      .expect("Failed to add layout");

    let template = renderer.wrap_in_layout("embed.html", "Hello {{ name }}");
    let html = renderer
      .compile(&template, "tera", &data(json!({ "name": "world" })))
      .await
      .expect("Failed to compile");
    assert_eq!(html, "<div class=\"embed\">Hello world</div>");
  }

  #[tokio::test]
  async fn rejects_unknown_language() {
    let renderer = TeraRenderer::new();
    let err = renderer
      .compile("x", "liquid", &Map::new())
      .await
      .expect_err("liquid is not supported");
    assert!(err.to_string().contains("liquid"));
  }
}
