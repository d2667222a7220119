//! Template rendering.

use click_core::{escape_html, Context, RenderModel, Result, RESERVED_MODEL_KEYS};
use serde_json::Value;

/// Turns a processed page's render model into a response body.
pub trait TemplateRenderer: Send + Sync {
    /// Render the model for the request in `ctx` into an HTML body.
    fn render(&self, model: &RenderModel, ctx: &Context) -> Result<String>;
}

impl<F> TemplateRenderer for F
where
    F: Fn(&RenderModel, &Context) -> Result<String> + Send + Sync,
{
    fn render(&self, model: &RenderModel, ctx: &Context) -> Result<String> {
        self(model, ctx)
    }
}

/// Head section of the document shell.
#[derive(Debug, Clone, Default)]
pub struct HeadContent {
    /// Document title.
    pub title: Option<String>,
    /// Character set declared in a `<meta charset>` tag.
    pub charset: Option<String>,
    /// Meta tags as name/content pairs.
    pub meta: Vec<(String, String)>,
    /// Raw link, style and script elements.
    pub links: Vec<String>,
}

impl HeadContent {
    /// Create head content with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    /// Add a meta tag.
    pub fn with_meta(mut self, name: &str, content: &str) -> Self {
        self.meta.push((name.to_string(), content.to_string()));
        self
    }

    /// Add a stylesheet link.
    pub fn with_stylesheet(mut self, href: &str) -> Self {
        self.links.push(format!(
            r#"<link rel="stylesheet" href="{}">"#,
            escape_html(href)
        ));
        self
    }

    /// Add a raw head element.
    pub fn with_import(mut self, html: impl Into<String>) -> Self {
        self.links.push(html.into());
        self
    }

    /// Render the head content.
    pub fn render(&self) -> String {
        let mut html = String::new();

        if let Some(charset) = &self.charset {
            html.push_str(&format!("<meta charset=\"{}\">\n", escape_html(charset)));
        }
        if let Some(title) = &self.title {
            html.push_str(&format!("<title>{}</title>\n", escape_html(title)));
        }
        for (name, content) in &self.meta {
            html.push_str(&format!(
                "<meta name=\"{}\" content=\"{}\">\n",
                escape_html(name),
                escape_html(content)
            ));
        }
        for link in &self.links {
            html.push_str(link);
            html.push('\n');
        }

        html
    }
}

/// Default renderer: a plain HTML document with the page title, control
/// imports in the head, model values and rendered controls in the body.
#[derive(Debug, Clone)]
pub struct ShellRenderer {
    charset: String,
    stylesheets: Vec<String>,
    body_start: String,
    body_end: String,
}

impl Default for ShellRenderer {
    fn default() -> Self {
        Self::new("UTF-8")
    }
}

impl ShellRenderer {
    /// Create a renderer declaring `charset`.
    pub fn new(charset: impl Into<String>) -> Self {
        Self {
            charset: charset.into(),
            stylesheets: Vec::new(),
            body_start: "<body>\n<main>\n".to_string(),
            body_end: "</main>\n</body>\n</html>".to_string(),
        }
    }

    /// Link a stylesheet from every page.
    pub fn with_stylesheet(mut self, href: impl Into<String>) -> Self {
        self.stylesheets.push(href.into());
        self
    }

    /// Set custom body start HTML.
    pub fn with_body_start(mut self, html: impl Into<String>) -> Self {
        self.body_start = html.into();
        self
    }

    /// Set custom body end HTML.
    pub fn with_body_end(mut self, html: impl Into<String>) -> Self {
        self.body_end = html.into();
        self
    }

    fn head(&self, model: &RenderModel) -> HeadContent {
        let mut head = HeadContent {
            title: model.title.clone(),
            charset: Some(self.charset.clone()),
            ..Default::default()
        };
        for href in &self.stylesheets {
            head = head.with_stylesheet(href);
        }
        for import in &model.imports {
            head = head.with_import(import.clone());
        }
        head
    }

    fn render_value(html: &mut String, name: &str, value: &Value) {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        html.push_str(&format!(
            "<div id=\"{}\" class=\"model\">{}</div>\n",
            escape_html(name),
            escape_html(&text)
        ));
    }
}

impl TemplateRenderer for ShellRenderer {
    fn render(&self, model: &RenderModel, _ctx: &Context) -> Result<String> {
        let mut html = String::from("<!DOCTYPE html>\n<html>\n<head>\n");
        html.push_str(&self.head(model).render());
        html.push_str("</head>\n");
        html.push_str(&self.body_start);

        if let Some(title) = &model.title {
            html.push_str(&format!("<h1>{}</h1>\n", escape_html(title)));
        }
        for (name, value) in &model.data {
            if model.controls.contains_key(name) || RESERVED_MODEL_KEYS.contains(&name.as_str()) {
                continue;
            }
            Self::render_value(&mut html, name, value);
        }
        for control in model.controls.values() {
            html.push_str(control);
            html.push('\n');
        }

        html.push_str(&self.body_end);
        Ok(html)
    }
}
