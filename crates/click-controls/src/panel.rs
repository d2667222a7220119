//! Named container of child controls.

use click_core::{
    impl_as_any, to_label, ClickError, Context, Control, ControlRegistry, HtmlStringBuffer,
    Model, Result,
};
use serde::Serialize;

/// Container with its own model and uniquely named children.
///
/// A panel processes and renders its children in insertion order inside a
/// `<div>`, with an optional heading.
#[derive(Debug, Default)]
pub struct Panel {
    name: String,
    id: Option<String>,
    label: Option<String>,
    show_label: bool,
    controls: ControlRegistry,
    model: Model,
}

impl Panel {
    /// Create an empty panel.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the HTML id; defaults to the name.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the heading text and show it.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self.show_label = true;
        self
    }

    /// Show a heading, derived from the name when no label is set.
    pub fn with_heading(mut self, show: bool) -> Self {
        self.show_label = show;
        self
    }

    /// Heading text.
    pub fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| to_label(&self.name))
    }

    /// Add a child control. Names must be unique within the panel.
    pub fn add<C: Control>(&mut self, control: C) -> Result<()> {
        if self.model.contains_key(control.name()) {
            return Err(ClickError::DuplicateModel(control.name().to_string()));
        }
        self.controls.add(control)
    }

    /// The children.
    pub fn controls(&self) -> &ControlRegistry {
        &self.controls
    }

    /// Typed child lookup.
    pub fn control<T: Control>(&self, name: &str) -> Option<&T> {
        self.controls.get::<T>(name)
    }

    /// Typed mutable child lookup.
    pub fn control_mut<T: Control>(&mut self, name: &str) -> Option<&mut T> {
        self.controls.get_mut::<T>(name)
    }

    /// Add a model value. Fails if the name is already used.
    pub fn add_model(&mut self, name: impl Into<String>, value: impl Serialize) -> Result<()> {
        let name = name.into();
        if self.model.contains_key(&name) || self.controls.contains(&name) {
            return Err(ClickError::DuplicateModel(name));
        }
        self.model.insert(name, serde_json::to_value(value)?);
        Ok(())
    }

    /// The panel model.
    pub fn model(&self) -> &Model {
        &self.model
    }
}

impl Control for Panel {
    fn name(&self) -> &str {
        &self.name
    }

    fn id(&self) -> String {
        self.id.clone().unwrap_or_else(|| self.name.clone())
    }

    fn on_init(&mut self, ctx: &mut Context) -> Result<()> {
        self.controls.init_all(ctx)
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        self.controls.bind(ctx);
    }

    fn on_process(&mut self, ctx: &mut Context) -> bool {
        self.controls.process_all(ctx)
    }

    fn on_render(&mut self, ctx: &Context) {
        self.controls.render_all(ctx);
    }

    fn on_destroy(&mut self) {
        self.controls.destroy_all();
    }

    fn render(&self, ctx: &Context, buffer: &mut HtmlStringBuffer) {
        buffer
            .element_start("div")
            .append_attribute("id", self.id())
            .append_attribute("class", "panel")
            .close_tag()
            .append("\n");
        if self.show_label {
            buffer
                .append("<h3>")
                .append_escaped(self.label())
                .append("</h3>\n");
        }
        for control in self.controls.iter() {
            control.render(ctx, buffer);
            buffer.append("\n");
        }
        buffer.append("</div>");
    }

    fn html_imports(&self, ctx: &Context) -> Option<String> {
        let imports = self.controls.html_imports(ctx);
        if imports.is_empty() {
            None
        } else {
            Some(imports.join("\n"))
        }
    }

    impl_as_any!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::{ActionLink, PageLink};
    use click_core::mock::MockContext;

    fn panel() -> Panel {
        let mut panel = Panel::new("sidebar").with_label("Links");
        panel.add(PageLink::new("home", "/home.htm")).unwrap();
        panel
            .add(ActionLink::new("refresh").with_listener("on_refresh"))
            .unwrap();
        panel
    }

    #[test]
    fn test_unique_names() {
        let mut panel = panel();
        assert!(matches!(
            panel.add(PageLink::new("home", "/x.htm")),
            Err(ClickError::DuplicateControl(_))
        ));

        panel.add_model("count", 3).unwrap();
        assert!(matches!(
            panel.add_model("home", 1),
            Err(ClickError::DuplicateModel(_))
        ));
        assert!(matches!(
            panel.add(ActionLink::new("count")),
            Err(ClickError::DuplicateModel(_))
        ));
    }

    #[test]
    fn test_processes_children() {
        let mut panel = panel();
        let mut ctx = MockContext::get("/").param("actionLink", "refresh").build();

        assert!(panel.on_process(&mut ctx));
        assert!(panel.control::<ActionLink>("refresh").unwrap().is_clicked());
        assert_eq!(ctx.dispatcher().pending()[0].listener, "on_refresh");
    }

    #[test]
    fn test_render() {
        let panel = panel();
        let html = panel.to_html(&MockContext::get("/p.htm").build());

        assert!(html.starts_with("<div id=\"sidebar\" class=\"panel\">\n<h3>Links</h3>\n"));
        assert!(html.contains("<a href=\"/home.htm\" id=\"home\">Home</a>\n"));
        assert!(html.contains("Refresh</a>"));
        assert!(html.ends_with("</div>"));
    }
}
