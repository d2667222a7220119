//! The `Control` trait and the named-children registry.

use std::any::Any;
use std::fmt;

use indexmap::IndexMap;

use crate::context::Context;
use crate::error::{ClickError, Result};
use crate::html::HtmlStringBuffer;

/// A component of the page tree that binds request data, processes events
/// and renders itself as HTML.
///
/// Controls are rebuilt for every request, so they hold plain owned state.
pub trait Control: Any {
    /// Control name, unique within its parent container.
    fn name(&self) -> &str;

    /// HTML id attribute value.
    fn id(&self) -> String {
        self.name().to_string()
    }

    /// Called once after the page is initialized.
    fn on_init(&mut self, _ctx: &mut Context) -> Result<()> {
        Ok(())
    }

    /// Copy the matching request parameter into the control's value.
    ///
    /// A missing parameter leaves the current value untouched.
    fn bind_request_value(&mut self, _ctx: &Context) {}

    /// Bind, validate and queue any action event.
    ///
    /// Returns `false` to stop processing the rest of the page.
    fn on_process(&mut self, ctx: &mut Context) -> bool {
        self.bind_request_value(ctx);
        true
    }

    /// Called before the page is rendered.
    fn on_render(&mut self, _ctx: &Context) {}

    /// Called when the request is finished, even on error.
    fn on_destroy(&mut self) {}

    /// Write the control's HTML.
    fn render(&self, ctx: &Context, buffer: &mut HtmlStringBuffer);

    /// Stylesheet or script elements the control needs in the page head.
    fn html_imports(&self, _ctx: &Context) -> Option<String> {
        None
    }

    /// Render the control into a new string.
    fn to_html(&self, ctx: &Context) -> String {
        let mut buffer = HtmlStringBuffer::with_capacity(128);
        self.render(ctx, &mut buffer);
        buffer.into_string()
    }

    /// Upcast for typed lookup.
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for typed lookup.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Implement [`Control::as_any`] and [`Control::as_any_mut`] inside a
/// `Control` impl block.
#[macro_export]
macro_rules! impl_as_any {
    () => {
        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }
    };
}

/// Ordered children of a container, keyed by unique name.
#[derive(Default)]
pub struct ControlRegistry {
    controls: IndexMap<String, Box<dyn Control>>,
}

impl ControlRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a control.
    ///
    /// Fails when the name is blank or already taken.
    pub fn add<C: Control>(&mut self, control: C) -> Result<()> {
        self.add_boxed(Box::new(control))
    }

    /// Add a boxed control.
    pub fn add_boxed(&mut self, control: Box<dyn Control>) -> Result<()> {
        let name = control.name();
        if name.trim().is_empty() {
            return Err(ClickError::BlankControlName);
        }
        if self.contains(name) {
            return Err(ClickError::DuplicateControl(name.to_string()));
        }
        self.controls.insert(name.to_string(), control);
        Ok(())
    }

    /// Remove a control by name, keeping the order of the rest.
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Control>> {
        self.controls.shift_remove(name)
    }

    /// Check whether a control with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.controls.contains_key(name)
    }

    /// Look up a control by name.
    pub fn control(&self, name: &str) -> Option<&dyn Control> {
        self.controls.get(name).map(|c| c.as_ref())
    }

    /// Look up a control by name, mutably.
    pub fn control_mut(&mut self, name: &str) -> Option<&mut dyn Control> {
        self.controls.get_mut(name).map(|c| c.as_mut())
    }

    /// Look up a control by name and concrete type.
    pub fn get<T: Control>(&self, name: &str) -> Option<&T> {
        self.control(name)?.as_any().downcast_ref::<T>()
    }

    /// Look up a control by name and concrete type, mutably.
    pub fn get_mut<T: Control>(&mut self, name: &str) -> Option<&mut T> {
        self.control_mut(name)?.as_any_mut().downcast_mut::<T>()
    }

    /// Names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.controls.keys().map(String::as_str).collect()
    }

    /// Iterate over controls in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Control> {
        self.controls.values().map(|c| c.as_ref())
    }

    /// Iterate mutably over controls in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Control>> {
        self.controls.values_mut()
    }

    /// Number of controls.
    pub fn len(&self) -> usize {
        self.controls.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }

    /// Initialize every control.
    pub fn init_all(&mut self, ctx: &mut Context) -> Result<()> {
        for control in self.controls.values_mut() {
            control.on_init(ctx)?;
        }
        Ok(())
    }

    /// Bind request values into every control.
    pub fn bind(&mut self, ctx: &Context) {
        for control in self.controls.values_mut() {
            control.bind_request_value(ctx);
        }
    }

    /// Process controls in order, stopping at the first that returns `false`.
    pub fn process_all(&mut self, ctx: &mut Context) -> bool {
        for control in self.controls.values_mut() {
            if !control.on_process(ctx) {
                tracing::debug!(control = control.name(), "control stopped processing");
                return false;
            }
        }
        true
    }

    /// Run every control's pre-render hook.
    pub fn render_all(&mut self, ctx: &Context) {
        for control in self.controls.values_mut() {
            control.on_render(ctx);
        }
    }

    /// Destroy every control.
    pub fn destroy_all(&mut self) {
        for control in self.controls.values_mut() {
            control.on_destroy();
        }
    }

    /// Head imports of every control, without duplicates.
    pub fn html_imports(&self, ctx: &Context) -> Vec<String> {
        let mut imports: Vec<String> = Vec::new();
        for import in self.controls.values().filter_map(|c| c.html_imports(ctx)) {
            if !imports.contains(&import) {
                imports.push(import);
            }
        }
        imports
    }
}

impl fmt::Debug for ControlRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RequestParams;
    use http::Method;

    struct Label {
        name: String,
        text: String,
        stop: bool,
        processed: bool,
    }

    impl Label {
        fn new(name: &str) -> Self {
            Self {
                name: name.to_string(),
                text: String::new(),
                stop: false,
                processed: false,
            }
        }
    }

    impl Control for Label {
        fn name(&self) -> &str {
            &self.name
        }

        fn bind_request_value(&mut self, ctx: &Context) {
            if let Some(value) = ctx.request_parameter(&self.name) {
                self.text = value.to_string();
            }
        }

        fn on_process(&mut self, ctx: &mut Context) -> bool {
            self.bind_request_value(ctx);
            self.processed = true;
            !self.stop
        }

        fn render(&self, _ctx: &Context, buffer: &mut HtmlStringBuffer) {
            buffer.element_start("span").close_tag();
            buffer.append_escaped(&self.text);
            buffer.element_end_tag("span");
        }

        fn html_imports(&self, _ctx: &Context) -> Option<String> {
            Some("<link rel=\"stylesheet\" href=\"/label.css\">".to_string())
        }

        crate::impl_as_any!();
    }

    #[test]
    fn test_add_and_lookup() {
        let mut registry = ControlRegistry::new();
        registry.add(Label::new("title")).unwrap();
        registry.add(Label::new("footer")).unwrap();

        assert_eq!(registry.names(), vec!["title", "footer"]);
        assert!(registry.get::<Label>("title").is_some());
        assert!(registry.control("missing").is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let mut registry = ControlRegistry::new();
        registry.add(Label::new("title")).unwrap();

        let err = registry.add(Label::new("title")).unwrap_err();
        assert!(matches!(err, ClickError::DuplicateControl(name) if name == "title"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_blank_name_rejected() {
        let mut registry = ControlRegistry::new();
        let err = registry.add(Label::new("  ")).unwrap_err();

        assert!(matches!(err, ClickError::BlankControlName));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_remove() {
        let mut registry = ControlRegistry::new();
        registry.add(Label::new("a")).unwrap();

        assert!(registry.remove("a").is_some());
        assert!(registry.remove("a").is_none());
        registry.add(Label::new("a")).unwrap();
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut registry = ControlRegistry::new();
        for name in ["a", "b", "c", "d"] {
            registry.add(Label::new(name)).unwrap();
        }

        registry.remove("b");
        registry.add(Label::new("b")).unwrap();

        assert_eq!(registry.names(), vec!["a", "c", "d", "b"]);
        assert!(registry.get::<Label>("c").is_some());
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_bind_only_present_parameters() {
        let mut registry = ControlRegistry::new();
        registry.add(Label::new("a")).unwrap();
        registry.add(Label::new("b")).unwrap();
        registry.get_mut::<Label>("b").unwrap().text = "prior".to_string();

        let ctx = Context::new(Method::GET, "/").with_params(RequestParams::parse("a=new"));
        registry.bind(&ctx);

        assert_eq!(registry.get::<Label>("a").unwrap().text, "new");
        assert_eq!(registry.get::<Label>("b").unwrap().text, "prior");
    }

    #[test]
    fn test_process_all_stops_early() {
        let mut registry = ControlRegistry::new();
        let mut first = Label::new("first");
        first.stop = true;
        registry.add(first).unwrap();
        registry.add(Label::new("second")).unwrap();

        let mut ctx = Context::new(Method::GET, "/");
        assert!(!registry.process_all(&mut ctx));
        assert!(registry.get::<Label>("first").unwrap().processed);
        assert!(!registry.get::<Label>("second").unwrap().processed);
    }

    #[test]
    fn test_to_html_and_imports() {
        let mut registry = ControlRegistry::new();
        registry.add(Label::new("a")).unwrap();
        registry.add(Label::new("b")).unwrap();
        registry.get_mut::<Label>("a").unwrap().text = "<b>".to_string();

        let ctx = Context::new(Method::GET, "/");
        let html = registry.control("a").unwrap().to_html(&ctx);

        assert_eq!(html, "<span>&lt;b&gt;</span>");
        assert_eq!(registry.html_imports(&ctx).len(), 1);
    }
}
