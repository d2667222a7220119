//! Hyperlink controls.

use std::collections::BTreeMap;

use click_core::{
    impl_as_any, to_label, Context, Control, HtmlStringBuffer, ACTION_LINK, ACTION_VALUE,
};
use indexmap::IndexMap;
use url::form_urlencoded;

/// Build `path?k=v&...` with form encoding, or just `path` without pairs.
pub(crate) fn build_href<'a>(
    path: &str,
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    let mut empty = true;
    for (name, value) in pairs {
        serializer.append_pair(name, value);
        empty = false;
    }
    if empty {
        path.to_string()
    } else {
        format!("{}?{}", path, serializer.finish())
    }
}

fn render_anchor(
    buffer: &mut HtmlStringBuffer,
    href: &str,
    id: &str,
    label: &str,
    title: Option<&str>,
    attributes: &BTreeMap<String, String>,
    disabled: bool,
) {
    buffer.element_start("a");
    if !disabled {
        buffer.append_attribute("href", href);
    }
    buffer
        .append_attribute("id", id)
        .append_attribute_opt("title", title)
        .append_attributes(attributes);
    if disabled {
        buffer.append_attribute("class", "disabled");
    }
    buffer
        .close_tag()
        .append_escaped(label)
        .element_end_tag("a");
}

/// Link that posts back to the current page and fires a listener.
///
/// The link is clicked when the request's `actionLink` parameter equals
/// its name; the optional `value` parameter travels with it.
#[derive(Debug, Clone)]
pub struct ActionLink {
    name: String,
    label: Option<String>,
    title: Option<String>,
    value: Option<String>,
    listener: Option<String>,
    parameters: IndexMap<String, String>,
    attributes: BTreeMap<String, String>,
    disabled: bool,
    clicked: bool,
}

impl ActionLink {
    /// Create an action link.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            title: None,
            value: None,
            listener: None,
            parameters: IndexMap::new(),
            attributes: BTreeMap::new(),
            disabled: false,
            clicked: false,
        }
    }

    /// Set the link text.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the title text.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the page listener fired when the link is clicked.
    pub fn with_listener(mut self, listener: impl Into<String>) -> Self {
        self.listener = Some(listener.into());
        self
    }

    /// Set the value carried by the link.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set an extra HTML attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Disable the link; it renders without an href.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Link text, derived from the name when not set.
    pub fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| to_label(&self.name))
    }

    /// Set the link text.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    /// Value submitted with the link.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Set the value carried by the link.
    pub fn set_value(&mut self, value: Option<String>) {
        self.value = value;
    }

    /// Value parsed as an integer.
    pub fn value_integer(&self) -> Option<i64> {
        self.value()?.trim().parse().ok()
    }

    /// Check whether this link triggered the request.
    pub fn is_clicked(&self) -> bool {
        self.clicked
    }

    /// Extra request parameter, bound back when the link is clicked.
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name).map(|s| s.as_str())
    }

    /// Set an extra request parameter carried by the link.
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(name.into(), value.into());
    }

    /// Remove an extra request parameter.
    pub fn remove_parameter(&mut self, name: &str) {
        self.parameters.shift_remove(name);
    }

    /// Link URL: the request URI with `actionLink`, `value` and the extra
    /// parameters.
    pub fn href(&self, ctx: &Context) -> String {
        let mut pairs = vec![(ACTION_LINK, self.name.as_str())];
        if let Some(value) = &self.value {
            pairs.push((ACTION_VALUE, value.as_str()));
        }
        pairs.extend(self.parameters.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        build_href(&ctx.request_uri(), pairs)
    }
}

impl Control for ActionLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        self.clicked = ctx.request_parameter(ACTION_LINK) == Some(self.name.as_str());
        if !self.clicked {
            return;
        }
        if let Some(value) = ctx.request_parameter(ACTION_VALUE) {
            self.value = Some(value.to_string());
        }
        for (name, value) in self.parameters.iter_mut() {
            if let Some(submitted) = ctx.request_parameter(name) {
                *value = submitted.to_string();
            }
        }
    }

    fn on_process(&mut self, ctx: &mut Context) -> bool {
        if self.disabled {
            return true;
        }
        self.bind_request_value(ctx);
        if self.clicked {
            if let Some(listener) = &self.listener {
                ctx.dispatch_action_event(&self.name, listener);
            }
        }
        true
    }

    fn render(&self, ctx: &Context, buffer: &mut HtmlStringBuffer) {
        render_anchor(
            buffer,
            &self.href(ctx),
            &self.name,
            &self.label(),
            self.title.as_deref(),
            &self.attributes,
            self.disabled,
        );
    }

    impl_as_any!();
}

/// Plain link to another page of the application.
#[derive(Debug, Clone)]
pub struct PageLink {
    name: String,
    path: String,
    label: Option<String>,
    title: Option<String>,
    parameters: IndexMap<String, String>,
    attributes: BTreeMap<String, String>,
}

impl PageLink {
    /// Create a link to a page path.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            label: None,
            title: None,
            parameters: IndexMap::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Set the link text.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the title text.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Add a request parameter to the link.
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Target page path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Link URL, prefixed with the context path for absolute paths.
    pub fn href(&self, ctx: &Context) -> String {
        let path = if self.path.starts_with('/') {
            format!("{}{}", ctx.context_path(), self.path)
        } else {
            self.path.clone()
        };
        build_href(
            &path,
            self.parameters.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        )
    }
}

impl Control for PageLink {
    fn name(&self) -> &str {
        &self.name
    }

    fn render(&self, ctx: &Context, buffer: &mut HtmlStringBuffer) {
        let label = self.label.clone().unwrap_or_else(|| to_label(&self.name));
        render_anchor(
            buffer,
            &self.href(ctx),
            &self.name,
            &label,
            self.title.as_deref(),
            &self.attributes,
            false,
        );
    }

    impl_as_any!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use click_core::mock::MockContext;
    use click_core::RequestParams;

    // === ActionLink Tests ===

    #[test]
    fn test_clicked_binds_value_and_queues() {
        let mut link = ActionLink::new("deleteLink").with_listener("on_delete");
        let mut ctx = MockContext::get("/customers.htm")
            .param("actionLink", "deleteLink")
            .param("value", "42")
            .build();

        link.on_process(&mut ctx);

        assert!(link.is_clicked());
        assert_eq!(link.value_integer(), Some(42));
        assert_eq!(ctx.dispatcher().pending()[0].listener, "on_delete");
    }

    #[test]
    fn test_other_link_not_clicked() {
        let mut link = ActionLink::new("deleteLink")
            .with_listener("on_delete")
            .with_value("1");
        let mut ctx = MockContext::get("/")
            .param("actionLink", "editLink")
            .param("value", "9")
            .build();

        link.on_process(&mut ctx);

        assert!(!link.is_clicked());
        assert_eq!(link.value(), Some("1"));
        assert!(!ctx.dispatcher().has_action_events());
    }

    #[test]
    fn test_href_encodes() {
        let mut link = ActionLink::new("search").with_value("a b&c");
        link.set_parameter("sort", "name");
        let ctx = MockContext::get("/list.htm").context_path("/app").build();

        assert_eq!(
            link.href(&ctx),
            "/app/list.htm?actionLink=search&value=a+b%26c&sort=name"
        );
    }

    #[test]
    fn test_href_round_trip() {
        let ctx = MockContext::get("/list.htm").build();
        let link = ActionLink::new("pick").with_value("x=1&y=\"2\"");
        let href = link.href(&ctx);
        let query = href.split_once('?').unwrap().1;

        let mut again = ActionLink::new("pick");
        again.on_process(
            &mut click_core::Context::new(http::Method::GET, "/list.htm")
                .with_params(RequestParams::parse(query)),
        );

        assert_eq!(again.value(), link.value());
    }

    #[test]
    fn test_render() {
        let link = ActionLink::new("editLink").with_value("3").with_title("Edit");
        let html = link.to_html(&MockContext::get("/c.htm").build());

        assert_eq!(
            html,
            "<a href=\"/c.htm?actionLink=editLink&amp;value=3\" id=\"editLink\" title=\"Edit\">Edit Link</a>"
        );
    }

    #[test]
    fn test_disabled_renders_without_href_and_ignores_click() {
        let mut link = ActionLink::new("go").with_listener("on_go").disabled(true);
        let mut ctx = MockContext::get("/").param("actionLink", "go").build();
        link.on_process(&mut ctx);

        assert!(!ctx.dispatcher().has_action_events());
        assert_eq!(link.to_html(&ctx), "<a id=\"go\" class=\"disabled\">Go</a>");
    }

    // === PageLink Tests ===

    #[test]
    fn test_page_link_href() {
        let link = PageLink::new("edit", "/edit-customer.htm")
            .with_label("Edit")
            .with_parameter("id", "7");
        let ctx = MockContext::get("/").context_path("/shop").build();

        assert_eq!(link.href(&ctx), "/shop/edit-customer.htm?id=7");
        assert_eq!(
            link.to_html(&ctx),
            "<a href=\"/shop/edit-customer.htm?id=7\" id=\"edit\">Edit</a>"
        );
    }

    #[test]
    fn test_page_link_external() {
        let link = PageLink::new("docs", "https://example.org/docs");
        let ctx = MockContext::get("/").context_path("/shop").build();

        assert_eq!(link.href(&ctx), "https://example.org/docs");
    }
}
