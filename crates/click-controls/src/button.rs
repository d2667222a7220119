//! Form buttons and action buttons.

use std::collections::BTreeMap;

use click_core::{
    impl_as_any, to_label, Context, Control, HtmlStringBuffer, Messages, ACTION_BUTTON,
    ACTION_VALUE,
};
use serde_json::Value;

use crate::field::{Field, FieldState};
use crate::link::build_href;

/// Submit button. Clicked when its name is among the request parameters;
/// a clicked button queues its listener.
#[derive(Debug, Clone)]
pub struct Submit {
    state: FieldState,
    clicked: bool,
}

impl Submit {
    /// Create a submit button. The label defaults from the name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: FieldState::new(name),
            clicked: false,
        }
    }

    /// Check whether this button submitted the request.
    pub fn is_clicked(&self) -> bool {
        self.clicked
    }
}

impl Control for Submit {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn id(&self) -> String {
        self.state.id()
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        self.clicked = ctx.has_request_parameter(self.state.name());
    }

    fn on_process(&mut self, ctx: &mut Context) -> bool {
        if self.state.is_disabled() {
            return true;
        }
        self.bind_request_value(ctx);
        if self.clicked {
            self.state.dispatch(ctx);
        }
        true
    }

    fn render(&self, _ctx: &Context, buffer: &mut HtmlStringBuffer) {
        buffer
            .element_start("input")
            .append_attribute("type", "submit")
            .append_attribute("name", self.state.name())
            .append_attribute("id", self.state.id())
            .append_attribute("value", self.state.label());
        self.state.render_common_attributes(buffer);
        buffer.element_end();
    }

    impl_as_any!();
}

impl Field for Submit {
    fn field_state(&self) -> &FieldState {
        &self.state
    }

    fn field_state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }

    fn value(&self) -> &str {
        if self.clicked {
            self.state.name()
        } else {
            ""
        }
    }

    fn value_object(&self) -> Value {
        Value::Bool(self.clicked)
    }

    fn set_value_object(&mut self, _value: &Value) {}

    fn validate(&mut self, _messages: &Messages) {}

    fn is_button(&self) -> bool {
        true
    }
}

/// Button that navigates back to the current page and fires a listener.
///
/// The button counterpart of [`ActionLink`](crate::ActionLink): clicked
/// when the request's `actionButton` parameter equals its name, with the
/// optional `value` parameter travelling alongside.
#[derive(Debug, Clone)]
pub struct ActionButton {
    name: String,
    label: Option<String>,
    title: Option<String>,
    value: Option<String>,
    listener: Option<String>,
    attributes: BTreeMap<String, String>,
    disabled: bool,
    clicked: bool,
}

impl ActionButton {
    /// Create an action button.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            title: None,
            value: None,
            listener: None,
            attributes: BTreeMap::new(),
            disabled: false,
            clicked: false,
        }
    }

    /// Set the button text.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the title text.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the page listener fired when the button is clicked.
    pub fn with_listener(mut self, listener: impl Into<String>) -> Self {
        self.listener = Some(listener.into());
        self
    }

    /// Set the value carried by the button.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set an extra HTML attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Disable the button.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Button text, derived from the name when not set.
    pub fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| to_label(&self.name))
    }

    /// Value submitted with the button.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Value parsed as an integer.
    pub fn value_integer(&self) -> Option<i64> {
        self.value()?.trim().parse().ok()
    }

    /// Check whether this button triggered the request.
    pub fn is_clicked(&self) -> bool {
        self.clicked
    }

    /// Target URL: the request URI with `actionButton` and `value`.
    pub fn href(&self, ctx: &Context) -> String {
        let mut pairs = vec![(ACTION_BUTTON, self.name.as_str())];
        if let Some(value) = &self.value {
            pairs.push((ACTION_VALUE, value.as_str()));
        }
        build_href(&ctx.request_uri(), pairs)
    }
}

impl Control for ActionButton {
    fn name(&self) -> &str {
        &self.name
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        self.clicked = ctx.request_parameter(ACTION_BUTTON) == Some(self.name.as_str());
        if !self.clicked {
            return;
        }
        if let Some(value) = ctx.request_parameter(ACTION_VALUE) {
            self.value = Some(value.to_string());
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
        buffer
            .element_start("input")
            .append_attribute("type", "button")
            .append_attribute("name", &self.name)
            .append_attribute("id", &self.name)
            .append_attribute("value", self.label())
            .append_attribute_opt("title", self.title.as_deref())
            .append_attributes(&self.attributes);
        if self.disabled {
            buffer
                .append_attribute_disabled()
                .append_attribute("class", "disabled");
        } else {
            let onclick = format!("javascript:document.location.href='{}';", self.href(ctx));
            buffer.append_attribute("onclick", onclick);
        }
        buffer.element_end();
    }

    impl_as_any!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldBuilder;
    use click_core::mock::MockContext;

    #[test]
    fn test_clicked_queues_listener() {
        let mut ok = Submit::new("ok").with_listener("on_ok_click");
        let mut ctx = MockContext::post("/").param("ok", "OK").build();
        ok.on_process(&mut ctx);

        assert!(ok.is_clicked());
        assert_eq!(ctx.dispatcher().pending().len(), 1);
        assert_eq!(ctx.dispatcher().pending()[0].listener, "on_ok_click");
    }

    #[test]
    fn test_not_clicked_queues_nothing() {
        let mut ok = Submit::new("ok").with_listener("on_ok_click");
        let mut ctx = MockContext::post("/").param("cancel", "Cancel").build();
        ok.on_process(&mut ctx);

        assert!(!ok.is_clicked());
        assert!(!ctx.dispatcher().has_action_events());
    }

    #[test]
    fn test_render_uses_label() {
        let ok = Submit::new("saveChanges");
        let html = ok.to_html(&MockContext::get("/").build());

        assert_eq!(
            html,
            "<input type=\"submit\" name=\"saveChanges\" id=\"saveChanges\" value=\"Save Changes\"/>"
        );
        assert!(ok.is_button());
    }

    // === ActionButton Tests ===

    #[test]
    fn test_action_button_clicked_binds_value_and_queues() {
        let mut button = ActionButton::new("approve").with_listener("on_approve");
        let mut ctx = MockContext::get("/orders.htm")
            .param("actionButton", "approve")
            .param("value", "17")
            .build();

        button.on_process(&mut ctx);

        assert!(button.is_clicked());
        assert_eq!(button.value_integer(), Some(17));
        assert_eq!(ctx.dispatcher().pending().len(), 1);
        assert_eq!(ctx.dispatcher().pending()[0].source, "approve");
        assert_eq!(ctx.dispatcher().pending()[0].listener, "on_approve");
    }

    #[test]
    fn test_action_button_ignores_action_link_parameter() {
        let mut button = ActionButton::new("approve").with_listener("on_approve");
        let mut ctx = MockContext::get("/")
            .param("actionLink", "approve")
            .param("actionButton", "reject")
            .build();

        button.on_process(&mut ctx);

        assert!(!button.is_clicked());
        assert!(!ctx.dispatcher().has_action_events());
    }

    #[test]
    fn test_action_button_render() {
        let button = ActionButton::new("approve").with_value("a b");
        let ctx = MockContext::get("/orders.htm").context_path("/app").build();

        assert_eq!(button.href(&ctx), "/app/orders.htm?actionButton=approve&value=a+b");
        assert_eq!(
            button.to_html(&ctx),
            "<input type=\"button\" name=\"approve\" id=\"approve\" value=\"Approve\" \
             onclick=\"javascript:document.location.href=&#39;/app/orders.htm?actionButton=approve&amp;value=a+b&#39;;\"/>"
        );
    }

    #[test]
    fn test_disabled_action_button_ignores_click() {
        let mut button = ActionButton::new("go").with_listener("on_go").disabled(true);
        let mut ctx = MockContext::get("/").param("actionButton", "go").build();
        button.on_process(&mut ctx);

        assert!(!ctx.dispatcher().has_action_events());
        assert_eq!(
            button.to_html(&ctx),
            "<input type=\"button\" name=\"go\" id=\"go\" value=\"Go\" disabled=\"disabled\" class=\"disabled\"/>"
        );
    }
}
