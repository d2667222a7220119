//! Checkbox input.

use click_core::{impl_as_any, Context, Control, HtmlStringBuffer, Messages};
use serde_json::Value;

use crate::field::{process_field, Field, FieldState};

/// Checkbox input.
///
/// Browsers omit unchecked boxes from a submission, so when the checkbox
/// is processed (inside a submitted form) a missing parameter means
/// unchecked.
#[derive(Debug, Clone)]
pub struct Checkbox {
    state: FieldState,
    checked: bool,
}

impl Checkbox {
    /// Create an unchecked checkbox.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: FieldState::new(name),
            checked: false,
        }
    }

    /// Set the initial checked state.
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.set_checked(checked);
        self
    }

    /// Check whether the box is checked.
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Set the checked state.
    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
        self.state
            .set_value(if checked { "true" } else { "" });
    }
}

impl Control for Checkbox {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn id(&self) -> String {
        self.state.id()
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        let checked = ctx.has_request_parameter(self.state.name());
        self.set_checked(checked);
    }

    fn on_process(&mut self, ctx: &mut Context) -> bool {
        process_field(self, ctx)
    }

    fn render(&self, _ctx: &Context, buffer: &mut HtmlStringBuffer) {
        buffer
            .element_start("input")
            .append_attribute("type", "checkbox")
            .append_attribute("name", self.state.name())
            .append_attribute("id", self.state.id())
            .append_attribute("value", "true");
        if self.checked {
            buffer.append_attribute("checked", "checked");
        }
        self.state.render_common_attributes(buffer);
        buffer.element_end();
    }

    impl_as_any!();
}

impl Field for Checkbox {
    fn field_state(&self) -> &FieldState {
        &self.state
    }

    fn field_state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }

    fn set_value(&mut self, value: &str) {
        let checked = matches!(value.trim(), "true" | "on" | "1" | "yes");
        self.set_checked(checked);
    }

    fn value_object(&self) -> Value {
        Value::Bool(self.checked)
    }

    fn set_value_object(&mut self, value: &Value) {
        match value {
            Value::Bool(b) => self.set_checked(*b),
            Value::String(s) => self.set_value(s),
            _ => self.set_checked(false),
        }
    }

    /// A required checkbox must be checked.
    fn validate(&mut self, messages: &Messages) {
        self.state.set_error(None);
        if self.state.is_required() && !self.checked {
            let error = messages.format("not-checked-error", &[&self.state.label()]);
            self.state.set_error(Some(error));
        }
    }
}
