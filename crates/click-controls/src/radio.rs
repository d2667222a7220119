//! Radio buttons and radio groups.

use click_core::{impl_as_any, Context, Control, HtmlStringBuffer, Messages};

use crate::field::{process_field, Field, FieldState};

/// Single radio button.
///
/// The field name is the shared group name; the radio carries its own
/// option value and is checked when the submitted group value matches it.
#[derive(Debug, Clone)]
pub struct Radio {
    state: FieldState,
    option: String,
    checked: bool,
}

impl Radio {
    /// Create an unchecked radio for group `name` with option `value`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            state: FieldState::new(name),
            option: value.into(),
            checked: false,
        }
    }

    /// Set the initial checked state.
    pub fn with_checked(mut self, checked: bool) -> Self {
        self.set_checked(checked);
        self
    }

    /// The option value submitted when this radio is chosen.
    pub fn option_value(&self) -> &str {
        &self.option
    }

    /// Check whether the radio is checked.
    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Set the checked state.
    pub fn set_checked(&mut self, checked: bool) {
        self.checked = checked;
        let value = if checked { self.option.clone() } else { String::new() };
        self.state.set_value(value);
    }

    /// Write the `<input>` and its `<label>` using `id` for both.
    fn render_with_id(&self, id: &str, buffer: &mut HtmlStringBuffer) {
        buffer
            .element_start("input")
            .append_attribute("type", "radio")
            .append_attribute("name", self.state.name())
            .append_attribute("id", id)
            .append_attribute("value", &self.option);
        if self.checked {
            buffer.append_attribute("checked", "checked");
        }
        self.state.render_common_attributes(buffer);
        buffer.element_end();

        buffer
            .element_start("label")
            .append_attribute("for", id)
            .close_tag()
            .append_escaped(self.state.label())
            .element_end_tag("label");
    }

    fn option_id(&self, base: &str) -> String {
        format!("{}_{}", base, self.option)
    }
}

impl Control for Radio {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn id(&self) -> String {
        self.option_id(&self.state.id())
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        let checked = ctx.request_parameter(self.state.name()) == Some(self.option.as_str());
        self.set_checked(checked);
    }

    fn on_process(&mut self, ctx: &mut Context) -> bool {
        process_field(self, ctx)
    }

    fn render(&self, _ctx: &Context, buffer: &mut HtmlStringBuffer) {
        self.render_with_id(&self.id(), buffer);
    }

    impl_as_any!();
}

impl Field for Radio {
    fn field_state(&self) -> &FieldState {
        &self.state
    }

    fn field_state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }

    fn set_value(&mut self, value: &str) {
        let checked = value == self.option;
        self.set_checked(checked);
    }

    /// A required radio must be checked.
    fn validate(&mut self, messages: &Messages) {
        self.state.set_error(None);
        if self.state.is_required() && !self.checked {
            let error = messages.format("select-error", &[&self.state.label()]);
            self.state.set_error(Some(error));
        }
    }
}

/// Group of radio buttons sharing one name; its value is the chosen
/// radio's option value.
///
/// A group with nothing chosen is left out of a submission, so a missing
/// parameter clears the choice.
#[derive(Debug, Clone)]
pub struct RadioGroup {
    state: FieldState,
    radios: Vec<Radio>,
    vertical: bool,
}

impl RadioGroup {
    /// Create an empty, horizontally laid out group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: FieldState::new(name),
            radios: Vec::new(),
            vertical: false,
        }
    }

    /// Add a radio for `value` labelled `label`.
    pub fn with_radio(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.add_radio(value, label);
        self
    }

    /// Add radios from `(value, label)` pairs.
    pub fn with_radios<I, V, L>(mut self, radios: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        for (value, label) in radios {
            self.add_radio(value, label);
        }
        self
    }

    /// Stack the radios one per line.
    pub fn with_vertical(mut self, vertical: bool) -> Self {
        self.vertical = vertical;
        self
    }

    /// Add a radio for `value` labelled `label`.
    pub fn add_radio(&mut self, value: impl Into<String>, label: impl Into<String>) {
        let mut radio = Radio::new(self.state.name(), value);
        radio.state.set_label(label);
        let checked = radio.option == self.state.value() && !self.state.value().is_empty();
        radio.set_checked(checked);
        self.radios.push(radio);
    }

    /// The radios in insertion order.
    pub fn radios(&self) -> &[Radio] {
        &self.radios
    }

    /// The checked radio, if any.
    pub fn checked(&self) -> Option<&Radio> {
        self.radios.iter().find(|r| r.is_checked())
    }

    fn select(&mut self, value: &str) {
        self.state.set_value(value);
        for radio in self.radios.iter_mut() {
            let checked = !value.is_empty() && radio.option == value;
            radio.set_checked(checked);
        }
    }
}

impl Control for RadioGroup {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn id(&self) -> String {
        self.state.id()
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        let value = ctx
            .request_parameter(self.state.name())
            .unwrap_or_default()
            .to_string();
        self.select(&value);
    }

    fn on_process(&mut self, ctx: &mut Context) -> bool {
        process_field(self, ctx)
    }

    fn render(&self, _ctx: &Context, buffer: &mut HtmlStringBuffer) {
        let id = self.state.id();
        buffer
            .element_start("span")
            .append_attribute("id", &id)
            .append_attribute("class", "radiogroup")
            .close_tag();
        for (index, radio) in self.radios.iter().enumerate() {
            if index > 0 {
                buffer.append(if self.vertical { "<br/>" } else { " " });
            }
            let mut radio = radio.clone();
            radio.state.set_disabled(self.state.is_disabled());
            radio.state.set_readonly(self.state.is_readonly());
            if !self.state.is_valid() {
                radio.state.set_error(self.state.error().map(str::to_string));
            }
            radio.render_with_id(&radio.option_id(&id), buffer);
        }
        buffer.element_end_tag("span");
    }

    impl_as_any!();
}

impl Field for RadioGroup {
    fn field_state(&self) -> &FieldState {
        &self.state
    }

    fn field_state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }

    /// Choose the radio with this option value; other values clear the
    /// choice.
    fn set_value(&mut self, value: &str) {
        let known = self.radios.iter().any(|r| r.option == value);
        self.select(if known { value } else { "" });
    }

    /// A required group needs one radio chosen.
    fn validate(&mut self, messages: &Messages) {
        self.state.set_error(None);
        if self.state.is_required() && self.checked().is_none() {
            let error = messages.format("select-error", &[&self.state.label()]);
            self.state.set_error(Some(error));
        }
    }
}
