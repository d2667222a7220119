//! Drop-down and list selection.

use click_core::{impl_as_any, Context, Control, HtmlStringBuffer, Messages};
use serde_json::Value;

use crate::field::{process_field, Field, FieldState};

/// One `<option>` of a [`Select`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    /// Submitted value.
    pub value: String,
    /// Displayed text.
    pub label: String,
}

impl SelectOption {
    /// Create an option.
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Selection from a list of options, single or multiple.
///
/// Browsers omit a multiple select with nothing chosen from a submission,
/// so when a multiple select is processed a missing parameter clears the
/// selection. A single select keeps its selection.
#[derive(Debug, Clone)]
pub struct Select {
    state: FieldState,
    options: Vec<SelectOption>,
    selected: Vec<String>,
    multiple: bool,
    size: usize,
}

impl Select {
    /// Create a single-choice drop-down.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: FieldState::new(name),
            options: Vec::new(),
            selected: Vec::new(),
            multiple: false,
            size: 1,
        }
    }

    /// Add an option.
    pub fn with_option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.add_option(SelectOption::new(value, label));
        self
    }

    /// Add options from `(value, label)` pairs.
    pub fn with_options<I, V, L>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = (V, L)>,
        V: Into<String>,
        L: Into<String>,
    {
        for (value, label) in options {
            self.add_option(SelectOption::new(value, label));
        }
        self
    }

    /// Allow several options to be selected.
    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Set the visible row count.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Add an option.
    pub fn add_option(&mut self, option: SelectOption) {
        self.options.push(option);
    }

    /// The options.
    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    /// Selected values.
    pub fn selected_values(&self) -> &[String] {
        &self.selected
    }

    /// Replace the selected values.
    pub fn set_selected_values(&mut self, values: Vec<String>) {
        self.state
            .set_value(values.first().cloned().unwrap_or_default());
        self.selected = values;
    }

    /// Check whether an option value is selected.
    pub fn is_selected(&self, value: &str) -> bool {
        self.selected.iter().any(|v| v == value)
    }
}

impl Control for Select {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn id(&self) -> String {
        self.state.id()
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        let name = self.state.name();
        if !ctx.has_request_parameter(name) {
            if self.multiple {
                self.set_selected_values(Vec::new());
            }
            return;
        }
        let values: Vec<String> = if self.multiple {
            ctx.request_parameter_values(name)
                .into_iter()
                .map(str::to_string)
                .collect()
        } else {
            ctx.request_parameter(name)
                .map(str::to_string)
                .into_iter()
                .collect()
        };
        self.set_selected_values(values);
    }

    fn on_process(&mut self, ctx: &mut Context) -> bool {
        process_field(self, ctx)
    }

    fn render(&self, _ctx: &Context, buffer: &mut HtmlStringBuffer) {
        buffer
            .element_start("select")
            .append_attribute("name", self.state.name())
            .append_attribute("id", self.state.id())
            .append_attribute("size", self.size);
        if self.multiple {
            buffer.append_attribute("multiple", "multiple");
        }
        self.state.render_common_attributes(buffer);
        buffer.close_tag();

        for option in &self.options {
            buffer
                .element_start("option")
                .append_attribute("value", &option.value);
            if self.is_selected(&option.value) {
                buffer.append_attribute("selected", "selected");
            }
            buffer
                .close_tag()
                .append_escaped(&option.label)
                .element_end_tag("option");
        }

        buffer.element_end_tag("select");
    }

    impl_as_any!();
}

impl Field for Select {
    fn field_state(&self) -> &FieldState {
        &self.state
    }

    fn field_state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }

    fn set_value(&mut self, value: &str) {
        self.set_selected_values(vec![value.to_string()]);
    }

    fn value_object(&self) -> Value {
        if self.multiple {
            Value::Array(self.selected.iter().cloned().map(Value::String).collect())
        } else {
            Value::String(self.state.value().to_string())
        }
    }

    fn set_value_object(&mut self, value: &Value) {
        match value {
            Value::Array(items) => {
                let values = items
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect();
                self.set_selected_values(values);
            }
            Value::Null => self.set_selected_values(Vec::new()),
            Value::String(s) => self.set_value(s),
            other => self.set_value(&other.to_string()),
        }
    }

    /// A required select needs at least one non-blank choice.
    fn validate(&mut self, messages: &Messages) {
        self.state.set_error(None);
        let chosen = self.selected.iter().any(|v| !v.trim().is_empty());
        if self.state.is_required() && !chosen {
            let error = messages.format("select-error", &[&self.state.label()]);
            self.state.set_error(Some(error));
        }
    }
}
