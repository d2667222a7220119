//! State and behaviour shared by every form field.

use std::collections::BTreeMap;

use click_core::{to_label, Context, Control, HtmlStringBuffer, Messages};
use serde_json::Value;

/// State common to every field: name, label, value, error and flags.
#[derive(Debug, Clone)]
pub struct FieldState {
    name: String,
    label: Option<String>,
    value: String,
    error: Option<String>,
    required: bool,
    disabled: bool,
    readonly: bool,
    validate: bool,
    title: Option<String>,
    listener: Option<String>,
    form: Option<String>,
    attributes: BTreeMap<String, String>,
}

impl FieldState {
    /// Create state for a field with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: None,
            value: String::new(),
            error: None,
            required: false,
            disabled: false,
            readonly: false,
            validate: true,
            title: None,
            listener: None,
            form: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Field name, also the request parameter name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// HTML id: `<form>_<name>` inside a form, otherwise the name.
    pub fn id(&self) -> String {
        match &self.form {
            Some(form) => format!("{}_{}", form, self.name),
            None => self.name.clone(),
        }
    }

    /// Display label, derived from the name when not set.
    pub fn label(&self) -> String {
        self.label.clone().unwrap_or_else(|| to_label(&self.name))
    }

    /// Set the display label.
    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    /// Current string value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Set the string value.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Validation error, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Set or clear the validation error.
    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    /// Check whether the field has no validation error.
    pub fn is_valid(&self) -> bool {
        self.error.is_none()
    }

    /// Check whether a value is required.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Require a value.
    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    /// Check whether the field is disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Disable the field.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    /// Check whether the field is read-only.
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    /// Make the field read-only.
    pub fn set_readonly(&mut self, readonly: bool) {
        self.readonly = readonly;
    }

    /// Check whether the field validates after binding.
    pub fn validates(&self) -> bool {
        self.validate
    }

    /// Turn validation on or off.
    pub fn set_validate(&mut self, validate: bool) {
        self.validate = validate;
    }

    /// Title (tooltip) text.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Set the title text.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Page listener fired when the field is processed.
    pub fn listener(&self) -> Option<&str> {
        self.listener.as_deref()
    }

    /// Set the page listener.
    pub fn set_listener(&mut self, listener: impl Into<String>) {
        self.listener = Some(listener.into());
    }

    /// Name of the enclosing form.
    pub fn form(&self) -> Option<&str> {
        self.form.as_deref()
    }

    /// Attach the field to a form.
    pub fn set_form(&mut self, form: impl Into<String>) {
        self.form = Some(form.into());
    }

    /// Extra HTML attributes.
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Set an extra HTML attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    /// Copy the matching request parameter into the value.
    ///
    /// An absent parameter keeps the current value. The value is stored as
    /// submitted, without trimming.
    pub fn bind(&mut self, ctx: &Context) {
        if let Some(value) = ctx.request_parameter(&self.name) {
            self.value = value.to_string();
        }
    }

    /// Record `field-required-error` when a required value is blank.
    ///
    /// Returns `true` when the value is present.
    pub fn validate_required(&mut self, messages: &Messages) -> bool {
        if self.value.trim().is_empty() {
            if self.required {
                self.error = Some(messages.format("field-required-error", &[&self.label()]));
            }
            return false;
        }
        true
    }

    /// Queue the listener, if one is set.
    pub fn dispatch(&self, ctx: &mut Context) {
        if let Some(listener) = &self.listener {
            ctx.dispatch_action_event(&self.name, listener);
        }
    }

    /// Write the title, extra attributes, disabled and read-only flags and
    /// the state class.
    pub fn render_common_attributes(&self, buffer: &mut HtmlStringBuffer) {
        buffer.append_attribute_opt("title", self.title());
        buffer.append_attributes(&self.attributes);
        if self.disabled {
            buffer.append_attribute_disabled();
        }
        if self.readonly {
            buffer.append_attribute_readonly();
        }
        if !self.is_valid() {
            buffer.append_attribute("class", "error");
        } else if self.disabled {
            buffer.append_attribute("class", "disabled");
        }
    }
}

/// A control that carries a value inside a form.
pub trait Field: Control {
    /// Field state.
    fn field_state(&self) -> &FieldState;

    /// Field state, mutably.
    fn field_state_mut(&mut self) -> &mut FieldState;

    /// Current string value.
    fn value(&self) -> &str {
        self.field_state().value()
    }

    /// Set the string value.
    fn set_value(&mut self, value: &str) {
        self.field_state_mut().set_value(value);
    }

    /// The value as JSON, used when copying a form to an object.
    fn value_object(&self) -> Value {
        Value::String(self.value().to_string())
    }

    /// Set the value from JSON, used when copying an object into a form.
    fn set_value_object(&mut self, value: &Value) {
        match value {
            Value::Null => self.set_value(""),
            Value::String(s) => self.set_value(s),
            other => self.set_value(&other.to_string()),
        }
    }

    /// Validate the bound value, recording an error on the field state.
    fn validate(&mut self, messages: &Messages) {
        let state = self.field_state_mut();
        state.set_error(None);
        state.validate_required(messages);
    }

    /// Hidden fields render after the form's table, without a label.
    fn is_hidden(&self) -> bool {
        false
    }

    /// Buttons render in the form's button row.
    fn is_button(&self) -> bool {
        false
    }

    /// Containers such as a [`FieldSet`](crate::FieldSet) group other
    /// fields and carry no value of their own.
    fn is_container(&self) -> bool {
        false
    }

    /// Nested fields of a container.
    fn fields(&self) -> &[Box<dyn Field>] {
        &[]
    }

    /// Nested fields, mutably.
    fn fields_mut(&mut self) -> &mut [Box<dyn Field>] {
        &mut []
    }
}

/// Leaf fields in order, descending into containers.
pub(crate) fn leaf_fields<'a>(fields: &'a [Box<dyn Field>], out: &mut Vec<&'a dyn Field>) {
    for field in fields {
        if field.is_container() {
            leaf_fields(field.fields(), out);
        } else {
            out.push(field.as_ref());
        }
    }
}

/// The field's own name followed by the names of its nested fields.
pub(crate) fn field_names(field: &dyn Field) -> Vec<String> {
    let mut nested = Vec::new();
    leaf_fields(field.fields(), &mut nested);
    std::iter::once(field.name())
        .chain(nested.iter().map(|f| f.name()))
        .map(str::to_string)
        .collect()
}

/// Find a field by name at any depth.
pub(crate) fn find_field<'a>(fields: &'a [Box<dyn Field>], name: &str) -> Option<&'a dyn Field> {
    for field in fields {
        if field.name() == name {
            return Some(field.as_ref());
        }
        if let Some(found) = find_field(field.fields(), name) {
            return Some(found);
        }
    }
    None
}

/// Find a field by name at any depth, mutably.
pub(crate) fn find_field_mut<'a>(
    fields: &'a mut [Box<dyn Field>],
    name: &str,
) -> Option<&'a mut Box<dyn Field>> {
    for field in fields.iter_mut() {
        if field.name() == name {
            return Some(field);
        }
        if let Some(found) = find_field_mut(field.fields_mut(), name) {
            return Some(found);
        }
    }
    None
}

/// Apply `f` to every field at any depth, containers included.
pub(crate) fn for_each_field_mut(
    fields: &mut [Box<dyn Field>],
    f: &mut dyn FnMut(&mut Box<dyn Field>),
) {
    for field in fields.iter_mut() {
        f(field);
        for_each_field_mut(field.fields_mut(), f);
    }
}

/// Standard field processing: re-enable a disabled field when its
/// parameter is submitted, bind, validate and queue the listener.
pub fn process_field<F: Field + ?Sized>(field: &mut F, ctx: &mut Context) -> bool {
    if field.field_state().is_disabled() {
        if ctx.has_request_parameter(field.field_state().name()) {
            field.field_state_mut().set_disabled(false);
        } else {
            return true;
        }
    }

    field.bind_request_value(ctx);
    if field.field_state().validates() {
        field.validate(ctx.messages());
    }
    field.field_state().dispatch(ctx);
    true
}

/// Chainable configuration shared by every field.
pub trait FieldBuilder: Field + Sized {
    /// Set the display label.
    fn with_label(mut self, label: impl Into<String>) -> Self {
        self.field_state_mut().set_label(label);
        self
    }

    /// Set the initial value.
    fn with_value(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        self.set_value(&value);
        self
    }

    /// Require a value.
    fn required(mut self, required: bool) -> Self {
        self.field_state_mut().set_required(required);
        self
    }

    /// Disable the field.
    fn disabled(mut self, disabled: bool) -> Self {
        self.field_state_mut().set_disabled(disabled);
        self
    }

    /// Make the field read-only.
    fn readonly(mut self, readonly: bool) -> Self {
        self.field_state_mut().set_readonly(readonly);
        self
    }

    /// Set the title text.
    fn with_title(mut self, title: impl Into<String>) -> Self {
        self.field_state_mut().set_title(title);
        self
    }

    /// Set the page listener fired when the field is processed.
    fn with_listener(mut self, listener: impl Into<String>) -> Self {
        self.field_state_mut().set_listener(listener);
        self
    }

    /// Set an extra HTML attribute.
    fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.field_state_mut().set_attribute(name, value);
        self
    }
}

impl<F: Field> FieldBuilder for F {}
