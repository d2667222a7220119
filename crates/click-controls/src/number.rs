//! Numeric input fields.
//!
//! Values are kept as submitted text; parsing happens during validation
//! and a value that fails to parse becomes a field error.

use click_core::{impl_as_any, Context, Control, HtmlStringBuffer, Messages};
use serde_json::{Number, Value};

use crate::field::{process_field, Field, FieldState};
use crate::text::TextField;

/// Whole-number input with an optional range.
#[derive(Debug, Clone)]
pub struct IntegerField {
    input: TextField,
    min_value: Option<i64>,
    max_value: Option<i64>,
}

impl IntegerField {
    /// Create an integer field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            input: TextField::new(name).with_size(10),
            min_value: None,
            max_value: None,
        }
    }

    /// Smallest accepted value.
    pub fn with_min_value(mut self, min_value: i64) -> Self {
        self.min_value = Some(min_value);
        self
    }

    /// Largest accepted value.
    pub fn with_max_value(mut self, max_value: i64) -> Self {
        self.max_value = Some(max_value);
        self
    }

    /// Set the `size` attribute.
    pub fn with_size(mut self, size: usize) -> Self {
        self.input = self.input.with_size(size);
        self
    }

    /// Parsed value, `None` when blank or not a whole number.
    pub fn integer(&self) -> Option<i64> {
        self.value().trim().parse().ok()
    }

    /// Set the value from an integer.
    pub fn set_integer(&mut self, value: i64) {
        self.set_value(&value.to_string());
    }
}

impl Control for IntegerField {
    fn name(&self) -> &str {
        self.input.name()
    }

    fn id(&self) -> String {
        self.input.id()
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        self.input.bind_request_value(ctx);
    }

    fn on_process(&mut self, ctx: &mut Context) -> bool {
        process_field(self, ctx)
    }

    fn render(&self, ctx: &Context, buffer: &mut HtmlStringBuffer) {
        self.input.render(ctx, buffer);
    }

    impl_as_any!();
}

impl Field for IntegerField {
    fn field_state(&self) -> &FieldState {
        self.input.field_state()
    }

    fn field_state_mut(&mut self) -> &mut FieldState {
        self.input.field_state_mut()
    }

    fn value_object(&self) -> Value {
        self.integer().map(Value::from).unwrap_or(Value::Null)
    }

    fn validate(&mut self, messages: &Messages) {
        let state = self.input.field_state_mut();
        state.set_error(None);
        if !state.validate_required(messages) {
            return;
        }

        let label = state.label();
        let error = match state.value().trim().parse::<i64>() {
            Err(_) => Some(messages.format("integer-format-error", &[&label])),
            Ok(n) => range_error(n, self.min_value, self.max_value, &label, messages),
        };
        state.set_error(error);
    }
}

/// Decimal number input with an optional range.
#[derive(Debug, Clone)]
pub struct DoubleField {
    input: TextField,
    min_value: Option<f64>,
    max_value: Option<f64>,
}

impl DoubleField {
    /// Create a decimal field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            input: TextField::new(name).with_size(10),
            min_value: None,
            max_value: None,
        }
    }

    /// Smallest accepted value.
    pub fn with_min_value(mut self, min_value: f64) -> Self {
        self.min_value = Some(min_value);
        self
    }

    /// Largest accepted value.
    pub fn with_max_value(mut self, max_value: f64) -> Self {
        self.max_value = Some(max_value);
        self
    }

    /// Set the `size` attribute.
    pub fn with_size(mut self, size: usize) -> Self {
        self.input = self.input.with_size(size);
        self
    }

    /// Parsed value, `None` when blank or not a finite number.
    pub fn double(&self) -> Option<f64> {
        parse_double(self.value())
    }

    /// Set the value from a number.
    pub fn set_double(&mut self, value: f64) {
        self.set_value(&value.to_string());
    }
}

fn parse_double(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

fn range_error<T>(
    n: T,
    min: Option<T>,
    max: Option<T>,
    label: &str,
    messages: &Messages,
) -> Option<String>
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if let Some(max) = max.filter(|max| n > *max) {
        return Some(messages.format("number-maxvalue-error", &[&label, &max]));
    }
    if let Some(min) = min.filter(|min| n < *min) {
        return Some(messages.format("number-minvalue-error", &[&label, &min]));
    }
    None
}

impl Control for DoubleField {
    fn name(&self) -> &str {
        self.input.name()
    }

    fn id(&self) -> String {
        self.input.id()
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        self.input.bind_request_value(ctx);
    }

    fn on_process(&mut self, ctx: &mut Context) -> bool {
        process_field(self, ctx)
    }

    fn render(&self, ctx: &Context, buffer: &mut HtmlStringBuffer) {
        self.input.render(ctx, buffer);
    }

    impl_as_any!();
}

impl Field for DoubleField {
    fn field_state(&self) -> &FieldState {
        self.input.field_state()
    }

    fn field_state_mut(&mut self) -> &mut FieldState {
        self.input.field_state_mut()
    }

    fn value_object(&self) -> Value {
        self.double()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }

    fn validate(&mut self, messages: &Messages) {
        let state = self.input.field_state_mut();
        state.set_error(None);
        if !state.validate_required(messages) {
            return;
        }

        let label = state.label();
        let error = match parse_double(state.value()) {
            None => Some(messages.format("double-format-error", &[&label])),
            Some(n) => range_error(n, self.min_value, self.max_value, &label, messages),
        };
        state.set_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldBuilder;
    use click_core::mock::MockContext;
    use serde_json::json;

    fn submit<F: Field>(field: &mut F, value: &str) {
        let mut ctx = MockContext::post("/").param(field.name().to_string(), value).build();
        field.on_process(&mut ctx);
    }

    // === IntegerField Tests ===

    #[test]
    fn test_integer_parses_trimmed() {
        let mut field = IntegerField::new("age");
        submit(&mut field, " 42 ");

        assert!(field.field_state().is_valid());
        assert_eq!(field.integer(), Some(42));
        assert_eq!(field.value_object(), json!(42));
    }

    #[test]
    fn test_integer_format_error() {
        let mut field = IntegerField::new("age");
        submit(&mut field, "4.5");

        assert_eq!(field.field_state().error(), Some("Age must be a whole number"));
        assert_eq!(field.value(), "4.5");
        assert_eq!(field.value_object(), Value::Null);
    }

    #[test]
    fn test_integer_range() {
        let mut field = IntegerField::new("age").with_min_value(18).with_max_value(65);

        submit(&mut field, "12");
        assert_eq!(field.field_state().error(), Some("Age must not be smaller than 18"));

        submit(&mut field, "70");
        assert_eq!(field.field_state().error(), Some("Age must not be larger than 65"));

        submit(&mut field, "30");
        assert!(field.field_state().is_valid());
    }

    #[test]
    fn test_integer_required() {
        let mut field = IntegerField::new("age").required(true);
        submit(&mut field, "");

        assert_eq!(field.field_state().error(), Some("You must enter a value for Age"));
    }

    #[test]
    fn test_integer_overflow_is_format_error() {
        let mut field = IntegerField::new("count");
        submit(&mut field, "99999999999999999999999");

        assert!(!field.field_state().is_valid());
    }

    // === DoubleField Tests ===

    #[test]
    fn test_double_parses() {
        let mut field = DoubleField::new("price").with_min_value(0.0);
        submit(&mut field, "19.95");

        assert!(field.field_state().is_valid());
        assert_eq!(field.double(), Some(19.95));
        assert_eq!(field.value_object(), json!(19.95));
    }

    #[test]
    fn test_double_format_and_range() {
        let mut field = DoubleField::new("price").with_max_value(100.0);

        submit(&mut field, "abc");
        assert_eq!(field.field_state().error(), Some("Price must be a number"));

        submit(&mut field, "NaN");
        assert_eq!(field.field_state().error(), Some("Price must be a number"));

        submit(&mut field, "100.5");
        assert_eq!(field.field_state().error(), Some("Price must not be larger than 100"));
    }

    #[test]
    fn test_set_double_renders() {
        let mut field = DoubleField::new("price");
        field.set_double(2.5);

        let html = field.to_html(&MockContext::get("/").build());
        assert!(html.contains("value=\"2.5\""));
        assert!(html.contains("size=\"10\""));
    }
}
