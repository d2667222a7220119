//! Field sets: labelled groups of fields inside a form.

use std::fmt;

use click_core::{
    impl_as_any, ClickError, Context, Control, HtmlStringBuffer, Messages, Result, FORM_NAME,
};
use serde_json::Value;

use crate::field::{field_names, find_field, Field, FieldState};
use crate::form::{render_field_rows, render_hidden_fields};

/// Group of fields rendered as a `<fieldset>` with a `<legend>`.
///
/// A field set is added to a [`Form`](crate::Form) like any field. The
/// form binds, validates and copies its nested fields as if they were
/// its own; names stay unique across the whole form. Add the nested
/// fields before adding the set to its form.
pub struct FieldSet {
    state: FieldState,
    fields: Vec<Box<dyn Field>>,
}

impl FieldSet {
    /// Create an empty field set. The legend defaults from the name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: FieldState::new(name),
            fields: Vec::new(),
        }
    }

    /// Set the legend text.
    pub fn with_legend(mut self, legend: impl Into<String>) -> Self {
        self.state.set_label(legend);
        self
    }

    /// Add a field and return the set.
    pub fn with_field<F: Field>(mut self, field: F) -> Result<Self> {
        self.add(field)?;
        Ok(self)
    }

    /// Add a field. Buttons belong to the form, not to a field set.
    pub fn add<F: Field>(&mut self, field: F) -> Result<()> {
        if field.name().trim().is_empty() {
            return Err(ClickError::BlankControlName);
        }
        for name in field_names(&field) {
            if name == FORM_NAME || name == self.state.name() || self.contains(&name) {
                return Err(ClickError::DuplicateControl(name));
            }
        }
        if field.is_button() {
            return Err(ClickError::illegal_state(format!(
                "button {} cannot be added to field set {}",
                field.name(),
                self.state.name()
            )));
        }

        self.fields.push(Box::new(field));
        Ok(())
    }

    /// Check whether a nested field has this name.
    pub fn contains(&self, name: &str) -> bool {
        find_field(&self.fields, name).is_some()
    }

    /// Legend text.
    pub fn legend(&self) -> String {
        self.state.label()
    }
}

impl Control for FieldSet {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn id(&self) -> String {
        self.state.id()
    }

    fn on_init(&mut self, ctx: &mut Context) -> Result<()> {
        for field in self.fields.iter_mut() {
            field.on_init(ctx)?;
        }
        Ok(())
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        for field in self.fields.iter_mut() {
            field.bind_request_value(ctx);
        }
    }

    fn on_process(&mut self, ctx: &mut Context) -> bool {
        for field in self.fields.iter_mut() {
            if !field.on_process(ctx) {
                return false;
            }
        }
        true
    }

    fn on_render(&mut self, ctx: &Context) {
        for field in self.fields.iter_mut() {
            field.on_render(ctx);
        }
    }

    fn on_destroy(&mut self) {
        for field in self.fields.iter_mut() {
            field.on_destroy();
        }
    }

    fn render(&self, ctx: &Context, buffer: &mut HtmlStringBuffer) {
        buffer
            .element_start("fieldset")
            .append_attribute("id", self.state.id())
            .append_attributes(self.state.attributes())
            .close_tag()
            .append("\n<legend>")
            .append_escaped(self.legend())
            .append("</legend>\n<table class=\"fields\">\n");
        render_field_rows(&self.fields, ctx, buffer);
        buffer.append("</table>\n");
        render_hidden_fields(&self.fields, ctx, buffer);
        buffer.append("</fieldset>");
    }

    fn html_imports(&self, ctx: &Context) -> Option<String> {
        let imports: Vec<String> = self.fields.iter().filter_map(|f| f.html_imports(ctx)).collect();
        if imports.is_empty() {
            None
        } else {
            Some(imports.join("\n"))
        }
    }

    impl_as_any!();
}

impl Field for FieldSet {
    fn field_state(&self) -> &FieldState {
        &self.state
    }

    fn field_state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }

    fn value_object(&self) -> Value {
        Value::Null
    }

    fn set_value_object(&mut self, _value: &Value) {}

    /// Nested fields validate themselves while processing.
    fn validate(&mut self, _messages: &Messages) {}

    fn is_container(&self) -> bool {
        true
    }

    fn fields(&self) -> &[Box<dyn Field>] {
        &self.fields
    }

    fn fields_mut(&mut self) -> &mut [Box<dyn Field>] {
        &mut self.fields
    }
}

impl fmt::Debug for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSet")
            .field("name", &self.state.name())
            .field(
                "fields",
                &self.fields.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::Submit;
    use crate::field::FieldBuilder;
    use crate::form::Form;
    use crate::number::IntegerField;
    use crate::text::{HiddenField, TextField};
    use click_core::mock::MockContext;
    use serde_json::json;

    fn address() -> FieldSet {
        FieldSet::new("address")
            .with_legend("Postal Address")
            .with_field(TextField::new("street").required(true))
            .unwrap()
            .with_field(TextField::new("city"))
            .unwrap()
            .with_field(HiddenField::new("country", "NZ"))
            .unwrap()
    }

    fn customer_form() -> Form {
        let mut form = Form::new("customer");
        form.add(TextField::new("name")).unwrap();
        form.add(address()).unwrap();
        form.add(IntegerField::new("age")).unwrap();
        form.add(Submit::new("save")).unwrap();
        form
    }

    #[test]
    fn test_names_unique_across_form() {
        let mut form = customer_form();

        assert!(matches!(
            form.add(TextField::new("city")),
            Err(ClickError::DuplicateControl(_))
        ));
        let clash = FieldSet::new("other").with_field(TextField::new("name")).unwrap();
        assert!(matches!(form.add(clash), Err(ClickError::DuplicateControl(_))));

        let mut set = address();
        assert!(matches!(
            set.add(TextField::new("street")),
            Err(ClickError::DuplicateControl(_))
        ));
        assert!(matches!(set.add(Submit::new("go")), Err(ClickError::IllegalState(_))));
    }

    #[test]
    fn test_form_binds_and_validates_nested_fields() {
        let mut form = customer_form();
        let mut ctx = MockContext::post("/")
            .param("form_name", "customer")
            .param("name", "Ada")
            .param("city", "Wellington")
            .param("age", "36")
            .build();
        form.on_process(&mut ctx);

        assert_eq!(form.field_value("city"), Some("Wellington"));
        assert!(!form.is_valid());
        assert_eq!(
            form.field::<TextField>("street").unwrap().field_state().error(),
            Some("You must enter a value for Street")
        );
        assert_eq!(
            form.to_json(),
            json!({
                "name": "Ada",
                "street": "",
                "city": "Wellington",
                "country": "NZ",
                "age": 36
            })
        );
    }

    #[test]
    fn test_copy_from_reaches_nested_fields() {
        let mut form = customer_form();
        form.copy_from(&json!({"street": "1 Lambton Quay", "age": 40}));

        assert_eq!(form.field_value("street"), Some("1 Lambton Quay"));
        assert_eq!(form.field_value("age"), Some("40"));
        assert_eq!(
            form.field::<TextField>("street").unwrap().id(),
            "customer_street"
        );
    }

    #[test]
    fn test_render_inside_form() {
        let form = customer_form();
        let html = form.to_html(&MockContext::get("/customer.htm").build());

        assert!(html.contains(
            "<tr>\n<td colspan=\"2\"><fieldset id=\"customer_address\">\n\
             <legend>Postal Address</legend>\n<table class=\"fields\">\n"
        ));
        assert!(html.contains("<label for=\"customer_city\">City</label>"));

        let fieldset_end = html.find("</fieldset>").unwrap();
        let country = html.find("name=\"country\"").unwrap();
        let age = html.find("name=\"age\"").unwrap();
        assert!(country < fieldset_end);
        assert!(age > fieldset_end);
    }
}
