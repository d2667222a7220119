//! HTML forms.
//!
//! A [`Form`] owns its fields and buttons. It processes them only when the
//! request was submitted by this form: the method matches and the
//! `form_name` parameter carries the form's name. Several forms can share
//! a page without binding each other's submissions.

use std::collections::BTreeMap;
use std::fmt;

use click_core::{
    impl_as_any, ClickError, Context, Control, HtmlStringBuffer, Result, FORM_NAME,
};
use http::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::field::{
    field_names, find_field, find_field_mut, for_each_field_mut, leaf_fields, Field,
};

/// Form containing fields and buttons, rendered as a table layout.
pub struct Form {
    name: String,
    method: Method,
    action: Option<String>,
    fields: Vec<Box<dyn Field>>,
    buttons: Vec<Box<dyn Field>>,
    error: Option<String>,
    listener: Option<String>,
    attributes: BTreeMap<String, String>,
    submitted: bool,
}

impl Form {
    /// Create a POST form.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method: Method::POST,
            action: None,
            fields: Vec::new(),
            buttons: Vec::new(),
            error: None,
            listener: None,
            attributes: BTreeMap::new(),
            submitted: false,
        }
    }

    /// Set the submission method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the action URL; defaults to the request URI.
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Set the page listener fired after the form is processed.
    pub fn with_listener(mut self, listener: impl Into<String>) -> Self {
        self.listener = Some(listener.into());
        self
    }

    /// Set an extra HTML attribute on the `<form>` element.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Add a field or button and return the form.
    pub fn with_field<F: Field>(mut self, field: F) -> Result<Self> {
        self.add(field)?;
        Ok(self)
    }

    /// Submission method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Add a field, field set or button.
    ///
    /// Names must be unique within the form, including the fields nested
    /// in field sets, and may not use the reserved `form_name` parameter.
    pub fn add<F: Field>(&mut self, mut field: F) -> Result<()> {
        if field.name().trim().is_empty() {
            return Err(ClickError::BlankControlName);
        }
        for name in field_names(&field) {
            if name == FORM_NAME || self.contains(&name) {
                return Err(ClickError::DuplicateControl(name));
            }
        }

        field.field_state_mut().set_form(self.name.clone());
        let form = self.name.clone();
        for_each_field_mut(field.fields_mut(), &mut |f| {
            f.field_state_mut().set_form(form.clone());
        });
        if field.is_button() {
            self.buttons.push(Box::new(field));
        } else {
            self.fields.push(Box::new(field));
        }
        Ok(())
    }

    /// Remove a top-level field, field set or button by name.
    pub fn remove(&mut self, name: &str) -> Option<Box<dyn Field>> {
        if let Some(index) = self.fields.iter().position(|f| f.name() == name) {
            return Some(self.fields.remove(index));
        }
        let index = self.buttons.iter().position(|f| f.name() == name)?;
        Some(self.buttons.remove(index))
    }

    /// Check whether a field or button has this name, at any depth.
    pub fn contains(&self, name: &str) -> bool {
        find_field(&self.fields, name).is_some() || find_field(&self.buttons, name).is_some()
    }

    fn all(&self) -> impl Iterator<Item = &Box<dyn Field>> {
        self.fields.iter().chain(self.buttons.iter())
    }

    fn all_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Field>> {
        self.fields.iter_mut().chain(self.buttons.iter_mut())
    }

    /// Look up a field or button by name and type, at any depth.
    pub fn field<T: Field>(&self, name: &str) -> Option<&T> {
        find_field(&self.fields, name)
            .or_else(|| find_field(&self.buttons, name))
            .and_then(|f| f.as_any().downcast_ref::<T>())
    }

    /// Look up a field or button by name and type, mutably.
    pub fn field_mut<T: Field>(&mut self, name: &str) -> Option<&mut T> {
        let found = if find_field(&self.fields, name).is_some() {
            find_field_mut(&mut self.fields, name)
        } else {
            find_field_mut(&mut self.buttons, name)
        };
        found.and_then(|f| f.as_any_mut().downcast_mut::<T>())
    }

    /// String value of a field, at any depth.
    pub fn field_value(&self, name: &str) -> Option<&str> {
        find_field(&self.fields, name)
            .filter(|f| !f.is_container())
            .map(|f| f.value())
    }

    /// Top-level fields and field sets in insertion order, excluding
    /// buttons.
    pub fn fields(&self) -> impl Iterator<Item = &dyn Field> {
        self.fields.iter().map(|f| f.as_ref())
    }

    /// Value-carrying fields in order, descending into field sets.
    pub fn leaf_fields(&self) -> Vec<&dyn Field> {
        let mut leaves = Vec::new();
        leaf_fields(&self.fields, &mut leaves);
        leaves
    }

    /// Buttons in insertion order.
    pub fn buttons(&self) -> impl Iterator<Item = &dyn Field> {
        self.buttons.iter().map(|f| f.as_ref())
    }

    /// Form-level error.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Set a form-level error, making the form invalid.
    pub fn set_error(&mut self, error: impl Into<String>) {
        self.error = Some(error.into());
    }

    /// Check that neither the form nor any field has an error.
    pub fn is_valid(&self) -> bool {
        self.error.is_none() && self.leaf_fields().iter().all(|f| f.field_state().is_valid())
    }

    /// Check whether this request submitted the form.
    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    /// Clear the form and field errors.
    pub fn clear_errors(&mut self) {
        self.error = None;
        for_each_field_mut(&mut self.fields, &mut |f| f.field_state_mut().set_error(None));
    }

    /// Clear every field value.
    pub fn clear_values(&mut self) {
        for_each_field_mut(&mut self.fields, &mut |f| {
            if !f.is_container() {
                f.set_value("");
            }
        });
    }

    /// Copy field values into a JSON object, keyed by field name.
    pub fn copy_to(&self, target: &mut Map<String, Value>) {
        for field in self.leaf_fields() {
            target.insert(field.name().to_string(), field.value_object());
        }
    }

    /// Field values as a JSON object.
    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        self.copy_to(&mut object);
        Value::Object(object)
    }

    /// Deserialize the field values into `T`.
    pub fn to_object<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.to_json())?)
    }

    /// Copy values from a JSON object into fields with matching names.
    ///
    /// Keys without a field and fields without a key are left alone.
    pub fn copy_from(&mut self, source: &Value) {
        let Some(object) = source.as_object() else {
            tracing::warn!(form = %self.name, "copy_from expects a JSON object");
            return;
        };
        for_each_field_mut(&mut self.fields, &mut |field| {
            if field.is_container() {
                return;
            }
            if let Some(value) = object.get(field.name()) {
                field.set_value_object(value);
            }
        });
    }

    /// Serialize `value` and copy it into the fields.
    pub fn copy_from_object<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.copy_from(&value);
        Ok(())
    }

    fn is_form_submission(&self, ctx: &Context) -> bool {
        *ctx.method() == self.method
            && ctx.request_parameter(FORM_NAME) == Some(self.name.as_str())
    }

    fn render_error_row(error: &str, buffer: &mut HtmlStringBuffer) {
        buffer
            .append("<tr><td colspan=\"2\" class=\"errors\"><span class=\"error\">")
            .append_escaped(error)
            .append("</span></td></tr>\n");
    }
}

/// Write a table row per visible field: a label cell and a field cell, or
/// a full-width cell for a field set.
pub(crate) fn render_field_rows(
    fields: &[Box<dyn Field>],
    ctx: &Context,
    buffer: &mut HtmlStringBuffer,
) {
    for field in fields.iter().filter(|f| !f.is_hidden()) {
        if field.is_container() {
            buffer.append("<tr>\n<td colspan=\"2\">");
            field.render(ctx, buffer);
            buffer.append("</td>\n</tr>\n");
        } else {
            render_label_row(field.as_ref(), ctx, buffer);
        }
    }
}

/// Write the hidden fields, one per line.
pub(crate) fn render_hidden_fields(
    fields: &[Box<dyn Field>],
    ctx: &Context,
    buffer: &mut HtmlStringBuffer,
) {
    for field in fields.iter().filter(|f| f.is_hidden()) {
        field.render(ctx, buffer);
        buffer.append("\n");
    }
}

fn render_label_row(field: &dyn Field, ctx: &Context, buffer: &mut HtmlStringBuffer) {
    let state = field.field_state();
    let messages = ctx.messages();

    buffer.append("<tr>\n<td class=\"label\" align=\"left\">");
    if state.is_required() {
        buffer.append(messages.text("label-required-prefix"));
    }
    buffer
        .element_start("label")
        .append_attribute("for", state.id());
    if state.is_disabled() {
        buffer.append_attribute("class", "disabled");
    }
    buffer
        .close_tag()
        .append_escaped(state.label())
        .element_end_tag("label");
    if state.is_required() {
        buffer.append(messages.text("label-required-postfix"));
    }
    buffer.append("</td>\n<td align=\"left\">");
    field.render(ctx, buffer);
    buffer.append("</td>\n</tr>\n");
}

impl Control for Form {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_init(&mut self, ctx: &mut Context) -> Result<()> {
        for field in self.all_mut() {
            field.on_init(ctx)?;
        }
        Ok(())
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        if self.is_form_submission(ctx) {
            for field in self.all_mut() {
                field.bind_request_value(ctx);
            }
        }
    }

    fn on_process(&mut self, ctx: &mut Context) -> bool {
        if !self.is_form_submission(ctx) {
            return true;
        }
        self.submitted = true;
        tracing::debug!(form = %self.name, "processing form submission");

        for field in self.all_mut() {
            if !field.on_process(ctx) {
                return false;
            }
        }

        if let Some(listener) = &self.listener {
            ctx.dispatch_action_event(&self.name, listener);
        }
        true
    }

    fn on_render(&mut self, ctx: &Context) {
        for field in self.all_mut() {
            field.on_render(ctx);
        }
    }

    fn on_destroy(&mut self) {
        for field in self.all_mut() {
            field.on_destroy();
        }
    }

    fn render(&self, ctx: &Context, buffer: &mut HtmlStringBuffer) {
        let action = self.action.clone().unwrap_or_else(|| ctx.request_uri());

        buffer
            .element_start("form")
            .append_attribute("method", self.method.as_str().to_ascii_lowercase())
            .append_attribute("name", &self.name)
            .append_attribute("id", &self.name)
            .append_attribute("action", action)
            .append_attributes(&self.attributes)
            .close_tag()
            .append("\n");
        buffer
            .element_start("input")
            .append_attribute("type", "hidden")
            .append_attribute("name", FORM_NAME)
            .append_attribute("value", &self.name)
            .element_end()
            .append("\n<table class=\"form\">\n");

        render_field_rows(&self.fields, ctx, buffer);

        if self.submitted {
            if let Some(error) = &self.error {
                Self::render_error_row(error, buffer);
            }
            for field in self.leaf_fields() {
                if let Some(error) = field.field_state().error() {
                    Self::render_error_row(error, buffer);
                }
            }
        }

        buffer.append("<tr><td colspan=\"2\" class=\"buttons\" align=\"left\">");
        if self.buttons.is_empty() {
            buffer.append("<input type=\"submit\" value=\"Submit\"/>");
        } else {
            for button in &self.buttons {
                button.render(ctx, buffer);
            }
        }
        buffer.append("</td></tr>\n</table>\n");

        render_hidden_fields(&self.fields, ctx, buffer);

        buffer.append("</form>\n");
    }

    fn html_imports(&self, ctx: &Context) -> Option<String> {
        let imports: Vec<String> = self.all().filter_map(|f| f.html_imports(ctx)).collect();
        if imports.is_empty() {
            None
        } else {
            Some(imports.join("\n"))
        }
    }

    impl_as_any!();
}

impl fmt::Debug for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Form")
            .field("name", &self.name)
            .field("method", &self.method)
            .field(
                "fields",
                &self.fields.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .field(
                "buttons",
                &self.buttons.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .field("submitted", &self.submitted)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::button::Submit;
    use crate::checkbox::Checkbox;
    use crate::field::FieldBuilder;
    use crate::number::IntegerField;
    use crate::select::Select;
    use crate::text::{HiddenField, PasswordField, TextField};
    use click_core::mock::MockContext;
    use serde::Deserialize;
    use serde_json::json;

    fn login_form() -> Form {
        let mut form = Form::new("login").with_listener("on_login");
        form.add(TextField::new("username").required(true)).unwrap();
        form.add(PasswordField::new("password").required(true)).unwrap();
        form.add(HiddenField::new("next", "/home.htm")).unwrap();
        form.add(Submit::new("ok").with_label("Log in").with_listener("on_ok"))
            .unwrap();
        form
    }

    // === Structure Tests ===

    #[test]
    fn test_names_unique() {
        let mut form = login_form();

        assert!(matches!(
            form.add(TextField::new("username")),
            Err(ClickError::DuplicateControl(_))
        ));
        assert!(matches!(
            form.add(Submit::new("ok")),
            Err(ClickError::DuplicateControl(_))
        ));
        assert!(matches!(
            form.add(TextField::new(FORM_NAME)),
            Err(ClickError::DuplicateControl(_))
        ));
        assert!(matches!(form.add(TextField::new("")), Err(ClickError::BlankControlName)));
    }

    #[test]
    fn test_fields_and_buttons_separated() {
        let form = login_form();

        assert_eq!(form.fields().count(), 3);
        assert_eq!(form.buttons().count(), 1);
        assert_eq!(form.field::<TextField>("username").unwrap().id(), "login_username");
        assert!(form.field::<Submit>("ok").is_some());
        assert!(form.field::<Submit>("username").is_none());
    }

    // === Processing Tests ===

    #[test]
    fn test_submission_binds_validates_and_queues() {
        let mut form = login_form();
        let mut ctx = MockContext::post("/login.htm")
            .param("form_name", "login")
            .param("username", "bob")
            .param("password", "secret")
            .param("ok", "Log in")
            .build();

        assert!(form.on_process(&mut ctx));
        assert!(form.is_submitted());
        assert!(form.is_valid());
        assert_eq!(form.field_value("username"), Some("bob"));

        let listeners: Vec<_> = ctx
            .dispatcher()
            .pending()
            .iter()
            .map(|e| e.listener.as_str())
            .collect();
        assert_eq!(listeners, vec!["on_ok", "on_login"]);
    }

    #[test]
    fn test_other_form_name_ignored() {
        let mut form = login_form();
        let mut ctx = MockContext::post("/login.htm")
            .param("form_name", "search")
            .param("username", "bob")
            .build();

        assert!(form.on_process(&mut ctx));
        assert!(!form.is_submitted());
        assert_eq!(form.field_value("username"), Some(""));
        assert!(!ctx.dispatcher().has_action_events());
    }

    #[test]
    fn test_missing_form_name_ignored() {
        let mut form = login_form();
        let mut ctx = MockContext::post("/login.htm").param("username", "bob").build();

        form.on_process(&mut ctx);
        assert!(!form.is_submitted());
    }

    #[test]
    fn test_method_mismatch_ignored() {
        let mut form = login_form();
        let mut ctx = MockContext::get("/login.htm")
            .param("form_name", "login")
            .param("username", "bob")
            .build();

        form.on_process(&mut ctx);
        assert!(!form.is_submitted());
    }

    #[test]
    fn test_get_form() {
        let mut form = Form::new("search").with_method(Method::GET);
        form.add(TextField::new("q")).unwrap();
        let mut ctx = MockContext::get("/search.htm")
            .param("form_name", "search")
            .param("q", "rust")
            .build();

        form.on_process(&mut ctx);
        assert_eq!(form.field_value("q"), Some("rust"));
    }

    #[test]
    fn test_invalid_submission() {
        let mut form = login_form();
        let mut ctx = MockContext::post("/login.htm")
            .param("form_name", "login")
            .param("username", "")
            .build();

        form.on_process(&mut ctx);
        assert!(!form.is_valid());
        assert_eq!(
            form.field::<TextField>("username").unwrap().field_state().error(),
            Some("You must enter a value for Username")
        );
    }

    #[test]
    fn test_form_error() {
        let mut form = login_form();
        assert!(form.is_valid());

        form.set_error("Invalid username or password");
        assert!(!form.is_valid());

        form.clear_errors();
        assert!(form.is_valid());
    }

    #[test]
    fn test_submission_clears_deselected_multiple_select() {
        let mut form = Form::new("f");
        let mut tags = Select::new("tags")
            .with_options([("a", "A"), ("b", "B")])
            .with_multiple(true);
        tags.set_selected_values(vec!["a".to_string()]);
        form.add(tags).unwrap();

        let mut ctx = MockContext::post("/").param("form_name", "f").build();
        form.on_process(&mut ctx);

        assert!(form.is_submitted());
        assert!(form.field::<Select>("tags").unwrap().selected_values().is_empty());
        assert_eq!(form.to_json(), json!({"tags": []}));
    }

    #[test]
    fn test_unsubmitted_form_keeps_multiple_select() {
        let mut form = Form::new("f");
        let mut tags = Select::new("tags").with_option("a", "A").with_multiple(true);
        tags.set_selected_values(vec!["a".to_string()]);
        form.add(tags).unwrap();

        form.on_process(&mut MockContext::post("/").build());

        assert_eq!(
            form.field::<Select>("tags").unwrap().selected_values(),
            ["a".to_string()]
        );
    }

    // === Copy Tests ===

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Customer {
        name: String,
        age: Option<i64>,
        vip: bool,
    }

    fn customer_form() -> Form {
        let mut form = Form::new("customer");
        form.add(TextField::new("name")).unwrap();
        form.add(IntegerField::new("age")).unwrap();
        form.add(Checkbox::new("vip")).unwrap();
        form.add(Submit::new("save")).unwrap();
        form
    }

    #[test]
    fn test_copy_to_object() {
        let mut form = customer_form();
        let mut ctx = MockContext::post("/")
            .param("form_name", "customer")
            .param("name", "Ada")
            .param("age", "36")
            .param("vip", "true")
            .build();
        form.on_process(&mut ctx);

        assert_eq!(form.to_json(), json!({"name": "Ada", "age": 36, "vip": true}));
        let customer: Customer = form.to_object().unwrap();
        assert_eq!(
            customer,
            Customer {
                name: "Ada".to_string(),
                age: Some(36),
                vip: true
            }
        );
    }

    #[test]
    fn test_copy_from_object() {
        let mut form = customer_form();
        form.copy_from_object(&Customer {
            name: "Grace".to_string(),
            age: None,
            vip: true,
        })
        .unwrap();

        assert_eq!(form.field_value("name"), Some("Grace"));
        assert_eq!(form.field_value("age"), Some(""));
        assert!(form.field::<Checkbox>("vip").unwrap().is_checked());
    }

    // === Render Tests ===

    #[test]
    fn test_render_layout() {
        let form = login_form();
        let ctx = MockContext::get("/login.htm").context_path("/app").build();
        let html = form.to_html(&ctx);

        assert!(html.starts_with(
            "<form method=\"post\" name=\"login\" id=\"login\" action=\"/app/login.htm\">\n\
             <input type=\"hidden\" name=\"form_name\" value=\"login\"/>\n<table class=\"form\">\n"
        ));
        assert!(html.contains(
            "<label for=\"login_username\">Username</label><span class=\"required\">*</span>"
        ));
        assert!(html.contains("<input type=\"submit\" name=\"ok\" id=\"login_ok\" value=\"Log in\"/>"));
        assert!(!html.contains("class=\"errors\""));

        let table_end = html.find("</table>").unwrap();
        let hidden = html.find("name=\"next\"").unwrap();
        assert!(hidden > table_end);
        assert!(html.ends_with("</form>\n"));
    }

    #[test]
    fn test_render_errors_after_submission() {
        let mut form = login_form();
        let mut ctx = MockContext::post("/login.htm").param("form_name", "login").build();
        form.on_process(&mut ctx);
        form.set_error("Try again");

        let html = form.to_html(&ctx);
        assert!(html.contains("<span class=\"error\">Try again</span>"));
        assert!(html.contains("<span class=\"error\">You must enter a value for Username</span>"));
    }

    #[test]
    fn test_render_default_button() {
        let mut form = Form::new("f");
        form.add(TextField::new("q")).unwrap();
        let html = form.to_html(&MockContext::get("/").build());

        assert!(html.contains("<input type=\"submit\" value=\"Submit\"/>"));
    }
}
