//! Text input fields.

use click_core::{impl_as_any, Context, Control, HtmlStringBuffer, Messages};

use crate::field::{process_field, Field, FieldState};

/// Default `size` attribute of text inputs.
pub const DEFAULT_TEXT_SIZE: usize = 20;

/// Check the trimmed length of a field value against its limits.
pub(crate) fn validate_length(
    state: &mut FieldState,
    min_length: usize,
    max_length: usize,
    messages: &Messages,
) {
    let length = state.value().trim().chars().count();
    if min_length > 0 && length < min_length {
        let error = messages.format("field-minlength-error", &[&state.label(), &min_length]);
        state.set_error(Some(error));
    } else if max_length > 0 && length > max_length {
        let error = messages.format("field-maxlength-error", &[&state.label(), &max_length]);
        state.set_error(Some(error));
    }
}

/// Single-line text input.
#[derive(Debug, Clone)]
pub struct TextField {
    state: FieldState,
    size: usize,
    min_length: usize,
    max_length: usize,
}

impl TextField {
    /// Create a text field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: FieldState::new(name),
            size: DEFAULT_TEXT_SIZE,
            min_length: 0,
            max_length: 0,
        }
    }

    /// Set the `size` attribute.
    pub fn with_size(mut self, size: usize) -> Self {
        self.size = size;
        self
    }

    /// Require at least this many characters (0 for no limit).
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Allow at most this many characters (0 for no limit).
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Minimum length.
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    /// Maximum length.
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub(crate) fn render_input(
        &self,
        input_type: &str,
        render_value: bool,
        buffer: &mut HtmlStringBuffer,
    ) {
        buffer
            .element_start("input")
            .append_attribute("type", input_type)
            .append_attribute("name", self.state.name())
            .append_attribute("id", self.state.id());
        if render_value {
            buffer.append_attribute("value", self.state.value());
        }
        buffer.append_attribute("size", self.size);
        if self.max_length > 0 {
            buffer.append_attribute("maxlength", self.max_length);
        }
        self.state.render_common_attributes(buffer);
        buffer.element_end();
    }
}

impl Control for TextField {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn id(&self) -> String {
        self.state.id()
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        self.state.bind(ctx);
    }

    fn on_process(&mut self, ctx: &mut Context) -> bool {
        process_field(self, ctx)
    }

    fn render(&self, _ctx: &Context, buffer: &mut HtmlStringBuffer) {
        self.render_input("text", true, buffer);
    }

    impl_as_any!();
}

impl Field for TextField {
    fn field_state(&self) -> &FieldState {
        &self.state
    }

    fn field_state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }

    fn validate(&mut self, messages: &Messages) {
        self.state.set_error(None);
        if self.state.validate_required(messages) {
            validate_length(&mut self.state, self.min_length, self.max_length, messages);
        }
    }
}

/// Password input. The value is never rendered back to the client.
#[derive(Debug, Clone)]
pub struct PasswordField {
    inner: TextField,
}

impl PasswordField {
    /// Create a password field.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: TextField::new(name),
        }
    }

    /// Require at least this many characters.
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.inner = self.inner.with_min_length(min_length);
        self
    }

    /// Allow at most this many characters.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.inner = self.inner.with_max_length(max_length);
        self
    }

    /// Set the `size` attribute.
    pub fn with_size(mut self, size: usize) -> Self {
        self.inner = self.inner.with_size(size);
        self
    }
}

impl Control for PasswordField {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn id(&self) -> String {
        self.inner.id()
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        self.inner.bind_request_value(ctx);
    }

    fn on_process(&mut self, ctx: &mut Context) -> bool {
        process_field(self, ctx)
    }

    fn render(&self, _ctx: &Context, buffer: &mut HtmlStringBuffer) {
        self.inner.render_input("password", false, buffer);
    }

    impl_as_any!();
}

impl Field for PasswordField {
    fn field_state(&self) -> &FieldState {
        &self.inner.state
    }

    fn field_state_mut(&mut self) -> &mut FieldState {
        &mut self.inner.state
    }

    fn validate(&mut self, messages: &Messages) {
        Field::validate(&mut self.inner, messages);
    }
}

/// Multi-line text input.
#[derive(Debug, Clone)]
pub struct TextArea {
    state: FieldState,
    cols: usize,
    rows: usize,
    min_length: usize,
    max_length: usize,
}

impl TextArea {
    /// Create a text area with 20 columns and 3 rows.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            state: FieldState::new(name),
            cols: 20,
            rows: 3,
            min_length: 0,
            max_length: 0,
        }
    }

    /// Set the visible size.
    pub fn with_size(mut self, cols: usize, rows: usize) -> Self {
        self.cols = cols;
        self.rows = rows;
        self
    }

    /// Require at least this many characters.
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Allow at most this many characters.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }
}

impl Control for TextArea {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn id(&self) -> String {
        self.state.id()
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        self.state.bind(ctx);
    }

    fn on_process(&mut self, ctx: &mut Context) -> bool {
        process_field(self, ctx)
    }

    fn render(&self, _ctx: &Context, buffer: &mut HtmlStringBuffer) {
        buffer
            .element_start("textarea")
            .append_attribute("name", self.state.name())
            .append_attribute("id", self.state.id())
            .append_attribute("rows", self.rows)
            .append_attribute("cols", self.cols);
        self.state.render_common_attributes(buffer);
        buffer
            .close_tag()
            .append_escaped(self.state.value())
            .element_end_tag("textarea");
    }

    impl_as_any!();
}

impl Field for TextArea {
    fn field_state(&self) -> &FieldState {
        &self.state
    }

    fn field_state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }

    fn validate(&mut self, messages: &Messages) {
        self.state.set_error(None);
        if self.state.validate_required(messages) {
            validate_length(&mut self.state, self.min_length, self.max_length, messages);
        }
    }
}

/// Hidden input, rendered after the form table without a label.
#[derive(Debug, Clone)]
pub struct HiddenField {
    state: FieldState,
}

impl HiddenField {
    /// Create a hidden field holding `value`.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        let mut state = FieldState::new(name);
        state.set_value(value);
        Self { state }
    }
}

impl Control for HiddenField {
    fn name(&self) -> &str {
        self.state.name()
    }

    fn id(&self) -> String {
        self.state.id()
    }

    fn bind_request_value(&mut self, ctx: &Context) {
        self.state.bind(ctx);
    }

    fn on_process(&mut self, ctx: &mut Context) -> bool {
        process_field(self, ctx)
    }

    fn render(&self, _ctx: &Context, buffer: &mut HtmlStringBuffer) {
        buffer
            .element_start("input")
            .append_attribute("type", "hidden")
            .append_attribute("name", self.state.name())
            .append_attribute("id", self.state.id())
            .append_attribute("value", self.state.value())
            .element_end();
    }

    impl_as_any!();
}

impl Field for HiddenField {
    fn field_state(&self) -> &FieldState {
        &self.state
    }

    fn field_state_mut(&mut self) -> &mut FieldState {
        &mut self.state
    }

    fn validate(&mut self, _messages: &Messages) {}

    fn is_hidden(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldBuilder;
    use click_core::mock::MockContext;
    use click_core::RequestParams;

    // === TextField Tests ===

    #[test]
    fn test_text_field_binds_only_when_present() {
        let mut field = TextField::new("city").with_value("Paris");

        field.on_process(&mut MockContext::post("/").build());
        assert_eq!(field.value(), "Paris");

        field.on_process(&mut MockContext::post("/").param("city", "Rome").build());
        assert_eq!(field.value(), "Rome");
    }

    #[test]
    fn test_text_field_required() {
        let mut field = TextField::new("city").required(true);
        field.on_process(&mut MockContext::post("/").param("city", "  ").build());

        assert_eq!(field.field_state().error(), Some("You must enter a value for City"));
    }

    #[test]
    fn test_text_field_length_limits() {
        let mut field = TextField::new("code").with_min_length(3).with_max_length(5);

        field.on_process(&mut MockContext::post("/").param("code", "ab").build());
        assert_eq!(
            field.field_state().error(),
            Some("Code must be at least 3 characters")
        );

        field.on_process(&mut MockContext::post("/").param("code", "abcdef").build());
        assert_eq!(
            field.field_state().error(),
            Some("Code must be no longer than 5 characters")
        );

        field.on_process(&mut MockContext::post("/").param("code", "abcd").build());
        assert!(field.field_state().is_valid());
    }

    #[test]
    fn test_text_field_optional_blank_is_valid() {
        let mut field = TextField::new("code").with_min_length(3);
        field.on_process(&mut MockContext::post("/").param("code", "").build());

        assert!(field.field_state().is_valid());
    }

    #[test]
    fn test_text_field_render_escapes_value() {
        let field = TextField::new("q").with_value("a\"<b>").with_max_length(10);
        let html = field.to_html(&MockContext::get("/").build());

        assert_eq!(
            html,
            "<input type=\"text\" name=\"q\" id=\"q\" value=\"a&quot;&lt;b&gt;\" size=\"20\" maxlength=\"10\"/>"
        );
    }

    #[test]
    fn test_text_field_round_trip() {
        let ctx = MockContext::get("/").build();
        let field = TextField::new("q").with_value("fish & chips \"hot\"");
        let html = field.to_html(&ctx);

        let start = html.find("value=\"").unwrap() + 7;
        let end = start + html[start..].find('"').unwrap();
        let submitted = html[start..end]
            .replace("&quot;", "\"")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&#39;", "'")
            .replace("&amp;", "&");

        let mut params = RequestParams::new();
        params.append("q", submitted);
        let mut again = TextField::new("q");
        let mut ctx = click_core::Context::new(http::Method::POST, "/").with_params(params);
        again.on_process(&mut ctx);

        assert_eq!(again.value(), field.value());
    }

    #[test]
    fn test_disabled_field_ignored_unless_submitted() {
        let mut field = TextField::new("city").with_value("Paris").disabled(true).required(true);

        field.on_process(&mut MockContext::post("/").build());
        assert_eq!(field.value(), "Paris");
        assert!(field.field_state().is_disabled());

        field.on_process(&mut MockContext::post("/").param("city", "Rome").build());
        assert_eq!(field.value(), "Rome");
        assert!(!field.field_state().is_disabled());
    }

    #[test]
    fn test_field_listener_queued() {
        let mut field = TextField::new("q").with_listener("on_search");
        let mut ctx = MockContext::post("/").param("q", "x").build();
        field.on_process(&mut ctx);

        assert_eq!(ctx.dispatcher().pending()[0].listener, "on_search");
        assert_eq!(ctx.dispatcher().pending()[0].source, "q");
    }

    // === PasswordField Tests ===

    #[test]
    fn test_password_never_renders_value() {
        let mut field = PasswordField::new("password").with_min_length(4);
        field.on_process(&mut MockContext::post("/").param("password", "secret").build());

        assert_eq!(field.value(), "secret");
        let html = field.to_html(&MockContext::get("/").build());
        assert!(html.starts_with("<input type=\"password\""));
        assert!(!html.contains("secret"));
        assert!(!html.contains("value="));
    }

    // === TextArea Tests ===

    #[test]
    fn test_text_area_render() {
        let field = TextArea::new("notes").with_size(40, 5).with_value("<hi>");
        let html = field.to_html(&MockContext::get("/").build());

        assert_eq!(
            html,
            "<textarea name=\"notes\" id=\"notes\" rows=\"5\" cols=\"40\">&lt;hi&gt;</textarea>"
        );
    }

    #[test]
    fn test_text_area_max_length() {
        let mut field = TextArea::new("notes").with_max_length(3);
        field.on_process(&mut MockContext::post("/").param("notes", "long text").build());

        assert!(!field.field_state().is_valid());
    }

    // === HiddenField Tests ===

    #[test]
    fn test_hidden_field() {
        let mut field = HiddenField::new("id", "7");
        assert!(field.is_hidden());

        field.on_process(&mut MockContext::post("/").param("id", "8").build());
        assert_eq!(field.value(), "8");
        assert_eq!(
            field.to_html(&MockContext::get("/").build()),
            "<input type=\"hidden\" name=\"id\" id=\"id\" value=\"8\"/>"
        );
    }
}
