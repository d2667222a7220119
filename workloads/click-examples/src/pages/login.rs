//! Login and logout.

use click_controls::{FieldBuilder, Form, PasswordField, Submit, TextField};
use click_core::{Context, Page, PageState, Result};
use serde_json::Value;

use crate::data::{authenticate, USER_ATTRIBUTE};

/// Login form. A valid sign-in stores the user in the session and
/// redirects to the secure page.
#[derive(Debug)]
pub struct LoginPage {
    state: PageState,
}

impl LoginPage {
    pub fn new() -> Self {
        Self {
            state: PageState::new().with_title("Login"),
        }
    }

    fn form(&self) -> Option<&Form> {
        self.state.control::<Form>("form")
    }

    fn on_ok(&mut self, ctx: &mut Context) -> bool {
        let Some(form) = self.form() else {
            return true;
        };
        if !form.is_valid() {
            return true;
        }
        let username = form.field_value("username").unwrap_or_default().trim().to_string();
        let password = form.field_value("password").unwrap_or_default().to_string();

        if !authenticate(&username, &password) {
            tracing::info!(username = %username, "login rejected");
            if let Some(form) = self.state.control_mut::<Form>("form") {
                form.set_error("Invalid user name or password");
            }
            return true;
        }

        tracing::info!(username = %username, "user signed in");
        ctx.set_session_attribute(USER_ATTRIBUTE, Value::String(username));
        self.state.set_redirect("/secure.htm");
        false
    }
}

impl Default for LoginPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for LoginPage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_init(&mut self, _ctx: &mut Context) -> Result<()> {
        let mut form = Form::new("form");
        form.add(
            TextField::new("username")
                .with_min_length(3)
                .with_label("User Name")
                .required(true),
        )?;
        form.add(PasswordField::new("password").required(true))?;
        form.add(Submit::new("ok").with_label(" OK ").with_listener("on_ok"))?;
        form.add(Submit::new("cancel").with_label("Cancel").with_listener("on_cancel"))?;
        self.state.add_control(form)
    }

    fn on_action(&mut self, listener: &str, _source: &str, ctx: &mut Context) -> Result<bool> {
        match listener {
            "on_ok" => Ok(self.on_ok(ctx)),
            "on_cancel" => {
                self.state.set_redirect("/home.htm");
                Ok(false)
            }
            _ => Err(self.unknown_listener(listener)),
        }
    }
}

/// Ends the session and returns to the home page.
#[derive(Debug, Default)]
pub struct LogoutPage {
    state: PageState,
}

impl LogoutPage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Page for LogoutPage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_get(&mut self, ctx: &mut Context) -> Result<()> {
        if let Some(session) = ctx.existing_session() {
            tracing::info!(session_id = %session.id(), "user signed out");
            session.invalidate();
        }
        self.state.set_redirect("/home.htm");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use click_core::mock::MockContext;
    use click_core::{Navigation, PageLifecycle};
    use serde_json::json;

    fn submit(params: &[(&str, &str)]) -> (LoginPage, Context, Navigation) {
        let mut builder = MockContext::post("/login.htm").param("form_name", "form");
        for (name, value) in params {
            builder = builder.param(*name, *value);
        }
        let mut ctx = builder.session_store(Default::default()).build();
        let mut page = LoginPage::new();
        let navigation = PageLifecycle::new().process(&mut page, &mut ctx).unwrap();
        (page, ctx, navigation)
    }

    #[test]
    fn test_valid_login_redirects() {
        let (_, ctx, navigation) = submit(&[
            ("username", "admin"),
            ("password", "admin123"),
            ("ok", " OK "),
        ]);

        assert_eq!(navigation, Navigation::Redirect("/secure.htm".to_string()));
        assert_eq!(ctx.session_attribute(USER_ATTRIBUTE), Some(json!("admin")));
        assert!(ctx.session_created());
    }

    #[test]
    fn test_wrong_password_sets_form_error() {
        let (page, ctx, navigation) = submit(&[
            ("username", "admin"),
            ("password", "nope"),
            ("ok", " OK "),
        ]);

        assert_eq!(navigation, Navigation::Render);
        let form = page.state().control::<Form>("form").unwrap();
        assert_eq!(form.error(), Some("Invalid user name or password"));
        assert!(ctx.session_attribute(USER_ATTRIBUTE).is_none());
    }

    #[test]
    fn test_missing_fields_fail_validation() {
        let (page, _, navigation) = submit(&[("username", "ad"), ("ok", " OK ")]);

        assert_eq!(navigation, Navigation::Render);
        let form = page.state().control::<Form>("form").unwrap();
        assert!(!form.is_valid());
        assert!(form.error().is_none());
    }

    #[test]
    fn test_cancel_skips_validation_result() {
        let (_, _, navigation) = submit(&[("cancel", "Cancel")]);
        assert_eq!(navigation, Navigation::Redirect("/home.htm".to_string()));
    }

    #[test]
    fn test_logout_invalidates_session() {
        let mut ctx = MockContext::get("/logout.htm")
            .session_attribute(USER_ATTRIBUTE, json!("admin"))
            .build();
        let session = ctx.existing_session().unwrap().clone();
        let mut page = LogoutPage::new();

        let navigation = PageLifecycle::new().process(&mut page, &mut ctx).unwrap();

        assert_eq!(navigation, Navigation::Redirect("/home.htm".to_string()));
        assert!(session.is_invalidated());
    }
}
