//! Page restricted to signed-in users.

use click_controls::PageLink;
use click_core::{Context, Page, PageState, Result};

use crate::data::USER_ATTRIBUTE;

/// Greets the signed-in user; everyone else is sent to the login page.
#[derive(Debug)]
pub struct SecurePage {
    state: PageState,
}

impl SecurePage {
    pub fn new() -> Self {
        Self {
            state: PageState::new().with_title("Secure Page"),
        }
    }
}

impl Default for SecurePage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for SecurePage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_init(&mut self, _ctx: &mut Context) -> Result<()> {
        self.state
            .add_control(PageLink::new("logout", "/logout.htm").with_label("Logout"))
    }

    fn on_security_check(&mut self, ctx: &mut Context) -> Result<bool> {
        if ctx.session_attribute(USER_ATTRIBUTE).is_some() {
            return Ok(true);
        }
        self.state.set_redirect("/login.htm");
        Ok(false)
    }

    fn on_get(&mut self, ctx: &mut Context) -> Result<()> {
        let user = ctx
            .session_attribute(USER_ATTRIBUTE)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        self.state.add_model("greeting", format!("Welcome back, {}", user))
    }
}
