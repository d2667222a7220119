//! Home page and the index forward.

use click_controls::PageLink;
use click_core::{Context, Page, PageState, Result};

use super::EXAMPLES;
use crate::data::USER_ATTRIBUTE;

/// Links to every example.
#[derive(Debug)]
pub struct HomePage {
    state: PageState,
}

impl HomePage {
    pub fn new() -> Self {
        Self {
            state: PageState::new().with_title("Click Examples"),
        }
    }
}

impl Default for HomePage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for HomePage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_init(&mut self, _ctx: &mut Context) -> Result<()> {
        for (name, path, label) in EXAMPLES {
            self.state
                .add_control(PageLink::new(*name, *path).with_label(*label))?;
        }
        Ok(())
    }

    fn on_get(&mut self, ctx: &mut Context) -> Result<()> {
        if let Some(user) = ctx.session_attribute(USER_ATTRIBUTE) {
            self.state.add_model("user", user)?;
        }
        Ok(())
    }
}

/// Forwards `/index.htm` to the home page.
#[derive(Debug, Default)]
pub struct IndexPage {
    state: PageState,
}

impl IndexPage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Page for IndexPage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_init(&mut self, _ctx: &mut Context) -> Result<()> {
        self.state.set_forward("/home.htm");
        Ok(())
    }
}
