//! Built-in error and not-found pages.

use click_core::{Context, Page, PageState, Result};
use http::StatusCode;
use serde_json::Value;

/// Request attribute holding the error message while the error page runs.
pub const ERROR_ATTRIBUTE: &str = "error";

/// Request attribute holding the error chain, outside production mode.
pub const ERROR_DETAIL_ATTRIBUTE: &str = "error_detail";

/// Template of the built-in error page.
pub const ERROR_TEMPLATE: &str = "/click/error.htm";

/// Template of the built-in not-found page.
pub const NOT_FOUND_TEMPLATE: &str = "/click/not-found.htm";

/// Page rendered with status 500 when processing fails.
///
/// Reads the error from the request attributes set by the pipeline; the
/// detail is only present outside production mode.
#[derive(Debug)]
pub struct ErrorPage {
    state: PageState,
}

impl Default for ErrorPage {
    fn default() -> Self {
        let mut state = PageState::new().with_title("Error");
        state.set_template(ERROR_TEMPLATE);
        Self { state }
    }
}

impl ErrorPage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Page for ErrorPage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_init(&mut self, ctx: &mut Context) -> Result<()> {
        self.state.set_status(StatusCode::INTERNAL_SERVER_ERROR);
        let message = ctx
            .request_attribute(ERROR_ATTRIBUTE)
            .cloned()
            .unwrap_or_else(|| Value::String("The application encountered an error".into()));
        self.state.add_model("error", message)?;
        if let Some(detail) = ctx.request_attribute(ERROR_DETAIL_ATTRIBUTE) {
            self.state.add_model("detail", detail.clone())?;
        }
        Ok(())
    }
}

/// Page rendered with status 404 for unregistered paths.
#[derive(Debug)]
pub struct NotFoundPage {
    state: PageState,
}

impl Default for NotFoundPage {
    fn default() -> Self {
        let mut state = PageState::new().with_title("Page Not Found");
        state.set_template(NOT_FOUND_TEMPLATE);
        Self { state }
    }
}

impl NotFoundPage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Page for NotFoundPage {
    fn state(&self) -> &PageState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn on_init(&mut self, ctx: &mut Context) -> Result<()> {
        self.state.set_status(StatusCode::NOT_FOUND);
        let resource = format!("{}{}", ctx.context_path(), ctx.resource_path());
        self.state.add_model("resource", resource)
    }
}
