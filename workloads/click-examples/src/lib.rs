//! Example application for the Click component framework.
//!
//! Pages are registered under factory names and routed through
//! [`ROUTES`], the same way a `click.toml` file routes them:
//!
//! ```rust,ignore
//! let app = click_examples::application(click_examples::default_config())?;
//! let response = app.handle(request);
//! ```

pub mod data;
pub mod pages;

use click_server::{AppConfig, ClickApp, ServerError, ShellRenderer};

pub use data::*;
pub use pages::*;

/// Stylesheet linked from every example page.
pub const STYLESHEET: &str = "/assets/style.css";

/// Example routes: request path and page factory name.
pub const ROUTES: &[(&str, &str)] = &[
    ("/index.htm", "index"),
    ("/home.htm", "home"),
    ("/login.htm", "login"),
    ("/logout.htm", "logout"),
    ("/secure.htm", "secure"),
    ("/number-form.htm", "number_form"),
    ("/action-link.htm", "counter"),
    ("/customers.htm", "customers"),
    ("/panel.htm", "panel"),
];

/// Configuration routing every example page.
pub fn default_config() -> AppConfig {
    ROUTES
        .iter()
        .fold(AppConfig::new("click-examples"), |config, (path, page)| {
            config.with_page(*path, *page)
        })
}

/// Build the example application from `config`.
///
/// Every factory name in [`ROUTES`] is registered, so any config routing
/// those names resolves.
pub fn application(config: AppConfig) -> Result<ClickApp, ServerError> {
    let renderer = ShellRenderer::new(config.charset.clone()).with_stylesheet(STYLESHEET);

    ClickApp::builder(config)
        .page("index", IndexPage::new)
        .page("home", HomePage::new)
        .page("login", LoginPage::new)
        .page("logout", LogoutPage::new)
        .page("secure", SecurePage::new)
        .page("number_form", NumberFormPage::new)
        .page("counter", CounterPage::new)
        .page("customers", CustomersPage::new)
        .page("panel", PanelPage::new)
        .renderer(renderer)
        .build()
}
