//! Request pipeline for the Click component framework.
//!
//! - `ClickApp` - Turns HTTP requests into page lifecycles and responses
//! - `PageRegistry` - Request paths to page factories
//! - `AppConfig` - TOML/JSON application configuration
//! - `TemplateRenderer`, `ShellRenderer` - Render models to HTML
//! - `RequestLogger` - Per-request structured logging
//! - `ErrorPage`, `NotFoundPage` - Built-in fallback pages

mod app;
mod config;
mod error;
mod error_page;
mod logging;
mod registry;
mod render;

pub use app::*;
pub use config::*;
pub use error::*;
pub use error_page::*;
pub use logging::*;
pub use registry::*;
pub use render::*;
