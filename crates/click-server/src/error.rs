//! Error types for the request pipeline.

use click_core::ClickError;
use thiserror::Error;

/// Errors raised while configuring or assembling an application.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Two routes share a path.
    #[error("duplicate route: {0}")]
    DuplicateRoute(String),

    /// A route names a page factory that was never registered.
    #[error("route {path} names unknown page factory {page}")]
    UnknownPageFactory { path: String, page: String },

    /// Page processing failed.
    #[error(transparent)]
    Click(#[from] ClickError),
}

impl ServerError {
    /// Shorthand for a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        ServerError::Config(msg.into())
    }
}

/// Result alias for server operations.
pub type Result<T, E = ServerError> = std::result::Result<T, E>;
