//! Error types for the component framework.

use thiserror::Error;

/// Errors raised while building or processing a page.
///
/// Binding and validation problems are never reported here: they are
/// recorded on the offending field and surfaced when the form renders.
#[derive(Error, Debug)]
pub enum ClickError {
    /// A container already holds a control with this name.
    #[error("container already contains control named: {0}")]
    DuplicateControl(String),

    /// A control was added without a usable name.
    #[error("control name not defined")]
    BlankControlName,

    /// The page model already holds a value with this name.
    #[error("model already contains value named: {0}")]
    DuplicateModel(String),

    /// A queued action event named a listener the page does not handle.
    #[error("page {page} has no listener named {listener}")]
    UnknownListener { page: String, listener: String },

    /// A listener returned an application error.
    #[error("listener {listener} failed")]
    Listener {
        listener: String,
        #[source]
        source: anyhow::Error,
    },

    /// Navigation or lifecycle misuse (redirect and forward both set, etc).
    #[error("illegal state: {0}")]
    IllegalState(String),

    /// The template renderer failed.
    #[error("render error: {0}")]
    Render(String),

    /// Model serialization failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other application error raised from a page hook.
    #[error(transparent)]
    Application(#[from] anyhow::Error),
}

impl ClickError {
    /// Shorthand for an illegal state error.
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        ClickError::IllegalState(msg.into())
    }

    /// Wrap an application error raised by the named listener.
    pub fn listener(listener: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        ClickError::Listener {
            listener: listener.into(),
            source: source.into(),
        }
    }

    /// Check if this error comes from page navigation.
    pub fn is_illegal_state(&self) -> bool {
        matches!(self, ClickError::IllegalState(_))
    }
}

/// Result alias used throughout the framework.
pub type Result<T, E = ClickError> = std::result::Result<T, E>;
