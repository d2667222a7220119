//! Test helpers for building request contexts without a server.

use std::sync::Arc;

use http::{HeaderMap, HeaderName, HeaderValue, Method};

use crate::context::Context;
use crate::messages::Messages;
use crate::params::RequestParams;
use crate::session::{MemorySessionStore, Session, SessionStore};

/// Builder for a [`Context`] as a page or control under test would see it.
///
/// ```rust,ignore
/// let mut ctx = MockContext::post("/login.htm")
///     .param("form_name", "form")
///     .param("username", "bob")
///     .build();
/// ```
#[derive(Debug)]
pub struct MockContext {
    method: Method,
    path: String,
    context_path: String,
    params: RequestParams,
    headers: HeaderMap,
    messages: Option<Arc<Messages>>,
    session: Option<Arc<Session>>,
    store: Option<Arc<MemorySessionStore>>,
}

impl MockContext {
    /// Start a request with the given method and page path.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            context_path: String::new(),
            params: RequestParams::new(),
            headers: HeaderMap::new(),
            messages: None,
            session: None,
            store: None,
        }
    }

    /// Start a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Start a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Append a request parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.append(name, value);
        self
    }

    /// Append parameters from an encoded query string.
    pub fn query(mut self, encoded: &str) -> Self {
        self.params.extend(RequestParams::parse(encoded));
        self
    }

    /// Add a request header. Invalid names or values are ignored.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            self.headers.append(name, value);
        }
        self
    }

    /// Set the application context path.
    pub fn context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into();
        self
    }

    /// Use a custom message catalogue.
    pub fn messages(mut self, messages: Messages) -> Self {
        self.messages = Some(Arc::new(messages));
        self
    }

    /// Attach an existing session.
    pub fn session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Attach an in-memory session store so sessions are created on demand.
    pub fn session_store(mut self, store: Arc<MemorySessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Attach a fresh session holding one attribute.
    pub fn session_attribute(self, name: &str, value: serde_json::Value) -> Self {
        let store = self
            .store
            .clone()
            .unwrap_or_else(|| Arc::new(MemorySessionStore::new()));
        let session = match &self.session {
            Some(session) => session.clone(),
            None => store.create(),
        };
        session.set_attribute(name, value);
        self.session_store(store).session(session)
    }

    /// Build the context.
    pub fn build(self) -> Context {
        let mut ctx = Context::new(self.method, self.path)
            .with_context_path(self.context_path)
            .with_params(self.params)
            .with_headers(self.headers);
        if let Some(messages) = self.messages {
            ctx = ctx.with_messages(messages);
        }
        if let Some(store) = self.store {
            ctx = ctx.with_session_store(store);
        }
        if let Some(session) = self.session {
            ctx = ctx.with_session(session);
        }
        ctx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_request() {
        let ctx = MockContext::post("/edit.htm")
            .param("id", "3")
            .query("tag=a&tag=b")
            .header("X-Requested-With", "XMLHttpRequest")
            .context_path("/app")
            .build();

        assert!(ctx.is_post());
        assert_eq!(ctx.request_uri(), "/app/edit.htm");
        assert_eq!(ctx.request_parameter("id"), Some("3"));
        assert_eq!(ctx.request_parameter_values("tag"), vec!["a", "b"]);
        assert_eq!(ctx.header("x-requested-with"), Some("XMLHttpRequest"));
    }

    #[test]
    fn test_session_attribute() {
        let ctx = MockContext::get("/").session_attribute("user", json!("bob")).build();

        assert_eq!(ctx.session_attribute("user"), Some(json!("bob")));
        assert!(!ctx.session_created());
    }
}
