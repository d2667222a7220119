//! Per-request context.

use std::collections::HashMap;
use std::sync::Arc;

use http::{HeaderMap, Method};
use serde_json::Value;

use crate::dispatcher::ActionEventDispatcher;
use crate::lifecycle::TimingContext;
use crate::messages::Messages;
use crate::params::RequestParams;
use crate::session::{Session, SessionStore};

/// Unique request identifier for tracing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new request ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Create from an existing ID string.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-request accessor for request data, session state and the action
/// event queue.
///
/// A context lives for exactly one request and is handed to every page and
/// control hook.
pub struct Context {
    request_id: RequestId,
    method: Method,
    context_path: String,
    resource_path: String,
    params: RequestParams,
    headers: HeaderMap,
    attributes: HashMap<String, Value>,
    locale: String,
    session: Option<Arc<Session>>,
    session_store: Option<Arc<dyn SessionStore>>,
    session_created: bool,
    forward: bool,
    dispatcher: ActionEventDispatcher,
    messages: Arc<Messages>,
    timing: TimingContext,
}

impl Context {
    /// Create a context for a request to `resource_path`.
    pub fn new(method: Method, resource_path: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::generate(),
            method,
            context_path: String::new(),
            resource_path: resource_path.into(),
            params: RequestParams::new(),
            headers: HeaderMap::new(),
            attributes: HashMap::new(),
            locale: "en".to_string(),
            session: None,
            session_store: None,
            session_created: false,
            forward: false,
            dispatcher: ActionEventDispatcher::new(),
            messages: Arc::new(Messages::new()),
            timing: TimingContext::new(),
        }
    }

    /// Set the request parameters.
    pub fn with_params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }

    /// Set the request headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Set the application context path (e.g. `/shop`).
    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into();
        self
    }

    /// Attach an existing session.
    pub fn with_session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Attach the store used to create sessions on demand.
    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.session_store = Some(store);
        self
    }

    /// Set the message catalogue.
    pub fn with_messages(mut self, messages: Arc<Messages>) -> Self {
        self.messages = messages;
        self
    }

    /// Set the request locale.
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Unique request identifier.
    pub fn request_id(&self) -> &RequestId {
        &self.request_id
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Check if this is a POST request.
    pub fn is_post(&self) -> bool {
        self.method == Method::POST
    }

    /// Check if this is a GET request.
    pub fn is_get(&self) -> bool {
        self.method == Method::GET
    }

    /// Application context path, empty when mounted at the root.
    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    /// Request path relative to the context path.
    pub fn resource_path(&self) -> &str {
        &self.resource_path
    }

    /// Full request URI path (context path plus resource path).
    pub fn request_uri(&self) -> String {
        format!("{}{}", self.context_path, self.resource_path)
    }

    /// All request parameters.
    pub fn params(&self) -> &RequestParams {
        &self.params
    }

    /// First value of a request parameter.
    pub fn request_parameter(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    /// Every value of a request parameter.
    pub fn request_parameter_values(&self, name: &str) -> Vec<&str> {
        self.params.get_all(name)
    }

    /// Check whether a request parameter was submitted.
    pub fn has_request_parameter(&self, name: &str) -> bool {
        self.params.contains(name)
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Request locale.
    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Get a request attribute.
    pub fn request_attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Set a request attribute. A `Null` value removes it.
    pub fn set_request_attribute(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if value.is_null() {
            self.attributes.remove(&name);
        } else {
            self.attributes.insert(name, value);
        }
    }

    /// The current session, if one exists. Never creates a session.
    pub fn existing_session(&self) -> Option<&Arc<Session>> {
        self.session.as_ref()
    }

    /// The current session, created on demand when a store is attached.
    pub fn session(&mut self) -> Option<Arc<Session>> {
        if self.session.is_none() {
            if let Some(store) = &self.session_store {
                self.session = Some(store.create());
                self.session_created = true;
            }
        }
        self.session.clone()
    }

    /// Check whether a new session was created during this request.
    pub fn session_created(&self) -> bool {
        self.session_created
    }

    /// Get a session attribute without creating a session.
    pub fn session_attribute(&self, name: &str) -> Option<Value> {
        self.session.as_ref().and_then(|s| s.attribute(name))
    }

    /// Set a session attribute, creating the session if needed.
    ///
    /// Returns `false` when no session could be created.
    pub fn set_session_attribute(&mut self, name: impl Into<String>, value: Value) -> bool {
        match self.session() {
            Some(session) => {
                session.set_attribute(name, value);
                true
            }
            None => false,
        }
    }

    /// Remove a session attribute without creating a session.
    pub fn remove_session_attribute(&mut self, name: &str) -> Option<Value> {
        self.session.as_ref().and_then(|s| s.remove_attribute(name))
    }

    /// Check if this request was forwarded from another page.
    pub fn is_forward(&self) -> bool {
        self.forward
    }

    /// Re-target the context at a forwarded page path.
    pub fn forward_to(&mut self, resource_path: impl Into<String>) {
        self.resource_path = resource_path.into();
        self.forward = true;
    }

    /// Queue a listener invocation for a control.
    pub fn dispatch_action_event(&mut self, source: &str, listener: &str) {
        self.dispatcher.register(source, listener);
    }

    /// The action event queue.
    pub fn dispatcher(&self) -> &ActionEventDispatcher {
        &self.dispatcher
    }

    /// Mutable access to the action event queue.
    pub fn dispatcher_mut(&mut self) -> &mut ActionEventDispatcher {
        &mut self.dispatcher
    }

    /// Message catalogue.
    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Timing context.
    pub fn timing(&self) -> &TimingContext {
        &self.timing
    }

    /// Mutable timing context.
    pub fn timing_mut(&mut self) -> &mut TimingContext {
        &mut self.timing
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.request_id)
            .field("method", &self.method)
            .field("context_path", &self.context_path)
            .field("resource_path", &self.resource_path)
            .field("params", &self.params)
            .field("forward", &self.forward)
            .field("session", &self.session.as_ref().map(|s| s.id().clone()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;
    use serde_json::json;

    #[test]
    fn test_request_parameters() {
        let ctx = Context::new(Method::GET, "/edit.htm")
            .with_params(RequestParams::parse("id=7&tag=a&tag=b"));

        assert_eq!(ctx.request_parameter("id"), Some("7"));
        assert_eq!(ctx.request_parameter_values("tag"), vec!["a", "b"]);
        assert!(ctx.has_request_parameter("tag"));
        assert!(!ctx.has_request_parameter("missing"));
        assert!(ctx.is_get());
        assert!(!ctx.is_post());
    }

    #[test]
    fn test_request_uri_includes_context_path() {
        let ctx = Context::new(Method::GET, "/login.htm").with_context_path("/shop");

        assert_eq!(ctx.request_uri(), "/shop/login.htm");
        assert_eq!(ctx.resource_path(), "/login.htm");
    }

    #[test]
    fn test_header_case_insensitive() {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "text/html".parse().unwrap());
        let ctx = Context::new(Method::GET, "/").with_headers(headers);

        assert_eq!(ctx.header("Content-Type"), Some("text/html"));
        assert!(ctx.header("accept").is_none());
    }

    #[test]
    fn test_request_attributes() {
        let mut ctx = Context::new(Method::GET, "/");
        ctx.set_request_attribute("flash", json!("saved"));
        assert_eq!(ctx.request_attribute("flash"), Some(&json!("saved")));

        ctx.set_request_attribute("flash", Value::Null);
        assert!(ctx.request_attribute("flash").is_none());
    }

    #[test]
    fn test_session_reads_do_not_create() {
        let store = Arc::new(MemorySessionStore::new());
        let ctx = Context::new(Method::GET, "/").with_session_store(store.clone());

        assert!(ctx.session_attribute("user").is_none());
        assert!(ctx.existing_session().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_session_created_on_write() {
        let store = Arc::new(MemorySessionStore::new());
        let mut ctx = Context::new(Method::POST, "/").with_session_store(store.clone());

        assert!(ctx.set_session_attribute("user", json!("bob")));
        assert!(ctx.session_created());
        assert_eq!(ctx.session_attribute("user"), Some(json!("bob")));
        assert_eq!(store.len(), 1);
        assert_eq!(ctx.remove_session_attribute("user"), Some(json!("bob")));
    }

    #[test]
    fn test_session_without_store() {
        let mut ctx = Context::new(Method::GET, "/");

        assert!(ctx.session().is_none());
        assert!(!ctx.set_session_attribute("user", json!("bob")));
    }

    #[test]
    fn test_forward_to() {
        let mut ctx = Context::new(Method::GET, "/a.htm");
        ctx.forward_to("/b.htm");

        assert!(ctx.is_forward());
        assert_eq!(ctx.resource_path(), "/b.htm");
    }

    #[test]
    fn test_dispatch_action_event() {
        let mut ctx = Context::new(Method::GET, "/");
        ctx.dispatch_action_event("link", "on_click");

        assert_eq!(ctx.dispatcher().pending().len(), 1);
        assert_eq!(ctx.dispatcher_mut().take()[0].listener, "on_click");
    }
}
