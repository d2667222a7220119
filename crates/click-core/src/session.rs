//! Session state shared between requests of one client.
//!
//! The control tree is rebuilt for every request, so sessions are the only
//! state that outlives a request. Access is synchronized here, by the host,
//! never by controls.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A unique session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Create a new session ID from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a new random session ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Get the session ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug)]
struct SessionInner {
    attributes: HashMap<String, Value>,
    last_accessed: DateTime<Utc>,
}

/// A client session holding named attributes.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    created_at: DateTime<Utc>,
    invalidated: AtomicBool,
    inner: RwLock<SessionInner>,
}

impl Session {
    /// Create a new empty session.
    pub fn new(id: SessionId) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            invalidated: AtomicBool::new(false),
            inner: RwLock::new(SessionInner {
                attributes: HashMap::new(),
                last_accessed: now,
            }),
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// When the session was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the session was last accessed.
    pub fn last_accessed(&self) -> DateTime<Utc> {
        self.inner.read().last_accessed
    }

    /// Record an access now.
    pub fn touch(&self) {
        self.inner.write().last_accessed = Utc::now();
    }

    /// Get an attribute value.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        self.inner.read().attributes.get(name).cloned()
    }

    /// Set an attribute. A `Null` value removes it.
    pub fn set_attribute(&self, name: impl Into<String>, value: Value) {
        let name = name.into();
        let mut inner = self.inner.write();
        if value.is_null() {
            inner.attributes.remove(&name);
        } else {
            inner.attributes.insert(name, value);
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&self, name: &str) -> Option<Value> {
        self.inner.write().attributes.remove(name)
    }

    /// Names of all attributes, sorted.
    pub fn attribute_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.read().attributes.keys().cloned().collect();
        names.sort();
        names
    }

    /// Mark the session invalid and drop its attributes.
    pub fn invalidate(&self) {
        self.invalidated.store(true, Ordering::SeqCst);
        self.inner.write().attributes.clear();
    }

    /// Check if the session has been invalidated.
    pub fn is_invalidated(&self) -> bool {
        self.invalidated.load(Ordering::SeqCst)
    }

    /// Check if the session has been idle longer than `idle_timeout`.
    pub fn is_expired(&self, idle_timeout: Duration) -> bool {
        Utc::now() - self.last_accessed() > idle_timeout
    }
}

/// Storage for sessions, owned by the host.
pub trait SessionStore: Send + Sync {
    /// Look up a live session, recording the access.
    fn get(&self, id: &str) -> Option<Arc<Session>>;

    /// Create and store a new session.
    fn create(&self) -> Arc<Session>;

    /// Remove a session.
    fn invalidate(&self, id: &str);

    /// Remove expired and invalidated sessions, returning how many were removed.
    fn purge_expired(&self) -> usize;

    /// Number of stored sessions.
    fn len(&self) -> usize;

    /// Check if the store is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory session store with an idle timeout.
#[derive(Debug)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    idle_timeout: Duration,
}

impl MemorySessionStore {
    /// Default idle timeout: 30 minutes.
    pub const DEFAULT_IDLE_TIMEOUT_SECS: i64 = 30 * 60;

    /// Create a store with the default idle timeout.
    pub fn new() -> Self {
        Self::with_idle_timeout(Duration::seconds(Self::DEFAULT_IDLE_TIMEOUT_SECS))
    }

    /// Create a store with a custom idle timeout.
    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    /// The configured idle timeout.
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, id: &str) -> Option<Arc<Session>> {
        let session = self.sessions.read().get(id).cloned()?;
        if session.is_invalidated() || session.is_expired(self.idle_timeout) {
            self.sessions.write().remove(id);
            return None;
        }
        session.touch();
        Some(session)
    }

    fn create(&self) -> Arc<Session> {
        let session = Arc::new(Session::new(SessionId::generate()));
        self.sessions
            .write()
            .insert(session.id().as_str().to_string(), session.clone());
        tracing::debug!(session_id = %session.id(), "session created");
        session
    }

    fn invalidate(&self, id: &str) {
        if let Some(session) = self.sessions.write().remove(id) {
            session.invalidate();
        }
    }

    fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_invalidated() && !s.is_expired(self.idle_timeout));
        before - sessions.len()
    }

    fn len(&self) -> usize {
        self.sessions.read().len()
    }
}
