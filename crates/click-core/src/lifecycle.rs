//! Request lifecycle tracking.

use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};

/// Lifecycle phases of a page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecyclePhase {
    /// Page and controls initialized.
    Init,
    /// Security check ran; `false` short-circuits processing.
    SecurityCheck(bool),
    /// Controls bound and validated request values.
    Process,
    /// A named listener fired.
    Action(String),
    /// GET hook ran.
    Get,
    /// POST hook ran.
    Post,
    /// Page rendered through the template renderer.
    Render,
    /// Client redirected to a location.
    Redirect(String),
    /// Request forwarded to another page path.
    Forward(String),
    /// Page destroyed.
    Destroy,
    /// An error occurred.
    Error(String),
}

impl LifecyclePhase {
    /// Short name used as a timing mark.
    pub fn mark_name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::SecurityCheck(_) => "security_check",
            Self::Process => "process",
            Self::Action(_) => "action",
            Self::Get => "get",
            Self::Post => "post",
            Self::Render => "render",
            Self::Redirect(_) => "redirect",
            Self::Forward(_) => "forward",
            Self::Destroy => "destroy",
            Self::Error(_) => "error",
        }
    }
}

impl fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SecurityCheck(passed) => write!(f, "security_check({})", passed),
            Self::Action(listener) => write!(f, "action({})", listener),
            Self::Redirect(location) => write!(f, "redirect({})", location),
            Self::Forward(path) => write!(f, "forward({})", path),
            Self::Error(msg) => write!(f, "error({})", msg),
            other => f.write_str(other.mark_name()),
        }
    }
}

/// Timing context for observability.
#[derive(Debug, Clone)]
pub struct TimingContext {
    start: Instant,
    marks: HashMap<String, Instant>,
}

impl TimingContext {
    /// Create a new timing context.
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            marks: HashMap::new(),
        }
    }

    /// Record a timing mark.
    pub fn mark(&mut self, name: &str) {
        self.marks.insert(name.to_string(), Instant::now());
    }

    /// Record the mark of a lifecycle phase.
    pub fn mark_phase(&mut self, phase: &LifecyclePhase) {
        self.mark(phase.mark_name());
    }

    /// Get elapsed time since start.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Time from start to a named mark.
    pub fn time_to(&self, name: &str) -> Option<Duration> {
        self.marks.get(name).map(|t| t.duration_since(self.start))
    }

    /// Time between two marks.
    pub fn between(&self, from: &str, to: &str) -> Option<Duration> {
        let from = self.marks.get(from)?;
        let to = self.marks.get(to)?;
        Some(to.saturating_duration_since(*from))
    }

    /// Check if a mark was recorded.
    pub fn has_mark(&self, name: &str) -> bool {
        self.marks.contains_key(name)
    }
}

impl Default for TimingContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Observer trait for lifecycle events.
pub trait LifecycleObserver: Send + Sync {
    /// Called when a lifecycle phase occurs.
    fn on_phase(&self, phase: &LifecyclePhase, elapsed: Duration);
}
