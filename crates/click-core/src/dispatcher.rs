//! Action events queued by controls and fired after processing.
//!
//! Controls never call listeners directly. While processing they queue an
//! [`ActionEvent`] naming themselves and the page listener to run; once
//! every control has bound and validated its value the queue is fired in
//! registration order. The dispatcher lives on the request [`Context`]
//! rather than in thread-local storage.
//!
//! [`Context`]: crate::Context

use crate::error::Result;

/// Reserved parameter carrying the name of the clicked action link.
pub const ACTION_LINK: &str = "actionLink";

/// Reserved parameter carrying the name of the clicked action button.
pub const ACTION_BUTTON: &str = "actionButton";

/// Reserved parameter carrying an action link's or button's value.
pub const ACTION_VALUE: &str = "value";

/// Reserved parameter carrying the name of the submitted form.
pub const FORM_NAME: &str = "form_name";

/// A listener invocation requested by a control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionEvent {
    /// Name of the control that triggered the event.
    pub source: String,
    /// Name of the page listener to invoke.
    pub listener: String,
}

impl ActionEvent {
    /// Create a new action event.
    pub fn new(source: impl Into<String>, listener: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            listener: listener.into(),
        }
    }
}

/// Queue of action events for one request.
#[derive(Debug, Default)]
pub struct ActionEventDispatcher {
    events: Vec<ActionEvent>,
}

impl ActionEventDispatcher {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a listener invocation.
    pub fn register(&mut self, source: impl Into<String>, listener: impl Into<String>) {
        let event = ActionEvent::new(source, listener);
        tracing::debug!(
            source = %event.source,
            listener = %event.listener,
            "action event registered"
        );
        self.events.push(event);
    }

    /// Check if any events are queued.
    pub fn has_action_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Queued events in registration order.
    pub fn pending(&self) -> &[ActionEvent] {
        &self.events
    }

    /// Drop all queued events.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Called when processing failed; queued listeners must not fire.
    pub fn error_occurred(&mut self) {
        if self.has_action_events() {
            tracing::debug!(dropped = self.events.len(), "clearing action events after error");
        }
        self.clear();
    }

    /// Take the queue, leaving it empty.
    pub fn take(&mut self) -> Vec<ActionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Fire `events` in order through `fire`.
    ///
    /// Every event fires even after a listener returns `false`; the result
    /// is `false` if any listener asked to stop. The first error aborts.
    pub fn fire_all<F>(events: Vec<ActionEvent>, mut fire: F) -> Result<bool>
    where
        F: FnMut(&ActionEvent) -> Result<bool>,
    {
        let mut continue_processing = true;
        for event in &events {
            if !fire(event)? {
                continue_processing = false;
            }
        }
        Ok(continue_processing)
    }
}
