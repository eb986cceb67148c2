//! The event backlog shared by all connections of a session.

use std::sync::{Mutex, PoisonError};

use serde_json::Value;

/// An inbound message that was not the reply to a pending call.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    /// Index of the target whose connection delivered the message.
    pub target: usize,
    /// The message exactly as received.
    pub message: Value,
}

impl Event {
    /// The `method` field, e.g. `"Page.loadEventFired"`.
    pub fn method(&self) -> Option<&str> {
        self.message.get("method").and_then(Value::as_str)
    }

    pub fn params(&self) -> Option<&Value> {
        self.message.get("params")
    }
}

/// Append-only list of events in receipt order.
///
/// The lock is only held for a push or a copy, never across an `.await`.
#[derive(Debug, Default)]
pub struct EventBacklog {
    events: Mutex<Vec<Event>>,
}

impl EventBacklog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, target: usize, message: Value) {
        self.lock().push(Event { target, message });
    }

    /// A copy of every event received so far.
    pub fn snapshot(&self) -> Vec<Event> {
        self.lock().clone()
    }

    /// Removes and returns every event received so far.
    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Event>> {
        // A panic while pushing cannot leave the Vec half-written.
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
