//! Structured publish events
//!
//! The orchestrator has no console or UI dependency; it emits these
//! events for an external progress reporter to render, and keeps them in
//! the outcome's log so partial success is always visible after the fact.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// One step of a publish operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PublishEvent {
    /// Probing the record store for the identifier.
    Checking { identifier: String },

    /// An existing fragment for the identifier was found in a document.
    FoundExisting { identifier: String, document: String },

    /// The old fragment was excised (in memory).
    RemovedOld { kind: String, document: String },

    /// The new fragment was spliced in (in memory).
    InsertedNew { kind: String, document: String },

    /// A mutated document was committed to the store.
    Committed { document: String },

    /// Terminal failure with the reason preserved for the caller.
    Failed { reason: String },
}

/// An event with the time it was recorded.
#[derive(Debug, Clone, Serialize)]
pub struct LoggedEvent {
    pub at: DateTime<Utc>,
    pub event: PublishEvent,
}

/// Append-only event accumulator for one publish operation.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: PublishEvent) {
        self.entries.push(LoggedEvent {
            at: Utc::now(),
            event,
        });
    }

    pub fn events(&self) -> impl Iterator<Item = &PublishEvent> {
        self.entries.iter().map(|e| &e.event)
    }

    pub fn into_entries(self) -> Vec<LoggedEvent> {
        self.entries
    }
}
