//! Output events
//!
//! Everything the engine makes observable flows through the event sink:
//! `console.*` output, per-file errors, and the run's closing status.
//! Events are append-only and ordered by evaluation order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Event kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Log,
    Warning,
    Error,
    Success,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Log => "log",
            EventKind::Warning => "warning",
            EventKind::Error => "error",
            EventKind::Success => "success",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One structured unit of observable output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputEvent {
    pub id: u64,
    pub kind: EventKind,
    pub message: String,
    /// Milliseconds on the run's (virtual) clock
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
}

/// Append-only event collector; one per execution context
#[derive(Debug, Default)]
pub struct EventSink {
    events: Vec<OutputEvent>,
    next_id: u64,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event; returns immediately, never blocks evaluation
    #[allow(clippy::too_many_arguments)]
    pub fn emit(
        &mut self,
        kind: EventKind,
        message: impl Into<String>,
        timestamp: f64,
        source_file: Option<String>,
        line: Option<usize>,
        column: Option<usize>,
    ) {
        let id = self.next_id;
        self.next_id += 1;
        self.events.push(OutputEvent {
            id,
            kind,
            message: message.into(),
            timestamp,
            source_file,
            line,
            column,
        });
    }

    pub fn events(&self) -> &[OutputEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<OutputEvent> {
        std::mem::take(&mut self.events)
    }

    /// Whether any `error` event has been emitted
    pub fn has_errors(&self) -> bool {
        self.events.iter().any(|e| e.kind == EventKind::Error)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
