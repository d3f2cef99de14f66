//! API type definitions
//!
//! Input and output shapes of the batch execution entrypoint.

use fluxo_core::OutputEvent;
use serde::{Deserialize, Serialize};

/// One file of an execution request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    /// Workspace path; `.fxm` files are modules, everything else is a
    /// script
    pub path: String,
    /// Raw source text
    pub code: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code: code.into(),
        }
    }
}

/// Result of one workspace execution
#[derive(Debug, Clone, Serialize)]
pub struct ExecuteOutput {
    /// Ordered event log; emission order is evaluation order
    pub events: Vec<OutputEvent>,
    /// First error of the run, when any file failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecuteOutput {
    /// Build the output from an event log; `error` carries the first
    /// error event's message
    pub fn from_events(events: Vec<OutputEvent>) -> Self {
        let error = events
            .iter()
            .find(|e| e.kind == fluxo_core::EventKind::Error)
            .map(|e| e.message.clone());
        Self { events, error }
    }
}
