//! Cross-boundary module protocol
//!
//! The bridge and the document that owns real file content exchange
//! structured messages over a channel. Correlation is solely by string
//! equality of the canonical `path` - every response must echo the exact
//! path from the request.

use serde::{Deserialize, Serialize};

/// Wire messages of the module protocol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ModuleMessage {
    /// Bridge -> host: please send the source for `path`
    ModuleRequest { path: String },
    /// Host -> bridge: source for `path`
    ModuleResponse { path: String, code: String },
    /// Host -> bridge: `path` could not be provided
    ModuleError { path: String, error: String },
}

impl ModuleMessage {
    /// The correlation key every message carries
    pub fn path(&self) -> &str {
        match self {
            ModuleMessage::ModuleRequest { path }
            | ModuleMessage::ModuleResponse { path, .. }
            | ModuleMessage::ModuleError { path, .. } => path,
        }
    }
}

/// Outbound channel to the document that owns real file content
pub trait ModuleTransport {
    /// Post one message across the boundary; must not block
    fn post(&mut self, message: ModuleMessage);
}

/// Transport that collects posted messages for the host to drain; also
/// what the tests use to count requests
#[derive(Debug, Clone, Default)]
pub struct CollectingTransport {
    messages: std::rc::Rc<std::cell::RefCell<Vec<ModuleMessage>>>,
}

impl CollectingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// All messages posted so far
    pub fn posted(&self) -> Vec<ModuleMessage> {
        self.messages.borrow().clone()
    }

    /// Number of posted requests for a given path
    pub fn request_count(&self, path: &str) -> usize {
        self.messages
            .borrow()
            .iter()
            .filter(|m| matches!(m, ModuleMessage::ModuleRequest { path: p } if p == path))
            .count()
    }

    /// Drain the queue (host side)
    pub fn take(&self) -> Vec<ModuleMessage> {
        std::mem::take(&mut *self.messages.borrow_mut())
    }
}

impl ModuleTransport for CollectingTransport {
    fn post(&mut self, message: ModuleMessage) {
        self.messages.borrow_mut().push(message);
    }
}
