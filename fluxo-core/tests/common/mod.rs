//! Test helpers
//!
//! End-to-end helpers running whole workspaces through the batch
//! evaluator, the way the API layer does.

use fluxo_config::{EngineConfig, LimitConfig};
use fluxo_core::runtime::{EventKind, OutputEvent};
use fluxo_core::{SourceUnit, WorkspaceRunner};
use fluxo_log::Logger;

/// Run a set of (path, code) files as one workspace and return the
/// event log
pub fn run_units(files: &[(&str, &str)]) -> Vec<OutputEvent> {
    let units = files
        .iter()
        .map(|(path, code)| SourceUnit::new(*path, *code))
        .collect();
    let runner = WorkspaceRunner::new(
        EngineConfig::default(),
        LimitConfig::default(),
        Logger::noop(),
    );
    runner.run(units, None)
}

/// Run a single script file
pub fn run_script(code: &str) -> Vec<OutputEvent> {
    run_units(&[("/main.fxo", code)])
}

/// Messages of all `log` events, in order
pub fn log_messages(events: &[OutputEvent]) -> Vec<String> {
    events
        .iter()
        .filter(|e| e.kind == EventKind::Log)
        .map(|e| e.message.clone())
        .collect()
}

/// Messages of all `error` events, in order
pub fn error_messages(events: &[OutputEvent]) -> Vec<String> {
    events
        .iter()
        .filter(|e| e.kind == EventKind::Error)
        .map(|e| e.message.clone())
        .collect()
}
