//! Fluxo Core - the language execution engine (pure logic, no IO)
//!
//! Contains the lexer, parser, tree-walking evaluator, module resolver,
//! workspace runner, and the sandboxed runtime bridge. Source I/O goes
//! through `fluxo-vfs`; observable output goes through the event sink;
//! diagnostics go through an explicitly passed `fluxo-log` logger.
//! Configuration is passed via parameters, never via global state.

pub mod bridge;
pub mod compiler;
pub mod kit;
pub mod module;
pub mod runtime;

// Re-export common types
pub use module::{SourceUnit, UnitKind, WorkspaceRunner};
pub use runtime::{EventKind, ExecutionContext, OutputEvent, Value};

// Re-export config types from fluxo-config
pub use fluxo_config::{BridgeConfig, EngineConfig, LimitConfig, Phase};
