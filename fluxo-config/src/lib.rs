//! Fluxo Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all Fluxo crates.

/// Configuration for language semantics
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Require `local` before first assignment instead of creating
    /// an implicit global
    pub strict_bindings: bool,
    /// Emit a `success` event when a run finishes without errors
    pub emit_success_event: bool,
}

/// Configuration for execution limits
#[derive(Debug, Clone)]
pub struct LimitConfig {
    /// Maximum function call depth
    pub max_call_depth: usize,
    /// Maximum number of tasks the timer queue will accept in one run
    pub max_scheduled_tasks: usize,
}

/// Configuration for the sandboxed runtime bridge
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// How long a pending module request may wait for a matching
    /// response before it is failed, in milliseconds
    pub load_timeout_ms: u64,
}

/// Execution phase enum for phase-specific configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Lexer,
    Parser,
    Eval,
    Resolver,
    Bridge,
}

impl Phase {
    /// Get the string name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Lexer => "lexer",
            Phase::Parser => "parser",
            Phase::Eval => "eval",
            Phase::Resolver => "resolver",
            Phase::Bridge => "bridge",
        }
    }

    /// Get the log target name for this phase
    pub fn target(&self) -> String {
        format!("fluxo::{}", self.as_str())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            strict_bindings: false,
            emit_success_event: true,
        }
    }
}

impl Default for LimitConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 256,
            max_scheduled_tasks: 4096,
        }
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            load_timeout_ms: 5000,
        }
    }
}
