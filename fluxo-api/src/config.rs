//! API layer configuration
//!
//! Holds the execution configuration `RunConfig` and a global singleton
//! layer for CLI convenience. Library users should prefer the explicit
//! `execute(..., &config)` API.

use fluxo_config::{BridgeConfig, EngineConfig, LimitConfig};
use fluxo_log::Logger;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Execution configuration
#[derive(Clone)]
pub struct RunConfig {
    /// Language semantics switches
    pub engine: EngineConfig,
    /// Execution limits
    pub limits: LimitConfig,
    /// Bridge settings (module load timeout)
    pub bridge: BridgeConfig,
    /// Echo source lines before running (CLI)
    pub show_source: bool,
    /// Dump the event log as JSON after running (CLI)
    pub dump_events: bool,
    /// Logger, passed through to every engine phase
    pub logger: Arc<Logger>,
}

impl std::fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunConfig")
            .field("engine", &self.engine)
            .field("limits", &self.limits)
            .field("bridge", &self.bridge)
            .field("show_source", &self.show_source)
            .field("dump_events", &self.dump_events)
            .finish()
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            limits: LimitConfig::default(),
            bridge: BridgeConfig::default(),
            show_source: false,
            dump_events: false,
            logger: Logger::noop(),
        }
    }
}

// Global config singleton for CLI convenience
static GLOBAL_CONFIG: OnceCell<RunConfig> = OnceCell::new();

/// Initialize global configuration (must be called once before any
/// global-API operation)
///
/// # Panics
/// If config is already initialized
pub fn init(config: RunConfig) {
    GLOBAL_CONFIG
        .set(config)
        .expect("Config already initialized");
}

/// Get global config reference
///
/// # Panics
/// If config is not initialized
pub fn config() -> &'static RunConfig {
    GLOBAL_CONFIG.get().expect("Config not initialized")
}

/// Check if config is initialized
pub fn is_initialized() -> bool {
    GLOBAL_CONFIG.get().is_some()
}
