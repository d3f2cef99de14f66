//! Fluxo API - Execution orchestration layer
//!
//! Provides the unified execution interface:
//! - the batch execution entrypoint `execute(files, entry_point, &config)`
//! - single-source conveniences (`run`, `quick_run`)
//! - configuration abstraction (`RunConfig`)
//! - unified error handling (`FluxoError`, `ErrorReport`)
//!
//! For CLI convenience this crate also offers a global singleton config.
//! Library users should prefer the explicit `&config` APIs.

use fluxo_core::module::workspace::collect_units;
use fluxo_core::{SourceUnit, WorkspaceRunner};
use fluxo_log::info;
use fluxo_vfs::VirtualFileSystem;
use std::path::Path;

// Re-export config
pub mod config;
pub use config::{config as get_config, init as init_config, is_initialized, RunConfig};

// Re-export config types from fluxo_config
pub use fluxo_config::{BridgeConfig, EngineConfig, LimitConfig, Phase};

// Re-export error and types
pub mod error;
pub mod types;
pub use error::{ErrorReport, FluxoError};
pub use types::{ExecuteOutput, SourceFile};

// Re-export core types
pub use fluxo_config;
pub use fluxo_core::{EventKind, OutputEvent, Value};

/// Execute a workspace with explicit configuration
///
/// This is the batch execution entrypoint: files are partitioned into
/// modules and scripts, modules evaluate first (stable caller order
/// within each class), and failures in one file append an `error` event
/// attributed to that file while the remaining files still run.
/// `entry_point` records provenance only; it does not change evaluation
/// order.
pub fn execute(files: &[SourceFile], entry_point: &str, config: &RunConfig) -> ExecuteOutput {
    info!(
        config.logger,
        "Executing workspace: {} files, entry '{}'",
        files.len(),
        entry_point
    );
    let units: Vec<SourceUnit> = files
        .iter()
        .map(|f| SourceUnit::new(f.path.clone(), f.code.clone()))
        .collect();
    let runner = WorkspaceRunner::new(
        config.engine.clone(),
        config.limits.clone(),
        config.logger.clone(),
    );
    let events = runner.run(units, Some(entry_point));
    info!(config.logger, "Execution completed: {} events", events.len());
    ExecuteOutput::from_events(events)
}

/// Execute one script source with explicit configuration
///
/// The source is treated as a single-script workspace at `/main.fxo`.
pub fn run(source: &str, config: &RunConfig) -> ExecuteOutput {
    execute(
        &[SourceFile::new("/main.fxo", source)],
        "/main.fxo",
        config,
    )
}

/// Execute every `.fxo`/`.fxm` file under a project root read from the
/// given source provider
pub fn run_workspace(
    fs: &dyn VirtualFileSystem,
    root: &Path,
    entry_point: &str,
    config: &RunConfig,
) -> Result<ExecuteOutput, FluxoError> {
    let units = collect_units(fs, root)?;
    if units.is_empty() {
        return Err(FluxoError::Project(format!(
            "no .fxo or .fxm files under '{}'",
            root.display()
        )));
    }
    let runner = WorkspaceRunner::new(
        config.engine.clone(),
        config.limits.clone(),
        config.logger.clone(),
    );
    let events = runner.run(units, Some(entry_point));
    Ok(ExecuteOutput::from_events(events))
}

// ==================== Legacy API (using global config) ====================

/// Execute a workspace (uses global config)
///
/// # Panics
/// If global config is not initialized
pub fn execute_with_global(files: &[SourceFile], entry_point: &str) -> ExecuteOutput {
    execute(files, entry_point, get_config())
}

/// Execute one script source (uses global config)
///
/// # Panics
/// If global config is not initialized
pub fn run_with_global(source: &str) -> ExecuteOutput {
    run(source, get_config())
}

/// Quick run with default config (auto-initializes if needed)
pub fn quick_run(source: &str) -> ExecuteOutput {
    if !is_initialized() {
        init_config(RunConfig::default());
    }
    run_with_global(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxo_vfs::MemoryFileSystem;

    fn logs(output: &ExecuteOutput) -> Vec<String> {
        output
            .events
            .iter()
            .filter(|e| e.kind == EventKind::Log)
            .map(|e| e.message.clone())
            .collect()
    }

    #[test]
    fn test_run_single_script() {
        let output = run("console.log(2 + 3)", &RunConfig::default());
        assert_eq!(logs(&output), vec!["5"]);
        assert!(output.error.is_none());
    }

    #[test]
    fn test_execute_module_and_script() {
        let output = execute(
            &[
                SourceFile::new("/m.fxm", "module m { export function add(a,b){ return a+b } }"),
                SourceFile::new("/s.fxo", "import from \"/m\" { add }\nconsole.log(add(2,3))"),
            ],
            "/s.fxo",
            &RunConfig::default(),
        );
        assert_eq!(logs(&output), vec!["5"]);
    }

    #[test]
    fn test_execute_reports_partial_failure() {
        let output = execute(
            &[
                SourceFile::new("/bad.fxo", "nope()"),
                SourceFile::new("/good.fxo", "console.log(\"ran\")"),
            ],
            "/bad.fxo",
            &RunConfig::default(),
        );
        assert_eq!(logs(&output), vec!["ran"]);
        assert!(output.error.is_some());
    }

    #[test]
    fn test_run_workspace_from_vfs() {
        let fs = MemoryFileSystem::with_sources([
            ("/proj/lib/m.fxm", "module m { export function id(x) { return x } }"),
            ("/proj/main.fxo", "import from \"/lib/m\" { id }\nconsole.log(id(9))"),
        ]);
        let output =
            run_workspace(&fs, Path::new("/proj"), "/main.fxo", &RunConfig::default()).unwrap();
        assert_eq!(logs(&output), vec!["9"]);
    }

    #[test]
    fn test_run_workspace_rejects_empty_project() {
        let fs = MemoryFileSystem::new();
        let result = run_workspace(&fs, Path::new("/empty"), "/main.fxo", &RunConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_quick_run() {
        let output = quick_run("console.log(\"quick\")");
        assert_eq!(logs(&output), vec!["quick"]);
    }
}
