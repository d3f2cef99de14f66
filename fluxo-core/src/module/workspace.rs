//! Workspace runner - the batch evaluator
//!
//! Executes a whole workspace: module files first, then script files,
//! both in the caller's order (stable - callers are expected to have
//! flattened import order themselves). All files share one
//! [`ExecutionContext`], so scripts observe every module's exports. A
//! failure in one file becomes an `error` event attributed to that file
//! and the run continues with the next file. After the synchronous code
//! of every file has run, the deferred (`wait`) queue drains on the
//! virtual clock.

use crate::compiler::parse_source;
use crate::module::resolver::canonicalize;
use crate::module::{SourceUnit, UnitKind};
use crate::runtime::context::{ExecutionContext, ModuleSlot};
use crate::runtime::eval::Evaluator;
use crate::runtime::events::{EventKind, OutputEvent};
use crate::runtime::scope::Scope;
use fluxo_config::{EngineConfig, LimitConfig};
use fluxo_log::{debug, info, Logger};
use fluxo_vfs::{VfsResult, VirtualFileSystem};
use std::path::Path;
use std::sync::Arc;

/// Batch evaluator over one workspace's file set
pub struct WorkspaceRunner {
    engine: EngineConfig,
    limits: LimitConfig,
    logger: Arc<Logger>,
}

impl WorkspaceRunner {
    pub fn new(engine: EngineConfig, limits: LimitConfig, logger: Arc<Logger>) -> Self {
        Self {
            engine,
            limits,
            logger,
        }
    }

    /// Execute the workspace and return the ordered event log
    ///
    /// `entry_point` records provenance only - it does not change
    /// evaluation order.
    pub fn run(&self, units: Vec<SourceUnit>, entry_point: Option<&str>) -> Vec<OutputEvent> {
        let mut ctx =
            ExecutionContext::new(self.engine.clone(), self.limits.clone(), self.logger.clone());
        info!(
            self.logger,
            "Workspace run: {} files, entry {:?}",
            units.len(),
            entry_point
        );

        // Canonicalize paths up front; partition by kind, stable within
        // each class
        let units: Vec<SourceUnit> = units
            .into_iter()
            .map(|u| {
                let canonical = canonicalize(&u.path, None);
                SourceUnit {
                    kind: u.kind,
                    path: canonical,
                    code: u.code,
                }
            })
            .collect();

        let module_paths: Vec<String> = units
            .iter()
            .filter(|u| u.kind == UnitKind::Module)
            .map(|u| u.path.clone())
            .collect();
        let script_units: Vec<&SourceUnit> =
            units.iter().filter(|u| u.kind == UnitKind::Script).collect();

        // Seed the registry so imports can find every module file
        for unit in units.iter().filter(|u| u.kind == UnitKind::Module) {
            ctx.add_module_unit(unit.path.clone(), unit.clone());
        }

        // Modules evaluate before any script statement runs; an import
        // may already have initialized a later module, which is fine -
        // initialization happens exactly once
        for path in &module_paths {
            if matches!(ctx.module_slot(path), Some(ModuleSlot::Uninitialized(_))) {
                let mut evaluator = Evaluator::new(&mut ctx);
                if let Err(e) = evaluator.require_module(path, path) {
                    // The module's own failure was already reported and
                    // attributed by require_module
                    debug!(self.logger, "Module {} failed: {}", path, e);
                }
            }
        }

        // Scripts run against the populated context
        for unit in script_units {
            ctx.begin_file(Some(unit.path.clone()));
            match parse_source(&unit.code, self.logger.clone()) {
                Ok(program) => {
                    let file_scope = Scope::child(&ctx.globals);
                    let result = Evaluator::new(&mut ctx).run_program(&program, &file_scope);
                    if let Err(e) = result {
                        let (line, column) = (e.line(), e.column());
                        ctx.emit_for_file(
                            EventKind::Error,
                            e.to_string(),
                            Some(unit.path.clone()),
                            line,
                            column,
                        );
                    }
                }
                Err(parse_error) => {
                    let (line, column) = (parse_error.line(), parse_error.column());
                    ctx.emit_for_file(
                        EventKind::Error,
                        parse_error.to_string(),
                        Some(unit.path.clone()),
                        line,
                        column,
                    );
                }
            }
        }
        ctx.begin_file(None);

        // Drain the deferred queue; bodies may schedule more work
        self.flush_timers(&mut ctx);

        if self.engine.emit_success_event && !ctx.has_errors() {
            ctx.emit_for_file(
                EventKind::Success,
                "Workspace execution completed",
                entry_point.map(str::to_string),
                None,
                None,
            );
        }

        ctx.take_events()
    }

    /// Run every scheduled `wait` body in deadline order on the virtual
    /// clock
    fn flush_timers(&self, ctx: &mut ExecutionContext) {
        while let Some(task) = ctx.scheduler.pop_next() {
            ctx.begin_file(task.source_file.clone());
            let body_scope = Scope::child(&task.scope);
            let result = Evaluator::new(ctx).run_statements(&task.body, &body_scope);
            if let Err(e) = result {
                let (line, column) = (e.line(), e.column());
                let file = task.source_file.clone();
                ctx.emit_for_file(EventKind::Error, e.to_string(), file, line, column);
            }
        }
        ctx.begin_file(None);
    }
}

/// Materialize the workspace's `.fxo`/`.fxm` files from the source
/// provider
pub fn collect_units(fs: &dyn VirtualFileSystem, root: &Path) -> VfsResult<Vec<SourceUnit>> {
    let mut units = Vec::new();
    for path in fs.list_files(root)? {
        if !(path.ends_with(".fxo") || path.ends_with(".fxm")) {
            continue;
        }
        let code = fs.read_to_string(Path::new(&path))?;
        // Workspace paths are rooted at the project directory
        let root_str = root.to_string_lossy().replace('\\', "/");
        let relative = path
            .strip_prefix(root_str.trim_end_matches('/'))
            .unwrap_or(&path)
            .to_string();
        units.push(SourceUnit::new(relative, code));
    }
    Ok(units)
}
