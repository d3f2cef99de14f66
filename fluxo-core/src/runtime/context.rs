//! Execution context
//!
//! The shared state of one workspace run: global bindings, the module
//! registry, the event sink, and the timer queue. Exactly one context
//! exists per run and every per-file evaluator receives the same instance
//! by mutable reference; this is how a script observes a module's
//! exports. Nothing survives the run.

use crate::kit::lexer::SourcePosition;
use crate::module::SourceUnit;
use crate::runtime::events::{EventKind, EventSink, OutputEvent};
use crate::runtime::scheduler::Scheduler;
use crate::runtime::scope::{Scope, ScopeRef};
use crate::runtime::value::{Namespace, NativeFunction, Value};
use fluxo_config::{EngineConfig, LimitConfig};
use fluxo_log::{debug, Logger};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// Lifecycle of one module path in the registry
pub enum ModuleSlot {
    /// Known source, not yet evaluated
    Uninitialized(SourceUnit),
    /// Evaluation in progress; importing it now is a cycle
    Initializing,
    /// Evaluated; the same export table is returned on every import
    Ready(Rc<Namespace>),
    /// Evaluation failed; importing it again reports the stored message
    Failed(String),
}

/// Shared state of one workspace run
pub struct ExecutionContext {
    pub globals: ScopeRef,
    registry: HashMap<String, ModuleSlot>,
    /// Module paths currently initializing, for cycle reporting
    pub resolving_stack: Vec<String>,
    sink: EventSink,
    pub scheduler: Scheduler,
    current_file: Option<String>,
    pub engine: EngineConfig,
    pub limits: LimitConfig,
    pub logger: Arc<Logger>,
}

impl ExecutionContext {
    /// Allocate the context for a new run
    pub fn new(engine: EngineConfig, limits: LimitConfig, logger: Arc<Logger>) -> Self {
        let globals = Scope::new_global();
        install_builtins(&globals);
        Self {
            globals,
            registry: HashMap::new(),
            resolving_stack: Vec::new(),
            sink: EventSink::new(),
            scheduler: Scheduler::new(),
            current_file: None,
            engine,
            limits,
            logger,
        }
    }

    /// Install source attribution for subsequent events
    pub fn begin_file(&mut self, path: Option<String>) {
        if let Some(path) = &path {
            debug!(self.logger, "Begin file {}", path);
        }
        self.current_file = path;
    }

    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    /// Append an event attributed to the currently executing file;
    /// returns immediately
    pub fn emit(
        &mut self,
        kind: EventKind,
        message: impl Into<String>,
        position: Option<SourcePosition>,
    ) {
        let timestamp = self.scheduler.now_ms();
        self.sink.emit(
            kind,
            message,
            timestamp,
            self.current_file.clone(),
            position.map(|p| p.line),
            position.map(|p| p.column),
        );
    }

    /// Append an event attributed to an explicit file
    pub fn emit_for_file(
        &mut self,
        kind: EventKind,
        message: impl Into<String>,
        source_file: Option<String>,
        line: Option<usize>,
        column: Option<usize>,
    ) {
        let timestamp = self.scheduler.now_ms();
        self.sink.emit(kind, message, timestamp, source_file, line, column);
    }

    // ==================== Module registry ====================

    /// Seed the registry with a known-but-unevaluated module file
    pub fn add_module_unit(&mut self, canonical: String, unit: SourceUnit) {
        self.registry
            .entry(canonical)
            .or_insert(ModuleSlot::Uninitialized(unit));
    }

    /// Register an evaluated module's export table and bind its declared
    /// name into the global scope so later files see it
    pub fn register_module(&mut self, canonical: String, exports: Rc<Namespace>) {
        debug!(
            self.logger,
            "Registered module '{}' at {} ({} exports)",
            exports.name,
            canonical,
            exports.len()
        );
        Scope::define(&self.globals, exports.name.clone(), Value::Namespace(exports.clone()));
        self.registry.insert(canonical, ModuleSlot::Ready(exports));
    }

    /// Mark a module as failed so later imports report the cause
    pub fn mark_module_failed(&mut self, canonical: String, message: String) {
        self.registry.insert(canonical, ModuleSlot::Failed(message));
    }

    pub fn module_slot(&self, canonical: &str) -> Option<&ModuleSlot> {
        self.registry.get(canonical)
    }

    /// Get an evaluated module's export table
    pub fn get_module(&self, canonical: &str) -> Option<Rc<Namespace>> {
        match self.registry.get(canonical) {
            Some(ModuleSlot::Ready(ns)) => Some(ns.clone()),
            _ => None,
        }
    }

    /// Take the unit out of an `Uninitialized` slot, leaving it
    /// `Initializing`
    pub fn take_uninitialized(&mut self, canonical: &str) -> Option<SourceUnit> {
        match self.registry.get(canonical) {
            Some(ModuleSlot::Uninitialized(_)) => {
                match self.registry.insert(canonical.to_string(), ModuleSlot::Initializing) {
                    Some(ModuleSlot::Uninitialized(unit)) => Some(unit),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    // ==================== Event access ====================

    pub fn events(&self) -> &[OutputEvent] {
        self.sink.events()
    }

    pub fn take_events(&mut self) -> Vec<OutputEvent> {
        self.sink.take_events()
    }

    pub fn has_errors(&self) -> bool {
        self.sink.has_errors()
    }
}

/// Pre-populate the global scope with the `console` namespace
fn install_builtins(globals: &ScopeRef) {
    let console = Namespace::new("console");
    console.set("log", Value::Native(NativeFunction::ConsoleLog));
    console.set("warn", Value::Native(NativeFunction::ConsoleWarn));
    console.set("error", Value::Native(NativeFunction::ConsoleError));
    console.freeze();
    Scope::define(globals, "console", Value::Namespace(console));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> ExecutionContext {
        ExecutionContext::new(EngineConfig::default(), LimitConfig::default(), Logger::noop())
    }

    #[test]
    fn test_console_is_installed() {
        let ctx = context();
        match Scope::get(&ctx.globals, "console") {
            Some(Value::Namespace(ns)) => {
                assert!(ns.get("log").is_some());
                assert!(ns.get("warn").is_some());
                assert!(ns.get("error").is_some());
                assert!(ns.is_frozen());
            }
            other => panic!("console missing: {:?}", other),
        }
    }

    #[test]
    fn test_emit_uses_current_file() {
        let mut ctx = context();
        ctx.begin_file(Some("/main.fxo".to_string()));
        ctx.emit(EventKind::Log, "hello", None);
        let events = ctx.events();
        assert_eq!(events[0].source_file.as_deref(), Some("/main.fxo"));
        assert_eq!(events[0].line, None);
    }

    #[test]
    fn test_register_module_binds_global_name() {
        let mut ctx = context();
        let ns = Namespace::new("math");
        ns.set("PI", Value::Number(3.14));
        ns.freeze();
        ctx.register_module("/math.fxm".to_string(), ns);

        assert!(ctx.get_module("/math.fxm").is_some());
        assert!(matches!(
            Scope::get(&ctx.globals, "math"),
            Some(Value::Namespace(_))
        ));
    }

    #[test]
    fn test_reimport_returns_same_export_table() {
        let mut ctx = context();
        let ns = Namespace::new("m");
        ctx.register_module("/m.fxm".to_string(), ns);

        let first = ctx.get_module("/m.fxm").unwrap();
        let second = ctx.get_module("/m.fxm").unwrap();
        assert!(Rc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_take_uninitialized_transitions_to_initializing() {
        let mut ctx = context();
        let unit = SourceUnit::new("/m.fxm", "module m { }");
        ctx.add_module_unit("/m.fxm".to_string(), unit);

        let taken = ctx.take_uninitialized("/m.fxm");
        assert!(taken.is_some());
        assert!(matches!(
            ctx.module_slot("/m.fxm"),
            Some(ModuleSlot::Initializing)
        ));
        // Taking again yields nothing
        assert!(ctx.take_uninitialized("/m.fxm").is_none());
    }
}
