//! Sandboxed runtime bridge
//!
//! Runs Fluxo inside an isolated session whose module sources live on
//! the other side of a message channel. Each module load walks the state
//! machine `Unrequested -> Pending -> Loaded | Failed`:
//!
//! - the first reference to an uncached canonical path registers a
//!   pending entry and posts exactly one `module-request`; concurrent
//!   references attach to the pending entry (de-duplication)
//! - a matching `module-response` parses the code, requests any uncached
//!   dependencies, and evaluates the module in an isolated scope once
//!   its dependencies are loaded; the export table is cached under the
//!   canonical path
//! - a `module-error`, an evaluation exception, or the configured
//!   timeout fails the load; every dependent fails in turn, and the path
//!   leaves the pending set so a later reference may retry
//!
//! Entry code that is not itself a module runs through
//! [`ModuleBridge::execute_inline`], which bypasses the cache.

use crate::bridge::clock::MonotonicClock;
use crate::bridge::protocol::{ModuleMessage, ModuleTransport};
use crate::compiler::parse_source;
use crate::compiler::parser::program::Program;
use crate::module::resolver::{canonicalize, collect_import_specifiers};
use crate::runtime::context::ExecutionContext;
use crate::runtime::eval::Evaluator;
use crate::runtime::events::{EventKind, OutputEvent};
use crate::runtime::scope::Scope;
use crate::runtime::value::Namespace;
use fluxo_config::{BridgeConfig, EngineConfig, LimitConfig};
use fluxo_log::{debug, Logger};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Observable state of one canonical module path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    /// Never requested (or failed and eligible for retry)
    Unrequested,
    /// Requested, awaiting response / dependencies
    Pending,
    /// Evaluated; exports cached
    Loaded,
    /// Last load attempt failed; a new reference will retry
    Failed,
}

/// Bridge-side load failure
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeError {
    /// No matching response within the configured window
    Timeout { path: String, timeout_ms: u64 },
    /// The host answered with `module-error`
    Host { path: String, error: String },
    /// The module source failed to parse
    Parse { path: String, message: String },
    /// The module (or inline entry) failed while evaluating
    Eval { path: String, message: String },
    /// A dependency of this module failed
    Dependency { path: String, dependency: String },
    /// Modules await each other
    Cycle { chain: Vec<String> },
}

impl BridgeError {
    fn message(&self) -> String {
        match self {
            BridgeError::Timeout { path, timeout_ms } => format!(
                "ModuleLoadTimeoutError: no response for '{}' within {} ms",
                path, timeout_ms
            ),
            BridgeError::Host { path, error } => {
                format!("module-error for '{}': {}", path, error)
            }
            BridgeError::Parse { path, message } => {
                format!("module '{}' failed to parse: {}", path, message)
            }
            BridgeError::Eval { path, message } => {
                format!("module '{}' failed to evaluate: {}", path, message)
            }
            BridgeError::Dependency { path, dependency } => {
                format!("module '{}' failed: dependency '{}' failed", path, dependency)
            }
            BridgeError::Cycle { chain } => {
                format!("CyclicImportError: {}", chain.join(" -> "))
            }
        }
    }
}

impl std::fmt::Display for BridgeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for BridgeError {}

/// A request in flight
struct PendingLoad {
    requested_at_ms: u64,
}

/// Parsed code waiting for its dependencies
struct BlockedEval {
    origin: EvalOrigin,
    program: Program,
    deps: HashSet<String>,
}

enum EvalOrigin {
    /// A fetched module, keyed by canonical path
    Module(String),
    /// Inline entry code
    Inline,
}

/// The sandboxed runtime's module loader and executor
pub struct ModuleBridge {
    transport: Box<dyn ModuleTransport>,
    clock: Box<dyn MonotonicClock>,
    config: BridgeConfig,
    ctx: ExecutionContext,
    pending: HashMap<String, PendingLoad>,
    blocked: Vec<BlockedEval>,
    /// Last failure per path, cleared when the path is re-requested
    failures: HashMap<String, BridgeError>,
    logger: Arc<Logger>,
}

impl ModuleBridge {
    pub fn new(
        transport: Box<dyn ModuleTransport>,
        clock: Box<dyn MonotonicClock>,
        config: BridgeConfig,
        engine: EngineConfig,
        limits: LimitConfig,
        logger: Arc<Logger>,
    ) -> Self {
        Self {
            transport,
            clock,
            config,
            ctx: ExecutionContext::new(engine, limits, logger.clone()),
            pending: HashMap::new(),
            blocked: Vec::new(),
            failures: HashMap::new(),
            logger,
        }
    }

    // ==================== Public surface ====================

    /// Reference a module: resolves the specifier against the requesting
    /// module's directory, then starts (or joins) the load
    pub fn load_module(&mut self, specifier: &str, importer: Option<&str>) -> LoadState {
        let canonical = canonicalize(specifier, importer);
        self.request(&canonical);
        self.state_of(&canonical)
    }

    /// Current state of a canonical path
    pub fn state(&self, specifier: &str, importer: Option<&str>) -> LoadState {
        self.state_of(&canonicalize(specifier, importer))
    }

    /// Deliver one host response; matching is by exact path equality
    pub fn deliver(&mut self, message: ModuleMessage) {
        match message {
            ModuleMessage::ModuleResponse { path, code } => {
                if self.pending.remove(&path).is_none() {
                    debug!(self.logger, "Ignoring unrequested response for {}", path);
                    return;
                }
                self.accept_source(path, &code);
            }
            ModuleMessage::ModuleError { path, error } => {
                if self.pending.remove(&path).is_none() {
                    debug!(self.logger, "Ignoring unrequested error for {}", path);
                    return;
                }
                self.fail(path.clone(), BridgeError::Host { path, error });
            }
            ModuleMessage::ModuleRequest { path } => {
                debug!(self.logger, "Bridge does not serve requests ({})", path);
            }
        }
    }

    /// Fail every pending request whose wait has reached the configured
    /// timeout; call on the host's timer tick
    pub fn poll_timeouts(&mut self) {
        let now = self.clock.now_ms();
        let timeout = self.config.load_timeout_ms;
        let expired: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, load)| now.saturating_sub(load.requested_at_ms) >= timeout)
            .map(|(path, _)| path.clone())
            .collect();
        for path in expired {
            self.pending.remove(&path);
            self.fail(
                path.clone(),
                BridgeError::Timeout {
                    path,
                    timeout_ms: timeout,
                },
            );
        }
    }

    /// Execute entry code that is not itself a module: no cache entry,
    /// evaluation starts as soon as its imports are loaded
    pub fn execute_inline(&mut self, code: &str) -> Result<(), BridgeError> {
        let program = parse_source(code, self.logger.clone()).map_err(|e| BridgeError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;

        let deps = self.unresolved_deps(&program, None);
        if deps.is_empty() {
            return self.eval_inline(&program);
        }
        for dep in &deps {
            self.request(dep);
        }
        self.blocked.push(BlockedEval {
            origin: EvalOrigin::Inline,
            program,
            deps,
        });
        Ok(())
    }

    /// Run scheduled `wait` bodies (host timer callbacks)
    pub fn flush_timers(&mut self) {
        while let Some(task) = self.ctx.scheduler.pop_next() {
            self.ctx.begin_file(task.source_file.clone());
            let body_scope = Scope::child(&task.scope);
            let result = Evaluator::new(&mut self.ctx).run_statements(&task.body, &body_scope);
            if let Err(e) = result {
                let (line, column) = (e.line(), e.column());
                let file = task.source_file.clone();
                self.ctx
                    .emit_for_file(EventKind::Error, e.to_string(), file, line, column);
            }
        }
        self.ctx.begin_file(None);
    }

    /// Events emitted in this session so far
    pub fn events(&self) -> &[OutputEvent] {
        self.ctx.events()
    }

    pub fn take_events(&mut self) -> Vec<OutputEvent> {
        self.ctx.take_events()
    }

    /// Number of requests currently awaiting a response
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    // ==================== Load machinery ====================

    fn state_of(&self, canonical: &str) -> LoadState {
        if self.ctx.get_module(canonical).is_some() {
            return LoadState::Loaded;
        }
        if self.pending.contains_key(canonical) || self.is_blocked(canonical) {
            return LoadState::Pending;
        }
        if self.failures.contains_key(canonical) {
            return LoadState::Failed;
        }
        LoadState::Unrequested
    }

    fn is_blocked(&self, canonical: &str) -> bool {
        self.blocked
            .iter()
            .any(|b| matches!(&b.origin, EvalOrigin::Module(p) if p == canonical))
    }

    /// Start a load unless the path is already cached, pending, or
    /// blocked on dependencies; this is where de-duplication happens
    fn request(&mut self, canonical: &str) {
        if self.ctx.get_module(canonical).is_some()
            || self.pending.contains_key(canonical)
            || self.is_blocked(canonical)
        {
            return;
        }
        // A fresh reference clears the previous failure and retries
        self.failures.remove(canonical);
        debug!(self.logger, "Requesting module {}", canonical);
        self.pending.insert(
            canonical.to_string(),
            PendingLoad {
                requested_at_ms: self.clock.now_ms(),
            },
        );
        self.transport.post(ModuleMessage::ModuleRequest {
            path: canonical.to_string(),
        });
    }

    /// Source arrived: parse, request missing dependencies, evaluate
    /// when ready
    fn accept_source(&mut self, path: String, code: &str) {
        let program = match parse_source(code, self.logger.clone()) {
            Ok(program) => program,
            Err(e) => {
                let message = e.to_string();
                self.fail(
                    path.clone(),
                    BridgeError::Parse {
                        path,
                        message,
                    },
                );
                return;
            }
        };

        let deps = self.unresolved_deps(&program, Some(&path));

        // A dependency that (transitively) awaits this module closes a
        // cycle; partial exports are never returned
        for dep in &deps {
            if dep == &path || self.waits_on(dep, &path) {
                let chain = vec![path.clone(), dep.clone(), path.clone()];
                self.fail(path.clone(), BridgeError::Cycle { chain });
                return;
            }
        }

        for dep in &deps {
            self.request(dep);
        }
        self.blocked.push(BlockedEval {
            origin: EvalOrigin::Module(path),
            program,
            deps,
        });
        self.drain_ready();
    }

    /// Canonical dependencies of a program that are not yet cached
    fn unresolved_deps(&self, program: &Program, importer: Option<&str>) -> HashSet<String> {
        collect_import_specifiers(program)
            .into_iter()
            .map(|specifier| canonicalize(&specifier, importer))
            .filter(|canonical| self.ctx.get_module(canonical).is_none())
            .collect()
    }

    /// Whether `path`'s evaluation (transitively) waits on `target`
    fn waits_on(&self, path: &str, target: &str) -> bool {
        let Some(blocked) = self
            .blocked
            .iter()
            .find(|b| matches!(&b.origin, EvalOrigin::Module(p) if p == path))
        else {
            return false;
        };
        for dep in &blocked.deps {
            if dep == target || self.waits_on(dep, target) {
                return true;
            }
        }
        false
    }

    /// Evaluate every blocked program whose dependencies are all loaded;
    /// each completed module may unblock more
    fn drain_ready(&mut self) {
        loop {
            let ready_idx = self.blocked.iter().position(|b| b.deps.is_empty());
            let Some(idx) = ready_idx else { break };
            let blocked = self.blocked.swap_remove(idx);
            match blocked.origin {
                EvalOrigin::Module(path) => self.eval_module(path, &blocked.program),
                EvalOrigin::Inline => {
                    // Deferred inline failures surface through the event
                    // sink only
                    let _ = self.eval_inline(&blocked.program);
                }
            }
        }
    }

    /// Evaluate a fetched module in an isolated scope and cache its
    /// export table
    fn eval_module(&mut self, path: String, program: &Program) {
        debug!(self.logger, "Evaluating module {}", path);
        self.ctx.begin_file(Some(path.clone()));
        let module_scope = Scope::child(&self.ctx.globals);
        let result = Evaluator::new(&mut self.ctx).run_program(program, &module_scope);
        self.ctx.begin_file(None);

        match result {
            Ok(()) => {
                if self.ctx.get_module(&path).is_none() {
                    // Module source without a `module` block: cache an
                    // empty frozen export table
                    let ns = Namespace::new(file_stem(&path));
                    ns.freeze();
                    self.ctx.register_module(path.clone(), ns);
                }
                self.resolve(&path);
            }
            Err(e) => {
                let message = e.to_string();
                self.fail(path.clone(), BridgeError::Eval { path, message });
            }
        }
    }

    fn eval_inline(&mut self, program: &Program) -> Result<(), BridgeError> {
        self.ctx.begin_file(None);
        let scope = Scope::child(&self.ctx.globals);
        let result = Evaluator::new(&mut self.ctx).run_program(program, &scope);
        if let Err(e) = result {
            let message = e.to_string();
            self.ctx.emit_for_file(
                EventKind::Error,
                message.clone(),
                None,
                e.line(),
                e.column(),
            );
            return Err(BridgeError::Eval {
                path: "<inline>".to_string(),
                message,
            });
        }
        Ok(())
    }

    /// A module finished loading: clear it from every waiter
    fn resolve(&mut self, path: &str) {
        for blocked in &mut self.blocked {
            blocked.deps.remove(path);
        }
        self.drain_ready();
    }

    /// A load failed: record it, surface it on the diagnostics channel,
    /// and fail every dependent in turn. The path is out of the pending
    /// set, so a future reference retries.
    fn fail(&mut self, path: String, error: BridgeError) {
        debug!(self.logger, "Module {} failed: {}", path, error);
        let message = error.message();
        self.failures.insert(path.clone(), error);
        self.ctx
            .emit_for_file(EventKind::Error, message, Some(path.clone()), None, None);

        // Dependents reject in turn; no automatic retry
        let dependents: Vec<BlockedEval> = {
            let mut kept = Vec::new();
            let mut failed = Vec::new();
            for blocked in self.blocked.drain(..) {
                if blocked.deps.contains(&path) {
                    failed.push(blocked);
                } else {
                    kept.push(blocked);
                }
            }
            self.blocked = kept;
            failed
        };
        for dependent in dependents {
            match dependent.origin {
                EvalOrigin::Module(dep_path) => {
                    self.fail(
                        dep_path.clone(),
                        BridgeError::Dependency {
                            path: dep_path,
                            dependency: path.clone(),
                        },
                    );
                }
                EvalOrigin::Inline => {
                    self.ctx.emit_for_file(
                        EventKind::Error,
                        format!("inline entry failed: dependency '{}' failed", path),
                        None,
                        None,
                        None,
                    );
                }
            }
        }
    }
}

fn file_stem(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    file.split('.').next().unwrap_or(file).to_string()
}
