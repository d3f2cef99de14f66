//! Tree-walking evaluator
//!
//! Executes a parsed program against the run's shared
//! [`ExecutionContext`]. The context is always passed in explicitly;
//! there is no global interpreter state. Errors abort only the file (or
//! module load) being evaluated - the workspace runner converts them to
//! `error` events and continues with the next file.

use crate::compiler::lexer::token_kind::FluxoTokenKind;
use crate::compiler::parse_source;
use crate::compiler::parser::expr::{ExprKind, FunctionCall, ImportExpr, MemberAccess};
use crate::compiler::parser::program::Program;
use crate::compiler::parser::stmt::{Stmt, StmtKind};
use crate::kit::lexer::SourcePosition;
use crate::module::resolver::canonicalize;
use crate::runtime::context::{ExecutionContext, ModuleSlot};
use crate::runtime::error::EvalError;
use crate::runtime::events::EventKind;
use crate::runtime::operators::{apply_binary, apply_unary};
use crate::runtime::scope::{Scope, ScopeRef};
use crate::runtime::value::{FunctionValue, Namespace, NativeFunction, Value};
use fluxo_log::trace;
use std::cell::RefCell;
use std::rc::Rc;

/// Control flow signal threaded through statement execution
enum Flow {
    Normal,
    Return(Value),
}

/// Per-file evaluator; all state lives in the shared context
pub struct Evaluator<'a> {
    ctx: &'a mut ExecutionContext,
    /// Function call depth, bounded by config
    depth: usize,
    /// Export table of the module block currently being evaluated
    current_module: Option<Rc<Namespace>>,
}

impl<'a> Evaluator<'a> {
    pub fn new(ctx: &'a mut ExecutionContext) -> Self {
        Self {
            ctx,
            depth: 0,
            current_module: None,
        }
    }

    /// Execute a program's statements in document order
    pub fn run_program(&mut self, program: &Program, scope: &ScopeRef) -> Result<(), EvalError> {
        self.run_statements(&program.statements, scope)
    }

    /// Execute statements in the given scope (no new scope is created)
    pub fn run_statements(&mut self, stmts: &[Stmt], scope: &ScopeRef) -> Result<(), EvalError> {
        for stmt in stmts {
            if let Flow::Return(_) = self.exec_stmt(stmt, scope)? {
                // A top-level return ends the file normally
                break;
            }
        }
        Ok(())
    }

    // ==================== Statements ====================

    fn exec_stmt(&mut self, stmt: &Stmt, scope: &ScopeRef) -> Result<Flow, EvalError> {
        match stmt.as_ref() {
            StmtKind::Expr(s) => {
                self.eval_expr(&s.expression, scope)?;
                Ok(Flow::Normal)
            }
            StmtKind::Empty(_) => Ok(Flow::Normal),
            StmtKind::Block(s) => {
                let inner = Scope::child(scope);
                self.exec_statements(&s.statements, &inner)
            }
            StmtKind::LocalDecl(s) => {
                let value = match &s.initializer {
                    Some(init) => self.eval_expr(init, scope)?,
                    None => Value::Null,
                };
                Scope::define(scope, s.name.clone(), value);
                Ok(Flow::Normal)
            }
            StmtKind::FunctionDecl(s) => {
                let body = match s.body.as_ref() {
                    StmtKind::Block(b) => Rc::new(b.statements.clone()),
                    _ => Rc::new(vec![s.body.clone()]),
                };
                let func = Value::Function(Rc::new(FunctionValue {
                    name: Some(s.name.clone()),
                    params: s.params.clone(),
                    rest_param: s.rest_param.clone(),
                    body,
                    closure: scope.clone(),
                }));
                Scope::define(scope, s.name.clone(), func.clone());
                if s.exported {
                    match &self.current_module {
                        Some(ns) => ns.set(s.name.clone(), func),
                        // `export function` at script top level publishes
                        // into the shared global scope
                        None => Scope::define(&self.ctx.globals, s.name.clone(), func),
                    }
                }
                Ok(Flow::Normal)
            }
            StmtKind::If(s) => {
                if self.eval_expr(&s.condition, scope)?.is_truthy() {
                    self.exec_stmt(&s.then_body, scope)
                } else if let Some(else_body) = &s.else_body {
                    self.exec_stmt(else_body, scope)
                } else {
                    Ok(Flow::Normal)
                }
            }
            StmtKind::While(s) => {
                while self.eval_expr(&s.condition, scope)?.is_truthy() {
                    if let Flow::Return(value) = self.exec_stmt(&s.body, scope)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal)
            }
            StmtKind::For(s) => {
                let loop_scope = Scope::child(scope);
                if let Some(init) = &s.init {
                    self.exec_stmt(init, &loop_scope)?;
                }
                loop {
                    if let Some(condition) = &s.condition {
                        if !self.eval_expr(condition, &loop_scope)?.is_truthy() {
                            break;
                        }
                    }
                    if let Flow::Return(value) = self.exec_stmt(&s.body, &loop_scope)? {
                        return Ok(Flow::Return(value));
                    }
                    if let Some(step) = &s.step {
                        self.eval_expr(step, &loop_scope)?;
                    }
                }
                Ok(Flow::Normal)
            }
            StmtKind::Return(s) => {
                let value = match &s.value {
                    Some(expr) => self.eval_expr(expr, scope)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
            StmtKind::Module(s) => {
                self.exec_module(s.name.clone(), &s.body, s.position)?;
                Ok(Flow::Normal)
            }
            StmtKind::ExportList(s) => {
                let ns = match &self.current_module {
                    Some(ns) => ns.clone(),
                    None => {
                        return Err(EvalError::ExportOutsideModule {
                            position: Some(s.position),
                        })
                    }
                };
                for name in &s.names {
                    let value = Scope::get(scope, name).ok_or_else(|| EvalError::Reference {
                        name: name.clone(),
                        position: Some(s.position),
                    })?;
                    ns.set(name.clone(), value);
                }
                Ok(Flow::Normal)
            }
            StmtKind::ImportFrom(s) => {
                let canonical = canonicalize(&s.specifier, self.ctx.current_file());
                let ns = self.require_module(&s.specifier, &canonical)?;
                for name in &s.names {
                    let value = ns.get(name).ok_or_else(|| {
                        EvalError::type_error(
                            format!("module '{}' does not export '{}'", ns.name, name),
                            Some(s.position),
                        )
                    })?;
                    Scope::define(scope, name.clone(), value);
                }
                Ok(Flow::Normal)
            }
            StmtKind::Wait(s) => {
                let seconds = match self.eval_expr(&s.seconds, scope)? {
                    Value::Number(n) => n,
                    other => {
                        return Err(EvalError::type_error(
                            format!("wait() expects seconds as a number, got {}", other.type_name()),
                            Some(s.position),
                        ))
                    }
                };
                if self.ctx.scheduler.scheduled_count() >= self.ctx.limits.max_scheduled_tasks {
                    return Err(EvalError::LimitExceeded {
                        what: format!(
                            "more than {} scheduled wait blocks",
                            self.ctx.limits.max_scheduled_tasks
                        ),
                    });
                }
                let body = match s.body.as_ref() {
                    StmtKind::Block(b) => Rc::new(b.statements.clone()),
                    _ => Rc::new(vec![s.body.clone()]),
                };
                let source_file = self.ctx.current_file().map(str::to_string);
                trace!(self.ctx.logger, "Scheduling wait({}) block", seconds);
                self.ctx
                    .scheduler
                    .schedule(seconds, body, scope.clone(), source_file);
                // Control falls through to the next statement
                Ok(Flow::Normal)
            }
        }
    }

    /// Statements of an already-created block scope
    fn exec_statements(&mut self, stmts: &[Stmt], scope: &ScopeRef) -> Result<Flow, EvalError> {
        for stmt in stmts {
            if let Flow::Return(value) = self.exec_stmt(stmt, scope)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    /// `module name { body }`: fresh private scope, exports collected
    /// into a namespace that freezes when the block ends
    fn exec_module(
        &mut self,
        name: String,
        body: &Stmt,
        position: SourcePosition,
    ) -> Result<(), EvalError> {
        let ns = Namespace::new(name);
        let module_scope = Scope::child(&self.ctx.globals);
        let previous = self.current_module.replace(ns.clone());

        let result = match body.as_ref() {
            StmtKind::Block(b) => self.exec_statements(&b.statements, &module_scope).map(|_| ()),
            _ => Err(EvalError::type_error("module body must be a block", Some(position))),
        };

        self.current_module = previous;
        result?;

        ns.freeze();
        match self.ctx.current_file().map(str::to_string) {
            Some(path) => self.ctx.register_module(path, ns),
            // Inline code has no canonical path to register under; the
            // declared name is still bound for later statements
            None => Scope::define(&self.ctx.globals, ns.name.clone(), Value::Namespace(ns)),
        }
        Ok(())
    }

    // ==================== Module loading ====================

    /// Return the export table for a canonical module path, evaluating
    /// the module's file on first use
    pub fn require_module(
        &mut self,
        specifier: &str,
        canonical: &str,
    ) -> Result<Rc<Namespace>, EvalError> {
        match self.ctx.module_slot(canonical) {
            Some(ModuleSlot::Ready(_)) => Ok(self.ctx.get_module(canonical).expect("ready slot")),
            Some(ModuleSlot::Initializing) => {
                let mut chain = self.ctx.resolving_stack.clone();
                chain.push(canonical.to_string());
                Err(EvalError::CyclicImport { chain })
            }
            Some(ModuleSlot::Failed(message)) => Err(EvalError::ModuleLoadFailed {
                path: canonical.to_string(),
                message: message.clone(),
            }),
            Some(ModuleSlot::Uninitialized(_)) => self.initialize_module(canonical),
            None => Err(EvalError::ModuleNotFound {
                specifier: specifier.to_string(),
                canonical: canonical.to_string(),
            }),
        }
    }

    /// Evaluate a not-yet-initialized module file and register its
    /// exports; failures become an `error` event attributed to the
    /// module's own file and poison the slot
    fn initialize_module(&mut self, canonical: &str) -> Result<Rc<Namespace>, EvalError> {
        let unit = self
            .ctx
            .take_uninitialized(canonical)
            .expect("uninitialized slot");

        let saved_file = self.ctx.current_file().map(str::to_string);
        let saved_module = self.current_module.take();
        self.ctx.resolving_stack.push(canonical.to_string());
        self.ctx.begin_file(Some(canonical.to_string()));

        // (message, line, column) on failure; parse and evaluation
        // failures both poison the slot
        let result = match parse_source(&unit.code, self.ctx.logger.clone()) {
            Ok(program) => {
                let file_scope = Scope::child(&self.ctx.globals);
                self.run_program(&program, &file_scope)
                    .map_err(|e| (e.to_string(), e.line(), e.column()))
            }
            Err(parse_error) => Err((
                parse_error.to_string(),
                parse_error.line(),
                parse_error.column(),
            )),
        };

        self.ctx.resolving_stack.pop();
        self.ctx.begin_file(saved_file);
        self.current_module = saved_module;

        match result {
            Ok(()) => {
                if let Some(ns) = self.ctx.get_module(canonical) {
                    Ok(ns)
                } else {
                    // A module file without a `module` block still yields
                    // a (empty) frozen export table
                    let stem = file_stem(canonical);
                    let ns = Namespace::new(stem);
                    ns.freeze();
                    self.ctx.register_module(canonical.to_string(), ns.clone());
                    Ok(ns)
                }
            }
            Err((message, line, column)) => {
                self.ctx.emit_for_file(
                    EventKind::Error,
                    message.clone(),
                    Some(canonical.to_string()),
                    line,
                    column,
                );
                self.ctx.mark_module_failed(canonical.to_string(), message.clone());
                Err(EvalError::ModuleLoadFailed {
                    path: canonical.to_string(),
                    message,
                })
            }
        }
    }

    // ==================== Expressions ====================

    fn eval_expr(&mut self, expr: &ExprKind, scope: &ScopeRef) -> Result<Value, EvalError> {
        match expr {
            ExprKind::LiteralNumber(n) => Ok(Value::Number(n.value)),
            ExprKind::LiteralString(s) => Ok(Value::string(&s.value)),
            ExprKind::LiteralTrue(_) => Ok(Value::Bool(true)),
            ExprKind::LiteralFalse(_) => Ok(Value::Bool(false)),
            ExprKind::LiteralNull(_) => Ok(Value::Null),
            ExprKind::Grouping(g) => self.eval_expr(&g.expression, scope),
            ExprKind::VarRef(v) => {
                Scope::get(scope, &v.name).ok_or_else(|| EvalError::Reference {
                    name: v.name.clone(),
                    position: Some(v.position),
                })
            }
            ExprKind::Assign(a) => {
                let value = self.eval_expr(&a.value, scope)?;
                if Scope::set_existing(scope, &a.name, value.clone()) {
                    return Ok(value);
                }
                if self.ctx.engine.strict_bindings {
                    return Err(EvalError::Reference {
                        name: a.name.clone(),
                        position: Some(a.position),
                    });
                }
                // Implicit global: assignment to an undeclared name
                // creates a binding in the global scope
                Scope::define(&self.ctx.globals, a.name.clone(), value.clone());
                Ok(value)
            }
            ExprKind::Binary(b) => match b.op {
                // Short-circuit operators evaluate the right side lazily
                FluxoTokenKind::AmpAmp => {
                    let left = self.eval_expr(&b.left, scope)?;
                    if !left.is_truthy() {
                        return Ok(left);
                    }
                    self.eval_expr(&b.right, scope)
                }
                FluxoTokenKind::PipePipe => {
                    let left = self.eval_expr(&b.left, scope)?;
                    if left.is_truthy() {
                        return Ok(left);
                    }
                    self.eval_expr(&b.right, scope)
                }
                op => {
                    let left = self.eval_expr(&b.left, scope)?;
                    let right = self.eval_expr(&b.right, scope)?;
                    apply_binary(op, &left, &right)
                        .map_err(|message| EvalError::type_error(message, Some(b.position)))
                }
            },
            ExprKind::Unary(u) => {
                let operand = self.eval_expr(&u.operand, scope)?;
                apply_unary(u.op, &operand)
                    .map_err(|message| EvalError::type_error(message, Some(u.position)))
            }
            ExprKind::FunctionCall(call) => self.eval_call(call, scope),
            ExprKind::MemberAccess(access) => self.eval_member(access, scope),
            ExprKind::Lambda(l) => {
                let body = match l.body.as_ref() {
                    StmtKind::Block(b) => Rc::new(b.statements.clone()),
                    _ => Rc::new(vec![l.body.clone()]),
                };
                Ok(Value::Function(Rc::new(FunctionValue {
                    name: None,
                    params: l.params.clone(),
                    rest_param: l.rest_param.clone(),
                    body,
                    closure: scope.clone(),
                })))
            }
            ExprKind::Import(import) => self.eval_import(import, scope),
        }
    }

    /// `import("path")` / `require("path")`: loads the module, binds its
    /// declared name in the current scope, returns the namespace
    fn eval_import(&mut self, import: &ImportExpr, scope: &ScopeRef) -> Result<Value, EvalError> {
        let canonical = canonicalize(&import.specifier, self.ctx.current_file());
        let ns = self.require_module(&import.specifier, &canonical)?;
        Scope::define(scope, ns.name.clone(), Value::Namespace(ns.clone()));
        Ok(Value::Namespace(ns))
    }

    fn eval_member(&mut self, access: &MemberAccess, scope: &ScopeRef) -> Result<Value, EvalError> {
        let object = self.eval_expr(&access.object, scope)?;
        match &object {
            Value::Namespace(ns) => ns.get(&access.member).ok_or_else(|| {
                EvalError::type_error(
                    format!("'{}' has no member '{}'", ns.name, access.member),
                    Some(access.position),
                )
            }),
            Value::List(items) => match access.member.as_str() {
                "length" => Ok(Value::Number(items.borrow().len() as f64)),
                other => Err(EvalError::type_error(
                    format!("list has no member '{}'", other),
                    Some(access.position),
                )),
            },
            other => Err(EvalError::type_error(
                format!(
                    "cannot read member '{}' of {}",
                    access.member,
                    other.type_name()
                ),
                Some(access.position),
            )),
        }
    }

    fn eval_call(&mut self, call: &FunctionCall, scope: &ScopeRef) -> Result<Value, EvalError> {
        let callee = self.eval_expr(&call.function_expr, scope)?;
        let mut arguments = Vec::with_capacity(call.arguments.len());
        for arg in &call.arguments {
            arguments.push(self.eval_expr(arg, scope)?);
        }
        self.call_value(&callee, arguments, call.position)
    }

    /// Invoke a callable value
    pub fn call_value(
        &mut self,
        callee: &Value,
        arguments: Vec<Value>,
        position: SourcePosition,
    ) -> Result<Value, EvalError> {
        match callee {
            Value::Function(func) => {
                if self.depth >= self.ctx.limits.max_call_depth {
                    return Err(EvalError::LimitExceeded {
                        what: format!("call depth of {}", self.ctx.limits.max_call_depth),
                    });
                }

                // New lexical scope chained to the defining scope, not
                // the calling one
                let call_scope = Scope::child(&func.closure);
                for (i, param) in func.params.iter().enumerate() {
                    let value = arguments.get(i).cloned().unwrap_or(Value::Null);
                    Scope::define(&call_scope, param.clone(), value);
                }
                if let Some(rest) = &func.rest_param {
                    let remaining: Vec<Value> = arguments
                        .iter()
                        .skip(func.params.len())
                        .cloned()
                        .collect();
                    Scope::define(
                        &call_scope,
                        rest.clone(),
                        Value::List(Rc::new(RefCell::new(remaining))),
                    );
                }

                self.depth += 1;
                let flow = self.exec_statements(&func.body, &call_scope);
                self.depth -= 1;

                match flow? {
                    Flow::Return(value) => Ok(value),
                    Flow::Normal => Ok(Value::Null),
                }
            }
            Value::Native(native) => self.call_native(*native, &arguments, position),
            other => Err(EvalError::type_error(
                format!("{} is not a function", other.type_name()),
                Some(position),
            )),
        }
    }

    fn call_native(
        &mut self,
        native: NativeFunction,
        arguments: &[Value],
        position: SourcePosition,
    ) -> Result<Value, EvalError> {
        match native {
            NativeFunction::ConsoleLog
            | NativeFunction::ConsoleWarn
            | NativeFunction::ConsoleError => {
                // Arguments joined by a single space, one event per call
                let message = arguments
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                let kind = match native {
                    NativeFunction::ConsoleLog => EventKind::Log,
                    NativeFunction::ConsoleWarn => EventKind::Warning,
                    NativeFunction::ConsoleError => EventKind::Error,
                };
                self.ctx.emit(kind, message, Some(position));
                Ok(Value::Null)
            }
        }
    }
}

/// File stem used to name the fallback export table of a module file
/// without a `module` block
fn file_stem(path: &str) -> String {
    let file = path.rsplit('/').next().unwrap_or(path);
    file.split('.').next().unwrap_or(file).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxo_config::{EngineConfig, LimitConfig};
    use fluxo_log::Logger;

    fn run(code: &str) -> (ExecutionContext, Result<(), EvalError>) {
        let mut ctx = ExecutionContext::new(
            EngineConfig::default(),
            LimitConfig::default(),
            Logger::noop(),
        );
        let program = parse_source(code, Logger::noop()).expect("parse");
        let scope = Scope::child(&ctx.globals);
        let result = Evaluator::new(&mut ctx).run_program(&program, &scope);
        (ctx, result)
    }

    fn logs(ctx: &ExecutionContext) -> Vec<String> {
        ctx.events()
            .iter()
            .filter(|e| e.kind == EventKind::Log)
            .map(|e| e.message.clone())
            .collect()
    }

    #[test]
    fn test_console_log_joins_with_spaces() {
        let (ctx, result) = run("console.log(\"a\", 1, true)");
        result.unwrap();
        assert_eq!(logs(&ctx), vec!["a 1 true"]);
    }

    #[test]
    fn test_plus_overload() {
        let (ctx, result) = run(
            r#"
            console.log(2 + 3)
            console.log("I'm " + "Taylor")
            console.log("n = " + 5)
            "#,
        );
        result.unwrap();
        assert_eq!(logs(&ctx), vec!["5", "I'm Taylor", "n = 5"]);
    }

    #[test]
    fn test_closures_capture_by_reference() {
        let (ctx, result) = run(
            r#"
            local count = 0
            function bump() { count = count + 1 }
            bump()
            bump()
            console.log(count)
            "#,
        );
        result.unwrap();
        assert_eq!(logs(&ctx), vec!["2"]);
    }

    #[test]
    fn test_rest_parameter_binds_remaining_arguments() {
        let (ctx, result) = run(
            r#"
            function tail(first, ...rest) {
                return rest
            }
            console.log(tail(1, 2, 3, 4))
            console.log(tail(1).length)
            "#,
        );
        result.unwrap();
        assert_eq!(logs(&ctx), vec!["2,3,4", "0"]);
    }

    #[test]
    fn test_undefined_variable_is_reference_error() {
        let (_, result) = run("console.log(missing)");
        match result.unwrap_err() {
            EvalError::Reference { name, position } => {
                assert_eq!(name, "missing");
                assert!(position.is_some());
            }
            other => panic!("expected reference error, got {:?}", other),
        }
    }

    #[test]
    fn test_calling_non_function_is_type_error() {
        let (_, result) = run("local x = 5\nx()");
        assert!(matches!(result.unwrap_err(), EvalError::Type { .. }));
    }

    #[test]
    fn test_implicit_global_assignment() {
        let (ctx, result) = run("function set() { flag = 1 }\nset()\nconsole.log(flag)");
        result.unwrap();
        assert_eq!(logs(&ctx), vec!["1"]);
    }

    #[test]
    fn test_strict_bindings_reject_implicit_global() {
        let mut ctx = ExecutionContext::new(
            EngineConfig {
                strict_bindings: true,
                ..EngineConfig::default()
            },
            LimitConfig::default(),
            Logger::noop(),
        );
        let program = parse_source("flag = 1", Logger::noop()).expect("parse");
        let scope = Scope::child(&ctx.globals);
        let result = Evaluator::new(&mut ctx).run_program(&program, &scope);
        assert!(matches!(result.unwrap_err(), EvalError::Reference { .. }));
    }

    #[test]
    fn test_local_is_block_scoped() {
        let (ctx, result) = run(
            r#"
            local x = 1
            { local x = 2 }
            console.log(x)
            "#,
        );
        result.unwrap();
        assert_eq!(logs(&ctx), vec!["1"]);
    }

    #[test]
    fn test_while_and_for_loops() {
        let (ctx, result) = run(
            r#"
            local total = 0
            for (local i = 1; i <= 4; i = i + 1) { total = total + i }
            console.log(total)
            local n = 3
            while (n > 0) { n = n - 1 }
            console.log(n)
            "#,
        );
        result.unwrap();
        assert_eq!(logs(&ctx), vec!["10", "0"]);
    }

    #[test]
    fn test_wait_does_not_block() {
        let (ctx, result) = run(
            r#"
            wait(1) { console.log("A") }
            console.log("B")
            "#,
        );
        result.unwrap();
        // The deferred body has not run yet; only B is logged
        assert_eq!(logs(&ctx), vec!["B"]);
        assert_eq!(ctx.scheduler.pending(), 1);
    }

    #[test]
    fn test_export_list_outside_module_is_rejected() {
        let (_, result) = run("local a = 1\nexport { a }");
        assert!(matches!(
            result.unwrap_err(),
            EvalError::ExportOutsideModule { .. }
        ));
    }

    #[test]
    fn test_module_private_bindings_stay_private() {
        let (mut ctx, result) = run(
            r#"
            module m {
                local secret = 42
                export function get() { return secret }
            }
            "#,
        );
        result.unwrap();
        // `secret` is not a global, but the export closes over it
        assert!(Scope::get(&ctx.globals, "secret").is_none());
        let ns = match Scope::get(&ctx.globals, "m") {
            Some(Value::Namespace(ns)) => ns,
            other => panic!("module binding missing: {:?}", other),
        };
        assert!(ns.get("secret").is_none());
        let getter = ns.get("get").unwrap();
        let value = Evaluator::new(&mut ctx)
            .call_value(&getter, vec![], SourcePosition::start())
            .unwrap();
        assert_eq!(value, Value::Number(42.0));
    }

    #[test]
    fn test_module_exports_freeze_after_evaluation() {
        let (ctx, result) = run("module m { export function f() { } }");
        result.unwrap();
        match Scope::get(&ctx.globals, "m") {
            Some(Value::Namespace(ns)) => assert!(ns.is_frozen()),
            other => panic!("module binding missing: {:?}", other),
        }
    }

    #[test]
    fn test_recursion_depth_limit() {
        let mut ctx = ExecutionContext::new(
            EngineConfig::default(),
            LimitConfig {
                max_call_depth: 16,
                ..LimitConfig::default()
            },
            Logger::noop(),
        );
        let program =
            parse_source("function f() { return f() }\nf()", Logger::noop()).expect("parse");
        let scope = Scope::child(&ctx.globals);
        let result = Evaluator::new(&mut ctx).run_program(&program, &scope);
        assert!(matches!(result.unwrap_err(), EvalError::LimitExceeded { .. }));
    }

    #[test]
    fn test_console_warn_and_error_kinds() {
        let (ctx, result) = run("console.warn(\"careful\")\nconsole.error(\"bad\")");
        result.unwrap();
        let kinds: Vec<EventKind> = ctx.events().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Warning, EventKind::Error]);
    }
}
