//! Fluxo runtime: values, scopes, the tree-walking evaluator, and the
//! run's shared execution context

pub mod context;
pub mod error;
pub mod eval;
pub mod events;
pub mod operators;
pub mod scheduler;
pub mod scope;
pub mod value;

pub use context::{ExecutionContext, ModuleSlot};
pub use error::EvalError;
pub use eval::Evaluator;
pub use events::{EventKind, EventSink, OutputEvent};
pub use scheduler::Scheduler;
pub use scope::{Scope, ScopeRef};
pub use value::{format_number, FunctionValue, Namespace, NativeFunction, Value};
