//! Runtime value representation

use crate::compiler::parser::stmt::Stmt;
use crate::runtime::scope::ScopeRef;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A Fluxo runtime value
#[derive(Debug, Clone)]
pub enum Value {
    /// All numbers are f64
    Number(f64),
    Str(Rc<str>),
    Bool(bool),
    Null,
    /// Ordered sequence; produced for rest parameters
    List(Rc<RefCell<Vec<Value>>>),
    /// User function (closure over its defining scope)
    Function(Rc<FunctionValue>),
    /// Engine-provided function
    Native(NativeFunction),
    /// Module export table or builtin namespace (`console`)
    Namespace(Rc<Namespace>),
}

/// A user-declared function value
#[derive(Debug)]
pub struct FunctionValue {
    /// Declared name; `None` for anonymous functions
    pub name: Option<String>,
    pub params: Vec<String>,
    pub rest_param: Option<String>,
    /// Body block statements, shared with the AST
    pub body: Rc<Vec<Stmt>>,
    /// Defining scope; closures capture by reference
    pub closure: ScopeRef,
}

/// Engine-provided functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeFunction {
    /// `console.log(...)` - emits a `log` event
    ConsoleLog,
    /// `console.warn(...)` - emits a `warning` event
    ConsoleWarn,
    /// `console.error(...)` - emits an `error` event
    ConsoleError,
}

impl NativeFunction {
    pub fn name(self) -> &'static str {
        match self {
            NativeFunction::ConsoleLog => "log",
            NativeFunction::ConsoleWarn => "warn",
            NativeFunction::ConsoleError => "error",
        }
    }
}

/// A named collection of bindings
///
/// Used for module export tables (frozen once the declaring file finishes
/// evaluation) and for builtin namespaces such as `console`.
#[derive(Debug)]
pub struct Namespace {
    pub name: String,
    entries: RefCell<HashMap<String, Value>>,
    frozen: Cell<bool>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            name: name.into(),
            entries: RefCell::new(HashMap::new()),
            frozen: Cell::new(false),
        })
    }

    /// Look up an entry
    pub fn get(&self, key: &str) -> Option<Value> {
        self.entries.borrow().get(key).cloned()
    }

    /// Insert an entry; silently ignored once frozen
    pub fn set(&self, key: impl Into<String>, value: Value) {
        if self.frozen.get() {
            return;
        }
        self.entries.borrow_mut().insert(key.into(), value);
    }

    /// Make the namespace read-only
    pub fn freeze(&self) {
        self.frozen.set(true);
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }

    /// Entry names, sorted for stable output
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

/// Render an f64 the way Fluxo prints it: integer-valued numbers have no
/// decimal point
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

impl Value {
    /// Type name used in error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Str(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Null => "null",
            Value::List(_) => "list",
            Value::Function(_) => "function",
            Value::Native(_) => "function",
            Value::Namespace(_) => "module",
        }
    }

    /// Truthiness: `false`, `null`, `0`, `NaN` and `""` are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Null => false,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// Numeric coercion for mixed-type comparisons: strings parse to a
    /// number or NaN, booleans become 0/1, null becomes 0
    pub fn coerce_number(&self) -> f64 {
        match self {
            Value::Number(n) => *n,
            Value::Str(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            Value::Bool(true) => 1.0,
            Value::Bool(false) => 0.0,
            Value::Null => 0.0,
            _ => f64::NAN,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Build a string value
    pub fn string(s: impl AsRef<str>) -> Value {
        Value::Str(Rc::from(s.as_ref()))
    }
}

/// Textual conversion rule shared by `+` concatenation and `console.log`
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::Str(s) => write!(f, "{}", s),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::List(items) => {
                let rendered = items
                    .borrow()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "{}", rendered)
            }
            Value::Function(func) => match &func.name {
                Some(name) => write!(f, "<function {}>", name),
                None => write!(f, "<function>"),
            },
            Value::Native(native) => write!(f, "<function {}>", native.name()),
            Value::Namespace(ns) => write!(f, "<module {}>", ns.name),
        }
    }
}

/// Strict same-type equality; loose `==` lives in operators
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Native(a), Value::Native(b)) => a == b,
            (Value::Namespace(a), Value::Namespace(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5.0), "5");
        assert_eq!(format_number(3.14), "3.14");
        assert_eq!(format_number(-2.0), "-2");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_display_follows_textual_rule() {
        assert_eq!(Value::Number(5.0).to_string(), "5");
        assert_eq!(Value::string("hi").to_string(), "hi");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(!Value::Number(f64::NAN).is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(Value::Number(1.0).is_truthy());
        assert!(Value::string("x").is_truthy());
    }

    #[test]
    fn test_coerce_number() {
        assert_eq!(Value::string("42").coerce_number(), 42.0);
        assert_eq!(Value::string(" 3.5 ").coerce_number(), 3.5);
        assert!(Value::string("abc").coerce_number().is_nan());
        assert_eq!(Value::Null.coerce_number(), 0.0);
        assert_eq!(Value::Bool(true).coerce_number(), 1.0);
    }

    #[test]
    fn test_namespace_freeze() {
        let ns = Namespace::new("m");
        ns.set("a", Value::Number(1.0));
        ns.freeze();
        ns.set("b", Value::Number(2.0));
        assert_eq!(ns.len(), 1);
        assert!(ns.get("b").is_none());
    }

    #[test]
    fn test_namespace_identity_equality() {
        let a = Namespace::new("m");
        let b = Namespace::new("m");
        assert_eq!(Value::Namespace(a.clone()), Value::Namespace(a.clone()));
        assert_ne!(Value::Namespace(a), Value::Namespace(b));
    }

    #[test]
    fn test_list_display_joins_with_commas() {
        let list = Value::List(Rc::new(RefCell::new(vec![
            Value::Number(1.0),
            Value::string("two"),
        ])));
        assert_eq!(list.to_string(), "1,two");
    }
}
