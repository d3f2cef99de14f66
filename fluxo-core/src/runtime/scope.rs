//! Lexical scopes
//!
//! Scopes form a parent chain; function values keep an `Rc` to their
//! defining scope, so closures observe later mutation of captured
//! bindings (capture by reference).

use crate::runtime::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub type ScopeRef = Rc<RefCell<Scope>>;

/// One lexical scope
#[derive(Debug)]
pub struct Scope {
    vars: HashMap<String, Value>,
    parent: Option<ScopeRef>,
}

impl Scope {
    /// The root (global) scope of a run
    pub fn new_global() -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            vars: HashMap::new(),
            parent: None,
        }))
    }

    /// A scope chained to `parent`
    pub fn child(parent: &ScopeRef) -> ScopeRef {
        Rc::new(RefCell::new(Scope {
            vars: HashMap::new(),
            parent: Some(parent.clone()),
        }))
    }

    /// Look a name up through the chain
    pub fn get(scope: &ScopeRef, name: &str) -> Option<Value> {
        let mut current = Some(scope.clone());
        while let Some(s) = current {
            let borrowed = s.borrow();
            if let Some(value) = borrowed.vars.get(name) {
                return Some(value.clone());
            }
            current = borrowed.parent.clone();
        }
        None
    }

    /// Update the nearest scope that already holds `name`; returns false
    /// when no scope in the chain holds it
    pub fn set_existing(scope: &ScopeRef, name: &str, value: Value) -> bool {
        let mut current = Some(scope.clone());
        while let Some(s) = current {
            {
                let mut borrowed = s.borrow_mut();
                if borrowed.vars.contains_key(name) {
                    borrowed.vars.insert(name.to_string(), value);
                    return true;
                }
            }
            current = s.borrow().parent.clone();
        }
        false
    }

    /// Define (or shadow) `name` in exactly this scope
    pub fn define(scope: &ScopeRef, name: impl Into<String>, value: Value) {
        scope.borrow_mut().vars.insert(name.into(), value);
    }

    /// Whether this scope itself (not the chain) holds `name`
    pub fn has_own(scope: &ScopeRef, name: &str) -> bool {
        scope.borrow().vars.contains_key(name)
    }
}
