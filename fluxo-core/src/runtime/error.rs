//! Evaluation error taxonomy
//!
//! No error here is fatal to the engine: the unit of failure is one file
//! (batch) or one module load (bridge). The workspace runner converts
//! these into `error` events and moves on to the next file.

use crate::kit::lexer::SourcePosition;
use std::fmt;

/// Evaluation-time error
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// Read of an undefined variable
    Reference {
        name: String,
        position: Option<SourcePosition>,
    },
    /// Operation applied to a value of the wrong type (including calling
    /// a non-function)
    Type {
        message: String,
        position: Option<SourcePosition>,
    },
    /// Module initialization transitively required itself
    CyclicImport { chain: Vec<String> },
    /// No source exists for a canonical module path
    ModuleNotFound {
        specifier: String,
        canonical: String,
    },
    /// A previously failed module was imported again
    ModuleLoadFailed { path: String, message: String },
    /// `export { }` used outside a module block
    ExportOutsideModule { position: Option<SourcePosition> },
    /// A configured execution limit was hit
    LimitExceeded { what: String },
}

impl EvalError {
    pub fn type_error(message: impl Into<String>, position: Option<SourcePosition>) -> Self {
        EvalError::Type {
            message: message.into(),
            position,
        }
    }

    /// Line of the error, when known
    pub fn line(&self) -> Option<usize> {
        self.position().map(|p| p.line)
    }

    /// Column of the error, when known
    pub fn column(&self) -> Option<usize> {
        self.position().map(|p| p.column)
    }

    fn position(&self) -> Option<SourcePosition> {
        match self {
            EvalError::Reference { position, .. }
            | EvalError::Type { position, .. }
            | EvalError::ExportOutsideModule { position } => *position,
            _ => None,
        }
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::Reference { name, .. } => {
                write!(f, "ReferenceError: '{}' is not defined", name)
            }
            EvalError::Type { message, .. } => write!(f, "TypeError: {}", message),
            EvalError::CyclicImport { chain } => {
                write!(f, "CyclicImportError: {}", chain.join(" -> "))
            }
            EvalError::ModuleNotFound {
                specifier,
                canonical,
            } => write!(
                f,
                "ModuleNotFoundError: no module for '{}' (resolved to '{}')",
                specifier, canonical
            ),
            EvalError::ModuleLoadFailed { path, message } => {
                write!(f, "Module '{}' failed to load: {}", path, message)
            }
            EvalError::ExportOutsideModule { .. } => write!(
                f,
                "export {{ }} is only allowed inside a module block, not in a script file"
            ),
            EvalError::LimitExceeded { what } => write!(f, "Limit exceeded: {}", what),
        }
    }
}

impl std::error::Error for EvalError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_error_display() {
        let err = EvalError::Reference {
            name: "x".to_string(),
            position: None,
        };
        assert_eq!(format!("{err}"), "ReferenceError: 'x' is not defined");
    }

    #[test]
    fn test_cyclic_import_display() {
        let err = EvalError::CyclicImport {
            chain: vec!["/a.fxm".into(), "/b.fxm".into(), "/a.fxm".into()],
        };
        assert_eq!(
            format!("{err}"),
            "CyclicImportError: /a.fxm -> /b.fxm -> /a.fxm"
        );
    }

    #[test]
    fn test_position_accessors() {
        let position = SourcePosition {
            line: 4,
            column: 7,
            offset: 0,
        };
        let err = EvalError::type_error("boom", Some(position));
        assert_eq!(err.line(), Some(4));
        assert_eq!(err.column(), Some(7));
        assert_eq!(EvalError::CyclicImport { chain: vec![] }.line(), None);
    }

    #[test]
    fn test_export_outside_module_is_descriptive() {
        let err = EvalError::ExportOutsideModule { position: None };
        let rendered = format!("{err}");
        assert!(rendered.contains("module block"));
        assert!(rendered.contains("script"));
    }
}
