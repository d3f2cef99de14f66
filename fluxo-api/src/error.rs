//! API error types
//!
//! Unified error type plus a structured, serializable report for
//! hosts that want JSON diagnostics (web IDE, LSP).

use fluxo_core::bridge::BridgeError;
use fluxo_core::compiler::parser::ParserError;
use fluxo_core::runtime::EvalError;
use fluxo_vfs::VfsError;
use serde::Serialize;
use thiserror::Error;

/// Fluxo engine error
#[derive(Error, Debug, Clone)]
pub enum FluxoError {
    /// Syntax error (parse time)
    #[error("{0}")]
    Parser(#[from] ParserError),

    /// Evaluation error (ReferenceError, TypeError, module errors)
    #[error("{0}")]
    Eval(#[from] EvalError),

    /// Module load failure in the sandboxed runtime
    #[error("{0}")]
    Bridge(#[from] BridgeError),

    /// Source provider failure
    #[error("{0}")]
    Vfs(#[from] VfsError),

    /// Project / request shape problem
    #[error("Project error: {0}")]
    Project(String),
}

impl FluxoError {
    /// Line of the error, when known
    pub fn line(&self) -> Option<usize> {
        match self {
            FluxoError::Parser(e) => e.line(),
            FluxoError::Eval(e) => e.line(),
            _ => None,
        }
    }

    /// Column of the error, when known
    pub fn column(&self) -> Option<usize> {
        match self {
            FluxoError::Parser(e) => e.column(),
            FluxoError::Eval(e) => e.column(),
            _ => None,
        }
    }

    /// Engine phase that produced the error
    pub fn phase(&self) -> &'static str {
        match self {
            FluxoError::Parser(_) => "parser",
            FluxoError::Eval(_) => "eval",
            FluxoError::Bridge(_) => "bridge",
            FluxoError::Vfs(_) => "vfs",
            FluxoError::Project(_) => "project",
        }
    }

    /// Convert to a structured report
    ///
    /// CLI prints it, web hosts serialize it to JSON.
    pub fn to_report(&self) -> ErrorReport {
        ErrorReport {
            phase: self.phase(),
            line: self.line(),
            column: self.column(),
            message: self.to_string(),
        }
    }
}

/// Structured error report
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub phase: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<usize>,
    pub message: String,
}

impl std::fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => {
                write!(f, "[{}] {}:{} {}", self.phase, line, column, self.message)
            }
            _ => write!(f, "[{}] {}", self.phase, self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fluxo_core::compiler::parse_source;
    use fluxo_log::Logger;

    #[test]
    fn test_parser_error_report_has_position() {
        let parse_error = parse_source("local = 1", Logger::noop()).unwrap_err();
        let err: FluxoError = parse_error.into();
        let report = err.to_report();
        assert_eq!(report.phase, "parser");
        assert!(report.line.is_some());
        assert!(report.message.contains("SyntaxError"));
    }

    #[test]
    fn test_report_serializes_without_missing_positions() {
        let err = FluxoError::Project("no entry".to_string());
        let json = serde_json::to_string(&err.to_report()).unwrap();
        assert!(json.contains("\"phase\":\"project\""));
        assert!(!json.contains("line"));
    }

    #[test]
    fn test_report_display() {
        let err = FluxoError::Eval(EvalError::Reference {
            name: "x".to_string(),
            position: None,
        });
        let rendered = format!("{}", err.to_report());
        assert!(rendered.contains("[eval]"));
        assert!(rendered.contains("ReferenceError"));
    }
}
