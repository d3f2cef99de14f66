//! Parser error types

use crate::kit::lexer::SourcePosition;

/// Syntax error with position information
#[derive(Debug, Clone, PartialEq)]
pub struct ParserError {
    /// Error kind
    pub kind: ParserErrorKind,
    /// Where the error occurred
    pub location: ErrorLocation,
}

/// Error location information
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorLocation {
    /// A specific position
    At(SourcePosition),
    /// End of input
    Eof,
    /// Unknown position
    Unknown,
}

/// Syntax error kinds
#[derive(Debug, Clone, PartialEq)]
pub enum ParserErrorKind {
    /// Unexpected token
    UnexpectedToken {
        found: String,
        expected: Vec<String>,
    },
    /// Malformed number literal
    InvalidNumberFormat(String),
    /// Missing `)`
    MissingRightParen,
    /// Missing `}` for a block opened at the carried location
    MissingRightCurly,
    /// Unexpected end of input
    UnexpectedEndOfInput,
    /// Expected an identifier
    ExpectedIdentifier { found: String },
    /// Assignment target must be a plain name
    InvalidAssignmentTarget,
    /// `module` blocks are only allowed at the top level of a file
    ModuleNotTopLevel,
    /// Lexical error surfaced through the parser
    Lexical(String),
    /// Custom error message
    Custom(String),
}

impl ParserError {
    /// Error at a specific position
    pub fn here(kind: ParserErrorKind, position: SourcePosition) -> Self {
        Self {
            kind,
            location: ErrorLocation::At(position),
        }
    }

    /// Error at end of input
    pub fn at_eof(kind: ParserErrorKind) -> Self {
        Self {
            kind,
            location: ErrorLocation::Eof,
        }
    }

    /// Line number, when known
    pub fn line(&self) -> Option<usize> {
        match &self.location {
            ErrorLocation::At(position) => Some(position.line),
            ErrorLocation::Eof | ErrorLocation::Unknown => None,
        }
    }

    /// Column number, when known
    pub fn column(&self) -> Option<usize> {
        match &self.location {
            ErrorLocation::At(position) => Some(position.column),
            ErrorLocation::Eof | ErrorLocation::Unknown => None,
        }
    }
}

impl std::fmt::Display for ParserError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let location_prefix = match &self.location {
            ErrorLocation::At(position) => format!("{}:{}", position.line, position.column),
            ErrorLocation::Eof => "EOF".to_string(),
            ErrorLocation::Unknown => "?:?".to_string(),
        };

        let message = match &self.kind {
            ParserErrorKind::UnexpectedToken { found, expected } => {
                if expected.is_empty() {
                    format!("Unexpected token {found}")
                } else {
                    format!("Unexpected token {}, expected: {}", found, expected.join(", "))
                }
            }
            ParserErrorKind::InvalidNumberFormat(s) => {
                format!("Invalid number format: '{s}'")
            }
            ParserErrorKind::MissingRightParen => "Missing right parenthesis ')'".to_string(),
            ParserErrorKind::MissingRightCurly => {
                "Missing '}' for block opened here".to_string()
            }
            ParserErrorKind::UnexpectedEndOfInput => "Unexpected end of input".to_string(),
            ParserErrorKind::ExpectedIdentifier { found } => {
                format!("Expected identifier, found: {found}")
            }
            ParserErrorKind::InvalidAssignmentTarget => {
                "Invalid assignment target".to_string()
            }
            ParserErrorKind::ModuleNotTopLevel => {
                "'module' blocks are only allowed at the top level of a file".to_string()
            }
            ParserErrorKind::Lexical(msg) => msg.clone(),
            ParserErrorKind::Custom(msg) => msg.clone(),
        };

        write!(f, "[{location_prefix}] SyntaxError: {message}")
    }
}

impl std::error::Error for ParserError {}

/// Parse result type
pub type ParseResult<T> = Result<T, ParserError>;

/// Helper: build an unexpected-token error kind
pub fn unexpected_token(
    found: impl Into<String>,
    expected: Vec<impl Into<String>>,
) -> ParserErrorKind {
    ParserErrorKind::UnexpectedToken {
        found: found.into(),
        expected: expected.into_iter().map(Into::into).collect(),
    }
}
