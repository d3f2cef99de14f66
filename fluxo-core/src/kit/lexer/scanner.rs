//! Scanner trait definition
//!
//! The lexer kit separates the character stream from the token grammar:
//! a `Scanner` turns stream characters into tokens for one language.

use super::position::{SourcePosition, SourceSpan};
use super::stream::CharStream;
use fluxo_log::Logger;
use std::sync::Arc;

/// Lexical scanner trait
pub trait Scanner {
    /// Token kind produced by this scanner
    type TokenKind: Clone + PartialEq + std::fmt::Debug;

    /// Create a new scanner
    fn new() -> Self;

    /// Create a scanner with an explicit logger (default: ignore it)
    fn with_logger(logger: Arc<Logger>) -> Self
    where
        Self: Sized,
    {
        drop(logger);
        Self::new()
    }

    /// Scan the next token from the stream
    fn next_token(&mut self, stream: &mut CharStream) -> ScanResult<Token<Self::TokenKind>>;
}

/// One lexed token
#[derive(Debug, Clone, PartialEq)]
pub struct Token<K> {
    pub kind: K,
    pub span: SourceSpan,
    /// Original text (kept only where the parser needs it)
    pub text: Option<String>,
}

impl<K> Token<K> {
    /// Token without stored text
    pub fn new(kind: K, span: SourceSpan) -> Self {
        Self {
            kind,
            span,
            text: None,
        }
    }

    /// Token with stored text
    pub fn with_text(kind: K, span: SourceSpan, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: Some(text.into()),
        }
    }

    /// Start position of the token
    pub fn start(&self) -> SourcePosition {
        self.span.start
    }
}

/// Scan outcome
#[derive(Debug, Clone, PartialEq)]
pub enum ScanResult<T> {
    /// A token was produced
    Token(T),
    /// More input is required (streaming)
    Incomplete,
    /// The stream has ended
    Eof,
    /// Lexical error
    Error(LexError),
}

/// Lexical error
#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub kind: ErrorKind,
    pub position: SourcePosition,
    pub message: String,
}

/// Lexical error kind
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// Unexpected character
    InvalidChar(char),
    /// String literal without a closing quote
    UnterminatedString,
    /// Block comment without a closing `*/`
    UnterminatedComment,
    /// Invalid escape sequence
    InvalidEscape(String),
    /// Malformed number literal
    InvalidNumber(String),
}

/// Whether a character may start an identifier
pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

/// Whether a character may continue an identifier
pub fn is_identifier_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}
