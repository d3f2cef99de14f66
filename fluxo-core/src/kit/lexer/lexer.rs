//! Lexer driver
//!
//! Owns the character stream and the Fluxo scanner. The producer feeds
//! source bytes (`feed`) and marks end of input (`terminate`); the parser
//! pulls tokens with `next_token`. The first lexical error stops the token
//! stream and is held for the parser to surface as a syntax error.

use super::fluxo::FluxoScanner;
use super::scanner::{LexError, ScanResult, Scanner, Token};
use super::stream::{CharStream, StreamError};
use crate::compiler::lexer::token_kind::FluxoTokenKind;
use fluxo_log::{debug, trace, Logger};
use std::sync::Arc;

/// Streaming lexer for Fluxo source
pub struct Lexer {
    scanner: FluxoScanner,
    stream: CharStream,
    eof: bool,
    error: Option<LexError>,
    logger: Arc<Logger>,
}

impl Lexer {
    /// Create a new lexer with a noop logger
    pub fn new() -> Self {
        Self::with_logger(Logger::noop())
    }

    /// Create a new lexer with an explicit logger
    pub fn with_logger(logger: Arc<Logger>) -> Self {
        trace!(logger, "Creating new Lexer");
        Self {
            scanner: FluxoScanner::with_logger(logger.clone()),
            stream: CharStream::with_logger(logger.clone()),
            eof: false,
            error: None,
            logger,
        }
    }

    /// Feed source bytes
    pub fn feed(&mut self, data: &[u8]) -> Result<(), StreamError> {
        trace!(self.logger, "Feeding {} bytes", data.len());
        self.stream.feed(data)
    }

    /// Mark end of input
    pub fn terminate(&mut self) -> Result<(), StreamError> {
        trace!(self.logger, "Terminating input");
        self.eof = true;
        self.stream.close()
    }

    /// Pull the next token
    ///
    /// Returns `None` at end of input, when more input is needed, or after
    /// a lexical error; in the error case [`Self::error`] holds the cause.
    pub fn next_token(&mut self) -> Option<Token<FluxoTokenKind>> {
        if self.error.is_some() {
            return None;
        }
        // A partial scan consumes characters; rewind so the token is
        // re-scanned whole once more input has been fed
        let checkpoint = self.stream.checkpoint();
        match self.scanner.next_token(&mut self.stream) {
            ScanResult::Token(token) => {
                debug!(
                    self.logger,
                    "Produced token: kind={:?}, line={}, column={}",
                    token.kind,
                    token.span.start.line,
                    token.span.start.column
                );
                Some(token)
            }
            ScanResult::Incomplete => {
                trace!(self.logger, "Incomplete, need more input");
                self.stream.rewind(checkpoint);
                None
            }
            ScanResult::Eof => {
                trace!(self.logger, "Reached EOF");
                None
            }
            ScanResult::Error(e) => {
                debug!(
                    self.logger,
                    "Lex error at {}:{}: {}", e.position.line, e.position.column, e.message
                );
                self.error = Some(e);
                None
            }
        }
    }

    /// The lexical error that stopped the token stream, if any
    pub fn error(&self) -> Option<&LexError> {
        self.error.as_ref()
    }
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}
