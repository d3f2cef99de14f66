//! Lexer construction helpers

use crate::kit::lexer::Lexer;
use fluxo_log::Logger;
use std::sync::Arc;

/// Build a lexer with a noop logger
pub fn build_lexer() -> Lexer {
    Lexer::new()
}

/// Build a lexer with an explicit logger
pub fn build_lexer_with_logger(logger: Arc<Logger>) -> Lexer {
    Lexer::with_logger(logger)
}
