//! Fluxo language frontend: token kinds, lexer construction, parser

pub mod lexer;
pub mod parser;

use fluxo_log::Logger;
use std::sync::Arc;

/// Parse one source text into a [`parser::Program`]
pub fn parse_source(
    code: &str,
    logger: Arc<Logger>,
) -> parser::ParseResult<parser::Program> {
    let mut lex = lexer::build_lexer_with_logger(logger.clone());
    // Feeding an open in-memory stream cannot fail
    lex.feed(code.as_bytes()).expect("stream open");
    lex.terminate().expect("stream open");
    parser::Parser::with_logger(lex, logger).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_round_trip() {
        let program = parse_source("local x = 1", Logger::noop()).expect("parse");
        assert_eq!(program.statements.len(), 1);
    }

    #[test]
    fn test_parse_source_reports_errors() {
        assert!(parse_source("local = 5", Logger::noop()).is_err());
    }
}
