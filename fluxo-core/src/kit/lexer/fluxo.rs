//! Fluxo language scanner
//!
//! Complete lexical grammar of Fluxo:
//! - keywords and identifiers
//! - number literals (integer and fractional forms)
//! - string literals with `"` or `'` quotes and escape sequences
//! - single- and multi-character operators, including the `...` rest marker
//! - line (`//`) and block (`/* */`) comments

use super::position::{SourcePosition, SourceSpan};
use super::scanner::{
    is_identifier_continue, is_identifier_start, ErrorKind, LexError, ScanResult, Scanner, Token,
};
use super::stream::{CharStream, StreamResult};
use crate::compiler::lexer::token_kind::{FluxoTokenKind, KEYWORD_TABLE};
use fluxo_log::{trace, Logger};
use std::sync::Arc;

/// Fluxo scanner
pub struct FluxoScanner {
    /// Start position of the token currently being scanned
    token_start: SourcePosition,
    keywords: &'static [(&'static str, FluxoTokenKind)],
    logger: Arc<Logger>,
}

impl Scanner for FluxoScanner {
    type TokenKind = FluxoTokenKind;

    fn new() -> Self {
        Self::with_logger(Logger::noop())
    }

    fn with_logger(logger: Arc<Logger>) -> Self {
        Self {
            token_start: SourcePosition::start(),
            keywords: KEYWORD_TABLE,
            logger,
        }
    }

    fn next_token(&mut self, stream: &mut CharStream) -> ScanResult<Token<FluxoTokenKind>> {
        if let Some(blocker) = self.skip_whitespace_and_comments(stream) {
            return blocker;
        }

        self.token_start = stream.position();

        let c = match stream.try_peek(0) {
            StreamResult::Ok(c) => c,
            StreamResult::Incomplete => return ScanResult::Incomplete,
            StreamResult::Eof => return ScanResult::Eof,
        };

        match c {
            '+' => self.single(stream, FluxoTokenKind::Plus),
            '-' => self.single(stream, FluxoTokenKind::Minus),
            '*' => self.single(stream, FluxoTokenKind::Asterisk),
            '/' => self.single(stream, FluxoTokenKind::Slash),
            '%' => self.single(stream, FluxoTokenKind::Percent),
            '(' => self.single(stream, FluxoTokenKind::LeftParenthesis),
            ')' => self.single(stream, FluxoTokenKind::RightParenthesis),
            '{' => self.single(stream, FluxoTokenKind::LeftCurlyBrace),
            '}' => self.single(stream, FluxoTokenKind::RightCurlyBrace),
            '[' => self.single(stream, FluxoTokenKind::LeftSquareBracket),
            ']' => self.single(stream, FluxoTokenKind::RightSquareBracket),
            ';' => self.single(stream, FluxoTokenKind::Semicolon),
            ',' => self.single(stream, FluxoTokenKind::Comma),

            '.' => self.scan_dot(stream),
            '=' => self.pair(stream, '=', FluxoTokenKind::DoubleEqual, FluxoTokenKind::Equal),
            '!' => self.pair(
                stream,
                '=',
                FluxoTokenKind::ExclamationEqual,
                FluxoTokenKind::Exclamation,
            ),
            '<' => self.pair(
                stream,
                '=',
                FluxoTokenKind::LessThanEqual,
                FluxoTokenKind::LessThan,
            ),
            '>' => self.pair(
                stream,
                '=',
                FluxoTokenKind::GreaterThanEqual,
                FluxoTokenKind::GreaterThan,
            ),
            '&' => self.strict_pair(stream, '&', FluxoTokenKind::AmpAmp),
            '|' => self.strict_pair(stream, '|', FluxoTokenKind::PipePipe),

            '"' | '\'' => self.scan_string(stream, c),
            '0'..='9' => self.scan_number(stream),
            c if is_identifier_start(c) => self.scan_identifier_or_keyword(stream),

            _ => {
                let _ = stream.try_advance();
                ScanResult::Error(LexError {
                    kind: ErrorKind::InvalidChar(c),
                    position: self.token_start,
                    message: format!("Unexpected character '{}'", c),
                })
            }
        }
    }
}

impl FluxoScanner {
    /// Skip whitespace and comments; returns Some when scanning must stop
    /// (incomplete input, EOF mid-comment, or an unterminated block comment)
    fn skip_whitespace_and_comments(
        &mut self,
        stream: &mut CharStream,
    ) -> Option<ScanResult<Token<FluxoTokenKind>>> {
        loop {
            match stream.try_peek(0) {
                StreamResult::Ok(c) if c.is_whitespace() => {
                    let _ = stream.try_advance();
                }
                StreamResult::Ok('/') => match stream.try_peek(1) {
                    StreamResult::Ok('/') => {
                        // Line comment, runs to end of line
                        while let StreamResult::Ok(c) = stream.try_peek(0) {
                            let _ = stream.try_advance();
                            if c == '\n' {
                                break;
                            }
                        }
                    }
                    StreamResult::Ok('*') => {
                        let open = stream.position();
                        let _ = stream.try_advance();
                        let _ = stream.try_advance();
                        if let Some(err) = self.skip_block_comment(stream, open) {
                            return Some(err);
                        }
                    }
                    StreamResult::Incomplete => return Some(ScanResult::Incomplete),
                    // '/' followed by EOF or an ordinary char: division
                    _ => return None,
                },
                StreamResult::Ok(_) => return None,
                StreamResult::Incomplete => return Some(ScanResult::Incomplete),
                StreamResult::Eof => return None,
            }
        }
    }

    fn skip_block_comment(
        &mut self,
        stream: &mut CharStream,
        open: SourcePosition,
    ) -> Option<ScanResult<Token<FluxoTokenKind>>> {
        loop {
            match stream.try_advance() {
                StreamResult::Ok('*') => {
                    if let StreamResult::Ok('/') = stream.try_peek(0) {
                        let _ = stream.try_advance();
                        return None;
                    }
                }
                StreamResult::Ok(_) => {}
                StreamResult::Incomplete => return Some(ScanResult::Incomplete),
                StreamResult::Eof => {
                    return Some(ScanResult::Error(LexError {
                        kind: ErrorKind::UnterminatedComment,
                        position: open,
                        message: "Unterminated block comment".to_string(),
                    }))
                }
            }
        }
    }

    fn single(
        &mut self,
        stream: &mut CharStream,
        kind: FluxoTokenKind,
    ) -> ScanResult<Token<FluxoTokenKind>> {
        let _ = stream.try_advance();
        self.finish(stream, kind)
    }

    /// `first` optionally followed by `second`: `==` vs `=`, `<=` vs `<`
    fn pair(
        &mut self,
        stream: &mut CharStream,
        second: char,
        double: FluxoTokenKind,
        single: FluxoTokenKind,
    ) -> ScanResult<Token<FluxoTokenKind>> {
        let _ = stream.try_advance();
        match stream.try_peek(0) {
            StreamResult::Ok(c) if c == second => {
                let _ = stream.try_advance();
                self.finish(stream, double)
            }
            StreamResult::Incomplete if !stream.is_closed() => ScanResult::Incomplete,
            _ => self.finish(stream, single),
        }
    }

    /// Two-character operator whose first character is not a token on its
    /// own: `&&`, `||`
    fn strict_pair(
        &mut self,
        stream: &mut CharStream,
        second: char,
        kind: FluxoTokenKind,
    ) -> ScanResult<Token<FluxoTokenKind>> {
        let first = match stream.try_advance() {
            StreamResult::Ok(c) => c,
            _ => return ScanResult::Eof,
        };
        match stream.try_peek(0) {
            StreamResult::Ok(c) if c == second => {
                let _ = stream.try_advance();
                self.finish(stream, kind)
            }
            StreamResult::Incomplete if !stream.is_closed() => ScanResult::Incomplete,
            _ => ScanResult::Error(LexError {
                kind: ErrorKind::InvalidChar(first),
                position: self.token_start,
                message: format!("Unexpected character '{}' (did you mean '{0}{0}'?)", first),
            }),
        }
    }

    /// `.` or `...`
    fn scan_dot(&mut self, stream: &mut CharStream) -> ScanResult<Token<FluxoTokenKind>> {
        if let (StreamResult::Ok('.'), StreamResult::Ok('.')) =
            (stream.try_peek(1), stream.try_peek(2))
        {
            let _ = stream.try_advance();
            let _ = stream.try_advance();
            let _ = stream.try_advance();
            return self.finish(stream, FluxoTokenKind::DotDotDot);
        }
        if stream.try_peek(1) == StreamResult::Incomplete && !stream.is_closed() {
            return ScanResult::Incomplete;
        }
        self.single(stream, FluxoTokenKind::Dot)
    }

    fn scan_string(
        &mut self,
        stream: &mut CharStream,
        quote: char,
    ) -> ScanResult<Token<FluxoTokenKind>> {
        let _ = stream.try_advance(); // opening quote
        let mut value = String::new();

        loop {
            match stream.try_advance() {
                StreamResult::Ok(c) if c == quote => {
                    trace!(self.logger, "Scanned string literal ({} chars)", value.len());
                    return self.finish_with_text(stream, FluxoTokenKind::LiteralString, value);
                }
                StreamResult::Ok('\\') => match stream.try_advance() {
                    StreamResult::Ok(esc) => match esc {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        '0' => value.push('\0'),
                        '\\' => value.push('\\'),
                        '"' => value.push('"'),
                        '\'' => value.push('\''),
                        other => {
                            return ScanResult::Error(LexError {
                                kind: ErrorKind::InvalidEscape(format!("\\{}", other)),
                                position: self.token_start,
                                message: format!("Invalid escape sequence '\\{}'", other),
                            })
                        }
                    },
                    StreamResult::Incomplete => return ScanResult::Incomplete,
                    StreamResult::Eof => {
                        return self.unterminated_string();
                    }
                },
                // A raw newline inside a string literal means the closing
                // quote is missing on this line
                StreamResult::Ok('\n') => return self.unterminated_string(),
                StreamResult::Ok(c) => value.push(c),
                StreamResult::Incomplete => return ScanResult::Incomplete,
                StreamResult::Eof => return self.unterminated_string(),
            }
        }
    }

    fn unterminated_string(&self) -> ScanResult<Token<FluxoTokenKind>> {
        ScanResult::Error(LexError {
            kind: ErrorKind::UnterminatedString,
            position: self.token_start,
            message: "Unterminated string literal".to_string(),
        })
    }

    fn scan_number(&mut self, stream: &mut CharStream) -> ScanResult<Token<FluxoTokenKind>> {
        let mut text = String::new();
        let mut seen_dot = false;

        loop {
            match stream.try_peek(0) {
                StreamResult::Ok(c) if c.is_ascii_digit() => {
                    let _ = stream.try_advance();
                    text.push(c);
                }
                StreamResult::Ok('.') if !seen_dot => {
                    // Consume the dot only when a digit follows, so `1.x`
                    // lexes as `1` `.` `x`
                    match stream.try_peek(1) {
                        StreamResult::Ok(d) if d.is_ascii_digit() => {
                            seen_dot = true;
                            let _ = stream.try_advance();
                            text.push('.');
                        }
                        StreamResult::Incomplete if !stream.is_closed() => {
                            return ScanResult::Incomplete
                        }
                        _ => break,
                    }
                }
                StreamResult::Ok(c) if is_identifier_start(c) => {
                    return ScanResult::Error(LexError {
                        kind: ErrorKind::InvalidNumber(format!("{}{}", text, c)),
                        position: self.token_start,
                        message: format!("Invalid number literal '{}{}'", text, c),
                    });
                }
                StreamResult::Incomplete if !stream.is_closed() => return ScanResult::Incomplete,
                _ => break,
            }
        }

        self.finish_with_text(stream, FluxoTokenKind::LiteralNumber, text)
    }

    fn scan_identifier_or_keyword(
        &mut self,
        stream: &mut CharStream,
    ) -> ScanResult<Token<FluxoTokenKind>> {
        let mut text = String::new();
        loop {
            match stream.try_peek(0) {
                StreamResult::Ok(c) if is_identifier_continue(c) => {
                    let _ = stream.try_advance();
                    text.push(c);
                }
                StreamResult::Incomplete if !stream.is_closed() => return ScanResult::Incomplete,
                _ => break,
            }
        }

        let kind = self
            .keywords
            .iter()
            .find(|(word, _)| *word == text)
            .map(|(_, kind)| *kind)
            .unwrap_or(FluxoTokenKind::Identifier);

        self.finish_with_text(stream, kind, text)
    }

    fn finish(
        &self,
        stream: &CharStream,
        kind: FluxoTokenKind,
    ) -> ScanResult<Token<FluxoTokenKind>> {
        ScanResult::Token(Token::new(
            kind,
            SourceSpan::range(self.token_start, stream.position()),
        ))
    }

    fn finish_with_text(
        &self,
        stream: &CharStream,
        kind: FluxoTokenKind,
        text: String,
    ) -> ScanResult<Token<FluxoTokenKind>> {
        ScanResult::Token(Token::with_text(
            kind,
            SourceSpan::range(self.token_start, stream.position()),
            text,
        ))
    }
}
