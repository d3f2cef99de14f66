//! Character stream abstraction
//!
//! Turns a fed byte sequence into a Unicode character stream with
//! position tracking. The producer side feeds bytes incrementally
//! (`feed`) and marks end of input (`close`); the consumer side peeks and
//! advances characters. A peek past the buffered bytes yields
//! `Incomplete` while the stream is open and `Eof` once it is closed, so
//! scanners can run against partial input.

use super::position::SourcePosition;
use fluxo_log::{warn, Logger};
use std::sync::Arc;

/// Character stream error
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StreamError {
    #[error("Stream closed")]
    Closed,
}

/// Streaming read result
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StreamResult<T> {
    /// Read succeeded
    Ok(T),
    /// More input is required
    Incomplete,
    /// The stream has ended
    Eof,
}

/// Saved consumer position, see [`CharStream::checkpoint`]
#[derive(Debug, Clone, Copy)]
pub struct StreamCheckpoint {
    cursor: usize,
    position: SourcePosition,
}

/// Character stream over fed bytes
pub struct CharStream {
    bytes: Vec<u8>,
    /// Byte offset of the next unread character
    cursor: usize,
    position: SourcePosition,
    is_closed: bool,
    logger: Arc<Logger>,
}

impl CharStream {
    /// Create a new empty stream
    pub fn new() -> Self {
        Self::with_logger(Logger::noop())
    }

    /// Create a new empty stream with an explicit logger
    pub fn with_logger(logger: Arc<Logger>) -> Self {
        Self {
            bytes: Vec::new(),
            cursor: 0,
            position: SourcePosition::start(),
            is_closed: false,
            logger,
        }
    }

    /// Current position (of the next unread character)
    pub fn position(&self) -> SourcePosition {
        self.position
    }

    /// Whether the stream has been closed (EOF marked)
    pub fn is_closed(&self) -> bool {
        self.is_closed
    }

    /// Append input bytes (producer interface)
    pub fn feed(&mut self, data: &[u8]) -> Result<(), StreamError> {
        if self.is_closed {
            warn!(
                self.logger,
                "Attempt to feed {} bytes into closed stream",
                data.len()
            );
            return Err(StreamError::Closed);
        }
        self.bytes.extend_from_slice(data);
        Ok(())
    }

    /// Close the stream (mark EOF)
    pub fn close(&mut self) -> Result<(), StreamError> {
        self.is_closed = true;
        Ok(())
    }

    /// Peek the n-th character ahead without consuming
    ///
    /// Invalid UTF-8 sequences decode as U+FFFD so the scanner reports
    /// them as an unexpected character at the right position.
    pub fn try_peek(&self, n: usize) -> StreamResult<char> {
        let mut offset = self.cursor;
        let mut remaining = n;
        loop {
            match self.decode_at(offset) {
                StreamResult::Ok((c, width)) => {
                    if remaining == 0 {
                        return StreamResult::Ok(c);
                    }
                    remaining -= 1;
                    offset += width;
                }
                StreamResult::Incomplete => return StreamResult::Incomplete,
                StreamResult::Eof => return StreamResult::Eof,
            }
        }
    }

    /// Consume and return the next character
    pub fn try_advance(&mut self) -> StreamResult<char> {
        match self.decode_at(self.cursor) {
            StreamResult::Ok((c, width)) => {
                self.cursor += width;
                self.position.advance(c);
                StreamResult::Ok(c)
            }
            StreamResult::Incomplete => StreamResult::Incomplete,
            StreamResult::Eof => StreamResult::Eof,
        }
    }

    /// Capture the consumer position so a partial scan can be retried
    /// after more input arrives
    pub fn checkpoint(&self) -> StreamCheckpoint {
        StreamCheckpoint {
            cursor: self.cursor,
            position: self.position,
        }
    }

    /// Rewind to a previously captured checkpoint
    pub fn rewind(&mut self, checkpoint: StreamCheckpoint) {
        self.cursor = checkpoint.cursor;
        self.position = checkpoint.position;
    }

    /// Decode one character at a byte offset, returning it with its
    /// encoded width
    fn decode_at(&self, offset: usize) -> StreamResult<(char, usize)> {
        if offset >= self.bytes.len() {
            return if self.is_closed {
                StreamResult::Eof
            } else {
                StreamResult::Incomplete
            };
        }

        let tail = &self.bytes[offset..];
        match std::str::from_utf8(tail) {
            Ok(s) => {
                // Safe: non-empty checked above
                let c = s.chars().next().expect("non-empty str");
                StreamResult::Ok((c, c.len_utf8()))
            }
            Err(e) => {
                if e.valid_up_to() > 0 {
                    let s = std::str::from_utf8(&tail[..e.valid_up_to()]).expect("validated prefix");
                    let c = s.chars().next().expect("non-empty str");
                    StreamResult::Ok((c, c.len_utf8()))
                } else if e.error_len().is_none() && !self.is_closed {
                    // A trailing partial sequence may still be completed
                    // by a later feed
                    StreamResult::Incomplete
                } else {
                    // Truly invalid sequence: surface one replacement
                    // character and step past the bad byte
                    StreamResult::Ok((char::REPLACEMENT_CHARACTER, 1))
                }
            }
        }
    }
}

impl Default for CharStream {
    fn default() -> Self {
        Self::new()
    }
}
