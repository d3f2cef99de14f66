//! Source position types

use std::fmt;

/// A position in source text, 1-based line and column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    pub line: usize,
    pub column: usize,
    /// Byte offset from the start of the input
    pub offset: usize,
}

impl SourcePosition {
    /// The position of the first character
    pub fn start() -> Self {
        Self {
            line: 1,
            column: 1,
            offset: 0,
        }
    }

    /// Advance past one character
    pub fn advance(&mut self, c: char) {
        self.offset += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
    }
}

impl Default for SourcePosition {
    fn default() -> Self {
        Self::start()
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A contiguous source range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceSpan {
    pub start: SourcePosition,
    pub end: SourcePosition,
}

impl SourceSpan {
    /// Span covering [start, end]
    pub fn range(start: SourcePosition, end: SourcePosition) -> Self {
        Self { start, end }
    }

    /// Zero-width span at one position
    pub fn at(position: SourcePosition) -> Self {
        Self {
            start: position,
            end: position,
        }
    }

    /// Smallest span covering both inputs
    pub fn merge(&self, other: &SourceSpan) -> Self {
        Self {
            start: self.start,
            end: other.end,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_position() {
        let pos = SourcePosition::start();
        assert_eq!(pos.line, 1);
        assert_eq!(pos.column, 1);
        assert_eq!(pos.offset, 0);
    }

    #[test]
    fn test_advance_tracks_lines_and_columns() {
        let mut pos = SourcePosition::start();
        pos.advance('a');
        assert_eq!((pos.line, pos.column), (1, 2));
        pos.advance('\n');
        assert_eq!((pos.line, pos.column), (2, 1));
        pos.advance('b');
        assert_eq!((pos.line, pos.column), (2, 2));
    }

    #[test]
    fn test_advance_counts_multibyte_offsets() {
        let mut pos = SourcePosition::start();
        pos.advance('é');
        assert_eq!(pos.offset, 2);
        assert_eq!(pos.column, 2);
    }

    #[test]
    fn test_span_merge() {
        let mut end = SourcePosition::start();
        end.advance('a');
        let a = SourceSpan::at(SourcePosition::start());
        let b = SourceSpan::at(end);
        let merged = a.merge(&b);
        assert_eq!(merged.start, a.start);
        assert_eq!(merged.end, b.end);
    }
}
