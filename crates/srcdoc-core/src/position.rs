//! Source positions, ranges and locations
//!
//! Everything the pipeline produces is pinned to the source it came
//! from. A [`Position`] is zero-based; `character` counts Unicode code
//! points within the line while `offset` is an absolute byte offset,
//! so the same value works for both editors (line/character) and byte
//! slicing (offset).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::uri::Uri;

/// A point in a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Zero-based line number
    pub line: usize,

    /// Zero-based character offset within the line, in Unicode code points
    pub character: usize,

    /// Absolute byte offset from the start of the document
    pub offset: usize,
}

/// A half-open range `[start, end)` in a source document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Range {
    /// First position covered by the range
    pub start: Position,

    /// First position past the range
    pub end: Position,
}

/// A range inside a specific document
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    /// The document the range refers to
    pub uri: Uri,

    /// The range within that document
    pub range: Range,
}

impl Position {
    /// Create a position from its three coordinates
    pub fn new(line: usize, character: usize, offset: usize) -> Self {
        Self {
            line,
            character,
            offset,
        }
    }
}

impl Range {
    /// Create a range from two positions
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Check if the range covers no bytes
    pub fn is_empty(&self) -> bool {
        self.start.offset == self.end.offset
    }

    /// Check if `pos` falls inside the range
    ///
    /// Comparison uses line/character so that positions coming from an
    /// editor, which carry no byte offset, still match.
    pub fn contains(&self, pos: Position) -> bool {
        let p = (pos.line, pos.character);
        p >= (self.start.line, self.start.character) && p < (self.end.line, self.end.character)
    }

    /// Check if `other` is entirely inside this range
    pub fn encloses(&self, other: &Range) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }
}

impl Location {
    /// Create a location from a URI and a range
    pub fn new(uri: Uri, range: Range) -> Self {
        Self { uri, range }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.character)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.uri, self.range.start)
    }
}
