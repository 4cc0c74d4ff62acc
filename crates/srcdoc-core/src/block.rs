//! Extracted documentation blocks

use serde::{Deserialize, Serialize};

use crate::position::Location;

/// A documentation-comment payload lifted out of a source file
///
/// `data` keeps the byte layout of the original region: comment
/// delimiters are blanked to spaces rather than spliced out, so a
/// position computed inside the payload, added to `location.range.
/// start`, lands on the exact file position. Line breaks are preserved
/// for the same reason.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Block {
    /// Where the block came from
    pub location: Location,

    /// The payload bytes, delimiters blanked
    pub data: Vec<u8>,
}

impl Block {
    /// Create a block from its location and payload
    pub fn new(location: Location, data: Vec<u8>) -> Self {
        Self { location, data }
    }

    /// Payload interpreted as UTF-8, lossily
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.data)
    }
}
