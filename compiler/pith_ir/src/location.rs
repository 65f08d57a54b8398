//! Source locations.
//!
//! The engine only needs line-level precision for traces, so a location is
//! a `(line, column)` pair rather than a byte span.

use std::fmt;

/// Position of an instruction in its source file.
///
/// Lines and columns are 1-based. `Location::DUMMY` (0, 0) marks nodes that
/// were synthesized rather than parsed.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Location {
    pub line: u32,
    pub column: u32,
}

impl Location {
    /// Location for generated nodes.
    pub const DUMMY: Location = Location { line: 0, column: 0 };

    /// Create a new location.
    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Location { line, column }
    }

    /// Check if this location was synthesized.
    #[inline]
    pub const fn is_dummy(&self) -> bool {
        self.line == 0
    }
}

impl fmt::Debug for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}
