/// Source location tracking.
///
/// Every token carries a [`Location`] naming the source it came from and
/// the line and column where it started, so errors further down the
/// pipeline can point back at the offending text.
use std::fmt;
use std::sync::Arc;

/// A single position in source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pos {
    /// Line number (1-based).
    pub line: usize,
    /// Column number (1-based, in characters).
    pub column: usize,
}

impl Pos {
    pub const fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }

    /// The very beginning of a source text.
    pub const fn origin() -> Self {
        Self { line: 1, column: 1 }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A position inside a named source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub source: Arc<str>,
    pub pos: Pos,
}

impl Location {
    pub fn new(source: Arc<str>, pos: Pos) -> Self {
        Self { source, pos }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source, self.pos)
    }
}
