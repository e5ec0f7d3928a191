//! Byte-offset positions of tree nodes and diagnostics.

use serde::{Deserialize, Serialize};

/// Index of a file in the [`SourceCache`](crate::SourceCache).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub u32);

impl FileId {
    /// Positions of synthesized nodes and of modules loaded without source.
    pub const DUMMY: FileId = FileId(u32::MAX);
}

/// Half-open byte range `start..end` in one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub file_id: FileId,
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const DUMMY: Span = Span {
        file_id: FileId::DUMMY,
        start: 0,
        end: 0,
    };

    pub fn new(file_id: FileId, start: u32, end: u32) -> Self {
        Self { file_id, start, end }
    }

    pub fn is_dummy(&self) -> bool {
        self.file_id == FileId::DUMMY
    }

    /// Zero-width span at the start of this one.
    /// Synthesized code inserted before a node is positioned here.
    pub fn left_edge(self) -> Span {
        Span { end: self.start, ..self }
    }

    /// Zero-width span at the end of this one.
    pub fn right_edge(self) -> Span {
        Span { start: self.end, ..self }
    }

    /// Width in bytes; what the terminal emitter underlines.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::DUMMY
    }
}

/// `file:line:column`, 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A second location a diagnostic points at, such as another declaration of
/// the same captured variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_are_zero_width() {
        let span = Span::new(FileId(0), 4, 9);
        assert_eq!(span.len(), 5);
        assert_eq!(span.left_edge(), Span::new(FileId(0), 4, 4));
        assert_eq!(span.right_edge(), Span::new(FileId(0), 9, 9));
        assert!(span.left_edge().is_empty());
    }

    #[test]
    fn test_default_is_dummy() {
        assert!(Span::default().is_dummy());
        assert!(!Span::new(FileId(0), 0, 0).is_dummy());
    }
}
