//! Source locations.
//!
//! A [`Location`] is nothing more than `(source, offset, end_offset)`. Line
//! and column are never stored; they are derived on demand by scanning the
//! text of the source with [`SourceText::line_col`].

use std::fmt;
use std::sync::Arc;

/// A byte span inside a named source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    /// Origin of the source text (file path or URL).
    pub source: Arc<str>,
    /// Byte offset of the first character.
    pub offset: u32,
    /// Byte offset one past the last character.
    pub end_offset: u32,
}

impl Location {
    pub fn new(source: impl Into<Arc<str>>, offset: u32, end_offset: u32) -> Self {
        Self {
            source: source.into(),
            offset,
            end_offset,
        }
    }

    /// Length of the span in bytes (0 for inverted spans).
    #[must_use]
    pub fn len(&self) -> u32 {
        self.end_offset.saturating_sub(self.offset)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Start `(line, column)` of this span, if `text` is the text it points into.
    #[must_use]
    pub fn start(&self, text: &SourceText) -> Option<(u32, u32)> {
        (*self.source == *text.origin).then(|| text.line_col(self.offset))
    }

    /// End `(line, column)` of this span, if `text` is the text it points into.
    #[must_use]
    pub fn end(&self, text: &SourceText) -> Option<(u32, u32)> {
        (*self.source == *text.origin).then(|| text.line_col(self.end_offset))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}..{}", self.source, self.offset, self.end_offset)
    }
}

/// The text of one source, used to derive line and column numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText {
    pub origin: Arc<str>,
    pub text: String,
}

impl SourceText {
    pub fn new(origin: impl Into<Arc<str>>, text: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            text: text.into(),
        }
    }

    /// Converts a byte offset into a 1-based `(line, column)` pair.
    ///
    /// Columns count characters, not bytes. Offsets past the end of the text
    /// resolve to the position just after the last character.
    #[must_use]
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let offset = offset as usize;
        let mut line = 1u32;
        let mut col = 1u32;
        for (idx, ch) in self.text.char_indices() {
            if idx >= offset {
                break;
            }
            if ch == '\n' {
                line += 1;
                col = 1;
            } else {
                col += 1;
            }
        }
        (line, col)
    }

    /// Builds a location for `start..end` within this source.
    #[must_use]
    pub fn at(&self, start: u32, end: u32) -> Location {
        Location {
            source: Arc::clone(&self.origin),
            offset: start,
            end_offset: end,
        }
    }
}
