//! Text buffer adapter
//!
//! The completion core never owns the text it edits. It reads and mutates the
//! host's text surface through the [`TextBuffer`] trait, which mirrors the
//! handful of operations a native text widget exposes:
//!
//! - Full text and the current selection
//! - Position arithmetic (a position moved by a signed offset)
//! - Substring extraction and range replacement
//! - Backward deletion at the caret
//!
//! All positions are character offsets from the start of the document.
//! [`StringBuffer`] is an in-memory implementation used by the terminal host
//! and the test-suite.

mod string_buffer;

use std::ops::Range;

use crate::error::BufferError;

pub use string_buffer::StringBuffer;

/// A selection inside the buffer, as a half-open character range.
///
/// A collapsed selection (`start == end`) is the caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    /// First selected character
    pub start: usize,
    /// One past the last selected character
    pub end: usize,
}

impl Selection {
    /// Create a selection spanning `start..end`
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a collapsed selection at `pos`
    pub fn caret(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    /// Check whether the selection is a bare caret
    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    /// The selection as a range
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A cheap fingerprint of the buffer state: caret position and length.
///
/// Used to recognise notifications that merely echo an edit the engine made
/// itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferMark {
    /// Caret (selection start)
    pub cursor: usize,
    /// Document length in characters
    pub len: usize,
}

impl BufferMark {
    /// Capture the mark of a buffer
    pub fn capture(buffer: &dyn TextBuffer) -> Self {
        Self {
            cursor: buffer.selection().start,
            len: buffer.end_of_document(),
        }
    }
}

/// Read/write view over a host text surface.
///
/// Implementors supply the primitive operations; position arithmetic and
/// range extraction have default implementations built on them.
pub trait TextBuffer {
    /// Full text of the document
    fn text(&self) -> String;

    /// Current selection
    fn selection(&self) -> Selection;

    /// Move the selection. Positions past the end are clamped.
    fn set_selection(&mut self, selection: Selection);

    /// Replace `range` with `text`, leaving the caret just after the
    /// inserted text.
    fn replace(&mut self, range: Range<usize>, text: &str) -> Result<(), BufferError>;

    /// Document length in characters
    fn end_of_document(&self) -> usize {
        self.text().chars().count()
    }

    /// First position of the document
    fn beginning_of_document(&self) -> usize {
        0
    }

    /// Move `from` by `offset` characters.
    ///
    /// # Returns
    /// * `Option<usize>` - The new position, or `None` when it would leave the
    ///   document
    fn position(&self, from: usize, offset: isize) -> Option<usize> {
        let target = from.checked_add_signed(offset)?;
        if target < self.beginning_of_document() || target > self.end_of_document() {
            return None;
        }
        Some(target)
    }

    /// Text inside `range`, or `None` if the range is not inside the document
    fn text_in(&self, range: Range<usize>) -> Option<String> {
        if range.start > range.end || range.end > self.end_of_document() {
            return None;
        }
        Some(
            self.text()
                .chars()
                .skip(range.start)
                .take(range.end - range.start)
                .collect(),
        )
    }

    /// Character immediately before `pos`
    fn char_before(&self, pos: usize) -> Option<char> {
        let start = self.position(pos, -1)?;
        self.text_in(start..pos)?.chars().next()
    }

    /// Delete the selection, or the character before the caret.
    fn delete_backward(&mut self) -> Result<(), BufferError> {
        let selection = self.selection();
        if !selection.is_caret() {
            return self.replace(selection.range(), "");
        }
        let start = self
            .position(selection.start, -1)
            .ok_or(BufferError::AtDocumentStart)?;
        self.replace(start..selection.start, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_caret() {
        let sel = Selection::caret(4);
        assert!(sel.is_caret());
        assert_eq!(sel.range(), 4..4);
        assert!(!Selection::new(1, 3).is_caret());
    }

    #[test]
    fn test_position_arithmetic() {
        let buffer = StringBuffer::new("hello");
        assert_eq!(buffer.position(5, -1), Some(4));
        assert_eq!(buffer.position(0, -1), None);
        assert_eq!(buffer.position(5, 1), None);
        assert_eq!(buffer.position(2, 3), Some(5));
    }

    #[test]
    fn test_text_in_and_char_before() {
        let buffer = StringBuffer::new("héllo #x");
        assert_eq!(buffer.text_in(1..3).as_deref(), Some("él"));
        assert_eq!(buffer.text_in(3..99), None);
        assert_eq!(buffer.char_before(7), Some('#'));
        assert_eq!(buffer.char_before(0), None);
    }

    #[test]
    fn test_mark_capture() {
        let mut buffer = StringBuffer::new("abc");
        buffer.set_selection(Selection::caret(1));
        assert_eq!(BufferMark::capture(&buffer), BufferMark { cursor: 1, len: 3 });
    }
}
