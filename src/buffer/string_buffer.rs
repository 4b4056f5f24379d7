use std::fmt;
use std::ops::Range;

use super::{Selection, TextBuffer};
use crate::error::BufferError;

/// In-memory text buffer indexed by character.
///
/// Stores the document as a `Vec<char>` so every position the core works
/// with is an O(1) index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringBuffer {
    chars: Vec<char>,
    selection: Selection,
}

impl StringBuffer {
    /// Create a buffer holding `text` with the caret at the end
    pub fn new(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let end = chars.len();
        Self {
            chars,
            selection: Selection::caret(end),
        }
    }

    /// Create a buffer holding `text` with the caret at `cursor`
    pub fn with_cursor(text: &str, cursor: usize) -> Self {
        let mut buffer = Self::new(text);
        buffer.set_selection(Selection::caret(cursor));
        buffer
    }

    /// Type `text` over the current selection, the way a keystroke or paste
    /// would.
    pub fn insert_at_selection(&mut self, text: &str) {
        let range = self.selection.range();
        // The selection is always clamped, so this cannot fail.
        let _ = self.replace(range, text);
    }

    /// Number of characters in the document
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Check if the document is empty
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Borrow the raw characters
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), BufferError> {
        if range.start > range.end {
            return Err(BufferError::InvertedRange {
                start: range.start,
                end: range.end,
            });
        }
        if range.end > self.chars.len() {
            return Err(BufferError::RangeOutOfBounds {
                start: range.start,
                end: range.end,
                len: self.chars.len(),
            });
        }
        Ok(())
    }
}

impl TextBuffer for StringBuffer {
    fn text(&self) -> String {
        self.chars.iter().collect()
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        let len = self.chars.len();
        let start = selection.start.min(len);
        let end = selection.end.clamp(start, len);
        self.selection = Selection::new(start, end);
    }

    fn replace(&mut self, range: Range<usize>, text: &str) -> Result<(), BufferError> {
        self.check_range(&range)?;
        let inserted: Vec<char> = text.chars().collect();
        let caret = range.start + inserted.len();
        self.chars.splice(range, inserted);
        self.selection = Selection::caret(caret);
        Ok(())
    }

    fn end_of_document(&self) -> usize {
        self.chars.len()
    }

    fn text_in(&self, range: Range<usize>) -> Option<String> {
        self.check_range(&range).ok()?;
        Some(self.chars[range].iter().collect())
    }
}

impl fmt::Display for StringBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.chars {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_places_caret_at_end() {
        let buffer = StringBuffer::new("hello");
        assert_eq!(buffer.selection(), Selection::caret(5));
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn test_replace_moves_caret_after_insert() {
        let mut buffer = StringBuffer::new("hello world");
        buffer.replace(6..11, "there").unwrap();
        assert_eq!(buffer.text(), "hello there");
        assert_eq!(buffer.selection(), Selection::caret(11));

        buffer.replace(0..5, "").unwrap();
        assert_eq!(buffer.text(), " there");
        assert_eq!(buffer.selection(), Selection::caret(0));
    }

    #[test]
    fn test_replace_rejects_bad_ranges() {
        let mut buffer = StringBuffer::new("abc");
        assert_eq!(
            buffer.replace(2..9, "x"),
            Err(BufferError::RangeOutOfBounds {
                start: 2,
                end: 9,
                len: 3
            })
        );
        #[allow(clippy::reversed_empty_ranges)]
        let inverted = buffer.replace(2..1, "x");
        assert_eq!(inverted, Err(BufferError::InvertedRange { start: 2, end: 1 }));
        assert_eq!(buffer.text(), "abc");
    }

    #[test]
    fn test_set_selection_clamps() {
        let mut buffer = StringBuffer::new("abc");
        buffer.set_selection(Selection::new(2, 40));
        assert_eq!(buffer.selection(), Selection::new(2, 3));
        buffer.set_selection(Selection::caret(10));
        assert_eq!(buffer.selection(), Selection::caret(3));
    }

    #[test]
    fn test_insert_and_delete_backward() {
        let mut buffer = StringBuffer::with_cursor("ac", 1);
        buffer.insert_at_selection("b");
        assert_eq!(buffer.text(), "abc");
        assert_eq!(buffer.selection(), Selection::caret(2));

        buffer.delete_backward().unwrap();
        assert_eq!(buffer.text(), "ac");

        buffer.set_selection(Selection::caret(0));
        assert_eq!(buffer.delete_backward(), Err(BufferError::AtDocumentStart));
    }

    #[test]
    fn test_delete_backward_removes_selection() {
        let mut buffer = StringBuffer::new("abcdef");
        buffer.set_selection(Selection::new(1, 4));
        buffer.delete_backward().unwrap();
        assert_eq!(buffer.text(), "aef");
        assert_eq!(buffer.selection(), Selection::caret(1));
    }

    #[test]
    fn test_multibyte_characters() {
        let mut buffer = StringBuffer::new("naïve");
        assert_eq!(buffer.len(), 5);
        buffer.replace(2..3, "i").unwrap();
        assert_eq!(buffer.to_string(), "naive");
    }
}
