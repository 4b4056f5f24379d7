//! Sentinel tracker
//!
//! An in-progress autocompletion is delimited on the right by a single
//! invisible sentinel character. Because the sentinel travels with the text,
//! the in-progress span can be recovered after arbitrary edits by searching
//! for it instead of tracking offsets.

use tracing::trace;

use super::category::Triggers;
use crate::buffer::{Selection, TextBuffer};
use crate::error::BufferError;

/// Zero-width no-break space
pub const SENTINEL: char = '\u{feff}';

/// Insert the sentinel over the current selection and park the caret right
/// before it.
///
/// # Returns
/// * `Result<usize, BufferError>` - Offset of the inserted sentinel
pub fn insert(buffer: &mut dyn TextBuffer) -> Result<usize, BufferError> {
    let selection = buffer.selection();
    buffer.replace(selection.range(), &SENTINEL.to_string())?;
    buffer.set_selection(Selection::caret(selection.start));
    trace!(offset = selection.start, "sentinel inserted");
    Ok(selection.start)
}

/// Locate the sentinel of the autocompletion the caret is currently in.
///
/// Searches the text after the caret for the sentinel. If the text between
/// the caret and the sentinel already holds a complete trigger symbol, the
/// sentinel belongs to some other autocompletion further right and `None` is
/// returned.
///
/// # Returns
/// * `Option<usize>` - Absolute offset of the sentinel
pub fn find_active(buffer: &dyn TextBuffer, triggers: &Triggers) -> Option<usize> {
    let cursor = buffer.selection().end;
    let after = buffer.text_in(cursor..buffer.end_of_document())?;
    let after: Vec<char> = after.chars().collect();
    let distance = after.iter().position(|c| *c == SENTINEL)?;

    if triggers.contains_any_symbol(&after[..distance]) {
        trace!(cursor, distance, "sentinel belongs to another autocompletion");
        return None;
    }
    Some(cursor + distance)
}

/// Locate a sentinel anywhere in the document, regardless of the caret
pub fn locate(buffer: &dyn TextBuffer) -> Option<usize> {
    buffer.text().chars().position(|c| c == SENTINEL)
}

/// Remove the sentinel at `offset`, keeping the selection where it was.
///
/// Selection endpoints after the sentinel shift left by one.
pub fn remove(buffer: &mut dyn TextBuffer, offset: usize) -> Result<(), BufferError> {
    let selection = buffer.selection();
    buffer.replace(offset..offset + 1, "")?;
    let shift = |pos: usize| if pos > offset { pos - 1 } else { pos };
    buffer.set_selection(Selection::new(shift(selection.start), shift(selection.end)));
    trace!(offset, "sentinel removed");
    Ok(())
}

/// Check whether the character at `offset` is the sentinel
pub fn is_at(buffer: &dyn TextBuffer, offset: usize) -> bool {
    buffer
        .text_in(offset..offset + 1)
        .is_some_and(|s| s.starts_with(SENTINEL))
}

/// Check whether the caret sits immediately after a sentinel
pub fn is_right_before_caret(buffer: &dyn TextBuffer) -> bool {
    buffer.char_before(buffer.selection().start) == Some(SENTINEL)
}

/// Text with every sentinel stripped
pub fn visible_text(text: &str) -> String {
    text.chars().filter(|c| *c != SENTINEL).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::StringBuffer;

    fn with_sentinel(text: &str) -> String {
        text.replace('|', &SENTINEL.to_string())
    }

    #[test]
    fn test_insert_parks_caret_before_sentinel() {
        let mut buffer = StringBuffer::new("hello #");
        let offset = insert(&mut buffer).unwrap();
        assert_eq!(offset, 7);
        assert_eq!(buffer.text(), with_sentinel("hello #|"));
        assert_eq!(buffer.selection(), Selection::caret(7));
    }

    #[test]
    fn test_find_active_from_caret() {
        let buffer = StringBuffer::with_cursor(&with_sentinel("hi #wo|"), 6);
        assert_eq!(find_active(&buffer, &Triggers::default()), Some(6));

        // Caret inside the token, sentinel two characters ahead
        let buffer = StringBuffer::with_cursor(&with_sentinel("hi #wo|"), 4);
        assert_eq!(find_active(&buffer, &Triggers::default()), Some(6));
    }

    #[test]
    fn test_find_active_without_sentinel() {
        let buffer = StringBuffer::new("hi #wo");
        assert_eq!(find_active(&buffer, &Triggers::default()), None);
    }

    #[test]
    fn test_find_active_ignores_other_autocompletion() {
        // Caret at the start, an unrelated @mention session further right
        let buffer = StringBuffer::with_cursor(&with_sentinel("ab @jo|"), 1);
        assert_eq!(find_active(&buffer, &Triggers::default()), None);

        let buffer = StringBuffer::with_cursor(&with_sentinel("ab ~>doc|"), 0);
        assert_eq!(find_active(&buffer, &Triggers::default()), None);
        assert_eq!(locate(&buffer), Some(8));
    }

    #[test]
    fn test_remove_keeps_caret() {
        let mut buffer = StringBuffer::with_cursor(&with_sentinel("#ab|cd"), 3);
        remove(&mut buffer, 3).unwrap();
        assert_eq!(buffer.text(), "#abcd");
        assert_eq!(buffer.selection(), Selection::caret(3));

        let mut buffer = StringBuffer::with_cursor(&with_sentinel("#a|bc"), 5);
        remove(&mut buffer, 2).unwrap();
        assert_eq!(buffer.selection(), Selection::caret(4));
    }

    #[test]
    fn test_caret_after_sentinel() {
        let buffer = StringBuffer::with_cursor(&with_sentinel("#a|b"), 3);
        assert!(is_right_before_caret(&buffer));
        assert!(is_at(&buffer, 2));
        assert!(!is_at(&buffer, 1));
        let buffer = StringBuffer::with_cursor(&with_sentinel("#a|b"), 2);
        assert!(!is_right_before_caret(&buffer));
    }

    #[test]
    fn test_visible_text() {
        assert_eq!(visible_text(&with_sentinel("#ab|c")), "#abc");
    }
}
