//! Editor harness
//!
//! [`Editor`] plays the part of a native text widget: it owns the text,
//! applies user actions to it and reports every change to the
//! [`Autocompleter`] the way a widget delegate would (a text-change
//! notification followed by a selection-change notification).
//!
//! With echo enabled, edits the engine makes to the buffer are reported back
//! to it as ordinary notifications too, which is what most real widgets do.

use tracing::trace;

use crate::buffer::{Selection, StringBuffer, TextBuffer};
use crate::complete::sentinel::{self, SENTINEL};
use crate::complete::{Autocompleter, Highlights, Reaction};

/// Text widget stand-in wired to an autocompletion engine
pub struct Editor {
    buffer: StringBuffer,
    engine: Autocompleter,
    echo: bool,
    echoes: Vec<Reaction>,
}

impl Editor {
    /// Create an empty editor
    pub fn new(engine: Autocompleter) -> Self {
        Self {
            buffer: StringBuffer::default(),
            engine,
            echo: false,
            echoes: Vec::new(),
        }
    }

    /// Report engine-initiated edits back to the engine
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Type `text` character by character
    ///
    /// # Returns
    /// * `Reaction` - Reaction to the last character
    pub fn type_str(&mut self, text: &str) -> Reaction {
        text.chars()
            .fold(Reaction::Ignored, |_, c| self.insert_char(c))
    }

    /// Type a single character over the selection
    pub fn insert_char(&mut self, c: char) -> Reaction {
        self.buffer.insert_at_selection(&c.to_string());
        self.notify_edit()
    }

    /// Delete the selection or the character before the caret
    pub fn backspace(&mut self) -> Reaction {
        if self.buffer.delete_backward().is_err() {
            return Reaction::Ignored;
        }
        self.notify_edit()
    }

    /// Move the caret one visible character to the left
    pub fn move_left(&mut self) -> Reaction {
        let cursor = self.cursor();
        let step = if self.buffer.char_before(cursor) == Some(SENTINEL) {
            2
        } else {
            1
        };
        self.set_cursor(cursor.saturating_sub(step))
    }

    /// Move the caret one visible character to the right
    pub fn move_right(&mut self) -> Reaction {
        let cursor = self.cursor();
        let step = if sentinel::is_at(&self.buffer, cursor) { 2 } else { 1 };
        self.set_cursor((cursor + step).min(self.buffer.len()))
    }

    /// Place the caret, as a mouse click would
    pub fn set_cursor(&mut self, pos: usize) -> Reaction {
        self.select(pos, pos)
    }

    /// Select `start..end`, as a drag or shift-arrow would
    pub fn select(&mut self, start: usize, end: usize) -> Reaction {
        self.buffer.set_selection(Selection::new(start, end));
        let reaction = self.engine.on_selection_changed(&mut self.buffer);
        self.echo_engine_edit(&reaction);
        reaction
    }

    /// Grow the selection one character to the left
    pub fn extend_left(&mut self) -> Reaction {
        let selection = self.buffer.selection();
        self.select(selection.start.saturating_sub(1), selection.end)
    }

    /// Grow the selection one character to the right
    pub fn extend_right(&mut self) -> Reaction {
        let selection = self.buffer.selection();
        self.select(selection.start, (selection.end + 1).min(self.buffer.len()))
    }

    /// Pick suggestion row `index`
    pub fn select_row(&mut self, index: usize) -> Reaction {
        let reaction = self.engine.select_row(&mut self.buffer, index);
        self.echo_engine_edit(&reaction);
        reaction
    }

    /// Raw text, sentinel included
    pub fn text(&self) -> String {
        self.buffer.text()
    }

    /// Text as the user sees it
    pub fn plain_text(&self) -> String {
        sentinel::visible_text(&self.buffer.text())
    }

    pub fn cursor(&self) -> usize {
        self.buffer.selection().start
    }

    pub fn buffer(&self) -> &StringBuffer {
        &self.buffer
    }

    pub fn engine(&self) -> &Autocompleter {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Autocompleter {
        &mut self.engine
    }

    pub fn highlights(&self) -> Highlights {
        self.engine.highlights(&self.buffer)
    }

    /// Reactions to echoed notifications, oldest first
    pub fn echoes(&self) -> &[Reaction] {
        &self.echoes
    }

    /// Report a user edit: text change first, then the caret move
    fn notify_edit(&mut self) -> Reaction {
        let edited = self.engine.on_text_changed(&mut self.buffer);
        self.echo_engine_edit(&edited);
        let moved = self.engine.on_selection_changed(&mut self.buffer);
        self.echo_engine_edit(&moved);

        match edited {
            Reaction::Ignored | Reaction::Suppressed(_) => moved,
            _ => edited,
        }
    }

    fn echo_engine_edit(&mut self, reaction: &Reaction) {
        if !self.echo {
            return;
        }
        let text_changed = match reaction {
            Reaction::Armed { .. } | Reaction::Committed(_) | Reaction::Cancelled => true,
            Reaction::Snapped => false,
            _ => return,
        };

        if text_changed {
            let echoed = self.engine.on_text_changed(&mut self.buffer);
            trace!("Echoed text change: {:?}", echoed);
            self.echoes.push(echoed);
        }
        let echoed = self.engine.on_selection_changed(&mut self.buffer);
        trace!("Echoed selection change: {:?}", echoed);
        self.echoes.push(echoed);
    }
}
