//! Interactive terminal host
//!
//! A full-screen editor in raw mode that exercises the autocompletion engine
//! by hand. Keys:
//!
//! - Printable characters, Enter and Backspace edit the text
//! - Left / Right move the caret, Shift extends the selection
//! - Up / Down choose a suggestion, Tab picks it
//! - Esc or Ctrl-C quits
//!
//! Keys are read on a dedicated thread and forwarded over a channel so the
//! event loop can wait on keys and deferred lookups at the same time.

mod render;

use std::io::{self, Write, stdout};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, style::Print};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::buffer::TextBuffer;
use crate::complete::{LookupDispatcher, LookupResult, Reaction};
use crate::editor::Editor;
use crate::error::Result;

pub use render::{Frame, Renderer};

/// User intent decoded from a key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Insert(char),
    Backspace,
    Left,
    Right,
    ExtendLeft,
    ExtendRight,
    Up,
    Down,
    Pick,
    Quit,
}

impl Action {
    /// Decode a key press; `None` for keys the host does not use
    pub fn from_key(key: KeyEvent) -> Option<Self> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let action = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            KeyCode::Char(c) => Action::Insert(c),
            KeyCode::Enter => Action::Insert('\n'),
            KeyCode::Backspace => Action::Backspace,
            KeyCode::Left if key.modifiers.contains(KeyModifiers::SHIFT) => Action::ExtendLeft,
            KeyCode::Right if key.modifiers.contains(KeyModifiers::SHIFT) => Action::ExtendRight,
            KeyCode::Left => Action::Left,
            KeyCode::Right => Action::Right,
            KeyCode::Up => Action::Up,
            KeyCode::Down => Action::Down,
            KeyCode::Tab => Action::Pick,
            KeyCode::Esc => Action::Quit,
            _ => return None,
        };
        Some(action)
    }
}

/// Restores the terminal when dropped
struct RawModeGuard;

impl RawModeGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), LeaveAlternateScreen, cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}

/// Terminal front-end for an [`Editor`]
pub struct TerminalHost {
    editor: Editor,
    renderer: Renderer,
    chosen: usize,
    lookups: Option<(LookupDispatcher, mpsc::UnboundedReceiver<LookupResult>)>,
}

impl TerminalHost {
    /// Create a host
    ///
    /// # Arguments
    /// * `editor` - Editor wired to the engine
    /// * `color` - Whether to style output with ANSI colors
    pub fn new(editor: Editor, color: bool) -> Self {
        Self {
            editor,
            renderer: Renderer::new(color),
            chosen: 0,
            lookups: None,
        }
    }

    /// Resolve deferred queries through `dispatcher`
    pub fn with_dispatcher(
        mut self,
        dispatcher: LookupDispatcher,
        results: mpsc::UnboundedReceiver<LookupResult>,
    ) -> Self {
        self.lookups = Some((dispatcher, results));
        self
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Run until the user quits
    ///
    /// # Returns
    /// * `Result<Editor>` - The editor in its final state
    pub async fn run(mut self) -> Result<Editor> {
        let guard = RawModeGuard::enter()?;
        let (key_tx, mut keys) = mpsc::unbounded_channel();
        spawn_key_reader(key_tx);

        let (mut dispatcher, mut results) = match self.lookups.take() {
            Some((dispatcher, results)) => (Some(dispatcher), Some(results)),
            None => (None, None),
        };

        self.draw()?;
        loop {
            tokio::select! {
                key = keys.recv() => match key {
                    None => break,
                    Some(Event::Key(key)) => {
                        if let Some(action) = Action::from_key(key) {
                            if !self.apply(action) {
                                break;
                            }
                            self.dispatch_pending(dispatcher.as_mut());
                        }
                    }
                    // Resizes and the like only need a redraw
                    Some(_) => {}
                },
                Some(done) = next_result(&mut results) => {
                    let applied = self.editor.engine_mut().deliver(&done.ticket, done.result);
                    debug!("Lookup #{} applied: {}", done.ticket.generation, applied);
                }
            }
            self.draw()?;
        }

        drop(keys);
        drop(guard);
        Ok(self.editor)
    }

    /// Apply one action to the editor
    ///
    /// # Returns
    /// * `bool` - `false` once the user asked to quit
    pub fn apply(&mut self, action: Action) -> bool {
        let reaction = match action {
            Action::Quit => return false,
            Action::Insert(c) => self.editor.insert_char(c),
            Action::Backspace => self.editor.backspace(),
            Action::Left => self.editor.move_left(),
            Action::Right => self.editor.move_right(),
            Action::ExtendLeft => self.editor.extend_left(),
            Action::ExtendRight => self.editor.extend_right(),
            Action::Up => {
                self.chosen = self.chosen.saturating_sub(1);
                return true;
            }
            Action::Down => {
                let rows = self.editor.engine().suggestions().row_count();
                if self.chosen + 1 < rows {
                    self.chosen += 1;
                }
                return true;
            }
            Action::Pick => self.editor.select_row(self.chosen),
        };

        if !matches!(reaction, Reaction::Ignored | Reaction::Snapped) {
            self.chosen = 0;
        }
        true
    }

    fn dispatch_pending(&mut self, dispatcher: Option<&mut LookupDispatcher>) {
        if let Some(dispatcher) = dispatcher
            && let Some(ticket) = self.editor.engine_mut().take_query()
        {
            dispatcher.dispatch(ticket);
        }
    }

    fn draw(&self) -> io::Result<()> {
        let chars = self.editor.buffer().chars();
        let frame = self.renderer.frame(
            chars,
            self.editor.buffer().selection().start,
            &self.editor.highlights(),
            self.editor.engine().suggestions(),
            self.chosen,
        );

        let mut out = stdout();
        queue!(
            out,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::All),
            Print("autobox | Tab: pick  Up/Down: choose  Esc: quit\r\n\r\n")
        )?;
        for line in &frame.text {
            queue!(out, Print(line), Print("\r\n"))?;
        }
        queue!(out, Print("\r\n"))?;
        for row in &frame.rows {
            queue!(out, Print(row), Print("\r\n"))?;
        }

        let (column, line) = frame.cursor;
        queue!(out, cursor::MoveTo(column, line.saturating_add(2)))?;
        out.flush()
    }
}

/// Forward terminal events until the receiving side goes away
fn spawn_key_reader(tx: mpsc::UnboundedSender<Event>) {
    thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(Duration::from_millis(100)) {
                Ok(false) => {}
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if tx.send(ev).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        warn!("Failed to read terminal event: {}", e);
                        break;
                    }
                },
                Err(e) => {
                    warn!("Failed to poll terminal: {}", e);
                    break;
                }
            }
        }
    });
}

async fn next_result(
    results: &mut Option<mpsc::UnboundedReceiver<LookupResult>>,
) -> Option<LookupResult> {
    match results {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complete::{Autocompleter, MemoryCandidateProvider};
    use std::sync::Arc;

    fn create_test_host() -> TerminalHost {
        let provider = Arc::new(MemoryCandidateProvider::with_samples());
        TerminalHost::new(Editor::new(Autocompleter::new(provider)), false)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_key_mapping() {
        assert_eq!(Action::from_key(key(KeyCode::Char('a'))), Some(Action::Insert('a')));
        assert_eq!(Action::from_key(key(KeyCode::Enter)), Some(Action::Insert('\n')));
        assert_eq!(Action::from_key(key(KeyCode::Tab)), Some(Action::Pick));
        assert_eq!(Action::from_key(key(KeyCode::Esc)), Some(Action::Quit));
        assert_eq!(
            Action::from_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Action::Quit)
        );
        assert_eq!(
            Action::from_key(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT)),
            Some(Action::ExtendLeft)
        );
        assert_eq!(Action::from_key(key(KeyCode::F(1))), None);
    }

    #[test]
    fn test_choose_and_pick_row() {
        let mut host = create_test_host();
        for c in "#id".chars() {
            assert!(host.apply(Action::Insert(c)));
        }

        host.apply(Action::Down);
        host.apply(Action::Down);
        assert_eq!(host.chosen, 1);
        host.apply(Action::Up);
        host.apply(Action::Up);
        assert_eq!(host.chosen, 0);

        host.apply(Action::Down);
        host.apply(Action::Pick);
        assert_eq!(host.editor().text(), "#idle");
        assert_eq!(host.chosen, 0);
    }

    #[test]
    fn test_trigger_typed_over_selection() {
        let mut host = create_test_host();
        for c in "hello x".chars() {
            host.apply(Action::Insert(c));
        }
        host.apply(Action::ExtendLeft);
        host.apply(Action::Insert('#'));
        assert_eq!(host.editor().plain_text(), "hello #");
        assert!(host.editor().engine().session().is_some());
    }

    #[test]
    fn test_quit() {
        let mut host = create_test_host();
        assert!(!host.apply(Action::Quit));
    }
}
