//! Frame rendering for the terminal host
//!
//! Turns the editor state into plain strings with ANSI styling, so drawing
//! is a matter of printing lines and placing the cursor.

use nu_ansi_term::{Color, Style};

use crate::complete::sentinel::SENTINEL;
use crate::complete::{Emphasis, Highlights, SuggestionList};

/// One rendered screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Lines of the document
    pub text: Vec<String>,
    /// Suggestion rows under the document
    pub rows: Vec<String>,
    /// Caret as `(column, line)` inside the document
    pub cursor: (u16, u16),
}

/// Styles used to paint a frame
pub struct Renderer {
    highlight: Style,
    matched: Style,
    chosen: Style,
    enabled: bool,
}

impl Renderer {
    /// Create a renderer
    ///
    /// # Arguments
    /// * `enabled` - Whether to emit ANSI styling at all
    pub fn new(enabled: bool) -> Self {
        Self {
            highlight: Style::new().fg(Color::Blue),
            matched: Style::new().bold(),
            chosen: Style::new().reverse(),
            enabled,
        }
    }

    /// Render the document, the suggestion rows and the caret position
    ///
    /// # Arguments
    /// * `chars` - Raw buffer characters, sentinel included
    /// * `cursor` - Caret offset in `chars`
    /// * `highlights` - Spans to paint as autocompletions
    /// * `list` - Current suggestions
    /// * `chosen` - Index of the row Tab would pick
    pub fn frame(
        &self,
        chars: &[char],
        cursor: usize,
        highlights: &Highlights,
        list: &SuggestionList,
        chosen: usize,
    ) -> Frame {
        Frame {
            text: self.text_lines(chars, highlights),
            rows: self.rows(list, chosen),
            cursor: caret_position(chars, cursor),
        }
    }

    fn text_lines(&self, chars: &[char], highlights: &Highlights) -> Vec<String> {
        let mut lines = Vec::new();
        let mut line = String::new();
        let mut run = String::new();
        let mut run_lit = false;

        for (offset, c) in chars.iter().enumerate() {
            if *c == SENTINEL {
                continue;
            }
            if *c == '\n' {
                line.push_str(&self.paint_run(&run, run_lit));
                run.clear();
                lines.push(std::mem::take(&mut line));
                continue;
            }

            let lit = highlights.covers(offset);
            if lit != run_lit && !run.is_empty() {
                line.push_str(&self.paint_run(&run, run_lit));
                run.clear();
            }
            run_lit = lit;
            run.push(*c);
        }
        line.push_str(&self.paint_run(&run, run_lit));
        lines.push(line);
        lines
    }

    fn paint_run(&self, run: &str, lit: bool) -> String {
        if lit && self.enabled && !run.is_empty() {
            self.highlight.paint(run).to_string()
        } else {
            run.to_string()
        }
    }

    fn rows(&self, list: &SuggestionList, chosen: usize) -> Vec<String> {
        list.rows()
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let body: String = item
                    .segments()
                    .into_iter()
                    .map(|(text, emphasis)| match emphasis {
                        Emphasis::Bold if self.enabled => self.matched.paint(text).to_string(),
                        _ => text,
                    })
                    .collect();

                if index != chosen {
                    format!("  {body}")
                } else if self.enabled {
                    format!("{} {body}", self.chosen.paint(">"))
                } else {
                    format!("> {body}")
                }
            })
            .collect()
    }
}

/// Column and line of the caret with sentinels treated as zero-width
fn caret_position(chars: &[char], cursor: usize) -> (u16, u16) {
    let mut column: u16 = 0;
    let mut line: u16 = 0;
    for c in chars.iter().take(cursor) {
        match *c {
            SENTINEL => {}
            '\n' => {
                line = line.saturating_add(1);
                column = 0;
            }
            _ => column = column.saturating_add(1),
        }
    }
    (column, line)
}
