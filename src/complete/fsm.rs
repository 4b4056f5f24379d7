//! Completion state machine
//!
//! [`Autocompleter`] is driven entirely by the host: every buffer change and
//! every selection change is reported through [`Autocompleter::on_text_changed`]
//! and [`Autocompleter::on_selection_changed`], and a picked suggestion row
//! through [`Autocompleter::select_row`]. Each call returns a [`Reaction`]
//! describing what the engine did.
//!
//! Lifecycle of one autocompletion:
//!
//! ```text
//! Idle --trigger typed--> TriggerArmed --text typed--> Typing
//! Typing --delimiter / row picked--> Committing --> Idle
//! TriggerArmed/Typing --trigger erased--> Cancelled --> Idle
//! ```
//!
//! The engine edits the buffer itself (inserting and removing the sentinel,
//! replacing tokens). Hosts whose widget reports programmatic edits as
//! ordinary notifications would otherwise feed those edits straight back
//! into the engine, so every engine edit records the buffer mark it left
//! behind and the echo arriving at that mark is swallowed.

use std::sync::Arc;

use tracing::{debug, info, trace, warn};

use super::category::{TriggerCategory, Triggers};
use super::extractor::{self, Extraction, PartialToken, TokenRange};
use super::highlight::{CompletedTokens, Highlights};
use super::lookup::{LookupMode, QueryTicket};
use super::provider::{CandidateProvider, CandidateRecord};
use super::sentinel;
use super::suggestion::SuggestionList;
use crate::buffer::{BufferMark, Selection, TextBuffer};
use crate::error::{BufferError, ProviderError};

/// Default cap on the number of suggestion rows
pub const DEFAULT_MAX_ROWS: usize = 10;

/// Completion states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompletionState {
    /// No autocompletion in progress
    #[default]
    Idle,
    /// Sentinel inserted, nothing typed after the trigger yet
    TriggerArmed,
    /// Partial text present
    Typing,
    /// Token being finalized
    Committing,
    /// Autocompletion region being erased
    Cancelled,
}

/// Kind of host notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Buffer contents changed
    TextChanged,
    /// Selection or caret moved
    SelectionChanged,
}

/// An engine edit whose echo has not arrived yet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingSuppression {
    kind: EventKind,
    mark: BufferMark,
}

/// The autocompletion currently in progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditingSession {
    /// Active category
    pub category: TriggerCategory,
    /// Offset of the sentinel character
    pub sentinel_offset: usize,
    /// Offset of the trigger symbol's leading character
    pub trigger_start_offset: usize,
    /// Span of the token, once something has been typed
    pub highlight_range: Option<TokenRange>,
    /// Last query issued for this session
    pub query: Option<String>,
}

/// What the engine did in response to a notification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reaction {
    /// Nothing to do
    Ignored,
    /// The notification echoed an engine edit and was swallowed
    Suppressed(EventKind),
    /// A trigger was detected and a sentinel inserted
    Armed {
        /// Detected category
        category: TriggerCategory,
        /// Offset of the new sentinel
        sentinel: usize,
    },
    /// The partial text changed; suggestions were refreshed
    Updated {
        /// Active category
        category: TriggerCategory,
        /// Query issued
        query: String,
        /// Token span to highlight
        highlight: TokenRange,
    },
    /// A token was committed; carries the logged string
    Committed(String),
    /// The autocompletion was erased
    Cancelled,
    /// The caret was moved back in front of the sentinel
    Snapped,
}

/// In-editor autocomplete engine
pub struct Autocompleter {
    provider: Arc<dyn CandidateProvider>,
    triggers: Triggers,
    max_rows: usize,
    mode: LookupMode,

    state: CompletionState,
    session: Option<EditingSession>,
    suggestions: SuggestionList,
    completed: CompletedTokens,

    pending: Option<PendingSuppression>,
    /// Text as of the last notification, to tell typing from deletion
    snapshot: Vec<char>,

    generation: u64,
    pending_query: Option<QueryTicket>,
}

impl Autocompleter {
    /// Create an engine with the default trigger symbols
    ///
    /// # Arguments
    /// * `provider` - Candidate provider for fetching suggestions
    pub fn new(provider: Arc<dyn CandidateProvider>) -> Self {
        Self {
            provider,
            triggers: Triggers::default(),
            max_rows: DEFAULT_MAX_ROWS,
            mode: LookupMode::default(),
            state: CompletionState::Idle,
            session: None,
            suggestions: SuggestionList::default(),
            completed: CompletedTokens::new(),
            pending: None,
            snapshot: Vec::new(),
            generation: 0,
            pending_query: None,
        }
    }

    /// Use a custom trigger symbol set
    pub fn with_triggers(mut self, triggers: Triggers) -> Self {
        self.triggers = triggers;
        self
    }

    /// Cap the suggestion list at `max_rows` rows
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Choose how candidates are looked up
    pub fn with_lookup_mode(mut self, mode: LookupMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn state(&self) -> CompletionState {
        self.state
    }

    pub fn session(&self) -> Option<&EditingSession> {
        self.session.as_ref()
    }

    pub fn suggestions(&self) -> &SuggestionList {
        &self.suggestions
    }

    pub fn completed(&self) -> &CompletedTokens {
        &self.completed
    }

    pub fn triggers(&self) -> &Triggers {
        &self.triggers
    }

    pub fn lookup_mode(&self) -> LookupMode {
        self.mode
    }

    /// Handle a buffer-change notification
    pub fn on_text_changed(&mut self, buffer: &mut dyn TextBuffer) -> Reaction {
        let mark = BufferMark::capture(buffer);
        if let Some(reaction) = self.check_suppression(EventKind::TextChanged, mark) {
            self.remember(buffer);
            return reaction;
        }

        let chars: Vec<char> = buffer.text().chars().collect();
        let typed = typed_at_caret(&self.snapshot, &chars, buffer.selection().start);
        let reaction = match self.react_to_text(buffer, typed) {
            Ok(reaction) => reaction,
            Err(e) => {
                debug!("Text change aborted: {}", e);
                Reaction::Ignored
            }
        };
        self.remember(buffer);
        reaction
    }

    /// Handle a selection-change notification.
    ///
    /// A caret placed right after the sentinel is moved back in front of it
    /// so typing keeps landing inside the token.
    pub fn on_selection_changed(&mut self, buffer: &mut dyn TextBuffer) -> Reaction {
        let mark = BufferMark::capture(buffer);
        if let Some(reaction) = self.check_suppression(EventKind::SelectionChanged, mark) {
            return reaction;
        }

        let selection = buffer.selection();
        if !selection.is_caret() || !sentinel::is_right_before_caret(buffer) {
            return Reaction::Ignored;
        }

        let target = selection.start - 1;
        buffer.set_selection(Selection::caret(target));
        trace!("Caret snapped back to {}", target);
        self.suppress(EventKind::SelectionChanged, buffer);
        Reaction::Snapped
    }

    /// Commit suggestion row `index`.
    ///
    /// The token span is re-derived from the live buffer and replaced with
    /// the row's symbol and field, whatever had been typed in it.
    pub fn select_row(&mut self, buffer: &mut dyn TextBuffer, index: usize) -> Reaction {
        let Some(item) = self.suggestions.row(index).cloned() else {
            debug!("No suggestion row {}", index);
            return Reaction::Ignored;
        };

        let Some(sentinel_offset) = sentinel::find_active(buffer, &self.triggers) else {
            debug!("Row selected without an active autocompletion");
            return Reaction::Ignored;
        };
        let chars: Vec<char> = buffer.text().chars().collect();
        let Extraction::Partial(token) = extractor::extract(&chars, sentinel_offset, &self.triggers)
        else {
            debug!("Row selected before any text was typed");
            return Reaction::Ignored;
        };

        self.transition(CompletionState::Committing);
        let span = token.highlight_range();
        let replacement = item.replacement();
        let result = buffer
            .replace(span.as_range(), &replacement)
            .and_then(|()| sentinel::remove(buffer, span.start + replacement.chars().count()));
        if let Err(e) = result {
            debug!("Row selection aborted: {}", e);
            self.transition(CompletionState::Typing);
            return Reaction::Ignored;
        }

        info!("Completed {}", replacement);
        self.completed.push(replacement.clone());
        self.end_session();
        self.suppress(EventKind::TextChanged, buffer);
        self.remember(buffer);
        Reaction::Committed(replacement)
    }

    /// Spans the host should paint: the token being typed plus every
    /// committed token still present in the text
    pub fn highlights(&self, buffer: &dyn TextBuffer) -> Highlights {
        let chars: Vec<char> = buffer.text().chars().collect();
        let active = self
            .session
            .as_ref()
            .filter(|_| self.state == CompletionState::Typing)
            .and_then(|_| sentinel::locate(buffer))
            .and_then(|offset| match extractor::extract(&chars, offset, &self.triggers) {
                Extraction::Partial(token) => Some(token.highlight_range()),
                _ => None,
            });
        Highlights {
            active,
            completed: self.completed.spans_in(&chars),
        }
    }

    /// Take the query waiting to be looked up (deferred mode only)
    pub fn take_query(&mut self) -> Option<QueryTicket> {
        self.pending_query.take()
    }

    /// Feed back the result of a deferred lookup.
    ///
    /// # Returns
    /// * `bool` - Whether the result was applied; results for superseded
    ///   queries or finished sessions are dropped
    pub fn deliver(
        &mut self,
        ticket: &QueryTicket,
        result: Result<Vec<CandidateRecord>, ProviderError>,
    ) -> bool {
        if ticket.generation != self.generation || self.session.is_none() {
            debug!(
                "Discarding stale lookup #{} (current #{})",
                ticket.generation, self.generation
            );
            return false;
        }

        let records = Self::records_or_empty(result);
        let symbol = self.triggers.symbol(ticket.category);
        self.suggestions =
            SuggestionList::project(&symbol, &ticket.query, &records, self.max_rows);
        true
    }

    fn react_to_text(
        &mut self,
        buffer: &mut dyn TextBuffer,
        typed: bool,
    ) -> Result<Reaction, BufferError> {
        let mut cancelled = false;

        if let Some(sentinel_offset) = sentinel::find_active(buffer, &self.triggers) {
            let chars: Vec<char> = buffer.text().chars().collect();
            match extractor::extract(&chars, sentinel_offset, &self.triggers) {
                Extraction::Partial(token) => {
                    return self.on_partial(buffer, sentinel_offset, token, typed);
                }
                Extraction::Empty { .. } | Extraction::None => {
                    self.cancel(buffer, sentinel_offset)?;
                    cancelled = true;
                }
            }
        } else if self.session.is_some() {
            match sentinel::locate(buffer) {
                Some(offset) => self.resync_session(buffer, offset),
                None => {
                    debug!("Sentinel disappeared, dropping session");
                    self.end_session();
                }
            }
        }

        // A trigger typed inside an unresolved session restarts it here
        if typed && let Some(reaction) = self.detect_trigger(buffer)? {
            return Ok(reaction);
        }

        Ok(if cancelled {
            Reaction::Cancelled
        } else {
            Reaction::Ignored
        })
    }

    fn on_partial(
        &mut self,
        buffer: &mut dyn TextBuffer,
        sentinel_offset: usize,
        token: PartialToken,
        typed: bool,
    ) -> Result<Reaction, BufferError> {
        let caret = buffer.selection().start;
        let delimiter = buffer.char_before(caret);

        if typed && delimiter.is_some_and(|c| completes(token.category, c)) {
            return self.commit(buffer, sentinel_offset, &token, caret);
        }

        let highlight = token.highlight_range();
        self.session = Some(EditingSession {
            category: token.category,
            sentinel_offset,
            trigger_start_offset: token.trigger_offset,
            highlight_range: Some(highlight),
            query: Some(token.text.clone()),
        });
        self.transition(CompletionState::Typing);
        self.refresh_suggestions(token.category, &token.text);

        Ok(Reaction::Updated {
            category: token.category,
            query: token.text,
            highlight,
        })
    }

    /// Follow the token after an edit made away from it
    fn resync_session(&mut self, buffer: &dyn TextBuffer, sentinel_offset: usize) {
        let chars: Vec<char> = buffer.text().chars().collect();
        let extraction = extractor::extract(&chars, sentinel_offset, &self.triggers);
        let Some(session) = self.session.as_mut() else {
            return;
        };

        session.sentinel_offset = sentinel_offset;
        if let Some(trigger_offset) = extraction.trigger_offset() {
            session.trigger_start_offset = trigger_offset;
        }
        if let Extraction::Partial(token) = &extraction {
            session.highlight_range = Some(token.highlight_range());
        }
        trace!("Session follows sentinel to {}", sentinel_offset);
    }

    /// Finalize a typed token ended by a completing delimiter
    fn commit(
        &mut self,
        buffer: &mut dyn TextBuffer,
        sentinel_offset: usize,
        token: &PartialToken,
        caret: usize,
    ) -> Result<Reaction, BufferError> {
        // The delimiter is the character just before the caret
        let text_start = token.trigger_offset + self.triggers.symbol_len(token.category);
        let mut value: Vec<char> = token.text.chars().collect();
        match (caret - 1).checked_sub(text_start) {
            Some(index) if index < value.len() => {
                value.remove(index);
            }
            _ => {
                value.pop();
            }
        }

        if value.is_empty() {
            // Delimiter right after the trigger: nothing to commit
            return self.cancel(buffer, sentinel_offset).map(|()| Reaction::Cancelled);
        }

        self.transition(CompletionState::Committing);
        sentinel::remove(buffer, sentinel_offset)?;
        let caret = buffer.selection().start;
        buffer.replace(caret - 1..caret, "")?;

        let committed = format!(
            "{}{}",
            self.triggers.symbol(token.category),
            value.into_iter().collect::<String>()
        );
        info!("Completed {}", committed);
        self.completed.push(committed.clone());
        self.end_session();
        self.suppress(EventKind::TextChanged, buffer);
        Ok(Reaction::Committed(committed))
    }

    /// Erase the autocompletion region by stripping its sentinel
    fn cancel(
        &mut self,
        buffer: &mut dyn TextBuffer,
        sentinel_offset: usize,
    ) -> Result<(), BufferError> {
        self.transition(CompletionState::Cancelled);
        sentinel::remove(buffer, sentinel_offset)?;
        debug!("Autocompletion cancelled");
        self.end_session();
        self.suppress(EventKind::TextChanged, buffer);
        Ok(())
    }

    /// Check the one or two characters in front of the caret for a trigger
    /// symbol and arm a session on a match
    fn detect_trigger(
        &mut self,
        buffer: &mut dyn TextBuffer,
    ) -> Result<Option<Reaction>, BufferError> {
        let caret = buffer.selection().start;
        let symbol_before = |len: isize| {
            let start = buffer.position(caret, -len)?;
            let chars: Vec<char> = buffer.text_in(start..caret)?.chars().collect();
            self.triggers.match_symbol(&chars)
        };
        let Some(category) = symbol_before(2).or_else(|| symbol_before(1)) else {
            return Ok(None);
        };

        // Only one session may own a sentinel
        if let Some(stale) = sentinel::locate(buffer) {
            debug!("Replacing unresolved autocompletion at {}", stale);
            sentinel::remove(buffer, stale)?;
        }

        let offset = sentinel::insert(buffer)?;
        self.session = Some(EditingSession {
            category,
            sentinel_offset: offset,
            trigger_start_offset: offset - self.triggers.symbol_len(category),
            highlight_range: None,
            query: None,
        });
        self.suggestions.clear();
        self.transition(CompletionState::TriggerArmed);
        self.suppress(EventKind::SelectionChanged, buffer);

        Ok(Some(Reaction::Armed {
            category,
            sentinel: offset,
        }))
    }

    fn refresh_suggestions(&mut self, category: TriggerCategory, query: &str) {
        match self.mode {
            LookupMode::Blocking => {
                let records = Self::records_or_empty(self.provider.lookup(category, query));
                let symbol = self.triggers.symbol(category);
                self.suggestions = SuggestionList::project(&symbol, query, &records, self.max_rows);
                trace!("{} suggestions for {:?}", self.suggestions.row_count(), query);
            }
            LookupMode::Deferred => {
                self.generation += 1;
                self.pending_query = Some(QueryTicket {
                    generation: self.generation,
                    category,
                    query: query.to_string(),
                });
                self.suggestions.clear();
            }
        }
    }

    fn records_or_empty(
        result: Result<Vec<CandidateRecord>, ProviderError>,
    ) -> Vec<CandidateRecord> {
        result.unwrap_or_else(|e| {
            warn!("Candidate lookup failed: {}", e);
            Vec::new()
        })
    }

    fn remember(&mut self, buffer: &dyn TextBuffer) {
        self.snapshot = buffer.text().chars().collect();
    }

    fn end_session(&mut self) {
        self.session = None;
        self.suggestions.clear();
        self.generation += 1;
        self.pending_query = None;
        self.transition(CompletionState::Idle);
    }

    fn transition(&mut self, next: CompletionState) {
        if self.state != next {
            trace!("{:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    fn suppress(&mut self, kind: EventKind, buffer: &dyn TextBuffer) {
        self.pending = Some(PendingSuppression {
            kind,
            mark: BufferMark::capture(buffer),
        });
    }

    /// Swallow echoes of the engine's own edits.
    ///
    /// An event at a different mark means the user acted in between; the
    /// suppression is then stale and dropped.
    fn check_suppression(&mut self, kind: EventKind, mark: BufferMark) -> Option<Reaction> {
        let pending = self.pending?;
        if pending.mark != mark {
            self.pending = None;
            return None;
        }
        if pending.kind == kind {
            self.pending = None;
        }
        trace!("Suppressed {:?} echo", kind);
        Some(Reaction::Suppressed(kind))
    }
}

/// Check whether `c` finalizes a token of `category`
fn completes(category: TriggerCategory, c: char) -> bool {
    c == '\n' || (c == ' ' && category == TriggerCategory::Hashtag)
}

/// Check whether going from `old` to `new` inserted text that ends at `caret`.
///
/// Covers keystrokes, pastes and typing over a selection; pure deletions and
/// edits away from the caret do not count.
fn typed_at_caret(old: &[char], new: &[char], caret: usize) -> bool {
    let Some(tail) = new.get(caret..) else {
        return false;
    };
    if !old.ends_with(tail) {
        return false;
    }
    let head = &old[..old.len() - tail.len()];
    let kept = head
        .iter()
        .zip(&new[..caret])
        .take_while(|(a, b)| a == b)
        .count();
    kept < caret
}
