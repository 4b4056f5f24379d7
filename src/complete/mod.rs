//! In-editor autocompletion core
//!
//! Detects trigger symbols while the user types, tracks the token being
//! typed after the trigger, looks up matching candidates and commits the
//! token on a completing delimiter or a picked suggestion.
//!
//! # Architecture
//!
//! - **Category**: the trigger symbols (`#`, `@`, `~>` by default)
//! - **Sentinel**: invisible marker closing the token being typed
//! - **Extractor**: recovers category, partial text and span from the buffer
//! - **FSM**: the [`Autocompleter`], which reacts to buffer notifications
//! - **Provider**: candidate lookup (blocking or deferred via [`LookupDispatcher`])
//! - **Suggestion**: projection of candidates into display rows
//! - **Highlight**: completed-token log and highlight spans
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use autobox::buffer::{StringBuffer, TextBuffer};
//! use autobox::complete::{Autocompleter, MemoryCandidateProvider, Reaction};
//!
//! let provider = Arc::new(MemoryCandidateProvider::with_samples());
//! let mut engine = Autocompleter::new(provider);
//! let mut buffer = StringBuffer::new("");
//!
//! for c in "#id".chars() {
//!     buffer.insert_at_selection(&c.to_string());
//!     engine.on_text_changed(&mut buffer);
//! }
//! assert_eq!(engine.suggestions().row_count(), 2);
//!
//! let reaction = engine.select_row(&mut buffer, 0);
//! assert_eq!(reaction, Reaction::Committed("#idea".to_string()));
//! assert_eq!(buffer.text(), "#idea");
//! ```

mod category;
mod extractor;
mod fsm;
mod highlight;
mod lookup;
mod provider;
pub mod sentinel;
mod suggestion;


pub use category::{TriggerCategory, Triggers};
pub use extractor::{Extraction, PartialToken, TokenRange, extract};
pub use fsm::{
    Autocompleter, CompletionState, DEFAULT_MAX_ROWS, EditingSession, EventKind, Reaction,
};
pub use highlight::{CompletedTokens, Highlights};
pub use lookup::{
    AsyncCandidateProvider, LookupDispatcher, LookupMode, LookupResult, QueryTicket,
};
pub use provider::{CandidateProvider, CandidateRecord, MemoryCandidateProvider, sample_records};
pub use suggestion::{Emphasis, SuggestionItem, SuggestionList};
