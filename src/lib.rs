//! Autobox Library
//!
//! Trigger-symbol autocompletion for rich-text input surfaces. The engine
//! watches an editable buffer, notices `#hashtag`, `@mention` and
//! `~>relation` tokens as they are typed, offers matching candidates and
//! replaces the token with the chosen one.
//!
//! # Modules
//!
//! - `buffer`: Text buffer abstraction the engine edits through
//! - `complete`: Autocompletion state machine, extraction and lookups
//! - `editor`: Widget stand-in that forwards edits to the engine
//! - `terminal`: Interactive full-screen host
//! - `cli`: Command-line interface and argument parsing
//! - `config`: Configuration management
//! - `error`: Error types and handling
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use autobox::{Autocompleter, Editor, MemoryCandidateProvider};
//!
//! let provider = Arc::new(MemoryCandidateProvider::with_samples());
//! let mut editor = Editor::new(Autocompleter::new(provider));
//!
//! editor.type_str("hello @Ja");
//! editor.select_row(0);
//! assert_eq!(editor.plain_text(), "hello @Jacob Cole");
//! ```

pub mod buffer;
pub mod cli;
pub mod complete;
pub mod config;
pub mod editor;
pub mod error;
pub mod terminal;

// Re-export commonly used types
pub use buffer::{StringBuffer, TextBuffer};
pub use complete::{Autocompleter, CandidateProvider, MemoryCandidateProvider, Reaction};
pub use config::Config;
pub use editor::Editor;
pub use error::{AutoboxError, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get library version string
///
/// # Returns
/// * `&str` - Version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }
}
