//! Error handling for autobox.
//!
//! The completion core itself never surfaces errors to the end user: every
//! failure inside a reaction degrades to "no active autocompletion". The
//! types here exist for the fallible edges around the core:
//! - Buffer mutations that reference positions outside the document
//! - Candidate lookups that fail or time out
//! - Configuration and candidate file loading
//!
//! # Example
//!
//! ```rust
//! use autobox::error::{AutoboxError, ProviderError, Result};
//!
//! fn lookup() -> Result<()> {
//!     Err(ProviderError::Unavailable("store closed".into()).into())
//! }
//!
//! assert!(matches!(lookup(), Err(AutoboxError::Provider(_))));
//! ```

pub mod kinds;

// Re-export commonly used types
pub use kinds::{AutoboxError, BufferError, ConfigError, ProviderError, Result};
