use std::{fmt, io};

/// Crate-wide `Result` type using [`AutoboxError`] as the error.
///
/// This alias is re-exported by the parent `error` module and is intended
/// to be used throughout the crate for fallible operations.
pub type Result<T> = std::result::Result<T, AutoboxError>;

/// Top-level error type for autobox operations.
///
/// This type wraps the more specific error kinds and provides a single
/// error type that can be used throughout the crate.
#[derive(Debug)]
pub enum AutoboxError {
    /// Text buffer errors.
    Buffer(BufferError),

    /// Candidate lookup errors.
    Provider(ProviderError),

    /// Configuration errors.
    Config(ConfigError),

    /// I/O errors.
    Io(io::Error),

    /// Generic error with a free-form message.
    Generic(String),
}

/// Errors raised by a text buffer adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// A range reached past the end of the document.
    RangeOutOfBounds { start: usize, end: usize, len: usize },

    /// A range whose start lies after its end.
    InvertedRange { start: usize, end: usize },

    /// Nothing before the caret to delete.
    AtDocumentStart,
}

/// Errors raised by a candidate provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The backing store could not be reached.
    Unavailable(String),

    /// The lookup did not finish in time.
    Timeout,

    /// The lookup itself failed.
    QueryFailed(String),

    /// A candidate file could not be parsed.
    InvalidData(String),
}

/// Configuration-specific errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file not found.
    FileNotFound(String),

    /// Invalid config format.
    InvalidFormat(String),

    /// Invalid trigger symbol definition.
    InvalidTrigger { category: String, symbol: String, reason: String },

    /// Invalid field value.
    InvalidValue { field: String, value: String },

    /// Generic configuration error.
    Generic(String),
}

/* ========================= Display & Error impls ========================= */

impl fmt::Display for AutoboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AutoboxError::Buffer(e) => write!(f, "Buffer error: {e}"),
            AutoboxError::Provider(e) => write!(f, "Lookup error: {e}"),
            AutoboxError::Config(e) => write!(f, "Configuration error: {e}"),
            AutoboxError::Io(e) => write!(f, "I/O error: {e}"),
            AutoboxError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::RangeOutOfBounds { start, end, len } => {
                write!(f, "Range {start}..{end} is outside the document (length {len})")
            }
            BufferError::InvertedRange { start, end } => {
                write!(f, "Range start {start} is after its end {end}")
            }
            BufferError::AtDocumentStart => write!(f, "Nothing to delete before the caret"),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderError::Unavailable(msg) => write!(f, "Candidate store unavailable: {msg}"),
            ProviderError::Timeout => write!(f, "Candidate lookup timed out"),
            ProviderError::QueryFailed(msg) => write!(f, "Candidate lookup failed: {msg}"),
            ProviderError::InvalidData(msg) => write!(f, "Invalid candidate data: {msg}"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileNotFound(path) => write!(f, "Config file not found: {path}"),
            ConfigError::InvalidFormat(msg) => write!(f, "Invalid config format: {msg}"),
            ConfigError::InvalidTrigger {
                category,
                symbol,
                reason,
            } => write!(f, "Invalid {category} trigger '{symbol}': {reason}"),
            ConfigError::InvalidValue { field, value } => {
                write!(f, "Invalid value '{value}' for field '{field}'")
            }
            ConfigError::Generic(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for AutoboxError {}
impl std::error::Error for BufferError {}
impl std::error::Error for ProviderError {}
impl std::error::Error for ConfigError {}

/* ========================= Conversions to AutoboxError ========================= */

impl From<io::Error> for AutoboxError {
    fn from(err: io::Error) -> Self {
        AutoboxError::Io(err)
    }
}

impl From<BufferError> for AutoboxError {
    fn from(err: BufferError) -> Self {
        AutoboxError::Buffer(err)
    }
}

impl From<ProviderError> for AutoboxError {
    fn from(err: ProviderError) -> Self {
        AutoboxError::Provider(err)
    }
}

impl From<ConfigError> for AutoboxError {
    fn from(err: ConfigError) -> Self {
        AutoboxError::Config(err)
    }
}

impl From<String> for AutoboxError {
    fn from(msg: String) -> Self {
        AutoboxError::Generic(msg)
    }
}

impl From<&str> for AutoboxError {
    fn from(msg: &str) -> Self {
        AutoboxError::Generic(msg.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_error_display() {
        let err = BufferError::RangeOutOfBounds {
            start: 3,
            end: 9,
            len: 5,
        };
        assert_eq!(
            err.to_string(),
            "Range 3..9 is outside the document (length 5)"
        );
    }

    #[test]
    fn test_wrapped_error_display() {
        let err: AutoboxError = ProviderError::Timeout.into();
        assert_eq!(err.to_string(), "Lookup error: Candidate lookup timed out");

        let err: AutoboxError = ConfigError::InvalidTrigger {
            category: "hashtag".to_string(),
            symbol: "##".to_string(),
            reason: "must be a single character".to_string(),
        }
        .into();
        assert!(err.to_string().contains("Invalid hashtag trigger '##'"));
    }

    #[test]
    fn test_generic_from_str() {
        let err: AutoboxError = "boom".into();
        assert!(matches!(err, AutoboxError::Generic(ref m) if m == "boom"));
    }
}
