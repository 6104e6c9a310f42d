//! Error types for `termfreq`

use std::io;
use std::path::PathBuf;

use arrayvec::ArrayString;
use thiserror::Error;

use crate::types::{MAX_FILES, MAX_PATH_LENGTH, MAX_TERMS};

/// Maximum length of error messages
pub const MAX_ERROR_LENGTH: usize = 256;

/// Custom result type for `termfreq` operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for `termfreq`
///
/// # Design
/// - Free-form messages use a fixed `MAX_ERROR_LENGTH` buffer
/// - Filesystem failures keep the offending path and the underlying `io::Error`
#[derive(Debug, Error)]
pub enum Error {
    /// IO operation failed
    #[error("Error: {0}")]
    Io(#[from] io::Error),

    /// Scan directory does not exist or cannot be read
    #[error("Error: Cannot open directory '{}': {source}", .path.display())]
    DirectoryNotFound {
        /// Requested directory
        path:   PathBuf,
        /// Underlying failure
        source: io::Error,
    },

    /// A single file could not be read during a scan
    #[error("Error: Cannot read file '{}': {source}", .path.display())]
    FileRead {
        /// File that failed
        path:   PathBuf,
        /// Underlying failure
        source: io::Error,
    },

    /// History log could not be opened
    #[error("Error: Cannot open history log '{}': {source}", .path.display())]
    LogOpen {
        /// History log location
        path:   PathBuf,
        /// Underlying failure
        source: io::Error,
    },

    /// History log could not be appended to
    #[error("Error: Cannot write history log '{}': {source}", .path.display())]
    LogWrite {
        /// History log location
        path:   PathBuf,
        /// Underlying failure
        source: io::Error,
    },

    /// History log could not be truncated
    #[error("Error: Cannot clear history log '{}': {source}", .path.display())]
    LogClear {
        /// History log location
        path:   PathBuf,
        /// Underlying failure
        source: io::Error,
    },

    /// History log content is not a valid record stream
    #[error("Error: Corrupt history log: {0}")]
    CorruptHistory(Box<ArrayString<MAX_ERROR_LENGTH>>),

    /// A search term was rejected
    #[error("Error: {0}")]
    InvalidTerm(Box<ArrayString<MAX_ERROR_LENGTH>>),

    /// Include pattern is not a valid glob
    #[error("Error: {0}")]
    InvalidPattern(Box<ArrayString<MAX_ERROR_LENGTH>>),

    /// Term count exceeded the maximum limit
    #[error("Error: Maximum of {} terms per search exceeded", MAX_TERMS)]
    TooManyTerms,

    /// Path length exceeded the maximum limit
    #[error("Error: Path length exceeded {} characters", MAX_PATH_LENGTH)]
    PathTooLong,

    /// File count exceeded the maximum limit
    #[error("Error: Maximum file count of {} exceeded", MAX_FILES)]
    FileCountExceeded,
}

/// Copy `msg` into a fixed buffer, truncating on a char boundary
fn bounded(msg: &str) -> Box<ArrayString<MAX_ERROR_LENGTH>> {
    let mut buf = ArrayString::new();
    for c in msg.chars() {
        if buf.try_push(c).is_err() {
            break;
        }
    }
    Box::new(buf)
}

impl Error {
    /// Create a new corrupt history error
    pub fn corrupt(msg: &str) -> Self {
        Self::CorruptHistory(bounded(msg))
    }

    /// Create a new invalid term error
    pub fn invalid_term(msg: &str) -> Self {
        Self::InvalidTerm(bounded(msg))
    }

    /// Create a new invalid pattern error
    pub fn pattern(msg: &str) -> Self {
        Self::InvalidPattern(bounded(msg))
    }

    /// Get a user-friendly error message with action items
    #[must_use]
    pub fn user_message(&self) -> ArrayString<MAX_ERROR_LENGTH> {
        let mut msg = ArrayString::new();
        let tip = match self {
            Self::Io(_) => "Check file permissions and try again",
            Self::DirectoryNotFound { .. } => {
                "Check the directory name, relative paths start from the working directory"
            },
            Self::FileRead { .. } => "The file is skipped, check its permissions",
            Self::LogOpen { .. } | Self::LogWrite { .. } => {
                "Check that the history location is writable"
            },
            Self::LogClear { .. } => "Check that the history file is not read-only",
            Self::CorruptHistory(_) => "Clear the history to start a fresh log",
            Self::InvalidTerm(_) => "Terms cannot contain spaces, periods or commas",
            Self::InvalidPattern(_) => "Use a glob such as *.txt",
            Self::TooManyTerms => "Split the search into smaller batches",
            Self::PathTooLong => "Try a shorter directory path",
            Self::FileCountExceeded => "Try a smaller directory or an include pattern",
        };
        for part in [self.to_string().as_str(), "\nTip: ", tip] {
            for c in part.chars() {
                if msg.try_push(c).is_err() {
                    return msg;
                }
            }
        }
        msg
    }
}
