//! Error types for probe queries.
//!
//! Only configuration and input errors abort a query. Data-coverage
//! conditions (a point outside every sector, a physically missing value)
//! are represented in the data model itself and never surface here.

use thiserror::Error;

/// Result type alias using ProbeError.
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that abort a probe query.
#[derive(Debug, Error)]
pub enum ProbeError {
    // === Configuration errors (fatal at catalog load) ===
    #[error("catalog configuration error: {0}")]
    Config(String),

    // === Input errors (raised before any source is read) ===
    #[error("no probe points supplied")]
    NoPoints,

    #[error("no element descriptors supplied")]
    NoDescriptors,

    #[error("invalid probe point: {0}")]
    InvalidPoint(String),

    #[error("invalid element descriptor: {0}")]
    InvalidDescriptor(String),

    /// Every supplied grid source failed to open.
    #[error("no usable input: {0}")]
    NoUsableInput(String),

    /// One grid source failed to open while others succeeded.
    #[error("grid source '{source_id}' unreadable: {message}")]
    SourceUnreadable { source_id: String, message: String },

    // === Control flow ===
    #[error("query cancelled")]
    Cancelled,
}

impl ProbeError {
    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an InvalidDescriptor error.
    pub fn invalid_descriptor(msg: impl Into<String>) -> Self {
        Self::InvalidDescriptor(msg.into())
    }

    /// Create a SourceUnreadable error.
    pub fn source_unreadable(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceUnreadable {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    /// Whether the error means the caller's input was unusable before any
    /// work started, as opposed to a mid-query condition.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ProbeError::NoPoints
                | ProbeError::NoDescriptors
                | ProbeError::InvalidPoint(_)
                | ProbeError::InvalidDescriptor(_)
                | ProbeError::NoUsableInput(_)
        )
    }
}

impl From<std::io::Error> for ProbeError {
    fn from(err: std::io::Error) -> Self {
        Self::NoUsableInput(err.to_string())
    }
}
