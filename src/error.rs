//! Error types for the gaze keyboard library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// Camera or landmark model could not be brought up
    #[error("Acquisition failure: {0}")]
    Acquisition(String),

    /// A single frame's landmark inference failed
    #[error("Detection error: {0}")]
    Detection(String),

    /// A finite landmark source has no more frames
    #[error("End of landmark stream")]
    EndOfStream,

    /// Reply service request failed
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Cursor control operation failed
    #[error("Cursor control error: {0}")]
    CursorControl(String),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether the error only affects the current frame
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Detection(_))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
