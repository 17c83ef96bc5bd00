//! Error taxonomy for backend interactions.
//!
//! Every variant carries the user-facing message verbatim; callers surface
//! these as transcript entries or registry notices rather than propagating
//! them further. Nothing here is fatal to a session.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Detected locally (empty or malformed identifier); never sent to the
    /// backend.
    #[error("{0}")]
    Validation(String),

    /// A successful listing with zero documents. A user-facing condition,
    /// not a failure; rendered as guidance text.
    #[error("{0}")]
    EmptyResult(String),

    /// A structurally valid 2xx response carrying an `error` field. The
    /// message is passed through verbatim.
    #[error("{0}")]
    Backend(String),

    /// A 2xx response with neither an answer nor an `error` field.
    #[error("{0}")]
    Malformed(String),

    /// Network failure or non-2xx status, with the message resolved via the
    /// body precedence rule (`error` → `message` → raw text → generic).
    #[error("{0}")]
    Transport(String),
}

impl ApiError {
    /// The user-facing message text.
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(m)
            | ApiError::EmptyResult(m)
            | ApiError::Backend(m)
            | ApiError::Malformed(m)
            | ApiError::Transport(m) => m,
        }
    }
}
