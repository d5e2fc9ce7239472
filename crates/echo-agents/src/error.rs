//! Agent-side errors, mapped to stage errors at each capability boundary.

use thiserror::Error;

/// Errors from the default capability implementations.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Transport-level HTTP failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("endpoint returned HTTP {0}")]
    Endpoint(reqwest::StatusCode),

    /// The model reply did not have the expected shape.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    /// Local file or process I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A spawned command exited non-zero.
    #[error("command failed: {0}")]
    CommandFailed(String),

    /// Invalid agent configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}
