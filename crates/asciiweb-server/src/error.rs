//! Error types for the HTTP front end

use thiserror::Error;

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    /// Request line, headers or body could not be parsed
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Request exceeded the configured size limit
    #[error("request larger than {0} bytes")]
    RequestTooLarge(usize),

    /// Peer closed the connection before sending anything
    #[error("connection closed")]
    ConnectionClosed,

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
