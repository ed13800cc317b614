//! Error types for the signaling client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Unknown role string supplied on the command line
    #[error("Unknown role '{0}' (expected 'recruiter' or 'candidate')")]
    InvalidRole(String),
}
