//! Error types for guidepath-edge

use thiserror::Error;

/// Failures talking to the processing node. All of them skip one cycle.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Server did not respond (timeout)")]
    Timeout,

    #[error("Could not connect to the server: {0}")]
    Unreachable(String),

    #[error("Server error: {0}")]
    Status(u16),

    #[error("Malformed server response: {0}")]
    Protocol(String),

    #[error("Failed to encode frame: {0}")]
    Encode(String),

    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() || err.is_body() {
            ClientError::Protocol(err.to_string())
        } else {
            ClientError::Unreachable(err.to_string())
        }
    }
}

impl From<guidepath_eye::VisionError> for ClientError {
    fn from(err: guidepath_eye::VisionError) -> Self {
        ClientError::Encode(err.to_string())
    }
}
