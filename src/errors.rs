//! # Error Types Module
//!
//! Typed errors raised at the boundaries with external collaborators.
//! None of them is allowed to escape the per-event handler: the dialogue
//! layer turns each one into a user-facing notice plus a log entry.

use std::path::PathBuf;

/// Failures reported by a media catalog implementation
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("yt-dlp not found on PATH")]
    ToolNotFound,

    #[error("invalid item id: {0}")]
    InvalidItemId(String),

    #[error("catalog process failed: {0}")]
    Process(String),

    #[error("media unavailable: {0}")]
    Unavailable(String),

    #[error("downloaded file not found at {path}")]
    MissingOutput { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures reported by a speech-to-text backend
#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("transcription API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("transcription returned no text")]
    Empty,
}

/// Failures reported by the messaging gateway
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("request failed: {0}")]
    Request(String),
}

impl From<teloxide::RequestError> for GatewayError {
    fn from(err: teloxide::RequestError) -> Self {
        GatewayError::Request(err.to_string())
    }
}

/// Invalid or missing startup configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("{key} must be between {min} and {max}, got {value}")]
    OutOfRange {
        key: &'static str,
        value: u64,
        min: u64,
        max: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_formatting() {
        let err = CatalogError::Process("exit status 1".to_string());
        assert_eq!(err.to_string(), "catalog process failed: exit status 1");

        let err = ConfigError::OutOfRange {
            key: "RESULTS_PER_PAGE",
            value: 500,
            min: 1,
            max: 90,
        };
        assert_eq!(
            err.to_string(),
            "RESULTS_PER_PAGE must be between 1 and 90, got 500"
        );

        let err = TranscriptionError::Api {
            status: 401,
            body: "bad key".to_string(),
        };
        assert_eq!(err.to_string(), "transcription API error (401): bad key");
    }
}
