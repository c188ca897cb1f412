//! Error types for the chronoperates client.

use thiserror::Error;

use crate::session::SessionStatus;

/// Why a locally selected image was rejected before upload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Image is too large ({size} bytes, limit is {limit} bytes)")]
    TooLarge { size: u64, limit: u64 },

    #[error("Unsupported image type: {name} (expected JPEG, PNG, BMP or WebP)")]
    UnsupportedType { name: String },
}

impl ValidationError {
    /// Stable reason code for callers that map rejections to their own messages.
    pub fn reason(&self) -> &'static str {
        match self {
            ValidationError::TooLarge { .. } => "too_large",
            ValidationError::UnsupportedType { .. } => "unsupported_type",
        }
    }
}

/// Errors that can occur while driving an extraction session.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid image: {0}")]
    Validation(#[from] ValidationError),

    #[error("Config not loaded. Call resolve_config() before accessing the API URL.")]
    ConfigNotLoaded,

    #[error("Cannot {operation} while the session is {status}")]
    InvalidState {
        operation: &'static str,
        status: SessionStatus,
    },

    #[error("{0}")]
    RequestFailed(String),

    #[error("Failed to download calendar file: {0}")]
    RetrievalFailed(String),

    #[error("Could not hand off calendar file: {0}")]
    PlatformHandoffFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for chronoperates operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
