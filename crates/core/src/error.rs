//! Error types for the croplab-core library.
//!
//! This module provides granular error variants for different failure modes,
//! enabling precise error handling and user-friendly error messages.

use thiserror::Error;

/// Errors that can occur within the croplab-core library.
///
/// Each variant represents a specific failure mode with contextual information
/// to help diagnose and handle errors appropriately. Everything user-visible
/// eventually lands in the single error slot of the session state; nothing
/// here is fatal to the process.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (bad base URL, invalid values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input rejected before any network call was made.
    #[error("{0}")]
    Validation(String),

    /// Network failure or a non-2xx response without a structured body.
    #[error("Network error: {0}")]
    Transport(String),

    /// A non-2xx response carrying a structured `{error}` body; shown verbatim.
    #[error("{0}")]
    Service(String),

    /// Image decoding or encoding failed.
    #[error("Image processing failed: {0}")]
    Image(String),

    /// A preview/generate request is already in flight.
    #[error("A request is already in progress")]
    Busy,

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a validation error with the given message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a transport error with the given message.
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Creates a service error with the given message.
    pub fn service(msg: impl Into<String>) -> Self {
        Self::Service(msg.into())
    }

    /// Creates an image processing error with the given message.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
