//! Error types for medscribe.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScribeError {
    // Recognition engine errors
    #[error("Speech recognition is not available on this host")]
    EngineUnavailable,

    #[error("Microphone permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Recognition error: {message}")]
    Recognition { message: String },

    // Configuration errors
    #[error("Configuration file not found at {path}")]
    ConfigFileNotFound { path: String },

    #[error("Invalid configuration value for {key}: {message}")]
    ConfigInvalidValue { key: String, message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    // Note generation errors
    #[error("Note generation failed: {message}")]
    NoteGeneration { message: String },

    // Export/serialization errors
    #[error("Export error: {0}")]
    Export(#[from] serde_json::Error),

    // General I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // Generic error for cases not covered above
    #[error("{0}")]
    Other(String),
}

// Type alias for convenience
pub type Result<T> = std::result::Result<T, ScribeError>;
