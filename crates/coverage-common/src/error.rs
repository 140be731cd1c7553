//! Error types for tile storage.

use thiserror::Error;

/// Result type alias using StoreError.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised while addressing or reading coverage tiles.
#[derive(Debug, Error)]
pub enum StoreError {
    // === Addressing Errors ===
    #[error("Invalid threshold label '{label}': {message}")]
    InvalidThreshold { label: String, message: String },

    #[error("Invalid tile coordinate {z}/{x}/{y}: {message}")]
    InvalidCoord {
        z: u32,
        x: u32,
        y: u32,
        message: String,
    },

    // === Storage Errors ===
    #[error("Storage root not found: {0}")]
    RootNotFound(String),

    #[error("Failed to read tile: {0}")]
    ReadError(String),
}

impl StoreError {
    /// Whether the error was caused by a bad caller-supplied address.
    pub fn is_invalid_address(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidThreshold { .. } | StoreError::InvalidCoord { .. }
        )
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::ReadError(err.to_string())
    }
}
