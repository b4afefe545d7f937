//! Error types for autumn-bridge.

/// Result type for autumn-bridge core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur in core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A subject identifier was empty.
    #[error("invalid subject id: {0:?}")]
    InvalidSubjectId(String),
}
