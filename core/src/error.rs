//! Error types for the StreamQL analysis core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The grammar could not recover a statement from the input.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// A metadata provider (fields, sources, policies) failed.
    /// Surfaced to the host; the engines fall back to empty candidate sets.
    #[error("Metadata provider error: {0}")]
    Provider(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Create a parse error at the given offset.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }

    /// Create a provider failure.
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::parse(5, "unexpected character");
        assert_eq!(
            err.to_string(),
            "Parse error at position 5: unexpected character"
        );
    }
}
