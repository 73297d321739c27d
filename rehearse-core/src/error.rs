//! Error types for rehearse-core

use thiserror::Error;

/// Errors raised while building redaction or scoring components.
///
/// Analysis itself never fails; these only surface when configuration is
/// loaded and compiled.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A configured redaction pattern is not a valid regex
    #[error("invalid redaction pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A sub-score curve has out-of-range constants
    #[error("invalid sub-score curve for {metric}: {reason}")]
    InvalidCurve { metric: String, reason: String },

    /// Serialization or deserialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for core operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_pattern_display() {
        let err = CoreError::InvalidPattern {
            pattern: "(oops".to_string(),
            reason: "unclosed group".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid redaction pattern '(oops': unclosed group"
        );
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<String>("nope").unwrap_err();
        let err: CoreError = json_err.into();
        assert!(matches!(err, CoreError::Serialization(_)));
    }
}
