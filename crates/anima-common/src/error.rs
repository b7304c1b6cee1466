//! Error types for the Anima identity engine
//!
//! The numeric core has exactly one fatal failure mode: a structural length
//! mismatch between the weight vector and a same-length input or state array.
//! Everything else recovers locally (non-finite values fall back to defaults,
//! malformed persisted records are dropped entry by entry on load).

use thiserror::Error;

/// Result type alias using AnimaError
pub type Result<T> = std::result::Result<T, AnimaError>;

/// Unified error type for Anima operations
#[derive(Debug, Error)]
pub enum AnimaError {
    /// A per-dimension array does not match the weight vector length.
    ///
    /// The caller must resize or realign its state before retrying; the
    /// optimizer never silently continues past this.
    #[error("Length mismatch in {context}: expected {expected}, got {actual}")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for AnimaError {
    fn from(err: serde_json::Error) -> Self {
        AnimaError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_mismatch_display() {
        let err = AnimaError::LengthMismatch {
            context: "energy_gradient",
            expected: 8,
            actual: 4,
        };
        assert!(err.to_string().contains("energy_gradient"));
        assert!(err.to_string().contains("expected 8"));
    }

    #[test]
    fn test_serde_error_conversion() {
        let parse_err = serde_json::from_str::<Vec<f64>>("not json").unwrap_err();
        let err: AnimaError = parse_err.into();
        assert!(matches!(err, AnimaError::Serialization(_)));
    }
}
