use thiserror::Error;

/// Failure to fit, apply or rebuild a transformer.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PreprocessingError {
    #[error("invalid shape: expected {expected}, got {got}")]
    InvalidShape { expected: String, got: String },

    #[error("numerical error: {0}")]
    NumericalError(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("empty data: {0}")]
    EmptyData(String),

    #[error("expected {expected_features} features, got {got_features}")]
    FeatureMismatch {
        expected_features: usize,
        got_features: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_mismatch_message() {
        let err = PreprocessingError::FeatureMismatch {
            expected_features: 7,
            got_features: 3,
        };
        assert_eq!(err.to_string(), "expected 7 features, got 3");
    }
}
