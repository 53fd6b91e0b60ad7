//! Error types for loading, predicting and training.
//!
//! Load errors are fatal for a serving process. Prediction errors are local to
//! one call and never touch the loaded model.

use crate::dataset::DatasetError;
use crate::preprocessing::PreprocessingError;
use crate::trainer::TrainerError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure to bring the persisted model into memory.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    #[error("model artifact not found at {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read model artifact {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact {} is corrupt: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    #[error("model artifact was trained on features {found:?}, expected {expected:?}")]
    SchemaMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("model artifact is invalid: {0}")]
    Invalid(String),

    #[error("model is not loaded; initialise the predictor before serving requests")]
    Uninitialized,
}

/// Per-call prediction failure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredictError {
    /// Schema keys absent from the input, in schema order.
    #[error("missing required features: {}", .0.join(", "))]
    MissingFeatures(Vec<String>),

    #[error("feature `{feature}` has a non-numeric value: {value}")]
    TypeConversion { feature: String, value: String },

    #[error("model evaluation failed: {0}")]
    Model(String),
}

impl From<PreprocessingError> for PredictError {
    fn from(err: PreprocessingError) -> Self {
        PredictError::Model(err.to_string())
    }
}

/// Failure to read the training table.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to open dataset {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("dataset is missing required column `{0}`")]
    MissingColumn(String),

    #[error("dataset has no complete rows after dropping missing values")]
    Empty,
}

/// Invalid or unreadable training configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Failure anywhere in the offline training run.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Preprocessing(#[from] PreprocessingError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("not enough rows to train: {0}")]
    InsufficientData(String),

    #[error("training failed: {0}")]
    Trainer(#[from] TrainerError),

    #[error("hyperparameter search failed: {0}")]
    SearchFailed(String),

    #[error("failed to encode model artifact: {0}")]
    Encode(#[from] bincode::Error),

    #[error("failed to write model artifact {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_features_lists_names() {
        let err = PredictError::MissingFeatures(vec!["width_mm".into(), "height_mm".into()]);
        assert_eq!(
            err.to_string(),
            "missing required features: width_mm, height_mm"
        );
    }

    #[test]
    fn test_type_conversion_names_feature() {
        let err = PredictError::TypeConversion {
            feature: "top_speed_kmh".into(),
            value: "\"fast\"".into(),
        };
        assert!(err.to_string().contains("top_speed_kmh"));
    }

    #[test]
    fn test_load_error_mentions_path() {
        let err = ModelLoadError::NotFound {
            path: PathBuf::from("models/missing.bin"),
        };
        assert!(err.to_string().contains("models/missing.bin"));
    }

    #[test]
    fn test_preprocessing_error_maps_to_model_error() {
        let err: PredictError = PreprocessingError::FeatureMismatch {
            expected_features: 7,
            got_features: 6,
        }
        .into();
        assert!(matches!(err, PredictError::Model(_)));
    }
}
